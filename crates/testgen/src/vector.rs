//! Assembled test vectors and the expected-results oracle.
//!
//! Field names follow the conformance-suite file format exactly; a
//! consuming test suite round-trips these records as-is.

use hcert_encoding::{Artifact, HcertPayload};
use serde::{Deserialize, Serialize};

use crate::keystore::SigningKey;
use crate::synth::Combination;

/// Context a verifier needs besides the artifact itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestContext {
    #[serde(rename = "VERSION")]
    pub version: u32,
    #[serde(rename = "SCHEMA")]
    pub schema: String,
    /// Base64 DER certificate of the key that actually signed.
    #[serde(rename = "CERTIFICATE")]
    pub certificate: String,
    #[serde(rename = "VALIDATIONCLOCK")]
    pub validation_clock: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
}

/// The per-stage outcome a conformant verifier must reproduce.
///
/// The generator never corrupts the decode/transport stages, so those
/// flags are `true` by construction. Only schema validation (driven
/// by the corpus validity labels) and key usage (driven by the
/// wrong-key modifier) vary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedResults {
    #[serde(rename = "EXPECTEDVALIDOBJECT")]
    pub valid_object: bool,
    #[serde(rename = "EXPECTEDSCHEMAVALIDATION")]
    pub schema_validation: bool,
    #[serde(rename = "EXPECTEDDECODE")]
    pub decode: bool,
    #[serde(rename = "EXPECTEDVERIFY")]
    pub verify: bool,
    #[serde(rename = "EXPECTEDUNPREFIX")]
    pub unprefix: bool,
    #[serde(rename = "EXPECTEDVALIDJSON")]
    pub valid_json: bool,
    #[serde(rename = "EXPECTEDCOMPRESSION")]
    pub compression: bool,
    #[serde(rename = "EXPECTEDB45DECODE")]
    pub base45_decode: bool,
    #[serde(rename = "EXPECTEDEXPIRATIONCHECK")]
    pub expiration_check: bool,
    #[serde(rename = "EXPECTEDPICTUREDECODE")]
    pub picture_decode: bool,
    #[serde(rename = "EXPECTEDKEYUSAGE")]
    pub key_usage: bool,
}

impl ExpectedResults {
    /// The oracle for a case built from records with the given
    /// combined validity, under a combination that may carry the
    /// wrong-key modifier.
    pub fn oracle(fully_valid: bool, wrong_key: bool) -> Self {
        Self {
            valid_object: true,
            schema_validation: fully_valid,
            decode: true,
            verify: true,
            unprefix: true,
            valid_json: true,
            compression: true,
            base45_decode: true,
            expiration_check: true,
            picture_decode: true,
            key_usage: !wrong_key,
        }
    }
}

/// One labeled conformance case. Assembled once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    #[serde(rename = "JSON")]
    pub json: HcertPayload,
    #[serde(rename = "CBOR")]
    pub cbor_hex: String,
    #[serde(rename = "COSE")]
    pub cose_hex: String,
    #[serde(rename = "COMPRESSED")]
    pub compressed_hex: String,
    #[serde(rename = "BASE45")]
    pub base45: String,
    #[serde(rename = "PREFIX")]
    pub prefixed: String,
    /// QR rendering as base64 PNG; `null` when rendering is disabled.
    #[serde(rename = "2DCODE")]
    pub qr_code: Option<String>,
    #[serde(rename = "TESTCTX")]
    pub context: TestContext,
    #[serde(rename = "EXPECTEDRESULTS")]
    pub expected_results: ExpectedResults,
}

impl TestVector {
    /// Assembles a vector from the encoded artifact and its case
    /// metadata.
    pub fn assemble(
        payload: HcertPayload,
        artifact: Artifact,
        qr_code: Option<String>,
        combination: &Combination,
        signing_key: &SigningKey,
        fully_valid: bool,
    ) -> Self {
        Self {
            json: payload,
            cbor_hex: hex::encode(&artifact.cbor),
            cose_hex: hex::encode(&artifact.cose),
            compressed_hex: hex::encode(&artifact.compressed),
            base45: artifact.base45,
            prefixed: artifact.prefixed,
            qr_code,
            context: TestContext {
                version: 1,
                schema: "1.0.0".into(),
                certificate: signing_key.certificate_base64(),
                validation_clock: now_iso8601(),
                description: combination.description(),
            },
            expected_results: ExpectedResults::oracle(fully_valid, combination.wrong_key),
        }
    }
}

fn now_iso8601() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
