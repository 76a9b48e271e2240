//! Claim payload data model.
//!
//! One tagged record type per claim kind, assembled into
//! [`HcertPayload`]. Wire keys are the two-letter codes of the
//! certificate schema; field order on the wire is the declaration
//! order below, which serde preserves for structs. Serialization to
//! the wire map is therefore a declared property of these types, not
//! a side effect of insertion order.

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// Schema version carried in the `ver` field.
pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEntry {
    #[serde(rename = "tg")]
    pub targeted_disease: String,
    #[serde(rename = "tt")]
    pub test_type: String,
    #[serde(rename = "sc")]
    pub sample_collected_at: String,
    #[serde(rename = "tr")]
    pub test_result: String,
    #[serde(rename = "tc")]
    pub testing_centre: String,
    #[serde(rename = "co")]
    pub country: String,
    #[serde(rename = "is")]
    pub issuer: String,
    #[serde(rename = "ci")]
    pub certificate_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationEntry {
    #[serde(rename = "tg")]
    pub targeted_disease: String,
    #[serde(rename = "vp")]
    pub vaccine_or_prophylaxis: String,
    #[serde(rename = "mp")]
    pub medicinal_product: String,
    #[serde(rename = "ma")]
    pub marketing_authorization_holder: String,
    #[serde(rename = "dn")]
    pub dose_number: u32,
    #[serde(rename = "sd")]
    pub series_doses: u32,
    #[serde(rename = "dt")]
    pub vaccination_date: String,
    #[serde(rename = "co")]
    pub country: String,
    #[serde(rename = "is")]
    pub issuer: String,
    #[serde(rename = "ci")]
    pub certificate_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryEntry {
    #[serde(rename = "tg")]
    pub targeted_disease: String,
    #[serde(rename = "fr")]
    pub first_positive_test_date: String,
    #[serde(rename = "co")]
    pub country: String,
    #[serde(rename = "is")]
    pub issuer: String,
    #[serde(rename = "df")]
    pub valid_from: String,
    #[serde(rename = "du")]
    pub valid_until: String,
    #[serde(rename = "ci")]
    pub certificate_id: String,
}

/// Holder name, in both human-readable and machine-readable forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(rename = "fn")]
    pub family_name: String,
    #[serde(rename = "fnt")]
    pub family_name_standardized: String,
    #[serde(rename = "gn")]
    pub given_name: String,
    #[serde(rename = "gnt")]
    pub given_name_standardized: String,
}

/// Top-level claim payload.
///
/// Empty claim arrays are omitted on the wire rather than serialized
/// as `[]`, hence the `Option<Vec<_>>` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HcertPayload {
    #[serde(rename = "ver")]
    pub version: String,
    #[serde(rename = "nam")]
    pub name: PersonName,
    #[serde(rename = "dob")]
    pub date_of_birth: String,
    #[serde(rename = "v", skip_serializing_if = "Option::is_none")]
    pub vaccinations: Option<Vec<VaccinationEntry>>,
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<TestEntry>>,
    #[serde(rename = "r", skip_serializing_if = "Option::is_none")]
    pub recoveries: Option<Vec<RecoveryEntry>>,
}

impl HcertPayload {
    /// Encodes the payload as CBOR.
    ///
    /// The encoding is reproducible: the same payload always yields
    /// the same bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, EncodingError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| EncodingError::Cbor(e.to_string()))?;
        Ok(buf)
    }

    /// Decodes a payload from its CBOR form.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, EncodingError> {
        ciborium::from_reader(bytes).map_err(|e| EncodingError::Cbor(e.to_string()))
    }
}
