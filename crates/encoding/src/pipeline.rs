//! The five-stage transport encoding.

use crate::cose::Es256Signer;
use crate::error::EncodingError;
use crate::payload::HcertPayload;
use crate::{base45, compress, cose};

/// Transport prefix identifying the certificate scheme.
pub const PREFIX: &str = "HC1:";

/// Every representation a payload takes on its way to the transport
/// form.
///
/// All stages are retained, not just the last: a conformance suite
/// can feed any intermediate form to a verifier under test to isolate
/// the failing stage.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Stage 1: CBOR encoding of the payload.
    pub cbor: Vec<u8>,
    /// Stage 2: tagged `COSE_Sign1` over the CBOR bytes.
    pub cose: Vec<u8>,
    /// Stage 3: zlib-compressed signed message.
    pub compressed: Vec<u8>,
    /// Stage 4: Base45 text form of the compressed bytes.
    pub base45: String,
    /// Stage 5: text form with the `HC1:` transport prefix.
    pub prefixed: String,
}

/// Runs a payload through all five encoding stages.
pub fn encode(payload: &HcertPayload, signer: &Es256Signer) -> Result<Artifact, EncodingError> {
    let cbor = payload.to_cbor()?;
    let cose = cose::sign1(cbor.clone(), signer)?;
    let compressed = compress::compress(&cose)?;
    let base45 = base45::encode(&compressed);
    let prefixed = format!("{PREFIX}{base45}");
    Ok(Artifact {
        cbor,
        cose,
        compressed,
        base45,
        prefixed,
    })
}
