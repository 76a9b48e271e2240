//! `COSE_Sign1` signing for the single algorithm the certificate
//! scheme uses: ECDSA over P-256 with SHA-256 (ES256).
//!
//! Built on [`coset`]; only the one-signer message shape with
//! protected `alg` and `kid` headers is supported.

use coset::{iana, CoseSign1, CoseSign1Builder, HeaderBuilder, TaggedCborSerializable};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};

use crate::error::EncodingError;

/// An ES256 signer bound to an 8-byte COSE key identifier.
///
/// The key identifier is carried in the protected header of every
/// message produced with this signer; verifiers use it to select
/// their trust material.
#[derive(Debug, Clone)]
pub struct Es256Signer {
    key_id: [u8; 8],
    secret: SigningKey,
}

impl Es256Signer {
    pub fn new(key_id: [u8; 8], secret: SigningKey) -> Self {
        Self { key_id, secret }
    }

    pub fn key_id(&self) -> [u8; 8] {
        self.key_id
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        *self.secret.verifying_key()
    }
}

/// Wraps CBOR payload bytes in a signed, tagged `COSE_Sign1`.
///
/// Protected headers are `{alg: ES256, kid}`; the output carries CBOR
/// tag 18 so a decoder can recognize the message type.
pub fn sign1(payload: Vec<u8>, signer: &Es256Signer) -> Result<Vec<u8>, EncodingError> {
    let protected = HeaderBuilder::new()
        .algorithm(iana::Algorithm::ES256)
        .key_id(signer.key_id.to_vec())
        .build();

    let message = CoseSign1Builder::new()
        .protected(protected)
        .payload(payload)
        .try_create_signature(b"", |tbs| {
            let signature: Signature = signer.secret.try_sign(tbs)?;
            Ok::<_, p256::ecdsa::Error>(signature.to_vec())
        })?
        .build();

    message
        .to_tagged_vec()
        .map_err(|e| EncodingError::Cose(e.to_string()))
}

/// Error raised by [`verify1`].
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed COSE_Sign1: {0}")]
    Malformed(String),

    #[error("signature verification failed")]
    BadSignature,
}

/// Checks a tagged `COSE_Sign1` against `key` and returns its payload.
///
/// This is not a full verifier; it exists so the generator's own
/// tests (and the wrong-key oracle properties) can confirm what a
/// conformant verifier must conclude.
pub fn verify1(bytes: &[u8], key: &VerifyingKey) -> Result<Vec<u8>, VerifyError> {
    let message =
        CoseSign1::from_tagged_slice(bytes).map_err(|e| VerifyError::Malformed(e.to_string()))?;
    message
        .verify_signature(b"", |signature, data| {
            let signature =
                Signature::from_slice(signature).map_err(|_| VerifyError::BadSignature)?;
            key.verify(data, &signature)
                .map_err(|_| VerifyError::BadSignature)
        })?;
    Ok(message.payload.unwrap_or_default())
}

/// Reads the `kid` protected header of a tagged `COSE_Sign1`.
pub fn key_id(bytes: &[u8]) -> Result<Vec<u8>, VerifyError> {
    let message =
        CoseSign1::from_tagged_slice(bytes).map_err(|e| VerifyError::Malformed(e.to_string()))?;
    Ok(message.protected.header.key_id)
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn signer(seed: u64) -> Es256Signer {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Es256Signer::new(*b"\x01\x02\x03\x04\x05\x06\x07\x08", SigningKey::random(&mut rng))
    }

    #[test]
    fn sign_then_verify_returns_payload() {
        let signer = signer(1);
        let signed = sign1(b"PAYLOAD".to_vec(), &signer).unwrap();
        let payload = verify1(&signed, &signer.verifying_key()).unwrap();
        assert_eq!(payload, b"PAYLOAD");
    }

    #[test]
    fn output_is_tagged_cose_sign1() {
        let signed = sign1(vec![0x42], &signer(1)).unwrap();
        // 0xD2 = tag 18 (COSE_Sign1).
        assert_eq!(signed[0], 0xD2);
    }

    #[test]
    fn key_id_is_carried_in_protected_header() {
        let signer = signer(1);
        let signed = sign1(vec![], &signer).unwrap();
        assert_eq!(key_id(&signed).unwrap(), signer.key_id().to_vec());
    }

    #[test]
    fn verification_with_other_key_fails() {
        let signed = sign1(b"PAYLOAD".to_vec(), &signer(1)).unwrap();
        let other = signer(2);
        assert!(matches!(
            verify1(&signed, &other.verifying_key()),
            Err(VerifyError::BadSignature)
        ));
    }

    #[test]
    fn rejects_untagged_input() {
        let signer = signer(1);
        let signed = sign1(vec![], &signer).unwrap();
        // Strip the tag byte; `from_tagged_slice` must refuse it.
        assert!(matches!(
            verify1(&signed[1..], &signer.verifying_key()),
            Err(VerifyError::Malformed(_))
        ));
    }
}
