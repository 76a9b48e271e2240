//! Per-credential-type signing key material.
//!
//! Each credential type signs under its own document-signer
//! certificate. The 8-byte key identifier is the head of the SHA-256
//! fingerprint of the DER-encoded certificate; verifiers select their
//! trust anchor by this identifier alone, so its derivation must be
//! deterministic.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use base64::prelude::{Engine, BASE64_STANDARD};
use hcert_encoding::cose::Es256Signer;
use p256::pkcs8::DecodePrivateKey;
use sha2::{Digest, Sha256};

/// Classification of a health claim, each signed under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CredentialType {
    Test,
    Vaccination,
    Recovery,
}

impl CredentialType {
    pub const ALL: [CredentialType; 3] = [
        CredentialType::Test,
        CredentialType::Vaccination,
        CredentialType::Recovery,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CredentialType::Test => "test",
            CredentialType::Vaccination => "vaccination",
            CredentialType::Recovery => "recovery",
        }
    }

    /// Stem of the key file pair for this type. The vaccination files
    /// historically carry a plural name.
    fn key_file_stem(self) -> &'static str {
        match self {
            CredentialType::Test => "test",
            CredentialType::Vaccination => "vaccinations",
            CredentialType::Recovery => "recovery",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unreadable or invalid key material. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum KeyMaterialError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid certificate {path}: {reason}")]
    InvalidCertificate { path: PathBuf, reason: String },

    #[error("invalid private key {path}: not a PEM-encoded EC P-256 key")]
    InvalidPrivateKey { path: PathBuf },
}

/// A credential-type signing key with its certificate.
///
/// Shared read-only across every test vector signed under the same
/// credential type.
#[derive(Debug, Clone)]
pub struct SigningKey {
    signer: Es256Signer,
    certificate_der: Vec<u8>,
}

impl SigningKey {
    /// Binds a P-256 secret key to a certificate, deriving the key
    /// identifier from the certificate fingerprint.
    pub fn new(certificate_der: Vec<u8>, secret: p256::ecdsa::SigningKey) -> Self {
        let key_id = fingerprint_key_id(&certificate_der);
        Self {
            signer: Es256Signer::new(key_id, secret),
            certificate_der,
        }
    }

    pub fn signer(&self) -> &Es256Signer {
        &self.signer
    }

    pub fn key_id(&self) -> [u8; 8] {
        self.signer.key_id()
    }

    /// The DER certificate as base64, as embedded in test contexts.
    pub fn certificate_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.certificate_der)
    }
}

/// First 8 bytes of the SHA-256 fingerprint of a DER certificate.
pub fn fingerprint_key_id(certificate_der: &[u8]) -> [u8; 8] {
    let digest = Sha256::digest(certificate_der);
    let mut key_id = [0u8; 8];
    key_id.copy_from_slice(&digest[..8]);
    key_id
}

/// One signing key per credential type, loaded once at startup.
#[derive(Debug, Clone)]
pub struct KeyStore {
    test: SigningKey,
    vaccination: SigningKey,
    recovery: SigningKey,
}

impl KeyStore {
    pub fn new(test: SigningKey, vaccination: SigningKey, recovery: SigningKey) -> Self {
        Self {
            test,
            vaccination,
            recovery,
        }
    }

    /// Loads `Health_DSC_valid_for_<type>.pem` / `.key` pairs from
    /// `keys_dir`.
    pub fn load(keys_dir: &Path) -> Result<Self, KeyMaterialError> {
        let mut load_one = |ty: CredentialType| -> Result<SigningKey, KeyMaterialError> {
            let base = keys_dir.join(format!("Health_DSC_valid_for_{}", ty.key_file_stem()));
            let certificate_der = load_certificate_der(&base.with_extension("pem"))?;
            let secret = load_p256_key(&base.with_extension("key"))?;
            Ok(SigningKey::new(certificate_der, secret))
        };
        Ok(Self {
            test: load_one(CredentialType::Test)?,
            vaccination: load_one(CredentialType::Vaccination)?,
            recovery: load_one(CredentialType::Recovery)?,
        })
    }

    pub fn get(&self, ty: CredentialType) -> &SigningKey {
        match ty {
            CredentialType::Test => &self.test,
            CredentialType::Vaccination => &self.vaccination,
            CredentialType::Recovery => &self.recovery,
        }
    }
}

fn load_certificate_der(path: &Path) -> Result<Vec<u8>, KeyMaterialError> {
    let raw = std::fs::read(path).map_err(|source| KeyMaterialError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (_, pem) = x509_parser::pem::parse_x509_pem(&raw).map_err(|e| {
        KeyMaterialError::InvalidCertificate {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;
    // Reject PEM blocks that do not hold a parsable certificate.
    pem.parse_x509()
        .map_err(|e| KeyMaterialError::InvalidCertificate {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(pem.contents)
}

fn load_p256_key(path: &Path) -> Result<p256::ecdsa::SigningKey, KeyMaterialError> {
    let raw = std::fs::read_to_string(path).map_err(|source| KeyMaterialError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // PKCS#8 (`BEGIN PRIVATE KEY`) or SEC1 (`BEGIN EC PRIVATE KEY`);
    // either way the parse enforces the P-256 curve.
    p256::SecretKey::from_pkcs8_pem(&raw)
        .or_else(|_| p256::SecretKey::from_sec1_pem(&raw))
        .map(Into::into)
        .map_err(|_| KeyMaterialError::InvalidPrivateKey {
            path: path.to_path_buf(),
        })
}
