//! Combinatorial conformance test-vector generator for HCERT-style
//! health certificates.
//!
//! The generator enumerates credential-type combinations against a
//! corpus of labeled name and birthdate records, synthesizes a claim
//! payload for each surviving case, runs it through the
//! [`hcert_encoding`] pipeline, and pairs the resulting artifact with
//! the expected-results oracle a conformant verifier must reproduce.

pub mod driver;
pub mod keystore;
pub mod refdata;
pub mod synth;
pub mod vector;

pub use driver::{Generator, GeneratorOptions};
pub use keystore::{CredentialType, KeyMaterialError, KeyStore, SigningKey};
pub use refdata::{Corpus, ReferenceDataError, ReferenceRecord, ValueSets};
pub use synth::Combination;
pub use vector::{ExpectedResults, TestContext, TestVector};
