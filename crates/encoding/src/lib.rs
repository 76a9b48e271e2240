//! Layered encoding pipeline for HCERT-style health certificates.
//!
//! A claim payload travels through five ordered stages:
//!
//! 1. CBOR encoding ([`payload`]),
//! 2. `COSE_Sign1` signing with ECDSA P-256 ([`cose`]),
//! 3. zlib compression ([`compress`]),
//! 4. Base45 text encoding ([`base45`]),
//! 5. the literal `HC1:` transport prefix ([`pipeline`]).
//!
//! An optional sixth stage renders the prefixed text as a QR code
//! ([`qr`]). Every intermediate representation is retained in the
//! resulting [`Artifact`] so a consumer can exercise any single stage
//! in isolation.

pub use coset;
pub use p256;

pub mod base45;
pub mod compress;
pub mod cose;
mod error;
pub mod normalize;
pub mod payload;
pub mod pipeline;
pub mod qr;

pub use cose::Es256Signer;
pub use error::{EncodingError, VisualEncodingError};
pub use payload::{HcertPayload, PersonName, RecoveryEntry, TestEntry, VaccinationEntry};
pub use pipeline::{Artifact, PREFIX};
