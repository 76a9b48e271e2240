//! Combinatorial driver.
//!
//! Enumerates credential-type combinations × name records × birthdate
//! records, applies retention sampling, and assembles one test vector
//! per surviving case. Per-case encoding failures drop that case
//! only; sibling cases are unaffected.

use hcert_encoding::{pipeline, qr};
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::keystore::KeyStore;
use crate::refdata::{Corpus, ReferenceDataError, ValueSets};
use crate::synth::{self, Combination};
use crate::vector::TestVector;

/// Default retention probability for cases with an invalid name or
/// birthdate record, to bound output volume.
pub const FRACTION_INVALID_CASES: f64 = 0.5;
/// Default retention probability for fully valid cases.
pub const FRACTION_VALID_CASES: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub fraction_valid: f64,
    pub fraction_invalid: f64,
    /// Rendering the QR stage dominates run time; it can be skipped
    /// when the consuming suite only exercises the text forms.
    pub render_qr: bool,
    /// Fixed seed for a reproducible corpus; `None` seeds from
    /// entropy.
    pub seed: Option<u64>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            fraction_valid: FRACTION_VALID_CASES,
            fraction_invalid: FRACTION_INVALID_CASES,
            render_qr: true,
            seed: None,
        }
    }
}

/// The batch generator. Holds the read-only reference tables and the
/// RNG threaded through every synthesis call.
pub struct Generator {
    value_sets: ValueSets,
    corpus: Corpus,
    keys: KeyStore,
    options: GeneratorOptions,
    rng: ChaCha8Rng,
}

impl Generator {
    /// Checks up front that the value sets claim synthesis samples
    /// from are all present, so generation itself cannot hit missing
    /// reference data.
    pub fn new(
        value_sets: ValueSets,
        corpus: Corpus,
        keys: KeyStore,
        options: GeneratorOptions,
    ) -> Result<Self, ReferenceDataError> {
        value_sets.require(&synth::CLAIM_VALUE_SETS)?;
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            value_sets,
            corpus,
            keys,
            options,
            rng,
        })
    }

    /// Runs the full cross product and returns the surviving vectors
    /// in enumeration order.
    pub fn run(&mut self) -> Vec<TestVector> {
        let mut vectors = Vec::new();
        for combination in Combination::catalog() {
            for name in &self.corpus.names {
                for birthdate in &self.corpus.birthdates {
                    let fully_valid = name.valid && birthdate.valid;
                    let retention = if fully_valid {
                        self.options.fraction_valid
                    } else {
                        self.options.fraction_invalid
                    };
                    if self.rng.gen::<f64>() > retention {
                        continue;
                    }

                    let payload = synth::build_payload(
                        &combination,
                        name,
                        birthdate,
                        &self.value_sets,
                        &mut self.rng,
                    );
                    let signing_key = self.keys.get(combination.signing_type());

                    let artifact = match pipeline::encode(&payload, signing_key.signer()) {
                        Ok(artifact) => artifact,
                        Err(err) => {
                            log::warn!(
                                "dropping case `{}`: encoding failed: {err}",
                                combination.description()
                            );
                            continue;
                        }
                    };

                    let qr_code = if self.options.render_qr {
                        match qr::render_png_base64(&artifact.prefixed) {
                            Ok(png) => Some(png),
                            Err(err) => {
                                log::warn!(
                                    "dropping case `{}`: QR rendering failed: {err}",
                                    combination.description()
                                );
                                continue;
                            }
                        }
                    } else {
                        None
                    };

                    vectors.push(TestVector::assemble(
                        payload,
                        artifact,
                        qr_code,
                        &combination,
                        signing_key,
                        fully_valid,
                    ));
                }
            }
        }
        vectors
    }
}
