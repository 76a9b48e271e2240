//! Claim synthesizer: builds one claim payload per combinatorial
//! case.
//!
//! Enumerable fields are sampled with a blank option so otherwise
//! well-formed payloads also cover empty/invalid-enum handling in the
//! verifier under test. The synthesizer is a pure function of its
//! inputs and the RNG stream.

use hcert_encoding::normalize;
use hcert_encoding::payload::{
    HcertPayload, PersonName, RecoveryEntry, TestEntry, VaccinationEntry, SCHEMA_VERSION,
};
use rand::Rng;

use crate::keystore::CredentialType;
use crate::refdata::{ReferenceRecord, ValueSets};

pub const CERTIFICATE_ISSUER: &str = "Ministry of Health Welfare and Sport";

const DISEASE_AGENT_TARGETED: &str = "disease-agent-targeted";
const LAB_RESULT: &str = "covid-19-lab-result";
const VACCINE_PROPHYLAXIS: &str = "sct-vaccines-covid-19";
const VACCINE_PRODUCT: &str = "vaccines-covid-19-names";
const VACCINE_AUTH_HOLDER: &str = "vaccines-covid-19-auth-holders";
const COUNTRIES: &str = "countries";

/// Value sets the synthesizer samples from; checked up front so
/// payload construction itself cannot fail.
pub const CLAIM_VALUE_SETS: [&str; 6] = [
    DISEASE_AGENT_TARGETED,
    LAB_RESULT,
    VACCINE_PROPHYLAXIS,
    VACCINE_PRODUCT,
    VACCINE_AUTH_HOLDER,
    COUNTRIES,
];

/// A non-empty set of credential types, optionally with the
/// wrong-key modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub types: Vec<CredentialType>,
    /// Sign with a key of a credential type *not* in the combination,
    /// which a verifier must flag as a key-usage mismatch.
    pub wrong_key: bool,
}

impl Combination {
    pub fn new(types: Vec<CredentialType>, wrong_key: bool) -> Self {
        debug_assert!(!types.is_empty());
        Self { types, wrong_key }
    }

    /// The fixed case catalog the driver enumerates.
    pub fn catalog() -> Vec<Combination> {
        use CredentialType::{Recovery, Test, Vaccination};
        vec![
            Combination::new(vec![Test], false),
            Combination::new(vec![Vaccination], false),
            Combination::new(vec![Recovery], false),
            Combination::new(vec![Test, Vaccination], false),
            Combination::new(vec![Test, Recovery], false),
            Combination::new(vec![Recovery, Vaccination], false),
            Combination::new(vec![Test, Recovery, Vaccination], false),
            Combination::new(vec![Test], true),
        ]
    }

    pub fn contains(&self, ty: CredentialType) -> bool {
        self.types.contains(&ty)
    }

    /// The credential type whose key signs this combination, before
    /// any wrong-key swap.
    ///
    /// Policy: of the fixed evaluation order `test, recovery,
    /// vaccination`, the last type present wins. A combination with
    /// both vaccination and test entries is therefore signed with the
    /// vaccination key.
    pub fn claimed_signing_type(&self) -> CredentialType {
        use CredentialType::{Recovery, Test, Vaccination};
        [Test, Recovery, Vaccination]
            .into_iter()
            .filter(|ty| self.contains(*ty))
            .last()
            .expect("a combination holds at least one credential type")
    }

    /// The credential type whose key actually signs.
    ///
    /// With the wrong-key modifier this is the first type (in
    /// declaration order) absent from the combination.
    pub fn signing_type(&self) -> CredentialType {
        if self.wrong_key {
            CredentialType::ALL
                .into_iter()
                .find(|ty| !self.contains(*ty))
                .unwrap_or_else(|| self.claimed_signing_type())
        } else {
            self.claimed_signing_type()
        }
    }

    /// Human-readable case label, e.g. `NL test+wrong_key`.
    pub fn description(&self) -> String {
        let mut parts: Vec<&str> = self.types.iter().map(|ty| ty.name()).collect();
        if self.wrong_key {
            parts.push("wrong_key");
        }
        format!("NL {}", parts.join("+"))
    }
}

/// Builds the claim payload for one (combination, name, birthdate)
/// case.
pub fn build_payload(
    combination: &Combination,
    name: &ReferenceRecord,
    birthdate: &ReferenceRecord,
    value_sets: &ValueSets,
    rng: &mut impl Rng,
) -> HcertPayload {
    let tests = combination
        .contains(CredentialType::Test)
        .then(|| {
            let count = rng.gen_range(1..=3);
            (0..count).map(|_| test_entry(value_sets, rng)).collect()
        })
        .filter(|entries: &Vec<_>| !entries.is_empty());

    let recoveries = combination
        .contains(CredentialType::Recovery)
        .then(|| {
            let count = rng.gen_range(1..=2);
            (0..count).map(|_| recovery_entry(value_sets, rng)).collect()
        })
        .filter(|entries: &Vec<_>| !entries.is_empty());

    // Zero vaccination entries is a legal sample; the empty array is
    // then omitted from the payload entirely.
    let vaccinations = combination
        .contains(CredentialType::Vaccination)
        .then(|| {
            let count = rng.gen_range(0..=5);
            (0..count)
                .map(|_| vaccination_entry(value_sets, rng))
                .collect()
        })
        .filter(|entries: &Vec<_>| !entries.is_empty());

    let family_name = name.values.get(1).cloned().unwrap_or_default();
    let given_name = name.values.first().cloned().unwrap_or_default();

    HcertPayload {
        version: SCHEMA_VERSION.into(),
        name: PersonName {
            family_name_standardized: normalize::mrz(&family_name),
            given_name_standardized: normalize::mrz(&given_name),
            family_name,
            given_name,
        },
        date_of_birth: birthdate.values.first().cloned().unwrap_or_default(),
        vaccinations,
        tests,
        recoveries,
    }
}

fn test_entry(value_sets: &ValueSets, rng: &mut impl Rng) -> TestEntry {
    TestEntry {
        targeted_disease: value_sets.sample_or_blank(DISEASE_AGENT_TARGETED, rng),
        test_type: "a test".into(),
        sample_collected_at: "2021-04-25T12:45:31Z".into(),
        test_result: value_sets.sample_or_blank(LAB_RESULT, rng),
        testing_centre: "a place".into(),
        country: value_sets.sample_or_blank(COUNTRIES, rng),
        issuer: CERTIFICATE_ISSUER.into(),
        certificate_id: random_uvci(rng),
    }
}

fn recovery_entry(value_sets: &ValueSets, rng: &mut impl Rng) -> RecoveryEntry {
    RecoveryEntry {
        targeted_disease: value_sets.sample_or_blank(DISEASE_AGENT_TARGETED, rng),
        first_positive_test_date: "2021-03-25".into(),
        country: value_sets.sample_or_blank(COUNTRIES, rng),
        issuer: CERTIFICATE_ISSUER.into(),
        valid_from: "2021-04-12".into(),
        valid_until: "2021-06-01".into(),
        certificate_id: random_uvci(rng),
    }
}

fn vaccination_entry(value_sets: &ValueSets, rng: &mut impl Rng) -> VaccinationEntry {
    VaccinationEntry {
        targeted_disease: value_sets.sample_or_blank(DISEASE_AGENT_TARGETED, rng),
        vaccine_or_prophylaxis: value_sets.sample_or_blank(VACCINE_PROPHYLAXIS, rng),
        medicinal_product: value_sets.sample_or_blank(VACCINE_PRODUCT, rng),
        marketing_authorization_holder: value_sets.sample_or_blank(VACCINE_AUTH_HOLDER, rng),
        dose_number: rng.gen_range(0..=9),
        series_doses: rng.gen_range(1..=9),
        vaccination_date: "2021-02-18".into(),
        country: value_sets.sample_or_blank(COUNTRIES, rng),
        issuer: CERTIFICATE_ISSUER.into(),
        certificate_id: random_uvci(rng),
    }
}

/// A fresh certificate identifier: `urn:uvci:01:NL:` followed by 32
/// hex characters.
fn random_uvci(rng: &mut impl Rng) -> String {
    let mut id = [0u8; 16];
    rng.fill(&mut id[..]);
    format!("urn:uvci:01:NL:{}", hex::encode(id))
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn claim_value_sets() -> ValueSets {
        let mut sets = ValueSets::new();
        sets.insert(DISEASE_AGENT_TARGETED, vec!["840539006".into()]);
        sets.insert(LAB_RESULT, vec!["260415000".into(), "260373001".into()]);
        sets.insert(VACCINE_PROPHYLAXIS, vec!["1119349007".into()]);
        sets.insert(VACCINE_PRODUCT, vec!["EU/1/20/1528".into()]);
        sets.insert(VACCINE_AUTH_HOLDER, vec!["ORG-100030215".into()]);
        sets
    }

    fn name_record() -> ReferenceRecord {
        ReferenceRecord {
            valid: true,
            values: vec!["Jan".into(), "Müller".into()],
        }
    }

    fn birthdate_record() -> ReferenceRecord {
        ReferenceRecord {
            valid: true,
            values: vec!["1990-01-01".into()],
        }
    }

    #[test]
    fn signing_priority_is_last_of_test_recovery_vaccination() {
        use CredentialType::{Recovery, Test, Vaccination};
        let cases = [
            (vec![Test], Test),
            (vec![Test, Recovery], Recovery),
            (vec![Test, Vaccination], Vaccination),
            (vec![Recovery, Vaccination], Vaccination),
            (vec![Test, Recovery, Vaccination], Vaccination),
        ];
        for (types, expected) in cases {
            let combination = Combination::new(types, false);
            assert_eq!(combination.claimed_signing_type(), expected);
            assert_eq!(combination.signing_type(), expected);
        }
    }

    #[test]
    fn wrong_key_swaps_to_first_absent_type() {
        use CredentialType::{Recovery, Test, Vaccination};
        let combination = Combination::new(vec![Test], true);
        assert_eq!(combination.claimed_signing_type(), Test);
        assert_eq!(combination.signing_type(), Vaccination);

        let combination = Combination::new(vec![Test, Vaccination], true);
        assert_eq!(combination.signing_type(), Recovery);
    }

    #[test]
    fn catalog_has_one_wrong_key_case() {
        let catalog = Combination::catalog();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.iter().filter(|c| c.wrong_key).count(), 1);
    }

    #[test]
    fn payload_carries_normalized_names() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let combination = Combination::new(vec![CredentialType::Vaccination], false);
        let payload = build_payload(
            &combination,
            &name_record(),
            &birthdate_record(),
            &claim_value_sets(),
            &mut rng,
        );

        assert_eq!(payload.version, SCHEMA_VERSION);
        assert_eq!(payload.name.family_name, "Müller");
        assert_eq!(payload.name.family_name_standardized, "MULLER");
        assert_eq!(payload.name.given_name, "Jan");
        assert_eq!(payload.name.given_name_standardized, "JAN");
        assert_eq!(payload.date_of_birth, "1990-01-01");
        assert!(payload.tests.is_none());
        assert!(payload.recoveries.is_none());
    }

    #[test]
    fn entry_counts_stay_within_bounds() {
        use CredentialType::{Recovery, Test, Vaccination};
        let sets = claim_value_sets();
        let combination = Combination::new(vec![Test, Recovery, Vaccination], false);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..50 {
            let payload = build_payload(
                &combination,
                &name_record(),
                &birthdate_record(),
                &sets,
                &mut rng,
            );
            let tests = payload.tests.expect("test entries are always 1..=3");
            assert!((1..=3).contains(&tests.len()));
            let recoveries = payload.recoveries.expect("recovery entries are always 1..=2");
            assert!((1..=2).contains(&recoveries.len()));
            if let Some(vaccinations) = payload.vaccinations {
                assert!((1..=5).contains(&vaccinations.len()));
                for entry in vaccinations {
                    assert!(entry.dose_number <= 9);
                    assert!((1..=9).contains(&entry.series_doses));
                }
            }
        }
    }

    #[test]
    fn uvci_is_unique_and_well_formed() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let a = random_uvci(&mut rng);
        let b = random_uvci(&mut rng);
        assert_ne!(a, b);
        for ci in [a, b] {
            let hex_part = ci.strip_prefix("urn:uvci:01:NL:").unwrap();
            assert_eq!(hex_part.len(), 32);
            assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn sampled_fields_are_blank_or_valid_codes() {
        let sets = claim_value_sets();
        let combination = Combination::new(vec![CredentialType::Test], false);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..30 {
            let payload = build_payload(
                &combination,
                &name_record(),
                &birthdate_record(),
                &sets,
                &mut rng,
            );
            for entry in payload.tests.unwrap() {
                assert!(entry.targeted_disease.is_empty() || entry.targeted_disease == "840539006");
                assert!(
                    entry.test_result.is_empty()
                        || ["260415000", "260373001"].contains(&entry.test_result.as_str())
                );
                assert_eq!(entry.issuer, CERTIFICATE_ISSUER);
            }
        }
    }
}
