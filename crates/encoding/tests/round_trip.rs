//! Full pipeline round trip: decoding the transport artifact stage by
//! stage must reproduce the original payload, byte for byte.

use hcert_encoding::cose::{self, Es256Signer};
use hcert_encoding::payload::SCHEMA_VERSION;
use hcert_encoding::p256::ecdsa::SigningKey;
use hcert_encoding::{base45, compress, pipeline, HcertPayload, PersonName, TestEntry, PREFIX};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn signer(seed: u64) -> Es256Signer {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Es256Signer::new([seed as u8; 8], SigningKey::random(&mut rng))
}

fn sample_payload() -> HcertPayload {
    HcertPayload {
        version: SCHEMA_VERSION.into(),
        name: PersonName {
            family_name: "Müller".into(),
            family_name_standardized: "MULLER".into(),
            given_name: "Jan".into(),
            given_name_standardized: "JAN".into(),
        },
        date_of_birth: "1990-01-01".into(),
        vaccinations: None,
        tests: Some(vec![TestEntry {
            targeted_disease: "840539006".into(),
            test_type: "a test".into(),
            sample_collected_at: "2021-04-25T12:45:31Z".into(),
            test_result: "260415000".into(),
            testing_centre: "a place".into(),
            country: "NL".into(),
            issuer: "Ministry of Health Welfare and Sport".into(),
            certificate_id: "urn:uvci:01:NL:fedcba9876543210fedcba9876543210".into(),
        }]),
        recoveries: None,
    }
}

#[test]
fn artifact_decodes_back_to_the_payload() {
    let payload = sample_payload();
    let signer = signer(7);
    let artifact = pipeline::encode(&payload, &signer).unwrap();

    assert!(artifact.prefixed.starts_with(PREFIX));
    let base45_text = artifact.prefixed.strip_prefix(PREFIX).unwrap();
    assert_eq!(base45_text, artifact.base45);

    let compressed = base45::decode(base45_text).unwrap();
    assert_eq!(compressed, artifact.compressed);

    let signed = compress::decompress(&compressed).unwrap();
    assert_eq!(signed, artifact.cose);

    let cbor = cose::verify1(&signed, &signer.verifying_key()).unwrap();
    assert_eq!(cbor, artifact.cbor);

    assert_eq!(HcertPayload::from_cbor(&cbor).unwrap(), payload);
}

#[test]
fn signed_message_carries_the_signer_key_id() {
    let artifact = pipeline::encode(&sample_payload(), &signer(7)).unwrap();
    assert_eq!(cose::key_id(&artifact.cose).unwrap(), vec![7u8; 8]);
}

#[test]
fn artifact_under_wrong_key_still_decodes_but_fails_verification() {
    let used = signer(1);
    let claimed = signer(2);
    let artifact = pipeline::encode(&sample_payload(), &used).unwrap();

    let signed = compress::decompress(&base45::decode(&artifact.base45).unwrap()).unwrap();
    assert!(cose::verify1(&signed, &claimed.verifying_key()).is_err());
    assert!(cose::verify1(&signed, &used.verifying_key()).is_ok());
}

#[test]
fn base45_text_is_qr_alphanumeric_safe() {
    let artifact = pipeline::encode(&sample_payload(), &signer(7)).unwrap();
    const QR_ALPHANUMERIC: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";
    assert!(artifact.base45.chars().all(|c| QR_ALPHANUMERIC.contains(c)));
}
