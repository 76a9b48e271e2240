//! Reference data: value sets and the labeled name/birthdate corpora.
//!
//! Value sets are the official enumerations (disease agents, vaccine
//! codes, ...) claim fields are sampled from. Corpus records carry a
//! validity flag assigned upstream; the generator only consumes it,
//! never recomputes it.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Deserialize;

/// Malformed or missing reference data. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed value set {path}: {source}")]
    MalformedValueSet {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("value set `{0}` is not available")]
    MissingValueSet(String),

    #[error("malformed corpus record in {path}: `{line}`")]
    MalformedRecord { path: PathBuf, line: String },
}

/// On-disk shape of a value-set file.
#[derive(Deserialize)]
struct ValueSetFile {
    #[serde(rename = "valueSetId")]
    value_set_id: String,
    #[serde(rename = "valueSetValues")]
    value_set_values: BTreeMap<String, serde_json::Value>,
}

/// Immutable table of value sets, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ValueSets {
    sets: BTreeMap<String, Vec<String>>,
}

/// Countries are not part of the schema value-set files.
const COUNTRIES: (&str, [&str; 4]) = ("countries", ["NL", "SD", "GR", "AT"]);

impl ValueSets {
    /// An empty table pre-seeded with the built-in `countries` set.
    pub fn new() -> Self {
        let mut sets = Self::default();
        sets.insert(
            COUNTRIES.0,
            COUNTRIES.1.iter().map(|s| s.to_string()).collect(),
        );
        sets
    }

    /// Loads every `.json` value-set file in `dir`, on top of the
    /// built-in sets.
    ///
    /// Codes are the keys of the file's `valueSetValues` map, kept in
    /// sorted order so sampling is stable across runs of the same
    /// seed.
    pub fn load_dir(dir: &Path) -> Result<Self, ReferenceDataError> {
        let mut sets = Self::new();

        let entries = fs::read_dir(dir).map_err(|source| ReferenceDataError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let raw = fs::read_to_string(&path).map_err(|source| ReferenceDataError::Io {
                path: path.clone(),
                source,
            })?;
            let file: ValueSetFile = serde_json::from_str(&raw).map_err(|source| {
                ReferenceDataError::MalformedValueSet {
                    path: path.clone(),
                    source,
                }
            })?;
            sets.insert(
                &file.value_set_id,
                file.value_set_values.into_keys().collect(),
            );
        }
        Ok(sets)
    }

    pub fn insert(&mut self, id: &str, codes: Vec<String>) {
        self.sets.insert(id.to_string(), codes);
    }

    pub fn get(&self, id: &str) -> Option<&[String]> {
        self.sets.get(id).map(Vec::as_slice)
    }

    /// Confirms that every id in `ids` is present.
    pub fn require(&self, ids: &[&str]) -> Result<(), ReferenceDataError> {
        for id in ids {
            if !self.sets.contains_key(*id) {
                return Err(ReferenceDataError::MissingValueSet(id.to_string()));
            }
        }
        Ok(())
    }

    /// Samples uniformly over the empty string and the valid codes of
    /// `id`.
    ///
    /// The blank option deliberately injects invalid-enum values into
    /// otherwise well-formed payloads. Sets must have been checked
    /// with [`Self::require`] beforehand; an unknown id samples blank.
    pub fn sample_or_blank(&self, id: &str, rng: &mut impl Rng) -> String {
        let codes = self.get(id).unwrap_or(&[]);
        match rng.gen_range(0..=codes.len()) {
            0 => String::new(),
            i => codes[i - 1].clone(),
        }
    }
}

/// One labeled record from the name or birthdate corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    /// `true` when the upstream label marks the record as valid.
    pub valid: bool,
    pub values: Vec<String>,
}

impl ReferenceRecord {
    /// Parses a `RESULT:field1;field2;...` corpus line.
    pub fn parse(line: &str) -> Option<Self> {
        let (result, rest) = line.split_once(':')?;
        if result.len() != 1 {
            return None;
        }
        Some(Self {
            valid: result == "T",
            values: rest.split(';').map(str::to_string).collect(),
        })
    }
}

/// The name and birthdate corpora driving the combinatorial cross
/// product.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub names: Vec<ReferenceRecord>,
    pub birthdates: Vec<ReferenceRecord>,
}

impl Corpus {
    /// Loads the `names` and `birthdates` files from `data_dir`.
    ///
    /// Name records must carry at least a given and a family name;
    /// birthdate records at least one field.
    pub fn load(data_dir: &Path) -> Result<Self, ReferenceDataError> {
        let names = load_corpus_file(&data_dir.join("names"), 2)?;
        let birthdates = load_corpus_file(&data_dir.join("birthdates"), 1)?;
        Ok(Self { names, birthdates })
    }
}

fn load_corpus_file(
    path: &Path,
    min_fields: usize,
) -> Result<Vec<ReferenceRecord>, ReferenceDataError> {
    let raw = fs::read_to_string(path).map_err(|source| ReferenceDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    raw.lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            ReferenceRecord::parse(line)
                .filter(|record| record.values.len() >= min_fields)
                .ok_or_else(|| ReferenceDataError::MalformedRecord {
                    path: path.to_path_buf(),
                    line: line.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn parses_valid_and_invalid_records() {
        let record = ReferenceRecord::parse("T:Jan;Müller").unwrap();
        assert!(record.valid);
        assert_eq!(record.values, vec!["Jan", "Müller"]);

        let record = ReferenceRecord::parse("F:1990-13-40").unwrap();
        assert!(!record.valid);
        assert_eq!(record.values, vec!["1990-13-40"]);
    }

    #[test]
    fn rejects_lines_without_flag() {
        assert!(ReferenceRecord::parse("no separator here").is_none());
        assert!(ReferenceRecord::parse("TT:too;long;flag").is_none());
    }

    #[test]
    fn builtin_countries_are_present() {
        let sets = ValueSets::new();
        assert_eq!(
            sets.get("countries").unwrap(),
            ["NL", "SD", "GR", "AT"].map(String::from)
        );
    }

    #[test]
    fn require_reports_missing_sets() {
        let sets = ValueSets::new();
        assert!(sets.require(&["countries"]).is_ok());
        assert!(matches!(
            sets.require(&["no-such-set"]),
            Err(ReferenceDataError::MissingValueSet(_))
        ));
    }

    #[test]
    fn sampling_covers_blank_and_all_codes() {
        let mut sets = ValueSets::new();
        sets.insert("binary", vec!["a".into(), "b".into()]);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(sets.sample_or_blank("binary", &mut rng));
        }
        assert_eq!(
            seen.into_iter().collect::<Vec<_>>(),
            ["", "a", "b"].map(String::from)
        );
    }
}
