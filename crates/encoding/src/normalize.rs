//! Machine-readable name normalization.
//!
//! Produces the travel-document style transliteration (`fnt`/`gnt`
//! fields) used by verifiers for automated name matching.

use deunicode::deunicode;

/// Normalizes a human-readable name to its machine-readable form.
///
/// Transliterates to the base Latin alphabet, uppercases, replaces
/// every run of whitespace with a single `<`, and strips everything
/// outside `[A-Z<]`. The result is idempotent under re-normalization.
pub fn mrz(name: &str) -> String {
    let transliterated = deunicode(name).to_uppercase();
    let mut out = String::with_capacity(transliterated.len());
    let mut in_whitespace = false;
    for c in transliterated.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('<');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            if c.is_ascii_uppercase() || c == '<' {
                out.push(c);
            }
        }
    }
    out
}
