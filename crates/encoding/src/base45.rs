//! Base45 codec as specified by [RFC 9285].
//!
//! Base45 maps arbitrary bytes onto a 45-character alphabet that is a
//! subset of the QR alphanumeric mode character set, which is what
//! makes the encoded certificate cheap to carry in a QR code. Two
//! bytes become three characters; a single trailing byte becomes two.
//!
//! [RFC 9285]: <https://datatracker.ietf.org/doc/html/rfc9285>

const ALPHABET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Base45DecodeError {
    #[error("character `{0}` is not in the base45 alphabet")]
    InvalidCharacter(char),

    #[error("dangling character at end of base45 input")]
    TruncatedInput,

    #[error("base45 group decodes to a value out of range")]
    ValueOutOfRange,
}

/// Encodes `data` into its Base45 text form.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() / 2 * 3 + 2);
    let mut chunks = data.chunks_exact(2);
    for pair in &mut chunks {
        let n = u32::from(pair[0]) * 256 + u32::from(pair[1]);
        out.push(ALPHABET[(n % 45) as usize] as char);
        out.push(ALPHABET[(n / 45 % 45) as usize] as char);
        out.push(ALPHABET[(n / (45 * 45)) as usize] as char);
    }
    if let [b] = chunks.remainder() {
        let n = u32::from(*b);
        out.push(ALPHABET[(n % 45) as usize] as char);
        out.push(ALPHABET[(n / 45) as usize] as char);
    }
    out
}

/// Decodes a Base45 string back into bytes.
///
/// Rejects characters outside the alphabet, inputs of length
/// `3n + 1`, and groups that decode to more than two bytes (or more
/// than one byte for a trailing pair).
pub fn decode(text: &str) -> Result<Vec<u8>, Base45DecodeError> {
    let digits = text
        .chars()
        .map(|c| {
            digit(c)
                .map(u32::from)
                .ok_or(Base45DecodeError::InvalidCharacter(c))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = Vec::with_capacity(digits.len() / 3 * 2 + 1);
    let mut groups = digits.chunks_exact(3);
    for group in &mut groups {
        let n = group[0] + group[1] * 45 + group[2] * 45 * 45;
        if n > 0xFFFF {
            return Err(Base45DecodeError::ValueOutOfRange);
        }
        out.push((n / 256) as u8);
        out.push((n % 256) as u8);
    }
    match groups.remainder() {
        [] => {}
        [c, d] => {
            let n = c + d * 45;
            if n > 0xFF {
                return Err(Base45DecodeError::ValueOutOfRange);
            }
            out.push(n as u8);
        }
        _ => return Err(Base45DecodeError::TruncatedInput),
    }
    Ok(out)
}

fn digit(c: char) -> Option<u8> {
    ALPHABET.iter().position(|&a| a as char == c).map(|i| i as u8)
}
