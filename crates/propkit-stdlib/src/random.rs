//! Random string generation
//!
//! Characters are drawn uniformly from the thread-local RNG.

use rand::Rng;
use thiserror::Error;

const ALPHABETIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const NUMERIC: &str = "0123456789";
const HEX: &str = "0123456789abcdef";

/// Random string errors
#[derive(Debug, Error, PartialEq)]
pub enum RandomError {
    /// The alphabet to draw from has no characters
    #[error("alphabet is empty")]
    EmptyAlphabet,
}

/// Letters and digits
pub fn alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// ASCII letters
pub fn alphabetic(len: usize) -> String {
    draw(ALPHABETIC.as_bytes(), len)
}

/// Decimal digits
pub fn numeric(len: usize) -> String {
    draw(NUMERIC.as_bytes(), len)
}

/// Lower-case hexadecimal digits
pub fn hex(len: usize) -> String {
    draw(HEX.as_bytes(), len)
}

/// Characters of `alphabet`, each equally likely
pub fn from_alphabet(alphabet: &str, len: usize) -> Result<String, RandomError> {
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() {
        return Err(RandomError::EmptyAlphabet);
    }
    let mut rng = rand::thread_rng();
    Ok((0..len)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect())
}

fn draw(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_and_alphabets() {
        let s = alphanumeric(64);
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));

        assert!(alphabetic(40).chars().all(|c| c.is_ascii_alphabetic()));
        assert!(numeric(40).chars().all(|c| c.is_ascii_digit()));
        assert!(hex(40)
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(numeric(0), "");
    }

    #[test]
    fn test_from_alphabet() {
        let s = from_alphabet("αβ", 20).unwrap();
        assert_eq!(s.chars().count(), 20);
        assert!(s.chars().all(|c| c == 'α' || c == 'β'));

        assert_eq!(from_alphabet("x", 3).unwrap(), "xxx");
        assert_eq!(from_alphabet("", 3), Err(RandomError::EmptyAlphabet));
    }
}
