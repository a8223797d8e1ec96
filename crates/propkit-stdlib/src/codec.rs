//! Binary-to-text codecs
//!
//! Base32 (RFC 4648) in the standard and extended-hex alphabets, Base64 in
//! the standard and URL-safe alphabets (all padded), and hexadecimal.

use base64::Engine;
use thiserror::Error;

/// Decoding failures
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    /// Input is not valid for the codec
    #[error("{codec}: invalid input: {message}")]
    InvalidInput {
        /// Codec name
        codec: &'static str,
        /// Decoder message
        message: String,
    },
}

/// Supported codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// RFC 4648 Base32
    Base32,
    /// RFC 4648 Base32 with the extended hex alphabet
    Base32Hex,
    /// RFC 4648 Base64
    Base64,
    /// RFC 4648 Base64 with the URL and filename safe alphabet
    Base64Url,
    /// Lower-case hexadecimal
    Hex,
    /// Upper-case hexadecimal
    HexUpper,
}

impl Codec {
    /// Codec name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            Codec::Base32 => "base32",
            Codec::Base32Hex => "base32hex",
            Codec::Base64 => "base64",
            Codec::Base64Url => "base64url",
            Codec::Hex => "hex",
            Codec::HexUpper => "hex-upper",
        }
    }

    /// Encode bytes to text
    pub fn encode(self, data: &[u8]) -> String {
        match self {
            Codec::Base32 => data_encoding::BASE32.encode(data),
            Codec::Base32Hex => data_encoding::BASE32HEX.encode(data),
            Codec::Base64 => base64::engine::general_purpose::STANDARD.encode(data),
            Codec::Base64Url => base64::engine::general_purpose::URL_SAFE.encode(data),
            Codec::Hex => hex::encode(data),
            Codec::HexUpper => hex::encode_upper(data),
        }
    }

    /// Decode text to bytes
    ///
    /// Hex decoding accepts either case regardless of the variant.
    pub fn decode(self, input: &str) -> Result<Vec<u8>, CodecError> {
        let result = match self {
            Codec::Base32 => data_encoding::BASE32
                .decode(input.as_bytes())
                .map_err(|e| e.to_string()),
            Codec::Base32Hex => data_encoding::BASE32HEX
                .decode(input.as_bytes())
                .map_err(|e| e.to_string()),
            Codec::Base64 => base64::engine::general_purpose::STANDARD
                .decode(input)
                .map_err(|e| e.to_string()),
            Codec::Base64Url => base64::engine::general_purpose::URL_SAFE
                .decode(input)
                .map_err(|e| e.to_string()),
            Codec::Hex | Codec::HexUpper => hex::decode(input).map_err(|e| e.to_string()),
        };
        result.map_err(|message| CodecError::InvalidInput {
            codec: self.name(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4648_vectors() {
        assert_eq!(Codec::Base32.encode(b"foobar"), "MZXW6YTBOI======");
        assert_eq!(Codec::Base32Hex.encode(b"foobar"), "CPNMUOJ1E8======");
        assert_eq!(Codec::Base64.encode(b"foobar"), "Zm9vYmFy");
        assert_eq!(Codec::Base64.encode(b"fo"), "Zm8=");
        assert_eq!(Codec::Hex.encode(b"foobar"), "666f6f626172");
        assert_eq!(Codec::HexUpper.encode(&[0xab, 0xcd]), "ABCD");
    }

    #[test]
    fn test_url_safe_alphabet() {
        let data = [0xfb, 0xff, 0xbf];
        assert_eq!(Codec::Base64.encode(&data), "+/+/");
        assert_eq!(Codec::Base64Url.encode(&data), "-_-_");
        assert_eq!(Codec::Base64Url.decode("-_-_").unwrap(), data);
    }

    #[test]
    fn test_hex_decode_ignores_case() {
        assert_eq!(Codec::Hex.decode("ABcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(Codec::HexUpper.decode("abcd").unwrap(), vec![0xab, 0xcd]);
    }

    #[test]
    fn test_decode_errors_name_codec() {
        let err = Codec::Base32.decode("not base32!").unwrap_err();
        assert!(err.to_string().starts_with("base32:"));

        assert!(Codec::Base64.decode("-_-_").is_err());
        assert!(Codec::Hex.decode("abc").is_err());
        assert!(Codec::Hex.decode("zz").is_err());
    }

    #[test]
    fn test_empty_input() {
        for codec in [Codec::Base32, Codec::Base64, Codec::Hex] {
            assert_eq!(codec.encode(&[]), "");
            assert_eq!(codec.decode("").unwrap(), Vec::<u8>::new());
        }
    }
}
