use thiserror::Error;

use crate::der::Coordinate;

/// Errors raised while decoding or re-encoding signature material.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes are not a DER `SEQUENCE` of INTEGERs this codec understands.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
    /// The DER sequence did not hold exactly two INTEGERs.
    #[error("expected 2 ASN.1 sequence elements, found {found}")]
    UnexpectedElementCount {
        /// Number of INTEGER elements found.
        found: usize,
    },
    /// A coordinate does not fit the curve's aligned field width.
    #[error("invalid {coordinate} coordinate length {length}")]
    InvalidCoordinateLength {
        /// Which coordinate failed.
        coordinate: Coordinate,
        /// Byte length after normalization.
        length: usize,
    },
    /// A dot-joined string had the wrong number of fields.
    #[error("expected {expected} dot-separated fields, found {found}")]
    WrongPartCount {
        /// Required number of fields.
        expected: usize,
        /// Number of fields present.
        found: usize,
    },
    /// A field was not valid base64.
    #[error("invalid base64 in {field}: {source}")]
    Base64 {
        /// Field being decoded.
        field: &'static str,
        /// Underlying decoder error.
        #[source]
        source: base64::DecodeError,
    },
    /// Decoded bytes were expected to be UTF-8 text.
    #[error("invalid UTF-8 in {field}")]
    Utf8 {
        /// Field being decoded.
        field: &'static str,
    },
    /// Client data JSON could not be parsed.
    #[error("invalid client data: {0}")]
    ClientData(#[from] serde_json::Error),
}
