//! Signature wire formats for rootsig.
//!
//! Platform authenticators emit ECDSA signatures as DER `SEQUENCE { r, s }`
//! with variable-length, sign-extended integers, while raw verification APIs
//! expect fixed-width `r || s`. This crate owns that conversion plus the
//! dot-joined base64 strings that carry signatures between parties:
//!
//! - compact signatures: `authenticatorData.clientDataJSON.signature`
//! - chained signatures: `tempPublicKey.rootEndorsement.messageSignature`
//!
//! Nothing here performs cryptography; it only moves bytes between shapes.
//!
#![deny(missing_docs)]

/// Client data JSON emitted by authenticators.
pub mod client_data;
/// Compact and chained signature strings.
pub mod compact;
/// DER <-> fixed-width ECDSA signature conversion.
pub mod der;
/// Base64 helpers shared by every wire field.
pub mod encoding;
/// Codec error type.
pub mod error;

pub use client_data::{ClientData, CEREMONY_CREATE, CEREMONY_GET};
pub use compact::{ChainedSignature, CompactSignature};
pub use der::{compact_to_der, der_to_compact, Coordinate, CoordinateLayout};
pub use encoding::{from_base64, from_base64_canonical, to_base64, to_base64url};
pub use error::CodecError;
