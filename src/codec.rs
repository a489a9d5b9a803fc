//! Hex encoding of binary fields
//!
//! Every binary field of a bundle travels as lowercase hex. Decoding is
//! strict: odd lengths and non-hex characters are rejected rather than
//! truncated.

use crate::error::{ErrorCategory, ErrorKind, Result, WeakryptError};

/// Encode bytes as a lowercase hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string into bytes.
///
/// Upper-case digits are accepted. Fails with
/// [`ErrorKind::MalformedBundle`] on odd length or any non-hex character.
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    hex::decode(hex_str).map_err(|e| {
        WeakryptError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedBundle,
            format!("hex decoding failed: {}", e),
            e,
        )
    })
}

/// Decode a hex field that must hold exactly `N` bytes.
pub(crate) fn hex_to_array<const N: usize>(hex_str: &str, field: &str) -> Result<[u8; N]> {
    let bytes = hex_to_bytes(hex_str).map_err(|e| e.with_context(format!("invalid {}", field)))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| WeakryptError::malformed(format!("{} must be {} bytes, got {}", field, N, len)))
}
