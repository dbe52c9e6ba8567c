//! Fixed-width hex decoding shared by the byte-array newtypes.
//!
//! Accepts upper or lower case and an optional `0x` prefix. Leading and
//! trailing whitespace is ignored.

use crate::error::FieldError;

/// Decode exactly `N` bytes from `hex`.
pub fn decode_array<const N: usize>(hex: &str) -> Result<[u8; N], FieldError> {
    let hex = hex.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.len() != N * 2 {
        return Err(FieldError::InvalidHex(format!(
            "expected {} hex chars, got {}",
            N * 2,
            hex.len()
        )));
    }
    let mut out = [0u8; N];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let s = std::str::from_utf8(chunk)
            .map_err(|e| FieldError::InvalidHex(format!("bad digit at {}: {e}", i * 2)))?;
        out[i] = u8::from_str_radix(s, 16)
            .map_err(|e| FieldError::InvalidHex(format!("bad digit at {}: {e}", i * 2)))?;
    }
    Ok(out)
}

/// Lowercase hex rendering.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
