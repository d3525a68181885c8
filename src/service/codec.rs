//! Encoding of structured log context.
//!
//! Context values are JSON documents. Objects are kept in sorted-key maps, so
//! equality ignores insertion order and every encoding is canonical. Numbers
//! keep their integer/fractional distinction, but a float is not guaranteed to
//! come back bit-for-bit identical after a round trip. Nesting depth is not
//! limited; deep documents grow the stack on demand while decoding.

use crate::models::error::Result;
use serde::Deserialize;

pub use serde_json::Value as StructuredValue;

/// Text shown in place of an absent (null) context.
pub const ABSENT_CONTEXT: &str = "nil";

/// Serializes a value into the canonical byte form stored in the `context` column.
pub fn encode(value: &StructuredValue) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Parses bytes produced by [`encode`]. Malformed input yields a codec error.
pub fn decode(bytes: &[u8]) -> Result<StructuredValue> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();
    let value = StructuredValue::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

/// Human-readable form for console and file output, never used for storage.
pub fn render(value: &StructuredValue) -> String {
    if value.is_null() {
        return ABSENT_CONTEXT.to_string();
    }
    value.to_string()
}
