//! Arena-backed decoding
//!
//! Gateway payloads arrive as generic JSON values. [`Decode`] turns one into a
//! typed entity whose strings live in an [`Arena`], so the decoded object's
//! storage is bounded by the scope it was decoded in.

mod fields;

pub(crate) use fields::Fields;

use crate::error::DecodeError;
use crate::memory::Arena;
use serde_json::Value;

/// Materialize a typed entity from a JSON value into arena storage
pub trait Decode: Sized {
    fn decode(value: &Value, arena: &mut Arena) -> Result<Self, DecodeError>;
}

/// Decode `value` inside `arena`
pub fn decode<T: Decode>(value: &Value, arena: &mut Arena) -> Result<T, DecodeError> {
    T::decode(value, arena)
}
