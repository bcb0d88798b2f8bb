//! Typed field access over a JSON object

use crate::error::DecodeError;
use crate::memory::{Arena, ArenaStr};
use serde_json::{Map, Value};

/// Borrowed view of a JSON object being decoded.
///
/// Absent and `null` fields are both treated as missing.
pub(crate) struct Fields<'v> {
    map: &'v Map<String, Value>,
}

impl<'v> Fields<'v> {
    pub(crate) fn of(value: &'v Value, entity: &'static str) -> Result<Self, DecodeError> {
        value
            .as_object()
            .map(|map| Self { map })
            .ok_or(DecodeError::ExpectedObject(entity))
    }

    fn present(&self, key: &str) -> Option<&'v Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn opt_str(
        &self,
        key: &'static str,
        arena: &mut Arena,
    ) -> Result<Option<ArenaStr>, DecodeError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(arena.alloc_str(s)?)),
            Some(_) => Err(DecodeError::InvalidField {
                field: key,
                expected: "string",
            }),
        }
    }

    pub(crate) fn str(&self, key: &'static str, arena: &mut Arena) -> Result<ArenaStr, DecodeError> {
        self.opt_str(key, arena)?.ok_or(DecodeError::MissingField(key))
    }

    pub(crate) fn opt_bool(&self, key: &'static str) -> Result<Option<bool>, DecodeError> {
        match self.present(key) {
            None => Ok(None),
            Some(v) => v.as_bool().map(Some).ok_or(DecodeError::InvalidField {
                field: key,
                expected: "boolean",
            }),
        }
    }

    pub(crate) fn bool_or_false(&self, key: &'static str) -> Result<bool, DecodeError> {
        self.opt_bool(key).map(Option::unwrap_or_default)
    }

    pub(crate) fn opt_i64(&self, key: &'static str) -> Result<Option<i64>, DecodeError> {
        match self.present(key) {
            None => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or(DecodeError::InvalidField {
                field: key,
                expected: "integer",
            }),
        }
    }

    pub(crate) fn opt_object(&self, key: &'static str) -> Option<&'v Value> {
        self.present(key)
    }
}
