use std::fmt;

use serde::Serialize;

/// Longest identifier accepted from a request path.
const MAX_ID_LEN: usize = 64;

/// Validated identifier of a stored object.
///
/// NATS NUIDs (22 base62 characters) and UUID simple strings both fit the
/// accepted alphabet. Anything else never reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parses an identifier, returning `None` for malformed input.
    pub fn parse(value: &str) -> Option<Self> {
        let valid = !value.is_empty()
            && value.len() <= MAX_ID_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        valid.then(|| Self(value.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_store_identifiers() {
        assert!(ObjectId::parse("O8rAcKwWYmEdqFpj8xk2Xw").is_some());
        assert!(ObjectId::parse("01928c5a6b7e7c3d9f10aabbccddeeff").is_some());
        assert_eq!(
            ObjectId::parse("abc-123_x").map(|id| id.to_string()),
            Some("abc-123_x".to_string())
        );
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!(ObjectId::parse("").is_none());
        assert!(ObjectId::parse("../etc/passwd").is_none());
        assert!(ObjectId::parse("id with spaces").is_none());
        assert!(ObjectId::parse("{\"$ne\":null}").is_none());
        assert!(ObjectId::parse(&"a".repeat(MAX_ID_LEN + 1)).is_none());
    }
}
