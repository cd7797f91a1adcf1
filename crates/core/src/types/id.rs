//! Product identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a catalog product.
///
/// The catalog service may hand out identifiers as JSON strings (document
/// ids) or as JSON numbers. Both are normalised to their string form so that
/// `"42"` and `42` identify the same product.
///
/// ## Examples
///
/// ```
/// use shopfront_core::ProductId;
///
/// let from_text: ProductId = serde_json::from_str(r#""42""#).unwrap();
/// let from_number: ProductId = serde_json::from_str("42").unwrap();
/// assert_eq!(from_text, from_number);
/// assert_eq!(from_number.as_str(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawProductId", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Create an identifier from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Wire representation accepted from the catalog service.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawProductId> for ProductId {
    fn from(raw: RawProductId) -> Self {
        match raw {
            RawProductId::Text(text) => Self(text),
            RawProductId::Number(number) => Self(number.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_is_kept_verbatim() {
        let id: ProductId = serde_json::from_str(r#""65a1f0c2e4b0""#).unwrap();
        assert_eq!(id.as_str(), "65a1f0c2e4b0");
    }

    #[test]
    fn test_numeric_id_is_normalised() {
        let id: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(id, ProductId::from("7"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&ProductId::new("abc")).unwrap();
        assert_eq!(json, r#""abc""#);
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<ProductId>("[1]").is_err());
        assert!(serde_json::from_str::<ProductId>("null").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ProductId::new("sku-1").to_string(), "sku-1");
    }
}
