//! Catalog product as delivered by the product service.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product offered in the catalog.
///
/// Products are immutable once fetched. The wire format names the
/// identifier `_id`; `id` is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URL, if the catalog provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_parse_catalog_entry() {
        let product: Product = serde_json::from_str(
            r#"{"_id":"p1","name":"Mug","price":12.5,"image":"https://img/mug.png","stock":4}"#,
        )
        .unwrap();

        assert_eq!(product.id, ProductId::from("p1"));
        assert_eq!(product.name, "Mug");
        assert_eq!(product.price.amount(), Decimal::new(125, 1));
        assert_eq!(product.image.as_deref(), Some("https://img/mug.png"));
    }

    #[test]
    fn test_parse_with_id_alias_and_no_image() {
        let product: Product =
            serde_json::from_str(r#"{"id":3,"name":"Tea","price":"4.00"}"#).unwrap();
        assert_eq!(product.id.as_str(), "3");
        assert!(product.image.is_none());
    }

    #[test]
    fn test_negative_price_is_invalid() {
        let result = serde_json::from_str::<Product>(r#"{"_id":"x","name":"Bad","price":-2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_session_round_trip_keeps_identity() {
        let product: Product =
            serde_json::from_str(r#"{"_id":9,"name":"Pen","price":1.25}"#).unwrap();
        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product);
    }
}
