//! Product records as served by the product data source.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A catalog product.
///
/// Immutable once fetched. Unknown fields in the source payload are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
    /// Category name (e.g., "men's clothing").
    #[serde(default)]
    pub category: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Aggregate review rating, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

/// Aggregate review rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating (e.g., 3.9).
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    /// Number of reviews.
    pub count: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_source_payload() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 109.95,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://example.com/81fPKd-2AYL.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(10995));
        assert_eq!(product.category, "men's clothing");

        let rating = product.rating.unwrap();
        assert_eq!(rating.rate, Decimal::new(39, 1));
        assert_eq!(rating.count, 120);
    }

    #[test]
    fn test_rating_is_optional() {
        let json = r#"{"id": 7, "title": "Shirt", "price": 19.99, "image": "shirt.png"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.rating.is_none());
        assert!(product.description.is_empty());
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let json = r#"{"id": 7, "price": 19.99, "image": "shirt.png"}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }
}
