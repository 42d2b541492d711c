//! Product listing view.

use std::fmt;

use product_app_core::{Product, ProductId};

use crate::catalog::CatalogError;

/// One selectable product in the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub title: String,
    pub category: String,
    pub price: String,
    pub rating: String,
    pub image: String,
}

impl From<&Product> for CatalogEntry {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            rating: product
                .rating
                .map_or_else(|| "N/A".to_string(), |rating| rating.rate.to_string()),
            image: product.image.clone(),
        }
    }
}

/// The product listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogView {
    #[default]
    Loading,
    Loaded(Vec<CatalogEntry>),
}

impl CatalogView {
    /// Build the view from a catalog fetch.
    ///
    /// A failed fetch shows as an empty listing.
    #[must_use]
    pub fn from_fetch(result: &Result<Vec<Product>, CatalogError>) -> Self {
        match result {
            Ok(products) => Self::Loaded(products.iter().map(CatalogEntry::from).collect()),
            Err(_) => Self::Loaded(Vec::new()),
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Selectable entries; empty while loading.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        match self {
            Self::Loading => &[],
            Self::Loaded(entries) => entries,
        }
    }
}

impl fmt::Display for CatalogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => writeln!(f, "Loading products..."),
            Self::Loaded(entries) if entries.is_empty() => writeln!(f, "No products"),
            Self::Loaded(entries) => {
                writeln!(f, "Products")?;
                for entry in entries {
                    writeln!(
                        f,
                        "[{:>3}] {} | {} | {} | ⭐ {}",
                        entry.id.as_i32(),
                        entry.title,
                        entry.category,
                        entry.price,
                        entry.rating
                    )?;
                }
                Ok(())
            }
        }
    }
}
