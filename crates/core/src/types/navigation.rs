//! Which product view is active.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// The active view. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum NavigationState {
    /// Full product listing.
    #[default]
    Catalog,
    /// Single-product view.
    ProductDetail { product_id: ProductId },
}

impl NavigationState {
    /// The selected product, if a detail view is active.
    #[must_use]
    pub const fn selected_product(&self) -> Option<ProductId> {
        match self {
            Self::Catalog => None,
            Self::ProductDetail { product_id } => Some(*product_id),
        }
    }

    #[must_use]
    pub const fn is_catalog(&self) -> bool {
        matches!(self, Self::Catalog)
    }
}
