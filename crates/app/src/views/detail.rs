//! Single-product view and its add-to-cart control.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use product_app_core::{Product, ProductId};

use crate::catalog::CatalogError;

/// Whether the detail view's product has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Loaded(Box<Product>),
    NotFound,
}

impl DetailState {
    /// Build the state from a product fetch. Any failure shows as not found.
    #[must_use]
    pub fn from_fetch(result: Result<Product, CatalogError>) -> Self {
        match result {
            Ok(product) => Self::Loaded(Box::new(product)),
            Err(e) => {
                tracing::debug!(error = %e, "Product fetch failed");
                Self::NotFound
            }
        }
    }

    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        match self {
            Self::Loaded(product) => Some(product),
            Self::Loading | Self::NotFound => None,
        }
    }
}

/// Snapshot of the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub product_id: ProductId,
    pub state: DetailState,
    pub quantity_in_cart: u32,
    /// An add for this view is in flight; the add control is disabled.
    pub adding: bool,
}

impl DetailView {
    /// Label of the add control.
    #[must_use]
    pub const fn add_label(&self) -> &'static str {
        if self.adding { "Adding..." } else { "Add to Cart" }
    }

    /// The remove control is only offered for products already in the cart.
    #[must_use]
    pub const fn can_remove(&self) -> bool {
        self.quantity_in_cart > 0
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "← Back to Products")?;
        let product = match &self.state {
            DetailState::Loading => return writeln!(f, "Loading product details..."),
            DetailState::NotFound => return writeln!(f, "Product not found"),
            DetailState::Loaded(product) => product,
        };

        writeln!(f, "{}", product.title)?;
        if !product.category.is_empty() {
            writeln!(f, "[{}]", product.category)?;
        }
        if !product.description.is_empty() {
            writeln!(f, "{}", product.description)?;
        }
        match product.rating {
            Some(rating) => writeln!(
                f,
                "{}  ⭐ {} ({} reviews)",
                product.price, rating.rate, rating.count
            )?,
            None => writeln!(f, "{}", product.price)?,
        }

        write!(f, "[{}]", self.add_label())?;
        if self.can_remove() {
            write!(f, " [Remove from Cart]")?;
        }
        writeln!(f)?;
        if self.can_remove() {
            writeln!(f, "✓ {} of this item in your cart", self.quantity_in_cart)?;
        }
        Ok(())
    }
}

/// Disables the add control while an add is in flight.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct AddControl {
    in_flight: Arc<AtomicBool>,
}

impl AddControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the control. Returns `None` if an add is already in flight.
    ///
    /// The control is released when the returned guard drops, whichever way
    /// the add finished.
    #[must_use]
    pub fn try_begin(&self) -> Option<AddGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| AddGuard {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Holds the add control disabled until dropped.
#[derive(Debug)]
pub struct AddGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for AddGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn backpack() -> Product {
        serde_json::from_str(
            r#"{"id": 1, "title": "Backpack", "price": 109.95, "category": "bags",
                "description": "Fits a laptop", "image": "a.png", "rating": {"rate": 3.9, "count": 120}}"#,
        )
        .unwrap()
    }

    fn view(state: DetailState, quantity_in_cart: u32, adding: bool) -> DetailView {
        DetailView {
            product_id: ProductId::new(1),
            state,
            quantity_in_cart,
            adding,
        }
    }

    #[test]
    fn test_failed_fetch_is_not_found() {
        let state = DetailState::from_fetch(Err(CatalogError::ProductNotFound(ProductId::new(1))));
        assert_eq!(state, DetailState::NotFound);
        assert!(state.product().is_none());
    }

    #[test]
    fn test_loading_and_not_found_rendering() {
        assert!(view(DetailState::Loading, 0, false)
            .to_string()
            .contains("Loading product details..."));
        assert!(view(DetailState::NotFound, 0, false)
            .to_string()
            .contains("Product not found"));
    }

    #[test]
    fn test_loaded_rendering_without_cart_quantity() {
        let rendered = view(DetailState::from_fetch(Ok(backpack())), 0, false).to_string();

        assert!(rendered.contains("Backpack"));
        assert!(rendered.contains("[bags]"));
        assert!(rendered.contains("$109.95  ⭐ 3.9 (120 reviews)"));
        assert!(rendered.contains("[Add to Cart]"));
        assert!(!rendered.contains("Remove from Cart"));
        assert!(!rendered.contains("in your cart"));
    }

    #[test]
    fn test_loaded_rendering_with_cart_quantity_and_add_in_flight() {
        let detail = view(DetailState::from_fetch(Ok(backpack())), 2, true);
        assert!(detail.can_remove());

        let rendered = detail.to_string();
        assert!(rendered.contains("[Adding...] [Remove from Cart]"));
        assert!(rendered.contains("✓ 2 of this item in your cart"));
    }

    #[test]
    fn test_add_control_is_exclusive_until_guard_drops() {
        let control = AddControl::new();
        let clone = control.clone();

        let guard = control.try_begin().unwrap();
        assert!(control.is_busy());
        assert!(clone.try_begin().is_none());

        drop(guard);
        assert!(!clone.is_busy());
        assert!(clone.try_begin().is_some());
    }
}
