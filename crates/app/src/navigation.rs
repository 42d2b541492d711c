//! Two-state view machine.
//!
//! ```text
//!            select_product(id)
//!   Catalog --------------------> ProductDetail { id }
//!      ^                                |
//!      +-------------- go_back ---------+
//! ```
//!
//! Selection is only valid from `Catalog` and only for ids that appeared in
//! the last successfully loaded catalog. The controller tracks no loading or
//! error state.

use std::collections::HashSet;

use product_app_core::{NavigationState, ProductId};
use thiserror::Error;

/// Navigation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("product {0} is not in the loaded catalog")]
    UnknownProduct(ProductId),

    #[error("cannot select product {requested} while product {current} is shown")]
    InvalidTransition {
        current: ProductId,
        requested: ProductId,
    },
}

/// Outcome of a navigation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The active state changed.
    Moved { from: NavigationState, to: NavigationState },
    /// The event was a no-op in the current state.
    Unchanged(NavigationState),
}

impl Transition {
    #[must_use]
    pub const fn state(&self) -> NavigationState {
        match self {
            Self::Moved { to, .. } => *to,
            Self::Unchanged(state) => *state,
        }
    }

    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Owns the active [`NavigationState`].
#[derive(Debug, Default)]
pub struct NavigationController {
    state: NavigationState,
    selectable: HashSet<ProductId>,
}

impl NavigationController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> NavigationState {
        self.state
    }

    /// Replace the set of selectable ids with those of a loaded catalog.
    ///
    /// The active state is left alone.
    pub fn register_catalog(&mut self, ids: impl IntoIterator<Item = ProductId>) {
        self.selectable = ids.into_iter().collect();
    }

    #[must_use]
    pub fn is_selectable(&self, id: ProductId) -> bool {
        self.selectable.contains(&id)
    }

    /// Move from the catalog to a product's detail view.
    ///
    /// Selecting the product already shown is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProduct` if the id was not in the loaded catalog, or
    /// `InvalidTransition` if a different product is currently shown.
    pub fn select_product(&mut self, id: ProductId) -> Result<Transition, NavigationError> {
        match self.state {
            NavigationState::ProductDetail { product_id } if product_id == id => {
                Ok(Transition::Unchanged(self.state))
            }
            NavigationState::ProductDetail { product_id } => {
                Err(NavigationError::InvalidTransition {
                    current: product_id,
                    requested: id,
                })
            }
            NavigationState::Catalog => {
                if !self.is_selectable(id) {
                    return Err(NavigationError::UnknownProduct(id));
                }
                Ok(self.move_to(NavigationState::ProductDetail { product_id: id }))
            }
        }
    }

    /// Return to the catalog, clearing the selected id.
    pub fn go_back(&mut self) -> Transition {
        if self.state.is_catalog() {
            Transition::Unchanged(self.state)
        } else {
            self.move_to(NavigationState::Catalog)
        }
    }

    fn move_to(&mut self, to: NavigationState) -> Transition {
        let from = std::mem::replace(&mut self.state, to);
        tracing::debug!(?from, ?to, "Navigation");
        Transition::Moved { from, to }
    }
}
