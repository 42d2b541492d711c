//! Cart display data.

use std::fmt;

use product_app_core::{CartItem, CartState};

/// Cart item display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: i32,
    pub title: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl Default for CartView {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartState> for CartView {
    fn from(state: &CartState) -> Self {
        Self {
            items: state.items().iter().map(CartItemView::from).collect(),
            subtotal: state.total_price().to_string(),
            item_count: state.total_quantity(),
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.as_i32(),
            title: item.name.clone(),
            quantity: item.quantity,
            price: item.price.to_string(),
            line_price: item.line_price().to_string(),
            image: item.image.clone(),
        }
    }
}

impl fmt::Display for CartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(f, "Your cart is empty");
        }
        for item in &self.items {
            writeln!(
                f,
                "{:>3} x {} @ {} = {}",
                item.quantity, item.title, item.price, item.line_price
            )?;
        }
        writeln!(f, "{} item(s), subtotal {}", self.item_count, self.subtotal)
    }
}

#[cfg(test)]
mod tests {
    use product_app_core::{CartItemPayload, Price, ProductId};

    use super::*;

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&CartState::default());
        assert_eq!(view, CartView::empty());
        assert_eq!(view.to_string(), "Your cart is empty\n");
    }

    #[test]
    fn test_cart_view_formats_prices() {
        let mut state = CartState::default();
        for _ in 0..3 {
            state.add_item(CartItemPayload {
                id: ProductId::new(7),
                name: "Shirt".to_string(),
                price: Price::from_cents(1999),
                image: "shirt.png".to_string(),
            });
        }

        let view = CartView::from(&state);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$59.97");
        assert_eq!(view.items.len(), 1);

        let rendered = view.to_string();
        assert!(rendered.contains("3 x Shirt @ $19.99 = $59.97"));
        assert!(rendered.contains("3 item(s), subtotal $59.97"));
    }
}
