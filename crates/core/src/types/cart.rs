//! Cart records shared with the host application's cart store.
//!
//! Two shapes exist on purpose:
//!
//! - [`CartItemPayload`] - `{ id, name, price, image }`, the body of an "add"
//!   action and the shape of every entry in the local fallback collection.
//!   It carries no quantity.
//! - [`CartItem`] - a line in the shared store, one per distinct product,
//!   with a quantity that increments on repeated adds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Errors validating a cart payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("cart item {0} has an empty name")]
    EmptyName(ProductId),
    #[error("cart item {0} has a negative price")]
    NegativePrice(ProductId),
}

/// Cart totals do not fit their numeric types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cart totals overflow")]
pub struct TotalsOverflow;

/// The item shape carried by an "add" mutation and stored by the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemPayload {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
}

impl CartItemPayload {
    /// Check the payload is something a store can accept.
    ///
    /// # Errors
    ///
    /// Returns `PayloadError` if the name is blank or the price is negative.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.name.trim().is_empty() {
            return Err(PayloadError::EmptyName(self.id));
        }
        if self.price.is_negative() {
            return Err(PayloadError::NegativePrice(self.id));
        }
        Ok(())
    }
}

impl From<&Product> for CartItemPayload {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

/// A mutation dispatchable into the shared cart store.
///
/// Serialized in the host's action format:
/// `{"type": "cart/addToCart", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CartAction {
    #[serde(rename = "cart/addToCart")]
    Add(CartItemPayload),
    #[serde(rename = "cart/removeFromCart")]
    Remove(ProductId),
}

impl CartAction {
    /// The product the action targets.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::Add(item) => item.id,
            Self::Remove(id) => *id,
        }
    }
}

/// A line in the shared cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Snapshot of a cart: ordered lines plus derived totals.
///
/// Totals are private and always recomputed from `items`; a snapshot
/// deserialized from a host with drifting totals is corrected on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCartState")]
pub struct CartState {
    items: Vec<CartItem>,
    total_quantity: u32,
    total_price: Price,
}

#[derive(Deserialize)]
struct RawCartState {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl TryFrom<RawCartState> for CartState {
    type Error = TotalsOverflow;

    fn try_from(raw: RawCartState) -> Result<Self, Self::Error> {
        Self::from_items(raw.items)
    }
}

impl CartState {
    /// Build a state from lines, computing the totals.
    ///
    /// Lines with a zero quantity are dropped.
    ///
    /// # Errors
    ///
    /// Returns `TotalsOverflow` if the total quantity or price does not fit.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, TotalsOverflow> {
        let items: Vec<CartItem> = items.into_iter().filter(|item| item.quantity > 0).collect();
        let (total_quantity, total_price) = totals(&items).ok_or(TotalsOverflow)?;
        Ok(Self {
            items,
            total_quantity,
            total_price,
        })
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of all line quantities.
    #[must_use]
    pub const fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        self.total_price
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of a product in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map_or(0, |item| item.quantity)
    }

    /// Add one unit of an item, merging into an existing line.
    ///
    /// Returns `false` and leaves the cart unchanged if the totals would
    /// overflow.
    pub fn add_item(&mut self, payload: CartItemPayload) -> bool {
        let line = self.items.iter().position(|item| item.id == payload.id);
        // A merged unit is charged at the line's existing price
        let unit_price = line
            .and_then(|pos| self.items.get(pos))
            .map_or(payload.price, |item| item.price);
        let (Some(total_quantity), Some(total_price)) = (
            self.total_quantity.checked_add(1),
            self.total_price.checked_add(unit_price),
        ) else {
            return false;
        };

        match line.and_then(|pos| self.items.get_mut(pos)) {
            // Cannot overflow: the line is part of a total that still fits
            Some(item) => item.quantity += 1,
            None => self.items.push(CartItem {
                id: payload.id,
                name: payload.name,
                price: payload.price,
                image: payload.image,
                quantity: 1,
            }),
        }
        self.total_quantity = total_quantity;
        self.total_price = total_price;
        true
    }

    /// Remove one unit of a product, dropping the line when it reaches zero.
    ///
    /// Returns `false` if the product was not in the cart.
    pub fn remove_one(&mut self, id: ProductId) -> bool {
        let Some(pos) = self.items.iter().position(|item| item.id == id) else {
            return false;
        };
        if let Some(line) = self.items.get_mut(pos) {
            line.quantity = line.quantity.saturating_sub(1);
            if line.quantity == 0 {
                self.items.remove(pos);
            }
        }
        // Removing a unit only shrinks totals that already fit
        if let Some((total_quantity, total_price)) = totals(&self.items) {
            self.total_quantity = total_quantity;
            self.total_price = total_price;
        }
        true
    }

    /// Apply an action the way the reference host reducer does.
    ///
    /// Returns `false` when the action changed nothing.
    pub fn apply(&mut self, action: CartAction) -> bool {
        match action {
            CartAction::Add(item) => self.add_item(item),
            CartAction::Remove(id) => self.remove_one(id),
        }
    }
}

/// Total quantity and price of `items`, `None` on overflow.
fn totals(items: &[CartItem]) -> Option<(u32, Price)> {
    items
        .iter()
        .try_fold((0_u32, Price::ZERO), |(quantity, price), item| {
            Some((
                quantity.checked_add(item.quantity)?,
                price.checked_add(item.price.checked_times(item.quantity)?)?,
            ))
        })
}
