//! Core types for Product App.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod cart;
pub mod id;
pub mod navigation;
pub mod price;
pub mod product;

pub use cart::{CartAction, CartItem, CartItemPayload, CartState, PayloadError, TotalsOverflow};
pub use id::*;
pub use navigation::NavigationState;
pub use price::Price;
pub use product::{Product, Rating};
