//! View state derived for display.
//!
//! Views are plain data: they hold what a renderer needs (formatted prices,
//! control labels, loading flags) and implement `Display` as a text
//! rendering for the command-line front end. Layout and styling belong to
//! whatever renders them.

mod cart;
mod catalog;
mod detail;

pub use cart::{CartItemView, CartView};
pub use catalog::{CatalogEntry, CatalogView};
pub use detail::{AddControl, AddGuard, DetailState, DetailView};
