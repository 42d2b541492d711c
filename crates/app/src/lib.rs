//! Product App library.
//!
//! The product micro-frontend: it lists products from a remote catalog,
//! shows one product at a time, and adds products to a cart owned by a host
//! application. When the host's cart capability cannot be reached, adds are
//! kept in a local fallback collection instead.
//!
//! # Modules
//!
//! - [`app`] - `ProductApp` composition root
//! - [`cart`] - Cart bridge, capability resolvers and host store adapters
//! - [`catalog`] - Product data source client
//! - [`config`] - Environment configuration
//! - [`error`] - Umbrella error type and Sentry helpers
//! - [`navigation`] - Catalog/detail view machine
//! - [`storage`] - Local persisted key/value store
//! - [`views`] - Display data for each screen

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod navigation;
pub mod storage;
pub mod views;

pub use app::{AddOutcome, ProductApp, Screen};
pub use error::{AppError, Result};
