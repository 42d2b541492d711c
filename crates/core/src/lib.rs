//! Product App Core - Shared types library.
//!
//! This crate provides the data contracts shared by every Product App component:
//! - `product-app` - Catalog client, cart bridge, navigation and views
//! - `product-app-cli` - Command-line front end driving the app
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O, no
//! HTTP clients, no storage. This keeps it lightweight and allows both the
//! product app and a host application to share the same cart shapes.
//!
//! # Modules
//!
//! - [`types`] - Product and cart records, type-safe IDs, prices, and navigation state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
