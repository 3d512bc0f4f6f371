//! Tienda - storefront and catalog admin service
//!
//! Public catalog with a per-session cart and WhatsApp checkout, plus an
//! admin surface that edits products held by a remote spreadsheet script.
//!
//! ## Features
//! - Catalog loading from a static JSON feed, name search
//! - Size options derived from each product's size descriptor
//! - Cart keyed by (product, size) with COP totals
//! - Checkout flow ending in a `wa.me` deep link
//! - Product CRUD and image upload through the remote script

pub mod admin;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod routes;
pub mod state;

pub use catalog::{Catalog, CatalogSource};
pub use config::Config;
pub use error::{Result, StoreError};
pub use routes::build_app;
pub use state::AppState;
