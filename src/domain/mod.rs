//! Storefront domain: products, cart, checkout. No I/O happens here.
pub mod aggregates;
pub mod events;
pub mod value_objects;
