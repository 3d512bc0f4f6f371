//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{Product, ProductLookup, PLACEHOLDER_IMAGE};
pub use order::{Checkout, CheckoutError, CheckoutView, PaymentMethod};
pub use cart::{Cart, CartError, CartLine, QuantityChange};
