//! Domain events
use crate::domain::value_objects::{Money, ProductId};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainEvent {
    Cart(CartEvent),
    Checkout(CheckoutEvent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CartEvent {
    LineAdded { product_id: ProductId, size: String, unit_price: Money },
    QuantityChanged { product_id: ProductId, size: String, quantity: u32 },
    LineRemoved { product_id: ProductId, size: String },
    Cleared,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CheckoutEvent {
    SummaryOpened { total: Money },
    CustomerConfirmed,
    OrderHandedOff { customer: String, lines: usize, total: Money, link: String },
    ReturnedToCatalog,
}
