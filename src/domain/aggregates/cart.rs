//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::aggregates::order::{self, CheckoutError};
use crate::domain::aggregates::product::ProductLookup;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Customer, Money, ProductId};

/// In-progress selection for one session. Lines keep first-add order.
#[derive(Clone, Debug)]
pub struct Cart {
    lines: Vec<CartLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

/// One (product, size) pair. `unit_price` is the catalog price at the time of the first add.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub nombre: String,
    pub size: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }

    fn matches(&self, product_id: &ProductId, size: &str) -> bool {
        &self.product_id == product_id && self.size == size
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantityChange { Updated(u32), Removed }

impl Default for Cart {
    fn default() -> Self { Self::new() }
}

impl Cart {
    pub fn new() -> Self {
        let now = Utc::now();
        Self { lines: vec![], created_at: now, updated_at: now, events: vec![] }
    }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn line(&self, product_id: &ProductId, size: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(product_id, size))
    }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Badge count: total units across lines.
    pub fn item_count(&self) -> u32 { self.lines.iter().map(|l| l.quantity).sum() }

    pub fn compute_subtotal(&self) -> Money { self.lines.iter().map(CartLine::line_total).sum() }

    /// No tax or shipping yet, so the total is the subtotal.
    pub fn compute_total(&self) -> Money { self.compute_subtotal() }

    /// Adds one unit of `product_id` in `size`. Returns the resulting line quantity.
    pub fn add_to_cart(
        &mut self,
        catalog: &impl ProductLookup,
        product_id: &ProductId,
        size: &str,
    ) -> Result<u32, CartError> {
        let product = catalog.find_product(product_id).ok_or_else(|| CartError::UnknownProduct(product_id.clone()))?;
        let size = size.trim();
        if size.is_empty() { return Err(CartError::MissingSize); }
        if !product.size_options().iter().any(|o| o == size) {
            return Err(CartError::UnknownSize { product_id: product_id.clone(), size: size.to_string() });
        }

        let quantity = if let Some(existing) = self.lines.iter_mut().find(|l| l.matches(product_id, size)) {
            existing.quantity += 1;
            existing.quantity
        } else {
            self.lines.push(CartLine {
                product_id: product_id.clone(),
                nombre: product.nombre().to_string(),
                size: size.to_string(),
                unit_price: product.precio(),
                quantity: 1,
            });
            self.raise_event(DomainEvent::Cart(CartEvent::LineAdded {
                product_id: product_id.clone(), size: size.to_string(), unit_price: product.precio(),
            }));
            1
        };
        if quantity > 1 {
            self.raise_event(DomainEvent::Cart(CartEvent::QuantityChanged {
                product_id: product_id.clone(), size: size.to_string(), quantity,
            }));
        }
        self.touch();
        Ok(quantity)
    }

    /// Applies `delta` to an existing line; a result of zero or less drops the line.
    /// Returns `None` when no such line exists.
    pub fn change_qty(&mut self, product_id: &ProductId, size: &str, delta: i64) -> Option<QuantityChange> {
        let pos = self.lines.iter().position(|l| l.matches(product_id, size))?;
        let next = i64::from(self.lines[pos].quantity).saturating_add(delta);
        let change = if next <= 0 {
            self.lines.remove(pos);
            self.raise_event(DomainEvent::Cart(CartEvent::LineRemoved {
                product_id: product_id.clone(), size: size.to_string(),
            }));
            QuantityChange::Removed
        } else {
            let quantity = u32::try_from(next).unwrap_or(u32::MAX);
            self.lines[pos].quantity = quantity;
            self.raise_event(DomainEvent::Cart(CartEvent::QuantityChanged {
                product_id: product_id.clone(), size: size.to_string(), quantity,
            }));
            QuantityChange::Updated(quantity)
        };
        self.touch();
        Some(change)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared));
        self.touch();
    }

    /// One-line view shown before asking for customer details.
    pub fn summary_line(&self) -> String {
        let items: Vec<String> = self.lines.iter().map(order::describe_line).collect();
        format!("🛍 {} — Subtotal: {}", items.join(" | "), self.compute_subtotal())
    }

    pub fn build_order_summary(&self, customer: &Customer) -> Result<String, CheckoutError> {
        order::build_order_summary(self, customer)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    UnknownProduct(ProductId),
    MissingSize,
    UnknownSize { product_id: ProductId, size: String },
}
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProduct(id) => write!(f, "Producto {id} no encontrado"),
            Self::MissingSize => write!(f, "Selecciona un tamaño"),
            Self::UnknownSize { product_id, size } => write!(f, "Tamaño {size} no disponible para {product_id}"),
        }
    }
}
