//! Administrative surface: product CRUD against the remote script endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::aggregates::Product;
use crate::domain::value_objects::ProductId;

mod client;

pub use client::AdminClient;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("No se pudo contactar al servidor: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Error del servidor: {0}")]
    Remote(String),

    #[error("Campos incompletos: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Producto {0} no encontrado")]
    ProductNotFound(ProductId),

    #[error("Another save is still in flight")]
    Busy,
}

/// Product fields as typed into the admin form.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1, message = "nombre is required"))]
    pub nombre: String,
    #[validate(custom = "validate_price")]
    pub precio: String,
    #[validate(length(min = 1, message = "tallas is required"))]
    pub tallas: String,
    #[validate(length(min = 1, message = "imagen is required"))]
    pub imagen: String,
}

fn validate_price(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<u64>() {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("precio must be a non-negative integer")),
    }
}

impl ProductForm {
    pub fn trimmed(&self) -> Self {
        Self {
            nombre: self.nombre.trim().to_string(),
            precio: self.precio.trim().to_string(),
            tallas: self.tallas.trim().to_string(),
            imagen: self.imagen.trim().to_string(),
        }
    }

    /// Validates the trimmed form and attaches the id it will be saved under.
    pub fn into_draft(self, id: ProductId) -> Result<ProductDraft, AdminError> {
        let form = self.trimmed();
        form.validate()?;
        let precio = form.precio.parse().map_err(|_| {
            let mut errors = ValidationErrors::new();
            errors.add("precio", ValidationError::new("precio must be a non-negative integer"));
            AdminError::Validation(errors)
        })?;
        Ok(ProductDraft { id, nombre: form.nombre, precio, tallas: form.tallas, imagen: form.imagen })
    }
}

/// Body sent to the remote endpoint for create and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductDraft {
    pub id: ProductId,
    pub nombre: String,
    pub precio: u64,
    pub tallas: String,
    pub imagen: String,
}

/// One past the highest numeric id in the catalog: `P001` when empty.
///
/// Ids are compared by number, not as text, so `P1000` follows `P999`.
pub fn next_product_id(products: &[Product]) -> Result<ProductId, AdminError> {
    let highest = products.iter().map(|p| p.id().number()).max().unwrap_or(0);
    highest
        .checked_add(1)
        .map(ProductId::from_number)
        .ok_or_else(|| AdminError::Remote(format!("no product id left after {highest}")))
}

pub fn sort_by_id(products: &mut [Product]) {
    products.sort_by(|a, b| a.id().cmp(b.id()));
}

/// At most one mutating call at a time. A held ticket releases the guard on drop.
#[derive(Clone, Debug, Default)]
pub struct SaveGuard {
    in_flight: Arc<AtomicBool>,
}

pub struct SaveTicket {
    in_flight: Arc<AtomicBool>,
}

impl SaveGuard {
    pub fn try_acquire(&self) -> Result<SaveTicket, AdminError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| SaveTicket { in_flight: self.in_flight.clone() })
            .map_err(|_| AdminError::Busy)
    }

    pub fn is_busy(&self) -> bool { self.in_flight.load(Ordering::Acquire) }
}

impl Drop for SaveTicket {
    fn drop(&mut self) { self.in_flight.store(false, Ordering::Release); }
}
