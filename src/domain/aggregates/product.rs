//! Product Aggregate

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use crate::domain::value_objects::{Money, ProductId, SizeDescriptor};

pub const PLACEHOLDER_IMAGE: &str = "img/placeholder.jpg";

/// A sellable product. Immutable for the lifetime of a loaded catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProductRecord")]
pub struct Product {
    id: ProductId,
    nombre: String,
    precio: Money,
    imagen: String,
    tallas: SizeDescriptor,
    /// `tallas` expanded once, when the product is built.
    #[serde(skip)]
    options: Vec<String>,
}

/// A product as it appears in a catalog feed.
#[derive(Deserialize)]
struct ProductRecord {
    id: ProductId,
    nombre: String,
    #[serde(deserialize_with = "price_from_number_or_text")]
    precio: Money,
    #[serde(default, alias = "img")]
    imagen: String,
    #[serde(default)]
    tallas: SizeDescriptor,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Product::new(r.id, r.nombre, r.precio).with_image(r.imagen).with_sizes(r.tallas)
    }
}

impl Product {
    pub fn new(id: impl Into<ProductId>, nombre: impl Into<String>, precio: Money) -> Self {
        Self {
            id: id.into(),
            nombre: nombre.into(),
            precio,
            imagen: String::new(),
            options: SizeDescriptor::None.resolve(),
            tallas: SizeDescriptor::None,
        }
    }

    pub fn with_image(mut self, imagen: impl Into<String>) -> Self { self.imagen = imagen.into(); self }

    pub fn with_sizes(mut self, tallas: SizeDescriptor) -> Self {
        self.options = tallas.resolve();
        self.tallas = tallas;
        self
    }

    pub fn id(&self) -> &ProductId { &self.id }
    pub fn nombre(&self) -> &str { &self.nombre }
    pub fn precio(&self) -> Money { self.precio }
    pub fn imagen(&self) -> &str { &self.imagen }
    pub fn tallas(&self) -> &SizeDescriptor { &self.tallas }
    pub fn size_options(&self) -> &[String] { &self.options }

    pub fn image_or_placeholder(&self) -> &str {
        if self.imagen.trim().is_empty() { PLACEHOLDER_IMAGE } else { &self.imagen }
    }

    pub fn name_contains(&self, needle_lower: &str) -> bool {
        self.nombre.to_lowercase().contains(needle_lower)
    }

    pub fn id_contains(&self, needle_lower: &str) -> bool {
        self.id.as_str().to_lowercase().contains(needle_lower)
    }
}

/// Catalog lookup used by the cart when adding lines.
pub trait ProductLookup {
    fn find_product(&self, id: &ProductId) -> Option<&Product>;
}

impl ProductLookup for Vec<Product> {
    fn find_product(&self, id: &ProductId) -> Option<&Product> { self.iter().find(|p| p.id() == id) }
}

// Spreadsheet-backed sources sometimes hand prices back as text.
fn price_from_number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    use serde::de::Error;
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .map(Money::cop)
            .ok_or_else(|| D::Error::custom(format!("invalid precio: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Money::cop)
            .map_err(|_| D::Error::custom(format!("invalid precio: {s:?}"))),
        Value::Null => Ok(Money::ZERO),
        other => Err(D::Error::custom(format!("invalid precio: {other}"))),
    }
}
