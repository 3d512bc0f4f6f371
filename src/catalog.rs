//! Catalog loading and search.
//!
//! The storefront loads its catalog once per process from a static JSON array,
//! either a local file or an http(s) URL. Searching is a case-insensitive
//! substring match; the storefront matches names only, the admin surface also
//! matches ids.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info};

use crate::domain::aggregates::{Product, ProductLookup};
use crate::domain::value_objects::ProductId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("could not read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not fetch catalog: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Products in source order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self { Self { products } }

    pub async fn load(source: &CatalogSource, http: &reqwest::Client) -> Result<Self, CatalogError> {
        let products: Vec<Product> = match source {
            CatalogSource::File(path) => {
                let raw = tokio::fs::read(path).await?;
                serde_json::from_slice(&raw)?
            }
            CatalogSource::Url(url) => {
                let raw = http.get(url).send().await?.error_for_status()?.bytes().await?;
                serde_json::from_slice(&raw)?
            }
        };
        info!(source = %source, products = products.len(), "catalog loaded");
        Ok(Self::new(products))
    }

    /// Loads the catalog, falling back to an empty one when the source is unusable.
    pub async fn load_or_empty(source: &CatalogSource, http: &reqwest::Client) -> Self {
        Self::load(source, http).await.unwrap_or_else(|e| {
            error!(source = %source, error = %e, "No se pudo cargar el catálogo");
            Self::default()
        })
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    /// Storefront search: name only.
    pub fn filter(&self, query: &str) -> Vec<&Product> { filter_by_name(&self.products, query) }
}

impl ProductLookup for Catalog {
    fn find_product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }
}

fn normalize(query: &str) -> String { query.trim().to_lowercase() }

pub fn filter_by_name<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = normalize(query);
    products.iter().filter(|p| needle.is_empty() || p.name_contains(&needle)).collect()
}

pub fn filter_by_name_or_id<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = normalize(query);
    products
        .iter()
        .filter(|p| needle.is_empty() || p.name_contains(&needle) || p.id_contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Money;

    fn products() -> Vec<Product> {
        vec![
            Product::new("P001", "Camiseta Negra", Money::cop(50000)),
            Product::new("P002", "Pizza Hawaiana", Money::cop(32000)),
            Product::new("P010", "camiseta blanca", Money::cop(45000)),
        ]
    }

    fn ids(found: Vec<&Product>) -> Vec<&str> { found.into_iter().map(|p| p.id().as_str()).collect() }

    #[test]
    fn test_empty_query_keeps_order() {
        let catalog = Catalog::new(products());
        assert_eq!(ids(catalog.filter("")), vec!["P001", "P002", "P010"]);
        assert_eq!(ids(catalog.filter("   ")), vec!["P001", "P002", "P010"]);
    }

    #[test]
    fn test_name_search_is_case_insensitive() {
        let catalog = Catalog::new(products());
        assert_eq!(ids(catalog.filter("CAMISETA")), vec!["P001", "P010"]);
        assert!(catalog.filter("xyz").is_empty());
    }

    #[test]
    fn test_storefront_ignores_ids_admin_does_not() {
        let list = products();
        assert!(filter_by_name(&list, "p01").is_empty());
        assert_eq!(ids(filter_by_name_or_id(&list, "p01")), vec!["P010"]);
        assert_eq!(ids(filter_by_name_or_id(&list, "pizza")), vec!["P002"]);
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(CatalogSource::parse("productos.json"), CatalogSource::File("productos.json".into()));
        assert!(matches!(CatalogSource::parse("https://cdn.example/p.json"), CatalogSource::Url(_)));
    }
}
