use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::storefront::SearchParams;
use crate::admin::{next_product_id, ProductDraft, ProductForm};
use crate::catalog::filter_by_name_or_id;
use crate::domain::aggregates::Product;
use crate::domain::value_objects::ProductId;
use crate::error::{Result, StoreError};
use crate::state::AppState;

/// Card shown in the admin product grid.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminProductView {
    pub id: String,
    pub nombre: String,
    pub precio: u64,
    pub precio_formatted: String,
    pub tallas: String,
    pub imagen: String,
}

impl From<&Product> for AdminProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id().to_string(),
            nombre: p.nombre().to_string(),
            precio: p.precio().amount(),
            precio_formatted: p.precio().to_string(),
            tallas: p.tallas().display_text(),
            imagen: p.image_or_placeholder().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadParams { pub file_name: Option<String> }

pub(super) async fn list_products(State(s): State<AppState>, Query(p): Query<SearchParams>) -> Result<Json<Vec<AdminProductView>>> {
    let products = s.admin()?.get_catalog().await?;
    let query = p.search.unwrap_or_default();
    Ok(Json(filter_by_name_or_id(&products, &query).into_iter().map(AdminProductView::from).collect()))
}

pub(super) async fn next_id(State(s): State<AppState>) -> Result<Json<Value>> {
    let products = s.admin()?.get_catalog().await?;
    Ok(Json(json!({ "id": next_product_id(&products)? })))
}

pub(super) async fn create_product(State(s): State<AppState>, Json(form): Json<ProductForm>) -> Result<(StatusCode, Json<ProductDraft>)> {
    let draft = s.admin()?.save(None, form).await?;
    Ok((StatusCode::CREATED, Json(draft)))
}

pub(super) async fn update_product(State(s): State<AppState>, Path(id): Path<String>, Json(form): Json<ProductForm>) -> Result<Json<ProductDraft>> {
    let draft = s.admin()?.save(Some(&ProductId::new(id)), form).await?;
    Ok(Json(draft))
}

pub(super) async fn delete_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    s.admin()?.delete_product(&ProductId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn upload(
    State(s): State<AppState>,
    Query(p): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let client = s.admin()?;
    let file_name = p.file_name.filter(|n| !n.trim().is_empty()).ok_or_else(|| StoreError::MalformedPayload("file_name is required".into()))?;
    if body.is_empty() {
        return Err(StoreError::MalformedPayload("empty upload".into()));
    }
    let mime = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("application/octet-stream");
    let url = client.upload_file(&file_name, mime, &body).await?;
    Ok(Json(json!({ "url": url })))
}
