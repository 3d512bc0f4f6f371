use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::aggregates::{Cart, CartLine, CheckoutView, PaymentMethod, Product};
use crate::domain::value_objects::{Customer, ProductId};
use crate::error::Result;
use crate::state::{AppState, Session};

#[derive(Debug, Deserialize)]
pub struct SearchParams { pub search: Option<String> }

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductView {
    pub id: String,
    pub nombre: String,
    pub precio: u64,
    pub precio_formatted: String,
    pub imagen: String,
    pub tallas: Vec<String>,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id().to_string(),
            nombre: p.nombre().to_string(),
            precio: p.precio().amount(),
            precio_formatted: p.precio().to_string(),
            imagen: p.image_or_placeholder().to_string(),
            tallas: p.size_options().to_vec(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartLineView {
    pub product_id: String,
    pub nombre: String,
    pub size: String,
    pub unit_price: u64,
    pub quantity: u32,
    pub line_total: u64,
    pub description: String,
}

impl From<&CartLine> for CartLineView {
    fn from(l: &CartLine) -> Self {
        Self {
            product_id: l.product_id.to_string(),
            nombre: l.nombre.clone(),
            size: l.size.clone(),
            unit_price: l.unit_price.amount(),
            quantity: l.quantity,
            line_total: l.line_total().amount(),
            description: format!("{} c/u — Tamaño: {}", l.unit_price, l.size),
        }
    }
}

/// Drawer contents plus the badge count.
#[derive(Debug, Serialize, Deserialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub count: u32,
    pub subtotal: u64,
    pub total: u64,
    pub subtotal_formatted: String,
    pub total_formatted: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            count: cart.item_count(),
            subtotal: cart.compute_subtotal().amount(),
            total: cart.compute_total().amount(),
            subtotal_formatted: cart.compute_subtotal().format_cop(),
            total_formatted: cart.compute_total().format_cop(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub view: CheckoutView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)] pub struct AddToCartRequest { pub product_id: ProductId, pub size: String }
#[derive(Debug, Deserialize)] pub struct ChangeQtyRequest { pub product_id: ProductId, pub size: String, pub delta: i64 }
#[derive(Debug, Deserialize)] pub struct PayRequest { pub method: PaymentMethod }

/// Runs `f` with the session locked, then dispatches whatever events it raised.
async fn with_session<T>(s: &AppState, id: Uuid, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
    let handle = s.session(id).await?;
    let (out, events) = {
        let mut session = handle.lock().await;
        let out = f(&mut *session);
        session.last_seen = Utc::now();
        (out, session.take_events())
    };
    if let Err(e) = &out {
        warn!(session = %id, error = %e, "request rejected");
    }
    s.dispatch(id, events).await;
    out
}

pub(super) async fn list_products(State(s): State<AppState>, Query(p): Query<SearchParams>) -> Json<Vec<ProductView>> {
    let query = p.search.unwrap_or_default();
    Json(s.catalog.filter(&query).into_iter().map(ProductView::from).collect())
}

pub(super) async fn create_session(State(s): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let id = s.create_session().await;
    (StatusCode::CREATED, Json(serde_json::json!({ "session_id": id })))
}

pub(super) async fn get_cart(State(s): State<AppState>, Path(session): Path<Uuid>) -> Result<Json<CartView>> {
    with_session(&s, session, |sess| Ok(Json(CartView::from(&sess.cart)))).await
}

pub(super) async fn add_to_cart(State(s): State<AppState>, Path(session): Path<Uuid>, Json(r): Json<AddToCartRequest>) -> Result<Json<CartView>> {
    let catalog = s.catalog.clone();
    with_session(&s, session, |sess| {
        sess.cart.add_to_cart(catalog.as_ref(), &r.product_id, &r.size)?;
        Ok(Json(CartView::from(&sess.cart)))
    })
    .await
}

pub(super) async fn change_qty(State(s): State<AppState>, Path(session): Path<Uuid>, Json(r): Json<ChangeQtyRequest>) -> Result<Json<CartView>> {
    with_session(&s, session, |sess| {
        sess.cart.change_qty(&r.product_id, &r.size, r.delta);
        Ok(Json(CartView::from(&sess.cart)))
    })
    .await
}

pub(super) async fn clear_cart(State(s): State<AppState>, Path(session): Path<Uuid>) -> Result<Json<CartView>> {
    with_session(&s, session, |sess| {
        sess.cart.clear();
        Ok(Json(CartView::from(&sess.cart)))
    })
    .await
}

pub(super) async fn get_checkout(State(s): State<AppState>, Path(session): Path<Uuid>) -> Result<Json<CheckoutResponse>> {
    with_session(&s, session, |sess| {
        Ok(Json(CheckoutResponse {
            view: sess.checkout.view(),
            customer: sess.checkout.customer().cloned(),
            ..Default::default()
        }))
    })
    .await
}

pub(super) async fn open_summary(State(s): State<AppState>, Path(session): Path<Uuid>) -> Result<Json<CheckoutResponse>> {
    with_session(&s, session, |sess| {
        let summary = sess.checkout.open_summary(&sess.cart)?;
        Ok(Json(CheckoutResponse { view: sess.checkout.view(), summary: Some(summary), ..Default::default() }))
    })
    .await
}

pub(super) async fn confirm_customer(State(s): State<AppState>, Path(session): Path<Uuid>, Json(customer): Json<Customer>) -> Result<Json<CheckoutResponse>> {
    with_session(&s, session, |sess| {
        sess.checkout.confirm_customer(&sess.cart, &customer)?;
        Ok(Json(CheckoutResponse {
            view: sess.checkout.view(),
            customer: sess.checkout.customer().cloned(),
            ..Default::default()
        }))
    })
    .await
}

pub(super) async fn pay(State(s): State<AppState>, Path(session): Path<Uuid>, Json(r): Json<PayRequest>) -> Result<Json<CheckoutResponse>> {
    let phone = s.config.whatsapp_number.clone();
    with_session(&s, session, |sess| {
        let link = sess.checkout.hand_off(&sess.cart, r.method, &phone)?;
        Ok(Json(CheckoutResponse { view: sess.checkout.view(), link: Some(link), ..Default::default() }))
    })
    .await
}

pub(super) async fn back(State(s): State<AppState>, Path(session): Path<Uuid>) -> Result<Json<CheckoutResponse>> {
    with_session(&s, session, |sess| {
        sess.checkout.back();
        Ok(Json(CheckoutResponse { view: sess.checkout.view(), ..Default::default() }))
    })
    .await
}
