//! HTTP surface. Handlers only read derived state from the domain layer and
//! shape it into JSON views.

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

mod admin;
mod storefront;

pub use admin::AdminProductView;
pub use storefront::{CartLineView, CartView, ProductView};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "tienda"})) }))
        .route("/api/v1/products", get(storefront::list_products))
        .route("/api/v1/sessions", post(storefront::create_session))
        .route(
            "/api/v1/sessions/:session/cart",
            get(storefront::get_cart)
                .post(storefront::add_to_cart)
                .patch(storefront::change_qty)
                .delete(storefront::clear_cart),
        )
        .route("/api/v1/sessions/:session/checkout", get(storefront::get_checkout))
        .route("/api/v1/sessions/:session/checkout/summary", post(storefront::open_summary))
        .route("/api/v1/sessions/:session/checkout/customer", post(storefront::confirm_customer))
        .route("/api/v1/sessions/:session/checkout/pay", post(storefront::pay))
        .route("/api/v1/sessions/:session/checkout/back", post(storefront::back))
        .route("/api/v1/admin/products", get(admin::list_products).post(admin::create_product))
        .route("/api/v1/admin/next-id", get(admin::next_id))
        .route("/api/v1/admin/products/:id", put(admin::update_product).delete(admin::delete_product))
        .route("/api/v1/admin/uploads", post(admin::upload))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
