use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::admin::AdminError;
use crate::catalog::CatalogError;
use crate::domain::aggregates::{CartError, CheckoutError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("Sesión {0} no encontrada")]
    SessionNotFound(Uuid),

    #[error("El panel de administración no está configurado")]
    AdminDisabled,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Cart(CartError::UnknownProduct(_)) => (StatusCode::NOT_FOUND, "unknown_product"),
            Self::Cart(_) => (StatusCode::UNPROCESSABLE_ENTITY, "warning"),
            Self::Checkout(CheckoutError::InvalidTransition { .. }) => (StatusCode::CONFLICT, "invalid_transition"),
            Self::Checkout(_) => (StatusCode::UNPROCESSABLE_ENTITY, "warning"),
            Self::Catalog(_) => (StatusCode::BAD_GATEWAY, "catalog_unavailable"),
            Self::Admin(AdminError::Validation(_)) => (StatusCode::UNPROCESSABLE_ENTITY, "warning"),
            Self::Admin(AdminError::ProductNotFound(_)) => (StatusCode::NOT_FOUND, "unknown_product"),
            Self::Admin(AdminError::Busy) => (StatusCode::CONFLICT, "busy"),
            Self::Admin(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            Self::SessionNotFound(_) => (StatusCode::NOT_FOUND, "unknown_session"),
            Self::AdminDisabled => (StatusCode::SERVICE_UNAVAILABLE, "admin_disabled"),
            Self::MalformedPayload(_) => (StatusCode::BAD_REQUEST, "malformed_payload"),
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": code, "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ProductId;

    #[test]
    fn test_status_mapping() {
        let missing = StoreError::from(CartError::UnknownProduct(ProductId::new("P9")));
        assert_eq!(missing.status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(StoreError::from(CartError::MissingSize).status_and_code(), (StatusCode::UNPROCESSABLE_ENTITY, "warning"));
        assert_eq!(StoreError::from(AdminError::Busy).status_and_code().0, StatusCode::CONFLICT);
        assert_eq!(StoreError::AdminDisabled.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
