use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{next_product_id, sort_by_id, AdminError, ProductDraft, ProductForm, SaveGuard};
use crate::domain::aggregates::Product;
use crate::domain::value_objects::ProductId;

/// Envelope returned by every action of the remote script.
#[derive(Debug, Deserialize)]
struct ScriptResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "message")]
    error: Option<String>,
    #[serde(default)]
    catalogo: Option<Vec<Product>>,
    #[serde(default)]
    url: Option<String>,
}

impl ScriptResponse {
    fn into_result(self) -> Result<Self, AdminError> {
        if self.success || self.status.as_deref() == Some("success") {
            Ok(self)
        } else {
            Err(AdminError::Remote(self.error.clone().unwrap_or_else(|| "No se pudo completar la operación.".into())))
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    file_name: &'a str,
    mime_type: &'a str,
    data: String,
}

/// Client for the spreadsheet-backed script that stores products and images.
#[derive(Clone, Debug)]
pub struct AdminClient {
    http: reqwest::Client,
    script_url: String,
    guard: SaveGuard,
}

impl AdminClient {
    pub fn new(http: reqwest::Client, script_url: impl Into<String>) -> Self {
        Self { http, script_url: script_url.into(), guard: SaveGuard::default() }
    }

    pub fn guard(&self) -> &SaveGuard { &self.guard }

    /// Whole catalog, sorted by id.
    pub async fn get_catalog(&self) -> Result<Vec<Product>, AdminError> {
        let res: ScriptResponse = self
            .http
            .get(&self.script_url)
            .query(&[("action", "getCatalog")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let mut products = res.into_result()?.catalogo.unwrap_or_default();
        sort_by_id(&mut products);
        debug!(products = products.len(), "admin catalog fetched");
        Ok(products)
    }

    pub async fn add_product(&self, draft: &ProductDraft) -> Result<(), AdminError> {
        let _ticket = self.guard.try_acquire()?;
        self.write_product("addProduct", draft).await
    }

    pub async fn update_product(&self, draft: &ProductDraft) -> Result<(), AdminError> {
        let _ticket = self.guard.try_acquire()?;
        self.write_product("updateProduct", draft).await
    }

    /// Deletes `id`, or reports it missing without touching the remote sheet.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), AdminError> {
        let _ticket = self.guard.try_acquire()?;
        let catalog = self.get_catalog().await?;
        if !catalog.iter().any(|p| p.id() == id) {
            return Err(AdminError::ProductNotFound(id.clone()));
        }
        self.post_form("deleteProduct", &[("id", id.as_str())]).await?;
        info!(id = %id, "product deleted");
        Ok(())
    }

    /// Stores an image remotely and returns its public URL.
    pub async fn upload_file(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<String, AdminError> {
        let _ticket = self.guard.try_acquire()?;
        let body = UploadRequest {
            file_name,
            mime_type,
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        };
        let res: ScriptResponse = self
            .http
            .post(&self.script_url)
            .query(&[("action", "uploadFile")])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let url = res
            .into_result()?
            .url
            .ok_or_else(|| AdminError::Remote("upload response carried no url".into()))?;
        info!(file_name, bytes = bytes.len(), "image uploaded");
        Ok(url)
    }

    /// Creates the product when `editing` is `None`, otherwise updates that id.
    ///
    /// The guard is held from the catalog read through the write, so two
    /// overlapping creates can never pick the same id.
    pub async fn save(&self, editing: Option<&ProductId>, form: ProductForm) -> Result<ProductDraft, AdminError> {
        let _ticket = self.guard.try_acquire()?;
        let catalog = self.get_catalog().await?;
        let draft = match editing {
            None => {
                let draft = form.into_draft(next_product_id(&catalog)?)?;
                self.write_product("addProduct", &draft).await?;
                draft
            }
            Some(id) => {
                if !catalog.iter().any(|p| p.id() == id) {
                    warn!(id = %id, "update for unknown product");
                    return Err(AdminError::ProductNotFound(id.clone()));
                }
                let draft = form.into_draft(id.clone())?;
                self.write_product("updateProduct", &draft).await?;
                draft
            }
        };
        Ok(draft)
    }

    async fn write_product(&self, action: &str, draft: &ProductDraft) -> Result<(), AdminError> {
        self.post_form(action, draft).await?;
        info!(id = %draft.id, action, "product written");
        Ok(())
    }

    async fn post_form<T: Serialize + ?Sized>(&self, action: &str, form: &T) -> Result<(), AdminError> {
        let res: ScriptResponse = self
            .http
            .post(&self.script_url)
            .query(&[("action", action)])
            .form(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        res.into_result().map(|_| ())
    }
}
