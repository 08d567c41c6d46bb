use std::sync::Arc;

use crate::auth::CredentialManager;
use crate::error::{GatewayError, Result};
use crate::http::Transport;
use crate::version::catalog::{AppConfig, Catalog};
use crate::version::resolver::CatalogClient;

/// HTTP-backed `CatalogClient`, hitting `/admin/available-resources` and
/// `/appConfig`.
pub struct HttpCatalogClient {
    transport: Transport,
    credentials: Arc<CredentialManager>,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(transport: Transport, credentials: Arc<CredentialManager>, base_url: impl Into<String>) -> Self {
        HttpCatalogClient {
            transport,
            credentials,
            base_url: base_url.into(),
        }
    }
}

impl CatalogClient for HttpCatalogClient {
    fn get_all_available_resources(&self) -> Result<Catalog> {
        let token = self.credentials.acquire()?;
        let url = format!("{}/admin/available-resources", self.base_url);
        let response = self.transport.get(&url, Some(token.bearer()), &[])?;
        let body = response.body().unwrap_or_default();
        serde_json::from_str(body).map_err(|source| GatewayError::Decode {
            url: url.clone(),
            source,
        })
    }

    fn get_app_config(&self) -> Result<AppConfig> {
        let token = self.credentials.acquire()?;
        let url = format!("{}/appConfig", self.base_url);
        let response = self.transport.get(&url, Some(token.bearer()), &[])?;
        let body = response.body().unwrap_or_default();
        serde_json::from_str(body).map_err(|source| GatewayError::Decode {
            url: url.clone(),
            source,
        })
    }
}
