use std::sync::Arc;

use serde_json::Value;

use crate::auth::CredentialManager;
use crate::error::{GatewayError, Result};
use crate::filter::{CriteriaFilter, FilterMap, NamedQueryFilter};
use crate::http::Transport;

/// Proxy client for `/api/{resource}` (criteria-filter GET) and
/// `/qapi/{resource}` (qapi POST) — the two filter transports described in
/// the "External interfaces" section.
#[derive(Clone)]
pub struct ProxyClient {
    transport: Transport,
    credentials: Arc<CredentialManager>,
    base_url: String,
}

/// The three query-suffix shapes a filter builder can hand to the proxy
/// client's criteria-filter GET.
pub enum ProxyFilter<'a> {
    Criteria(&'a CriteriaFilter),
    NamedQuery(&'a NamedQueryFilter),
    Map(&'a FilterMap),
    None,
}

impl ProxyClient {
    pub fn new(transport: Transport, credentials: Arc<CredentialManager>, base_url: impl Into<String>) -> Self {
        ProxyClient {
            transport,
            credentials,
            base_url: base_url.into(),
        }
    }

    /// `GET /api/{resource}` with an `Accept: <media-type>` header and a
    /// filter-builder-supplied query suffix.
    pub fn get(&self, resource: &str, media_type: &str, filter: ProxyFilter<'_>) -> Result<Value> {
        let token = self.credentials.acquire()?;
        let suffix = match filter {
            ProxyFilter::Criteria(f) => f.to_query_suffix(),
            ProxyFilter::NamedQuery(f) => f.to_query_suffix(),
            ProxyFilter::Map(f) => f.to_query_suffix(),
            ProxyFilter::None => String::new(),
        };
        let url = format!("{}/api/{}{}", self.base_url, resource, suffix);
        let response = self.transport.get(&url, Some(token.bearer()), &[("Accept", media_type)])?;
        let body = response.body().unwrap_or("null");
        serde_json::from_str(body).map_err(|source| GatewayError::Decode { url, source })
    }

    /// `POST /qapi/{resource}[?offset=<n>&limit=<n>]` with the filter
    /// expression as the bare JSON body (no `?criteria=` prefix).
    pub fn qapi(
        &self,
        resource: &str,
        filter_body: &Value,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let token = self.credentials.acquire()?;
        let mut params = Vec::new();
        if let Some(offset) = offset {
            params.push(format!("offset={}", offset));
        }
        if let Some(limit) = limit {
            params.push(format!("limit={}", limit));
        }
        let query = if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        };
        let url = format!("{}/qapi/{}{}", self.base_url, resource, query);
        let response = self.transport.post_json(&url, Some(token.bearer()), &[], filter_body)?;
        let body = response.body().unwrap_or("null");
        serde_json::from_str(body).map_err(|source| GatewayError::Decode { url, source })
    }
}
