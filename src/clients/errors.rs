use std::sync::Arc;

use serde_json::Value;

use crate::auth::CredentialManager;
use crate::error::{GatewayError, Result};
use crate::http::Transport;

/// `/errors` client: paged reads, single-record reads, record creation, and
/// a total-count probe via `HEAD`.
pub struct ErrorsClient {
    transport: Transport,
    credentials: Arc<CredentialManager>,
    base_url: String,
}

impl ErrorsClient {
    pub fn new(transport: Transport, credentials: Arc<CredentialManager>, base_url: impl Into<String>) -> Self {
        ErrorsClient {
            transport,
            credentials,
            base_url: base_url.into(),
        }
    }

    fn errors_url(&self, offset: Option<u32>, limit: Option<u32>) -> String {
        let mut params = Vec::new();
        if let Some(offset) = offset {
            params.push(format!("offset={}", offset));
        }
        if let Some(limit) = limit {
            params.push(format!("limit={}", limit));
        }
        if params.is_empty() {
            format!("{}/errors", self.base_url)
        } else {
            format!("{}/errors?{}", self.base_url, params.join("&"))
        }
    }

    /// Fetches one page of error records, optionally offset/limited.
    pub fn get_page(&self, offset: Option<u32>, limit: Option<u32>) -> Result<Vec<Value>> {
        let (body, _remaining) = self.get_page_with_remaining(offset, limit)?;
        Ok(body)
    }

    fn get_page_with_remaining(&self, offset: Option<u32>, limit: Option<u32>) -> Result<(Vec<Value>, Option<usize>)> {
        let token = self.credentials.acquire()?;
        let url = self.errors_url(offset, limit);
        let response = self.transport.get(&url, Some(token.bearer()), &[])?;
        let remaining = response.header_as_usize("x-remaining");
        let body = response.body().unwrap_or("[]");
        let items: Vec<Value> = serde_json::from_str(body).map_err(|source| GatewayError::Decode {
            url: url.clone(),
            source,
        })?;
        Ok((items, remaining))
    }

    pub fn get_by_id(&self, id: &str) -> Result<Value> {
        let token = self.credentials.acquire()?;
        let url = format!("{}/errors/{}", self.base_url, id);
        let response = self.transport.get(&url, Some(token.bearer()), &[])?;
        let body = response.body().unwrap_or("null");
        serde_json::from_str(body).map_err(|source| GatewayError::Decode { url, source })
    }

    pub fn create(&self, payload: &Value) -> Result<Value> {
        let token = self.credentials.acquire()?;
        let url = format!("{}/errors", self.base_url);
        let response = self.transport.post_json(&url, Some(token.bearer()), &[], payload)?;
        let body = response.body().unwrap_or("null");
        serde_json::from_str(body).map_err(|source| GatewayError::Decode { url, source })
    }

    /// `HEAD /errors`, returning the `x-total-count` header.
    pub fn total_count(&self) -> Result<usize> {
        let token = self.credentials.acquire()?;
        let url = format!("{}/errors", self.base_url);
        let response = self.transport.head(&url, Some(token.bearer()), &[])?;
        response.header_as_usize("x-total-count").ok_or_else(|| {
            use serde::de::Error as _;
            GatewayError::Decode {
                url,
                source: serde_json::Error::custom("response is missing the x-total-count header"),
            }
        })
    }

    /// Walks pages of `page_size` starting at offset 0 until the server
    /// reports no remaining rows via `x-remaining`, returning every row
    /// seen along the way.
    pub fn get_all(&self, page_size: u32) -> Result<Vec<Value>> {
        let mut offset = 0u32;
        let mut all = Vec::new();
        loop {
            let (page, remaining) = self.get_page_with_remaining(Some(offset), Some(page_size))?;
            let page_len = page.len();
            all.extend(page);
            let done = match remaining {
                Some(remaining) => remaining == 0,
                None => page_len == 0,
            };
            if done || page_len == 0 {
                break;
            }
            offset += page_size;
        }
        Ok(all)
    }
}
