use std::sync::Arc;

use serde_json::Value;

use crate::auth::CredentialManager;
use crate::error::{GatewayError, Result};
use crate::http::Transport;

const MAX_LIMIT: u32 = 1000;

/// `/consume` client (change-notification messages). The server tracks the
/// read cursor; callers only ever see the next unconsumed page.
#[derive(Clone)]
pub struct MessagesClient {
    transport: Transport,
    credentials: Arc<CredentialManager>,
    base_url: String,
}

impl MessagesClient {
    pub fn new(transport: Transport, credentials: Arc<CredentialManager>, base_url: impl Into<String>) -> Self {
        MessagesClient {
            transport,
            credentials,
            base_url: base_url.into(),
        }
    }

    fn consume_url(&self, last_processed_id: Option<u64>, limit: Option<u32>) -> String {
        let mut params = Vec::new();
        if let Some(id) = last_processed_id {
            params.push(format!("lastProcessedID={}", id));
        }
        if let Some(limit) = limit {
            params.push(format!("limit={}", limit));
        }
        if params.is_empty() {
            format!("{}/consume", self.base_url)
        } else {
            format!("{}/consume?{}", self.base_url, params.join("&"))
        }
    }

    /// `HEAD /consume`, returning `x-remaining`.
    pub fn remaining(&self) -> Result<usize> {
        let token = self.credentials.acquire()?;
        let url = format!("{}/consume", self.base_url);
        let response = self.transport.head(&url, Some(token.bearer()), &[])?;
        Ok(response.header_as_usize("x-remaining").unwrap_or(0))
    }

    /// `GET /consume`, with `limit` validated into `[1, 1000]`.
    pub fn get(&self, last_processed_id: Option<u64>, limit: u32) -> Result<Vec<Value>> {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(GatewayError::invalid_argument(
                "MessagesClient",
                "limit",
                "must be in [1, 1000]",
            ));
        }
        let token = self.credentials.acquire()?;
        let url = self.consume_url(last_processed_id, Some(limit));
        let response = self.transport.get(&url, Some(token.bearer()), &[])?;
        let body = response.body().unwrap_or("[]");
        serde_json::from_str(body).map_err(|source| GatewayError::Decode { url, source })
    }

    /// Repeatedly fetches pages of `limit` (server-tracked cursor) until a
    /// short page (fewer than `limit` items) signals the end, returning
    /// every message seen.
    pub fn drain_all(&self, limit: u32) -> Result<Vec<Value>> {
        let mut all = Vec::new();
        loop {
            let page = self.get(None, limit)?;
            let page_len = page.len();
            all.extend(page);
            if page_len < limit as usize {
                break;
            }
        }
        Ok(all)
    }
}
