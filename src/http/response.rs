use std::collections::HashMap;

use serde_json::Value;

/// Response envelope returned by every transport call.
///
/// Header names are case-preserved; if the transport ever surfaces the same
/// header twice, last write wins.
#[derive(Debug, Clone, Default)]
pub struct GatewayResponse {
    pub headers: HashMap<String, String>,
    pub status: u16,
    body_text: Option<String>,
    pub requested_url: Option<String>,
    typed: Option<Value>,
}

impl GatewayResponse {
    pub fn new(status: u16, headers: HashMap<String, String>, body: String, url: String) -> Self {
        GatewayResponse {
            headers,
            status,
            body_text: Some(body),
            requested_url: Some(url),
            typed: None,
        }
    }

    /// Status defaults to 500 when the transport surfaces no status line.
    pub fn with_default_status() -> Self {
        GatewayResponse {
            status: 500,
            ..Default::default()
        }
    }

    /// The raw text body, if a typed payload hasn't been attached.
    pub fn body(&self) -> Option<&str> {
        self.body_text.as_deref()
    }

    /// Attach a decoded typed payload, clearing the text body to avoid
    /// double retention (per the "Response envelope" invariant).
    pub fn with_typed(mut self, value: Value) -> Self {
        self.typed = Some(value);
        self.body_text = None;
        self
    }

    pub fn typed(&self) -> Option<&Value> {
        self.typed.as_ref()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup (the gateway's header names are
    /// conventionally lower-kebab, e.g. `x-remaining`, but HTTP header
    /// casing is not normatively significant).
    pub fn header(&self, name: &str) -> Option<&str> {
        self
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_as_usize(&self, name: &str) -> Option<usize> {
        self.header(name).and_then(|v| v.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_500() {
        assert_eq!(GatewayResponse::with_default_status().status, 500);
    }

    #[test]
    fn typed_payload_clears_text_body() {
        let resp = GatewayResponse::new(
            200,
            HashMap::new(),
            "raw".to_string(),
            "https://x".to_string(),
        )
        .with_typed(serde_json::json!({"a": 1}));
        assert!(resp.body().is_none());
        assert_eq!(resp.typed().unwrap()["a"], 1);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("X-Remaining".to_string(), "5".to_string());
        let resp = GatewayResponse::new(200, headers, String::new(), String::new());
        assert_eq!(resp.header_as_usize("x-remaining"), Some(5));
    }
}
