use std::collections::HashMap;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::tls::Version as TlsVersion;
use reqwest::Method;
use log::debug;

use crate::config::{GatewayConfig, Timeouts};
use crate::error::{GatewayError, Result};
use crate::http::response::GatewayResponse;

/// Executes an HTTP method against a URL with headers and an optional
/// body, returning a populated `GatewayResponse`.
///
/// One `Transport` is built per `GatewayConfig` and reused across every
/// client (errors, messages, catalog, proxy, auth); the underlying
/// `reqwest::blocking::Client` pools connections and is safe to share.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    user_agent: String,
}

impl Transport {
    pub fn new(timeouts: Timeouts, user_agent: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.request)
            .pool_idle_timeout(timeouts.socket_idle)
            .min_tls_version(TlsVersion::TLS_1_2)
            .build()
            .map_err(|source| GatewayError::Transport {
                url: "<client construction>".to_string(),
                source,
            })?;
        Ok(Transport {
            client,
            user_agent: user_agent.into(),
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Transport::new(config.timeouts(), config.user_agent().to_string())
    }

    /// GET with an optional bearer token and extra headers.
    pub fn get(&self, url: &str, bearer: Option<&str>, extra: &[(&str, &str)]) -> Result<GatewayResponse> {
        self.execute(Method::GET, url, bearer, extra, None)
    }

    pub fn head(&self, url: &str, bearer: Option<&str>, extra: &[(&str, &str)]) -> Result<GatewayResponse> {
        self.execute(Method::HEAD, url, bearer, extra, None)
    }

    pub fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        extra: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<GatewayResponse> {
        self.execute(Method::POST, url, bearer, extra, Some(body))
    }

    pub fn post_empty(&self, url: &str, bearer: Option<&str>, extra: &[(&str, &str)]) -> Result<GatewayResponse> {
        self.execute(Method::POST, url, bearer, extra, None)
    }

    fn execute(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        extra: &[(&str, &str)],
        json_body: Option<&serde_json::Value>,
    ) -> Result<GatewayResponse> {
        debug!("{} {}", method, url);

        let mut req: RequestBuilder = self
            .client
            .request(method, url)
            .header("Pragma", "no-cache")
            .header("Cache-Control", "no-cache")
            .header("User-Agent", &self.user_agent);

        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        for (k, v) in extra {
            req = req.header(*k, *v);
        }
        if let Some(body) = json_body {
            req = req.json(body);
        }

        let res = req.send().map_err(|source| GatewayError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = res.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in res.headers().iter() {
            if let Ok(v) = value.to_str() {
                // last write wins on duplicate header names
                headers.insert(name.as_str().to_string(), v.to_string());
            }
        }
        let reason = res
            .status()
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string();
        let requested_url = res.url().to_string();

        let body = res.text().map_err(|source| GatewayError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !(200..300).contains(&status) {
            let body = if body.is_empty() { reason } else { body };
            return Err(GatewayError::HttpResponse {
                status,
                url: requested_url,
                body,
            });
        }

        Ok(GatewayResponse::new(status, headers, body, requested_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_builds_with_default_timeouts() {
        let t = Transport::new(Timeouts::default(), "test-agent/1.0");
        assert!(t.is_ok());
    }

    #[test]
    fn get_returns_body_and_headers_on_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/ping")
            .with_status(200)
            .with_header("x-remaining", "3")
            .with_body("pong")
            .create();

        let transport = Transport::new(Timeouts::default(), "test-agent/1.0").unwrap();
        let url = format!("{}/ping", server.url());
        let resp = transport.get(&url, Some("tok"), &[]).unwrap();

        mock.assert();
        assert_eq!(resp.body(), Some("pong"));
        assert_eq!(resp.header_as_usize("x-remaining"), Some(3));
    }

    #[test]
    fn non_2xx_surfaces_http_response_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/broken")
            .with_status(503)
            .with_body("down for maintenance")
            .create();

        let transport = Transport::new(Timeouts::default(), "test-agent/1.0").unwrap();
        let url = format!("{}/broken", server.url());
        let err = transport.get(&url, None, &[]).unwrap_err();
        match err {
            GatewayError::HttpResponse { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "down for maintenance");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn empty_body_falls_back_to_reason_phrase() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/empty").with_status(404).create();

        let transport = Transport::new(Timeouts::default(), "test-agent/1.0").unwrap();
        let url = format!("{}/empty", server.url());
        let err = transport.get(&url, None, &[]).unwrap_err();
        match err {
            GatewayError::HttpResponse { body, .. } => assert_eq!(body, "Not Found"),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
