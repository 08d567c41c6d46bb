use thiserror::Error;

/// The error taxonomy for the whole crate.
///
/// Every public, fallible operation returns `Result<T, GatewayError>`. Kinds
/// are never swallowed; the polling engine surfaces transport/decode errors
/// to `on_error` rather than retrying silently (see `notifications::subscription`).
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A documented input constraint was violated: a null/blank required
    /// field, a malformed tenant API key, an out-of-range expiry or limit,
    /// or an empty filter-builder field.
    #[error("invalid argument '{field}' on {target}: {reason}")]
    InvalidArgument {
        field: String,
        target: String,
        reason: String,
    },

    /// Connection refused, DNS failure, timeout, TLS handshake failure, or
    /// other I/O failure below the HTTP response line.
    #[error("transport error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A non-2xx HTTP response. Carries the status and the body (or the
    /// reason phrase when the body was empty).
    #[error("HTTP {status} from {url}: {body}")]
    HttpResponse {
        status: u16,
        url: String,
        body: String,
    },

    /// The requested resource is absent from the catalog.
    #[error("resource '{resource}' not found in catalog")]
    ResourceNotFound { resource: String },

    /// The requested version shape is not supported by the resource.
    #[error("resource '{resource}' does not support requested version '{requested}'")]
    UnsupportedVersion { resource: String, requested: String },

    /// The response body failed to parse against the expected shape.
    #[error("failed to decode response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Raised during polling: wraps the underlying cause and carries a
    /// subscriber-facing message.
    #[error("subscription error: {message}")]
    Subscription {
        message: String,
        #[source]
        source: Option<Box<GatewayError>>,
    },
}

impl GatewayError {
    pub(crate) fn invalid_argument(
        target: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GatewayError::InvalidArgument {
            field: field.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn subscription(message: impl Into<String>, source: Option<GatewayError>) -> Self {
        GatewayError::Subscription {
            message: message.into(),
            source: source.map(Box::new),
        }
    }
}

/// Crate-local result alias, mirroring the convention of re-exporting a
/// single `Result<T>` from the crate root.
pub type Result<T> = std::result::Result<T, GatewayError>;
