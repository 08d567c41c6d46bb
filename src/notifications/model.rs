use serde::Deserialize;
use serde_json::Value;

/// A single change notification drained from the message queue.
///
/// Opaque beyond the descriptor fields the engine needs to route and
/// version-check it; `content` is left as untyped JSON since the tenant
/// application, not this crate, knows the resource's schema.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeNotification {
    pub resource: String,
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_content")]
    pub content: Value,
}

fn default_content() -> Value {
    Value::Null
}

impl ChangeNotification {
    /// Returns a copy with `content` and `version` replaced, used by the
    /// per-resource version override.
    pub(crate) fn with_content(mut self, version: impl Into<String>, content: Value) -> Self {
        self.version = Some(version.into());
        self.content = content;
        self
    }
}
