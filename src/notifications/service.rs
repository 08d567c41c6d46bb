use std::collections::HashMap;

use crate::clients::{MessagesClient, ProxyClient, ProxyFilter};
use crate::error::{GatewayError, Result};
use crate::notifications::model::ChangeNotification;

/// Outcome of routing one polled notification through the per-resource
/// version override. A failed override never aborts the batch — it is
/// surfaced per-notification so the caller can keep processing the rest.
#[derive(Debug)]
pub enum NotificationOutcome {
    Ready(ChangeNotification),
    OverrideFailed {
        notification: ChangeNotification,
        error: GatewayError,
    },
}

/// Fetches and version-normalizes batches of change notifications.
///
/// Configured with a map of `resource -> versionHeader`; when a polled
/// notification's resource appears in the map and its version doesn't
/// already match, the service re-reads that resource/id at the declared
/// version and swaps in the fresh content.
pub struct ChangeNotificationService {
    messages: MessagesClient,
    proxy: ProxyClient,
    overrides: HashMap<String, String>,
}

impl ChangeNotificationService {
    pub fn new(messages: MessagesClient, proxy: ProxyClient) -> Self {
        ChangeNotificationService {
            messages,
            proxy,
            overrides: HashMap::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn set_override(&mut self, resource: impl Into<String>, version_header: impl Into<String>) {
        self.overrides.insert(resource.into(), version_header.into());
    }

    /// Fetches up to `limit` notifications (`[1, 1000]`, validated by the
    /// underlying messages client) and applies any configured overrides.
    pub fn fetch_batch(&self, limit: u32) -> Result<Vec<NotificationOutcome>> {
        let raw = self.messages.get(None, limit)?;
        let mut outcomes = Vec::with_capacity(raw.len());
        for value in raw {
            let notification: ChangeNotification =
                serde_json::from_value(value).map_err(|source| GatewayError::Decode {
                    url: "<message payload>".to_string(),
                    source,
                })?;
            outcomes.push(self.apply_override(notification));
        }
        Ok(outcomes)
    }

    fn apply_override(&self, notification: ChangeNotification) -> NotificationOutcome {
        let Some(version_header) = self.overrides.get(&notification.resource) else {
            return NotificationOutcome::Ready(notification);
        };
        if notification.version.as_deref() == Some(version_header.as_str()) {
            return NotificationOutcome::Ready(notification);
        }
        match self.refetch(&notification.resource, &notification.id, version_header) {
            Ok(content) => NotificationOutcome::Ready(notification.with_content(version_header.clone(), content)),
            Err(error) => NotificationOutcome::OverrideFailed { notification, error },
        }
    }

    fn refetch(&self, resource: &str, id: &str, version_header: &str) -> Result<serde_json::Value> {
        let path = format!("{}/{}", resource, id);
        self.proxy.get(&path, version_header, ProxyFilter::None)
    }
}
