use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::GatewayError;
use crate::notifications::service::{ChangeNotificationService, NotificationOutcome};
use crate::notifications::subscription::{Subscription, SubscriptionOptions, SubscriptionState};

/// Receives individually-dispatched notifications: one `on_next` call per
/// item in a drained batch.
pub trait ItemSubscriber: Send + Sync {
    fn on_next(&self, item: NotificationOutcome) -> std::result::Result<(), String>;
    fn on_error(&self, error: GatewayError);
    fn on_complete(&self);
}

/// Receives whole batches: one `on_next` call per drained fetch.
pub trait BatchSubscriber: Send + Sync {
    fn on_next(&self, batch: Vec<NotificationOutcome>) -> std::result::Result<(), String>;
    fn on_error(&self, error: GatewayError);
    fn on_complete(&self);
}

/// Erases the per-item/per-batch distinction for the scheduler, which only
/// needs to dispatch a drained batch and know whether to check
/// cancellation after every item or once per batch.
pub(crate) enum SubscriberSink {
    Item(std::sync::Arc<dyn ItemSubscriber>),
    Batch(std::sync::Arc<dyn BatchSubscriber>),
}

impl SubscriberSink {
    /// Dispatches a drained batch, re-checking `cancelled` between item
    /// dispatches (per-item mode) or once after the whole batch
    /// (per-batch mode). Returns whether cancellation was observed.
    pub(crate) fn dispatch(&self, batch: Vec<NotificationOutcome>, cancelled: &std::sync::atomic::AtomicBool) -> bool {
        use std::sync::atomic::Ordering;
        match self {
            SubscriberSink::Item(subscriber) => {
                for item in batch {
                    if let Err(message) = subscriber.on_next(item) {
                        subscriber.on_error(GatewayError::subscription(message, None));
                    }
                    if cancelled.load(Ordering::SeqCst) {
                        return true;
                    }
                }
                false
            }
            SubscriberSink::Batch(subscriber) => {
                if let Err(message) = subscriber.on_next(batch) {
                    subscriber.on_error(GatewayError::subscription(message, None));
                }
                cancelled.load(Ordering::SeqCst)
            }
        }
    }

    pub(crate) fn on_error(&self, error: GatewayError) {
        match self {
            SubscriberSink::Item(s) => s.on_error(error),
            SubscriberSink::Batch(s) => s.on_error(error),
        }
    }

    pub(crate) fn on_complete(&self) {
        match self {
            SubscriberSink::Item(s) => s.on_complete(),
            SubscriberSink::Batch(s) => s.on_complete(),
        }
    }
}

/// Owns the subscriber registry — `subscriber -> subscription` — shared by
/// both the per-item and per-batch publisher variants. Mutation happens on
/// `subscribe`/`unsubscribe` behind a single mutex, per the "shared
/// resources" concurrency model.
#[derive(Default)]
pub struct Publisher {
    registry: Arc<Mutex<HashMap<u64, Subscription>>>,
    next_id: AtomicU64,
}

impl Publisher {
    pub fn new() -> Self {
        Publisher {
            registry: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe_item(
        &self,
        service: Arc<ChangeNotificationService>,
        subscriber: Arc<dyn ItemSubscriber>,
        options: SubscriptionOptions,
    ) -> u64 {
        self.subscribe(service, SubscriberSink::Item(subscriber), options)
    }

    pub fn subscribe_batch(
        &self,
        service: Arc<ChangeNotificationService>,
        subscriber: Arc<dyn BatchSubscriber>,
        options: SubscriptionOptions,
    ) -> u64 {
        self.subscribe(service, SubscriberSink::Batch(subscriber), options)
    }

    fn subscribe(
        &self,
        service: Arc<ChangeNotificationService>,
        sink: SubscriberSink,
        options: SubscriptionOptions,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let registry = Arc::clone(&self.registry);
        let subscription = Subscription::start(service, sink, options, move || {
            registry.lock().expect("registry mutex poisoned").remove(&id);
        });
        self.registry
            .lock()
            .expect("registry mutex poisoned")
            .insert(id, subscription);
        id
    }

    /// Requests cancellation of the given subscription. The subscription
    /// removes itself from the registry once its current tick tears down;
    /// this call only flips the cooperative flag.
    pub fn unsubscribe(&self, id: u64) {
        if let Some(subscription) = self.registry.lock().expect("registry mutex poisoned").get(&id) {
            subscription.cancel();
        }
    }

    pub fn subscription_state(&self, id: u64) -> Option<SubscriptionState> {
        self.registry
            .lock()
            .expect("registry mutex poisoned")
            .get(&id)
            .map(Subscription::state)
    }

    pub fn active_count(&self) -> usize {
        self.registry.lock().expect("registry mutex poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialManager;
    use crate::clients::{MessagesClient, ProxyClient};
    use crate::config::Timeouts;
    use crate::http::Transport;
    use std::time::Duration;

    fn service_against(server: &mockito::ServerGuard) -> ChangeNotificationService {
        let transport = Transport::new(Timeouts::default(), "test-agent").unwrap();
        let credentials = Arc::new(CredentialManager::with_base_url(
            server.url(),
            "11111111-1111-1111-1111-111111111111".to_string(),
            transport.clone(),
            true,
            60,
        ));
        let messages = MessagesClient::new(transport.clone(), Arc::clone(&credentials), server.url());
        let proxy = ProxyClient::new(transport, credentials, server.url());
        ChangeNotificationService::new(messages, proxy)
    }

    fn mock_auth(server: &mut mockito::ServerGuard) {
        server
            .mock("POST", "/auth?expirationMinutes=60")
            .with_status(200)
            .with_body("TK1")
            .create();
    }

    struct RecordingSubscriber {
        items: Mutex<Vec<String>>,
        completed: std::sync::atomic::AtomicBool,
    }

    impl RecordingSubscriber {
        fn new() -> Arc<Self> {
            Arc::new(RecordingSubscriber {
                items: Mutex::new(Vec::new()),
                completed: std::sync::atomic::AtomicBool::new(false),
            })
        }
    }

    impl ItemSubscriber for RecordingSubscriber {
        fn on_next(&self, item: NotificationOutcome) -> std::result::Result<(), String> {
            if let NotificationOutcome::Ready(n) = item {
                self.items.lock().unwrap().push(n.id);
            }
            Ok(())
        }
        fn on_error(&self, _error: GatewayError) {}
        fn on_complete(&self) {
            self.completed.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn subscribe_dispatches_items_and_removes_from_registry_on_cancel() {
        let mut server = mockito::Server::new();
        mock_auth(&mut server);
        // First hit returns a 3-item batch, every hit after returns empty —
        // the scheduler's own drain-until-empty loop then waits for the
        // next tick instead of looping forever inside this one.
        let served_first = Arc::new(std::sync::atomic::AtomicBool::new(false));
        server
            .mock("GET", "/consume?limit=3")
            .with_status(200)
            .with_body_from_request(move |_| {
                if served_first.swap(true, Ordering::SeqCst) {
                    b"[]".to_vec()
                } else {
                    br#"[{"resource":"persons","id":"n1","content":{}},{"resource":"persons","id":"n2","content":{}},{"resource":"persons","id":"n3","content":{}}]"#.to_vec()
                }
            })
            .expect_at_least(1)
            .create();

        let service = Arc::new(service_against(&server));
        let subscriber = RecordingSubscriber::new();
        let publisher = Publisher::new();

        let options = SubscriptionOptions {
            polling_interval: Duration::from_millis(30),
            batch_size: Some(3),
        };
        let id = publisher.subscribe_item(Arc::clone(&service), subscriber.clone(), options);
        assert_eq!(publisher.active_count(), 1);

        // Give the scheduler thread time past its 1s initial delay window
        // substitute: poll until items show up instead of sleeping 1s+.
        let deadline = std::time::Instant::now() + Duration::from_secs(3);
        while subscriber.items.lock().unwrap().is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }

        publisher.unsubscribe(id);

        let deadline = std::time::Instant::now() + Duration::from_secs(3);
        while publisher.active_count() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }

        assert_eq!(publisher.active_count(), 0);
        assert!(subscriber.completed.load(Ordering::SeqCst));
    }
}
