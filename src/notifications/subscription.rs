use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, warn};

use crate::notifications::publisher::SubscriberSink;
use crate::notifications::service::ChangeNotificationService;

/// Fetches this many notifications per tick when the caller requests the
/// implementation-defined "gateway default" sentinel (`request(None)`)
/// instead of an explicit count.
const GATEWAY_DEFAULT_BATCH_SIZE: u32 = 100;

const INITIAL_DELAY: Duration = Duration::from_secs(1);

/// `[NEW] -> [READY] -> [ACTIVE] -> [CANCELED] -> [TERMINATED]`, per the
/// subscription lifecycle diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    New,
    Ready,
    Active,
    Canceled,
    Terminated,
}

#[derive(Debug, Clone, Copy)]
pub struct SubscriptionOptions {
    pub polling_interval: Duration,
    /// `None` is the "fetch the gateway's default batch size" sentinel;
    /// `Some(n)` must be in `[1, 1000]` (enforced by the messages client).
    pub batch_size: Option<u32>,
}

impl Default for SubscriptionOptions {
    fn default() -> Self {
        SubscriptionOptions {
            polling_interval: Duration::from_secs(60),
            batch_size: None,
        }
    }
}

/// A running (or torn-down) subscription: the cooperative-cancellation
/// flag, the current lifecycle state, and the scheduler thread's handle.
pub(crate) struct Subscription {
    cancelled: Arc<AtomicBool>,
    state: Arc<Mutex<SubscriptionState>>,
    thread: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Starts the dedicated single-thread scheduler: `INITIAL_DELAY` once,
    /// then one tick every `options.polling_interval`, running the drain
    /// protocol until cancellation or a hard-stop transport error.
    ///
    /// `on_teardown` is invoked from the polling thread as its very last
    /// act, so the owning publisher can remove this subscription from its
    /// registry without the caller having to join the thread.
    pub(crate) fn start(
        service: Arc<ChangeNotificationService>,
        sink: SubscriberSink,
        options: SubscriptionOptions,
        on_teardown: impl FnOnce() + Send + 'static,
    ) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let state = Arc::new(Mutex::new(SubscriptionState::Ready));

        let thread_cancelled = Arc::clone(&cancelled);
        let thread_state = Arc::clone(&state);
        let batch_size = options.batch_size.unwrap_or(GATEWAY_DEFAULT_BATCH_SIZE);
        let polling_interval = options.polling_interval;

        let thread = std::thread::spawn(move || {
            *thread_state.lock().expect("subscription state mutex poisoned") = SubscriptionState::Active;
            std::thread::sleep(INITIAL_DELAY);

            'ticks: loop {
                if thread_cancelled.load(Ordering::SeqCst) {
                    break 'ticks;
                }

                // Drain protocol: within one tick, keep fetching and
                // dispatching batches back-to-back until a fetch comes
                // back empty, re-checking cancellation before each fetch
                // and between dispatches inside the batch.
                loop {
                    if thread_cancelled.load(Ordering::SeqCst) {
                        break 'ticks;
                    }

                    match service.fetch_batch(batch_size) {
                        Ok(outcomes) if outcomes.is_empty() => break,
                        Ok(outcomes) => {
                            let observed_cancel = sink.dispatch(outcomes, &thread_cancelled);
                            if observed_cancel {
                                break 'ticks;
                            }
                        }
                        Err(error) => {
                            warn!("subscription transport error, tearing down: {error}");
                            sink.on_error(crate::error::GatewayError::subscription(
                                "transport failure while polling for notifications",
                                Some(error),
                            ));
                            break 'ticks;
                        }
                    }
                }

                std::thread::sleep(polling_interval);
            }

            sink.on_complete();
            *thread_state.lock().expect("subscription state mutex poisoned") = SubscriptionState::Terminated;
            debug!("subscription scheduler shut down");
            on_teardown();
        });

        Subscription {
            cancelled,
            state,
            thread: Some(thread),
        }
    }

    /// Atomically requests cancellation. The in-flight tick (if any)
    /// finishes its current batch, observes the flag at the next safe
    /// point, and tears itself down asynchronously.
    pub(crate) fn cancel(&self) {
        *self.state.lock().expect("subscription state mutex poisoned") = SubscriptionState::Canceled;
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn state(&self) -> SubscriptionState {
        *self.state.lock().expect("subscription state mutex poisoned")
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Dropping a still-running JoinHandle detaches the thread; it was
        // already asked to cancel cooperatively and will finish its
        // current tick on its own.
        if let Some(thread) = self.thread.take() {
            if thread.is_finished() {
                let _ = thread.join();
            }
        }
    }
}
