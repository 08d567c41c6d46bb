mod model;
mod publisher;
mod service;
mod subscription;

pub use model::ChangeNotification;
pub use publisher::{BatchSubscriber, ItemSubscriber, Publisher};
pub use service::{ChangeNotificationService, NotificationOutcome};
pub use subscription::{SubscriptionOptions, SubscriptionState};
