pub mod errors;
pub mod messages;
pub mod proxy;

pub use errors::ErrorsClient;
pub use messages::MessagesClient;
pub use proxy::{ProxyClient, ProxyFilter};
