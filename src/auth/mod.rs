pub mod credentials;

pub use credentials::{AccessToken, CredentialManager};
