//! Client SDK for a multi-tenant integration gateway.
//!
//! Covers the gateway's token lifecycle ([`auth`]), resource-version
//! resolution against its catalog ([`version`]), a fluent filter-expression
//! builder ([`filter`]), the errors/messages/proxy HTTP clients
//! ([`clients`]), and a background notification poll engine
//! ([`notifications`]).
//!
//! Every fallible call returns [`error::Result`]; construction starts from
//! [`config::GatewayConfig::builder`].

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod notifications;
pub mod version;

pub use config::{GatewayConfig, GatewayConfigBuilder, Region, Timeouts};
pub use error::{GatewayError, Result};

use std::sync::Arc;

use auth::CredentialManager;
use clients::{ErrorsClient, MessagesClient, ProxyClient};
use http::Transport;
use notifications::ChangeNotificationService;
use version::{HttpCatalogClient, VersionResolver};

/// Every client bundled together, built once from a validated
/// [`GatewayConfig`] and sharing one [`Transport`] and one
/// [`CredentialManager`].
pub struct Gateway {
    pub credentials: Arc<CredentialManager>,
    pub versions: VersionResolver<HttpCatalogClient>,
    pub errors: ErrorsClient,
    pub messages: MessagesClient,
    pub proxy: ProxyClient,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let transport = Transport::from_config(&config)?;
        let credentials = Arc::new(CredentialManager::new(&config, transport.clone()));
        let base_url = config.region().base_url().to_string();

        let catalog_client = HttpCatalogClient::new(transport.clone(), Arc::clone(&credentials), base_url.clone());
        let versions = VersionResolver::new(catalog_client);
        let errors = ErrorsClient::new(transport.clone(), Arc::clone(&credentials), base_url.clone());
        let messages = MessagesClient::new(transport.clone(), Arc::clone(&credentials), base_url.clone());
        let proxy = ProxyClient::new(transport, Arc::clone(&credentials), base_url);

        Ok(Gateway {
            credentials,
            versions,
            errors,
            messages,
            proxy,
        })
    }

    /// Builds a [`ChangeNotificationService`] over this gateway's shared
    /// messages/proxy clients, ready to be wrapped in a
    /// [`notifications::Publisher`] subscription.
    pub fn notification_service(&self) -> ChangeNotificationService {
        ChangeNotificationService::new(self.messages.clone(), self.proxy.clone())
    }
}
