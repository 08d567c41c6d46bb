use std::time::Duration;

use crate::error::{GatewayError, Result};

/// Coarse-grained deployment zone determining the gateway's base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Us,
    Canada,
    Europe,
    Australia,
}

impl Region {
    /// Pure function: region + endpoint path -> absolute URL.
    ///
    /// Kept free of any transport/client state so it can be unit tested in
    /// isolation.
    pub fn base_url(&self) -> &'static str {
        match self {
            Region::Us => "https://integrate.elluciancloud.com",
            Region::Canada => "https://integrate.elluciancloud.ca",
            Region::Europe => "https://integrate.elluciancloud.ie",
            Region::Australia => "https://integrate.elluciancloud.com.au",
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

/// Three independent per-request timeouts, each optional with a 60s default,
/// applied uniformly to every synchronous call and every polling fetch.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub request: Duration,
    pub socket_idle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        let default = Duration::from_secs(60);
        Timeouts {
            connect: default,
            request: default,
            socket_idle: default,
        }
    }
}

const API_KEY_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-([0-9a-fA-F]{4}-){3}[0-9a-fA-F]{12}$";

/// Immutable, validated configuration shared by every client built against
/// one tenant, validated eagerly at construction instead of deep in call
/// chains.
///
/// Fields are private: the only way to produce one is
/// [`GatewayConfig::builder`], so a caller can never hand a malformed
/// tenant API key to [`crate::Gateway::new`] via a struct literal that
/// skips [`validate_api_key`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    region: Region,
    api_key: String,
    timeouts: Timeouts,
    auto_refresh: bool,
    expiration_minutes: u32,
    user_agent: String,
}

impl GatewayConfig {
    pub fn builder(api_key: impl Into<String>) -> GatewayConfigBuilder {
        GatewayConfigBuilder::new(api_key)
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn expiration_minutes(&self) -> u32 {
        self.expiration_minutes
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Fluent builder for `GatewayConfig`, validating the tenant API key and
/// expiration minutes at `build()` time.
pub struct GatewayConfigBuilder {
    region: Region,
    api_key: String,
    timeouts: Timeouts,
    auto_refresh: bool,
    expiration_minutes: u32,
    user_agent: String,
}

impl GatewayConfigBuilder {
    fn new(api_key: impl Into<String>) -> Self {
        GatewayConfigBuilder {
            region: Region::default(),
            api_key: api_key.into(),
            timeouts: Timeouts::default(),
            auto_refresh: true,
            expiration_minutes: 60,
            user_agent: "hedgate-client-rs".to_string(),
        }
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    pub fn expiration_minutes(mut self, minutes: u32) -> Self {
        self.expiration_minutes = minutes;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<GatewayConfig> {
        validate_api_key(&self.api_key)?;
        validate_expiration_minutes(self.expiration_minutes)?;
        Ok(GatewayConfig {
            region: self.region,
            api_key: self.api_key,
            timeouts: self.timeouts,
            auto_refresh: self.auto_refresh,
            expiration_minutes: self.expiration_minutes,
            user_agent: self.user_agent,
        })
    }
}

pub(crate) fn validate_api_key(key: &str) -> Result<()> {
    let re = regex::Regex::new(API_KEY_PATTERN).expect("static regex is valid");
    if re.is_match(key) {
        Ok(())
    } else {
        Err(GatewayError::invalid_argument(
            "GatewayConfig",
            "api_key",
            "must be a GUID matching ^[0-9a-fA-F]{8}-([0-9a-fA-F]{4}-){3}[0-9a-fA-F]{12}$",
        ))
    }
}

pub(crate) fn validate_expiration_minutes(minutes: u32) -> Result<()> {
    if (1..=120).contains(&minutes) {
        Ok(())
    } else {
        Err(GatewayError::invalid_argument(
            "GatewayConfig",
            "expiration_minutes",
            "must be in [1, 120]",
        ))
    }
}
