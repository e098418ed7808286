//! Client configuration.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{BankCodeError, Result};
use crate::masking::mask_value;
use crate::rate_limiter::RateLimiter;

/// Default BankCode API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://apis.bankcode-jp.com/v1";

/// Subscription tier of the API key.
///
/// Only the free tier is rate limited on the client side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Free tier, limited to one request every three seconds.
    #[default]
    Free,
    /// Standard paid tier.
    Standard,
    /// Pro paid tier.
    Pro,
}

impl Plan {
    /// Returns the plan name used by the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Standard => "standard",
            Self::Pro => "pro",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = BankCodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "standard" => Ok(Self::Standard),
            "pro" => Ok(Self::Pro),
            other => Err(BankCodeError::config("plan", format!("unknown plan {other}"))),
        }
    }
}

/// Explicit request rate overriding the plan's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Milliseconds between requests.
    pub interval_ms: u64,
    /// Requests allowed back to back.
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_burst() -> u32 {
    1
}

/// Configuration for [`BankCodeClient`](crate::BankCodeClient).
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for API requests.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. The API works without one, at a lower quota.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Send the API key as an `apikey` header instead of a query parameter.
    #[serde(default)]
    pub key_in_header: bool,

    /// Subscription tier, selects the client-side rate limit.
    #[serde(default)]
    pub plan: Plan,

    /// Explicit rate limit, takes precedence over `plan`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitConfig>,

    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("bankcode-rs/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            key_in_header: false,
            plan: Plan::default(),
            rate_limit: None,
            user_agent: default_user_agent(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(mask_value))
            .field("key_in_header", &self.key_in_header)
            .field("plan", &self.plan)
            .field("rate_limit", &self.rate_limit)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a new builder for `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Checks the configuration and returns the parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`BankCodeError::Config`] if the API key is present but
    /// empty, or the base URL is empty or unparseable.
    pub fn validate(&self) -> Result<Url> {
        if matches!(self.api_key.as_deref(), Some(key) if key.is_empty()) {
            return Err(BankCodeError::config("api_key", "API key is empty"));
        }
        if self.base_url.is_empty() {
            return Err(BankCodeError::config("base_url", "URL is empty"));
        }
        if let Some(limit) = &self.rate_limit
            && limit.burst == 0
            && limit.interval_ms > 0
        {
            return Err(BankCodeError::config("rate_limit", "burst must be at least 1"));
        }

        Url::parse(&self.base_url)
            .map_err(|e| BankCodeError::config("base_url", e.to_string()))
    }

    /// Builds the rate limiter this configuration asks for.
    #[must_use]
    pub fn rate_limiter(&self) -> RateLimiter {
        match &self.rate_limit {
            Some(limit) => RateLimiter::new(Duration::from_millis(limit.interval_ms), limit.burst),
            None => RateLimiter::for_plan(self.plan),
        }
    }
}

/// Builder for `ClientConfig`.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    key_in_header: Option<bool>,
    plan: Option<Plan>,
    rate_limit: Option<RateLimitConfig>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Overrides the API endpoint.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sends the API key as a request header instead of a query parameter.
    #[must_use]
    pub fn key_in_header(mut self, enabled: bool) -> Self {
        self.key_in_header = Some(enabled);
        self
    }

    /// Sets the subscription tier.
    #[must_use]
    pub fn plan(mut self, plan: Plan) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Sets an explicit request rate.
    #[must_use]
    pub fn rate_limit(mut self, interval: Duration, burst: u32) -> Self {
        self.rate_limit = Some(RateLimitConfig {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            burst,
        });
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the `ClientConfig`.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.unwrap_or_else(default_base_url),
            api_key: self.api_key,
            key_in_header: self.key_in_header.unwrap_or(false),
            plan: self.plan.unwrap_or_default(),
            rate_limit: self.rate_limit,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
        }
    }
}
