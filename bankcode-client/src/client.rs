//! Client handle and the rate-limited request dispatcher.

use reqwest::{Client, Request, StatusCode, Url, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{BankCodeError, Result};
use crate::masking::mask_url;
use crate::rate_limiter::RateLimiter;

/// Client for the BankCode API.
///
/// Cloning is cheap; clones share the transport and the rate limiter, so
/// requests issued from any clone count against the same quota.
///
/// # Example
///
/// ```ignore
/// use bankcode_client::{BankCodeClient, ClientConfig, GetParameter};
/// use tokio_util::sync::CancellationToken;
///
/// let config = ClientConfig::builder().api_key("your_api_key").build();
/// let client = BankCodeClient::new(config)?;
///
/// let cancel = CancellationToken::new();
/// let bank = client.get_bank(&cancel, "0001", &GetParameter::new()).await?;
/// println!("{} {}", bank.code, bank.name);
/// ```
#[derive(Debug, Clone)]
pub struct BankCodeClient {
    config: Arc<ClientConfig>,
    base_url: Url,
    http_client: Client,
    rate_limiter: Arc<RateLimiter>,
}

impl BankCodeClient {
    /// Creates a client with its own HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`BankCodeError::Config`] if the configuration is invalid or
    /// the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            config
                .user_agent
                .parse()
                .map_err(|_| BankCodeError::config("user_agent", "invalid header value"))?,
        );

        let http_client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                BankCodeError::config("http_client", format!("failed to create HTTP client: {e}"))
            })?;

        Self::with_http_client(config, http_client)
    }

    /// Creates a client on top of an existing HTTP transport.
    ///
    /// The transport's own default headers and timeouts apply; the
    /// configured user agent is not added.
    ///
    /// # Errors
    ///
    /// Returns [`BankCodeError::Config`] if the configuration is invalid.
    pub fn with_http_client(config: ClientConfig, http_client: Client) -> Result<Self> {
        let base_url = config.validate()?;
        let rate_limiter = Arc::new(config.rate_limiter());

        debug!(
            base_url = %base_url,
            plan = %config.plan,
            key_in_header = config.key_in_header,
            "BankCode client created"
        );

        Ok(Self {
            config: Arc::new(config),
            base_url,
            http_client,
            rate_limiter,
        })
    }

    /// Creates a client for the default endpoint on the free plan.
    ///
    /// # Errors
    ///
    /// Returns [`BankCodeError::Config`] if `api_key` is empty.
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::builder().api_key(api_key).build())
    }

    /// Replaces the rate limiter, e.g. to share one limiter between clients.
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the parsed base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Sends a built request and decodes the body of a 200 response.
    ///
    /// Waits on the rate limiter first. The response body is read to the end
    /// before the status is inspected, so the connection is released on
    /// every path. `decode` only runs for status 200.
    ///
    /// # Errors
    ///
    /// - [`BankCodeError::Cancelled`] if `cancel` fires while waiting or in flight.
    /// - [`BankCodeError::Network`] if the request fails or the body cannot be read.
    /// - [`BankCodeError::Status`] for any status other than 200.
    /// - Whatever `decode` returns.
    pub async fn execute<T, F>(
        &self,
        cancel: &CancellationToken,
        request: Request,
        decode: F,
    ) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        self.rate_limiter.acquire(cancel).await?;

        let method = request.method().clone();
        let url = mask_url(request.url().as_str());
        debug!(method = %method, url = %url, "Sending request");

        let started = Instant::now();
        let exchange = async {
            let response = self.http_client.execute(request).await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, BankCodeError>((status, body))
        };

        let (status, body) = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(url = %url, "Request cancelled in flight");
                return Err(BankCodeError::Cancelled);
            }
            result = exchange => result?,
        };

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Response received"
        );

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), url = %url, "Unexpected HTTP status");
            return Err(BankCodeError::Status {
                status_code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        decode(&body)
    }
}

/// Decodes a JSON body into `T`.
///
/// # Errors
///
/// Returns [`BankCodeError::Decode`] if the body is not valid JSON of shape `T`.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(BankCodeError::from)
}
