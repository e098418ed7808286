//! # BankCode Client
//!
//! Async client for the BankCode API, a lookup service for Japanese bank
//! and branch codes.
//!
//! This crate provides:
//! - Bank and branch lookups, single-record and cursor-paged
//! - Client-side rate limiting matched to the subscription plan
//! - API key placement in the query string or a request header
//! - Caller-driven cancellation through [`CancellationToken`]
//!
//! # Architecture
//!
//! - `request` - builds GET requests from get/list parameters
//! - `client` - dispatches requests through the rate limiter and checks status
//! - `bank`, `branch`, `version` - one method per endpoint
//! - `rate_limiter` - token bucket shared by every clone of a client
//!
//! # Example
//!
//! ```ignore
//! use bankcode_client::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ClientConfig::builder()
//!     .api_key(std::env::var("BANKCODE_API_KEY")?)
//!     .plan(Plan::Free)
//!     .build();
//! let client = BankCodeClient::new(config)?;
//! let cancel = CancellationToken::new();
//!
//! let mut params = ListParameter::new().limit(100);
//! loop {
//!     let page = client.list_banks(&cancel, &params).await?;
//!     for bank in &page {
//!         println!("{} {}", bank.code, bank.name);
//!     }
//!     match page.next_params(&params) {
//!         Some(next) => params = next,
//!         None => break,
//!     }
//! }
//! ```

#![warn(missing_docs)]

mod bank;
mod branch;
mod client;
mod config;
mod error;
mod page;
mod rate_limiter;
mod request;
mod version;

/// API key redaction for log output.
pub mod masking;

#[cfg(test)]
mod test_support;

pub use bank::{Bank, Banks};
pub use branch::{Branch, Branches};
pub use client::{BankCodeClient, decode_json};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL, Plan, RateLimitConfig};
pub use error::{BankCodeError, Result};
pub use page::Page;
pub use rate_limiter::{FREE_PLAN_INTERVAL, RateLimiter};
pub use request::{GetParameter, ListParameter, MAX_LIMIT};

pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Bank, BankCodeClient, BankCodeError, Banks, Branch, Branches, ClientConfig, GetParameter,
        ListParameter, Page, Plan,
    };
}
