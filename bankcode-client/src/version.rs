use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::client::{BankCodeClient, decode_json};
use crate::error::Result;
use crate::request::GetParameter;

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

impl BankCodeClient {
    /// Returns the API version string.
    ///
    /// `api_key` overrides the client key for this call when non-empty.
    ///
    /// # Errors
    ///
    /// Fails at any stage described by [`BankCodeError`](crate::BankCodeError).
    pub async fn get_version(
        &self,
        cancel: &CancellationToken,
        api_key: Option<&str>,
    ) -> Result<String> {
        let mut params = GetParameter::new();
        if let Some(key) = api_key {
            params = params.api_key(key);
        }

        let request = self.build_get_request(&["version"], &params)?;
        let response: VersionResponse = self.execute(cancel, request, decode_json).await?;
        Ok(response.version)
    }
}
