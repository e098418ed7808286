//! Branch lookups.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{BankCodeClient, decode_json};
use crate::error::Result;
use crate::page::{Page, null_as_default};
use crate::request::{GetParameter, ListParameter};

/// A branch of a bank.
///
/// Attributes left out by a `fields` projection are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    /// Three-digit branch code.
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    /// Branch name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Half-width katakana reading.
    #[serde(default, deserialize_with = "null_as_default")]
    pub half_width_kana: String,
    /// Full-width katakana reading.
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_width_kana: String,
    /// Hiragana reading.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hiragana: String,
}

/// A page of branches.
pub type Branches = Page<Branch>;

impl BankCodeClient {
    /// Fetches the branches registered under a bank and branch code.
    ///
    /// A code pair can map to more than one physical branch, so the result
    /// is a list.
    ///
    /// # Errors
    ///
    /// Fails at any stage described by [`BankCodeError`](crate::BankCodeError).
    pub async fn get_branch(
        &self,
        cancel: &CancellationToken,
        bank_code: &str,
        branch_code: &str,
        params: &GetParameter,
    ) -> Result<Vec<Branch>> {
        let request =
            self.build_get_request(&["banks", bank_code, "branches", branch_code], params)?;
        let branches: Vec<Branch> = self.execute(cancel, request, decode_json).await?;

        debug!(
            bank_code,
            branch_code,
            count = branches.len(),
            "Branch fetched"
        );
        Ok(branches)
    }

    /// Lists the branches of a bank one page at a time.
    ///
    /// # Errors
    ///
    /// Fails at any stage described by [`BankCodeError`](crate::BankCodeError).
    pub async fn list_branches(
        &self,
        cancel: &CancellationToken,
        bank_code: &str,
        params: &ListParameter,
    ) -> Result<Branches> {
        let request = self.build_list_request(&["banks", bank_code, "branches"], params)?;
        let branches: Branches = self.execute(cancel, request, decode_json).await?;

        if !branches.is_consistent() {
            warn!(
                bank_code,
                size = branches.size,
                received = branches.len(),
                "Branch page size mismatch"
            );
        }
        debug!(
            bank_code,
            count = branches.len(),
            has_next = branches.has_next,
            "Branches listed"
        );
        Ok(branches)
    }
}
