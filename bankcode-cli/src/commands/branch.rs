//! Branch commands.

use anyhow::{Context, Result};
use bankcode_client::{Branch, GetParameter};
use clap::Parser;

use super::{Session, TableRow, print_page, print_records};

/// Arguments for branch get command
#[derive(Parser)]
pub struct GetArgs {
    /// Bank code (e.g. 0001)
    pub bank_code: String,

    /// Branch code (e.g. 001)
    pub branch_code: String,

    /// Fields to return, comma separated
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

/// Arguments for branch list command
#[derive(Parser)]
#[group(id = "BranchListArgs")]
pub struct ListArgs {
    /// Bank code (e.g. 0001)
    pub bank_code: String,

    #[command(flatten)]
    pub page: super::bank::ListArgs,
}

impl TableRow for Branch {
    fn cells(&self) -> [&str; 5] {
        [
            &self.code,
            &self.name,
            &self.half_width_kana,
            &self.full_width_kana,
            &self.hiragana,
        ]
    }
}

/// Look up the branches behind a bank and branch code.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn get(session: &Session, args: GetArgs) -> Result<()> {
    let params = GetParameter::new().fields(args.fields);
    let branches = session
        .client
        .get_branch(&session.cancel, &args.bank_code, &args.branch_code, &params)
        .await
        .with_context(|| {
            format!(
                "Failed to fetch branch {} of bank {}",
                args.branch_code, args.bank_code
            )
        })?;

    print_records(&branches, session.output)
}

/// List one page of a bank's branches.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn list(session: &Session, args: ListArgs) -> Result<()> {
    let branches = session
        .client
        .list_branches(&session.cancel, &args.bank_code, &args.page.params())
        .await
        .with_context(|| format!("Failed to list branches of bank {}", args.bank_code))?;

    print_page(&branches, session.output)
}
