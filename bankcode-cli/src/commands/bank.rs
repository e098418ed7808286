//! Bank commands.

use anyhow::{Context, Result};
use bankcode_client::{Bank, GetParameter, ListParameter};
use clap::Parser;
use tracing::info;

use super::{Session, TableRow, print_page, print_records};

/// Arguments for bank get command
#[derive(Parser)]
pub struct GetArgs {
    /// Bank code (e.g. 0001)
    pub code: String,

    /// Fields to return, comma separated
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

/// Arguments for bank list command
#[derive(Parser)]
pub struct ListArgs {
    /// Filter expression (e.g. "name==*みずほ*")
    #[arg(long)]
    pub filter: Option<String>,

    /// Page size (1-2000)
    #[arg(short, long)]
    pub limit: Option<i64>,

    /// Cursor from a previous page
    #[arg(long)]
    pub cursor: Option<String>,

    /// Fields to return, comma separated
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

impl ListArgs {
    /// Builds the list parameters shared by the bank and branch listings.
    ///
    /// An out-of-range limit is still sent; the server applies its default.
    pub(crate) fn params(&self) -> ListParameter {
        let params = ListParameter {
            api_key: None,
            filter: self.filter.clone(),
            limit: self.limit,
            cursor: self.cursor.clone(),
            fields: self.fields.clone(),
        };

        if let Some(limit) = params.limit
            && params.effective_limit().is_none()
        {
            info!(limit, "Limit out of range, using the server default");
        }
        params
    }
}

impl TableRow for Bank {
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

/// Look up one bank.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn get(session: &Session, args: GetArgs) -> Result<()> {
    let params = GetParameter::new().fields(args.fields);
    let bank = session
        .client
        .get_bank(&session.cancel, &args.code, &params)
        .await
        .with_context(|| format!("Failed to fetch bank {}", args.code))?;

    print_records(&[bank], session.output)
}

/// List one page of banks.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn list(session: &Session, args: ListArgs) -> Result<()> {
    let banks = session
        .client
        .list_banks(&session.cancel, &args.params())
        .await
        .context("Failed to list banks")?;

    print_page(&banks, session.output)
}
