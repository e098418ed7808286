//! Command implementations and shared output helpers.

pub mod bank;
pub mod branch;

use anyhow::{Context, Result};
use bankcode_client::{BankCodeClient, Page};
use clap::ValueEnum;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns
    Table,
    /// Pretty-printed JSON
    Json,
}

/// State shared by every command.
pub struct Session {
    /// API client.
    pub client: BankCodeClient,
    /// Fires on Ctrl+C.
    pub cancel: CancellationToken,
    /// Selected output format.
    pub output: OutputFormat,
}

/// Print the API version.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn version(session: &Session) -> Result<()> {
    let version = session
        .client
        .get_version(&session.cancel, None)
        .await
        .context("Failed to fetch API version")?;

    match session.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "version": version }))?);
        }
        OutputFormat::Table => println!("{version}"),
    }
    Ok(())
}

/// A record that renders as one table row.
pub trait TableRow {
    /// Cell values in column order.
    fn cells(&self) -> [&str; 5];
}

const HEADERS: [&str; 5] = ["CODE", "NAME", "HALF-WIDTH KANA", "FULL-WIDTH KANA", "HIRAGANA"];

/// Print records in the selected format.
pub(crate) fn print_records<T: TableRow + Serialize>(
    records: &[T],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Table => println!("{}", records_table(records)),
    }
    Ok(())
}

/// Print a page of records, with its cursors in table mode.
pub(crate) fn print_page<T: TableRow + Serialize>(
    page: &Page<T>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(page)?),
        OutputFormat::Table => {
            println!("{}", records_table(&page.data));
            println!();
            println!("{} of limit {} (version {})", page.len(), page.limit, page.version);
            if page.has_prev {
                println!("prev cursor: {}", page.prev_cursor);
            }
            if page.has_next {
                println!("next cursor: {}", page.next_cursor);
            }
        }
    }
    Ok(())
}

/// Column widths follow terminal display width, so full-width kana and
/// kanji line up.
fn records_table<T: TableRow>(records: &[T]) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(HEADERS.map(|h| Cell::new(h).add_attribute(Attribute::Bold)));

    for record in records {
        table.add_row(record.cells());
    }
    table
}
