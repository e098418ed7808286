//! API key masking for log output.
//!
//! Request URLs carry the API key as a query parameter unless header mode
//! is selected, so every URL is passed through [`mask_url`] before it is
//! logged or embedded in an error.

use regex::Regex;
use std::sync::LazyLock;

static APIKEY_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([?&]apikey=)([^&#]*)").unwrap());

const MIN_LENGTH: usize = 8;
const SHOW_START: usize = 3;
const SHOW_END: usize = 3;

/// Masks a secret value, keeping a few characters at each end.
///
/// Values shorter than eight characters are masked entirely.
///
/// ```
/// use bankcode_client::masking::mask_value;
///
/// assert_eq!(mask_value("abcdefghijklmnop"), "abc***nop");
/// assert_eq!(mask_value("short"), "*****");
/// ```
#[must_use]
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < MIN_LENGTH {
        return "*".repeat(chars.len().max(3));
    }

    let start: String = chars[..SHOW_START].iter().collect();
    let end: String = chars[chars.len() - SHOW_END..].iter().collect();
    format!("{start}***{end}")
}

/// Masks the value of every `apikey` query parameter in a URL.
///
/// ```
/// use bankcode_client::masking::mask_url;
///
/// let masked = mask_url("https://example.com/v1/banks?apikey=abcdefghijklmnop&limit=1");
/// assert_eq!(masked, "https://example.com/v1/banks?apikey=abc***nop&limit=1");
/// ```
#[must_use]
pub fn mask_url(url: &str) -> String {
    APIKEY_PARAM
        .replace_all(url, |caps: &regex::Captures<'_>| {
            format!("{}{}", &caps[1], mask_value(&caps[2]))
        })
        .into_owned()
}
