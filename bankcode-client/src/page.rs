//! Cursor-paged listing responses.

use serde::{Deserialize, Deserializer, Serialize};

use crate::request::ListParameter;

/// Deserializes `null` as the type's default value.
///
/// The API returns `null` for unrequested or unknown attributes in some
/// responses and omits them in others; both become `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of a listing.
///
/// Cursors are opaque tokens issued by the server. They are passed back
/// verbatim and never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Records on this page, in server order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<T>,
    /// Number of records on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: usize,
    /// Page size the server applied.
    #[serde(default, deserialize_with = "null_as_default")]
    pub limit: u32,
    /// True if a following page exists.
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_next: bool,
    /// Cursor for the following page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_cursor: String,
    /// True if a preceding page exists.
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_prev: bool,
    /// Cursor for the preceding page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub prev_cursor: String,
    /// Data version reported by the server.
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            size: 0,
            limit: 0,
            has_next: false,
            next_cursor: String::new(),
            has_prev: false,
            prev_cursor: String::new(),
            version: String::new(),
        }
    }
}

impl<T> Page<T> {
    /// Returns true if `size` matches the number of records received.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.size
    }

    /// Parameters that fetch the following page, keeping everything else
    /// from `params`.
    #[must_use]
    pub fn next_params(&self, params: &ListParameter) -> Option<ListParameter> {
        (self.has_next && !self.next_cursor.is_empty())
            .then(|| params.clone().cursor(self.next_cursor.clone()))
    }

    /// Parameters that fetch the preceding page, keeping everything else
    /// from `params`.
    #[must_use]
    pub fn prev_params(&self, params: &ListParameter) -> Option<ListParameter> {
        (self.has_prev && !self.prev_cursor.is_empty())
            .then(|| params.clone().cursor(self.prev_cursor.clone()))
    }

    /// Iterates over the records on this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Number of records actually received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the page holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
