//! Cursor-based pagination.
//!
//! Vultr list endpoints take `per_page` and an opaque `cursor` and answer with
//! a `meta` block whose `links.next` holds the cursor for the following page
//! (an empty string once the listing is exhausted). Rather than mutating the
//! caller's options, a list call returns a [`Page`] from which the next
//! [`ListOptions`] can be derived.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::query::QueryPairs;
use crate::Result;

/// Page size used when the caller does not pass options.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Largest page size the API honours.
pub const MAX_PER_PAGE: u32 = 500;

/// Page size and continuation cursor for a list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ListOptions {
    /// Number of records per page
    #[validate(range(min = 1))]
    pub per_page: u32,

    /// Continuation cursor from a previous page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl ListOptions {
    /// Options for the first page with the given page size.
    #[must_use]
    pub const fn new(per_page: u32) -> Self {
        Self {
            per_page,
            cursor: None,
        }
    }

    /// Set the continuation cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`](crate::Error::ValidationError) when
    /// `per_page` is zero.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }

    /// Convert into URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> QueryPairs {
        let mut pairs = vec![("per_page", self.per_page.to_string())];
        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("cursor", cursor.to_string()));
        }
        pairs
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

/// Cursor links of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Cursor of the next page, empty when exhausted
    #[serde(default)]
    pub next: String,
    /// Cursor of the previous page, empty on the first page
    #[serde(default)]
    pub prev: String,
}

/// `meta` block of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Total number of records across all pages
    #[serde(default)]
    pub total: u64,
    /// Cursor links
    #[serde(default)]
    pub links: Links,
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Records in provider order
    pub items: Vec<T>,
    /// Pagination metadata
    pub meta: ListMeta,
}

impl<T> Page<T> {
    /// Cursor of the next page, if any.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        Some(self.meta.links.next.as_str()).filter(|c| !c.is_empty())
    }

    /// Cursor of the previous page, if any.
    #[must_use]
    pub fn prev_cursor(&self) -> Option<&str> {
        Some(self.meta.links.prev.as_str()).filter(|c| !c.is_empty())
    }

    /// True when another page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next_cursor().is_some()
    }

    /// Options for fetching the following page with the same page size.
    #[must_use]
    pub fn next_options(&self, current: &ListOptions) -> Option<ListOptions> {
        self.next_cursor()
            .map(|cursor| ListOptions::new(current.per_page).with_cursor(cursor))
    }

    /// Total number of records reported by the API.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.meta.total
    }

    /// Number of records on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when this page holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn page(next: &str) -> Page<u32> {
        Page {
            items: vec![1, 2, 3],
            meta: ListMeta {
                total: 7,
                links: Links {
                    next: next.to_string(),
                    prev: String::new(),
                },
            },
        }
    }

    #[test]
    fn test_default_options() {
        let options = ListOptions::default();
        assert_eq!(options.per_page, DEFAULT_PER_PAGE);
        assert!(options.cursor.is_none());
        assert_eq!(options.to_pairs(), vec![("per_page", "100".to_string())]);
    }

    #[test]
    fn test_pairs_include_cursor() {
        let options = ListOptions::new(25).with_cursor("bmV4dF9fQU1T");
        assert_eq!(
            options.to_pairs(),
            vec![
                ("per_page", "25".to_string()),
                ("cursor", "bmV4dF9fQU1T".to_string())
            ]
        );
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = ListOptions::new(0).check().unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
        assert!(ListOptions::new(1).check().is_ok());
    }

    #[test]
    fn test_next_options_carries_cursor() {
        let current = ListOptions::new(2);
        let next = page("abc").next_options(&current).unwrap();
        assert_eq!(next.per_page, 2);
        assert_eq!(next.cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_empty_next_link_ends_listing() {
        let last = page("");
        assert!(!last.has_next());
        assert!(last.next_options(&ListOptions::default()).is_none());
        assert!(last.prev_cursor().is_none());
    }

    #[test]
    fn test_meta_defaults_when_missing() {
        let meta: ListMeta = serde_json::from_str("{}").unwrap();
        assert_eq!(meta, ListMeta::default());

        let meta: ListMeta =
            serde_json::from_str(r#"{"total":9,"links":{"next":"n","prev":""}}"#).unwrap();
        assert_eq!(meta.total, 9);
        assert_eq!(meta.links.next, "n");
    }
}
