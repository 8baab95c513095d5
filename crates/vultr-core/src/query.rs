//! Builder for request query parameters.
//!
//! Resource clients use this to turn optional filters (a snapshot description,
//! an instance id, a plan type) into the `(key, value)` pairs that
//! [`ServiceClient`](crate::client::ServiceClient) appends to the URL.

use std::fmt::Display;

/// Query parameter pairs in insertion order.
pub type QueryPairs = Vec<(&'static str, String)>;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: QueryPairs,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: &'static str, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: &'static str, value: T)
    where
        T: Display,
    {
        self.pairs.push((key, value.to_string()));
    }

    /// Append pairs, replacing earlier values for the same keys.
    pub fn merge<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (&'static str, String)>,
    {
        for (key, value) in pairs {
            self.pairs.retain(|(existing, _)| *existing != key);
            self.pairs.push((key, value));
        }
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> QueryPairs {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
