//! Strongly-typed identifiers for Vultr resources.
//!
//! Vultr identifies most resources with opaque strings (UUIDs for snapshots,
//! backups and instances, short codes such as `ewr` for regions). The wrappers
//! here keep them from being mixed up and guarantee they can be spliced into a
//! request path as a single segment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Checks that `input` is usable as a single path segment.
///
/// # Errors
///
/// Returns an error if the string is empty, has surrounding whitespace, is a
/// dot segment (`.` or `..`), or contains `/`, `\`, `?`, `#` or `%`.
pub fn validate_id(input: &str) -> Result<()> {
    if input.is_empty() {
        return Err(Error::InvalidId("identifier is empty".to_string()));
    }
    if input.trim() != input {
        return Err(Error::InvalidId(format!("`{input}` has surrounding whitespace")));
    }
    if input.contains(['/', '\\', '?', '#', '%']) {
        return Err(Error::InvalidId(format!(
            "`{input}` contains a reserved path character"
        )));
    }
    if input == "." || input == ".." {
        return Err(Error::InvalidId(format!("`{input}` is a dot segment")));
    }
    Ok(())
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parses and validates an identifier.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is not a usable identifier.
            pub fn parse_str(input: &str) -> Result<Self> {
                validate_id(input)?;
                Ok(Self(input.to_string()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Converts into the inner string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                validate_id(&value)?;
                Ok(Self(value))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::parse_str(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

id_type!(RegionId, "Region identifier (e.g. `ewr`)");
id_type!(SnapshotId, "Snapshot identifier");
id_type!(BackupId, "Backup identifier");
id_type!(InstanceId, "Instance identifier");
