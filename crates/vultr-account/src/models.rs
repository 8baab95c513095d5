//! Account models.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an optional timestamp where an empty string means "never".
///
/// Accepts RFC 3339 as well as the older `YYYY-MM-DD HH:MM:SS` form, which is
/// taken to be UTC.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&value) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {value:?}: {e}")))
}

/// Account information for the authenticated API key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    /// Account holder name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Permissions granted to the current user.
    #[serde(default)]
    pub acls: Vec<String>,
    /// Current balance. Negative values are credit.
    #[serde(default)]
    pub balance: f64,
    /// Charges accrued since the last invoice.
    #[serde(default)]
    pub pending_charges: f64,
    /// Time of the last payment, if any was made.
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub last_payment_date: Option<DateTime<Utc>>,
    /// Amount of the last payment.
    #[serde(default)]
    pub last_payment_amount: f64,
}

impl Account {
    /// Whether the user holds the given ACL (or `manage_users`, which implies all).
    #[must_use]
    pub fn has_acl(&self, acl: &str) -> bool {
        self.acls.iter().any(|a| a == acl || a == "manage_users")
    }
}
