use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier the search service assigns to a result.
///
/// Only stable within one result set; the service numbers results by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One matched email, as returned by `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub id: DocumentId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(rename = "from", default, deserialize_with = "null_as_empty")]
    pub sender: String,
    #[serde(rename = "to", default, deserialize_with = "null_as_empty")]
    pub recipient: String,
    #[serde(default)]
    pub cc: Option<String>,
    /// Raw `Date:` header value.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    /// Relevance; higher is better.
    pub score: f64,
}

impl DocumentResult {
    /// Carbon-copy recipients, or `None` when the header is absent or blank.
    pub fn cc(&self) -> Option<&str> {
        self.cc.as_deref().map(str::trim).filter(|cc| !cc.is_empty())
    }

    /// Parse [`Self::date`].
    ///
    /// Mail dates are RFC 2822, often with a trailing zone comment such as
    /// `(PDT)` which chrono does not accept, so that is stripped first. RFC
    /// 3339 is accepted as well.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.date.trim();
        if raw.is_empty() {
            return None;
        }
        let without_comment = match raw.rfind('(') {
            Some(idx) if raw.ends_with(')') => raw[..idx].trim_end(),
            _ => raw,
        };
        DateTime::parse_from_rfc2822(without_comment)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .ok()
    }

    /// Date for list rows, e.g. `2001-05-14`.
    pub fn short_date(&self) -> String {
        self.timestamp()
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| self.date.clone())
    }

    /// Date and time for the detail view, e.g. `2001-05-14 16:39:00 -0700`.
    pub fn long_date(&self) -> String {
        self.timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S %z").to_string())
            .unwrap_or_else(|| self.date.clone())
    }

    pub fn display_subject(&self) -> &str {
        if self.subject.trim().is_empty() {
            "(no subject)"
        } else {
            &self.subject
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
