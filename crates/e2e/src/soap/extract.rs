//! Field extraction from raw SOAP responses
//!
//! Responses use profile-level namespaces that do not bind cleanly to typed
//! structs, so fields are pulled out of the raw text by tag name.

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;

use crate::error::{E2eError, E2eResult};

/// Pulls `<prefix:Tag>value</prefix:Tag>` pairs out of a response body
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    prefix: String,
}

impl FieldExtractor {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    fn qualified(&self, tag: &str) -> String {
        if self.prefix.is_empty() {
            tag.to_string()
        } else {
            format!("{}:{}", self.prefix, tag)
        }
    }

    /// Every value of `tag`, matched lazily and across line breaks
    pub fn all(&self, body: &str, tag: &str) -> E2eResult<Vec<String>> {
        let name = regex::escape(&self.qualified(tag));
        let pattern = Regex::new(&format!(r"(?s)<{name}>(.*?)</{name}>"))?;
        Ok(pattern
            .captures_iter(body)
            .map(|c| c[1].to_string())
            .collect())
    }

    /// The value of `tag`, which must occur exactly once
    pub fn single(&self, body: &str, tag: &str) -> E2eResult<String> {
        let mut values = self.all(body, tag)?;
        if values.len() != 1 {
            return Err(E2eError::Extraction {
                tag: self.qualified(tag),
                matches: values.len(),
            });
        }
        Ok(values.remove(0))
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new("ns2")
    }
}

/// Parse an `UpdatedAt`-style value; offsets are normalised to UTC
pub fn parse_timestamp(value: &str) -> E2eResult<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| E2eError::Timestamp {
            value: value.to_string(),
            reason: "not an RFC 3339 or ISO 8601 date-time".to_string(),
        })
}
