//! Human date rendering

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::fmt::Debug;

/// Renders raw date values for display
pub trait DateFormatter: Send + Sync + Debug {
    /// Human rendering of `value`; unparseable input is passed through
    fn format_human_date(&self, value: &Value) -> String;
}

/// chrono-based formatter for backend ISO dates
#[derive(Debug, Clone)]
pub struct HumanDateFormatter {
    date_format: String,
    datetime_format: String,
}

impl HumanDateFormatter {
    /// Default pattern for calendar dates
    pub const DATE_FORMAT: &'static str = "%m/%d/%Y";
    /// Default pattern for timestamps (rendered in UTC)
    pub const DATETIME_FORMAT: &'static str = "%m/%d/%Y %I:%M:%S %p";

    /// Create formatter with custom chrono patterns
    #[inline]
    #[must_use]
    pub fn new(date_format: impl Into<String>, datetime_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
            datetime_format: datetime_format.into(),
        }
    }

    fn format_str(&self, raw: &str) -> String {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return ts
                .with_timezone(&Utc)
                .format(&self.datetime_format)
                .to_string();
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return ts.format(&self.datetime_format).to_string();
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
            return ts.format(&self.datetime_format).to_string();
        }
        for pattern in ["%Y-%m-%d", "%m/%d/%Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(raw, pattern) {
                return date.format(&self.date_format).to_string();
            }
        }
        raw.to_string()
    }
}

impl Default for HumanDateFormatter {
    fn default() -> Self {
        Self::new(Self::DATE_FORMAT, Self::DATETIME_FORMAT)
    }
}

impl DateFormatter for HumanDateFormatter {
    fn format_human_date(&self, value: &Value) -> String {
        match value {
            Value::String(raw) => self.format_str(raw),
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map_or_else(|| n.to_string(), |ts| ts.format(&self.datetime_format).to_string()),
            other => other.to_string(),
        }
    }
}
