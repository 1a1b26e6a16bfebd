use super::models::{DateField, ParsedDateTime};
use super::timezone::ZoneDefinition;
use crate::error::{field_format_error, MailcalResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

const ICS_LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const ICS_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// How date properties are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    /// Wall-clock digits tagged with the document's TZID
    #[default]
    Zoned,
    /// Absolute instants in UTC with a trailing `Z`
    Utc,
}

impl FromStr for TimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zoned" | "tzid" | "local" => Ok(TimeMode::Zoned),
            "utc" | "floating" | "floating-utc" => Ok(TimeMode::Utc),
            other => Err(format!("unknown time mode '{}'", other)),
        }
    }
}

/// A rendered date property: optional TZID parameter plus the value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateValue {
    pub tzid: Option<&'static str>,
    pub value: String,
}

/// Parse an ISO-8601-ish datetime as produced by the extraction step
pub fn parse_datetime(input: &str) -> MailcalResult<ParsedDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return Err(field_format_error("empty datetime"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(ParsedDateTime::Offset(dt));
    }

    // A bare `Z` is not accepted by the offset specifiers below
    let with_offset = match input.strip_suffix('Z').or_else(|| input.strip_suffix('z')) {
        Some(rest) => format!("{}+00:00", rest),
        None => input.to_string(),
    };
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, format) {
            return Ok(ParsedDateTime::Offset(dt));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(ParsedDateTime::Naive(naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(ParsedDateTime::Naive(midnight));
        }
    }

    Err(field_format_error(&format!("unrecognised datetime '{}'", input)))
}

/// Read an optional raw datetime into a [`DateField`], keeping bad input around for logging
pub fn read_date_field(raw: Option<&str>) -> DateField {
    match raw {
        None => DateField::Missing,
        Some(text) if text.trim().is_empty() => DateField::Missing,
        Some(text) => match parse_datetime(text) {
            Ok(parsed) => DateField::Parsed(parsed),
            Err(e) => {
                warn!("{}", e);
                DateField::Invalid(text.to_string())
            }
        },
    }
}

/// Formats event start/end values for one document
#[derive(Debug, Clone, Copy)]
pub struct DateFormatter {
    mode: TimeMode,
    zone: &'static ZoneDefinition,
}

impl DateFormatter {
    pub fn new(mode: TimeMode, zone: &'static ZoneDefinition) -> Self {
        Self { mode, zone }
    }

    pub fn mode(&self) -> TimeMode {
        self.mode
    }

    /// Render a start/end field; anything unusable becomes an empty value
    pub fn format(&self, field: &DateField) -> DateValue {
        let tzid = match self.mode {
            TimeMode::Zoned => Some(self.zone.tzid),
            TimeMode::Utc => None,
        };

        let value = match field {
            DateField::Parsed(parsed) => match self.render(parsed) {
                Ok(value) => value,
                Err(e) => {
                    warn!("{}", e);
                    String::new()
                }
            },
            DateField::Invalid(_) | DateField::Missing => String::new(),
        };

        DateValue { tzid, value }
    }

    /// DTSTAMP is always an absolute UTC instant
    pub fn format_stamp(&self, now: DateTime<Utc>) -> String {
        now.format(ICS_UTC_FORMAT).to_string()
    }

    fn render(&self, parsed: &ParsedDateTime) -> MailcalResult<String> {
        match self.mode {
            TimeMode::Zoned => {
                let local = parsed.wall_clock();
                if let ParsedDateTime::Offset(dt) = parsed {
                    if let Some(actual) = self.zone.offset_at(&local) {
                        if actual != *dt.offset() {
                            warn!(
                                "{} carries offset {} but {} is at {} then, keeping wall-clock time",
                                dt, dt.offset(), self.zone.tzid, actual
                            );
                        }
                    }
                }
                Ok(local.format(ICS_LOCAL_FORMAT).to_string())
            }
            TimeMode::Utc => {
                let instant = match parsed {
                    ParsedDateTime::Offset(dt) => dt.with_timezone(&Utc),
                    ParsedDateTime::Naive(naive) => self.zone.to_utc(naive).ok_or_else(|| {
                        field_format_error(&format!(
                            "{} does not exist in {}",
                            naive, self.zone.tzid
                        ))
                    })?,
                };
                Ok(instant.format(ICS_UTC_FORMAT).to_string())
            }
        }
    }
}
