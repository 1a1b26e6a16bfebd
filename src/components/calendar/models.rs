use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Title used when the extraction left an event unnamed
pub const DEFAULT_TITLE: &str = "No Title";

/// A participant attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    pub email: String,
}

impl Attendee {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Deduplication key, addresses compare case-insensitively
    pub fn key(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// An address that can go into a `mailto:` value as-is
    pub fn is_addressable(&self) -> bool {
        let email = self.email.trim();
        email.contains('@') && !email.chars().any(|c| c.is_whitespace() || c.is_control())
    }
}

/// A datetime as it came out of the extraction step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDateTime {
    /// Carries an explicit UTC offset (`Z`, `+10:00`, ...)
    Offset(DateTime<FixedOffset>),
    /// Plain wall-clock time without any zone information
    Naive(NaiveDateTime),
}

impl ParsedDateTime {
    /// Wall-clock digits, ignoring any offset
    pub fn wall_clock(&self) -> NaiveDateTime {
        match self {
            ParsedDateTime::Offset(dt) => dt.naive_local(),
            ParsedDateTime::Naive(naive) => *naive,
        }
    }
}

/// Start or end of an event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateField {
    Parsed(ParsedDateTime),
    /// The raw text could not be read as a datetime
    Invalid(String),
    #[default]
    Missing,
}

impl DateField {
    pub fn parsed(&self) -> Option<&ParsedDateTime> {
        match self {
            DateField::Parsed(parsed) => Some(parsed),
            _ => None,
        }
    }
}

/// The four fixed AV-support annotations of a booking
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AvSupport {
    pub request_location: Option<String>,
    pub requirements: Option<String>,
    pub brief_description: Option<String>,
    pub other_notes: Option<String>,
}

/// One extracted task or booking, validated and with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub title: String,
    pub start: DateField,
    pub end: DateField,
    pub location: Option<String>,
    pub description: Option<String>,
    pub av: AvSupport,
    /// `None` means only the fallback attendees are invited
    pub attendees: Option<Vec<Attendee>>,
}

impl Default for EventRecord {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            start: DateField::Missing,
            end: DateField::Missing,
            location: None,
            description: None,
            av: AvSupport::default(),
            attendees: None,
        }
    }
}
