use crate::components::calendar::{
    Attendee, CalendarSettings, TimeMode, DEFAULT_PRODUCT_ID, DEFAULT_UID_DOMAIN,
};
use crate::components::pipeline::MailSettings;
use crate::error::{config_error, env_error, MailcalResult};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_MAIL_FROM: &str = "calendar@mailcal.local";
pub const DEFAULT_MAIL_SUBJECT: &str = "Extracted calendar events";
pub const DEFAULT_MAIL_BODY: &str =
    "The attached calendar file contains the events found in your message.";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_ATTENDEES_FILE: &str = "config/attendees.toml";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Main configuration structure for the service
#[derive(Debug, Clone)]
pub struct Config {
    /// Recipient of every calendar mail
    pub mail_to: String,
    pub mail_from: String,
    pub mail_subject: String,
    pub mail_body: String,
    /// HTTP mail relay; without one the service runs dry
    pub relay_url: Option<String>,
    pub relay_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub time_mode: TimeMode,
    pub product_id: String,
    pub uid_domain: String,
    /// Invited to every event
    pub fallback_attendees: Vec<Attendee>,
    pub bind_address: String,
    pub port: u16,
}

#[derive(Debug, Default, Deserialize)]
struct AttendeesFile {
    #[serde(default)]
    attendees: Vec<Attendee>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> MailcalResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let mail_to = env::var("MAIL_TO").map_err(|_| env_error("MAIL_TO"))?;

        let time_mode = match optional_var("CALENDAR_TIME_MODE") {
            Some(raw) => raw
                .parse::<TimeMode>()
                .map_err(|e| config_error(&format!("Invalid CALENDAR_TIME_MODE: {}", e)))?,
            None => TimeMode::default(),
        };

        let port = match optional_var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| config_error(&format!("Invalid PORT format: '{}'", raw)))?,
            None => DEFAULT_PORT,
        };

        let attendees_file =
            optional_var("ATTENDEES_FILE").unwrap_or_else(|| DEFAULT_ATTENDEES_FILE.to_string());
        let fallback_attendees = load_attendees(Path::new(&attendees_file))?;
        info!(
            "Loaded {} fallback attendees from {}",
            fallback_attendees.len(),
            attendees_file
        );

        Ok(Config {
            mail_to,
            mail_from: optional_var("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            mail_subject: optional_var("MAIL_SUBJECT")
                .unwrap_or_else(|| DEFAULT_MAIL_SUBJECT.to_string()),
            mail_body: optional_var("MAIL_BODY").unwrap_or_else(|| DEFAULT_MAIL_BODY.to_string()),
            relay_url: optional_var("MAIL_RELAY_URL"),
            relay_token: optional_var("MAIL_RELAY_TOKEN"),
            gemini_api_key: optional_var("GEMINI_API_KEY"),
            gemini_model: optional_var("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            time_mode,
            product_id: optional_var("CALENDAR_PRODID")
                .unwrap_or_else(|| DEFAULT_PRODUCT_ID.to_string()),
            uid_domain: optional_var("UID_DOMAIN").unwrap_or_else(|| DEFAULT_UID_DOMAIN.to_string()),
            fallback_attendees,
            bind_address: optional_var("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port,
        })
    }

    /// Settings handed to the calendar builder
    pub fn calendar_settings(&self) -> CalendarSettings {
        CalendarSettings {
            mode: self.time_mode,
            product_id: self.product_id.clone(),
            uid_domain: self.uid_domain.clone(),
            fallback_attendees: self.fallback_attendees.clone(),
        }
    }

    /// Addressing of the outgoing mail
    pub fn mail_settings(&self) -> MailSettings {
        MailSettings {
            from: self.mail_from.clone(),
            to: self.mail_to.clone(),
            subject: self.mail_subject.clone(),
            body: self.mail_body.clone(),
        }
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Unset and blank variables are both treated as absent
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read the fallback attendee list; a missing file means nobody
pub fn load_attendees(path: &Path) -> MailcalResult<Vec<Attendee>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Attendee file {} not found, no fallback attendees", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    parse_attendees(&content)
}

fn parse_attendees(content: &str) -> MailcalResult<Vec<Attendee>> {
    let file: AttendeesFile = toml::from_str(content)?;
    for attendee in &file.attendees {
        if !attendee.is_addressable() {
            return Err(config_error(&format!(
                "Fallback attendee '{}' has no usable email address",
                attendee.name
            )));
        }
    }
    Ok(file.attendees)
}
