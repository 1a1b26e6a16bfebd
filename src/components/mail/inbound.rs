use super::envelope::single_line;
use mailparse::{MailHeaderMap, ParsedMail};
use serde::Serialize;
use tracing::{debug, warn};

/// The parts of a received email the pipeline cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InboundMessage {
    pub from: Option<String>,
    pub subject: Option<String>,
    pub text: String,
}

impl InboundMessage {
    /// Decode raw RFC 822 bytes, falling back to lossy text when MIME parsing fails
    pub fn parse(raw: &[u8]) -> Self {
        let mail = match mailparse::parse_mail(raw) {
            Ok(mail) => mail,
            Err(e) => {
                warn!("Could not parse inbound message as MIME, using raw text: {}", e);
                return Self::from_text(String::from_utf8_lossy(raw).trim());
            }
        };

        let text = best_text_part(&mail)
            .or_else(|| {
                debug!("No text/plain part found, using the top-level body");
                mail.get_body().ok().map(|body| body.trim().to_string())
            })
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| String::from_utf8_lossy(raw).trim().to_string());

        Self {
            from: header_first(&mail, "From"),
            subject: header_first(&mail, "Subject"),
            text,
        }
    }

    /// A message that is only body text, without headers
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            from: None,
            subject: None,
            text: text.into(),
        }
    }

    /// What the extraction step reads: subject line plus body
    pub fn extraction_input(&self) -> String {
        match &self.subject {
            Some(subject) => format!("Subject: {}\n\n{}", subject, self.text),
            None => self.text.clone(),
        }
    }
}

/// Decoded header value, kept to one line since encoded-words can carry CR/LF
fn header_first(mail: &ParsedMail, name: &str) -> Option<String> {
    mail.headers
        .get_first_value(name)
        .map(|v| single_line(&v))
        .filter(|v| !v.is_empty())
}

/// First non-empty text/plain leaf, depth first
fn best_text_part(mail: &ParsedMail) -> Option<String> {
    if mail.subparts.is_empty() {
        if mail.ctype.mimetype.eq_ignore_ascii_case("text/plain") {
            return mail.get_body().ok().map(|s| s.trim().to_string());
        }
        return None;
    }
    mail.subparts
        .iter()
        .filter_map(best_text_part)
        .find(|text| !text.is_empty())
}
