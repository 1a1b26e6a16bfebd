use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use uuid::Uuid;

/// Base64 lines are wrapped at this many characters (RFC 2045)
const BASE64_LINE_LEN: usize = 76;

/// A file attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    /// Content-Type without the `name` parameter, e.g. `text/calendar; charset=UTF-8`
    pub content_type: String,
    pub content: String,
}

impl Attachment {
    /// An iCalendar document attachment
    pub fn calendar(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "text/calendar; charset=UTF-8".to_string(),
            content: content.into(),
        }
    }
}

/// A two-part multipart/mixed message: plain body plus one attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailEnvelope {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Attachment,
    pub boundary: String,
    pub message_id: String,
    pub date: String,
}

impl MailEnvelope {
    /// Wrap a body and an attachment, picking a boundary that neither part contains
    pub fn assemble(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        attachment: Attachment,
    ) -> Self {
        let from = from.into();
        let body = body.into();

        let boundary = loop {
            let candidate = format!("=_mailcal_{}", Uuid::new_v4().simple());
            if !body.contains(&candidate) && !attachment.content.contains(&candidate) {
                break candidate;
            }
        };

        let domain = from
            .rsplit_once('@')
            .map(|(_, domain)| domain.trim_end_matches('>').to_string())
            .unwrap_or_else(|| "localhost".to_string());

        Self {
            to: to.into(),
            subject: subject.into(),
            body,
            attachment,
            boundary,
            message_id: format!("<{}@{}>", Uuid::new_v4(), domain),
            date: Utc::now().to_rfc2822(),
            from,
        }
    }

    /// The complete RFC 5322 message, CRLF line endings
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut header = |name: &str, value: &str| {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        };

        header("From", &single_line(&self.from));
        header("To", &single_line(&self.to));
        header("Subject", &encode_header(&single_line(&self.subject)));
        header("Date", &self.date);
        header("Message-ID", &self.message_id);
        header("MIME-Version", "1.0");
        header(
            "Content-Type",
            &format!("multipart/mixed; boundary=\"{}\"", self.boundary),
        );
        out.push_str("\r\n");
        out.push_str("This is a multi-part message in MIME format.\r\n");

        out.push_str(&format!("--{}\r\n", self.boundary));
        out.push_str("Content-Type: text/plain; charset=UTF-8\r\n");
        let encoding = if self.body.is_ascii() { "7bit" } else { "8bit" };
        out.push_str(&format!("Content-Transfer-Encoding: {}\r\n", encoding));
        out.push_str("\r\n");
        out.push_str(&to_crlf(&self.body));
        if !self.body.ends_with('\n') {
            out.push_str("\r\n");
        }

        let filename = self.attachment.filename.replace('"', "");
        out.push_str(&format!("--{}\r\n", self.boundary));
        out.push_str(&format!(
            "Content-Type: {}; name=\"{}\"\r\n",
            self.attachment.content_type, filename
        ));
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\r\n",
            filename
        ));
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        out.push_str("\r\n");
        out.push_str(&wrap_base64(self.attachment.content.as_bytes()));

        out.push_str(&format!("--{}--\r\n", self.boundary));
        out
    }
}

/// Fold a header value onto one line: control characters and whitespace runs become one space
pub(super) fn single_line(value: &str) -> String {
    value
        .split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// RFC 2047 encoded-word for non-ASCII header values
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn to_crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

fn wrap_base64(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE_LEN * 2 + 2);
    // Base64 output is pure ASCII, so byte chunks are valid str slices
    for chunk in encoded.as_bytes().chunks(BASE64_LINE_LEN) {
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
    out
}
