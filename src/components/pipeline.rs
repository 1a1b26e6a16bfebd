use crate::components::calendar::{normalize, CalendarBuilder, CalendarSettings};
use crate::components::extraction::Extractor;
use crate::components::mail::{Attachment, InboundMessage, MailEnvelope, Transport};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const ATTACHMENT_FILENAME: &str = "events.ics";

/// Addressing and wording of the outgoing calendar mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub from: String,
    pub to: String,
    /// Prefixed to the inbound subject when there is one
    pub subject: String,
    pub body: String,
}

/// How one inbound message ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    ExtractionFailed { reason: String },
    ParseFailed,
    EmptyBatch,
    Sent { events: usize, uids: Vec<String> },
    SendFailed { events: usize, reason: String },
}

/// One message in, at most one calendar mail out
pub struct Pipeline {
    calendar: CalendarSettings,
    mail: MailSettings,
    extractor: Arc<dyn Extractor>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    pub fn new(
        calendar: CalendarSettings,
        mail: MailSettings,
        extractor: Arc<dyn Extractor>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            calendar,
            mail,
            extractor,
            transport,
        }
    }

    pub async fn process(&self, message: &InboundMessage) -> PipelineOutcome {
        info!(
            "Processing message from {} ({})",
            message.from.as_deref().unwrap_or("unknown sender"),
            message.subject.as_deref().unwrap_or("no subject")
        );

        let raw = match self.extractor.extract(&message.extraction_input()).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Extraction failed: {}", e);
                return PipelineOutcome::ExtractionFailed {
                    reason: e.to_string(),
                };
            }
        };

        let events = match normalize(&raw) {
            Ok(events) => events,
            Err(e) => {
                warn!("Dropping batch: {}", e);
                return PipelineOutcome::ParseFailed;
            }
        };
        if events.is_empty() {
            info!("No events found, nothing to send");
            return PipelineOutcome::EmptyBatch;
        }

        let document = CalendarBuilder::new(&self.calendar).build(&events);
        let count = document.event_count();
        info!("Built calendar with {} events", count);

        let envelope = MailEnvelope::assemble(
            self.mail.from.as_str(),
            self.mail.to.as_str(),
            self.subject_for(message),
            self.mail.body.as_str(),
            Attachment::calendar(ATTACHMENT_FILENAME, document.text),
        );

        match self.transport.send(&envelope).await {
            Ok(()) => {
                info!("Sent {} events to {}", count, self.mail.to);
                PipelineOutcome::Sent {
                    events: count,
                    uids: document.uids,
                }
            }
            Err(e) => {
                error!("Failed to send calendar mail: {}", e);
                PipelineOutcome::SendFailed {
                    events: count,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn subject_for(&self, message: &InboundMessage) -> String {
        match message.subject.as_deref().filter(|s| !s.is_empty()) {
            Some(original) => format!("{}: {}", self.mail.subject, original),
            None => self.mail.subject.clone(),
        }
    }
}
