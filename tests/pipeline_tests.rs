#[path = "mocks.rs"]
mod mocks;

use mailcal::components::calendar::{Attendee, CalendarSettings, TimeMode};
use mailcal::components::{InboundMessage, MailSettings, Pipeline, PipelineOutcome};
use mocks::{MockExtractor, MockTransport};
use std::sync::Arc;

const SOUNDCHECK: &str = r#"[{"title":"Soundcheck","start":"2025-06-30T08:00:00+10:00","end":"2025-06-30T09:00:00+10:00","attendees":[{"name":"A","email":"a@x.com"}]}]"#;

fn calendar_settings(mode: TimeMode) -> CalendarSettings {
    CalendarSettings {
        mode,
        fallback_attendees: vec![Attendee::new("AV Desk", "av@venue.example")],
        ..Default::default()
    }
}

fn mail_settings() -> MailSettings {
    MailSettings {
        from: "calendar@mailcal.local".to_string(),
        to: "bookings@venue.example".to_string(),
        subject: "Extracted calendar events".to_string(),
        body: "Events attached.".to_string(),
    }
}

fn pipeline(extractor: Arc<MockExtractor>, transport: Arc<MockTransport>) -> Pipeline {
    Pipeline::new(
        calendar_settings(TimeMode::Zoned),
        mail_settings(),
        extractor,
        transport,
    )
}

fn message() -> InboundMessage {
    InboundMessage {
        from: Some("events@venue.example".to_string()),
        subject: Some("Booking for Monday".to_string()),
        text: "Soundcheck Monday 8-9am, A is coming.".to_string(),
    }
}

/// Unfold folded iCalendar lines so assertions can look at whole properties
fn unfold(text: &str) -> String {
    text.replace("\r\n ", "")
}

#[tokio::test]
async fn test_soundcheck_is_sent_as_one_event() {
    let extractor = MockExtractor::returning(SOUNDCHECK);
    let transport = MockTransport::new();
    let outcome = pipeline(extractor.clone(), transport.clone())
        .process(&message())
        .await;

    let uids = match outcome {
        PipelineOutcome::Sent { events, uids } => {
            assert_eq!(events, 1);
            uids
        }
        other => panic!("expected Sent, got {:?}", other),
    };
    assert_eq!(uids.len(), 1);
    assert!(uids[0].ends_with("@mailcal.local"));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let envelope = &sent[0];
    assert_eq!(envelope.to, "bookings@venue.example");
    assert_eq!(envelope.subject, "Extracted calendar events: Booking for Monday");
    assert_eq!(envelope.body, "Events attached.");
    assert_eq!(envelope.attachment.filename, "events.ics");

    let ics = unfold(&envelope.attachment.content);
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    assert!(ics.contains(&format!("\r\nUID:{}\r\n", uids[0])));
    assert!(ics.contains("\r\nSUMMARY:Soundcheck\r\n"));
    assert!(ics.contains("\r\nTRIGGER:-PT30M\r\n"));
    assert!(ics.contains(":mailto:a@x.com\r\n"));
    assert!(ics.contains(":mailto:av@venue.example\r\n"));
    assert_eq!(ics.matches("\r\nATTENDEE").count(), 2);

    // The extractor saw the subject as well as the body
    let prompts = extractor.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("Subject: Booking for Monday\n\n"));
}

#[tokio::test]
async fn test_unparseable_output_sends_nothing() {
    let transport = MockTransport::new();
    let outcome = pipeline(MockExtractor::returning("not json"), transport.clone())
        .process(&message())
        .await;

    assert_eq!(outcome, PipelineOutcome::ParseFailed);
    assert_eq!(transport.attempts(), 0);
}

#[tokio::test]
async fn test_empty_batch_is_distinct_from_parse_failure() {
    let transport = MockTransport::new();
    let outcome = pipeline(MockExtractor::returning("[]"), transport.clone())
        .process(&message())
        .await;

    assert_eq!(outcome, PipelineOutcome::EmptyBatch);
    assert_eq!(transport.attempts(), 0);
}

#[tokio::test]
async fn test_extraction_failure_is_reported() {
    let transport = MockTransport::new();
    let outcome = pipeline(MockExtractor::failing("model unavailable"), transport.clone())
        .process(&message())
        .await;

    match outcome {
        PipelineOutcome::ExtractionFailed { reason } => {
            assert!(reason.contains("model unavailable"))
        }
        other => panic!("expected ExtractionFailed, got {:?}", other),
    }
    assert_eq!(transport.attempts(), 0);
}

#[tokio::test]
async fn test_transport_failure_is_not_retried() {
    let transport = MockTransport::failing("relay down");
    let outcome = pipeline(MockExtractor::returning(SOUNDCHECK), transport.clone())
        .process(&message())
        .await;

    match outcome {
        PipelineOutcome::SendFailed { events, reason } => {
            assert_eq!(events, 1);
            assert!(reason.contains("relay down"));
        }
        other => panic!("expected SendFailed, got {:?}", other),
    }
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test]
async fn test_many_events_keep_their_order() {
    let raw = r#"Sure! Here are the events:
[
  {"title": "Load-in", "start": "2025-04-05T09:00:00", "end": "2025-04-05T10:00:00"},
  {"title": "Rehearsal", "start": "2025-04-06T09:00:00", "end": "2025-04-06T10:00:00"},
  {"title": "Load-in", "start": "2025-04-07T09:00:00", "end": "2025-04-07T10:00:00"}
]"#;
    let transport = MockTransport::new();
    let outcome = pipeline(MockExtractor::returning(raw), transport.clone())
        .process(&message())
        .await;

    let uids = match outcome {
        PipelineOutcome::Sent { events: 3, uids } => uids,
        other => panic!("expected three sent events, got {:?}", other),
    };
    assert_eq!(uids.len(), 3);
    assert_ne!(uids[0], uids[2]);

    let ics = unfold(&transport.sent()[0].attachment.content);
    let summaries: Vec<&str> = ics
        .split("\r\n")
        .filter(|line| line.starts_with("SUMMARY:"))
        .collect();
    assert_eq!(
        summaries,
        vec!["SUMMARY:Load-in", "SUMMARY:Rehearsal", "SUMMARY:Load-in"]
    );
}

#[tokio::test]
async fn test_utc_mode_has_no_timezone_block() {
    let transport = MockTransport::new();
    let pipeline = Pipeline::new(
        calendar_settings(TimeMode::Utc),
        mail_settings(),
        MockExtractor::returning(SOUNDCHECK),
        transport.clone(),
    );
    let outcome = pipeline.process(&InboundMessage::from_text("Soundcheck")).await;

    assert!(matches!(outcome, PipelineOutcome::Sent { events: 1, .. }));
    let envelope = &transport.sent()[0];
    assert_eq!(envelope.subject, "Extracted calendar events");

    let ics = unfold(&envelope.attachment.content);
    assert!(!ics.contains("BEGIN:VTIMEZONE"));
    assert!(ics.contains("\r\nDTSTART:20250629T220000Z\r\n"));
    assert!(ics.contains("\r\nDTEND:20250629T230000Z\r\n"));
}

#[test]
fn test_outcome_serializes_with_status_tag() {
    let json = serde_json::to_value(PipelineOutcome::Sent {
        events: 1,
        uids: vec!["abc@mailcal.local".to_string()],
    })
    .unwrap();
    assert_eq!(json["status"], "sent");
    assert_eq!(json["events"], 1);

    let json = serde_json::to_value(PipelineOutcome::ParseFailed).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "parse_failed" }));
}

#[tokio::test]
async fn test_encoded_subject_cannot_break_outgoing_headers() {
    let raw = b"From: events@venue.example\r\n\
Subject: =?UTF-8?B?SGkNCg0KSU5KRUNURUQgQk9EWQ==?=\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Soundcheck Monday 8-9am.\r\n";
    let transport = MockTransport::new();
    let outcome = pipeline(MockExtractor::returning(SOUNDCHECK), transport.clone())
        .process(&InboundMessage::parse(raw))
        .await;
    assert!(matches!(outcome, PipelineOutcome::Sent { .. }));

    let envelope = &transport.sent()[0];
    assert_eq!(envelope.subject, "Extracted calendar events: Hi INJECTED BODY");
    let rendered = envelope.render();
    let (headers, _) = rendered.split_once("\r\n\r\n").unwrap();
    assert!(headers.ends_with(&format!(
        "Content-Type: multipart/mixed; boundary=\"{}\"",
        envelope.boundary
    )));
}
