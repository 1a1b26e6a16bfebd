#![allow(dead_code)]

use async_trait::async_trait;
use mailcal::components::extraction::Extractor;
use mailcal::components::mail::{MailEnvelope, Transport};
use mailcal::error::{extraction_error, transport_error, MailcalResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Extractor returning a canned response instead of calling a model
#[derive(Debug)]
pub struct MockExtractor {
    response: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn returning(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(reason.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Every email text this extractor has been asked about
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, email_text: &str) -> MailcalResult<String> {
        self.prompts.lock().unwrap().push(email_text.to_string());
        self.response
            .clone()
            .map_err(|reason| extraction_error(&reason))
    }
}

/// Transport recording envelopes instead of delivering them
#[derive(Debug, Default)]
pub struct MockTransport {
    fail_with: Option<String>,
    attempts: AtomicUsize,
    sent: Mutex<Vec<MailEnvelope>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(reason.to_string()),
            ..Default::default()
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<MailEnvelope> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, envelope: &MailEnvelope) -> MailcalResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.fail_with {
            return Err(transport_error(reason));
        }
        self.sent.lock().unwrap().push(envelope.clone());
        Ok(())
    }
}
