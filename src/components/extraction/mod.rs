//! Turning free-form email text into candidate event records.
//!
//! The extractor only returns text. Whether that text is usable JSON is
//! decided later by the normalizer.

#[cfg(feature = "gemini")]
mod gemini;

use crate::error::MailcalResult;
use async_trait::async_trait;

#[cfg(feature = "gemini")]
pub use gemini::GeminiExtractor;

/// A text-generation collaborator producing a JSON-ish list of events
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, email_text: &str) -> MailcalResult<String>;
}
