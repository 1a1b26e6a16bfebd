// Export components
pub mod calendar;
pub mod extraction;
pub mod mail;
pub mod pipeline;

pub use extraction::Extractor;
pub use mail::{InboundMessage, Transport};
pub use pipeline::{MailSettings, Pipeline, PipelineOutcome};
