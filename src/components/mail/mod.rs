mod envelope;
mod inbound;
mod transport;

pub use envelope::{Attachment, MailEnvelope};
pub use inbound::InboundMessage;
pub use transport::{HttpRelayTransport, LogTransport, Transport};
