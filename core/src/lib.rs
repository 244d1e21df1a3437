pub mod attempted;
pub mod draft;
pub mod edit_tracking;
pub mod error;
pub mod guidance;
pub mod intent;
pub mod phrases;
pub mod pipeline;
pub mod resolver;
pub mod scoring;
pub mod text;
pub mod ticket;
pub mod tone;
pub mod validation;

pub use pipeline::{ClassificationResult, TicketAnalysis, analyze, classify};
pub use ticket::TicketRequest;
