pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod protocol;
pub mod state;
pub mod submitter;
pub mod variant;

// Re-export main types for convenience
pub use client::BackendClient;
pub use config::Config;
pub use display::DisplayItem;
pub use error::BackendError;
pub use protocol::{RawReply, Reply, RequestBody};
pub use state::{ChatMessage, ChatRole};
pub use submitter::{Completion, PendingRequest, RequestState, Submitter, SubmitterOptions};
pub use variant::Variant;
