//! Collaborator clients and the search session orchestrator

pub mod filter_client;
pub mod search_client;
pub mod session;

pub use filter_client::FilterClient;
pub use search_client::SearchClient;
pub use session::{SearchSession, SessionEvent, SessionState};
