//! kashi-search: semantic lyric search orchestrator
//!
//! Two-stage search flow over a pair of HTTP collaborators: free-form text
//! goes to a filter-inference service (`GET /get_filters`), the resulting
//! structured filter goes to a song-search service (`POST /search_songs`),
//! and a pure derivation decides which UI region (help, loading, filter
//! accordion, result grid, detail view) is visible for the current state.
//!
//! The library holds all orchestration logic; the binary is a thin terminal
//! front-end over [`SearchSession`].

pub mod config;
pub mod error;
pub mod services;
pub mod types;
pub mod view;

pub use crate::error::{FilterError, SearchError};
pub use crate::services::{FilterClient, SearchClient, SearchSession, SessionEvent, SessionState};
pub use crate::types::{FilterResult, Sentiment, SongResult};
pub use crate::view::{derive_phase, derive_view, ViewPhase, ViewState};
