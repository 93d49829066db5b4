//! Search session orchestrator
//!
//! Owns the single mutable state bundle for one query cycle and drives the
//! two-stage pipeline: filter inference, then song search as an explicit
//! async continuation of a successful inference. All mutation funnels
//! through one reducer ([`SessionState::apply`]), so the view derivation in
//! [`crate::view`] is a total function over one value.
//!
//! # Cancellation
//! A resubmit cancels the in-flight cycle (cancel-and-restart): each cycle
//! carries a generation number and a child of the session's
//! `CancellationToken`. The reducer discards any stage completion whose
//! generation no longer matches, so a slow stale response can never
//! overwrite state derived from a newer query.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::services::{FilterClient, SearchClient};
use crate::types::{FilterResult, SongResult};

/// Mutable state bundle for one search session
///
/// `results` distinguishes "not yet fetched" (`None`) from "searched, no
/// matches" (`Some(vec![])`). `query` persists across cycles and is never
/// reset.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Raw query string, as last edited
    pub query: String,
    /// Most recently completed filter inference
    pub filter: Option<FilterResult>,
    /// Most recently completed result list
    pub results: Option<Vec<SongResult>>,
    /// Index of the result opened in the detail view
    pub selection: Option<usize>,
    /// True once the user has submitted at least once (the automatic
    /// startup submit does not count); gates the accordion and grid
    pub has_submitted: bool,
    /// Filter stage in flight
    pub filter_loading: bool,
    /// Result stage in flight
    pub search_loading: bool,
    /// Current cycle number; stage events from older cycles are discarded
    generation: u64,
}

/// State transition events
///
/// Stage events carry the generation of the cycle that produced them.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    QueryChanged(String),
    SubmitStarted { generation: u64, user_initiated: bool },
    FilterCompleted { generation: u64, filter: FilterResult },
    FilterFailed { generation: u64 },
    SearchStarted { generation: u64 },
    SearchCompleted { generation: u64, results: Vec<SongResult> },
    SearchFailed { generation: u64 },
    ResultSelected(usize),
    SelectionCleared,
}

impl SessionState {
    /// Apply one event; the only mutation path for session state
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::QueryChanged(query) => {
                self.query = query;
            }
            SessionEvent::SubmitStarted {
                generation,
                user_initiated,
            } => {
                self.generation = generation;
                self.filter_loading = true;
                self.search_loading = false;
                if user_initiated {
                    self.has_submitted = true;
                }
            }
            SessionEvent::FilterCompleted { generation, filter } => {
                if !self.is_current(generation) {
                    return;
                }
                self.filter = Some(filter);
                self.filter_loading = false;
            }
            SessionEvent::FilterFailed { generation } => {
                if !self.is_current(generation) {
                    return;
                }
                // Prior filter (if any) stays; a failed cycle never destroys
                // previously successful state
                self.filter_loading = false;
            }
            SessionEvent::SearchStarted { generation } => {
                if !self.is_current(generation) {
                    return;
                }
                self.search_loading = true;
            }
            SessionEvent::SearchCompleted {
                generation,
                results,
            } => {
                if !self.is_current(generation) {
                    return;
                }
                // Wholesale replacement; a stale selection into the old list
                // must not survive the new one
                self.results = Some(results);
                self.selection = None;
                self.search_loading = false;
            }
            SessionEvent::SearchFailed { generation } => {
                if !self.is_current(generation) {
                    return;
                }
                self.search_loading = false;
            }
            SessionEvent::ResultSelected(index) => {
                match &self.results {
                    Some(results) if index < results.len() => {
                        self.selection = Some(index);
                    }
                    _ => {
                        tracing::warn!(index, "Ignoring selection outside current result list");
                    }
                }
            }
            SessionEvent::SelectionCleared => {
                self.selection = None;
            }
        }
    }

    /// Either stage in flight (unified loading window)
    pub fn busy(&self) -> bool {
        self.filter_loading || self.search_loading
    }

    /// The result item currently opened in the detail view, if any
    pub fn selected_item(&self) -> Option<&SongResult> {
        let index = self.selection?;
        self.results.as_ref()?.get(index)
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation == self.generation {
            true
        } else {
            tracing::debug!(
                event_generation = generation,
                current_generation = self.generation,
                "Discarding stale stage completion"
            );
            false
        }
    }
}

/// Search session orchestrator
///
/// Cheap to share: state lives behind an async mutex, clients behind `Arc`.
pub struct SearchSession {
    state: Arc<Mutex<SessionState>>,
    filter_client: Arc<FilterClient>,
    search_client: Arc<SearchClient>,
    cancel: Mutex<CancellationToken>,
}

impl SearchSession {
    /// Create a session over the two collaborator clients
    pub fn new(filter_client: FilterClient, search_client: SearchClient) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            filter_client: Arc::new(filter_client),
            search_client: Arc::new(search_client),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Replace the raw query string (does not submit)
    pub async fn set_query(&self, query: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.apply(SessionEvent::QueryChanged(query.into()));
    }

    /// Start a new two-stage cycle with the current query
    ///
    /// Cancels any cycle still in flight. `user_initiated` is false only for
    /// the single automatic submit at startup. The returned handle completes
    /// when the cycle has settled (either stage may have failed; failures are
    /// absorbed into state, never propagated).
    pub async fn submit(&self, user_initiated: bool) -> JoinHandle<()> {
        let token = {
            let mut cancel = self.cancel.lock().await;
            cancel.cancel();
            *cancel = CancellationToken::new();
            cancel.clone()
        };

        let (generation, query) = {
            let mut state = self.state.lock().await;
            let generation = state.generation + 1;
            state.apply(SessionEvent::SubmitStarted {
                generation,
                user_initiated,
            });
            (generation, state.query.clone())
        };

        tracing::info!(generation, query = %query, user_initiated, "Submit: starting search cycle");

        let state = Arc::clone(&self.state);
        let filter_client = Arc::clone(&self.filter_client);
        let search_client = Arc::clone(&self.search_client);

        tokio::spawn(async move {
            run_cycle(state, filter_client, search_client, token, generation, query).await;
        })
    }

    /// Open the detail view on a result; idempotent
    pub async fn select(&self, index: usize) {
        let mut state = self.state.lock().await;
        state.apply(SessionEvent::ResultSelected(index));
    }

    /// Dismiss the detail view
    pub async fn clear_selection(&self) {
        let mut state = self.state.lock().await;
        state.apply(SessionEvent::SelectionCleared);
    }

    /// Snapshot of the current session state
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Derived view state for the current instant
    pub async fn view(&self) -> crate::view::ViewState {
        crate::view::derive_view(&*self.state.lock().await)
    }
}

/// One filter→search cycle
///
/// Filter success continues directly into the result stage; there is no
/// value-change watching between the stages and no queuing of pending
/// searches, so the result stage only ever runs on the most recently
/// completed filter.
async fn run_cycle(
    state: Arc<Mutex<SessionState>>,
    filter_client: Arc<FilterClient>,
    search_client: Arc<SearchClient>,
    token: CancellationToken,
    generation: u64,
    query: String,
) {
    let filter_result = tokio::select! {
        _ = token.cancelled() => {
            tracing::debug!(generation, "Filter stage cancelled by resubmit");
            return;
        }
        result = filter_client.get_filters(&query) => result,
    };

    let filter = match filter_result {
        Ok(filter) => filter,
        Err(e) => {
            tracing::warn!(generation, error = %e, "Filter stage failed; result stage skipped");
            state.lock().await.apply(SessionEvent::FilterFailed { generation });
            return;
        }
    };

    {
        let mut state = state.lock().await;
        state.apply(SessionEvent::FilterCompleted {
            generation,
            filter: filter.clone(),
        });
        if !state.is_current(generation) {
            return;
        }
        state.apply(SessionEvent::SearchStarted { generation });
    }

    let search_result = tokio::select! {
        _ = token.cancelled() => {
            tracing::debug!(generation, "Result stage cancelled by resubmit");
            return;
        }
        result = search_client.search_songs(&filter) => result,
    };

    let mut state = state.lock().await;
    match search_result {
        Ok(songs) => {
            state.apply(SessionEvent::SearchCompleted {
                generation,
                results: songs,
            });
        }
        Err(e) => {
            tracing::warn!(generation, error = %e, "Result stage failed; keeping previous results");
            state.apply(SessionEvent::SearchFailed { generation });
        }
    }
}
