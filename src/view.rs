//! Pure view-state derivation
//!
//! Recomputed from [`SessionState`] on demand; no transition side effects
//! live here. Exactly one of the mutually exclusive display regions is
//! visible for any state. Presentation details (layout, styling, spinner
//! choice) stay with the renderer; this module only decides what is shown.

use serde::Serialize;

use crate::services::SessionState;
use crate::types::SongResult;

/// Hard cut length for card title/artist text, in chars (no ellipsis)
pub const CARD_TEXT_MAX_CHARS: usize = 24;

/// Coarse UI phase, derived and never stored
///
/// `FilteringInProgress` and `SearchingInProgress` render the same loading
/// indicator but stay distinct: they gate different downstream transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewPhase {
    Idle,
    FilteringInProgress,
    FilteringDone,
    SearchingInProgress,
    ResultsShown,
    DetailShown,
}

/// One clickable card in the result grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultCard {
    pub title: String,
    pub artist: String,
    pub image_url: String,
}

/// Expanded view of a single selected result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub title: String,
    pub artist: String,
    pub image_url: String,
    /// Lyrics split at the segment separator, blanks dropped
    pub paragraphs: Vec<String>,
}

/// Accordion header label state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccordionHeader {
    /// Filter inference still running (spinner label)
    Building,
    /// Filter ready (done label, expandable)
    Done,
}

/// Filter-explanation accordion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterAccordion {
    pub header: AccordionHeader,
    /// Insights body; `None` while loading or when the service returned an
    /// empty string ("nothing to disclose", not an error)
    pub insights: Option<String>,
}

/// Result area below the accordion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResultArea {
    Hidden,
    /// Unified loading window: shown while either stage is in flight
    Loading,
    Grid(Vec<ResultCard>),
}

/// Complete derived view state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub phase: ViewPhase,
    /// Only the input form and optional help panel are visible
    pub input_only: bool,
    pub detail: Option<DetailView>,
    pub accordion: Option<FilterAccordion>,
    pub results: ResultArea,
}

/// Derive the coarse phase for the current state
pub fn derive_phase(state: &SessionState) -> ViewPhase {
    if state.selected_item().is_some() {
        ViewPhase::DetailShown
    } else if state.filter_loading {
        ViewPhase::FilteringInProgress
    } else if state.search_loading {
        ViewPhase::SearchingInProgress
    } else if state.results.is_some() {
        ViewPhase::ResultsShown
    } else if state.filter.is_some() {
        ViewPhase::FilteringDone
    } else {
        ViewPhase::Idle
    }
}

/// Derive the full view state
///
/// Decision table, first match wins:
/// 1. never user-submitted → input form only
/// 2. a selection exists → detail view exclusively
/// 3. otherwise accordion plus loading indicator or result grid
pub fn derive_view(state: &SessionState) -> ViewState {
    let phase = derive_phase(state);

    if !state.has_submitted {
        return ViewState {
            phase,
            input_only: true,
            detail: None,
            accordion: None,
            results: ResultArea::Hidden,
        };
    }

    if let Some(item) = state.selected_item() {
        return ViewState {
            phase,
            input_only: false,
            detail: Some(detail_view(item)),
            accordion: None,
            results: ResultArea::Hidden,
        };
    }

    let busy = state.busy();

    // Accordion appears once any cycle activity exists: in flight, or a
    // completed filter/result. An empty result list keeps the insights
    // visible; a fully failed first cycle leaves nothing to show.
    let has_activity = busy || state.filter.is_some() || state.results.is_some();

    let accordion = if has_activity {
        let header = if state.filter_loading {
            AccordionHeader::Building
        } else {
            AccordionHeader::Done
        };
        let insights = if state.filter_loading {
            None
        } else {
            state
                .filter
                .as_ref()
                .map(|filter| filter.insights.clone())
                .filter(|insights| !insights.is_empty())
        };
        Some(FilterAccordion { header, insights })
    } else {
        None
    };

    let results = if busy {
        ResultArea::Loading
    } else if let Some(results) = &state.results {
        ResultArea::Grid(results.iter().map(result_card).collect())
    } else {
        ResultArea::Hidden
    };

    ViewState {
        phase,
        input_only: false,
        detail: None,
        accordion,
        results,
    }
}

fn detail_view(item: &SongResult) -> DetailView {
    DetailView {
        title: item.song.clone(),
        artist: item.artist.clone(),
        image_url: item.img_src.clone(),
        paragraphs: item.lyric_paragraphs(),
    }
}

fn result_card(item: &SongResult) -> ResultCard {
    ResultCard {
        title: truncate_chars(&item.song, CARD_TEXT_MAX_CHARS),
        artist: truncate_chars(&item.artist, CARD_TEXT_MAX_CHARS),
        image_url: item.img_src.clone(),
    }
}

/// Hard cut at `max` chars, multibyte-safe, no ellipsis
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
