//! Wire types shared by the filter-inference and song-search collaborators
//!
//! Field names follow the collaborator contracts exactly: the filter service
//! returns `{ query, sentiment, insights }` and the search service returns an
//! array of `{ song, artist, img_src, lyrics, ... }`.

use serde::{Deserialize, Serialize};

/// Character separating lyric segments in the `lyrics` field.
///
/// Detail views split on this to render one paragraph per segment.
pub const LYRIC_SEGMENT_SEPARATOR: char = '\n';

/// Sentiment classification inferred from the user query.
///
/// On the wire this is a plain string. The filter service emits `"positive"`,
/// `"negative"`, or an empty string when the query names no sentiment word;
/// anything unrecognized degrades to `Neutral` rather than failing the parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl From<String> for Sentiment {
    fn from(value: String) -> Self {
        match value.as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl From<Sentiment> for String {
    fn from(value: Sentiment) -> Self {
        match value {
            Sentiment::Positive => "positive".to_string(),
            Sentiment::Negative => "negative".to_string(),
            // The service represents "no sentiment" as an empty string
            Sentiment::Neutral => String::new(),
        }
    }
}

/// Structured filter object produced by the filter-inference collaborator.
///
/// Immutable once produced; a later inference supersedes it wholesale, never
/// merged field by field. The full object (including the echoed `query`) is
/// the payload of the search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    /// User query echoed back by the inference service
    #[serde(default)]
    pub query: String,
    /// Inferred sentiment constraint
    #[serde(default)]
    pub sentiment: Sentiment,
    /// Free-text explanation of the inferred filter (may be empty)
    #[serde(default)]
    pub insights: String,
}

/// One ranked match from the song-search collaborator.
///
/// Ordering is significant: the service returns results pre-ranked and the
/// orchestrator never re-sorts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongResult {
    /// Song title
    pub song: String,
    /// Artist name
    pub artist: String,
    /// Cover image URL
    pub img_src: String,
    /// Full lyrics, segments separated by [`LYRIC_SEGMENT_SEPARATOR`]
    pub lyrics: String,
    /// Rank assigned by the search service (redundant with position)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    /// Sentiment score of the song itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
}

impl SongResult {
    /// Split lyrics into non-empty paragraphs for detail rendering
    pub fn lyric_paragraphs(&self) -> Vec<String> {
        self.lyrics
            .split(LYRIC_SEGMENT_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }
}
