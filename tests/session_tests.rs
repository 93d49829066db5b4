//! Integration tests for the two-stage search session
//!
//! Runs the real session (reqwest clients included) against in-process axum
//! stubs standing in for the filter-inference and song-search collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::Mutex;

use kashi_search::view::{AccordionHeader, ResultArea, ViewPhase};
use kashi_search::{
    FilterClient, FilterResult, SearchClient, SearchSession, Sentiment, SongResult,
};

/// Shared stub-collaborator state, tweakable mid-test
#[derive(Clone, Default)]
struct StubState {
    /// Every `user_query` the filter endpoint received, in order
    filter_queries: Arc<Mutex<Vec<String>>>,
    /// Every body the search endpoint received, in order
    search_payloads: Arc<Mutex<Vec<FilterResult>>>,
    filter_fail: Arc<AtomicBool>,
    search_fail: Arc<AtomicBool>,
    /// Insights text echoed in every successful filter response
    insights: Arc<Mutex<String>>,
    /// Result list returned by every successful search response
    songs: Arc<Mutex<Vec<SongResult>>>,
    /// Per-query artificial latency for the filter endpoint
    filter_delays: Arc<Mutex<HashMap<String, u64>>>,
}

async fn get_filters(
    State(stub): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let user_query = params.get("user_query").cloned().unwrap_or_default();
    stub.filter_queries.lock().await.push(user_query.clone());

    let delay_ms = stub.filter_delays.lock().await.get(&user_query).copied();
    if let Some(delay_ms) = delay_ms {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    if stub.filter_fail.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Json(FilterResult {
        query: user_query,
        sentiment: Sentiment::Neutral,
        insights: stub.insights.lock().await.clone(),
    })
    .into_response()
}

async fn search_songs(State(stub): State<StubState>, Json(filter): Json<FilterResult>) -> Response {
    stub.search_payloads.lock().await.push(filter);

    if stub.search_fail.load(Ordering::SeqCst) {
        return StatusCode::BAD_GATEWAY.into_response();
    }

    Json(stub.songs.lock().await.clone()).into_response()
}

/// Serve the stub collaborators on an ephemeral port
async fn spawn_stub(stub: StubState) -> String {
    let app = Router::new()
        .route("/get_filters", get(get_filters))
        .route("/search_songs", post(search_songs))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn session_against(base_url: &str) -> SearchSession {
    SearchSession::new(
        FilterClient::new(base_url).unwrap(),
        SearchClient::new(base_url).unwrap(),
    )
}

fn two_songs() -> Vec<SongResult> {
    vec![
        SongResult {
            song: "海の声".to_string(),
            artist: "浦島太郎".to_string(),
            img_src: "https://example.com/umi.jpg".to_string(),
            lyrics: "空の声が聞きたくて\n風の声に耳すませ".to_string(),
            rank: Some(0),
            sentiment_score: Some(0.3),
        },
        SongResult {
            song: "ロビンソン".to_string(),
            artist: "スピッツ".to_string(),
            img_src: "https://example.com/robinson.jpg".to_string(),
            lyrics: "新しい季節は\nなぜかせつない日々で".to_string(),
            rank: Some(1),
            sentiment_score: Some(0.5),
        },
    ]
}

#[tokio::test]
async fn test_startup_performs_exactly_one_automatic_filter_call_with_empty_query() {
    let stub = StubState::default();
    let base_url = spawn_stub(stub.clone()).await;
    let session = session_against(&base_url).await;

    session.submit(false).await.await.unwrap();

    let queries = stub.filter_queries.lock().await;
    assert_eq!(*queries, vec!["".to_string()]);

    // The automatic submit warms state but does not count as a submission
    let state = session.snapshot().await;
    assert!(!state.has_submitted);
    assert!(session.view().await.input_only);
}

#[tokio::test]
async fn test_japanese_scenario_end_to_end() {
    let stub = StubState::default();
    *stub.insights.lock().await = "夏や船に関連する曲を選びました".to_string();
    *stub.songs.lock().await = two_songs();
    let base_url = spawn_stub(stub.clone()).await;
    let session = session_against(&base_url).await;

    session.set_query("海に関連する曲").await;
    session.submit(true).await.await.unwrap();

    // Exactly one search call, carrying the full filter object verbatim
    let payloads = stub.search_payloads.lock().await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(
        payloads[0],
        FilterResult {
            query: "海に関連する曲".to_string(),
            sentiment: Sentiment::Neutral,
            insights: "夏や船に関連する曲を選びました".to_string(),
        }
    );
    drop(payloads);

    let view = session.view().await;
    assert_eq!(view.phase, ViewPhase::ResultsShown);
    assert!(view.detail.is_none());
    let accordion = view.accordion.expect("accordion");
    assert_eq!(accordion.header, AccordionHeader::Done);
    assert_eq!(
        accordion.insights.as_deref(),
        Some("夏や船に関連する曲を選びました")
    );
    match view.results {
        ResultArea::Grid(cards) => {
            assert_eq!(cards.len(), 2);
            assert_eq!(cards[0].title, "海の声");
            assert_eq!(cards[1].artist, "スピッツ");
        }
        other => panic!("expected grid, got {:?}", other),
    }
}

#[tokio::test]
async fn test_filter_failure_leaves_only_the_input_form() {
    let stub = StubState::default();
    stub.filter_fail.store(true, Ordering::SeqCst);
    let base_url = spawn_stub(stub.clone()).await;
    let session = session_against(&base_url).await;

    session.set_query("何か").await;
    session.submit(true).await.await.unwrap();

    let state = session.snapshot().await;
    assert!(state.filter.is_none());
    assert!(!state.busy());

    // Result stage never triggered
    assert!(stub.search_payloads.lock().await.is_empty());

    let view = session.view().await;
    assert!(view.accordion.is_none());
    assert_eq!(view.results, ResultArea::Hidden);
}

#[tokio::test]
async fn test_search_failure_keeps_previously_displayed_results() {
    let stub = StubState::default();
    *stub.insights.lock().await = "insight".to_string();
    *stub.songs.lock().await = two_songs();
    let base_url = spawn_stub(stub.clone()).await;
    let session = session_against(&base_url).await;

    session.set_query("first").await;
    session.submit(true).await.await.unwrap();
    assert_eq!(session.snapshot().await.results.as_ref().unwrap().len(), 2);

    stub.search_fail.store(true, Ordering::SeqCst);
    session.set_query("second").await;
    session.submit(true).await.await.unwrap();

    // Stale-but-consistent: old list survives, nothing crashes
    let state = session.snapshot().await;
    assert!(!state.busy());
    let results = state.results.as_ref().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].song, "海の声");
}

#[tokio::test]
async fn test_empty_result_array_renders_zero_cards_with_insights() {
    let stub = StubState::default();
    *stub.insights.lock().await = "ニッチな検索でしたね".to_string();
    let base_url = spawn_stub(stub.clone()).await;
    let session = session_against(&base_url).await;

    session.set_query("該当なしの検索").await;
    session.submit(true).await.await.unwrap();

    let view = session.view().await;
    assert_eq!(view.phase, ViewPhase::ResultsShown);
    assert_eq!(view.results, ResultArea::Grid(vec![]));
    let accordion = view.accordion.expect("accordion");
    assert_eq!(accordion.insights.as_deref(), Some("ニッチな検索でしたね"));
}

#[tokio::test]
async fn test_selection_lifecycle_through_new_search() {
    let stub = StubState::default();
    *stub.insights.lock().await = "insight".to_string();
    *stub.songs.lock().await = two_songs();
    let base_url = spawn_stub(stub.clone()).await;
    let session = session_against(&base_url).await;

    session.set_query("selection test").await;
    session.submit(true).await.await.unwrap();

    session.select(1).await;
    session.select(1).await; // idempotent
    let view = session.view().await;
    assert_eq!(view.phase, ViewPhase::DetailShown);
    let detail = view.detail.expect("detail");
    assert_eq!(detail.title, "ロビンソン");
    assert_eq!(detail.paragraphs, vec!["新しい季節は", "なぜかせつない日々で"]);

    session.clear_selection().await;
    assert_eq!(session.view().await.phase, ViewPhase::ResultsShown);

    // A fresh successful search always clears the selection
    session.select(0).await;
    session.submit(true).await.await.unwrap();
    assert_eq!(session.snapshot().await.selection, None);
}

#[tokio::test]
async fn test_resubmit_cancels_stale_in_flight_cycle() {
    let stub = StubState::default();
    *stub.songs.lock().await = two_songs();
    stub.filter_delays
        .lock()
        .await
        .insert("slow-query".to_string(), 400);
    let base_url = spawn_stub(stub.clone()).await;
    let session = session_against(&base_url).await;

    session.set_query("slow-query").await;
    let stale = session.submit(true).await;

    // Resubmit while the first filter call is still outstanding
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.set_query("fast-query").await;
    let current = session.submit(true).await;

    current.await.unwrap();
    stale.await.unwrap();

    let state = session.snapshot().await;
    assert_eq!(state.filter.as_ref().unwrap().query, "fast-query");

    // Wait past the stale latency; the late completion must not land
    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = session.snapshot().await;
    assert_eq!(state.filter.as_ref().unwrap().query, "fast-query");

    // Only the current cycle ever reached the result stage
    let payloads = stub.search_payloads.lock().await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].query, "fast-query");
}
