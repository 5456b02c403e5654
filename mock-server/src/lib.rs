use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// The one feed every submitted item lands in.
pub const MOCK_FEED_ID: &str = "0123456789abcdef0123456789abcdef0123456789abc";

pub const AUTH_HEADER: &str = "x-auth-token";

const MAX_NEW_ITEMS: usize = 10;

const MAX_ITEM_TIME_SLOT: u32 = 99_999;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AssociatedFile {
    pub url: String,
    pub length: u64,
    pub type_str: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputItem {
    pub title: String,
    pub content: String,
    pub canonical_url: String,
    #[serde(default)]
    pub associated_files: Option<Vec<AssociatedFile>>,
}

#[derive(Deserialize)]
pub struct NewItems {
    pub items: Vec<InputItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedItem {
    pub feed_id: String,
    pub item_id: String,
    pub input_id: String,
    pub title: String,
    pub content: String,
    pub canonical_url: String,
    pub item_time: String,
    pub item_time_ms: u64,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associated_files: Option<Vec<AssociatedFile>>,
}

#[derive(Deserialize)]
pub struct ReadQuery {
    pub max_items: Option<usize>,
    pub include_item_content: Option<bool>,
    pub item_time_after: Option<String>,
    pub item_time_before: Option<String>,
}

#[derive(Default)]
struct Feed {
    /// Oldest first.
    items: Vec<FeedItem>,
    last_time: (u64, u32),
}

impl Feed {
    /// Strictly increasing (ms, slot) pairs, bumping the slot when the clock
    /// has not moved past the previous item.
    fn next_item_time(&mut self) -> (u64, u32) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.last_time = advance_item_time(self.last_time, now);
        self.last_time
    }
}

/// Next (ms, slot) after `last` given the current clock. A full slot range
/// spills into the following millisecond.
fn advance_item_time((last_ms, last_slot): (u64, u32), now: u64) -> (u64, u32) {
    if now > last_ms {
        (now, 0)
    } else if last_slot >= MAX_ITEM_TIME_SLOT {
        (last_ms + 1, 0)
    } else {
        (last_ms, last_slot + 1)
    }
}

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    feed: Arc<RwLock<Feed>>,
}

pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        feed: Arc::new(RwLock::new(Feed::default())),
    };
    Router::new()
        .route("/ping/", get(ping))
        .route("/items/", post(new_items))
        .route("/feeds/{feed_id}/", get(read_items))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    match headers.get(AUTH_HEADER).and_then(|v| v.to_str().ok()) {
        Some(token) if token == &*state.token => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn ping(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers)?;
    Ok(Json(json!({ "message": "pong" })))
}

async fn new_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<NewItems>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers)?;
    if input.items.is_empty() || input.items.len() > MAX_NEW_ITEMS {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut feed = state.feed.write().await;
    let mut input_ids = Vec::with_capacity(input.items.len());
    for item in input.items {
        let (ms, slot) = feed.next_item_time();
        let input_id = Uuid::new_v4().to_string();
        feed.items.push(FeedItem {
            feed_id: MOCK_FEED_ID.to_string(),
            item_id: Uuid::new_v4().to_string(),
            input_id: input_id.clone(),
            title: item.title,
            content: item.content,
            canonical_url: item.canonical_url,
            item_time: format!("{ms:013}.{slot:05}"),
            item_time_ms: ms,
            deleted: false,
            associated_files: item.associated_files,
        });
        input_ids.push(input_id);
    }
    debug!(count = input_ids.len(), "accepted new items");

    Ok(Json(json!({
        "message": format!("accepted {} items", input_ids.len()),
        "input_ids": input_ids,
    })))
}

async fn read_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(feed_id): Path<String>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state, &headers)?;
    if feed_id != MOCK_FEED_ID {
        return Err(StatusCode::NOT_FOUND);
    }
    if query.item_time_after.is_some() && query.item_time_before.is_some() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let max_items = query.max_items.unwrap_or(10);
    let include_content = query.include_item_content.unwrap_or(false);

    let feed = state.feed.read().await;
    // Canonical item times are fixed width, so string order is time order.
    let mut selected: Vec<FeedItem> = match (&query.item_time_after, &query.item_time_before) {
        (Some(after), _) => feed
            .items
            .iter()
            .filter(|i| i.item_time.as_str() > after.as_str())
            .take(max_items)
            .cloned()
            .collect(),
        (None, Some(before)) => feed
            .items
            .iter()
            .rev()
            .filter(|i| i.item_time.as_str() < before.as_str())
            .take(max_items)
            .cloned()
            .collect(),
        (None, None) => feed.items.iter().rev().take(max_items).cloned().collect(),
    };
    selected.sort_by(|a, b| b.item_time.cmp(&a.item_time));
    if !include_content {
        for item in &mut selected {
            item.content.clear();
        }
    }

    Ok(Json(json!({ "feed_items": selected })))
}
