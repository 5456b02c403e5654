//! One-call wrappers around a default client.
//!
//! Each function resolves configuration from the environment, builds a fresh
//! [`YupdatesClient`](crate::YupdatesClient) and delegates to the method of
//! the same name. Nothing is cached between calls; long-running programs
//! should build one client with [`yupdates_client`](crate::yupdates_client)
//! and reuse it.
//!
//! ```no_run
//! use yupdates_core::yapi;
//!
//! // Requires YUPDATES_API_TOKEN.
//! let pong = yapi::ping()?;
//! println!("{pong}");
//! # Ok::<(), yupdates_core::ApiError>(())
//! ```

use serde_json::Value;
use tracing::error;

use crate::client::ReadItemsOptions;
use crate::config::{env_lookup, yupdates_client_with};
use crate::error::ApiResult;
use crate::types::{FeedItem, InputItem};

pub fn ping() -> ApiResult<Value> {
    ping_with(env_lookup)
}

/// Also returns `false` when the environment has no API token.
pub fn ping_bool() -> bool {
    ping_bool_with(env_lookup)
}

pub fn new_items(items: &[InputItem]) -> ApiResult<Option<Value>> {
    new_items_with(items, env_lookup)
}

pub fn read_items(feed_id: &str, options: &ReadItemsOptions) -> ApiResult<Vec<FeedItem>> {
    read_items_with(feed_id, options, env_lookup)
}

fn ping_with<F: Fn(&str) -> Option<String>>(lookup: F) -> ApiResult<Value> {
    yupdates_client_with(None, None, false, lookup)?.ping()
}

fn ping_bool_with<F: Fn(&str) -> Option<String>>(lookup: F) -> bool {
    match yupdates_client_with(None, None, false, lookup) {
        Ok(client) => client.ping_bool(),
        Err(e) => {
            error!(error = %e, "issue pinging the API");
            false
        }
    }
}

fn new_items_with<F: Fn(&str) -> Option<String>>(
    items: &[InputItem],
    lookup: F,
) -> ApiResult<Option<Value>> {
    yupdates_client_with(None, None, false, lookup)?.new_items(items)
}

fn read_items_with<F: Fn(&str) -> Option<String>>(
    feed_id: &str,
    options: &ReadItemsOptions,
    lookup: F,
) -> ApiResult<Vec<FeedItem>> {
    yupdates_client_with(None, None, false, lookup)?.read_items(feed_id, options)
}
