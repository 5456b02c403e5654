//! Request builder, response parser and call runner for the feed API.
//!
//! # Design
//! `YupdatesClient` holds only immutable configuration plus a `Transport`.
//! Every operation is split into a `build_*` method that validates input and
//! produces an `HttpRequest`, and a `parse_*` method that consumes an
//! `HttpResponse`. Both halves are pure; the convenience method with the
//! operation's name runs build → transport → parse. Validation failures
//! therefore never reach the transport.

use std::fmt;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{ApiError, ApiResult, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::item_time::normalize_item_time;
use crate::transport::UreqTransport;
use crate::types::{FeedItem, FeedItemsResponse, InputItem, NewItemsRequest};

/// Header carrying the API token on every request.
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Exact length of a feed ID.
pub const FEED_ID_LEN: usize = 45;

/// Most items the service accepts in one `new_items` call. Not enforced
/// here; larger batches must be chunked and paced by the caller.
pub const MAX_NEW_ITEMS_PER_CALL: usize = 10;

/// Upper bound on `max_items` when item content is not requested.
pub const MAX_READ_ITEMS: u32 = 50;

/// Upper bound on `max_items` when item content is requested.
pub const MAX_READ_ITEMS_WITH_CONTENT: u32 = 10;

/// Query options for [`YupdatesClient::read_items`].
///
/// Omitting both time bounds returns the most recent items. The bounds are
/// mutually exclusive and are normalized with
/// [`normalize_item_time`] when the request is built, so any form that
/// function accepts can be stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadItemsOptions {
    pub max_items: u32,
    pub include_item_content: bool,
    pub item_time_after: Option<String>,
    pub item_time_before: Option<String>,
}

impl Default for ReadItemsOptions {
    fn default() -> Self {
        Self {
            max_items: 10,
            include_item_content: false,
            item_time_after: None,
            item_time_before: None,
        }
    }
}

impl ReadItemsOptions {
    pub fn max_items(mut self, max_items: u32) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn include_item_content(mut self, include: bool) -> Self {
        self.include_item_content = include;
        self
    }

    pub fn item_time_after(mut self, item_time: impl fmt::Display) -> Self {
        self.item_time_after = Some(item_time.to_string());
        self
    }

    pub fn item_time_before(mut self, item_time: impl fmt::Display) -> Self {
        self.item_time_before = Some(item_time.to_string());
        self
    }
}

/// Synchronous client for the feed-update API.
///
/// Holds no mutable state, so a shared reference can be used from several
/// threads when the transport allows it. No network activity happens at
/// construction.
#[derive(Clone)]
pub struct YupdatesClient<T = UreqTransport> {
    token: String,
    base_url: String,
    quiet: bool,
    transport: T,
}

impl YupdatesClient<UreqTransport> {
    /// Client over the default `ureq` transport.
    pub fn new(token: impl fmt::Display, base_url: impl fmt::Display, quiet: bool) -> Self {
        Self::with_transport(token, base_url, quiet, UreqTransport::new())
    }
}

impl<T: Transport> YupdatesClient<T> {
    /// `base_url` gets a trailing `/` appended when it lacks one.
    pub fn with_transport(
        token: impl fmt::Display,
        base_url: impl fmt::Display,
        quiet: bool,
        transport: T,
    ) -> Self {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            token: token.to_string(),
            base_url,
            quiet,
            transport,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// When set, the warning for an empty `new_items` call is suppressed.
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -- ping --------------------------------------------------------------

    pub fn build_ping(&self) -> HttpRequest {
        self.get(format!("{}ping/", self.base_url))
    }

    pub fn parse_ping(&self, response: HttpResponse) -> ApiResult<Value> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Test the connection and the token. Returns the service's JSON answer.
    pub fn ping(&self) -> ApiResult<Value> {
        let response = self.send(self.build_ping())?;
        self.parse_ping(response)
    }

    /// Like [`ping`](Self::ping) but reports only success or failure.
    /// Failures are logged at error level even on a quiet client.
    pub fn ping_bool(&self) -> bool {
        match self.ping() {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "issue pinging the API");
                false
            }
        }
    }

    // -- new items ---------------------------------------------------------

    /// Returns `Ok(None)` for an empty slice: there is nothing to send.
    pub fn build_new_items(&self, items: &[InputItem]) -> ApiResult<Option<HttpRequest>> {
        if items.is_empty() {
            return Ok(None);
        }
        let payload = NewItemsRequest {
            items: items.to_vec(),
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;

        let mut request = self.authenticated(HttpMethod::Post, format!("{}items/", self.base_url));
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(Some(request))
    }

    pub fn parse_new_items(&self, response: HttpResponse) -> ApiResult<Value> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Submit items to the service.
    ///
    /// The service accepts at most [`MAX_NEW_ITEMS_PER_CALL`] items per call;
    /// larger batches must be split by the caller and paced to avoid
    /// throttling. An empty slice is a no-op that returns `Ok(None)`.
    pub fn new_items(&self, items: &[InputItem]) -> ApiResult<Option<Value>> {
        let Some(request) = self.build_new_items(items)? else {
            if !self.quiet {
                warn!("no items were supplied to new_items, nothing to do");
            }
            return Ok(None);
        };
        let response = self.send(request)?;
        self.parse_new_items(response).map(Some)
    }

    // -- read items --------------------------------------------------------

    pub fn build_read_items(
        &self,
        feed_id: &str,
        options: &ReadItemsOptions,
    ) -> ApiResult<HttpRequest> {
        let feed_id = feed_id.trim();
        if feed_id.is_empty() {
            return Err(ApiError::validation("feed_id is missing"));
        }
        if feed_id.chars().count() != FEED_ID_LEN {
            return Err(ApiError::validation(format!(
                "feed_id must be {FEED_ID_LEN} characters, got {}",
                feed_id.chars().count()
            )));
        }
        // The ID becomes a path segment verbatim.
        if let Some(bad) = feed_id.chars().find(|c| !is_feed_id_char(*c)) {
            return Err(ApiError::validation(format!(
                "feed_id contains invalid character {bad:?}"
            )));
        }

        let max_allowed = if options.include_item_content {
            MAX_READ_ITEMS_WITH_CONTENT
        } else {
            MAX_READ_ITEMS
        };
        if !(1..=max_allowed).contains(&options.max_items) {
            return Err(ApiError::validation(format!(
                "max_items must be between 1 and {max_allowed}{}, got {}",
                if options.include_item_content {
                    " when including item content"
                } else {
                    ""
                },
                options.max_items
            )));
        }

        let mut query = format!(
            "max_items={}&include_item_content={}",
            options.max_items, options.include_item_content
        );
        match (&options.item_time_after, &options.item_time_before) {
            (Some(_), Some(_)) => {
                return Err(ApiError::validation(
                    "item_time_after and item_time_before are mutually exclusive",
                ));
            }
            (Some(after), None) => {
                query.push_str("&item_time_after=");
                query.push_str(&normalize_item_time(after)?);
            }
            (None, Some(before)) => {
                query.push_str("&item_time_before=");
                query.push_str(&normalize_item_time(before)?);
            }
            (None, None) => {}
        }

        Ok(self.get(format!("{}feeds/{feed_id}/?{query}", self.base_url)))
    }

    pub fn parse_read_items(&self, response: HttpResponse) -> ApiResult<Vec<FeedItem>> {
        check_status(&response)?;
        let parsed: FeedItemsResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        Ok(parsed.feed_items)
    }

    /// Read items from a feed, newest first unless a time bound is given.
    pub fn read_items(&self, feed_id: &str, options: &ReadItemsOptions) -> ApiResult<Vec<FeedItem>> {
        let request = self.build_read_items(feed_id, options)?;
        let response = self.send(request)?;
        self.parse_read_items(response)
    }

    // -- helpers -----------------------------------------------------------

    fn get(&self, url: String) -> HttpRequest {
        self.authenticated(HttpMethod::Get, url)
    }

    fn authenticated(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: vec![(AUTH_HEADER.to_string(), self.token.clone())],
            body: None,
        }
    }

    fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        debug!(method = ?request.method, url = %request.url, "sending request");
        Ok(self.transport.execute(request)?)
    }
}

impl<T> fmt::Debug for YupdatesClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YupdatesClient")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

/// URL-unreserved characters, the only ones that survive unescaped in a path.
fn is_feed_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~')
}

/// Map a non-2xx response to `TransportError::Status`.
fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if response.is_success() {
        return Ok(());
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode(body: &str) -> ApiResult<Value> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
