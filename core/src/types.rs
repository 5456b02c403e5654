//! Record types exchanged with the feed-update service.
//!
//! # Design
//! JSON field names match the struct fields exactly. Decoding is strict:
//! unknown keys and missing keys are both rejected, so a change in the
//! service schema surfaces as a `Deserialization` error instead of being
//! silently dropped. `associated_files` is the one optional key.
//! The mock-server crate defines its own copies of these types; integration
//! tests catch drift between the two.

use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::item_time::ItemTime;

/// Metadata for a file attached to an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AssociatedFile {
    pub url: String,
    /// Size in bytes.
    pub length: u64,
    /// MIME type, e.g. `audio/mpeg`.
    pub type_str: String,
}

/// One item to add to a feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InputItem {
    pub title: String,
    pub content: String,
    pub canonical_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_files: Option<Vec<AssociatedFile>>,
}

impl InputItem {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        canonical_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            canonical_url: canonical_url.into(),
            associated_files: None,
        }
    }

    pub fn with_associated_files(mut self, files: Vec<AssociatedFile>) -> Self {
        self.associated_files = Some(files);
        self
    }
}

/// One item read back from a feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FeedItem {
    pub feed_id: String,
    pub item_id: String,
    pub input_id: String,
    pub title: String,
    pub content: String,
    pub canonical_url: String,
    /// Canonical item time, see [`crate::item_time`].
    pub item_time: String,
    /// Millisecond component of `item_time`.
    pub item_time_ms: u64,
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_files: Option<Vec<AssociatedFile>>,
}

impl FeedItem {
    /// Parse `item_time`, e.g. to page with `item_time_before`.
    pub fn item_time(&self) -> ApiResult<ItemTime> {
        self.item_time.parse()
    }
}

/// Body of `POST items/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItemsRequest {
    pub items: Vec<InputItem>,
}

/// Body of a successful `GET feeds/{feed_id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItemsResponse {
    pub feed_items: Vec<FeedItem>,
}
