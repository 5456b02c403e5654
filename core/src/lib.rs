//! Synchronous client for the Yupdates feed-update API.
//!
//! # Overview
//! Authenticates requests, submits new feed items and reads existing items
//! by item-time range. The crate owns the request/response contract: input
//! validation, item-time normalization, JSON (de)serialization of records
//! and the error taxonomy. HTTP execution is delegated to a [`Transport`],
//! by default [`UreqTransport`].
//!
//! # Design
//! - `YupdatesClient` holds only immutable configuration (token, base URL,
//!   quiet flag) and its transport.
//! - Each operation is split into `build_*` (validates, produces request)
//!   and `parse_*` (consumes response), so nothing reaches the network
//!   when validation fails and tests can run without I/O.
//! - [`yapi`] offers one-call functions that build a client from the
//!   environment each time.
//! - Record types are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod item_time;
pub mod transport;
pub mod types;
pub mod yapi;

pub use client::{ReadItemsOptions, YupdatesClient};
pub use config::{yupdates_client, yupdates_client_with, ClientConfig};
pub use error::{ApiError, ApiResult, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use item_time::{normalize_item_time, ItemTime};
pub use transport::UreqTransport;
pub use types::{AssociatedFile, FeedItem, InputItem};
