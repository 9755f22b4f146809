//! Typed layer over the Cluster Manager REST transport.
//!
//! - **[`ApiRoot`]**: entry point. Wraps one shared transport and hosts
//!   every endpoint helper through per-module `impl` blocks.
//!
//! - **Entities** ([`Entity`], [`ApiObject`], [`api_object!`]): JSON objects
//!   described by static attribute tables ([`schema`]). The tables drive
//!   decoding, read-only enforcement on assignment, version-aware write
//!   serialization and reference resolution through the [`registry`].
//!
//! - **Commands** ([`ApiCommand`]): long-running server operations with
//!   `fetch`, `wait` (fixed cadence up to an optional deadline), `abort`
//!   and `retry`.
//!
//! - **Batch** ([`ApiBatchRequestElement`], [`ApiBatchResponse`]): several
//!   calls in one `POST /batch`.
//!
//! - **Config bags** ([`config`]): summary and full views of the
//!   `{"items": [{"name", "value"}]}` configuration lists.
//!
//! Operations that need a newer server than the transport negotiated fail
//! with `VersionMismatch` before any request is sent.

pub mod batch;
pub mod call;
pub mod command;
pub mod config;
pub mod datetime;
pub mod endpoints;
pub mod entity;
pub mod registry;
pub mod root;
pub mod schema;
pub mod value;
pub mod version;

// ── Primary re-exports ──────────────────────────────────────────────
pub use batch::{ApiBatchRequestElement, ApiBatchResponse, ApiBatchResponseElement};
pub use call::{Call, View};
pub use command::{ApiBulkCommandList, ApiCommand, DEFAULT_POLL_INTERVAL, WaitOptions};
pub use config::{ApiConfig, ConfigMap, FullConfigMap};
pub use datetime::{format_api_time, parse_api_time};
pub use entity::{ApiObject, Entity, SerializeOptions};
pub use root::ApiRoot;
pub use schema::{Access, Attr, Kind, ListForm, Schema, Shape};
pub use value::Value;

pub use endpoints::*;

// Transport types callers need alongside the root.
pub use clustermgr_api::{ConnectionConfig, Error, ErrorKind, Method, TlsMode};
