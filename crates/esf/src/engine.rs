//! 📡 The engine seam — where our descriptors leave the process.
//!
//! 🚰 `SearchEngine` is the thing that actually talks to the cluster. `EngineConnector`
//! is the thing that builds one from a `ConnectionConfig`. The facade only knows these two
//! traits, which is why tests can swap in a fake cluster that never sleeps, never 503s,
//! and never asks for a bigger heap.
//!
//! ⚠️ Implementations do not retry. A failed call returns `Err` and the facade decides
//! what happens next (see `ErrorPolicy`).

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::connection::ConnectionConfig;
use crate::requests::{BulkRequest, ExistsRequest, IndexRequest, SearchRequest, UpdateRequest};

pub mod http;

pub use http::{HttpConnector, HttpEngine};

/// 📡 A connected search engine client. One method per engine API the facade uses.
///
/// # Contract
/// - each call issues exactly one request
/// - `exists` answers `Ok(false)` for a missing document; `Err` means "couldn't tell"
/// - the others return the engine's raw JSON response on success
#[async_trait]
pub trait SearchEngine: Send + Sync + std::fmt::Debug {
    async fn exists(&self, request: &ExistsRequest) -> Result<bool>;
    async fn index(&self, request: &IndexRequest) -> Result<Value>;
    async fn update(&self, request: &UpdateRequest) -> Result<Value>;
    async fn bulk(&self, request: &BulkRequest) -> Result<Value>;
    async fn search(&self, request: &SearchRequest) -> Result<Value>;
}

/// 🏗️ Builds a `SearchEngine` from connection settings. Called lazily, once per
/// facade lifetime (and again after `destroy`). Must not do I/O; connecting is lazy too.
pub trait EngineConnector: Send + Sync + std::fmt::Debug {
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn SearchEngine>>;
}
