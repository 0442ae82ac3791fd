//! # 🔍 THE SEARCH FACADE
//!
//! 🎬 COLD OPEN — INT. APPLICATION SERVER — 2:13 PM, A PERFECTLY NORMAL TUESDAY
//!
//! A product manager asks for "search, but like Google". A developer nods, opens this file,
//! and calls `simple_search`. Ids come back. Everyone is happy. Nobody asks how. The cluster
//! did all the work. It always does. This file just writes the letters and reads the replies.
//!
//! 🧠 Knowledge graph:
//! - the engine client is built lazily by an `EngineConnector`, cached in `client`,
//!   and dropped by `destroy()` (see `service.rs`)
//! - every engine call funnels through `settle`, which logs failures through the
//!   `ErrorLogger` and then applies the `ErrorPolicy`
//! - queries come from `QueryStrategy::build` (see `query.rs`)
//! - `&mut self` everywhere: one caller at a time per facade. Want concurrency?
//!   Build more facades. They're cheap. Construction does no I/O. 🦆

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::app_config::AppConfig;
use crate::connection::ConnectionConfig;
use crate::engine::{EngineConnector, HttpConnector, SearchEngine};
use crate::error::{ErrorPolicy, FacadeError, Operation};
use crate::logging::{ENGINE_LOG_DOMAIN, ErrorLogger, ErrorRecord, FailureSnapshot, TracingErrorLogger};
use crate::query::QueryStrategy;
use crate::requests::{
    BulkRequest, DocumentId, ExistsRequest, IndexRequest, Page, SearchRequest, UpdateRequest,
    hit_ids,
};
use crate::service::Service;

/// 🔍 Builds request descriptors, forwards them to the search engine, normalizes replies.
///
/// ```ignore
/// let mut facade = SearchFacade::new(ConnectionConfig::default());
/// facade.index("articles", 1i64, json!({"title": "cats"})).await?;
/// let ids = facade.simple_search("articles", &["title"], "cat", Page::default()).await?;
/// ```
#[derive(Debug)]
pub struct SearchFacade {
    config: ConnectionConfig,
    error_policy: ErrorPolicy,
    query_strategy: QueryStrategy,
    connector: Box<dyn EngineConnector>,
    logger: Arc<dyn ErrorLogger>,
    // 📡 None until first use, None again after destroy(). Owned, never shared.
    client: Option<Box<dyn SearchEngine>>,
}

impl SearchFacade {
    /// 🏗️ A facade for `config` with the defaults: HTTP engine, tracing logger,
    /// `ErrorPolicy::Propagate`, `QueryStrategy::Relevance`. No I/O happens here.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            error_policy: ErrorPolicy::default(),
            query_strategy: QueryStrategy::default(),
            connector: Box::new(HttpConnector),
            logger: Arc::new(TracingErrorLogger),
            client: None,
        }
    }

    /// 🔧 A facade wired from loaded app configuration.
    pub fn from_app_config(app_config: &AppConfig) -> Self {
        Self::new(app_config.connection.clone())
            .with_error_policy(app_config.facade.error_policy)
            .with_query_strategy(app_config.facade.query_strategy)
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    pub fn with_query_strategy(mut self, query_strategy: QueryStrategy) -> Self {
        self.query_strategy = query_strategy;
        self
    }

    /// 🔌 Swap the thing that builds engine clients. Drops any cached client.
    pub fn with_connector(mut self, connector: Box<dyn EngineConnector>) -> Self {
        self.connector = connector;
        self.client = None;
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    pub fn query_strategy(&self) -> QueryStrategy {
        self.query_strategy
    }

    /// ✅ Whether an engine client is currently cached.
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    // ============================================================
    // 🔍 Public operations
    // ============================================================

    /// 🔍 Does document `id` exist in `index`?
    ///
    /// Under `LogAndDegrade`, an engine failure reads as `false`. Same answer as
    /// "not found". The logs have the truth.
    pub async fn exists(
        &mut self,
        index: &str,
        id: impl Into<DocumentId>,
    ) -> Result<bool, FacadeError> {
        let request = ExistsRequest::new(index, id);
        trace!("🔍 exists? {}/{}", request.index, request.id);
        let attempt = match self.client() {
            Ok(engine) => engine.exists(&request).await,
            Err(err) => Err(err),
        };
        self.settle(Operation::Exists, &request.index, &request, attempt, false)
    }

    /// 📥 Upsert: create the document if it's absent, partially update it if it's there.
    ///
    /// 1. `exists(index, id)`
    /// 2. absent → create with `data` as the full body
    /// 3. present → update with `{"doc": data}`, so fields not in `data` survive
    pub async fn index(
        &mut self,
        index: &str,
        id: impl Into<DocumentId>,
        data: Value,
    ) -> Result<Value, FacadeError> {
        let id = id.into();

        if self.exists(index, id.clone()).await? {
            let request = UpdateRequest::new(index, id, data);
            debug!(
                "🩹 {}/{} already exists — merging the new fields in",
                request.index, request.id
            );
            let attempt = match self.client() {
                Ok(engine) => engine.update(&request).await,
                Err(err) => Err(err),
            };
            self.settle(Operation::Update, &request.index, &request, attempt, empty_mapping())
        } else {
            let request = IndexRequest::new(index, id, data);
            debug!("📥 {}/{} is new — creating it", request.index, request.id);
            let attempt = match self.client() {
                Ok(engine) => engine.index(&request).await,
                Err(err) => Err(err),
            };
            self.settle(Operation::Index, &request.index, &request, attempt, empty_mapping())
        }
    }

    /// 🚚 Forward a pre-built batch to the bulk API, unchanged.
    ///
    /// An empty batch is refused before any I/O, whatever the error policy says.
    pub async fn bulk(&mut self, request: BulkRequest) -> Result<Value, FacadeError> {
        if request.is_empty() {
            return Err(FacadeError::EmptyBulk);
        }

        debug!("🚚 bulk with {} operations", request.operations.len());
        let attempt = match self.client() {
            Ok(engine) => engine.bulk(&request).await,
            Err(err) => Err(err),
        };
        let index = request.index.as_deref().unwrap_or("_all");
        self.settle(Operation::Bulk, index, &request, attempt, empty_mapping())
    }

    /// 🔎 Search `fields` of `index` for `term` with the configured strategy, one page.
    pub async fn search<F: AsRef<str>>(
        &mut self,
        index: &str,
        fields: &[F],
        term: &str,
        page: Page,
    ) -> Result<Value, FacadeError> {
        let strategy = self.query_strategy;
        self.search_with(strategy, index, fields, term, page).await
    }

    /// 🔎 Same as `search`, with an explicit strategy for this one call.
    pub async fn search_with<F: AsRef<str>>(
        &mut self,
        strategy: QueryStrategy,
        index: &str,
        fields: &[F],
        term: &str,
        page: Page,
    ) -> Result<Value, FacadeError> {
        let query = strategy.build(fields, term)?;
        let request = SearchRequest::new(index, query, page);
        debug!(
            "🔎 {} search on '{}' for '{}' (from {}, size {})",
            strategy, request.index, term, request.from, request.size
        );
        let attempt = match self.client() {
            Ok(engine) => engine.search(&request).await,
            Err(err) => Err(err),
        };
        self.settle(Operation::Search, &request.index, &request, attempt, empty_mapping())
    }

    /// 🎯 `search`, then just the matched ids, in ranking order. No hits → `[]`.
    pub async fn simple_search<F: AsRef<str>>(
        &mut self,
        index: &str,
        fields: &[F],
        term: &str,
        page: Page,
    ) -> Result<Vec<String>, FacadeError> {
        let response = self.search(index, fields, term, page).await?;
        Ok(hit_ids(&response))
    }

    /// 🎯 `simple_search` with an explicit strategy for this one call.
    pub async fn simple_search_with<F: AsRef<str>>(
        &mut self,
        strategy: QueryStrategy,
        index: &str,
        fields: &[F],
        term: &str,
        page: Page,
    ) -> Result<Vec<String>, FacadeError> {
        let response = self.search_with(strategy, index, fields, term, page).await?;
        Ok(hit_ids(&response))
    }

    // ============================================================
    // 🔧 Internals
    // ============================================================

    // 📡 The cached client, built on first use. A build failure is just another engine
    // failure as far as callers are concerned; `settle` handles it like the rest.
    fn client(&mut self) -> anyhow::Result<&dyn SearchEngine> {
        let engine = match self.client.take() {
            Some(engine) => engine,
            None => {
                debug!("🔌 No engine client yet — building one for {:?}", self.config);
                self.connector.connect(&self.config).context(
                    "💀 Couldn't build the search engine client. Check the connection settings.",
                )?
            }
        };
        Ok(&**self.client.insert(engine))
    }

    // 🧾 The one place engine failures are handled: log the record, then obey the policy.
    #[track_caller]
    fn settle<T, P: Serialize>(
        &self,
        operation: Operation,
        index: &str,
        params: &P,
        attempt: anyhow::Result<T>,
        degraded: T,
    ) -> Result<T, FacadeError> {
        let err = match attempt {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        self.logger.error(&ErrorRecord {
            message: format!("💀 Search engine call '{operation}' on index '{index}' failed"),
            domain: ENGINE_LOG_DOMAIN,
            operation,
            params: serde_json::to_value(params).unwrap_or_else(|serde_err| {
                warn!(
                    "⚠️ Couldn't serialize the '{}' params for the error record ({}); logging them as null",
                    operation, serde_err
                );
                Value::Null
            }),
            failure: FailureSnapshot::from_error(&err),
        });

        match self.error_policy {
            ErrorPolicy::Propagate => Err(FacadeError::EngineCallFailed {
                operation,
                index: index.to_string(),
                reason: format!("{err:#}"),
            }),
            ErrorPolicy::LogAndDegrade => {
                warn!(
                    "⚠️ '{}' on '{}' failed; returning the degraded answer as configured",
                    operation, index
                );
                Ok(degraded)
            }
        }
    }
}

impl Service for SearchFacade {
    fn initialise(&mut self) -> anyhow::Result<()> {
        debug!("🌅 search facade initialised — nothing to warm up, the client is lazy");
        Ok(())
    }

    fn destroy(&mut self) {
        if self.client.take().is_some() {
            debug!("🌇 search facade destroyed — engine client dropped, next call builds a fresh one");
        }
    }
}

fn empty_mapping() -> Value {
    Value::Object(Map::new())
}
