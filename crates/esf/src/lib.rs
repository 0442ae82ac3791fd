//! 🔍 esf — a small facade in front of a full-text search cluster.
//!
//! It builds typed request descriptors (exists / index / update / bulk / search), hands
//! them to a lazily built engine client, and tidies up the replies. The cluster does the
//! hard parts. We do the paperwork. 🦆

pub mod app_config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod facade;
pub mod logging;
pub mod query;
pub mod requests;
pub mod service;

pub use app_config::{AppConfig, FacadeConfig, load_config};
pub use connection::ConnectionConfig;
pub use engine::{EngineConnector, HttpConnector, HttpEngine, SearchEngine};
pub use error::{ErrorPolicy, FacadeError, Operation};
pub use facade::SearchFacade;
pub use logging::{ErrorLogger, ErrorRecord, RecordingErrorLogger, TracingErrorLogger};
pub use query::{Query, QueryStrategy};
pub use requests::{BulkOperation, BulkRequest, DocumentId, Page};
pub use service::Service;
