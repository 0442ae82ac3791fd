//! 📝 The error-logging collaborator.
//!
//! When an engine call fails, the facade writes ONE structured record: what failed,
//! under which domain tag, with which request params, and the whole error chain.
//! Where that record ends up is the logger's business. The facade never asks how it went.
//!
//! 🧠 Knowledge graph:
//! - `ErrorLogger` is the seam; `SearchFacade::with_logger` plugs one in
//! - `TracingErrorLogger` (default) turns records into `tracing::error!` events
//! - `RecordingErrorLogger` keeps records in memory, for tests and for hosts that want
//!   to show failures in their own UI 🦆

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::error;

use crate::error::Operation;

/// 🏷️ Domain tag stamped on every record this crate produces.
pub const ENGINE_LOG_DOMAIN: &str = "ElasticSearch";

/// 📸 A snapshot of the failure: top-level message, every cause underneath it, where it
/// was caught, and the backtrace anyhow captured (if `RUST_BACKTRACE` allowed one).
#[derive(Debug, Clone, PartialEq)]
pub struct FailureSnapshot {
    pub message: String,
    pub causes: Vec<String>,
    pub file: &'static str,
    pub line: u32,
    pub trace: String,
}

impl FailureSnapshot {
    /// 📸 `file`/`line` point at the caller, so `#[track_caller]` callers pass theirs through.
    #[track_caller]
    pub fn from_error(err: &anyhow::Error) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: err.to_string(),
            causes: err.chain().skip(1).map(|cause| cause.to_string()).collect(),
            file: location.file(),
            line: location.line(),
            trace: err.backtrace().to_string(),
        }
    }
}

/// 📝 One failed engine call, fully described.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub message: String,
    pub domain: &'static str,
    pub operation: Operation,
    /// 📦 the request descriptor we tried to send, serialized
    pub params: Value,
    pub failure: FailureSnapshot,
}

/// 📝 Somewhere for failure records to go.
pub trait ErrorLogger: Send + Sync + std::fmt::Debug {
    fn error(&self, record: &ErrorRecord);
}

/// 🍞 Default logger: one `tracing::error!` per record, fields attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorLogger;

impl ErrorLogger for TracingErrorLogger {
    fn error(&self, record: &ErrorRecord) {
        error!(
            domain = record.domain,
            operation = %record.operation,
            params = %record.params,
            failure = %record.failure.message,
            causes = ?record.failure.causes,
            file = record.failure.file,
            line = record.failure.line,
            trace = %record.failure.trace,
            "{}",
            record.message
        );
    }
}

/// 🗃️ Keeps every record in memory. Cloning shares the same backing store.
#[derive(Debug, Default, Clone)]
pub struct RecordingErrorLogger {
    records: Arc<Mutex<Vec<ErrorRecord>>>,
}

impl RecordingErrorLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 📋 Everything logged so far, oldest first.
    pub fn records(&self) -> Vec<ErrorRecord> {
        // 🔒 a panic while holding the lock doesn't corrupt a Vec push; keep reading
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ErrorLogger for RecordingErrorLogger {
    fn error(&self, record: &ErrorRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use serde_json::json;

    #[test]
    fn the_one_where_the_snapshot_remembers_every_layer_of_sadness() {
        let err = Err::<(), _>(anyhow::anyhow!("connection refused"))
            .context("request never left the building")
            .expect_err("💀 it's an error by construction");

        let snapshot = FailureSnapshot::from_error(&err);
        assert_eq!(snapshot.message, "request never left the building");
        assert_eq!(snapshot.causes, vec!["connection refused".to_string()]);
        assert!(snapshot.file.ends_with("logging.rs"), "file was: {}", snapshot.file);
        assert!(snapshot.line > 0);
        // 🧪 "disabled backtrace" when RUST_BACKTRACE is unset, frames when it is. Never blank.
        assert!(!snapshot.trace.is_empty());
    }

    #[test]
    fn the_one_where_clones_of_the_recorder_share_one_notebook() {
        let recorder = RecordingErrorLogger::new();
        let handle: Arc<dyn ErrorLogger> = Arc::new(recorder.clone());

        handle.error(&ErrorRecord {
            message: "boom".to_string(),
            domain: ENGINE_LOG_DOMAIN,
            operation: Operation::Search,
            params: json!({"index": "articles"}),
            failure: FailureSnapshot {
                message: "boom".to_string(),
                causes: vec![],
                file: file!(),
                line: line!(),
                trace: String::new(),
            },
        });

        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].domain, "ElasticSearch");
        assert_eq!(records[0].params["index"], "articles");
    }
}
