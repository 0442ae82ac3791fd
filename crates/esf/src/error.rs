//! 💀 Errors — the facade's one real failure, plus two ways to hold it wrong.
//!
//! Internally everything is `anyhow` with context strings that read like a eulogy.
//! At the public edge we hand callers something they can `match` on:
//!
//! - `EngineCallFailed` — the cluster (or the road to it) said no
//! - `EmptyBulk`, `NoSearchFields` — we refused before sending anything
//!
//! And `ErrorPolicy` decides whether `EngineCallFailed` ever escapes at all.

use serde::Deserialize;
use thiserror::Error;

use crate::query::QueryStrategy;

/// 💀 Everything that can go wrong at the facade boundary.
#[derive(Debug, Error)]
pub enum FacadeError {
    /// 📡 The engine call failed: network, cluster, or a request the engine rejected.
    /// `reason` carries the whole anyhow chain, flattened with `: ` separators.
    #[error("💀 Search engine call '{operation}' on index '{index}' failed: {reason}")]
    EngineCallFailed {
        operation: Operation,
        index: String,
        reason: String,
    },

    /// 🚚 An empty bulk request. The engine would 400 it anyway, so we save it the trip.
    #[error("💀 Refusing to send an empty bulk request. Zero operations is not a batch, it's a mood.")]
    EmptyBulk,

    /// 🔎 A strategy that needs fields got none.
    #[error("💀 Query strategy '{strategy}' needs at least one field to search. We can't match against the void.")]
    NoSearchFields { strategy: QueryStrategy },
}

impl FacadeError {
    /// ✅ true for failures that happened on (or on the way to) the engine.
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, FacadeError::EngineCallFailed { .. })
    }
}

/// 🏷️ Which facade operation was running when things went sideways.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Exists,
    Index,
    Update,
    Bulk,
    Search,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Exists => "exists",
            Operation::Index => "index",
            Operation::Update => "update",
            Operation::Bulk => "bulk",
            Operation::Search => "search",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 🎛️ What the facade does after it has logged an engine failure.
///
/// - `Propagate`: hand the caller `Err(FacadeError::EngineCallFailed)`. Honest. Default.
/// - `LogAndDegrade`: hand back a "safe" value instead (`false`, `{}`, `[]`).
///   ⚠️ With this on, "not found" and "the cluster is on fire" look identical to the
///   caller. The logs know the difference. Read the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    #[default]
    Propagate,
    LogAndDegrade,
}
