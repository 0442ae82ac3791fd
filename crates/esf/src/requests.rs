//! 📦 Request descriptors — one typed struct per thing we ask the cluster to do.
//!
//! 🎬 *[a loose `HashMap<String, Value>` walks into a code review. it does not walk out.]*
//!
//! Every operation gets its own shape: `ExistsRequest`, `IndexRequest`, `UpdateRequest`,
//! `BulkRequest`, `SearchRequest`. The compiler now knows that a search has a `size` and an
//! exists check does not. Revolutionary. Truly the future.
//!
//! 🧠 Knowledge graph:
//! - built by `SearchFacade` (see `facade.rs`), never persisted
//! - serialized into `ErrorRecord::params` when a call fails, so the logs show what we sent
//! - turned into URLs + bodies by `HttpEngine` (see `engine/http.rs`)

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::query::Query;

// ============================================================
// 🪪 DocumentId
// ============================================================

/// 🪪 A document's identity inside an index.
///
/// The cluster stores ids as strings. Callers mostly hand us integers. This newtype
/// accepts both and always speaks string to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawDocumentId", into = "String")]
pub struct DocumentId(String);

// 🔄 what a DocumentId looks like before it has been civilized: `1` or `"1"`, both welcome
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocumentId {
    Number(i64),
    Text(String),
}

impl From<RawDocumentId> for DocumentId {
    fn from(raw: RawDocumentId) -> Self {
        match raw {
            RawDocumentId::Number(n) => DocumentId(n.to_string()),
            RawDocumentId::Text(s) => DocumentId(s),
        }
    }
}

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl From<i64> for DocumentId {
    fn from(id: i64) -> Self {
        DocumentId(id.to_string())
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        DocumentId(id.to_string())
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        DocumentId(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        DocumentId(id)
    }
}

// ============================================================
// 📄 Pagination
// ============================================================

/// 📄 The window of hits we ask for. One window per search, no auto-paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub from: u32,
    pub size: u32,
}

impl Page {
    pub fn new(from: u32, size: u32) -> Self {
        Self { from, size }
    }
}

impl Default for Page {
    // 🎯 0 / 25 — first page, a couple dozen hits. Enough to scroll, not enough to regret.
    fn default() -> Self {
        Self { from: 0, size: 25 }
    }
}

// ============================================================
// 🔍 Single-document requests
// ============================================================

/// 🔍 "Is document `id` in `index`?" Answer arrives as a status code, not a body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExistsRequest {
    pub index: String,
    pub id: DocumentId,
}

impl ExistsRequest {
    pub fn new(index: impl Into<String>, id: impl Into<DocumentId>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
        }
    }
}

/// 📥 Create (or fully replace) a document. `body` is the whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexRequest {
    pub index: String,
    pub id: DocumentId,
    pub body: Value,
}

impl IndexRequest {
    pub fn new(index: impl Into<String>, id: impl Into<DocumentId>, body: Value) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            body,
        }
    }
}

/// 🩹 Partial update. `body` serializes as `{"doc": {...}}` so the cluster merges
/// the supplied fields and leaves the rest of the document alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateRequest {
    pub index: String,
    pub id: DocumentId,
    pub body: PartialDocument,
}

/// 🩹 The `{"doc": ...}` wrapper. Not a full overwrite. A merge. A gentle touch-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialDocument {
    pub doc: Value,
}

impl UpdateRequest {
    pub fn new(index: impl Into<String>, id: impl Into<DocumentId>, partial: Value) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            body: PartialDocument { doc: partial },
        }
    }
}

// ============================================================
// 🔎 Search
// ============================================================

/// 🔎 One query, one window, one index. The body is `{"from", "size", "query"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub index: String,
    pub from: u32,
    pub size: u32,
    pub query: Query,
}

impl SearchRequest {
    pub fn new(index: impl Into<String>, query: Query, page: Page) -> Self {
        Self {
            index: index.into(),
            from: page.from,
            size: page.size,
            query,
        }
    }

    /// 📦 The JSON body sent to `_search`. The index goes in the URL, not here.
    pub fn body(&self) -> Value {
        json!({
            "from": self.from,
            "size": self.size,
            "query": self.query,
        })
    }
}

/// 🎯 Pull `hits.hits[*]._id` out of a raw search response, in response order.
///
/// No `hits.hits`? Empty vec. A hit with no string `_id`? Skipped. This never fails,
/// because "no results" and "weird results" both deserve a calm, empty answer.
pub fn hit_ids(response: &Value) -> Vec<String> {
    response
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit.get("_id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================
// 🚚 Bulk
// ============================================================

/// 🚚 One line-pair (or single line, for delete) of a `_bulk` payload.
///
/// Deserializes from `{"action": "index", "index": "...", "id": 1, "document": {...}}`
/// so hosts can read batches from disk. Strictly: a missing `action` or a typo'd variant
/// is a hard error, not a shrug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BulkOperation {
    /// 📥 create-or-replace
    Index {
        #[serde(default)]
        index: Option<String>,
        #[serde(default)]
        id: Option<DocumentId>,
        document: Value,
    },
    /// 🆕 create only; the cluster rejects it if the id already exists
    Create {
        #[serde(default)]
        index: Option<String>,
        #[serde(default)]
        id: Option<DocumentId>,
        document: Value,
    },
    /// 🩹 partial update, wrapped as `{"doc": ...}` on the wire
    Update {
        #[serde(default)]
        index: Option<String>,
        id: DocumentId,
        doc: Value,
    },
    /// 🗑️ goodbye
    Delete {
        #[serde(default)]
        index: Option<String>,
        id: DocumentId,
    },
}

impl BulkOperation {
    fn action_name(&self) -> &'static str {
        match self {
            BulkOperation::Index { .. } => "index",
            BulkOperation::Create { .. } => "create",
            BulkOperation::Update { .. } => "update",
            BulkOperation::Delete { .. } => "delete",
        }
    }

    fn target(&self) -> (Option<&String>, Option<&DocumentId>) {
        match self {
            BulkOperation::Index { index, id, .. } | BulkOperation::Create { index, id, .. } => {
                (index.as_ref(), id.as_ref())
            }
            BulkOperation::Update { index, id, .. } | BulkOperation::Delete { index, id } => {
                (index.as_ref(), Some(id))
            }
        }
    }

    // 📦 the metadata line: {"index":{"_index":"...","_id":"..."}} — absent, not null
    fn action_line(&self) -> Value {
        let (index, id) = self.target();
        let mut metadata = Map::new();
        if let Some(index) = index {
            metadata.insert("_index".to_string(), Value::String(index.clone()));
        }
        if let Some(id) = id {
            metadata.insert("_id".to_string(), Value::String(id.to_string()));
        }
        let mut action = Map::new();
        action.insert(self.action_name().to_string(), Value::Object(metadata));
        Value::Object(action)
    }

    fn source_line(&self) -> Option<Value> {
        match self {
            BulkOperation::Index { document, .. } | BulkOperation::Create { document, .. } => {
                Some(document.clone())
            }
            BulkOperation::Update { doc, .. } => Some(json!({ "doc": doc })),
            BulkOperation::Delete { .. } => None,
        }
    }
}

/// 🚚 A pre-built batch, forwarded to `_bulk` as-is.
///
/// `index` is the default target for operations that don't name one; it becomes
/// `/{index}/_bulk` in the URL. Operations that DO name an index win, per-op.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BulkRequest {
    #[serde(default)]
    pub index: Option<String>,
    pub operations: Vec<BulkOperation>,
}

impl BulkRequest {
    pub fn new(operations: Vec<BulkOperation>) -> Self {
        Self {
            index: None,
            operations,
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// 📡 Render the NDJSON payload: action line, then source line (except delete),
    /// each newline-terminated. The bulk API insists on that trailing newline.
    pub fn to_ndjson(&self) -> Result<String> {
        let mut payload = String::new();
        for operation in &self.operations {
            let action = serde_json::to_string(&operation.action_line()).context(
                "💀 Failed to serialize a bulk action line. The JSON that describes JSON \
                 refused to become JSON.",
            )?;
            payload.push_str(&action);
            payload.push('\n');

            if let Some(source) = operation.source_line() {
                let source = serde_json::to_string(&source)
                    .context("💀 Failed to serialize a bulk source line.")?;
                payload.push_str(&source);
                payload.push('\n');
            }
        }
        Ok(payload)
    }
}
