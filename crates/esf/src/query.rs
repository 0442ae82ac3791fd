//! 🔎 Query DSL — the only part of this crate with actual opinions.
//!
//! 🎬 COLD OPEN — INT. SEARCH BAR — SOMEONE TYPES "cat" AND PRESSES ENTER
//!
//! Four generations of query have tried to answer that user. Each one got a little smarter.
//! None of them got rid of the previous one, because nobody deletes working code on a Friday.
//! So here they all are, as `QueryStrategy` variants:
//!
//! - `ExactMatch`      — one `match` per field. The classic. Boring. Reliable.
//! - `WildcardDisMax`  — `*term*` wildcards, best field wins via `dis_max`.
//! - `MultiMatch`      — `multi_match` over every field, equal weights.
//! - `Relevance`       — the grown-up: `bool.should` of `match`, `match_phrase`, and a
//!                       `query_string` prefix. Any clause matching counts; scores add up.
//!
//! Everything serializes straight into the engine's query JSON. No scoring happens here.
//! Scoring is the cluster's job. We just write the letter; the cluster reads it. 🦆

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::FacadeError;

// ============================================================
// 🧱 Query building blocks
// ============================================================

/// 🧱 One query clause, externally tagged the way the engine expects:
/// `Query::Match(..)` → `{"match": {...}}`, `Query::Bool(..)` → `{"bool": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Match(FieldClause<String>),
    MatchPhrase(FieldClause<String>),
    Wildcard(FieldClause<WildcardPattern>),
    QueryString(QueryStringQuery),
    MultiMatch(MultiMatchQuery),
    DisMax(DisMaxQuery),
    Bool(BoolQuery),
}

/// 🏷️ `{field: value}` — a single-entry map whose key is the field name.
/// Serde can't derive "the key is a runtime string", so we hand-roll it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldClause<V> {
    pub field: String,
    pub value: V,
}

impl<V: Serialize> Serialize for FieldClause<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.value)?;
        map.end()
    }
}

/// 🃏 `{"value": "*term*"}` — the long form, which every engine version accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WildcardPattern {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryStringQuery {
    pub query: String,
    // ⚠️ empty fields → omitted, and the engine searches its default fields
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisMaxQuery {
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolQuery {
    pub should: Vec<Query>,
}

impl Query {
    pub fn match_field(field: impl Into<String>, term: impl Into<String>) -> Self {
        Query::Match(FieldClause {
            field: field.into(),
            value: term.into(),
        })
    }

    pub fn match_phrase(field: impl Into<String>, term: impl Into<String>) -> Self {
        Query::MatchPhrase(FieldClause {
            field: field.into(),
            value: term.into(),
        })
    }

    /// 🃏 `*term*` on one field. Leading wildcards are slow on big indices; the cluster
    /// will tell you about it in its own passive-aggressive latency graphs.
    pub fn contains(field: impl Into<String>, term: &str) -> Self {
        Query::Wildcard(FieldClause {
            field: field.into(),
            value: WildcardPattern {
                value: format!("*{term}*"),
            },
        })
    }

    /// 🔮 `term*` as a `query_string` across the given fields.
    pub fn prefix_query_string(term: &str, fields: Vec<String>) -> Self {
        Query::QueryString(QueryStringQuery {
            query: format!("{term}*"),
            fields,
        })
    }
}

// ============================================================
// 🎛️ QueryStrategy
// ============================================================

/// 🎛️ Which generation of query `SearchFacade::search` should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStrategy {
    /// `match` on each field; a single field gets a bare `match`.
    ExactMatch,
    /// `*term*` wildcard per field, combined with `dis_max` (max score, not sum).
    WildcardDisMax,
    /// `multi_match` over all fields, equal weighting.
    MultiMatch,
    /// `bool.should`: `match` + `match_phrase` per field, plus one `query_string` prefix.
    #[default]
    Relevance,
}

impl QueryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStrategy::ExactMatch => "exact_match",
            QueryStrategy::WildcardDisMax => "wildcard_dis_max",
            QueryStrategy::MultiMatch => "multi_match",
            QueryStrategy::Relevance => "relevance",
        }
    }

    /// 🏗️ Turn fields + term into a query.
    ///
    /// `ExactMatch` and `WildcardDisMax` need at least one field, since an empty
    /// `should`/`dis_max` is a question with no words in it. `MultiMatch` and
    /// `Relevance` let the engine fall back to its default fields.
    pub fn build<F: AsRef<str>>(&self, fields: &[F], term: &str) -> Result<Query, FacadeError> {
        let fields: Vec<String> = fields.iter().map(|f| f.as_ref().to_string()).collect();

        match self {
            QueryStrategy::ExactMatch => match fields.as_slice() {
                [] => Err(FacadeError::NoSearchFields { strategy: *self }),
                [only] => Ok(Query::match_field(only.clone(), term)),
                many => Ok(Query::Bool(BoolQuery {
                    should: many
                        .iter()
                        .map(|field| Query::match_field(field.clone(), term))
                        .collect(),
                })),
            },
            QueryStrategy::WildcardDisMax => {
                if fields.is_empty() {
                    return Err(FacadeError::NoSearchFields { strategy: *self });
                }
                Ok(Query::DisMax(DisMaxQuery {
                    queries: fields
                        .iter()
                        .map(|field| Query::contains(field.clone(), term))
                        .collect(),
                }))
            }
            QueryStrategy::MultiMatch => Ok(Query::MultiMatch(MultiMatchQuery {
                query: term.to_string(),
                fields,
            })),
            QueryStrategy::Relevance => {
                // 🎯 order matters for readability of the request, not for scoring:
                // all the matches, then all the phrases, then the prefix catch-all
                let mut should: Vec<Query> = fields
                    .iter()
                    .map(|field| Query::match_field(field.clone(), term))
                    .collect();
                should.extend(
                    fields
                        .iter()
                        .map(|field| Query::match_phrase(field.clone(), term)),
                );
                should.push(Query::prefix_query_string(term, fields));
                Ok(Query::Bool(BoolQuery { should }))
            }
        }
    }
}

impl fmt::Display for QueryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact_match" => Ok(QueryStrategy::ExactMatch),
            "wildcard_dis_max" => Ok(QueryStrategy::WildcardDisMax),
            "multi_match" => Ok(QueryStrategy::MultiMatch),
            "relevance" => Ok(QueryStrategy::Relevance),
            other => Err(format!(
                "unknown query strategy '{other}' (expected exact_match, wildcard_dis_max, multi_match or relevance)"
            )),
        }
    }
}
