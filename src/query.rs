//! SPARQL JSON query results and their template-facing decoration.
//!
//! Query result files (`<name>[@<language>].rq`) hold the standard SPARQL 1.1
//! JSON results format:
//!
//! ```json
//! {
//!   "head": { "vars": ["name", "homepage"] },
//!   "results": { "bindings": [
//!     { "name": { "type": "literal", "value": "Ada" },
//!       "homepage": { "type": "uri", "value": "https://ada.example/" } }
//!   ] }
//! }
//! ```
//!
//! ## Decoration
//!
//! Templates want to treat a result set three ways at once:
//!
//! - as a scalar: `{{people.name}}` → first row's value for `name`
//! - as a sequence: `{{#each people}}{{name}}{{/each}}` → one pass per row
//! - as a condition: `{{#if people}}` → true iff there is at least one row
//!
//! [`QueryResult::decorate`] produces a JSON object carrying all three views:
//!
//! ```json
//! {
//!   "head": { ... },            // raw, untouched
//!   "results": { ... },         // raw, untouched
//!   "name": "Ada",              // one scalar per variable ("" when absent)
//!   "homepage": "https://ada.example/",
//!   "$rows": [ {
//!     "name": "Ada",
//!     "homepage": "https://ada.example/",
//!     "$binding": { "name": { "type": "literal", "value": "Ada" }, ... }
//!   } ]
//! }
//! ```
//!
//! The `$rows` member marks the object as a decorated result. The
//! emptiness-aware block helpers in [`crate::helpers`] look for it to iterate
//! rows and to decide truthiness. Scalars never shadow `head`, `results` or
//! `$rows`.
//!
//! Each row also carries the raw term records under `$binding`, so typed and
//! language-tagged values stay reachable inside a loop:
//! `{{#each people}}{{$binding.name.[xml:lang]}}{{/each}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json, json};
use std::collections::BTreeMap;
use thiserror::Error;

/// Reserved member holding the flattened rows of a decorated result.
pub const ROWS_KEY: &str = "$rows";

/// Reserved row member holding that row's raw term records.
pub const BINDING_KEY: &str = "$binding";

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("malformed SPARQL JSON results: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One parsed SPARQL JSON result set.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryResult {
    #[serde(default)]
    pub head: Head,
    #[serde(default)]
    pub results: Results,
    /// Anything else in the document (e.g. `boolean` for ASK queries).
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Results {
    #[serde(default)]
    pub bindings: Vec<BTreeMap<String, Term>>,
}

/// A bound RDF term: `{ "type": ..., "value": ..., "xml:lang"?: ..., "datatype"?: ... }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Term {
    #[serde(default)]
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

impl QueryResult {
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        Ok(serde_json::from_str(text)?)
    }

    /// First row's value for `var`, or `""` when there are no rows or the
    /// first row leaves `var` unbound.
    pub fn scalar(&self, var: &str) -> &str {
        self.results
            .bindings
            .first()
            .and_then(|row| row.get(var))
            .map(|term| term.value.as_str())
            .unwrap_or("")
    }

    /// Rows in original order, each flattened to `variable → value`.
    ///
    /// Every declared variable is present; unbound ones map to `""`. The raw
    /// binding sits next to them under [`BINDING_KEY`].
    pub fn rows(&self) -> Vec<Map<String, Json>> {
        self.results
            .bindings
            .iter()
            .map(|binding| {
                let mut row: Map<String, Json> = self
                    .head
                    .vars
                    .iter()
                    .map(|var| {
                        let value = binding.get(var).map(|t| t.value.as_str()).unwrap_or("");
                        (var.clone(), Json::String(value.to_string()))
                    })
                    .collect();
                row.insert(BINDING_KEY.to_string(), json!(binding));
                row
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }

    /// Build the template-facing value described in the module docs.
    pub fn decorate(&self) -> Json {
        let mut object = self.extra.clone();
        object.insert("head".to_string(), json!(self.head));
        object.insert("results".to_string(), json!(self.results));

        for var in &self.head.vars {
            if is_reserved(var) {
                continue;
            }
            object.insert(var.clone(), Json::String(self.scalar(var).to_string()));
        }

        let rows = self.rows().into_iter().map(Json::Object).collect();
        object.insert(ROWS_KEY.to_string(), Json::Array(rows));
        Json::Object(object)
    }
}

fn is_reserved(var: &str) -> bool {
    matches!(var, "head" | "results") || var == ROWS_KEY
}

/// Decorate an already-parsed JSON value.
///
/// Accepts both raw and decorated input; decorating twice yields the same value.
pub fn decorate(value: Json) -> Result<Json, QueryError> {
    let mut parsed: QueryResult = serde_json::from_value(value)?;
    // Drop members left over from a previous decoration; they are rebuilt below.
    parsed.extra.remove(ROWS_KEY);
    for var in &parsed.head.vars {
        parsed.extra.remove(var);
    }
    Ok(parsed.decorate())
}

/// Rows of a decorated result, or `None` if `value` is not one.
pub fn decorated_rows(value: &Json) -> Option<&Vec<Json>> {
    value.as_object()?.get(ROWS_KEY)?.as_array()
}

/// Scalar view of a decorated result: its first variable's value.
pub fn decorated_scalar(value: &Json) -> Option<&str> {
    let object = value.as_object()?;
    object.get(ROWS_KEY)?;
    let first_var = object.get("head")?.get("vars")?.as_array()?.first()?.as_str()?;
    Some(object.get(first_var).and_then(Json::as_str).unwrap_or(""))
}
