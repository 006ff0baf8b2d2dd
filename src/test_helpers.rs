//! Shared test utilities for the rdfpub-render test suite.
//!
//! Builds small input trees on disk and resource nodes pointed at them.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_file(tmp.path(), "index@en.html", "{{people.name}}");
//! write_query(tmp.path(), "people@en.rq", &["name"], &[&["Ada"]]);
//!
//! let mut node = node_at(tmp.path(), &tmp.path().join("out"));
//! fold_dir(&mut node, tmp.path());
//! node.render().unwrap();
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value as Json, json};
use url::Url;

use crate::emptiness::{EngineDefault, QueryAware};
use crate::file::FileDescriptor;
use crate::resource::ResourceNode;

pub const TEST_BASE: &str = "https://example.org/";

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `contents` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

/// SPARQL JSON results with literal bindings, one row per `rows` entry.
///
/// Empty strings leave the variable unbound in that row.
pub fn query_json(vars: &[&str], rows: &[&[&str]]) -> String {
    let bindings: Vec<Json> = rows
        .iter()
        .map(|row| {
            let binding: Map<String, Json> = vars
                .iter()
                .zip(row.iter())
                .filter(|(_, value)| !value.is_empty())
                .map(|(var, value)| {
                    (
                        var.to_string(),
                        json!({ "type": "literal", "value": value }),
                    )
                })
                .collect();
            Json::Object(binding)
        })
        .collect();
    json!({ "head": { "vars": vars }, "results": { "bindings": bindings } }).to_string()
}

/// Write a query result file built by [`query_json`].
pub fn write_query(dir: &Path, relative: &str, vars: &[&str], rows: &[&[&str]]) -> PathBuf {
    write_file(dir, relative, &query_json(vars, rows))
}

// =========================================================================
// Resource nodes
// =========================================================================

/// A root node at `input`, writing to `output`, addressed at [`TEST_BASE`].
pub fn node_at(input: &Path, output: &Path) -> ResourceNode {
    ResourceNode::new(
        input.to_path_buf(),
        output.to_path_buf(),
        Url::parse(TEST_BASE).unwrap(),
        "en".to_string(),
        Arc::new(QueryAware::<EngineDefault>::default()),
    )
}

/// Fold every regular file directly inside `dir` into `node`, in name order.
pub fn fold_dir(node: &mut ResourceNode, dir: &Path) {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    for path in files {
        node.fold(&FileDescriptor::parse(path)).unwrap();
    }
}
