//! Resource tree traversal.
//!
//! The walk keeps an explicit worklist instead of recursing, so directory
//! depth is bounded by memory rather than stack size:
//!
//! ```text
//! worklist = [root]
//! while let Some(node) = worklist.pop():
//!     for entry in node.directory (sorted by name):
//!         directory → worklist.push(node.child(entry))
//!         file      → node.fold(entry)
//!         other     → warn, skip
//!     node.render()
//! ```
//!
//! A node renders as soon as its own directory has been read. It never looks
//! at its children, and children are rendered later from the worklist, so
//! every node is visited exactly once and nothing is shared between them.
//!
//! Symbolic links are followed. Each worklist entry carries the canonical
//! paths of its ancestors, and a directory entry that resolves to one of them
//! (`sub/up -> ..`) is a loop: it is logged and skipped. Links to directories
//! outside the chain are ordinary resources.

use crate::config::RenderConfig;
use crate::emptiness::{EmptinessPolicy, EngineDefault, QueryAware};
use crate::file::FileDescriptor;
use crate::resource::{ResourceError, ResourceNode, ResourceSummary};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to list {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Everything a completed run rendered, in visiting order.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub resources: Vec<ResourceSummary>,
}

impl RenderReport {
    pub fn pages_written(&self) -> usize {
        self.resources.iter().map(|r| r.written.len()).sum()
    }

    pub fn files_skipped(&self) -> usize {
        self.resources.iter().map(|r| r.skipped.len()).sum()
    }
}

/// Render the whole tree described by `config` with the standard emptiness rules.
pub fn render_tree(config: &RenderConfig) -> Result<RenderReport, WalkError> {
    render_tree_with(config, Arc::new(QueryAware::<EngineDefault>::default()))
}

/// Render the whole tree with an explicit emptiness policy.
pub fn render_tree_with(
    config: &RenderConfig,
    policy: Arc<dyn EmptinessPolicy>,
) -> Result<RenderReport, WalkError> {
    let mut report = RenderReport::default();
    let root = resolve(&config.input_dir)?;
    let mut worklist = vec![(ResourceNode::root(config, policy), vec![root])];

    while let Some((mut node, ancestors)) = worklist.pop() {
        info!("Processing {} <{}>", node.directory.display(), node.address);
        let children = scan_node(&mut node, &ancestors)?;
        report.resources.push(node.render()?);
        worklist.extend(children);
    }

    Ok(report)
}

fn resolve(path: &Path) -> Result<PathBuf, WalkError> {
    fs::canonicalize(path).map_err(|source| WalkError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

/// Fold the files of `node`'s directory into it and return its child nodes,
/// each paired with its own ancestor chain.
///
/// `ancestors` holds the canonical paths from the root down to `node`.
fn scan_node(
    node: &mut ResourceNode,
    ancestors: &[PathBuf],
) -> Result<Vec<(ResourceNode, Vec<PathBuf>)>, WalkError> {
    let mut children = Vec::new();
    let entries = WalkDir::new(&node.directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                warn!("Skipping unreadable entry in {}: {e}", node.directory.display());
                continue;
            }
            Err(source) => {
                return Err(WalkError::Listing {
                    path: node.directory.clone(),
                    source,
                });
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            let canonical = match fs::canonicalize(entry.path()) {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unresolvable directory {}: {e}", entry.path().display());
                    continue;
                }
            };
            if ancestors.contains(&canonical) {
                warn!(
                    "Skipping {}: links back to {}",
                    entry.path().display(),
                    canonical.display()
                );
                continue;
            }
            let mut chain = ancestors.to_vec();
            chain.push(canonical);
            let name = entry.file_name().to_string_lossy();
            children.push((node.child(&name), chain));
        } else if file_type.is_file() {
            node.fold(&FileDescriptor::parse(entry.path()))?;
        } else {
            warn!("Unknown file type for {}", entry.path().display());
        }
    }

    // Pop order follows name order.
    children.reverse();
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(input: &std::path::Path, output: &std::path::Path) -> RenderConfig {
        RenderConfig::new(input, output, "https://example.org/site/", "en").unwrap()
    }

    #[test]
    fn two_level_tree() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("root");
        let output = tmp.path().join("output");
        write_file(&input, "index@en.html", "root");
        write_file(&input, "child/index@en.html", "{{q.label}} {{$resource}}");
        write_query(&input, "child/q@en.rq", &["label"], &[&["hello"]]);

        let report = render_tree(&config(&input, &output)).unwrap();

        assert_eq!(report.pages_written(), 2);
        assert_eq!(fs::read_to_string(output.join("index@en.html")).unwrap(), "root");
        assert_eq!(
            fs::read_to_string(output.join("child/index@en.html")).unwrap(),
            "hello https://example.org/site/child"
        );
    }

    #[test]
    fn visits_every_directory_once() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        write_file(&input, "a/x/index@en.html", "ax");
        write_file(&input, "a/index@en.html", "a");
        write_file(&input, "b/index@en.html", "b");

        let report = render_tree(&config(&input, &tmp.path().join("out"))).unwrap();

        let addresses: Vec<&str> = report.resources.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec![
                "https://example.org/site/",
                "https://example.org/site/a",
                "https://example.org/site/a/x",
                "https://example.org/site/b",
            ]
        );
    }

    #[test]
    fn directory_with_only_unknown_files_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        write_file(&input, "index@en.html", "root");
        write_file(&input, "notes/readme.txt", "hi");

        let report = render_tree(&config(&input, &output)).unwrap();

        assert_eq!(report.pages_written(), 1);
        assert_eq!(report.files_skipped(), 1);
        assert!(!output.join("notes").exists());
    }

    #[test]
    fn malformed_query_aborts_the_walk() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        write_file(&input, "index@en.html", "root");
        write_file(&input, "sub/bad@en.rq", "not json");

        let err = render_tree(&config(&input, &tmp.path().join("out"))).unwrap_err();
        assert!(matches!(
            err,
            WalkError::Resource(ResourceError::Query { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        write_file(&input, "index@en.html", "root");
        std::os::unix::fs::symlink(input.join("missing"), input.join("dangling.rq")).unwrap();

        let report = render_tree(&config(&input, &tmp.path().join("out"))).unwrap();
        assert_eq!(report.pages_written(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn link_to_ancestor_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        write_file(&input, "index@en.html", "root");
        write_file(&input, "sub/index@en.html", "sub");
        std::os::unix::fs::symlink("..", input.join("sub/up")).unwrap();
        std::os::unix::fs::symlink(".", input.join("sub/here")).unwrap();

        let report = render_tree(&config(&input, &output)).unwrap();

        assert_eq!(report.resources.len(), 2);
        assert_eq!(report.pages_written(), 2);
        assert!(!output.join("sub/up").exists());
        assert!(!output.join("sub/here").exists());
    }

    #[cfg(unix)]
    #[test]
    fn link_to_sibling_is_its_own_resource() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        write_file(&input, "a/index@en.html", "{{$resource}}");
        write_query(&input, "a/q@en.rq", &["x"], &[]);
        std::os::unix::fs::symlink("a", input.join("b")).unwrap();

        let report = render_tree(&config(&input, &output)).unwrap();

        assert_eq!(report.pages_written(), 2);
        assert_eq!(
            fs::read_to_string(output.join("b/index@en.html")).unwrap(),
            "https://example.org/site/b"
        );
    }
}
