//! Resource nodes: one per input directory.
//!
//! A [`ResourceNode`] collects everything its directory contributes to the
//! rendered pages, then renders one page per language it found an index
//! template for.
//!
//! ## File Classification
//!
//! | File | Effect |
//! |------|--------|
//! | `<name>[@<lang>].rq` | SPARQL JSON result, decorated and stored as `queries[lang][name]` |
//! | `index[@<lang>].html` | index template for `lang` |
//! | `index[@<lang>].md` | index template for `lang`, output piped through markdown |
//! | `<name>[@<lang>].html` / `.md` | partial `{{> name}}`, visible to this resource only |
//! | `.ttl`, `.nt`, `.jsonld`, ... | data consumed upstream, skipped quietly |
//! | anything else | skipped with a warning |
//!
//! `.hbs` and `.handlebars` are accepted as aliases of `.html`. Files without
//! an `@lang` suffix belong to the default language.
//!
//! ## Template Data
//!
//! Each language's index renders against a map of query name → decorated
//! result. The first query file seen for a language also seeds two entries:
//!
//! - `$resource`: the resource's absolute address
//! - `$language`: the language being rendered
//!
//! A language with an index but no query files renders against an empty map.
//! When two files define the same query for one language, the one listed
//! later wins.
//!
//! ## Output
//!
//! `<output_directory>/index@<lang>.html` for every language with an index.
//! The output directory is created on first write; existing files are
//! overwritten.

use crate::config::RenderConfig;
use crate::emptiness::EmptinessPolicy;
use crate::file::{FileDescriptor, FileError};
use crate::helpers;
use crate::markdown;
use crate::query::{QueryError, QueryResult};
use handlebars::{Handlebars, RenderError, TemplateError};
use log::{debug, info, warn};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Extensions of data files handled before rendering (RDF sources, query text).
const RESERVED_EXTENSIONS: &[&str] = &[
    "ttl", "rdf", "rdfxml", "nt", "ntriples", "json", "jsonld", "sparql",
];

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error(transparent)]
    File(#[from] FileError),
    #[error("malformed query result {path}: {source}")]
    Query {
        path: PathBuf,
        #[source]
        source: QueryError,
    },
    #[error("template error in {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: Box<TemplateError>,
    },
    #[error("failed to render '{language}' index of {directory}: {source}")]
    Render {
        directory: PathBuf,
        language: String,
        #[source]
        source: Box<RenderError>,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Html,
    Markdown,
}

/// What a file contributes to its resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Query { name: String, language: String },
    Index { language: String, kind: IndexKind },
    Partial { name: String },
    Reserved,
    Unknown,
}

/// Decide what `file` means for its resource. Pure: looks at the name only.
pub fn classify(file: &FileDescriptor, default_language: &str) -> Action {
    let language = || {
        file.language
            .clone()
            .unwrap_or_else(|| default_language.to_string())
    };
    let template_kind = match file.extension.as_deref() {
        Some("rq") => {
            return Action::Query {
                name: file.name.clone(),
                language: language(),
            };
        }
        Some("md") => IndexKind::Markdown,
        Some("html" | "hbs" | "handlebars") => IndexKind::Html,
        Some(ext) if RESERVED_EXTENSIONS.contains(&ext) => return Action::Reserved,
        _ => return Action::Unknown,
    };
    if file.name == "index" {
        Action::Index {
            language: language(),
            kind: template_kind,
        }
    } else {
        Action::Partial {
            name: file.name.clone(),
        }
    }
}

fn template_error(file: &FileDescriptor, source: TemplateError) -> ResourceError {
    ResourceError::Template {
        path: file.path.clone(),
        source: Box::new(source),
    }
}

fn index_template_name(language: &str) -> String {
    format!("index@{language}")
}

/// Address of a child resource: the parent's address plus one path segment.
///
/// `https://example.org/site/` + `people` → `https://example.org/site/people`
pub fn child_address(parent: &Url, segment: &str) -> Url {
    let mut address = parent.clone();
    if let Ok(mut segments) = address.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    address
}

/// What a rendered resource produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSummary {
    pub directory: PathBuf,
    pub address: Url,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

pub struct ResourceNode {
    pub directory: PathBuf,
    pub output_directory: PathBuf,
    pub address: Url,
    default_language: String,
    policy: Arc<dyn EmptinessPolicy>,
    queries: BTreeMap<String, Map<String, Json>>,
    indexes: BTreeMap<String, IndexKind>,
    skipped: Vec<PathBuf>,
    engine: Handlebars<'static>,
}

impl ResourceNode {
    pub fn new(
        directory: PathBuf,
        output_directory: PathBuf,
        address: Url,
        default_language: String,
        policy: Arc<dyn EmptinessPolicy>,
    ) -> Self {
        let mut engine = Handlebars::new();
        helpers::register(&mut engine, &address, policy.clone());
        Self {
            directory,
            output_directory,
            address,
            default_language,
            policy,
            queries: BTreeMap::new(),
            indexes: BTreeMap::new(),
            skipped: Vec::new(),
            engine,
        }
    }

    /// The node for the input root, addressed at the configured base.
    pub fn root(config: &RenderConfig, policy: Arc<dyn EmptinessPolicy>) -> Self {
        Self::new(
            config.input_dir.clone(),
            config.output_dir.clone(),
            config.base.clone(),
            config.default_language.clone(),
            policy,
        )
    }

    /// A node for the subdirectory `name`, mirrored in output and address.
    pub fn child(&self, name: &str) -> Self {
        Self::new(
            self.directory.join(name),
            self.output_directory.join(name),
            child_address(&self.address, name),
            self.default_language.clone(),
            self.policy.clone(),
        )
    }

    /// Classify `file` and merge it into this resource.
    pub fn fold(&mut self, file: &FileDescriptor) -> Result<Action, ResourceError> {
        let action = classify(file, &self.default_language);
        match &action {
            Action::Query { name, language } => {
                let result = QueryResult::parse(file.read()?).map_err(|source| {
                    ResourceError::Query {
                        path: file.path.clone(),
                        source,
                    }
                })?;
                let address = self.address.to_string();
                let queries = self.queries.entry(language.clone()).or_insert_with(|| {
                    let mut seeded = Map::new();
                    seeded.insert("$resource".to_string(), Json::String(address));
                    seeded.insert("$language".to_string(), Json::String(language.clone()));
                    seeded
                });
                if queries.insert(name.clone(), result.decorate()).is_some() {
                    debug!("{} replaces query '{name}' for '{language}'", file.path.display());
                }
            }
            Action::Index { language, kind } => {
                self.engine
                    .register_template_string(&index_template_name(language), file.read()?)
                    .map_err(|source| template_error(file, source))?;
                self.indexes.insert(language.clone(), *kind);
            }
            Action::Partial { name } => {
                self.engine
                    .register_partial(name, file.read()?)
                    .map_err(|source| template_error(file, source))?;
            }
            Action::Reserved => {
                debug!("Skipping data file {}", file.path.display());
                self.skipped.push(file.path.clone());
            }
            Action::Unknown => {
                warn!(
                    "Unknown file extension {} for {}",
                    file.extension.as_deref().unwrap_or("(none)"),
                    file.path.display()
                );
                self.skipped.push(file.path.clone());
            }
        }
        Ok(action)
    }

    /// Accumulated query map for `language`, including `$resource`/`$language`.
    pub fn queries(&self, language: &str) -> Option<&Map<String, Json>> {
        self.queries.get(language)
    }

    /// Languages with an index template, in sorted order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(String::as_str)
    }

    /// Render every language's index and write it to the output directory.
    pub fn render(self) -> Result<ResourceSummary, ResourceError> {
        let mut written = Vec::new();
        for (language, kind) in &self.indexes {
            let data = self
                .queries
                .get(language)
                .cloned()
                .map(Json::Object)
                .unwrap_or_else(|| Json::Object(Map::new()));

            let rendered = self
                .engine
                .render(&index_template_name(language), &data)
                .map_err(|source| ResourceError::Render {
                    directory: self.directory.clone(),
                    language: language.clone(),
                    source: Box::new(source),
                })?;
            let html = match kind {
                IndexKind::Html => rendered,
                IndexKind::Markdown => markdown::render(&rendered),
            };

            let path = self.output_directory.join(format!("index@{language}.html"));
            info!("rendering language {language} @ {}", path.display());
            fs::create_dir_all(&self.output_directory).map_err(|source| ResourceError::Write {
                path: self.output_directory.clone(),
                source,
            })?;
            fs::write(&path, html).map_err(|source| ResourceError::Write {
                path: path.clone(),
                source,
            })?;
            written.push(path);
        }

        Ok(ResourceSummary {
            directory: self.directory,
            address: self.address,
            written,
            skipped: self.skipped,
        })
    }
}
