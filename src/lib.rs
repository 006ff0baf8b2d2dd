//! # rdfpub-render
//!
//! Renders a directory tree of SPARQL query results and Handlebars templates
//! into localized HTML pages. Every directory is a *resource*: its query
//! results and templates become one page per language, written to the same
//! relative location under the output root.
//!
//! ```text
//! input/                              output/
//! ├── index@en.html                   ├── index@en.html
//! ├── index@fr.md                     ├── index@fr.html
//! ├── header.html      (partial)      └── people/
//! ├── site@en.rq                          └── index@en.html
//! ├── site@fr.rq
//! └── people/
//!     ├── index@en.html
//!     └── people@en.rq
//! ```
//!
//! Names carry the metadata: `<name>[@<language>].<extension>`. The extension
//! says what a file is, the name identifies it, the language suffix says
//! which page it belongs to.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`walk`] | Iterative tree walk: one [`resource::ResourceNode`] per directory |
//! | [`resource`] | File classification, per-language accumulation, page rendering |
//! | [`file`] | `<name>[@<language>].<extension>` parser with cached reads |
//! | [`query`] | SPARQL JSON results and their scalar/sequence decoration |
//! | [`emptiness`] | Truthiness rules for `{{#if}}`, `{{#each}}` and the logical helpers |
//! | [`helpers`] | `any`, `all`, `equals`, `markdown`, `relative` and the block helpers |
//! | [`markdown`] | Markdown → HTML |
//! | [`config`] | Command-line configuration and validation |
//! | [`output`] | Run summary formatting |
//!
//! # Design Decisions
//!
//! ## One Template Engine per Resource
//!
//! Each resource builds its own Handlebars registry. Partials registered in
//! one directory are invisible everywhere else, and helpers that depend on
//! the resource (like `relative`, which resolves against the resource's
//! address) are configured once when the node is created. Nothing is
//! registered globally.
//!
//! ## Query Results Are Scalars, Sequences and Conditions
//!
//! Template authors write `{{people.name}}`, `{{#each people}}` and
//! `{{#if people}}` against the same query. [`query::QueryResult::decorate`]
//! builds a JSON value that supports all three, and the block helpers in
//! [`helpers`] consult an [`emptiness::EmptinessPolicy`] so that a query
//! without rows is falsy.
//!
//! ## Full Rebuilds
//!
//! Every run walks and renders the whole tree. There is no cache: the input
//! is a static snapshot produced by an upstream step, and rendering is cheap
//! next to running the queries.

pub mod config;
pub mod emptiness;
pub mod file;
pub mod helpers;
pub mod markdown;
pub mod output;
pub mod query;
pub mod resource;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
