//! Run configuration.
//!
//! A render run is fully described by four values taken from the command line:
//!
//! ```text
//! rdfpub-render <INPUT> <OUTPUT> <BASE> [DEFAULT_LANGUAGE]
//!
//!   INPUT             directory tree of resources (must exist)
//!   OUTPUT            root of the mirrored output tree
//!   BASE              http(s) address the output root is served at
//!   DEFAULT_LANGUAGE  language for files without an @language suffix (default: en)
//! ```
//!
//! There is no config file and nothing is read from the environment. All
//! validation happens here, before the walk starts, so a bad argument never
//! leaves partial output behind.

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("input directory does not exist: {0}")]
    InputNotFound(PathBuf),
    #[error("input path is not a directory: {0}")]
    InputNotDirectory(PathBuf),
    #[error("invalid base address '{base}': {source}")]
    InvalidBase {
        base: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base address must be an http: or https: URL, got '{0}'")]
    UnsupportedScheme(String),
    #[error("'{0}' is not a language code (ex: en, en-us, es, tr)")]
    InvalidLanguage(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Address of the root resource.
    pub base: Url,
    pub default_language: String,
}

impl RenderConfig {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        base: &str,
        default_language: &str,
    ) -> Result<Self, ConfigError> {
        let input_dir = input_dir.into();
        if !input_dir.exists() {
            return Err(ConfigError::InputNotFound(input_dir));
        }
        if !input_dir.is_dir() {
            return Err(ConfigError::InputNotDirectory(input_dir));
        }

        let base_url = Url::parse(base).map_err(|source| ConfigError::InvalidBase {
            base: base.to_string(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || !base_url.has_host() {
            return Err(ConfigError::UnsupportedScheme(base.to_string()));
        }

        if !is_language_tag(default_language) {
            return Err(ConfigError::InvalidLanguage(default_language.to_string()));
        }

        Ok(Self {
            input_dir,
            output_dir: output_dir.into(),
            base: base_url,
            default_language: default_language.to_string(),
        })
    }
}

/// Check a language code against `[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*`.
pub fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()));
    primary_ok && parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}
