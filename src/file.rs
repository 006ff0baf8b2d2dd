//! File naming convention parser for resource directories.
//!
//! Every file inside a resource directory follows the same pattern:
//! `<name>[@<language>].<extension>`. The extension decides how the file is
//! used (query result, index template, partial), the name identifies it, and
//! the optional language suffix selects which localized page it belongs to.
//!
//! - `index@en.html` → name="index", language=Some("en"), extension=Some("html")
//! - `people@fr.rq` → name="people", language=Some("fr"), extension=Some("rq")
//! - `header.md` → name="header", language=None, extension=Some("md")
//! - `README` → name="README", language=None, extension=None
//!
//! The language split only happens when the filename has an extension, so a
//! bare `foo@bar` stays a single name.

use std::cell::OnceCell;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file found while walking a resource directory.
///
/// Contents are read lazily and cached: the first successful [`read`](Self::read)
/// pins the text for the lifetime of the descriptor.
#[derive(Debug)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub name: String,
    pub extension: Option<String>,
    pub language: Option<String>,
    contents: OnceCell<String>,
}

impl FileDescriptor {
    /// Parse a path into its naming components. Never fails.
    pub fn parse(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (name, extension, language) = match filename.rfind('.') {
            None => (filename, None, None),
            Some(dot) => {
                let stem = &filename[..dot];
                let extension = filename[dot + 1..].to_string();
                match stem.split_once('@') {
                    Some((name, language)) => {
                        (name.to_string(), Some(extension), Some(language.to_string()))
                    }
                    None => (stem.to_string(), Some(extension), None),
                }
            }
        };

        Self {
            path,
            name,
            extension,
            language,
            contents: OnceCell::new(),
        }
    }

    /// Read the file as text, caching the result.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn read(&self) -> Result<&str, FileError> {
        if let Some(contents) = self.contents.get() {
            return Ok(contents.as_str());
        }
        let bytes = fs::read(&self.path).map_err(|source| FileError::Io {
            path: self.path.clone(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(self.contents.get_or_init(|| text).as_str())
    }
}
