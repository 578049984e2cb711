//! All error types for the lproj-export crate.
//!
//! These are returned from all fallible operations (loading, merging, writing, etc.).

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::WordingCategory;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("malformed property list `{}`: {reason}", .path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid locale `{0}`")]
    InvalidLocale(String),

    #[error("category `{0}` cannot be written as lines")]
    UnsupportedCategory(WordingCategory),
}

impl Error {
    /// Creates a malformed document error for the file at `path`.
    pub fn malformed(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Error::MalformedDocument {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
