//! Options controlling where and how an export writes its files.

use std::path::{Path, PathBuf};

use crate::{error::Error, formats::OutputFile};

/// File naming and formatting options for [`crate::Exporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// File receiving singular entries.
    pub strings_file_name: String,
    /// File receiving info-plist entries.
    pub info_plist_file_name: String,
    /// Property list receiving plural and adaptive rules.
    pub stringsdict_file_name: String,
    /// Spaces per nesting level in the property list.
    pub indent: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            strings_file_name: OutputFile::Strings.default_file_name().to_string(),
            info_plist_file_name: OutputFile::InfoPlistStrings.default_file_name().to_string(),
            stringsdict_file_name: OutputFile::Stringsdict.default_file_name().to_string(),
            indent: 4,
        }
    }
}

impl ExportOptions {
    /// Creates default export options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strings_file_name(mut self, name: impl Into<String>) -> Self {
        self.strings_file_name = name.into();
        self
    }

    pub fn with_info_plist_file_name(mut self, name: impl Into<String>) -> Self {
        self.info_plist_file_name = name.into();
        self
    }

    pub fn with_stringsdict_file_name(mut self, name: impl Into<String>) -> Self {
        self.stringsdict_file_name = name.into();
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// The configured file name of `file`.
    pub fn file_name(&self, file: OutputFile) -> &str {
        match file {
            OutputFile::Strings => &self.strings_file_name,
            OutputFile::InfoPlistStrings => &self.info_plist_file_name,
            OutputFile::Stringsdict => &self.stringsdict_file_name,
        }
    }
}

/// Resolves (and creates) the output directory of a locale.
pub trait LocaleDirResolver {
    fn resolve(&self, locale: &str) -> Result<PathBuf, Error>;
}

/// Lays locales out as `<root>/<locale>.lproj`, creating directories on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LprojResolver {
    root: PathBuf,
}

impl LprojResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LocaleDirResolver for LprojResolver {
    fn resolve(&self, locale: &str) -> Result<PathBuf, Error> {
        let dir = self.root.join(format!("{}.lproj", locale));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
