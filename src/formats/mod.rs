//! Apple localization files written by an export.
//!
//! - [`strings`]: flat `.strings` key/value lines.
//! - [`plist`]: the XML property list document and its merge step.
//! - [`stringsdict`]: plural and adaptive rule dictionaries merged into a `.stringsdict`.

pub mod plist;
pub mod strings;
pub mod stringsdict;

use std::fmt::{Display, Formatter};

pub use plist::{DictBuilder, PlistDocument, PlistMerger};
pub use strings::{Line, LineWriter};
pub use stringsdict::RuleBuilder;

use crate::types::WordingCategory;

/// The files produced inside one locale directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFile {
    /// `Localizable.strings`, singular entries.
    Strings,
    /// `InfoPlist.strings`, info-plist entries.
    InfoPlistStrings,
    /// `Localizable.stringsdict`, plural and adaptive rules.
    Stringsdict,
}

impl OutputFile {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            OutputFile::Strings => "Localizable.strings",
            OutputFile::InfoPlistStrings => "InfoPlist.strings",
            OutputFile::Stringsdict => "Localizable.stringsdict",
        }
    }

    /// The file a wording category is exported to.
    pub fn for_category(category: WordingCategory) -> Self {
        match category {
            WordingCategory::Singular => OutputFile::Strings,
            WordingCategory::InfoPlist => OutputFile::InfoPlistStrings,
            WordingCategory::Plural | WordingCategory::Adaptive => OutputFile::Stringsdict,
        }
    }
}

impl Display for OutputFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.default_file_name())
    }
}
