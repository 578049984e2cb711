#![forbid(unsafe_code)]
//! Export translation tables into Apple localization files.
//!
//! For every locale, a [`TranslationTable`] is split into four categories:
//!
//! - **singular** entries are appended to `Localizable.strings`
//! - **info_plist** entries are appended to `InfoPlist.strings`
//! - **plural** and **adaptive** entries are merged into `Localizable.stringsdict`,
//!   keeping whatever an earlier export already put there
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lproj_export::{Exporter, TranslationTable, WordingEntry};
//!
//! let mut table = TranslationTable::new();
//! table
//!     .insert("app_name", "en", WordingEntry::singular("MyApp").with_comment("display name"))
//!     .insert(
//!         "cart_count",
//!         "en",
//!         WordingEntry::plural([("one", "1 item"), ("other", "%d items")]),
//!     );
//!
//! // Writes into build/en.lproj/
//! Exporter::new("build").export(&table, "en")?;
//! # Ok::<(), lproj_export::Error>(())
//! ```
//!
//! Progress is reported through `tracing`: an info event for every category a
//! locale has no entries for, and a debug event for every file written.

pub mod error;
pub mod export;
pub mod formats;
pub mod options;
pub mod selector;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    export::{ExportSummary, Exporter, validate_locale},
    formats::{DictBuilder, LineWriter, OutputFile, PlistDocument, PlistMerger, RuleBuilder},
    options::{ExportOptions, LocaleDirResolver, LprojResolver},
    selector::{CategoryMap, CategorySelection, select},
    traits::Parser,
    types::{LocaleMap, RuleMap, TranslationTable, WordingCategory, WordingEntry},
};
