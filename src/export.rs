//! Per-locale export of a [`TranslationTable`] into `.strings` and
//! `.stringsdict` files.
//!
//! The [`Exporter`] resolves the locale directory, classifies the table with
//! [`crate::selector::select`] and hands every non-empty category to its
//! handler. Plural and adaptive rules are merged into the locale's property
//! list; singular and info-plist entries are appended as lines.
//!
//! Each locale is independent: exporting different locales from different
//! threads is fine, but two exports of the same locale must not overlap.

use std::path::PathBuf;

use indexmap::IndexMap;
use unic_langid::LanguageIdentifier;

use crate::{
    error::Error,
    formats::{LineWriter, OutputFile, PlistMerger, RuleBuilder},
    options::{ExportOptions, LocaleDirResolver, LprojResolver},
    selector::{CategoryMap, select},
    types::{TranslationTable, WordingCategory},
};

/// Where one locale's files go.
struct LocaleTarget<'a> {
    dir: PathBuf,
    locale: &'a str,
    options: &'a ExportOptions,
}

impl LocaleTarget<'_> {
    fn path(&self, category: WordingCategory) -> PathBuf {
        self.dir
            .join(self.options.file_name(OutputFile::for_category(category)))
    }

    fn rule_builder(&self) -> RuleBuilder {
        RuleBuilder::new(PlistMerger::new(self.options.indent))
    }
}

type Handler = fn(&LocaleTarget<'_>, WordingCategory, &CategoryMap<'_>) -> Result<usize, Error>;

/// Category handlers, in dispatch order.
const HANDLERS: [(WordingCategory, Handler); 4] = [
    (WordingCategory::Plural, write_plural),
    (WordingCategory::Adaptive, write_adaptive),
    (WordingCategory::Singular, write_lines),
    (WordingCategory::InfoPlist, write_lines),
];

fn write_plural(
    target: &LocaleTarget<'_>,
    category: WordingCategory,
    entries: &CategoryMap<'_>,
) -> Result<usize, Error> {
    target
        .rule_builder()
        .write_plural(target.path(category), target.locale, entries)
}

fn write_adaptive(
    target: &LocaleTarget<'_>,
    category: WordingCategory,
    entries: &CategoryMap<'_>,
) -> Result<usize, Error> {
    target
        .rule_builder()
        .write_adaptive(target.path(category), target.locale, entries)
}

fn write_lines(
    target: &LocaleTarget<'_>,
    category: WordingCategory,
    entries: &CategoryMap<'_>,
) -> Result<usize, Error> {
    LineWriter::append(target.path(category), target.locale, category, entries)
}

/// What one locale export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub locale: String,
    pub dir: PathBuf,
    /// Entries written per category; empty categories are absent.
    pub written: IndexMap<WordingCategory, usize>,
    /// Categories with no entries for this locale.
    pub skipped: Vec<WordingCategory>,
}

impl ExportSummary {
    pub fn written(&self, category: WordingCategory) -> usize {
        self.written.get(&category).copied().unwrap_or(0)
    }
}

/// Exports translation tables into per-locale directories.
#[derive(Debug, Clone)]
pub struct Exporter<R = LprojResolver> {
    resolver: R,
    options: ExportOptions,
}

impl Exporter<LprojResolver> {
    /// Exports into `<root>/<locale>.lproj` with default options.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_resolver(LprojResolver::new(root), ExportOptions::default())
    }
}

impl<R: LocaleDirResolver> Exporter<R> {
    pub fn with_resolver(resolver: R, options: ExportOptions) -> Self {
        Self { resolver, options }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Exports `table` for `locale`.
    ///
    /// Nothing is written when the wordings of `locale` fail validation or the
    /// locale is not a valid language identifier. Line files are appended to and the
    /// property list is merged into, so running an export twice duplicates
    /// its entries.
    pub fn export(&self, table: &TranslationTable, locale: &str) -> Result<ExportSummary, Error> {
        validate_locale(locale)?;
        table.validate_for_locale(locale)?;

        let target = LocaleTarget {
            dir: self.resolver.resolve(locale)?,
            locale,
            options: &self.options,
        };
        let selection = select(table, locale);

        let mut summary = ExportSummary {
            locale: locale.to_string(),
            dir: target.dir.clone(),
            written: IndexMap::new(),
            skipped: Vec::new(),
        };
        for (category, handler) in HANDLERS {
            let entries = selection.get(category);
            if entries.is_empty() {
                summary.skipped.push(category);
                continue;
            }
            let count = handler(&target, category, entries)?;
            summary.written.insert(category, count);
        }

        Ok(summary)
    }

    /// Exports every locale in `locales`, continuing past failures.
    pub fn export_locales<'l, I>(
        &self,
        table: &TranslationTable,
        locales: I,
    ) -> Vec<(String, Result<ExportSummary, Error>)>
    where
        I: IntoIterator<Item = &'l str>,
    {
        locales
            .into_iter()
            .map(|locale| {
                let result = self.export(table, locale);
                if let Err(e) = &result {
                    tracing::warn!(locale, error = %e, "export failed");
                }
                (locale.to_string(), result)
            })
            .collect()
    }

    /// Exports every locale the table mentions.
    pub fn export_all(&self, table: &TranslationTable) -> Vec<(String, Result<ExportSummary, Error>)> {
        self.export_locales(table, table.locales())
    }
}

/// Rejects locale codes that are not language identifiers, so they can be
/// used as directory names. Xcode's `Base` locale is accepted as is.
pub fn validate_locale(locale: &str) -> Result<(), Error> {
    if locale == "Base" {
        return Ok(());
    }
    if locale.is_empty() {
        return Err(Error::InvalidLocale(String::new()));
    }
    locale
        .parse::<LanguageIdentifier>()
        .map(|_| ())
        .map_err(|_| Error::InvalidLocale(locale.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WordingEntry;

    #[test]
    fn test_validate_locale() {
        for locale in ["en", "fr-FR", "zh-Hans", "pt_BR", "Base"] {
            assert!(validate_locale(locale).is_ok(), "{locale}");
        }
        for locale in ["", "../en", "en/fr", "not a locale"] {
            assert!(
                matches!(validate_locale(locale), Err(Error::InvalidLocale(_))),
                "{locale}"
            );
        }
    }

    #[test]
    fn test_handlers_cover_every_category_once() {
        let categories: Vec<WordingCategory> = HANDLERS.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, WordingCategory::ALL.to_vec());
    }

    #[test]
    fn test_export_summary_counts() {
        let temp = tempfile::tempdir().unwrap();
        let mut table = TranslationTable::new();
        table
            .insert("a", "en", WordingEntry::singular("A"))
            .insert("b", "en", WordingEntry::singular("B"))
            .insert("c", "en", WordingEntry::plural([("other", "%d c")]));

        let summary = Exporter::new(temp.path()).export(&table, "en").unwrap();
        assert_eq!(summary.dir, temp.path().join("en.lproj"));
        assert_eq!(summary.written(WordingCategory::Singular), 2);
        assert_eq!(summary.written(WordingCategory::Plural), 1);
        assert_eq!(
            summary.skipped,
            vec![WordingCategory::Adaptive, WordingCategory::InfoPlist]
        );
    }

    #[test]
    fn test_invalid_locale_writes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let mut table = TranslationTable::new();
        table.insert("a", "../x", WordingEntry::singular("A"));

        let err = Exporter::new(temp.path()).export(&table, "../x").unwrap_err();
        assert!(matches!(err, Error::InvalidLocale(_)));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
