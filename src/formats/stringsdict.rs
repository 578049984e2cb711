//! Plural and adaptive-width rule dictionaries for `.stringsdict` files.
//!
//! Plural wordings are written as
//!
//! ```xml
//! <key>cart_count</key>
//! <dict>
//!     <key>NSStringLocalizedFormatKey</key>
//!     <string>%#@key@</string>
//!     <key>key</key>
//!     <dict>
//!         <key>NSStringFormatSpecTypeKey</key>
//!         <string>NSStringPluralRuleType</string>
//!         <key>NSStringFormatValueTypeKey</key>
//!         <string>d</string>
//!         <key>one</key>
//!         <string>1 item</string>
//!         <key>other</key>
//!         <string>%d items</string>
//!     </dict>
//! </dict>
//! ```
//!
//! and adaptive wordings as a `NSStringVariableWidthRuleType` dict of width
//! bucket to string.

use std::path::Path;

use crate::{
    error::Error,
    formats::plist::{DictBuilder, PlistMerger},
    selector::CategoryMap,
    types::{RuleMap, WordingCategory, WordingEntry},
};

pub const FORMAT_KEY: &str = "NSStringLocalizedFormatKey";
/// Format token selecting the `key` variable's rule at runtime.
pub const PIVOT_TOKEN: &str = "%#@key@";
pub const PIVOT_KEY: &str = "key";
pub const SPEC_TYPE_KEY: &str = "NSStringFormatSpecTypeKey";
pub const PLURAL_RULE_TYPE: &str = "NSStringPluralRuleType";
pub const VALUE_TYPE_KEY: &str = "NSStringFormatValueTypeKey";
pub const VALUE_TYPE: &str = "d";
pub const VARIABLE_WIDTH_RULE_TYPE: &str = "NSStringVariableWidthRuleType";

/// Writes plural and adaptive wordings into a `.stringsdict` through a [`PlistMerger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBuilder {
    merger: PlistMerger,
}

impl RuleBuilder {
    pub fn new(merger: PlistMerger) -> Self {
        Self { merger }
    }

    /// Appends one plural rule dictionary per entry. Returns the number of entries written.
    pub fn write_plural<P: AsRef<Path>>(
        &self,
        path: P,
        locale: &str,
        plurals: &CategoryMap<'_>,
    ) -> Result<usize, Error> {
        self.write(path, locale, WordingCategory::Plural, plurals, |dict, rules| {
            dict.entry(FORMAT_KEY, PIVOT_TOKEN).key(PIVOT_KEY).dict(|pivot| {
                pivot
                    .entry(SPEC_TYPE_KEY, PLURAL_RULE_TYPE)
                    .entry(VALUE_TYPE_KEY, VALUE_TYPE);
                append_rules(pivot, rules);
            });
        })
    }

    /// Appends one variable-width rule dictionary per entry. Returns the number of entries written.
    pub fn write_adaptive<P: AsRef<Path>>(
        &self,
        path: P,
        locale: &str,
        adaptives: &CategoryMap<'_>,
    ) -> Result<usize, Error> {
        self.write(path, locale, WordingCategory::Adaptive, adaptives, |dict, rules| {
            dict.key(VARIABLE_WIDTH_RULE_TYPE)
                .dict(|widths| append_rules(widths, rules));
        })
    }

    fn write<P, F>(
        &self,
        path: P,
        locale: &str,
        category: WordingCategory,
        entries: &CategoryMap<'_>,
        body: F,
    ) -> Result<usize, Error>
    where
        P: AsRef<Path>,
        F: Fn(&mut DictBuilder<'_>, &RuleMap),
    {
        if entries.is_empty() {
            return Ok(0);
        }

        self.merger.merge(path, |anchor| {
            for (&key, &entry) in entries {
                let rules = rules_of(key, entry, category)?;
                anchor.key(key).dict(|dict| body(dict, rules));
            }
            Ok(())
        })?;

        tracing::debug!(locale, %category, entries = entries.len(), "iOS {} [{}] ---> DONE!", category, locale);
        Ok(entries.len())
    }
}

fn rules_of<'a>(
    key: &str,
    entry: &'a WordingEntry,
    category: WordingCategory,
) -> Result<&'a RuleMap, Error> {
    match entry.rules(category) {
        Some(rules) if !rules.is_empty() => Ok(rules),
        Some(_) => Err(Error::validation_error(format!(
            "`{}` has an empty {} rule mapping",
            key, category
        ))),
        None => Err(Error::validation_error(format!(
            "`{}` has no {} rules",
            key, category
        ))),
    }
}

fn append_rules(dict: &mut DictBuilder<'_>, rules: &RuleMap) {
    for (name, value) in rules {
        dict.entry(name, value);
    }
}
