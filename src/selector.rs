//! Splits a translation table into per-category views for one locale.

use indexmap::IndexMap;

use crate::types::{TranslationTable, WordingCategory, WordingEntry};

/// The entries of one category for one locale, in table order.
pub type CategoryMap<'a> = IndexMap<&'a str, &'a WordingEntry>;

/// The four category views of a table for a single locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection<'a> {
    pub singular: CategoryMap<'a>,
    pub plural: CategoryMap<'a>,
    pub adaptive: CategoryMap<'a>,
    pub info_plist: CategoryMap<'a>,
}

impl<'a> CategorySelection<'a> {
    pub fn get(&self, category: WordingCategory) -> &CategoryMap<'a> {
        match category {
            WordingCategory::Singular => &self.singular,
            WordingCategory::Plural => &self.plural,
            WordingCategory::Adaptive => &self.adaptive,
            WordingCategory::InfoPlist => &self.info_plist,
        }
    }

    fn get_mut(&mut self, category: WordingCategory) -> &mut CategoryMap<'a> {
        match category {
            WordingCategory::Singular => &mut self.singular,
            WordingCategory::Plural => &mut self.plural,
            WordingCategory::Adaptive => &mut self.adaptive,
            WordingCategory::InfoPlist => &mut self.info_plist,
        }
    }

    /// Category views in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = (WordingCategory, &CategoryMap<'a>)> {
        WordingCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }
}

/// Classifies `table` for `locale`.
///
/// A key lands in every category its wording for `locale` has a value for.
/// Empty categories are logged at info level and are not an error.
pub fn select<'a>(table: &'a TranslationTable, locale: &str) -> CategorySelection<'a> {
    let mut selection = CategorySelection::default();

    for (key, locales) in table.iter() {
        let Some(entry) = locales.get(locale) else {
            continue;
        };
        for category in WordingCategory::ALL {
            if entry.has(category) {
                selection.get_mut(category).insert(key, entry);
            }
        }
    }

    for category in WordingCategory::ALL {
        if selection.get(category).is_empty() {
            tracing::info!(
                locale,
                %category,
                "[{}] no {} keys were found to generate the file",
                locale.to_uppercase(),
                category
            );
        }
    }

    selection
}
