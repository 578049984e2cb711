//! Core types for lproj-export.
//! A [`TranslationTable`] is the read-only input of every export.

use std::{
    fmt::{Display, Formatter},
    io::{BufRead, Write},
    str::FromStr,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{error::Error, traits::Parser};

/// Rule category name (`one`, `other`, a width bucket, ...) to literal string.
///
/// Iteration follows insertion order, which is also the order rules are
/// written to the property list.
pub type RuleMap = IndexMap<String, String>;

/// Locale code to the wording of one key in that locale.
pub type LocaleMap = IndexMap<String, WordingEntry>;

/// The output categories a wording can be exported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WordingCategory {
    Singular,
    Plural,
    Adaptive,
    InfoPlist,
}

impl WordingCategory {
    /// Every category, in the order an export dispatches them.
    pub const ALL: [WordingCategory; 4] = [
        WordingCategory::Plural,
        WordingCategory::Adaptive,
        WordingCategory::Singular,
        WordingCategory::InfoPlist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WordingCategory::Singular => "singular",
            WordingCategory::Plural => "plural",
            WordingCategory::Adaptive => "adaptive",
            WordingCategory::InfoPlist => "info_plist",
        }
    }
}

impl Display for WordingCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordingCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "singular" => Ok(WordingCategory::Singular),
            "plural" => Ok(WordingCategory::Plural),
            "adaptive" => Ok(WordingCategory::Adaptive),
            "info_plist" | "infoplist" => Ok(WordingCategory::InfoPlist),
            other => Err(Error::validation_error(format!(
                "unknown wording category: {}",
                other
            ))),
        }
    }
}

/// The wording of one key in one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WordingEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<RuleMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptive: Option<RuleMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_plist: Option<String>,

    /// Optional comment for translators, appended to flat lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl WordingEntry {
    pub fn singular(value: impl Into<String>) -> Self {
        Self {
            singular: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn info_plist(value: impl Into<String>) -> Self {
        Self {
            info_plist: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn plural<K, V>(rules: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            plural: Some(collect_rules(rules)),
            ..Self::default()
        }
    }

    pub fn adaptive<K, V>(rules: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            adaptive: Some(collect_rules(rules)),
            ..Self::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether this wording carries a value for `category`.
    pub fn has(&self, category: WordingCategory) -> bool {
        match category {
            WordingCategory::Singular => self.singular.is_some(),
            WordingCategory::Plural => self.plural.is_some(),
            WordingCategory::Adaptive => self.adaptive.is_some(),
            WordingCategory::InfoPlist => self.info_plist.is_some(),
        }
    }

    /// The flat value for a line category.
    pub fn text(&self, category: WordingCategory) -> Option<&str> {
        match category {
            WordingCategory::Singular => self.singular.as_deref(),
            WordingCategory::InfoPlist => self.info_plist.as_deref(),
            WordingCategory::Plural | WordingCategory::Adaptive => None,
        }
    }

    /// The rule mapping for a rule category.
    pub fn rules(&self, category: WordingCategory) -> Option<&RuleMap> {
        match category {
            WordingCategory::Plural => self.plural.as_ref(),
            WordingCategory::Adaptive => self.adaptive.as_ref(),
            WordingCategory::Singular | WordingCategory::InfoPlist => None,
        }
    }
}

fn collect_rules<K, V>(rules: impl IntoIterator<Item = (K, V)>) -> RuleMap
where
    K: Into<String>,
    V: Into<String>,
{
    rules
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Translation key to its per-locale wordings.
///
/// Keys are unique and keep their insertion order, which is the order lines
/// and rule dictionaries are written in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TranslationTable {
    entries: IndexMap<String, LocaleMap>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wording of `key` in `locale`, replacing any previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        locale: impl Into<String>,
        entry: WordingEntry,
    ) -> &mut Self {
        self.entries
            .entry(key.into())
            .or_default()
            .insert(locale.into(), entry);
        self
    }

    /// The wording of `key` in `locale`, if any.
    pub fn wording(&self, key: &str, locale: &str) -> Option<&WordingEntry> {
        self.entries.get(key)?.get(locale)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocaleMap)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every locale mentioned in the table, in first-seen order.
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = Vec::new();
        for locale in self.entries.values().flat_map(|m| m.keys()) {
            if !locales.contains(&locale.as_str()) {
                locales.push(locale);
            }
        }
        locales
    }

    /// Checks that no plural or adaptive wording has an empty rule mapping.
    pub fn validate(&self) -> Result<(), Error> {
        for (key, locales) in &self.entries {
            for (locale, entry) in locales {
                check_rules(key, locale, entry)?;
            }
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), restricted to the wordings of `locale`.
    pub fn validate_for_locale(&self, locale: &str) -> Result<(), Error> {
        for (key, locales) in &self.entries {
            if let Some(entry) = locales.get(locale) {
                check_rules(key, locale, entry)?;
            }
        }
        Ok(())
    }
}

fn check_rules(key: &str, locale: &str, entry: &WordingEntry) -> Result<(), Error> {
    for category in [WordingCategory::Plural, WordingCategory::Adaptive] {
        if entry.rules(category).is_some_and(RuleMap::is_empty) {
            return Err(Error::validation_error(format!(
                "`{}` has an empty {} rule mapping for locale `{}`",
                key, category, locale
            )));
        }
    }
    Ok(())
}

impl FromIterator<(String, LocaleMap)> for TranslationTable {
    fn from_iter<T: IntoIterator<Item = (String, LocaleMap)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Parser for TranslationTable {
    /// Parse a JSON object of `key -> locale -> wording`.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        serde_json::from_reader(reader).map_err(Error::Parse)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, self).map_err(Error::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in WordingCategory::ALL {
            assert_eq!(category.as_str().parse::<WordingCategory>().unwrap(), category);
        }
        assert!("comment".parse::<WordingCategory>().is_err());
    }

    #[test]
    fn test_parse_table_keeps_rule_order() {
        let json = r#"{
            "cart_count": {
                "en": { "plural": { "other": "%d items", "one": "1 item" } }
            },
            "app_name": {
                "en": { "singular": "MyApp", "comment": "display name" },
                "fr": { "singular": "MonApp" }
            }
        }"#;
        let table = TranslationTable::from_reader(json.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        let rules = table.wording("cart_count", "en").unwrap().plural.as_ref().unwrap();
        let order: Vec<&str> = rules.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["other", "one"]);

        let app = table.wording("app_name", "en").unwrap();
        assert_eq!(app.singular.as_deref(), Some("MyApp"));
        assert_eq!(app.comment.as_deref(), Some("display name"));
        assert_eq!(table.locales(), vec!["en", "fr"]);
    }

    #[test]
    fn test_non_string_value_is_parse_error() {
        let json = r#"{ "k": { "en": { "singular": 3 } } }"#;
        let err = TranslationTable::from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_has_and_text() {
        let entry = WordingEntry::info_plist("Camera access").with_comment("usage");
        assert!(entry.has(WordingCategory::InfoPlist));
        assert!(!entry.has(WordingCategory::Singular));
        assert_eq!(entry.text(WordingCategory::InfoPlist), Some("Camera access"));
        assert_eq!(entry.text(WordingCategory::Plural), None);
    }

    #[test]
    fn test_validate_rejects_empty_rules() {
        let mut table = TranslationTable::new();
        table.insert("ok", "en", WordingEntry::plural([("one", "1"), ("other", "n")]));
        assert!(table.validate().is_ok());

        table.insert("broken", "de", WordingEntry::adaptive(Vec::<(String, String)>::new()));
        let err = table.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("broken"));
        assert!(err.to_string().contains("adaptive"));
    }

    #[test]
    fn test_validate_for_locale_ignores_other_locales() {
        let mut table = TranslationTable::new();
        table
            .insert("title", "en", WordingEntry::singular("Title"))
            .insert("count", "de", WordingEntry::plural(Vec::<(String, String)>::new()));

        assert!(table.validate_for_locale("en").is_ok());
        assert!(table.validate_for_locale("fr").is_ok());
        let err = table.validate_for_locale("de").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("`count`"));
    }

    #[test]
    fn test_table_json_round_trip() {
        let mut table = TranslationTable::new();
        table
            .insert("title", "en", WordingEntry::singular("Title"))
            .insert("width", "en", WordingEntry::adaptive([("20", "Short"), ("50", "Longer")]));

        let mut out = Vec::new();
        table.to_writer(&mut out).unwrap();
        let reparsed = TranslationTable::from_reader(out.as_slice()).unwrap();
        assert_eq!(reparsed, table);
    }
}
