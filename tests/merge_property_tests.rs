use lproj_export::formats::plist::Element;
use lproj_export::{Exporter, Parser, PlistDocument, TranslationTable, WordingEntry};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("valid key regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9%@#<>&'\"][A-Za-z0-9 %@#<>&'\"\\.,!\\?]{0,29}").expect("valid value regex")
}

fn rules_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    let categories = prop::sample::subsequence(vec!["zero", "one", "two", "few", "many", "other"], 1..=6);
    (categories, prop::collection::vec(value_strategy(), 6)).prop_map(|(categories, values)| {
        categories
            .into_iter()
            .zip(values)
            .map(|(category, value)| (category.to_string(), value))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn successive_merges_add_one_key_group_each(
        keys in prop::collection::btree_set(key_strategy(), 1..8),
        rules in rules_strategy(),
    ) {
        let temp = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(temp.path());
        let path = temp.path().join("en.lproj").join("Localizable.stringsdict");

        for key in &keys {
            let mut table = TranslationTable::new();
            table.insert(key.clone(), "en", WordingEntry::plural(rules.clone()));
            exporter.export(&table, "en").unwrap();
        }

        let document = PlistDocument::read_from(&path).unwrap();
        prop_assert_eq!(document.root_dict_count(), 1);
        let written: BTreeSet<String> =
            document.anchor().keys().into_iter().map(str::to_string).collect();
        prop_assert_eq!(document.anchor().keys().len(), keys.len());
        prop_assert_eq!(written, keys);
    }

    #[test]
    fn rule_values_survive_the_round_trip(
        key in key_strategy(),
        rules in rules_strategy(),
    ) {
        let temp = tempfile::tempdir().unwrap();
        let mut table = TranslationTable::new();
        table.insert(key.clone(), "en", WordingEntry::plural(rules.clone()));
        Exporter::new(temp.path()).export(&table, "en").unwrap();

        let path = temp.path().join("en.lproj").join("Localizable.stringsdict");
        let document = PlistDocument::read_from(&path).unwrap();
        let pivot = document
            .anchor()
            .value_for(&key)
            .and_then(|dict| dict.value_for("key"))
            .unwrap();

        let written: Vec<&str> = pivot.keys().into_iter().skip(2).collect();
        let expected: Vec<&str> = rules.iter().map(|(category, _)| category.as_str()).collect();
        prop_assert_eq!(written, expected);
        for (category, value) in &rules {
            prop_assert_eq!(
                pivot.value_for(category).and_then(Element::text),
                Some(value.as_str())
            );
        }
    }
}
