use std::{
    fmt::{Display, Formatter},
    fs::OpenOptions,
    io::Write,
    path::Path,
};

use crate::{error::Error, selector::CategoryMap, types::WordingCategory};

/// One `.strings` line.
///
/// Info-plist keys are written bare (`key = "value";`), every other key is
/// quoted (`"key" = "value";`). Values are written as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub comment: Option<&'a str>,
    pub category: WordingCategory,
}

impl Display for Line<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.category {
            WordingCategory::InfoPlist => write!(f, "{} = \"{}\";", self.key, self.value)?,
            _ => write!(f, "\"{}\" = \"{}\";", self.key, self.value)?,
        }
        if let Some(comment) = self.comment {
            write!(f, " // {}", comment)?;
        }
        Ok(())
    }
}

/// Appends flat key/value lines to a `.strings` file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineWriter;

impl LineWriter {
    /// Renders one line per entry of `entries`, in order.
    pub fn render(
        entries: &CategoryMap<'_>,
        category: WordingCategory,
    ) -> Result<String, Error> {
        if !matches!(category, WordingCategory::Singular | WordingCategory::InfoPlist) {
            return Err(Error::UnsupportedCategory(category));
        }

        let mut content = String::new();
        for (&key, &entry) in entries {
            let line = Line {
                key,
                value: entry.text(category).unwrap_or_default(),
                comment: entry.comment.as_deref(),
                category,
            };
            content.push_str(&line.to_string());
            content.push('\n');
        }
        Ok(content)
    }

    /// Appends `entries` to the file at `path`, creating it if needed.
    ///
    /// The lines are written with a single write call. Nothing is deduplicated:
    /// appending the same key twice yields two lines. Returns the number of
    /// lines written.
    pub fn append<P: AsRef<Path>>(
        path: P,
        locale: &str,
        category: WordingCategory,
        entries: &CategoryMap<'_>,
    ) -> Result<usize, Error> {
        let content = Self::render(entries, category)?;
        if entries.is_empty() {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        tracing::debug!(locale, %category, lines = entries.len(), "iOS {} [{}] ---> DONE!", category, locale);
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WordingEntry;
    use indexmap::IndexMap;

    #[test]
    fn test_singular_line_with_comment() {
        let line = Line {
            key: "app_name",
            value: "MyApp",
            comment: Some("display name"),
            category: WordingCategory::Singular,
        };
        assert_eq!(line.to_string(), r#""app_name" = "MyApp"; // display name"#);
    }

    #[test]
    fn test_info_plist_line_is_unquoted() {
        let line = Line {
            key: "NSCameraUsageDescription",
            value: "Scan receipts",
            comment: None,
            category: WordingCategory::InfoPlist,
        };
        assert_eq!(
            line.to_string(),
            r#"NSCameraUsageDescription = "Scan receipts";"#
        );
    }

    #[test]
    fn test_render_rejects_rule_categories() {
        let entries = IndexMap::new();
        let err = LineWriter::render(&entries, WordingCategory::Adaptive).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCategory(WordingCategory::Adaptive)));
    }

    #[test]
    fn test_append_creates_then_appends() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("Localizable.strings");

        let hello = WordingEntry::singular("Hello");
        let bye = WordingEntry::singular("Bye").with_comment("farewell");
        let mut entries: CategoryMap<'_> = IndexMap::new();
        entries.insert("hello", &hello);
        entries.insert("bye", &bye);

        let written = LineWriter::append(&path, "en", WordingCategory::Singular, &entries).unwrap();
        assert_eq!(written, 2);
        LineWriter::append(&path, "en", WordingCategory::Singular, &entries).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "\"hello\" = \"Hello\";\n\"bye\" = \"Bye\"; // farewell\n\
             \"hello\" = \"Hello\";\n\"bye\" = \"Bye\"; // farewell\n"
        );
    }

    #[test]
    fn test_append_nothing_leaves_no_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("InfoPlist.strings");
        let entries = IndexMap::new();
        let written = LineWriter::append(&path, "en", WordingCategory::InfoPlist, &entries).unwrap();
        assert_eq!(written, 0);
        assert!(!path.exists());
    }
}
