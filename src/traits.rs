//! The [`Parser`] trait shared by every document the crate loads and saves.

use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::Path,
};

use tempfile::NamedTempFile;

use crate::error::Error;

/// A document that can be loaded from and saved to disk.
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Replace the file at `path` with the serialized document.
    ///
    /// The document is rendered in memory and written to a sibling temporary
    /// file which is then renamed over `path`. A failure at any step leaves the
    /// previous content of `path` untouched.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let mut buffer = Vec::new();
        self.to_writer(&mut buffer)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&buffer)?;
        if let Ok(metadata) = fs::metadata(path) {
            staged.as_file().set_permissions(metadata.permissions())?;
        }
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, BufRead};

    /// Renders `Some(text)` verbatim; `None` fails while rendering.
    struct Fixed(Option<&'static str>);

    impl Parser for Fixed {
        fn from_reader<R: BufRead>(_reader: R) -> Result<Self, Error> {
            Ok(Fixed(None))
        }

        fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
            match self.0 {
                Some(text) => Ok(writer.write_all(text.as_bytes())?),
                None => Err(Error::Io(io::Error::other("render failed"))),
            }
        }
    }

    #[test]
    fn test_write_to_replaces_content() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("doc.txt");
        fs::write(&path, "old").unwrap();

        Fixed(Some("new")).write_to(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let leftovers = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_render_failure_keeps_previous_content() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("doc.txt");
        fs::write(&path, "old").unwrap();

        let err = Fixed(None).write_to(&path).unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_directory_keeps_previous_content() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("en.lproj");
        fs::create_dir(&dir).unwrap();
        let path = dir.join("doc.txt");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory modes; nothing to check then.
        if File::create(dir.join("access-check")).is_ok() {
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = Fixed(Some("new")).write_to(&path);
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(Error::Io(_))), "{result:?}");
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }
}
