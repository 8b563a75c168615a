//! Flat-file record of events already reported.
//!
//! Each reported event adds two lines: the run's start timestamp, then the
//! event name. The file is only ever appended to.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::Error;

/// Format of the timestamp line written before each event name.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only store of reported event names.
#[derive(Debug)]
pub struct EventStore {
    path: PathBuf,
    file: File,
    reported: HashSet<String>,
}

impl EventStore {
    /// Open (or create) the store and load every name recorded so far.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let map_err = |source| Error::DataStore {
            path: path.to_path_buf(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .map_err(map_err)?;

        let mut content = String::new();
        file.read_to_string(&mut content).map_err(map_err)?;

        let reported = parse_names(&content);
        debug!(path = %path.display(), names = reported.len(), "Loaded data store");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            reported,
        })
    }

    /// A store whose appends always fail.
    #[cfg(test)]
    pub fn read_only(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: File::open(path)?,
            reported: parse_names(&content),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `name` was reported in this or an earlier run.
    pub fn contains(&self, name: &str) -> bool {
        self.reported.contains(name)
    }

    /// Number of distinct names known to the store.
    pub fn known(&self) -> usize {
        self.reported.len()
    }

    /// Append `timestamp` and `name` to the file right away.
    pub fn record(&mut self, timestamp: &str, name: &str) -> Result<(), Error> {
        let entry = format!("{timestamp}\n{name}\n");
        self.file.write_all(entry.as_bytes())?;
        self.file.flush()?;
        self.reported.insert(name.to_string());
        Ok(())
    }
}

/// Every non-blank line that is not a timestamp is a reported name.
fn parse_names(content: &str) -> HashSet<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !is_timestamp(line))
        .map(String::from)
        .collect()
}

fn is_timestamp(line: &str) -> bool {
    NaiveDateTime::parse_from_str(line, TIMESTAMP_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("previous-events.txt");

        let store = EventStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.known(), 0);
    }

    #[test]
    fn test_record_appends_two_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("previous-events.txt");

        let mut store = EventStore::open(&path).unwrap();
        store.record("2024-03-01 18:00:00", "Sourdough Workshop").unwrap();

        assert!(store.contains("Sourdough Workshop"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "2024-03-01 18:00:00\nSourdough Workshop\n");
    }

    #[test]
    fn test_reopen_sees_recorded_names_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("previous-events.txt");

        {
            let mut store = EventStore::open(&path).unwrap();
            store.record("2024-03-01 18:00:00", "Pasta Night").unwrap();
            store.record("2024-03-01 18:00:00", "Wine Pairing").unwrap();
        }

        let store = EventStore::open(&path).unwrap();
        assert_eq!(store.known(), 2);
        assert!(store.contains("Pasta Night"));
        assert!(store.contains("Wine Pairing"));
        assert!(!store.contains("2024-03-01 18:00:00"));
    }

    #[test]
    fn test_appends_after_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("previous-events.txt");
        std::fs::write(&path, "2024-01-01 09:00:00\nOld Event\n").unwrap();

        let mut store = EventStore::open(&path).unwrap();
        store.record("2024-02-01 09:00:00", "New Event").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "2024-01-01 09:00:00\nOld Event\n2024-02-01 09:00:00\nNew Event\n"
        );
    }

    #[test]
    fn test_parse_names_tolerates_odd_files() {
        let content = "Hand Added\n\n2024-01-01 09:00:00\nPaired\nDuplicate\nDuplicate\n";
        let names = parse_names(content);
        assert_eq!(names.len(), 3);
        assert!(names.contains("Hand Added"));
        assert!(names.contains("Paired"));
        assert!(names.contains("Duplicate"));
    }

    #[test]
    fn test_read_only_store_rejects_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("previous-events.txt");
        std::fs::write(&path, "2024-01-01 09:00:00\nOld Event\n").unwrap();

        let mut store = EventStore::read_only(&path).unwrap();
        assert!(store.contains("Old Event"));
        assert!(store.record("2024-02-01 09:00:00", "New Event").is_err());
        assert!(!store.contains("New Event"));
    }

    #[test]
    fn test_open_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("events.txt");

        let err = EventStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("missing-dir"));
    }
}
