//! Filesystem-backed storage for rendered reports.
//!
//! All files live directly inside one directory. Names handed to [`ReportStore::load`] must be a
//! single plain path component, so a request can never reach outside that directory.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error::{ReportError, Result};
use crate::model::{download_url, StoredReport};

const REPORT_EXTENSION: &str = "pdf";

#[derive(Clone, Debug)]
pub struct ReportStore {
    directory: PathBuf,
}

impl ReportStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `bytes` under `filename`, creating the directory first if needed.
    ///
    /// An existing file with the same name is overwritten.
    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(filename).ok_or_else(|| {
            ReportError::storage(
                self.directory.join(filename),
                io::Error::new(io::ErrorKind::InvalidInput, "invalid report filename"),
            )
        })?;

        fs::create_dir_all(&self.directory)
            .map_err(|source| ReportError::storage(&self.directory, source))?;
        fs::write(&path, bytes).map_err(|source| ReportError::storage(&path, source))?;

        info!("Saved report {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Lists stored `.pdf` files sorted by name. A missing directory yields an empty list.
    pub fn list(&self) -> Result<Vec<StoredReport>> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "Report directory {} does not exist yet",
                    self.directory.display()
                );
                return Ok(Vec::new());
            }
            Err(source) => return Err(ReportError::storage(&self.directory, source)),
        };

        let mut reports = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ReportError::storage(&self.directory, source))?;
            let path = entry.path();
            if !has_report_extension(&path) {
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|source| ReportError::storage(&path, source))?;
            if !metadata.is_file() {
                continue;
            }

            let Some(filename) = path.file_name().and_then(OsStr::to_str) else {
                continue;
            };

            reports.push(StoredReport {
                filename: filename.to_owned(),
                size: metadata.len(),
                created_at: metadata
                    .created()
                    .or_else(|_| metadata.modified())
                    .ok()
                    .map(DateTime::<Utc>::from),
                download_url: download_url(filename),
            });
        }

        reports.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(reports)
    }

    /// Reads back the bytes stored under `filename`.
    pub fn load(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self
            .resolve(filename)
            .ok_or_else(|| ReportError::NotFound(filename.to_owned()))?;

        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(ReportError::NotFound(filename.to_owned()))
            }
            Err(source) => Err(ReportError::storage(path, source)),
        }
    }

    /// Maps `filename` to a path inside the store, or `None` if it is not a plain file name.
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if !is_plain_filename(filename) {
            return None;
        }
        Some(self.directory.join(filename))
    }
}

fn has_report_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case(REPORT_EXTENSION))
}

fn is_plain_filename(filename: &str) -> bool {
    if filename.is_empty() || filename.contains(['/', '\\', '\0']) {
        return false;
    }

    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names_only() {
        assert!(is_plain_filename("sales_report_20240101_000000.pdf"));
        assert!(is_plain_filename("q1..q2.pdf"));
        assert!(!is_plain_filename(""));
        assert!(!is_plain_filename("."));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename("../secret.pdf"));
        assert!(!is_plain_filename("nested/report.pdf"));
        assert!(!is_plain_filename("/etc/passwd"));
        assert!(!is_plain_filename("..\\windows.pdf"));
        assert!(!is_plain_filename("report\0.pdf"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path().join("reports"));

        store.save("a.pdf", b"%PDF-1.3 first").unwrap();
        assert_eq!(store.load("a.pdf").unwrap(), b"%PDF-1.3 first");
    }

    #[test]
    fn list_filters_by_extension_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path());

        store.save("b.pdf", b"b").unwrap();
        store.save("a.PDF", b"aa").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        let reports = store.list().unwrap();
        let names: Vec<_> = reports.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
        assert_eq!(reports[0].size, 2);
        assert_eq!(reports[1].download_url, "/api/v1/reports/download/b.pdf");
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn load_rejects_missing_and_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join("reports");
        fs::create_dir(&reports).unwrap();
        fs::write(dir.path().join("secret.pdf"), b"secret").unwrap();
        let store = ReportStore::new(&reports);

        for name in ["missing.pdf", "../secret.pdf", "..", "", "./secret.pdf"] {
            match store.load(name) {
                Err(ReportError::NotFound(requested)) => assert_eq!(requested, name),
                other => panic!("expected not found for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn dotted_names_that_list_can_be_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path());
        store.save("q1..q2.pdf", b"quarters").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed[0].filename, "q1..q2.pdf");
        assert_eq!(store.load(&listed[0].filename).unwrap(), b"quarters");
    }

    #[test]
    fn save_rejects_nested_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path());
        assert!(matches!(
            store.save("../escape.pdf", b"x"),
            Err(ReportError::Storage { .. })
        ));
        assert!(!dir.path().join("../escape.pdf").exists());
    }
}
