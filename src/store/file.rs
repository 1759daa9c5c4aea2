use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Collection, StorageBackend, StoreError};

/// One flat file per collection inside `dir`.
pub struct FileBackend {
    dir: PathBuf,
    files: HashMap<Collection, String>,
}

impl FileBackend {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let files = [
            (Collection::Users, "users.json"),
            (Collection::Attendance, "attendance.json"),
            (Collection::Report, "main_report.csv"),
        ]
        .into_iter()
        .map(|(c, f)| (c, f.to_string()))
        .collect();

        Self {
            dir: dir.as_ref().to_path_buf(),
            files,
        }
    }

    pub fn with_file(mut self, collection: Collection, file_name: &str) -> Self {
        self.files.insert(collection, file_name.to_string());
        self
    }

    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    pub fn path_of(&self, collection: Collection) -> PathBuf {
        let name = self
            .files
            .get(&collection)
            .cloned()
            .unwrap_or_else(|| format!("{collection}.json"));
        self.dir.join(name)
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, collection: Collection) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_of(collection)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, collection: Collection, contents: &str) -> Result<(), StoreError> {
        self.ensure_dir()?;
        fs::write(self.path_of(collection), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        assert!(backend.read(Collection::Users).unwrap().is_none());
    }

    #[test]
    fn custom_file_names_are_used() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).with_file(Collection::Users, "empDB.json");

        backend.write(Collection::Users, "[]").unwrap();

        assert!(dir.path().join("empDB.json").exists());
        assert_eq!(backend.read(Collection::Users).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn report_is_written_as_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend
            .write(Collection::Report, "name,date,time,type\n")
            .unwrap();

        let on_disk = fs::read_to_string(dir.path().join("main_report.csv")).unwrap();
        assert_eq!(on_disk, "name,date,time,type\n");
    }
}
