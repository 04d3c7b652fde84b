//! Storage layer for Taskbook data.
//!
//! The whole task list lives in a single JSON file holding an array of task
//! objects. The file is read once at startup and rewritten in full on every
//! save.

use crate::models::Task;
use crate::Result;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Default name of the task file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "tasks.json";

/// The JSON file that persists a task list.
#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all tasks from the file.
    ///
    /// A missing file is not an error and yields an empty list. A file holding
    /// JSON `null` also reads as empty.
    pub fn load(&self) -> Result<Vec<Task>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "task file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let tasks: Option<Vec<Task>> = serde_json::from_reader(BufReader::new(file))?;
        let tasks = tasks.unwrap_or_default();
        info!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Overwrite the file with the given tasks.
    ///
    /// The new contents are written to a temporary file in the same directory
    /// and renamed over the old file, so a failed write never leaves a
    /// truncated task file behind.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, tasks)?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        info!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::models::{NewTask, UNSET_DUE_DATE, split_tags};
    use crate::store::{IdPolicy, TaskStore};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file() -> (TempDir, TaskFile) {
        let temp_dir = TempDir::new().unwrap();
        let file = TaskFile::new(temp_dir.path().join("tasks.json"));
        (temp_dir, file)
    }

    fn sample_store() -> TaskStore {
        let mut store = TaskStore::new(IdPolicy::Length);
        store.add(
            NewTask::new("Write report")
                .with_priority("high")
                .with_due_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
                .with_category("work")
                .with_description("Quarterly numbers")
                .with_tags(split_tags("q2, finance")),
        );
        store.add(NewTask::new(""));
        store.add(NewTask::new("Water plants").with_tags(split_tags("")));
        store
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_temp, file) = create_test_file();
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (_temp, file) = create_test_file();
        let store = sample_store();

        file.save(store.list_all()).unwrap();
        let loaded = file.load().unwrap();

        assert_eq!(loaded, store.list_all());
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let (_temp, file) = create_test_file();
        file.save(sample_store().list_all()).unwrap();
        file.save(&[]).unwrap();

        assert!(file.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "[]\n");
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let (_temp, file) = create_test_file();
        fs::write(file.path(), "{not json").unwrap();

        assert!(matches!(file.load(), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_null_is_empty() {
        let (_temp, file) = create_test_file();
        fs::write(file.path(), "null\n").unwrap();

        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_fills_missing_fields() {
        let (_temp, file) = create_test_file();
        fs::write(file.path(), r#"[{"ID":1,"Title":"x"},{"Title":"no id"}]"#).unwrap();

        let tasks = file.load().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, 1);
        assert_eq!(tasks[0].title, "x");
        assert_eq!(tasks[0].due_date, UNSET_DUE_DATE);
        assert!(!tasks[0].complete);
        assert!(tasks[0].tags.is_empty());
        assert_eq!(tasks[1].id, 0);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let file = TaskFile::new(temp.path().join("nope").join("tasks.json"));

        assert!(matches!(file.save(&[]), Err(Error::Io(_))));
    }

    #[test]
    fn test_load_directory_errors() {
        let temp = TempDir::new().unwrap();
        let file = TaskFile::new(temp.path());

        assert!(file.load().is_err());
    }
}
