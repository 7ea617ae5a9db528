//! Logged session history persistence.
//!
//! The history is a single JSON array (`log.json`) that is always read and
//! replaced wholesale. Replacement is atomic (temp file + rename) and the
//! load-modify-save sequence of [`SessionStore::append`] runs under an
//! exclusive lock on a sidecar lock file so concurrent writers never lose
//! updates.

use crate::{Error, Result, Session};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Store of logged sessions
pub trait SessionStore {
    /// All logged sessions, in the order they were appended
    fn load(&self) -> Result<Vec<Session>>;

    /// Durably replace the whole history
    fn save(&self, sessions: &[Session]) -> Result<()>;

    /// Append one session (load, push, save)
    fn append(&self, session: Session) -> Result<usize> {
        let mut sessions = self.load()?;
        sessions.push(session);
        self.save(&sessions)?;
        Ok(sessions.len())
    }

    /// History for read-only views; an unreadable store degrades to empty
    fn load_or_empty(&self) -> Vec<Session> {
        match self.load() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("{}. Continuing with an empty history.", e);
                Vec::new()
            }
        }
    }
}

/// JSON-file-backed history with file locking
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a new store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "log.json".into());
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Hold an exclusive lock for the duration of a load-modify-save
    fn lock_writers(&self) -> Result<File> {
        self.ensure_parent_dir()?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn read_unlocked(&self) -> Result<Vec<Session>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No history at {:?} yet, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Error::StoreUnavailable(format!(
                    "cannot open {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        // Acquire shared lock for reading
        file.lock_shared()?;
        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read.map_err(|e| {
            Error::StoreUnavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let sessions: Option<Vec<Session>> = serde_json::from_str(&contents).map_err(|e| {
            Error::StoreUnavailable(format!("cannot parse {}: {}", self.path.display(), e))
        })?;
        let sessions = sessions.unwrap_or_default();

        tracing::debug!("Read {} sessions from {:?}", sessions.len(), self.path);
        Ok(sessions)
    }

    fn write_unlocked(&self, sessions: &[Session]) -> Result<()> {
        self.ensure_parent_dir()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, sessions)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        // Atomically replace the old history
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} sessions to {:?}", sessions.len(), self.path);
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Session>> {
        self.read_unlocked()
    }

    fn save(&self, sessions: &[Session]) -> Result<()> {
        let lock = self.lock_writers().map_err(persistence)?;
        let result = self.write_unlocked(sessions).map_err(persistence);
        let _ = lock.unlock();
        result
    }

    fn append(&self, session: Session) -> Result<usize> {
        let lock = self.lock_writers().map_err(persistence)?;
        let result = self.read_unlocked().and_then(|mut sessions| {
            sessions.push(session);
            self.write_unlocked(&sessions).map_err(persistence)?;
            Ok(sessions.len())
        });
        // Lock is released when the file is dropped as well
        let _ = lock.unlock();

        if let Ok(count) = result {
            tracing::info!("History now holds {} sessions", count);
        }
        result
    }
}

fn persistence(e: Error) -> Error {
    match e {
        Error::PersistenceFailure(_) => e,
        other => Error::PersistenceFailure(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Exercise;
    use chrono::Utc;

    fn logged_session(name: &str) -> Session {
        let mut bench = Exercise::planned("Bench", 1, "");
        bench.reps = vec![5];
        bench.weights = vec![60.0];
        Session {
            date: Some(Utc::now()),
            exercises: vec![bench],
            name: name.into(),
        }
    }

    #[test]
    fn test_missing_history_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("log.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("data").join("log.json"));

        assert_eq!(store.append(logged_session("A")).unwrap(), 1);
        assert_eq!(store.append(logged_session("B")).unwrap(), 2);

        let sessions = store.load().unwrap();
        let names: Vec<_> = sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(sessions[0].exercises[0].weights, vec![60.0]);
    }

    #[test]
    fn test_null_history_reads_as_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("log.json");
        std::fs::write(&path, "null").unwrap();

        assert!(JsonFileStore::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_history_is_unavailable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("log.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(Error::StoreUnavailable(_))));
        assert!(store.load_or_empty().is_empty());

        // Appending must not clobber a history it cannot read
        assert!(store.append(logged_session("A")).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ invalid json }");
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("log.json"));
        store.save(&[logged_session("A")]).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "log.json" && e.file_name() != "log.json.lock")
            .collect();
        assert!(extras.is_empty(), "Unexpected files: {:?}", extras);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("log.json");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    JsonFileStore::new(path)
                        .append(logged_session(&format!("S{}", i)))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(JsonFileStore::new(&path).load().unwrap().len(), 8);
    }
}
