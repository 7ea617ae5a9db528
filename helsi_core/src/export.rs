//! CSV export of the logged history.
//!
//! One row per logged set, suitable for spreadsheets. The export file is
//! rewritten on every run through a temp file in the same directory.

use crate::{Error, Result, Session};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    session: &'a str,
    date: String,
    exercise: &'a str,
    set: usize,
    reps: Option<i32>,
    weight: Option<f64>,
}

/// Flatten sessions into per-set rows; exercises with nothing logged are left out
fn rows(history: &[Session]) -> impl Iterator<Item = CsvRow<'_>> {
    history.iter().flat_map(|session| {
        let date = session
            .date
            .map(|d| d.to_rfc3339())
            .unwrap_or_default();
        session
            .exercises
            .iter()
            .filter(|e| !e.reps.is_empty() || !e.weights.is_empty())
            .flat_map(move |exercise| {
                let date = date.clone();
                let sets = exercise.reps.len().max(exercise.weights.len());
                (0..sets).map(move |i| CsvRow {
                    session: &session.name,
                    date: date.clone(),
                    exercise: &exercise.name,
                    set: i + 1,
                    reps: exercise.reps.get(i).copied(),
                    weight: exercise.weights.get(i).copied(),
                })
            })
    })
}

/// Write the history to `path` as CSV
///
/// Returns the number of rows written (headers excluded).
pub fn export_csv(history: &[Session], path: &Path) -> Result<usize> {
    // Ensure parent directory exists
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let temp = NamedTempFile::new_in(&dir)?;
    let mut count = 0;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(temp.as_file());
        for row in rows(history) {
            writer.serialize(row)?;
            count += 1;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} sets to {:?}", count, path);
    Ok(count)
}

/// Same rows, written to any writer (used for stdout)
pub fn write_csv<W: Write>(history: &[Session], out: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let mut count = 0;
    for row in rows(history) {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Exercise;
    use chrono::{TimeZone, Utc};

    fn history() -> Vec<Session> {
        let mut squat = Exercise::planned("Squat", 2, "");
        squat.reps = vec![5, 4];
        squat.weights = vec![100.0, 102.5];
        vec![Session {
            date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap()),
            exercises: vec![squat, Exercise::planned("Leg press", 3, "")],
            name: "Bein".into(),
        }]
    }

    #[test]
    fn test_export_one_row_per_set() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export").join("history.csv");

        let count = export_csv(&history(), &path).unwrap();
        assert_eq!(count, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "session,date,exercise,set,reps,weight");
        assert_eq!(lines[1], "Bein,2024-03-01T18:00:00+00:00,Squat,1,5,100.0");
        assert_eq!(lines[2], "Bein,2024-03-01T18:00:00+00:00,Squat,2,4,102.5");
        assert!(!content.contains("Leg press"));
    }

    #[test]
    fn test_export_replaces_previous_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.csv");

        export_csv(&history(), &path).unwrap();
        export_csv(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("Squat"));
    }

    #[test]
    fn test_write_csv_to_buffer() {
        let mut buffer = Vec::new();
        let count = write_csv(&history(), &mut buffer).unwrap();
        assert_eq!(count, 2);
        assert!(String::from_utf8(buffer).unwrap().contains("Squat,2,4,102.5"));
    }
}
