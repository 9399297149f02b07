//! Result writing.
//!
//! Consumes the fetched job result and either prints it to stdout
//! (tabular) or saves it as a CSV file. Returns an outcome value instead
//! of exiting; the single terminal exit belongs to `main`.

use crate::config::OutputFormat;
use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name used for CSV output in the target directory.
pub const CSV_FILE_NAME: &str = "Query_Result.csv";

/// What the writer did with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The result was printed to stdout.
    Printed,
    /// The result was saved to this path.
    SavedTo(PathBuf),
    /// The query returned no rows; nothing was written.
    Empty,
}

/// Writes the result bytes according to the output format.
///
/// An empty result prints a notice and produces no file; this is still a
/// successful run.
pub fn write_result(format: OutputFormat, bytes: &[u8], out_dir: &Path) -> Result<WriteOutcome> {
    if bytes.is_empty() {
        println!("Sorry, the query did not return any results");
        return Ok(WriteOutcome::Empty);
    }

    match format {
        OutputFormat::Tabular => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            if !bytes.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
            Ok(WriteOutcome::Printed)
        }
        OutputFormat::Csv => {
            let path = out_dir.join(CSV_FILE_NAME);
            std::fs::write(&path, bytes)?;
            // Canonicalize after the write so the printed path is absolute
            let resolved = path.canonicalize().unwrap_or(path);
            println!("Saved the query result to {}", resolved.display());
            Ok(WriteOutcome::SavedTo(resolved))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_result_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let outcome = write_result(OutputFormat::Csv, b"", dir.path()).unwrap();
        assert_eq!(outcome, WriteOutcome::Empty);
        assert!(!dir.path().join(CSV_FILE_NAME).exists());
    }

    #[test]
    fn test_csv_result_saved_with_exact_bytes() {
        let dir = TempDir::new().unwrap();
        let data = b"id,name\n1,alice\n2,bob\n";
        let outcome = write_result(OutputFormat::Csv, data, dir.path()).unwrap();

        let WriteOutcome::SavedTo(path) = outcome else {
            panic!("expected SavedTo, got {outcome:?}");
        };
        assert!(path.is_absolute());
        assert!(path.ends_with(CSV_FILE_NAME));
        assert_eq!(std::fs::read(&path).unwrap(), data);
    }

    #[test]
    fn test_tabular_result_printed() {
        let dir = TempDir::new().unwrap();
        let outcome = write_result(OutputFormat::Tabular, b"1\talice\n", dir.path()).unwrap();
        assert_eq!(outcome, WriteOutcome::Printed);
        // Tabular output never creates a file
        assert!(!dir.path().join(CSV_FILE_NAME).exists());
    }

    #[test]
    fn test_csv_write_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = write_result(OutputFormat::Csv, b"data", &missing).unwrap_err();
        assert_eq!(err.category(), "I/O Error");
    }
}
