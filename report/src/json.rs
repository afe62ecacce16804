//! JSON result files

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use streambench_core::BenchmarkResult;
use tracing::info;

use crate::error::ReportError;

/// Write `results` as a pretty JSON array
///
/// Parent directories are created as needed and an existing file is
/// replaced.
pub fn write_results(path: &Path, results: &[BenchmarkResult]) -> Result<(), ReportError> {
    write_json(path, results)?;
    info!(path = %path.display(), results = results.len(), "Wrote results");
    Ok(())
}

/// Write any report value as pretty JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a file written by [`write_results`]
pub fn read_results(path: &Path) -> Result<Vec<BenchmarkResult>, ReportError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{failed_result, sample_result};

    #[test]
    fn test_write_results_as_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");
        let results = vec![sample_result(3, 0.2), failed_result()];

        write_results(&path, &results).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let array = raw.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[1]["latency"]["p50"], serde_json::Value::Null);
        assert_eq!(array[1]["error_statistics"]["count"]["timeout"], 2);

        let back = read_results(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].successful_requests, 3);
        assert_eq!(back[1].error_statistics, results[1].error_statistics);
    }

    #[test]
    fn test_write_results_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_results(&path, &[sample_result(5, 0.1)]).unwrap();
        write_results(&path, &[]).unwrap();
        assert!(read_results(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_results(&dir.path().join("nope.json")),
            Err(ReportError::Io(_))
        ));
    }
}
