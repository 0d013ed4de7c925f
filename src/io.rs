// src/io.rs
//! CSV readers and writers for recordings, PSD matrices and feature tables

use crate::error::{IntoPsdError, PsdError, PsdErrorBuilder, PsdResult, SkipReason};
use crate::processing::pipeline::{PsdMatrix, Recording};
use crate::table::{format_number, parse_number, FeatureTable};
use std::path::{Path, PathBuf};

/// Display name of an input: its file name
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// File name without extension
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| display_name(path))
}

/// Read a headerless recording CSV, one row per channel
pub fn read_recording(path: &Path) -> PsdResult<Recording> {
    let name = display_name(path);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .psd_err("open recording", path)?;

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.psd_err("read recording", path)?;
        let samples = record
            .iter()
            .enumerate()
            .map(|(column, cell)| {
                parse_number(cell).ok_or_else(|| {
                    PsdError::skipped(
                        name.clone(),
                        SkipReason::InvalidSample {
                            row,
                            column,
                            value: cell.to_string(),
                        },
                    )
                })
            })
            .collect::<PsdResult<Vec<f64>>>()?;
        rows.push(samples);
    }

    Recording::from_rows(name, rows)
}

/// Write a PSD matrix without header: rows are channels, columns frames
pub fn write_psd_matrix(path: &Path, matrix: &PsdMatrix) -> PsdResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .psd_err("create", path)?;
    for channel in matrix.values().rows() {
        writer
            .write_record(channel.iter().map(|&v| format_number(v)))
            .psd_err("write", path)?;
    }
    writer.flush().psd_err("flush", path)?;
    Ok(())
}

/// Write a feature table with its header row
pub fn write_feature_table(path: &Path, table: &FeatureTable) -> PsdResult<()> {
    let mut writer = csv::Writer::from_path(path).psd_err("create", path)?;
    writer.write_record(table.column_names()).psd_err("write", path)?;
    for row in 0..table.num_rows() {
        writer.write_record(table.row(row)).psd_err("write", path)?;
    }
    writer.flush().psd_err("flush", path)?;
    Ok(())
}

/// Header and raw string cells of a CSV with a header row
pub fn read_raw_table(path: &Path) -> PsdResult<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .psd_err("open table", path)?;

    let header: Vec<String> = reader
        .headers()
        .psd_err("read header", path)?
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<String>>())
                .psd_err("read table", path)
        })
        .collect::<PsdResult<Vec<Vec<String>>>>()?;

    Ok((header, rows))
}

/// Read a feature table; column types are inferred from the cells
pub fn read_feature_table(path: &Path) -> PsdResult<FeatureTable> {
    let (header, rows) = read_raw_table(path)?;
    FeatureTable::from_records(header, rows).map_err(|reason| PsdError::skipped(display_name(path), reason))
}

/// Create `dir` and its parents
pub fn ensure_dir(dir: &Path) -> PsdResult<()> {
    std::fs::create_dir_all(dir).psd_err("create directory", dir)
}

/// Files under `dir` matching `pattern`, sorted
///
/// A missing or unreadable directory is a configuration error.
pub fn discover_inputs(dir: &Path, pattern: &str) -> PsdResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PsdErrorBuilder::new("input_discovery")
            .configuration(format!("input directory {} does not exist", dir.display())));
    }
    std::fs::read_dir(dir).map_err(|e| {
        PsdErrorBuilder::new("input_discovery")
            .configuration(format!("cannot read {}: {}", dir.display(), e))
    })?;

    let full_pattern = dir.join(pattern);
    let entries = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| {
        PsdErrorBuilder::new("input_discovery").invalid_value("pattern", pattern, &e.to_string())
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "unreadable path during input discovery"),
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnData};
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_read_recording() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("P1_h.csv");
        std::fs::write(&path, "1.0, 2.0,3\n-4,5e-1,6\n").unwrap();

        let recording = read_recording(&path).unwrap();
        assert_eq!(recording.name(), "P1_h.csv");
        assert_eq!(recording.num_channels(), 2);
        assert_eq!(recording.num_samples(), 3);
        assert_eq!(recording.channel(1).to_vec(), vec![-4.0, 0.5, 6.0]);
    }

    #[test]
    fn test_read_recording_invalid_cell() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "1,2\n3,abc\n").unwrap();

        match read_recording(&path).unwrap_err() {
            PsdError::RecordingSkipped { reason, .. } => assert_eq!(
                reason,
                SkipReason::InvalidSample { row: 1, column: 1, value: "abc".to_string() }
            ),
            other => panic!("Expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_read_recording_ragged_and_empty() {
        let dir = tempdir().unwrap();
        let ragged = dir.path().join("ragged.csv");
        std::fs::write(&ragged, "1,2,3\n4,5\n").unwrap();
        assert!(matches!(
            read_recording(&ragged),
            Err(PsdError::RecordingSkipped { reason: SkipReason::ShapeMismatch { .. }, .. })
        ));

        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, "").unwrap();
        assert!(matches!(
            read_recording(&empty),
            Err(PsdError::RecordingSkipped { reason: SkipReason::EmptyInput, .. })
        ));
    }

    #[test]
    fn test_missing_recording_is_io() {
        let err = read_recording(Path::new("/no/such/file.csv")).unwrap_err();
        assert_eq!(err.severity(), crate::error::Severity::Io);
    }

    #[test]
    fn test_psd_matrix_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("alpha_psd.csv");
        write_psd_matrix(&path, &PsdMatrix::new(array![[1.0, 2.0, 3.0], [4.5, 5.0, 6.0]])).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.0,2.0,3.0\n4.5,5.0,6.0\n");
    }

    #[test]
    fn test_feature_table_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("psd_summary.csv");
        let table = FeatureTable::new(vec![
            Column::numeric("ALPHA_L", vec![0.1, 2.0]),
            Column::text("CLASS", vec!["fear".to_string(), "fear".to_string()]),
        ])
        .unwrap();

        write_feature_table(&path, &table).unwrap();
        assert_eq!(read_feature_table(&path).unwrap(), table);
    }

    #[test]
    fn test_read_legacy_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        std::fs::write(&path, "ALPHA L,CLASS\n1.5,sad\n").unwrap();

        let table = read_feature_table(&path).unwrap();
        assert_eq!(
            table.column("ALPHA_L").unwrap().data,
            ColumnData::Numeric(vec![1.5])
        );
    }

    #[test]
    fn test_discover_inputs() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "1").unwrap();
        std::fs::write(dir.path().join("a.csv"), "1").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = discover_inputs(dir.path(), "*.csv").unwrap();
        let names: Vec<_> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);

        let err = discover_inputs(&dir.path().join("missing"), "*.csv").unwrap_err();
        assert!(err.is_fatal());
    }
}
