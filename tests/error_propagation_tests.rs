// tests/error_propagation_tests.rs
//! Error severities and how batch runs react to them
//!
//! Fatal errors abort before or during a run, skipped inputs and I/O
//! failures are recorded in the report, and cancellation stops between
//! inputs.

use eeg_psd::config::{BandEdges, ConfigLoader, ExtractionConfig};
use eeg_psd::error::{PsdError, PsdErrorBuilder, Severity, SkipReason};
use eeg_psd::io::{discover_inputs, read_recording};
use eeg_psd::reporting::{MemoryLogSink, NoProgress};
use eeg_psd::runner::BatchRunner;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tempfile::tempdir;

fn write_recording(dir: &Path, name: &str, num_samples: usize) -> PathBuf {
    let row: Vec<String> = (0..num_samples)
        .map(|n| format!("{:?}", (n as f64 * 0.3).sin()))
        .collect();
    let path = dir.join(name);
    fs::write(&path, format!("{}\n{}\n", row.join(","), row.join(","))).unwrap();
    path
}

#[test]
fn test_severity_classification() {
    let fatal = PsdErrorBuilder::new("windowing").configuration("overlap out of range");
    assert_eq!(fatal.severity(), Severity::Fatal);

    let scaler = PsdError::ScalerArtifact {
        path: PathBuf::from("train_scaler.bin"),
        reason: "bad magic".to_string(),
    };
    assert_eq!(scaler.severity(), Severity::Fatal);

    let skipped = PsdError::skipped("P1.csv", SkipReason::EmptyInput);
    assert_eq!(skipped.severity(), Severity::Skipped);
    assert_eq!(skipped.to_string(), "[SKIP] P1.csv: input contains no data");

    let io = PsdError::io(
        "write",
        "out/alpha_psd.csv",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    assert_eq!(io.severity(), Severity::Io);
    assert!(!io.is_fatal());
}

#[test]
fn test_invalid_band_edges_abort_before_any_input() {
    let input_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let input = write_recording(input_dir.path(), "P1_s.csv", 256);

    let mut config = ExtractionConfig::default();
    config.bands.beta = BandEdges::new(13.0, 200.0);

    let mut runner = BatchRunner::new(NoProgress, MemoryLogSink::default());
    let err = runner.extract(&config, &[input], output_dir.path()).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("beta"));

    let (_, log) = runner.into_parts();
    assert!(log.lines.is_empty());
}

#[test]
fn test_invalid_overlap_is_fatal() {
    let output_dir = tempdir().unwrap();
    let mut config = ExtractionConfig::default();
    config.windowing.overlap_percent = 100.0;

    let err = BatchRunner::new(NoProgress, MemoryLogSink::default())
        .extract(&config, &[], output_dir.path())
        .unwrap_err();
    assert!(matches!(err, PsdError::Configuration { .. }));
}

#[test]
fn test_missing_input_directory_is_fatal() {
    let dir = tempdir().unwrap();
    let err = discover_inputs(&dir.path().join("absent"), "*.csv").unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_missing_recording_is_recorded_as_io_failure() {
    let input_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let missing = input_dir.path().join("P9_f.csv");
    let present = write_recording(input_dir.path(), "P2_f.csv", 256);

    assert_eq!(read_recording(&missing).unwrap_err().severity(), Severity::Io);

    let mut runner = BatchRunner::new(NoProgress, MemoryLogSink::default());
    let report = runner
        .extract(&ExtractionConfig::default(), &[missing, present], output_dir.path())
        .unwrap();

    assert_eq!(report.io_failures.len(), 1);
    assert!(report.io_failures[0].input.ends_with("P9_f.csv"));
    assert_eq!(report.processed, 1);

    let (_, log) = runner.into_parts();
    assert!(log.lines.iter().any(|l| l.starts_with("Error: ")));
}

#[test]
fn test_blocked_output_directory_is_recorded_as_io_failure() {
    let input_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let blocked = write_recording(input_dir.path(), "P1_h.csv", 256);
    let next = write_recording(input_dir.path(), "P2_h.csv", 256);

    // a plain file where the per-recording directory belongs
    fs::write(output_dir.path().join("P1_h"), "occupied").unwrap();

    let mut runner = BatchRunner::new(NoProgress, MemoryLogSink::default());
    let report = runner
        .extract(&ExtractionConfig::default(), &[blocked, next], output_dir.path())
        .unwrap();

    assert_eq!(report.io_failures.len(), 1);
    assert!(report.io_failures[0].input.ends_with("P1_h.csv"));
    assert!(report.skipped.is_empty());
    assert_eq!(report.processed, 1);
    assert!(output_dir.path().join("P2_h").join("psd_summary.csv").exists());
    assert_eq!(fs::read_to_string(output_dir.path().join("P1_h")).unwrap(), "occupied");

    let (_, log) = runner.into_parts();
    let errors: Vec<_> = log.lines.iter().filter(|l| l.starts_with("Error: ")).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("P1_h"));
}

#[test]
fn test_malformed_cell_skips_recording() {
    let input_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let path = input_dir.path().join("P5_n.csv");
    fs::write(&path, "1.0,2.0,x\n").unwrap();

    let report = BatchRunner::new(NoProgress, MemoryLogSink::default())
        .extract(&ExtractionConfig::default(), &[path], output_dir.path())
        .unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].reason.contains("\"x\""));
}

#[test]
fn test_cancellation_stops_between_inputs() {
    let input_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let inputs = vec![
        write_recording(input_dir.path(), "P1_h.csv", 256),
        write_recording(input_dir.path(), "P2_h.csv", 256),
    ];

    let mut runner = BatchRunner::new(NoProgress, MemoryLogSink::default());
    let cancel = runner.cancel_handle();
    cancel.store(true, Ordering::SeqCst);

    let report = runner
        .extract(&ExtractionConfig::default(), &inputs, output_dir.path())
        .unwrap();
    assert!(report.cancelled);
    assert_eq!(report.processed, 0);
    assert!(!output_dir.path().join("P1_h").exists());
}

#[test]
fn test_missing_config_file_is_fatal() {
    let dir = tempdir().unwrap();
    let err: PsdError = ConfigLoader::load_file(dir.path().join("nope.toml"))
        .unwrap_err()
        .into();
    assert!(err.is_fatal());
}
