// src/reporting.rs
//! Progress and log callbacks supplied by the caller, and the run report

use serde::Serialize;
use std::path::PathBuf;

/// An input that produced no (or partial) output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedInput {
    pub input: String,
    pub reason: String,
}

/// Terminal completion value of a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub total_inputs: usize,
    pub processed: usize,
    pub skipped: Vec<SkippedInput>,
    pub io_failures: Vec<SkippedInput>,
    pub outputs: Vec<PathBuf>,
    pub rows_written: usize,
    pub cancelled: bool,
}

impl RunReport {
    pub fn new(total_inputs: usize) -> Self {
        Self {
            total_inputs,
            ..Self::default()
        }
    }

    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} of {} inputs processed, {} skipped, {} failed, {} files written{}",
            self.processed,
            self.total_inputs,
            self.skipped.len(),
            self.io_failures.len(),
            self.outputs.len(),
            if self.cancelled { " (cancelled)" } else { "" }
        )
    }
}

/// Receives `(completed, total)` after each processed input
pub trait ProgressReporter {
    fn report(&mut self, completed: usize, total: usize);

    /// Called once with the run's terminal result
    fn finish(&mut self, _report: &RunReport) {}
}

/// Receives append-only, human-readable log lines
pub trait LogSink {
    fn log(&mut self, message: &str);
}

impl<F: FnMut(usize, usize)> ProgressReporter for F {
    fn report(&mut self, completed: usize, total: usize) {
        self(completed, total)
    }
}

impl<F: FnMut(&str)> LogSink for F {
    fn log(&mut self, message: &str) {
        self(message)
    }
}

/// Discards progress updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _completed: usize, _total: usize) {}
}

/// Forwards log lines as `tracing` info events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&mut self, message: &str) {
        tracing::info!(target: "eeg_psd::run", "{}", message);
    }
}

/// Collects log lines in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryLogSink {
    pub lines: Vec<String>,
}

impl LogSink for MemoryLogSink {
    fn log(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}
