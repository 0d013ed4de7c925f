// src/runner.rs
//! Batch orchestration over ordered input lists
//!
//! Every run folds over its inputs in order. Fatal errors abort the run,
//! skips and I/O failures are logged and recorded in the [`RunReport`], and
//! the cancellation flag is checked between inputs.

use crate::config::constants::{features, paths};
use crate::config::{ExtractionConfig, NormalizationConfig};
use crate::error::{PsdError, PsdErrorBuilder, PsdResult, Severity, SkipReason};
use crate::io;
use crate::metadata::{self, EyesStatus, StrokeSeverity};
use crate::normalization::{
    group_context, scaler_file_name, test_data_file_name, DatasetNormalizer, NormalizationMode,
    ScalerModel,
};
use crate::processing::{ChannelPsdPipeline, HemisphereSummarizer};
use crate::reporting::{LogSink, ProgressReporter, RunReport, SkippedInput};
use crate::table::{normalize_column_name, parse_number, Column, FeatureTable};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Test tables sharing one `(category, eyes)` pair
#[derive(Debug, Clone)]
struct TestGroup {
    category: StrokeSeverity,
    eyes: EyesStatus,
    tables: Vec<FeatureTable>,
}

/// Drives extraction, normalization and collation runs
pub struct BatchRunner<P: ProgressReporter, L: LogSink> {
    progress: P,
    log: L,
    cancel: Arc<AtomicBool>,
}

impl<P: ProgressReporter, L: LogSink> BatchRunner<P, L> {
    pub fn new(progress: P, log: L) -> Self {
        Self {
            progress,
            log,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing cancellation flag
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Setting the returned flag stops the run before the next input
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn into_parts(self) -> (P, L) {
        (self.progress, self.log)
    }

    /// Band PSD matrices and hemisphere summary for every recording
    pub fn extract(
        &mut self,
        config: &ExtractionConfig,
        inputs: &[PathBuf],
        output_dir: &Path,
    ) -> PsdResult<RunReport> {
        let pipeline = ChannelPsdPipeline::new(config)?;
        let summarizer = HemisphereSummarizer::default();
        prepare_output(output_dir)?;

        self.log.log("Starting processing...");
        let mut report = RunReport::new(inputs.len());
        let rows = self.fold_inputs(inputs, 0usize, &mut report, |rows, path, log| {
            let name = io::display_name(path);
            let class = match metadata::emotion_class(&name) {
                Ok(class) => Some(class),
                Err(err) if config.require_class => {
                    return Err(PsdError::skipped(
                        name,
                        SkipReason::MissingMetadata {
                            field: "emotion class".to_string(),
                            detail: err.to_string(),
                        },
                    ))
                }
                Err(err) => {
                    tracing::warn!(recording = %name, error = %err, "no emotion class; CLASS left empty");
                    None
                }
            };

            let recording = io::read_recording(path)?;
            let psd = pipeline.process(&recording)?;
            let table = summarizer.summarize(&psd, class)?;

            let recording_dir = output_dir.join(io::base_name(path));
            io::ensure_dir(&recording_dir)?;

            let mut outputs = Vec::with_capacity(5);
            for (band, matrix) in psd.bands.iter() {
                let file_name = format!("{}{}", band.name(), paths::PSD_SUFFIX);
                let band_path = recording_dir.join(&file_name);
                io::write_psd_matrix(&band_path, matrix)?;
                tracing::debug!(path = %band_path.display(), "wrote band PSD");
                log.log(&format!("Saved {} to {}", file_name, recording_dir.display()));
                outputs.push(band_path);
            }

            let summary_path = recording_dir.join(paths::SUMMARY_FILE);
            io::write_feature_table(&summary_path, &table)?;
            log.log(&format!("Saved {} to {}", paths::SUMMARY_FILE, recording_dir.display()));
            outputs.push(summary_path);

            *rows += table.num_rows();
            Ok(outputs)
        })?;

        report.rows_written = rows;
        Ok(self.complete(report))
    }

    /// Dispatch a normalization run on `mode`
    ///
    /// `scaler_path` is only read in apply mode and defaults to the training
    /// scaler in `output_dir`.
    pub fn normalize(
        &mut self,
        mode: NormalizationMode,
        config: &NormalizationConfig,
        inputs: &[PathBuf],
        output_dir: &Path,
        scaler_path: Option<&Path>,
    ) -> PsdResult<RunReport> {
        match mode {
            NormalizationMode::Fit => self.normalize_train(config, inputs, output_dir),
            NormalizationMode::Apply => {
                let default_path = output_dir.join(scaler_file_name(&config.train_context));
                let path = scaler_path.unwrap_or(default_path.as_path());
                let model = ScalerModel::load(path)?;
                self.log.log(&format!("Loaded file: {}", path.display()));
                self.normalize_test(Some((&model, path)), inputs, output_dir, config)
            }
            NormalizationMode::Refit => self.normalize_test(None, inputs, output_dir, config),
        }
    }

    /// Stack training tables, fit a scaler, persist it and the scaled data
    pub fn normalize_train(
        &mut self,
        config: &NormalizationConfig,
        inputs: &[PathBuf],
        output_dir: &Path,
    ) -> PsdResult<RunReport> {
        prepare_output(output_dir)?;
        self.log.log("Starting processing...");
        let mut report = RunReport::new(inputs.len());

        let tables = self.fold_inputs(inputs, Vec::new(), &mut report, |tables, path, _| {
            let table = io::read_feature_table(path)?;
            check_schema(tables.first(), &table, path)?;
            tables.push(table);
            Ok(Vec::new())
        })?;
        if report.cancelled {
            return Ok(self.complete(report));
        }

        let stacked = stack_tables(&tables)?;
        let (model, scaled) = DatasetNormalizer::fit_transform(&stacked, config.scaler)
            .map_err(|reason| PsdErrorBuilder::new("normalization").configuration(reason.to_string()))?;

        let scaler_path = output_dir.join(scaler_file_name(&config.train_context));
        model.save(&scaler_path)?;
        self.log.log(&format!("Saved file: {}", scaler_path.display()));

        let data_path = output_dir.join(paths::TRAIN_DATA_FILE);
        io::write_feature_table(&data_path, &scaled)?;
        self.log.log(&format!("Saved file: {}", data_path.display()));

        report.rows_written = scaled.num_rows();
        report.outputs.extend([scaler_path, data_path]);
        Ok(self.complete(report))
    }

    /// Scale held-out tables per `(category, eyes)` group
    ///
    /// With a model the training parameters are reused; without one every
    /// group is refitted on itself.
    fn normalize_test(
        &mut self,
        model: Option<(&ScalerModel, &Path)>,
        inputs: &[PathBuf],
        output_dir: &Path,
        config: &NormalizationConfig,
    ) -> PsdResult<RunReport> {
        prepare_output(output_dir)?;
        self.log.log("Starting processing...");
        let mut report = RunReport::new(inputs.len());

        let groups = self.fold_inputs(inputs, Vec::<TestGroup>::new(), &mut report, |groups, path, _| {
            let (category, eyes) = group_labels(path)?;
            let table = io::read_feature_table(path)?;

            match groups.iter_mut().find(|g| g.category == category && g.eyes == eyes) {
                Some(group) => {
                    check_schema(group.tables.first(), &table, path)?;
                    group.tables.push(table);
                }
                None => groups.push(TestGroup {
                    category,
                    eyes,
                    tables: vec![table],
                }),
            }
            Ok(Vec::new())
        })?;
        if report.cancelled {
            return Ok(self.complete(report));
        }

        for group in &groups {
            let stacked = stack_tables(&group.tables)?;
            let category = group.category.as_str();
            let eyes = group.eyes.as_str();

            let scaled = match model {
                Some((model, scaler_path)) => DatasetNormalizer::transform(model, &stacked)
                    .map_err(|reason| PsdError::ScalerArtifact {
                        path: scaler_path.to_path_buf(),
                        reason: reason.to_string(),
                    })?,
                None => {
                    tracing::warn!(
                        category,
                        eyes,
                        "refitting scaler on test data; scaled values are not comparable with training data"
                    );
                    self.log.log(&format!(
                        "Warning: fitting a separate scaler on {} {} test data (inconsistent with training scaler)",
                        category, eyes
                    ));
                    let (fitted, scaled) = DatasetNormalizer::fit_transform(&stacked, config.scaler)
                        .map_err(|reason| {
                            PsdErrorBuilder::new("normalization").configuration(reason.to_string())
                        })?;
                    let scaler_path = output_dir.join(scaler_file_name(&group_context(category, eyes)));
                    fitted.save(&scaler_path)?;
                    self.log.log(&format!("Saved file: {}", scaler_path.display()));
                    report.outputs.push(scaler_path);
                    scaled
                }
            };

            let data_path = output_dir.join(test_data_file_name(category, eyes));
            io::write_feature_table(&data_path, &scaled)?;
            self.log.log(&format!("Saved file: {}", data_path.display()));
            report.rows_written += scaled.num_rows();
            report.outputs.push(data_path);
        }

        Ok(self.complete(report))
    }

    /// Reorganize stroke summaries into `<severity>/<eyes>/<participant>.csv`
    pub fn collate_stroke(&mut self, inputs: &[PathBuf], output_dir: &Path) -> PsdResult<RunReport> {
        prepare_output(output_dir)?;
        self.log.log("Starting processing...");
        let mut report = RunReport::new(inputs.len());

        let rows = self.fold_inputs(inputs, 0usize, &mut report, |rows, path, log| {
            let name = io::display_name(path);
            let participant = metadata::participant_id(path).ok_or_else(|| {
                PsdError::skipped(
                    name.clone(),
                    SkipReason::MissingMetadata {
                        field: "participant".to_string(),
                        detail: "no P<number> tag in path".to_string(),
                    },
                )
            })?;
            let (category, eyes) = group_labels(path)?;

            let (header, records) = io::read_raw_table(path)?;
            let table = feature_columns(&name, &header, &records)?;

            let target_dir = output_dir.join(category.as_str()).join(eyes.as_str());
            io::ensure_dir(&target_dir)?;
            let file_name = format!("{}.csv", participant);
            let target = target_dir.join(&file_name);
            io::write_feature_table(&target, &table)?;
            log.log(&format!("Saved {} to {}", file_name, target_dir.display()));

            *rows += table.num_rows();
            Ok(vec![target])
        })?;

        report.rows_written = rows;
        Ok(self.complete(report))
    }

    /// Ordered fold over `inputs`, classifying each failure by severity
    fn fold_inputs<A>(
        &mut self,
        inputs: &[PathBuf],
        init: A,
        report: &mut RunReport,
        mut process: impl FnMut(&mut A, &Path, &mut dyn LogSink) -> PsdResult<Vec<PathBuf>>,
    ) -> PsdResult<A> {
        let total = inputs.len();
        inputs.iter().enumerate().try_fold(init, |mut acc, (index, path)| {
            if report.cancelled || self.cancel.load(Ordering::SeqCst) {
                if !report.cancelled {
                    tracing::warn!(remaining = total - index, "run cancelled");
                    self.log.log("Processing cancelled.");
                }
                report.cancelled = true;
                return Ok(acc);
            }

            tracing::info!(input = %path.display(), index = index + 1, total, "processing input");
            self.log.log(&format!("Processing: {}", path.display()));

            match process(&mut acc, path, &mut self.log) {
                Ok(outputs) => {
                    report.processed += 1;
                    report.outputs.extend(outputs);
                }
                Err(err) => {
                    let skipped = SkippedInput {
                        input: path.display().to_string(),
                        reason: err.to_string(),
                    };
                    match err.severity() {
                        Severity::Fatal => return Err(err),
                        Severity::Skipped => {
                            tracing::warn!(input = %path.display(), error = %err, "skipping input");
                            self.log.log(&format!("Warning: {}. Skipping.", err));
                            report.skipped.push(skipped);
                        }
                        Severity::Io => {
                            tracing::error!(input = %path.display(), error = %err, "abandoning output");
                            self.log.log(&format!("Error: {}. Output for this input is incomplete.", err));
                            report.io_failures.push(skipped);
                        }
                    }
                }
            }

            self.progress.report(index + 1, total);
            Ok(acc)
        })
    }

    fn complete(&mut self, report: RunReport) -> RunReport {
        tracing::info!(
            processed = report.processed,
            skipped = report.skipped.len(),
            failed = report.io_failures.len(),
            cancelled = report.cancelled,
            "run complete"
        );
        self.log.log(&report.summary());
        self.progress.finish(&report);
        report
    }
}

fn prepare_output(output_dir: &Path) -> PsdResult<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| {
        PsdErrorBuilder::new("output").configuration(format!(
            "cannot create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })
}

fn check_schema(reference: Option<&FeatureTable>, table: &FeatureTable, path: &Path) -> PsdResult<()> {
    match reference {
        Some(first) if first.column_names() != table.column_names() => Err(PsdError::skipped(
            io::display_name(path),
            SkipReason::SchemaMismatch {
                expected: first.column_names(),
                actual: table.column_names(),
            },
        )),
        _ => Ok(()),
    }
}

fn stack_tables(tables: &[FeatureTable]) -> PsdResult<FeatureTable> {
    if tables.is_empty() {
        return Err(PsdErrorBuilder::new("normalization").configuration("no usable feature tables"));
    }
    FeatureTable::vstack(tables)
        .map_err(|reason| PsdErrorBuilder::new("normalization").configuration(reason.to_string()))
}

/// Severity and eye condition from the directory of `path`
fn group_labels(path: &Path) -> PsdResult<(StrokeSeverity, EyesStatus)> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let missing = |field: &str, detail: &str| {
        PsdError::skipped(
            io::display_name(path),
            SkipReason::MissingMetadata {
                field: field.to_string(),
                detail: detail.to_string(),
            },
        )
    };
    let eyes = metadata::eyes_status(dir)
        .ok_or_else(|| missing("eyes status", "no 'open eyes' or 'close eyes' in directory"))?;
    let category = metadata::severity(dir)
        .ok_or_else(|| missing("category", "no 'minor', 'moderate' or 'severe' in directory"))?;
    Ok((category, eyes))
}

/// The eight feature columns, keeping rows whose feature cells are all numeric
fn feature_columns(name: &str, header: &[String], records: &[Vec<String>]) -> PsdResult<FeatureTable> {
    let normalized: Vec<String> = header.iter().map(|h| normalize_column_name(h)).collect();
    let indices = features::FEATURE_COLUMNS
        .iter()
        .map(|column| normalized.iter().position(|h| h == column))
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| {
            PsdError::skipped(
                name,
                SkipReason::SchemaMismatch {
                    expected: features::FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
                    actual: normalized.clone(),
                },
            )
        })?;

    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(records.len()); indices.len()];
    let mut dropped = 0usize;
    for record in records {
        let parsed: Option<Vec<f64>> = indices
            .iter()
            .map(|&i| record.get(i).and_then(|cell| parse_number(cell)))
            .collect();
        match parsed {
            Some(row) => {
                for (column, value) in values.iter_mut().zip(row) {
                    column.push(value);
                }
            }
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::debug!(input = name, dropped, "dropped rows with non-numeric feature cells");
    }
    if values[0].is_empty() {
        return Err(PsdError::skipped(name, SkipReason::EmptyInput));
    }

    let columns = features::FEATURE_COLUMNS
        .iter()
        .zip(values)
        .map(|(column, values)| Column::numeric(*column, values))
        .collect();
    FeatureTable::new(columns).map_err(|reason| PsdError::skipped(name, reason))
}
