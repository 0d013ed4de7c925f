// src/processing/pipeline.rs
//! Per-recording channel PSD pipeline: filter, frame, estimate

use crate::config::processing_config::ExtractionConfig;
use crate::error::{PsdError, PsdResult, SkipReason};
use crate::processing::filter_bank::{BandFilterBank, BandSet, FrequencyBand};
use crate::processing::spectral::SpectralPowerEstimator;
use crate::processing::windowing::FrameExtractor;
use crate::processing::filters::FilterError;
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;

/// Multi-channel recording, one row per electrode
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    name: String,
    samples: Array2<f64>,
}

impl Recording {
    /// Wrap a `num_channels × num_samples` matrix
    pub fn new(name: impl Into<String>, samples: Array2<f64>) -> PsdResult<Self> {
        let name = name.into();
        if samples.is_empty() {
            return Err(PsdError::skipped(name, SkipReason::EmptyInput));
        }
        if let Some(((row, column), value)) =
            samples.indexed_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(PsdError::skipped(
                name,
                SkipReason::InvalidSample {
                    row,
                    column,
                    value: value.to_string(),
                },
            ));
        }
        Ok(Self { name, samples })
    }

    /// Build from channel rows that must all have the same length
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<f64>>) -> PsdResult<Self> {
        let name = name.into();
        let num_samples = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(PsdError::skipped(name, SkipReason::EmptyInput)),
        };
        if let Some((channel, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != num_samples) {
            return Err(PsdError::skipped(
                name,
                SkipReason::ShapeMismatch {
                    channel,
                    expected: num_samples,
                    actual: row.len(),
                },
            ));
        }

        let num_channels = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let total = flat.len();
        let samples = Array2::from_shape_vec((num_channels, num_samples), flat).map_err(|_| {
            PsdError::skipped(
                name.clone(),
                SkipReason::ShapeMismatch {
                    channel: 0,
                    expected: num_channels * num_samples,
                    actual: total,
                },
            )
        })?;
        Self::new(name, samples)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_channels(&self) -> usize {
        self.samples.nrows()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.ncols()
    }

    pub fn channel(&self, index: usize) -> ArrayView1<'_, f64> {
        self.samples.row(index)
    }

    pub fn samples(&self) -> &Array2<f64> {
        &self.samples
    }
}

/// Peak power per channel and frame for one band
#[derive(Debug, Clone, PartialEq)]
pub struct PsdMatrix {
    values: Array2<f64>,
}

impl PsdMatrix {
    pub fn new(values: Array2<f64>) -> Self {
        Self { values }
    }

    pub fn num_channels(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_frames(&self) -> usize {
        self.values.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_channels(), self.num_frames())
    }

    pub fn channel(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

/// Per-band PSD matrices of one recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingPsd {
    pub recording: String,
    pub num_frames: usize,
    pub bands: BandSet<PsdMatrix>,
}

impl RecordingPsd {
    pub fn band(&self, band: FrequencyBand) -> &PsdMatrix {
        self.bands.get(band)
    }

    pub fn num_channels(&self) -> usize {
        self.bands.get(FrequencyBand::Delta).num_channels()
    }
}

/// Filter bank, frame extractor and spectral estimator for one run
#[derive(Debug, Clone)]
pub struct ChannelPsdPipeline {
    filter_bank: BandFilterBank,
    frames: FrameExtractor,
    estimator: SpectralPowerEstimator,
    parallel_channels: bool,
}

impl ChannelPsdPipeline {
    pub fn new(config: &ExtractionConfig) -> PsdResult<Self> {
        let frames = FrameExtractor::new(
            config.windowing.window_size_samples,
            config.windowing.overlap_percent,
        )?;
        let estimator =
            SpectralPowerEstimator::new(config.fft_size(), config.spectrum.retained_bins)?;
        let filter_bank = BandFilterBank::new(config)?;

        Ok(Self {
            filter_bank,
            frames,
            estimator,
            parallel_channels: config.parallel_channels,
        })
    }

    pub fn frame_extractor(&self) -> &FrameExtractor {
        &self.frames
    }

    /// Compute per-band PSD matrices for every channel of `recording`
    pub fn process(&self, recording: &Recording) -> PsdResult<RecordingPsd> {
        let num_samples = recording.num_samples();
        let num_frames = self.frames.frame_count(num_samples);
        if num_frames == 0 {
            return Err(PsdError::skipped(
                recording.name(),
                SkipReason::TooShort {
                    num_samples,
                    window_size: self.frames.window_size(),
                },
            ));
        }

        let process_channel = |index: usize| -> Result<BandSet<Vec<f64>>, FilterError> {
            let channel = recording.channel(index).to_vec();
            self.process_channel(&channel)
        };
        let channels: Vec<BandSet<Vec<f64>>> = if self.parallel_channels {
            (0..recording.num_channels())
                .into_par_iter()
                .map(process_channel)
                .collect::<Result<_, _>>()?
        } else {
            (0..recording.num_channels())
                .map(process_channel)
                .collect::<Result<_, _>>()?
        };

        for (channel, powers) in channels.iter().enumerate() {
            let actual = powers.get(FrequencyBand::Delta).len();
            if actual != num_frames {
                return Err(PsdError::skipped(
                    recording.name(),
                    SkipReason::ShapeMismatch {
                        channel,
                        expected: num_frames,
                        actual,
                    },
                ));
            }
        }

        let bands = BandSet::from_fn(|band| {
            PsdMatrix::new(Array2::from_shape_fn(
                (channels.len(), num_frames),
                |(channel, frame)| channels[channel].get(band)[frame],
            ))
        });

        tracing::debug!(
            recording = recording.name(),
            channels = recording.num_channels(),
            frames = num_frames,
            "computed band PSD matrices"
        );

        Ok(RecordingPsd {
            recording: recording.name().to_string(),
            num_frames,
            bands,
        })
    }

    /// Peak power of every frame of one channel, per band
    pub fn process_channel(&self, channel: &[f64]) -> Result<BandSet<Vec<f64>>, FilterError> {
        let mut powers = BandSet::from_fn(|_| Vec::with_capacity(self.frames.frame_count(channel.len())));
        for frame in self.frames.frames(channel) {
            for band in FrequencyBand::ALL {
                let filtered = self.filter_bank.apply(band, frame)?;
                powers.get_mut(band).push(self.estimator.peak_power(&filtered));
            }
        }
        Ok(powers)
    }
}
