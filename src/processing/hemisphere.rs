// src/processing/hemisphere.rs
//! Left/right hemisphere averaging of band PSD matrices

use crate::config::constants::{features, hemisphere};
use crate::error::{PsdError, PsdResult, SkipReason};
use crate::metadata::EmotionClass;
use crate::processing::filter_bank::FrequencyBand;
use crate::processing::pipeline::{PsdMatrix, RecordingPsd};
use crate::table::{Column, FeatureTable};

/// Zero-based channel rows of each hemisphere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HemisphereMap {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

impl Default for HemisphereMap {
    /// 62-channel cap layout
    fn default() -> Self {
        Self {
            left: hemisphere::LEFT_CHANNELS.iter().map(|&c| c - 1).collect(),
            right: hemisphere::RIGHT_CHANNELS.iter().map(|&c| c - 1).collect(),
        }
    }
}

impl HemisphereMap {
    pub fn new(left: Vec<usize>, right: Vec<usize>) -> Self {
        Self { left, right }
    }

    /// Keep only rows below `num_channels`
    pub fn restricted_to(&self, num_channels: usize) -> Self {
        let keep = |rows: &[usize]| -> Vec<usize> {
            rows.iter().copied().filter(|&r| r < num_channels).collect()
        };
        Self {
            left: keep(&self.left),
            right: keep(&self.right),
        }
    }

    pub fn is_restricted_by(&self, num_channels: usize) -> bool {
        self.left.iter().chain(&self.right).any(|&r| r >= num_channels)
    }
}

/// Builds the per-frame hemisphere feature table of a recording
#[derive(Debug, Clone, Default)]
pub struct HemisphereSummarizer {
    map: HemisphereMap,
}

impl HemisphereSummarizer {
    pub fn new(map: HemisphereMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &HemisphereMap {
        &self.map
    }

    /// Per-frame mean over the left rows and over the right rows
    ///
    /// Fails when either hemisphere has no row inside `psd`.
    pub fn hemisphere_means(&self, psd: &PsdMatrix) -> Result<(Vec<f64>, Vec<f64>), SkipReason> {
        let num_channels = psd.num_channels();
        let map = self.map.restricted_to(num_channels);
        for (hemisphere, rows) in [("left", &map.left), ("right", &map.right)] {
            if rows.is_empty() {
                return Err(SkipReason::NoHemisphereChannels {
                    hemisphere: hemisphere.to_string(),
                    num_channels,
                });
            }
        }
        Ok((Self::row_mean(psd, &map.left), Self::row_mean(psd, &map.right)))
    }

    fn row_mean(psd: &PsdMatrix, rows: &[usize]) -> Vec<f64> {
        let values = psd.values();
        (0..psd.num_frames())
            .map(|frame| {
                let sum: f64 = rows.iter().map(|&row| values[[row, frame]]).sum();
                sum / rows.len() as f64
            })
            .collect()
    }

    /// Feature table with the eight hemisphere columns followed by `CLASS`
    pub fn summarize(
        &self,
        psd: &RecordingPsd,
        class: Option<EmotionClass>,
    ) -> PsdResult<FeatureTable> {
        let num_channels = psd.num_channels();
        if self.map.is_restricted_by(num_channels) {
            tracing::warn!(
                recording = %psd.recording,
                num_channels,
                "hemisphere layout references missing channels; dropping them"
            );
        }

        let mut columns = Vec::with_capacity(features::FEATURE_COLUMNS.len() + 1);
        for band in [
            FrequencyBand::Alpha,
            FrequencyBand::Beta,
            FrequencyBand::Delta,
            FrequencyBand::Theta,
        ] {
            let (left, right) = self
                .hemisphere_means(psd.band(band))
                .map_err(|reason| PsdError::skipped(psd.recording.clone(), reason))?;
            columns.push(Column::numeric(format!("{}_L", band.column_prefix()), left));
            columns.push(Column::numeric(format!("{}_R", band.column_prefix()), right));
        }

        let label = class.map(|c| c.as_str().to_string()).unwrap_or_default();
        columns.push(Column::text(
            features::CLASS_COLUMN,
            vec![label; psd.num_frames],
        ));

        FeatureTable::new(columns).map_err(|reason| PsdError::skipped(psd.recording.clone(), reason))
    }
}
