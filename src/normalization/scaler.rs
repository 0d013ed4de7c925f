// src/normalization/scaler.rs
//! Fitted per-column scaling parameters and their on-disk artifact

use crate::config::ScalerKind;
use crate::error::{IntoPsdError, PsdError, PsdResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Artifact header: magic, format version, CRC-32 of the payload
const ARTIFACT_MAGIC: &[u8; 8] = b"EEGSCALR";
const ARTIFACT_VERSION: u32 = 1;
const HEADER_LEN: usize = ARTIFACT_MAGIC.len() + 4 + 4;

/// Scales below this are treated as zero and replaced by 1
const ZERO_SCALE_THRESHOLD: f64 = 10.0 * f64::EPSILON;

/// Scaling parameters fitted on a set of numeric columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerModel {
    kind: ScalerKind,
    columns: Vec<String>,
    /// Mean (standard) or minimum (min-max) per column
    offsets: Vec<f64>,
    /// Population std (standard) or range (min-max) per column
    scales: Vec<f64>,
    fitted_rows: usize,
}

impl ScalerModel {
    /// Fit one `(name, values)` pair per column; every column needs the same length
    pub fn fit(kind: ScalerKind, columns: &[(String, &[f64])]) -> Self {
        let fitted_rows = columns.first().map_or(0, |(_, values)| values.len());
        let (offsets, scales): (Vec<f64>, Vec<f64>) = columns
            .iter()
            .map(|(_, values)| match kind {
                ScalerKind::Standard => standard_parameters(values),
                ScalerKind::MinMax => min_max_parameters(values),
            })
            .unzip();

        Self {
            kind,
            columns: columns.iter().map(|(name, _)| name.clone()).collect(),
            offsets,
            scales,
            fitted_rows,
        }
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn fitted_rows(&self) -> usize {
        self.fitted_rows
    }

    /// `(offset, scale)` of a fitted column
    pub fn parameters(&self, column: &str) -> Option<(f64, f64)> {
        let index = self.columns.iter().position(|c| c == column)?;
        Some((self.offsets[index], self.scales[index]))
    }

    /// Rescale the values of the column at `index`
    pub fn transform_column(&self, index: usize, values: &[f64]) -> Vec<f64> {
        let offset = self.offsets[index];
        let scale = self.scales[index];
        values.iter().map(|&x| (x - offset) / scale).collect()
    }

    /// Write the artifact to `path`
    pub fn save(&self, path: &Path) -> PsdResult<()> {
        let bytes = self.to_bytes().map_err(|reason| PsdError::ScalerArtifact {
            path: path.to_path_buf(),
            reason,
        })?;
        std::fs::write(path, bytes).psd_err("write scaler", path)?;
        tracing::info!(path = %path.display(), kind = ?self.kind, "saved scaler");
        Ok(())
    }

    /// Read and validate an artifact written by [`ScalerModel::save`]
    pub fn load(path: &Path) -> PsdResult<Self> {
        let bytes = std::fs::read(path).psd_err("read scaler", path)?;
        Self::from_bytes(&bytes).map_err(|reason| PsdError::ScalerArtifact {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        let payload = rmp_serde::to_vec_named(self).map_err(|e| e.to_string())?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(ARTIFACT_MAGIC);
        bytes.extend_from_slice(&ARTIFACT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < HEADER_LEN {
            return Err(format!("artifact truncated ({} bytes)", bytes.len()));
        }
        let (magic, rest) = bytes.split_at(ARTIFACT_MAGIC.len());
        if magic != ARTIFACT_MAGIC {
            return Err("not a scaler artifact (bad magic)".to_string());
        }
        let (version, rest) = rest.split_at(4);
        let version = u32::from_le_bytes([version[0], version[1], version[2], version[3]]);
        if version != ARTIFACT_VERSION {
            return Err(format!(
                "unsupported artifact version {} (expected {})",
                version, ARTIFACT_VERSION
            ));
        }
        let (checksum, payload) = rest.split_at(4);
        let expected = u32::from_le_bytes([checksum[0], checksum[1], checksum[2], checksum[3]]);
        let actual = crc32fast::hash(payload);
        if expected != actual {
            return Err(format!(
                "checksum mismatch: expected 0x{:08X}, got 0x{:08X}",
                expected, actual
            ));
        }

        let model: Self = rmp_serde::from_slice(payload).map_err(|e| e.to_string())?;
        if model.offsets.len() != model.columns.len() || model.scales.len() != model.columns.len() {
            return Err("parameter count does not match column count".to_string());
        }
        Ok(model)
    }
}

fn standard_parameters(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    if is_constant_feature(variance, mean, n) {
        (mean, 1.0)
    } else {
        (mean, non_zero_scale(variance.sqrt()))
    }
}

/// Variance indistinguishable from the rounding error of the mean
fn is_constant_feature(variance: f64, mean: f64, n: f64) -> bool {
    let eps = f64::EPSILON;
    variance <= n * eps * variance + (n * mean * eps).powi(2)
}

fn min_max_parameters(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, non_zero_scale(max - min))
}

fn non_zero_scale(scale: f64) -> f64 {
    if scale < ZERO_SCALE_THRESHOLD {
        1.0
    } else {
        scale
    }
}
