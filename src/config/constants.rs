// src/config/constants.rs
//! Fixed constants for the EEG acquisition layout and feature pipeline

/// Signal acquisition constants
pub mod signal {
    pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 256.0;
    pub const MIN_SAMPLING_RATE_HZ: f64 = 16.0;
    pub const MAX_SAMPLING_RATE_HZ: f64 = 16384.0;
    pub const EXPECTED_CHANNEL_COUNT: usize = 62;
}

/// Frame extraction constants
pub mod windowing {
    pub const DEFAULT_WINDOW_SIZE_SAMPLES: usize = 128;
    pub const DEFAULT_OVERLAP_PERCENT: f64 = 50.0;
}

/// Spectral estimation constants
pub mod spectrum {
    /// Number of leading magnitude bins scanned for the band peak (0-49 Hz at Fs = 256)
    pub const DEFAULT_RETAINED_BINS: usize = 50;
}

/// Band-pass filter design constants
pub mod filters {
    pub const DEFAULT_FILTER_ORDER: usize = 2;
    pub const MIN_FILTER_ORDER: usize = 1;
    pub const MAX_FILTER_ORDER: usize = 8;
    pub const DEFAULT_STOPBAND_ATTENUATION_DB: f64 = 40.0;

    pub const DELTA_BAND_HZ: (f64, f64) = (0.5, 4.0);
    pub const THETA_BAND_HZ: (f64, f64) = (4.0, 7.0);
    pub const ALPHA_BAND_HZ: (f64, f64) = (8.0, 12.0);
    pub const BETA_BAND_HZ: (f64, f64) = (13.0, 30.0);
}

/// Hemisphere layout of the 62-channel cap, 1-based electrode numbers
pub mod hemisphere {
    pub const LEFT_CHANNELS: [usize; 28] = [
        1, 3, 4, 8, 9, 12, 13, 17, 18, 19, 23, 24, 28, 29, 33, 35, 36, 39, 42, 45, 46, 47, 48,
        49, 55, 57, 58, 61,
    ];
    pub const RIGHT_CHANNELS: [usize; 28] = [
        2, 6, 7, 10, 11, 15, 16, 20, 21, 22, 26, 27, 31, 32, 34, 37, 38, 41, 43, 50, 51, 52, 53,
        54, 56, 59, 60, 62,
    ];
}

/// Feature table layout
pub mod features {
    pub const CLASS_COLUMN: &str = "CLASS";
    pub const FEATURE_COLUMNS: [&str; 8] = [
        "ALPHA_L", "ALPHA_R", "BETA_L", "BETA_R", "DELTA_L", "DELTA_R", "THETA_L", "THETA_R",
    ];
}

/// Artifact naming
pub mod paths {
    pub const PSD_SUFFIX: &str = "_psd.csv";
    pub const SUMMARY_FILE: &str = "psd_summary.csv";
    pub const TRAIN_DATA_FILE: &str = "train_data.csv";
    pub const TEST_DATA_SUFFIX: &str = "_test_data.csv";
    pub const SCALER_SUFFIX: &str = "_scaler.bin";
    pub const DEFAULT_TRAIN_CONTEXT: &str = "train";
    pub const DEFAULT_CONFIG_FILE: &str = "eeg-psd.toml";
    pub const LOCAL_CONFIG_FILE: &str = "config/local.toml";
    pub const ENV_PREFIX: &str = "EEG_PSD_";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hemisphere_sets_are_disjoint_and_in_range() {
        for left in hemisphere::LEFT_CHANNELS {
            assert!(!hemisphere::RIGHT_CHANNELS.contains(&left));
            assert!((1..=signal::EXPECTED_CHANNEL_COUNT).contains(&left));
        }
        for right in hemisphere::RIGHT_CHANNELS {
            assert!((1..=signal::EXPECTED_CHANNEL_COUNT).contains(&right));
        }
    }

    #[test]
    fn test_band_edges_below_nyquist() {
        let nyquist = signal::DEFAULT_SAMPLING_RATE_HZ / 2.0;
        for (low, high) in [
            filters::DELTA_BAND_HZ,
            filters::THETA_BAND_HZ,
            filters::ALPHA_BAND_HZ,
            filters::BETA_BAND_HZ,
        ] {
            assert!(low > 0.0 && low < high && high < nyquist);
        }
    }
}
