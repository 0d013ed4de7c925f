// src/processing/windowing.rs
//! Overlapping frame segmentation

use crate::error::{PsdErrorBuilder, PsdResult};

/// Splits a channel into fixed-length overlapping frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameExtractor {
    window_size: usize,
    step: usize,
}

impl FrameExtractor {
    /// Create extractor for `window_size` samples and `overlap_percent` in `[0, 100)`
    pub fn new(window_size: usize, overlap_percent: f64) -> PsdResult<Self> {
        if window_size == 0 {
            return Err(PsdErrorBuilder::new("windowing").invalid_value(
                "window_size_samples",
                window_size,
                "at least one sample",
            ));
        }
        if !(0.0..100.0).contains(&overlap_percent) {
            return Err(PsdErrorBuilder::new("windowing").invalid_value(
                "overlap_percent",
                overlap_percent,
                "0 <= overlap < 100",
            ));
        }

        let window = window_size as f64;
        let step = (window - window * overlap_percent / 100.0).ceil() as usize;

        Ok(Self {
            window_size,
            step: step.max(1),
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Hop between consecutive frame starts
    pub fn step(&self) -> usize {
        self.step
    }

    /// Number of complete frames in a signal of `num_samples`
    pub fn frame_count(&self, num_samples: usize) -> usize {
        if num_samples < self.window_size {
            0
        } else {
            (num_samples - self.window_size) / self.step + 1
        }
    }

    /// Lazy iterator over the complete frames of `signal`
    pub fn frames<'a>(&self, signal: &'a [f64]) -> Frames<'a> {
        Frames {
            signal,
            window_size: self.window_size,
            step: self.step,
            next: 0,
            remaining: self.frame_count(signal.len()),
        }
    }
}

/// Frames of one signal; trailing partial frames are never produced
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    signal: &'a [f64],
    window_size: usize,
    step: usize,
    next: usize,
    remaining: usize,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [f64];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let start = self.next;
        self.next += self.step;
        self.remaining -= 1;
        Some(&self.signal[start..start + self.window_size])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

impl std::iter::FusedIterator for Frames<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_geometry() {
        let extractor = FrameExtractor::new(128, 50.0).unwrap();
        assert_eq!(extractor.step(), 64);
        assert_eq!(extractor.frame_count(127), 0);
        assert_eq!(extractor.frame_count(128), 1);
        assert_eq!(extractor.frame_count(256), 3);
        assert_eq!(extractor.frame_count(300), 3);
    }

    #[test]
    fn test_frames_are_contiguous_slices() {
        let extractor = FrameExtractor::new(4, 50.0).unwrap();
        let signal: Vec<f64> = (0..9).map(|i| i as f64).collect();

        let frames: Vec<&[f64]> = extractor.frames(&signal).collect();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(frames[1], &[2.0, 3.0, 4.0, 5.0]);
        assert_eq!(frames[2], &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_frames_restartable() {
        let extractor = FrameExtractor::new(3, 0.0).unwrap();
        let signal = [1.0; 10];
        let frames = extractor.frames(&signal);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames.clone().count(), frames.count());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(FrameExtractor::new(0, 50.0).is_err());
        assert!(FrameExtractor::new(128, 100.0).is_err());
        assert!(FrameExtractor::new(128, -1.0).is_err());
        assert!(FrameExtractor::new(128, f64::NAN).is_err());
    }

    proptest! {
        #[test]
        fn prop_frame_count_law(num_samples in 0usize..5000) {
            let extractor = FrameExtractor::new(128, 50.0).unwrap();
            let expected = if num_samples >= 128 { (num_samples - 128) / 64 + 1 } else { 0 };

            prop_assert_eq!(extractor.frame_count(num_samples), expected);
            let signal = vec![0.0; num_samples];
            prop_assert_eq!(extractor.frames(&signal).count(), expected);
        }

        #[test]
        fn prop_frames_stay_in_bounds(
            window in 1usize..64,
            overlap in 0.0f64..99.0,
            num_samples in 0usize..512,
        ) {
            let extractor = FrameExtractor::new(window, overlap).unwrap();
            let signal = vec![0.0; num_samples];
            for frame in extractor.frames(&signal) {
                prop_assert_eq!(frame.len(), window);
            }
        }
    }
}
