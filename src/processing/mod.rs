// src/processing/mod.rs
//! Band PSD feature extraction for multi-channel EEG

pub mod filter_bank;
pub mod filters;
pub mod hemisphere;
pub mod pipeline;
pub mod spectral;
pub mod windowing;

pub use filter_bank::*;
pub use hemisphere::*;
pub use pipeline::*;
pub use spectral::*;
pub use windowing::*;
