// src/normalization/mod.rs
//! Dataset normalization with persisted scalers

pub mod dataset;
pub mod scaler;

pub use dataset::*;
pub use scaler::ScalerModel;
