//! Feature engineering: the standardization scaler.

pub mod scaler;

pub use scaler::{FeatureScaler, FittedScaler};
