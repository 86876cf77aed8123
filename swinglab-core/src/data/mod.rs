//! Bar series preparation.

pub mod resample;

pub use resample::resample;
