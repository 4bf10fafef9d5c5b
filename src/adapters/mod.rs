//! Inputs produced by external tools, converted to domain records.

pub mod component_detection;

pub use component_detection::{ConversionOptions, ScanResult};
