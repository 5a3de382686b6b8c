//! Configuration module for keyfinder

mod analysis;

pub use analysis::{AnalysisConfig, ConfigBuilder};
