//! Key labels and analysis results

mod key;
mod result;

pub use key::{Key, Mode};
pub use result::{Confidence, FileReport, KeyEstimate};
