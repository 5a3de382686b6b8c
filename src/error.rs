//! Error types for key analysis

use thiserror::Error;

/// Errors raised by the analysis pipeline.
///
/// Every failure is a local precondition violation; nothing is retried, the
/// error is handed back to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyFinderError {
    /// An index addressed past the end of a sample buffer, chromagram, band table, etc.
    #[error("out-of-bounds {what} ({index}/{len})")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Two sequences that must agree in length do not.
    #[error("mismatched {what} length: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Appending or prepending audio with a different channel count.
    #[error("cannot combine audio with {actual} channels into audio with {expected}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// Appending or prepending audio with a different frame rate.
    #[error("cannot combine audio at {actual} Hz into audio at {expected} Hz")]
    FrameRateMismatch { expected: f64, actual: f64 },

    /// The operation only accepts a single channel.
    #[error("monophonic audio required, got {channels} channels")]
    NotMonophonic { channels: usize },

    /// NaN or infinite value where a finite sample was required.
    #[error("non-finite {what} at index {index}")]
    NonFinite { what: &'static str, index: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("low-pass filter order must be even, got {0}")]
    OddFilterOrder(usize),

    #[error("low-pass filter order {order} exceeds FFT frame size {fft_frame_size} / 4")]
    FilterOrderTooLarge { order: usize, fft_frame_size: usize },

    /// The highest analysis frequency cannot be represented at this frame rate.
    #[error("analysis frequency {frequency:.2} Hz above Nyquist ({nyquist:.2} Hz)")]
    AboveNyquist { frequency: f64, nyquist: f64 },

    /// The FFT bin spacing is too coarse to separate the two lowest bands.
    #[error("insufficient low-end resolution: {resolution:.4} Hz per bin, need {required:.4} Hz")]
    InsufficientResolution { resolution: f64, required: f64 },

    #[error("analysis session already finalized")]
    SessionFinalized,
}

pub type Result<T> = std::result::Result<T, KeyFinderError>;

impl KeyFinderError {
    pub(crate) fn out_of_bounds(what: &'static str, index: usize, len: usize) -> Self {
        Self::OutOfBounds { what, index, len }
    }

    /// True for the configuration family of errors.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::OddFilterOrder(_)
                | Self::FilterOrderTooLarge { .. }
                | Self::AboveNyquist { .. }
                | Self::InsufficientResolution { .. }
        )
    }
}
