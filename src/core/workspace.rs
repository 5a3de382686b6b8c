// src/core/workspace.rs
//
// Per-session state carried between progressive analysis calls.

use super::analysis::Chromagram;
use super::audio::AudioData;
use super::dsp::FftAdapter;

/// Lifecycle of an analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No audio seen yet
    #[default]
    Empty,
    /// At least one chunk has been preprocessed
    Accumulating,
    /// Flushed; no further chunks accepted
    Finalized,
}

/// Mutable state for one analysis session. Never shared between sessions.
#[derive(Debug, Default)]
pub struct Workspace {
    /// Trailing samples held back so each preprocessed chunk divides evenly by
    /// the decimation factor.
    pub(crate) remainder: AudioData,
    /// Filtered and decimated mono audio awaiting framing.
    pub(crate) preprocessed: AudioData,
    /// Unset until the first analyser pass.
    pub(crate) chromagram: Option<Chromagram>,
    /// Created on first analyser pass, reused afterwards.
    pub(crate) fft_adapter: Option<FftAdapter>,
    /// Low-pass delay line, created on first filter call.
    pub(crate) lpf_delay_line: Option<Vec<f64>>,
    pub(crate) state: SessionState,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn chromagram(&self) -> Option<&Chromagram> {
        self.chromagram.as_ref()
    }

    /// Samples waiting for the next chunk (or the final flush).
    pub fn remainder(&self) -> &AudioData {
        &self.remainder
    }

    pub fn preprocessed(&self) -> &AudioData {
        &self.preprocessed
    }

    /// Number of chroma hops accumulated so far.
    pub fn hops(&self) -> usize {
        self.chromagram.as_ref().map_or(0, Chromagram::hops)
    }
}
