// src/config/analysis.rs
//
// Analysis parameters shared by every session of a KeyFinder

use serde::{Deserialize, Serialize};

use crate::error::{KeyFinderError, Result};

/// Parameters of the preprocessing and spectral analysis chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Samples per spectral frame, after downsampling
    pub fft_frame_size: usize,
    /// Frame advance between hops
    pub hop_size: usize,
    /// Chroma kernel width as a fraction of a semitone
    pub kernel_stretch: f64,
    /// Low-pass FIR order (even)
    pub lpf_order: usize,
    /// FFT size used to design the low-pass filter
    pub lpf_fft_frame_size: usize,
    /// Low-pass corner as a multiple of the highest band frequency
    pub lpf_cutoff_margin: f64,
    /// Post-downsampling Nyquist as a multiple of the highest band frequency
    pub downsample_cutoff_margin: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_frame_size: 16384,
            hop_size: 4096,
            kernel_stretch: 0.8,
            lpf_order: 160,
            lpf_fft_frame_size: 2048,
            lpf_cutoff_margin: 1.012,
            downsample_cutoff_margin: 1.10,
        }
    }
}

impl AnalysisConfig {
    /// Check internal consistency. Frame-rate dependent checks happen when
    /// the chroma transform and filter are built.
    pub fn validate(&self) -> Result<()> {
        if self.fft_frame_size == 0 || self.hop_size == 0 {
            return Err(KeyFinderError::InvalidConfig(format!(
                "frame size ({}) and hop size ({}) must be > 0",
                self.fft_frame_size, self.hop_size
            )));
        }
        if self.hop_size > self.fft_frame_size {
            return Err(KeyFinderError::InvalidConfig(format!(
                "hop size {} exceeds frame size {}",
                self.hop_size, self.fft_frame_size
            )));
        }
        if !(self.kernel_stretch > 0.0) || !self.kernel_stretch.is_finite() {
            return Err(KeyFinderError::InvalidConfig(format!(
                "kernel stretch must be positive, got {}",
                self.kernel_stretch
            )));
        }
        if self.lpf_fft_frame_size == 0 {
            return Err(KeyFinderError::InvalidConfig(
                "low-pass FFT frame size must be > 0".to_string(),
            ));
        }
        if self.lpf_order % 2 != 0 {
            return Err(KeyFinderError::OddFilterOrder(self.lpf_order));
        }
        if self.lpf_order > self.lpf_fft_frame_size / 4 {
            return Err(KeyFinderError::FilterOrderTooLarge {
                order: self.lpf_order,
                fft_frame_size: self.lpf_fft_frame_size,
            });
        }
        for (name, margin) in [
            ("low-pass cutoff", self.lpf_cutoff_margin),
            ("downsample cutoff", self.downsample_cutoff_margin),
        ] {
            if !(margin >= 1.0) || !margin.is_finite() {
                return Err(KeyFinderError::InvalidConfig(format!(
                    "{} margin must be >= 1, got {}",
                    name, margin
                )));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Builder for custom analysis configurations
pub struct ConfigBuilder {
    config: AnalysisConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    pub fn fft_frame_size(mut self, size: usize) -> Self {
        self.config.fft_frame_size = size;
        self
    }

    pub fn hop_size(mut self, size: usize) -> Self {
        self.config.hop_size = size;
        self
    }

    pub fn kernel_stretch(mut self, stretch: f64) -> Self {
        self.config.kernel_stretch = stretch;
        self
    }

    pub fn lpf_order(mut self, order: usize) -> Self {
        self.config.lpf_order = order;
        self
    }

    pub fn lpf_fft_frame_size(mut self, size: usize) -> Self {
        self.config.lpf_fft_frame_size = size;
        self
    }

    pub fn lpf_cutoff_margin(mut self, margin: f64) -> Self {
        self.config.lpf_cutoff_margin = margin;
        self
    }

    pub fn downsample_cutoff_margin(mut self, margin: f64) -> Self {
        self.config.downsample_cutoff_margin = margin;
        self
    }

    pub fn build(self) -> Result<AnalysisConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
