// src/core/analysis/chroma.rs
//
// Direct spectral kernel mapping FFT magnitudes onto the 72 chroma bands.
// Approximates a constant-Q transform at a fraction of the cost.

use std::f64::consts::PI;

use crate::core::dsp::FftAdapter;
use crate::core::tables::{self, BANDS, SEMITONES};
use crate::error::{KeyFinderError, Result};

/// Per-band raised-cosine kernels over FFT bins, immutable once built.
#[derive(Debug, Clone)]
pub struct ChromaTransform {
    frame_rate: f64,
    fft_frame_size: usize,
    /// First FFT bin covered by each band's kernel
    bin_offsets: Vec<usize>,
    kernels: Vec<Vec<f64>>,
}

impl ChromaTransform {
    /// Build the kernel for audio at `frame_rate` analysed in frames of
    /// `fft_frame_size`. `stretch` scales the kernel width as a fraction of a semitone.
    pub fn new(frame_rate: f64, fft_frame_size: usize, stretch: f64) -> Result<Self> {
        if !(frame_rate >= 1.0) || !frame_rate.is_finite() {
            return Err(KeyFinderError::InvalidConfig(format!(
                "frame rate must be >= 1 Hz, got {}",
                frame_rate
            )));
        }
        if fft_frame_size == 0 || !(stretch > 0.0) {
            return Err(KeyFinderError::InvalidConfig(format!(
                "chroma kernel needs a non-empty frame and positive stretch (frame {}, stretch {})",
                fft_frame_size, stretch
            )));
        }

        let nyquist = frame_rate / 2.0;
        let last = tables::last_frequency();
        if last > nyquist {
            return Err(KeyFinderError::AboveNyquist { frequency: last, nyquist });
        }

        let resolution = frame_rate / fft_frame_size as f64;
        let required = tables::frequency_of_band(1)? - tables::frequency_of_band(0)?;
        if resolution > required {
            return Err(KeyFinderError::InsufficientResolution { resolution, required });
        }

        let q_factor = stretch * (2f64.powf(1.0 / SEMITONES as f64) - 1.0);
        let mut bin_offsets = Vec::with_capacity(BANDS);
        let mut kernels = Vec::with_capacity(BANDS);

        for band in 0..BANDS {
            let frequency = tables::frequency_of_band(band)?;
            let centre = frequency * fft_frame_size as f64 / frame_rate;
            let width = centre * q_factor;
            let begin = centre - width / 2.0;
            let end = begin + width;

            let first_bin = begin.ceil() as usize;
            let last_bin = end.floor() as usize;
            let mut kernel: Vec<f64> = (first_bin..=last_bin)
                .map(|bin| kernel_window(bin as f64 - begin, width))
                .collect();

            // Unit area per band, then weighted by band frequency
            let sum: f64 = kernel.iter().sum();
            if sum > 0.0 {
                kernel.iter_mut().for_each(|c| *c = *c / sum * frequency);
            }

            bin_offsets.push(first_bin);
            kernels.push(kernel);
        }

        Ok(Self {
            frame_rate,
            fft_frame_size,
            bin_offsets,
            kernels,
        })
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn fft_frame_size(&self) -> usize {
        self.fft_frame_size
    }

    pub fn kernel(&self, band: usize) -> Result<&[f64]> {
        self.kernels
            .get(band)
            .map(Vec::as_slice)
            .ok_or_else(|| KeyFinderError::out_of_bounds("chroma band", band, BANDS))
    }

    pub fn bin_offset(&self, band: usize) -> Result<usize> {
        self.bin_offsets
            .get(band)
            .copied()
            .ok_or_else(|| KeyFinderError::out_of_bounds("chroma band", band, BANDS))
    }

    /// Project the magnitudes of an executed FFT frame onto the chroma bands.
    pub fn chroma_vector(&self, adapter: &FftAdapter) -> Result<Vec<f64>> {
        let mut chroma = Vec::with_capacity(BANDS);
        for (kernel, &offset) in self.kernels.iter().zip(&self.bin_offsets) {
            let mut sum = 0.0;
            for (j, coefficient) in kernel.iter().enumerate() {
                sum += adapter.magnitude(offset + j)? * coefficient;
            }
            chroma.push(sum);
        }
        Ok(chroma)
    }
}

/// Unnormalised raised cosine, peaking at 2 in the middle of the window.
fn kernel_window(n: f64, width: f64) -> f64 {
    1.0 - (2.0 * PI * n / width).cos()
}
