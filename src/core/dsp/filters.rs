//! Low-pass FIR filter designed in the frequency domain, applied as a
//! streaming circular-buffer convolution with fused decimation.

use super::fft::InverseFftAdapter;
use super::windows::{window, WindowType};
use crate::core::audio::{AudioData, Cursor};
use crate::core::workspace::Workspace;
use crate::error::{KeyFinderError, Result};

/// Windowed-sinc style low-pass filter, immutable once designed.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    order: usize,
    /// Always order / 2
    delay: usize,
    /// Always order + 1
    impulse_length: usize,
    gain: f64,
    coefficients: Vec<f64>,
}

impl LowPassFilter {
    /// Design a filter of even `order` with its corner at `corner_frequency` Hz.
    ///
    /// The ideal brick-wall response is built at `fft_frame_size` bins,
    /// inverse-transformed, truncated to `order + 1` taps around zero delay and
    /// tapered with a Hamming window.
    pub fn new(
        order: usize,
        frame_rate: f64,
        corner_frequency: f64,
        fft_frame_size: usize,
    ) -> Result<Self> {
        if fft_frame_size == 0 {
            return Err(KeyFinderError::InvalidConfig(
                "low-pass FFT frame size must be > 0".to_string(),
            ));
        }
        if order % 2 != 0 {
            return Err(KeyFinderError::OddFilterOrder(order));
        }
        if order > fft_frame_size / 4 {
            return Err(KeyFinderError::FilterOrderTooLarge { order, fft_frame_size });
        }
        if !(corner_frequency > 0.0 && corner_frequency.is_finite()) || !(frame_rate >= 1.0) {
            return Err(KeyFinderError::InvalidConfig(format!(
                "low-pass corner {} Hz at frame rate {} Hz",
                corner_frequency, frame_rate
            )));
        }

        let delay = order / 2;
        let impulse_length = order + 1;
        let cutoff_point = corner_frequency / frame_rate;

        let mut ifft = InverseFftAdapter::new(fft_frame_size);
        let tau = 0.5 / cutoff_point;
        for i in 0..fft_frame_size / 2 {
            let value = if i as f64 / fft_frame_size as f64 <= cutoff_point {
                tau
            } else {
                0.0
            };
            ifft.set_input(i, value, 0.0)?;
            ifft.set_input(fft_frame_size - i - 1, value, 0.0)?;
        }
        ifft.execute();

        let mut coefficients = Vec::with_capacity(impulse_length);
        let mut gain = 0.0;
        for i in 0..impulse_length {
            // Taps either side of zero delay sit at the two ends of the IFFT output
            let index = (fft_frame_size - delay + i) % fft_frame_size;
            let coefficient =
                ifft.output(index)? * window(WindowType::Hamming, i, impulse_length);
            gain += coefficient;
            coefficients.push(coefficient);
        }

        Ok(Self {
            order,
            delay,
            impulse_length,
            gain,
            coefficients,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Sum of the windowed coefficients; inputs are divided by it before filtering.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Filter mono `audio` in place.
    ///
    /// Only every `shortcut_factor`-th output sample is computed, written at
    /// positions `0, f, 2f, ...`; the samples in between are left as they were
    /// and are expected to be dropped by a following `downsample(f)`.
    pub fn filter(
        &self,
        audio: &mut AudioData,
        workspace: &mut Workspace,
        shortcut_factor: usize,
    ) -> Result<()> {
        if audio.channels() > 1 {
            return Err(KeyFinderError::NotMonophonic { channels: audio.channels() });
        }
        if shortcut_factor == 0 {
            return Err(KeyFinderError::InvalidConfig(
                "filter shortcut factor must be > 0".to_string(),
            ));
        }

        let buffer = workspace
            .lpf_delay_line
            .get_or_insert_with(|| vec![0.0; self.impulse_length]);
        if buffer.len() != self.impulse_length {
            buffer.resize(self.impulse_length, 0.0);
        }
        buffer.iter_mut().for_each(|v| *v = 0.0);

        let sample_count = audio.sample_count();
        let mut read = Cursor::default();
        let mut write = Cursor::default();
        let mut buffer_front = 0;

        // Run past the end of the input by the group delay so it is fully flushed
        for in_sample in 0..sample_count + self.delay {
            let buffer_back = buffer_front;
            buffer_front += 1;
            if buffer_front == buffer.len() {
                buffer_front = 0;
            }

            if read.within(audio) {
                buffer[buffer_back] = audio.sample_at(&read) / self.gain;
                read.advance(1);
            } else {
                buffer[buffer_back] = 0.0;
            }

            let Some(out_sample) = in_sample.checked_sub(self.delay) else {
                continue;
            };
            if out_sample % shortcut_factor > 0 {
                continue;
            }

            let (newer, older) = buffer.split_at(buffer_front);
            let sum: f64 = self
                .coefficients
                .iter()
                .zip(older.iter().chain(newer.iter()))
                .map(|(c, x)| c * x)
                .sum();

            audio.set_sample_at(&write, sum)?;
            write.advance(shortcut_factor);
        }
        Ok(())
    }
}
