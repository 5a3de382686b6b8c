// src/core/audio.rs
//
// Interleaved PCM sample buffer plus explicit read/write cursors used by the
// streaming filter and the spectrum analyser.

use crate::error::{KeyFinderError, Result};

/// Container for interleaved floating-point samples.
///
/// A default-constructed buffer is unconfigured (0 channels, frame rate 0)
/// and adopts the format of the first buffer appended or prepended to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioData {
    samples: Vec<f64>,
    channels: usize,
    /// Frames per second. Fractional after decimation (e.g. 48000 / 11).
    frame_rate: f64,
}

/// How `downsample_with` reduces each block of `factor` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownsampleMode {
    /// Keep the first sample of each block. Only valid after low-pass filtering.
    #[default]
    Decimate,
    /// Mean of each block.
    Average,
}

/// Position within a sample buffer, by absolute sample index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
}

impl Cursor {
    pub fn new(position: usize) -> Self {
        Self { position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn advance(&mut self, by: usize) {
        self.position += by;
    }

    pub fn within(&self, audio: &AudioData) -> bool {
        self.position < audio.sample_count()
    }
}

impl AudioData {
    pub fn new(channels: usize, frame_rate: f64) -> Result<Self> {
        let mut audio = Self::default();
        audio.set_channels(channels)?;
        audio.set_frame_rate(frame_rate)?;
        Ok(audio)
    }

    /// Wrap interleaved samples. The sample count must be a whole number of frames.
    pub fn from_samples(samples: Vec<f64>, channels: usize, frame_rate: f64) -> Result<Self> {
        let mut audio = Self::new(channels, frame_rate)?;
        if samples.len() % channels != 0 {
            return Err(KeyFinderError::LengthMismatch {
                what: "interleaved sample",
                expected: samples.len() - samples.len() % channels + channels,
                actual: samples.len(),
            });
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(KeyFinderError::NonFinite { what: "sample", index });
        }
        audio.samples = samples;
        Ok(audio)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn set_channels(&mut self, channels: usize) -> Result<()> {
        if channels < 1 {
            return Err(KeyFinderError::InvalidConfig(
                "channel count must be > 0".to_string(),
            ));
        }
        self.channels = channels;
        Ok(())
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn set_frame_rate(&mut self, frame_rate: f64) -> Result<()> {
        if !frame_rate.is_finite() || frame_rate < 1.0 {
            return Err(KeyFinderError::InvalidConfig(format!(
                "frame rate must be >= 1 Hz, got {}",
                frame_rate
            )));
        }
        self.frame_rate = frame_rate;
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.channels > 0
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.frame_rate > 0.0 {
            self.frame_count() as f64 / self.frame_rate
        } else {
            0.0
        }
    }

    pub fn sample(&self, index: usize) -> Result<f64> {
        self.samples
            .get(index)
            .copied()
            .ok_or_else(|| KeyFinderError::out_of_bounds("sample", index, self.samples.len()))
    }

    pub fn set_sample(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.samples.len();
        let slot = self
            .samples
            .get_mut(index)
            .ok_or_else(|| KeyFinderError::out_of_bounds("sample", index, len))?;
        if !value.is_finite() {
            return Err(KeyFinderError::NonFinite { what: "sample", index });
        }
        *slot = value;
        Ok(())
    }

    pub fn sample_by_frame(&self, frame: usize, channel: usize) -> Result<f64> {
        self.check_frame(frame, channel)?;
        self.sample(frame * self.channels + channel)
    }

    pub fn set_sample_by_frame(&mut self, frame: usize, channel: usize, value: f64) -> Result<()> {
        self.check_frame(frame, channel)?;
        self.set_sample(frame * self.channels + channel, value)
    }

    fn check_frame(&self, frame: usize, channel: usize) -> Result<()> {
        if frame >= self.frame_count() {
            return Err(KeyFinderError::out_of_bounds("frame", frame, self.frame_count()));
        }
        if channel >= self.channels {
            return Err(KeyFinderError::out_of_bounds("channel", channel, self.channels));
        }
        Ok(())
    }

    /// Sample under the cursor, or silence once the cursor is past the end.
    pub fn sample_at(&self, cursor: &Cursor) -> f64 {
        self.samples.get(cursor.position).copied().unwrap_or(0.0)
    }

    pub fn set_sample_at(&mut self, cursor: &Cursor, value: f64) -> Result<()> {
        self.set_sample(cursor.position, value)
    }

    pub fn append(&mut self, other: &AudioData) -> Result<()> {
        self.adopt_format(other)?;
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    pub fn prepend(&mut self, other: &AudioData) -> Result<()> {
        self.adopt_format(other)?;
        let mut samples = Vec::with_capacity(other.samples.len() + self.samples.len());
        samples.extend_from_slice(&other.samples);
        samples.append(&mut self.samples);
        self.samples = samples;
        Ok(())
    }

    fn adopt_format(&mut self, other: &AudioData) -> Result<()> {
        if self.channels == 0 && self.frame_rate == 0.0 {
            self.channels = other.channels;
            self.frame_rate = other.frame_rate;
        }
        if other.channels != self.channels {
            return Err(KeyFinderError::ChannelMismatch {
                expected: self.channels,
                actual: other.channels,
            });
        }
        if other.frame_rate != self.frame_rate {
            return Err(KeyFinderError::FrameRateMismatch {
                expected: self.frame_rate,
                actual: other.frame_rate,
            });
        }
        Ok(())
    }

    /// Zero-pad the buffer by `count` samples.
    pub fn add_to_sample_count(&mut self, count: usize) {
        self.samples.resize(self.samples.len() + count, 0.0);
    }

    pub fn add_to_frame_count(&mut self, frames: usize) -> Result<()> {
        if self.channels < 1 {
            return Err(KeyFinderError::InvalidConfig(
                "channel count must be > 0".to_string(),
            ));
        }
        self.add_to_sample_count(frames * self.channels);
        Ok(())
    }

    /// Replace each frame by the mean of its channels.
    pub fn reduce_to_mono(&mut self) {
        if self.channels < 2 {
            return;
        }
        let channels = self.channels;
        self.samples = self
            .samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64)
            .collect();
        self.channels = 1;
    }

    /// Keep every `factor`-th sample. Strictly for use after low-pass filtering.
    pub fn downsample(&mut self, factor: usize) -> Result<()> {
        self.downsample_with(factor, DownsampleMode::Decimate)
    }

    pub fn downsample_with(&mut self, factor: usize, mode: DownsampleMode) -> Result<()> {
        if factor == 0 {
            return Err(KeyFinderError::InvalidConfig(
                "downsample factor must be > 0".to_string(),
            ));
        }
        if factor == 1 {
            return Ok(());
        }
        if self.channels > 1 {
            return Err(KeyFinderError::NotMonophonic { channels: self.channels });
        }
        self.samples = match mode {
            DownsampleMode::Decimate => self.samples.iter().step_by(factor).copied().collect(),
            // A short final block is averaged over the samples it actually has.
            DownsampleMode::Average => self
                .samples
                .chunks(factor)
                .map(|block| block.iter().sum::<f64>() / block.len() as f64)
                .collect(),
        };
        self.set_frame_rate(self.frame_rate / factor as f64)
    }

    pub fn discard_frames_from_front(&mut self, frames: usize) -> Result<()> {
        if frames > self.frame_count() {
            return Err(KeyFinderError::out_of_bounds(
                "discard frame count",
                frames,
                self.frame_count(),
            ));
        }
        self.samples.drain(..frames * self.channels);
        Ok(())
    }

    /// Remove the last `count` samples and return them as a new buffer in the same format.
    pub fn slice_from_back(&mut self, count: usize) -> Result<AudioData> {
        if count > self.samples.len() {
            return Err(KeyFinderError::out_of_bounds(
                "slice sample count",
                count,
                self.samples.len(),
            ));
        }
        let keep = self.samples.len() - count;
        Ok(AudioData {
            samples: self.samples.split_off(keep),
            channels: self.channels,
            frame_rate: self.frame_rate,
        })
    }
}
