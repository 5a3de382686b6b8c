// src/core/analysis/spectrum.rs
//
// Hop-windowed spectrum analysis producing a chromagram from mono audio.

use std::sync::Arc;

use log::trace;

use super::chroma::ChromaTransform;
use super::chromagram::Chromagram;
use crate::core::audio::{AudioData, Cursor};
use crate::core::dsp::FftAdapter;
use crate::error::{KeyFinderError, Result};

/// Frames audio at a fixed hop, windows each frame and projects it to chroma.
#[derive(Debug, Clone)]
pub struct SpectrumAnalyser {
    chroma_transform: Arc<ChromaTransform>,
    window: Arc<Vec<f64>>,
    hop_size: usize,
}

impl SpectrumAnalyser {
    /// `window` must be as long as the FFT frames it will be applied to.
    pub fn new(chroma_transform: Arc<ChromaTransform>, window: Arc<Vec<f64>>, hop_size: usize) -> Result<Self> {
        if hop_size == 0 {
            return Err(KeyFinderError::InvalidConfig("hop size must be > 0".to_string()));
        }
        if window.len() != chroma_transform.fft_frame_size() {
            return Err(KeyFinderError::LengthMismatch {
                what: "temporal window",
                expected: chroma_transform.fft_frame_size(),
                actual: window.len(),
            });
        }
        Ok(Self {
            chroma_transform,
            window,
            hop_size,
        })
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Analyse every complete frame in `audio`. Trailing samples that do not
    /// fill a frame are left for the caller to carry over.
    pub fn chromagram_of_whole_frames(&self, audio: &AudioData, adapter: &mut FftAdapter) -> Result<Chromagram> {
        if audio.channels() != 1 {
            return Err(KeyFinderError::NotMonophonic { channels: audio.channels() });
        }
        let frame_size = adapter.frame_size();
        if frame_size != self.window.len() {
            return Err(KeyFinderError::LengthMismatch {
                what: "FFT frame",
                expected: self.window.len(),
                actual: frame_size,
            });
        }

        let sample_count = audio.sample_count();
        if sample_count < frame_size {
            return Ok(Chromagram::new(0));
        }

        let hops = 1 + (sample_count - frame_size) / self.hop_size;
        let mut chromagram = Chromagram::new(hops);

        for hop in 0..hops {
            let mut read = Cursor::new(hop * self.hop_size);
            for (sample, w) in self.window.iter().enumerate() {
                adapter.set_input(sample, audio.sample_at(&read) * w)?;
                read.advance(1);
            }
            adapter.execute();

            let chroma = self.chroma_transform.chroma_vector(adapter)?;
            for (band, magnitude) in chroma.into_iter().enumerate() {
                chromagram.set_magnitude(hop, band, magnitude)?;
            }
            trace!("analysed hop {}/{}", hop + 1, hops);
        }
        Ok(chromagram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dsp::windows::{create_window, WindowType};
    use std::f64::consts::PI;

    const RATE: f64 = 44100.0 / 11.0;

    fn analyser(frame: usize, hop: usize) -> SpectrumAnalyser {
        let transform = Arc::new(ChromaTransform::new(RATE, frame, 0.8).unwrap());
        let window = Arc::new(create_window(frame, WindowType::Blackman));
        SpectrumAnalyser::new(transform, window, hop).unwrap()
    }

    #[test]
    fn test_hop_count() {
        let analyser = analyser(16384, 4096);
        let mut adapter = FftAdapter::new(16384);

        let short = AudioData::from_samples(vec![0.0; 16383], 1, RATE).unwrap();
        assert_eq!(analyser.chromagram_of_whole_frames(&short, &mut adapter).unwrap().hops(), 0);

        let exact = AudioData::from_samples(vec![0.0; 16384], 1, RATE).unwrap();
        assert_eq!(analyser.chromagram_of_whole_frames(&exact, &mut adapter).unwrap().hops(), 1);

        let longer = AudioData::from_samples(vec![0.0; 16384 + 4096 * 2 + 4095], 1, RATE).unwrap();
        assert_eq!(analyser.chromagram_of_whole_frames(&longer, &mut adapter).unwrap().hops(), 3);
    }

    #[test]
    fn test_tone_dominates_every_hop() {
        let analyser = analyser(16384, 4096);
        let mut adapter = FftAdapter::new(16384);
        let samples: Vec<f64> = (0..16384 + 4096)
            .map(|i| (2.0 * PI * 220.0 * i as f64 / RATE).sin())
            .collect();
        let audio = AudioData::from_samples(samples, 1, RATE).unwrap();

        let chromagram = analyser.chromagram_of_whole_frames(&audio, &mut adapter).unwrap();
        assert_eq!(chromagram.hops(), 2);
        for row in chromagram.rows() {
            let loudest = (0..row.len()).max_by(|&a, &b| row[a].total_cmp(&row[b]));
            assert_eq!(loudest, Some(33));
        }
    }

    #[test]
    fn test_rejects_stereo_and_mismatched_frames() {
        let analyser = analyser(16384, 4096);
        let stereo = AudioData::from_samples(vec![0.0; 40000], 2, RATE).unwrap();
        let mut adapter = FftAdapter::new(16384);
        assert!(matches!(
            analyser.chromagram_of_whole_frames(&stereo, &mut adapter),
            Err(KeyFinderError::NotMonophonic { channels: 2 })
        ));

        let mono = AudioData::from_samples(vec![0.0; 40000], 1, RATE).unwrap();
        let mut small = FftAdapter::new(8192);
        assert!(analyser.chromagram_of_whole_frames(&mono, &mut small).is_err());
    }
}
