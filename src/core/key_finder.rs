// src/core/key_finder.rs
//
// Orchestrates preprocessing, spectral analysis and classification, either
// over a whole buffer or progressively across chunks held in a Workspace.

use log::debug;

use super::analysis::{Chromagram, KeyClassifier, SpectrumAnalyser};
use super::audio::AudioData;
use super::cache::{ChromaTransformCache, LowPassFilterCache, TemporalWindowCache};
use super::dsp::FftAdapter;
use super::tables;
use super::workspace::{SessionState, Workspace};
use crate::config::AnalysisConfig;
use crate::detection::{Key, KeyEstimate};
use crate::error::{KeyFinderError, Result};

/// Key estimator. Holds the analysis parameters and the caches of filters,
/// kernels and windows; per-session state lives in a [`Workspace`].
///
/// A `KeyFinder` may be shared between threads, each driving its own workspace.
#[derive(Debug, Default)]
pub struct KeyFinder {
    config: AnalysisConfig,
    lpf_cache: LowPassFilterCache,
    chroma_cache: ChromaTransformCache,
    window_cache: TemporalWindowCache,
}

impl KeyFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Key of a complete recording, analysed in one pass.
    pub fn key_of_audio(&self, audio: &AudioData) -> Result<Key> {
        Ok(self.analyse_audio(audio)?.key)
    }

    /// Key of a complete recording along with its score and mean chroma.
    pub fn analyse_audio(&self, audio: &AudioData) -> Result<KeyEstimate> {
        let mut workspace = Workspace::new();
        self.progressive_chromagram(audio, &mut workspace)?;
        self.final_chromagram(&mut workspace)?;
        self.estimate_of_chromagram(&workspace)
    }

    /// Same as [`analyse_audio`](Self::analyse_audio), but fed progressively
    /// in chunks of `frames_per_chunk` frames.
    pub fn analyse_in_chunks(&self, audio: &AudioData, frames_per_chunk: usize) -> Result<KeyEstimate> {
        if frames_per_chunk == 0 {
            return Err(KeyFinderError::InvalidConfig("chunk size must be > 0".to_string()));
        }
        let channels = audio.channels();
        let samples_per_chunk = frames_per_chunk.checked_mul(channels.max(1)).ok_or_else(|| {
            KeyFinderError::InvalidConfig(format!(
                "chunk of {} frames x {} channels is too large",
                frames_per_chunk, channels
            ))
        })?;
        let mut workspace = Workspace::new();
        for chunk in audio.samples().chunks(samples_per_chunk) {
            let chunk = AudioData::from_samples(chunk.to_vec(), channels, audio.frame_rate())?;
            self.progressive_chromagram(&chunk, &mut workspace)?;
        }
        self.final_chromagram(&mut workspace)?;
        self.estimate_of_chromagram(&workspace)
    }

    /// Feed the next chunk of a recording. Chunks may be any length; samples
    /// that do not divide evenly by the decimation factor are carried over to
    /// the next call.
    pub fn progressive_chromagram(&self, audio: &AudioData, workspace: &mut Workspace) -> Result<()> {
        if workspace.state == SessionState::Finalized {
            return Err(KeyFinderError::SessionFinalized);
        }
        // A rejected chunk must leave the carried-over samples untouched
        let saved_remainder = workspace.remainder.clone();
        if let Err(e) = self.buffer_chunk(audio, workspace) {
            workspace.remainder = saved_remainder;
            return Err(e);
        }
        workspace.state = SessionState::Accumulating;
        self.chromagram_of_buffered_audio(workspace)
    }

    fn buffer_chunk(&self, audio: &AudioData, workspace: &mut Workspace) -> Result<()> {
        let mut working = audio.clone();
        self.preprocess(&mut working, workspace, false)?;
        workspace.preprocessed.append(&working)
    }

    /// Flush the carried-over samples, zero-pad to a whole hop and analyse
    /// what is left. The workspace accepts no further chunks afterwards.
    pub fn final_chromagram(&self, workspace: &mut Workspace) -> Result<()> {
        if workspace.state == SessionState::Finalized {
            return Err(KeyFinderError::SessionFinalized);
        }

        if workspace.remainder.sample_count() > 0 {
            let mut flush = AudioData::default();
            self.preprocess(&mut flush, workspace, true)?;
            workspace.preprocessed.append(&flush)?;
        }

        let buffered = workspace.preprocessed.sample_count();
        if buffered > 0 {
            let hop = self.config.hop_size;
            let padded_hops = buffered.div_ceil(hop);
            let target = self.config.fft_frame_size + (padded_hops - 1) * hop;
            workspace.preprocessed.add_to_sample_count(target.saturating_sub(buffered));
        }

        if workspace.preprocessed.is_configured() {
            self.chromagram_of_buffered_audio(workspace)?;
        }
        workspace.state = SessionState::Finalized;
        debug!("session finalized with {} hops", workspace.hops());
        Ok(())
    }

    /// Classify the time-averaged chromagram accumulated in `workspace`.
    pub fn key_of_chromagram(&self, workspace: &Workspace) -> Result<Key> {
        Ok(self.estimate_of_chromagram(workspace)?.key)
    }

    pub fn key_of_chroma_vector(&self, chroma: &[f64]) -> Result<Key> {
        self.key_of_chroma_vector_with_profiles(
            chroma,
            &tables::tone_profile_major(),
            &tables::tone_profile_minor(),
        )
    }

    /// Classify against caller-supplied 72-value major and minor profiles.
    pub fn key_of_chroma_vector_with_profiles(&self, chroma: &[f64], major: &[f64], minor: &[f64]) -> Result<Key> {
        KeyClassifier::new(major, minor)?.classify(chroma)
    }

    /// Estimate from the chromagram accumulated in `workspace` so far.
    pub fn estimate_of_chromagram(&self, workspace: &Workspace) -> Result<KeyEstimate> {
        let chroma = workspace
            .chromagram
            .as_ref()
            .map(Chromagram::collapse_to_one_hop)
            .unwrap_or_else(|| vec![0.0; tables::BANDS]);
        let classifier = KeyClassifier::new(&tables::tone_profile_major(), &tables::tone_profile_minor())?;
        let scores = classifier.scores(&chroma)?;
        let (key, score) = classifier.best_of(&chroma, &scores)?;
        Ok(KeyEstimate {
            key,
            score,
            hops: workspace.hops(),
            scores,
            chroma,
        })
    }

    /// Mono-reduce, low-pass and decimate `audio` in place, absorbing any
    /// carried-over samples first and, unless flushing, holding back a new tail.
    fn preprocess(&self, audio: &mut AudioData, workspace: &mut Workspace, flush: bool) -> Result<()> {
        audio.reduce_to_mono();

        if workspace.remainder.is_configured() {
            audio.prepend(&workspace.remainder)?;
            let frames = workspace.remainder.frame_count();
            workspace.remainder.discard_frames_from_front(frames)?;
        }

        let last_frequency = tables::last_frequency();
        let lpf_cutoff = last_frequency * self.config.lpf_cutoff_margin;
        let ds_cutoff = last_frequency * self.config.downsample_cutoff_margin;
        let nyquist = audio.frame_rate() / 2.0;
        let factor = (nyquist / ds_cutoff).floor() as usize;
        if factor == 0 {
            return Err(KeyFinderError::AboveNyquist { frequency: ds_cutoff, nyquist });
        }

        let excess = audio.sample_count() % factor;
        if !flush && excess != 0 {
            let tail = audio.slice_from_back(excess)?;
            workspace.remainder.append(&tail)?;
        }

        let lpf = self.lpf_cache.get(
            self.config.lpf_order,
            audio.frame_rate(),
            lpf_cutoff,
            self.config.lpf_fft_frame_size,
        )?;
        lpf.filter(audio, workspace, factor)?;
        audio.downsample(factor)?;

        debug!(
            "preprocessed {} samples at {:.1} Hz (decimation {}, {} held back)",
            audio.sample_count(),
            audio.frame_rate(),
            factor,
            workspace.remainder.sample_count()
        );
        Ok(())
    }

    /// Analyse every whole frame buffered so far and drop the consumed hops.
    fn chromagram_of_buffered_audio(&self, workspace: &mut Workspace) -> Result<()> {
        let frame_size = self.config.fft_frame_size;
        let analyser = SpectrumAnalyser::new(
            self.chroma_cache.get(
                workspace.preprocessed.frame_rate(),
                frame_size,
                self.config.kernel_stretch,
            )?,
            self.window_cache.get(frame_size)?,
            self.config.hop_size,
        )?;

        let adapter = workspace
            .fft_adapter
            .get_or_insert_with(|| FftAdapter::new(frame_size));
        let chromagram = analyser.chromagram_of_whole_frames(&workspace.preprocessed, adapter)?;
        workspace
            .preprocessed
            .discard_frames_from_front(self.config.hop_size * chromagram.hops())?;

        debug!("analysed {} new hops", chromagram.hops());
        match workspace.chromagram.as_mut() {
            Some(existing) => existing.append(chromagram),
            None => workspace.chromagram = Some(chromagram),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, count: usize, rate: f64) -> AudioData {
        let samples = (0..count)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f64 / rate).sin())
            .collect();
        AudioData::from_samples(samples, 1, rate).unwrap()
    }

    #[test]
    fn test_key_finder_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KeyFinder>();
    }

    #[test]
    fn test_silence_and_empty_audio() {
        let finder = KeyFinder::new();
        let silent = AudioData::from_samples(vec![0.0; 44100 * 2], 1, 44100.0).unwrap();
        assert_eq!(finder.key_of_audio(&silent).unwrap(), Key::Silence);

        let empty = AudioData::new(1, 44100.0).unwrap();
        let estimate = finder.analyse_audio(&empty).unwrap();
        assert_eq!(estimate.key, Key::Silence);
        assert_eq!(estimate.hops, 0);
    }

    #[test]
    fn test_low_frame_rate_rejected() {
        let finder = KeyFinder::new();
        let audio = AudioData::from_samples(vec![0.0; 4000], 1, 4000.0).unwrap();
        assert!(matches!(
            finder.key_of_audio(&audio),
            Err(KeyFinderError::AboveNyquist { .. })
        ));
    }

    #[test]
    fn test_remainder_is_carried_over() {
        let finder = KeyFinder::new();
        let mut workspace = Workspace::new();
        // 44.1 kHz decimates by 10, so 1003 samples leave 3 behind
        finder.progressive_chromagram(&tone(440.0, 1003, 44100.0), &mut workspace).unwrap();
        assert_eq!(workspace.state(), SessionState::Accumulating);
        assert_eq!(workspace.remainder().sample_count(), 3);
        assert_eq!(workspace.preprocessed().sample_count(), 100);
        assert!((workspace.preprocessed().frame_rate() - 4410.0).abs() < 1e-9);

        finder.progressive_chromagram(&tone(440.0, 7, 44100.0), &mut workspace).unwrap();
        assert_eq!(workspace.remainder().sample_count(), 0);
        assert_eq!(workspace.preprocessed().sample_count(), 101);
    }

    #[test]
    fn test_final_chromagram_pads_to_a_whole_hop() {
        let finder = KeyFinder::new();
        let mut workspace = Workspace::new();
        // 20 s at 44.1 kHz is 88200 decimated samples: 18 whole hops, then
        // ceil(14472 / 4096) = 4 more from the padded tail
        finder.progressive_chromagram(&tone(440.0, 882_000, 44100.0), &mut workspace).unwrap();
        assert_eq!(workspace.hops(), 18);
        finder.final_chromagram(&mut workspace).unwrap();
        assert_eq!(workspace.hops(), 22);
        assert_eq!(workspace.state(), SessionState::Finalized);
    }

    #[test]
    fn test_finalized_session_rejects_more_audio() {
        let finder = KeyFinder::new();
        let mut workspace = Workspace::new();
        finder.progressive_chromagram(&tone(440.0, 22050, 44100.0), &mut workspace).unwrap();
        finder.final_chromagram(&mut workspace).unwrap();
        assert!(matches!(
            finder.progressive_chromagram(&tone(440.0, 22050, 44100.0), &mut workspace),
            Err(KeyFinderError::SessionFinalized)
        ));
        assert!(matches!(
            finder.final_chromagram(&mut workspace),
            Err(KeyFinderError::SessionFinalized)
        ));
    }

    #[test]
    fn test_mismatched_frame_rates_between_chunks() {
        let finder = KeyFinder::new();
        let mut workspace = Workspace::new();
        finder.progressive_chromagram(&tone(440.0, 4410, 44100.0), &mut workspace).unwrap();
        assert!(matches!(
            finder.progressive_chromagram(&tone(440.0, 4800, 48000.0), &mut workspace),
            Err(KeyFinderError::FrameRateMismatch { .. })
        ));
    }

    #[test]
    fn test_chunk_size_limits() {
        let finder = KeyFinder::new();
        let stereo = AudioData::from_samples(vec![0.0; 8820], 2, 44100.0).unwrap();
        assert!(matches!(
            finder.analyse_in_chunks(&stereo, 0),
            Err(KeyFinderError::InvalidConfig(_))
        ));
        assert!(matches!(
            finder.analyse_in_chunks(&stereo, usize::MAX),
            Err(KeyFinderError::InvalidConfig(_))
        ));
        let mono = tone(440.0, 4410, 44100.0);
        assert_eq!(
            finder.analyse_in_chunks(&mono, usize::MAX).unwrap(),
            finder.analyse_audio(&mono).unwrap()
        );
    }

    #[test]
    fn test_rejected_chunk_leaves_session_usable() {
        let finder = KeyFinder::new();

        // No samples held back when the bad chunk arrives
        let mut workspace = Workspace::new();
        finder.progressive_chromagram(&tone(440.0, 4410, 44100.0), &mut workspace).unwrap();
        assert!(finder.progressive_chromagram(&tone(440.0, 4800, 48000.0), &mut workspace).is_err());
        assert_eq!(workspace.remainder().sample_count(), 0);
        assert_eq!(workspace.preprocessed().sample_count(), 441);
        finder.progressive_chromagram(&tone(440.0, 4410, 44100.0), &mut workspace).unwrap();
        assert_eq!(workspace.preprocessed().sample_count(), 882);
        finder.final_chromagram(&mut workspace).unwrap();
        assert_eq!(workspace.hops(), 1);

        // Three samples held back when the bad chunk arrives
        let mut workspace = Workspace::new();
        finder.progressive_chromagram(&tone(440.0, 4413, 44100.0), &mut workspace).unwrap();
        assert!(matches!(
            finder.progressive_chromagram(&tone(440.0, 4800, 48000.0), &mut workspace),
            Err(KeyFinderError::FrameRateMismatch { .. })
        ));
        assert_eq!(workspace.remainder().sample_count(), 3);
        assert_eq!(workspace.remainder().frame_rate(), 44100.0);
        finder.progressive_chromagram(&tone(440.0, 4407, 44100.0), &mut workspace).unwrap();
        assert_eq!(workspace.remainder().sample_count(), 0);
        assert_eq!(workspace.preprocessed().sample_count(), 882);
        finder.final_chromagram(&mut workspace).unwrap();
        assert_eq!(workspace.state(), SessionState::Finalized);
        assert_eq!(workspace.hops(), 1);
    }

    #[test]
    fn test_chroma_vector_classification() {
        let finder = KeyFinder::new();
        assert_eq!(finder.key_of_chroma_vector(&[0.0; 72]).unwrap(), Key::Silence);
        assert!(finder.key_of_chroma_vector(&[0.0; 12]).is_err());

        // The minor profile placed on A matches itself exactly; a flat major profile scores lower
        let minor = tables::tone_profile_minor();
        let flat = vec![1.0; 72];
        let mut chroma = vec![0.0; 72];
        for o in 0..6 {
            for i in 0..12 {
                chroma[o * 12 + (i + 9) % 12] = minor[o * 12 + i];
            }
        }
        assert_eq!(
            finder.key_of_chroma_vector_with_profiles(&chroma, &flat, &minor).unwrap(),
            Key::AMinor
        );
    }

    #[test]
    fn test_with_config_validates() {
        let config = AnalysisConfig {
            lpf_order: 7,
            ..AnalysisConfig::default()
        };
        assert!(KeyFinder::with_config(config).is_err());
    }
}
