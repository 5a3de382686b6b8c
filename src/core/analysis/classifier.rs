// src/core/analysis/classifier.rs
//
// Cosine-similarity key classification against major and minor profiles.

use super::tone_profile::ToneProfile;
use crate::core::tables::{BANDS, SEMITONES};
use crate::detection::{Key, Mode};
use crate::error::{KeyFinderError, Result};

/// Scores a chroma vector against all 24 transpositions of two profiles.
#[derive(Debug, Clone)]
pub struct KeyClassifier {
    major: ToneProfile,
    minor: ToneProfile,
    silence: ToneProfile,
}

impl KeyClassifier {
    /// Both profiles must hold 72 values, tonic first in each octave.
    pub fn new(major_profile: &[f64], minor_profile: &[f64]) -> Result<Self> {
        Ok(Self {
            major: ToneProfile::new(major_profile)?,
            minor: ToneProfile::new(minor_profile)?,
            silence: ToneProfile::silence(),
        })
    }

    /// Similarity of `chroma` to every key, in classifier order.
    pub fn scores(&self, chroma: &[f64]) -> Result<Vec<(Key, f64)>> {
        check_length(chroma)?;
        let mut scores = Vec::with_capacity(SEMITONES * 2);
        for offset in 0..SEMITONES {
            scores.push((
                Key::from_tonic(offset, Mode::Major),
                self.major.cosine_similarity(chroma, offset)?,
            ));
            scores.push((
                Key::from_tonic(offset, Mode::Minor),
                self.minor.cosine_similarity(chroma, offset)?,
            ));
        }
        Ok(scores)
    }

    /// Best-scoring key with its score. Silence wins unless some key scores
    /// strictly higher; ties go to the earlier key.
    pub fn best_match(&self, chroma: &[f64]) -> Result<(Key, f64)> {
        let scores = self.scores(chroma)?;
        self.best_of(chroma, &scores)
    }

    /// Winner among `scores` already computed by [`scores`](Self::scores)
    /// for the same `chroma`.
    pub fn best_of(&self, chroma: &[f64], scores: &[(Key, f64)]) -> Result<(Key, f64)> {
        let mut best = (Key::Silence, self.silence.cosine_similarity(chroma, 0)?);
        for &(key, score) in scores {
            if score > best.1 {
                best = (key, score);
            }
        }
        Ok(best)
    }

    pub fn classify(&self, chroma: &[f64]) -> Result<Key> {
        self.best_match(chroma).map(|(key, _)| key)
    }
}

fn check_length(chroma: &[f64]) -> Result<()> {
    if chroma.len() != BANDS {
        return Err(KeyFinderError::LengthMismatch {
            what: "chroma vector",
            expected: BANDS,
            actual: chroma.len(),
        });
    }
    Ok(())
}
