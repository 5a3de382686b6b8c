// src/core/analysis/tone_profile.rs
//
// Reference chroma profile with constant-time rotation by semitone offset.

use crate::core::tables::{BANDS, OCTAVES, SEMITONES};
use crate::error::{KeyFinderError, Result};

/// Profiles are stored tonic first; band 0 of a chroma vector is C, and
/// offset 0 is A, three semitones below.
const TONIC_OFFSET: usize = 3;

/// Six octaves of twelve profile weights.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneProfile {
    octaves: [[f64; SEMITONES]; OCTAVES],
}

impl ToneProfile {
    /// Build from a 72-value profile laid out octave by octave.
    pub fn new(profile: &[f64]) -> Result<Self> {
        if profile.len() != BANDS {
            return Err(KeyFinderError::LengthMismatch {
                what: "tone profile",
                expected: BANDS,
                actual: profile.len(),
            });
        }
        let mut octaves = [[0.0; SEMITONES]; OCTAVES];
        for (octave, chunk) in octaves.iter_mut().zip(profile.chunks_exact(SEMITONES)) {
            octave.copy_from_slice(chunk);
        }
        Ok(Self { octaves })
    }

    /// All-zero profile; scores 0 against everything.
    pub fn silence() -> Self {
        Self {
            octaves: [[0.0; SEMITONES]; OCTAVES],
        }
    }

    /// Cosine similarity between `input` and this profile transposed up by
    /// `offset` semitones. Zero when either side has no energy.
    pub fn cosine_similarity(&self, input: &[f64], offset: usize) -> Result<f64> {
        if input.len() != BANDS {
            return Err(KeyFinderError::LengthMismatch {
                what: "chroma vector",
                expected: BANDS,
                actual: input.len(),
            });
        }

        let start = (TONIC_OFFSET + SEMITONES - offset % SEMITONES) % SEMITONES;
        let mut intersection = 0.0;
        let mut profile_norm = 0.0;
        let mut input_norm = 0.0;

        for (octave, values) in self.octaves.iter().zip(input.chunks_exact(SEMITONES)) {
            for (i, &x) in values.iter().enumerate() {
                let p = octave[(start + i) % SEMITONES];
                intersection += x * p;
                profile_norm += p * p;
                input_norm += x * x;
            }
        }

        if profile_norm > 0.0 && input_norm > 0.0 {
            Ok(intersection / (profile_norm.sqrt() * input_norm.sqrt()))
        } else {
            Ok(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tables::tone_profile_major;

    /// A chroma vector whose tonic falls on band `tonic` (0 = C).
    fn rotated(profile: &[f64], tonic: usize) -> Vec<f64> {
        let mut out = vec![0.0; BANDS];
        for o in 0..OCTAVES {
            for i in 0..SEMITONES {
                out[o * SEMITONES + (i + tonic) % SEMITONES] = profile[o * SEMITONES + i];
            }
        }
        out
    }

    #[test]
    fn test_self_similarity_at_matching_offset() {
        let major = tone_profile_major();
        let profile = ToneProfile::new(&major).unwrap();
        // Offset k means the tonic is k semitones above A, which is band 9
        for k in 0..SEMITONES {
            let input = rotated(&major, (9 + k) % SEMITONES);
            let score = profile.cosine_similarity(&input, k).unwrap();
            assert!((score - 1.0).abs() < 1e-12, "offset {}", k);
            let other = profile.cosine_similarity(&input, (k + 1) % SEMITONES).unwrap();
            assert!(other < score);
        }
    }

    #[test]
    fn test_zero_norms_give_zero() {
        let profile = ToneProfile::silence();
        assert_eq!(profile.cosine_similarity(&vec![1.0; BANDS], 0).unwrap(), 0.0);
        let major = ToneProfile::new(&tone_profile_major()).unwrap();
        assert_eq!(major.cosine_similarity(&vec![0.0; BANDS], 4).unwrap(), 0.0);
    }

    #[test]
    fn test_length_checks() {
        assert!(matches!(
            ToneProfile::new(&[1.0; 12]),
            Err(KeyFinderError::LengthMismatch { expected: 72, actual: 12, .. })
        ));
        let profile = ToneProfile::silence();
        assert!(profile.cosine_similarity(&[0.0; 71], 0).is_err());
    }
}
