// tests/test_utils/mod.rs
//
// Signal generators and WAV fixtures shared by the integration tests.

#![allow(dead_code)]

use std::f64::consts::PI;
use std::path::PathBuf;
use std::process::Command;

use keyfinder::core::tables::{band_frequencies, MAJOR_PROFILE, MINOR_PROFILE, SEMITONES};
use keyfinder::AudioData;
use uuid::Uuid;

pub fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_keyfinder"))
}

/// Sum of equal-amplitude sines at the given frequencies.
pub fn sines(freqs: &[(f64, f64)], frames: usize, rate: f64) -> Vec<f64> {
    (0..frames)
        .map(|t| {
            freqs
                .iter()
                .map(|&(f, a)| a * (2.0 * PI * f * t as f64 / rate).sin())
                .sum()
        })
        .collect()
}

/// Root-position triad repeated over four octaves (C2 to B5).
/// `root_above_c` counts semitones up from C.
pub fn triad(root_above_c: usize, minor: bool, frames: usize, rate: f64) -> Vec<f64> {
    let third = if minor { 3 } else { 4 };
    let freqs = band_frequencies();
    let mut tones = Vec::new();
    for octave in 1..5 {
        for interval in [0, third, 7] {
            let band = octave * SEMITONES + (root_above_c + interval) % SEMITONES;
            tones.push((freqs[band], 0.1));
        }
    }
    sines(&tones, frames, rate)
}

/// Every band from C2 to B5, weighted by the tone profile of the key whose
/// tonic lies `semitones_above_a` above A.
pub fn profile_shaped(semitones_above_a: usize, minor: bool, frames: usize, rate: f64) -> Vec<f64> {
    let profile = if minor { MINOR_PROFILE } else { MAJOR_PROFILE };
    let freqs = band_frequencies();
    let tones: Vec<(f64, f64)> = (12..60)
        .map(|band| {
            let semitone = band % SEMITONES;
            let weight = profile[(semitone + 3 + SEMITONES - semitones_above_a) % SEMITONES];
            (freqs[band], weight / 10.0 * 0.02)
        })
        .collect();
    sines(&tones, frames, rate)
}

pub fn mono(samples: Vec<f64>, rate: f64) -> AudioData {
    AudioData::from_samples(samples, 1, rate).unwrap()
}

/// Interleave a mono signal into identical left and right channels.
pub fn stereo(samples: &[f64], rate: f64) -> AudioData {
    let interleaved = samples.iter().flat_map(|&s| [s, s]).collect();
    AudioData::from_samples(interleaved, 2, rate).unwrap()
}

/// Fresh scratch directory under the system temp dir.
pub fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("keyfinder-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a 16-bit PCM WAV, duplicating the signal across `channels`.
/// Samples are halved so the sum of partials never clips.
pub fn write_wav(path: &PathBuf, samples: &[f64], channels: u16, rate: u32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        let value = (s * 0.5 * i16::MAX as f64).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        for _ in 0..channels {
            writer.write_sample(value).unwrap();
        }
    }
    writer.finalize().unwrap();
}
