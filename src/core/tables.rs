// src/core/tables.rs
//
// Fixed numeric tables: chroma band frequencies, reference key profiles and
// per-octave weights.

use crate::error::{KeyFinderError, Result};

pub const SEMITONES: usize = 12;
pub const OCTAVES: usize = 6;
pub const BANDS: usize = SEMITONES * OCTAVES;
pub const KEYS: usize = SEMITONES * 2;

/// Centre frequencies of the 72 chroma bands, C1 to B6 (equal temperament, A4 = 440 Hz).
const BAND_FREQUENCIES: [f64; BANDS] = [
    32.7031956625748, 34.647828872109, 36.708095989676, 38.8908729652601,
    41.2034446141088, 43.6535289291255, 46.2493028389543, 48.9994294977187,
    51.9130871974932, 55.0, 58.2704701897613, 61.7354126570155,
    65.4063913251497, 69.2956577442181, 73.4161919793519, 77.7817459305203,
    82.4068892282175, 87.307057858251, 92.4986056779087, 97.9988589954374,
    103.826174394986, 110.0, 116.540940379523, 123.470825314031,
    130.812782650299, 138.591315488436, 146.832383958704, 155.563491861041,
    164.813778456435, 174.614115716502, 184.997211355817, 195.997717990875,
    207.652348789973, 220.0, 233.081880759045, 246.941650628062,
    261.625565300599, 277.182630976872, 293.664767917408, 311.126983722081,
    329.62755691287, 349.228231433004, 369.994422711635, 391.99543598175,
    415.304697579946, 440.000000000001, 466.163761518091, 493.883301256125,
    523.251130601198, 554.365261953745, 587.329535834816, 622.253967444163,
    659.255113825741, 698.456462866009, 739.98884542327, 783.9908719635,
    830.609395159892, 880.000000000002, 932.327523036182, 987.76660251225,
    1046.5022612024, 1108.73052390749, 1174.65907166963, 1244.50793488833,
    1318.51022765148, 1396.91292573202, 1479.97769084654, 1567.981743927,
    1661.21879031978, 1760.0, 1864.65504607236, 1975.5332050245,
];

/// Major key profile, tonic first.
pub const MAJOR_PROFILE: [f64; SEMITONES] = [
    7.23900502618145225142,
    3.50351166725158691406,
    3.58445177536649417505,
    2.84511816478676315967,
    5.81898892118549859731,
    4.55865057415321039969,
    2.44778850545506543313,
    6.99473192146829525484,
    3.39106613673504853068,
    4.55614256655143456953,
    4.07392666663523606019,
    4.45932757378886890365,
];

/// Minor key profile, tonic first.
pub const MINOR_PROFILE: [f64; SEMITONES] = [
    7.00255045060284420089,
    3.14360279015996679775,
    4.35904319714962529275,
    5.40418120718934069657,
    3.67234420879306133756,
    4.08971184917797891956,
    3.90791435991553992579,
    6.19960288562316463867,
    3.63424625625277419871,
    2.87241191079875557435,
    5.35467999794542670600,
    3.83242038595048351013,
];

pub const OCTAVE_WEIGHTS: [f64; OCTAVES] = [
    0.39997267549999998559,
    0.55634425248300645173,
    0.52496636345143543600,
    0.60847548384277727607,
    0.59898115679999996974,
    0.49072435317960994006,
];

/// Centre frequency of a chroma band.
pub fn frequency_of_band(band: usize) -> Result<f64> {
    BAND_FREQUENCIES
        .get(band)
        .copied()
        .ok_or_else(|| KeyFinderError::out_of_bounds("band", band, BANDS))
}

/// Highest analysed frequency (B6).
pub fn last_frequency() -> f64 {
    BAND_FREQUENCIES[BANDS - 1]
}

pub fn band_frequencies() -> &'static [f64; BANDS] {
    &BAND_FREQUENCIES
}

/// 72-value major profile: the 12-value profile repeated per octave, scaled by octave weight.
pub fn tone_profile_major() -> Vec<f64> {
    weighted_profile(&MAJOR_PROFILE)
}

/// 72-value minor profile, weighted per octave.
pub fn tone_profile_minor() -> Vec<f64> {
    weighted_profile(&MINOR_PROFILE)
}

pub fn tone_profile_silence() -> Vec<f64> {
    vec![0.0; BANDS]
}

fn weighted_profile(profile: &[f64; SEMITONES]) -> Vec<f64> {
    OCTAVE_WEIGHTS
        .iter()
        .flat_map(|&weight| profile.iter().map(move |&value| weight * value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_frequencies_ascend_by_semitones() {
        let freqs = band_frequencies();
        for pair in freqs.windows(2) {
            let ratio = pair[1] / pair[0];
            assert!((ratio - 2f64.powf(1.0 / 12.0)).abs() < 1e-9);
        }
        assert_eq!(frequency_of_band(45).unwrap().round(), 440.0);
    }

    #[test]
    fn test_band_lookup_out_of_range() {
        assert!(matches!(
            frequency_of_band(BANDS),
            Err(KeyFinderError::OutOfBounds { index: 72, len: 72, .. })
        ));
    }

    #[test]
    fn test_weighted_profiles() {
        let major = tone_profile_major();
        assert_eq!(major.len(), BANDS);
        assert!((major[0] - OCTAVE_WEIGHTS[0] * MAJOR_PROFILE[0]).abs() < 1e-12);
        assert!((major[SEMITONES * 5 + 7] - OCTAVE_WEIGHTS[5] * MAJOR_PROFILE[7]).abs() < 1e-12);
        assert!(tone_profile_silence().iter().all(|&v| v == 0.0));
    }
}
