//! Musical key labels

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::tables::KEYS;

/// Major or minor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

/// One of the 24 major/minor keys, or silence.
///
/// Discriminants follow classifier score order: keys ascend by semitone from
/// A, major before minor, so `index / 2` is the tonic's distance above A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Key {
    AMajor = 0,
    AMinor,
    BFlatMajor,
    BFlatMinor,
    BMajor,
    BMinor,
    CMajor,
    CMinor,
    DFlatMajor,
    DFlatMinor,
    DMajor,
    DMinor,
    EFlatMajor,
    EFlatMinor,
    EMajor,
    EMinor,
    FMajor,
    FMinor,
    GFlatMajor,
    GFlatMinor,
    GMajor,
    GMinor,
    AFlatMajor,
    AFlatMinor,
    Silence = 24,
}

const ALL_KEYS: [Key; KEYS + 1] = [
    Key::AMajor,
    Key::AMinor,
    Key::BFlatMajor,
    Key::BFlatMinor,
    Key::BMajor,
    Key::BMinor,
    Key::CMajor,
    Key::CMinor,
    Key::DFlatMajor,
    Key::DFlatMinor,
    Key::DMajor,
    Key::DMinor,
    Key::EFlatMajor,
    Key::EFlatMinor,
    Key::EMajor,
    Key::EMinor,
    Key::FMajor,
    Key::FMinor,
    Key::GFlatMajor,
    Key::GFlatMinor,
    Key::GMajor,
    Key::GMinor,
    Key::AFlatMajor,
    Key::AFlatMinor,
    Key::Silence,
];

/// Note names by semitones above A
const NOTE_NAMES: [&str; 12] = [
    "A", "Bb", "B", "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab",
];

impl Key {
    /// Key for a classifier index (0..=24); `None` past silence.
    pub fn from_index(index: usize) -> Option<Self> {
        ALL_KEYS.get(index).copied()
    }

    /// Major or minor key whose tonic is `semitones_above_a` above A.
    pub fn from_tonic(semitones_above_a: usize, mode: Mode) -> Self {
        let base = (semitones_above_a % 12) * 2;
        match mode {
            Mode::Major => ALL_KEYS[base],
            Mode::Minor => ALL_KEYS[base + 1],
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The 24 tonal keys, in classifier order.
    pub fn all() -> &'static [Key] {
        &ALL_KEYS[..KEYS]
    }

    pub fn is_silence(self) -> bool {
        self == Key::Silence
    }

    pub fn mode(self) -> Option<Mode> {
        match self {
            Key::Silence => None,
            key if key.index() % 2 == 0 => Some(Mode::Major),
            _ => Some(Mode::Minor),
        }
    }

    /// Tonic as semitones above A.
    pub fn tonic(self) -> Option<usize> {
        (!self.is_silence()).then(|| self.index() / 2)
    }

    /// Tonic as a pitch class with C = 0.
    pub fn pitch_class(self) -> Option<usize> {
        self.tonic().map(|t| (t + 9) % 12)
    }

    /// The relative major or minor sharing this key signature.
    pub fn relative(self) -> Self {
        match (self.tonic(), self.mode()) {
            (Some(t), Some(Mode::Major)) => Key::from_tonic(t + 9, Mode::Minor),
            (Some(t), Some(Mode::Minor)) => Key::from_tonic(t + 3, Mode::Major),
            _ => Key::Silence,
        }
    }

    /// Long form, e.g. "F# minor" is written "Gb minor".
    pub fn name(self) -> String {
        match (self.tonic(), self.mode()) {
            (Some(t), Some(Mode::Major)) => format!("{} major", NOTE_NAMES[t]),
            (Some(t), Some(Mode::Minor)) => format!("{} minor", NOTE_NAMES[t]),
            _ => "silence".to_string(),
        }
    }

    /// Compact form: "C", "Ebm", or "-" for silence.
    pub fn short_name(self) -> String {
        match (self.tonic(), self.mode()) {
            (Some(t), Some(Mode::Major)) => NOTE_NAMES[t].to_string(),
            (Some(t), Some(Mode::Minor)) => format!("{}m", NOTE_NAMES[t]),
            _ => "-".to_string(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
