//! Core signal path: buffers, DSP, chroma analysis and the key finder

pub mod analysis;
pub mod audio;
pub mod cache;
pub mod decoder;
pub mod dsp;
mod key_finder;
pub mod tables;
pub mod workspace;

pub use audio::{AudioData, Cursor, DownsampleMode};
pub use decoder::{decode_audio, DecodedAudio};
pub use key_finder::KeyFinder;
pub use workspace::{SessionState, Workspace};
