//! Chroma analysis and key classification
//!
//! - Chroma transform (FFT magnitudes to 72 semitone bands)
//! - Chromagram storage
//! - Hop-windowed spectrum analysis
//! - Tone profiles and the cosine-similarity key classifier

mod chroma;
mod chromagram;
mod classifier;
mod spectrum;
mod tone_profile;

pub use chroma::ChromaTransform;
pub use chromagram::Chromagram;
pub use classifier::KeyClassifier;
pub use spectrum::SpectrumAnalyser;
pub use tone_profile::ToneProfile;
