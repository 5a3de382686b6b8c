//! keyfinder - Estimate the musical key of audio recordings
//!
//! Audio is reduced to mono, low-pass filtered and decimated, then framed
//! into Blackman-windowed FFTs whose magnitudes are mapped onto 72 semitone
//! bands (C1 to B6). The time-averaged chroma vector is compared against
//! major and minor tone profiles at all twelve transpositions; the best
//! cosine similarity wins.
//!
//! ## Features
//!
//! - **Whole-file or progressive analysis**: feed chunks of any size; the
//!   workspace carries leftover samples between calls
//! - **Self-contained DSP**: radix-2 and Bluestein FFTs, frequency-domain
//!   FIR design with fused decimation
//! - **Shared caches**: one `KeyFinder` serves many threads, each with its
//!   own `Workspace`
//! - **CLI**: batch analysis of files and directories with JSON output
//!
//! ## Module Structure
//!
//! - `core` - Sample buffers, DSP, chroma analysis and the key finder
//! - `cli` - Command-line interface
//! - `config` - Analysis parameters
//! - `detection` - Key labels and result types
//! - `error` - Error type shared by the library
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keyfinder::{AudioData, KeyFinder, Workspace};
//!
//! # fn main() -> keyfinder::Result<()> {
//! let finder = KeyFinder::new();
//! let audio = AudioData::from_samples(vec![0.0; 44100], 1, 44100.0)?;
//!
//! // Whole buffer at once
//! let key = finder.key_of_audio(&audio)?;
//! println!("{}", key);
//!
//! // Or chunk by chunk
//! let mut workspace = Workspace::new();
//! finder.progressive_chromagram(&audio, &mut workspace)?;
//! finder.final_chromagram(&mut workspace)?;
//! let key = finder.key_of_chromagram(&workspace)?;
//! # let _ = key;
//! # Ok(())
//! # }
//! ```

// Core analysis functionality
pub mod core;

// Command-line interface
pub mod cli;

// Analysis parameters
pub mod config;

// Key labels and result types
pub mod detection;

pub mod error;

// Re-export commonly used types at crate root for convenience
pub use config::{AnalysisConfig, ConfigBuilder};
pub use core::analysis::{Chromagram, KeyClassifier};
pub use core::{AudioData, Cursor, KeyFinder, SessionState, Workspace};
pub use detection::{Confidence, FileReport, Key, KeyEstimate, Mode};
pub use error::{KeyFinderError, Result};
