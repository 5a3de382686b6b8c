//! Digital Signal Processing utilities

pub mod dft;
mod fft;
mod filters;
pub mod windows;

pub use fft::{FftAdapter, InverseFftAdapter};
pub use filters::LowPassFilter;
pub use windows::{create_window, WindowType};
