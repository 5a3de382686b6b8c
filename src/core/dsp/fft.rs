//! Frame-oriented adapters over the DFT engine

use num_complex::Complex64;

use super::dft;
use crate::error::{KeyFinderError, Result};

/// Forward transform of one real frame, exposing per-bin output.
#[derive(Debug, Clone)]
pub struct FftAdapter {
    frame_size: usize,
    input: Vec<f64>,
    output: Vec<Complex64>,
}

impl FftAdapter {
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size,
            input: vec![0.0; frame_size],
            output: vec![Complex64::new(0.0, 0.0); frame_size],
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn set_input(&mut self, index: usize, value: f64) -> Result<()> {
        self.check_bounds(index)?;
        if !value.is_finite() {
            return Err(KeyFinderError::NonFinite { what: "FFT input", index });
        }
        self.input[index] = value;
        Ok(())
    }

    /// Transform the current input; results stay cached until the next call.
    pub fn execute(&mut self) {
        self.output = dft::execute(&self.input);
    }

    pub fn real(&self, index: usize) -> Result<f64> {
        self.check_bounds(index)?;
        Ok(self.output[index].re)
    }

    pub fn imag(&self, index: usize) -> Result<f64> {
        self.check_bounds(index)?;
        Ok(self.output[index].im)
    }

    pub fn magnitude(&self, index: usize) -> Result<f64> {
        self.check_bounds(index)?;
        let bin = self.output[index];
        Ok((bin.re * bin.re + bin.im * bin.im).sqrt())
    }

    fn check_bounds(&self, index: usize) -> Result<()> {
        if index >= self.frame_size {
            return Err(KeyFinderError::out_of_bounds("FFT bin", index, self.frame_size));
        }
        Ok(())
    }
}

/// Inverse transform of one complex frame. Normalisation by frame size happens on output.
#[derive(Debug, Clone)]
pub struct InverseFftAdapter {
    frame_size: usize,
    input: Vec<Complex64>,
    output: Vec<f64>,
}

impl InverseFftAdapter {
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size,
            input: vec![Complex64::new(0.0, 0.0); frame_size],
            output: vec![0.0; frame_size],
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn set_input(&mut self, index: usize, real: f64, imag: f64) -> Result<()> {
        self.check_bounds(index)?;
        if !real.is_finite() || !imag.is_finite() {
            return Err(KeyFinderError::NonFinite { what: "inverse FFT input", index });
        }
        self.input[index] = Complex64::new(real, imag);
        Ok(())
    }

    pub fn execute(&mut self) {
        self.output = dft::execute_inverse(&self.input);
    }

    pub fn output(&self, index: usize) -> Result<f64> {
        self.check_bounds(index)?;
        Ok(self.output[index] / self.frame_size as f64)
    }

    fn check_bounds(&self, index: usize) -> Result<()> {
        if index >= self.frame_size {
            return Err(KeyFinderError::out_of_bounds("inverse FFT bin", index, self.frame_size));
        }
        Ok(())
    }
}
