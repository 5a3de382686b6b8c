//! Discrete Fourier transform: radix-2 Cooley-Tukey for power-of-two lengths,
//! Bluestein's chirp-z transform for everything else.
//!
//! Neither direction scales its output. Callers wanting a true inverse divide
//! by the length themselves; `convolve_complex` does so at its boundary.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{KeyFinderError, Result};

/// Forward transform of a real frame.
pub fn execute(samples: &[f64]) -> Vec<Complex64> {
    let mut real = samples.to_vec();
    let mut imag = vec![0.0; samples.len()];
    transform_unchecked(&mut real, &mut imag);
    real.into_iter()
        .zip(imag)
        .map(|(re, im)| Complex64::new(re, im))
        .collect()
}

/// Unscaled inverse transform, real part only.
pub fn execute_inverse(spectrum: &[Complex64]) -> Vec<f64> {
    let mut real: Vec<f64> = spectrum.iter().map(|c| c.re).collect();
    let mut imag: Vec<f64> = spectrum.iter().map(|c| c.im).collect();
    transform_unchecked(&mut imag, &mut real);
    real
}

/// In-place forward DFT of the complex vector `(real, imag)`.
pub fn transform(real: &mut [f64], imag: &mut [f64]) -> Result<()> {
    check_lengths(real.len(), imag.len())?;
    transform_unchecked(real, imag);
    Ok(())
}

/// In-place inverse DFT without the 1/n scaling.
pub fn inverse_transform(real: &mut [f64], imag: &mut [f64]) -> Result<()> {
    transform(imag, real)
}

fn transform_unchecked(real: &mut [f64], imag: &mut [f64]) {
    let n = real.len();
    if n <= 1 {
        return;
    }
    if n.is_power_of_two() {
        transform_radix2(real, imag);
    } else {
        transform_bluestein(real, imag);
    }
}

fn check_lengths(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(KeyFinderError::LengthMismatch {
            what: "transform",
            expected,
            actual,
        });
    }
    Ok(())
}

fn transform_radix2(real: &mut [f64], imag: &mut [f64]) {
    let n = real.len();
    let levels = n.trailing_zeros();

    let half = n / 2;
    let cos_table: Vec<f64> = (0..half).map(|i| (2.0 * PI * i as f64 / n as f64).cos()).collect();
    let sin_table: Vec<f64> = (0..half).map(|i| (2.0 * PI * i as f64 / n as f64).sin()).collect();

    // Bit-reversed addressing permutation
    for i in 0..n {
        let j = reverse_bits(i, levels);
        if j > i {
            real.swap(i, j);
            imag.swap(i, j);
        }
    }

    let mut size = 2;
    while size <= n {
        let halfsize = size / 2;
        let table_step = n / size;
        for start in (0..n).step_by(size) {
            for (k, j) in (start..start + halfsize).enumerate() {
                let l = j + halfsize;
                let (cos, sin) = (cos_table[k * table_step], sin_table[k * table_step]);
                let tpre = real[l] * cos + imag[l] * sin;
                let tpim = -real[l] * sin + imag[l] * cos;
                real[l] = real[j] - tpre;
                imag[l] = imag[j] - tpim;
                real[j] += tpre;
                imag[j] += tpim;
            }
        }
        size *= 2;
    }
}

fn reverse_bits(mut x: usize, bits: u32) -> usize {
    let mut y = 0;
    for _ in 0..bits {
        y = (y << 1) | (x & 1);
        x >>= 1;
    }
    y
}

fn transform_bluestein(real: &mut [f64], imag: &mut [f64]) {
    let n = real.len();
    let m = (2 * n + 1).next_power_of_two();

    // i*i mod 2n keeps the angle small, which is more accurate than i*i
    let (cos_table, sin_table): (Vec<f64>, Vec<f64>) = (0..n)
        .map(|i| {
            let j = ((i as u128 * i as u128) % (2 * n as u128)) as f64;
            let angle = PI * j / n as f64;
            (angle.cos(), angle.sin())
        })
        .unzip();

    let mut a_real = vec![0.0; m];
    let mut a_imag = vec![0.0; m];
    for i in 0..n {
        a_real[i] = real[i] * cos_table[i] + imag[i] * sin_table[i];
        a_imag[i] = -real[i] * sin_table[i] + imag[i] * cos_table[i];
    }

    let mut b_real = vec![0.0; m];
    let mut b_imag = vec![0.0; m];
    b_real[0] = cos_table[0];
    b_imag[0] = sin_table[0];
    for i in 1..n {
        b_real[i] = cos_table[i];
        b_real[m - i] = cos_table[i];
        b_imag[i] = sin_table[i];
        b_imag[m - i] = sin_table[i];
    }

    let (c_real, c_imag) = convolve_unchecked(a_real, a_imag, b_real, b_imag);

    for i in 0..n {
        real[i] = c_real[i] * cos_table[i] + c_imag[i] * sin_table[i];
        imag[i] = -c_real[i] * sin_table[i] + c_imag[i] * cos_table[i];
    }
}

/// Circular convolution of two complex vectors of equal length.
pub fn convolve_complex(
    x_real: &[f64],
    x_imag: &[f64],
    y_real: &[f64],
    y_imag: &[f64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = x_real.len();
    for len in [x_imag.len(), y_real.len(), y_imag.len()] {
        if len != n {
            return Err(KeyFinderError::LengthMismatch {
                what: "convolution input",
                expected: n,
                actual: len,
            });
        }
    }
    Ok(convolve_unchecked(
        x_real.to_vec(),
        x_imag.to_vec(),
        y_real.to_vec(),
        y_imag.to_vec(),
    ))
}

/// Circular convolution of two real vectors of equal length.
pub fn convolve_real(x: &[f64], y: &[f64]) -> Result<Vec<f64>> {
    let zeros = vec![0.0; x.len()];
    let (out_real, _) = convolve_complex(x, &zeros, y, &zeros)?;
    Ok(out_real)
}

fn convolve_unchecked(
    mut x_real: Vec<f64>,
    mut x_imag: Vec<f64>,
    mut y_real: Vec<f64>,
    mut y_imag: Vec<f64>,
) -> (Vec<f64>, Vec<f64>) {
    let n = x_real.len();
    transform_unchecked(&mut x_real, &mut x_imag);
    transform_unchecked(&mut y_real, &mut y_imag);

    for i in 0..n {
        let re = x_real[i] * y_real[i] - x_imag[i] * y_imag[i];
        x_imag[i] = x_imag[i] * y_real[i] + x_real[i] * y_imag[i];
        x_real[i] = re;
    }
    transform_unchecked(&mut x_imag, &mut x_real);

    // This transform omits scaling, so it happens here
    let scale = n as f64;
    x_real.iter_mut().for_each(|v| *v /= scale);
    x_imag.iter_mut().for_each(|v| *v /= scale);
    (x_real, x_imag)
}
