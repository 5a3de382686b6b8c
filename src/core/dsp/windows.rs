//! Window function implementations

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowType {
    /// Analysis window for spectrum frames
    Blackman,
    /// Taper for truncated FIR impulse responses
    Hamming,
}

/// Coefficient `n` of a window of length `size`.
pub fn window(window_type: WindowType, n: usize, size: usize) -> f64 {
    let x = n as f64;
    let m = (size as f64 - 1.0).max(1.0);
    match window_type {
        WindowType::Blackman => {
            0.42 - 0.5 * (2.0 * PI * x / m).cos() + 0.08 * (4.0 * PI * x / m).cos()
        }
        WindowType::Hamming => 0.54 - 0.46 * (2.0 * PI * x / m).cos(),
    }
}

/// Gaussian bell centred on `size / 2`.
pub fn gaussian(n: usize, size: usize, sigma: f64) -> f64 {
    let offset = n as f64 - size as f64 / 2.0;
    (-(offset * offset) / (2.0 * sigma * sigma)).exp()
}

/// Create window function
pub fn create_window(size: usize, window_type: WindowType) -> Vec<f64> {
    (0..size).map(|n| window(window_type, n, size)).collect()
}

/// Smooth `input` with `window`, treating samples beyond either end as zero.
pub fn convolve(input: &[f64], window: &[f64]) -> Vec<f64> {
    let padding = window.len() / 2;
    let scale = window.len() as f64;
    (0..input.len())
        .map(|sample| {
            window
                .iter()
                .enumerate()
                .filter_map(|(k, &w)| {
                    (sample + k)
                        .checked_sub(padding)
                        .and_then(|frame| input.get(frame))
                        .map(|&x| x * w / scale)
                })
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blackman_window() {
        let window = create_window(9, WindowType::Blackman);
        assert!(window[0].abs() < 1e-12);
        assert!(window[8].abs() < 1e-12);
        assert!((window[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hamming_window() {
        let window = create_window(161, WindowType::Hamming);
        assert!((window[0] - 0.08).abs() < 1e-12);
        assert!((window[80] - 1.0).abs() < 1e-12);
        assert!((window[10] - window[150]).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_peak() {
        assert!((gaussian(8, 16, 2.0) - 1.0).abs() < 1e-12);
        assert!(gaussian(4, 16, 2.0) < gaussian(6, 16, 2.0));
    }

    #[test]
    fn test_convolve_zero_pads_edges() {
        let smoothed = convolve(&[3.0, 3.0, 3.0, 3.0], &[1.0, 1.0, 1.0]);
        assert!((smoothed[0] - 2.0).abs() < 1e-12);
        assert!((smoothed[1] - 3.0).abs() < 1e-12);
        assert!((smoothed[3] - 2.0).abs() < 1e-12);
    }
}
