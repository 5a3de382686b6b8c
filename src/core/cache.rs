// src/core/cache.rs
//
// Memoizing factories for the expensive, immutable analysis objects.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use super::analysis::ChromaTransform;
use super::dsp::{create_window, LowPassFilter, WindowType};
use crate::error::Result;

/// Lock-guarded map from construction parameters to shared values.
///
/// Lookup and construction happen under one lock, so each value is built at
/// most once even when several threads ask for it together.
#[derive(Debug)]
pub struct FactoryCache<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash, V> FactoryCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_try_insert_with<F>(&self, key: K, build: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        // A panic while building leaves the map itself consistent
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = entries.get(&key) {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(build()?);
        entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V> Default for FactoryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// (frame rate bits, FFT frame size, stretch bits)
type ChromaKey = (u64, usize, u64);
/// (order, frame rate bits, corner frequency bits, FFT frame size)
type FilterKey = (usize, u64, u64, usize);

/// Chroma transforms per frame rate and frame size.
#[derive(Debug, Default)]
pub struct ChromaTransformCache {
    cache: FactoryCache<ChromaKey, ChromaTransform>,
}

impl ChromaTransformCache {
    pub fn get(&self, frame_rate: f64, fft_frame_size: usize, stretch: f64) -> Result<Arc<ChromaTransform>> {
        let key = (frame_rate.to_bits(), fft_frame_size, stretch.to_bits());
        self.cache.get_or_try_insert_with(key, || {
            debug!(
                "building chroma transform: {:.3} Hz, frame {}, stretch {}",
                frame_rate, fft_frame_size, stretch
            );
            ChromaTransform::new(frame_rate, fft_frame_size, stretch)
        })
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }
}

/// Low-pass filters per design parameters.
#[derive(Debug, Default)]
pub struct LowPassFilterCache {
    cache: FactoryCache<FilterKey, LowPassFilter>,
}

impl LowPassFilterCache {
    pub fn get(
        &self,
        order: usize,
        frame_rate: f64,
        corner_frequency: f64,
        fft_frame_size: usize,
    ) -> Result<Arc<LowPassFilter>> {
        let key = (order, frame_rate.to_bits(), corner_frequency.to_bits(), fft_frame_size);
        self.cache.get_or_try_insert_with(key, || {
            debug!(
                "designing low-pass filter: order {}, {:.1} Hz corner at {} Hz",
                order, corner_frequency, frame_rate
            );
            LowPassFilter::new(order, frame_rate, corner_frequency, fft_frame_size)
        })
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }
}

/// Blackman windows per frame size.
#[derive(Debug, Default)]
pub struct TemporalWindowCache {
    cache: FactoryCache<usize, Vec<f64>>,
}

impl TemporalWindowCache {
    pub fn get(&self, frame_size: usize) -> Result<Arc<Vec<f64>>> {
        self.cache.get_or_try_insert_with(frame_size, || {
            debug!("building Blackman window of {} samples", frame_size);
            Ok(create_window(frame_size, WindowType::Blackman))
        })
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }
}
