// src/core/analysis/chromagram.rs
//
// Hop-by-band matrix of chroma magnitudes.

use serde::Serialize;

use crate::core::tables::BANDS;
use crate::error::{KeyFinderError, Result};

/// One row of 72 band magnitudes per analysis hop.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Chromagram {
    #[serde(serialize_with = "serialize_rows")]
    rows: Vec<[f64; BANDS]>,
}

impl Chromagram {
    /// Zero-filled chromagram with `hops` rows.
    pub fn new(hops: usize) -> Self {
        Self {
            rows: vec![[0.0; BANDS]; hops],
        }
    }

    pub fn hops(&self) -> usize {
        self.rows.len()
    }

    pub fn bands(&self) -> usize {
        BANDS
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn magnitude(&self, hop: usize, band: usize) -> Result<f64> {
        self.check_bounds(hop, band)?;
        Ok(self.rows[hop][band])
    }

    pub fn set_magnitude(&mut self, hop: usize, band: usize, value: f64) -> Result<()> {
        self.check_bounds(hop, band)?;
        if !value.is_finite() {
            return Err(KeyFinderError::NonFinite { what: "chroma magnitude", index: band });
        }
        self.rows[hop][band] = value;
        Ok(())
    }

    /// Mean chroma vector over all hops; all zeros when there are none.
    pub fn collapse_to_one_hop(&self) -> Vec<f64> {
        let mut collapsed = vec![0.0; BANDS];
        let hops = self.hops() as f64;
        for row in &self.rows {
            for (total, magnitude) in collapsed.iter_mut().zip(row) {
                *total += magnitude / hops;
            }
        }
        collapsed
    }

    pub fn append(&mut self, other: Chromagram) {
        self.rows.extend(other.rows);
    }

    pub fn rows(&self) -> &[[f64; BANDS]] {
        &self.rows
    }

    fn check_bounds(&self, hop: usize, band: usize) -> Result<()> {
        if hop >= self.hops() {
            return Err(KeyFinderError::out_of_bounds("hop", hop, self.hops()));
        }
        if band >= BANDS {
            return Err(KeyFinderError::out_of_bounds("band", band, BANDS));
        }
        Ok(())
    }
}

fn serialize_rows<S>(rows: &[[f64; BANDS]], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(rows.len()))?;
    for row in rows {
        seq.serialize_element(&row[..])?;
    }
    seq.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_and_values() {
        let mut chromagram = Chromagram::new(2);
        assert_eq!(chromagram.hops(), 2);
        chromagram.set_magnitude(1, 71, 3.5).unwrap();
        assert_eq!(chromagram.magnitude(1, 71).unwrap(), 3.5);

        assert!(matches!(
            chromagram.magnitude(2, 0),
            Err(KeyFinderError::OutOfBounds { what: "hop", index: 2, len: 2 })
        ));
        assert!(matches!(
            chromagram.set_magnitude(0, 72, 1.0),
            Err(KeyFinderError::OutOfBounds { what: "band", index: 72, len: 72 })
        ));
        assert!(matches!(
            chromagram.set_magnitude(0, 3, f64::NAN),
            Err(KeyFinderError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_collapse_averages_hops() {
        let mut chromagram = Chromagram::new(4);
        for hop in 0..4 {
            chromagram.set_magnitude(hop, 10, hop as f64).unwrap();
        }
        let collapsed = chromagram.collapse_to_one_hop();
        assert_eq!(collapsed.len(), BANDS);
        assert!((collapsed[10] - 1.5).abs() < 1e-12);
        assert_eq!(collapsed[11], 0.0);

        assert!(Chromagram::new(0).collapse_to_one_hop().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_append_keeps_order() {
        let mut first = Chromagram::new(1);
        first.set_magnitude(0, 0, 1.0).unwrap();
        let mut second = Chromagram::new(2);
        second.set_magnitude(1, 0, 2.0).unwrap();

        first.append(second);
        assert_eq!(first.hops(), 3);
        assert_eq!(first.magnitude(0, 0).unwrap(), 1.0);
        assert_eq!(first.magnitude(2, 0).unwrap(), 2.0);
    }

    #[test]
    fn test_serializes_as_nested_arrays() {
        let json = serde_json::to_value(Chromagram::new(1)).unwrap();
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["rows"][0].as_array().map(Vec::len), Some(BANDS));
    }
}
