//! Canonical trajectory and attribute tensor types.
//!
//! The bundler's only host-side data contract: a dense `[T, L, 3]` tensor of
//! resampled trajectory positions, plus an oblivious `[T, L, A]` attribute
//! tensor that is passed through unchanged. Callers may supply either f32 or
//! f64 coordinates; the engine canonicalizes to f64 on the host and converts
//! to f32 only at the device boundary.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::{BundleError, BundleResult};

/// Source precision of a tensor, tracked so output can be promoted back to
/// whatever the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    F32,
    F64,
}

/// Dense `[T, L, 3]` trajectory tensor, canonically stored as f64.
#[derive(Debug, Clone)]
pub struct TrackTensor {
    num_tracks: usize,
    length: usize,
    precision: Precision,
    data: Vec<f64>,
}

impl TrackTensor {
    /// Builds a tensor from row-major `[T, L, 3]` f32 data.
    pub fn from_f32(num_tracks: usize, length: usize, data: &[f32]) -> BundleResult<Self> {
        Self::validate_len(num_tracks, length, data.len())?;
        Ok(Self {
            num_tracks,
            length,
            precision: Precision::F32,
            data: data.iter().map(|&v| v as f64).collect(),
        })
    }

    /// Builds a tensor from row-major `[T, L, 3]` f64 data.
    pub fn from_f64(num_tracks: usize, length: usize, data: &[f64]) -> BundleResult<Self> {
        Self::validate_len(num_tracks, length, data.len())?;
        Ok(Self {
            num_tracks,
            length,
            precision: Precision::F64,
            data: data.to_vec(),
        })
    }

    fn validate_len(num_tracks: usize, length: usize, got: usize) -> BundleResult<()> {
        let expected = num_tracks * length * 3;
        if got != expected {
            return Err(BundleError::invalid_shape(alloc::format!(
                "expected {} elements for [{}, {}, 3], got {}",
                expected, num_tracks, length, got
            )));
        }
        Ok(())
    }

    pub fn num_tracks(&self) -> usize {
        self.num_tracks
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn is_empty(&self) -> bool {
        self.num_tracks == 0
    }

    /// Reads the 3D position of point `i` in track `t`.
    pub fn point(&self, t: usize, i: usize) -> [f64; 3] {
        let base = (t * self.length + i) * 3;
        [self.data[base], self.data[base + 1], self.data[base + 2]]
    }

    /// The full point sequence of track `t`.
    pub fn track(&self, t: usize) -> &[f64] {
        let start = t * self.length * 3;
        &self.data[start..start + self.length * 3]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Flattens into the bundler's 4-wide device layout: `[t*L + i] = (x, y, z, 0)`.
    pub fn to_padded_f32(&self) -> Vec<f32> {
        let mut out = vec![0f32; self.num_tracks * self.length * 4];
        for t in 0..self.num_tracks {
            for i in 0..self.length {
                let [x, y, z] = self.point(t, i);
                let base = (t * self.length + i) * 4;
                out[base] = x as f32;
                out[base + 1] = y as f32;
                out[base + 2] = z as f32;
            }
        }
        out
    }

    /// Rebuilds a tensor from the bundler's 4-wide padded layout, restoring
    /// the requested output precision.
    pub fn from_padded_f32(
        num_tracks: usize,
        length: usize,
        padded: &[f32],
        precision: Precision,
    ) -> BundleResult<Self> {
        let expected = num_tracks * length * 4;
        if padded.len() != expected {
            return Err(BundleError::invalid_shape(alloc::format!(
                "expected {} padded elements, got {}",
                expected,
                padded.len()
            )));
        }
        let mut data = vec![0f64; num_tracks * length * 3];
        for t in 0..num_tracks {
            for i in 0..length {
                let src = (t * length + i) * 4;
                let dst = (t * length + i) * 3;
                data[dst] = padded[src] as f64;
                data[dst + 1] = padded[src + 1] as f64;
                data[dst + 2] = padded[src + 2] as f64;
            }
        }
        Ok(Self {
            num_tracks,
            length,
            precision,
            data,
        })
    }

    /// Bounding-box diagonal `D = ‖max - min‖₂` over all points.
    pub fn bounding_diagonal(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for chunk in self.data.chunks_exact(3) {
            for d in 0..3 {
                if chunk[d] < min[d] {
                    min[d] = chunk[d];
                }
                if chunk[d] > max[d] {
                    max[d] = chunk[d];
                }
            }
        }
        let mut sum_sq = 0.0;
        for d in 0..3 {
            let diff = max[d] - min[d];
            sum_sq += diff * diff;
        }
        sum_sq.sqrt()
    }
}

/// Dense `[T, L, A]` attribute tensor, oblivious to the bundler; passed
/// through unchanged alongside a name for each attribute column.
#[derive(Debug, Clone)]
pub struct AttributeTensor {
    num_tracks: usize,
    length: usize,
    names: Vec<String>,
    data: Vec<f64>,
}

impl AttributeTensor {
    pub fn new(num_tracks: usize, length: usize, names: Vec<String>, data: Vec<f64>) -> BundleResult<Self> {
        let expected = num_tracks * length * names.len();
        if data.len() != expected {
            return Err(BundleError::invalid_shape(alloc::format!(
                "expected {} attribute elements for [{}, {}, {}], got {}",
                expected,
                num_tracks,
                length,
                names.len(),
                data.len()
            )));
        }
        Ok(Self {
            num_tracks,
            length,
            names,
            data,
        })
    }

    pub fn empty(num_tracks: usize, length: usize) -> Self {
        Self {
            num_tracks,
            length,
            names: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn num_attributes(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn track(&self, t: usize) -> &[f64] {
        let a = self.names.len();
        let start = t * self.length * a;
        &self.data[start..start + self.length * a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_length() {
        let data = vec![0.0f32; 10];
        assert!(TrackTensor::from_f32(1, 4, &data).is_err());
    }

    #[test]
    fn round_trips_through_padded_layout() {
        let data = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        let t = TrackTensor::from_f64(1, 2, &data).unwrap();
        let padded = t.to_padded_f32();
        assert_eq!(padded, vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 0.0]);
        let back = TrackTensor::from_padded_f32(1, 2, &padded, Precision::F64).unwrap();
        assert_eq!(back.point(0, 1), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn bounding_diagonal_matches_extents() {
        let data = vec![0.0, 0.0, 0.0, 3.0, 4.0, 0.0];
        let t = TrackTensor::from_f64(1, 2, &data).unwrap();
        assert!((t.bounding_diagonal() - 5.0).abs() < 1e-9);
    }
}
