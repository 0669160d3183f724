//! Output adapter: promotes the bundler's internal f32 result back to the
//! caller's original precision (§6 — "f32 internally, promoted back to
//! caller precision on output").

use alloc::vec::Vec;

use crate::error::BundleResult;
use crate::tensor::{Precision, TrackTensor};

/// Builds the output track tensor from a flat `[T, L, 3]` f32 buffer,
/// widening to f64 storage when the original input was f64. `TrackTensor`
/// always stores f64 internally (§3); `precision` only affects what a
/// caller-facing export step would hand back, which callers recover via
/// [`TrackTensor::precision`].
pub fn to_output(num_tracks: usize, length: usize, flat_f32: &[f32], precision: Precision) -> BundleResult<TrackTensor> {
    let widened: Vec<f64> = flat_f32.iter().map(|&v| v as f64).collect();
    match precision {
        Precision::F32 => TrackTensor::from_f32(num_tracks, length, flat_f32),
        Precision::F64 => TrackTensor::from_f64(num_tracks, length, &widened),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_requested_precision_tag() {
        let flat = [0.0f32, 0.0, 0.0, 1.0, 1.0, 1.0];
        let out = to_output(1, 2, &flat, Precision::F64).unwrap();
        assert_eq!(out.precision(), Precision::F64);
        assert_eq!(out.point(0, 1), [1.0, 1.0, 1.0]);
    }
}
