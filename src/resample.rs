//! Upstream resampler: rescales ragged trajectories to a fixed length `L`.
//!
//! This is the bundler's only upstream collaborator kept in scope (§4.1):
//! linear interpolation with exact endpoint pinning, applied identically to
//! positions and per-point attributes.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::BundleResult;
use crate::tensor::{AttributeTensor, TrackTensor};

/// A single ragged input trajectory as produced by an upstream loader:
/// a point sequence plus one attribute value per point per named attribute.
#[derive(Debug, Clone)]
pub struct RawTrack {
    pub points: Vec<[f64; 3]>,
    /// `attributes[i][a]`, same point count as `points`.
    pub attributes: Vec<Vec<f64>>,
}

/// Linearly interpolates a point sequence to exactly `out_len` points,
/// pinning the first and last output points to the exact input endpoints.
///
/// The output index `i` maps to input parameter `u = i * (n-1)/(out_len-1)`,
/// which is always in `[0, n-1]` by construction — so, unlike a generic
/// resampling routine, this always yields exactly `out_len` points. The
/// pinning step still runs unconditionally, both to guarantee exact (not
/// interpolated) endpoints and to remain correct if a future resampling
/// strategy does not share this guarantee.
fn interpolate(points: &[[f64; 3]], out_len: usize) -> Vec<[f64; 3]> {
    let n = points.len();
    debug_assert!(n > 0);
    let mut out = vec![[0.0; 3]; out_len];
    if out_len == 1 {
        out[0] = points[0];
        return out;
    }
    let scale = (n - 1) as f64 / (out_len - 1) as f64;
    for (i, slot) in out.iter_mut().enumerate() {
        let u = i as f64 * scale;
        let i0 = u.floor() as usize;
        let i1 = (i0 + 1).min(n - 1);
        let frac = u - i0 as f64;
        let a = points[i0];
        let b = points[i1];
        *slot = [
            a[0] + (b[0] - a[0]) * frac,
            a[1] + (b[1] - a[1]) * frac,
            a[2] + (b[2] - a[2]) * frac,
        ];
    }
    out[0] = points[0];
    out[out_len - 1] = points[n - 1];
    out
}

fn interpolate_scalars(values: &[f64], out_len: usize) -> Vec<f64> {
    let n = values.len();
    debug_assert!(n > 0);
    let mut out = vec![0.0; out_len];
    if out_len == 1 {
        out[0] = values[0];
        return out;
    }
    let scale = (n - 1) as f64 / (out_len - 1) as f64;
    for (i, slot) in out.iter_mut().enumerate() {
        let u = i as f64 * scale;
        let i0 = u.floor() as usize;
        let i1 = (i0 + 1).min(n - 1);
        let frac = u - i0 as f64;
        *slot = values[i0] + (values[i1] - values[i0]) * frac;
    }
    out[0] = values[0];
    out[out_len - 1] = values[n - 1];
    out
}

/// Resamples a batch of ragged trajectories into the dense `[T, L, 3]` track
/// tensor and its accompanying `[T, L, A]` attribute tensor.
///
/// Trajectories shorter than `min_len` are dropped (logged at debug level).
/// `attribute_names` must match the per-point attribute vector length of
/// every kept track.
pub fn resample_tracks(
    tracks: &[RawTrack],
    length: usize,
    min_len: usize,
    attribute_names: Vec<String>,
) -> BundleResult<(TrackTensor, AttributeTensor)> {
    let num_attrs = attribute_names.len();
    let mut kept_points = Vec::with_capacity(tracks.len() * length * 3);
    let mut kept_attrs = Vec::with_capacity(tracks.len() * length * num_attrs);
    let mut kept = 0usize;

    for (idx, track) in tracks.iter().enumerate() {
        let n = track.points.len();
        if n < min_len {
            tracing::debug!(track = idx, len = n, min_len, "dropping short trajectory");
            continue;
        }

        let resampled = interpolate(&track.points, length);
        if resampled.len() != length {
            tracing::warn!(track = idx, got = resampled.len(), expected = length, "resample length mismatch");
        }
        for p in &resampled {
            kept_points.extend_from_slice(p);
        }

        for a in 0..num_attrs {
            let column: Vec<f64> = track.attributes.iter().map(|row| row[a]).collect();
            let resampled_attr = interpolate_scalars(&column, length);
            kept_attrs.extend(resampled_attr);
        }
        // attribute storage is [t, i, a]; we built it [a, i] per track above,
        // so transpose into place.
        if num_attrs > 0 {
            let start = kept_attrs.len() - length * num_attrs;
            let block = kept_attrs[start..].to_vec();
            for i in 0..length {
                for a in 0..num_attrs {
                    kept_attrs[start + i * num_attrs + a] = block[a * length + i];
                }
            }
        }

        kept += 1;
    }

    let tracks_tensor = TrackTensor::from_f64(kept, length, &kept_points)?;
    let attrs_tensor = AttributeTensor::new(kept, length, attribute_names, kept_attrs)?;
    Ok((tracks_tensor, attrs_tensor))
}

/// Downsamples every (already dense, equal-length) track in `tracks` to a
/// shorter length, used by the cluster builder to compute `Q[t, j, d]`.
pub fn downsample(tracks: &TrackTensor, short_len: usize) -> TrackTensor {
    let t = tracks.num_tracks();
    let mut flat = Vec::with_capacity(t * short_len * 3);
    for track in 0..t {
        let points: Vec<[f64; 3]> = (0..tracks.length()).map(|i| tracks.point(track, i)).collect();
        let down = interpolate(&points, short_len);
        for p in &down {
            flat.extend_from_slice(p);
        }
    }
    TrackTensor::from_f64(t, short_len, &flat).expect("downsample preserves shape invariants")
}
