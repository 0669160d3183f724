//! Parameter estimator (§4.3): derives bundling defaults from data extents.

use crate::tensor::TrackTensor;

/// Caller-supplied overrides; any field left `None` is filled in by
/// [`estimate`]. This mirrors the source's "estimate unless explicitly set"
/// rule without the source's implicit whole-object mutation.
#[derive(Debug, Clone, Default)]
pub struct ParamOverrides {
    pub magnet_radius: Option<f32>,
    pub step_size: Option<f32>,
    pub angle_min: Option<f32>,
    pub angle_stick: Option<f32>,
    pub smooth_radius: Option<u32>,
    pub smooth_intensity: Option<f32>,
    pub num_clusters: Option<usize>,
    pub bundle_endpoints: Option<bool>,
    /// Scale factor applied to `magnet_radius` at upload time, for callers
    /// whose coordinates were normalized upstream of the engine.
    pub coordinate_scale: Option<f32>,
}

/// Fully resolved bundling parameters, immutable for the run.
#[derive(Debug, Clone, Copy)]
pub struct BundleParams {
    pub magnet_radius: f32,
    pub step_size: f32,
    pub angle_min: f32,
    /// Plumbed through to the kernel but has no documented effect (§9 open
    /// question); reserved.
    pub angle_stick: f32,
    pub smooth_radius: u32,
    pub smooth_intensity: f32,
    pub num_clusters: usize,
    pub bundle_endpoints: bool,
}

/// Derives defaults from `tracks`' bounding-box diagonal, filling only the
/// fields `overrides` left unset. `coordinate_scale` always multiplies the
/// resolved `magnet_radius`, whether or not the radius itself was overridden,
/// since it reflects a coordinate normalization the caller applied upstream
/// rather than a default-value concern.
pub fn estimate(tracks: &TrackTensor, overrides: &ParamOverrides) -> BundleParams {
    let diagonal = tracks.bounding_diagonal();
    let coordinate_scale = overrides.coordinate_scale.unwrap_or(1.0);
    let base_magnet_radius = overrides.magnet_radius.unwrap_or((0.02 * diagonal) as f32);

    let num_tracks = tracks.num_tracks();
    let default_k = (num_tracks + 99) / 100;

    BundleParams {
        magnet_radius: base_magnet_radius * coordinate_scale,
        step_size: overrides.step_size.unwrap_or(0.5),
        angle_min: overrides.angle_min.unwrap_or(0.0),
        angle_stick: overrides.angle_stick.unwrap_or(0.0),
        smooth_radius: overrides.smooth_radius.unwrap_or(1),
        smooth_intensity: overrides.smooth_intensity.unwrap_or(0.5),
        num_clusters: overrides.num_clusters.unwrap_or(default_k).max(1),
        bundle_endpoints: overrides.bundle_endpoints.unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn defaults_match_documented_formula() {
        let data = vec![0.0, 0.0, 0.0, 3.0, 4.0, 0.0];
        let tracks = TrackTensor::from_f64(1, 2, &data).unwrap();
        let params = estimate(&tracks, &ParamOverrides::default());
        assert!((params.magnet_radius - 0.1).abs() < 1e-6); // 0.02 * 5.0
        assert_eq!(params.step_size, 0.5);
        assert_eq!(params.angle_min, 0.0);
        assert_eq!(params.smooth_radius, 1);
        assert_eq!(params.smooth_intensity, 0.5);
        assert_eq!(params.num_clusters, 1);
        assert!(!params.bundle_endpoints);
    }

    #[test]
    fn cluster_count_is_one_per_hundred_trajectories() {
        let data = vec![0.0f64; 250 * 1 * 3];
        let tracks = TrackTensor::from_f64(250, 1, &data).unwrap();
        let params = estimate(&tracks, &ParamOverrides::default());
        assert_eq!(params.num_clusters, 3);
    }

    #[test]
    fn overrides_take_precedence_over_defaults() {
        let data = vec![0.0, 0.0, 0.0, 3.0, 4.0, 0.0];
        let tracks = TrackTensor::from_f64(1, 2, &data).unwrap();
        let overrides = ParamOverrides {
            magnet_radius: Some(2.0),
            ..Default::default()
        };
        let params = estimate(&tracks, &overrides);
        assert_eq!(params.magnet_radius, 2.0);
    }

    #[test]
    fn coordinate_scale_multiplies_resolved_radius() {
        let data = vec![0.0, 0.0, 0.0, 3.0, 4.0, 0.0];
        let tracks = TrackTensor::from_f64(1, 2, &data).unwrap();
        let overrides = ParamOverrides {
            magnet_radius: Some(2.0),
            coordinate_scale: Some(10.0),
            ..Default::default()
        };
        let params = estimate(&tracks, &overrides);
        assert_eq!(params.magnet_radius, 20.0);
    }
}
