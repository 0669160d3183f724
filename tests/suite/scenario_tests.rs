//! Scenario and property tests that lock the bundler's exact arithmetic.
//!
//! These run real kernels on a CUDA device, following the integration-test
//! shape used elsewhere in the suite (`CudaRuntime::new()` /
//! `ComputeClient::new()`, no CPU fallback path to test against).

use cubecl::client::ComputeClient;
use cubecl::runtime::CudaRuntime;

use edge_bundler::{BundleConfig, ParamOverrides, TrackTensor, run_bundling};

fn two_parallel_lines(y_a: f64, y_b: f64) -> TrackTensor {
    let mut data = Vec::new();
    for y in [y_a, y_b] {
        for x in 0..5 {
            data.extend_from_slice(&[x as f64, y, 0.0]);
        }
    }
    TrackTensor::from_f64(2, 5, &data).unwrap()
}

fn point(flat: &[f32], length: usize, t: usize, i: usize) -> [f32; 3] {
    let base = (t * length + i) * 3;
    [flat[base], flat[base + 1], flat[base + 2]]
}

/// S1: two parallel five-point lines, one cluster, radius wide enough to
/// cover both. Interior points move exactly halfway to the pair mean;
/// endpoints are pinned. This locks the attraction target as the mean over
/// the *whole* cluster, including the trajectory being updated itself —
/// excluding self would instead move every interior point all the way onto
/// its sibling's track.
#[test]
fn s1_attraction_moves_interior_points_to_pair_mean() {
    let runtime = CudaRuntime::new().unwrap();
    let client = ComputeClient::new(&runtime).unwrap();
    let tracks = two_parallel_lines(0.0, 1.0);

    let overrides = ParamOverrides {
        num_clusters: Some(1),
        magnet_radius: Some(5.0),
        step_size: Some(0.5),
        smooth_intensity: Some(0.0),
        ..Default::default()
    };
    let config = BundleConfig::new().with_iterations(1).with_overrides(overrides);

    let out = run_bundling(&client, &tracks, &config, &()).unwrap();

    assert_eq!(point(&out, 5, 0, 0), [0.0, 0.0, 0.0]);
    assert_eq!(point(&out, 5, 0, 4), [4.0, 0.0, 0.0]);
    assert_eq!(point(&out, 5, 1, 0), [0.0, 1.0, 0.0]);
    assert_eq!(point(&out, 5, 1, 4), [4.0, 1.0, 0.0]);

    for i in 1..4 {
        let a = point(&out, 5, 0, i);
        let b = point(&out, 5, 1, i);
        assert!((a[1] - 0.25).abs() < 1e-5, "track A interior y = {}", a[1]);
        assert!((b[1] - 0.75).abs() < 1e-5, "track B interior y = {}", b[1]);
    }
}

/// S2: lines far enough apart that the radius gate never admits a sibling —
/// only self ever satisfies it, so the output is bit-identical to the input.
#[test]
fn s2_distant_lines_are_unaffected_by_attraction() {
    let runtime = CudaRuntime::new().unwrap();
    let client = ComputeClient::new(&runtime).unwrap();
    let tracks = two_parallel_lines(0.0, 10.0);

    let overrides = ParamOverrides {
        num_clusters: Some(1),
        magnet_radius: Some(0.1),
        smooth_intensity: Some(0.0),
        ..Default::default()
    };
    let config = BundleConfig::new().with_iterations(1).with_overrides(overrides);

    let out = run_bundling(&client, &tracks, &config, &()).unwrap();
    let expected = two_parallel_lines(0.0, 10.0).to_padded_f32();
    let expected_unpadded: Vec<f32> = expected.chunks(4).flat_map(|c| c[..3].to_vec()).collect();
    assert_eq!(out, expected_unpadded);
}

/// S3: zero outer iterations is a pure identity, no device work performed.
#[test]
fn s3_zero_iterations_is_identity() {
    let runtime = CudaRuntime::new().unwrap();
    let client = ComputeClient::new(&runtime).unwrap();
    let tracks = two_parallel_lines(0.0, 1.0);

    let config = BundleConfig::new().with_iterations(0);
    let out = run_bundling(&client, &tracks, &config, &()).unwrap();
    let expected = tracks.to_padded_f32();
    let expected_unpadded: Vec<f32> = expected.chunks(4).flat_map(|c| c[..3].to_vec()).collect();
    assert_eq!(out, expected_unpadded);
}

/// S4: a single trajectory is its own one-member cluster; attraction can
/// never move it regardless of parameters.
#[test]
fn s4_singleton_trajectory_is_unaffected() {
    let runtime = CudaRuntime::new().unwrap();
    let client = ComputeClient::new(&runtime).unwrap();
    let data: Vec<f64> = (0..5).flat_map(|x| [x as f64, 0.0, 0.0]).collect();
    let tracks = TrackTensor::from_f64(1, 5, &data).unwrap();

    let config = BundleConfig::new().with_iterations(3);
    let out = run_bundling(&client, &tracks, &config, &()).unwrap();
    let expected = tracks.to_padded_f32();
    let expected_unpadded: Vec<f32> = expected.chunks(4).flat_map(|c| c[..3].to_vec()).collect();
    assert_eq!(out, expected_unpadded);
}

/// S6: `smooth_intensity == 0` and `magnet_radius == 0` together neutralize
/// both passes every iteration, regardless of iteration count.
#[test]
fn s6_zero_radius_and_intensity_is_identity_regardless_of_iterations() {
    let runtime = CudaRuntime::new().unwrap();
    let client = ComputeClient::new(&runtime).unwrap();
    let tracks = two_parallel_lines(0.0, 1.0);

    let overrides = ParamOverrides {
        num_clusters: Some(1),
        magnet_radius: Some(0.0),
        smooth_intensity: Some(0.0),
        ..Default::default()
    };
    let config = BundleConfig::new().with_iterations(5).with_overrides(overrides);

    let out = run_bundling(&client, &tracks, &config, &()).unwrap();
    let expected = tracks.to_padded_f32();
    let expected_unpadded: Vec<f32> = expected.chunks(4).flat_map(|c| c[..3].to_vec()).collect();
    assert_eq!(out, expected_unpadded);
}

/// Property 1: output always has the same `[T, L, 3]` element count as the
/// input, for any iteration count.
#[test]
fn property_shape_is_preserved() {
    let runtime = CudaRuntime::new().unwrap();
    let client = ComputeClient::new(&runtime).unwrap();
    let tracks = two_parallel_lines(0.0, 1.0);

    let config = BundleConfig::new().with_iterations(4);
    let out = run_bundling(&client, &tracks, &config, &()).unwrap();
    assert_eq!(out.len(), tracks.num_tracks() * tracks.length() * 3);
}

/// Property 2: endpoints never move when `bundle_endpoints` is left at its
/// default of `false`, no matter how many iterations run.
#[test]
fn property_endpoints_are_invariant_by_default() {
    let runtime = CudaRuntime::new().unwrap();
    let client = ComputeClient::new(&runtime).unwrap();
    let tracks = two_parallel_lines(0.0, 1.0);

    let overrides = ParamOverrides { num_clusters: Some(1), magnet_radius: Some(5.0), ..Default::default() };
    let config = BundleConfig::new().with_iterations(6).with_overrides(overrides);
    let out = run_bundling(&client, &tracks, &config, &()).unwrap();

    assert_eq!(point(&out, 5, 0, 0), [0.0, 0.0, 0.0]);
    assert_eq!(point(&out, 5, 0, 4), [4.0, 0.0, 0.0]);
    assert_eq!(point(&out, 5, 1, 0), [0.0, 1.0, 0.0]);
    assert_eq!(point(&out, 5, 1, 4), [4.0, 1.0, 0.0]);
}

/// Property 4: within a cluster, more iterations never increase the
/// interior spread between two sibling trajectories.
#[test]
fn property_more_iterations_does_not_increase_spread() {
    let runtime = CudaRuntime::new().unwrap();
    let client = ComputeClient::new(&runtime).unwrap();
    let tracks = two_parallel_lines(0.0, 1.0);

    let overrides = ParamOverrides {
        num_clusters: Some(1),
        magnet_radius: Some(5.0),
        smooth_intensity: Some(0.0),
        ..Default::default()
    };

    let spread_after = |iterations: u32| {
        let config = BundleConfig::new().with_iterations(iterations).with_overrides(overrides.clone());
        let out = run_bundling(&client, &tracks, &config, &()).unwrap();
        let a = point(&out, 5, 0, 2);
        let b = point(&out, 5, 1, 2);
        (b[1] - a[1]).abs()
    };

    let spread_1 = spread_after(1);
    let spread_3 = spread_after(3);
    assert!(spread_3 <= spread_1 + 1e-5, "spread grew from {} to {}", spread_1, spread_3);
}
