//! Bundler run configuration.

use crate::params::{BundleParams, ParamOverrides};

/// Default outer-iteration count (§4.4).
pub const DEFAULT_ITERATIONS: u32 = 15;
/// Default chunk size, in trajectories, for a single kernel launch (§4.4).
pub const DEFAULT_CHUNK_SIZE: u32 = 10_000;
/// Default downsample length used by the cluster builder (§4.2).
pub const DEFAULT_CLUSTER_DOWNSAMPLE: usize = 8;
/// Default cluster-refinement iteration count (§4.2).
pub const DEFAULT_CLUSTER_ITERATIONS: usize = 20;

/// Configuration options for a bundling run. Every field has a documented
/// default; `with_*` setters override one field at a time.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    pub iterations: u32,
    pub chunk_size: u32,
    pub cluster_downsample: usize,
    pub cluster_iterations: usize,
    pub overrides: ParamOverrides,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            cluster_downsample: DEFAULT_CLUSTER_DOWNSAMPLE,
            cluster_iterations: DEFAULT_CLUSTER_ITERATIONS,
            overrides: ParamOverrides::default(),
        }
    }
}

impl BundleConfig {
    /// Creates a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the outer iteration count.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the per-launch chunk size, in trajectories.
    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the downsample length used when building clusters.
    pub fn with_cluster_downsample(mut self, len: usize) -> Self {
        self.cluster_downsample = len;
        self
    }

    /// Sets the cluster-refinement iteration count.
    pub fn with_cluster_iterations(mut self, iterations: usize) -> Self {
        self.cluster_iterations = iterations;
        self
    }

    /// Sets the caller-supplied parameter overrides.
    pub fn with_overrides(mut self, overrides: ParamOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// A single chunk covering every trajectory and a short cluster
    /// refinement pass, for small inputs where per-launch overhead
    /// dominates the work itself.
    pub fn fast(num_tracks: usize) -> Self {
        Self {
            chunk_size: num_tracks.max(1) as u32,
            cluster_iterations: 5,
            ..Self::default()
        }
    }

    /// Conservative defaults: full iteration and cluster-refinement counts,
    /// small chunks to bound peak device memory.
    pub fn safe() -> Self {
        Self {
            chunk_size: 1_000,
            ..Self::default()
        }
    }

    pub fn resolve_params(&self, tracks: &crate::tensor::TrackTensor) -> BundleParams {
        crate::params::estimate(tracks, &self.overrides)
    }
}
