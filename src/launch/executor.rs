//! Bundling execution engine.
//!
//! Orchestrates cluster building, device buffer acquisition, and the
//! chunked attract/smooth kernel dispatch loop (§4.4, §4.7).

use alloc::vec;
use alloc::vec::Vec;

use cubecl::Runtime;
use cubecl::client::ComputeClient;

use crate::cluster::build_clusters;
use crate::error::{BundleError, BundleResult};
use crate::kernels::{launch_attract, launch_smooth};
use crate::params::BundleParams;
use crate::tensor::TrackTensor;

use super::config::BundleConfig;
use super::workspace::FlatBuffers;

/// A run's state machine (§4.7). `Idle` and `Done` are not represented as
/// variants here since they correspond to "before `run_bundling` is called"
/// and "after it returns `Ok`"; what matters during the run is which phase
/// of which outer iteration is executing, for cancellation checks and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Attract,
    Smooth,
}

/// Cooperative cancellation hook, polled between chunk launches and between
/// outer iterations. Returning `true` aborts the run with
/// [`BundleError::Cancelled`] after releasing device buffers.
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

impl CancellationToken for () {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Runs the bundler over `tracks`, returning the bundled point tensor as a
/// flat `[T, L, 3]` f32 buffer (unpadded). `I == 0` is a no-op: the input is
/// copied back unchanged without touching the device (§4.4).
pub fn run_bundling<R: Runtime>(
    client: &ComputeClient<R>,
    tracks: &TrackTensor,
    config: &BundleConfig,
    cancel: &impl CancellationToken,
) -> BundleResult<Vec<f32>> {
    let span = tracing::info_span!("run_bundling", num_tracks = tracks.num_tracks(), iterations = config.iterations);
    let _guard = span.enter();

    if tracks.is_empty() {
        return Ok(Vec::new());
    }

    let params = config.resolve_params(tracks);
    let length = tracks.length() as u32;

    if config.iterations == 0 {
        tracing::debug!("iterations == 0, returning input unchanged");
        return Ok(unpad(&tracks.to_padded_f32()));
    }

    let clusters = build_clusters(
        tracks,
        params.num_clusters,
        config.cluster_downsample,
        config.cluster_iterations,
    );

    let padded = tracks.to_padded_f32();
    let mut buffers = FlatBuffers::acquire(client, &padded, &clusters)
        .map_err(|e| BundleError::device_oom(alloc::format!("buffer acquisition failed: {e:?}")))?;

    let t = tracks.num_tracks() as u32;
    let chunk_size = config.chunk_size.max(1);

    for iteration in 0..config.iterations {
        if cancel.is_cancelled() {
            tracing::info!(iteration, "cancellation requested before attract phase");
            return Err(BundleError::Cancelled);
        }
        run_chunked_phase(client, &mut buffers, Phase::Attract, t, length, chunk_size, &params, cancel)?;
        buffers.swap();

        if cancel.is_cancelled() {
            tracing::info!(iteration, "cancellation requested before smooth phase");
            return Err(BundleError::Cancelled);
        }
        run_chunked_phase(client, &mut buffers, Phase::Smooth, t, length, chunk_size, &params, cancel)?;
        buffers.swap();

        tracing::debug!(iteration, "outer iteration complete");
    }

    let flat = buffers
        .download_points(client)
        .map_err(|e| BundleError::device_oom(alloc::format!("readback failed: {e:?}")))?;

    Ok(unpad(&flat))
}

#[allow(clippy::too_many_arguments)]
fn run_chunked_phase<R: Runtime>(
    client: &ComputeClient<R>,
    buffers: &mut FlatBuffers<R>,
    phase: Phase,
    num_tracks: u32,
    length: u32,
    chunk_size: u32,
    params: &BundleParams,
    cancel: &impl CancellationToken,
) -> BundleResult<()> {
    let mut offset = 0u32;
    while offset < num_tracks {
        if cancel.is_cancelled() {
            tracing::info!(?phase, offset, "cancellation requested between chunks");
            return Err(BundleError::Cancelled);
        }
        let width = chunk_size.min(num_tracks - offset);
        match phase {
            Phase::Attract => launch_attract(
                client,
                &buffers.points,
                &mut buffers.points_out,
                &buffers.inv_cluster,
                &buffers.cluster_start,
                &buffers.cluster_len,
                &buffers.cluster_members,
                length,
                offset,
                width,
                params,
            )?,
            Phase::Smooth => launch_smooth(client, &buffers.points, &mut buffers.points_out, length, offset, width, params)?,
        }
        offset += width;
    }
    Ok(())
}

/// Strips the 4th padding lane from a flat `[T*L, 4]` buffer, yielding
/// `[T*L, 3]` (i.e. `[T, L, 3]` row-major).
fn unpad(padded: &[f32]) -> Vec<f32> {
    let num_points = padded.len() / 4;
    let mut out = Vec::with_capacity(num_points * 3);
    for p in 0..num_points {
        out.extend_from_slice(&padded[p * 4..p * 4 + 3]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpad_strips_fourth_lane() {
        let padded = vec![1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0];
        assert_eq!(unpad(&padded), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
