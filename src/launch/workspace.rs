//! Device-side buffer lifecycle for a bundling run.
//!
//! The source kept its device buffers behind a long-lived helper object that
//! callers had to remember to free. Here that bookkeeping is replaced with
//! a single scoped [`FlatBuffers`] value: [`FlatBuffers::acquire`] allocates
//! and uploads everything a run needs once, [`FlatBuffers::swap`] ping-pongs
//! `points`/`points_out` between passes, and dropping the value (on success,
//! on error, or on cancellation) releases every device allocation — there is
//! no separate "free" call a caller can forget.

use alloc::vec::Vec;

use cubecl::Runtime;
use cubecl::client::ComputeClient;
use cubecl::ir::StorageType;
use cubecl::std::tensor::TensorHandle;

use crate::cluster::ClusterAssignment;
use crate::error::{BundleError, BundleResult};

/// Device-resident state for one bundling run: the ping-pong point buffers
/// plus the cluster builder's flat CSR layout, all uploaded once and reused
/// across every outer iteration.
pub struct FlatBuffers<R: Runtime> {
    pub points: TensorHandle<R>,
    pub points_out: TensorHandle<R>,
    pub inv_cluster: TensorHandle<R>,
    pub cluster_start: TensorHandle<R>,
    pub cluster_len: TensorHandle<R>,
    pub cluster_members: TensorHandle<R>,
}

impl<R: Runtime> FlatBuffers<R> {
    /// Uploads the padded point buffer and the cluster assignment's CSR
    /// layout to the device. `padded` is `[T*L, 4]`, row-major, as produced
    /// by [`crate::tensor::TrackTensor::to_padded_f32`].
    pub fn acquire(
        client: &ComputeClient<R>,
        padded: &[f32],
        clusters: &ClusterAssignment,
    ) -> BundleResult<Self> {
        let num_points = padded.len() / 4;
        let mut points = TensorHandle::zeros(client, Vec::from([num_points, 4]), StorageType::F32);
        upload_f32(&mut points, padded);

        // points_out starts as a copy of points: the first iteration's
        // attract pass reads every point before any has been overwritten,
        // but a fresh zeroed buffer would otherwise leave untouched lanes
        // (e.g. an endpoint under bundle_endpoints == 0) as zero instead of
        // the original coordinate.
        let mut points_out = TensorHandle::zeros(client, Vec::from([num_points, 4]), StorageType::F32);
        upload_f32(&mut points_out, padded);

        let t = clusters.inv_cluster().len();
        let mut inv_cluster = TensorHandle::zeros(client, Vec::from([t]), StorageType::U32);
        upload_u32(&mut inv_cluster, clusters.inv_cluster());

        let k = clusters.num_clusters();
        let mut cluster_start = TensorHandle::zeros(client, Vec::from([k]), StorageType::U32);
        upload_u32(&mut cluster_start, clusters.cluster_start());

        let mut cluster_len = TensorHandle::zeros(client, Vec::from([k]), StorageType::U32);
        upload_u32(&mut cluster_len, clusters.cluster_len());

        let mut cluster_members = TensorHandle::zeros(client, Vec::from([t]), StorageType::U32);
        upload_u32(&mut cluster_members, clusters.members());

        Ok(Self {
            points,
            points_out,
            inv_cluster,
            cluster_start,
            cluster_len,
            cluster_members,
        })
    }

    /// Swaps the roles of `points` and `points_out` after a pass has
    /// finished writing into `points_out`, so the next launch reads from
    /// the freshly written buffer without an extra device-side copy.
    pub fn swap(&mut self) {
        core::mem::swap(&mut self.points, &mut self.points_out);
    }

    pub fn download_points(&self, client: &ComputeClient<R>) -> BundleResult<Vec<f32>> {
        download_f32(client, &self.points)
            .map_err(|e| BundleError::device_oom(alloc::format!("readback failed: {e}")))
    }
}

fn upload_f32<R: Runtime>(handle: &mut TensorHandle<R>, data: &[f32]) {
    let mut i = 0usize;
    cubecl::std::tensor::fill_with(handle, |_| {
        let v = data[i];
        i += 1;
        v
    });
}

fn upload_u32<R: Runtime>(handle: &mut TensorHandle<R>, data: &[u32]) {
    let mut i = 0usize;
    cubecl::std::tensor::fill_with(handle, |_| {
        let v = data[i];
        i += 1;
        v
    });
}

fn download_f32<R: Runtime>(client: &ComputeClient<R>, handle: &TensorHandle<R>) -> Result<Vec<f32>, alloc::string::String> {
    cubecl::std::tensor::read_to_vec(client, handle)
}

#[cfg(test)]
mod tests {
    // Integration tests require a runtime; buffer shapes are exercised
    // indirectly through the scenario tests in tests/suite.
}
