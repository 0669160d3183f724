//! Attraction kernel (§4.5): pulls each point toward its cluster's local mean.
//!
//! Grounded on the element-wise dispatch shape of `hadamard_kernel` (flat
//! `ABSOLUTE_POS` indexing, one cube per `BLOCK_SIZE` points) and on
//! `dot_product_kernel`'s use of a runtime `while` loop for an
//! index-dependent reduction. Unlike both, the per-point work here reads
//! from a caller-chosen, variable-length neighborhood (a cluster's member
//! list) rather than a fixed stride, so there is no vectorization across
//! `Line<E>`; every tensor here uses a line size of 1.
//!
//! The averaging loop below walks every member of `t`'s cluster, including
//! `t` itself. Scenario S1 (two parallel five-point lines, one cluster,
//! `magnet_radius` large enough to cover both) locks this: its interior
//! points move exactly halfway to the *pair* mean, which only falls out if
//! each trajectory counts itself alongside its sibling in the average.
//! Excluding self would move both lines all the way to the sibling's track.

use alloc::format;

use cubecl::Runtime;
use cubecl::client::ComputeClient;
use cubecl::prelude::*;
use cubecl::std::tensor::TensorHandle;

use crate::error::{BundleError, BundleResult};
use crate::params::BundleParams;

const BLOCK_SIZE: u32 = 256;

/// Launches one chunk of the attraction pass over trajectories
/// `[chunk_offset, chunk_offset + chunk_width)`.
///
/// `points`/`points_out` are the flat, 4-wide-padded `[T*L, 4]` buffers from
/// §3; `inv_cluster`, `cluster_start`, `cluster_len`, `cluster_members` are
/// the cluster builder's CSR layout, already resident on the device.
#[allow(clippy::too_many_arguments)]
pub fn launch_attract<R: Runtime>(
    client: &ComputeClient<R>,
    points: &TensorHandle<R>,
    points_out: &mut TensorHandle<R>,
    inv_cluster: &TensorHandle<R>,
    cluster_start: &TensorHandle<R>,
    cluster_len: &TensorHandle<R>,
    cluster_members: &TensorHandle<R>,
    length: u32,
    chunk_offset: u32,
    chunk_width: u32,
    params: &BundleParams,
) -> BundleResult<()> {
    let num_elements = chunk_width * length;
    if num_elements == 0 {
        return Ok(());
    }

    let num_cubes = (num_elements + BLOCK_SIZE - 1) / BLOCK_SIZE;
    let cube_dim = CubeDim { x: BLOCK_SIZE, y: 1, z: 1 };
    let cube_count = CubeCount::Static(num_cubes, 1, 1);

    unsafe {
        attract_kernel::launch_unchecked::<R>(
            client,
            cube_count,
            cube_dim,
            points.as_arg(1),
            points_out.as_arg(1),
            inv_cluster.as_arg(1),
            cluster_start.as_arg(1),
            cluster_len.as_arg(1),
            cluster_members.as_arg(1),
            ScalarArg::new(length),
            ScalarArg::new(chunk_offset),
            ScalarArg::new(chunk_width),
            ScalarArg::new(params.magnet_radius),
            ScalarArg::new(params.step_size),
            ScalarArg::new(params.angle_min),
            ScalarArg::new(params.bundle_endpoints as u32),
        )
        .map_err(|e| BundleError::launch(format!("attract kernel failed: {:?}", e)))
    }
}

#[cube(launch_unchecked)]
fn attract_kernel(
    points: &Tensor<Line<f32>>,
    points_out: &mut Tensor<Line<f32>>,
    inv_cluster: &Tensor<Line<u32>>,
    cluster_start: &Tensor<Line<u32>>,
    cluster_len: &Tensor<Line<u32>>,
    cluster_members: &Tensor<Line<u32>>,
    length: u32,
    chunk_offset: u32,
    chunk_width: u32,
    magnet_radius: f32,
    step_size: f32,
    angle_min: f32,
    bundle_endpoints: u32,
) {
    let idx = ABSOLUTE_POS;
    let total = chunk_width * length;
    if idx < total {
        let t_local = idx / length;
        let i = idx % length;
        let t = chunk_offset + t_local;
        let base = (t * length + i) * 4;

        let px = points[base][0];
        let py = points[base + 1][0];
        let pz = points[base + 2][0];
        let pad = points[base + 3][0];

        let c = inv_cluster[t][0];
        let start = cluster_start[c][0];
        let len_c = cluster_len[c][0];

        let has_direction = i > 0 && i < length - 1;
        let dpx = if has_direction { points[base + 4][0] - points[base - 4][0] } else { 0f32 };
        let dpy = if has_direction { points[base + 5][0] - points[base - 3][0] } else { 0f32 };
        let dpz = if has_direction { points[base + 6][0] - points[base - 2][0] } else { 0f32 };
        let dp_norm = f32::sqrt(dpx * dpx + dpy * dpy + dpz * dpz);

        let mut sum_x = 0f32;
        let mut sum_y = 0f32;
        let mut sum_z = 0f32;
        let mut n = 0u32;

        let mut m = 0u32;
        while m < len_c {
            let t2 = cluster_members[start + m][0];
            let base2 = (t2 * length + i) * 4;
            let qx = points[base2][0];
            let qy = points[base2 + 1][0];
            let qz = points[base2 + 2][0];

            let dx = px - qx;
            let dy = py - qy;
            let dz = pz - qz;
            let dist = f32::sqrt(dx * dx + dy * dy + dz * dz);

            if dist <= magnet_radius {
                let mut passes = true;
                if angle_min > 0f32 && has_direction {
                    let dqx = points[base2 + 4][0] - points[base2 - 4][0];
                    let dqy = points[base2 + 5][0] - points[base2 - 3][0];
                    let dqz = points[base2 + 6][0] - points[base2 - 2][0];
                    let dq_norm = f32::sqrt(dqx * dqx + dqy * dqy + dqz * dqz);
                    let denom = dp_norm * dq_norm;
                    let raw = if denom > 0f32 { (dpx * dqx + dpy * dqy + dpz * dqz) / denom } else { 0f32 };
                    let clamped = if raw < 0f32 { 0f32 } else { raw };
                    let sim = clamped / 2f32 + 0.5f32;
                    passes = sim >= angle_min;
                }
                if passes {
                    sum_x += qx;
                    sum_y += qy;
                    sum_z += qz;
                    n += 1u32;
                }
            }
            m += 1u32;
        }

        let mut new_x = px;
        let mut new_y = py;
        let mut new_z = pz;
        if n > 0u32 {
            let nf = n as f32;
            let mx = sum_x / nf;
            let my = sum_y / nf;
            let mz = sum_z / nf;
            new_x = px + step_size * (mx - px);
            new_y = py + step_size * (my - py);
            new_z = pz + step_size * (mz - pz);
        }

        if bundle_endpoints == 0u32 && (i == 0u32 || i == length - 1u32) {
            new_x = px;
            new_y = py;
            new_z = pz;
        }

        points_out[base] = Line::new(new_x);
        points_out[base + 1] = Line::new(new_y);
        points_out[base + 2] = Line::new(new_z);
        points_out[base + 3] = Line::new(pad);
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require a runtime; see tests/suite for scenario
    // coverage (S1, S2, S4) that locks this kernel's exact arithmetic.
}
