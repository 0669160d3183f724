//! Smoothing kernel (§4.6): blends each point toward its local window mean.
//!
//! Same flat dispatch shape as [`attract`](super::attract); the window
//! walk is grounded on `dot_product_kernel`'s runtime `while`-loop
//! accumulation pattern. Endpoints are left untouched, matching the
//! attraction kernel's endpoint pinning.

use alloc::format;

use cubecl::Runtime;
use cubecl::client::ComputeClient;
use cubecl::prelude::*;
use cubecl::std::tensor::TensorHandle;

use crate::error::{BundleError, BundleResult};
use crate::params::BundleParams;

const BLOCK_SIZE: u32 = 256;

/// Launches one chunk of the smoothing pass over trajectories
/// `[chunk_offset, chunk_offset + chunk_width)`.
pub fn launch_smooth<R: Runtime>(
    client: &ComputeClient<R>,
    points: &TensorHandle<R>,
    points_out: &mut TensorHandle<R>,
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
        smooth_kernel::launch_unchecked::<R>(
            client,
            cube_count,
            cube_dim,
            points.as_arg(1),
            points_out.as_arg(1),
            ScalarArg::new(length),
            ScalarArg::new(chunk_offset),
            ScalarArg::new(chunk_width),
            ScalarArg::new(params.smooth_radius),
            ScalarArg::new(params.smooth_intensity),
        )
        .map_err(|e| BundleError::launch(format!("smooth kernel failed: {:?}", e)))
    }
}

#[cube(launch_unchecked)]
fn smooth_kernel(
    points: &Tensor<Line<f32>>,
    points_out: &mut Tensor<Line<f32>>,
    length: u32,
    chunk_offset: u32,
    chunk_width: u32,
    smooth_radius: u32,
    smooth_intensity: f32,
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

        if i == 0u32 || i == length - 1u32 {
            points_out[base] = Line::new(px);
            points_out[base + 1] = Line::new(py);
            points_out[base + 2] = Line::new(pz);
            points_out[base + 3] = Line::new(pad);
        } else {
            let lo = if i > smooth_radius { i - smooth_radius } else { 0u32 };
            let hi_candidate = i + smooth_radius;
            let hi = if hi_candidate < length - 1u32 { hi_candidate } else { length - 1u32 };

            let mut sum_x = 0f32;
            let mut sum_y = 0f32;
            let mut sum_z = 0f32;
            let mut count = 0f32;

            let mut j = lo;
            while j <= hi {
                let nbase = (t * length + j) * 4;
                sum_x += points[nbase][0];
                sum_y += points[nbase + 1][0];
                sum_z += points[nbase + 2][0];
                count += 1f32;
                j += 1u32;
            }

            let mx = sum_x / count;
            let my = sum_y / count;
            let mz = sum_z / count;

            let alpha = smooth_intensity;
            let new_x = (1f32 - alpha) * px + alpha * mx;
            let new_y = (1f32 - alpha) * py + alpha * my;
            let new_z = (1f32 - alpha) * pz + alpha * mz;

            points_out[base] = Line::new(new_x);
            points_out[base + 1] = Line::new(new_y);
            points_out[base + 2] = Line::new(new_z);
            points_out[base + 3] = Line::new(pad);
        }
    }
}
