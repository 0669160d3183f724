//! GPU kernels for the bundler's two per-point passes.
//!
//! Both kernels operate purely in f32 (§9 coordinate-precision choice) over
//! the flat, 4-wide-padded point layout described in §3.

mod attract;
mod smooth;

pub use attract::launch_attract;
pub use smooth::launch_smooth;
