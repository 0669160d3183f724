//! # Edge Bundler
//!
//! Data-parallel trajectory edge-bundling for 3D trajectory visualization.
//!
//! ## Pipeline
//!
//! - Resample ragged input trajectories to a fixed length ([`resample`])
//! - Cluster trajectories with QuickBundles ([`cluster`])
//! - Estimate bundling parameters from the data's spatial extent ([`params`])
//! - Run the chunked attract/smooth GPU dispatch loop ([`launch`])
//!
//! ## Example
//!
//! ```ignore
//! use edge_bundler::{BundleConfig, run_bundling};
//!
//! let result = run_bundling(&client, &tracks, &BundleConfig::default(), &())?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod cluster;
pub mod error;
pub mod kernels;
pub mod launch;
pub mod output;
pub mod params;
pub mod resample;
pub mod tensor;

pub use cluster::{ClusterAssignment, build_clusters};
pub use error::BundleError;
pub use launch::{BundleConfig, CancellationToken, run_bundling};
pub use output::to_output;
pub use params::{BundleParams, ParamOverrides, estimate};
pub use resample::{RawTrack, resample_tracks};
pub use tensor::{AttributeTensor, Precision, TrackTensor};
