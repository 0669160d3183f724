//! Error types for the edge-bundling engine.

use alloc::string::String;

/// Errors that can occur while preparing or running the bundler.
///
/// `NumericWarning` is deliberately not raised through this type at the
/// resample boundary — it is logged and non-fatal per the error policy, so
/// turning it into a hard error would misrepresent the contract. It remains
/// a variant here for callers that build their own diagnostics pipeline on
/// top of the engine and want a typed representation of the event.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum BundleError {
    /// Input tensor is not `[T, L, 3]`, or trajectories disagree on `L`.
    #[cfg_attr(feature = "std", error("invalid shape: {message}"))]
    InvalidShape { message: String },

    /// `T == 0`.
    #[cfg_attr(feature = "std", error("empty input: no trajectories"))]
    EmptyInput,

    /// No GPU available, or kernel compilation failed.
    #[cfg_attr(feature = "std", error("device unavailable: {message}"))]
    DeviceUnavailable { message: String },

    /// Device-side buffer allocation failed.
    #[cfg_attr(feature = "std", error("device out of memory: {message}"))]
    DeviceOom { message: String },

    /// Resampling produced a length other than `L`. Non-fatal; logged via
    /// `tracing::warn!` by the resampler rather than returned as an `Err`.
    #[cfg_attr(feature = "std", error("numeric warning: {message}"))]
    NumericWarning { message: String },

    /// Caller requested cancellation.
    #[cfg_attr(feature = "std", error("cancelled"))]
    Cancelled,

    /// Kernel launch failure not otherwise classified.
    #[cfg_attr(feature = "std", error("launch error: {message}"))]
    LaunchError { message: String },
}

impl BundleError {
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape {
            message: message.into(),
        }
    }

    pub fn device_unavailable(message: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            message: message.into(),
        }
    }

    pub fn device_oom(message: impl Into<String>) -> Self {
        Self::DeviceOom {
            message: message.into(),
        }
    }

    pub fn numeric_warning(message: impl Into<String>) -> Self {
        Self::NumericWarning {
            message: message.into(),
        }
    }

    pub fn launch(message: impl Into<String>) -> Self {
        Self::LaunchError {
            message: message.into(),
        }
    }
}

/// Result type for bundler operations.
pub type BundleResult<T> = core::result::Result<T, BundleError>;
