//! # Startup Errors
//!
//! Everything that can stop the viewer before the first frame ends up in
//! [`StartupError`]. Per-frame problems never do: they are logged where they happen
//! and the frame is skipped.

use std::{io, path::PathBuf};

use crate::config::ConfigError;

/// A failure while bringing up the window, the GPU or the assets.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The winit event loop could not be created or stopped abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// wgpu could not create a surface for the window.
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// No adapter is compatible with the surface.
    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to open a device.
    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The surface reports no usable format for this adapter.
    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,

    /// The shader source could not be read.
    #[error("failed to read shader {}: {source}", path.display())]
    ShaderRead {
        /// Shader file that was requested
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The texture atlas could not be opened or decoded.
    #[error("failed to load texture atlas {}: {source}", path.display())]
    AtlasDecode {
        /// Atlas file that was requested
        path: PathBuf,
        /// Underlying decode error
        source: image::ImageError,
    },

    /// The shader failed to compile or did not match the block pipeline.
    #[error("failed to build the block pipeline: {0}")]
    Pipeline(String),

    /// `config.json` is unreadable or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_names_the_pipeline() {
        let err = StartupError::Pipeline("entry point vs_main not found".to_string());
        assert_eq!(
            err.to_string(),
            "failed to build the block pipeline: entry point vs_main not found"
        );
    }
}
