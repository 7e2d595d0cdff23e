//! Render errors.
//!
//! Numerical corner cases (missed rays, absorbed paths, depth exhaustion) are
//! normal outcomes of the integrator and never show up here. Only setup
//! problems do.

use thiserror::Error;

/// Errors that can occur while setting up or running a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid render settings: {0}")]
    InvalidSettings(String),

    #[error(
        "framebuffer is {actual_width}x{actual_height}, render expects {expected_width}x{expected_height}"
    )]
    FramebufferSize {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
