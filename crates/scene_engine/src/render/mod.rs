//! Rendering
//!
//! The renderer never talks to a graphics API directly. It walks the scene
//! graph and drives a [`RenderBackend`], which owns programs, buffers and
//! textures behind opaque handles.

pub mod api;
pub mod primitives;
pub mod shader_config;
pub mod renderer;

use thiserror::Error;

pub use api::{
    BackendCall, BackendResult, BufferHandle, ProgramHandle, RecordingBackend, RenderBackend,
    TextureFilter, TextureHandle, UniformValue,
};
pub use primitives::{Camera, Projection};
pub use renderer::{FrameContext, FrameStats, Renderer};
pub use shader_config::{ShaderConfig, ShadingMode};

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    ///
    /// Occurs when a shader program for one of the shading modes cannot be
    /// created.
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Resource creation or management failed
    ///
    /// Occurs when vertex buffers or textures cannot be created for a mesh.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),
}
