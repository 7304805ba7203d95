//! Backend-facing rendering API

pub mod render_backend;
pub mod recording;

pub use render_backend::{
    BackendResult, BufferHandle, ProgramHandle, RenderBackend, TextureFilter, TextureHandle,
};
pub use recording::{BackendCall, RecordingBackend, UniformValue};
