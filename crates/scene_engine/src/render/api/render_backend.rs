//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait a rasterization backend implements so the
//! scene renderer can drive it: programs per shading mode, named uniform and
//! attribute slots, vertex buffer upload, texture binding and draw calls.

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::shader_config::{ShaderConfig, ShadingMode};
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a linked shader program stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Handle to a vertex buffer stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Handle to a texture stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Texture magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    /// Bilinear filtering
    Linear,
    /// Nearest-texel sampling
    Nearest,
}

impl TextureFilter {
    /// Filter matching the bilinear toggle
    pub const fn from_bilinear(use_bilinear: bool) -> Self {
        if use_bilinear {
            Self::Linear
        } else {
            Self::Nearest
        }
    }
}

/// Main rendering backend trait
///
/// Uniform setters address slots by name in the program last passed to
/// [`RenderBackend::use_program`]. Names the program does not declare are
/// silently ignored, never an error.
pub trait RenderBackend {
    /// Compile and link the program for a shading mode
    fn create_program(&mut self, mode: ShadingMode, config: &ShaderConfig) -> BackendResult<ProgramHandle>;

    /// Start a frame covering a viewport of the given size
    fn begin_frame(&mut self, width: u32, height: u32) -> BackendResult<()>;

    /// Finish the current frame
    fn end_frame(&mut self) -> BackendResult<()>;

    /// Make a program current
    fn use_program(&mut self, program: ProgramHandle) -> BackendResult<()>;

    /// Set a 4x4 matrix uniform
    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4);

    /// Set a 3-component vector uniform
    fn set_uniform_vec3(&mut self, name: &str, value: &Vec3);

    /// Set a float uniform
    fn set_uniform_f32(&mut self, name: &str, value: f32);

    /// Set an integer uniform (also used for sampler units)
    fn set_uniform_i32(&mut self, name: &str, value: i32);

    /// Location of a vertex attribute in the current program, if it declares one
    fn attribute_location(&self, name: &str) -> Option<u32>;

    /// Upload vertex data into a new buffer
    fn create_vertex_buffer(&mut self, data: &[u8]) -> BackendResult<BufferHandle>;

    /// Upload RGBA8 pixels into a new texture
    fn create_texture(&mut self, image: &ImageData) -> BackendResult<TextureHandle>;

    /// Bind a texture to a texture unit with the given magnification filter
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle, filter: TextureFilter) -> BackendResult<()>;

    /// Bind a vertex buffer as the source for subsequent attribute pointers
    fn bind_vertex_buffer(&mut self, buffer: BufferHandle) -> BackendResult<()>;

    /// Point an attribute location at float data in the bound buffer
    fn enable_vertex_attribute(&mut self, location: u32, components: u32, stride: u32, offset: u32);

    /// Draw a non-indexed triangle list
    fn draw_triangles(&mut self, first_vertex: u32, vertex_count: u32) -> BackendResult<()>;
}
