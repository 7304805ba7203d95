//! In-memory backend that records every call
//!
//! Used headlessly by the viewer binary and by tests. The backend exposes a
//! configurable program interface: uniform and attribute names it does not
//! know are skipped exactly like a real program would skip them.

use std::collections::HashSet;

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::primitives::VERTEX_ATTRIBUTES;
use crate::render::shader_config::{ShaderConfig, ShadingMode};
use crate::render::RenderError;

use super::render_backend::{
    BackendResult, BufferHandle, ProgramHandle, RenderBackend, TextureFilter, TextureHandle,
};

/// Value written to a uniform slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// 4x4 matrix
    Mat4(Mat4),
    /// 3-component vector
    Vec3(Vec3),
    /// Float scalar
    F32(f32),
    /// Integer scalar
    I32(i32),
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// A program was created
    CreateProgram {
        /// Shading mode it implements
        mode: ShadingMode,
        /// Handle handed out
        program: ProgramHandle,
    },
    /// A frame started
    BeginFrame {
        /// Viewport width
        width: u32,
        /// Viewport height
        height: u32,
    },
    /// A frame ended
    EndFrame,
    /// A program was made current
    UseProgram(ProgramHandle),
    /// A known uniform was written
    SetUniform {
        /// Uniform name
        name: String,
        /// Value written
        value: UniformValue,
    },
    /// A vertex buffer was created
    CreateVertexBuffer {
        /// Handle handed out
        buffer: BufferHandle,
        /// Uploaded size in bytes
        size: usize,
    },
    /// A texture was created
    CreateTexture {
        /// Handle handed out
        texture: TextureHandle,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// A texture was bound
    BindTexture {
        /// Texture unit
        unit: u32,
        /// Bound texture
        texture: TextureHandle,
        /// Magnification filter
        filter: TextureFilter,
    },
    /// A vertex buffer was bound
    BindVertexBuffer(BufferHandle),
    /// An attribute pointer was set
    VertexAttribute {
        /// Attribute location
        location: u32,
        /// Number of floats
        components: u32,
        /// Byte stride
        stride: u32,
        /// Byte offset
        offset: u32,
    },
    /// A draw was issued
    Draw {
        /// First vertex
        first_vertex: u32,
        /// Number of vertices
        vertex_count: u32,
    },
}

/// Backend that records calls instead of rendering
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    /// `None` accepts every uniform name
    uniforms: Option<HashSet<String>>,
    attributes: Vec<String>,
    next_handle: u64,
    skipped_uniforms: usize,
    fail_draws: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Backend whose programs declare every uniform and the standard mesh attributes
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            uniforms: None,
            attributes: VERTEX_ATTRIBUTES.iter().map(|a| a.name.to_string()).collect(),
            next_handle: 1,
            skipped_uniforms: 0,
            fail_draws: false,
        }
    }

    /// Backend whose programs declare only the given names
    ///
    /// A uniform entry `pointLights` also covers array members such as
    /// `pointLights[0].color`. Attribute locations follow list order.
    pub fn with_interface<U, A>(uniforms: U, attributes: A) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            uniforms: Some(uniforms.into_iter().map(Into::into).collect()),
            attributes: attributes.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    /// Make every draw call fail with a backend error
    #[must_use]
    pub fn failing_draws(mut self) -> Self {
        self.fail_draws = true;
        self
    }

    /// All recorded calls in order
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drop the recorded calls, keeping created resources
    pub fn clear(&mut self) {
        self.calls.clear();
        self.skipped_uniforms = 0;
    }

    /// Number of uniform writes ignored because the name was unknown
    pub fn skipped_uniforms(&self) -> usize {
        self.skipped_uniforms
    }

    /// Most recent value written to a uniform
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.calls.iter().rev().find_map(|call| match call {
            BackendCall::SetUniform { name: n, value } if n == name => Some(*value),
            _ => None,
        })
    }

    /// Every draw as `(first_vertex, vertex_count)`
    pub fn draws(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Draw { first_vertex, vertex_count } => Some((*first_vertex, *vertex_count)),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded calls matching a predicate
    pub fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    fn knows_uniform(&self, name: &str) -> bool {
        let Some(uniforms) = &self.uniforms else {
            return true;
        };
        let base = name.split('[').next().unwrap_or(name);
        uniforms.contains(name) || (base.len() < name.len() && uniforms.contains(base))
    }

    fn allocate(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if self.knows_uniform(name) {
            self.calls.push(BackendCall::SetUniform { name: name.to_string(), value });
        } else {
            self.skipped_uniforms += 1;
            log::trace!("Program has no uniform {}, skipped", name);
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn create_program(&mut self, mode: ShadingMode, config: &ShaderConfig) -> BackendResult<ProgramHandle> {
        let program = ProgramHandle(self.allocate());
        log::debug!(
            "Created {} program from {} + {}",
            mode,
            config.vertex_shader_path,
            config.fragment_shader_path
        );
        self.calls.push(BackendCall::CreateProgram { mode, program });
        Ok(program)
    }

    fn begin_frame(&mut self, width: u32, height: u32) -> BackendResult<()> {
        self.calls.push(BackendCall::BeginFrame { width, height });
        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        self.calls.push(BackendCall::EndFrame);
        Ok(())
    }

    fn use_program(&mut self, program: ProgramHandle) -> BackendResult<()> {
        self.calls.push(BackendCall::UseProgram(program));
        Ok(())
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Mat4) {
        self.set_uniform(name, UniformValue::Mat4(*value));
    }

    fn set_uniform_vec3(&mut self, name: &str, value: &Vec3) {
        self.set_uniform(name, UniformValue::Vec3(*value));
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::F32(value));
    }

    fn set_uniform_i32(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::I32(value));
    }

    fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| index as u32)
    }

    fn create_vertex_buffer(&mut self, data: &[u8]) -> BackendResult<BufferHandle> {
        let buffer = BufferHandle(self.allocate());
        self.calls.push(BackendCall::CreateVertexBuffer { buffer, size: data.len() });
        Ok(buffer)
    }

    fn create_texture(&mut self, image: &ImageData) -> BackendResult<TextureHandle> {
        if image.size_bytes() != (image.width * image.height * 4) as usize {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture data is {} bytes, expected {}x{} RGBA",
                image.size_bytes(),
                image.width,
                image.height
            )));
        }

        let texture = TextureHandle(self.allocate());
        self.calls.push(BackendCall::CreateTexture {
            texture,
            width: image.width,
            height: image.height,
        });
        Ok(texture)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle, filter: TextureFilter) -> BackendResult<()> {
        self.calls.push(BackendCall::BindTexture { unit, texture, filter });
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle) -> BackendResult<()> {
        self.calls.push(BackendCall::BindVertexBuffer(buffer));
        Ok(())
    }

    fn enable_vertex_attribute(&mut self, location: u32, components: u32, stride: u32, offset: u32) {
        self.calls.push(BackendCall::VertexAttribute { location, components, stride, offset });
    }

    fn draw_triangles(&mut self, first_vertex: u32, vertex_count: u32) -> BackendResult<()> {
        if self.fail_draws {
            return Err(RenderError::BackendError("draw rejected".to_string()));
        }
        self.calls.push(BackendCall::Draw { first_vertex, vertex_count });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_uniforms_are_skipped() {
        let mut backend = RecordingBackend::with_interface(["u_mvp_matrix", "pointLights"], ["a_position"]);

        backend.set_uniform_mat4("u_mvp_matrix", &Mat4::identity());
        backend.set_uniform_f32("worldScale", 2.0);
        backend.set_uniform_f32("pointLights[1].power", 3.0);

        assert_eq!(backend.skipped_uniforms(), 1);
        assert_eq!(backend.uniform("worldScale"), None);
        assert_eq!(backend.uniform("pointLights[1].power"), Some(UniformValue::F32(3.0)));
    }

    #[test]
    fn test_attribute_locations_follow_interface() {
        let backend = RecordingBackend::with_interface(Vec::<String>::new(), ["a_normal", "a_position"]);

        assert_eq!(backend.attribute_location("a_position"), Some(1));
        assert_eq!(backend.attribute_location("a_uv"), None);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut backend = RecordingBackend::new();
        let buffer = backend.create_vertex_buffer(&[0; 68]).unwrap();
        let texture = backend.create_texture(&ImageData::solid_color(1, 1, [0; 4])).unwrap();

        assert_ne!(buffer.0, texture.0);
    }

    #[test]
    fn test_rejects_inconsistent_texture() {
        let mut backend = RecordingBackend::new();
        let mut image = ImageData::solid_color(2, 2, [0; 4]);
        image.data.truncate(3);

        assert!(matches!(
            backend.create_texture(&image),
            Err(RenderError::ResourceCreationFailed(_))
        ));
    }
}
