//! Scene renderer
//!
//! Walks the scene graph depth-first, pre-order, once per frame. Every node
//! gets the active program, its transforms, the camera position, the world
//! scale and the full light arrays. Mesh nodes then bind their material,
//! textures and vertex attributes and issue one draw.
//!
//! Programs are created on first use, one per [`ShadingMode`]. Mesh GPU
//! resources are created on a mesh's first draw and reused afterwards.

use std::collections::HashMap;

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::scene::{LightUniforms, MeshGpuResources, MeshNode, NodeKind, Scene};

use super::api::{ProgramHandle, RenderBackend, TextureFilter};
use super::primitives::{Camera, VERTEX_ATTRIBUTES, VERTEX_STRIDE};
use super::shader_config::{ShaderConfig, ShadingMode};
use super::RenderError;

/// Texture unit of the color texture
pub const COLOR_TEXTURE_UNIT: u32 = 0;

/// Texture unit of the normal map
pub const NORMAL_MAP_UNIT: u32 = 1;

/// Per-frame inputs of the renderer
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Camera to render from
    pub camera: &'a Camera,
    /// Active shading mode
    pub shading: ShadingMode,
    /// Linear (true) or nearest (false) texture magnification
    pub use_bilinear: bool,
    /// Viewport size in pixels
    pub viewport: (u32, u32),
}

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Nodes visited by the traversal
    pub nodes_visited: usize,
    /// Draw calls issued
    pub draw_calls: usize,
    /// Vertices submitted across all draws
    pub vertices_submitted: usize,
}

impl std::ops::AddAssign for FrameStats {
    fn add_assign(&mut self, other: Self) {
        self.nodes_visited += other.nodes_visited;
        self.draw_calls += other.draw_calls;
        self.vertices_submitted += other.vertices_submitted;
    }
}

/// Uniform values shared by every node of a frame
struct FrameUniforms {
    view_projection: Mat4,
    view_position: Vec3,
    world_scale: f32,
    lights: LightUniforms,
    filter: TextureFilter,
}

/// Scene graph renderer
pub struct Renderer {
    shader_dir: String,
    programs: HashMap<ShadingMode, ProgramHandle>,
    frames_rendered: u64,
}

impl Renderer {
    /// Create a renderer loading shader sources from `shader_dir`
    pub fn new(shader_dir: impl Into<String>) -> Self {
        Self {
            shader_dir: shader_dir.into(),
            programs: HashMap::new(),
            frames_rendered: 0,
        }
    }

    /// Directory shader sources are loaded from
    pub fn shader_dir(&self) -> &str {
        &self.shader_dir
    }

    /// Number of completed frames
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Create the programs of every shading mode up front
    pub fn prepare(&mut self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        for mode in ShadingMode::ALL {
            self.program(mode, backend)?;
        }
        log::info!("Renderer ready: {} shading programs", self.programs.len());
        Ok(())
    }

    /// Program of a shading mode, created on first request
    pub fn program(&mut self, mode: ShadingMode, backend: &mut dyn RenderBackend) -> Result<ProgramHandle, RenderError> {
        if let Some(&program) = self.programs.get(&mode) {
            return Ok(program);
        }

        let config = ShaderConfig::for_mode(&self.shader_dir, mode);
        let program = backend.create_program(mode, &config).map_err(|e| {
            RenderError::InitializationFailed(format!("{} program: {}", mode, e))
        })?;
        self.programs.insert(mode, program);
        Ok(program)
    }

    /// Render one frame of `scene`
    pub fn render(
        &mut self,
        scene: &mut Scene,
        frame: &FrameContext<'_>,
        backend: &mut dyn RenderBackend,
    ) -> Result<FrameStats, RenderError> {
        let program = self.program(frame.shading, backend)?;
        let (width, height) = frame.viewport;
        backend.begin_frame(width, height)?;

        let world_transforms = scene.graph.world_transforms();
        let uniforms = FrameUniforms {
            view_projection: frame.camera.view_projection_matrix(),
            view_position: frame.camera.position,
            world_scale: scene.graph.root_world_transform().axis_scaling().x,
            lights: scene.lights.gather(&scene.graph),
            filter: TextureFilter::from_bilinear(frame.use_bilinear),
        };

        let order: Vec<_> = scene.graph.iter_depth_first().collect();
        let mut stats = FrameStats::default();

        for id in order {
            let Some(&world) = world_transforms.get(id) else {
                continue;
            };
            let Some(node) = scene.graph.get_mut(id) else {
                continue;
            };

            backend.use_program(program)?;
            Self::set_node_uniforms(backend, &uniforms, &world);
            Self::set_light_uniforms(backend, &uniforms.lights);
            stats.nodes_visited += 1;

            if let NodeKind::Mesh(mesh) = &mut node.kind {
                Self::draw_mesh(backend, mesh, uniforms.filter)
                    .map_err(|e| RenderError::RenderingFailed(format!("mesh '{}': {}", node.name, e)))?;
                stats.draw_calls += 1;
                stats.vertices_submitted += mesh.vertex_count();
            }
        }

        backend.end_frame()?;
        self.frames_rendered += 1;

        log::trace!(
            "Frame {}: {} nodes, {} draws, {} vertices ({} shading)",
            self.frames_rendered,
            stats.nodes_visited,
            stats.draw_calls,
            stats.vertices_submitted,
            frame.shading
        );
        Ok(stats)
    }

    fn set_node_uniforms(backend: &mut dyn RenderBackend, uniforms: &FrameUniforms, world: &Mat4) {
        let mvp = uniforms.view_projection * world;
        backend.set_uniform_mat4("u_mvp_matrix", &mvp);
        backend.set_uniform_mat4("u_m_matrix", world);
        backend.set_uniform_mat4("u_m_matrix_frag", world);
        backend.set_uniform_vec3("viewPos", &uniforms.view_position);
        backend.set_uniform_f32("worldScale", uniforms.world_scale);
    }

    fn set_light_uniforms(backend: &mut dyn RenderBackend, lights: &LightUniforms) {
        for (i, light) in lights.point.iter().enumerate() {
            backend.set_uniform_vec3(&format!("pointLights[{i}].location"), &light.location);
            backend.set_uniform_vec3(&format!("pointLights[{i}].color"), &light.color);
            backend.set_uniform_f32(&format!("pointLights[{i}].power"), light.power);
        }
        for (i, light) in lights.directional.iter().enumerate() {
            backend.set_uniform_vec3(&format!("directionalLights[{i}].direction"), &light.direction);
            backend.set_uniform_vec3(&format!("directionalLights[{i}].color"), &light.color);
            backend.set_uniform_f32(&format!("directionalLights[{i}].power"), light.power);
        }
        backend.set_uniform_i32("numPointLights", lights.point.len() as i32);
        backend.set_uniform_i32("numDirLights", lights.directional.len() as i32);
    }

    fn draw_mesh(backend: &mut dyn RenderBackend, mesh: &mut MeshNode, filter: TextureFilter) -> Result<(), RenderError> {
        let material = mesh.material;
        backend.set_uniform_f32("ns", material.specular_exponent);
        backend.set_uniform_vec3("ka", &material.ambient);
        backend.set_uniform_vec3("kd", &material.diffuse);
        backend.set_uniform_vec3("ks", &material.specular);

        let resources = match mesh.gpu_resources() {
            Some(resources) => *resources,
            None => Self::create_gpu_resources(backend, mesh)?,
        };

        backend.bind_texture(COLOR_TEXTURE_UNIT, resources.texture, filter)?;
        backend.set_uniform_i32("uSampler", COLOR_TEXTURE_UNIT as i32);
        backend.bind_texture(NORMAL_MAP_UNIT, resources.normal_map, filter)?;
        backend.set_uniform_i32("normalMap", NORMAL_MAP_UNIT as i32);

        backend.bind_vertex_buffer(resources.vertex_buffer)?;
        for attribute in VERTEX_ATTRIBUTES {
            if let Some(location) = backend.attribute_location(attribute.name) {
                backend.enable_vertex_attribute(location, attribute.components, VERTEX_STRIDE, attribute.offset);
            }
        }

        let vertex_count = u32::try_from(mesh.vertex_count())
            .map_err(|_| RenderError::RenderingFailed(format!("{} vertices exceed a single draw", mesh.vertex_count())))?;
        backend.draw_triangles(0, vertex_count)
    }

    fn create_gpu_resources(backend: &mut dyn RenderBackend, mesh: &mut MeshNode) -> Result<MeshGpuResources, RenderError> {
        let resources = MeshGpuResources {
            vertex_buffer: backend.create_vertex_buffer(mesh.geometry.as_bytes())?,
            texture: backend.create_texture(&mesh.texture)?,
            normal_map: backend.create_texture(&mesh.normal_map)?,
        };
        log::debug!(
            "Uploaded mesh: {} vertices, texture {}x{}, normal map {}x{}",
            mesh.vertex_count(),
            mesh.texture.width,
            mesh.texture.height,
            mesh.normal_map.width,
            mesh.normal_map.height
        );

        mesh.set_gpu_resources(resources);
        Ok(resources)
    }
}
