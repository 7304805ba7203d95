//! Scene nodes
//!
//! Every node carries a parent-relative [`Transform`] and one [`NodeKind`]
//! variant. Hierarchy links live on the node but are only changed through
//! [`SceneGraph`](super::SceneGraph), which keeps them consistent.

use crate::assets::{CompiledMesh, ImageData, Material};
use crate::foundation::math::{Mat4, Transform, Vec3};
use crate::render::api::{BufferHandle, TextureHandle};

slotmap::new_key_type! {
    /// Identifier of a node in a [`SceneGraph`](super::SceneGraph)
    pub struct NodeId;
}

/// Shared transform behavior of every node variant
pub trait Transformable {
    /// Parent-relative transform
    fn transform(&self) -> &Transform;

    /// Mutable parent-relative transform
    fn transform_mut(&mut self) -> &mut Transform;

    /// Local matrix, `T · Rz · Ry · Rx · S`
    fn local_transform(&self) -> Mat4 {
        self.transform().to_matrix()
    }

    /// Replace translation, rotation and scale
    ///
    /// Children are not touched; their world transforms pick up the change
    /// the next time they are composed.
    fn set_local_transform(&mut self, translation: Vec3, rotation: Vec3, scale: Vec3) {
        *self.transform_mut() = Transform::new(translation, rotation, scale);
    }
}

/// A node of the scene tree
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Display name, not necessarily unique
    pub name: String,
    /// Parent-relative transform
    pub transform: Transform,
    /// Variant data
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    /// Create a detached node
    pub fn new(name: impl Into<String>, transform: Transform, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a detached group node
    pub fn group(name: impl Into<String>, transform: Transform) -> Self {
        Self::new(name, transform, NodeKind::Group)
    }

    /// Parent node, `None` for the root or a detached node
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in render order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Mesh data if this is a mesh node
    pub fn as_mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(&**mesh),
            _ => None,
        }
    }

    /// Mutable mesh data if this is a mesh node
    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshNode> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(&mut **mesh),
            _ => None,
        }
    }
}

impl Transformable for SceneNode {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

/// Node variants
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure grouping node
    Group,
    /// Renderable mesh
    Mesh(Box<MeshNode>),
    /// Point light positioned by the node's world transform
    PointLight(PointLight),
    /// Directional light
    DirectionalLight(DirectionalLight),
}

impl NodeKind {
    /// Type tag used in scene descriptions
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Group => "node",
            Self::Mesh(_) => "object",
            Self::PointLight(_) => "pointLight",
            Self::DirectionalLight(_) => "directionalLight",
        }
    }
}

/// Point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Normalized RGB color
    pub color: Vec3,
    /// Intensity
    pub power: f32,
}

/// Directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction in object-local space
    pub direction: Vec3,
    /// Normalized RGB color
    pub color: Vec3,
    /// Intensity
    pub power: f32,
}

/// Backend resources of a mesh node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshGpuResources {
    /// Uploaded vertex buffer
    pub vertex_buffer: BufferHandle,
    /// Color texture (unit 0)
    pub texture: TextureHandle,
    /// Normal map (unit 1)
    pub normal_map: TextureHandle,
}

/// Renderable mesh data
#[derive(Debug, Clone)]
pub struct MeshNode {
    /// Compiled interleaved vertex data
    pub geometry: CompiledMesh,
    /// Phong material, editable at runtime
    pub material: Material,
    /// Color texture path from the description
    pub texture_path: Option<String>,
    /// Normal map path from the description
    pub normal_map_path: Option<String>,
    /// Decoded color texture, or a placeholder
    pub texture: ImageData,
    /// Decoded normal map, or a placeholder
    pub normal_map: ImageData,
    gpu: Option<MeshGpuResources>,
}

impl MeshNode {
    /// Create mesh data with no backend resources yet
    pub fn new(
        geometry: CompiledMesh,
        material: Material,
        texture_path: Option<String>,
        normal_map_path: Option<String>,
        texture: ImageData,
        normal_map: ImageData,
    ) -> Self {
        Self {
            geometry,
            material,
            texture_path,
            normal_map_path,
            texture,
            normal_map,
            gpu: None,
        }
    }

    /// Number of vertices drawn for this mesh
    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }

    /// Backend resources, once created by the first render
    pub fn gpu_resources(&self) -> Option<&MeshGpuResources> {
        self.gpu.as_ref()
    }

    pub(crate) fn set_gpu_resources(&mut self, resources: MeshGpuResources) {
        self.gpu = Some(resources);
    }

    /// Forget the backend resources so the next render recreates them
    pub fn invalidate_gpu_resources(&mut self) {
        if self.gpu.take().is_some() {
            log::debug!("Mesh GPU resources invalidated");
        }
    }
}
