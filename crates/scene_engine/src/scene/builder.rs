//! # Scene Builder
//!
//! Turns a JSON scene description into a [`SceneGraph`] and a [`Camera`].
//!
//! ```json
//! {
//!   "camera": { "type": "perspective", "position": [0, 2, 8], "lookat": [0, 0, 0],
//!               "up": [0, 1, 0], "fov": 60 },
//!   "root": { "type": "node", "name": "root", "children": [
//!     { "type": "object", "name": "teapot", "obj": "models/teapot.obj",
//!       "texture": "textures/teapot.png", "color": "#C0C0C0" },
//!     { "type": "pointLight", "name": "lamp", "translation": [2, 4, 2],
//!       "color": "#FFFFFF", "power": 10 },
//!     { "type": "directionalLight", "name": "sun", "direction": [0, -1, -1],
//!       "color": "#FFE0B0", "power": 1.5 }
//!   ] }
//! }
//! ```
//!
//! Structural problems, unknown types, missing required fields and bad colors
//! abort the build. Unreadable meshes, materials and textures do not: they
//! fall back to defaults with a warning.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::image_loader::{COLOR_PLACEHOLDER, NORMAL_PLACEHOLDER};
use crate::assets::{AssetSource, CompiledMesh, ImageData, Material, ObjLoader};
use crate::foundation::math::{utils, Transform, Vec3};
use crate::render::primitives::{Camera, Projection};

use super::node::{DirectionalLight, MeshNode, NodeId, NodeKind, PointLight, SceneNode};
use super::scene_graph::SceneGraph;
use super::{LoadedScene, Scene, SceneError};

/// Vertex color used by objects that give no `color`
const DEFAULT_OBJECT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Top-level scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Camera setup
    pub camera: CameraDescription,
    /// Root of the node tree
    pub root: NodeEntry,
}

/// Camera entry of a scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescription {
    /// Projection kind
    #[serde(rename = "type")]
    pub projection: Projection,
    /// Eye position
    pub position: [f32; 3],
    /// Point looked at
    pub lookat: [f32; 3],
    /// Up vector
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl CameraDescription {
    /// Instantiate the described camera
    pub fn build(&self) -> Camera {
        let position = Vec3::from(self.position);
        let target = Vec3::from(self.lookat);
        let up = Vec3::from(self.up);

        match self.projection {
            Projection::Perspective => Camera::perspective(position, target, up, self.fov),
            Projection::Orthographic => Camera::orthographic(position, target, up, self.fov),
        }
    }
}

/// One node entry of a scene description
///
/// The entry is flat: which optional fields are required depends on
/// `node_type` and is checked while building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// `node`, `object`, `pointLight` or `directionalLight`
    #[serde(rename = "type")]
    pub node_type: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Parent-relative translation
    #[serde(default)]
    pub translation: [f32; 3],
    /// Parent-relative Euler rotation in radians
    #[serde(default)]
    pub rotation: [f32; 3],
    /// Parent-relative scale
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// Child entries in render order
    #[serde(default)]
    pub children: Vec<NodeEntry>,
    /// OBJ path (objects)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj: Option<String>,
    /// Color texture path (objects)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    /// Normal map path (objects)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<String>,
    /// `#RRGGBB` vertex color (objects) or light color (lights)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Light intensity (lights)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f32>,
    /// Light direction (directional lights)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<[f32; 3]>,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl NodeEntry {
    fn transform(&self) -> Transform {
        Transform::new(
            Vec3::from(self.translation),
            Vec3::from(self.rotation),
            Vec3::from(self.scale),
        )
    }

    fn required<'a, T>(&self, value: &'a Option<T>, field: &'static str) -> Result<&'a T, SceneError> {
        value.as_ref().ok_or_else(|| SceneError::MissingField {
            node: self.name.clone(),
            field,
        })
    }

    fn parse_color(&self) -> Result<Option<Vec3>, SceneError> {
        self.color
            .as_deref()
            .map(|hex| utils::hex_to_rgb(hex).ok_or_else(|| SceneError::InvalidColor(hex.to_string())))
            .transpose()
    }

    fn light_color(&self) -> Result<Vec3, SceneError> {
        let hex = self.required(&self.color, "color")?;
        utils::hex_to_rgb(hex).ok_or_else(|| SceneError::InvalidColor(hex.clone()))
    }
}

/// Counts gathered while building, logged once at the end
#[derive(Debug, Default)]
struct BuildSummary {
    nodes: usize,
    objects: usize,
    point_lights: usize,
    directional_lights: usize,
    vertices: usize,
    diagnostics: usize,
}

/// Builds scenes from descriptions, loading assets through an [`AssetSource`]
pub struct SceneBuilder<'a> {
    assets: &'a dyn AssetSource,
}

impl<'a> SceneBuilder<'a> {
    /// Create a builder reading assets from `assets`
    pub fn new(assets: &'a dyn AssetSource) -> Self {
        Self { assets }
    }

    /// Read and build the scene description at `path`
    #[allow(clippy::wrong_self_convention)]
    pub fn from_file(&self, path: impl AsRef<Path>) -> Result<LoadedScene, SceneError> {
        let path = path.as_ref().to_string_lossy();
        log::info!("Loading scene description {}", path);

        let json = self.assets.read_text(&path)?;
        self.build_from_str(&json)
    }

    /// Build a scene from description text
    pub fn build_from_str(&self, json: &str) -> Result<LoadedScene, SceneError> {
        let description: SceneDescription = serde_json::from_str(json)?;
        self.build(&description)
    }

    /// Build a scene from a parsed description
    pub fn build(&self, description: &SceneDescription) -> Result<LoadedScene, SceneError> {
        let mut graph = SceneGraph::new();
        let mut summary = BuildSummary::default();

        self.instantiate(&mut graph, None, &description.root, &mut summary)?;
        let camera = description.camera.build();

        log::info!(
            "Scene built: {} nodes, {} objects ({} vertices, {} diagnostics), {} point lights, {} directional lights",
            summary.nodes,
            summary.objects,
            summary.vertices,
            summary.diagnostics,
            summary.point_lights,
            summary.directional_lights
        );

        Ok(LoadedScene {
            scene: Scene::new(graph),
            camera,
        })
    }

    fn instantiate(
        &self,
        graph: &mut SceneGraph,
        parent: Option<NodeId>,
        entry: &NodeEntry,
        summary: &mut BuildSummary,
    ) -> Result<NodeId, SceneError> {
        let node = self.create_node(entry, summary)?;
        let id = graph.attach(parent, node)?;
        summary.nodes += 1;

        for child in &entry.children {
            self.instantiate(graph, Some(id), child, summary)?;
        }

        Ok(id)
    }

    fn create_node(&self, entry: &NodeEntry, summary: &mut BuildSummary) -> Result<SceneNode, SceneError> {
        let node = match entry.node_type.as_str() {
            "node" => SceneNode::group(&entry.name, entry.transform()),
            "object" => {
                let mesh = self.load_mesh(entry)?;
                summary.objects += 1;
                summary.vertices += mesh.vertex_count();
                summary.diagnostics += mesh.geometry.diagnostics.len();
                SceneNode::new(&entry.name, entry.transform(), NodeKind::Mesh(Box::new(mesh)))
            }
            "pointLight" => {
                let light = PointLight {
                    color: entry.light_color()?,
                    power: *entry.required(&entry.power, "power")?,
                };
                summary.point_lights += 1;
                SceneNode::new(
                    &entry.name,
                    Transform::from_translation(Vec3::from(entry.translation)),
                    NodeKind::PointLight(light),
                )
            }
            "directionalLight" => {
                let light = DirectionalLight {
                    direction: Vec3::from(*entry.required(&entry.direction, "direction")?),
                    color: entry.light_color()?,
                    power: *entry.required(&entry.power, "power")?,
                };
                summary.directional_lights += 1;
                SceneNode::new(&entry.name, Transform::identity(), NodeKind::DirectionalLight(light))
            }
            other => return Err(SceneError::UnknownNodeType(other.to_string())),
        };

        log::debug!("Created {} '{}'", node.kind.type_name(), node.name);
        Ok(node)
    }

    fn load_mesh(&self, entry: &NodeEntry) -> Result<MeshNode, SceneError> {
        let obj_path = entry.required(&entry.obj, "obj")?;
        let fallback_color = entry
            .parse_color()?
            .unwrap_or_else(|| Vec3::from(DEFAULT_OBJECT_COLOR));

        let (geometry, material) = match ObjLoader::load(self.assets, obj_path, fallback_color) {
            Ok(loaded) => loaded,
            Err(e) => {
                log::warn!("Mesh {} for '{}' unavailable ({}), using empty geometry", obj_path, entry.name, e);
                (CompiledMesh::default(), Material::default())
            }
        };

        let texture = ImageData::load_or_placeholder(self.assets, entry.texture.as_deref(), COLOR_PLACEHOLDER);
        let normal_map = ImageData::load_or_placeholder(self.assets, entry.normal.as_deref(), NORMAL_PLACEHOLDER);

        Ok(MeshNode::new(
            geometry,
            material,
            entry.texture.clone(),
            entry.normal.clone(),
            texture,
            normal_map,
        ))
    }
}
