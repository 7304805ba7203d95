//! Scene management
//!
//! The scene is a tree of transform nodes stored in a slotmap arena. Meshes
//! and lights are node variants; lights are additionally indexed by a
//! [`LightAggregator`] for shader binding and UI selection.
//!
//! ```text
//! Scene description (JSON)
//!      ↓
//! SceneBuilder  ──▶  ObjLoader / MaterialLoader / ImageData
//!      ↓
//! SceneGraph + LightAggregator
//!      ↓
//! Renderer (per frame)
//! ```

mod node;
mod scene_graph;
mod lights;
mod builder;

use thiserror::Error;

use crate::assets::AssetError;
use crate::render::primitives::Camera;

pub use node::{
    DirectionalLight, MeshGpuResources, MeshNode, NodeId, NodeKind, PointLight, SceneNode, Transformable,
};
pub use scene_graph::{DepthFirst, SceneGraph};
pub use lights::{DirectionalLightUniform, LightAggregator, LightRef, LightUniforms, PointLightUniform};
pub use builder::{CameraDescription, NodeEntry, SceneBuilder, SceneDescription};

/// Scene construction and editing errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// The tree would stop being a tree (cycle, second parent, self parent)
    #[error("Invalid scene structure: {0}")]
    Structural(String),

    /// The scene description is not valid JSON for the expected shape
    #[error("Failed to parse scene description: {0}")]
    Parse(#[from] serde_json::Error),

    /// The scene description could not be read
    #[error("Failed to read scene description: {0}")]
    Io(#[from] AssetError),

    /// A node entry lacks a field its type requires
    #[error("Node '{node}' is missing required field '{field}'")]
    MissingField {
        /// Name of the offending node
        node: String,
        /// Missing field
        field: &'static str,
    },

    /// A color is not of the form `#RRGGBB`
    #[error("Invalid hex color: {0}")]
    InvalidColor(String),

    /// A node entry has an unsupported `type`
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// A node id does not belong to the graph
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),
}

/// A scene graph with its light index
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Node tree
    pub graph: SceneGraph,
    /// Lights of `graph` in pre-order
    pub lights: LightAggregator,
}

impl Scene {
    /// Wrap a graph and index its lights
    pub fn new(graph: SceneGraph) -> Self {
        let lights = LightAggregator::build(&graph);
        Self { graph, lights }
    }

    /// Re-index lights after a structural change
    pub fn rebuild_lights(&mut self) {
        self.lights.rebuild(&self.graph);
    }
}

/// Result of building a scene description
#[derive(Debug, Clone)]
pub struct LoadedScene {
    /// The scene
    pub scene: Scene,
    /// The described camera
    pub camera: Camera,
}
