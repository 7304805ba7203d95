//! Light aggregation
//!
//! Lights stay where the scene description put them in the tree. The
//! aggregator keeps flat, pre-order indexed lists of their node ids so the
//! renderer can fill shader light arrays and the UI can address a light by a
//! single number.

use crate::foundation::math::{Mat4, Mat4Ext, Point3, Vec3};

use super::node::{NodeId, NodeKind};
use super::scene_graph::SceneGraph;

/// Light addressed by aggregate index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightRef {
    /// Point light node
    Point(NodeId),
    /// Directional light node
    Directional(NodeId),
}

impl LightRef {
    /// Node id of the light
    pub const fn node(self) -> NodeId {
        match self {
            Self::Point(id) | Self::Directional(id) => id,
        }
    }
}

/// World-space data of one point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightUniform {
    /// World position
    pub location: Vec3,
    /// RGB color
    pub color: Vec3,
    /// Intensity
    pub power: f32,
}

/// World-space data of one directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightUniform {
    /// World direction
    pub direction: Vec3,
    /// RGB color
    pub color: Vec3,
    /// Intensity
    pub power: f32,
}

/// Light data for one frame, in aggregate order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightUniforms {
    /// Point lights
    pub point: Vec<PointLightUniform>,
    /// Directional lights
    pub directional: Vec<DirectionalLightUniform>,
}

/// Pre-order index of the lights in a scene graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightAggregator {
    point_lights: Vec<NodeId>,
    directional_lights: Vec<NodeId>,
}

impl LightAggregator {
    /// Index the lights of a graph
    pub fn build(graph: &SceneGraph) -> Self {
        let mut aggregator = Self::default();
        aggregator.rebuild(graph);
        aggregator
    }

    /// Re-classify every node reachable from the root
    pub fn rebuild(&mut self, graph: &SceneGraph) {
        self.point_lights.clear();
        self.directional_lights.clear();

        for id in graph.iter_depth_first() {
            match graph.get(id).map(|node| &node.kind) {
                Some(NodeKind::PointLight(_)) => self.point_lights.push(id),
                Some(NodeKind::DirectionalLight(_)) => self.directional_lights.push(id),
                _ => {}
            }
        }

        log::debug!(
            "Light aggregation: {} point, {} directional",
            self.point_lights.len(),
            self.directional_lights.len()
        );
    }

    /// Point light node by index
    pub fn point_light(&self, index: usize) -> Option<NodeId> {
        self.point_lights.get(index).copied()
    }

    /// Directional light node by index
    pub fn directional_light(&self, index: usize) -> Option<NodeId> {
        self.directional_lights.get(index).copied()
    }

    /// Point light nodes in pre-order
    pub fn point_lights(&self) -> &[NodeId] {
        &self.point_lights
    }

    /// Directional light nodes in pre-order
    pub fn directional_lights(&self) -> &[NodeId] {
        &self.directional_lights
    }

    /// Light counts as `(point, directional)`
    pub fn len(&self) -> (usize, usize) {
        (self.point_lights.len(), self.directional_lights.len())
    }

    /// Number of lights of both kinds
    pub fn total(&self) -> usize {
        self.point_lights.len() + self.directional_lights.len()
    }

    /// Whether the scene has no lights
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Light by aggregate index: point lights first, then directional lights
    pub fn light_at(&self, index: usize) -> Option<LightRef> {
        match index.checked_sub(self.point_lights.len()) {
            None => self.point_light(index).map(LightRef::Point),
            Some(directional) => self.directional_light(directional).map(LightRef::Directional),
        }
    }

    /// World-space light data for the current transforms
    ///
    /// Point lights are placed at their world origin. Directional lights are
    /// turned by the inverse-transpose of the root world transform only, as
    /// vectors (w = 0), so root translation never reaches them.
    pub fn gather(&self, graph: &SceneGraph) -> LightUniforms {
        let direction_transform = root_direction_transform(graph);

        let point = self
            .point_lights
            .iter()
            .filter_map(|&id| {
                let NodeKind::PointLight(light) = &graph.get(id)?.kind else {
                    return None;
                };
                let world = graph.world_transform(id)?;
                Some(PointLightUniform {
                    location: world.transform_point(&Point3::origin()).coords,
                    color: light.color,
                    power: light.power,
                })
            })
            .collect();

        let directional = self
            .directional_lights
            .iter()
            .filter_map(|&id| {
                let NodeKind::DirectionalLight(light) = &graph.get(id)?.kind else {
                    return None;
                };
                Some(DirectionalLightUniform {
                    direction: direction_transform.fixed_view::<3, 3>(0, 0) * light.direction,
                    color: light.color,
                    power: light.power,
                })
            })
            .collect();

        LightUniforms { point, directional }
    }
}

fn root_direction_transform(graph: &SceneGraph) -> Mat4 {
    graph.root_world_transform().inverse_transpose().unwrap_or_else(|| {
        log::warn!("Scene root transform is not invertible, directional lights left untransformed");
        Mat4::identity()
    })
}
