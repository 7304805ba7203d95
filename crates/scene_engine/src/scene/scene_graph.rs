//! Scene graph
//!
//! All nodes live in one slotmap arena owned by [`SceneGraph`]. A node's
//! `children` list is the owning edge; `parent` is a plain key used to walk
//! upward. World transforms are never stored: they are composed from the
//! ancestor chain whenever they are asked for, so a transform edit is visible
//! immediately to the whole subtree.

use slotmap::{SecondaryMap, SlotMap};

use crate::foundation::math::{Mat4, Transform, Vec3};

use super::node::{NodeId, SceneNode, Transformable};
use super::SceneError;

/// Arena-backed scene tree
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: Option<NodeId>,
}

impl SceneGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node to the arena
    pub fn insert(&mut self, node: SceneNode) -> NodeId {
        self.nodes.insert(node)
    }

    /// Make a detached node the root
    pub fn set_root(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.nodes.get(id).ok_or(SceneError::UnknownNode(id))?;
        if node.parent.is_some() {
            return Err(SceneError::Structural(format!(
                "node '{}' already has a parent and cannot be the root",
                node.name
            )));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Root node, if one has been set
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Attach `child` as the last child of `parent`
    ///
    /// Rejects attaching a node to itself, a node that already has a parent,
    /// the root, and any attachment that would close a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let parent_node = self.nodes.get(parent).ok_or(SceneError::UnknownNode(parent))?;
        let child_node = self.nodes.get(child).ok_or(SceneError::UnknownNode(child))?;

        if parent == child {
            return Err(SceneError::Structural(format!(
                "node '{}' cannot be its own child",
                child_node.name
            )));
        }
        if child_node.parent.is_some() {
            return Err(SceneError::Structural(format!(
                "node '{}' already has a parent",
                child_node.name
            )));
        }
        if self.root == Some(child) {
            return Err(SceneError::Structural(format!(
                "root node '{}' cannot become a child",
                child_node.name
            )));
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(SceneError::Structural(format!(
                "attaching '{}' under '{}' would create a cycle",
                child_node.name, parent_node.name
            )));
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    /// Node by id
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Mutable node by id
    ///
    /// Hierarchy links are not reachable through this reference.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Whether the id refers to a node in this graph
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Children of a node in render order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Proper ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Replace a node's translation, rotation and scale
    pub fn set_local_transform(
        &mut self,
        id: NodeId,
        translation: Vec3,
        rotation: Vec3,
        scale: Vec3,
    ) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        node.set_local_transform(translation, rotation, scale);
        log::trace!("Node '{}' transform set to {:?}", node.name, node.transform);
        Ok(())
    }

    /// Local matrix of a node
    pub fn local_transform(&self, id: NodeId) -> Option<Mat4> {
        self.nodes.get(id).map(Transformable::local_transform)
    }

    /// World matrix of a node: `parent world · local`, identity above the top
    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        let node = self.nodes.get(id)?;
        let local = node.local_transform();
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)? * local),
            None => Some(local),
        }
    }

    /// World matrix of the root, identity for an empty graph
    pub fn root_world_transform(&self) -> Mat4 {
        self.root
            .and_then(|root| self.world_transform(root))
            .unwrap_or_else(Mat4::identity)
    }

    /// World matrices of every node reachable from the root, in one pass
    ///
    /// Valid until the next transform edit; meant to be built once per frame.
    pub fn world_transforms(&self) -> SecondaryMap<NodeId, Mat4> {
        let mut world = SecondaryMap::with_capacity(self.nodes.len());

        for id in self.iter_depth_first() {
            let node = &self.nodes[id];
            let parent_world = node
                .parent
                .and_then(|parent| world.get(parent).copied())
                .unwrap_or_else(Mat4::identity);
            world.insert(id, parent_world * node.local_transform());
        }

        world
    }

    /// Depth-first pre-order walk from the root
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            graph: self,
            stack: self.root.into_iter().collect(),
        }
    }

    /// First node with the given name in depth-first order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter_depth_first().find(|&id| self.nodes[id].name == name)
    }

    /// Add a group node under `parent` (or as root when `parent` is `None`)
    pub fn add_group(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        self.attach(parent, SceneNode::group(name, transform))
    }

    /// Insert a node and hang it under `parent`, or make it the root
    pub fn attach(&mut self, parent: Option<NodeId>, node: SceneNode) -> Result<NodeId, SceneError> {
        let id = self.insert(node);
        let result = match parent {
            Some(parent) => self.add_child(parent, id),
            None => self.set_root(id),
        };

        if let Err(e) = result {
            self.nodes.remove(id);
            return Err(e);
        }
        Ok(id)
    }
}

/// Depth-first pre-order iterator over a [`SceneGraph`]
pub struct DepthFirst<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.graph.nodes.get(id) {
            self.stack.extend(node.children.iter().rev());
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn transform(translation: [f32; 3], rotation: [f32; 3], scale: [f32; 3]) -> Transform {
        Transform::new(Vec3::from(translation), Vec3::from(rotation), Vec3::from(scale))
    }

    /// root -> (a -> (c, d), b)
    fn sample() -> (SceneGraph, [NodeId; 5]) {
        let mut graph = SceneGraph::new();
        let root = graph
            .add_group(None, "root", transform([0.0, 1.0, 0.0], [0.0, 0.3, 0.0], [2.0, 2.0, 2.0]))
            .unwrap();
        let a = graph
            .add_group(Some(root), "a", transform([1.0, 0.0, 0.0], [0.1, 0.0, 0.7], [1.0, 0.5, 1.0]))
            .unwrap();
        let b = graph.add_group(Some(root), "b", Transform::identity()).unwrap();
        let c = graph
            .add_group(Some(a), "c", transform([0.0, 0.0, -2.0], [0.0, 0.0, 0.0], [1.0, 1.0, 3.0]))
            .unwrap();
        let d = graph.add_group(Some(a), "d", Transform::identity()).unwrap();
        (graph, [root, a, b, c, d])
    }

    #[test]
    fn test_world_transform_composes_ancestor_chain() {
        let (graph, ids) = sample();

        for id in ids {
            let parent_world = graph
                .parent(id)
                .map_or_else(Mat4::identity, |parent| graph.world_transform(parent).unwrap());
            let expected = parent_world * graph.local_transform(id).unwrap();
            assert_relative_eq!(graph.world_transform(id).unwrap(), expected, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_world_transforms_cache_matches_recursive() {
        let (graph, ids) = sample();
        let cache = graph.world_transforms();

        assert_eq!(cache.len(), ids.len());
        for id in ids {
            assert_relative_eq!(cache[id], graph.world_transform(id).unwrap(), epsilon = EPSILON);
        }
    }

    #[test]
    fn test_transform_edit_reaches_descendants() {
        let (mut graph, [root, _, _, c, _]) = sample();
        let before = graph.world_transform(c).unwrap();

        graph
            .set_local_transform(root, Vec3::new(5.0, 0.0, 0.0), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
            .unwrap();

        let after = graph.world_transform(c).unwrap();
        assert!((after - before).norm() > EPSILON);
    }

    #[test]
    fn test_depth_first_pre_order() {
        let (graph, [root, a, b, c, d]) = sample();
        let order: Vec<NodeId> = graph.iter_depth_first().collect();
        assert_eq!(order, vec![root, a, c, d, b]);
    }

    #[test]
    fn test_find_by_name_returns_first_in_order() {
        let (mut graph, [_, a, b, _, _]) = sample();
        graph.add_group(Some(b), "c", Transform::identity()).unwrap();

        let found = graph.find_by_name("c").unwrap();
        assert_eq!(graph.parent(found), Some(a));
        assert!(graph.find_by_name("missing").is_none());
    }

    #[test]
    fn test_rejects_self_parenting() {
        let (mut graph, [_, a, _, _, _]) = sample();
        assert!(matches!(graph.add_child(a, a), Err(SceneError::Structural(_))));
    }

    #[test]
    fn test_rejects_double_parenting() {
        let (mut graph, [_, _, b, c, _]) = sample();
        assert!(matches!(graph.add_child(b, c), Err(SceneError::Structural(_))));
        assert_eq!(graph.children(b).len(), 0);
    }

    #[test]
    fn test_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let top = graph.insert(SceneNode::group("top", Transform::identity()));
        let middle = graph.insert(SceneNode::group("middle", Transform::identity()));
        let bottom = graph.insert(SceneNode::group("bottom", Transform::identity()));

        graph.add_child(top, middle).unwrap();
        graph.add_child(middle, bottom).unwrap();

        assert!(matches!(graph.add_child(bottom, top), Err(SceneError::Structural(_))));
        assert_eq!(graph.parent(top), None);
    }

    #[test]
    fn test_rejects_root_as_child() {
        let (mut graph, [root, _, _, c, _]) = sample();
        let stray = graph.insert(SceneNode::group("stray", Transform::identity()));
        graph.add_child(stray, c).unwrap_err();

        assert!(matches!(graph.add_child(stray, root), Err(SceneError::Structural(_))));
    }

    #[test]
    fn test_failed_attach_leaves_no_node_behind() {
        let (mut graph, [_, a, _, _, _]) = sample();
        let before = graph.len();

        graph.nodes.remove(a);
        assert!(matches!(
            graph.add_group(Some(a), "orphan", Transform::identity()),
            Err(SceneError::UnknownNode(_))
        ));
        assert_eq!(graph.len(), before - 1);
    }
}
