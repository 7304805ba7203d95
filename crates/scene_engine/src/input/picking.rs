//! Ray picking against mesh geometry
//!
//! Selection casts a world-space ray through the cursor and tests it against
//! every triangle of every mesh node, transformed into world space.

use crate::foundation::math::Vec3;
use crate::scene::{NodeId, NodeKind, SceneGraph};

/// A ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (unit length)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray, normalizing the direction
    ///
    /// Returns `None` for a zero or non-finite direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize(f32::EPSILON)?;
        Some(Self { origin, direction })
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A triangle for intersection tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a triangle from three vertices
    pub const fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Möller-Trumbore ray-triangle intersection
    ///
    /// Returns the distance along the ray for hits in front of the origin.
    /// Both windings count as hits.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        const EPSILON: f32 = 0.000_001;

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to triangle
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t > EPSILON).then_some(t)
    }
}

/// Nearest mesh hit by a picking ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// The mesh node that was hit
    pub node: NodeId,
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Find the closest mesh node the ray hits
pub fn pick(graph: &SceneGraph, ray: &Ray) -> Option<PickHit> {
    let world = graph.world_transforms();
    let mut nearest: Option<PickHit> = None;

    for id in graph.iter_depth_first() {
        let (Some(node), Some(transform)) = (graph.get(id), world.get(id)) else {
            continue;
        };
        let NodeKind::Mesh(mesh) = &node.kind else {
            continue;
        };

        for [a, b, c] in mesh.geometry.triangles() {
            let triangle = Triangle::new(
                transform.transform_point(&a).coords,
                transform.transform_point(&b).coords,
                transform.transform_point(&c).coords,
            );

            if let Some(distance) = triangle.intersect_ray(ray) {
                if nearest.map_or(true, |hit| distance < hit.distance) {
                    nearest = Some(PickHit { node: id, distance, point: ray.point_at(distance) });
                }
            }
        }
    }

    if let Some(hit) = &nearest {
        log::debug!("Picked {:?} at distance {:.3}", hit.node, hit.distance);
    }
    nearest
}
