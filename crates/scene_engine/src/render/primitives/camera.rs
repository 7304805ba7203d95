//! # 3D Camera System
//!
//! Look-at camera with perspective or orthographic projection, orbit and
//! zoom controls, and screen-to-world picking rays.
//!
//! ## Conventions
//! - Right-handed, Y-up world space
//! - OpenGL-style clip space (depth in `[-1, 1]`)
//! - Field of view is given in degrees and stored in radians

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat4, Point3, Vec3};
use crate::input::picking::Ray;

/// Default near clipping plane distance
pub const DEFAULT_NEAR: f32 = 0.1;

/// Default far clipping plane distance
pub const DEFAULT_FAR: f32 = 1000.0;

/// Closest the eye may get to the target when zooming
const MIN_DISTANCE: f32 = 1e-3;

/// Pitch limit for orbiting, in degrees
const MAX_PITCH_DEGREES: f32 = 89.0;

/// Projection kind of a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Perspective projection using the vertical field of view
    #[default]
    Perspective,
    /// Orthographic projection sized to match the perspective view at the target
    Orthographic,
}

/// 3D camera
///
/// Matrices are computed on demand from the pose and projection parameters;
/// nothing is cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera is looking at in world space
    pub target: Vec3,
    /// Up vector for camera orientation
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Distance to near clipping plane
    pub near: f32,
    /// Distance to far clipping plane
    pub far: f32,
    /// Projection kind
    pub projection: Projection,
}

impl Camera {
    /// Create a perspective camera
    ///
    /// # Arguments
    /// * `position` - Eye position in world space
    /// * `target` - Point to look at
    /// * `up` - Up vector, does not need to be orthogonal to the view direction
    /// * `fov_degrees` - Vertical field of view in degrees
    pub fn perspective(position: Vec3, target: Vec3, up: Vec3, fov_degrees: f32) -> Self {
        Self {
            position,
            target,
            up,
            fov: utils::deg_to_rad(fov_degrees),
            aspect: 1.0,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            projection: Projection::Perspective,
        }
    }

    /// Create an orthographic camera
    ///
    /// The field of view still sizes the view volume: its half height is the
    /// eye-target distance times `tan(fov / 2)`.
    pub fn orthographic(position: Vec3, target: Vec3, up: Vec3, fov_degrees: f32) -> Self {
        Self {
            projection: Projection::Orthographic,
            ..Self::perspective(position, target, up, fov_degrees)
        }
    }

    /// Same pose with a different projection
    #[must_use]
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.set_projection(projection);
        self
    }

    /// Same camera with different clipping planes
    #[must_use]
    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Switch projection while keeping the pose
    pub fn set_projection(&mut self, projection: Projection) {
        if self.projection != projection {
            log::info!("Camera projection changed: {:?} -> {:?}", self.projection, projection);
            self.projection = projection;
        }
    }

    /// Update camera aspect ratio for viewport changes
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if !aspect.is_finite() || aspect <= 0.0 {
            log::warn!("Ignoring invalid aspect ratio {}", aspect);
            return;
        }
        if (self.aspect - aspect).abs() > 0.01 {
            log::debug!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// Distance from the eye to the target
    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Generate view matrix for world-to-camera space transformation
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(self.position), &Point3::from(self.target), &self.up)
    }

    /// Generate the projection matrix for the current projection kind
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective => Mat4::new_perspective(self.aspect, self.fov, self.near, self.far),
            Projection::Orthographic => {
                let half_height = self.distance() * (self.fov * 0.5).tan();
                let half_width = half_height * self.aspect;
                Mat4::new_orthographic(-half_width, half_width, -half_height, half_height, self.near, self.far)
            }
        }
    }

    /// Generate combined view-projection matrix (`P × V`)
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Rotate the eye around the target
    ///
    /// Yaw turns around the world Y axis, pitch tilts towards the poles and is
    /// clamped just short of them so the view never flips.
    pub fn orbit(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return;
        }

        let yaw = offset.x.atan2(offset.z) + utils::deg_to_rad(yaw_degrees);
        let max_pitch = utils::deg_to_rad(MAX_PITCH_DEGREES);
        let pitch = utils::clamp(
            (offset.y / radius).asin() + utils::deg_to_rad(pitch_degrees),
            -max_pitch,
            max_pitch,
        );

        self.position = self.target
            + Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos()) * radius;
        log::trace!("Camera orbited to {:?}", self.position);
    }

    /// Scale the eye-target distance by `factor`
    pub fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("Ignoring invalid zoom factor {}", factor);
            return;
        }

        let offset = self.position - self.target;
        let distance = offset.norm();
        if distance <= f32::EPSILON {
            return;
        }

        let new_distance = (distance * factor).max(MIN_DISTANCE);
        self.position = self.target + offset * (new_distance / distance);
        log::trace!("Camera zoomed to distance {}", new_distance);
    }

    /// Convert a point in normalized device coordinates to a world-space ray
    ///
    /// `ndc_x` and `ndc_y` range over `[-1, 1]`, left to right and bottom to
    /// top. The ray starts on the near plane and points away from the camera.
    /// Returns `None` if the view-projection matrix cannot be inverted.
    pub fn screen_to_world_ray(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        let inverse = self.view_projection_matrix().try_inverse()?;

        let near = inverse.transform_point(&Point3::new(ndc_x, ndc_y, -1.0));
        let far = inverse.transform_point(&Point3::new(ndc_x, ndc_y, 1.0));

        Ray::new(near.coords, far - near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-4;

    fn camera() -> Camera {
        Camera::perspective(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
            60.0,
        )
    }

    #[test]
    fn test_fov_stored_in_radians() {
        assert_relative_eq!(camera().fov, std::f32::consts::FRAC_PI_3, epsilon = EPSILON);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        for projection in [Projection::Perspective, Projection::Orthographic] {
            let camera = camera().with_projection(projection);
            let ndc = camera.view_projection_matrix().transform_point(&Point3::origin());
            assert_relative_eq!(ndc.x, 0.0, epsilon = EPSILON);
            assert_relative_eq!(ndc.y, 0.0, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_orthographic_matches_perspective_at_target_plane() {
        let perspective = camera();
        let orthographic = camera().with_projection(Projection::Orthographic);
        let edge = Point3::new(0.0, 10.0 * (std::f32::consts::FRAC_PI_6).tan(), 0.0);

        let p = perspective.view_projection_matrix().transform_point(&edge);
        let o = orthographic.view_projection_matrix().transform_point(&edge);

        assert_relative_eq!(p.y, 1.0, epsilon = EPSILON);
        assert_relative_eq!(o.y, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_orbit_keeps_distance_and_clamps_pitch() {
        let mut camera = camera();

        camera.orbit(90.0, 0.0);
        assert_relative_eq!(camera.position, Vec3::new(10.0, 0.0, 0.0), epsilon = EPSILON);

        camera.orbit(0.0, 500.0);
        assert_relative_eq!(camera.distance(), 10.0, epsilon = EPSILON);
        let pitch = (camera.position.y / camera.distance()).asin().to_degrees();
        assert_relative_eq!(pitch, 89.0, epsilon = 1e-2);
    }

    #[test]
    fn test_zoom_scales_distance() {
        let mut camera = camera();
        camera.zoom(0.5);
        assert_relative_eq!(camera.position, Vec3::new(0.0, 0.0, 5.0), epsilon = EPSILON);

        camera.zoom(-1.0);
        assert_relative_eq!(camera.distance(), 5.0, epsilon = EPSILON);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = camera();
        let ray = camera.screen_to_world_ray(0.0, 0.0).unwrap();

        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_relative_eq!(ray.origin.z, 10.0 - DEFAULT_NEAR, epsilon = 1e-2);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let camera = camera().with_projection(Projection::Orthographic);
        let left = camera.screen_to_world_ray(-0.5, 0.0).unwrap();
        let right = camera.screen_to_world_ray(0.5, 0.0).unwrap();

        assert_relative_eq!(left.direction, right.direction, epsilon = EPSILON);
        assert!(left.origin.x < right.origin.x);
    }
}
