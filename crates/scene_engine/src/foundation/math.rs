//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the scene's Euler TRS transform.

pub use nalgebra::{Matrix4, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Parent-relative transform: translation, Euler rotation (radians) and per-axis scale
///
/// The matrix form is always `T · Rz · Ry · Rx · S`. Scene files are authored
/// against this exact order, so it must not change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation in parent space
    pub translation: Vec3,

    /// Euler angles in radians, applied X first, then Y, then Z
    pub rotation: Vec3,

    /// Scale factors per axis
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a transform from its three components
    pub const fn new(translation: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only a translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (`T · Rz · Ry · Rx · S`)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.translation)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        value.max(min).min(max)
    }

    /// Convert a `#RRGGBB` hex string into a normalized RGB vector
    ///
    /// The leading `#` is optional. Returns `None` for anything that is not
    /// exactly three hex byte pairs.
    pub fn hex_to_rgb(hex: &str) -> Option<Vec3> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|byte| f32::from(byte) / 255.0)
        };

        Some(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Length of each of the first three basis columns
    fn axis_scaling(&self) -> Vec3;

    /// Inverse-transpose, used to carry direction vectors through a transform
    fn inverse_transpose(&self) -> Option<Mat4>;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn axis_scaling(&self) -> Vec3 {
        Vec3::new(
            self.fixed_view::<3, 1>(0, 0).norm(),
            self.fixed_view::<3, 1>(0, 1).norm(),
            self.fixed_view::<3, 1>(0, 2).norm(),
        )
    }

    fn inverse_transpose(&self) -> Option<Mat4> {
        self.try_inverse().map(|inverse| inverse.transpose())
    }
}
