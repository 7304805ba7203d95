//! Phong material properties

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Default specular exponent when none is given
pub const DEFAULT_SPECULAR_EXPONENT: f32 = 50.0;

/// Default reflectance for each of the ambient, diffuse and specular terms
pub const DEFAULT_REFLECTANCE: f32 = 0.8;

/// Phong material of a mesh node, editable at runtime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Specular exponent (`Ns`)
    pub specular_exponent: f32,
    /// Ambient reflectance (`Ka`)
    pub ambient: Vec3,
    /// Diffuse reflectance (`Kd`)
    pub diffuse: Vec3,
    /// Specular reflectance (`Ks`)
    pub specular: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        let reflectance = Vec3::repeat(DEFAULT_REFLECTANCE);
        Self {
            specular_exponent: DEFAULT_SPECULAR_EXPONENT,
            ambient: reflectance,
            diffuse: reflectance,
            specular: reflectance,
        }
    }
}

impl Material {
    /// Flatten to `[Ns, Ka(3), Kd(3), Ks(3)]`
    pub fn to_array(&self) -> [f32; 10] {
        [
            self.specular_exponent,
            self.ambient.x, self.ambient.y, self.ambient.z,
            self.diffuse.x, self.diffuse.y, self.diffuse.z,
            self.specular.x, self.specular.y, self.specular.z,
        ]
    }

    /// Rebuild from the flat `[Ns, Ka(3), Kd(3), Ks(3)]` form
    pub fn from_array(values: [f32; 10]) -> Self {
        Self {
            specular_exponent: values[0],
            ambient: Vec3::new(values[1], values[2], values[3]),
            diffuse: Vec3::new(values[4], values[5], values[6]),
            specular: Vec3::new(values[7], values[8], values[9]),
        }
    }
}
