//! Input handling
//!
//! The viewer never polls devices itself. A host translates keyboard, pointer
//! and form events into [`ViewerIntent`]s and hands them to
//! [`Viewer::tick`](crate::Viewer::tick).

pub mod picking;

use crate::foundation::math::Vec3;
use crate::render::{Projection, ShadingMode};

pub use picking::{pick, PickHit, Ray, Triangle};

/// Keys with a default viewer binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Wireframe shading
    Key1,
    /// Flat shading
    Key2,
    /// Gouraud shading
    Key3,
    /// Phong shading
    Key4,
    /// Cycle the selected light
    L,
    /// Toggle the shader lock
    S,
    /// Orthographic projection
    O,
    /// Perspective projection
    P,
    /// Toggle raycast selection
    R,
}

/// Changes to the selected light; `None` fields are left alone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightEdit {
    /// Translation of a point light, or direction of a directional light
    pub position_or_direction: Option<Vec3>,
    /// RGB color
    pub color: Option<Vec3>,
    /// Intensity
    pub power: Option<f32>,
}

/// Changes to the selected object's material; `None` fields are left alone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MaterialEdit {
    /// Specular exponent
    pub specular_exponent: Option<f32>,
    /// Ambient reflectance
    pub ambient: Option<Vec3>,
    /// Diffuse reflectance
    pub diffuse: Option<Vec3>,
    /// Specular reflectance
    pub specular: Option<Vec3>,
}

/// A decoded user action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerIntent {
    /// Select the next light, wrapping around
    CycleLight,
    /// Toggle whether shading selection is honored
    ToggleShaderLock,
    /// Switch shading mode
    SelectShading(ShadingMode),
    /// Linear (true) or nearest (false) texture magnification
    SetBilinear(bool),
    /// Switch camera projection
    SetProjection(Projection),
    /// Toggle between orbiting and raycast selection
    ToggleRaycast,
    /// Select the object under a point given in normalized device coordinates
    Pick {
        /// Horizontal position, `-1` left to `1` right
        ndc_x: f32,
        /// Vertical position, `-1` bottom to `1` top
        ndc_y: f32,
    },
    /// Pointer drag while orbiting
    Orbit {
        /// Horizontal movement
        dx: f32,
        /// Vertical movement
        dy: f32,
    },
    /// Scale the camera distance
    Zoom(f32),
    /// Viewport resized
    Resize {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Edit the selected light
    EditLight(LightEdit),
    /// Edit the selected object's material
    EditMaterial(MaterialEdit),
}

impl ViewerIntent {
    /// Intent bound to a key press
    pub const fn from_key(key: KeyCode) -> Self {
        match key {
            KeyCode::Key1 => Self::SelectShading(ShadingMode::Wireframe),
            KeyCode::Key2 => Self::SelectShading(ShadingMode::Flat),
            KeyCode::Key3 => Self::SelectShading(ShadingMode::Gouraud),
            KeyCode::Key4 => Self::SelectShading(ShadingMode::Phong),
            KeyCode::L => Self::CycleLight,
            KeyCode::S => Self::ToggleShaderLock,
            KeyCode::O => Self::SetProjection(Projection::Orthographic),
            KeyCode::P => Self::SetProjection(Projection::Perspective),
            KeyCode::R => Self::ToggleRaycast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(ViewerIntent::from_key(KeyCode::Key3), ViewerIntent::SelectShading(ShadingMode::Gouraud));
        assert_eq!(ViewerIntent::from_key(KeyCode::O), ViewerIntent::SetProjection(Projection::Orthographic));
        assert_eq!(ViewerIntent::from_key(KeyCode::R), ViewerIntent::ToggleRaycast);
    }
}
