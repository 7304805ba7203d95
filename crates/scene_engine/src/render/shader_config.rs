//! Shader configuration for the rendering system
//!
//! Each shading mode is backed by one program built from a vertex and a
//! fragment shader source file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shading model selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMode {
    /// Edges only
    Wireframe,
    /// One color per face
    #[default]
    Flat,
    /// Per-vertex lighting
    Gouraud,
    /// Per-fragment lighting with normal mapping
    Phong,
}

impl ShadingMode {
    /// Every shading mode, in key binding order
    pub const ALL: [Self; 4] = [Self::Wireframe, Self::Flat, Self::Gouraud, Self::Phong];

    /// Lowercase name, also the shader file stem
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wireframe => "wireframe",
            Self::Flat => "flat",
            Self::Gouraud => "gouraud",
            Self::Phong => "phong",
        }
    }
}

impl fmt::Display for ShadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for shader loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Path to the vertex shader source
    pub vertex_shader_path: String,
    /// Path to the fragment shader source
    pub fragment_shader_path: String,
}

impl ShaderConfig {
    /// Create a new shader configuration
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_shader_path: vertex_path.into(),
            fragment_shader_path: fragment_path.into(),
        }
    }

    /// Conventional `<dir>/<mode>.vert.glsl` / `<dir>/<mode>.frag.glsl` pair
    pub fn for_mode(shader_dir: &str, mode: ShadingMode) -> Self {
        let dir = shader_dir.trim_end_matches('/');
        Self::new(
            format!("{}/{}.vert.glsl", dir, mode.name()),
            format!("{}/{}.frag.glsl", dir, mode.name()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_mode_paths() {
        let config = ShaderConfig::for_mode("shaders/", ShadingMode::Gouraud);
        assert_eq!(config.vertex_shader_path, "shaders/gouraud.vert.glsl");
        assert_eq!(config.fragment_shader_path, "shaders/gouraud.frag.glsl");
    }

    #[test]
    fn test_default_mode_is_flat() {
        assert_eq!(ShadingMode::default(), ShadingMode::Flat);
    }
}
