//! # Viewer Configuration
//!
//! Configuration for the scene viewer, grouped by subsystem. Every section
//! has defaults, so a configuration file only needs the values it changes.
//!
//! ```toml
//! [engine]
//! log_level = "debug"
//!
//! [renderer]
//! shader_dir = "resources/shaders"
//! default_shading = "phong"
//!
//! [controls]
//! orbit_sensitivity = 0.25
//! ```

use serde::{Deserialize, Serialize};

use crate::render::ShadingMode;
use crate::render::primitives::camera::{DEFAULT_FAR, DEFAULT_NEAR};

pub use crate::config::{Config, ConfigError};

/// # Engine Configuration
///
/// Logging and frame loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `env_logger` filter, e.g. `info` or `scene_engine=debug`
    pub log_level: String,
    /// Stop after this many frames; `None` runs until the frame source ends
    pub max_frames: Option<u64>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: crate::foundation::logging::DEFAULT_FILTER.to_string(),
            max_frames: None,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Limit the number of frames
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Renderer Configuration
///
/// Shader location, initial shading and texture filtering, viewport and clip
/// planes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Directory holding `<mode>.vert.glsl` / `<mode>.frag.glsl`
    pub shader_dir: String,
    /// Shading mode at startup
    pub default_shading: ShadingMode,
    /// Linear texture magnification at startup
    pub use_bilinear: bool,
    /// Initial viewport width in pixels
    pub viewport_width: u32,
    /// Initial viewport height in pixels
    pub viewport_height: u32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl RendererConfig {
    /// Create a new renderer configuration
    pub fn new() -> Self {
        Self {
            shader_dir: "shaders".to_string(),
            default_shading: ShadingMode::default(),
            use_bilinear: true,
            viewport_width: 1280,
            viewport_height: 720,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    /// Set shader directory
    pub fn with_shader_dir(mut self, dir: impl Into<String>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    /// Set startup shading mode
    pub fn with_default_shading(mut self, mode: ShadingMode) -> Self {
        self.default_shading = mode;
        self
    }

    /// Set initial viewport size
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(format!(
                "Viewport must be non-empty, got {}x{}",
                self.viewport_width, self.viewport_height
            ));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(format!("Clip planes must satisfy 0 < near < far, got {} / {}", self.near, self.far));
        }
        Ok(())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Camera Control Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Degrees of orbit per unit of pointer movement
    pub orbit_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self { orbit_sensitivity: 0.4 }
    }
}

/// # Asset Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory scene, mesh and texture paths are resolved against
    pub assets_dir: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self { assets_dir: ".".to_string() }
    }
}

/// # Complete Viewer Configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Rendering configuration
    pub renderer: RendererConfig,
    /// Camera control configuration
    pub controls: ControlsConfig,
    /// Asset configuration
    pub assets: AssetConfig,
}

impl ViewerConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        self.renderer.validate()?;
        if !self.controls.orbit_sensitivity.is_finite() {
            return Err("Orbit sensitivity must be finite".to_string());
        }
        Ok(())
    }
}

impl Config for ViewerConfig {}
