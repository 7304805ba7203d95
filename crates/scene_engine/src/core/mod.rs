//! # Core Viewer Module
//!
//! Shared configuration types used by the viewer and its binary.

pub mod config;

pub use config::{AssetConfig, Config, ConfigError, ControlsConfig, EngineConfig, RendererConfig, ViewerConfig};
