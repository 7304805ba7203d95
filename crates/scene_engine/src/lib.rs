//! # Scene Engine
//!
//! Core of an interactive 3D scene viewer: a hierarchical scene graph, an
//! OBJ/MTL compiler producing interleaved vertex buffers, and a per-frame
//! render traversal driving an abstract rendering backend.
//!
//! ## Features
//!
//! - **Scene Graph**: Arena-backed transform tree with mesh and light nodes
//! - **Geometry Compiler**: OBJ/MTL to 17-float interleaved vertices with
//!   smoothed normals and tangent space
//! - **Render Traversal**: Depth-first uniform and draw submission through
//!   [`render::RenderBackend`]
//! - **Viewer Loop**: Intent-driven state, camera control and picking
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let assets = FileSystemSource::new("resources");
//!     let mut viewer = Viewer::load(&assets, "scenes/demo.json", ViewerConfig::default())?;
//!
//!     let mut backend = RecordingBackend::new();
//!     let mut frames = ScriptedFrames::idle(60);
//!     let summary = viewer.run(&mut frames, &mut backend)?;
//!     println!("{} frames rendered", summary.frames);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod foundation;
pub mod config;
pub mod assets;
pub mod scene;
pub mod render;
pub mod input;

mod app_state;
mod engine;

pub use app_state::{AppState, SelectionMode};
pub use engine::{EngineError, FrameSource, RunSummary, ScriptedFrames, Viewer};

/// Common imports for viewer users
pub mod prelude {
    pub use crate::{
        AppState, SelectionMode,
        EngineError, FrameSource, RunSummary, ScriptedFrames, Viewer,
        foundation::math::{Vec3, Mat4, Transform},
        assets::{AssetSource, FileSystemSource, MemorySource, Material},
        scene::{Scene, SceneBuilder, SceneGraph, NodeId, NodeKind},
        render::{Camera, Projection, Renderer, RenderBackend, RecordingBackend, ShadingMode, FrameStats},
        input::{KeyCode, LightEdit, MaterialEdit, ViewerIntent},
        core::config::{Config, ViewerConfig},
    };
}
