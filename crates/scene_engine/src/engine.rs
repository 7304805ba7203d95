//! Viewer frame loop
//!
//! One tick applies the frame's intents, brings the camera in line with the
//! viewport and renders the scene. Ticks run strictly one after another on
//! the calling thread; the host decides when the next one happens through a
//! [`FrameSource`].

use std::collections::VecDeque;
use std::path::Path;

use thiserror::Error;

use crate::app_state::AppState;
use crate::assets::AssetSource;
use crate::core::ViewerConfig;
use crate::input::ViewerIntent;
use crate::render::{Camera, FrameStats, RenderBackend, RenderError, Renderer};
use crate::scene::{LoadedScene, Scene, SceneBuilder, SceneError};

/// Supplies the intents of each frame and decides when to stop
pub trait FrameSource {
    /// Intents for the next frame, or `None` to stop the loop
    fn next_frame(&mut self) -> Option<Vec<ViewerIntent>>;
}

/// Frame source replaying a fixed list of frames
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrames {
    frames: VecDeque<Vec<ViewerIntent>>,
}

impl ScriptedFrames {
    /// Replay the given frames in order
    pub fn new(frames: impl IntoIterator<Item = Vec<ViewerIntent>>) -> Self {
        Self { frames: frames.into_iter().collect() }
    }

    /// `count` frames without input
    pub fn idle(count: usize) -> Self {
        Self::new(std::iter::repeat_with(Vec::new).take(count))
    }

    /// Frames left to replay
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ScriptedFrames {
    fn next_frame(&mut self) -> Option<Vec<ViewerIntent>> {
        self.frames.pop_front()
    }
}

/// Viewer errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Scene could not be built
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// A frame failed to render
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Totals of a [`Viewer::run`] loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames rendered
    pub frames: u64,
    /// Counters summed over all frames
    pub totals: FrameStats,
}

/// Interactive scene viewer
pub struct Viewer {
    /// The scene being viewed
    pub scene: Scene,
    /// Current camera
    pub camera: Camera,
    /// UI state
    pub state: AppState,
    renderer: Renderer,
    config: ViewerConfig,
}

impl Viewer {
    /// Create a viewer for a built scene
    pub fn new(loaded: LoadedScene, config: ViewerConfig) -> Self {
        let mut state = AppState::from_config(&config);
        let mut camera = loaded.camera.with_clip_planes(config.renderer.near, config.renderer.far);
        camera.set_aspect_ratio(state.aspect_ratio());
        state.projection = camera.projection;

        Self {
            scene: loaded.scene,
            camera,
            state,
            renderer: Renderer::new(config.renderer.shader_dir.clone()),
            config,
        }
    }

    /// Build the scene description at `scene_path` and create a viewer for it
    pub fn load(assets: &dyn AssetSource, scene_path: impl AsRef<Path>, config: ViewerConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;
        let loaded = SceneBuilder::new(assets).from_file(scene_path)?;
        Ok(Self::new(loaded, config))
    }

    /// Viewer configuration
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Renderer driving the backend
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Run one frame: apply intents, update the camera, render
    pub fn tick(
        &mut self,
        intents: impl IntoIterator<Item = ViewerIntent>,
        backend: &mut dyn RenderBackend,
    ) -> Result<FrameStats, RenderError> {
        for intent in intents {
            self.state.apply(intent, &mut self.scene, &mut self.camera);
        }
        self.camera.set_aspect_ratio(self.state.aspect_ratio());

        let frame = self.state.frame_context(&self.camera);
        self.renderer.render(&mut self.scene, &frame, backend)
    }

    /// Tick until the frame source runs dry or the configured frame limit is hit
    pub fn run(&mut self, source: &mut dyn FrameSource, backend: &mut dyn RenderBackend) -> Result<RunSummary, EngineError> {
        log::info!("Starting frame loop");
        self.renderer.prepare(backend)?;

        let mut summary = RunSummary::default();
        while self.config.engine.max_frames.map_or(true, |max| summary.frames < max) {
            let Some(intents) = source.next_frame() else {
                break;
            };
            summary.totals += self.tick(intents, backend)?;
            summary.frames += 1;
        }

        log::info!(
            "Frame loop finished: {} frames, {} draw calls, {} vertices",
            summary.frames,
            summary.totals.draw_calls,
            summary.totals.vertices_submitted
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemorySource;
    use crate::render::{BackendCall, Projection, RecordingBackend, ShadingMode};

    const SCENE: &str = r##"{
        "camera": { "type": "perspective", "position": [0, 0, 5], "lookat": [0, 0, 0], "up": [0, 1, 0], "fov": 60 },
        "root": { "type": "node", "name": "root", "children": [
            { "type": "object", "name": "tri", "obj": "tri.obj" },
            { "type": "pointLight", "name": "lamp", "translation": [0, 3, 0], "color": "#FFFFFF", "power": 2 }
        ] }
    }"##;

    const TRIANGLE_OBJ: &str = "\
v -1 -1 0
v 1 -1 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";

    fn viewer(config: ViewerConfig) -> Viewer {
        let assets = MemorySource::new()
            .with_text("scene.json", SCENE)
            .with_text("tri.obj", TRIANGLE_OBJ);
        Viewer::load(&assets, "scene.json", config).unwrap()
    }

    #[test]
    fn test_camera_follows_viewport() {
        let viewer = viewer(ViewerConfig::default());
        assert_eq!(viewer.camera.aspect, 1280.0 / 720.0);
        assert_eq!(viewer.camera.near, viewer.config().renderer.near);
    }

    #[test]
    fn test_tick_applies_intents_before_rendering() {
        let mut viewer = viewer(ViewerConfig::default());
        let mut backend = RecordingBackend::new();

        let stats = viewer
            .tick([ViewerIntent::SelectShading(ShadingMode::Gouraud)], &mut backend)
            .unwrap();

        assert_eq!(stats.draw_calls, 1);
        assert_eq!(
            backend.count(|call| matches!(call, BackendCall::CreateProgram { mode: ShadingMode::Gouraud, .. })),
            1
        );
    }

    #[test]
    fn test_run_stops_when_source_ends() {
        let mut viewer = viewer(ViewerConfig::default());
        let mut backend = RecordingBackend::new();
        let mut source = ScriptedFrames::new([
            vec![ViewerIntent::SetProjection(Projection::Orthographic)],
            vec![ViewerIntent::Zoom(0.5)],
            vec![],
        ]);

        let summary = viewer.run(&mut source, &mut backend).unwrap();

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.totals.draw_calls, 3);
        assert_eq!(summary.totals.nodes_visited, 9);
        assert_eq!(viewer.camera.projection, Projection::Orthographic);
        assert_eq!(viewer.renderer().frames_rendered(), 3);
        assert_eq!(backend.count(|call| matches!(call, BackendCall::CreateProgram { .. })), 4);
    }

    #[test]
    fn test_run_honors_frame_limit() {
        let mut config = ViewerConfig::default();
        config.engine.max_frames = Some(2);
        let mut viewer = viewer(config);
        let mut backend = RecordingBackend::new();
        let mut source = ScriptedFrames::idle(5);

        let summary = viewer.run(&mut source, &mut backend).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(source.remaining(), 3);
    }

    #[test]
    fn test_render_failure_stops_run() {
        let mut viewer = viewer(ViewerConfig::default());
        let mut backend = RecordingBackend::new().failing_draws();
        let mut source = ScriptedFrames::idle(3);

        assert!(matches!(viewer.run(&mut source, &mut backend), Err(EngineError::Render(_))));
        assert_eq!(source.remaining(), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ViewerConfig::default();
        config.renderer.viewport_width = 0;
        let assets = MemorySource::new().with_text("scene.json", SCENE);

        assert!(matches!(Viewer::load(&assets, "scene.json", config), Err(EngineError::Config(_))));
    }
}
