//! Frame rendering, viewer state and configuration through the public API

use approx::assert_relative_eq;

use scene_engine::assets::MemorySource;
use scene_engine::config::ConfigFormat;
use scene_engine::core::config::{Config, ViewerConfig};
use scene_engine::foundation::math::Vec3;
use scene_engine::input::{KeyCode, LightEdit, ViewerIntent};
use scene_engine::render::{BackendCall, RecordingBackend, ShadingMode, UniformValue};
use scene_engine::{ScriptedFrames, SelectionMode, Viewer};

const SCENE: &str = r##"{
    "camera": { "type": "perspective", "position": [0, 0, 6], "lookat": [0, 0, 0], "up": [0, 1, 0], "fov": 60 },
    "root": { "type": "node", "name": "root", "children": [
        { "type": "object", "name": "front", "obj": "quad.obj", "translation": [0, 0, 1] },
        { "type": "object", "name": "back", "obj": "quad.obj", "translation": [0, 0, -1], "scale": [3, 3, 3] },
        { "type": "pointLight", "name": "lamp", "translation": [2, 2, 2], "color": "#FFFFFF", "power": 1 },
        { "type": "directionalLight", "name": "sun", "direction": [0, -1, 0], "color": "#FFCC99", "power": 0.4 }
    ] }
}"##;

const QUAD_OBJ: &str = "\
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

fn viewer() -> Viewer {
    let assets = MemorySource::new()
        .with_text("scene.json", SCENE)
        .with_text("quad.obj", QUAD_OBJ);
    Viewer::load(&assets, "scene.json", ViewerConfig::default()).unwrap()
}

#[test]
fn test_each_mesh_is_drawn_with_its_vertex_count() {
    let mut viewer = viewer();
    let mut backend = RecordingBackend::new();

    let stats = viewer.tick([], &mut backend).unwrap();

    assert_eq!(stats.nodes_visited, 5);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.vertices_submitted, 12);
    assert_eq!(backend.draws(), [(0, 6), (0, 6)]);
    assert_eq!(backend.uniform("numPointLights"), Some(UniformValue::I32(1)));
    assert_eq!(backend.uniform("numDirLights"), Some(UniformValue::I32(1)));
}

#[test]
fn test_gpu_resources_are_created_once() {
    let mut viewer = viewer();
    let mut backend = RecordingBackend::new();

    let mut source = ScriptedFrames::idle(4);
    let summary = viewer.run(&mut source, &mut backend).unwrap();

    assert_eq!(summary.frames, 4);
    assert_eq!(summary.totals.draw_calls, 8);
    assert_eq!(backend.count(|call| matches!(call, BackendCall::CreateVertexBuffer { .. })), 2);
    assert_eq!(backend.count(|call| matches!(call, BackendCall::CreateTexture { .. })), 4);
}

#[test]
fn test_unknown_uniforms_and_attributes_are_skipped() {
    let mut viewer = viewer();
    let mut backend = RecordingBackend::with_interface(["u_mvp_matrix", "pointLights"], ["a_position"]);

    let stats = viewer.tick([], &mut backend).unwrap();

    assert_eq!(stats.draw_calls, 2);
    assert!(backend.skipped_uniforms() > 0);
    assert!(backend.uniform("u_mvp_matrix").is_some());
    assert!(backend.uniform("pointLights[0].power").is_some());
    assert!(backend.uniform("ka").is_none());
    assert_eq!(backend.count(|call| matches!(call, BackendCall::VertexAttribute { .. })), 2);
}

#[test]
fn test_shading_keys_respect_the_lock() {
    let mut viewer = viewer();
    let mut backend = RecordingBackend::new();

    viewer.tick([ViewerIntent::from_key(KeyCode::Key4)], &mut backend).unwrap();
    assert_eq!(viewer.state.shading, ShadingMode::Phong);

    viewer
        .tick(
            [ViewerIntent::from_key(KeyCode::S), ViewerIntent::from_key(KeyCode::Key1)],
            &mut backend,
        )
        .unwrap();
    assert!(!viewer.state.shader_locked);
    assert_eq!(viewer.state.shading, ShadingMode::Phong);
    assert_eq!(
        backend.count(|call| matches!(call, BackendCall::CreateProgram { mode: ShadingMode::Wireframe, .. })),
        0
    );
}

#[test]
fn test_pick_selects_the_nearest_mesh() {
    let mut viewer = viewer();
    let mut backend = RecordingBackend::new();

    viewer.tick([ViewerIntent::Pick { ndc_x: 0.0, ndc_y: 0.0 }], &mut backend).unwrap();
    assert_eq!(viewer.state.selected_object, None);

    viewer
        .tick(
            [ViewerIntent::from_key(KeyCode::R), ViewerIntent::Pick { ndc_x: 0.1, ndc_y: -0.05 }],
            &mut backend,
        )
        .unwrap();
    assert_eq!(viewer.state.selection_mode, SelectionMode::Raycast);
    assert_eq!(viewer.state.selected_object, viewer.scene.graph.find_by_name("front"));

    // Outside the front quad but inside the larger back one
    viewer.tick([ViewerIntent::Pick { ndc_x: 0.0, ndc_y: 0.6 }], &mut backend).unwrap();
    assert_eq!(viewer.state.selected_object, viewer.scene.graph.find_by_name("back"));

    viewer.tick([ViewerIntent::from_key(KeyCode::R)], &mut backend).unwrap();
    assert_eq!(viewer.state.selected_object, None);
}

#[test]
fn test_light_edits_reach_the_next_frame() {
    let mut viewer = viewer();
    let mut backend = RecordingBackend::new();

    let edit = LightEdit {
        position_or_direction: Some(Vec3::new(0.0, 5.0, 0.0)),
        power: Some(2.5),
        ..LightEdit::default()
    };
    viewer.tick([ViewerIntent::EditLight(edit)], &mut backend).unwrap();

    let Some(UniformValue::Vec3(location)) = backend.uniform("pointLights[0].location") else {
        panic!("point light location not set");
    };
    assert_relative_eq!(location, Vec3::new(0.0, 5.0, 0.0), epsilon = 1e-5);
    assert_eq!(backend.uniform("pointLights[0].power"), Some(UniformValue::F32(2.5)));

    let sun_edit = LightEdit { color: Some(Vec3::new(0.0, 0.0, 1.0)), ..LightEdit::default() };
    viewer
        .tick([ViewerIntent::CycleLight, ViewerIntent::EditLight(sun_edit)], &mut backend)
        .unwrap();
    assert_eq!(
        backend.uniform("directionalLights[0].color"),
        Some(UniformValue::Vec3(Vec3::new(0.0, 0.0, 1.0)))
    );
}

#[test]
fn test_config_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("scene_engine_config_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("viewer.toml");

    let mut config = ViewerConfig::default();
    config.renderer.default_shading = ShadingMode::Gouraud;
    config.controls.orbit_sensitivity = 0.75;
    config.save_to_file(&path).unwrap();

    let loaded = ViewerConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);

    let text = loaded.to_string_as(ConfigFormat::Toml).unwrap();
    assert!(text.contains("default_shading = \"gouraud\""));

    let missing = ViewerConfig::load_or_default(dir.join("absent.toml")).unwrap();
    assert_eq!(missing, ViewerConfig::default());

    std::fs::remove_dir_all(&dir).unwrap();
}
