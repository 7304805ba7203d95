//! Viewer application state
//!
//! Everything the UI can toggle lives in [`AppState`]; it is handed to the
//! renderer each frame instead of living in globals. Intents are applied in
//! order, each one against the state left by the previous.

use crate::core::ViewerConfig;
use crate::input::{pick, LightEdit, MaterialEdit, ViewerIntent};
use crate::render::{Camera, FrameContext, Projection, ShadingMode};
use crate::scene::{LightRef, NodeId, NodeKind, Scene};

/// What pointer input does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Dragging orbits the camera
    #[default]
    Orbit,
    /// Clicking selects the object under the pointer
    Raycast,
}

/// UI-controlled viewer state
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Active shading mode
    pub shading: ShadingMode,
    /// Shading selection is honored only while this is set
    pub shader_locked: bool,
    /// Linear (true) or nearest (false) texture magnification
    pub use_bilinear: bool,
    /// Selected light, as an aggregate index (point lights first)
    pub selected_light: usize,
    /// Pointer mode
    pub selection_mode: SelectionMode,
    /// Object picked in raycast mode
    pub selected_object: Option<NodeId>,
    /// Camera projection
    pub projection: Projection,
    /// Viewport size in pixels
    pub viewport: (u32, u32),
    /// Degrees of orbit per unit of pointer movement
    pub orbit_sensitivity: f32,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl AppState {
    /// Initial state for a configuration
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            shading: config.renderer.default_shading,
            shader_locked: true,
            use_bilinear: config.renderer.use_bilinear,
            selected_light: 0,
            selection_mode: SelectionMode::Orbit,
            selected_object: None,
            projection: Projection::Perspective,
            viewport: (config.renderer.viewport_width, config.renderer.viewport_height),
            orbit_sensitivity: config.controls.orbit_sensitivity,
        }
    }

    /// Width over height of the viewport
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.viewport;
        width as f32 / height.max(1) as f32
    }

    /// Renderer inputs for the current state
    pub fn frame_context<'a>(&self, camera: &'a Camera) -> FrameContext<'a> {
        FrameContext {
            camera,
            shading: self.shading,
            use_bilinear: self.use_bilinear,
            viewport: self.viewport,
        }
    }

    /// The selected light, if the scene has any
    pub fn selected_light_ref(&self, scene: &Scene) -> Option<LightRef> {
        scene.lights.light_at(self.selected_light)
    }

    /// Apply one intent
    pub fn apply(&mut self, intent: ViewerIntent, scene: &mut Scene, camera: &mut Camera) {
        match intent {
            ViewerIntent::CycleLight => self.cycle_light(scene),
            ViewerIntent::ToggleShaderLock => {
                self.shader_locked = !self.shader_locked;
                log::info!("Shader lock {}", if self.shader_locked { "on" } else { "off" });
            }
            ViewerIntent::SelectShading(mode) => {
                if self.shader_locked {
                    if self.shading != mode {
                        log::info!("Shading: {} -> {}", self.shading, mode);
                    }
                    self.shading = mode;
                } else {
                    log::debug!("Shader lock off, ignoring {} shading", mode);
                }
            }
            ViewerIntent::SetBilinear(enabled) => self.use_bilinear = enabled,
            ViewerIntent::SetProjection(projection) => {
                self.projection = projection;
                camera.set_projection(projection);
            }
            ViewerIntent::ToggleRaycast => self.toggle_raycast(),
            ViewerIntent::Pick { ndc_x, ndc_y } => self.pick(scene, camera, ndc_x, ndc_y),
            ViewerIntent::Orbit { dx, dy } => {
                if self.selection_mode == SelectionMode::Orbit {
                    camera.orbit(-dx * self.orbit_sensitivity, dy * self.orbit_sensitivity);
                }
            }
            ViewerIntent::Zoom(factor) => camera.zoom(factor),
            ViewerIntent::Resize { width, height } => self.resize(camera, width, height),
            ViewerIntent::EditLight(edit) => self.edit_light(scene, edit),
            ViewerIntent::EditMaterial(edit) => self.edit_material(scene, edit),
        }
    }

    fn cycle_light(&mut self, scene: &Scene) {
        let total = scene.lights.total();
        if total == 0 {
            log::debug!("No lights to cycle through");
            return;
        }
        self.selected_light = (self.selected_light + 1) % total;
        log::info!("Selected light {} of {}", self.selected_light, total);
    }

    fn toggle_raycast(&mut self) {
        self.selection_mode = match self.selection_mode {
            SelectionMode::Orbit => SelectionMode::Raycast,
            SelectionMode::Raycast => {
                self.selected_object = None;
                SelectionMode::Orbit
            }
        };
        log::info!("Selection mode: {:?}", self.selection_mode);
    }

    fn pick(&mut self, scene: &Scene, camera: &Camera, ndc_x: f32, ndc_y: f32) {
        if self.selection_mode != SelectionMode::Raycast {
            return;
        }
        let Some(ray) = camera.screen_to_world_ray(ndc_x, ndc_y) else {
            log::warn!("Camera matrix not invertible, cannot pick");
            return;
        };

        self.selected_object = pick(&scene.graph, &ray).map(|hit| hit.node);
        match self.selected_object.and_then(|id| scene.graph.get(id)) {
            Some(node) => log::info!("Selected '{}'", node.name),
            None => log::info!("No target selected"),
        }
    }

    fn resize(&mut self, camera: &mut Camera, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring empty viewport {}x{}", width, height);
            return;
        }
        self.viewport = (width, height);
        camera.set_aspect_ratio(self.aspect_ratio());
    }

    fn edit_light(&self, scene: &mut Scene, edit: LightEdit) {
        let Some(light) = self.selected_light_ref(scene) else {
            log::warn!("No light {} to edit", self.selected_light);
            return;
        };
        let Some(node) = scene.graph.get_mut(light.node()) else {
            return;
        };

        match &mut node.kind {
            NodeKind::PointLight(point) => {
                if let Some(translation) = edit.position_or_direction {
                    node.transform.translation = translation;
                }
                if let Some(color) = edit.color {
                    point.color = color;
                }
                if let Some(power) = edit.power {
                    point.power = power;
                }
            }
            NodeKind::DirectionalLight(directional) => {
                if let Some(direction) = edit.position_or_direction {
                    directional.direction = direction;
                }
                if let Some(color) = edit.color {
                    directional.color = color;
                }
                if let Some(power) = edit.power {
                    directional.power = power;
                }
            }
            NodeKind::Group | NodeKind::Mesh(_) => return,
        }
        log::debug!("Edited light '{}'", node.name);
    }

    fn edit_material(&self, scene: &mut Scene, edit: MaterialEdit) {
        if self.selection_mode != SelectionMode::Raycast {
            return;
        }
        let Some(mesh) = self
            .selected_object
            .and_then(|id| scene.graph.get_mut(id))
            .and_then(|node| node.as_mesh_mut())
        else {
            log::debug!("No object selected, material edit ignored");
            return;
        };

        let material = &mut mesh.material;
        if let Some(exponent) = edit.specular_exponent {
            material.specular_exponent = exponent;
        }
        if let Some(ambient) = edit.ambient {
            material.ambient = ambient;
        }
        if let Some(diffuse) = edit.diffuse {
            material.diffuse = diffuse;
        }
        if let Some(specular) = edit.specular {
            material.specular = specular;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{ImageData, Material, ObjLoader};
    use crate::foundation::math::{Transform, Vec3};
    use crate::scene::{DirectionalLight, MeshNode, PointLight, SceneGraph, SceneNode};

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

    fn point(name: &str) -> SceneNode {
        SceneNode::new(
            name,
            Transform::identity(),
            NodeKind::PointLight(PointLight { color: Vec3::new(1.0, 1.0, 1.0), power: 1.0 }),
        )
    }

    /// root -> (p0, p1, sun, tri)
    fn scene() -> Scene {
        let mut graph = SceneGraph::new();
        let root = graph.add_group(None, "root", Transform::identity()).unwrap();
        graph.attach(Some(root), point("p0")).unwrap();
        graph.attach(Some(root), point("p1")).unwrap();
        graph
            .attach(
                Some(root),
                SceneNode::new(
                    "sun",
                    Transform::identity(),
                    NodeKind::DirectionalLight(DirectionalLight {
                        direction: Vec3::new(0.0, 0.0, -1.0),
                        color: Vec3::new(1.0, 1.0, 1.0),
                        power: 1.0,
                    }),
                ),
            )
            .unwrap();
        let mesh = MeshNode::new(
            ObjLoader::compile(TRIANGLE_OBJ, Vec3::new(1.0, 1.0, 1.0)),
            Material::default(),
            None,
            None,
            ImageData::solid_color(1, 1, [255; 4]),
            ImageData::solid_color(1, 1, [127, 127, 255, 255]),
        );
        graph
            .attach(Some(root), SceneNode::new("tri", Transform::identity(), NodeKind::Mesh(Box::new(mesh))))
            .unwrap();
        Scene::new(graph)
    }

    fn camera() -> Camera {
        Camera::perspective(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0), 60.0)
    }

    fn apply_all(state: &mut AppState, scene: &mut Scene, camera: &mut Camera, intents: &[ViewerIntent]) {
        for &intent in intents {
            state.apply(intent, scene, camera);
        }
    }

    #[test]
    fn test_defaults() {
        let state = AppState::default();
        assert_eq!(state.shading, ShadingMode::Flat);
        assert!(state.shader_locked);
        assert!(state.use_bilinear);
        assert_eq!(state.selected_light, 0);
        assert_eq!(state.selection_mode, SelectionMode::Orbit);
        assert_eq!(state.projection, Projection::Perspective);
    }

    #[test]
    fn test_cycle_light_wraps() {
        let (mut scene, mut camera, mut state) = (scene(), camera(), AppState::default());
        let order: Vec<usize> = (0..4)
            .map(|_| {
                state.apply(ViewerIntent::CycleLight, &mut scene, &mut camera);
                state.selected_light
            })
            .collect();
        assert_eq!(order, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_shading_ignored_while_unlocked() {
        let (mut scene, mut camera, mut state) = (scene(), camera(), AppState::default());

        apply_all(&mut state, &mut scene, &mut camera, &[
            ViewerIntent::ToggleShaderLock,
            ViewerIntent::SelectShading(ShadingMode::Phong),
        ]);
        assert_eq!(state.shading, ShadingMode::Flat);

        apply_all(&mut state, &mut scene, &mut camera, &[
            ViewerIntent::ToggleShaderLock,
            ViewerIntent::SelectShading(ShadingMode::Phong),
        ]);
        assert_eq!(state.shading, ShadingMode::Phong);
    }

    #[test]
    fn test_projection_switch_keeps_pose() {
        let (mut scene, mut camera, mut state) = (scene(), camera(), AppState::default());
        let position = camera.position;

        state.apply(ViewerIntent::SetProjection(Projection::Orthographic), &mut scene, &mut camera);
        assert_eq!(camera.projection, Projection::Orthographic);
        assert_eq!(camera.position, position);
    }

    #[test]
    fn test_pick_only_in_raycast_mode() {
        let (mut scene, mut camera, mut state) = (scene(), camera(), AppState::default());
        let tri = scene.graph.find_by_name("tri").unwrap();

        state.apply(ViewerIntent::Pick { ndc_x: 0.0, ndc_y: 0.0 }, &mut scene, &mut camera);
        assert_eq!(state.selected_object, None);

        apply_all(&mut state, &mut scene, &mut camera, &[
            ViewerIntent::ToggleRaycast,
            ViewerIntent::Pick { ndc_x: 0.0, ndc_y: 0.0 },
        ]);
        assert_eq!(state.selected_object, Some(tri));

        state.apply(ViewerIntent::ToggleRaycast, &mut scene, &mut camera);
        assert_eq!(state.selected_object, None);
    }

    #[test]
    fn test_orbit_disabled_while_raycasting() {
        let (mut scene, mut camera, mut state) = (scene(), camera(), AppState::default());
        let position = camera.position;

        apply_all(&mut state, &mut scene, &mut camera, &[
            ViewerIntent::ToggleRaycast,
            ViewerIntent::Orbit { dx: 50.0, dy: 0.0 },
        ]);
        assert_eq!(camera.position, position);

        apply_all(&mut state, &mut scene, &mut camera, &[
            ViewerIntent::ToggleRaycast,
            ViewerIntent::Orbit { dx: 50.0, dy: 0.0 },
        ]);
        assert_ne!(camera.position, position);
    }

    #[test]
    fn test_edit_point_and_directional_lights() {
        let (mut scene, mut camera, mut state) = (scene(), camera(), AppState::default());
        let edit = LightEdit {
            position_or_direction: Some(Vec3::new(1.0, 2.0, 3.0)),
            color: Some(Vec3::new(0.0, 1.0, 0.0)),
            power: Some(7.0),
        };

        state.apply(ViewerIntent::EditLight(edit), &mut scene, &mut camera);
        let p0 = scene.graph.get(scene.lights.point_light(0).unwrap()).unwrap();
        assert_eq!(p0.transform.translation, Vec3::new(1.0, 2.0, 3.0));
        let NodeKind::PointLight(light) = &p0.kind else { panic!("p0 is not a point light") };
        assert_eq!(*light, PointLight { color: Vec3::new(0.0, 1.0, 0.0), power: 7.0 });

        apply_all(&mut state, &mut scene, &mut camera, &[
            ViewerIntent::CycleLight,
            ViewerIntent::CycleLight,
            ViewerIntent::EditLight(LightEdit { power: Some(0.5), ..LightEdit::default() }),
        ]);
        let sun = scene.graph.get(scene.lights.directional_light(0).unwrap()).unwrap();
        let NodeKind::DirectionalLight(light) = &sun.kind else { panic!("sun is not a directional light") };
        assert_eq!(light.power, 0.5);
        assert_eq!(light.direction, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(sun.transform, Transform::identity());
    }

    #[test]
    fn test_material_edit_needs_selection() {
        let (mut scene, mut camera, mut state) = (scene(), camera(), AppState::default());
        let tri = scene.graph.find_by_name("tri").unwrap();
        let edit = MaterialEdit { specular_exponent: Some(8.0), ..MaterialEdit::default() };

        state.apply(ViewerIntent::EditMaterial(edit), &mut scene, &mut camera);
        assert_eq!(scene.graph.get(tri).unwrap().as_mesh().unwrap().material, Material::default());

        apply_all(&mut state, &mut scene, &mut camera, &[
            ViewerIntent::ToggleRaycast,
            ViewerIntent::Pick { ndc_x: 0.0, ndc_y: 0.0 },
            ViewerIntent::EditMaterial(edit),
        ]);
        assert_eq!(scene.graph.get(tri).unwrap().as_mesh().unwrap().material.specular_exponent, 8.0);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let (mut scene, mut camera, mut state) = (scene(), camera(), AppState::default());

        state.apply(ViewerIntent::Resize { width: 400, height: 200 }, &mut scene, &mut camera);
        assert_eq!(state.viewport, (400, 200));
        assert_eq!(camera.aspect, 2.0);

        state.apply(ViewerIntent::Resize { width: 0, height: 200 }, &mut scene, &mut camera);
        assert_eq!(state.viewport, (400, 200));
    }
}
