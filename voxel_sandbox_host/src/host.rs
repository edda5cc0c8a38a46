// Headless host: everything between raw input and the placement engine.
//
// `HeadlessHost` plays the part a renderer would: it owns the camera, the
// gesture tracker, the keyboard state, a `SlabRayCaster` standing in for the
// renderer's picking, the `SandboxState`, and the `SceneRegistry` of
// renderables. Raw input goes in; `StepResult`s come out, and every result
// has already been applied to the scene registry before it is returned.
//
// The flow for a click:
//   `click(x, y)` -> `GestureTracker` (drag suppression) -> `InputAction` ->
//   `OrbitCamera::screen_ray()` -> `SandboxState::primary_action()` ->
//   events -> `SceneRegistry`.
//
// Drag-and-drop from the palette is the one path that bypasses the selected
// color: `begin_drag(color)` arms it, `drop_at(x, y)` places with the dragged
// color, `end_drag()` disarms it.
//
// `HostConfig` nests the engine config with the camera and controls
// config. Missing sections or fields fall back to their defaults.

use crate::camera::{CameraConfig, OrbitCamera};
use crate::input::{
    ControlsConfig, GestureTracker, InputAction, InputEvent, KeyboardState, MouseButton,
    MovementAction, TouchPoint,
};
use crate::scene::SceneRegistry;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use voxel_sandbox_sim::command::SandboxCommand;
use voxel_sandbox_sim::config::SandboxConfig;
use voxel_sandbox_sim::error::ConfigError;
use voxel_sandbox_sim::event::StepResult;
use voxel_sandbox_sim::raycast::SlabRayCaster;
use voxel_sandbox_sim::sandbox::SandboxState;
use voxel_sandbox_sim::types::Color;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub sandbox: SandboxConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
}

impl HostConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sandbox.validate()?;
        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                camera.fov_degrees
            )));
        }
        if !(camera.min_radius > 0.0 && camera.min_radius <= camera.max_radius) {
            return Err(ConfigError::Invalid(format!(
                "camera radius range [{}, {}] is empty or not positive",
                camera.min_radius, camera.max_radius
            )));
        }
        if !camera.initial_position.is_finite() {
            return Err(ConfigError::Invalid(
                "camera.initial_position must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Size of the rendering surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

pub struct HeadlessHost {
    controls: ControlsConfig,
    state: SandboxState,
    caster: SlabRayCaster,
    camera: OrbitCamera,
    gestures: GestureTracker,
    keyboard: KeyboardState,
    scene: SceneRegistry,
    viewport: Viewport,
    dragged_color: Option<Color>,
}

impl HeadlessHost {
    /// Build a host. Fails if any config section does not validate.
    pub fn new(config: HostConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let HostConfig {
            sandbox,
            camera,
            controls,
        } = config;
        info!(
            "sandbox host started: {0}x{0} grid, unit size {1}",
            sandbox.grid_size, sandbox.unit_size
        );
        Ok(Self {
            caster: SlabRayCaster::new(&sandbox),
            state: SandboxState::with_config(sandbox)?,
            camera: OrbitCamera::new(&camera, &controls),
            gestures: GestureTracker::new(&controls),
            keyboard: KeyboardState::new(controls.bindings.clone()),
            scene: SceneRegistry::new(),
            viewport: Viewport::default(),
            dragged_color: None,
            controls,
        })
    }

    pub fn state(&self) -> &SandboxState {
        &self.state
    }

    pub fn scene(&self) -> &SceneRegistry {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn controls(&self) -> &ControlsConfig {
        &self.controls
    }

    /// Replace the controls while running: camera speeds, gesture
    /// thresholds and key bindings.
    pub fn set_controls(&mut self, controls: ControlsConfig) {
        self.camera.apply_controls(&controls);
        self.gestures.set_thresholds(&controls);
        self.keyboard.set_bindings(controls.bindings.clone());
        self.controls = controls;
    }

    pub fn set_key_binding(&mut self, action: MovementAction, keys: Vec<String>) {
        self.controls.bindings.set(action, keys.clone());
        self.keyboard.set_binding(action, keys);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Apply commands directly, bypassing input and picking.
    pub fn command(&mut self, commands: &[SandboxCommand]) -> StepResult {
        let result = self.state.step(commands);
        self.commit(result)
    }

    fn commit(&mut self, result: StepResult) -> StepResult {
        self.scene.apply_all(&result.events);
        result
    }

    // -----------------------------------------------------------------------
    // Picking
    // -----------------------------------------------------------------------

    /// Place at a screen position with an explicit color, or the palette
    /// selection for `None`.
    pub fn place_at(&mut self, x: f32, y: f32, color: Option<Color>) -> StepResult {
        let Viewport { width, height } = self.viewport;
        let Some(ray) = self.camera.screen_ray(x, y, width, height) else {
            return StepResult::default();
        };
        let result = self.state.primary_action(&ray, &self.caster, color);
        self.commit(result)
    }

    /// Remove the cube under a screen position.
    pub fn remove_at(&mut self, x: f32, y: f32) -> StepResult {
        let Viewport { width, height } = self.viewport;
        let Some(ray) = self.camera.screen_ray(x, y, width, height) else {
            return StepResult::default();
        };
        let result = self.state.secondary_action(&ray, &self.caster);
        self.commit(result)
    }

    fn handle(&mut self, event: Option<InputEvent>) -> StepResult {
        match event {
            Some(InputEvent::Action(InputAction::Primary { x, y })) => self.place_at(x, y, None),
            Some(InputEvent::Action(InputAction::Secondary { x, y })) => self.remove_at(x, y),
            Some(InputEvent::Orbit { dx, dy }) => {
                self.camera.orbit(dx, dy);
                StepResult::default()
            }
            Some(InputEvent::Zoom { delta }) => {
                self.camera.zoom(delta);
                StepResult::default()
            }
            None => StepResult::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Mouse
    // -----------------------------------------------------------------------

    pub fn mouse_down(&mut self, button: MouseButton, x: f32, y: f32) {
        self.gestures.mouse_down(button, x, y);
    }

    pub fn mouse_move(&mut self, x: f32, y: f32) -> StepResult {
        let event = self.gestures.mouse_move(x, y);
        self.handle(event)
    }

    pub fn mouse_up(&mut self) {
        self.gestures.mouse_up();
    }

    pub fn mouse_leave(&mut self) {
        self.gestures.mouse_leave();
    }

    pub fn click(&mut self, x: f32, y: f32) -> StepResult {
        let event = self.gestures.click(x, y);
        self.handle(event)
    }

    pub fn context_click(&mut self, x: f32, y: f32) -> StepResult {
        let event = self.gestures.context_click(x, y);
        self.handle(event)
    }

    pub fn wheel(&mut self, delta_y: f32) -> StepResult {
        let event = self.gestures.wheel(delta_y);
        self.handle(event)
    }

    // -----------------------------------------------------------------------
    // Touch
    // -----------------------------------------------------------------------

    pub fn touch_start(&mut self, touches: &[TouchPoint], now_ms: u64) {
        self.gestures.touch_start(touches, now_ms);
    }

    pub fn touch_move(&mut self, touches: &[TouchPoint]) -> StepResult {
        let event = self.gestures.touch_move(touches);
        self.handle(event)
    }

    pub fn touch_end(&mut self, ended: TouchPoint, remaining: usize, now_ms: u64) -> StepResult {
        let event = self.gestures.touch_end(ended, remaining, now_ms);
        self.handle(event)
    }

    // -----------------------------------------------------------------------
    // Keyboard and frame update
    // -----------------------------------------------------------------------

    pub fn key_down(&mut self, key: &str) -> bool {
        self.keyboard.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) {
        self.keyboard.key_up(key);
    }

    /// One frame: apply held movement keys, then fire a due long press.
    pub fn tick(&mut self, now_ms: u64) -> StepResult {
        self.camera.apply_movement(self.keyboard.movement());
        let event = self.gestures.poll_long_press(now_ms);
        self.handle(event)
    }

    // -----------------------------------------------------------------------
    // Palette drag-and-drop
    // -----------------------------------------------------------------------

    pub fn begin_drag(&mut self, color: Color) {
        self.dragged_color = Some(color);
    }

    pub fn end_drag(&mut self) {
        self.dragged_color = None;
    }

    /// Drop the dragged swatch at a screen position. No-op without a drag.
    pub fn drop_at(&mut self, x: f32, y: f32) -> StepResult {
        match self.dragged_color {
            Some(color) => self.place_at(x, y, Some(color)),
            None => StepResult::default(),
        }
    }
}
