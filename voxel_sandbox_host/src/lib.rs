// voxel_sandbox_host: headless host for the voxel sandbox engine.
//
// This crate wraps `voxel_sandbox_sim` with everything a windowed front end
// would provide, minus the pixels: a camera, input gesture handling, and
// bookkeeping for the renderables each placed cube would own. It can be
// driven from JSON scripts (see the `sandbox` binary) and tested end to end.
//
// Module overview:
// - `host.rs`:   HeadlessHost (wiring) + HostConfig / Viewport.
// - `camera.rs`: OrbitCamera, CameraConfig, screen-to-world rays.
// - `input.rs`:  GestureTracker (mouse/touch debouncing), ControlsConfig,
//                KeyBindings, KeyboardState / MovementKeys.
// - `scene.rs`:  SceneRegistry, renderables keyed by CubeId.
// - `script.rs`: Script / ScriptStep JSON format and `run_script`.
//
// The engine crate never sees screen coordinates or timestamps; this crate
// converts both into world rays and discrete actions before calling it.

pub mod camera;
pub mod host;
pub mod input;
pub mod scene;
pub mod script;

pub use host::{HeadlessHost, HostConfig};
