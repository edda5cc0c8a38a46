// JSON input scripts for driving a `HeadlessHost` without a window.
//
// A script is a viewport size plus a list of steps. Each step is one user
// gesture expressed in screen pixels (clicks, drags, taps, long presses,
// pinches, palette drops, held keys) or a direct engine command. Steps are
// tagged by an `op` field:
//
//   { "viewport": { "width": 800, "height": 600 },
//     "steps": [
//       { "op": "click", "x": 400, "y": 300 },
//       { "op": "hold_key", "key": "w", "frames": 10 },
//       { "op": "drop_block", "x": 420, "y": 310, "color": "#4ecdc4" },
//       { "op": "set_key_binding", "action": "forward", "keys": ["i"] },
//       { "op": "clear_all" } ] }
//
// `run_script` replays the steps against a host with a virtual clock that
// advances one frame (`FRAME_MS`) per step plus whatever the gesture itself
// takes, so touch timing is deterministic.

use crate::host::{HeadlessHost, Viewport};
use crate::input::{ControlsConfig, MouseButton, MovementAction, TouchPoint};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use voxel_sandbox_sim::command::{SandboxAction, SandboxCommand};
use voxel_sandbox_sim::event::{SandboxEventKind, StepResult};
use voxel_sandbox_sim::types::Color;

/// Length of one virtual frame.
pub const FRAME_MS: u64 = 16;

/// How long a scripted tap holds the finger down.
const TAP_MS: u64 = 80;

/// Pointer steps a scripted drag is split into.
const DRAG_STEPS: u32 = 4;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Left click without moving.
    Click { x: f32, y: f32 },
    RightClick { x: f32, y: f32 },
    /// Left-button drag (orbits the camera), release, then the click the
    /// browser would deliver at the release point.
    Drag { from: [f32; 2], to: [f32; 2] },
    Wheel { delta: f32 },
    Tap { x: f32, y: f32 },
    LongPress { x: f32, y: f32 },
    /// Two fingers centered on the viewport, spreading or closing from
    /// `from_gap` to `to_gap` pixels apart.
    Pinch { from_gap: f32, to_gap: f32 },
    /// Drag a palette swatch onto the canvas.
    DropBlock { x: f32, y: f32, color: Color },
    /// Hold a key down for a number of frames.
    HoldKey { key: String, frames: u32 },
    SelectColor { color: Color },
    SelectNamed { name: String },
    /// Replace the input settings (speeds, thresholds, bindings).
    SetControls { controls: ControlsConfig },
    SetKeyBinding { action: MovementAction, keys: Vec<String> },
    ClearAll,
    /// A raw engine command.
    Command { action: SandboxAction },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub viewport: Option<Viewport>,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Totals over a script run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptReport {
    pub steps: usize,
    pub placed: usize,
    pub removed: usize,
    pub rejected: usize,
}

impl ScriptReport {
    fn record(&mut self, result: &StepResult) {
        for event in &result.events {
            match &event.kind {
                SandboxEventKind::CubePlaced { .. } => self.placed += 1,
                SandboxEventKind::CubeRemoved { .. } => self.removed += 1,
                SandboxEventKind::Cleared { cubes } => self.removed += cubes.len(),
                SandboxEventKind::PlacementRejected { .. } => self.rejected += 1,
                SandboxEventKind::ColorSelected { .. } => {}
            }
        }
    }
}

/// Replay `script` against `host`.
pub fn run_script(host: &mut HeadlessHost, script: &Script) -> ScriptReport {
    if let Some(viewport) = script.viewport {
        host.set_viewport(viewport);
    }
    let mut runner = Runner {
        host,
        now_ms: 0,
        report: ScriptReport::default(),
    };
    for step in &script.steps {
        debug!("script step {}: {step:?}", runner.report.steps);
        runner.run(step);
        runner.report.steps += 1;
        runner.frame();
    }
    runner.report
}

struct Runner<'a> {
    host: &'a mut HeadlessHost,
    now_ms: u64,
    report: ScriptReport,
}

impl Runner<'_> {
    fn record(&mut self, result: StepResult) {
        self.report.record(&result);
    }

    /// Advance one frame and let the host update.
    fn frame(&mut self) {
        self.now_ms += FRAME_MS;
        let result = self.host.tick(self.now_ms);
        self.record(result);
    }

    fn run(&mut self, step: &ScriptStep) {
        match step {
            ScriptStep::Click { x, y } => {
                self.host.mouse_down(MouseButton::Left, *x, *y);
                self.host.mouse_up();
                let result = self.host.click(*x, *y);
                self.record(result);
            }
            ScriptStep::RightClick { x, y } => {
                let result = self.host.context_click(*x, *y);
                self.record(result);
            }
            ScriptStep::Drag { from, to } => {
                self.host.mouse_down(MouseButton::Left, from[0], from[1]);
                for i in 1..=DRAG_STEPS {
                    let t = i as f32 / DRAG_STEPS as f32;
                    let x = from[0] + (to[0] - from[0]) * t;
                    let y = from[1] + (to[1] - from[1]) * t;
                    let result = self.host.mouse_move(x, y);
                    self.record(result);
                }
                self.host.mouse_up();
                let result = self.host.click(to[0], to[1]);
                self.record(result);
            }
            ScriptStep::Wheel { delta } => {
                let result = self.host.wheel(*delta);
                self.record(result);
            }
            ScriptStep::Tap { x, y } => {
                let finger = TouchPoint { id: 0, x: *x, y: *y };
                self.host.touch_start(&[finger], self.now_ms);
                self.now_ms += TAP_MS;
                let result = self.host.touch_end(finger, 0, self.now_ms);
                self.record(result);
            }
            ScriptStep::LongPress { x, y } => {
                let finger = TouchPoint { id: 0, x: *x, y: *y };
                self.host.touch_start(&[finger], self.now_ms);
                self.now_ms += self.host.controls().long_press_ms;
                let result = self.host.tick(self.now_ms);
                self.record(result);
                let result = self.host.touch_end(finger, 0, self.now_ms);
                self.record(result);
            }
            ScriptStep::Pinch { from_gap, to_gap } => {
                let (cx, cy) = self.host.viewport().center();
                let fingers = |gap: f32| {
                    [
                        TouchPoint { id: 0, x: cx - gap / 2.0, y: cy },
                        TouchPoint { id: 1, x: cx + gap / 2.0, y: cy },
                    ]
                };
                self.host.touch_start(&fingers(*from_gap), self.now_ms);
                let result = self.host.touch_move(&fingers(*to_gap));
                self.record(result);
                let [first, second] = fingers(*to_gap);
                let result = self.host.touch_end(second, 1, self.now_ms);
                self.record(result);
                let result = self.host.touch_end(first, 0, self.now_ms);
                self.record(result);
            }
            ScriptStep::DropBlock { x, y, color } => {
                self.host.begin_drag(*color);
                let result = self.host.drop_at(*x, *y);
                self.record(result);
                self.host.end_drag();
            }
            ScriptStep::HoldKey { key, frames } => {
                self.host.key_down(key);
                for _ in 0..*frames {
                    self.frame();
                }
                self.host.key_up(key);
            }
            ScriptStep::SelectColor { color } => {
                self.command(SandboxAction::SelectColor { color: *color });
            }
            ScriptStep::SelectNamed { name } => {
                self.command(SandboxAction::SelectNamedColor { name: name.clone() });
            }
            ScriptStep::SetControls { controls } => self.host.set_controls(controls.clone()),
            ScriptStep::SetKeyBinding { action, keys } => {
                self.host.set_key_binding(*action, keys.clone());
            }
            ScriptStep::ClearAll => self.command(SandboxAction::ClearAll),
            ScriptStep::Command { action } => self.command(action.clone()),
        }
    }

    fn command(&mut self, action: SandboxAction) {
        let result = self.host.command(&[SandboxCommand::from(action)]);
        self.record(result);
    }
}
