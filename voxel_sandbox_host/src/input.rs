// Raw input to discrete actions.
//
// `GestureTracker` turns raw mouse and touch events into the small set of
// things the host acts on (`InputEvent`): a primary action (place), a
// secondary action (remove), or a camera orbit/zoom. It owns all the
// debouncing so the placement engine only ever sees clean clicks.
//
// Mouse rules:
// - Left button down starts a potential orbit. Once the pointer moves more
//   than `drag_threshold_px` on either axis in one step, the press becomes a
//   drag: every further move orbits the camera, and the click that follows
//   the release is swallowed.
// - A click that was not a drag is a primary action.
// - A context click (right button) is always a secondary action.
// - Wheel deltas zoom.
//
// Touch rules:
// - One finger: a tap (released within `tap_max_ms` and `tap_max_distance_px`
//   of where it started, without orbiting) is a primary action. Held for
//   `long_press_ms` without orbiting, it is a secondary action. Dragging
//   orbits like the mouse.
// - A second finger switches to pinch zoom and cancels both the pending tap
//   and the pending long press until every finger is lifted.
//
// The tracker never reads a clock. Every touch call takes a millisecond
// timestamp, and the host calls `poll_long_press(now_ms)` once per frame.
//
// This file also holds the keyboard side: `KeyBindings` (rebindable,
// case-insensitive key names per movement action) and `KeyboardState`,
// which turns key-down/key-up into the `MovementKeys` the camera applies.
// Bindings and gesture thresholds can be replaced while running, the way a
// settings panel would.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// A movement action keys can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementAction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Key names bound to each movement action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = |names: &[&str]| -> Vec<String> {
            names.iter().map(|k| k.to_string()).collect()
        };
        Self {
            forward: keys(&["w", "ArrowUp"]),
            backward: keys(&["s", "ArrowDown"]),
            left: keys(&["a", "ArrowLeft"]),
            right: keys(&["d", "ArrowRight"]),
            up: keys(&["q"]),
            down: keys(&["e"]),
        }
    }
}

impl KeyBindings {
    pub fn keys(&self, action: MovementAction) -> &[String] {
        match action {
            MovementAction::Forward => &self.forward,
            MovementAction::Backward => &self.backward,
            MovementAction::Left => &self.left,
            MovementAction::Right => &self.right,
            MovementAction::Up => &self.up,
            MovementAction::Down => &self.down,
        }
    }

    /// Replace the keys bound to `action`.
    pub fn set(&mut self, action: MovementAction, keys: Vec<String>) {
        let slot = match action {
            MovementAction::Forward => &mut self.forward,
            MovementAction::Backward => &mut self.backward,
            MovementAction::Left => &mut self.left,
            MovementAction::Right => &mut self.right,
            MovementAction::Up => &mut self.up,
            MovementAction::Down => &mut self.down,
        };
        *slot = keys;
    }

    fn bound(keys: &[String], key: &str) -> bool {
        keys.iter().any(|k| k.eq_ignore_ascii_case(key))
    }

    /// Whether `key` is bound to any action.
    pub fn is_bound(&self, key: &str) -> bool {
        [
            &self.forward,
            &self.backward,
            &self.left,
            &self.right,
            &self.up,
            &self.down,
        ]
        .into_iter()
        .any(|keys| Self::bound(keys, key))
    }
}

/// Input tuning: camera speeds and gesture thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Target pan per frame while a horizontal movement key is held.
    pub move_speed: f32,
    /// Radius change per frame while up/down is held.
    pub vertical_speed: f32,
    /// Radians of orbit per pixel of drag.
    pub orbit_sensitivity: f32,
    /// Radius change per unit of wheel or pinch delta.
    pub zoom_sensitivity: f32,
    /// A pointer step larger than this (either axis) turns a press into a
    /// drag.
    pub drag_threshold_px: f32,
    pub tap_max_ms: u64,
    pub tap_max_distance_px: f32,
    pub long_press_ms: u64,
    pub bindings: KeyBindings,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.2,
            vertical_speed: 0.1,
            orbit_sensitivity: 0.01,
            zoom_sensitivity: 0.01,
            drag_threshold_px: 2.0,
            tap_max_ms: 300,
            tap_max_distance_px: 10.0,
            long_press_ms: 500,
            bindings: KeyBindings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A discrete placement-level action at a screen position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputAction {
    Primary { x: f32, y: f32 },
    Secondary { x: f32, y: f32 },
}

/// Everything the tracker can ask the host to do.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Action(InputAction),
    Orbit { dx: f32, dy: f32 },
    Zoom { delta: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// One finger on the screen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f32,
    pub y: f32,
}

// ---------------------------------------------------------------------------
// Gesture tracking
// ---------------------------------------------------------------------------

/// State of the finger that started a single-touch gesture.
#[derive(Clone, Copy, Debug)]
struct TouchStart {
    id: u64,
    x: f32,
    y: f32,
    at_ms: u64,
    /// Long press fires at this time unless cancelled.
    long_press_at: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct GestureTracker {
    drag_threshold_px: f32,
    tap_max_ms: u64,
    tap_max_distance_px: f32,
    long_press_ms: u64,

    /// Left button is down.
    orbiting: bool,
    /// The current (or just finished) press moved far enough to orbit.
    dragged: bool,
    last_pointer: (f32, f32),

    touch: Option<TouchStart>,
    /// Two or more fingers are (or were, until all lift) down.
    pinching: bool,
    pinch_distance: Option<f32>,
}

impl GestureTracker {
    pub fn new(controls: &ControlsConfig) -> Self {
        let mut tracker = Self {
            drag_threshold_px: 0.0,
            tap_max_ms: 0,
            tap_max_distance_px: 0.0,
            long_press_ms: 0,
            orbiting: false,
            dragged: false,
            last_pointer: (0.0, 0.0),
            touch: None,
            pinching: false,
            pinch_distance: None,
        };
        tracker.set_thresholds(controls);
        tracker
    }

    /// Take new gesture thresholds. A gesture in progress keeps going; a
    /// pending long press keeps the deadline it was given.
    pub fn set_thresholds(&mut self, controls: &ControlsConfig) {
        self.drag_threshold_px = controls.drag_threshold_px;
        self.tap_max_ms = controls.tap_max_ms;
        self.tap_max_distance_px = controls.tap_max_distance_px;
        self.long_press_ms = controls.long_press_ms;
    }

    /// Track a pointer step; `Some(Orbit)` once the press has become a drag.
    fn drag_step(&mut self, x: f32, y: f32) -> Option<InputEvent> {
        let dx = x - self.last_pointer.0;
        let dy = y - self.last_pointer.1;
        self.last_pointer = (x, y);
        if dx.abs() > self.drag_threshold_px || dy.abs() > self.drag_threshold_px {
            self.dragged = true;
        }
        self.dragged.then_some(InputEvent::Orbit { dx, dy })
    }

    // -----------------------------------------------------------------------
    // Mouse
    // -----------------------------------------------------------------------

    pub fn mouse_down(&mut self, button: MouseButton, x: f32, y: f32) {
        if button == MouseButton::Left {
            self.orbiting = true;
            self.dragged = false;
            self.last_pointer = (x, y);
        }
    }

    pub fn mouse_move(&mut self, x: f32, y: f32) -> Option<InputEvent> {
        if !self.orbiting {
            return None;
        }
        self.drag_step(x, y)
    }

    pub fn mouse_up(&mut self) {
        self.orbiting = false;
    }

    /// The pointer left the viewport; any orbit in progress ends.
    pub fn mouse_leave(&mut self) {
        self.orbiting = false;
    }

    /// A completed left click. Swallowed if the press was a drag.
    pub fn click(&mut self, x: f32, y: f32) -> Option<InputEvent> {
        if std::mem::take(&mut self.dragged) {
            return None;
        }
        Some(InputEvent::Action(InputAction::Primary { x, y }))
    }

    pub fn context_click(&mut self, x: f32, y: f32) -> Option<InputEvent> {
        Some(InputEvent::Action(InputAction::Secondary { x, y }))
    }

    pub fn wheel(&mut self, delta_y: f32) -> Option<InputEvent> {
        Some(InputEvent::Zoom { delta: delta_y })
    }

    // -----------------------------------------------------------------------
    // Touch
    // -----------------------------------------------------------------------

    /// `touches` is every finger currently down, including the new one.
    pub fn touch_start(&mut self, touches: &[TouchPoint], now_ms: u64) {
        match touches {
            [only] if !self.pinching => {
                self.touch = Some(TouchStart {
                    id: only.id,
                    x: only.x,
                    y: only.y,
                    at_ms: now_ms,
                    long_press_at: Some(now_ms + self.long_press_ms),
                });
                self.dragged = false;
                self.last_pointer = (only.x, only.y);
            }
            [a, b, ..] => {
                self.pinching = true;
                self.touch = None;
                self.pinch_distance = Some(distance(a.x, a.y, b.x, b.y));
            }
            _ => {}
        }
    }

    /// `touches` is every finger currently down.
    pub fn touch_move(&mut self, touches: &[TouchPoint]) -> Option<InputEvent> {
        match touches {
            [a, b, ..] if self.pinching => {
                let current = distance(a.x, a.y, b.x, b.y);
                let previous = self.pinch_distance.replace(current)?;
                // Fingers spreading apart zoom in (smaller radius).
                Some(InputEvent::Zoom {
                    delta: previous - current,
                })
            }
            [only] if !self.pinching => {
                let start = self.touch?;
                if start.id != only.id {
                    return None;
                }
                let event = self.drag_step(only.x, only.y);
                if self.dragged {
                    self.touch = Some(TouchStart {
                        long_press_at: None,
                        ..start
                    });
                }
                event
            }
            _ => None,
        }
    }

    /// `ended` is the finger that lifted; `remaining` how many are still
    /// down.
    pub fn touch_end(
        &mut self,
        ended: TouchPoint,
        remaining: usize,
        now_ms: u64,
    ) -> Option<InputEvent> {
        let mut event = None;
        if !self.pinching {
            if let Some(start) = self.touch.take() {
                let is_tap = start.id == ended.id
                    && now_ms.saturating_sub(start.at_ms) < self.tap_max_ms
                    && distance(start.x, start.y, ended.x, ended.y) < self.tap_max_distance_px
                    && !self.dragged;
                if is_tap {
                    event = Some(InputEvent::Action(InputAction::Primary {
                        x: ended.x,
                        y: ended.y,
                    }));
                }
            }
            self.dragged = false;
        }
        if remaining == 0 {
            self.touch = None;
            self.pinching = false;
            self.pinch_distance = None;
        }
        event
    }

    /// Fire the pending long press if its time has come.
    pub fn poll_long_press(&mut self, now_ms: u64) -> Option<InputEvent> {
        if self.pinching || self.dragged {
            return None;
        }
        let touch = self.touch.as_mut()?;
        let due = touch.long_press_at?;
        if now_ms < due {
            return None;
        }
        touch.long_press_at = None;
        Some(InputEvent::Action(InputAction::Secondary {
            x: touch.x,
            y: touch.y,
        }))
    }
}

fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (ax - bx).hypot(ay - by)
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

/// Movement actions held this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MovementKeys {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Held keys, resolved through the bindings.
#[derive(Clone, Debug)]
pub struct KeyboardState {
    bindings: KeyBindings,
    /// Lowercased names of held bound keys.
    held: BTreeSet<String>,
}

impl KeyboardState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: BTreeSet::new(),
        }
    }

    /// Returns whether the key is bound (unbound keys are ignored).
    pub fn key_down(&mut self, key: &str) -> bool {
        if !self.bindings.is_bound(key) {
            return false;
        }
        self.held.insert(key.to_ascii_lowercase());
        true
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&key.to_ascii_lowercase());
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Rebind every action. Held keys that are no longer bound are
    /// released.
    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
        let bindings = &self.bindings;
        self.held.retain(|key| bindings.is_bound(key));
    }

    /// Rebind one action.
    pub fn set_binding(&mut self, action: MovementAction, keys: Vec<String>) {
        let mut bindings = self.bindings.clone();
        bindings.set(action, keys);
        self.set_bindings(bindings);
    }

    pub fn movement(&self) -> MovementKeys {
        let any = |keys: &[String]| {
            keys.iter()
                .any(|k| self.held.contains(&k.to_ascii_lowercase()))
        };
        MovementKeys {
            forward: any(&self.bindings.forward),
            backward: any(&self.bindings.backward),
            left: any(&self.bindings.left),
            right: any(&self.bindings.right),
            up: any(&self.bindings.up),
            down: any(&self.bindings.down),
        }
    }
}
