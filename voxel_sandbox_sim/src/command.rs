// Commands that mutate sandbox state.
//
// All external mutations go through `SandboxCommand`. The sandbox is a
// function `(state, commands) -> (new_state, events)` and commands are the
// input; see `sandbox.rs` for `step()`.
//
// The full flow for a click:
//   host input -> `GestureTracker` (host crate) -> camera ray ->
//   `SandboxState::primary_action()` picks a target -> builds a
//   `SandboxCommand` -> `SandboxState::step()` applies it.
//
// Scripts and tests can also build commands directly, skipping the ray
// cast. Current actions:
// - `PlaceOnGrid`: snap a ground-plane point and stack a cube there.
// - `PlaceOnFace`: attach a cube to a face of an existing cube.
// - `Remove`: remove one cube. Removing a missing cube does nothing.
// - `ClearAll`: remove every cube.
// - `SelectColor` / `SelectNamedColor`: change the palette selection.
//
// A placement's `color: None` means "use the selected palette color". The
// drag-and-drop path sets it to the dragged swatch.

use crate::types::{Color, CubeId, Vec3};
use serde::{Deserialize, Serialize};

/// A command for the sandbox to apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SandboxCommand {
    pub action: SandboxAction,
}

impl From<SandboxAction> for SandboxCommand {
    fn from(action: SandboxAction) -> Self {
        Self { action }
    }
}

/// The specific action a command performs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SandboxAction {
    /// Place on the column under a ground-plane point.
    PlaceOnGrid { point: Vec3, color: Option<Color> },
    /// Place against the face of `cube` whose outward normal is `normal`.
    PlaceOnFace {
        cube: CubeId,
        normal: Vec3,
        color: Option<Color>,
    },
    Remove { cube: CubeId },
    ClearAll,
    SelectColor { color: Color },
    SelectNamedColor { name: String },
}
