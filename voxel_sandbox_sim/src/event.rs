// Sandbox events: the output of `SandboxState::step()`.
//
// Events tell the host what changed so it can create or destroy renderables
// without diffing the index. Every committed change produces exactly one
// event; a rejected placement produces `PlacementRejected` so the host can
// log or ignore it. Removing a cube that is not indexed produces nothing.
//
// `sequence` is the number of the command that produced the event. It
// increases by one per command applied, across calls to `step()`, so events
// from one command share a sequence and can be grouped by the host.

use crate::error::PlacementRejection;
use crate::types::{Color, Cube};
use serde::{Deserialize, Serialize};

/// A host-visible change to the sandbox.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SandboxEvent {
    pub sequence: u64,
    pub kind: SandboxEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SandboxEventKind {
    /// A cube was committed to the index; the host should build it.
    CubePlaced { cube: Cube },
    /// A placement was refused. Nothing changed.
    PlacementRejected { reason: PlacementRejection },
    /// A cube left the index; the host should release its renderable.
    CubeRemoved { cube: Cube },
    /// Every cube was removed, listed in insertion order.
    Cleared { cubes: Vec<Cube> },
    ColorSelected { color: Color },
}

/// Result of applying a batch of commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepResult {
    pub events: Vec<SandboxEvent>,
}

impl StepResult {
    /// Cubes placed during the step, in order.
    pub fn placed(&self) -> impl Iterator<Item = &Cube> {
        self.events.iter().filter_map(|e| match &e.kind {
            SandboxEventKind::CubePlaced { cube } => Some(cube),
            _ => None,
        })
    }

    /// Rejections during the step, in order.
    pub fn rejections(&self) -> impl Iterator<Item = PlacementRejection> {
        self.events.iter().filter_map(|e| match e.kind {
            SandboxEventKind::PlacementRejected { reason } => Some(reason),
            _ => None,
        })
    }
}
