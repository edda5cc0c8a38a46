// Host-side renderable bookkeeping.
//
// The engine owns cube records; the host owns whatever it builds to draw
// them. `SceneRegistry` is that ownership in a headless host: one
// `Renderable` per live `CubeId`, created and released purely from
// `SandboxEvent`s. After every step the registry holds exactly the cubes in
// the index, which the smoke test checks.
//
// Lookups are by id only and never iterated for output, so the registry
// uses an `FxHashMap` rather than an ordered map.

use log::{debug, warn};
use rustc_hash::FxHashMap;
use voxel_sandbox_sim::event::{SandboxEvent, SandboxEventKind};
use voxel_sandbox_sim::types::{Color, Cube, CubeId, Vec3};

/// Opaque handle to a host renderable (mesh + material in a real renderer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// What the host built for one cube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Renderable {
    pub handle: RenderHandle,
    pub center: Vec3,
    pub color: Color,
}

#[derive(Clone, Debug, Default)]
pub struct SceneRegistry {
    renderables: FxHashMap<CubeId, Renderable>,
    next_handle: u64,
    /// Total renderables released since creation.
    released: u64,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_all<'a>(&mut self, events: impl IntoIterator<Item = &'a SandboxEvent>) {
        for event in events {
            self.apply(event);
        }
    }

    pub fn apply(&mut self, event: &SandboxEvent) {
        match &event.kind {
            SandboxEventKind::CubePlaced { cube } => self.build(cube),
            SandboxEventKind::CubeRemoved { cube } => self.release(cube.id),
            SandboxEventKind::Cleared { cubes } => {
                for cube in cubes {
                    self.release(cube.id);
                }
            }
            SandboxEventKind::PlacementRejected { .. } | SandboxEventKind::ColorSelected { .. } => {}
        }
    }

    fn build(&mut self, cube: &Cube) {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        let renderable = Renderable {
            handle,
            center: cube.center(),
            color: cube.color,
        };
        if self.renderables.insert(cube.id, renderable).is_some() {
            warn!("{} was built twice; replaced its renderable", cube.id);
        }
    }

    fn release(&mut self, id: CubeId) {
        match self.renderables.remove(&id) {
            Some(renderable) => {
                self.released += 1;
                debug!("released {:?} for {id}", renderable.handle);
            }
            None => warn!("release for {id} with no renderable"),
        }
    }

    pub fn get(&self, id: CubeId) -> Option<&Renderable> {
        self.renderables.get(&id)
    }

    pub fn contains(&self, id: CubeId) -> bool {
        self.renderables.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    pub fn released(&self) -> u64 {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxel_sandbox_sim::command::{SandboxAction, SandboxCommand};
    use voxel_sandbox_sim::sandbox::SandboxState;

    fn place(x: f32, z: f32) -> SandboxCommand {
        SandboxCommand::from(SandboxAction::PlaceOnGrid {
            point: Vec3::new(x, 0.0, z),
            color: None,
        })
    }

    #[test]
    fn registry_follows_events() {
        let mut state = SandboxState::new();
        let mut scene = SceneRegistry::new();

        let placed = state.step(&[place(1.0, 1.0), place(1.0, 1.0)]);
        scene.apply_all(&placed.events);
        assert_eq!(scene.len(), 2);

        let top = state.index().all_placed().last().copied().unwrap();
        assert_eq!(scene.get(top.id).unwrap().center, Vec3::new(1.0, 1.5, 1.0));

        let removed = state.step(&[SandboxCommand::from(SandboxAction::Remove { cube: top.id })]);
        scene.apply_all(&removed.events);
        assert!(!scene.contains(top.id));
        assert_eq!(scene.released(), 1);

        let cleared = state.step(&[SandboxCommand::from(SandboxAction::ClearAll)]);
        scene.apply_all(&cleared.events);
        assert!(scene.is_empty());
        assert_eq!(scene.released(), 2);
    }

    #[test]
    fn handles_are_unique() {
        let mut state = SandboxState::new();
        let mut scene = SceneRegistry::new();
        let result = state.step(&[place(0.0, 0.0), place(2.0, 0.0)]);
        scene.apply_all(&result.events);
        let ids: Vec<CubeId> = result.placed().map(|c| c.id).collect();
        let a = scene.get(ids[0]).unwrap().handle;
        let b = scene.get(ids[1]).unwrap().handle;
        assert_ne!(a, b);
    }
}
