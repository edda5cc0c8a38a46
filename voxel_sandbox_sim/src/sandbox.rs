// Top-level sandbox state and the command processor.
//
// `SandboxState` is the single owner of everything the engine knows: the
// config, the `SpatialIndex`, the `PlacementResolver`, and the `Palette`.
// The host never mutates these directly. It either:
//
// - builds `SandboxCommand`s and passes them to `step()`, or
// - hands a world ray to `primary_action()` / `secondary_action()`, which
//   ray-cast against the index (cubes first, then the ground plane), build
//   the matching command, and `step()` it.
//
// `step()` applies commands in order and returns a `StepResult` whose events
// tell the host which renderables to build or release. Each command
// consumes one sequence number whether or not it produced an event.
//
// Validation follows the "silent no-op" rule: a placement against a cube
// id that is no longer indexed, or a removal of a missing cube, changes
// nothing and emits nothing. A placement the index refuses emits
// `PlacementRejected`.
//
// See also: `command.rs`, `event.rs`, `placement.rs`, `raycast.rs`.

use crate::command::{SandboxAction, SandboxCommand};
use crate::config::SandboxConfig;
use crate::error::{ConfigError, PlacementRejection};
use crate::event::{SandboxEvent, SandboxEventKind, StepResult};
use crate::palette::Palette;
use crate::placement::PlacementResolver;
use crate::raycast::{Ray, RayCaster, RayHit};
use crate::spatial_index::SpatialIndex;
use crate::types::{Color, Cube};
use log::trace;

#[derive(Clone, Debug)]
pub struct SandboxState {
    index: SpatialIndex,
    resolver: PlacementResolver,
    palette: Palette,
    next_sequence: u64,
}

impl Default for SandboxState {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxState {
    /// A sandbox with the default config.
    pub fn new() -> Self {
        Self::from_index(SpatialIndex::default())
    }

    /// A sandbox with a custom config, rejected if it does not validate.
    pub fn with_config(config: SandboxConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_index(SpatialIndex::new(config)?))
    }

    fn from_index(index: SpatialIndex) -> Self {
        Self {
            resolver: PlacementResolver::new(index.config()),
            palette: Palette::new(index.config()),
            index,
            next_sequence: 0,
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        self.index.config()
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply commands in order.
    pub fn step(&mut self, commands: &[SandboxCommand]) -> StepResult {
        let mut events = Vec::new();
        for command in commands {
            let sequence = self.next_sequence;
            self.next_sequence += 1;
            self.process_command(sequence, command, &mut events);
        }
        StepResult { events }
    }

    fn process_command(
        &mut self,
        sequence: u64,
        command: &SandboxCommand,
        events: &mut Vec<SandboxEvent>,
    ) {
        let mut emit = |kind| events.push(SandboxEvent { sequence, kind });

        match &command.action {
            SandboxAction::PlaceOnGrid { point, color } => {
                let color = color.unwrap_or(self.palette.selected());
                let result = self
                    .resolver
                    .resolve_from_empty_grid(&mut self.index, *point, color);
                emit(placement_event(result));
            }
            SandboxAction::PlaceOnFace {
                cube,
                normal,
                color,
            } => {
                let Some(hit) = self.index.get(*cube).copied() else {
                    trace!("place on face of {cube} ignored: not indexed");
                    return;
                };
                let color = color.unwrap_or(self.palette.selected());
                let result =
                    self.resolver
                        .resolve_from_cube_face(&mut self.index, &hit, *normal, color);
                emit(placement_event(result));
            }
            SandboxAction::Remove { cube } => {
                if let Some(removed) = self.index.remove(*cube) {
                    emit(SandboxEventKind::CubeRemoved { cube: removed });
                }
            }
            SandboxAction::ClearAll => {
                let cubes = self.index.clear();
                emit(SandboxEventKind::Cleared { cubes });
            }
            SandboxAction::SelectColor { color } => {
                self.palette.select(*color);
                emit(SandboxEventKind::ColorSelected { color: *color });
            }
            SandboxAction::SelectNamedColor { name } => {
                if let Some(color) = self.palette.select_named(name) {
                    emit(SandboxEventKind::ColorSelected { color });
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Ray-driven actions
    // -----------------------------------------------------------------------

    /// The command a primary click along `ray` would issue: attach to the
    /// nearest cube's face, else stack on the ground-plane column. `None`
    /// if the ray hits nothing.
    pub fn primary_command(
        &self,
        ray: &Ray,
        caster: &impl RayCaster,
        color: Option<Color>,
    ) -> Option<SandboxCommand> {
        let action = match caster.pick(ray, &self.index)? {
            RayHit::Cube(hit) => SandboxAction::PlaceOnFace {
                cube: hit.cube,
                normal: hit.normal,
                color,
            },
            RayHit::Ground(hit) => SandboxAction::PlaceOnGrid {
                point: hit.point,
                color,
            },
        };
        Some(action.into())
    }

    /// The command a secondary click along `ray` would issue: remove the
    /// nearest cube. The ground is not a target.
    pub fn secondary_command(&self, ray: &Ray, caster: &impl RayCaster) -> Option<SandboxCommand> {
        let hit = caster.intersect_cubes(ray, &self.index).into_iter().next()?;
        Some(SandboxAction::Remove { cube: hit.cube }.into())
    }

    /// Place a cube where `ray` points. `color: None` uses the palette
    /// selection.
    pub fn primary_action(
        &mut self,
        ray: &Ray,
        caster: &impl RayCaster,
        color: Option<Color>,
    ) -> StepResult {
        match self.primary_command(ray, caster, color) {
            Some(command) => self.step(&[command]),
            None => StepResult::default(),
        }
    }

    /// Remove the cube `ray` points at, if any.
    pub fn secondary_action(&mut self, ray: &Ray, caster: &impl RayCaster) -> StepResult {
        match self.secondary_command(ray, caster) {
            Some(command) => self.step(&[command]),
            None => StepResult::default(),
        }
    }
}

fn placement_event(result: Result<Cube, PlacementRejection>) -> SandboxEventKind {
    match result {
        Ok(cube) => SandboxEventKind::CubePlaced { cube },
        Err(reason) => SandboxEventKind::PlacementRejected { reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::SlabRayCaster;
    use crate::types::{CubeId, GridColumn, Vec3};

    fn cmd(action: SandboxAction) -> SandboxCommand {
        action.into()
    }

    fn place_grid(x: f32, z: f32) -> SandboxCommand {
        cmd(SandboxAction::PlaceOnGrid {
            point: Vec3::new(x, 0.0, z),
            color: None,
        })
    }

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 20.0, z), Vec3::new(0.0, -1.0, 0.0)).unwrap()
    }

    #[test]
    fn new_sandbox_is_empty() {
        let state = SandboxState::new();
        assert!(state.index().is_empty());
        assert_eq!(state.palette().selected(), Color(0xff6b6b));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SandboxConfig {
            unit_size: f32::NAN,
            ..SandboxConfig::default()
        };
        assert!(matches!(
            SandboxState::with_config(config),
            Err(ConfigError::Invalid(_))
        ));
        let custom = SandboxConfig {
            grid_size: 4,
            ..SandboxConfig::default()
        };
        let mut state = SandboxState::with_config(custom).unwrap();
        let result = state.step(&[place_grid(2.0, 0.0)]);
        assert_eq!(
            result.rejections().collect::<Vec<_>>(),
            vec![PlacementRejection::OutOfBounds]
        );
    }

    #[test]
    fn placement_uses_selected_color() {
        let mut state = SandboxState::new();
        let result = state.step(&[
            cmd(SandboxAction::SelectNamedColor {
                name: "sky".to_string(),
            }),
            place_grid(0.0, 0.0),
        ]);
        let placed: Vec<_> = result.placed().collect();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].color, Color(0x45b7d1));
    }

    #[test]
    fn explicit_color_overrides_selection() {
        let mut state = SandboxState::new();
        let result = state.step(&[cmd(SandboxAction::PlaceOnGrid {
            point: Vec3::ZERO,
            color: Some(Color(0x010203)),
        })]);
        assert_eq!(result.placed().next().unwrap().color, Color(0x010203));
        assert_eq!(state.palette().selected(), Color(0xff6b6b));
    }

    #[test]
    fn sequence_numbers_count_commands() {
        let mut state = SandboxState::new();
        let first = state.step(&[
            place_grid(0.0, 0.0),
            cmd(SandboxAction::Remove { cube: CubeId(99) }),
            place_grid(1.0, 0.0),
        ]);
        let sequences: Vec<u64> = first.events.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 2]);

        let second = state.step(&[place_grid(2.0, 0.0)]);
        assert_eq!(second.events[0].sequence, 3);
    }

    #[test]
    fn out_of_bounds_placement_is_reported() {
        let mut state = SandboxState::new();
        let result = state.step(&[place_grid(10.0, 0.0)]);
        assert_eq!(
            result.rejections().collect::<Vec<_>>(),
            vec![PlacementRejection::OutOfBounds]
        );
        assert!(state.index().is_empty());
    }

    #[test]
    fn place_on_face_of_missing_cube_is_silent() {
        let mut state = SandboxState::new();
        let result = state.step(&[cmd(SandboxAction::PlaceOnFace {
            cube: CubeId(5),
            normal: Vec3::UP,
            color: None,
        })]);
        assert!(result.events.is_empty());
        assert!(state.index().is_empty());
    }

    #[test]
    fn place_on_face_attaches_sideways() {
        let mut state = SandboxState::new();
        let base = state.step(&[place_grid(2.0, 2.0)]);
        let base = *base.placed().next().unwrap();
        let result = state.step(&[cmd(SandboxAction::PlaceOnFace {
            cube: base.id,
            normal: Vec3::new(0.0, 0.0, -1.0),
            color: None,
        })]);
        let cube = result.placed().next().unwrap();
        assert_eq!(cube.column, GridColumn::new(2, 1));
        assert_eq!(cube.height, 0.5);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut state = SandboxState::new();
        let placed = state.step(&[place_grid(0.0, 0.0)]);
        let id = placed.placed().next().unwrap().id;

        let first = state.step(&[cmd(SandboxAction::Remove { cube: id })]);
        assert!(matches!(
            first.events[0].kind,
            SandboxEventKind::CubeRemoved { cube } if cube.id == id
        ));
        let second = state.step(&[cmd(SandboxAction::Remove { cube: id })]);
        assert!(second.events.is_empty());
    }

    #[test]
    fn clear_reports_prior_cubes_each_time() {
        let mut state = SandboxState::new();
        state.step(&[place_grid(0.0, 0.0), place_grid(0.0, 0.0), place_grid(3.0, 3.0)]);

        let first = state.step(&[cmd(SandboxAction::ClearAll)]);
        match &first.events[0].kind {
            SandboxEventKind::Cleared { cubes } => assert_eq!(cubes.len(), 3),
            other => panic!("expected Cleared, got {other:?}"),
        }
        let second = state.step(&[cmd(SandboxAction::ClearAll)]);
        match &second.events[0].kind {
            SandboxEventKind::Cleared { cubes } => assert!(cubes.is_empty()),
            other => panic!("expected Cleared, got {other:?}"),
        }
        assert!(state.index().is_empty());
    }

    #[test]
    fn unknown_color_name_emits_nothing() {
        let mut state = SandboxState::new();
        let result = state.step(&[cmd(SandboxAction::SelectNamedColor {
            name: "nope".to_string(),
        })]);
        assert!(result.events.is_empty());
    }

    #[test]
    fn primary_action_stacks_through_cube_tops() {
        let mut state = SandboxState::new();
        let caster = SlabRayCaster::new(state.config());
        for n in 0..3 {
            let result = state.primary_action(&down_ray(4.2, -1.8), &caster, None);
            let cube = result.placed().next().unwrap();
            assert_eq!(cube.column, GridColumn::new(4, -2));
            assert_eq!(cube.height, n as f32 + 0.5);
        }
    }

    #[test]
    fn primary_action_attaches_to_side_face() {
        let mut state = SandboxState::new();
        let caster = SlabRayCaster::new(state.config());
        state.primary_action(&down_ray(0.0, 0.0), &caster, None);

        let from_east = Ray::new(Vec3::new(8.0, 0.5, 0.0), Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        let result = state.primary_action(&from_east, &caster, Some(Color(0x00ff00)));
        let cube = result.placed().next().unwrap();
        assert_eq!(cube.column, GridColumn::new(1, 0));
        assert_eq!(cube.height, 0.5);
        assert_eq!(cube.color, Color(0x00ff00));
    }

    #[test]
    fn primary_action_missing_everything_does_nothing() {
        let mut state = SandboxState::new();
        let caster = SlabRayCaster::new(state.config());
        let sky = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::UP).unwrap();
        assert!(state.primary_action(&sky, &caster, None).events.is_empty());
    }

    #[test]
    fn secondary_action_removes_nearest_cube() {
        let mut state = SandboxState::new();
        let caster = SlabRayCaster::new(state.config());
        state.primary_action(&down_ray(1.0, 1.0), &caster, None);
        state.primary_action(&down_ray(1.0, 1.0), &caster, None);
        assert_eq!(state.index().len(), 2);

        let result = state.secondary_action(&down_ray(1.0, 1.0), &caster);
        match &result.events[0].kind {
            SandboxEventKind::CubeRemoved { cube } => assert_eq!(cube.height, 1.5),
            other => panic!("expected CubeRemoved, got {other:?}"),
        }

        // Nothing but ground under this ray: no-op.
        let empty = state.secondary_action(&down_ray(-3.0, -3.0), &caster);
        assert!(empty.events.is_empty());
    }
}
