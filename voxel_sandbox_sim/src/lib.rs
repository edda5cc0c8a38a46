// voxel_sandbox_sim: pure Rust block-placement engine.
//
// This crate contains all placement logic for the voxel sandbox: the
// authoritative index of placed cubes, grid snapping, face-normal to
// adjacent-cell resolution, palette selection, and the command/event
// interface. It has no rendering or windowing dependencies and can be
// tested, benchmarked, and run headless.
//
// Module overview:
// - `sandbox.rs`:       SandboxState, command processing, ray-driven actions.
// - `spatial_index.rs`: SpatialIndex, cubes by id and by grid column.
// - `placement.rs`:     PlacementResolver + the face-direction rule table.
// - `raycast.rs`:       Ray, hits, the RayCaster trait, SlabRayCaster.
// - `palette.rs`:       Named swatches and the selected color.
// - `command.rs`:       SandboxCommand / SandboxAction, all mutations.
// - `event.rs`:         SandboxEvent / SandboxEventKind + StepResult.
// - `config.rs`:        SandboxConfig, all tunable placement parameters.
// - `error.rs`:         PlacementRejection, ConfigError.
// - `types.rs`:         GridColumn, CubeId, Cube, Color, Vec3.
//
// The companion crate `voxel_sandbox_host` wraps this library with a
// camera, input gesture handling and renderable bookkeeping. This crate
// never sees screen coordinates, only world-space rays.
//
// Everything is single-threaded and deterministic. Collections are
// `BTreeMap`s so iteration order never depends on hashing.

pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod palette;
pub mod placement;
pub mod raycast;
pub mod sandbox;
pub mod spatial_index;
pub mod types;
