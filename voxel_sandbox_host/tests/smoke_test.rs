// Integration smoke test for the headless host.
//
// Drives the full path a user click takes: raw mouse/touch/keyboard input ->
// gesture tracking -> camera ray -> placement resolver -> spatial index ->
// events -> scene registry. After every interaction the scene registry must
// hold exactly the cubes in the index.
//
// Several tests first orbit the camera to its steepest angle so the center
// pixel looks almost straight down at the target. From there a click on
// the center lands on the top face of whatever stack sits under the target.

use voxel_sandbox_host::input::{MouseButton, TouchPoint};
use voxel_sandbox_host::script::{Script, ScriptStep, run_script};
use voxel_sandbox_host::{HeadlessHost, HostConfig};
use voxel_sandbox_sim::command::{SandboxAction, SandboxCommand};
use voxel_sandbox_sim::event::{SandboxEventKind, StepResult};
use voxel_sandbox_sim::types::{Color, Cube, GridColumn, Vec3};

fn host() -> HeadlessHost {
    HeadlessHost::new(HostConfig::default()).unwrap()
}

/// Every indexed cube has a renderable and vice versa.
fn assert_scene_matches(host: &HeadlessHost) {
    let index = host.state().index();
    assert_eq!(host.scene().len(), index.len());
    for cube in index.all_placed() {
        let renderable = host
            .scene()
            .get(cube.id)
            .unwrap_or_else(|| panic!("{} has no renderable", cube.id));
        assert_eq!(renderable.center, cube.center());
        assert_eq!(renderable.color, cube.color);
    }
}

/// Orbit with a long vertical drag until the camera looks nearly straight
/// down.
fn look_down(host: &mut HeadlessHost) {
    let (cx, cy) = host.viewport().center();
    host.mouse_down(MouseButton::Left, cx, cy);
    host.mouse_move(cx, cy + 1000.0);
    host.mouse_up();
    let swallowed = host.click(cx, cy + 1000.0);
    assert!(swallowed.events.is_empty());
}

fn only_placed(result: &StepResult) -> Cube {
    let placed: Vec<&Cube> = result.placed().collect();
    assert_eq!(placed.len(), 1, "expected one placement, got {result:?}");
    *placed[0]
}

/// Where the camera ray through a pixel meets the ground plane.
fn ground_column(host: &HeadlessHost, x: f32, y: f32) -> GridColumn {
    let viewport = host.viewport();
    let ray = host
        .camera()
        .screen_ray(x, y, viewport.width, viewport.height)
        .unwrap();
    let t = -ray.origin.y / ray.direction.y;
    let point = ray.at(t);
    GridColumn::snap(point.x, point.z).unwrap()
}

#[test]
fn clicks_stack_under_a_top_down_camera() {
    let mut host = host();
    look_down(&mut host);
    let (cx, cy) = host.viewport().center();

    for n in 0..3 {
        let cube = only_placed(&host.click(cx, cy));
        assert_eq!(cube.column, GridColumn::new(0, 0));
        assert_eq!(cube.height, n as f32 + 0.5);
        assert_eq!(cube.color, Color(0xff6b6b));
        assert_scene_matches(&host);
    }

    // Right click removes the nearest (top) cube.
    let removed = host.context_click(cx, cy);
    match &removed.events[0].kind {
        SandboxEventKind::CubeRemoved { cube } => assert_eq!(cube.height, 2.5),
        other => panic!("expected CubeRemoved, got {other:?}"),
    }
    assert_eq!(host.state().index().len(), 2);
    assert_scene_matches(&host);
}

#[test]
fn ground_clicks_snap_to_the_picked_column() {
    let mut host = host();
    for (x, y) in [
        (400.0, 300.0),
        (250.0, 300.0),
        (550.0, 300.0),
        (440.0, 330.0),
        (400.0, 360.0),
        (330.0, 280.0),
    ] {
        let expected = ground_column(&host, x, y);
        let result = host.click(x, y);
        let cube = only_placed(&result);
        assert_eq!(cube.column, expected);
        assert_eq!(cube.height, 0.5);
    }
    assert_scene_matches(&host);
}

#[test]
fn clicking_past_the_grid_places_nothing() {
    let mut host = host();
    // The top of the screen looks over the far edge of the grid.
    let result = host.click(400.0, 0.0);
    assert!(result.placed().next().is_none());
    assert!(host.state().index().is_empty());
}

#[test]
fn drag_orbits_without_placing() {
    let mut host = host();
    let theta = host.camera().theta();
    host.mouse_down(MouseButton::Left, 100.0, 100.0);
    host.mouse_move(150.0, 100.0);
    host.mouse_up();
    assert!(host.click(150.0, 100.0).events.is_empty());
    assert!((host.camera().theta() - (theta - 0.5)).abs() < 1e-4);
    assert!(host.state().index().is_empty());
}

#[test]
fn tap_places_and_long_press_removes() {
    let mut host = host();
    look_down(&mut host);
    let (cx, cy) = host.viewport().center();
    let finger = TouchPoint { id: 7, x: cx, y: cy };

    host.touch_start(&[finger], 1_000);
    let tapped = host.touch_end(finger, 0, 1_100);
    let cube = only_placed(&tapped);
    assert_eq!(cube.column, GridColumn::new(0, 0));

    host.touch_start(&[finger], 2_000);
    assert!(host.tick(2_200).events.is_empty());
    let pressed = host.tick(2_500);
    assert!(matches!(
        pressed.events[0].kind,
        SandboxEventKind::CubeRemoved { cube: removed } if removed.id == cube.id
    ));
    assert!(host.touch_end(finger, 0, 2_600).events.is_empty());
    assert!(host.state().index().is_empty());
    assert_scene_matches(&host);
}

#[test]
fn palette_drop_uses_dragged_color() {
    let mut host = host();
    host.command(&[SandboxCommand::from(SandboxAction::SelectNamedColor {
        name: "moss".to_string(),
    })]);
    let (cx, cy) = host.viewport().center();

    host.begin_drag(Color(0x9b59b6));
    let dropped = only_placed(&host.drop_at(cx, cy));
    host.end_drag();
    assert_eq!(dropped.color, Color(0x9b59b6));

    // The selection is unchanged by the drop.
    let clicked = only_placed(&host.click(cx + 40.0, cy + 30.0));
    assert_eq!(clicked.color, Color(0x6ab04c));
    assert_scene_matches(&host);
}

#[test]
fn held_keys_pan_the_placement_target() {
    let mut host = host();
    look_down(&mut host);
    assert!(host.key_down("w"));
    for frame in 1..=10 {
        host.tick(frame * 16);
    }
    host.key_up("w");

    let target = host.camera().target();
    assert!((target - Vec3::new(-1.414, 0.0, -1.414)).length() < 0.01);

    let (cx, cy) = host.viewport().center();
    let cube = only_placed(&host.click(cx, cy));
    assert_eq!(cube.column, GridColumn::new(-1, -1));
}

#[test]
fn side_faces_attach_through_commands() {
    let mut host = host();
    look_down(&mut host);
    let (cx, cy) = host.viewport().center();
    let base = only_placed(&host.click(cx, cy));

    let result = host.command(&[SandboxCommand::from(SandboxAction::PlaceOnFace {
        cube: base.id,
        normal: Vec3::new(0.0, 0.0, 1.0),
        color: None,
    })]);
    let side = only_placed(&result);
    assert_eq!(side.column, GridColumn::new(0, 1));
    assert_eq!(side.height, base.height);
    assert_scene_matches(&host);
}

#[test]
fn scripted_session_ends_with_expected_cubes() {
    let mut host = host();
    let script = Script::from_json(
        r##"{
            "viewport": { "width": 800, "height": 600 },
            "steps": [
                { "op": "drag", "from": [400, 300], "to": [400, 1300] },
                { "op": "click", "x": 400, "y": 300 },
                { "op": "click", "x": 400, "y": 300 },
                { "op": "select_named", "name": "teal" },
                { "op": "click", "x": 400, "y": 300 },
                { "op": "right_click", "x": 400, "y": 300 },
                { "op": "drop_block", "x": 400, "y": 300, "color": "#f9ca24" },
                { "op": "wheel", "delta": 200 },
                { "op": "pinch", "from_gap": 100, "to_gap": 300 }
            ]
        }"##,
    )
    .unwrap();
    let report = run_script(&mut host, &script);
    assert_eq!(report.steps, 9);
    assert_eq!(report.placed, 4);
    assert_eq!(report.removed, 1);

    let cubes: Vec<&Cube> = host.state().index().all_placed().collect();
    let heights: Vec<f32> = cubes.iter().map(|c| c.height).collect();
    assert_eq!(heights, vec![0.5, 1.5, 2.5]);
    assert_eq!(cubes[2].color, Color(0xf9ca24));
    assert_scene_matches(&host);

    let json = serde_json::to_string(&cubes).unwrap();
    assert!(json.contains("#f9ca24"));

    let cleared = run_script(
        &mut host,
        &Script {
            viewport: None,
            steps: vec![ScriptStep::ClearAll],
        },
    );
    assert_eq!(cleared.removed, 3);
    assert!(host.scene().is_empty());
}
