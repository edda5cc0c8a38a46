// Orbit camera: spherical orbit, zoom, keyboard pan, and screen picking.
//
// The camera always looks at `target`. Its position is `target + offset`,
// where the offset is stored in spherical coordinates using the renderer's
// convention: `phi` is the polar angle from +Y, `theta` the azimuth measured
// from +Z toward +X:
//
//   offset = (r sin(phi) sin(theta), r cos(phi), r sin(phi) cos(theta))
//
// `phi` is clamped to `[PHI_MIN, PHI_MAX]` so the camera stays above the
// ground and never looks straight down (which would make the view basis
// degenerate). The radius is clamped to `[min_radius, max_radius]`.
//
// Keyboard movement pans `target` along the horizontal projection of the
// view direction; the up/down actions change the radius instead of moving
// vertically.
//
// `screen_ray()` turns a pixel into a world-space `Ray` from the camera
// position, which is all the placement engine needs.
//
// Speeds and sensitivities start from `ControlsConfig` and can be changed
// at runtime through the setters.
//
// See also: `input.rs` for the gestures that drive `orbit()`/`zoom()` and
// for `MovementKeys`, `host.rs` for the wiring.

use crate::input::{ControlsConfig, MovementKeys};
use serde::{Deserialize, Serialize};
use voxel_sandbox_sim::raycast::Ray;
use voxel_sandbox_sim::types::Vec3;

/// Lowest polar angle (closest to straight down).
pub const PHI_MIN: f32 = 0.1;
/// Highest polar angle (closest to the horizon).
pub const PHI_MAX: f32 = std::f32::consts::PI / 2.2;

/// Perspective camera parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view, in degrees.
    pub fov_degrees: f32,
    /// Near and far clip distances. Only a renderer uses these.
    pub near: f32,
    pub far: f32,
    /// Camera position at startup; the orbit target starts at the origin.
    pub initial_position: Vec3,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            initial_position: Vec3::new(15.0, 15.0, 15.0),
            min_radius: 5.0,
            max_radius: 50.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    target: Vec3,
    radius: f32,
    theta: f32,
    phi: f32,
    fov_degrees: f32,
    min_radius: f32,
    max_radius: f32,
    orbit_sensitivity: f32,
    zoom_sensitivity: f32,
    move_speed: f32,
    vertical_speed: f32,
}

impl OrbitCamera {
    pub fn new(camera: &CameraConfig, controls: &ControlsConfig) -> Self {
        let offset = camera.initial_position;
        let radius = offset.length();
        let (theta, phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PHI_MIN)
        };
        Self {
            target: Vec3::ZERO,
            radius: radius.clamp(camera.min_radius, camera.max_radius),
            theta,
            phi: phi.clamp(PHI_MIN, PHI_MAX),
            fov_degrees: camera.fov_degrees,
            min_radius: camera.min_radius,
            max_radius: camera.max_radius,
            orbit_sensitivity: controls.orbit_sensitivity,
            zoom_sensitivity: controls.zoom_sensitivity,
            move_speed: controls.move_speed,
            vertical_speed: controls.vertical_speed,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        let offset = Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        );
        self.target + offset
    }

    /// Unit view direction, from the camera toward the target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position())
            .normalized()
            .unwrap_or(Vec3::new(0.0, -1.0, 0.0))
    }

    // -----------------------------------------------------------------------
    // Runtime settings
    // -----------------------------------------------------------------------

    pub fn set_move_speed(&mut self, speed: f32) {
        self.move_speed = speed;
    }

    pub fn set_vertical_speed(&mut self, speed: f32) {
        self.vertical_speed = speed;
    }

    pub fn set_orbit_sensitivity(&mut self, sensitivity: f32) {
        self.orbit_sensitivity = sensitivity;
    }

    pub fn set_zoom_sensitivity(&mut self, sensitivity: f32) {
        self.zoom_sensitivity = sensitivity;
    }

    /// Take the speeds and sensitivities from `controls`.
    pub fn apply_controls(&mut self, controls: &ControlsConfig) {
        self.set_move_speed(controls.move_speed);
        self.set_vertical_speed(controls.vertical_speed);
        self.set_orbit_sensitivity(controls.orbit_sensitivity);
        self.set_zoom_sensitivity(controls.zoom_sensitivity);
    }

    // -----------------------------------------------------------------------
    // Motion
    // -----------------------------------------------------------------------

    /// Rotate by a pointer drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.theta -= dx * self.orbit_sensitivity;
        self.phi = (self.phi - dy * self.orbit_sensitivity).clamp(PHI_MIN, PHI_MAX);
    }

    /// Move toward (negative) or away from (positive) the target by a wheel
    /// or pinch delta.
    pub fn zoom(&mut self, delta: f32) {
        self.set_radius(self.radius + delta * self.zoom_sensitivity);
    }

    fn set_radius(&mut self, radius: f32) {
        self.radius = radius.clamp(self.min_radius, self.max_radius);
    }

    /// Apply one frame of held movement keys.
    pub fn apply_movement(&mut self, keys: MovementKeys) {
        if keys.is_idle() {
            return;
        }
        let view = self.forward();
        let Some(ahead) = Vec3::new(view.x, 0.0, view.z).normalized() else {
            return;
        };
        let right = ahead.cross(Vec3::UP);

        let mut pan = Vec3::ZERO;
        if keys.forward {
            pan = pan + ahead;
        }
        if keys.backward {
            pan = pan - ahead;
        }
        if keys.right {
            pan = pan + right;
        }
        if keys.left {
            pan = pan - right;
        }
        self.target = self.target + pan * self.move_speed;

        if keys.up {
            self.set_radius(self.radius - self.vertical_speed);
        }
        if keys.down {
            self.set_radius(self.radius + self.vertical_speed);
        }
    }

    /// World ray through pixel `(x, y)` of a `width` x `height` viewport
    /// (origin top-left). `None` for an empty viewport.
    pub fn screen_ray(&self, x: f32, y: f32, width: f32, height: f32) -> Option<Ray> {
        if !(width > 0.0 && height > 0.0) {
            return None;
        }
        let ndc_x = (x / width) * 2.0 - 1.0;
        let ndc_y = 1.0 - (y / height) * 2.0;

        let forward = self.forward();
        let right = forward.cross(Vec3::UP).normalized()?;
        let up = right.cross(forward);
        let half_height = (self.fov_degrees.to_radians() / 2.0).tan();
        let half_width = half_height * (width / height);

        let direction = forward + right * (ndc_x * half_width) + up * (ndc_y * half_height);
        Ray::new(self.position(), direction)
    }
}
