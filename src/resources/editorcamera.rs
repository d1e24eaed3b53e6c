//! Free-flying editor camera.
//!
//! The camera only moves while [`CameraInput::looking`] is held, accelerates
//! with a smoothstep ramp and glides to a stop when input stops. The same
//! [`FlyState`] drives the default controller of the synthesized runtime
//! camera.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};

use crate::components::camera::CameraView;
use crate::components::transform::Transform;
use crate::resources::camerainput::CameraInput;

const ACCELERATION_RAMP: f32 = 4.0;
const MIN_MOVE_SPEED: f32 = 0.1;
const SCROLL_SPEED_STEP: f32 = 0.25;
const DEFAULT_ROTATION_SPEED: f32 = 0.1;

/// Movement state shared by the editor camera and the fly controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyState {
    pub move_speed: f32,
    /// Degrees per pixel of mouse movement.
    pub rotation_speed: f32,
    acceleration: f32,
    last_direction: Vec3,
}

impl FlyState {
    pub fn new(move_speed: f32) -> Self {
        Self {
            move_speed,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            acceleration: 0.0,
            last_direction: Vec3::ZERO,
        }
    }

    fn ramp(&mut self, dt: f32, increase: bool) -> f32 {
        self.acceleration = if increase {
            (self.acceleration + dt * ACCELERATION_RAMP).min(1.0)
        } else {
            (self.acceleration - dt * ACCELERATION_RAMP).max(0.0)
        };
        smoothstep(self.acceleration)
    }

    /// Advance `transform` by one frame of input. Returns whether it moved.
    pub fn update(&mut self, transform: &mut Transform, input: &CameraInput, dt: f32) -> bool {
        if !input.looking {
            if self.acceleration > 0.0 {
                let delta = self.ramp(dt, false);
                transform.location += self.last_direction * delta;
                return true;
            }
            return false;
        }

        let forward = transform.forward();
        let cos_theta = forward.dot(Vec3::Y);
        let same_dir = cos_theta.signum() == input.look.y.signum();
        let pitch = if cos_theta.abs() > 0.999 && same_dir {
            0.0
        } else {
            (input.look.y * self.rotation_speed).to_radians()
        };
        let yaw = (input.look.x * self.rotation_speed).to_radians();

        let original = transform.rotation;
        let yaw_rot = Quat::from_axis_angle(Vec3::Y, -yaw);
        transform.rotation = (yaw_rot * (original * Quat::from_axis_angle(Vec3::X, -pitch))).normalize();
        let cos_after = transform.forward().dot(Vec3::Y);
        if same_dir && cos_after.abs() > cos_theta.abs() && cos_after.abs() > 0.999 {
            transform.rotation = (yaw_rot * original).normalize();
        }

        let speed = self.move_speed * dt * if input.boost { 2.0 } else { 1.0 };
        let right = transform.rotation * Vec3::X;
        let forward = transform.forward();
        let direction = (right * input.movement.x - forward * input.movement.z) * speed
            + Vec3::Y * input.movement.y * speed;

        if direction.length_squared() > 0.0 {
            let delta = self.ramp(dt, true);
            transform.location += direction * delta;
            self.last_direction = direction;
        } else {
            let delta = self.ramp(dt, false);
            transform.location += self.last_direction * delta;
        }
        true
    }

    /// Mouse wheel while looking adjusts the fly speed.
    pub fn on_scroll(&mut self, delta: f32, looking: bool) {
        if looking {
            self.move_speed = (self.move_speed + delta * SCROLL_SPEED_STEP).max(MIN_MOVE_SPEED);
        }
    }
}

fn smoothstep(x: f32) -> f32 {
    let t = x.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct EditorCamera {
    pub transform: Transform,
    pub fly: FlyState,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    viewport: (u32, u32),
}

impl Default for EditorCamera {
    fn default() -> Self {
        Self::new(5.0, 45.0)
    }
}

impl EditorCamera {
    pub fn new(move_speed: f32, fov_y: f32) -> Self {
        Self {
            transform: Transform::from_location(Vec3::new(0.0, 5.0, 15.0)),
            fly: FlyState::new(move_speed),
            fov_y,
            near: 0.1,
            far: 1000.0,
            viewport: (1280, 720),
        }
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = (width, height);
        }
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    pub fn update(&mut self, input: &CameraInput, dt: f32) -> bool {
        self.fly.update(&mut self.transform, input, dt)
    }

    pub fn view(&self) -> CameraView {
        CameraView {
            location: self.transform.location,
            rotation: self.transform.rotation,
            fov_y: self.fov_y,
            aspect_ratio: self.aspect_ratio(),
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn moving_forward() -> CameraInput {
        CameraInput {
            movement: Vec3::new(0.0, 0.0, -1.0),
            looking: true,
            ..CameraInput::default()
        }
    }

    #[test]
    fn idle_camera_does_not_move() {
        let mut camera = EditorCamera::default();
        let before = camera.transform;
        assert!(!camera.update(&CameraInput::default(), 0.016));
        assert_eq!(camera.transform, before);
    }

    #[test]
    fn forward_input_moves_along_negative_z() {
        let mut camera = EditorCamera::default();
        let start = camera.transform.location;
        for _ in 0..30 {
            camera.update(&moving_forward(), 1.0 / 30.0);
        }
        let moved = camera.transform.location - start;
        assert!(moved.z < -1.0, "expected forward motion, got {:?}", moved);
        assert!(moved.x.abs() < EPSILON);
    }

    #[test]
    fn camera_glides_after_release() {
        let mut camera = EditorCamera::default();
        for _ in 0..10 {
            camera.update(&moving_forward(), 0.05);
        }
        let released = camera.transform.location;
        assert!(camera.update(&CameraInput::default(), 0.05));
        assert!(camera.transform.location.z < released.z);
    }

    #[test]
    fn scroll_adjusts_speed_with_floor() {
        let mut fly = FlyState::new(0.2);
        fly.on_scroll(4.0, false);
        assert!((fly.move_speed - 0.2).abs() < EPSILON);
        fly.on_scroll(-10.0, true);
        assert!((fly.move_speed - MIN_MOVE_SPEED).abs() < EPSILON);
    }
}
