//! Per-frame camera input resource.
//!
//! The application shell translates its raw input into this resource before
//! ticking; the editor camera and the default fly controller read it. Values
//! are frame deltas and are reset after each tick.
use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    /// Movement intent in camera space: x = right, y = up, z = backwards.
    pub movement: Vec3,
    /// Mouse look delta in pixels.
    pub look: Vec2,
    /// Mouse wheel delta.
    pub scroll: f32,
    /// Whether the look button is held; look deltas are ignored otherwise.
    pub looking: bool,
    pub boost: bool,
}

impl CameraInput {
    /// Clear per-frame deltas, keeping held state.
    pub fn end_frame(&mut self) {
        self.look = Vec2::ZERO;
        self.scroll = 0.0;
    }
}
