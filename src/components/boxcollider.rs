use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::entity::SceneComponent;
use crate::scene::Scene;
use crate::systems::physics;

/// Axis-aligned box collision shape.
///
/// On an entity without a [`RigidBody`](super::rigidbody::RigidBody) the
/// collider gets a static actor of its own.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    pub half_extents: Vec3,
    pub offset: Vec3,
    pub is_trigger: bool,
}

impl Default for BoxCollider {
    fn default() -> Self {
        Self::new(Vec3::splat(0.5))
    }
}

impl BoxCollider {
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            half_extents,
            offset: Vec3::ZERO,
            is_trigger: false,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Returns (min, max) of the collider for a given entity location.
    /// Handles negative extents by normalizing to proper min/max.
    pub fn aabb(&self, location: Vec3) -> (Vec3, Vec3) {
        let center = location + self.offset;
        let p0 = center - self.half_extents;
        let p1 = center + self.half_extents;
        (p0.min(p1), p0.max(p1))
    }
}

impl SceneComponent for BoxCollider {
    fn on_init(scene: &mut Scene, entity: Entity) {
        physics::create_actor(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        physics::release_collider(scene, entity);
    }

    fn on_changed(scene: &mut Scene, entity: Entity) {
        physics::create_actor(scene, entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_normalizes_negative_extents() {
        let collider = BoxCollider::new(Vec3::new(-1.0, 2.0, 0.5)).with_offset(Vec3::X);
        let (min, max) = collider.aabb(Vec3::ZERO);
        assert_eq!(min, Vec3::new(0.0, -2.0, -0.5));
        assert_eq!(max, Vec3::new(2.0, 2.0, 0.5));
    }
}
