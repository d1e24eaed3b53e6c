//! Spatial transform value type and the per-entity transform component.
//!
//! A [`Transform`] is a location/rotation/scale triple. Composition follows a
//! simple rule: the child's location is rotated by the parent rotation and
//! offset by the parent location, rotations multiply, and scales multiply
//! component-wise. The inverse ([`Transform::relative_to`]) divides scale
//! component-wise, which is exact only for axis-aligned parent scale. That
//! approximation is part of the contract and content relies on it.

use bevy_ecs::prelude::Component;
use glam::{Quat, Vec3};

/// Location, rotation and scale of an entity or spatial sub-component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub location: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        location: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(location: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            location,
            rotation,
            scale,
        }
    }

    pub fn from_location(location: Vec3) -> Self {
        Self {
            location,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Compose `self` (a parent's world transform) with a `relative` transform
    /// expressed in the parent's space, yielding the child's world transform.
    pub fn compose(&self, relative: &Transform) -> Transform {
        Transform {
            location: self.location + self.rotation * relative.location,
            rotation: (self.rotation * relative.rotation).normalize(),
            scale: self.scale * relative.scale,
        }
    }

    /// Express `self` (a world transform) in the space of `parent`.
    ///
    /// Inverse of [`Transform::compose`]: `parent.compose(&t.relative_to(&parent)) == t`
    /// within floating point tolerance.
    pub fn relative_to(&self, parent: &Transform) -> Transform {
        let inv_rotation = parent.rotation.inverse();
        Transform {
            location: inv_rotation * (self.location - parent.location),
            rotation: (inv_rotation * self.rotation).normalize(),
            scale: divide_scale(self.scale, parent.scale),
        }
    }

    /// Unit vector the transform is facing (-Z rotated by `rotation`).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Tolerance comparison used by tests and the no-jump checks.
    pub fn abs_diff_eq(&self, other: &Transform, max_abs_diff: f32) -> bool {
        self.location.abs_diff_eq(other.location, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
    }
}

/// Component-wise scale division. A zero parent axis leaves the child's axis as is.
fn divide_scale(scale: Vec3, parent: Vec3) -> Vec3 {
    let axis = |s: f32, p: f32| if p == 0.0 { s } else { s / p };
    Vec3::new(
        axis(scale.x, parent.x),
        axis(scale.y, parent.y),
        axis(scale.z, parent.z),
    )
}

/// World and parent-relative transform of a scene entity.
///
/// A root's `relative` is taken against the identity frame, so it always
/// equals `world`. For parented entities
/// `world == parent.world.compose(&relative)` holds after every mutating
/// call on the scene returns.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct EntityTransform {
    pub world: Transform,
    pub relative: Transform,
}
