//! Rigid body description handed to the physics collaborator.
//!
//! The [`RigidBody`] component stores the body type, initial velocity and a
//! set of named acceleration forces. Each force can be toggled on and off
//! independently, which lets scripts switch things like wind or thrust
//! without touching the others. Gravity comes from the physics backend and is
//! only applied in gameplay mode.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::entity::SceneComponent;
use crate::scene::Scene;
use crate::systems::physics;

/// How the physics backend moves a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Never moves.
    Static,
    /// Integrated by the backend, affected by gravity and forces.
    #[default]
    Dynamic,
    /// Moves with its velocity only.
    Kinematic,
}

/// A named acceleration force that can be toggled on/off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelerationForce {
    /// Acceleration in world units per second squared.
    pub value: Vec3,
    pub enabled: bool,
}

impl AccelerationForce {
    pub fn new(value: Vec3) -> Self {
        Self {
            value,
            enabled: true,
        }
    }
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub body_type: BodyType,
    /// Initial velocity in world units per second.
    pub velocity: Vec3,
    pub forces: FxHashMap<String, AccelerationForce>,
    /// Velocity damping factor. Applied as: velocity *= (1 - friction * delta).
    pub friction: f32,
    /// Optional maximum speed. If set, velocity magnitude is clamped to this value.
    pub max_speed: Option<f32>,
    pub gravity_enabled: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(BodyType::Dynamic)
    }
}

impl RigidBody {
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            velocity: Vec3::ZERO,
            forces: FxHashMap::default(),
            friction: 0.0,
            max_speed: None,
            gravity_enabled: true,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Add or update a named acceleration force (enabled by default).
    pub fn add_force(&mut self, name: &str, value: Vec3) {
        self.forces
            .insert(name.to_string(), AccelerationForce::new(value));
    }

    /// Enable or disable a specific force by name.
    /// Returns false if the force doesn't exist.
    pub fn set_force_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.forces.get_mut(name) {
            Some(force) => {
                force.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Sum of all enabled forces.
    pub fn total_acceleration(&self) -> Vec3 {
        self.forces
            .values()
            .filter(|f| f.enabled)
            .fold(Vec3::ZERO, |acc, f| acc + f.value)
    }
}

impl SceneComponent for RigidBody {
    fn on_init(scene: &mut Scene, entity: Entity) {
        physics::create_actor(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        physics::release_body(scene, entity);
    }

    fn on_changed(scene: &mut Scene, entity: Entity) {
        physics::create_actor(scene, entity);
    }
}
