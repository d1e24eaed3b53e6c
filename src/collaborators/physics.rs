//! Physics collaborator interface.
//!
//! The scene talks to physics only through GUID-keyed actors: it creates and
//! removes them as rigid bodies and colliders come and go, pushes poses when
//! entity transforms change, steps the simulation and pulls the poses of the
//! actors that moved back into the hierarchy.

use glam::{Quat, Vec3};

use crate::components::boxcollider::BoxCollider;
use crate::components::guid::Guid;
use crate::components::rigidbody::BodyType;
use crate::resources::rendercache::DebugLine;
use crate::resources::sceneconfig::SceneConfig;

/// Which regime a physics world is simulated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsMode {
    /// Collision preview while editing. No gravity.
    Editor,
    /// Live simulation.
    Gameplay,
}

/// Everything a backend needs to build an actor.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorDesc {
    pub body_type: BodyType,
    pub location: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    /// Sum of the body's enabled forces.
    pub acceleration: Vec3,
    pub friction: f32,
    pub max_speed: Option<f32>,
    pub gravity_enabled: bool,
    pub collider: Option<BoxCollider>,
}

/// Pose of an actor after a simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorPose {
    pub guid: Guid,
    pub location: Vec3,
    pub rotation: Quat,
}

pub trait PhysicsBackend {
    /// Create (or replace) the actor of `guid`. An `Err` carries the reason
    /// the backend refused; the entity then behaves as if it had no body.
    fn create_actor(&mut self, guid: Guid, desc: &ActorDesc) -> Result<(), String>;
    fn remove_actor(&mut self, guid: Guid) -> bool;
    fn has_actor(&self, guid: Guid) -> bool;
    fn set_actor_pose(&mut self, guid: Guid, location: Vec3, rotation: Quat);
    /// Advance the simulation by `dt` seconds.
    fn simulate(&mut self, dt: f32, gravity_enabled: bool);
    /// Actors that moved during the last [`simulate`](Self::simulate) call.
    fn active_actors(&self) -> Vec<ActorPose>;
    /// Drop every actor and all accumulated simulation state.
    fn reset(&mut self);
    fn debug_lines(&self) -> Vec<DebugLine> {
        Vec::new()
    }
}

/// Builds a fresh physics world; the running duplicate gets its own.
pub type PhysicsFactory = Box<dyn Fn(PhysicsMode, &SceneConfig) -> Box<dyn PhysicsBackend>>;
