//! Built-in kinematic physics backend.
//!
//! Integrates actor velocities with a fixed sub-step: the incoming frame time
//! is accumulated and consumed in `substep`-sized slices, at most
//! `max_substeps` per call. An accumulator that already holds more than one
//! sub-step (because the previous frame hit the cap) is discarded instead of
//! carried over, so a slow frame never snowballs into the next.
//!
//! Per sub-step, dynamic bodies receive gravity (when enabled) plus the sum
//! of their forces, then friction and the speed clamp are applied and the
//! position is advanced. Kinematic bodies only move with their velocity.
//! Collisions are not resolved; colliders are exposed as debug boxes.

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::collaborators::physics::{ActorDesc, ActorPose, PhysicsBackend, PhysicsMode};
use crate::components::boxcollider::BoxCollider;
use crate::components::guid::Guid;
use crate::components::rigidbody::BodyType;
use crate::resources::rendercache::DebugLine;
use crate::resources::sceneconfig::SceneConfig;

const COLLIDER_COLOR: Vec3 = Vec3::new(0.0, 1.0, 0.0);

#[derive(Debug, Clone)]
struct KinematicActor {
    body_type: BodyType,
    location: Vec3,
    rotation: Quat,
    velocity: Vec3,
    acceleration: Vec3,
    friction: f32,
    max_speed: Option<f32>,
    gravity_enabled: bool,
    collider: Option<BoxCollider>,
    moved: bool,
}

impl KinematicActor {
    fn from_desc(desc: &ActorDesc) -> Self {
        Self {
            body_type: desc.body_type,
            location: desc.location,
            rotation: desc.rotation,
            velocity: desc.velocity,
            acceleration: desc.acceleration,
            friction: desc.friction,
            max_speed: desc.max_speed,
            gravity_enabled: desc.gravity_enabled,
            collider: desc.collider,
            moved: false,
        }
    }

    fn integrate(&mut self, dt: f32, gravity: Option<Vec3>) {
        match self.body_type {
            BodyType::Static => return,
            BodyType::Kinematic => {}
            BodyType::Dynamic => {
                let mut acceleration = self.acceleration;
                if let Some(gravity) = gravity.filter(|_| self.gravity_enabled) {
                    acceleration += gravity;
                }
                self.velocity += acceleration * dt;
                if self.friction > 0.0 {
                    self.velocity *= (1.0 - self.friction * dt).max(0.0);
                }
                if let Some(max_speed) = self.max_speed {
                    self.velocity = self.velocity.clamp_length_max(max_speed);
                }
            }
        }
        if self.velocity != Vec3::ZERO {
            self.location += self.velocity * dt;
            self.moved = true;
        }
    }
}

#[derive(Debug)]
pub struct KinematicPhysics {
    actors: FxHashMap<Guid, KinematicActor>,
    substep: f32,
    max_substeps: u32,
    gravity: Vec3,
    accumulator: f32,
    last_substeps: u32,
}

impl KinematicPhysics {
    pub fn new(substep: f32, max_substeps: u32, gravity: Vec3) -> Self {
        Self {
            actors: FxHashMap::default(),
            substep: substep.max(f32::EPSILON),
            max_substeps: max_substeps.max(1),
            gravity,
            accumulator: 0.0,
            last_substeps: 0,
        }
    }

    /// Editor worlds use the coarser editor step and no gravity.
    pub fn from_config(mode: PhysicsMode, config: &SceneConfig) -> Self {
        match mode {
            PhysicsMode::Editor => {
                Self::new(config.editor_fixed_timestep, config.max_substeps, Vec3::ZERO)
            }
            PhysicsMode::Gameplay => Self::new(
                config.fixed_timestep,
                config.max_substeps,
                Vec3::new(0.0, config.gravity, 0.0),
            ),
        }
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Sub-steps run by the last `simulate` call.
    pub fn last_substeps(&self) -> u32 {
        self.last_substeps
    }

    pub fn actor_velocity(&self, guid: Guid) -> Option<Vec3> {
        self.actors.get(&guid).map(|a| a.velocity)
    }

    fn substep_strategy(&mut self, dt: f32) -> u32 {
        if self.accumulator > self.substep {
            self.accumulator = 0.0;
        }
        self.accumulator += dt;
        if self.accumulator < self.substep {
            return 0;
        }
        let substeps = ((self.accumulator / self.substep) as u32).min(self.max_substeps);
        self.accumulator -= substeps as f32 * self.substep;
        substeps
    }
}

impl PhysicsBackend for KinematicPhysics {
    fn create_actor(&mut self, guid: Guid, desc: &ActorDesc) -> Result<(), String> {
        if guid.is_null() {
            return Err("null GUID".to_string());
        }
        self.actors.insert(guid, KinematicActor::from_desc(desc));
        Ok(())
    }

    fn remove_actor(&mut self, guid: Guid) -> bool {
        self.actors.remove(&guid).is_some()
    }

    fn has_actor(&self, guid: Guid) -> bool {
        self.actors.contains_key(&guid)
    }

    fn set_actor_pose(&mut self, guid: Guid, location: Vec3, rotation: Quat) {
        if let Some(actor) = self.actors.get_mut(&guid) {
            actor.location = location;
            actor.rotation = rotation;
        }
    }

    fn simulate(&mut self, dt: f32, gravity_enabled: bool) {
        for actor in self.actors.values_mut() {
            actor.moved = false;
        }
        let substeps = self.substep_strategy(dt);
        self.last_substeps = substeps;
        let gravity = gravity_enabled.then_some(self.gravity);
        for _ in 0..substeps {
            for actor in self.actors.values_mut() {
                actor.integrate(self.substep, gravity);
            }
        }
    }

    fn active_actors(&self) -> Vec<ActorPose> {
        self.actors
            .iter()
            .filter(|(_, a)| a.moved)
            .map(|(guid, a)| ActorPose {
                guid: *guid,
                location: a.location,
                rotation: a.rotation,
            })
            .collect()
    }

    fn reset(&mut self) {
        self.actors.clear();
        self.accumulator = 0.0;
        self.last_substeps = 0;
    }

    fn debug_lines(&self) -> Vec<DebugLine> {
        let mut lines = Vec::new();
        for actor in self.actors.values() {
            if let Some(collider) = &actor.collider {
                push_box(&mut lines, collider.aabb(actor.location));
            }
        }
        lines
    }
}

fn push_box(lines: &mut Vec<DebugLine>, (min, max): (Vec3, Vec3)) {
    let corner = |x: bool, y: bool, z: bool| {
        Vec3::new(
            if x { max.x } else { min.x },
            if y { max.y } else { min.y },
            if z { max.z } else { min.z },
        )
    };
    for a in [false, true] {
        for b in [false, true] {
            lines.push(DebugLine::new(corner(false, a, b), corner(true, a, b), COLLIDER_COLOR));
            lines.push(DebugLine::new(corner(a, false, b), corner(a, true, b), COLLIDER_COLOR));
            lines.push(DebugLine::new(corner(a, b, false), corner(a, b, true), COLLIDER_COLOR));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn dynamic_desc() -> ActorDesc {
        ActorDesc {
            body_type: BodyType::Dynamic,
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            friction: 0.0,
            max_speed: None,
            gravity_enabled: true,
            collider: None,
        }
    }

    #[test]
    fn frame_shorter_than_substep_does_not_advance() {
        let mut physics = KinematicPhysics::new(0.1, 16, Vec3::new(0.0, -10.0, 0.0));
        let guid = Guid::new();
        physics.create_actor(guid, &dynamic_desc()).unwrap();
        physics.simulate(0.05, true);
        assert_eq!(physics.last_substeps(), 0);
        assert!(physics.active_actors().is_empty());
        physics.simulate(0.06, true);
        assert_eq!(physics.last_substeps(), 1);
        assert_eq!(physics.active_actors().len(), 1);
    }

    #[test]
    fn substeps_are_capped() {
        let mut physics = KinematicPhysics::new(0.01, 4, Vec3::ZERO);
        physics.simulate(1.0, true);
        assert_eq!(physics.last_substeps(), 4);
        // Leftover time above one sub-step is dropped on the next call.
        physics.simulate(0.005, true);
        assert_eq!(physics.last_substeps(), 0);
    }

    #[test]
    fn gravity_only_applies_when_enabled() {
        let mut physics = KinematicPhysics::new(0.1, 16, Vec3::new(0.0, -10.0, 0.0));
        let guid = Guid::new();
        physics.create_actor(guid, &dynamic_desc()).unwrap();
        physics.simulate(0.1, false);
        assert!(physics.active_actors().is_empty());
        physics.simulate(0.1, true);
        let velocity = physics.actor_velocity(guid).unwrap();
        assert!((velocity.y + 1.0).abs() < EPSILON, "got {:?}", velocity);
    }

    #[test]
    fn static_bodies_never_move() {
        let mut physics = KinematicPhysics::new(0.1, 16, Vec3::new(0.0, -10.0, 0.0));
        let guid = Guid::new();
        let desc = ActorDesc {
            body_type: BodyType::Static,
            velocity: Vec3::X,
            ..dynamic_desc()
        };
        physics.create_actor(guid, &desc).unwrap();
        physics.simulate(0.5, true);
        assert!(physics.active_actors().is_empty());
    }

    #[test]
    fn max_speed_clamps_velocity() {
        let mut physics = KinematicPhysics::new(0.1, 16, Vec3::new(0.0, -100.0, 0.0));
        let guid = Guid::new();
        let desc = ActorDesc {
            max_speed: Some(2.0),
            ..dynamic_desc()
        };
        physics.create_actor(guid, &desc).unwrap();
        physics.simulate(0.3, true);
        let speed = physics.actor_velocity(guid).unwrap().length();
        assert!(speed <= 2.0 + EPSILON, "speed {}", speed);
    }

    #[test]
    fn reset_drops_actors() {
        let mut physics = KinematicPhysics::new(0.1, 16, Vec3::ZERO);
        physics.create_actor(Guid::new(), &dynamic_desc()).unwrap();
        physics.reset();
        assert_eq!(physics.actor_count(), 0);
    }

    #[test]
    fn null_guid_is_refused() {
        let mut physics = KinematicPhysics::new(0.1, 16, Vec3::ZERO);
        assert!(physics.create_actor(Guid::NULL, &dynamic_desc()).is_err());
    }

    #[test]
    fn collider_produces_twelve_edges() {
        let mut physics = KinematicPhysics::new(0.1, 16, Vec3::ZERO);
        let desc = ActorDesc {
            collider: Some(BoxCollider::default()),
            ..dynamic_desc()
        };
        physics.create_actor(Guid::new(), &desc).unwrap();
        assert_eq!(physics.debug_lines().len(), 12);
    }
}
