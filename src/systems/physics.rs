//! Scene side of the physics collaborator.
//!
//! Entities with a [`RigidBody`] and/or a [`BoxCollider`] own one actor in
//! the scene's physics backend, keyed by their GUID. A [`PhysicsActor`]
//! marker records that the backend accepted the actor; the hierarchy uses
//! it to decide whether transform changes are pushed to physics. When the
//! backend refuses an actor the marker is removed and the entity behaves as
//! if it had no body.

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, warn};

use crate::collaborators::physics::{ActorDesc, PhysicsMode};
use crate::components::boxcollider::BoxCollider;
use crate::components::guid::Guid;
use crate::components::physicsactor::PhysicsActor;
use crate::components::rigidbody::{BodyType, RigidBody};
use crate::components::transform::EntityTransform;
use crate::errors::SceneError;
use crate::scene::Scene;
use crate::systems::hierarchy;

fn describe(
    scene: &Scene,
    entity: Entity,
    body: Option<&RigidBody>,
    collider: Option<BoxCollider>,
) -> ActorDesc {
    let world = scene
        .world
        .get::<EntityTransform>(entity)
        .map(|t| t.world)
        .unwrap_or_default();
    match body {
        Some(body) => ActorDesc {
            body_type: body.body_type,
            location: world.location,
            rotation: world.rotation,
            velocity: body.velocity,
            acceleration: body.total_acceleration(),
            friction: body.friction,
            max_speed: body.max_speed,
            gravity_enabled: body.gravity_enabled,
            collider,
        },
        None => ActorDesc {
            body_type: BodyType::Static,
            location: world.location,
            rotation: world.rotation,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            friction: 0.0,
            max_speed: None,
            gravity_enabled: false,
            collider,
        },
    }
}

fn submit(scene: &mut Scene, entity: Entity, desc: Option<ActorDesc>) {
    let Some(guid) = scene.world.get::<Guid>(entity).copied() else {
        return;
    };
    let Some(desc) = desc else {
        remove_actor(scene, entity, guid);
        return;
    };
    match scene.physics.create_actor(guid, &desc) {
        Ok(()) => {
            scene.world.entity_mut(entity).insert(PhysicsActor);
            debug!("Physics actor for {:?} ({:?})", entity, desc.body_type);
        }
        Err(reason) => {
            warn!("{}", SceneError::ActorRefused { guid, reason });
            scene.world.entity_mut(entity).remove::<PhysicsActor>();
        }
    }
}

fn remove_actor(scene: &mut Scene, entity: Entity, guid: Guid) {
    scene.physics.remove_actor(guid);
    scene.world.entity_mut(entity).remove::<PhysicsActor>();
}

/// (Re)create the entity's actor from its current body and collider.
pub fn create_actor(scene: &mut Scene, entity: Entity) {
    let body = scene.world.get::<RigidBody>(entity).cloned();
    let collider = scene.world.get::<BoxCollider>(entity).copied();
    let desc = (body.is_some() || collider.is_some())
        .then(|| describe(scene, entity, body.as_ref(), collider));
    submit(scene, entity, desc);
}

/// Called before the rigid body is removed: a remaining collider keeps a
/// static actor, otherwise the actor goes away.
pub fn release_body(scene: &mut Scene, entity: Entity) {
    let collider = scene.world.get::<BoxCollider>(entity).copied();
    let desc = collider.map(|c| describe(scene, entity, None, Some(c)));
    submit(scene, entity, desc);
}

/// Called before the collider is removed: a remaining rigid body keeps its
/// actor without a shape, otherwise the actor goes away.
pub fn release_collider(scene: &mut Scene, entity: Entity) {
    let body = scene.world.get::<RigidBody>(entity).cloned();
    let desc = body.map(|b| describe(scene, entity, Some(&b), None));
    submit(scene, entity, desc);
}

/// Drop the actor of an entity that is being destroyed.
pub(crate) fn release_entity(scene: &mut Scene, entity: Entity) {
    if scene.world.get::<PhysicsActor>(entity).is_none() {
        return;
    }
    if let Some(guid) = scene.world.get::<Guid>(entity).copied() {
        remove_actor(scene, entity, guid);
    }
}

/// Step the backend and pull moved actors back into the hierarchy.
pub fn step_physics(scene: &mut Scene, dt: f32, mode: PhysicsMode) {
    scene.physics.simulate(dt, mode == PhysicsMode::Gameplay);
    hierarchy::synchronize_physics_transforms(scene);
}
