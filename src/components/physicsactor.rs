use bevy_ecs::prelude::Component;

/// Marks an entity that currently owns an actor in the scene's physics
/// backend. Transform changes on such entities are pushed to the actor.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsActor;
