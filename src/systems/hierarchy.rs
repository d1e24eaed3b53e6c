//! Transform hierarchy maintenance.
//!
//! Every scene entity has an [`EntityTransform`] (world + parent-relative)
//! and an [`Ownership`] (parent + children). The functions here are the only
//! writers of either, and they keep these invariants after each call:
//!
//! - `world == parent.world.compose(relative)` for every entity with a parent,
//!   `world == relative` for roots;
//! - `b.parent == a` exactly when `a.children` contains `b`;
//! - the ownership graph is a forest.
//!
//! After an entity's world transform changes, its [`TransformSync`]
//! capability decides whether the physics actor is moved and whether
//! observers are notified, then every descendant is recomposed and handled
//! the same way, depth first.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::guid::Guid;
use crate::components::ownership::Ownership;
use crate::components::physicsactor::PhysicsActor;
use crate::components::transform::{EntityTransform, Transform};
use crate::entity::EntityHandle;
use crate::errors::{SceneError, SceneResult};
use crate::events::notification::Notification;
use crate::scene::Scene;

/// What a world-transform change has to reach besides the entity itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSync {
    /// Nobody listens.
    None,
    /// Observers are notified.
    NotifyOnly,
    /// The physics actor is moved, then observers are notified.
    PhysicsSync,
}

impl TransformSync {
    pub fn of(scene: &Scene, entity: Entity) -> Self {
        if scene.world.get::<PhysicsActor>(entity).is_some() {
            TransformSync::PhysicsSync
        } else if scene.notifications.has_observers(entity) {
            TransformSync::NotifyOnly
        } else {
            TransformSync::None
        }
    }
}

fn transform_of(scene: &Scene, entity: Entity) -> EntityTransform {
    scene
        .world
        .get::<EntityTransform>(entity)
        .copied()
        .unwrap_or_default()
}

fn parent_of(scene: &Scene, entity: Entity) -> Option<Entity> {
    scene.world.get::<Ownership>(entity).and_then(|o| o.parent())
}

fn children_of(scene: &Scene, entity: Entity) -> Vec<Entity> {
    scene
        .world
        .get::<Ownership>(entity)
        .map(|o| o.children().to_vec())
        .unwrap_or_default()
}

fn write_transform(scene: &mut Scene, entity: Entity, transform: EntityTransform) {
    if let Some(mut current) = scene.world.get_mut::<EntityTransform>(entity) {
        *current = transform;
    }
}

/// Whether `ancestor` is `entity` or one of its ancestors.
pub fn is_ancestor_or_self(scene: &Scene, ancestor: Entity, entity: Entity) -> bool {
    let mut current = Some(entity);
    while let Some(e) = current {
        if e == ancestor {
            return true;
        }
        current = parent_of(scene, e);
    }
    false
}

/// Set the world transform; the relative transform is derived from the
/// parent's world transform. A root's relative transform becomes `world`.
pub fn set_world_transform(scene: &mut Scene, entity: Entity, world: Transform) {
    let relative = match parent_of(scene, entity) {
        Some(parent) => world.relative_to(&transform_of(scene, parent).world),
        None => world,
    };
    write_transform(scene, entity, EntityTransform { world, relative });
    on_transform_changed(scene, entity, TransformSync::of(scene, entity));
}

/// Set the parent-relative transform; the world transform is recomposed.
pub fn set_relative_transform(scene: &mut Scene, entity: Entity, relative: Transform) {
    let world = match parent_of(scene, entity) {
        Some(parent) => transform_of(scene, parent).world.compose(&relative),
        None => relative,
    };
    write_transform(scene, entity, EntityTransform { world, relative });
    on_transform_changed(scene, entity, TransformSync::of(scene, entity));
}

/// Re-parent `entity` while keeping its world pose. The null handle detaches
/// it and resets its relative transform to its world transform.
pub fn set_parent(scene: &mut Scene, entity: Entity, parent: EntityHandle) -> SceneResult<()> {
    let new_parent = match parent.entity() {
        Some(p) if !scene.contains_entity(p) => return Err(SceneError::InvalidEntity),
        Some(p) if p == entity => return Err(SceneError::SelfParent { entity }),
        Some(p) if is_ancestor_or_self(scene, entity, p) => {
            return Err(SceneError::HierarchyCycle {
                child: entity,
                parent: p,
            });
        }
        other => other,
    };
    let old_parent = parent_of(scene, entity);
    if old_parent == new_parent {
        return Ok(());
    }

    if let Some(old) = old_parent
        && let Some(mut ownership) = scene.world.get_mut::<Ownership>(old)
    {
        ownership.remove_child(entity);
    }
    if let Some(mut ownership) = scene.world.get_mut::<Ownership>(entity) {
        ownership.parent = new_parent;
    }

    let world = transform_of(scene, entity).world;
    let relative = match new_parent {
        Some(p) => {
            if let Some(mut ownership) = scene.world.get_mut::<Ownership>(p) {
                ownership.add_child(entity);
            }
            world.relative_to(&transform_of(scene, p).world)
        }
        None => world,
    };
    write_transform(scene, entity, EntityTransform { world, relative });
    debug!("Entity {:?} parent {:?} -> {:?}", entity, old_parent, new_parent);
    Ok(())
}

/// Unlink an entity about to be despawned: its children move to its own
/// parent (keeping their world pose) and it leaves its parent's child list.
pub(crate) fn detach_for_destruction(scene: &mut Scene, entity: Entity) {
    let parent = parent_of(scene, entity);
    for child in children_of(scene, entity) {
        if !scene.contains_entity(child) {
            continue;
        }
        // The destroyed entity's parent is never inside its own subtree.
        let _ = set_parent(scene, child, EntityHandle::from(parent));
    }
    if let Some(p) = parent
        && let Some(mut ownership) = scene.world.get_mut::<Ownership>(p)
    {
        ownership.remove_child(entity);
    }
    if let Some(mut ownership) = scene.world.get_mut::<Ownership>(entity) {
        ownership.parent = None;
        ownership.children.clear();
    }
}

/// React to a world transform change of `entity`, then recompose and react
/// for its whole subtree.
pub(crate) fn on_transform_changed(scene: &mut Scene, entity: Entity, sync: TransformSync) {
    match sync {
        TransformSync::None => {}
        TransformSync::NotifyOnly => scene.notify(entity, Notification::ParentTransformChanged),
        TransformSync::PhysicsSync => {
            push_pose_to_physics(scene, entity);
            scene.notify(entity, Notification::ParentTransformChanged);
        }
    }

    let parent_world = transform_of(scene, entity).world;
    for child in children_of(scene, entity) {
        let mut transform = transform_of(scene, child);
        transform.world = parent_world.compose(&transform.relative);
        write_transform(scene, child, transform);
        on_transform_changed(scene, child, TransformSync::of(scene, child));
    }
}

fn push_pose_to_physics(scene: &mut Scene, entity: Entity) {
    let Some(guid) = scene.world.get::<Guid>(entity).copied() else {
        return;
    };
    let world = transform_of(scene, entity).world;
    scene.physics.set_actor_pose(guid, world.location, world.rotation);
}

/// Write the poses of the actors that moved during the last physics step
/// back into the hierarchy. The moved entities do not push their pose back
/// to physics; their descendants (and observers) follow as usual.
pub fn synchronize_physics_transforms(scene: &mut Scene) {
    for pose in scene.physics.active_actors() {
        let Some(&entity) = scene.guid_index.get(&pose.guid) else {
            continue;
        };
        let mut world = transform_of(scene, entity).world;
        world.location = pose.location;
        world.rotation = pose.rotation;
        let relative = match parent_of(scene, entity) {
            Some(parent) => world.relative_to(&transform_of(scene, parent).world),
            None => world,
        };
        write_transform(scene, entity, EntityTransform { world, relative });
        let sync = match TransformSync::of(scene, entity) {
            TransformSync::PhysicsSync => TransformSync::NotifyOnly,
            other => other,
        };
        on_transform_changed(scene, entity, sync);
    }
}
