//! Spatial sub-components pinned to their owning entity.
//!
//! Renderable and audible components (meshes, sprites, lights, cameras, ...)
//! carry their own [`Spatial`] transform expressed relative to the entity
//! that owns them. They subscribe to the owner's
//! [`Notification::ParentTransformChanged`] so their cached world transform
//! follows the owner without the hierarchy code knowing their types.

use std::any::TypeId;

use bevy_ecs::prelude::*;

use crate::components::transform::{EntityTransform, Transform};
use crate::entity::SceneComponent;
use crate::events::notification::{Notification, ObserverEntry};
use crate::resources::dirty::{RenderDirty, TransformDirty};
use crate::scene::Scene;

/// Relative transform of a sub-component plus its cached world transform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spatial {
    pub(crate) world: Transform,
    pub(crate) relative: Transform,
}

impl Spatial {
    pub fn new(relative: Transform) -> Self {
        Self {
            world: relative,
            relative,
        }
    }

    pub fn world(&self) -> &Transform {
        &self.world
    }

    pub fn relative(&self) -> &Transform {
        &self.relative
    }

    fn update_world(&mut self, owner_world: &Transform) {
        self.world = owner_world.compose(&self.relative);
    }
}

/// A component that owns a [`Spatial`] and follows its owner's transform.
pub trait SpatialComponent: SceneComponent {
    fn spatial(&self) -> &Spatial;
    fn spatial_mut(&mut self) -> &mut Spatial;

    /// What moving this component means for the renderer. Categories that
    /// are gathered every frame keep the default.
    fn transform_dirty(&self) -> TransformDirty {
        TransformDirty::None
    }
}

fn owner_world(scene: &Scene, owner: Entity) -> Transform {
    scene
        .world
        .get::<EntityTransform>(owner)
        .map(|t| t.world)
        .unwrap_or_default()
}

fn refresh<T: SpatialComponent>(scene: &mut Scene, owner: Entity) {
    let owner_world = owner_world(scene, owner);
    let mark = match scene.world.get_mut::<T>(owner) {
        Some(mut component) => {
            component.spatial_mut().update_world(&owner_world);
            component.transform_dirty()
        }
        None => return,
    };
    mark.apply(&mut scene.world.resource_mut::<RenderDirty>(), owner);
}

/// Init hook body for spatial components: pin to the owner and subscribe.
pub fn attach<T: SpatialComponent>(scene: &mut Scene, owner: Entity) {
    refresh::<T>(scene, owner);
    scene.notifications.add_observer(
        owner,
        ObserverEntry::new(TypeId::of::<T>(), on_owner_transform_changed::<T>),
    );
}

/// Removal hook body for spatial components.
pub fn detach<T: SpatialComponent>(scene: &mut Scene, owner: Entity) {
    scene.notifications.remove_observer(owner, TypeId::of::<T>());
}

/// Notification handler registered by [`attach`].
pub fn on_owner_transform_changed<T: SpatialComponent>(
    scene: &mut Scene,
    owner: Entity,
    notification: Notification,
) {
    match notification {
        Notification::ParentTransformChanged => refresh::<T>(scene, owner),
    }
}

/// Replace the component's owner-relative transform.
pub(crate) fn set_relative<T: SpatialComponent>(scene: &mut Scene, owner: Entity, relative: Transform) {
    if let Some(mut component) = scene.world.get_mut::<T>(owner) {
        component.spatial_mut().relative = relative;
    }
    refresh::<T>(scene, owner);
}

/// Place the component in world space, keeping it pinned to the owner afterwards.
pub(crate) fn set_world<T: SpatialComponent>(scene: &mut Scene, owner: Entity, world: Transform) {
    let owner_world = owner_world(scene, owner);
    set_relative::<T>(scene, owner, world.relative_to(&owner_world));
}
