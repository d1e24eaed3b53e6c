//! Entity handles.
//!
//! An [`EntityHandle`] is a small copyable token (a `bevy_ecs` [`Entity`] or
//! null). It does not keep the entity alive and does not borrow the scene;
//! operations resolve it against a [`Scene`] at call time:
//!
//! ```ignore
//! let cube = scene.create_entity("Cube");
//! scene.entity_mut(cube).add_component(StaticMesh::new("cube"));
//! scene.entity_mut(cube).set_world_location(Vec3::new(0.0, 1.0, 0.0));
//! ```
//!
//! [`SceneEntityMut`] is the scoped mutable view. Every mutation that touches
//! the hierarchy or a component with side effects goes through it so that
//! component hooks, notifications and dirty flags stay consistent.

use std::fmt;

use bevy_ecs::component::Mutable;
use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};

use crate::components::guid::Guid;
use crate::components::ownership::Ownership;
use crate::components::scenename::SceneName;
use crate::components::spatial::{self, SpatialComponent};
use crate::components::transform::{EntityTransform, Transform};
use crate::errors::SceneResult;
use crate::scene::Scene;
use crate::systems::hierarchy;

/// Component attached through an entity handle.
///
/// The hooks receive the owning scene and entity so they can allocate or
/// release collaborator resources and subscribe to notifications.
pub trait SceneComponent: Component<Mutability = Mutable> + Sized {
    /// Runs right after the component is inserted.
    fn on_init(_scene: &mut Scene, _entity: Entity) {}
    /// Runs right before the component is removed.
    fn on_removed(_scene: &mut Scene, _entity: Entity) {}
    /// Runs after [`SceneEntityMut::modify_component`].
    fn on_changed(_scene: &mut Scene, _entity: Entity) {}
}

/// Copyable, possibly-null reference to a scene entity.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(Option<Entity>);

impl EntityHandle {
    pub const NULL: EntityHandle = EntityHandle(None);

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn entity(&self) -> Option<Entity> {
        self.0
    }

    /// Raw id. Panics on the null handle.
    pub fn id(&self) -> Entity {
        match self.0 {
            Some(entity) => entity,
            None => panic!("EntityHandle::id on the null handle"),
        }
    }

    /// Whether the handle resolves to a live entity of `scene`.
    pub fn is_valid(&self, scene: &Scene) -> bool {
        scene.contains(*self)
    }
}

impl From<Entity> for EntityHandle {
    fn from(entity: Entity) -> Self {
        Self(Some(entity))
    }
}

impl From<Option<Entity>> for EntityHandle {
    fn from(entity: Option<Entity>) -> Self {
        Self(entity)
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(entity) => write!(f, "EntityHandle({:?})", entity),
            None => write!(f, "EntityHandle(null)"),
        }
    }
}

/// Read-only view of a live entity.
pub struct SceneEntityRef<'a> {
    scene: &'a Scene,
    entity: Entity,
}

impl<'a> SceneEntityRef<'a> {
    pub(crate) fn new(scene: &'a Scene, entity: Entity) -> Self {
        Self { scene, entity }
    }

    pub fn id(&self) -> Entity {
        self.entity
    }

    pub fn handle(&self) -> EntityHandle {
        EntityHandle::from(self.entity)
    }

    pub fn has_component<T: Component>(&self) -> bool {
        self.scene.world.get::<T>(self.entity).is_some()
    }

    /// # Panics
    /// If the component is absent.
    pub fn get_component<T: Component>(&self) -> &'a T {
        match self.scene.world.get::<T>(self.entity) {
            Some(component) => component,
            None => panic!(
                "get_component: {:?} has no {}",
                self.entity,
                std::any::type_name::<T>()
            ),
        }
    }

    pub fn try_get_component<T: Component>(&self) -> Option<&'a T> {
        self.scene.world.get::<T>(self.entity)
    }

    pub fn guid(&self) -> Guid {
        *self.get_component::<Guid>()
    }

    /// Display name, or the default label for entities without one.
    pub fn name(&self) -> &'a str {
        self.try_get_component::<SceneName>()
            .map_or(SceneName::UNNAMED, |name| name.as_str())
    }

    pub fn world_transform(&self) -> Transform {
        self.get_component::<EntityTransform>().world
    }

    pub fn relative_transform(&self) -> Transform {
        self.get_component::<EntityTransform>().relative
    }

    pub fn parent(&self) -> EntityHandle {
        EntityHandle::from(self.get_component::<Ownership>().parent())
    }

    pub fn children(&self) -> Vec<EntityHandle> {
        self.get_component::<Ownership>()
            .children()
            .iter()
            .copied()
            .map(EntityHandle::from)
            .collect()
    }
}

/// Mutable view of a live entity. Borrowing the scene mutably for the
/// duration of the view keeps the entity alive while it is used.
pub struct SceneEntityMut<'a> {
    scene: &'a mut Scene,
    entity: Entity,
}

impl<'a> SceneEntityMut<'a> {
    pub(crate) fn new(scene: &'a mut Scene, entity: Entity) -> Self {
        Self { scene, entity }
    }

    pub fn id(&self) -> Entity {
        self.entity
    }

    pub fn handle(&self) -> EntityHandle {
        EntityHandle::from(self.entity)
    }

    fn view(&self) -> SceneEntityRef<'_> {
        SceneEntityRef::new(self.scene, self.entity)
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Insert a component and run its init hook.
    ///
    /// # Panics
    /// If the entity already has a `T`.
    pub fn add_component<T: SceneComponent>(&mut self, component: T) -> Mut<'_, T> {
        assert!(
            !self.has_component::<T>(),
            "add_component: {:?} already has a {}",
            self.entity,
            std::any::type_name::<T>()
        );
        self.scene.world.entity_mut(self.entity).insert(component);
        T::on_init(self.scene, self.entity);
        self.get_component_mut::<T>()
    }

    /// Run the component's removal hook and erase it. Returns the removed
    /// value, or `None` if the entity had no `T`.
    pub fn remove_component<T: SceneComponent>(&mut self) -> Option<T> {
        if !self.has_component::<T>() {
            return None;
        }
        T::on_removed(self.scene, self.entity);
        self.scene.world.entity_mut(self.entity).take::<T>()
    }

    pub fn has_component<T: Component>(&self) -> bool {
        self.scene.world.get::<T>(self.entity).is_some()
    }

    /// # Panics
    /// If the component is absent.
    pub fn get_component<T: Component>(&self) -> &T {
        match self.scene.world.get::<T>(self.entity) {
            Some(component) => component,
            None => panic!(
                "get_component: {:?} has no {}",
                self.entity,
                std::any::type_name::<T>()
            ),
        }
    }

    pub fn try_get_component<T: Component>(&self) -> Option<&T> {
        self.scene.world.get::<T>(self.entity)
    }

    /// Direct mutable access. Bypasses change hooks; use
    /// [`modify_component`](Self::modify_component) for changes the renderer
    /// or physics must see.
    ///
    /// # Panics
    /// If the component is absent.
    pub fn get_component_mut<T: Component<Mutability = Mutable>>(&mut self) -> Mut<'_, T> {
        let entity = self.entity;
        match self.scene.world.get_mut::<T>(entity) {
            Some(component) => component,
            None => panic!(
                "get_component_mut: {:?} has no {}",
                entity,
                std::any::type_name::<T>()
            ),
        }
    }

    /// Mutate a component and run its change hook.
    ///
    /// # Panics
    /// If the component is absent.
    pub fn modify_component<T: SceneComponent, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.get_component_mut::<T>());
        T::on_changed(self.scene, self.entity);
        result
    }

    // ---------------------------------------------------------------------
    // Identity
    // ---------------------------------------------------------------------

    pub fn guid(&self) -> Guid {
        self.view().guid()
    }

    pub fn name(&self) -> &str {
        self.scene
            .world
            .get::<SceneName>(self.entity)
            .map_or(SceneName::UNNAMED, |name| name.as_str())
    }

    pub fn set_name(&mut self, name: &str) {
        self.scene
            .world
            .entity_mut(self.entity)
            .insert(SceneName::new(name));
    }

    // ---------------------------------------------------------------------
    // Hierarchy
    // ---------------------------------------------------------------------

    /// Re-parent without moving the entity in world space. The null handle
    /// detaches it.
    pub fn set_parent(&mut self, parent: impl Into<EntityHandle>) -> SceneResult<()> {
        hierarchy::set_parent(self.scene, self.entity, parent.into())
    }

    pub fn parent(&self) -> EntityHandle {
        self.view().parent()
    }

    pub fn children(&self) -> Vec<EntityHandle> {
        self.view().children()
    }

    // ---------------------------------------------------------------------
    // Transforms
    // ---------------------------------------------------------------------

    pub fn world_transform(&self) -> Transform {
        self.view().world_transform()
    }

    pub fn relative_transform(&self) -> Transform {
        self.view().relative_transform()
    }

    pub fn world_location(&self) -> Vec3 {
        self.world_transform().location
    }

    pub fn world_rotation(&self) -> Quat {
        self.world_transform().rotation
    }

    pub fn world_scale(&self) -> Vec3 {
        self.world_transform().scale
    }

    pub fn set_world_transform(&mut self, world: Transform) {
        hierarchy::set_world_transform(self.scene, self.entity, world);
    }

    pub fn set_relative_transform(&mut self, relative: Transform) {
        hierarchy::set_relative_transform(self.scene, self.entity, relative);
    }

    pub fn set_world_location(&mut self, location: Vec3) {
        let mut world = self.world_transform();
        world.location = location;
        self.set_world_transform(world);
    }

    pub fn set_world_rotation(&mut self, rotation: Quat) {
        let mut world = self.world_transform();
        world.rotation = rotation.normalize();
        self.set_world_transform(world);
    }

    pub fn set_world_scale(&mut self, scale: Vec3) {
        let mut world = self.world_transform();
        world.scale = scale;
        self.set_world_transform(world);
    }

    pub fn set_relative_location(&mut self, location: Vec3) {
        let mut relative = self.relative_transform();
        relative.location = location;
        self.set_relative_transform(relative);
    }

    pub fn set_relative_rotation(&mut self, rotation: Quat) {
        let mut relative = self.relative_transform();
        relative.rotation = rotation.normalize();
        self.set_relative_transform(relative);
    }

    pub fn set_relative_scale(&mut self, scale: Vec3) {
        let mut relative = self.relative_transform();
        relative.scale = scale;
        self.set_relative_transform(relative);
    }

    /// Move a spatial sub-component relative to this entity.
    pub fn set_component_relative_transform<T: SpatialComponent>(&mut self, relative: Transform) {
        spatial::set_relative::<T>(self.scene, self.entity, relative);
    }

    /// Place a spatial sub-component in world space; it stays pinned to this
    /// entity afterwards.
    pub fn set_component_world_transform<T: SpatialComponent>(&mut self, world: Transform) {
        spatial::set_world::<T>(self.scene, self.entity, world);
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Queue the entity for destruction (see [`Scene::destroy_entity`]).
    pub fn destroy(self) {
        self.scene.destroy_entity(self.entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handle_is_null() {
        let handle = EntityHandle::default();
        assert!(handle.is_null());
        assert_eq!(handle, EntityHandle::NULL);
        assert_eq!(handle.entity(), None);
    }

    #[test]
    fn handles_compare_by_entity() {
        let a = EntityHandle::from(Entity::from_bits(1 << 32 | 3));
        let b = EntityHandle::from(Entity::from_bits(1 << 32 | 3));
        let c = EntityHandle::from(Entity::from_bits(1 << 32 | 4));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_null());
    }

    #[test]
    #[should_panic(expected = "null handle")]
    fn id_of_null_handle_panics() {
        EntityHandle::NULL.id();
    }
}
