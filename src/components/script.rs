//! Script components.
//!
//! - [`NativeScriptComponent`] binds a Rust [`NativeScript`] to an entity.
//!   Instances are created when the scene enters Running mode (or lazily on
//!   the first update/event) and receive `&mut Scene` in every hook.
//! - [`Script`] names a module of the managed scripting collaborator
//!   ([`ScriptHost`](crate::collaborators::scripting::ScriptHost)). The scene
//!   only calls its lifecycle hooks and never inspects its state.

use std::fmt;

use bevy_ecs::prelude::*;

use crate::entity::SceneComponent;
use crate::events::sceneevent::SceneEvent;
use crate::scene::Scene;

/// Behaviour implemented in Rust and driven by the scene in Running mode.
pub trait NativeScript: Send + Sync {
    fn on_create(&mut self, _scene: &mut Scene, _entity: Entity) {}
    fn on_update(&mut self, _scene: &mut Scene, _entity: Entity, _dt: f32) {}
    fn on_destroy(&mut self, _scene: &mut Scene, _entity: Entity) {}
    fn on_event(&mut self, _scene: &mut Scene, _entity: Entity, _event: &SceneEvent) {}
}

pub type NativeScriptFactory = fn() -> Box<dyn NativeScript>;

#[derive(Component)]
pub struct NativeScriptComponent {
    factory: NativeScriptFactory,
    pub(crate) instance: Option<Box<dyn NativeScript>>,
}

impl NativeScriptComponent {
    pub fn new(factory: NativeScriptFactory) -> Self {
        Self {
            factory,
            instance: None,
        }
    }

    /// Bind a default-constructible script type.
    pub fn bind<T: NativeScript + Default + 'static>() -> Self {
        Self::new(|| Box::new(T::default()))
    }

    pub fn is_instantiated(&self) -> bool {
        self.instance.is_some()
    }

    pub(crate) fn instantiate(&self) -> Box<dyn NativeScript> {
        (self.factory)()
    }
}

/// Clones the binding, never the running instance.
impl Clone for NativeScriptComponent {
    fn clone(&self) -> Self {
        Self::new(self.factory)
    }
}

impl fmt::Debug for NativeScriptComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeScriptComponent")
            .field("instantiated", &self.instance.is_some())
            .finish()
    }
}

impl SceneComponent for NativeScriptComponent {}

/// Managed script module bound to an entity.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub module: String,
}

impl Script {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }
}

impl SceneComponent for Script {
    fn on_removed(scene: &mut Scene, entity: Entity) {
        crate::systems::scripts::release_script_instance(scene, entity);
    }
}
