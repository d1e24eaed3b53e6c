//! Script hook dispatch.
//!
//! Native scripts ([`NativeScriptComponent`]) are Rust objects that receive
//! `&mut Scene` directly. While a hook runs, its instance is taken out of the
//! component and put back afterwards, so the hook is free to mutate the
//! entity (or destroy it).
//!
//! Managed scripts ([`Script`]) live in the [`ScriptHost`] collaborator,
//! keyed by the entity GUID. Their hooks queue [`ScriptCmd`]s that are
//! applied right after the hook returns.
//!
//! [`ScriptHost`]: crate::collaborators::scripting::ScriptHost

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::collaborators::scripting::{ScriptCmd, ScriptContext, ScriptHost};
use crate::components::creationindex::CreationIndex;
use crate::components::guid::Guid;
use crate::components::script::{NativeScript, NativeScriptComponent, Script};
use crate::entity::EntityHandle;
use crate::events::audio::AudioCmd;
use crate::events::sceneevent::SceneEvent;
use crate::resources::scenetime::SceneTime;
use crate::scene::Scene;

// -------------------------------------------------------------------------
// Helpers
// -------------------------------------------------------------------------

/// Scene entities carrying `T`, in creation order.
fn sorted_entities_with<T: Component>(scene: &mut Scene) -> Vec<Entity> {
    let mut query = scene
        .world
        .query_filtered::<(Entity, &CreationIndex), (With<T>, With<Guid>)>();
    let mut entities: Vec<(CreationIndex, Entity)> = query
        .iter(&scene.world)
        .map(|(entity, index)| (*index, entity))
        .collect();
    entities.sort_unstable_by_key(|(index, _)| *index);
    entities.into_iter().map(|(_, entity)| entity).collect()
}

fn context(scene: &Scene) -> ScriptContext {
    let time = scene.world.resource::<SceneTime>();
    ScriptContext::new(time.delta, time.elapsed)
}

/// Take the native instance out of its component, creating it if needed.
/// The flag tells whether it was just created.
fn take_native(scene: &mut Scene, entity: Entity) -> Option<(Box<dyn NativeScript>, bool)> {
    let mut component = scene.world.get_mut::<NativeScriptComponent>(entity)?;
    match component.instance.take() {
        Some(instance) => Some((instance, false)),
        None => Some((component.instantiate(), true)),
    }
}

/// Put an instance back after a hook. An entity destroyed by the hook runs
/// its destroy hook now, since its instance was out of reach when the
/// destruction was requested.
fn restore_native(scene: &mut Scene, entity: Entity, mut instance: Box<dyn NativeScript>) {
    if scene.is_pending_destruction(entity) {
        instance.on_destroy(scene, entity);
        return;
    }
    if let Some(mut component) = scene.world.get_mut::<NativeScriptComponent>(entity) {
        component.instance = Some(instance);
    }
}

fn run_native(scene: &mut Scene, entity: Entity, hook: impl FnOnce(&mut dyn NativeScript, &mut Scene)) {
    let Some((mut instance, created)) = take_native(scene, entity) else {
        return;
    };
    if created {
        instance.on_create(scene, entity);
    }
    hook(instance.as_mut(), scene);
    restore_native(scene, entity, instance);
}

fn managed_guid(scene: &Scene, entity: Entity) -> Option<Guid> {
    let guid = scene.world.get::<Guid>(entity).copied()?;
    scene.script_instances.contains(&guid).then_some(guid)
}

fn run_managed(
    scene: &mut Scene,
    guid: Guid,
    hook: impl FnOnce(&mut dyn ScriptHost, &mut ScriptContext),
) {
    let Some(host) = scene.scripts.clone() else {
        return;
    };
    let mut ctx = context(scene);
    hook(&mut *host.borrow_mut(), &mut ctx);
    apply_commands(scene, guid, ctx.take_commands());
}

// -------------------------------------------------------------------------
// Commands
// -------------------------------------------------------------------------

fn resolve(scene: &Scene, source: Guid, guid: Guid) -> Option<Entity> {
    let handle = scene.entity_by_guid(guid);
    if handle.is_null() {
        warn!("Script of {} referenced unknown entity {}", source, guid);
    }
    handle.entity()
}

/// Apply the commands queued by the script of `source`.
pub fn apply_commands(scene: &mut Scene, source: Guid, commands: Vec<ScriptCmd>) {
    for cmd in commands {
        match cmd {
            ScriptCmd::SetWorldLocation { guid, location } => {
                if let Some(entity) = resolve(scene, source, guid) {
                    scene.entity_mut(entity).set_world_location(location);
                }
            }
            ScriptCmd::SetWorldRotation { guid, rotation } => {
                if let Some(entity) = resolve(scene, source, guid) {
                    scene.entity_mut(entity).set_world_rotation(rotation);
                }
            }
            ScriptCmd::SetRelativeLocation { guid, location } => {
                if let Some(entity) = resolve(scene, source, guid) {
                    scene.entity_mut(entity).set_relative_location(location);
                }
            }
            ScriptCmd::SetParent { guid, parent } => {
                let Some(entity) = resolve(scene, source, guid) else {
                    continue;
                };
                let parent = match parent {
                    Some(p) => match resolve(scene, source, p) {
                        Some(p) => EntityHandle::from(p),
                        None => continue,
                    },
                    None => EntityHandle::NULL,
                };
                if let Err(err) = scene.entity_mut(entity).set_parent(parent) {
                    warn!("Script of {}: {}", source, err);
                }
            }
            ScriptCmd::DestroyEntity { guid } => {
                if let Some(entity) = resolve(scene, source, guid) {
                    scene.destroy_entity(entity);
                }
            }
            ScriptCmd::PlaySound { sound, location } => {
                scene.send_audio(AudioCmd::PlayOneShot { sound, location });
            }
        }
    }
}

// -------------------------------------------------------------------------
// Lifecycle
// -------------------------------------------------------------------------

/// Instantiate every script, then run every create hook.
pub fn start_scripts(scene: &mut Scene) {
    let natives = sorted_entities_with::<NativeScriptComponent>(scene);
    let mut created = Vec::with_capacity(natives.len());
    for entity in natives {
        if let Some(mut component) = scene.world.get_mut::<NativeScriptComponent>(entity)
            && component.instance.is_none()
        {
            let instance = component.instantiate();
            component.instance = Some(instance);
            created.push(entity);
        }
    }
    for entity in created {
        if let Some((mut instance, _)) = take_native(scene, entity) {
            instance.on_create(scene, entity);
            restore_native(scene, entity, instance);
        }
    }

    let Some(host) = scene.scripts.clone() else {
        return;
    };
    let mut instantiated = Vec::new();
    for entity in sorted_entities_with::<Script>(scene) {
        let (Some(guid), Some(script)) = (
            scene.world.get::<Guid>(entity).copied(),
            scene.world.get::<Script>(entity).cloned(),
        ) else {
            continue;
        };
        let mut host_ref = host.borrow_mut();
        if !host_ref.module_exists(&script.module) {
            warn!("Script module '{}' not found for {}", script.module, guid);
            continue;
        }
        if host_ref.instantiate(guid, &script.module) {
            scene.script_instances.insert(guid);
            instantiated.push(guid);
        } else {
            warn!("Script module '{}' could not be instantiated for {}", script.module, guid);
        }
    }
    for guid in instantiated {
        run_managed(scene, guid, |host, ctx| host.on_create(guid, ctx));
    }
}

/// Per-tick update hooks, native first.
pub fn update_scripts(scene: &mut Scene, dt: f32) {
    for entity in sorted_entities_with::<NativeScriptComponent>(scene) {
        if scene.is_pending_destruction(entity) || !scene.contains_entity(entity) {
            continue;
        }
        run_native(scene, entity, |script, scene| script.on_update(scene, entity, dt));
    }

    for entity in sorted_entities_with::<Script>(scene) {
        if scene.is_pending_destruction(entity) {
            continue;
        }
        if let Some(guid) = managed_guid(scene, entity) {
            run_managed(scene, guid, |host, ctx| host.on_update(guid, dt, ctx));
        }
    }
}

/// Route an input event to every script.
pub fn dispatch_event(scene: &mut Scene, event: &SceneEvent) {
    for entity in sorted_entities_with::<NativeScriptComponent>(scene) {
        if scene.is_pending_destruction(entity) {
            continue;
        }
        run_native(scene, entity, |script, scene| script.on_event(scene, entity, event));
    }

    for entity in sorted_entities_with::<Script>(scene) {
        if let Some(guid) = managed_guid(scene, entity) {
            run_managed(scene, guid, |host, ctx| host.on_event(guid, event, ctx));
        }
    }
}

/// Destroy hooks of one entity, run when its destruction is requested in
/// Running mode. Its managed instance is dropped right away.
pub(crate) fn on_entity_destroying(scene: &mut Scene, entity: Entity) {
    let instance = scene
        .world
        .get_mut::<NativeScriptComponent>(entity)
        .and_then(|mut c| c.instance.take());
    if let Some(mut instance) = instance {
        instance.on_destroy(scene, entity);
    }

    if let Some(guid) = managed_guid(scene, entity) {
        run_managed(scene, guid, |host, ctx| host.on_destroy(guid, ctx));
        release_script_instance(scene, entity);
    }
}

/// Destroy hooks of every scripted entity, then drop every instance.
pub fn destroy_all_scripts(scene: &mut Scene) {
    for entity in sorted_entities_with::<NativeScriptComponent>(scene) {
        let instance = scene
            .world
            .get_mut::<NativeScriptComponent>(entity)
            .and_then(|mut c| c.instance.take());
        if let Some(mut instance) = instance {
            instance.on_destroy(scene, entity);
        }
    }

    for entity in sorted_entities_with::<Script>(scene) {
        if let Some(guid) = managed_guid(scene, entity) {
            run_managed(scene, guid, |host, ctx| host.on_destroy(guid, ctx));
            release_script_instance(scene, entity);
        }
    }
    debug!("All script instances destroyed");
}

/// Drop the managed instance of `entity`, if it has one.
pub fn release_script_instance(scene: &mut Scene, entity: Entity) {
    let Some(guid) = scene.world.get::<Guid>(entity).copied() else {
        return;
    };
    if !scene.script_instances.remove(&guid) {
        return;
    }
    if let Some(host) = scene.scripts.clone() {
        host.borrow_mut().remove_instance(guid);
    }
}
