//! Scene and entity copies.
//!
//! [`duplicate_scene`] builds the running copy of an editing scene: same
//! entities (same GUIDs, names and hierarchy), fresh component hooks, a new
//! physics world, and the same renderer, script host and audio channel.
//!
//! [`copy_entity_tree`] deep-copies one entity and its subtree inside a
//! scene, giving every copy a fresh GUID.

use bevy_ecs::prelude::*;
use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::collaborators::physics::PhysicsBackend;
use crate::components::audio::AudioSource;
use crate::components::billboard::Billboard;
use crate::components::boxcollider::BoxCollider;
use crate::components::camera::Camera;
use crate::components::guid::Guid;
use crate::components::image2d::Image2D;
use crate::components::light::{DirectionalLight, PointLight, SpotLight};
use crate::components::mesh::StaticMesh;
use crate::components::ownership::Ownership;
use crate::components::rigidbody::RigidBody;
use crate::components::scenename::SceneName;
use crate::components::script::{NativeScriptComponent, Script};
use crate::components::sprite::Sprite;
use crate::components::text::{Text, Text2D};
use crate::components::transform::EntityTransform;
use crate::entity::{EntityHandle, SceneEntityMut};
use crate::resources::camerainput::CameraInput;
use crate::resources::dirty::RenderDirty;
use crate::resources::editorcamera::EditorCamera;
use crate::scene::Scene;
use crate::systems::hierarchy;

/// Clones of every copyable component of one entity.
struct ComponentSnapshot {
    mesh: Option<StaticMesh>,
    sprite: Option<Sprite>,
    point_light: Option<PointLight>,
    spot_light: Option<SpotLight>,
    directional_light: Option<DirectionalLight>,
    text: Option<Text>,
    text_2d: Option<Text2D>,
    image_2d: Option<Image2D>,
    billboard: Option<Billboard>,
    camera: Option<Camera>,
    audio: Option<AudioSource>,
    rigid_body: Option<RigidBody>,
    box_collider: Option<BoxCollider>,
    native_script: Option<NativeScriptComponent>,
    script: Option<Script>,
}

impl ComponentSnapshot {
    fn capture(world: &World, entity: Entity) -> Self {
        Self {
            mesh: world.get::<StaticMesh>(entity).cloned(),
            sprite: world.get::<Sprite>(entity).cloned(),
            point_light: world.get::<PointLight>(entity).cloned(),
            spot_light: world.get::<SpotLight>(entity).cloned(),
            directional_light: world.get::<DirectionalLight>(entity).cloned(),
            text: world.get::<Text>(entity).cloned(),
            text_2d: world.get::<Text2D>(entity).cloned(),
            image_2d: world.get::<Image2D>(entity).cloned(),
            billboard: world.get::<Billboard>(entity).cloned(),
            camera: world.get::<Camera>(entity).cloned(),
            audio: world.get::<AudioSource>(entity).cloned(),
            rigid_body: world.get::<RigidBody>(entity).cloned(),
            box_collider: world.get::<BoxCollider>(entity).copied(),
            native_script: world.get::<NativeScriptComponent>(entity).cloned(),
            script: world.get::<Script>(entity).cloned(),
        }
    }

    /// Attach the captured components, running their init hooks. The
    /// target's transform must already be in place.
    fn apply(self, target: &mut SceneEntityMut<'_>) {
        if let Some(c) = self.mesh {
            target.add_component(c);
        }
        if let Some(c) = self.sprite {
            target.add_component(c);
        }
        if let Some(c) = self.point_light {
            target.add_component(c);
        }
        if let Some(c) = self.spot_light {
            target.add_component(c);
        }
        if let Some(c) = self.directional_light {
            target.add_component(c);
        }
        if let Some(c) = self.text {
            target.add_component(c);
        }
        if let Some(c) = self.text_2d {
            target.add_component(c);
        }
        if let Some(c) = self.image_2d {
            target.add_component(c);
        }
        if let Some(c) = self.billboard {
            target.add_component(c);
        }
        if let Some(c) = self.camera {
            target.add_component(c);
        }
        if let Some(c) = self.audio {
            target.add_component(c);
        }
        if let Some(c) = self.rigid_body {
            target.add_component(c);
        }
        if let Some(c) = self.box_collider {
            target.add_component(c);
        }
        if let Some(c) = self.native_script {
            target.add_component(c);
        }
        if let Some(c) = self.script {
            target.add_component(c);
        }
    }
}

pub(crate) fn duplicate_scene(source: &Scene, physics: Box<dyn PhysicsBackend>) -> Scene {
    let mut copy = Scene::new(source.renderer.clone(), physics, source.config().clone());
    copy.scripts = source.scripts.clone();
    copy.audio = source.audio.clone();
    copy.viewport = source.viewport;
    copy.can_update_editor_camera = source.can_update_editor_camera;
    *copy.world.resource_mut::<EditorCamera>() = source.editor_camera().clone();
    *copy.world.resource_mut::<CameraInput>() = *source.world.resource::<CameraInput>();

    // Entities first, so ownership can be remapped.
    // Creation order is kept, so "first primary camera" and the listings
    // resolve the same way in the copy.
    let identities: Vec<(Entity, Guid)> = source
        .entities_in_creation_order()
        .into_iter()
        .filter_map(|entity| source.world.get::<Guid>(entity).map(|guid| (entity, *guid)))
        .collect();
    let entities: Vec<Entity> = identities.iter().map(|(entity, _)| *entity).collect();
    let mut mapping: FxHashMap<Entity, Entity> = FxHashMap::default();
    for &(src, guid) in &identities {
        let name = source.world.get::<SceneName>(src);
        let dst = copy
            .create_entity_with_guid(guid, name.map_or("", |n| n.as_str()))
            .id();
        if name.is_none() {
            copy.world.entity_mut(dst).remove::<SceneName>();
        }
        mapping.insert(src, dst);
    }

    // Transforms and ownership are copied verbatim; they already satisfy the
    // hierarchy invariants in the source.
    for &src in &entities {
        let dst = mapping[&src];
        let transform = source
            .world
            .get::<EntityTransform>(src)
            .copied()
            .unwrap_or_default();
        let ownership = source
            .world
            .get::<Ownership>(src)
            .map(|o| Ownership {
                parent: o.parent().and_then(|p| mapping.get(&p).copied()),
                children: o
                    .children()
                    .iter()
                    .filter_map(|c| mapping.get(c).copied())
                    .collect(),
            })
            .unwrap_or_default();
        copy.world.entity_mut(dst).insert((transform, ownership));
    }

    for &src in &entities {
        let snapshot = ComponentSnapshot::capture(&source.world, src);
        snapshot.apply(&mut copy.entity_mut(mapping[&src]));
    }
    if let Some(camera) = source.runtime_camera {
        copy.runtime_camera = mapping.get(&camera).copied();
    }

    copy.world.resource_mut::<RenderDirty>().mark_all();
    info!("Scene duplicated ({} entities)", entities.len());
    copy
}

/// Deep-copy `source` and its subtree as a new root entity.
pub(crate) fn copy_entity_tree(scene: &mut Scene, source: Entity) -> EntityHandle {
    let copy = copy_recursive(scene, source);
    debug!("Copied entity {:?} as {:?}", source, copy);
    EntityHandle::from(copy)
}

fn copy_recursive(scene: &mut Scene, source: Entity) -> Entity {
    let name = scene.entity(source).name().to_string();
    let world = scene.entity(source).world_transform();
    let children = scene
        .world
        .get::<Ownership>(source)
        .map(|o| o.children().to_vec())
        .unwrap_or_default();

    let copy = scene.create_entity(&name).id();
    hierarchy::set_world_transform(scene, copy, world);

    for child in children {
        let child_copy = copy_recursive(scene, child);
        // A fresh entity cannot be an ancestor of its own parent.
        let _ = hierarchy::set_parent(scene, child_copy, EntityHandle::from(copy));
    }

    let snapshot = ComponentSnapshot::capture(&scene.world, source);
    snapshot.apply(&mut scene.entity_mut(copy));
    copy
}
