//! Edit/Runtime update paths.
//!
//! Editing tick: time, flush destructions, editor physics (no gravity),
//! editor camera, render snapshot.
//!
//! Running tick: time, flush destructions, script updates, camera
//! resolution, audio listener, gameplay physics, render snapshot.
//!
//! The running camera is the first camera flagged primary. When the author
//! placed none, a camera is synthesized at the editor camera's pose, driven
//! by a [`FlyCameraController`] and kept out of the named-entity listing.

use bevy_ecs::prelude::*;
use log::info;

use crate::collaborators::physics::PhysicsMode;
use crate::components::audio::AudioSource;
use crate::components::camera::{Camera, CameraView};
use crate::components::creationindex::CreationIndex;
use crate::components::guid::Guid;
use crate::components::scenename::SceneName;
use crate::components::script::NativeScriptComponent;
use crate::events::audio::AudioCmd;
use crate::events::sceneevent::SceneEvent;
use crate::resources::camerainput::CameraInput;
use crate::resources::editorcamera::EditorCamera;
use crate::resources::scenestate::SceneMode;
use crate::scene::Scene;
use crate::systems::cameracontroller::FlyCameraController;
use crate::systems::{physics, scripts, time};

pub const RUNTIME_CAMERA_NAME: &str = "Runtime Camera";

pub fn on_update_editor(scene: &mut Scene, dt: f32) {
    let scaled_dt = time::update_scene_time(&mut scene.world, dt);
    scene.flush_pending_destructions();
    physics::step_physics(scene, scaled_dt, PhysicsMode::Editor);
    if scene.can_update_editor_camera {
        let input = *scene.world.resource::<CameraInput>();
        scene.world.resource_mut::<EditorCamera>().update(&input, dt);
    }
    scene.render_scene();
}

pub fn on_update_runtime(scene: &mut Scene, dt: f32) {
    let scaled_dt = time::update_scene_time(&mut scene.world, dt);
    scene.flush_pending_destructions();
    scripts::update_scripts(scene, scaled_dt);
    let camera = resolve_runtime_camera(scene);
    fit_camera_to_viewport(scene, camera);
    update_audio_listener(scene, camera);
    physics::step_physics(scene, scaled_dt, PhysicsMode::Gameplay);
    scene.render_scene();
}

pub fn on_runtime_start(scene: &mut Scene) {
    scene.set_mode(SceneMode::Running);
    scripts::start_scripts(scene);
    autoplay_audio(scene);
    let camera = resolve_runtime_camera(scene);
    fit_camera_to_viewport(scene, camera);
    info!("Runtime started");
}

pub fn on_runtime_stop(scene: &mut Scene) {
    scripts::destroy_all_scripts(scene);
    scene.physics.reset();
    scene.send_audio(AudioCmd::StopAll);
    scene.set_mode(SceneMode::Editing);
    info!("Runtime stopped");
}

pub fn on_event(scene: &mut Scene, event: &SceneEvent) {
    if let SceneEvent::ViewportResized { width, height } = *event {
        on_viewport_resize(scene, width, height);
    }
    match scene.mode() {
        SceneMode::Editing => {
            if let SceneEvent::MouseScrolled { delta } = *event {
                let looking = scene.world.resource::<CameraInput>().looking;
                scene.world.resource_mut::<EditorCamera>().fly.on_scroll(delta, looking);
            }
        }
        SceneMode::Running => scripts::dispatch_event(scene, event),
    }
}

/// Resize the editor camera, the renderer output and every camera that
/// follows the viewport aspect ratio.
pub fn on_viewport_resize(scene: &mut Scene, width: u32, height: u32) {
    if width == 0 || height == 0 {
        return;
    }
    scene.viewport = (width, height);
    scene
        .world
        .resource_mut::<EditorCamera>()
        .set_viewport_size(width, height);
    scene.renderer.borrow_mut().set_viewport_size(width, height);
    let mut cameras = scene.world.query_filtered::<&mut Camera, With<Guid>>();
    for mut camera in cameras.iter_mut(&mut scene.world) {
        camera.set_viewport_size(width, height);
    }
}

/// The primary camera, or the synthesized runtime camera (created on first use).
pub fn resolve_runtime_camera(scene: &mut Scene) -> Entity {
    if let Some(primary) = scene.primary_camera_entity().entity() {
        return primary;
    }
    if let Some(camera) = scene.runtime_camera.filter(|e| scene.contains_entity(*e)) {
        return camera;
    }

    let editor = scene.world.resource::<EditorCamera>().clone();
    let handle = scene.create_entity(RUNTIME_CAMERA_NAME);
    let entity = handle.id();
    scene.world.entity_mut(entity).remove::<SceneName>();
    {
        let mut camera_entity = scene.entity_mut(handle);
        camera_entity.set_world_transform(editor.transform);
        camera_entity.add_component(Camera {
            primary: true,
            fov_y: editor.fov_y,
            aspect_ratio: editor.aspect_ratio(),
            near: editor.near,
            far: editor.far,
            ..Camera::default()
        });
        camera_entity.add_component(NativeScriptComponent::bind::<FlyCameraController>());
    }
    scene.runtime_camera = Some(entity);
    info!("No primary camera, created runtime camera {:?}", entity);
    entity
}

fn fit_camera_to_viewport(scene: &mut Scene, camera: Entity) {
    let (width, height) = scene.viewport;
    if let Some(mut camera) = scene.world.get_mut::<Camera>(camera) {
        camera.set_viewport_size(width, height);
    }
}

fn update_audio_listener(scene: &mut Scene, camera: Entity) {
    let Some(view) = scene.world.get::<Camera>(camera).map(Camera::view) else {
        return;
    };
    scene.send_audio(AudioCmd::SetListener {
        location: view.location,
        forward: view.forward(),
        up: view.up(),
    });
}

fn autoplay_audio(scene: &mut Scene) {
    let mut query = scene.world.query::<(&CreationIndex, &Guid, &AudioSource)>();
    let mut sources: Vec<(CreationIndex, AudioCmd)> = query
        .iter(&scene.world)
        .filter(|(_, _, source)| source.autoplay)
        .map(|(index, guid, source)| {
            (
                *index,
                AudioCmd::Play {
                    guid: *guid,
                    sound: source.sound.clone(),
                    location: source.spatial.world().location,
                    volume: source.volume,
                    looping: source.looping,
                },
            )
        })
        .collect();
    sources.sort_unstable_by_key(|(index, _)| *index);
    for (_, cmd) in sources {
        scene.send_audio(cmd);
    }
}

/// View used for the render snapshot: the running camera in Running mode,
/// the editor camera otherwise.
pub fn active_view(scene: &Scene) -> CameraView {
    if scene.is_running() {
        let camera = scene
            .primary_camera_entity()
            .entity()
            .or(scene.runtime_camera)
            .and_then(|e| scene.world.get::<Camera>(e));
        if let Some(camera) = camera {
            return camera.view();
        }
    }
    scene.world.resource::<EditorCamera>().view()
}
