//! Editing/Running state machine tests: play and stop through the scene
//! manager, script hooks, the synthesized camera, physics modes, audio
//! commands and deferred calls.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use bevy_ecs::prelude::Entity;
use crossbeam_channel::unbounded;
use glam::{Quat, Vec3};

use aberredscene::collaborators::kinematic::KinematicPhysics;
use aberredscene::collaborators::physics::{ActorDesc, ActorPose, PhysicsBackend, PhysicsFactory};
use aberredscene::collaborators::renderer::{RecordingRenderer, SharedRenderer};
use aberredscene::collaborators::scripting::{ScriptCmd, ScriptContext, ScriptHost, SharedScriptHost};
use aberredscene::components::audio::AudioSource;
use aberredscene::components::camera::Camera;
use aberredscene::components::guid::Guid;
use aberredscene::components::physicsactor::PhysicsActor;
use aberredscene::components::rigidbody::RigidBody;
use aberredscene::components::script::{NativeScript, NativeScriptComponent, Script};
use aberredscene::components::transform::Transform;
use aberredscene::events::audio::AudioCmd;
use aberredscene::events::sceneevent::SceneEvent;
use aberredscene::resources::sceneconfig::SceneConfig;
use aberredscene::resources::scenestate::SceneMode;
use aberredscene::scene::Scene;
use aberredscene::scenemanager::SceneManager;

const DT: f32 = 1.0 / 60.0;
const EPSILON: f32 = 1e-4;

fn physics_factory() -> PhysicsFactory {
    Box::new(|mode, config| Box::new(KinematicPhysics::from_config(mode, config)))
}

fn new_manager() -> (SceneManager, Rc<RefCell<RecordingRenderer>>) {
    let recorder = RecordingRenderer::shared();
    let renderer: SharedRenderer = recorder.clone();
    (SceneManager::new(renderer, SceneConfig::new(), physics_factory()), recorder)
}

fn new_scene() -> Scene {
    Scene::new(
        RecordingRenderer::shared(),
        Box::new(KinematicPhysics::new(DT, 16, Vec3::ZERO)),
        SceneConfig::new(),
    )
}

// =============================================================================
// Test doubles
// =============================================================================

/// Script host that records every call. Module "mover" places its entity at
/// (1,2,3) on update; module "bomb" destroys its entity on update.
#[derive(Default)]
struct RecordingHost {
    calls: Vec<String>,
    instances: Vec<Guid>,
}

impl ScriptHost for RecordingHost {
    fn module_exists(&self, module: &str) -> bool {
        matches!(module, "mover" | "bomb")
    }

    fn instantiate(&mut self, guid: Guid, module: &str) -> bool {
        self.calls.push(format!("instantiate {module}"));
        self.instances.push(guid);
        true
    }

    fn on_create(&mut self, _guid: Guid, ctx: &mut ScriptContext) {
        self.calls.push("create".into());
        ctx.push(ScriptCmd::PlaySound {
            sound: "sounds/spawn".into(),
            location: Vec3::ZERO,
        });
    }

    fn on_update(&mut self, guid: Guid, _dt: f32, ctx: &mut ScriptContext) {
        self.calls.push("update".into());
        ctx.push(ScriptCmd::SetWorldLocation {
            guid,
            location: Vec3::new(1.0, 2.0, 3.0),
        });
    }

    fn on_destroy(&mut self, _guid: Guid, _ctx: &mut ScriptContext) {
        self.calls.push("destroy".into());
    }

    fn on_event(&mut self, _guid: Guid, event: &SceneEvent, _ctx: &mut ScriptContext) {
        self.calls.push(format!("event {event:?}"));
    }

    fn remove_instance(&mut self, guid: Guid) {
        self.instances.retain(|g| *g != guid);
    }
}

/// Physics backend that refuses every actor.
struct RefusingPhysics;

impl PhysicsBackend for RefusingPhysics {
    fn create_actor(&mut self, _guid: Guid, _desc: &ActorDesc) -> Result<(), String> {
        Err("out of actors".into())
    }

    fn remove_actor(&mut self, _guid: Guid) -> bool {
        false
    }

    fn has_actor(&self, _guid: Guid) -> bool {
        false
    }

    fn set_actor_pose(&mut self, _guid: Guid, _location: Vec3, _rotation: Quat) {}

    fn simulate(&mut self, _dt: f32, _gravity_enabled: bool) {}

    fn active_actors(&self) -> Vec<ActorPose> {
        Vec::new()
    }

    fn reset(&mut self) {}
}

static DESTROY_ON_UPDATE_HOOKS: AtomicU32 = AtomicU32::new(0);

#[derive(Default)]
struct DestroyOnUpdate;

impl NativeScript for DestroyOnUpdate {
    fn on_update(&mut self, scene: &mut Scene, entity: Entity, _dt: f32) {
        scene.destroy_entity(entity);
    }

    fn on_destroy(&mut self, _scene: &mut Scene, _entity: Entity) {
        DESTROY_ON_UPDATE_HOOKS.fetch_add(1, Ordering::SeqCst);
    }
}

static COUNTER_CREATED: AtomicU32 = AtomicU32::new(0);
static COUNTER_DESTROYED: AtomicU32 = AtomicU32::new(0);

#[derive(Default)]
struct Counter;

impl NativeScript for Counter {
    fn on_create(&mut self, _scene: &mut Scene, _entity: Entity) {
        COUNTER_CREATED.fetch_add(1, Ordering::SeqCst);
    }

    fn on_destroy(&mut self, _scene: &mut Scene, _entity: Entity) {
        COUNTER_DESTROYED.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Runtime camera
// =============================================================================

#[test]
fn running_without_camera_synthesizes_a_hidden_primary_camera() {
    let mut scene = new_scene();
    let player = scene.create_entity("Player");
    scene
        .editor_camera_mut()
        .transform = Transform::from_location(Vec3::new(0.0, 3.0, 8.0));

    scene.on_runtime_start();

    let camera = scene.runtime_camera();
    assert!(camera.is_valid(&scene));
    assert!(scene.entity(camera).get_component::<Camera>().primary);
    assert_eq!(scene.primary_camera_entity(), camera);
    assert!(scene
        .entity(camera)
        .world_transform()
        .location
        .abs_diff_eq(Vec3::new(0.0, 3.0, 8.0), EPSILON));
    assert!(scene.entity(camera).has_component::<NativeScriptComponent>());

    let named = scene.named_entities();
    assert_eq!(named, vec![(player, "Player".to_string())]);
    assert_eq!(scene.entity_count(), 2);
}

#[test]
fn authored_primary_camera_is_used_as_is() {
    let mut scene = new_scene();
    let cam = scene.create_entity("Main Camera");
    scene.entity_mut(cam).add_component(Camera::primary());

    scene.on_runtime_start();
    scene.on_update(DT);

    assert!(scene.runtime_camera().is_null());
    assert_eq!(scene.primary_camera_entity(), cam);
    assert_eq!(scene.entity_count(), 1);
}

#[test]
fn running_copy_picks_the_same_primary_camera() {
    let (mut manager, _) = new_manager();
    let scene = manager.editor_scene_mut();
    let filler = scene.create_entity("Filler");
    scene.destroy_entity(filler);
    scene.flush_pending_destructions();
    let first = scene.create_entity("Cam1");
    scene.entity_mut(first).add_component(Camera::primary());
    let second = scene.create_entity("Cam2");
    scene.entity_mut(second).add_component(Camera::primary());
    let first_guid = manager.editor_scene().entity(first).guid();

    manager.play();

    let running = manager.scene();
    let primary = running.primary_camera_entity();
    assert_eq!(running.entity(primary).guid(), first_guid);
    let names: Vec<String> = running.named_entities().into_iter().map(|(_, name)| name).collect();
    assert_eq!(names, vec!["Cam1", "Cam2"]);
}

#[test]
fn viewport_resize_reaches_renderer_and_cameras() {
    let recorder = RecordingRenderer::shared();
    let mut scene = Scene::new(
        recorder.clone(),
        Box::new(KinematicPhysics::new(DT, 16, Vec3::ZERO)),
        SceneConfig::new(),
    );
    let cam = scene.create_entity("Cam");
    scene.entity_mut(cam).add_component(Camera::primary());

    scene.on_event(&SceneEvent::ViewportResized { width: 800, height: 400 });
    assert_eq!(recorder.borrow().viewport, (800, 400));
    assert!((scene.entity(cam).get_component::<Camera>().aspect_ratio - 2.0).abs() < EPSILON);

    scene.on_viewport_resize(0, 100);
    assert_eq!(scene.viewport_size(), (800, 400));
}

// =============================================================================
// Play / stop
// =============================================================================

#[test]
fn play_keeps_guids_and_stop_restores_the_editing_scene() {
    let (mut manager, recorder) = new_manager();
    let crate_entity = manager.editor_scene_mut().create_entity("Crate");
    let lid = manager.editor_scene_mut().create_entity("Lid");
    manager.editor_scene_mut().entity_mut(lid).set_parent(crate_entity).unwrap();
    let crate_guid = manager.editor_scene().entity(crate_entity).guid();
    let lid_guid = manager.editor_scene().entity(lid).guid();

    manager.request_mode(SceneMode::Running);
    manager.tick(DT);
    assert!(manager.is_playing());
    assert_eq!(manager.scene().mode(), SceneMode::Running);
    assert_eq!(manager.editor_scene().mode(), SceneMode::Editing);

    let running_crate = manager.scene().entity_by_guid(crate_guid);
    let running_lid = manager.scene().entity_by_guid(lid_guid);
    assert!(!running_crate.is_null());
    assert_eq!(manager.scene().entity(running_lid).parent(), running_crate);
    assert_eq!(manager.scene().entity(running_crate).name(), "Crate");

    manager
        .scene_mut()
        .entity_mut(running_crate)
        .set_world_location(Vec3::new(9.0, 0.0, 0.0));
    manager.scene_mut().destroy_entity(running_lid);
    manager.tick(DT);

    manager.request_mode(SceneMode::Editing);
    manager.tick(DT);
    assert!(!manager.is_playing());
    assert_eq!(manager.mode(), SceneMode::Editing);
    let editor = manager.editor_scene();
    assert!(editor.entity(crate_entity).world_transform().location.abs_diff_eq(Vec3::ZERO, EPSILON));
    assert_eq!(editor.entity(lid).parent(), crate_entity);
    assert_eq!(editor.entity_by_guid(lid_guid), lid);
    assert!(recorder.borrow().stats.wait_idle_calls >= 2);
}

#[test]
fn open_scene_stops_play_and_clears_selection() {
    let (tx, rx) = unbounded::<AudioCmd>();
    let (mut manager, recorder) = new_manager();
    let old = manager.editor_scene_mut().create_entity("Old");
    manager.set_selection(old);
    manager.play();

    let host: SharedScriptHost = Rc::new(RefCell::new(RecordingHost::default()));
    let renderer: SharedRenderer = recorder.clone();
    let mut opened = Scene::new(
        renderer,
        Box::new(KinematicPhysics::new(DT, 16, Vec3::ZERO)),
        SceneConfig::new(),
    )
    .with_audio(tx)
    .with_script_host(host);
    let music = opened.create_entity("Music");
    opened
        .entity_mut(music)
        .add_component(AudioSource::new("sounds/theme").autoplay());

    manager.open_scene(opened);
    assert!(!manager.is_playing());
    assert!(manager.selection().is_null());
    assert_eq!(manager.editor_scene().named_entities().len(), 1);
    assert!(rx.try_iter().next().is_none(), "nothing plays while editing");

    manager.play();
    assert!(rx.try_iter().any(|cmd| matches!(cmd, AudioCmd::Play { .. })));
}

#[test]
fn gravity_applies_only_while_running() {
    let (mut manager, _) = new_manager();
    let ball = manager.editor_scene_mut().create_entity("Ball");
    manager.editor_scene_mut().entity_mut(ball).add_component(RigidBody::default());
    let guid = manager.editor_scene().entity(ball).guid();

    for _ in 0..30 {
        manager.tick(DT);
    }
    assert!(manager.editor_scene().entity(ball).world_transform().location.abs_diff_eq(Vec3::ZERO, EPSILON));

    manager.play();
    for _ in 0..30 {
        manager.tick(DT);
    }
    let running_ball = manager.scene().entity_by_guid(guid);
    let fallen = manager.scene().entity(running_ball).world_transform().location;
    assert!(fallen.y < -0.5, "ball should fall, got {:?}", fallen);

    manager.stop();
    assert!(manager.editor_scene().entity(ball).world_transform().location.abs_diff_eq(Vec3::ZERO, EPSILON));
}

#[test]
fn refused_actor_degrades_to_no_body() {
    let mut scene = Scene::new(RecordingRenderer::shared(), Box::new(RefusingPhysics), SceneConfig::new());
    let e = scene.create_entity("Ghost");
    scene.entity_mut(e).add_component(RigidBody::default());
    assert!(scene.entity(e).has_component::<RigidBody>());
    assert!(!scene.entity(e).has_component::<PhysicsActor>());

    scene.entity_mut(e).set_world_location(Vec3::ONE);
    scene.on_runtime_start();
    scene.on_update(DT);
    assert!(scene.entity(e).world_transform().location.abs_diff_eq(Vec3::ONE, EPSILON));
}

// =============================================================================
// Scripts
// =============================================================================

#[test]
fn managed_script_lifecycle_follows_play_and_stop() {
    let (mut manager, _) = new_manager();
    let host = Rc::new(RefCell::new(RecordingHost::default()));
    let shared: SharedScriptHost = host.clone();
    manager.editor_scene_mut().set_script_host(Some(shared));

    let mover = manager.editor_scene_mut().create_entity("Mover");
    manager.editor_scene_mut().entity_mut(mover).add_component(Script::new("mover"));
    let ghost = manager.editor_scene_mut().create_entity("Ghost");
    manager.editor_scene_mut().entity_mut(ghost).add_component(Script::new("missing"));

    // Hooks never run while editing.
    manager.tick(DT);
    assert!(host.borrow().calls.is_empty());

    manager.play();
    assert_eq!(host.borrow().calls, vec!["instantiate mover", "create"]);
    assert_eq!(host.borrow().instances.len(), 1);

    manager.tick(DT);
    let guid = manager.editor_scene().entity(mover).guid();
    let running = manager.scene().entity_by_guid(guid);
    assert!(manager
        .scene()
        .entity(running)
        .world_transform()
        .location
        .abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), EPSILON));

    manager.on_event(&SceneEvent::KeyPressed { key: "Space".into() });
    assert!(host.borrow().calls.iter().any(|c| c.starts_with("event")));

    manager.stop();
    assert_eq!(host.borrow().calls.last().map(String::as_str), Some("destroy"));
    assert!(host.borrow().instances.is_empty());
    assert!(manager
        .editor_scene()
        .entity(mover)
        .world_transform()
        .location
        .abs_diff_eq(Vec3::ZERO, EPSILON));
}

#[test]
fn native_script_destroying_itself_runs_destroy_hook_once() {
    let mut scene = new_scene();
    let e = scene.create_entity("Bomb");
    scene
        .entity_mut(e)
        .add_component(NativeScriptComponent::bind::<DestroyOnUpdate>());

    scene.on_runtime_start();
    scene.on_update(DT);
    assert!(scene.is_pending_destruction(e));
    assert_eq!(DESTROY_ON_UPDATE_HOOKS.load(Ordering::SeqCst), 1);

    scene.on_update(DT);
    assert!(!scene.contains(e));
    scene.on_runtime_stop();
    assert_eq!(DESTROY_ON_UPDATE_HOOKS.load(Ordering::SeqCst), 1);
}

#[test]
fn destroy_request_while_running_runs_native_hook_immediately() {
    let mut scene = new_scene();
    let e = scene.create_entity("Counted");
    scene.entity_mut(e).add_component(NativeScriptComponent::bind::<Counter>());

    scene.on_runtime_start();
    assert_eq!(COUNTER_CREATED.load(Ordering::SeqCst), 1);
    assert!(scene.entity(e).get_component::<NativeScriptComponent>().is_instantiated());

    scene.destroy_entity(e);
    assert_eq!(COUNTER_DESTROYED.load(Ordering::SeqCst), 1);
    assert!(scene.contains(e), "entity is still readable");

    scene.on_runtime_stop();
    assert_eq!(COUNTER_DESTROYED.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Audio
// =============================================================================

#[test]
fn audio_commands_follow_the_runtime() {
    let (tx, rx) = unbounded::<AudioCmd>();
    let (mut manager, _) = new_manager();
    manager.editor_scene_mut().set_audio_sender(Some(tx));
    let music = manager.editor_scene_mut().create_entity("Music");
    manager
        .editor_scene_mut()
        .entity_mut(music)
        .add_component(AudioSource::new("sounds/theme").autoplay().looped());
    let sfx = manager.editor_scene_mut().create_entity("Sfx");
    manager
        .editor_scene_mut()
        .entity_mut(sfx)
        .add_component(AudioSource::new("sounds/click"));
    let music_guid = manager.editor_scene().entity(music).guid();

    manager.tick(DT);
    assert!(rx.try_iter().next().is_none(), "editing sends nothing");

    manager.play();
    let started: Vec<AudioCmd> = rx.try_iter().collect();
    assert_eq!(started.len(), 1);
    assert!(matches!(
        &started[0],
        AudioCmd::Play { guid, looping: true, .. } if *guid == music_guid
    ));

    manager.tick(DT);
    assert!(rx.try_iter().any(|cmd| matches!(cmd, AudioCmd::SetListener { .. })));

    manager.stop();
    assert!(rx.try_iter().any(|cmd| cmd == AudioCmd::StopAll));
}

// =============================================================================
// Deferred calls and selection
// =============================================================================

#[test]
fn deferred_calls_run_on_the_next_tick() {
    let (mut manager, _) = new_manager();
    let sender = manager.deferred_sender();
    let worker = std::thread::spawn(move || {
        sender.submit(|manager| {
            manager.editor_scene_mut().create_entity("From Worker");
        })
    });
    assert!(worker.join().unwrap());
    assert_eq!(manager.editor_scene().entity_count(), 0);

    manager.tick(DT);
    let names: Vec<String> = manager
        .editor_scene()
        .named_entities()
        .into_iter()
        .map(|(_, name)| name)
        .collect();
    assert_eq!(names, vec!["From Worker".to_string()]);
}

#[test]
fn deferred_mode_request_applies_in_the_same_tick() {
    let (mut manager, _) = new_manager();
    let sender = manager.deferred_sender();
    assert!(sender.submit(|manager| manager.request_mode(SceneMode::Running)));
    manager.tick(DT);
    assert!(manager.is_playing());
}

#[test]
fn selection_clears_when_entity_is_destroyed() {
    let (mut manager, _) = new_manager();
    let e = manager.editor_scene_mut().create_entity("Picked");
    manager.set_selection(e);
    assert_eq!(manager.selection(), e);

    manager.editor_scene_mut().destroy_entity(e);
    manager.tick(DT);
    assert!(manager.selection().is_null());
}

#[test]
fn scene_time_advances_with_scale() {
    let mut config = SceneConfig::new();
    config.time_scale = 0.5;
    let mut scene = Scene::new(
        RecordingRenderer::shared(),
        Box::new(KinematicPhysics::new(DT, 16, Vec3::ZERO)),
        config,
    );
    scene.on_update(0.2);
    scene.on_update(0.2);
    assert_eq!(scene.time().frame_count, 2);
    assert!((scene.time().elapsed - 0.2).abs() < EPSILON);
    assert!((scene.time().delta - 0.1).abs() < EPSILON);
}
