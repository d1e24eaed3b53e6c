//! Aberred Scene headless driver.
//!
//! Builds a small demo scene, ticks it in Editing mode, plays it for a
//! number of frames, stops, and reports what the renderer and the audio
//! thread received. Useful as a smoke test of the whole runtime without a
//! window or GPU.
//!
//! # Main Loop
//!
//! 1. Load `scene.ini` (or the file given with `--config`)
//! 2. Spawn the audio thread and build the demo scene
//! 3. Tick the editing scene
//! 4. Enter Running mode, tick the running duplicate, leave Running mode
//! 5. Log renderer stats and shut the audio thread down
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --frames 120
//! ```

use std::path::PathBuf;

use aberredscene::collaborators::audio::{setup_audio, shutdown_audio};
use aberredscene::collaborators::kinematic::KinematicPhysics;
use aberredscene::collaborators::physics::PhysicsFactory;
use aberredscene::collaborators::renderer::{RecordingRenderer, SharedRenderer};
use aberredscene::components::audio::AudioSource;
use aberredscene::components::boxcollider::BoxCollider;
use aberredscene::components::light::{DirectionalLight, PointLight, SpotLight};
use aberredscene::components::mesh::StaticMesh;
use aberredscene::components::rigidbody::{BodyType, RigidBody};
use aberredscene::components::script::{NativeScript, NativeScriptComponent};
use aberredscene::components::text::Text;
use aberredscene::components::transform::Transform;
use aberredscene::events::sceneevent::SceneEvent;
use aberredscene::resources::sceneconfig::SceneConfig;
use aberredscene::resources::scenestate::SceneMode;
use aberredscene::scene::Scene;
use aberredscene::scenemanager::SceneManager;
use bevy_ecs::prelude::Entity;
use clap::Parser;
use glam::{Quat, Vec3};

/// Aberred Scene headless runner
#[derive(Parser)]
#[command(version, about = "Runs a demo scene through Editing and Running mode without a window.")]
struct Cli {
    /// INI configuration file (default: ./scene.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Frames to run in each mode.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Frame time in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Only tick the editing scene.
    #[arg(long)]
    no_play: bool,

    /// Write the default configuration to the config path and exit.
    #[arg(long)]
    write_default_config: bool,
}

/// Spins its entity around the Y axis.
#[derive(Default)]
struct Spinner {
    degrees_per_second: f32,
}

impl NativeScript for Spinner {
    fn on_create(&mut self, _scene: &mut Scene, entity: Entity) {
        self.degrees_per_second = 90.0;
        log::info!("Spinner attached to {:?}", entity);
    }

    fn on_update(&mut self, scene: &mut Scene, entity: Entity, dt: f32) {
        let mut spinner = scene.entity_mut(entity);
        let rotation = spinner.relative_transform().rotation;
        let step = Quat::from_rotation_y((self.degrees_per_second * dt).to_radians());
        spinner.set_relative_rotation(rotation * step);
    }
}

fn build_demo_scene(scene: &mut Scene) {
    let sun = scene.create_entity("Sun");
    {
        let mut sun = scene.entity_mut(sun);
        sun.set_world_rotation(Quat::from_rotation_x(-0.8));
        sun.add_component(DirectionalLight::new(Vec3::new(1.0, 0.95, 0.9), 3.0));
    }

    let ground = scene.create_entity("Ground");
    {
        let mut ground = scene.entity_mut(ground);
        ground.set_world_scale(Vec3::new(20.0, 1.0, 20.0));
        ground.add_component(StaticMesh::new("meshes/plane").with_material("materials/grass"));
        ground.add_component(BoxCollider::new(Vec3::new(10.0, 0.1, 10.0)));
    }

    let turntable = scene.create_entity("Turntable");
    {
        let mut turntable = scene.entity_mut(turntable);
        turntable.set_world_location(Vec3::new(0.0, 0.5, -4.0));
        turntable.add_component(StaticMesh::new("meshes/disc"));
        turntable.add_component(NativeScriptComponent::bind::<Spinner>());
    }

    let label = scene.create_entity("Label");
    {
        let mut label = scene.entity_mut(label);
        if let Err(err) = label.set_parent(turntable) {
            log::error!("{}", err);
        }
        label.set_relative_location(Vec3::new(2.0, 1.0, 0.0));
        label.add_component(Text::new("Aberred Scene", "fonts/default"));
        label.add_component(PointLight::new(Vec3::new(1.0, 0.6, 0.2), 2.0, 4.0));
    }

    let crate_entity = scene.create_entity("Crate");
    {
        let mut crate_entity = scene.entity_mut(crate_entity);
        crate_entity.set_world_transform(Transform::from_location(Vec3::new(1.0, 6.0, -3.0)));
        crate_entity.add_component(StaticMesh::new("meshes/crate"));
        crate_entity.add_component(BoxCollider::default());
        crate_entity.add_component(RigidBody::new(BodyType::Dynamic).with_velocity(Vec3::new(0.5, 0.0, 0.0)));
    }

    let lamp = scene.create_entity("Lamp");
    {
        let mut lamp = scene.entity_mut(lamp);
        lamp.set_world_transform(Transform::new(
            Vec3::new(0.0, 4.0, -4.0),
            Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            Vec3::ONE,
        ));
        lamp.add_component(SpotLight::new(Vec3::ONE, 5.0, 10.0).with_cutoffs(15.0, 25.0));
    }

    let music = scene.create_entity("Music");
    scene
        .entity_mut(music)
        .add_component(AudioSource::new("sounds/theme").autoplay().looped());

    log::info!("Demo scene built with {} entities", scene.entity_count());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::with_path(path),
        None => SceneConfig::new(),
    };

    // Early-exit: write the default configuration and quit
    if cli.write_default_config {
        if let Err(e) = config.save_to_file() {
            log::error!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }

    // --------------- Collaborators ---------------
    let audio = setup_audio();
    let recorder = RecordingRenderer::shared();
    let renderer: SharedRenderer = recorder.clone();
    let physics_factory: PhysicsFactory =
        Box::new(|mode, config| Box::new(KinematicPhysics::from_config(mode, config)));

    // --------------- Scene ---------------
    let mut manager = SceneManager::new(renderer, config, physics_factory);
    manager
        .editor_scene_mut()
        .set_audio_sender(Some(audio.sender()));
    build_demo_scene(manager.editor_scene_mut());
    manager.on_event(&SceneEvent::ViewportResized {
        width: 1280,
        height: 720,
    });

    // A loader thread hands its result to the simulation thread.
    let sender = manager.deferred_sender();
    let loader = std::thread::spawn(move || {
        sender.submit(|manager| {
            let scene = manager.editor_scene_mut();
            let prop = scene.create_entity("Loaded Prop");
            let mut prop = scene.entity_mut(prop);
            prop.set_world_location(Vec3::new(-2.0, 0.5, -3.0));
            prop.add_component(StaticMesh::new("meshes/barrel"));
        })
    });
    if !loader.join().unwrap_or(false) {
        log::warn!("Loader thread could not queue its result");
    }

    // --------------- Main loop ---------------
    for _ in 0..cli.frames {
        manager.tick(cli.dt);
    }

    if !cli.no_play {
        manager.request_mode(SceneMode::Running);
        for _ in 0..cli.frames {
            manager.tick(cli.dt);
        }
        log::info!(
            "Running scene: {} entities, elapsed {:.2}s",
            manager.scene().entity_count(),
            manager.scene().time().elapsed
        );
        manager.request_mode(SceneMode::Editing);
        manager.tick(cli.dt);
    }

    let stats = recorder.borrow().stats;
    log::info!(
        "Renderer: {} frames, {} mesh lists, {} mesh transform batches, {} light lists",
        stats.frames,
        stats.mesh_sets,
        stats.mesh_transform_batches,
        stats.point_light_sets + stats.spot_light_sets
    );

    drop(manager);
    let audio_stats = shutdown_audio(audio);
    log::info!(
        "Audio: {} commands, {} sounds started, {} listener updates",
        audio_stats.commands,
        audio_stats.sounds_started,
        audio_stats.listener_updates
    );
}
