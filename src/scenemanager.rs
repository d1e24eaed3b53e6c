//! Owner of the editing scene and its running duplicate.
//!
//! There is no global "current scene": the application shell owns one
//! [`SceneManager`] and asks it for the scene to draw or edit. While playing,
//! [`SceneManager::scene`] is the running duplicate; stopping discards it and
//! the untouched editing scene takes over again.
//!
//! Mode changes requested with [`SceneManager::request_mode`] (or from
//! another thread through a deferred call) are applied at the start of the
//! next tick, never in the middle of one.

use log::info;

use crate::collaborators::physics::{PhysicsFactory, PhysicsMode};
use crate::collaborators::renderer::SharedRenderer;
use crate::entity::EntityHandle;
use crate::events::sceneevent::SceneEvent;
use crate::resources::deferred::{DeferredCallSender, DeferredCalls};
use crate::resources::dirty::RenderDirty;
use crate::resources::sceneconfig::SceneConfig;
use crate::resources::scenestate::{NextSceneMode, SceneMode};
use crate::scene::Scene;

pub struct SceneManager {
    editor_scene: Scene,
    runtime_scene: Option<Scene>,
    next_mode: NextSceneMode,
    physics_factory: PhysicsFactory,
    deferred: DeferredCalls,
    selected: EntityHandle,
}

impl SceneManager {
    /// Create a manager with an empty editing scene.
    pub fn new(renderer: SharedRenderer, config: SceneConfig, physics_factory: PhysicsFactory) -> Self {
        let physics = physics_factory(PhysicsMode::Editor, &config);
        let editor_scene = Scene::new(renderer, physics, config);
        Self::with_scene(editor_scene, physics_factory)
    }

    /// Create a manager around an existing editing scene.
    pub fn with_scene(editor_scene: Scene, physics_factory: PhysicsFactory) -> Self {
        Self {
            editor_scene,
            runtime_scene: None,
            next_mode: NextSceneMode::new(),
            physics_factory,
            deferred: DeferredCalls::new(),
            selected: EntityHandle::NULL,
        }
    }

    /// The scene currently shown: the running duplicate while playing.
    pub fn scene(&self) -> &Scene {
        self.runtime_scene.as_ref().unwrap_or(&self.editor_scene)
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        match &mut self.runtime_scene {
            Some(scene) => scene,
            None => &mut self.editor_scene,
        }
    }

    pub fn editor_scene(&self) -> &Scene {
        &self.editor_scene
    }

    pub fn editor_scene_mut(&mut self) -> &mut Scene {
        &mut self.editor_scene
    }

    pub fn mode(&self) -> SceneMode {
        if self.runtime_scene.is_some() {
            SceneMode::Running
        } else {
            SceneMode::Editing
        }
    }

    pub fn is_playing(&self) -> bool {
        self.runtime_scene.is_some()
    }

    /// Editing -> Running: duplicate the editing scene with a gameplay
    /// physics world and start its scripts.
    pub fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        self.editor_scene.renderer().borrow_mut().wait_idle();
        let physics = (self.physics_factory)(PhysicsMode::Gameplay, self.editor_scene.config());
        let mut runtime = self.editor_scene.duplicate(physics);
        runtime.on_runtime_start();
        self.runtime_scene = Some(runtime);
        info!("Entered Running mode");
    }

    /// Running -> Editing: stop scripts and discard the running duplicate.
    pub fn stop(&mut self) {
        let Some(mut runtime) = self.runtime_scene.take() else {
            return;
        };
        runtime.renderer().borrow_mut().wait_idle();
        runtime.on_runtime_stop();
        drop(runtime);
        // The renderer holds the duplicate's lists; resend everything.
        self.editor_scene.world.resource_mut::<RenderDirty>().mark_all();
        info!("Entered Editing mode");
    }

    /// Replace the editing scene. A running duplicate is stopped first.
    pub fn open_scene(&mut self, scene: Scene) {
        self.editor_scene.renderer().borrow_mut().wait_idle();
        self.stop();
        self.editor_scene = scene;
        self.editor_scene.world.resource_mut::<RenderDirty>().mark_all();
        self.selected = EntityHandle::NULL;
        info!("Scene opened");
    }

    /// Apply a mode change at the start of the next tick.
    pub fn request_mode(&mut self, mode: SceneMode) {
        self.next_mode.set(mode);
    }

    /// One frame: run deferred calls, apply a pending mode change, then
    /// update the current scene.
    pub fn tick(&mut self, dt: f32) {
        for call in self.deferred.take_pending() {
            call(self);
        }
        if let Some(mode) = self.next_mode.take() {
            match mode {
                SceneMode::Running => self.play(),
                SceneMode::Editing => self.stop(),
            }
        }
        let scene = self.scene_mut();
        scene.on_update(dt);
        scene.camera_input_mut().end_frame();
    }

    /// Route an event to the current scene. Viewport changes also reach the
    /// editing scene while playing so it is in shape when play stops.
    pub fn on_event(&mut self, event: &SceneEvent) {
        if let (Some(_), SceneEvent::ViewportResized { width, height }) = (&self.runtime_scene, event) {
            self.editor_scene.on_viewport_resize(*width, *height);
        }
        self.scene_mut().on_event(event);
    }

    /// Thread-safe handle for queueing work on the simulation thread.
    pub fn deferred_sender(&self) -> DeferredCallSender {
        self.deferred.sender()
    }

    /// The selected entity of the editing scene, or the null handle once it
    /// has been destroyed.
    pub fn selection(&self) -> EntityHandle {
        if self.selected.is_valid(&self.editor_scene) {
            self.selected
        } else {
            EntityHandle::NULL
        }
    }

    pub fn set_selection(&mut self, handle: impl Into<EntityHandle>) {
        self.selected = handle.into();
    }
}
