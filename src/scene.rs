//! The scene aggregate.
//!
//! A [`Scene`] owns the component table (a `bevy_ecs` [`World`]), the
//! pending-destruction queue, the GUID lookup, the notification hub and the
//! handles of its collaborators (renderer, physics, scripting, audio). All
//! mutation goes through [`Scene::entity_mut`] or the lifecycle methods here,
//! which keep the hierarchy, observer and dirty invariants intact.
//!
//! Per-frame behaviour lives in [`crate::systems`]; the methods at the bottom
//! of this file are the entry points the application shell and the
//! [`SceneManager`](crate::scenemanager::SceneManager) call.

use bevy_ecs::prelude::*;
use crossbeam_channel::Sender;
use log::{debug, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::collaborators::physics::PhysicsBackend;
use crate::collaborators::renderer::SharedRenderer;
use crate::collaborators::scripting::SharedScriptHost;
use crate::components::camera::Camera;
use crate::components::creationindex::CreationIndex;
use crate::components::guid::Guid;
use crate::components::ownership::Ownership;
use crate::components::scenename::SceneName;
use crate::components::transform::EntityTransform;
use crate::entity::{EntityHandle, SceneEntityMut, SceneEntityRef};
use crate::events::audio::AudioCmd;
use crate::events::notification::{Notification, NotificationHub};
use crate::events::sceneevent::SceneEvent;
use crate::resources::camerainput::CameraInput;
use crate::resources::dirty::RenderDirty;
use crate::resources::editorcamera::EditorCamera;
use crate::resources::rendercache::RenderCache;
use crate::resources::sceneconfig::SceneConfig;
use crate::resources::scenestate::{SceneMode, SceneState};
use crate::resources::scenetime::SceneTime;
use crate::systems::{duplicate, hierarchy, physics, render_gather, runtime, scripts};

pub struct Scene {
    pub(crate) world: World,
    pub(crate) render_schedule: Schedule,
    pub(crate) notifications: NotificationHub,
    pub(crate) guid_index: FxHashMap<Guid, Entity>,
    next_creation_index: u64,
    pub(crate) pending_destroy: Vec<Entity>,
    pub(crate) renderer: SharedRenderer,
    pub(crate) physics: Box<dyn PhysicsBackend>,
    pub(crate) scripts: Option<SharedScriptHost>,
    /// GUIDs with a live object in the script host.
    pub(crate) script_instances: FxHashSet<Guid>,
    pub(crate) audio: Option<Sender<AudioCmd>>,
    /// Camera synthesized in Running mode when the author placed none.
    pub(crate) runtime_camera: Option<Entity>,
    pub(crate) viewport: (u32, u32),
    /// Cleared by the shell while a UI element owns the input focus.
    pub can_update_editor_camera: bool,
}

impl Scene {
    pub fn new(renderer: SharedRenderer, physics: Box<dyn PhysicsBackend>, config: SceneConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(SceneState::default());
        world.insert_resource(SceneTime::default().with_time_scale(config.time_scale));
        world.insert_resource(RenderDirty::new());
        world.insert_resource(RenderCache::default());
        world.insert_resource(CameraInput::default());
        world.insert_resource(EditorCamera::new(config.camera_speed, config.camera_fov));
        world.insert_resource(config);
        render_gather::register_dirty_observers(&mut world);

        info!("Scene created");
        Self {
            world,
            render_schedule: render_gather::build_render_schedule(),
            notifications: NotificationHub::new(),
            guid_index: FxHashMap::default(),
            next_creation_index: 0,
            pending_destroy: Vec::new(),
            renderer,
            physics,
            scripts: None,
            script_instances: FxHashSet::default(),
            audio: None,
            runtime_camera: None,
            viewport: (0, 0),
            can_update_editor_camera: true,
        }
    }

    pub fn with_script_host(mut self, host: SharedScriptHost) -> Self {
        self.scripts = Some(host);
        self
    }

    pub fn with_audio(mut self, audio: Sender<AudioCmd>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn set_script_host(&mut self, host: Option<SharedScriptHost>) {
        self.scripts = host;
    }

    pub fn set_audio_sender(&mut self, audio: Option<Sender<AudioCmd>>) {
        self.audio = audio;
    }

    /// Running copy of this scene sharing its renderer, script host and audio
    /// channel. Entities keep their GUIDs; `physics` is the copy's own world.
    pub fn duplicate(&self, physics: Box<dyn PhysicsBackend>) -> Scene {
        duplicate::duplicate_scene(self, physics)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Read-only view of the component table.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn mode(&self) -> SceneMode {
        self.world.resource::<SceneState>().get()
    }

    pub fn is_running(&self) -> bool {
        self.mode() == SceneMode::Running
    }

    pub(crate) fn set_mode(&mut self, mode: SceneMode) {
        self.world.resource_mut::<SceneState>().set(mode);
    }

    pub fn config(&self) -> &SceneConfig {
        self.world.resource::<SceneConfig>()
    }

    pub fn time(&self) -> &SceneTime {
        self.world.resource::<SceneTime>()
    }

    pub fn dirty(&self) -> &RenderDirty {
        self.world.resource::<RenderDirty>()
    }

    pub fn render_cache(&self) -> &RenderCache {
        self.world.resource::<RenderCache>()
    }

    pub fn camera_input_mut(&mut self) -> Mut<'_, CameraInput> {
        self.world.resource_mut::<CameraInput>()
    }

    pub fn editor_camera(&self) -> &EditorCamera {
        self.world.resource::<EditorCamera>()
    }

    pub fn editor_camera_mut(&mut self) -> Mut<'_, EditorCamera> {
        self.world.resource_mut::<EditorCamera>()
    }

    pub fn renderer(&self) -> SharedRenderer {
        self.renderer.clone()
    }

    pub fn physics(&self) -> &dyn PhysicsBackend {
        self.physics.as_ref()
    }

    pub fn notifications(&self) -> &NotificationHub {
        &self.notifications
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    // ---------------------------------------------------------------------
    // Entity lifecycle
    // ---------------------------------------------------------------------

    /// Create an entity with a fresh GUID.
    pub fn create_entity(&mut self, name: &str) -> EntityHandle {
        self.create_entity_with_guid(Guid::new(), name)
    }

    /// Create an entity with a known GUID (persistence and duplication path).
    ///
    /// # Panics
    /// If `guid` is null or already used by a live entity of this scene.
    pub fn create_entity_with_guid(&mut self, guid: Guid, name: &str) -> EntityHandle {
        assert!(!guid.is_null(), "create_entity_with_guid: null GUID");
        assert!(
            !self.guid_index.contains_key(&guid),
            "create_entity_with_guid: GUID {} already in use",
            guid
        );
        let entity = self
            .world
            .spawn((
                guid,
                CreationIndex(self.next_creation_index),
                SceneName::new(name),
                EntityTransform::default(),
                Ownership::default(),
            ))
            .id();
        self.next_creation_index += 1;
        self.guid_index.insert(guid, entity);
        debug!("Created entity {:?} '{}' ({})", entity, name, guid);
        EntityHandle::from(entity)
    }

    /// Deep-copy `source` and its subtree. Copies get fresh GUIDs and the
    /// source's world pose; the copy of a child is parented to the copy of
    /// its parent.
    pub fn create_from_entity(&mut self, source: impl Into<EntityHandle>) -> EntityHandle {
        let source = self.expect_alive(source.into(), "create_from_entity");
        duplicate::copy_entity_tree(self, source)
    }

    /// Queue an entity for destruction at the start of the next tick.
    ///
    /// In Running mode the entity's script destroy hooks run immediately.
    /// The entity stays readable until [`Scene::flush_pending_destructions`].
    ///
    /// # Panics
    /// If the handle does not resolve to a live entity.
    pub fn destroy_entity(&mut self, handle: impl Into<EntityHandle>) {
        let entity = self.expect_alive(handle.into(), "destroy_entity");
        if self.pending_destroy.contains(&entity) {
            return;
        }
        self.pending_destroy.push(entity);
        if self.is_running() {
            scripts::on_entity_destroying(self, entity);
        }
        debug!("Entity {:?} queued for destruction", entity);
    }

    pub fn is_pending_destruction(&self, handle: impl Into<EntityHandle>) -> bool {
        handle
            .into()
            .entity()
            .is_some_and(|e| self.pending_destroy.contains(&e))
    }

    /// Erase every queued entity: release its physics actor and script
    /// instance, hand its children to its own parent, drop its observers and
    /// GUID, then despawn it.
    pub fn flush_pending_destructions(&mut self) {
        if self.pending_destroy.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_destroy);
        for entity in pending {
            if !self.contains_entity(entity) {
                continue;
            }
            physics::release_entity(self, entity);
            scripts::release_script_instance(self, entity);
            hierarchy::detach_for_destruction(self, entity);
            self.notifications.remove_entity(entity);
            if let Some(guid) = self.world.get::<Guid>(entity).copied() {
                self.guid_index.remove(&guid);
            }
            if self.runtime_camera == Some(entity) {
                self.runtime_camera = None;
            }
            self.world.despawn(entity);
            debug!("Destroyed entity {:?}", entity);
        }
    }

    /// Release every entity and collaborator resource. In Running mode the
    /// script destroy hooks run first.
    pub fn clear_scene(&mut self) {
        if self.is_running() {
            scripts::destroy_all_scripts(self);
        }
        self.release_collaborators();
        for entity in self.entities() {
            self.world.despawn(entity.id());
        }
        self.notifications.clear();
        self.guid_index.clear();
        self.pending_destroy.clear();
        self.runtime_camera = None;
        self.world.resource_mut::<RenderDirty>().mark_all();
        info!("Scene cleared");
    }

    fn release_collaborators(&mut self) {
        self.physics.reset();
        if let Some(host) = self.scripts.clone() {
            let mut host = host.borrow_mut();
            for guid in self.script_instances.drain() {
                host.remove_instance(guid);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    pub(crate) fn contains_entity(&self, entity: Entity) -> bool {
        self.world.get::<Guid>(entity).is_some()
    }

    /// Whether the handle resolves to a live entity of this scene.
    pub fn contains(&self, handle: impl Into<EntityHandle>) -> bool {
        handle.into().entity().is_some_and(|e| self.contains_entity(e))
    }

    pub(crate) fn expect_alive(&self, handle: EntityHandle, op: &str) -> Entity {
        match handle.entity() {
            Some(entity) if self.contains_entity(entity) => entity,
            _ => panic!("{}: handle {:?} does not resolve to a live entity", op, handle),
        }
    }

    /// The live entity carrying `guid`, or the null handle.
    pub fn entity_by_guid(&self, guid: Guid) -> EntityHandle {
        self.guid_index
            .get(&guid)
            .copied()
            .map(EntityHandle::from)
            .unwrap_or_default()
    }

    /// Read access through an entity handle.
    ///
    /// # Panics
    /// If the handle does not resolve to a live entity.
    pub fn entity(&self, handle: impl Into<EntityHandle>) -> SceneEntityRef<'_> {
        let entity = self.expect_alive(handle.into(), "entity");
        SceneEntityRef::new(self, entity)
    }

    /// Mutable access through an entity handle.
    ///
    /// # Panics
    /// If the handle does not resolve to a live entity.
    pub fn entity_mut(&mut self, handle: impl Into<EntityHandle>) -> SceneEntityMut<'_> {
        let entity = self.expect_alive(handle.into(), "entity_mut");
        SceneEntityMut::new(self, entity)
    }

    /// Every live scene entity, in creation order.
    pub fn entities(&self) -> Vec<EntityHandle> {
        self.entities_in_creation_order()
            .into_iter()
            .map(EntityHandle::from)
            .collect()
    }

    pub fn entity_count(&self) -> usize {
        self.guid_index.len()
    }

    /// Entities with a display name, sorted by creation order. Entities
    /// without a [`SceneName`] (such as the synthesized runtime camera) are
    /// not listed.
    pub fn named_entities(&self) -> Vec<(EntityHandle, String)> {
        self.entities_in_creation_order()
            .into_iter()
            .filter_map(|e| {
                self.world
                    .get::<SceneName>(e)
                    .map(|name| (EntityHandle::from(e), name.as_str().to_string()))
            })
            .collect()
    }

    /// Earliest-created camera flagged primary, or the null handle.
    pub fn primary_camera_entity(&self) -> EntityHandle {
        self.entities_in_creation_order()
            .into_iter()
            .find(|e| self.world.get::<Camera>(*e).is_some_and(|c| c.primary))
            .map(EntityHandle::from)
            .unwrap_or_default()
    }

    /// Creation sequence number of a live scene entity.
    pub(crate) fn creation_index(&self, entity: Entity) -> Option<CreationIndex> {
        self.world.get::<CreationIndex>(entity).copied()
    }

    pub(crate) fn entities_in_creation_order(&self) -> Vec<Entity> {
        let mut entities: Vec<(CreationIndex, Entity)> = self
            .guid_index
            .values()
            .filter_map(|e| self.creation_index(*e).map(|index| (index, *e)))
            .collect();
        entities.sort_unstable_by_key(|(index, _)| *index);
        entities.into_iter().map(|(_, e)| e).collect()
    }

    /// Camera synthesized for Running mode, or the null handle.
    pub fn runtime_camera(&self) -> EntityHandle {
        self.runtime_camera.map(EntityHandle::from).unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    /// Deliver `notification` to every observer of `subject`, in
    /// registration order.
    pub fn notify(&mut self, subject: Entity, notification: Notification) {
        let observers = self.notifications.observers(subject);
        for entry in observers {
            (entry.on_notify)(self, subject, notification);
        }
    }

    // ---------------------------------------------------------------------
    // Frame entry points
    // ---------------------------------------------------------------------

    /// Advance one tick using the update path of the current mode.
    pub fn on_update(&mut self, dt: f32) {
        match self.mode() {
            SceneMode::Editing => runtime::on_update_editor(self, dt),
            SceneMode::Running => runtime::on_update_runtime(self, dt),
        }
    }

    pub fn on_update_editor(&mut self, dt: f32) {
        runtime::on_update_editor(self, dt);
    }

    pub fn on_update_runtime(&mut self, dt: f32) {
        runtime::on_update_runtime(self, dt);
    }

    /// Enter Running mode: instantiate scripts, run their create hooks and
    /// start autoplay audio.
    pub fn on_runtime_start(&mut self) {
        runtime::on_runtime_start(self);
    }

    /// Leave Running mode: run script destroy hooks, drop script instances
    /// and reset physics.
    pub fn on_runtime_stop(&mut self) {
        runtime::on_runtime_stop(self);
    }

    pub fn on_event(&mut self, event: &SceneEvent) {
        runtime::on_event(self, event);
    }

    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        runtime::on_viewport_resize(self, width, height);
    }

    /// Produce this frame's render snapshot and hand it to the renderer.
    pub fn render_scene(&mut self) {
        render_gather::render_scene(self);
    }

    pub(crate) fn send_audio(&self, cmd: AudioCmd) {
        if let Some(audio) = &self.audio
            && audio.send(cmd).is_err()
        {
            warn!("Audio channel closed, dropping command");
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.release_collaborators();
        debug!("Scene dropped");
    }
}
