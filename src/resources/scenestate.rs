//! Scene mode resources.
//!
//! [`SceneState`] lives in every scene's world and records which update path
//! the scene runs. [`NextSceneMode`] is held by the
//! [`SceneManager`](crate::scenemanager::SceneManager) and marks a requested
//! transition that is applied at the start of the next tick.

use bevy_ecs::prelude::Resource;

/// The two mutually exclusive update regimes of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneMode {
    /// Authoring: free editor camera, non-gameplay physics, no scripts.
    #[default]
    Editing,
    /// Live simulation: scripts, gameplay physics, audio listener tracking.
    Running,
}

/// Representation of a requested next mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NextSceneModes {
    #[default]
    Unchanged,
    Pending(SceneMode),
}

/// Authoritative mode of one scene.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneState {
    mode: SceneMode,
}

impl SceneState {
    pub fn new(mode: SceneMode) -> Self {
        SceneState { mode }
    }

    pub fn get(&self) -> SceneMode {
        self.mode
    }

    pub fn set(&mut self, mode: SceneMode) {
        self.mode = mode;
    }

    pub fn is_running(&self) -> bool {
        self.mode == SceneMode::Running
    }
}

/// Intent to switch the current scene to another mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NextSceneMode {
    next: NextSceneModes,
}

impl NextSceneMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> NextSceneModes {
        self.next
    }

    /// Request a transition to `mode`; the manager applies it on its next tick.
    pub fn set(&mut self, mode: SceneMode) {
        self.next = NextSceneModes::Pending(mode);
    }

    /// Take the pending request, resetting to [`NextSceneModes::Unchanged`].
    pub fn take(&mut self) -> Option<SceneMode> {
        match std::mem::take(&mut self.next) {
            NextSceneModes::Pending(mode) => Some(mode),
            NextSceneModes::Unchanged => None,
        }
    }
}
