//! Managed scripting collaborator interface.
//!
//! The scene resolves nothing itself: it asks the host whether a module
//! exists, asks it to instantiate a script for an entity GUID and then calls
//! lifecycle hooks. Hooks cannot touch the scene directly; they queue
//! [`ScriptCmd`]s on the [`ScriptContext`], which the scene applies right
//! after the hook returns.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Quat, Vec3};

use crate::components::guid::Guid;
use crate::events::sceneevent::SceneEvent;

/// Commands a script can queue for the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCmd {
    SetWorldLocation { guid: Guid, location: Vec3 },
    SetWorldRotation { guid: Guid, rotation: Quat },
    SetRelativeLocation { guid: Guid, location: Vec3 },
    /// `parent == None` detaches the entity.
    SetParent { guid: Guid, parent: Option<Guid> },
    DestroyEntity { guid: Guid },
    PlaySound { sound: String, location: Vec3 },
}

/// Per-hook command queue and read-only frame data.
#[derive(Debug, Default)]
pub struct ScriptContext {
    pub delta: f32,
    pub elapsed: f32,
    commands: Vec<ScriptCmd>,
}

impl ScriptContext {
    pub fn new(delta: f32, elapsed: f32) -> Self {
        Self {
            delta,
            elapsed,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, cmd: ScriptCmd) {
        self.commands.push(cmd);
    }

    pub fn take_commands(&mut self) -> Vec<ScriptCmd> {
        std::mem::take(&mut self.commands)
    }
}

pub trait ScriptHost {
    fn module_exists(&self, module: &str) -> bool;
    /// Create the script object of `guid`. Returns false if it could not be created.
    fn instantiate(&mut self, guid: Guid, module: &str) -> bool;
    fn on_create(&mut self, guid: Guid, ctx: &mut ScriptContext);
    fn on_update(&mut self, guid: Guid, dt: f32, ctx: &mut ScriptContext);
    fn on_destroy(&mut self, guid: Guid, ctx: &mut ScriptContext);
    fn on_event(&mut self, guid: Guid, event: &SceneEvent, ctx: &mut ScriptContext);
    /// Drop the script object of `guid`, if any.
    fn remove_instance(&mut self, guid: Guid);
}

pub type SharedScriptHost = Rc<RefCell<dyn ScriptHost>>;
