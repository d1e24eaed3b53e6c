//! Recoverable error types for the scene runtime.
//!
//! Programmer errors (adding a component twice, reading a missing one,
//! touching a destroyed entity) are not represented here; those panic.

use std::path::PathBuf;

use bevy_ecs::entity::Entity;
use thiserror::Error;

use crate::components::guid::Guid;

#[derive(Debug, Error)]
pub enum SceneError {
    /// An entity was asked to become its own parent.
    #[error("entity {entity:?} cannot be its own parent")]
    SelfParent { entity: Entity },

    /// The requested parent is a descendant of the entity being re-parented.
    #[error("parenting {child:?} under {parent:?} would create a hierarchy cycle")]
    HierarchyCycle { child: Entity, parent: Entity },

    /// A handle did not resolve to a live entity of this scene.
    #[error("entity handle does not resolve to a live entity")]
    InvalidEntity,

    /// The physics collaborator declined to create an actor.
    #[error("physics actor for {guid} was refused: {reason}")]
    ActorRefused { guid: Guid, reason: String },

    #[error("failed to load config file {path:?}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("failed to save config file {path:?}: {reason}")]
    ConfigSave { path: PathBuf, reason: String },
}

pub type SceneResult<T> = Result<T, SceneError>;
