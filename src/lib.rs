//! Aberred Scene library.
//!
//! Runtime core of a 3D scene: entity handles, a transform hierarchy with
//! change notifications, deferred destruction, a dirty-tracked render
//! snapshot and the Editing/Running state machine that drives physics,
//! scripting and audio collaborators.
//!
//! # Project Structure
//!
//! - [`scene`] – the scene aggregate and its lifecycle entry points
//! - [`entity`] – entity handles and component/transform access
//! - [`scenemanager`] – editing scene, running duplicate and mode switches
//! - [`components`] – ECS components (transform, meshes, lights, cameras, ...)
//! - [`resources`] – per-scene ECS resources (dirty state, render cache, time, ...)
//! - [`systems`] – hierarchy, physics glue, scripts, render gather, tick paths
//! - [`events`] – notifications, scene events and audio commands
//! - [`collaborators`] – renderer, physics, scripting and audio interfaces
//! - [`errors`] – recoverable error types

pub mod collaborators;
pub mod components;
pub mod entity;
pub mod errors;
pub mod events;
pub mod resources;
pub mod scene;
pub mod scenemanager;
pub mod systems;
