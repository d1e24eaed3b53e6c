//! ECS resources stored in every scene's world.
//!
//! Overview
//! - `camerainput` – per-frame camera movement/look input
//! - `deferred` – cross-thread closure queue drained once per tick
//! - `dirty` – per-category render dirty flags and transform-only sets
//! - `editorcamera` – free-flying editor camera and the shared fly logic
//! - `rendercache` – flat renderer-facing snapshots of the scene
//! - `sceneconfig` – INI-backed runtime configuration
//! - `scenestate` – current and requested scene mode
//! - `scenetime` – simulation clock of a scene
pub mod camerainput;
pub mod deferred;
pub mod dirty;
pub mod editorcamera;
pub mod rendercache;
pub mod sceneconfig;
pub mod scenestate;
pub mod scenetime;
