//! Scene systems.
//!
//! This module groups everything that advances a scene: hierarchy
//! maintenance, physics glue, script dispatch, the render snapshot and the
//! per-mode update paths.
//!
//! Submodules overview
//! - [`cameracontroller`] – fly controller of the synthesized runtime camera
//! - [`debuglines`] – light radius and cone wireframes
//! - [`duplicate`] – running copy of a scene and deep entity copies
//! - [`hierarchy`] – transform setters, re-parenting and change propagation
//! - [`physics`] – actor creation/release and the physics step
//! - [`render_gather`] – dirty observers, gather schedule and renderer hand-off
//! - [`runtime`] – Editing/Running tick paths, camera resolution, audio listener
//! - [`scripts`] – native and managed script hooks and script commands
//! - [`time`] – update simulation time and delta

pub mod cameracontroller;
pub mod debuglines;
pub mod duplicate;
pub mod hierarchy;
pub mod physics;
pub mod render_gather;
pub mod runtime;
pub mod scripts;
pub mod time;
