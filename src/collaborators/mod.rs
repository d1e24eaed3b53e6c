//! Narrow interfaces to the subsystems the scene drives but does not own.
//!
//! - [`audio`] – background audio thread fed by the scenes' command channel
//! - [`renderer`] – consumes flat draw lists, transform batches and debug lines
//! - [`physics`] – GUID-keyed actors, stepping and pose pull-back
//! - [`kinematic`] – built-in fixed-step kinematic physics backend
//! - [`scripting`] – managed script host lifecycle hooks and command queue
pub mod audio;
pub mod kinematic;
pub mod physics;
pub mod renderer;
pub mod scripting;
