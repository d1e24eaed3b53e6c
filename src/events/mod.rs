//! Event and notification types used by the scene runtime.
//!
//! Submodules:
//! - [`audio`] – commands sent to the audio collaborator
//! - [`notification`] – observer fan-out for entity notifications
//! - [`sceneevent`] – input and window events routed into a scene
pub mod audio;
pub mod notification;
pub mod sceneevent;
