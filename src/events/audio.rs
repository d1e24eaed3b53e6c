use glam::Vec3;

use crate::components::guid::Guid;

/// Commands sent *to* the audio collaborator.
///
/// The scene only issues these over a channel; mixing and streaming happen on
/// the other side.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Start a positional sound owned by an entity.
    Play {
        guid: Guid,
        sound: String,
        location: Vec3,
        volume: f32,
        looping: bool,
    },
    /// Fire-and-forget sound requested by a script.
    PlayOneShot { sound: String, location: Vec3 },
    /// Move the listener to the active camera pose.
    SetListener { location: Vec3, forward: Vec3, up: Vec3 },
    StopAll,
    /// Ask the audio thread to exit.
    Shutdown,
}
