use glam::Vec2;

/// Input and window events routed into the current scene.
///
/// In Editing mode events go to the editor camera; in Running mode they go to
/// native scripts and the managed script host.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ViewportResized { width: u32, height: u32 },
    KeyPressed { key: String },
    KeyReleased { key: String },
    MouseMoved { delta: Vec2 },
    MouseScrolled { delta: f32 },
    /// Application-defined event forwarded untouched to scripts.
    Custom { name: String },
}
