use bevy_ecs::prelude::Resource;

/// Simulation clock of a scene.
///
/// Updated once per tick by [`update_scene_time`](crate::systems::time::update_scene_time).
/// A running duplicate starts its own clock from zero.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SceneTime {
    pub elapsed: f32,
    pub delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
}

impl Default for SceneTime {
    fn default() -> Self {
        SceneTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl SceneTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
