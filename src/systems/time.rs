//! Time update system.
//!
//! Updates the scene's [`SceneTime`](crate::resources::scenetime::SceneTime)
//! resource once per tick, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::scenetime::SceneTime;

/// Update elapsed and delta seconds on the `SceneTime` resource and return
/// the scaled delta.
///
/// `dt` is expected to be the unscaled frame delta in seconds.
pub fn update_scene_time(world: &mut World, dt: f32) -> f32 {
    let mut st = world.resource_mut::<SceneTime>();
    let scaled_dt = dt.max(0.0) * st.time_scale;
    st.elapsed += scaled_dt;
    st.delta = scaled_dt;
    st.frame_count += 1;
    scaled_dt
}
