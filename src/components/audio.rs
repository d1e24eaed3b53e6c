use bevy_ecs::prelude::*;

use crate::components::spatial::{self, Spatial, SpatialComponent};
use crate::entity::SceneComponent;
use crate::scene::Scene;

/// Positional sound emitter.
///
/// Emitters flagged `autoplay` start when the scene enters Running mode.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct AudioSource {
    pub(crate) spatial: Spatial,
    /// Sound asset key.
    pub sound: String,
    pub volume: f32,
    pub looping: bool,
    pub autoplay: bool,
}

impl AudioSource {
    pub fn new(sound: impl Into<String>) -> Self {
        Self {
            spatial: Spatial::default(),
            sound: sound.into(),
            volume: 1.0,
            looping: false,
            autoplay: false,
        }
    }

    pub fn autoplay(mut self) -> Self {
        self.autoplay = true;
        self
    }

    pub fn looped(mut self) -> Self {
        self.looping = true;
        self
    }
}

impl SceneComponent for AudioSource {
    fn on_init(scene: &mut Scene, entity: Entity) {
        spatial::attach::<Self>(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        spatial::detach::<Self>(scene, entity);
    }
}

impl SpatialComponent for AudioSource {
    fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }
}
