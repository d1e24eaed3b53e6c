use bevy_ecs::prelude::*;

use crate::components::spatial::{self, Spatial, SpatialComponent};
use crate::components::transform::Transform;
use crate::entity::SceneComponent;
use crate::scene::Scene;

/// Camera-facing textured quad. Billboards are gathered every frame, so they
/// never touch the dirty state.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Billboard {
    pub(crate) spatial: Spatial,
    pub texture: Option<String>,
}

impl Billboard {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            spatial: Spatial::default(),
            texture: Some(texture.into()),
        }
    }

    pub fn with_relative(mut self, relative: Transform) -> Self {
        self.spatial = Spatial::new(relative);
        self
    }
}

impl SceneComponent for Billboard {
    fn on_init(scene: &mut Scene, entity: Entity) {
        spatial::attach::<Self>(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        spatial::detach::<Self>(scene, entity);
    }
}

impl SpatialComponent for Billboard {
    fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }
}
