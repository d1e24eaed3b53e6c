use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::components::spatial::{self, Spatial, SpatialComponent};
use crate::components::transform::Transform;
use crate::entity::SceneComponent;
use crate::resources::dirty::{DirtyFlags, RenderDirty, TransformCategory, TransformDirty};
use crate::scene::Scene;

/// Textured quad placed in the 3D scene.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Sprite {
    pub(crate) spatial: Spatial,
    /// Texture key; `None` draws the renderer's placeholder.
    pub texture: Option<String>,
    pub tint: Vec3,
    pub casts_shadows: bool,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            spatial: Spatial::default(),
            texture: None,
            tint: Vec3::ONE,
            casts_shadows: false,
        }
    }
}

impl Sprite {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: Some(texture.into()),
            ..Self::default()
        }
    }

    pub fn with_relative(mut self, relative: Transform) -> Self {
        self.spatial = Spatial::new(relative);
        self
    }
}

impl SceneComponent for Sprite {
    fn on_init(scene: &mut Scene, entity: Entity) {
        spatial::attach::<Self>(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        spatial::detach::<Self>(scene, entity);
    }

    fn on_changed(scene: &mut Scene, _entity: Entity) {
        scene.world.resource_mut::<RenderDirty>().mark(DirtyFlags::SPRITES);
    }
}

impl SpatialComponent for Sprite {
    fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }

    fn transform_dirty(&self) -> TransformDirty {
        TransformDirty::TransformOnly(TransformCategory::Sprites)
    }
}
