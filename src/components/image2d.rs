use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

use crate::entity::SceneComponent;
use crate::resources::dirty::{DirtyFlags, RenderDirty};
use crate::scene::Scene;

/// Screen-space image, positioned in normalized viewport coordinates.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Image2D {
    pub texture: Option<String>,
    pub position: Vec2,
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    pub tint: Vec3,
    pub opacity: f32,
}

impl Default for Image2D {
    fn default() -> Self {
        Self {
            texture: None,
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            tint: Vec3::ONE,
            opacity: 1.0,
        }
    }
}

impl Image2D {
    pub fn new(texture: impl Into<String>, position: Vec2) -> Self {
        Self {
            texture: Some(texture.into()),
            position,
            ..Self::default()
        }
    }
}

impl SceneComponent for Image2D {
    fn on_changed(scene: &mut Scene, _entity: Entity) {
        scene.world.resource_mut::<RenderDirty>().mark(DirtyFlags::IMAGES_2D);
    }
}
