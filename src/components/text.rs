//! World-space and screen-space text components.
//!
//! Text without a font cannot be shaped by the renderer, so it is left out of
//! the gathered lists until a font is assigned.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

use crate::components::spatial::{self, Spatial, SpatialComponent};
use crate::components::transform::Transform;
use crate::entity::SceneComponent;
use crate::resources::dirty::{DirtyFlags, RenderDirty, TransformCategory, TransformDirty};
use crate::scene::Scene;

/// Text placed in the 3D scene.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Text {
    pub(crate) spatial: Spatial,
    pub text: String,
    pub font: Option<String>,
    pub color: Vec3,
    pub line_spacing: f32,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            spatial: Spatial::default(),
            text: String::new(),
            font: None,
            color: Vec3::ONE,
            line_spacing: 1.0,
        }
    }
}

impl Text {
    pub fn new(text: impl Into<String>, font: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Some(font.into()),
            ..Self::default()
        }
    }

    pub fn with_relative(mut self, relative: Transform) -> Self {
        self.spatial = Spatial::new(relative);
        self
    }
}

impl SceneComponent for Text {
    fn on_init(scene: &mut Scene, entity: Entity) {
        spatial::attach::<Self>(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        spatial::detach::<Self>(scene, entity);
    }

    fn on_changed(scene: &mut Scene, _entity: Entity) {
        scene.world.resource_mut::<RenderDirty>().mark(DirtyFlags::TEXTS);
    }
}

impl SpatialComponent for Text {
    fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }

    fn transform_dirty(&self) -> TransformDirty {
        TransformDirty::TransformOnly(TransformCategory::Texts)
    }
}

/// Screen-space text, positioned in normalized viewport coordinates.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Text2D {
    pub text: String,
    pub font: Option<String>,
    pub position: Vec2,
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    pub color: Vec3,
    pub opacity: f32,
}

impl Default for Text2D {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: None,
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            color: Vec3::ONE,
            opacity: 1.0,
        }
    }
}

impl Text2D {
    pub fn new(text: impl Into<String>, font: impl Into<String>, position: Vec2) -> Self {
        Self {
            text: text.into(),
            font: Some(font.into()),
            position,
            ..Self::default()
        }
    }
}

impl SceneComponent for Text2D {
    fn on_changed(scene: &mut Scene, _entity: Entity) {
        scene.world.resource_mut::<RenderDirty>().mark(DirtyFlags::TEXTS_2D);
    }
}
