//! Flat renderer-facing snapshots of the scene.
//!
//! [`RenderCache`] holds one list per renderable category. The gather
//! systems in [`crate::systems::render_gather`] rebuild a list only when its
//! category is dirty and record what changed this frame in
//! [`RenderCache::changed`] and the transform batches, which the scene then
//! hands to the renderer collaborator.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

use crate::components::guid::Guid;
use crate::components::transform::Transform;
use crate::resources::dirty::DirtyFlags;

#[derive(Debug, Clone, PartialEq)]
pub struct MeshDraw {
    pub entity: Entity,
    pub guid: Guid,
    pub mesh: String,
    pub material: Option<String>,
    pub transform: Transform,
    pub casts_shadows: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    pub entity: Entity,
    pub texture: Option<String>,
    pub tint: Vec3,
    pub transform: Transform,
    pub casts_shadows: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLightDraw {
    pub entity: Entity,
    pub location: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
    pub casts_shadows: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotLightDraw {
    pub entity: Entity,
    pub location: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub distance: f32,
    pub inner_cutoff: f32,
    pub outer_cutoff: f32,
    pub casts_shadows: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLightDraw {
    pub entity: Entity,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub casts_shadows: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub entity: Entity,
    pub text: String,
    pub font: String,
    pub color: Vec3,
    pub transform: Transform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text2DDraw {
    pub entity: Entity,
    pub text: String,
    pub font: String,
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    pub color: Vec3,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image2DDraw {
    pub entity: Entity,
    pub texture: Option<String>,
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    pub tint: Vec3,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillboardDraw {
    pub entity: Entity,
    pub texture: String,
    pub location: Vec3,
    pub scale: Vec3,
}

/// New world transform of a member whose category membership did not change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformUpdate {
    pub entity: Entity,
    pub transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Vec3,
}

impl DebugLine {
    pub fn new(start: Vec3, end: Vec3, color: Vec3) -> Self {
        Self { start, end, color }
    }
}

#[derive(Resource, Debug, Default)]
pub struct RenderCache {
    pub meshes: Vec<MeshDraw>,
    pub sprites: Vec<SpriteDraw>,
    pub point_lights: Vec<PointLightDraw>,
    pub spot_lights: Vec<SpotLightDraw>,
    pub directional_light: Option<DirectionalLightDraw>,
    pub texts: Vec<TextDraw>,
    pub texts_2d: Vec<Text2DDraw>,
    pub images_2d: Vec<Image2DDraw>,
    pub billboards: Vec<BillboardDraw>,

    /// Radius wireframes of visualized point lights.
    pub point_light_lines: Vec<DebugLine>,
    /// Cone wireframes of visualized spot lights.
    pub spot_light_lines: Vec<DebugLine>,

    /// Categories rebuilt during the current snapshot.
    pub changed: DirtyFlags,
    pub directional_changed: bool,
    pub mesh_transforms: Vec<TransformUpdate>,
    pub sprite_transforms: Vec<TransformUpdate>,
    pub text_transforms: Vec<TransformUpdate>,
}

impl RenderCache {
    /// Forget per-snapshot change records once the renderer has consumed them.
    pub fn end_snapshot(&mut self) {
        self.changed = DirtyFlags::empty();
        self.directional_changed = false;
        self.mesh_transforms.clear();
        self.sprite_transforms.clear();
        self.text_transforms.clear();
    }

    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
            || self.directional_changed
            || !self.mesh_transforms.is_empty()
            || !self.sprite_transforms.is_empty()
            || !self.text_transforms.is_empty()
    }
}
