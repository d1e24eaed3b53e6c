//! Light components.
//!
//! Point and spot lights are gathered into flat lists that are rebuilt only
//! when their category is dirty. A light with `affects_world == false`
//! contributes nothing to the renderer, so removing one does not dirty its
//! category. The single directional light is resolved every frame.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::components::spatial::{self, Spatial, SpatialComponent};
use crate::components::transform::Transform;
use crate::entity::SceneComponent;
use crate::resources::dirty::{DirtyFlags, RenderDirty, TransformDirty};
use crate::scene::Scene;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct PointLight {
    pub(crate) spatial: Spatial,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
    pub affects_world: bool,
    /// Draw the radius wireframe in the editor.
    pub visualize_radius: bool,
    pub casts_shadows: bool,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            spatial: Spatial::default(),
            color: Vec3::ONE,
            intensity: 1.0,
            radius: 10.0,
            affects_world: true,
            visualize_radius: false,
            casts_shadows: false,
        }
    }
}

impl PointLight {
    pub fn new(color: Vec3, intensity: f32, radius: f32) -> Self {
        Self {
            color,
            intensity,
            radius,
            ..Self::default()
        }
    }

    pub fn with_relative(mut self, relative: Transform) -> Self {
        self.spatial = Spatial::new(relative);
        self
    }
}

impl SceneComponent for PointLight {
    fn on_init(scene: &mut Scene, entity: Entity) {
        spatial::attach::<Self>(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        spatial::detach::<Self>(scene, entity);
    }

    fn on_changed(scene: &mut Scene, _entity: Entity) {
        scene.world.resource_mut::<RenderDirty>().mark(DirtyFlags::POINT_LIGHTS);
    }
}

impl SpatialComponent for PointLight {
    fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }

    fn transform_dirty(&self) -> TransformDirty {
        if self.affects_world || self.visualize_radius {
            TransformDirty::Full(DirtyFlags::POINT_LIGHTS)
        } else {
            TransformDirty::None
        }
    }
}

/// Cone light shining down the owner's forward axis.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub(crate) spatial: Spatial,
    pub color: Vec3,
    pub intensity: f32,
    pub distance: f32,
    /// Inner cone half-angle in degrees.
    pub inner_cutoff: f32,
    /// Outer cone half-angle in degrees.
    pub outer_cutoff: f32,
    pub affects_world: bool,
    pub visualize_distance: bool,
    pub casts_shadows: bool,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            spatial: Spatial::default(),
            color: Vec3::ONE,
            intensity: 1.0,
            distance: 10.0,
            inner_cutoff: 25.0,
            outer_cutoff: 45.0,
            affects_world: true,
            visualize_distance: false,
            casts_shadows: false,
        }
    }
}

impl SpotLight {
    pub fn new(color: Vec3, intensity: f32, distance: f32) -> Self {
        Self {
            color,
            intensity,
            distance,
            ..Self::default()
        }
    }

    pub fn with_cutoffs(mut self, inner: f32, outer: f32) -> Self {
        self.inner_cutoff = inner.min(outer);
        self.outer_cutoff = outer.max(inner);
        self
    }

    pub fn with_relative(mut self, relative: Transform) -> Self {
        self.spatial = Spatial::new(relative);
        self
    }
}

impl SceneComponent for SpotLight {
    fn on_init(scene: &mut Scene, entity: Entity) {
        spatial::attach::<Self>(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        spatial::detach::<Self>(scene, entity);
    }

    fn on_changed(scene: &mut Scene, _entity: Entity) {
        scene.world.resource_mut::<RenderDirty>().mark(DirtyFlags::SPOT_LIGHTS);
    }
}

impl SpatialComponent for SpotLight {
    fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }

    fn transform_dirty(&self) -> TransformDirty {
        if self.affects_world || self.visualize_distance {
            TransformDirty::Full(DirtyFlags::SPOT_LIGHTS)
        } else {
            TransformDirty::None
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub(crate) spatial: Spatial,
    pub color: Vec3,
    pub intensity: f32,
    pub affects_world: bool,
    pub casts_shadows: bool,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            spatial: Spatial::default(),
            color: Vec3::ONE,
            intensity: 1.0,
            affects_world: true,
            casts_shadows: true,
        }
    }
}

impl DirectionalLight {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            ..Self::default()
        }
    }
}

impl SceneComponent for DirectionalLight {
    fn on_init(scene: &mut Scene, entity: Entity) {
        spatial::attach::<Self>(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        spatial::detach::<Self>(scene, entity);
    }
}

impl SpatialComponent for DirectionalLight {
    fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }
}
