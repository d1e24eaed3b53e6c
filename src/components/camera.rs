//! Scene camera component and the view handed to the renderer.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};

use crate::components::spatial::{self, Spatial, SpatialComponent};
use crate::entity::SceneComponent;
use crate::scene::Scene;

/// Perspective camera attached to an entity.
///
/// In Running mode the first camera flagged `primary` drives rendering and
/// the audio listener. Cameras without `fixed_aspect_ratio` follow the
/// viewport's aspect ratio.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Camera {
    pub(crate) spatial: Spatial,
    pub primary: bool,
    pub fixed_aspect_ratio: bool,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            spatial: Spatial::default(),
            primary: false,
            fixed_aspect_ratio: false,
            fov_y: 45.0,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn primary() -> Self {
        Self {
            primary: true,
            ..Self::default()
        }
    }

    /// Fit the aspect ratio to a viewport unless it is fixed.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if self.fixed_aspect_ratio || width == 0 || height == 0 {
            return;
        }
        self.aspect_ratio = width as f32 / height as f32;
    }

    pub fn view(&self) -> CameraView {
        let world = self.spatial.world();
        CameraView {
            location: world.location,
            rotation: world.rotation,
            fov_y: self.fov_y,
            aspect_ratio: self.aspect_ratio,
            near: self.near,
            far: self.far,
        }
    }
}

impl SceneComponent for Camera {
    fn on_init(scene: &mut Scene, entity: Entity) {
        spatial::attach::<Self>(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        spatial::detach::<Self>(scene, entity);
    }
}

impl SpatialComponent for Camera {
    fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }
}

/// Camera pose and projection used for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub location: Vec3,
    pub rotation: Quat,
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraView {
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}
