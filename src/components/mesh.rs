//! Static mesh component.

use bevy_ecs::prelude::*;

use crate::components::spatial::{self, Spatial, SpatialComponent};
use crate::components::transform::Transform;
use crate::entity::SceneComponent;
use crate::resources::dirty::{DirtyFlags, RenderDirty, TransformCategory, TransformDirty};
use crate::scene::Scene;

/// Draws a mesh asset at the owner's transform (plus its own relative offset).
///
/// A mesh without an asset key is not valid: it is not gathered, and removing
/// it does not invalidate the renderer's mesh list.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct StaticMesh {
    pub(crate) spatial: Spatial,
    /// Asset key of the mesh geometry.
    pub mesh: Option<String>,
    /// Asset key of the material; `None` uses the renderer's default.
    pub material: Option<String>,
    pub casts_shadows: bool,
}

impl Default for StaticMesh {
    fn default() -> Self {
        Self {
            spatial: Spatial::default(),
            mesh: None,
            material: None,
            casts_shadows: true,
        }
    }
}

impl StaticMesh {
    pub fn new(mesh: impl Into<String>) -> Self {
        Self {
            mesh: Some(mesh.into()),
            ..Self::default()
        }
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn with_relative(mut self, relative: Transform) -> Self {
        self.spatial = Spatial::new(relative);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.mesh.is_some()
    }
}

impl SceneComponent for StaticMesh {
    fn on_init(scene: &mut Scene, entity: Entity) {
        spatial::attach::<Self>(scene, entity);
    }

    fn on_removed(scene: &mut Scene, entity: Entity) {
        spatial::detach::<Self>(scene, entity);
    }

    fn on_changed(scene: &mut Scene, _entity: Entity) {
        scene.world.resource_mut::<RenderDirty>().mark(DirtyFlags::MESHES);
    }
}

impl SpatialComponent for StaticMesh {
    fn spatial(&self) -> &Spatial {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut Spatial {
        &mut self.spatial
    }

    fn transform_dirty(&self) -> TransformDirty {
        TransformDirty::TransformOnly(TransformCategory::Meshes)
    }
}
