//! Renderer collaborator interface.
//!
//! The scene hands the renderer flat per-category lists (only when a category
//! was rebuilt), incremental transform batches for categories whose
//! membership did not change, and per-frame billboards and debug lines. One
//! renderer instance is shared between the editing scene and its running
//! duplicate so GPU resources survive mode switches.

use std::cell::RefCell;
use std::rc::Rc;

use crate::components::camera::CameraView;
use crate::resources::rendercache::{
    BillboardDraw, DebugLine, DirectionalLightDraw, Image2DDraw, MeshDraw, PointLightDraw,
    SpotLightDraw, SpriteDraw, Text2DDraw, TextDraw, TransformUpdate,
};

/// Opaque handle of the renderer's final color image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageHandle(pub u64);

pub trait SceneRenderer {
    fn set_meshes(&mut self, meshes: &[MeshDraw]);
    fn update_mesh_transforms(&mut self, updates: &[TransformUpdate]);
    fn set_sprites(&mut self, sprites: &[SpriteDraw]);
    fn update_sprite_transforms(&mut self, updates: &[TransformUpdate]);
    fn set_point_lights(&mut self, lights: &[PointLightDraw]);
    fn set_spot_lights(&mut self, lights: &[SpotLightDraw]);
    fn set_directional_light(&mut self, light: Option<&DirectionalLightDraw>);
    fn set_texts(&mut self, texts: &[TextDraw]);
    fn update_text_transforms(&mut self, updates: &[TransformUpdate]);
    fn set_texts_2d(&mut self, texts: &[Text2DDraw]);
    fn set_images_2d(&mut self, images: &[Image2DDraw]);

    /// Per-frame data.
    fn set_billboards(&mut self, billboards: &[BillboardDraw]);
    fn set_debug_lines(&mut self, lines: &[DebugLine]);

    fn set_grid_enabled(&mut self, enabled: bool);
    fn set_viewport_size(&mut self, width: u32, height: u32);
    fn render(&mut self, view: &CameraView);
    fn output_image(&self) -> ImageHandle;

    /// Block until in-flight GPU work finished. Called before scene swaps.
    fn wait_idle(&mut self);
}

pub type SharedRenderer = Rc<RefCell<dyn SceneRenderer>>;

/// Call counters of a [`RecordingRenderer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub mesh_sets: u32,
    pub mesh_transform_batches: u32,
    pub sprite_sets: u32,
    pub sprite_transform_batches: u32,
    pub point_light_sets: u32,
    pub spot_light_sets: u32,
    pub directional_light_sets: u32,
    pub text_sets: u32,
    pub text_transform_batches: u32,
    pub text_2d_sets: u32,
    pub image_2d_sets: u32,
    pub frames: u32,
    pub wait_idle_calls: u32,
}

/// Headless renderer that keeps the last data it was given.
///
/// Used by the command-line driver and handy as a test double.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub stats: RendererStats,
    pub meshes: Vec<MeshDraw>,
    pub sprites: Vec<SpriteDraw>,
    pub point_lights: Vec<PointLightDraw>,
    pub spot_lights: Vec<SpotLightDraw>,
    pub directional_light: Option<DirectionalLightDraw>,
    pub texts: Vec<TextDraw>,
    pub texts_2d: Vec<Text2DDraw>,
    pub images_2d: Vec<Image2DDraw>,
    pub billboards: Vec<BillboardDraw>,
    pub debug_lines: Vec<DebugLine>,
    pub last_mesh_transforms: Vec<TransformUpdate>,
    pub last_sprite_transforms: Vec<TransformUpdate>,
    pub last_text_transforms: Vec<TransformUpdate>,
    pub grid_enabled: bool,
    pub viewport: (u32, u32),
    pub last_view: Option<CameraView>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<RecordingRenderer>> {
        Rc::new(RefCell::new(Self::new()))
    }
}

impl SceneRenderer for RecordingRenderer {
    fn set_meshes(&mut self, meshes: &[MeshDraw]) {
        self.stats.mesh_sets += 1;
        self.meshes = meshes.to_vec();
    }

    fn update_mesh_transforms(&mut self, updates: &[TransformUpdate]) {
        self.stats.mesh_transform_batches += 1;
        for update in updates {
            if let Some(mesh) = self.meshes.iter_mut().find(|m| m.entity == update.entity) {
                mesh.transform = update.transform;
            }
        }
        self.last_mesh_transforms = updates.to_vec();
    }

    fn set_sprites(&mut self, sprites: &[SpriteDraw]) {
        self.stats.sprite_sets += 1;
        self.sprites = sprites.to_vec();
    }

    fn update_sprite_transforms(&mut self, updates: &[TransformUpdate]) {
        self.stats.sprite_transform_batches += 1;
        for update in updates {
            if let Some(sprite) = self.sprites.iter_mut().find(|s| s.entity == update.entity) {
                sprite.transform = update.transform;
            }
        }
        self.last_sprite_transforms = updates.to_vec();
    }

    fn set_point_lights(&mut self, lights: &[PointLightDraw]) {
        self.stats.point_light_sets += 1;
        self.point_lights = lights.to_vec();
    }

    fn set_spot_lights(&mut self, lights: &[SpotLightDraw]) {
        self.stats.spot_light_sets += 1;
        self.spot_lights = lights.to_vec();
    }

    fn set_directional_light(&mut self, light: Option<&DirectionalLightDraw>) {
        self.stats.directional_light_sets += 1;
        self.directional_light = light.cloned();
    }

    fn set_texts(&mut self, texts: &[TextDraw]) {
        self.stats.text_sets += 1;
        self.texts = texts.to_vec();
    }

    fn update_text_transforms(&mut self, updates: &[TransformUpdate]) {
        self.stats.text_transform_batches += 1;
        for update in updates {
            if let Some(text) = self.texts.iter_mut().find(|t| t.entity == update.entity) {
                text.transform = update.transform;
            }
        }
        self.last_text_transforms = updates.to_vec();
    }

    fn set_texts_2d(&mut self, texts: &[Text2DDraw]) {
        self.stats.text_2d_sets += 1;
        self.texts_2d = texts.to_vec();
    }

    fn set_images_2d(&mut self, images: &[Image2DDraw]) {
        self.stats.image_2d_sets += 1;
        self.images_2d = images.to_vec();
    }

    fn set_billboards(&mut self, billboards: &[BillboardDraw]) {
        self.billboards = billboards.to_vec();
    }

    fn set_debug_lines(&mut self, lines: &[DebugLine]) {
        self.debug_lines = lines.to_vec();
    }

    fn set_grid_enabled(&mut self, enabled: bool) {
        self.grid_enabled = enabled;
    }

    fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn render(&mut self, view: &CameraView) {
        self.stats.frames += 1;
        self.last_view = Some(*view);
    }

    fn output_image(&self) -> ImageHandle {
        ImageHandle(u64::from(self.stats.frames))
    }

    fn wait_idle(&mut self) {
        self.stats.wait_idle_calls += 1;
    }
}
