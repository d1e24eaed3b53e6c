//! Render-data snapshot.
//!
//! Two halves:
//!
//! - Lifecycle observers registered once per scene turn component additions
//!   and removals into [`RenderDirty`] flags. Removing a component that never
//!   contributed to the renderer (a mesh without an asset, a light that
//!   neither lights the world nor shows its radius) flags nothing.
//! - The render schedule rebuilds each dirty category into the
//!   [`RenderCache`] exactly once, collects transform-only batches for the
//!   categories that were not rebuilt, and refreshes the per-frame data
//!   (directional light, billboards).
//!
//! [`render_scene`] runs the schedule and hands the changed parts of the
//! cache to the renderer collaborator, then clears all dirty state.

use bevy_ecs::lifecycle::{Add, Remove};
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::components::billboard::Billboard;
use crate::components::camera::Camera;
use crate::components::guid::Guid;
use crate::components::image2d::Image2D;
use crate::components::light::{DirectionalLight, PointLight, SpotLight};
use crate::components::mesh::StaticMesh;
use crate::components::sprite::Sprite;
use crate::components::text::{Text, Text2D};
use crate::components::transform::Transform;
use crate::resources::dirty::{DirtyFlags, RenderDirty, TransformCategory};
use crate::resources::rendercache::{
    BillboardDraw, DirectionalLightDraw, Image2DDraw, MeshDraw, PointLightDraw, RenderCache,
    SpotLightDraw, SpriteDraw, Text2DDraw, TextDraw, TransformUpdate,
};
use crate::resources::sceneconfig::SceneConfig;
use crate::resources::scenestate::SceneState;
use crate::scene::Scene;
use crate::systems::debuglines;
use crate::systems::runtime;

pub const POINT_LIGHT_ICON: &str = "editor/icons/point_light";
pub const SPOT_LIGHT_ICON: &str = "editor/icons/spot_light";
pub const DIRECTIONAL_LIGHT_ICON: &str = "editor/icons/directional_light";
pub const CAMERA_ICON: &str = "editor/icons/camera";

// -------------------------------------------------------------------------
// Dirty observers
// -------------------------------------------------------------------------

fn font_is_set(font: Option<&str>) -> bool {
    font.is_some_and(|f| !f.is_empty())
}

/// Wire component add/remove signals to the dirty flags.
pub fn register_dirty_observers(world: &mut World) {
    world.add_observer(|_ev: On<Add, StaticMesh>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::MESHES);
    });
    world.add_observer(
        |ev: On<Remove, StaticMesh>, meshes: Query<&StaticMesh>, mut dirty: ResMut<RenderDirty>| {
            if meshes.get(ev.entity).is_ok_and(|m| m.is_valid()) {
                dirty.mark(DirtyFlags::MESHES);
            }
        },
    );

    world.add_observer(|_ev: On<Add, Sprite>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::SPRITES);
    });
    world.add_observer(|_ev: On<Remove, Sprite>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::SPRITES);
    });

    world.add_observer(|_ev: On<Add, PointLight>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::POINT_LIGHTS);
    });
    world.add_observer(
        |ev: On<Remove, PointLight>, lights: Query<&PointLight>, mut dirty: ResMut<RenderDirty>| {
            if lights
                .get(ev.entity)
                .is_ok_and(|l| l.affects_world || l.visualize_radius)
            {
                dirty.mark(DirtyFlags::POINT_LIGHTS);
            }
        },
    );

    world.add_observer(|_ev: On<Add, SpotLight>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::SPOT_LIGHTS);
    });
    world.add_observer(
        |ev: On<Remove, SpotLight>, lights: Query<&SpotLight>, mut dirty: ResMut<RenderDirty>| {
            if lights
                .get(ev.entity)
                .is_ok_and(|l| l.affects_world || l.visualize_distance)
            {
                dirty.mark(DirtyFlags::SPOT_LIGHTS);
            }
        },
    );

    world.add_observer(|_ev: On<Add, Text>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::TEXTS);
    });
    world.add_observer(
        |ev: On<Remove, Text>, texts: Query<&Text>, mut dirty: ResMut<RenderDirty>| {
            if texts.get(ev.entity).is_ok_and(|t| font_is_set(t.font.as_deref())) {
                dirty.mark(DirtyFlags::TEXTS);
            }
        },
    );

    world.add_observer(|_ev: On<Add, Text2D>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::TEXTS_2D);
    });
    world.add_observer(|_ev: On<Remove, Text2D>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::TEXTS_2D);
    });

    world.add_observer(|_ev: On<Add, Image2D>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::IMAGES_2D);
    });
    world.add_observer(|_ev: On<Remove, Image2D>, mut dirty: ResMut<RenderDirty>| {
        dirty.mark(DirtyFlags::IMAGES_2D);
    });
}

// -------------------------------------------------------------------------
// Gather systems
// -------------------------------------------------------------------------

fn transform_updates<T: Component>(
    dirty: &RenderDirty,
    category: TransformCategory,
    query: &Query<&T>,
    world_of: impl Fn(&T) -> Option<Transform>,
) -> Vec<TransformUpdate> {
    let mut updates: Vec<TransformUpdate> = dirty
        .transform_dirty(category)
        .iter()
        .filter_map(|e| {
            let component = query.get(*e).ok()?;
            world_of(component).map(|transform| TransformUpdate {
                entity: *e,
                transform,
            })
        })
        .collect();
    updates.sort_by_key(|u| u.entity);
    updates
}

fn gather_meshes(
    dirty: Res<RenderDirty>,
    mut cache: ResMut<RenderCache>,
    meshes: Query<(Entity, &Guid, &StaticMesh)>,
    mesh_components: Query<&StaticMesh>,
) {
    if dirty.is_dirty(DirtyFlags::MESHES) {
        let mut draws: Vec<MeshDraw> = meshes
            .iter()
            .filter_map(|(entity, guid, mesh)| {
                Some(MeshDraw {
                    entity,
                    guid: *guid,
                    mesh: mesh.mesh.clone()?,
                    material: mesh.material.clone(),
                    transform: mesh.spatial.world,
                    casts_shadows: mesh.casts_shadows,
                })
            })
            .collect();
        draws.sort_by_key(|d| d.entity);
        cache.meshes = draws;
        cache.changed |= DirtyFlags::MESHES;
    } else {
        cache.mesh_transforms = transform_updates(
            &dirty,
            TransformCategory::Meshes,
            &mesh_components,
            |m: &StaticMesh| m.is_valid().then_some(m.spatial.world),
        );
    }
}

fn gather_sprites(
    dirty: Res<RenderDirty>,
    mut cache: ResMut<RenderCache>,
    sprites: Query<(Entity, &Sprite)>,
    sprite_components: Query<&Sprite>,
) {
    if dirty.is_dirty(DirtyFlags::SPRITES) {
        let mut draws: Vec<SpriteDraw> = sprites
            .iter()
            .map(|(entity, sprite)| SpriteDraw {
                entity,
                texture: sprite.texture.clone(),
                tint: sprite.tint,
                transform: sprite.spatial.world,
                casts_shadows: sprite.casts_shadows,
            })
            .collect();
        draws.sort_by_key(|d| d.entity);
        cache.sprites = draws;
        cache.changed |= DirtyFlags::SPRITES;
    } else {
        cache.sprite_transforms = transform_updates(
            &dirty,
            TransformCategory::Sprites,
            &sprite_components,
            |s: &Sprite| Some(s.spatial.world),
        );
    }
}

/// Rebuild point and spot light lists when flagged and resolve the active
/// directional light, which is checked every frame.
pub fn gather_lights_info(
    dirty: Res<RenderDirty>,
    mut cache: ResMut<RenderCache>,
    points: Query<(Entity, &PointLight)>,
    spots: Query<(Entity, &SpotLight)>,
    directionals: Query<(Entity, &DirectionalLight)>,
) {
    if dirty.is_dirty(DirtyFlags::POINT_LIGHTS) {
        let mut draws: Vec<PointLightDraw> = points
            .iter()
            .filter(|(_, light)| light.affects_world)
            .map(|(entity, light)| PointLightDraw {
                entity,
                location: light.spatial.world.location,
                color: light.color,
                intensity: light.intensity,
                radius: light.radius,
                casts_shadows: light.casts_shadows,
            })
            .collect();
        draws.sort_by_key(|d| d.entity);
        cache.point_lights = draws;
        cache.changed |= DirtyFlags::POINT_LIGHTS;
    }

    if dirty.is_dirty(DirtyFlags::SPOT_LIGHTS) {
        let mut draws: Vec<SpotLightDraw> = spots
            .iter()
            .filter(|(_, light)| light.affects_world)
            .map(|(entity, light)| SpotLightDraw {
                entity,
                location: light.spatial.world.location,
                direction: light.spatial.world.forward(),
                color: light.color,
                intensity: light.intensity,
                distance: light.distance,
                inner_cutoff: light.inner_cutoff,
                outer_cutoff: light.outer_cutoff,
                casts_shadows: light.casts_shadows,
            })
            .collect();
        draws.sort_by_key(|d| d.entity);
        cache.spot_lights = draws;
        cache.changed |= DirtyFlags::SPOT_LIGHTS;
    }

    let directional = directionals
        .iter()
        .filter(|(_, light)| light.affects_world)
        .min_by_key(|(entity, _)| *entity)
        .map(|(entity, light)| DirectionalLightDraw {
            entity,
            direction: light.spatial.world.forward(),
            color: light.color,
            intensity: light.intensity,
            casts_shadows: light.casts_shadows,
        });
    if directional != cache.directional_light {
        cache.directional_light = directional;
        cache.directional_changed = true;
    }
}

fn gather_texts(
    dirty: Res<RenderDirty>,
    mut cache: ResMut<RenderCache>,
    texts: Query<(Entity, &Text)>,
    text_components: Query<&Text>,
) {
    if dirty.is_dirty(DirtyFlags::TEXTS) {
        let mut draws: Vec<TextDraw> = texts
            .iter()
            .filter_map(|(entity, text)| {
                let font = text.font.clone().filter(|f| !f.is_empty())?;
                Some(TextDraw {
                    entity,
                    text: text.text.clone(),
                    font,
                    color: text.color,
                    transform: text.spatial.world,
                })
            })
            .collect();
        draws.sort_by_key(|d| d.entity);
        cache.texts = draws;
        cache.changed |= DirtyFlags::TEXTS;
    } else {
        cache.text_transforms = transform_updates(
            &dirty,
            TransformCategory::Texts,
            &text_components,
            |t: &Text| font_is_set(t.font.as_deref()).then_some(t.spatial.world),
        );
    }
}

fn gather_screen_space(
    dirty: Res<RenderDirty>,
    mut cache: ResMut<RenderCache>,
    texts: Query<(Entity, &Text2D)>,
    images: Query<(Entity, &Image2D)>,
) {
    if dirty.is_dirty(DirtyFlags::TEXTS_2D) {
        let mut draws: Vec<Text2DDraw> = texts
            .iter()
            .filter_map(|(entity, text)| {
                let font = text.font.clone().filter(|f| !f.is_empty())?;
                Some(Text2DDraw {
                    entity,
                    text: text.text.clone(),
                    font,
                    position: text.position,
                    scale: text.scale,
                    rotation: text.rotation,
                    color: text.color,
                    opacity: text.opacity,
                })
            })
            .collect();
        draws.sort_by_key(|d| d.entity);
        cache.texts_2d = draws;
        cache.changed |= DirtyFlags::TEXTS_2D;
    }

    if dirty.is_dirty(DirtyFlags::IMAGES_2D) {
        let mut draws: Vec<Image2DDraw> = images
            .iter()
            .map(|(entity, image)| Image2DDraw {
                entity,
                texture: image.texture.clone(),
                position: image.position,
                scale: image.scale,
                rotation: image.rotation,
                tint: image.tint,
                opacity: image.opacity,
            })
            .collect();
        draws.sort_by_key(|d| d.entity);
        cache.images_2d = draws;
        cache.changed |= DirtyFlags::IMAGES_2D;
    }
}

/// Billboards are rebuilt every frame. While editing with helpers enabled,
/// lights and cameras get an icon billboard too.
fn gather_billboards(
    state: Res<SceneState>,
    config: Res<SceneConfig>,
    mut cache: ResMut<RenderCache>,
    billboards: Query<(Entity, &Billboard)>,
    points: Query<(Entity, &PointLight)>,
    spots: Query<(Entity, &SpotLight)>,
    directionals: Query<(Entity, &DirectionalLight)>,
    cameras: Query<(Entity, &Camera)>,
) {
    let mut draws: Vec<BillboardDraw> = billboards
        .iter()
        .filter_map(|(entity, billboard)| {
            Some(BillboardDraw {
                entity,
                texture: billboard.texture.clone()?,
                location: billboard.spatial.world.location,
                scale: billboard.spatial.world.scale,
            })
        })
        .collect();

    if config.draw_helpers && !state.is_running() {
        let icon = |entity: Entity, texture: &str, world: &Transform| {
            BillboardDraw {
                entity,
                texture: texture.to_string(),
                location: world.location,
                scale: Vec3::ONE,
            }
        };
        draws.extend(points.iter().map(|(e, l)| icon(e, POINT_LIGHT_ICON, l.spatial.world())));
        draws.extend(spots.iter().map(|(e, l)| icon(e, SPOT_LIGHT_ICON, l.spatial.world())));
        draws.extend(
            directionals
                .iter()
                .map(|(e, l)| icon(e, DIRECTIONAL_LIGHT_ICON, l.spatial.world())),
        );
        draws.extend(cameras.iter().map(|(e, c)| icon(e, CAMERA_ICON, c.spatial.world())));
    }
    draws.sort_by(|a, b| a.entity.cmp(&b.entity).then_with(|| a.texture.cmp(&b.texture)));
    cache.billboards = draws;
}

/// Regenerate light wireframes, only for the categories flagged this frame.
fn gather_light_debug_lines(
    dirty: Res<RenderDirty>,
    config: Res<SceneConfig>,
    mut cache: ResMut<RenderCache>,
    points: Query<(Entity, &PointLight)>,
    spots: Query<(Entity, &SpotLight)>,
) {
    let segments = config.sphere_segments;
    if dirty.is_dirty(DirtyFlags::POINT_LIGHTS) {
        let mut lights: Vec<(Entity, &PointLight)> =
            points.iter().filter(|(_, l)| l.visualize_radius).collect();
        lights.sort_by_key(|(e, _)| *e);
        cache.point_light_lines = lights
            .into_iter()
            .flat_map(|(_, l)| {
                debuglines::point_light_sphere(l.spatial.world.location, l.radius, segments, l.color)
            })
            .collect();
    }
    if dirty.is_dirty(DirtyFlags::SPOT_LIGHTS) {
        let mut lights: Vec<(Entity, &SpotLight)> =
            spots.iter().filter(|(_, l)| l.visualize_distance).collect();
        lights.sort_by_key(|(e, _)| *e);
        cache.spot_light_lines = lights
            .into_iter()
            .flat_map(|(_, l)| {
                let world = l.spatial.world;
                debuglines::spot_light_cone(
                    world.location,
                    world.rotation,
                    l.distance,
                    l.inner_cutoff,
                    l.outer_cutoff,
                    segments,
                    l.color,
                )
            })
            .collect();
    }
}

/// The per-scene render schedule.
pub fn build_render_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            gather_meshes,
            gather_sprites,
            gather_lights_info,
            gather_texts,
            gather_screen_space,
            gather_billboards,
            gather_light_debug_lines,
        )
            .chain(),
    );
    schedule
}

// -------------------------------------------------------------------------
// Snapshot hand-off
// -------------------------------------------------------------------------

/// Gather this frame's render data, send what changed to the renderer,
/// render, and clear the dirty state.
pub fn render_scene(scene: &mut Scene) {
    scene.render_schedule.run(&mut scene.world);

    let view = runtime::active_view(scene);
    let running = scene.is_running();
    let draw_helpers = scene.config().draw_helpers;
    let physics_lines = if draw_helpers {
        scene.physics.debug_lines()
    } else {
        Vec::new()
    };

    {
        let renderer = scene.renderer.clone();
        let mut renderer = renderer.borrow_mut();
        let cache = scene.world.resource::<RenderCache>();

        if cache.changed.contains(DirtyFlags::MESHES) {
            renderer.set_meshes(&cache.meshes);
        } else if !cache.mesh_transforms.is_empty() {
            renderer.update_mesh_transforms(&cache.mesh_transforms);
        }
        if cache.changed.contains(DirtyFlags::SPRITES) {
            renderer.set_sprites(&cache.sprites);
        } else if !cache.sprite_transforms.is_empty() {
            renderer.update_sprite_transforms(&cache.sprite_transforms);
        }
        if cache.changed.contains(DirtyFlags::POINT_LIGHTS) {
            renderer.set_point_lights(&cache.point_lights);
        }
        if cache.changed.contains(DirtyFlags::SPOT_LIGHTS) {
            renderer.set_spot_lights(&cache.spot_lights);
        }
        if cache.directional_changed {
            renderer.set_directional_light(cache.directional_light.as_ref());
        }
        if cache.changed.contains(DirtyFlags::TEXTS) {
            renderer.set_texts(&cache.texts);
        } else if !cache.text_transforms.is_empty() {
            renderer.update_text_transforms(&cache.text_transforms);
        }
        if cache.changed.contains(DirtyFlags::TEXTS_2D) {
            renderer.set_texts_2d(&cache.texts_2d);
        }
        if cache.changed.contains(DirtyFlags::IMAGES_2D) {
            renderer.set_images_2d(&cache.images_2d);
        }

        renderer.set_billboards(&cache.billboards);
        let mut lines = Vec::with_capacity(
            cache.point_light_lines.len() + cache.spot_light_lines.len() + physics_lines.len(),
        );
        lines.extend_from_slice(&cache.point_light_lines);
        lines.extend_from_slice(&cache.spot_light_lines);
        lines.extend(physics_lines);
        renderer.set_debug_lines(&lines);
        renderer.set_grid_enabled(draw_helpers && !running);
        renderer.render(&view);
    }

    scene.world.resource_mut::<RenderDirty>().clear();
    scene.world.resource_mut::<RenderCache>().end_snapshot();
}
