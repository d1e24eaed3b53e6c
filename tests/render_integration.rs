//! Render snapshot tests: dirty flags, full rebuilds, transform-only batches
//! and the per-frame data handed to the renderer.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec2, Vec3};

use aberredscene::collaborators::kinematic::KinematicPhysics;
use aberredscene::collaborators::renderer::RecordingRenderer;
use aberredscene::components::light::{DirectionalLight, PointLight, SpotLight};
use aberredscene::components::mesh::StaticMesh;
use aberredscene::components::sprite::Sprite;
use aberredscene::components::text::{Text, Text2D};
use aberredscene::resources::dirty::{DirtyFlags, TransformCategory};
use aberredscene::resources::sceneconfig::SceneConfig;
use aberredscene::scene::Scene;
use aberredscene::systems::render_gather::POINT_LIGHT_ICON;

const EPSILON: f32 = 1e-4;

fn new_scene() -> (Scene, Rc<RefCell<RecordingRenderer>>) {
    new_scene_with(SceneConfig::new())
}

fn new_scene_with(config: SceneConfig) -> (Scene, Rc<RefCell<RecordingRenderer>>) {
    let renderer = RecordingRenderer::shared();
    let scene = Scene::new(
        renderer.clone(),
        Box::new(KinematicPhysics::new(1.0 / 60.0, 16, Vec3::ZERO)),
        config,
    );
    (scene, renderer)
}

// =============================================================================
// Full rebuilds
// =============================================================================

#[test]
fn mesh_list_is_rebuilt_once_then_left_alone() {
    let (mut scene, renderer) = new_scene();
    scene.render_scene();

    let e = scene.create_entity("Crate");
    scene.entity_mut(e).add_component(StaticMesh::new("meshes/crate"));
    assert!(scene.dirty().is_dirty(DirtyFlags::MESHES));

    scene.render_scene();
    assert!(!scene.dirty().is_dirty(DirtyFlags::MESHES));
    assert_eq!(scene.render_cache().meshes.len(), 1);
    assert_eq!(renderer.borrow().meshes.len(), 1);
    let sets = renderer.borrow().stats.mesh_sets;
    let list = scene.render_cache().meshes.as_ptr();

    scene.render_scene();
    assert_eq!(renderer.borrow().stats.mesh_sets, sets, "no second upload");
    assert_eq!(renderer.borrow().stats.mesh_transform_batches, 0);
    assert_eq!(scene.render_cache().meshes.as_ptr(), list, "no rebuild");
    assert!(!scene.render_cache().has_changes());
}

#[test]
fn fresh_scene_sends_every_category_once() {
    let (mut scene, renderer) = new_scene();
    scene.render_scene();
    scene.render_scene();
    let stats = renderer.borrow().stats;
    assert_eq!(stats.mesh_sets, 1);
    assert_eq!(stats.sprite_sets, 1);
    assert_eq!(stats.point_light_sets, 1);
    assert_eq!(stats.spot_light_sets, 1);
    assert_eq!(stats.text_sets, 1);
    assert_eq!(stats.text_2d_sets, 1);
    assert_eq!(stats.image_2d_sets, 1);
    assert_eq!(stats.frames, 2);
}

#[test]
fn mesh_without_asset_is_not_drawn_and_removal_flags_nothing() {
    let (mut scene, renderer) = new_scene();
    let e = scene.create_entity("Empty");
    scene.entity_mut(e).add_component(StaticMesh::default());
    scene.render_scene();
    assert!(renderer.borrow().meshes.is_empty());

    scene.entity_mut(e).remove_component::<StaticMesh>();
    assert!(!scene.dirty().is_dirty(DirtyFlags::MESHES));
}

#[test]
fn modifying_a_mesh_rebuilds_the_list() {
    let (mut scene, renderer) = new_scene();
    let e = scene.create_entity("Crate");
    scene.entity_mut(e).add_component(StaticMesh::new("meshes/crate"));
    scene.render_scene();

    scene
        .entity_mut(e)
        .modify_component::<StaticMesh, _>(|mesh| mesh.material = Some("materials/wood".into()));
    assert!(scene.dirty().is_dirty(DirtyFlags::MESHES));
    scene.render_scene();

    let renderer = renderer.borrow();
    assert_eq!(renderer.stats.mesh_sets, 2);
    assert_eq!(renderer.meshes[0].material.as_deref(), Some("materials/wood"));
}

// =============================================================================
// Transform-only batches
// =============================================================================

#[test]
fn moving_a_mesh_sends_a_transform_batch() {
    let (mut scene, renderer) = new_scene();
    let e = scene.create_entity("Crate");
    scene.entity_mut(e).add_component(StaticMesh::new("meshes/crate"));
    scene.render_scene();

    scene.entity_mut(e).set_world_location(Vec3::new(0.0, 2.0, 0.0));
    assert!(!scene.dirty().is_dirty(DirtyFlags::MESHES));
    assert!(scene.dirty().transform_dirty(TransformCategory::Meshes).contains(&e.id()));
    scene.render_scene();

    let renderer = renderer.borrow();
    assert_eq!(renderer.stats.mesh_sets, 1);
    assert_eq!(renderer.stats.mesh_transform_batches, 1);
    assert_eq!(renderer.last_mesh_transforms.len(), 1);
    assert_eq!(renderer.last_mesh_transforms[0].entity, e.id());
    assert!(renderer.meshes[0]
        .transform
        .location
        .abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), EPSILON));
}

#[test]
fn rebuild_in_same_frame_supersedes_transform_batch() {
    let (mut scene, renderer) = new_scene();
    let a = scene.create_entity("A");
    scene.entity_mut(a).add_component(Sprite::new("textures/a"));
    scene.render_scene();

    scene.entity_mut(a).set_world_location(Vec3::X);
    let b = scene.create_entity("B");
    scene.entity_mut(b).add_component(Sprite::new("textures/b"));
    scene.render_scene();

    let renderer = renderer.borrow();
    assert_eq!(renderer.stats.sprite_sets, 2);
    assert_eq!(renderer.stats.sprite_transform_batches, 0);
    assert_eq!(renderer.sprites.len(), 2);
    assert!(renderer.sprites[0].transform.location.abs_diff_eq(Vec3::X, EPSILON));
}

#[test]
fn moving_a_child_batches_its_text() {
    let (mut scene, renderer) = new_scene();
    let parent = scene.create_entity("Sign");
    let label = scene.create_entity("Label");
    scene.entity_mut(label).set_parent(parent).unwrap();
    scene.entity_mut(label).add_component(Text::new("Hello", "fonts/default"));
    scene.render_scene();

    scene.entity_mut(parent).set_world_location(Vec3::new(0.0, 0.0, 5.0));
    scene.render_scene();

    let renderer = renderer.borrow();
    assert_eq!(renderer.stats.text_sets, 1);
    assert_eq!(renderer.stats.text_transform_batches, 1);
    assert!(renderer.texts[0]
        .transform
        .location
        .abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), EPSILON));
}

// =============================================================================
// Lights
// =============================================================================

#[test]
fn invisible_light_changes_flag_nothing() {
    let (mut scene, renderer) = new_scene();
    let e = scene.create_entity("Off");
    let mut light = PointLight::default();
    light.affects_world = false;
    scene.entity_mut(e).add_component(light);
    scene.render_scene();
    assert!(renderer.borrow().point_lights.is_empty());

    scene.entity_mut(e).set_world_location(Vec3::ONE);
    assert!(!scene.dirty().is_dirty(DirtyFlags::POINT_LIGHTS));
    scene.entity_mut(e).remove_component::<PointLight>();
    assert!(!scene.dirty().is_dirty(DirtyFlags::POINT_LIGHTS));
}

#[test]
fn moving_a_visible_light_rebuilds_its_category() {
    let (mut scene, renderer) = new_scene();
    let e = scene.create_entity("Lamp");
    scene.entity_mut(e).add_component(SpotLight::default());
    scene.render_scene();

    scene.entity_mut(e).set_world_location(Vec3::new(3.0, 0.0, 0.0));
    assert!(scene.dirty().is_dirty(DirtyFlags::SPOT_LIGHTS));
    assert!(!scene.dirty().is_dirty(DirtyFlags::POINT_LIGHTS));
    scene.render_scene();

    let renderer = renderer.borrow();
    assert_eq!(renderer.stats.spot_light_sets, 2);
    assert!(renderer.spot_lights[0].location.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), EPSILON));
}

#[test]
fn directional_light_is_sent_only_when_it_changes() {
    let (mut scene, renderer) = new_scene();
    scene.render_scene();
    assert_eq!(renderer.borrow().stats.directional_light_sets, 0);

    let sun = scene.create_entity("Sun");
    scene.entity_mut(sun).add_component(DirectionalLight::default());
    scene.render_scene();
    scene.render_scene();
    assert_eq!(renderer.borrow().stats.directional_light_sets, 1);
    assert!(renderer.borrow().directional_light.is_some());

    scene.entity_mut(sun).remove_component::<DirectionalLight>();
    scene.render_scene();
    assert_eq!(renderer.borrow().stats.directional_light_sets, 2);
    assert!(renderer.borrow().directional_light.is_none());
}

#[test]
fn radius_wireframe_is_cached_between_frames() {
    let mut config = SceneConfig::new();
    config.sphere_segments = 8;
    let (mut scene, renderer) = new_scene_with(config);
    let e = scene.create_entity("Lamp");
    let mut light = PointLight::default();
    light.visualize_radius = true;
    scene.entity_mut(e).add_component(light);

    scene.render_scene();
    assert_eq!(renderer.borrow().debug_lines.len(), 4 * 8);
    scene.render_scene();
    assert_eq!(renderer.borrow().debug_lines.len(), 4 * 8);
    assert_eq!(scene.render_cache().point_light_lines.len(), 4 * 8);
}

#[test]
fn editor_icons_follow_draw_helpers() {
    let (mut scene, renderer) = new_scene();
    let e = scene.create_entity("Lamp");
    scene.entity_mut(e).add_component(PointLight::default());
    scene.render_scene();
    {
        let renderer = renderer.borrow();
        assert_eq!(renderer.billboards.len(), 1);
        assert_eq!(renderer.billboards[0].texture, POINT_LIGHT_ICON);
        assert!(renderer.grid_enabled);
    }

    let mut config = SceneConfig::new();
    config.draw_helpers = false;
    let (mut plain, renderer) = new_scene_with(config);
    let e = plain.create_entity("Lamp");
    plain.entity_mut(e).add_component(PointLight::default());
    plain.render_scene();
    assert!(renderer.borrow().billboards.is_empty());
    assert!(!renderer.borrow().grid_enabled);
}

// =============================================================================
// Text
// =============================================================================

#[test]
fn text_without_font_is_skipped() {
    let (mut scene, renderer) = new_scene();
    let e = scene.create_entity("Label");
    let mut text = Text::default();
    text.text = "no font".into();
    scene.entity_mut(e).add_component(text);
    let hud = scene.create_entity("Hud");
    scene.entity_mut(hud).add_component(Text2D::new("Score", "fonts/hud", Vec2::new(10.0, 10.0)));
    scene.render_scene();

    assert!(renderer.borrow().texts.is_empty());
    assert_eq!(renderer.borrow().texts_2d.len(), 1);

    scene.entity_mut(e).remove_component::<Text>();
    assert!(!scene.dirty().is_dirty(DirtyFlags::TEXTS));
}
