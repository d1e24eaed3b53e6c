//! Entity lifecycle tests: creation, deferred destruction, GUID lookup,
//! deep copies and scene clearing.

use glam::{Quat, Vec3};

use aberredscene::collaborators::kinematic::KinematicPhysics;
use aberredscene::collaborators::renderer::RecordingRenderer;
use aberredscene::components::boxcollider::BoxCollider;
use aberredscene::components::camera::Camera;
use aberredscene::components::guid::Guid;
use aberredscene::components::light::PointLight;
use aberredscene::components::mesh::StaticMesh;
use aberredscene::components::physicsactor::PhysicsActor;
use aberredscene::components::rigidbody::RigidBody;
use aberredscene::components::scenename::SceneName;
use aberredscene::components::transform::Transform;
use aberredscene::entity::EntityHandle;
use aberredscene::resources::dirty::DirtyFlags;
use aberredscene::resources::sceneconfig::SceneConfig;
use aberredscene::scene::Scene;

const EPSILON: f32 = 1e-4;

fn new_scene() -> Scene {
    Scene::new(
        RecordingRenderer::shared(),
        Box::new(KinematicPhysics::new(1.0 / 60.0, 16, Vec3::ZERO)),
        SceneConfig::new(),
    )
}

// =============================================================================
// Creation
// =============================================================================

#[test]
fn new_entity_has_identity_name_and_no_parent() {
    let mut scene = new_scene();
    let e = scene.create_entity("Crate");
    let entity = scene.entity(e);
    assert_eq!(entity.name(), "Crate");
    assert!(!entity.guid().is_null());
    assert!(entity.parent().is_null());
    assert!(entity.children().is_empty());
    assert_eq!(entity.world_transform(), Transform::IDENTITY);
    assert_eq!(scene.entity_by_guid(entity.guid()), e);
}

#[test]
fn empty_name_gets_default_label() {
    let mut scene = new_scene();
    let e = scene.create_entity("");
    assert_eq!(scene.entity(e).name(), SceneName::UNNAMED);
}

#[test]
fn null_handle_never_resolves() {
    let mut scene = new_scene();
    let e = scene.create_entity("A");
    assert!(!EntityHandle::NULL.is_valid(&scene));
    assert!(e.is_valid(&scene));
    assert_ne!(e, EntityHandle::NULL);
}

#[test]
#[should_panic(expected = "already in use")]
fn duplicate_guid_is_a_precondition_violation() {
    let mut scene = new_scene();
    let guid = Guid::new();
    scene.create_entity_with_guid(guid, "First");
    scene.create_entity_with_guid(guid, "Second");
}

#[test]
#[should_panic(expected = "already has")]
fn adding_a_component_twice_panics() {
    let mut scene = new_scene();
    let e = scene.create_entity("A");
    scene.entity_mut(e).add_component(StaticMesh::new("a"));
    scene.entity_mut(e).add_component(StaticMesh::new("b"));
}

#[test]
#[should_panic(expected = "has no")]
fn reading_a_missing_component_panics() {
    let mut scene = new_scene();
    let e = scene.create_entity("A");
    let _ = scene.entity(e).get_component::<StaticMesh>();
}

// =============================================================================
// Deferred destruction
// =============================================================================

#[test]
fn destroyed_parent_leaves_children_as_roots() {
    let mut scene = new_scene();
    let p = scene.create_entity("P");
    let c1 = scene.create_entity("C1");
    let c2 = scene.create_entity("C2");
    scene.entity_mut(c1).set_parent(p).unwrap();
    scene.entity_mut(c2).set_parent(p).unwrap();

    scene.destroy_entity(p);
    scene.flush_pending_destructions();

    assert!(!scene.contains(p));
    assert!(scene.contains(c1));
    assert!(scene.contains(c2));
    assert!(scene.entity(c1).parent().is_null());
    assert!(scene.entity(c2).parent().is_null());
}

#[test]
fn destroyed_entity_stays_readable_until_flush() {
    let mut scene = new_scene();
    let e = scene.create_entity("Doomed");
    scene.entity_mut(e).set_world_location(Vec3::new(1.0, 2.0, 3.0));

    scene.destroy_entity(e);
    assert!(scene.is_pending_destruction(e));
    assert!(scene.contains(e));
    assert_eq!(scene.entity(e).name(), "Doomed");
    assert!(scene.entity(e).world_transform().location.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), EPSILON));

    let guid = scene.entity(e).guid();
    scene.flush_pending_destructions();
    assert!(!e.is_valid(&scene));
    assert!(scene.entity_by_guid(guid).is_null());
    assert_eq!(scene.entity_count(), 0);
}

#[test]
fn destroying_twice_queues_once() {
    let mut scene = new_scene();
    let e = scene.create_entity("A");
    scene.destroy_entity(e);
    scene.destroy_entity(e);
    scene.flush_pending_destructions();
    assert_eq!(scene.entity_count(), 0);
}

#[test]
fn children_of_a_middle_node_move_to_its_parent() {
    let mut scene = new_scene();
    let root = scene.create_entity("Root");
    scene.entity_mut(root).set_world_location(Vec3::new(0.0, 5.0, 0.0));
    let middle = scene.create_entity("Middle");
    scene.entity_mut(middle).set_parent(root).unwrap();
    scene
        .entity_mut(middle)
        .set_relative_transform(Transform::new(Vec3::X, Quat::from_rotation_y(0.5), Vec3::splat(2.0)));
    let leaf = scene.create_entity("Leaf");
    scene.entity_mut(leaf).set_parent(middle).unwrap();
    scene.entity_mut(leaf).set_relative_location(Vec3::new(0.0, 0.0, 3.0));
    let leaf_world = scene.entity(leaf).world_transform();

    scene.destroy_entity(middle);
    scene.flush_pending_destructions();

    assert_eq!(scene.entity(leaf).parent(), root);
    assert_eq!(scene.entity(root).children(), vec![leaf]);
    assert!(scene.entity(leaf).world_transform().abs_diff_eq(&leaf_world, EPSILON));
    let composed = scene
        .entity(root)
        .world_transform()
        .compose(&scene.entity(leaf).relative_transform());
    assert!(composed.abs_diff_eq(&leaf_world, EPSILON));
}

#[test]
fn destruction_releases_physics_actor_and_observers() {
    let mut scene = new_scene();
    let e = scene.create_entity("Body");
    scene.entity_mut(e).add_component(RigidBody::default());
    scene.entity_mut(e).add_component(PointLight::default());
    let guid = scene.entity(e).guid();
    assert!(scene.physics().has_actor(guid));
    assert!(scene.entity(e).has_component::<PhysicsActor>());

    scene.destroy_entity(e);
    scene.flush_pending_destructions();

    assert!(!scene.physics().has_actor(guid));
    assert!(!scene.notifications().has_observers(e.id()));
}

#[test]
fn tick_flushes_destruction_queue_first() {
    let mut scene = new_scene();
    let e = scene.create_entity("A");
    scene.destroy_entity(e);
    scene.on_update(1.0 / 60.0);
    assert!(!scene.contains(e));
}

// =============================================================================
// Physics actors follow components
// =============================================================================

#[test]
fn collider_without_body_creates_static_actor() {
    let mut scene = new_scene();
    let e = scene.create_entity("Wall");
    scene.entity_mut(e).add_component(BoxCollider::default());
    let guid = scene.entity(e).guid();
    assert!(scene.physics().has_actor(guid));

    scene.entity_mut(e).add_component(RigidBody::default());
    scene.entity_mut(e).remove_component::<RigidBody>();
    assert!(scene.physics().has_actor(guid), "collider keeps a static actor");

    scene.entity_mut(e).remove_component::<BoxCollider>();
    assert!(!scene.physics().has_actor(guid));
    assert!(!scene.entity(e).has_component::<PhysicsActor>());
}

// =============================================================================
// Copies and clearing
// =============================================================================

#[test]
fn create_from_entity_copies_subtree_with_fresh_guids() {
    let mut scene = new_scene();
    let parent = scene.create_entity("Lamp Post");
    scene.entity_mut(parent).set_world_location(Vec3::new(2.0, 0.0, 0.0));
    scene.entity_mut(parent).add_component(StaticMesh::new("meshes/post"));
    let bulb = scene.create_entity("Bulb");
    scene.entity_mut(bulb).set_parent(parent).unwrap();
    scene.entity_mut(bulb).set_relative_location(Vec3::new(0.0, 3.0, 0.0));
    scene.entity_mut(bulb).add_component(PointLight::default());

    let copy = scene.create_from_entity(parent);

    assert_ne!(copy, parent);
    assert_ne!(scene.entity(copy).guid(), scene.entity(parent).guid());
    assert_eq!(scene.entity(copy).name(), "Lamp Post");
    assert!(scene.entity(copy).parent().is_null());
    assert!(scene.entity(copy).has_component::<StaticMesh>());
    assert_eq!(scene.entity_count(), 4);

    let children = scene.entity(copy).children();
    assert_eq!(children.len(), 1);
    let bulb_copy = scene.entity(children[0]);
    assert_eq!(bulb_copy.name(), "Bulb");
    assert_ne!(bulb_copy.guid(), scene.entity(bulb).guid());
    assert!(bulb_copy.has_component::<PointLight>());
    assert!(bulb_copy
        .world_transform()
        .location
        .abs_diff_eq(Vec3::new(2.0, 3.0, 0.0), EPSILON));

    // The copy's light follows the copy, not the original.
    scene.entity_mut(copy).set_world_location(Vec3::new(-5.0, 0.0, 0.0));
    assert!(scene
        .entity(bulb)
        .world_transform()
        .location
        .abs_diff_eq(Vec3::new(2.0, 3.0, 0.0), EPSILON));
}

#[test]
fn clear_scene_removes_everything_and_marks_all_dirty() {
    let mut scene = new_scene();
    let a = scene.create_entity("A");
    scene.entity_mut(a).add_component(RigidBody::default());
    let b = scene.create_entity("B");
    scene.entity_mut(b).set_parent(a).unwrap();
    scene.render_scene();
    assert!(scene.dirty().is_clean());

    scene.clear_scene();

    assert_eq!(scene.entity_count(), 0);
    assert!(scene.entities().is_empty());
    assert!(!a.is_valid(&scene));
    assert!(scene.notifications().is_empty());
    assert_eq!(scene.dirty().flags(), DirtyFlags::all());
}

#[test]
fn named_entities_are_listed_in_creation_order() {
    let mut scene = new_scene();
    let a = scene.create_entity("Alpha");
    let b = scene.create_entity("Beta");
    let named = scene.named_entities();
    assert_eq!(named, vec![(a, "Alpha".to_string()), (b, "Beta".to_string())]);
}

#[test]
fn listings_keep_creation_order_after_ids_are_recycled() {
    let mut scene = new_scene();
    let a = scene.create_entity("A");
    let b = scene.create_entity("B");
    scene.destroy_entity(a);
    scene.flush_pending_destructions();
    let c = scene.create_entity("C");
    let d = scene.create_entity("D");

    let names: Vec<String> = scene.named_entities().into_iter().map(|(_, name)| name).collect();
    assert_eq!(names, vec!["B", "C", "D"]);
    assert_eq!(scene.entities(), vec![b, c, d]);
}

#[test]
fn earliest_created_primary_camera_wins_after_ids_are_recycled() {
    let mut scene = new_scene();
    let filler = scene.create_entity("Filler");
    scene.destroy_entity(filler);
    scene.flush_pending_destructions();

    let first = scene.create_entity("Cam1");
    scene.entity_mut(first).add_component(Camera::primary());
    let second = scene.create_entity("Cam2");
    scene.entity_mut(second).add_component(Camera::primary());

    assert_eq!(scene.primary_camera_entity(), first);
}

#[test]
fn renaming_and_world_pose_getters() {
    let mut scene = new_scene();
    let e = scene.create_entity("Old");
    let mut entity = scene.entity_mut(e);
    entity.set_name("New");
    entity.set_world_transform(Transform::new(Vec3::X, Quat::from_rotation_y(0.3), Vec3::splat(2.0)));
    assert_eq!(entity.name(), "New");
    assert!(entity.world_location().abs_diff_eq(Vec3::X, EPSILON));
    assert!(entity.world_rotation().abs_diff_eq(Quat::from_rotation_y(0.3), EPSILON));
    assert!(entity.world_scale().abs_diff_eq(Vec3::splat(2.0), EPSILON));

    entity.set_name("");
    assert_eq!(scene.entity(e).name(), SceneName::UNNAMED);
}
