//! ECS components for scene entities.
//!
//! Every scene entity carries the four core components created by
//! [`Scene::create_entity`](crate::scene::Scene::create_entity): [`guid`],
//! [`scenename`], [`transform`] and [`ownership`]. Everything else is
//! attached through the entity handle and runs its scene hooks.
//!
//! Submodules overview:
//! - [`audio`] – positional sound emitter
//! - [`billboard`] – camera-facing quad, gathered every frame
//! - [`boxcollider`] – box collision shape for the physics backend
//! - [`camera`] – scene camera and the per-frame camera view
//! - [`creationindex`] – creation sequence number used for ordering
//! - [`guid`] – process-unique identity that survives duplication
//! - [`image2d`] – screen-space image
//! - [`light`] – point, spot and directional lights
//! - [`mesh`] – static mesh
//! - [`ownership`] – parent/children links
//! - [`physicsactor`] – marker for entities owning a physics actor
//! - [`rigidbody`] – body type, velocity and named forces
//! - [`scenename`] – display label
//! - [`script`] – native and managed script bindings
//! - [`spatial`] – owner-relative transform shared by spatial sub-components
//! - [`sprite`] – textured quad in the 3D scene
//! - [`text`] – world-space and screen-space text
//! - [`transform`] – transform value type and the entity transform component

pub mod audio;
pub mod billboard;
pub mod boxcollider;
pub mod camera;
pub mod creationindex;
pub mod guid;
pub mod image2d;
pub mod light;
pub mod mesh;
pub mod ownership;
pub mod physicsactor;
pub mod rigidbody;
pub mod scenename;
pub mod script;
pub mod spatial;
pub mod sprite;
pub mod text;
pub mod transform;
