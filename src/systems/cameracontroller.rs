//! Default controller of the synthesized runtime camera.

use bevy_ecs::prelude::Entity;

use crate::components::script::NativeScript;
use crate::events::sceneevent::SceneEvent;
use crate::resources::camerainput::CameraInput;
use crate::resources::editorcamera::FlyState;
use crate::scene::Scene;

/// Flies its entity from [`CameraInput`] the same way the editor camera does.
#[derive(Debug, Clone)]
pub struct FlyCameraController {
    fly: FlyState,
}

impl Default for FlyCameraController {
    fn default() -> Self {
        Self {
            fly: FlyState::new(5.0),
        }
    }
}

impl FlyCameraController {
    pub fn move_speed(&self) -> f32 {
        self.fly.move_speed
    }
}

impl NativeScript for FlyCameraController {
    fn on_create(&mut self, scene: &mut Scene, _entity: Entity) {
        self.fly = FlyState::new(scene.config().camera_speed);
    }

    fn on_update(&mut self, scene: &mut Scene, entity: Entity, dt: f32) {
        let input = *scene.world.resource::<CameraInput>();
        let mut transform = scene.entity(entity).world_transform();
        if self.fly.update(&mut transform, &input, dt) {
            scene.entity_mut(entity).set_world_transform(transform);
        }
    }

    fn on_event(&mut self, scene: &mut Scene, _entity: Entity, event: &SceneEvent) {
        if let SceneEvent::MouseScrolled { delta } = *event {
            let looking = scene.world.resource::<CameraInput>().looking;
            self.fly.on_scroll(delta, looking);
        }
    }
}
