use bevy_ecs::prelude::Component;

/// Display label of a scene entity.
///
/// Entities without this component are hidden from
/// [`Scene::named_entities`](crate::scene::Scene::named_entities); the
/// synthesized runtime camera relies on that.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct SceneName(pub String);

impl SceneName {
    pub const UNNAMED: &'static str = "Unnamed Entity";

    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            SceneName(Self::UNNAMED.to_string())
        } else {
            SceneName(name)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
