//! Scene runtime configuration resource.
//!
//! Settings loaded from an INI configuration file. Defaults are safe to run
//! with; keys missing from the file keep their current value.
//!
//! # Configuration File Format
//!
//! ```ini
//! [physics]
//! fixed_timestep = 0.0166667
//! editor_fixed_timestep = 0.0333333
//! max_substeps = 16
//! gravity = -9.81
//!
//! [editor]
//! camera_speed = 5.0
//! camera_fov = 45.0
//! draw_helpers = true
//!
//! [debug]
//! sphere_segments = 24
//!
//! [time]
//! time_scale = 1.0
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;

use crate::errors::{SceneError, SceneResult};

const DEFAULT_FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const DEFAULT_EDITOR_FIXED_TIMESTEP: f32 = 1.0 / 30.0;
const DEFAULT_MAX_SUBSTEPS: u32 = 16;
const DEFAULT_GRAVITY: f32 = -9.81;
const DEFAULT_CAMERA_SPEED: f32 = 5.0;
const DEFAULT_CAMERA_FOV: f32 = 45.0;
const DEFAULT_DRAW_HELPERS: bool = true;
const DEFAULT_SPHERE_SEGMENTS: u32 = 24;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./scene.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Physics sub-step length in gameplay mode, in seconds.
    pub fixed_timestep: f32,
    /// Physics sub-step length while editing, in seconds.
    pub editor_fixed_timestep: f32,
    /// Upper bound of physics sub-steps per tick.
    pub max_substeps: u32,
    /// Gravity along the world Y axis in gameplay mode.
    pub gravity: f32,
    /// Editor camera fly speed in units per second.
    pub camera_speed: f32,
    /// Editor camera vertical field of view in degrees.
    pub camera_fov: f32,
    /// Show the grid and light icons while editing.
    pub draw_helpers: bool,
    /// Segments per circle of light debug wireframes.
    pub sphere_segments: u32,
    pub time_scale: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            editor_fixed_timestep: DEFAULT_EDITOR_FIXED_TIMESTEP,
            max_substeps: DEFAULT_MAX_SUBSTEPS,
            gravity: DEFAULT_GRAVITY,
            camera_speed: DEFAULT_CAMERA_SPEED,
            camera_fov: DEFAULT_CAMERA_FOV,
            draw_helpers: DEFAULT_DRAW_HELPERS,
            sphere_segments: DEFAULT_SPHERE_SEGMENTS,
            time_scale: DEFAULT_TIME_SCALE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> SceneResult<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|reason| SceneError::ConfigLoad {
                path: self.config_path.clone(),
                reason,
            })?;

        // [physics] section
        if let Some(step) = config.getfloat("physics", "fixed_timestep").ok().flatten() {
            self.fixed_timestep = positive_or(step as f32, DEFAULT_FIXED_TIMESTEP);
        }
        if let Some(step) = config.getfloat("physics", "editor_fixed_timestep").ok().flatten() {
            self.editor_fixed_timestep = positive_or(step as f32, DEFAULT_EDITOR_FIXED_TIMESTEP);
        }
        if let Some(substeps) = config.getuint("physics", "max_substeps").ok().flatten() {
            self.max_substeps = (substeps as u32).max(1);
        }
        if let Some(gravity) = config.getfloat("physics", "gravity").ok().flatten() {
            self.gravity = gravity as f32;
        }

        // [editor] section
        if let Some(speed) = config.getfloat("editor", "camera_speed").ok().flatten() {
            self.camera_speed = speed as f32;
        }
        if let Some(fov) = config.getfloat("editor", "camera_fov").ok().flatten() {
            self.camera_fov = fov as f32;
        }
        if let Some(helpers) = config.getbool("editor", "draw_helpers").ok().flatten() {
            self.draw_helpers = helpers;
        }

        // [debug] section
        if let Some(segments) = config.getuint("debug", "sphere_segments").ok().flatten() {
            self.sphere_segments = (segments as u32).max(3);
        }

        // [time] section
        if let Some(scale) = config.getfloat("time", "time_scale").ok().flatten() {
            self.time_scale = scale.max(0.0) as f32;
        }

        info!(
            "Loaded config: step={}s editor_step={}s substeps={} gravity={} helpers={} segments={}",
            self.fixed_timestep,
            self.editor_fixed_timestep,
            self.max_substeps,
            self.gravity,
            self.draw_helpers,
            self.sphere_segments
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> SceneResult<()> {
        let mut config = Ini::new();

        config.set("physics", "fixed_timestep", Some(self.fixed_timestep.to_string()));
        config.set(
            "physics",
            "editor_fixed_timestep",
            Some(self.editor_fixed_timestep.to_string()),
        );
        config.set("physics", "max_substeps", Some(self.max_substeps.to_string()));
        config.set("physics", "gravity", Some(self.gravity.to_string()));

        config.set("editor", "camera_speed", Some(self.camera_speed.to_string()));
        config.set("editor", "camera_fov", Some(self.camera_fov.to_string()));
        config.set("editor", "draw_helpers", Some(self.draw_helpers.to_string()));

        config.set("debug", "sphere_segments", Some(self.sphere_segments.to_string()));

        config.set("time", "time_scale", Some(self.time_scale.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| SceneError::ConfigSave {
                path: self.config_path.clone(),
                reason: e.to_string(),
            })?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value > 0.0 { value } else { fallback }
}
