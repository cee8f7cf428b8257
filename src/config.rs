use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Smallest polygon a cross-section ring can be.
pub const MIN_CIRCLE_SEGMENT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Parameters shared by every part of the snake simulation.
///
/// Every field is optional in a config file and independently falls back to
/// its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    // Body
    /// Number of trail samples at spawn.
    pub initial_length: usize,
    /// Planar distance the head must travel before a new sample is recorded.
    pub min_distance: f32,
    /// Samples added per food eaten.
    pub grow_count: i32,
    /// Vertices per cross-section ring.
    pub circle_segment: usize,
    /// Tube radius.
    pub radius: f32,
    pub snake_base_y: f32,

    // Collision
    pub self_collision_threshold: f32,
    /// Samples nearest the head skipped by the self collision scan.
    pub ignore_head_points: usize,
    /// Vertical gap above which the head passes over its own body.
    pub jump_y_threshold: f32,
    /// Edge length of the head's collision box.
    pub head_size: f32,

    // Stripes
    pub stripe_world_len: f32,
    pub stripe_color_a: Color,
    pub stripe_color_b: Color,

    // Tail
    pub tail_extension: bool,
    pub tail_extension_points: usize,
    /// Distance between synthetic tail points, in tube radii.
    pub tail_extension_spacing: f32,
    /// Length of the tail cone, in tube radii.
    pub tail_cone_length: f32,

    // Movement
    pub move_speed: f32,
    /// Degrees per second at full steering.
    pub turn_speed: f32,
    pub jump_height: f32,
    pub jump_duration: f32,

    // Arena
    pub wall_radius: f32,
    pub wall_thickness: f32,
    pub wall_height: f32,
    pub segment_count: usize,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            initial_length: 5,
            min_distance: 0.2,
            grow_count: 5,
            circle_segment: 12,
            radius: 0.5,
            snake_base_y: 0.0,
            self_collision_threshold: 0.4,
            ignore_head_points: 10,
            jump_y_threshold: 0.3,
            head_size: 0.5,
            stripe_world_len: 0.6,
            stripe_color_a: Color::new(0.2, 0.7, 0.2),
            stripe_color_b: Color::new(0.9, 0.8, 0.3),
            tail_extension: true,
            tail_extension_points: 4,
            tail_extension_spacing: 0.5,
            tail_cone_length: 2.5,
            move_speed: 5.0,
            turn_speed: 120.0,
            jump_height: 2.0,
            jump_duration: 0.6,
            wall_radius: 10.0,
            wall_thickness: 1.0,
            wall_height: 2.0,
            segment_count: 100,
        }
    }
}

fn positive_or_default(name: &str, value: f32, default: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("Invalid {} {}, using {}", name, value, default);
        default
    }
}

impl SnakeConfig {
    /// Reads a YAML config file. Fields absent from the file keep their
    /// defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SnakeConfig =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        Ok(config.sanitized())
    }

    /// Clamps or replaces values that would produce degenerate geometry.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut config = self;
        if config.circle_segment < MIN_CIRCLE_SEGMENT {
            warn!(
                "circle_segment {} is below {}, clamping",
                config.circle_segment, MIN_CIRCLE_SEGMENT
            );
            config.circle_segment = MIN_CIRCLE_SEGMENT;
        }
        if config.initial_length == 0 {
            warn!("initial_length 0, using 1");
            config.initial_length = 1;
        }
        if config.segment_count < MIN_CIRCLE_SEGMENT {
            config.segment_count = MIN_CIRCLE_SEGMENT;
        }
        config.radius = positive_or_default("radius", config.radius, defaults.radius);
        config.min_distance =
            positive_or_default("min_distance", config.min_distance, defaults.min_distance);
        config.stripe_world_len = positive_or_default(
            "stripe_world_len",
            config.stripe_world_len,
            defaults.stripe_world_len,
        );
        config.jump_duration = positive_or_default(
            "jump_duration",
            config.jump_duration,
            defaults.jump_duration,
        );
        config.tail_extension_spacing = positive_or_default(
            "tail_extension_spacing",
            config.tail_extension_spacing,
            defaults.tail_extension_spacing,
        );
        config.tail_cone_length = positive_or_default(
            "tail_cone_length",
            config.tail_cone_length,
            defaults.tail_cone_length,
        );
        config
    }
}
