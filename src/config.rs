//! # Viewer Configuration
//!
//! Settings are read from `config.json` in the working directory. Every field has a
//! default, so the file may be missing entirely or only override a few values:
//!
//! ```json
//! {
//!     "window": { "width": 1280, "height": 720 },
//!     "camera": { "projection": "orthographic", "render_radius": 24.0 }
//! }
//! ```

use std::{
    f32::consts::{FRAC_PI_4, PI},
    fs, io,
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::engine_state::camera_state::projection::{ProjectionKind, Z_NEAR};

/// Default location of the configuration file.
pub const CONFIG_FILE: &str = "config.json";

/// Errors raised while loading or validating [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Configuration file path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The file is not valid JSON for this schema.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Configuration file path
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Initial camera pose and projection
    pub camera: CameraConfig,
    /// Asset locations
    pub assets: AssetConfig,
    /// Manually placed blocks
    pub scene: SceneConfig,
}

/// Window size and title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial inner width in physical pixels
    pub width: u32,
    /// Initial inner height in physical pixels
    pub height: u32,
    /// Window title
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: String::from("Voxel Viewer"),
        }
    }
}

/// Starting pose, projection and movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position in world space
    pub position: [f32; 3],
    /// Yaw in radians
    pub rx: f32,
    /// Pitch in radians
    pub ry: f32,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Far plane distance, also the half-extent of the orthographic box
    pub render_radius: f32,
    /// Perspective or orthographic projection
    pub projection: ProjectionKind,
    /// Units per second for W/A/S/D movement
    pub walk_speed: f32,
    /// Radians per unit of mouse motion per second
    pub mouse_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [-1.0, 1.5, 2.0],
            rx: 0.5,
            ry: -0.8,
            fov: FRAC_PI_4,
            render_radius: 40.0,
            projection: ProjectionKind::Perspective,
            walk_speed: 1.0,
            mouse_speed: 0.1,
        }
    }
}

/// Shader and texture paths, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// WGSL source for the block pipeline
    pub shader_path: PathBuf,
    /// PNG texture atlas, 16x16 tiles
    pub atlas_path: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            shader_path: PathBuf::from("assets/shaders/block_shader.wgsl"),
            atlas_path: PathBuf::from("./assets/textures/texture_atlas.png"),
        }
    }
}

/// The chunk origin and the world positions of the blocks placed in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// World-space corner of chunk slot (0, 0, 0)
    pub chunk_origin: [i32; 3],
    /// Reference corners of the blocks to place
    pub blocks: Vec<[i32; 3]>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            chunk_origin: [-8, -8, -8],
            blocks: vec![
                [0, 0, 0],
                [1, 0, 0],
                [0, 0, -1],
                [0, 0, 1],
                [-1, 0, 0],
                [0, 1, 0],
            ],
        }
    }
}

impl EngineConfig {
    /// Loads and validates the configuration at `path`.
    ///
    /// A missing file is not an error and yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, using default configuration", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window",
                reason: format!(
                    "size must be non-zero, got {}x{}",
                    self.window.width, self.window.height
                ),
            });
        }

        let camera = &self.camera;
        if !(camera.fov > 0.0 && camera.fov < PI) {
            return Err(ConfigError::Invalid {
                field: "camera.fov",
                reason: format!("must lie strictly between 0 and pi, got {}", camera.fov),
            });
        }
        if !(camera.render_radius > Z_NEAR) {
            return Err(ConfigError::Invalid {
                field: "camera.render_radius",
                reason: format!(
                    "must exceed the near plane {Z_NEAR}, got {}",
                    camera.render_radius
                ),
            });
        }
        if !(camera.walk_speed > 0.0) {
            return Err(ConfigError::Invalid {
                field: "camera.walk_speed",
                reason: format!("must be positive, got {}", camera.walk_speed),
            });
        }
        if !(camera.mouse_speed > 0.0) {
            return Err(ConfigError::Invalid {
                field: "camera.mouse_speed",
                reason: format!("must be positive, got {}", camera.mouse_speed),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(dir.path().join("config.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn defaults_describe_the_stock_scene() {
        let config = EngineConfig::default();
        assert_eq!((config.window.width, config.window.height), (1024, 768));
        assert_eq!(config.camera.position, [-1.0, 1.5, 2.0]);
        assert_eq!(config.camera.projection, ProjectionKind::Perspective);
        assert_eq!(config.scene.chunk_origin, [-8, -8, -8]);
        assert_eq!(config.scene.blocks.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let file = write_config(
            r#"{ "window": { "width": 640 }, "camera": { "projection": "orthographic" } }"#,
        );

        let config = EngineConfig::load(file.path()).unwrap();

        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 768);
        assert_eq!(config.camera.projection, ProjectionKind::Orthographic);
        assert_eq!(config.camera.render_radius, 40.0);
        assert_eq!(config.scene, SceneConfig::default());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write_config("{ \"window\": ");
        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn unknown_projection_is_rejected() {
        let file = write_config(r#"{ "camera": { "projection": "fisheye" } }"#);
        assert!(matches!(
            EngineConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let cases = [
            (r#"{ "window": { "height": 0 } }"#, "window"),
            (r#"{ "camera": { "fov": 3.5 } }"#, "camera.fov"),
            (r#"{ "camera": { "fov": 0.0 } }"#, "camera.fov"),
            (r#"{ "camera": { "render_radius": 0.1 } }"#, "camera.render_radius"),
            (r#"{ "camera": { "walk_speed": -1.0 } }"#, "camera.walk_speed"),
            (r#"{ "camera": { "mouse_speed": 0.0 } }"#, "camera.mouse_speed"),
        ];

        for (json, expected_field) in cases {
            let file = write_config(json);
            match EngineConfig::load(file.path()) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("{json}: expected invalid {expected_field}, got {other:?}"),
            }
        }
    }
}
