use glam::Vec3;
use serde::{Deserialize, Serialize};
use shapestage_character::{CharacterConfig, ClipNames};
use shapestage_input::InputBindings;
use shapestage_remote::RemoteConfig;
use shapestage_render::CameraConfig;
use std::path::{Path, PathBuf};

/// A static obstacle model. Its collider is registered once the model loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub model: String,
    pub position: Vec3,
    pub radius: f32,
}

/// Everything a stage needs, as read from YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub remote: RemoteConfig,
    pub character: CharacterConfig,
    pub clips: ClipNames,
    pub bindings: InputBindings,
    pub obstacles: Vec<ObstacleConfig>,
    pub camera: CameraConfig,
}

/// Command-line values that win over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StageConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(base_url) = &overrides.base_url {
            self.remote.base_url = base_url.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapestage_character::RevivalPolicy;
    use shapestage_input::{Action, KeyCode};
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let config = StageConfig::from_yaml("{}").unwrap();
        assert_eq!(config, StageConfig::default());
        assert_eq!(config.remote.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.character.speed, 10.0);
        assert_eq!(config.clips.run, "Running");
        assert_eq!(
            config.bindings.action_for(&KeyCode::from("KeyW")),
            Some(Action::Run)
        );
        assert_eq!(config.camera.fov_degrees, 45.0);
    }

    #[test]
    fn sections_parse() {
        let yaml = r#"
remote:
  base_url: http://shapes.local
character:
  model: models/Xbot.glb
  speed: 4
  revival: clip_finished
clips:
  dance: Samba
obstacles:
  - model: models/tree.glb
    position: [10, 0, -5]
    radius: 2.5
"#;
        let config = StageConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.remote.base_url, "http://shapes.local");
        assert_eq!(config.remote.timeout_ms, RemoteConfig::default().timeout_ms);
        assert_eq!(config.character.model.as_deref(), Some("models/Xbot.glb"));
        assert_eq!(config.character.speed, 4.0);
        assert_eq!(config.character.radius, 1.0);
        assert_eq!(config.character.revival, RevivalPolicy::ClipFinished);
        assert_eq!(config.clips.dance, "Samba");
        assert_eq!(config.clips.wave, "Wave");
        assert_eq!(config.obstacles.len(), 1);
        assert_eq!(config.obstacles[0].position, Vec3::new(10.0, 0.0, -5.0));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StageConfig::load(dir.path().join("stage.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_from_file_and_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "camera:\n  fov_degrees: 50").unwrap();
        let mut config = StageConfig::load(file.path()).unwrap();
        assert_eq!(config.camera.fov_degrees, 50.0);

        config.apply_overrides(&ConfigOverrides {
            base_url: Some("http://10.0.0.2:8080".into()),
        });
        assert_eq!(config.remote.base_url, "http://10.0.0.2:8080");
    }

    #[test]
    fn bad_yaml_is_an_error() {
        let err = StageConfig::from_yaml("obstacles: 5").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
