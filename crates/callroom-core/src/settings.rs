use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::capture::CameraPosition;
use crate::errors::CallError;

/// Call preferences read at startup. Never written back.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub display_name: Option<String>,
    /// Endpoint of the access-token service used by `HttpTokenProvider`.
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default = "default_true")]
    pub mic_enabled_on_join: bool,
    #[serde(default)]
    pub camera_enabled_on_join: bool,
    #[serde(default)]
    pub camera_position: CameraPosition,
    #[serde(default = "default_true")]
    pub dominant_speaker_enabled: bool,
    #[serde(default = "default_true")]
    pub network_quality_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_name: None,
            token_url: None,
            mic_enabled_on_join: true,
            camera_enabled_on_join: false,
            camera_position: CameraPosition::Front,
            dominant_speaker_enabled: true,
            network_quality_enabled: true,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, CallError> {
        serde_json::from_str(json).map_err(|e| CallError::Settings(e.to_string()))
    }

    /// Reads `settings.json` from `data_dir`. A missing or unusable file
    /// yields the defaults.
    pub fn load(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("cannot read {}: {e}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.display_name, None);
        assert_eq!(s.token_url, None);
        assert!(s.mic_enabled_on_join);
        assert!(!s.camera_enabled_on_join);
        assert_eq!(s.camera_position, CameraPosition::Front);
        assert!(s.dominant_speaker_enabled);
        assert!(s.network_quality_enabled);
    }

    #[test]
    fn test_load_defaults_when_no_file() {
        let dir = temp_dir();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = temp_dir();
        fs::write(
            dir.path().join("settings.json"),
            r#"{
                "display_name": "Alice",
                "token_url": "https://tokens.example.com/token",
                "mic_enabled_on_join": false,
                "camera_enabled_on_join": true,
                "camera_position": "back"
            }"#,
        )
        .unwrap();

        let s = Settings::load(dir.path());
        assert_eq!(s.display_name.as_deref(), Some("Alice"));
        assert_eq!(s.token_url.as_deref(), Some("https://tokens.example.com/token"));
        assert!(!s.mic_enabled_on_join);
        assert!(s.camera_enabled_on_join);
        assert_eq!(s.camera_position, CameraPosition::Back);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = temp_dir();
        fs::write(dir.path().join("settings.json"), "not json!!!").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn test_partial_json_uses_serde_defaults() {
        let s = Settings::from_json(r#"{"display_name":"Eve"}"#).unwrap();
        assert_eq!(s.display_name, Some("Eve".to_string()));
        assert!(s.mic_enabled_on_join);
        assert!(!s.camera_enabled_on_join);
        assert!(s.network_quality_enabled);
    }

    #[test]
    fn test_from_json_reports_errors() {
        let err = Settings::from_json("{").unwrap_err();
        assert!(matches!(err, CallError::Settings(_)));
    }
}
