//! Analysis configuration.
//!
//! Every field has a default matching the standard VADPCM layout, so an empty
//! JSON object is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aiff::FourCc;
use crate::error::ConfigError;
use crate::vadpcm::{FRAME_BYTE_SIZE, FRAME_SAMPLE_COUNT};

fn default_frame_byte_size() -> usize {
    FRAME_BYTE_SIZE
}

fn default_frame_sample_width() -> usize {
    FRAME_SAMPLE_COUNT
}

fn default_sound_data_tag() -> FourCc {
    FourCc::SSND
}

/// Frame layout used to extract and align frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Bytes per compressed frame (default: 9)
    #[serde(default = "default_frame_byte_size")]
    pub frame_byte_size: usize,
    /// Decoded samples per frame (default: 16)
    #[serde(default = "default_frame_sample_width")]
    pub frame_sample_width: usize,
    /// Tag of the chunk holding compressed frames (default: "SSND")
    #[serde(default = "default_sound_data_tag")]
    pub sound_data_tag: FourCc,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_byte_size: default_frame_byte_size(),
            frame_sample_width: default_frame_sample_width(),
            sound_data_tag: default_sound_data_tag(),
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks that the frame sizes are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_byte_size == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_byte_size",
                message: "must be at least 1".to_string(),
            });
        }
        if self.frame_sample_width == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_sample_width",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.frame_byte_size, 9);
        assert_eq!(config.frame_sample_width, 16);
        assert_eq!(config.sound_data_tag, FourCc::SSND);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(
            AnalysisConfig::from_json("{}").unwrap(),
            AnalysisConfig::default()
        );
    }

    #[test]
    fn test_partial_json() {
        let config = AnalysisConfig::from_json(r#"{"sound_data_tag": "DATA"}"#).unwrap();
        assert_eq!(config.sound_data_tag, FourCc(*b"DATA"));
        assert_eq!(config.frame_byte_size, 9);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let err = AnalysisConfig::from_json(r#"{"frame_sample_width": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "frame_sample_width",
                ..
            }
        ));
        assert_eq!(err.code(), "CFG_003");
        assert!(AnalysisConfig::from_json(r#"{"frame_byte_size": 0}"#).is_err());
    }

    #[test]
    fn test_bad_tag_and_unknown_field() {
        assert!(matches!(
            AnalysisConfig::from_json(r#"{"sound_data_tag": "TOOLONG"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{"frame_bytes": 9}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let err = AnalysisConfig::from_file(Path::new("/nonexistent/vadpcm.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
