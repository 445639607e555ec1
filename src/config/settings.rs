use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterizeConfig {
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    #[serde(default)]
    pub ffmpeg: FfmpegConfig,

    #[serde(default)]
    pub cue: CueConfig,
}

impl Default for ChapterizeConfig {
    fn default() -> Self {
        Self {
            transcription: TranscriptionConfig::default(),
            ffmpeg: FfmpegConfig::default(),
            cue: CueConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Model size: tiny, base, small, medium, large-v3-turbo
    #[serde(default = "default_model")]
    pub model: String,
    /// Language code or name (see `chapterize languages`)
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub use_gpu: bool,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "small".to_string(),
            language: "en".to_string(),
            use_gpu: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FfmpegConfig {
    /// Explicit ffmpeg binary path (None = system PATH)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CueConfig {
    /// Generate a cue file next to the audiobook for editing chapter markers
    #[serde(default)]
    pub generate: bool,
    /// Cue file in a non-default location
    pub path: Option<PathBuf>,
}

fn default_model() -> String {
    "small".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChapterizeConfig::default();
        assert_eq!(config.transcription.model, "small");
        assert_eq!(config.transcription.language, "en");
        assert!(!config.transcription.use_gpu);
        assert!(config.ffmpeg.path.is_none());
        assert!(!config.cue.generate);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ChapterizeConfig = toml::from_str("").unwrap();
        assert_eq!(config.transcription.model, "small");
        assert!(config.cue.path.is_none());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: ChapterizeConfig = toml::from_str(
            "[transcription]\nlanguage = \"de\"\n\n[cue]\ngenerate = true\n",
        )
        .unwrap();
        assert_eq!(config.transcription.language, "de");
        assert_eq!(config.transcription.model, "small");
        assert!(config.cue.generate);
    }
}
