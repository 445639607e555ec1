use crate::config::settings::ChapterizeConfig;
use crate::error::{ChapterizeError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// Get XDG-compliant config directory
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "chapterize")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ChapterizeError::Config("Could not determine config directory".to_string()))
}

/// Get XDG-compliant data directory
pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "chapterize")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ChapterizeError::Config("Could not determine data directory".to_string()))
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get models directory
pub fn models_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("models"))
}

/// Load config from file, creating default if not exists
pub fn load_config() -> Result<ChapterizeConfig> {
    let path = config_path()?;

    if !path.exists() {
        let config = ChapterizeConfig::default();
        save_config(&config)?;
        return Ok(config);
    }

    let content = fs::read_to_string(&path)?;
    let config: ChapterizeConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save config to file
pub fn save_config(config: &ChapterizeConfig) -> Result<()> {
    let path = config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(&path, content)?;
    Ok(())
}

/// Load config with environment variable overrides
pub fn load_config_with_env() -> Result<ChapterizeConfig> {
    let mut config = load_config()?;

    if let Ok(model) = std::env::var("CHAPTERIZE_MODEL") {
        config.transcription.model = model;
    }
    if let Ok(language) = std::env::var("CHAPTERIZE_LANGUAGE") {
        config.transcription.language = language;
    }
    if let Ok(path) = std::env::var("CHAPTERIZE_FFMPEG") {
        config.ffmpeg.path = Some(PathBuf::from(path));
    }

    Ok(config)
}
