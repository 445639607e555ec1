use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChapterizeError {
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Cannot decrement timestamp below 00:00:00: {0}")]
    TimeUnderflow(String),

    #[error("No chapters detected in transcript")]
    NoChaptersDetected,

    #[error("Failed to write cue file: {0}")]
    SidecarWrite(String),

    #[error("Failed to parse cue file: {0}")]
    SidecarParse(String),

    #[error("ffmpeg error: {0}")]
    Ffmpeg(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Whisper model not found: {0}")]
    WhisperModelNotFound(PathBuf),

    #[error("Language not configured: {0}")]
    LanguageNotConfigured(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChapterizeError>;
