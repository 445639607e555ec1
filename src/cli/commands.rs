use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chapterize")]
#[command(
    author,
    version,
    about = "Split a monolithic mp3 audiobook into chapters using speech-to-text"
)]
#[command(
    long_about = "Transcribes an audiobook with whisper.cpp, detects spoken chapter announcements, and muxes the resulting chapter markers and metadata back into the file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect chapters and write a chaptered copy of the audiobook
    Split(SplitArgs),

    /// List configured languages and exit
    Languages,

    /// Whisper model management
    Models {
        #[command(subcommand)]
        action: ModelCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Args)]
pub struct SplitArgs {
    /// Path to the audiobook file
    pub audiobook: PathBuf,

    /// Transcript language, as a code or English name (overrides config)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Model size: tiny, base, small, medium, large-v3-turbo (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Existing transcript file to reuse instead of transcribing
    #[arg(long)]
    pub transcript: Option<PathBuf>,

    /// Path to cover art file. Extracted from the audiobook if omitted
    #[arg(long)]
    pub cover_art: Option<PathBuf>,

    /// Author. Saved as the album_artist and artist tags
    #[arg(short, long)]
    pub author: Option<String>,

    /// Audiobook title. Saved as the album tag
    #[arg(short, long)]
    pub title: Option<String>,

    /// Narrator. Saved as the composer tag
    #[arg(short, long)]
    pub narrator: Option<String>,

    /// Genre. Separate multiple genres with a semicolon
    #[arg(short, long, default_value = "Audiobook")]
    pub genre: String,

    /// Release year
    #[arg(short, long)]
    pub year: Option<String>,

    /// Comment
    #[arg(short, long)]
    pub comment: Option<String>,

    /// Book description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Write a cue file next to the audiobook for editing chapter markers
    #[arg(long)]
    pub write_cue: bool,

    /// Cue file in a non-default location (overrides config)
    #[arg(long)]
    pub cue_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ModelCommands {
    /// List available whisper models
    List,
    /// Download a whisper model
    Download {
        /// Model name: tiny, base, small, medium, large-v3-turbo, or an
        /// English-only variant like small.en
        model: String,
    },
    /// Delete a downloaded model
    Delete { model: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Open config file in editor
    Edit,
    /// Print config file path
    Path,
    /// Initialize default configuration
    Init,
}
