use crate::cli::commands::*;
use crate::config;
use crate::cue;
use crate::error::{ChapterizeError, Result};
use crate::markers;
use crate::media::ffmpeg::Ffmpeg;
use crate::media::metadata::merge_tags;
use crate::timecode::{detect_chapters, finalize, ChapterBoundary, Duration};
use crate::transcription::models::{ModelManager, ModelSize, WhisperModel};
use crate::transcription::whisper::{load_wav_samples, WhisperEngine};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Split(args) => handle_split(args),
        Commands::Languages => handle_languages(),
        Commands::Models { action } => handle_models(action),
        Commands::Config { action } => handle_config(action),
    }
}

fn handle_split(args: SplitArgs) -> Result<()> {
    let audiobook = args.audiobook.clone();
    if !audiobook.exists() {
        return Err(ChapterizeError::InvalidInput(format!(
            "audiobook not found: {}",
            audiobook.display()
        )));
    }
    let is_mp3 = audiobook
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false);
    if !is_mp3 {
        return Err(ChapterizeError::InvalidInput(
            "only .mp3 audiobooks are supported".to_string(),
        ));
    }

    let config = config::loader::load_config_with_env()?;

    let language_input = args
        .language
        .clone()
        .unwrap_or_else(|| config.transcription.language.clone());
    let language = markers::resolve_language(&language_input)?;
    let table = markers::table_for(language)
        .ok_or_else(|| ChapterizeError::LanguageNotConfigured(language.to_string()))?;

    let ffmpeg = Ffmpeg::resolve(config.ffmpeg.path.as_deref())?;

    // Tags from the source file, overridden by anything the user passed
    let extracted = ffmpeg.extract_metadata(&audiobook)?;
    let tags = merge_tags(extracted, user_tags(&args));

    let cover_art = match &args.cover_art {
        Some(path) if path.exists() => Some(path.clone()),
        Some(path) => {
            warn!("cover art path {} does not exist", path.display());
            None
        }
        None => ffmpeg.extract_cover_art(&audiobook)?,
    };

    let srt_path = args
        .transcript
        .clone()
        .unwrap_or_else(|| audiobook.with_extension("srt"));
    if srt_path.exists() && fs::metadata(&srt_path)?.len() > 10 {
        info!("reusing existing transcript {}", srt_path.display());
    } else {
        let model_name = args
            .model
            .clone()
            .unwrap_or_else(|| config.transcription.model.clone());
        transcribe_to_srt(
            &ffmpeg,
            &audiobook,
            &srt_path,
            &model_name,
            language,
            config.transcription.use_gpu,
        )?;
    }

    let cue_file = resolve_cue_path(&args, &config.cue, &audiobook);
    let mut boundaries = match &cue_file {
        Some(path) if path.exists() => {
            info!("reading chapter markers from cue file {}", path.display());
            cue::read_cue(path)?
        }
        _ => {
            let content = fs::read_to_string(&srt_path)?;
            detect_chapters(content.lines(), table)?
        }
    };

    let total = ffmpeg.total_duration(&audiobook)?;
    finalize(&mut boundaries, Duration::from_secs_f64(total))?;

    print_chapter_table(&boundaries);

    if let Some(path) = &cue_file {
        if path.exists() {
            println!("An existing cue file was found. Move, delete, or rename it to generate a new one.");
        } else {
            let source_name = audiobook
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("audiobook.mp3");
            cue::write_cue(path, source_name, &boundaries)?;
            println!("Cue file written to: {}", path.display());
        }
    }

    let output = ffmpeg.write_chapters(&audiobook, &boundaries, &tags, cover_art.as_deref())?;
    println!("Chaptered audiobook written to: {}", output.display());
    Ok(())
}

/// Tags assembled from the split command's flags, keyed the way the
/// ffmetadata writer expects them.
fn user_tags(args: &SplitArgs) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    tags.insert("genre".to_string(), args.genre.clone());
    if let Some(author) = &args.author {
        tags.insert("album_artist".to_string(), author.clone());
    }
    if let Some(title) = &args.title {
        tags.insert("album".to_string(), title.clone());
    }
    if let Some(year) = &args.year {
        tags.insert("date".to_string(), year.clone());
    }
    if let Some(comment) = &args.comment {
        tags.insert("comment".to_string(), comment.clone());
    }
    if let Some(description) = &args.description {
        tags.insert("description".to_string(), description.clone());
    }
    if let Some(narrator) = &args.narrator {
        tags.insert("narrator".to_string(), narrator.clone());
    }
    tags
}

/// Where the cue file lives, if cue handling is enabled at all.
/// Precedence: --cue-path, then the configured path, then the default
/// location next to the audiobook when writing was requested or a cue
/// already sits there.
fn resolve_cue_path(
    args: &SplitArgs,
    cue_config: &config::settings::CueConfig,
    audiobook: &Path,
) -> Option<PathBuf> {
    if let Some(path) = &args.cue_path {
        return Some(path.clone());
    }
    if let Some(path) = &cue_config.path {
        if path.exists() {
            return Some(path.clone());
        }
        warn!(
            "cue path {} from config does not exist and will be skipped",
            path.display()
        );
        return None;
    }
    let default = audiobook.with_extension("cue");
    if args.write_cue || cue_config.generate || default.exists() {
        return Some(default);
    }
    None
}

fn transcribe_to_srt(
    ffmpeg: &Ffmpeg,
    audiobook: &Path,
    srt_path: &Path,
    model_name: &str,
    language: &str,
    use_gpu: bool,
) -> Result<()> {
    let size = ModelSize::from_str(model_name).ok_or_else(|| {
        ChapterizeError::Config(format!(
            "Unknown model: {}. Use: tiny, base, small, medium, large-v3-turbo",
            model_name
        ))
    })?;
    let model = WhisperModel::for_language(size, language);

    let manager = ModelManager::new(config::loader::models_dir()?);
    let model_path = manager.model_path(model);
    if !model_path.exists() {
        eprintln!("Download the model with: chapterize models download {}", model);
        return Err(ChapterizeError::WhisperModelNotFound(model_path));
    }

    info!("transcribing {} (this may take a while)", audiobook.display());
    let wav = ffmpeg.convert_to_wav(audiobook)?;
    let samples = load_wav_samples(&wav);
    // the intermediate wav is large; drop it even when loading failed
    fs::remove_file(&wav)?;
    let samples = samples?;

    let engine = WhisperEngine::new(&model_path, use_gpu)?;
    let transcript = engine.transcribe(&samples, Some(language))?;
    transcript.write_srt(srt_path)?;
    info!("transcript written to {}", srt_path.display());
    Ok(())
}

fn print_chapter_table(boundaries: &[ChapterBoundary]) {
    println!("{:<14} {:<14} {:<20}", "Start", "End", "Chapter");
    println!("{}", "-".repeat(48));
    for boundary in boundaries {
        let end = boundary
            .end
            .map(|e| e.stamp())
            .unwrap_or_else(|| "EOF".to_string());
        println!(
            "{:<14} {:<14} {:<20}",
            boundary.start.stamp(),
            end,
            boundary.label
        );
    }
}

fn handle_languages() -> Result<()> {
    println!("{:<12} {:<6}", "Language", "Code");
    println!("{}", "-".repeat(18));
    for (name, code) in markers::LANGUAGES {
        println!("{:<12} {:<6}", name, code);
    }
    Ok(())
}

fn handle_models(action: ModelCommands) -> Result<()> {
    let manager = ModelManager::new(config::loader::models_dir()?);

    match action {
        ModelCommands::List => {
            println!("{:<18} {:<12} {:<10}", "Model", "Size (MB)", "Downloaded");
            println!("{}", "-".repeat(40));

            for (model, exists, size) in manager.list_all() {
                let status = if exists { "✓" } else { "-" };
                println!("{:<18} {:<12} {:<10}", model.to_string(), size, status);
            }
        }
        ModelCommands::Download { model } => {
            let whisper_model = WhisperModel::from_str(&model).ok_or_else(|| {
                ChapterizeError::Config(format!(
                    "Unknown model: {}. Use: tiny, base, small, medium, large-v3-turbo, or an English-only variant like small.en",
                    model
                ))
            })?;

            println!(
                "Downloading {} model (~{} MB)...",
                whisper_model,
                whisper_model.size_mb()
            );

            let path = manager.download_model(whisper_model, |downloaded, total| {
                let percent = (downloaded as f64 / total as f64 * 100.0) as u32;
                print!(
                    "\rProgress: {}% ({}/{} MB)",
                    percent,
                    downloaded / 1024 / 1024,
                    total / 1024 / 1024
                );
                std::io::stdout().flush().ok();
            })?;

            println!("\nDownloaded to: {}", path.display());
        }
        ModelCommands::Delete { model } => {
            let whisper_model = WhisperModel::from_str(&model)
                .ok_or_else(|| ChapterizeError::Config(format!("Unknown model: {}", model)))?;

            manager.delete_model(whisper_model)?;
            println!("Deleted {} model", model);
        }
    }
    Ok(())
}

fn handle_config(action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let cfg = config::loader::load_config()?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigCommands::Edit => {
            let path = config::loader::config_path()?;
            if !path.exists() {
                config::loader::save_config(&Default::default())?;
            }
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());
            std::process::Command::new(&editor).arg(&path).status()?;
        }
        ConfigCommands::Path => {
            println!("{}", config::loader::config_path()?.display());
        }
        ConfigCommands::Init => {
            let cfg = config::loader::load_config()?;
            println!(
                "Configuration initialized at: {}",
                config::loader::config_path()?.display()
            );
            println!("\nDefault settings:");
            println!("  Model: {}", cfg.transcription.model);
            println!("  Language: {}", cfg.transcription.language);
            println!("  Generate cue file: {}", cfg.cue.generate);
        }
    }
    Ok(())
}
