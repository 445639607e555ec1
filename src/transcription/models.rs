use crate::error::Result;
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

const GGML_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    LargeV3Turbo,
}

impl ModelSize {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "tiny" => Some(Self::Tiny),
            "base" => Some(Self::Base),
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "largev3turbo" | "large" => Some(Self::LargeV3Turbo),
            _ => None,
        }
    }

    pub fn all() -> &'static [ModelSize] {
        &[
            Self::Tiny,
            Self::Base,
            Self::Small,
            Self::Medium,
            Self::LargeV3Turbo,
        ]
    }

    fn stem(&self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Base => "base",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::LargeV3Turbo => "large-v3-turbo",
        }
    }

    /// whisper.cpp publishes English-only weights for the smaller sizes
    /// but not for the large family.
    fn has_english_variant(&self) -> bool {
        !matches!(self, Self::LargeV3Turbo)
    }

    pub fn size_mb(&self) -> u64 {
        match self {
            Self::Tiny => 75,
            Self::Base => 142,
            Self::Small => 466,
            Self::Medium => 1500,
            Self::LargeV3Turbo => 1620,
        }
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stem())
    }
}

/// A concrete GGML weights file: a size plus, for English-only input, the
/// `.en` variant where one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhisperModel {
    pub size: ModelSize,
    pub english_only: bool,
}

impl WhisperModel {
    pub fn multilingual(size: ModelSize) -> Self {
        Self {
            size,
            english_only: false,
        }
    }

    /// Pick the variant for a language: English gets the `.en` weights
    /// when the size has them, everything else the multilingual ones.
    pub fn for_language(size: ModelSize, lang_code: &str) -> Self {
        Self {
            size,
            english_only: lang_code == "en" && size.has_english_variant(),
        }
    }

    /// Parse a model name like `small` or `small.en`.
    pub fn from_str(s: &str) -> Option<Self> {
        let (stem, english_only) = match s.strip_suffix(".en") {
            Some(stem) => (stem, true),
            None => (s, false),
        };
        let size = ModelSize::from_str(stem)?;
        if english_only && !size.has_english_variant() {
            return None;
        }
        Some(Self { size, english_only })
    }

    pub fn filename(&self) -> String {
        if self.english_only {
            format!("ggml-{}.en.bin", self.size.stem())
        } else {
            format!("ggml-{}.bin", self.size.stem())
        }
    }

    pub fn download_url(&self) -> String {
        format!("{}/{}", GGML_BASE_URL, self.filename())
    }

    pub fn size_mb(&self) -> u64 {
        self.size.size_mb()
    }

    /// Every downloadable weights file, multilingual variants first.
    pub fn catalog() -> Vec<WhisperModel> {
        let mut models: Vec<WhisperModel> =
            ModelSize::all().iter().map(|s| Self::multilingual(*s)).collect();
        models.extend(
            ModelSize::all()
                .iter()
                .filter(|s| s.has_english_variant())
                .map(|s| WhisperModel {
                    size: *s,
                    english_only: true,
                }),
        );
        models
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.english_only {
            write!(f, "{}.en", self.size)
        } else {
            write!(f, "{}", self.size)
        }
    }
}

pub struct ModelManager {
    models_dir: PathBuf,
}

impl ModelManager {
    pub fn new(models_dir: PathBuf) -> Self {
        Self { models_dir }
    }

    pub fn model_path(&self, model: WhisperModel) -> PathBuf {
        self.models_dir.join(model.filename())
    }

    pub fn model_exists(&self, model: WhisperModel) -> bool {
        self.model_path(model).exists()
    }

    pub fn list_all(&self) -> Vec<(WhisperModel, bool, u64)> {
        WhisperModel::catalog()
            .into_iter()
            .map(|m| (m, self.model_exists(m), m.size_mb()))
            .collect()
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.models_dir)?;
        Ok(())
    }

    pub fn download_model<F>(&self, model: WhisperModel, progress: F) -> Result<PathBuf>
    where
        F: Fn(u64, u64),
    {
        self.ensure_dir()?;

        let path = self.model_path(model);

        if path.exists() {
            let size = fs::metadata(&path)?.len();
            progress(size, size);
            return Ok(path);
        }

        let temp_path = path.with_extension("bin.tmp");

        let response = reqwest::blocking::Client::new()
            .get(model.download_url())
            .send()?
            .error_for_status()?;

        let total_size = response
            .content_length()
            .unwrap_or(model.size_mb() * 1024 * 1024);

        let mut file = fs::File::create(&temp_path)?;
        let mut downloaded: u64 = 0;

        let mut reader = response;
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer)?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])?;
            downloaded += bytes_read as u64;
            progress(downloaded, total_size);
        }

        fs::rename(&temp_path, &path)?;

        Ok(path)
    }

    pub fn delete_model(&self, model: WhisperModel) -> Result<()> {
        let path = self.model_path(model);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
