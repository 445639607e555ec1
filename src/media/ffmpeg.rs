use crate::error::{ChapterizeError, Result};
use crate::timecode::ChapterBoundary;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Tags worth carrying over from the source file.
const TAG_KEYS: &[&str] = &[
    "title",
    "genre",
    "album_artist",
    "artist",
    "album",
    "date",
    "year",
];

/// Wrapper around the ffmpeg/ffprobe binaries.
pub struct Ffmpeg {
    binary: PathBuf,
    probe: PathBuf,
}

impl Ffmpeg {
    /// Resolve ffmpeg and ffprobe from an explicit path or the system PATH.
    pub fn resolve(configured: Option<&Path>) -> Result<Self> {
        let binary = match configured {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => {
                warn!(
                    "configured ffmpeg path {} does not exist, trying system PATH",
                    path.display()
                );
                PathBuf::from("ffmpeg")
            }
            None => PathBuf::from("ffmpeg"),
        };
        // ffprobe sits next to an explicitly configured ffmpeg
        let probe = match binary.parent() {
            Some(dir) if dir != Path::new("") => dir.join("ffprobe"),
            _ => PathBuf::from("ffprobe"),
        };

        let this = Self { binary, probe };
        this.verify()?;
        Ok(this)
    }

    fn verify(&self) -> Result<()> {
        Command::new(&self.binary)
            .arg("-version")
            .output()
            .map_err(|_| {
                ChapterizeError::Ffmpeg(format!(
                    "{} not found; install ffmpeg or set its path in the config",
                    self.binary.display()
                ))
            })?;
        Ok(())
    }

    fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        debug!("ffmpeg {}", args.join(" "));
        let output = Command::new(&self.binary).args(args).output()?;
        if !output.status.success() {
            return Err(ChapterizeError::Ffmpeg(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output)
    }

    /// Dump the source file's tags and return the whitelisted ones.
    /// A file with no tags yields an empty map, not an error.
    pub fn extract_metadata(&self, audiobook: &Path) -> Result<HashMap<String, String>> {
        let parent = audiobook.parent().unwrap_or_else(|| Path::new("."));
        let dump = parent.join("metadata.txt");

        let result = self.run(&[
            "-y",
            "-loglevel",
            "quiet",
            "-i",
            &audiobook.to_string_lossy(),
            "-f",
            "ffmetadata",
            &dump.to_string_lossy(),
        ]);

        let mut tags = HashMap::new();
        if result.is_ok() && dump.exists() {
            for line in fs::read_to_string(&dump)?.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    if TAG_KEYS.contains(&key) {
                        tags.insert(key.to_string(), value.to_string());
                    }
                }
            }
        } else {
            warn!("failed to extract metadata from {}", audiobook.display());
        }
        if dump.exists() {
            fs::remove_file(&dump)?;
        }
        Ok(tags)
    }

    /// Extract embedded cover art next to the audiobook, if any.
    pub fn extract_cover_art(&self, audiobook: &Path) -> Result<Option<PathBuf>> {
        let cover = audiobook.with_extension("jpg");
        let result = self.run(&[
            "-y",
            "-loglevel",
            "quiet",
            "-i",
            &audiobook.to_string_lossy(),
            "-an",
            "-c:v",
            "copy",
            &cover.to_string_lossy(),
        ]);

        // a file smaller than a few bytes is a failed extraction artifact
        if result.is_ok() && cover.exists() && fs::metadata(&cover)?.len() > 10 {
            Ok(Some(cover))
        } else {
            warn!("no cover art found in {}", audiobook.display());
            if cover.exists() {
                fs::remove_file(&cover)?;
            }
            Ok(None)
        }
    }

    /// Total duration of the recording in fractional seconds, via ffprobe.
    pub fn total_duration(&self, audiobook: &Path) -> Result<f64> {
        let output = Command::new(&self.probe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(audiobook)
            .output()
            .map_err(|_| {
                ChapterizeError::Ffmpeg(format!("{} not found", self.probe.display()))
            })?;
        if !output.status.success() {
            return Err(ChapterizeError::Ffmpeg(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.trim().parse().map_err(|_| {
            ChapterizeError::Ffmpeg(format!("unexpected ffprobe duration output: {}", stdout.trim()))
        })
    }

    /// Convert the audiobook to the 16kHz mono wav the transcription
    /// engine expects. The caller removes the file when done.
    pub fn convert_to_wav(&self, audiobook: &Path) -> Result<PathBuf> {
        let wav = audiobook.with_extension("wav");
        self.run(&[
            "-y",
            "-loglevel",
            "quiet",
            "-i",
            &audiobook.to_string_lossy(),
            "-ar",
            "16000",
            "-ac",
            "1",
            &wav.to_string_lossy(),
        ])?;
        Ok(wav)
    }

    /// Mux chapter markers, tags, and optional cover art into a copy of
    /// the audiobook. Audio is stream-copied, never re-encoded.
    pub fn write_chapters(
        &self,
        audiobook: &Path,
        boundaries: &[ChapterBoundary],
        tags: &HashMap<String, String>,
        cover_art: Option<&Path>,
    ) -> Result<PathBuf> {
        let parent = audiobook.parent().unwrap_or_else(|| Path::new("."));
        let metadata_path = parent.join("FFMETADATAFILE");
        fs::write(&metadata_path, render_ffmetadata(boundaries, tags)?)?;

        let stem = audiobook
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audiobook");
        let output_path = parent.join(format!("{} - Chapters.mp3", stem));

        let mut command = Command::new(&self.binary);
        command
            .args(["-y", "-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(audiobook)
            .arg("-i")
            .arg(&metadata_path);
        if let Some(cover) = cover_art {
            command
                .arg("-i")
                .arg(cover)
                .args(["-map_metadata", "1", "-map", "0", "-map", "2"])
                .args(["-c", "copy", "-id3v2_version", "3"])
                .args(["-metadata:s:v", "comment=Cover (front)"]);
        } else {
            command
                .args(["-map_metadata", "1", "-map", "0"])
                .args(["-c", "copy", "-id3v2_version", "3"]);
        }
        command.arg(&output_path);

        let result = command.output();
        fs::remove_file(&metadata_path)?;

        let output = result?;
        if !output.status.success() {
            return Err(ChapterizeError::Ffmpeg(format!(
                "chapter mux exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if !output_path.exists() {
            return Err(ChapterizeError::Ffmpeg(
                "chapter mux produced no output file".to_string(),
            ));
        }
        Ok(output_path)
    }
}

/// Render the ffmetadata document: global tags, then one `[CHAPTER]`
/// block per boundary with millisecond start/end and the label as title.
fn render_ffmetadata(
    boundaries: &[ChapterBoundary],
    tags: &HashMap<String, String>,
) -> Result<String> {
    let mut meta = String::from(";FFMETADATA1\n");

    if let Some(artist) = tags.get("album_artist") {
        meta.push_str(&format!("album_artist={}\n", escape(artist)));
        meta.push_str(&format!("artist={}\n", escape(artist)));
    }
    for key in ["genre", "album", "date", "comment", "description"] {
        if let Some(value) = tags.get(key) {
            meta.push_str(&format!("{}={}\n", key, escape(value)));
        }
    }
    if let Some(narrator) = tags.get("narrator") {
        meta.push_str(&format!("composer={}\n", escape(narrator)));
    }

    for boundary in boundaries {
        let end = boundary.end.ok_or_else(|| {
            ChapterizeError::InvalidInput(format!(
                "chapter {:?} has no end marker",
                boundary.label
            ))
        })?;
        meta.push_str("[CHAPTER]\n");
        meta.push_str("TIMEBASE=1/1000\n");
        meta.push_str(&format!("START={}\n", boundary.start.total_millis()));
        meta.push_str(&format!("END={}\n", end.total_millis()));
        meta.push_str(&format!("TITLE={}\n\n", escape(&boundary.label)));
    }

    Ok(meta)
}

/// Backslash-escape the characters the ffmetadata format treats specially.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timecode::Duration;

    fn finalized_boundary(start: &str, end: &str, label: &str) -> ChapterBoundary {
        let mut b = ChapterBoundary::new(Duration::parse(start).unwrap(), label);
        b.end = Some(Duration::parse(end).unwrap());
        b
    }

    #[test]
    fn test_render_ffmetadata_chapters() {
        let boundaries = vec![
            finalized_boundary("00:00:00.000", "00:09:59.000", "Chapter 01"),
            finalized_boundary("00:10:00.000", "00:20:00.500", "Chapter 02"),
        ];
        let meta = render_ffmetadata(&boundaries, &HashMap::new()).unwrap();
        assert!(meta.starts_with(";FFMETADATA1\n"));
        assert!(meta.contains("[CHAPTER]\nTIMEBASE=1/1000\nSTART=0\nEND=599000\nTITLE=Chapter 01\n"));
        assert!(meta.contains("START=600000\nEND=1200500\nTITLE=Chapter 02\n"));
    }

    #[test]
    fn test_render_ffmetadata_tags() {
        let mut tags = HashMap::new();
        tags.insert("album_artist".to_string(), "A. Uthor".to_string());
        tags.insert("narrator".to_string(), "N. Arrator".to_string());
        tags.insert("genre".to_string(), "Audiobook".to_string());
        let boundaries = vec![finalized_boundary("00:00:00.000", "00:01:00.000", "Prologue")];
        let meta = render_ffmetadata(&boundaries, &tags).unwrap();
        assert!(meta.contains("album_artist=A. Uthor\n"));
        assert!(meta.contains("artist=A. Uthor\n"));
        assert!(meta.contains("composer=N. Arrator\n"));
        assert!(meta.contains("genre=Audiobook\n"));
    }

    #[test]
    fn test_render_ffmetadata_requires_ends() {
        let boundaries = vec![ChapterBoundary::new(Duration::ZERO, "Chapter 01")];
        assert!(matches!(
            render_ffmetadata(&boundaries, &HashMap::new()),
            Err(ChapterizeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape("A=B;C#D\\E"), "A\\=B\\;C\\#D\\\\E");
        assert_eq!(escape("plain title"), "plain title");
    }
}
