use crate::error::Result;
use crate::timecode::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub mod models;
pub mod whisper;

/// A segment of transcribed speech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start_ms: u64, end_ms: u64, text: String) -> Self {
        Self {
            start_ms,
            end_ms,
            text,
        }
    }
}

/// Full transcript of a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
    pub language: Option<String>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self {
            segments,
            language: None,
        }
    }

    /// Render in SubRip form: index line, `HH:MM:SS,mmm --> HH:MM:SS,mmm`
    /// range line, text line, blank separator. This is the form the chapter
    /// detector scans.
    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            out.push_str(&format!("{}\n", i + 1));
            out.push_str(&format!(
                "{} --> {}\n",
                Duration::from_millis(segment.start_ms).srt_stamp(),
                Duration::from_millis(segment.end_ms).srt_stamp()
            ));
            out.push_str(segment.text.trim());
            out.push_str("\n\n");
        }
        out
    }

    pub fn write_srt(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_srt())?;
        Ok(())
    }
}
