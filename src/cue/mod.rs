use crate::error::{ChapterizeError, Result};
use crate::timecode::{ChapterBoundary, Duration};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"TITLE\t"(.*)""#).unwrap());
static START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"START\t(.+)").unwrap());
static END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"END\t+(.+)").unwrap());

/// Write a boundary list to a cue sidecar file for hand editing.
///
/// The file is created exclusively: an existing cue is never overwritten,
/// since it may hold the user's corrections. The final track carries no
/// `END` line; that end is recomputed from the recording's total duration
/// whenever the cue is read back. A failed write removes the partial file
/// so a later run never parses a truncated sidecar.
pub fn write_cue(path: &Path, source_name: &str, boundaries: &[ChapterBoundary]) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| ChapterizeError::SidecarWrite(format!("{}: {}", path.display(), e)))?;

    if let Err(e) = write_tracks(file, source_name, boundaries) {
        let _ = fs::remove_file(path);
        return Err(ChapterizeError::SidecarWrite(e.to_string()));
    }
    Ok(())
}

fn write_tracks(file: File, source_name: &str, boundaries: &[ChapterBoundary]) -> io::Result<()> {
    let mut w = BufWriter::new(file);
    writeln!(w, "FILE \"{}\" MP3", source_name)?;
    for (i, boundary) in boundaries.iter().enumerate() {
        writeln!(w, "TRACK {} AUDIO", i + 1)?;
        writeln!(w, "  TITLE\t\"{}\"", boundary.label)?;
        writeln!(w, "  START\t{}", boundary.start.stamp())?;
        if i != boundaries.len() - 1 {
            if let Some(end) = boundary.end {
                writeln!(w, "  END\t\t{}", end.stamp())?;
            }
        }
    }
    w.flush()
}

/// Read a cue sidecar back into a boundary list.
pub fn read_cue(path: &Path) -> Result<Vec<ChapterBoundary>> {
    let content = fs::read_to_string(path)?;
    parse_cue(&content)
}

#[derive(Default)]
struct TrackFields {
    label: Option<String>,
    start: Option<Duration>,
    end: Option<Duration>,
}

impl TrackFields {
    fn is_empty(&self) -> bool {
        self.label.is_none() && self.start.is_none() && self.end.is_none()
    }
}

/// Parse cue file content, accumulating `TITLE`/`START`/`END` fields per
/// track and flushing on the next `TRACK` line or end of input. Any field
/// line that fails its pattern aborts the parse; a partial list is never
/// returned.
pub fn parse_cue(content: &str) -> Result<Vec<ChapterBoundary>> {
    let mut lines = content.lines();
    match lines.next() {
        Some(header) if header.starts_with("FILE ") => {}
        _ => {
            return Err(ChapterizeError::SidecarParse(
                "missing FILE header".to_string(),
            ))
        }
    }

    let mut tracks: Vec<ChapterBoundary> = Vec::new();
    let mut fields = TrackFields::default();

    for line in lines {
        if line.starts_with("TRACK") {
            flush(&mut tracks, std::mem::take(&mut fields))?;
        } else if line.contains("TITLE") {
            let caps = TITLE_RE
                .captures(line)
                .ok_or_else(|| ChapterizeError::SidecarParse(line.to_string()))?;
            fields.label = Some(caps[1].to_string());
        } else if line.contains("START") {
            let caps = START_RE
                .captures(line)
                .ok_or_else(|| ChapterizeError::SidecarParse(line.to_string()))?;
            let start = Duration::parse(caps[1].trim())
                .map_err(|_| ChapterizeError::SidecarParse(line.to_string()))?;
            fields.start = Some(start);
        } else if line.contains("END") {
            let caps = END_RE
                .captures(line)
                .ok_or_else(|| ChapterizeError::SidecarParse(line.to_string()))?;
            let end = Duration::parse(caps[1].trim())
                .map_err(|_| ChapterizeError::SidecarParse(line.to_string()))?;
            fields.end = Some(end);
        }
        // anything else is tolerated; the file is hand-edited
    }
    flush(&mut tracks, fields)?;

    if tracks.is_empty() {
        return Err(ChapterizeError::SidecarParse(
            "no tracks found".to_string(),
        ));
    }
    Ok(tracks)
}

fn flush(tracks: &mut Vec<ChapterBoundary>, fields: TrackFields) -> Result<()> {
    if fields.is_empty() {
        return Ok(());
    }
    let start = fields.start.ok_or_else(|| {
        ChapterizeError::SidecarParse("track without a START field".to_string())
    })?;
    tracks.push(ChapterBoundary {
        start,
        end: fields.end,
        label: fields.label.unwrap_or_default(),
    });
    Ok(())
}
