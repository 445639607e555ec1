use crate::error::{ChapterizeError, Result};
use crate::markers::MarkerTable;
use crate::timecode::{ChapterBoundary, Duration};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Start stamp of an `HH:MM:SS,mmm --> HH:MM:SS,mmm` range line.
static RANGE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2,}:\d{2}:\d{2}[,.]\d+)\s*-->").unwrap());

/// Scan transcript lines for chapter announcements.
///
/// The transcript interleaves timestamp-range lines with the spoken text
/// that follows them, so the scan walks with one line of lookahead: when
/// the lookahead line announces a chapter (per the marker table), the
/// current line supplies the start stamp. A candidate whose current line
/// carries no parsable start is skipped with a warning. The first
/// recognized boundary always starts at zero, so any lead-in audio before
/// the first announcement belongs to it.
pub fn detect_chapters<I>(lines: I, table: &MarkerTable) -> Result<Vec<ChapterBoundary>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut lines = lines.into_iter().peekable();
    let mut boundaries: Vec<ChapterBoundary> = Vec::new();
    let mut counter: u32 = 1;

    while let Some(line) = lines.next() {
        let Some(next) = lines.peek() else {
            break;
        };
        let content = next.as_ref();
        if !table.matches(content) {
            continue;
        }

        let start = match RANGE_START
            .captures(line.as_ref())
            .map(|caps| Duration::parse(&caps[1]))
        {
            Some(Ok(start)) => start,
            _ => {
                warn!(
                    "skipping chapter candidate {:?}: no parsable start timestamp",
                    content.trim()
                );
                continue;
            }
        };

        let label = classify(table, content, &mut counter);
        let start = if boundaries.is_empty() {
            Duration::ZERO
        } else {
            start
        };
        boundaries.push(ChapterBoundary::new(start, label));
    }

    if boundaries.is_empty() {
        return Err(ChapterizeError::NoChaptersDetected);
    }
    Ok(boundaries)
}

/// Label a recognized announcement. Prologue synonyms win over the chapter
/// literal, which wins over the epilogue; numbered chapters share one
/// counter across the whole scan, zero-padded below ten.
fn classify(table: &MarkerTable, content: &str, counter: &mut u32) -> String {
    if content.contains(table.prologue[0]) || content.contains(table.prologue[1]) {
        table.prologue[0].to_string()
    } else if content.contains(table.chapter) {
        let label = format!("{} {:02}", table.chapter, counter);
        *counter += 1;
        label
    } else if content.contains(table.epilogue) {
        table.epilogue.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::table_for;

    fn en() -> &'static MarkerTable {
        table_for("en").unwrap()
    }

    #[test]
    fn test_detects_sequential_chapters() {
        let lines = [
            "00:00:01,000 --> 00:00:03,000",
            "Chapter One begins",
            "00:10:00,000 --> 00:10:05,000",
            "Chapter Two starts",
        ];
        let boundaries = detect_chapters(lines, en()).unwrap();
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].start, Duration::ZERO);
        assert_eq!(boundaries[0].label, "Chapter 01");
        assert_eq!(boundaries[1].start, Duration::parse("00:10:00,000").unwrap());
        assert_eq!(boundaries[1].label, "Chapter 02");
        assert!(boundaries.iter().all(|b| b.end.is_none()));
    }

    #[test]
    fn test_full_srt_shape() {
        let lines = [
            "1",
            "00:00:00,500 --> 00:00:02,000",
            "Prologue",
            "",
            "2",
            "00:12:00,000 --> 00:12:04,000",
            "Chapter One",
            "",
            "3",
            "08:40:00,000 --> 08:40:03,000",
            "Epilogue",
            "",
        ];
        let boundaries = detect_chapters(lines, en()).unwrap();
        let labels: Vec<&str> = boundaries.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["Prologue", "Chapter 01", "Epilogue"]);
        assert_eq!(boundaries[0].start, Duration::ZERO);
        assert_eq!(boundaries[2].start, Duration::parse("08:40:00,000").unwrap());
    }

    #[test]
    fn test_excluded_phrase_suppresses_candidate() {
        let lines = [
            "00:00:01,000 --> 00:00:03,000",
            "as discussed in Chapter Two",
            "00:10:00,000 --> 00:10:05,000",
            "Chapter One",
        ];
        let boundaries = detect_chapters(lines, en()).unwrap();
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].label, "Chapter 01");
    }

    #[test]
    fn test_unparsable_start_is_skipped_not_fatal() {
        let lines = [
            "no timestamp here",
            "Chapter One",
            "00:10:00,000 --> 00:10:05,000",
            "Chapter Two",
        ];
        let boundaries = detect_chapters(lines, en()).unwrap();
        // the discarded candidate neither appears nor consumes a number
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].label, "Chapter 01");
        assert_eq!(boundaries[0].start, Duration::ZERO);
    }

    #[test]
    fn test_counter_unpadded_from_ten() {
        let mut lines = Vec::new();
        for i in 0..11 {
            lines.push(format!("00:{:02}:00,000 --> 00:{:02}:05,000", i, i));
            lines.push("Chapter".to_string());
        }
        let boundaries = detect_chapters(lines, en()).unwrap();
        assert_eq!(boundaries[8].label, "Chapter 09");
        assert_eq!(boundaries[9].label, "Chapter 10");
        assert_eq!(boundaries[10].label, "Chapter 11");
    }

    #[test]
    fn test_no_matches_is_an_error() {
        let lines = [
            "00:00:01,000 --> 00:00:03,000",
            "just some narration",
            "00:10:00,000 --> 00:10:05,000",
            "more narration",
        ];
        assert!(matches!(
            detect_chapters(lines, en()),
            Err(ChapterizeError::NoChaptersDetected)
        ));
    }

    #[test]
    fn test_empty_transcript_is_an_error() {
        let lines: [&str; 0] = [];
        assert!(matches!(
            detect_chapters(lines, en()),
            Err(ChapterizeError::NoChaptersDetected)
        ));
    }

    #[test]
    fn test_last_line_has_no_lookahead() {
        // a marker on the final line can never be a boundary
        let lines = ["00:00:01,000 --> 00:00:03,000"];
        assert!(matches!(
            detect_chapters(lines, en()),
            Err(ChapterizeError::NoChaptersDetected)
        ));
    }
}
