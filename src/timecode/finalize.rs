use crate::error::Result;
use crate::timecode::{previous_second, ChapterBoundary, Duration};

/// Fill in end markers for a list of start-only boundaries.
///
/// Every non-last boundary without an end gets one second before the next
/// boundary's start; ends already present (hand-edited in a cue file) are
/// left alone. The last boundary always ends at the recording's total
/// duration, which the cue format never stores.
pub fn finalize(boundaries: &mut [ChapterBoundary], total_duration: Duration) -> Result<()> {
    for i in 0..boundaries.len().saturating_sub(1) {
        if boundaries[i].end.is_some() {
            continue;
        }
        let stamp = previous_second(&boundaries[i + 1].start.stamp())?;
        boundaries[i].end = Some(Duration::parse(&stamp)?);
    }
    if let Some(last) = boundaries.last_mut() {
        last.end = Some(total_duration);
    }
    Ok(())
}
