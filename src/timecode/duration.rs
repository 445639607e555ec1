use crate::error::{ChapterizeError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// `HH:MM:SS` with an optional `.mmm`/`,mmm` fraction
static STAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d+):(\d+)(?:[.,](\d+))?$").unwrap());

/// Exact elapsed time with millisecond resolution.
///
/// Hours are unbounded; a 26-hour audiobook renders as `26:xx:xx.xxx`,
/// never wrapped at 24. Equality and ordering are on total milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Duration {
    total_ms: u64,
}

impl Duration {
    pub const ZERO: Duration = Duration { total_ms: 0 };

    pub fn from_millis(total_ms: u64) -> Self {
        Self { total_ms }
    }

    pub fn from_parts(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Self {
        Self {
            total_ms: ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis,
        }
    }

    /// Convert fractional seconds (e.g. an ffprobe duration) to a Duration,
    /// truncating to whole milliseconds.
    pub fn from_secs_f64(seconds: f64) -> Self {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        Self {
            total_ms: (seconds * 1000.0) as u64,
        }
    }

    pub fn total_millis(&self) -> u64 {
        self.total_ms
    }

    pub fn hours(&self) -> u64 {
        self.total_ms / 3_600_000
    }

    pub fn minutes(&self) -> u64 {
        (self.total_ms / 60_000) % 60
    }

    pub fn seconds(&self) -> u64 {
        (self.total_ms / 1000) % 60
    }

    pub fn subsec_millis(&self) -> u64 {
        self.total_ms % 1000
    }

    /// Parse `HH:MM:SS[.mmm]`. The fraction separator may be `.` or `,`;
    /// a missing fraction means zero milliseconds. Fraction digits are
    /// fractional, so `.5` is 500 ms.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = STAMP
            .captures(text.trim())
            .ok_or_else(|| ChapterizeError::MalformedTimestamp(text.to_string()))?;

        let field = |i: usize| -> Result<u64> {
            caps[i]
                .parse()
                .map_err(|_| ChapterizeError::MalformedTimestamp(text.to_string()))
        };

        let hours = field(1)?;
        let minutes = field(2)?;
        let seconds = field(3)?;
        if minutes > 59 || seconds > 59 {
            return Err(ChapterizeError::MalformedTimestamp(text.to_string()));
        }

        let millis = match caps.get(4) {
            Some(frac) => {
                let mut digits = frac.as_str().to_string();
                digits.truncate(3);
                while digits.len() < 3 {
                    digits.push('0');
                }
                digits
                    .parse()
                    .map_err(|_| ChapterizeError::MalformedTimestamp(text.to_string()))?
            }
            None => 0,
        };

        Ok(Self::from_parts(hours, minutes, seconds, millis))
    }

    /// Render in the cue / chapter-marker style: `HH:MM:SS.mmm`.
    pub fn stamp(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.subsec_millis()
        )
    }

    /// Render in the transcript (SRT) style: `HH:MM:SS,mmm`.
    pub fn srt_stamp(&self) -> String {
        format!(
            "{:02}:{:02}:{:02},{:03}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.subsec_millis()
        )
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stamp())
    }
}

impl FromStr for Duration {
    type Err = ChapterizeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Compute the timestamp exactly one second earlier than `stamp`, as text.
///
/// Used to derive a chapter's end marker from the next chapter's start
/// marker. The hour field keeps the digit count of the input, minutes and
/// seconds always render with two digits, and the millisecond suffix is
/// carried over verbatim.
pub fn previous_second(stamp: &str) -> Result<String> {
    let caps = STAMP
        .captures(stamp.trim())
        .ok_or_else(|| ChapterizeError::MalformedTimestamp(stamp.to_string()))?;

    let hour_width = caps[1].len();
    let field = |i: usize| -> Result<u64> {
        caps[i]
            .parse()
            .map_err(|_| ChapterizeError::MalformedTimestamp(stamp.to_string()))
    };
    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    if minutes > 59 || seconds > 59 {
        return Err(ChapterizeError::MalformedTimestamp(stamp.to_string()));
    }

    let (hours, minutes, seconds) = if seconds > 0 {
        (hours, minutes, seconds - 1)
    } else if minutes > 0 {
        (hours, minutes - 1, 59)
    } else if hours > 0 {
        (hours - 1, 59, 59)
    } else {
        return Err(ChapterizeError::TimeUnderflow(stamp.to_string()));
    };

    let mut out = format!(
        "{:0hw$}:{:02}:{:02}",
        hours,
        minutes,
        seconds,
        hw = hour_width
    );
    if let Some(frac) = caps.get(4) {
        out.push('.');
        out.push_str(frac.as_str());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dot_form() {
        let d = Duration::parse("01:02:03.500").unwrap();
        assert_eq!(d.hours(), 1);
        assert_eq!(d.minutes(), 2);
        assert_eq!(d.seconds(), 3);
        assert_eq!(d.subsec_millis(), 500);
    }

    #[test]
    fn test_parse_comma_form() {
        let d = Duration::parse("00:10:00,250").unwrap();
        assert_eq!(d.total_millis(), 600_250);
    }

    #[test]
    fn test_parse_missing_fraction_defaults_to_zero() {
        let d = Duration::parse("00:00:05").unwrap();
        assert_eq!(d.total_millis(), 5000);
    }

    #[test]
    fn test_parse_short_fraction_is_fractional() {
        assert_eq!(Duration::parse("00:00:00.5").unwrap().subsec_millis(), 500);
        assert_eq!(Duration::parse("00:00:00.05").unwrap().subsec_millis(), 50);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "12:34", "aa:bb:cc", "00:61:00", "00:00:61", "00:00:00:00"] {
            assert!(
                matches!(
                    Duration::parse(bad),
                    Err(ChapterizeError::MalformedTimestamp(_))
                ),
                "expected MalformedTimestamp for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_stamp_roundtrip() {
        for text in ["00:00:00.000", "01:02:03.500", "10:59:59.999"] {
            let d = Duration::parse(text).unwrap();
            assert_eq!(d.stamp(), text);
            assert_eq!(Duration::parse(&d.stamp()).unwrap(), d);
        }
    }

    #[test]
    fn test_srt_stamp_roundtrip() {
        let d = Duration::parse("00:10:00,250").unwrap();
        assert_eq!(d.srt_stamp(), "00:10:00,250");
        assert_eq!(Duration::parse(&d.srt_stamp()).unwrap(), d);
    }

    #[test]
    fn test_hours_unbounded() {
        let d = Duration::from_parts(26, 0, 0, 0);
        assert_eq!(d.stamp(), "26:00:00.000");
        let d = Duration::from_parts(123, 4, 5, 6);
        assert_eq!(d.stamp(), "123:04:05.006");
    }

    #[test]
    fn test_from_secs_f64() {
        let d = Duration::from_secs_f64(3723.5);
        assert_eq!(d.stamp(), "01:02:03.500");
        assert_eq!(Duration::from_secs_f64(0.0), Duration::ZERO);
    }

    #[test]
    fn test_ordering_on_total_millis() {
        let a = Duration::parse("00:00:01.000").unwrap();
        let b = Duration::parse("00:00:01.001").unwrap();
        assert!(a < b);
        assert_eq!(a, Duration::from_millis(1000));
    }

    #[test]
    fn test_previous_second_simple() {
        assert_eq!(previous_second("00:05:10.000").unwrap(), "00:05:09.000");
    }

    #[test]
    fn test_previous_second_keeps_leading_zero() {
        // 10 -> 09, not 9
        assert_eq!(previous_second("00:01:10.000").unwrap(), "00:01:09.000");
    }

    #[test]
    fn test_previous_second_borrow_minute() {
        assert_eq!(previous_second("02:03:00.000").unwrap(), "02:02:59.000");
    }

    #[test]
    fn test_previous_second_borrow_hour() {
        assert_eq!(previous_second("01:00:00.000").unwrap(), "00:59:59.000");
    }

    #[test]
    fn test_previous_second_underflow() {
        assert!(matches!(
            previous_second("00:00:00.000"),
            Err(ChapterizeError::TimeUnderflow(_))
        ));
        assert!(matches!(
            previous_second("00:00:00"),
            Err(ChapterizeError::TimeUnderflow(_))
        ));
    }

    #[test]
    fn test_previous_second_preserves_millis_suffix() {
        assert_eq!(previous_second("00:00:02.731").unwrap(), "00:00:01.731");
    }

    #[test]
    fn test_previous_second_preserves_hour_width() {
        assert_eq!(previous_second("100:00:00.000").unwrap(), "099:59:59.000");
        assert_eq!(previous_second("9:00:00.000").unwrap(), "8:59:59.000");
    }

    #[test]
    fn test_previous_second_without_fraction() {
        assert_eq!(previous_second("00:00:05").unwrap(), "00:00:04");
    }

    #[test]
    fn test_previous_second_malformed() {
        assert!(matches!(
            previous_second("not a time"),
            Err(ChapterizeError::MalformedTimestamp(_))
        ));
    }
}
