use crate::error::PipelineError;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::{datetime, format_description};
use time::{OffsetDateTime, PrimitiveDateTime};

/// First instant of the categorization window (inclusive).
pub const WINDOW_BEGIN: OffsetDateTime = datetime!(2020-05-25 0:00 UTC);
/// End of the categorization window (exclusive).
pub const WINDOW_END: OffsetDateTime = datetime!(2020-07-26 0:00 UTC);

/// Half-open `[begin, end)` time window for tweets kept at normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InclusionWindow {
    pub begin: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl InclusionWindow {
    pub fn new(begin: OffsetDateTime, end: OffsetDateTime) -> Self {
        assert!(begin <= end, "window begin must not be after its end");
        Self { begin, end }
    }

    #[inline]
    pub fn contains(&self, t: OffsetDateTime) -> bool {
        self.begin <= t && t < self.end
    }
}

impl Default for InclusionWindow {
    fn default() -> Self {
        Self { begin: WINDOW_BEGIN, end: WINDOW_END }
    }
}

impl fmt::Display for InclusionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", format_datetime(self.begin), format_datetime(self.end))
    }
}

/// Parse an archive `created_at`, e.g. `Mon May 25 14:03:11 +0000 2020`. The offset must be
/// `+0000` and the weekday must agree with the date.
pub fn parse_created_at(s: &str) -> Result<OffsetDateTime, PipelineError> {
    let malformed = || PipelineError::MalformedTimestamp { value: s.to_string() };
    let fmt = format_description!(
        "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] +0000 [year]"
    );
    let trimmed = s.trim();
    let t = PrimitiveDateTime::parse(trimmed, fmt).map_err(|_| malformed())?.assume_utc();
    let weekday = t.weekday().to_string();
    if trimmed.get(..3) != weekday.get(..3) {
        return Err(malformed());
    }
    Ok(t)
}

/// RFC 3339 rendering used for the `Datetime` column.
pub fn format_datetime(t: OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| t.unix_timestamp().to_string())
}

/// Inverse of `format_datetime`, used when re-loading output tables.
pub fn parse_datetime(s: &str) -> Result<OffsetDateTime, PipelineError> {
    OffsetDateTime::parse(s.trim(), &Rfc3339)
        .map_err(|_| PipelineError::MalformedTimestamp { value: s.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_archive_format() {
        let t = parse_created_at("Mon May 25 14:03:11 +0000 2020").unwrap();
        assert_eq!(t, datetime!(2020-05-25 14:03:11 UTC));
        assert_eq!(format_datetime(t), "2020-05-25T14:03:11Z");
        assert_eq!(parse_datetime("2020-05-25T14:03:11Z").unwrap(), t);
    }

    #[test]
    fn rejects_other_formats() {
        for bad in [
            "2020-05-25T14:03:11Z",
            "May 25 14:03:11 +0000 2020",
            "",
            "Mon May 25 14:03 +0000 2020",
            "Mon May 25 14:03:11 +0100 2020",
            "Mon May 25 14:03:11 -0000 2020",
            "Tue May 25 14:03:11 +0000 2020",
        ] {
            let err = parse_created_at(bad).unwrap_err();
            assert!(matches!(err, PipelineError::MalformedTimestamp { .. }), "{bad}");
        }
    }

    #[test]
    fn window_is_half_open() {
        let w = InclusionWindow::default();
        assert!(w.contains(WINDOW_BEGIN));
        assert!(!w.contains(WINDOW_END));
        assert!(!w.contains(datetime!(2020-05-24 23:59:59 UTC)));
        assert!(w.contains(datetime!(2020-07-25 23:59:59 UTC)));
    }
}
