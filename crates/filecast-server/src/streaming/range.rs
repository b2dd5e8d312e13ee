//! `Range` request header parsing.

/// An inclusive byte range resolved against a known object size.
///
/// Always satisfies `start <= end < total_size`, so a range over an empty
/// object cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    start: u64,
    end: u64,
    total_size: u64,
}

impl ByteRange {
    /// Creates a range, returning `None` if it does not fit the object.
    pub fn new(start: u64, end: u64, total_size: u64) -> Option<Self> {
        (start <= end && end < total_size).then_some(Self {
            start,
            end,
            total_size,
        })
    }

    /// First byte offset, inclusive.
    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset, inclusive.
    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Size of the whole object.
    #[inline]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Number of bytes covered by the range.
    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always `false`: a range covers at least one byte.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Value of the `Content-Range` response header.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Reasons a `Range` header cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("malformed range header: {0}")]
    Malformed(String),

    #[error("multiple ranges are not supported")]
    MultipleRanges,

    #[error("range end {end} precedes start {start}")]
    Inverted { start: u64, end: u64 },

    #[error("range is outside an object of {total_size} bytes")]
    Unsatisfiable { total_size: u64 },
}

/// Parses a `Range` header against an object of `total_size` bytes.
///
/// Returns `Ok(None)` when the header names a unit other than `bytes`, in
/// which case the whole object is served. An end position at or beyond the
/// object size is clamped to the last byte.
pub fn parse_range(header: &str, total_size: u64) -> Result<Option<ByteRange>, RangeError> {
    let (unit, spec) = header
        .trim()
        .split_once('=')
        .ok_or_else(|| RangeError::Malformed(header.to_owned()))?;

    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return Ok(None);
    }

    let spec = spec.trim();
    if spec.contains(',') {
        return Err(RangeError::MultipleRanges);
    }

    let (start, end) = spec
        .split_once('-')
        .ok_or_else(|| RangeError::Malformed(header.to_owned()))?;
    let (start, end) = (start.trim(), end.trim());

    if total_size == 0 {
        return Err(RangeError::Unsatisfiable { total_size });
    }
    let last = total_size - 1;

    // Suffix form: the final N bytes.
    if start.is_empty() {
        let suffix = parse_position(end, header)?;
        if suffix == 0 {
            return Err(RangeError::Unsatisfiable { total_size });
        }

        let start = total_size.saturating_sub(suffix);
        return Ok(ByteRange::new(start, last, total_size));
    }

    let start = parse_position(start, header)?;
    let end = if end.is_empty() {
        last
    } else {
        parse_position(end, header)?
    };

    if start >= total_size {
        return Err(RangeError::Unsatisfiable { total_size });
    }
    if end < start {
        return Err(RangeError::Inverted { start, end });
    }

    Ok(ByteRange::new(start, end.min(last), total_size))
}

fn parse_position(value: &str, header: &str) -> Result<u64, RangeError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed(header.to_owned()));
    }

    value
        .parse()
        .map_err(|_| RangeError::Malformed(header.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_SIZE: u64 = 5_000_000;

    fn range(header: &str, size: u64) -> ByteRange {
        parse_range(header, size).unwrap().unwrap()
    }

    #[test]
    fn closed_range() {
        let r = range("bytes=1000-1999", VIDEO_SIZE);
        assert_eq!((r.start(), r.end(), r.len()), (1000, 1999, 1000));
        assert_eq!(r.content_range(), "bytes 1000-1999/5000000");
    }

    #[test]
    fn open_ended_range_runs_to_last_byte() {
        let r = range("bytes=4999900-", VIDEO_SIZE);
        assert_eq!((r.start(), r.end(), r.len()), (4_999_900, 4_999_999, 100));
        assert_eq!(r.content_range(), "bytes 4999900-4999999/5000000");
    }

    #[test]
    fn whole_object_range() {
        let r = range("bytes=0-", 1000);
        assert_eq!((r.start(), r.end(), r.len()), (0, 999, 1000));
    }

    #[test]
    fn single_byte_ranges() {
        assert_eq!(range("bytes=0-0", 1000).len(), 1);
        assert_eq!(range("bytes=999-999", 1000).len(), 1);
        assert_eq!(range("bytes=0-0", 1).len(), 1);
    }

    #[test]
    fn end_past_size_is_clamped() {
        let r = range("bytes=900-5000", 1000);
        assert_eq!((r.start(), r.end()), (900, 999));
    }

    #[test]
    fn suffix_range() {
        let r = range("bytes=-100", 1000);
        assert_eq!((r.start(), r.end()), (900, 999));

        let r = range("bytes=-5000", 1000);
        assert_eq!((r.start(), r.end()), (0, 999));
    }

    #[test]
    fn whitespace_and_unit_case_are_tolerated() {
        let r = range(" Bytes = 10 - 19 ", 1000);
        assert_eq!((r.start(), r.end()), (10, 19));
    }

    #[test]
    fn other_units_are_ignored() {
        assert_eq!(parse_range("items=0-5", 1000), Ok(None));
    }

    #[test]
    fn malformed_headers() {
        for header in ["bytes", "bytes=abc-def", "bytes=-", "bytes=1-x", "bytes=+1-5", "0-5"] {
            assert!(
                matches!(parse_range(header, 1000), Err(RangeError::Malformed(_))),
                "{header}"
            );
        }
    }

    #[test]
    fn start_beyond_size_is_unsatisfiable() {
        assert_eq!(
            parse_range("bytes=1000-", 1000),
            Err(RangeError::Unsatisfiable { total_size: 1000 })
        );
        assert_eq!(
            parse_range("bytes=9000-9999", 1000),
            Err(RangeError::Unsatisfiable { total_size: 1000 })
        );
    }

    #[test]
    fn inverted_range() {
        assert_eq!(
            parse_range("bytes=500-100", 1000),
            Err(RangeError::Inverted { start: 500, end: 100 })
        );
    }

    #[test]
    fn multiple_ranges_are_rejected() {
        assert_eq!(
            parse_range("bytes=0-10,20-30", 1000),
            Err(RangeError::MultipleRanges)
        );
    }

    #[test]
    fn empty_object_has_no_ranges() {
        assert!(parse_range("bytes=0-", 0).is_err());
        assert!(parse_range("bytes=-1", 0).is_err());
    }

    #[test]
    fn zero_suffix_is_unsatisfiable() {
        assert!(parse_range("bytes=-0", 1000).is_err());
    }

    #[test]
    fn constructor_enforces_bounds() {
        assert!(ByteRange::new(0, 999, 1000).is_some());
        assert!(ByteRange::new(0, 1000, 1000).is_none());
        assert!(ByteRange::new(5, 4, 1000).is_none());
    }
}
