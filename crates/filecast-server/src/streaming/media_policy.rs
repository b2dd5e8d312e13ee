use crate::handler::ErrorKind;

/// Which stored media types an endpoint serves, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaPolicy {
    allowed: &'static [&'static str],
    rejection: ErrorKind,
    seekable: bool,
}

impl MediaPolicy {
    /// Still images, always served whole.
    pub const IMAGE: Self = Self {
        allowed: &["image/jpeg", "image/jpg", "image/png"],
        rejection: ErrorKind::NotAnImage,
        seekable: false,
    };
    /// Video, served with byte-range support.
    pub const VIDEO: Self = Self {
        allowed: &["video/mp4"],
        rejection: ErrorKind::NotAVideo,
        seekable: true,
    };

    /// Returns whether `media_type` is served under this policy.
    ///
    /// Parameters such as `; charset=` are ignored and the comparison is
    /// case-insensitive.
    pub fn allows(&self, media_type: &str) -> bool {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();

        self.allowed
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }

    /// The error returned for objects outside this policy.
    #[inline]
    pub fn rejection(&self) -> ErrorKind {
        self.rejection
    }

    /// Whether `Range` requests are honored.
    #[inline]
    pub fn is_seekable(&self) -> bool {
        self.seekable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_policy() {
        assert!(MediaPolicy::IMAGE.allows("image/png"));
        assert!(MediaPolicy::IMAGE.allows("image/jpeg"));
        assert!(MediaPolicy::IMAGE.allows("image/jpg"));
        assert!(MediaPolicy::IMAGE.allows("IMAGE/PNG"));
        assert!(!MediaPolicy::IMAGE.allows("image/gif"));
        assert!(!MediaPolicy::IMAGE.allows("video/mp4"));
        assert!(!MediaPolicy::IMAGE.is_seekable());
    }

    #[test]
    fn video_policy() {
        assert!(MediaPolicy::VIDEO.allows("video/mp4"));
        assert!(MediaPolicy::VIDEO.allows("video/mp4; codecs=avc1"));
        assert!(!MediaPolicy::VIDEO.allows("video/webm"));
        assert!(!MediaPolicy::VIDEO.allows("image/png"));
        assert!(MediaPolicy::VIDEO.is_seekable());
    }

    #[test]
    fn rejections() {
        assert_eq!(MediaPolicy::IMAGE.rejection(), ErrorKind::NotAnImage);
        assert_eq!(MediaPolicy::VIDEO.rejection(), ErrorKind::NotAVideo);
    }
}
