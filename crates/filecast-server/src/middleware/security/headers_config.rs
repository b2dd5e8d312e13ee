use axum::http::{HeaderName, HeaderValue, header};
use serde::{Deserialize, Serialize};

/// Policy for the index page: same-origin thumbnails, `<video>` players and
/// form posts, inline styles, nothing else.
const DEFAULT_CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     style-src 'self' 'unsafe-inline'; \
     img-src 'self' data:; \
     media-src 'self'; \
     frame-ancestors 'none'; \
     base-uri 'self'; \
     form-action 'self'";

/// One year.
const DEFAULT_HSTS_MAX_AGE_SECS: u64 = 31_536_000;

/// Headers stamped on every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityHeadersConfig {
    /// `Strict-Transport-Security` max-age; `0` omits the header.
    pub hsts_max_age_seconds: u64,

    /// `Content-Security-Policy` value; `None` omits the header.
    pub content_security_policy: Option<String>,

    /// Lets pages of the same origin frame responses (`SAMEORIGIN`
    /// instead of `DENY`).
    pub allow_same_origin_frames: bool,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            hsts_max_age_seconds: DEFAULT_HSTS_MAX_AGE_SECS,
            content_security_policy: Some(DEFAULT_CONTENT_SECURITY_POLICY.to_owned()),
            allow_same_origin_frames: false,
        }
    }
}

impl SecurityHeadersConfig {
    /// Returns the headers to set.
    ///
    /// A policy that is not valid header text is skipped.
    pub fn response_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let frame_options = if self.allow_same_origin_frames {
            "SAMEORIGIN"
        } else {
            "DENY"
        };

        let mut headers = vec![
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
            (
                header::REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ),
            (
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static(frame_options),
            ),
        ];

        if self.hsts_max_age_seconds > 0 {
            let hsts = format!("max-age={}; includeSubDomains", self.hsts_max_age_seconds);
            if let Ok(value) = HeaderValue::from_str(&hsts) {
                headers.push((header::STRICT_TRANSPORT_SECURITY, value));
            }
        }

        if let Some(value) = self
            .content_security_policy
            .as_deref()
            .and_then(|csp| HeaderValue::from_str(csp).ok())
        {
            headers.push((header::CONTENT_SECURITY_POLICY, value));
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(config: &SecurityHeadersConfig, name: HeaderName) -> Option<HeaderValue> {
        config
            .response_headers()
            .into_iter()
            .find_map(|(header, value)| (header == name).then_some(value))
    }

    #[test]
    fn default_headers() {
        let config = SecurityHeadersConfig::default();

        assert_eq!(
            find(&config, header::STRICT_TRANSPORT_SECURITY).unwrap(),
            "max-age=31536000; includeSubDomains"
        );
        assert_eq!(find(&config, header::X_FRAME_OPTIONS).unwrap(), "DENY");

        let csp = find(&config, header::CONTENT_SECURITY_POLICY).unwrap();
        let csp = csp.to_str().unwrap();
        assert!(csp.contains("media-src 'self'"));
        assert!(csp.contains("form-action 'self'"));
    }

    #[test]
    fn optional_headers_can_be_disabled() {
        let config = SecurityHeadersConfig {
            hsts_max_age_seconds: 0,
            content_security_policy: Some("bad\npolicy".to_owned()),
            allow_same_origin_frames: true,
        };

        assert!(find(&config, header::STRICT_TRANSPORT_SECURITY).is_none());
        assert!(find(&config, header::CONTENT_SECURITY_POLICY).is_none());
        assert_eq!(find(&config, header::X_FRAME_OPTIONS).unwrap(), "SAMEORIGIN");
    }
}
