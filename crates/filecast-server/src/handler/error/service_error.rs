//! Mapping of content-store failures onto HTTP errors.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::ErrorKind as ServiceErrorKind;

const TRACING_TARGET: &str = "filecast_server::handler::service";

impl From<crate::Error> for HttpError {
    fn from(error: crate::Error) -> Self {
        let kind = match error.kind() {
            ServiceErrorKind::NotFound => ErrorKind::NoFilesExist,
            ServiceErrorKind::Conflict => ErrorKind::Conflict,
            ServiceErrorKind::Unavailable => ErrorKind::ServiceUnavailable,
            ServiceErrorKind::Config
            | ServiceErrorKind::External
            | ServiceErrorKind::Io
            | ServiceErrorKind::Internal => ErrorKind::InternalServerError,
        };

        // Client mistakes are routine; anything else deserves attention.
        match kind {
            ErrorKind::NoFilesExist | ErrorKind::Conflict => tracing::debug!(
                target: TRACING_TARGET,
                error = %error,
                "Store rejected request"
            ),
            ErrorKind::ServiceUnavailable => tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "Content store unavailable"
            ),
            _ => tracing::error!(
                target: TRACING_TARGET,
                error = %error,
                error_kind = %error.kind(),
                "Store operation failed"
            ),
        }

        if kind == ErrorKind::Conflict {
            kind.with_context(error.message())
        } else {
            kind.into_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_no_files_exist() {
        let error = HttpError::from(crate::Error::not_found("object 'x' not found"));
        assert_eq!(error.kind(), ErrorKind::NoFilesExist);
        assert_eq!(error.message(), "No files exist");
        assert_eq!(error.context(), None);
    }

    #[test]
    fn conflicts_keep_store_message_as_context() {
        let error = HttpError::from(crate::Error::conflict("object 'a.png' already exists"));
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.context(), Some("object 'a.png' already exists"));
    }

    #[test]
    fn store_failures_do_not_leak_details() {
        let error = HttpError::from(crate::Error::external("nats", "no responders"));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.context(), None);
    }

    #[test]
    fn unavailable_maps_to_503() {
        let error = HttpError::from(crate::Error::unavailable("initializing"));
        assert_eq!(error.kind().status_code().as_u16(), 503);
    }
}
