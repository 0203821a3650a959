//! Centralized error types for the volnote core library.
//!
//! Each boundary (renderer, volume source, status sink) has its own structured
//! error type; [`VolnoteError`] unifies them for callers that don't care which
//! collaborator failed. None of these errors is retried anywhere: every
//! failure degrades to "no visible update this cycle" or a startup abort.

use thiserror::Error;

/// Trait for error types that provide machine-readable error codes.
///
/// Used for stable log labels across error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

/// Errors produced by the volume-to-icon renderer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The reported maximum volume was zero, which would divide by zero.
    ///
    /// The service recovers by skipping the display update for that event.
    #[error("maximum volume is zero, cannot compute a percentage")]
    ZeroMaximum,
}

impl ErrorCode for RenderError {
    fn code(&self) -> &'static str {
        match self {
            Self::ZeroMaximum => "zero_maximum",
        }
    }
}

/// Errors produced by volume source backends.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The backend is not usable at all (binary missing, device absent).
    #[error("volume backend unavailable: {0}")]
    Unavailable(String),

    /// A query to an otherwise working backend failed.
    #[error("volume query failed: {0}")]
    Backend(String),

    /// The backend produced output this crate could not interpret.
    #[error("unparseable volume reading: {0}")]
    Parse(String),
}

impl ErrorCode for AudioError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "backend_unavailable",
            Self::Backend(_) => "backend_query_failed",
            Self::Parse(_) => "unparseable_reading",
        }
    }
}

/// Errors produced by the status display sink.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The host declined to let us post notifications.
    ///
    /// The service reacts by suppressing all future display attempts for the
    /// life of the process; there is no retry loop.
    #[error("notification permission denied by the host")]
    PermissionDenied,

    /// Delivery of a single notification failed for a transient reason.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

impl ErrorCode for NotifyError {
    fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::Delivery(_) => "delivery_failed",
        }
    }
}

/// Application-wide error type for volnote.
#[derive(Debug, Error)]
pub enum VolnoteError {
    /// Rendering the status icon failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The volume source failed.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// The status sink failed.
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// Invalid or unusable configuration (bad color, no usable backend).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl VolnoteError {
    /// Returns a machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Render(e) => e.code(),
            Self::Audio(e) => e.code(),
            Self::Notify(e) => e.code(),
            Self::Configuration(_) => "configuration_error",
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type VolnoteResult<T> = Result<T, VolnoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_error_code_is_stable() {
        assert_eq!(RenderError::ZeroMaximum.code(), "zero_maximum");
    }

    #[test]
    fn permission_denied_code_survives_unification() {
        let err: VolnoteError = NotifyError::PermissionDenied.into();
        assert_eq!(err.code(), "permission_denied");
    }

    #[test]
    fn configuration_error_formats_message() {
        let err = VolnoteError::Configuration("no usable backend".into());
        assert_eq!(err.code(), "configuration_error");
        assert!(err.to_string().contains("no usable backend"));
    }
}
