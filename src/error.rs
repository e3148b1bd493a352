//! Errors recorded by failed requests.
use crate::request::IoKind;
use std::{error::Error, io, sync::Arc};

/// The error recorded by a [`Request`] that completed in the
/// [`Failed`](crate::State::Failed) state.
///
/// A request's error is recorded once, on the background thread that executed
/// it, and handed out to every foreground caller that resolves the request
/// afterwards. `RequestError` is therefore cheap to clone: the underlying
/// error is shared behind an [`Arc`].
///
/// Two `RequestError`s compare equal only if they share the *same* underlying
/// error value, so `a == b` means "this is the error that request recorded",
/// not merely "this error has the same message".
///
/// [`Request`]: crate::Request
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RequestError {
    /// A block transfer failed.
    #[error("{kind} of {bytes} bytes at offset {offset} failed")]
    Io {
        /// Whether the failed request was a read or a write.
        kind: IoKind,
        /// The byte offset of the transfer.
        offset: u64,
        /// The length of the transfer, in bytes.
        bytes: usize,
        /// The I/O error reported by the backend.
        #[source]
        source: Arc<io::Error>,
    },

    /// A failure reported by a request backend that is not an [`io::Error`].
    #[error(transparent)]
    Other(Arc<dyn Error + Send + Sync>),
}

impl RequestError {
    /// Returns a new `RequestError` wrapping an arbitrary backend error.
    pub fn other(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Other(Arc::from(error.into()))
    }

    /// Returns the [`io::ErrorKind`] of the underlying error, if this error
    /// was caused by an [`io::Error`].
    #[must_use]
    pub fn io_error_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            Self::Other(error) => error.downcast_ref::<io::Error>().map(io::Error::kind),
        }
    }
}

impl PartialEq for RequestError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Io {
                    kind,
                    offset,
                    bytes,
                    source,
                },
                Self::Io {
                    kind: other_kind,
                    offset: other_offset,
                    bytes: other_bytes,
                    source: other_source,
                },
            ) => {
                kind == other_kind
                    && offset == other_offset
                    && bytes == other_bytes
                    && Arc::ptr_eq(source, other_source)
            }
            (Self::Other(this), Self::Other(other)) => {
                Arc::as_ptr(this).cast::<()>() == Arc::as_ptr(other).cast::<()>()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error(kind: io::ErrorKind) -> RequestError {
        RequestError::Io {
            kind: IoKind::Read,
            offset: 4096,
            bytes: 512,
            source: Arc::new(io::Error::new(kind, "disk on fire")),
        }
    }

    #[test]
    fn clones_are_equal() {
        let error = io_error(io::ErrorKind::Other);
        assert_eq!(error.clone(), error);
    }

    #[test]
    fn same_message_is_not_same_error() {
        let a = io_error(io::ErrorKind::Other);
        let b = io_error(io::ErrorKind::Other);
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn display_and_source() {
        let error = io_error(io::ErrorKind::UnexpectedEof);
        assert_eq!(
            error.to_string(),
            "read of 512 bytes at offset 4096 failed"
        );
        let source = error.source().expect("I/O errors have a source");
        assert_eq!(source.to_string(), "disk on fire");
        assert_eq!(error.io_error_kind(), Some(io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn other_is_transparent() {
        let error = RequestError::other("checksum mismatch");
        assert_eq!(error.to_string(), "checksum mismatch");
        assert_eq!(error.io_error_kind(), None);
        assert_eq!(error.clone(), error);
        assert_ne!(error, RequestError::other("checksum mismatch"));
    }
}
