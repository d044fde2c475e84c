// src/common/error.rs

use super::command::CommandFormatError;

/// Errors raised on the transport side of the station.
///
/// Persistence failures never travel through this type; the station logs them and
/// keeps serving in-memory state.
#[derive(Debug, thiserror::Error)]
pub enum StationError<E = ()>
where
    E: core::fmt::Debug, // Still need Debug for the generic Io error
{
    /// Underlying I/O error from the transport implementation.
    #[error("I/O error: {0:?}")] // Format string requires Debug on E
    Io(E),

    /// The transport is closed.
    #[error("Transport is not connected")]
    NotConnected,

    /// A connect or reconnect was requested before any channel was chosen.
    #[error("No channel selected")]
    NoChannelSelected,

    /// The single reopen attempt after a read failure did not succeed.
    #[error("Reconnect failed: {0:?}")]
    ReconnectFailed(E),

    /// An outgoing command could not be formatted.
    #[error("Command formatting failed: {0}")]
    CommandFormat(CommandFormatError),
}

// Allow mapping from underlying transport error if From is implemented
impl<E: core::fmt::Debug> From<E> for StationError<E> {
    fn from(e: E) -> Self {
        StationError::Io(e)
    }
}

impl<E: core::fmt::Debug> StationError<E> {
    /// True when the error came from the physical link rather than from the caller.
    pub fn is_link_failure(&self) -> bool {
        matches!(self, StationError::Io(_) | StationError::ReconnectFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockIoError;

    #[test]
    fn test_io_error_from_conversion() {
        let err: StationError<MockIoError> = MockIoError.into();
        assert!(matches!(err, StationError::Io(MockIoError)));
        assert!(err.is_link_failure());
    }

    #[test]
    fn test_display_messages() {
        let err: StationError<MockIoError> = StationError::NotConnected;
        assert_eq!(err.to_string(), "Transport is not connected");
        assert!(!err.is_link_failure());

        let err: StationError<MockIoError> = StationError::ReconnectFailed(MockIoError);
        assert_eq!(err.to_string(), "Reconnect failed: MockIoError");
        assert!(err.is_link_failure());
    }
}
