//! Error types for stowage-core.

use thiserror::Error;

use crate::inventory::{ChangeId, EntityId};

/// Main error type for stowage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from underlying system calls.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol violation or unexpected message.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// Codec error during encoding/decoding.
    #[error("codec error: {message}")]
    Codec { message: String },

    /// Referenced container is not known locally.
    #[error("unknown container: {0}")]
    UnknownContainer(EntityId),

    /// Slot index outside the container's fixed range.
    #[error("slot {slot} out of range for container {container}")]
    InvalidSlot { container: EntityId, slot: usize },

    /// Replicated contents disagree with the container's fixed slot count.
    #[error("slot count mismatch for container {container}: expected {expected}, got {actual}")]
    SlotCountMismatch {
        container: EntityId,
        expected: usize,
        actual: usize,
    },

    /// A change identifier was inserted into the ledger twice.
    #[error("duplicate change id: {0}")]
    DuplicateChange(ChangeId),

    /// An authoritative-only operation was invoked on a non-authoritative side.
    #[error("{operation} cannot be invoked on the client")]
    NotAuthoritative { operation: &'static str },

    /// Connection was closed.
    #[error("connection closed")]
    ConnectionClosed,
}

impl Error {
    /// Returns true if this error is transient and retrying later may help.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::ConnectionClosed | Error::Io(_))
    }

    /// Returns true if this error is a contract violation.
    ///
    /// Fatal errors are bugs in the caller or the peer, never conditions
    /// that go away on retry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::NotAuthoritative { .. }
                | Error::Protocol { .. }
                | Error::SlotCountMismatch { .. }
                | Error::DuplicateChange(_)
        )
    }
}

/// Convenience result type for stowage operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_protocol() {
        let err = Error::Protocol {
            message: "unexpected MoveItem".into(),
        };
        assert_eq!(err.to_string(), "protocol error: unexpected MoveItem");
    }

    #[test]
    fn error_display_not_authoritative() {
        let err = Error::NotAuthoritative {
            operation: "give_item",
        };
        assert_eq!(err.to_string(), "give_item cannot be invoked on the client");
    }

    #[test]
    fn error_display_slot_count_mismatch() {
        let err = Error::SlotCountMismatch {
            container: EntityId(7),
            expected: 10,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "slot count mismatch for container #7: expected 10, got 4"
        );
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn transient_errors() {
        assert!(Error::ConnectionClosed.is_transient());
        assert!(
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset"
            ))
            .is_transient()
        );

        assert!(!Error::NotAuthoritative { operation: "remove_item" }.is_transient());
        assert!(!Error::DuplicateChange(ChangeId(3)).is_transient());
    }

    #[test]
    fn fatal_errors() {
        assert!(Error::NotAuthoritative { operation: "give_item" }.is_fatal());
        assert!(Error::DuplicateChange(ChangeId(1)).is_fatal());
        assert!(
            Error::Protocol {
                message: "bad".into()
            }
            .is_fatal()
        );

        assert!(!Error::ConnectionClosed.is_fatal());
        assert!(!Error::UnknownContainer(EntityId(1)).is_fatal());
    }
}
