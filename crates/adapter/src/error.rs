use std::fmt;

use cirrus_core::CoreError;
use cirrus_store::StoreError;
use thiserror::Error;

/// The filesystem operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Write,
    Read,
    Delete,
    Move,
    Copy,
    ListContents,
    RetrieveMetadata,
    CreateDirectory,
    DeleteDirectory,
    ExistenceCheck,
    SetVisibility,
    Visibility,
}

impl Operation {
    /// Upper-case code, e.g. `LIST_CONTENTS`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Write => "WRITE",
            Self::Read => "READ",
            Self::Delete => "DELETE",
            Self::Move => "MOVE",
            Self::Copy => "COPY",
            Self::ListContents => "LIST_CONTENTS",
            Self::RetrieveMetadata => "RETRIEVE_METADATA",
            Self::CreateDirectory => "CREATE_DIRECTORY",
            Self::DeleteDirectory => "DELETE_DIRECTORY",
            Self::ExistenceCheck => "EXISTENCE_CHECK",
            Self::SetVisibility => "SET_VISIBILITY",
            Self::Visibility => "VISIBILITY",
        }
    }

    /// Phrase used in error messages, e.g. `list contents`.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Read => "read",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Copy => "copy",
            Self::ListContents => "list contents",
            Self::RetrieveMetadata => "retrieve metadata",
            Self::CreateDirectory => "create directory",
            Self::DeleteDirectory => "delete directory",
            Self::ExistenceCheck => "check existence",
            Self::SetVisibility => "set visibility",
            Self::Visibility => "retrieve visibility",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which metadata projection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    Metadata,
    FileSize,
    MimeType,
    LastModified,
}

impl MetadataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::FileSize => "file size",
            Self::MimeType => "mime type",
            Self::LastModified => "last modified",
        }
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a [`FilesystemError`].
#[derive(Debug, Error)]
pub enum ErrorCause {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Errors returned by the filesystem operations.
///
/// Every variant carries the location it failed at and a reason, which is
/// the text of the underlying store or path error when there is one.
#[derive(Debug, Error)]
pub enum FilesystemError {
    #[error("Unable to write at location: {location}. {reason}")]
    WriteFailed {
        location: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Unable to read at location: {location}. {reason}")]
    ReadFailed {
        location: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Unable to delete at location: {location}. {reason}")]
    DeleteFailed {
        location: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Unable to move at location: {source_path} to {destination}. {reason}")]
    MoveFailed {
        source_path: String,
        destination: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Unable to copy at location: {source_path} to {destination}. {reason}")]
    CopyFailed {
        source_path: String,
        destination: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Unable to list contents at location: {location}. {reason}")]
    ListFailed {
        location: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Unable to retrieve {metadata_type} at location: {location}. {reason}")]
    MetadataFailed {
        metadata_type: MetadataKind,
        location: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Unable to {} at location: {location}. {reason}", .operation.verb())]
    DirectoryOpFailed {
        operation: Operation,
        location: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Unable to check existence at location: {location}. {reason}")]
    CheckFailed {
        location: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Unable to {} at location: {location}. {reason}", .operation.verb())]
    Unsupported {
        operation: Operation,
        location: String,
        reason: String,
    },

    #[error("Unable to {} at location: {location}. {reason}", .operation.verb())]
    InvalidPath {
        operation: Operation,
        location: String,
        reason: String,
        #[source]
        source: Option<ErrorCause>,
    },
}

fn split(cause: impl Into<ErrorCause>) -> (String, Option<ErrorCause>) {
    let cause = cause.into();
    (cause.to_string(), Some(cause))
}

impl FilesystemError {
    pub(crate) fn write(location: &str, cause: impl Into<ErrorCause>) -> Self {
        let (reason, source) = split(cause);
        Self::WriteFailed {
            location: location.to_owned(),
            reason,
            source,
        }
    }

    pub(crate) fn read(location: &str, cause: impl Into<ErrorCause>) -> Self {
        let (reason, source) = split(cause);
        Self::ReadFailed {
            location: location.to_owned(),
            reason,
            source,
        }
    }

    pub(crate) fn delete(location: &str, cause: impl Into<ErrorCause>) -> Self {
        let (reason, source) = split(cause);
        Self::DeleteFailed {
            location: location.to_owned(),
            reason,
            source,
        }
    }

    pub(crate) fn move_failed(from: &str, to: &str, cause: impl Into<ErrorCause>) -> Self {
        let (reason, source) = split(cause);
        Self::MoveFailed {
            source_path: from.to_owned(),
            destination: to.to_owned(),
            reason,
            source,
        }
    }

    pub(crate) fn copy_failed(from: &str, to: &str, cause: impl Into<ErrorCause>) -> Self {
        let (reason, source) = split(cause);
        Self::CopyFailed {
            source_path: from.to_owned(),
            destination: to.to_owned(),
            reason,
            source,
        }
    }

    pub(crate) fn list(location: &str, cause: impl Into<ErrorCause>) -> Self {
        let (reason, source) = split(cause);
        Self::ListFailed {
            location: location.to_owned(),
            reason,
            source,
        }
    }

    /// A listing failure with no underlying error, e.g. a store that keeps
    /// returning the same cursor.
    pub(crate) fn list_reason(location: &str, reason: impl Into<String>) -> Self {
        Self::ListFailed {
            location: location.to_owned(),
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn metadata(
        metadata_type: MetadataKind,
        location: &str,
        cause: impl Into<ErrorCause>,
    ) -> Self {
        let (reason, source) = split(cause);
        Self::MetadataFailed {
            metadata_type,
            location: location.to_owned(),
            reason,
            source,
        }
    }

    pub(crate) fn directory(
        operation: Operation,
        location: &str,
        cause: impl Into<ErrorCause>,
    ) -> Self {
        let (reason, source) = split(cause);
        Self::DirectoryOpFailed {
            operation,
            location: location.to_owned(),
            reason,
            source,
        }
    }

    pub(crate) fn check(location: &str, cause: impl Into<ErrorCause>) -> Self {
        let (reason, source) = split(cause);
        Self::CheckFailed {
            location: location.to_owned(),
            reason,
            source,
        }
    }

    pub(crate) fn unsupported(operation: Operation, location: &str) -> Self {
        Self::Unsupported {
            operation,
            location: location.to_owned(),
            reason: "Visibility is not supported by the remote asset store.".to_owned(),
        }
    }

    pub(crate) fn invalid_path(operation: Operation, location: &str, cause: CoreError) -> Self {
        let (reason, source) = split(cause);
        Self::InvalidPath {
            operation,
            location: location.to_owned(),
            reason,
            source,
        }
    }

    /// The operation that failed.
    pub fn operation(&self) -> Operation {
        match self {
            Self::WriteFailed { .. } => Operation::Write,
            Self::ReadFailed { .. } => Operation::Read,
            Self::DeleteFailed { .. } => Operation::Delete,
            Self::MoveFailed { .. } => Operation::Move,
            Self::CopyFailed { .. } => Operation::Copy,
            Self::ListFailed { .. } => Operation::ListContents,
            Self::MetadataFailed { .. } => Operation::RetrieveMetadata,
            Self::CheckFailed { .. } => Operation::ExistenceCheck,
            Self::DirectoryOpFailed { operation, .. }
            | Self::Unsupported { operation, .. }
            | Self::InvalidPath { operation, .. } => *operation,
        }
    }

    /// The path the operation was called with. For moves and copies this
    /// is the source path.
    pub fn location(&self) -> &str {
        match self {
            Self::MoveFailed { source_path, .. } | Self::CopyFailed { source_path, .. } => {
                source_path
            }
            Self::WriteFailed { location, .. }
            | Self::ReadFailed { location, .. }
            | Self::DeleteFailed { location, .. }
            | Self::ListFailed { location, .. }
            | Self::MetadataFailed { location, .. }
            | Self::DirectoryOpFailed { location, .. }
            | Self::CheckFailed { location, .. }
            | Self::Unsupported { location, .. }
            | Self::InvalidPath { location, .. } => location,
        }
    }

    /// Destination path of a failed move or copy.
    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::MoveFailed { destination, .. } | Self::CopyFailed { destination, .. } => {
                Some(destination)
            }
            _ => None,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::WriteFailed { reason, .. }
            | Self::ReadFailed { reason, .. }
            | Self::DeleteFailed { reason, .. }
            | Self::MoveFailed { reason, .. }
            | Self::CopyFailed { reason, .. }
            | Self::ListFailed { reason, .. }
            | Self::MetadataFailed { reason, .. }
            | Self::DirectoryOpFailed { reason, .. }
            | Self::CheckFailed { reason, .. }
            | Self::Unsupported { reason, .. }
            | Self::InvalidPath { reason, .. } => reason,
        }
    }

    /// The store error behind this failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        let cause = match self {
            Self::WriteFailed { source, .. }
            | Self::ReadFailed { source, .. }
            | Self::DeleteFailed { source, .. }
            | Self::MoveFailed { source, .. }
            | Self::CopyFailed { source, .. }
            | Self::ListFailed { source, .. }
            | Self::MetadataFailed { source, .. }
            | Self::DirectoryOpFailed { source, .. }
            | Self::CheckFailed { source, .. }
            | Self::InvalidPath { source, .. } => source.as_ref(),
            Self::Unsupported { .. } => None,
        };
        match cause {
            Some(ErrorCause::Store(err)) => Some(err),
            _ => None,
        }
    }

    /// Whether the store reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_not_found)
    }

    /// Whether the operation was cancelled before the store answered.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.store_error(), Some(StoreError::Cancelled))
    }
}
