use std::fmt;
use std::panic::Location;

use thiserror::Error;

/// What went wrong, independent of the message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid settings or host environment, detected at construction.
    Precondition,
    /// Empty batch, empty frame, or frames that cannot be concatenated.
    InvalidFrame,
    /// Concatenated frame differs from the size locked by the first write.
    ResolutionMismatch,
    /// The backend could not be opened on the first write.
    BackendOpen,
    /// The backend rejected a frame.
    BackendWrite,
    /// An external tool exited unsuccessfully or could not be spawned.
    ExternalProcess,
    /// Teardown bookkeeping failed (closing, cleanup, replacing the output).
    Finalization,
}

/// How an error is surfaced.
///
/// `Diagnostic` errors happen during teardown, where no caller is left to
/// react. They are collected and logged instead of aborting anything, so
/// whatever was already written stays on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Diagnostic,
}

impl ErrorKind {
    pub fn severity(self) -> Severity {
        match self {
            ErrorKind::ExternalProcess | ErrorKind::Finalization => Severity::Diagnostic,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Precondition => "precondition",
            ErrorKind::InvalidFrame => "invalid frame",
            ErrorKind::ResolutionMismatch => "resolution mismatch",
            ErrorKind::BackendOpen => "backend open",
            ErrorKind::BackendWrite => "backend write",
            ErrorKind::ExternalProcess => "external process",
            ErrorKind::Finalization => "finalization",
        };
        f.write_str(name)
    }
}

/// Error raised by a video saving session.
///
/// Carries the call site that built it so reports point at the failing
/// check rather than at the reporting code.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct VideoSaverError {
    kind: ErrorKind,
    message: String,
    location: Option<&'static Location<'static>>,
}

impl VideoSaverError {
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Some(Location::caller()),
        }
    }

    #[track_caller]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    #[track_caller]
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFrame, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&'static Location<'static>> {
        self.location
    }

    /// Logs the error with its provenance. Used where an error cannot be
    /// returned to anyone, e.g. during teardown.
    pub fn report(&self) {
        let origin = self
            .location
            .map(|l| format!(" [{}:{}]", l.file(), l.line()))
            .unwrap_or_default();
        match self.severity() {
            Severity::Fatal => log::error!("{} error{origin}: {}", self.kind, self.message),
            Severity::Diagnostic => log::warn!("{} error{origin}: {}", self.kind, self.message),
        }
    }
}
