//! Error types and Result alias for the romlink toolkit
//!
//! This module contains the unified error system, providing hierarchical
//! error types organized by domain with contextual information.

use std::path::PathBuf;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Specific kinds of project host errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HostErrorKind {
    #[error("Invalid project root")]
    InvalidProjectRoot,
    #[error("Asset tree scan failed")]
    ScanFailed,
    #[error("Project settings unreadable")]
    SettingsUnreadable,
}

/// Specific kinds of analyzer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnalyzerErrorKind {
    #[error("Analyzer already disposed")]
    Disposed,
    #[error("Snapshot construction failed")]
    SnapshotFailed,
}

/// The main unified error type for the romlink toolkit
#[derive(Error, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Error {
    /// File system and I/O related errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        file_path: Option<PathBuf>,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        source_message: Option<String>,
    },

    /// Project host registry errors
    #[error("Project host error: {message}")]
    Host {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        project_path: Option<PathBuf>,
        kind: HostErrorKind,
    },

    /// Analysis coordination errors
    #[error("Analyzer error: {message}")]
    Analyzer {
        message: String,
        kind: AnalyzerErrorKind,
    },
}

/// Convenient result type for romlink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ContextExt<T> {
    /// Add context message to an error
    fn context<C: Into<String>>(self, ctx: C) -> Result<T>;

    /// Add context message via closure (lazy evaluation)
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ContextExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context<C: Into<String>>(self, ctx: C) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match error {
                Error::Io { ref mut message, .. }
                | Error::Host { ref mut message, .. }
                | Error::Analyzer { ref mut message, .. } => {
                    *message = format!("{}: {}", ctx.into(), message);
                }
            }
            error
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.context(f())
    }
}

// === From implementations for standard library types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            file_path: None,
            source_message: Some(format!("IO Error: {err}")),
        }
    }
}

// === Helper constructors ===

impl Error {
    /// Create a new I/O error with optional context
    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io {
            message: message.into(),
            file_path: None,
            source_message: None,
        }
    }

    /// Create a new project host error
    pub fn host<M: Into<String>>(message: M, kind: HostErrorKind) -> Self {
        Self::Host {
            message: message.into(),
            project_path: None,
            kind,
        }
    }

    /// Create a new analyzer error
    pub fn analyzer<M: Into<String>>(message: M, kind: AnalyzerErrorKind) -> Self {
        Self::Analyzer {
            message: message.into(),
            kind,
        }
    }
}

// === Contextual builder methods ===

impl Error {
    /// Add file path context to any error type that carries one
    pub fn with_file_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        match &mut self {
            Self::Io { file_path, .. } => *file_path = Some(path.into()),
            Self::Host { project_path, .. } => *project_path = Some(path.into()),
            Self::Analyzer { .. } => {}
        }
        self
    }
}

// === Type checking methods ===

impl Error {
    /// Check if this error is an I/O error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this error is a project host error
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host { .. })
    }

    /// Check if this error is an analyzer error
    pub fn is_analyzer(&self) -> bool {
        matches!(self, Self::Analyzer { .. })
    }
}

// === Context accessor methods ===

impl Error {
    /// Get the file path associated with this error, if any
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { file_path, .. } => file_path.as_ref(),
            Self::Host { project_path, .. } => project_path.as_ref(),
            Self::Analyzer { .. } => None,
        }
    }

    /// Generate a user-friendly error message with context
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { message, file_path, .. } => {
                if let Some(path) = file_path {
                    format!("File operation failed on '{}': {}", path.display(), message)
                } else {
                    format!("File operation failed: {message}")
                }
            }
            Self::Host {
                message,
                project_path,
                ..
            } => {
                let mut msg = format!("Project host error: {message}");
                if let Some(path) = project_path {
                    msg.push_str(&format!(" (project: {})", path.display()));
                }
                msg
            }
            Self::Analyzer { message, .. } => {
                format!("Analysis failed: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from_std() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.is_io());
        assert!(err.file_path().is_none());
    }

    #[test]
    fn test_context_prepends_message() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = result.context("scanning asset tree").unwrap_err();
        assert!(err.to_string().contains("scanning asset tree"));
    }

    #[test]
    fn test_with_file_path() {
        let err = Error::host("missing", HostErrorKind::InvalidProjectRoot)
            .with_file_path("/tmp/project");
        assert_eq!(err.file_path().unwrap().to_str(), Some("/tmp/project"));
        assert!(err.user_message().contains("/tmp/project"));
    }
}
