//! Error type shared by every projprep operation
//!
//! Tree walks and state loading absorb their failures; what reaches this
//! type is a whole-operation failure worth showing to the user.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for projprep operations
#[derive(Error, Debug)]
pub enum ProjPrepError {
    /// Filesystem failure outside a backup copy
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// State or settings serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rejected command-line configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Backup copy failed; partial output may remain at the destination
    #[error("Backup failed at {}: {source}", path.display())]
    Backup {
        /// Entry being copied when the failure happened
        path: PathBuf,
        /// Underlying cause
        source: io::Error,
    },

    /// No clipboard helper accepted the canvas
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Project, directory or tree entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request that cannot be carried out as given
    #[error("{0}")]
    InvalidArgument(String),

    /// Failure with attached context, see [`ResultExt`]
    #[error("{0}")]
    Unexpected(String),
}

/// Specialized Result type for projprep operations
pub type Result<T> = std::result::Result<T, ProjPrepError>;

/// Creates a ProjPrepError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::ProjPrepError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Attach a message to any error, turning it into [`ProjPrepError::Unexpected`]
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            ProjPrepError::Unexpected(format!("{}: {}", context, e))
        })
    }
}

impl ProjPrepError {
    /// Wrap an IO failure that happened while copying `path` during a backup
    pub fn backup(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Backup {
            path: path.into(),
            source,
        }
    }
}
