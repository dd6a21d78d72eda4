//! Unified error type and exit-code mapping.
//!
//! Subsystem errors (configuration, resolution, synthesis, output, oracle)
//! are bridged into [`JavabindError`], the single error type the CLI maps
//! to process exit codes:
//!
//! - `2`: configuration errors (reported before any synthesis, no partial output)
//! - `3`: resolution errors
//! - `4`: output/write errors
//! - `10`: internal errors
//!
//! An oracle that requested termination propagates its own status code.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

// ============================================================================
// Exit Codes
// ============================================================================

/// Stable exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Configuration error.
    Config,
    /// Resolution error.
    Resolution,
    /// Output/write error.
    Output,
    /// Internal error.
    Internal,
    /// Oracle-requested termination with its own status.
    Oracle(i32),
}

impl ExitStatus {
    /// The numeric process exit code.
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Config => 2,
            ExitStatus::Resolution => 3,
            ExitStatus::Output => 4,
            ExitStatus::Internal => 10,
            ExitStatus::Oracle(code) => *code,
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the generator.
#[derive(Debug, Error)]
pub enum JavabindError {
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A type reference could not be resolved at run level (not the
    /// per-declaration skip, which is a diagnostic).
    #[error("resolution error: {message}")]
    Resolution { message: String },

    /// Generated output could not be written.
    #[error("cannot write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external type-analysis oracle failed.
    #[error("oracle failure: {message}")]
    Oracle {
        message: String,
        /// Status code the oracle exited with, when it requested termination.
        status: Option<i32>,
    },

    /// Unexpected internal state.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl JavabindError {
    /// Create a resolution error.
    pub fn resolution(message: impl Into<String>) -> Self {
        JavabindError::Resolution {
            message: message.into(),
        }
    }

    /// Create an oracle error without a propagated status.
    pub fn oracle(message: impl Into<String>) -> Self {
        JavabindError::Oracle {
            message: message.into(),
            status: None,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        JavabindError::Internal {
            message: message.into(),
        }
    }

    /// The exit status this error maps to.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            JavabindError::Config(_) => ExitStatus::Config,
            JavabindError::Resolution { .. } => ExitStatus::Resolution,
            JavabindError::Output { .. } => ExitStatus::Output,
            JavabindError::Oracle { status: Some(code), .. } => ExitStatus::Oracle(*code),
            JavabindError::Oracle { status: None, .. } => ExitStatus::Internal,
            JavabindError::Internal { .. } => ExitStatus::Internal,
        }
    }
}

/// Result type for run-level operations.
pub type JavabindResult<T> = Result<T, JavabindError>;

// ============================================================================
// Tests
// ============================================================================
