//! Error types for the bridge.
//!
//! This module defines [`BridgeError`], the error type used throughout
//! the crate, the [`IndexGenerationError`] failure modes of index
//! generation, and a helper trait for attaching context to I/O errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur during bridge operations.
///
/// Each variant is distinguishable by kind for programmatic handling and
/// carries a human-readable message; underlying causes are chained via
/// `source` where one exists.
#[derive(Error, Diagnostic, Debug)]
pub enum BridgeError {
    #[error("Metadata not found: {package_id}")]
    #[diagnostic(
        code(fdroid_bridge::metadata::not_found),
        help("Check that the package id matches a file in the metadata directory")
    )]
    MetadataNotFound { package_id: String },

    #[error("Invalid metadata for {package_id}: {source}")]
    #[diagnostic(
        code(fdroid_bridge::metadata::parse),
        help("The metadata file must contain a valid JSON object")
    )]
    MetadataParse {
        package_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("App record at position {position} has no package_id")]
    #[diagnostic(code(fdroid_bridge::index::missing_package_id))]
    MissingPackageId { position: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    IndexGeneration(#[from] IndexGenerationError),

    #[error("Error while {action}: {source}")]
    #[diagnostic(code(fdroid_bridge::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(fdroid_bridge::json))]
    JsonError(#[from] serde_json::Error),
}

/// Failure modes of repository index generation.
///
/// Exactly one of these is reported per [`generate_index`] call; there is
/// no retry.
///
/// [`generate_index`]: crate::index::generate_index
#[derive(Error, Diagnostic, Debug)]
pub enum IndexGenerationError {
    #[error("Repository directory not found: {}", path.display())]
    #[diagnostic(code(fdroid_bridge::index::repo_dir_missing))]
    RepoDirMissing { path: PathBuf },

    #[error("fdroid update failed: {stderr}")]
    #[diagnostic(
        code(fdroid_bridge::index::tool_failed),
        help("Inspect the captured fdroid output for the underlying problem")
    )]
    ToolFailed { stderr: String },

    #[error("Failed to run fdroidserver: {source}")]
    #[diagnostic(
        code(fdroid_bridge::index::tool_launch),
        help("Ensure fdroidserver is installed and `fdroid` is on PATH")
    )]
    ToolLaunch {
        #[source]
        source: std::io::Error,
    },

    #[error("Index file not generated")]
    #[diagnostic(code(fdroid_bridge::index::output_missing))]
    OutputMissing,

    #[error("Failed to parse generated index: {source}")]
    #[diagnostic(code(fdroid_bridge::index::output_parse))]
    OutputParse {
        #[source]
        source: serde_json::Error,
    },
}

/// A specialized Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Extension trait for adding context to I/O errors.
///
/// Converts `std::io::Result` into [`Result`] with a description of the
/// action that failed, keeping the underlying error kind reachable
/// through the source chain.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            BridgeError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
