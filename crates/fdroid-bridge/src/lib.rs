//! Bridge between an app-store backend and fdroidserver.
//!
//! This crate keeps per-app JSON metadata records in a directory and
//! produces F-Droid compatible repository indexes, either by wrapping the
//! `fdroid` command-line tool or by assembling a minimal index directly
//! from in-memory records.
//!
//! # Overview
//!
//! - **Metadata store**: one pretty-printed JSON record per package id,
//!   loaded and saved wholesale, with a pure field validator.
//! - **Index builder**: [`generate_index`] delegates to
//!   `fdroid update --pretty --nosign` and reads back its artifact;
//!   [`create_minimal_index`] builds the index structure without the
//!   external tool, for testing or constrained environments.
//!
//! Everything is synchronous; the only blocking operations are file I/O
//! and the captured-output child process.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use fdroid_bridge::{create_minimal_index, load_metadata};
//!
//! fn build() -> fdroid_bridge::Result<()> {
//!     let metadata = load_metadata(Path::new("metadata"), "dk.digst.mitid")?;
//!     let index = create_minimal_index("DK App Store", "Official apps", &[metadata])?;
//!     println!("{} apps indexed", index.apps.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod index;
pub mod metadata;

pub use error::{BridgeError, ErrorContext, IndexGenerationError, Result};
pub use index::{
    create_minimal_index, generate_index, AppEntry, Index, LocalizedText, RepoInfo,
    DEFAULT_LOCALE, INDEX_FORMAT_VERSION,
};
pub use metadata::{
    list_packages, load_metadata, save_metadata, validate_metadata, REQUIRED_FIELDS,
};
