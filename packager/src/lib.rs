//! Equalization results packager.
//!
//! This crate turns a results repository into a distributable package for the
//! selector front-end: an export tree of per-device, per-source artefacts, a
//! ranked `index.json`, a `version.json` provenance record, and a
//! gzip-compressed tar archive of the whole tree. It is used by the
//! `curvepack` CLI binary and can be driven programmatically with substitute
//! filesystem, archive, and revision capabilities.
//!
//! # Modules
//!
//! - [`archive`] - Compressed archive of the export tree
//! - [`cli`] - Command-line argument definitions
//! - [`collector`] - Export tree construction from manifest entries
//! - [`error`] - Error types for the packaging run
//! - [`fs`] - Filesystem capability
//! - [`git`] - Revision metadata from the enclosing git repository
//! - [`manifest`] - Manifest line grammar
//! - [`metadata`] - `index.json` and `version.json` documents
//! - [`output`] - Artefact naming and missing-artefact diagnostics
//! - [`paths`] - Lexical path normalization
//! - [`pipeline`] - Packaging pipeline orchestration
//! - [`ranking`] - Device grouping and source ranking

pub mod archive;
pub mod cli;
pub mod collector;
pub mod error;
pub mod fs;
pub mod git;
pub mod manifest;
pub mod metadata;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod ranking;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
