//! Unified error type for the recovery pipeline and its CLI wrapper.

use thiserror::Error;

/// All errors that can occur while converting an ExtendScript XML definition
/// into a TypeScript declaration file.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// `roxmltree` rejected the byte stream before any definition parsing began.
    #[error("malformed XML document: {0}")]
    MalformedXml(#[from] roxmltree::Error),

    /// An element directly under `classdef` carried neither an `enumeration`
    /// nor a `dynamic` attribute.
    #[error("unknown definition kind for '{name}': expected an `enumeration` or `dynamic` attribute")]
    UnknownDefinitionKind { name: String },

    /// A member element was something other than `property`, `method`, or the
    /// indexer marker (`.index` parameter name).
    #[error("unknown member kind '{tag}' on definition '{definition}'")]
    UnknownMemberKind { definition: String, tag: String },

    /// I/O error reading an XML file or binary blob from disk.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Mutually exclusive flags or other CLI argument validation error.
    #[error("{0}")]
    InvalidArgs(String),

    /// `--require-blobs` was set and no binary blob was found.
    #[error("no binary blobs found in '{dir}' (pass --blob explicitly or drop --require-blobs)")]
    NoBlobsFound { dir: String },
}
