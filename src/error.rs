//! Error types for meshstitch.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building or editing a mesh.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The per-face vertex counts do not add up to the length of the
    /// face vertex index sequence.
    #[error("face vertex counts sum to {expected} but {actual} face vertex indices were given")]
    IndexCountMismatch {
        /// Sum of the per-face vertex counts.
        expected: usize,
        /// Length of the flat index sequence.
        actual: usize,
    },

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// More cells are needed than the index type can address.
    #[error("{count} cells do not fit in the mesh index type")]
    IndexOverflow {
        /// Number of cells that would be needed.
        count: usize,
    },

    /// The output vertex buffer of an import package already holds entries.
    #[error("vertex output buffer must be empty before import (found {len} entries)")]
    OutputBufferNotEmpty {
        /// Number of entries found in the buffer.
        len: usize,
    },

    /// An attribute with this name already exists.
    #[error("attribute \"{name}\" already exists")]
    AttributeExists {
        /// The attribute name.
        name: String,
    },

    /// An attribute exists under this name but holds another value type.
    #[error("attribute \"{name}\" exists with a different value type")]
    AttributeTypeMismatch {
        /// The attribute name.
        name: String,
    },

    /// No attribute with this name and type exists.
    #[error("attribute \"{name}\" not found")]
    AttributeNotFound {
        /// The attribute name.
        name: String,
    },

    /// A dart is already sewn to another dart.
    #[error("dart {dart} is already sewn")]
    AlreadySewn {
        /// Raw index of the sewn dart.
        dart: usize,
    },

    /// The edges given for a face do not form a single closed cycle.
    #[error("the {edges} edges given for the face do not form a closed cycle")]
    OpenFace {
        /// Number of edges given.
        edges: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),
}
