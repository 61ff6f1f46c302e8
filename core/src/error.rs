//! Mesh error types.

use std::fmt;

use crate::mesh::MeshType;

/// Errors that can occur while building, editing, loading or saving a mesh.
#[derive(Debug)]
pub enum MeshError {
    /// A shape generator or option received an unusable value.
    InvalidParameter(String),
    /// A polygon index or vertex handle does not resolve.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of elements that were addressable.
        len: usize,
    },
    /// A polygon's vertex count does not fit the mesh type.
    InvalidTopology {
        /// Mesh type the polygon was checked against.
        mesh_type: MeshType,
        /// Number of vertices in the rejected polygon.
        vertex_count: usize,
    },
    /// Reading or writing the underlying stream failed.
    Io(std::io::Error),
    /// The stream was readable but does not contain a valid mesh.
    InvalidFormat(String),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range (len {len})")
            }
            Self::InvalidTopology {
                mesh_type,
                vertex_count,
            } => write!(
                f,
                "polygon with {vertex_count} vertices does not fit a {mesh_type:?} mesh"
            ),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::InvalidFormat(msg) => write!(f, "invalid mesh file: {msg}"),
        }
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MeshError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
