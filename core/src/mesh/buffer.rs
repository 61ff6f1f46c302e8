//! Renderer-side vertex buffer contract.
//!
//! The geometry core never creates, uploads or rebuilds a vertex buffer. A
//! renderer backend implements [`VertexBuffer`] for its own buffer type and
//! hands an instance to [`Mesh::set_vertex_buffer`]; the mesh then owns it
//! until it is replaced or the mesh is dropped.
//!
//! Whenever any render array kind of the mesh is dirty, the bound buffer is
//! stale and must be rebuilt before the next draw.
//!
//! [`Mesh::set_vertex_buffer`]: super::Mesh::set_vertex_buffer

use super::types::MeshType;

/// Minimal contract of a renderer-owned vertex buffer.
pub trait VertexBuffer: Send + Sync {
    /// Number of vertices uploaded to the buffer.
    fn vertex_count(&self) -> usize;

    /// Vertices per face the buffer was built for (`None` for strips/fans).
    fn vertices_per_face(&self) -> Option<usize> {
        self.mesh_type().vertices_per_face()
    }

    /// Mesh type the buffer was built for.
    fn mesh_type(&self) -> MeshType;
}

impl std::fmt::Debug for dyn VertexBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("vertex_count", &self.vertex_count())
            .field("mesh_type", &self.mesh_type())
            .finish()
    }
}
