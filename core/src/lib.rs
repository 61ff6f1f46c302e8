//! # Polymesh Core
//!
//! Polygonal mesh container for a scene-graph renderer: editable vertices and
//! polygons, primitive generators, normal and tangent calculation, bounding
//! queries, binary load/save, and per-attribute render-cache invalidation.

pub mod error;
pub mod math;
pub mod mesh;
pub mod profiling;
pub mod shared;

pub use error::MeshError;
pub use mesh::{Mesh, MeshType, Polygon, Vertex, VertexId};
pub use shared::SharedMesh;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
