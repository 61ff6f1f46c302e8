//! Vertex and polygon model.
//!
//! This module provides:
//! - [`MeshType`] - Closed set of polygon topologies
//! - [`Vertex`] - Per-vertex attributes (plain arrays, `bytemuck::Pod`)
//! - [`VertexId`] - Stable handle into a mesh's vertex arena
//! - [`Polygon`] - Ordered list of vertex handles plus a cached face normal

/// Topology of the polygons in a mesh.
///
/// Every polygon added to a mesh must have a vertex count accepted by the
/// mesh type (see [`MeshType::accepts`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeshType {
    /// Four vertices per polygon.
    Quad,
    /// Three vertices per polygon.
    #[default]
    Triangle,
    /// Each polygon is a triangle fan (three or more vertices).
    TriangleFan,
    /// Each polygon is a triangle strip (three or more vertices).
    TriangleStrip,
    /// Two vertices per polygon.
    Line,
    /// One vertex per polygon.
    Point,
    /// Each polygon is a connected line strip (two or more vertices).
    LineStrip,
}

impl MeshType {
    /// All mesh types, in file-format order.
    pub const ALL: [MeshType; 7] = [
        Self::Quad,
        Self::Triangle,
        Self::TriangleFan,
        Self::TriangleStrip,
        Self::Line,
        Self::Point,
        Self::LineStrip,
    ];

    /// Exact vertex count per polygon, or `None` for strip/fan topologies.
    pub fn vertices_per_face(&self) -> Option<usize> {
        match self {
            Self::Quad => Some(4),
            Self::Triangle => Some(3),
            Self::Line => Some(2),
            Self::Point => Some(1),
            Self::TriangleFan | Self::TriangleStrip | Self::LineStrip => None, // Variable
        }
    }

    /// Smallest vertex count a polygon of this type may have.
    pub fn min_vertices(&self) -> usize {
        match self {
            Self::TriangleFan | Self::TriangleStrip => 3,
            Self::LineStrip => 2,
            fixed => fixed.vertices_per_face().unwrap_or(1),
        }
    }

    /// Check whether a polygon with `count` vertices fits this topology.
    pub fn accepts(&self, count: usize) -> bool {
        match self.vertices_per_face() {
            Some(n) => count == n,
            None => count >= self.min_vertices(),
        }
    }

    /// Whether polygons of this type enclose an area (and so have a normal).
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            Self::Quad | Self::Triangle | Self::TriangleFan | Self::TriangleStrip
        )
    }

    /// Stable numeric tag used by the binary file format.
    pub fn as_raw(&self) -> u32 {
        match self {
            Self::Quad => 0,
            Self::Triangle => 1,
            Self::TriangleFan => 2,
            Self::TriangleStrip => 3,
            Self::Line => 4,
            Self::Point => 5,
            Self::LineStrip => 6,
        }
    }

    /// Inverse of [`MeshType::as_raw`].
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// A mesh vertex.
///
/// Stored with plain arrays so slices of vertices can be handed to
/// `bytemuck` without conversion.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position [x, y, z].
    pub position: [f32; 3],
    /// Normal [x, y, z].
    pub normal: [f32; 3],
    /// Tangent [x, y, z].
    pub tangent: [f32; 3],
    /// Color [r, g, b, a].
    pub color: [f32; 4],
    /// Texture coordinates [u, v].
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Number of `f32` values in one vertex.
    pub const FLOAT_COUNT: usize = 15;

    /// Vertex at `position` with zero normal/tangent, white color and zero UV.
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            normal: [0.0; 3],
            tangent: [0.0; 3],
            color: [1.0; 4],
            tex_coord: [0.0; 2],
        }
    }

    /// Vertex with position and texture coordinates.
    pub fn with_uv(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            tex_coord,
            ..Self::new(position)
        }
    }

    /// Returns this vertex with a different normal.
    #[must_use]
    pub fn with_normal(mut self, normal: [f32; 3]) -> Self {
        self.normal = normal;
        self
    }

    /// Returns this vertex with a different color.
    #[must_use]
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Euclidean distance between the positions of two vertices.
    pub fn distance(&self, other: &Vertex) -> f32 {
        self.distance_to(other.position)
    }

    /// Euclidean distance from this vertex's position to a point.
    pub fn distance_to(&self, point: [f32; 3]) -> f32 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new([0.0; 3])
    }
}

/// Handle to a vertex in a mesh's vertex arena.
///
/// Handles are plain indices. They stay valid until the mesh is cleared,
/// regenerated, loaded, or [`Mesh::prune_unused_vertices`] compacts the arena.
/// Handles are 32-bit, so an arena holds at most `u32::MAX + 1` vertices.
///
/// [`Mesh::prune_unused_vertices`]: super::Mesh::prune_unused_vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub(crate) u32);

impl VertexId {
    /// Create a handle from a raw arena index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Handle for an arena index, or `None` if it does not fit in 32 bits.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Raw arena index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A face of a mesh: an ordered list of vertex handles.
///
/// Winding is counter-clockwise when seen from the front side.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<VertexId>,
    normal: [f32; 3],
}

impl Polygon {
    /// Create a polygon from vertex handles.
    pub fn new(vertices: Vec<VertexId>) -> Self {
        Self {
            vertices,
            normal: [0.0; 3],
        }
    }

    /// Create a triangle.
    pub fn triangle(a: VertexId, b: VertexId, c: VertexId) -> Self {
        Self::new(vec![a, b, c])
    }

    /// Create a quad.
    pub fn quad(a: VertexId, b: VertexId, c: VertexId, d: VertexId) -> Self {
        Self::new(vec![a, b, c, d])
    }

    /// Returns this polygon with a preset face normal.
    #[must_use]
    pub fn with_normal(mut self, normal: [f32; 3]) -> Self {
        self.normal = normal;
        self
    }

    /// Vertex handles in winding order.
    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check whether this polygon references `id`.
    pub fn contains(&self, id: VertexId) -> bool {
        self.vertices.contains(&id)
    }

    /// Cached face normal, refreshed by normal calculation.
    pub fn normal(&self) -> [f32; 3] {
        self.normal
    }

    pub(crate) fn set_normal(&mut self, normal: [f32; 3]) {
        self.normal = normal;
    }

    pub(crate) fn vertex_ids_mut(&mut self) -> &mut [VertexId] {
        &mut self.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_type_vertices_per_face() {
        assert_eq!(MeshType::Quad.vertices_per_face(), Some(4));
        assert_eq!(MeshType::Triangle.vertices_per_face(), Some(3));
        assert_eq!(MeshType::Line.vertices_per_face(), Some(2));
        assert_eq!(MeshType::Point.vertices_per_face(), Some(1));
        assert_eq!(MeshType::TriangleStrip.vertices_per_face(), None);
    }

    #[test]
    fn test_mesh_type_accepts() {
        assert!(MeshType::Quad.accepts(4));
        assert!(!MeshType::Quad.accepts(3));
        assert!(MeshType::TriangleFan.accepts(3));
        assert!(MeshType::TriangleFan.accepts(12));
        assert!(!MeshType::TriangleFan.accepts(2));
        assert!(MeshType::LineStrip.accepts(2));
        assert!(!MeshType::LineStrip.accepts(1));
        assert!(!MeshType::Point.accepts(0));
    }

    #[test]
    fn test_mesh_type_raw_tags() {
        for ty in MeshType::ALL {
            assert_eq!(MeshType::from_raw(ty.as_raw()), Some(ty));
        }
        assert_eq!(MeshType::from_raw(7), None);
    }

    #[test]
    fn test_vertex_layout_is_packed() {
        assert_eq!(
            std::mem::size_of::<Vertex>(),
            Vertex::FLOAT_COUNT * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn test_vertex_distance() {
        let a = Vertex::new([0.0, 0.0, 0.0]);
        let b = Vertex::new([3.0, 4.0, 0.0]);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
        assert_eq!(a.color, [1.0; 4]);
    }

    #[test]
    fn test_vertex_id_from_index() {
        assert_eq!(VertexId::from_index(7), Some(VertexId::new(7)));
        let last = u32::MAX as usize;
        assert_eq!(VertexId::from_index(last).map(|id| id.index()), Some(last));
        #[cfg(target_pointer_width = "64")]
        assert_eq!(VertexId::from_index(last + 1), None);
    }

    #[test]
    fn test_polygon_contains() {
        let p = Polygon::triangle(VertexId(0), VertexId(1), VertexId(2));
        assert!(p.contains(VertexId(1)));
        assert!(!p.contains(VertexId(3)));
        assert_eq!(p.vertex_count(), 3);
    }
}
