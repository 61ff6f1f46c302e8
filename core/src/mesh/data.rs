//! The [`Mesh`] container.
//!
//! A mesh owns a vertex arena and an ordered list of polygons referencing
//! arena vertices by [`VertexId`]. Insertion order is rendering order.
//!
//! The mesh is also the authority for render-cache invalidation: every
//! mutation marks the [`RenderArrayKind`]s whose flattened data it changes.
//! Only the renderer clears a flag, through [`RenderCache::store`].

use crate::error::MeshError;
use crate::math::{self, Vec3};

use super::buffer::VertexBuffer;
use super::render::{RenderArrayKind, RenderCache, RenderDataArray};
use super::types::{MeshType, Polygon, Vertex, VertexId};

/// A polygonal mesh.
///
/// Built from [`Polygon`]s that reference shared [`Vertex`] records. When the
/// mesh is rendered it is cached into flat per-attribute arrays with no notion
/// of separate polygons; see [`RenderCache`] for the invalidation protocol.
///
/// # Example
///
/// ```
/// use polymesh_core::mesh::{Mesh, MeshType, Polygon, RenderArrayKind, Vertex};
///
/// let mut mesh = Mesh::new(MeshType::Triangle);
/// let a = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0]));
/// let b = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0]));
/// let c = mesh.add_vertex(Vertex::new([0.0, 1.0, 0.0]));
/// mesh.add_polygon(Polygon::triangle(a, b, c)).unwrap();
///
/// // A renderer rebuilds dirty arrays, then stores them.
/// for kind in mesh.dirty_kinds() {
///     let array = mesh.build_render_array(kind);
///     mesh.render_cache_mut().store(array);
/// }
/// assert!(!mesh.is_dirty(RenderArrayKind::Position));
/// ```
pub struct Mesh {
    mesh_type: MeshType,
    vertices: Vec<Vertex>,
    polygons: Vec<Polygon>,
    render_cache: RenderCache,
    vertex_buffer: Option<Box<dyn VertexBuffer>>,
    use_vertex_colors: bool,
    use_vertex_normals: bool,
}

impl Mesh {
    /// Create an empty mesh of the given type. Every render array starts dirty.
    pub fn new(mesh_type: MeshType) -> Self {
        Self {
            mesh_type,
            vertices: Vec::new(),
            polygons: Vec::new(),
            render_cache: RenderCache::new(),
            vertex_buffer: None,
            use_vertex_colors: false,
            use_vertex_normals: true,
        }
    }

    // ---------------------------------------------------------------------
    // Topology
    // ---------------------------------------------------------------------

    /// Get the mesh type.
    pub fn mesh_type(&self) -> MeshType {
        self.mesh_type
    }

    /// Change the mesh type.
    ///
    /// Existing polygons are kept, so every polygon must already fit the new
    /// type; otherwise the mesh is left untouched and
    /// [`MeshError::InvalidTopology`] is returned. To change the topology of a
    /// populated mesh, [`clear_mesh`](Self::clear_mesh) first. On success all
    /// render arrays are marked dirty.
    pub fn set_mesh_type(&mut self, mesh_type: MeshType) -> Result<(), MeshError> {
        if let Some(bad) = self.polygons.iter().find(|p| !mesh_type.accepts(p.vertex_count())) {
            return Err(MeshError::InvalidTopology {
                mesh_type,
                vertex_count: bad.vertex_count(),
            });
        }
        self.mesh_type = mesh_type;
        self.render_cache.mark_all_dirty();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Vertices
    // ---------------------------------------------------------------------

    /// Add a vertex to the arena and return its handle.
    ///
    /// The vertex feeds no render array until a polygon references it, so no
    /// dirty flag changes.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds as many vertices as a [`VertexId`]
    /// can address.
    pub fn add_vertex(&mut self, vertex: Vertex) -> VertexId {
        let Some(id) = VertexId::from_index(self.vertices.len()) else {
            panic!("vertex arena is full ({} vertices)", self.vertices.len());
        };
        self.vertices.push(vertex);
        id
    }

    /// Get a vertex by handle.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex, MeshError> {
        self.vertices.get(id.index()).ok_or(MeshError::IndexOutOfRange {
            index: id.index(),
            len: self.vertices.len(),
        })
    }

    /// All arena vertices, indexed by [`VertexId::index`].
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    /// Number of vertices in the arena.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Set a vertex position. Marks positions dirty.
    pub fn set_vertex_position(&mut self, id: VertexId, position: [f32; 3]) -> Result<(), MeshError> {
        self.vertex_mut(id)?.position = position;
        self.render_cache.mark_dirty(RenderArrayKind::Position);
        Ok(())
    }

    /// Set a vertex normal. Marks normals dirty.
    pub fn set_vertex_normal(&mut self, id: VertexId, normal: [f32; 3]) -> Result<(), MeshError> {
        self.vertex_mut(id)?.normal = normal;
        self.render_cache.mark_dirty(RenderArrayKind::Normal);
        Ok(())
    }

    /// Set a vertex tangent. Marks tangents dirty.
    pub fn set_vertex_tangent(&mut self, id: VertexId, tangent: [f32; 3]) -> Result<(), MeshError> {
        self.vertex_mut(id)?.tangent = tangent;
        self.render_cache.mark_dirty(RenderArrayKind::Tangent);
        Ok(())
    }

    /// Set a vertex color. Marks colors dirty.
    pub fn set_vertex_color(&mut self, id: VertexId, color: [f32; 4]) -> Result<(), MeshError> {
        self.vertex_mut(id)?.color = color;
        self.render_cache.mark_dirty(RenderArrayKind::Color);
        Ok(())
    }

    /// Set vertex texture coordinates. Marks texture coordinates dirty.
    pub fn set_vertex_tex_coord(&mut self, id: VertexId, tex_coord: [f32; 2]) -> Result<(), MeshError> {
        self.vertex_mut(id)?.tex_coord = tex_coord;
        self.render_cache.mark_dirty(RenderArrayKind::TexCoord);
        Ok(())
    }

    fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex, MeshError> {
        let len = self.vertices.len();
        self.vertices
            .get_mut(id.index())
            .ok_or(MeshError::IndexOutOfRange {
                index: id.index(),
                len,
            })
    }

    /// Vertex handles sorted by ascending distance from `target`.
    ///
    /// Ties keep arena order.
    pub fn vertices_by_distance(&self, target: [f32; 3]) -> Vec<VertexId> {
        let mut ids: Vec<VertexId> = (0..self.vertices.len() as u32).map(VertexId).collect();
        ids.sort_by(|a, b| {
            let da = self.vertices[a.index()].distance_to(target);
            let db = self.vertices[b.index()].distance_to(target);
            da.total_cmp(&db)
        });
        ids
    }

    // ---------------------------------------------------------------------
    // Polygons
    // ---------------------------------------------------------------------

    /// Append a polygon and return its index.
    ///
    /// The polygon must fit the mesh type and reference existing vertices.
    /// Marks every render array kind dirty, since the flattened layout changes.
    pub fn add_polygon(&mut self, polygon: Polygon) -> Result<usize, MeshError> {
        check_polygon(&polygon, self.mesh_type, self.vertices.len())?;
        self.polygons.push(polygon);
        self.render_cache.mark_all_dirty();
        Ok(self.polygons.len() - 1)
    }

    /// Remove and return the polygon at `index`.
    ///
    /// Later polygons shift down by one. Vertices stay in the arena; see
    /// [`prune_unused_vertices`](Self::prune_unused_vertices).
    pub fn remove_polygon(&mut self, index: usize) -> Result<Polygon, MeshError> {
        if index >= self.polygons.len() {
            return Err(MeshError::IndexOutOfRange {
                index,
                len: self.polygons.len(),
            });
        }
        let polygon = self.polygons.remove(index);
        self.render_cache.mark_all_dirty();
        Ok(polygon)
    }

    /// Get the polygon at `index`.
    pub fn polygon(&self, index: usize) -> Result<&Polygon, MeshError> {
        self.polygons.get(index).ok_or(MeshError::IndexOutOfRange {
            index,
            len: self.polygons.len(),
        })
    }

    /// All polygons in rendering order.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub(crate) fn polygons_mut(&mut self) -> &mut [Polygon] {
        &mut self.polygons
    }

    /// Number of polygons.
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Total number of polygon corners (element count of every render array).
    pub fn corner_count(&self) -> usize {
        self.polygons.iter().map(Polygon::vertex_count).sum()
    }

    /// Remove all polygons and vertices. The mesh type is preserved and every
    /// render array is marked dirty.
    pub fn clear_mesh(&mut self) {
        self.polygons.clear();
        self.vertices.clear();
        self.render_cache.mark_all_dirty();
    }

    /// Drop arena vertices no polygon references and return how many were
    /// removed.
    ///
    /// Surviving vertices keep their relative order; polygon handles are
    /// remapped. Handles obtained before the call are invalidated. Rendered
    /// data is unchanged, so no dirty flag is set.
    pub fn prune_unused_vertices(&mut self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for id in self.polygons.iter().flat_map(|p| p.vertex_ids()) {
            used[id.index()] = true;
        }
        let removed = used.iter().filter(|u| !**u).count();
        if removed == 0 {
            return 0;
        }

        let mut remap = vec![0u32; self.vertices.len()];
        let mut next = 0u32;
        for (slot, &keep) in remap.iter_mut().zip(&used) {
            if keep {
                *slot = next;
                next += 1;
            }
        }

        let mut index = 0;
        self.vertices.retain(|_| {
            let keep = used[index];
            index += 1;
            keep
        });
        for polygon in &mut self.polygons {
            for id in polygon.vertex_ids_mut() {
                *id = VertexId(remap[id.index()]);
            }
        }
        removed
    }

    /// Replace all geometry at once. Marks every render array dirty.
    pub(crate) fn replace_geometry(
        &mut self,
        mesh_type: MeshType,
        vertices: Vec<Vertex>,
        polygons: Vec<Polygon>,
    ) {
        self.mesh_type = mesh_type;
        self.vertices = vertices;
        self.polygons = polygons;
        self.render_cache.mark_all_dirty();
    }

    // ---------------------------------------------------------------------
    // Spatial queries
    // ---------------------------------------------------------------------

    /// Translate every vertex by `offset`. Marks positions dirty.
    pub fn translate(&mut self, offset: [f32; 3]) {
        for v in &mut self.vertices {
            v.position[0] += offset[0];
            v.position[1] += offset[1];
            v.position[2] += offset[2];
        }
        self.render_cache.mark_dirty(RenderArrayKind::Position);
    }

    /// Move the mesh so its vertices are as equidistant from the origin as
    /// possible, and return the translation applied.
    ///
    /// The center used is the center of the axis-aligned bounding box, not the
    /// vertex average. Calling this twice yields a near-zero second
    /// translation. Marks positions dirty.
    pub fn recenter_mesh(&mut self) -> [f32; 3] {
        let Some((min, max)) = self.bounds() else {
            return [0.0; 3];
        };
        let offset: [f32; 3] = (-(Vec3::from(min) + Vec3::from(max)) * 0.5).into();
        self.translate(offset);
        offset
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        math::min_max(self.vertices.iter().map(|v| &v.position))
            .map(|(min, max)| (min.into(), max.into()))
    }

    /// Full extents of the axis-aligned bounding box (`max - min` per axis).
    ///
    /// Zero for an empty mesh.
    pub fn calculate_bbox(&self) -> [f32; 3] {
        match self.bounds() {
            Some((min, max)) => (Vec3::from(max) - Vec3::from(min)).into(),
            None => [0.0; 3],
        }
    }

    /// Distance from the origin to the furthest vertex.
    pub fn radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| Vec3::from(v.position).norm())
            .fold(0.0, f32::max)
    }

    // ---------------------------------------------------------------------
    // Vertex buffer
    // ---------------------------------------------------------------------

    /// Bind a renderer vertex buffer. The mesh takes ownership; a previously
    /// bound buffer is dropped.
    pub fn set_vertex_buffer(&mut self, buffer: Box<dyn VertexBuffer>) {
        if let Some(old) = self.vertex_buffer.replace(buffer) {
            log::debug!(
                "Replacing vertex buffer ({} vertices, {:?})",
                old.vertex_count(),
                old.mesh_type()
            );
        }
    }

    /// The bound vertex buffer, if any.
    pub fn vertex_buffer(&self) -> Option<&dyn VertexBuffer> {
        self.vertex_buffer.as_deref()
    }

    /// Check if the mesh has a vertex buffer.
    pub fn has_vertex_buffer(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    /// True when a buffer is bound and at least one render array is dirty.
    pub fn vertex_buffer_is_stale(&self) -> bool {
        self.has_vertex_buffer() && self.render_cache.any_dirty()
    }

    // ---------------------------------------------------------------------
    // Render flags
    // ---------------------------------------------------------------------

    /// Choose between vertex normals (`true`) and polygon normals (`false`)
    /// for the flattened normal array.
    ///
    /// Normals are not recomputed; the normal array is marked dirty because
    /// its contents depend on this choice.
    pub fn use_vertex_normals(&mut self, val: bool) {
        if self.use_vertex_normals != val {
            self.use_vertex_normals = val;
            self.render_cache.mark_dirty(RenderArrayKind::Normal);
        }
    }

    /// Whether vertex normals are used for rendering.
    pub fn uses_vertex_normals(&self) -> bool {
        self.use_vertex_normals
    }

    /// If set, the renderer uses vertex colors instead of the entity color.
    pub fn set_use_vertex_colors(&mut self, val: bool) {
        self.use_vertex_colors = val;
    }

    /// Whether vertex colors override the entity color.
    pub fn uses_vertex_colors(&self) -> bool {
        self.use_vertex_colors
    }

    // ---------------------------------------------------------------------
    // Render cache
    // ---------------------------------------------------------------------

    /// Per-kind dirty flags and stored arrays.
    pub fn render_cache(&self) -> &RenderCache {
        &self.render_cache
    }

    /// Mutable access for the renderer, to [`store`](RenderCache::store)
    /// rebuilt arrays.
    pub fn render_cache_mut(&mut self) -> &mut RenderCache {
        &mut self.render_cache
    }

    /// Whether `kind` must be rebuilt before drawing.
    pub fn is_dirty(&self, kind: RenderArrayKind) -> bool {
        self.render_cache.is_dirty(kind)
    }

    /// Kinds that must be rebuilt before drawing.
    pub fn dirty_kinds(&self) -> Vec<RenderArrayKind> {
        self.render_cache.dirty_kinds()
    }

    /// Flatten current data for `kind`: one element per polygon corner, in
    /// polygon order.
    ///
    /// Normals come from vertices or from polygons depending on
    /// [`use_vertex_normals`](Self::use_vertex_normals). This does not touch
    /// any dirty flag.
    pub fn build_render_array(&self, kind: RenderArrayKind) -> RenderDataArray {
        let mut data = Vec::with_capacity(self.corner_count() * kind.format().components());
        for polygon in &self.polygons {
            for id in polygon.vertex_ids() {
                let v = &self.vertices[id.index()];
                match kind {
                    RenderArrayKind::Position => data.extend_from_slice(&v.position),
                    RenderArrayKind::Color => data.extend_from_slice(&v.color),
                    RenderArrayKind::Normal if self.use_vertex_normals => {
                        data.extend_from_slice(&v.normal)
                    }
                    RenderArrayKind::Normal => data.extend_from_slice(&polygon.normal()),
                    RenderArrayKind::TexCoord => data.extend_from_slice(&v.tex_coord),
                    RenderArrayKind::Tangent => data.extend_from_slice(&v.tangent),
                }
            }
        }
        RenderDataArray::new(kind, data)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new(MeshType::default())
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("mesh_type", &self.mesh_type)
            .field("vertex_count", &self.vertices.len())
            .field("polygon_count", &self.polygons.len())
            .field("dirty", &self.render_cache.dirty_kinds())
            .field("vertex_buffer", &self.vertex_buffer)
            .field("use_vertex_colors", &self.use_vertex_colors)
            .field("use_vertex_normals", &self.use_vertex_normals)
            .finish()
    }
}

/// Validate a polygon against a mesh type and arena size.
pub(crate) fn check_polygon(
    polygon: &Polygon,
    mesh_type: MeshType,
    vertex_len: usize,
) -> Result<(), MeshError> {
    if !mesh_type.accepts(polygon.vertex_count()) {
        return Err(MeshError::InvalidTopology {
            mesh_type,
            vertex_count: polygon.vertex_count(),
        });
    }
    if let Some(bad) = polygon.vertex_ids().iter().find(|id| id.index() >= vertex_len) {
        return Err(MeshError::IndexOutOfRange {
            index: bad.index(),
            len: vertex_len,
        });
    }
    Ok(())
}
