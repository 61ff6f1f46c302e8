//! Normal and tangent calculation.
//!
//! Face normals come from Newell's method, so any planar polygon (not just
//! triangles) gets a stable normal. Strip polygons are split into their
//! alternating triangles instead. Vertex normals are derived from the faces
//! connected to each vertex, either flat or smoothed within an angle
//! threshold. Tangents follow the texture-space U direction and are
//! orthogonalized against the vertex normal.

use crate::math::{self, Vec2, Vec3};
use crate::profile_function;

use super::data::Mesh;
use super::render::RenderArrayKind;
use super::types::{MeshType, VertexId};

/// Tolerance applied to the smoothing threshold so faces exactly at the
/// threshold angle are still blended.
const SMOOTH_COS_TOLERANCE: f32 = 1e-5;

/// Minimum |du1*dv2 - du2*dv1| for a face to contribute a tangent.
const UV_AREA_EPSILON: f32 = 1e-12;

/// Options for [`Mesh::calculate_normals`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalOptions {
    /// Blend normals of adjacent faces. When false every vertex takes the
    /// normal of its first connected face.
    pub smooth: bool,
    /// Maximum angle in degrees between a vertex's reference face and another
    /// connected face for the latter to be blended in.
    pub smooth_angle: f32,
}

impl NormalOptions {
    /// Flat shading.
    pub fn flat() -> Self {
        Self {
            smooth: false,
            smooth_angle: 0.0,
        }
    }

    /// Smooth shading within `angle` degrees.
    pub fn smooth(angle: f32) -> Self {
        Self {
            smooth: true,
            smooth_angle: angle,
        }
    }
}

impl Default for NormalOptions {
    fn default() -> Self {
        Self::smooth(90.0)
    }
}

impl Mesh {
    /// Indices of the polygons referencing `id`, in polygon order.
    ///
    /// A polygon that lists the vertex more than once is reported once.
    pub fn connected_faces(&self, id: VertexId) -> Vec<usize> {
        self.polygons()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.contains(id))
            .map(|(i, _)| i)
            .collect()
    }

    /// Recompute the cached normal of every polygon.
    ///
    /// Degenerate polygons, and polygons of non-surface mesh types, get a zero
    /// normal. Marks normals dirty.
    pub fn recalculate_face_normals(&mut self) {
        let normals = self.face_normals();
        for (polygon, n) in self.polygons_mut().iter_mut().zip(&normals) {
            polygon.set_normal((*n).into());
        }
        self.render_cache_mut().mark_dirty(RenderArrayKind::Normal);
    }

    /// Recompute face normals and vertex normals.
    ///
    /// In flat mode each vertex takes the normal of the first connected face
    /// with a usable normal. In smooth mode the vertex normal is the normalized
    /// sum of every connected face normal within `smooth_angle` degrees of
    /// that reference face. Angles outside `0..=180` are clamped, and 180
    /// blends every connected face. Vertices referenced by no polygon keep
    /// their current normal. Marks normals dirty.
    pub fn calculate_normals(&mut self, options: NormalOptions) {
        profile_function!();

        let mut angle = options.smooth_angle;
        if options.smooth && !(0.0..=180.0).contains(&angle) {
            let clamped = if angle > 180.0 { 180.0 } else { 0.0 };
            log::warn!("Smoothing angle {angle} outside 0..=180, clamping to {clamped}");
            angle = clamped;
        }
        let cos_threshold = angle.to_radians().cos() - SMOOTH_COS_TOLERANCE;

        self.recalculate_face_normals();
        let face_normals: Vec<Vec3> = self
            .polygons()
            .iter()
            .map(|p| Vec3::from(p.normal()))
            .collect();
        let adjacency = self.vertex_faces();

        let mut new_normals = Vec::with_capacity(adjacency.len());
        for faces in &adjacency {
            let Some(&reference) = faces
                .iter()
                .find(|&&f| face_normals[f] != Vec3::zeros())
            else {
                new_normals.push(None);
                continue;
            };
            let reference = face_normals[reference];
            let normal = if options.smooth {
                let sum: Vec3 = faces
                    .iter()
                    .map(|&f| face_normals[f])
                    .filter(|n| *n != Vec3::zeros() && n.dot(&reference) >= cos_threshold)
                    .sum();
                math::try_normalize(sum).unwrap_or(reference)
            } else {
                reference
            };
            new_normals.push(Some(normal));
        }

        for (vertex, normal) in self.vertices_mut().iter_mut().zip(new_normals) {
            if let Some(n) = normal {
                vertex.normal = n.into();
            }
        }
    }

    /// Recompute per-vertex tangents from positions and texture coordinates.
    ///
    /// Each polygon is split into triangles (fanned, or alternating for
    /// strips); triangles with degenerate UVs are skipped. Per-vertex tangents
    /// are averaged over connected faces and made orthogonal to the vertex
    /// normal. A vertex with no usable tangent gets an arbitrary unit vector
    /// perpendicular to its normal (or zero if the normal is zero). Vertices
    /// referenced by no polygon keep their current tangent. Marks tangents
    /// dirty.
    pub fn calculate_tangents(&mut self) {
        profile_function!();

        let mesh_type = self.mesh_type();
        let mut face_tangents = Vec::with_capacity(self.polygon_count());
        let mut skipped = 0usize;
        for polygon in self.polygons() {
            let mut tangent = Vec3::zeros();
            for [i0, i1, i2] in triangles(mesh_type, polygon.vertex_ids()) {
                let v0 = &self.vertices()[i0.index()];
                let v1 = &self.vertices()[i1.index()];
                let v2 = &self.vertices()[i2.index()];
                let e1 = Vec3::from(v1.position) - Vec3::from(v0.position);
                let e2 = Vec3::from(v2.position) - Vec3::from(v0.position);
                let d1 = Vec2::from(v1.tex_coord) - Vec2::from(v0.tex_coord);
                let d2 = Vec2::from(v2.tex_coord) - Vec2::from(v0.tex_coord);
                let r = d1.x * d2.y - d2.x * d1.y;
                if r.abs() <= UV_AREA_EPSILON {
                    skipped += 1;
                    continue;
                }
                tangent += (e1 * d2.y - e2 * d1.y) / r;
            }
            face_tangents.push(tangent);
        }
        if skipped > 0 {
            log::warn!("Skipped {skipped} triangles with degenerate texture coordinates");
        }

        let adjacency = self.vertex_faces();
        for (vertex, faces) in self.vertices_mut().iter_mut().zip(&adjacency) {
            if faces.is_empty() {
                continue;
            }
            let normal = Vec3::from(vertex.normal);
            let sum: Vec3 = faces.iter().map(|&f| face_tangents[f]).sum();
            // Gram-Schmidt
            let projected = sum - normal * normal.dot(&sum);
            let tangent = math::try_normalize(projected)
                .or_else(|| math::try_normalize(normal).map(|n| math::any_orthogonal(&n)))
                .unwrap_or_else(Vec3::zeros);
            vertex.tangent = tangent.into();
        }

        self.render_cache_mut().mark_dirty(RenderArrayKind::Tangent);
    }

    /// Unit normal of every polygon, zero where undefined.
    ///
    /// Strips sum the normals of their triangles; other polygons use Newell's
    /// method over the closed corner loop.
    fn face_normals(&self) -> Vec<Vec3> {
        let mesh_type = self.mesh_type();
        let position = |id: &VertexId| Vec3::from(self.vertices()[id.index()].position);
        let mut points = Vec::new();
        self.polygons()
            .iter()
            .map(|polygon| {
                if !mesh_type.is_surface() {
                    return Vec3::zeros();
                }
                if mesh_type == MeshType::TriangleStrip {
                    let sum: Vec3 = triangles(mesh_type, polygon.vertex_ids())
                        .map(|[a, b, c]| {
                            let origin = position(&a);
                            (position(&b) - origin).cross(&(position(&c) - origin))
                        })
                        .sum();
                    return math::try_normalize(sum).unwrap_or_else(Vec3::zeros);
                }
                points.clear();
                points.extend(polygon.vertex_ids().iter().map(&position));
                math::newell_normal(&points).unwrap_or_else(Vec3::zeros)
            })
            .collect()
    }

    /// For every arena vertex, the polygons referencing it (each at most once).
    fn vertex_faces(&self) -> Vec<Vec<usize>> {
        let mut faces: Vec<Vec<usize>> = vec![Vec::new(); self.vertex_count()];
        for (index, polygon) in self.polygons().iter().enumerate() {
            for id in polygon.vertex_ids() {
                let list = &mut faces[id.index()];
                if list.last() != Some(&index) {
                    list.push(index);
                }
            }
        }
        faces
    }
}

/// Triangles covering a polygon, wound like the polygon.
///
/// Strips yield `(i, i + 1, i + 2)` with every odd triangle flipped; every
/// other mesh type is fanned from the first corner.
fn triangles(
    mesh_type: MeshType,
    ids: &[VertexId],
) -> impl Iterator<Item = [VertexId; 3]> + '_ {
    let strip = mesh_type == MeshType::TriangleStrip;
    (0..ids.len().saturating_sub(2)).map(move |i| {
        if !strip {
            [ids[0], ids[i + 1], ids[i + 2]]
        } else if i % 2 == 0 {
            [ids[i], ids[i + 1], ids[i + 2]]
        } else {
            [ids[i + 1], ids[i], ids[i + 2]]
        }
    })
}
