//! Mesh generators for common shapes.
//!
//! Each `create_*` method replaces the current geometry of a [`Mesh`] with a
//! primitive centered on the origin, sets analytic vertex normals, refreshes
//! face normals and tangents, and marks every render array dirty. A bound
//! vertex buffer is kept (and is therefore stale).
//!
//! Invalid parameters are rejected with [`MeshError::InvalidParameter`] before
//! anything is modified.
//!
//! The `generate_*` functions are shorthands returning a fresh mesh.

use std::f32::consts::PI;

use crate::error::MeshError;
use crate::math::Vec3;
use crate::{profile_plot, profile_scope};

use super::data::Mesh;
use super::types::{MeshType, Polygon, Vertex, VertexId};

/// Vertices and polygons under construction.
struct Geometry {
    vertices: Vec<Vertex>,
    polygons: Vec<Polygon>,
}

impl Geometry {
    fn with_capacity(vertices: usize, polygons: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            polygons: Vec::with_capacity(polygons),
        }
    }

    fn push(&mut self, vertex: Vertex) -> u32 {
        self.vertices.push(vertex);
        self.vertices.len() as u32 - 1
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.polygons
            .push(Polygon::triangle(VertexId(a), VertexId(b), VertexId(c)));
    }

    fn quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.polygons.push(Polygon::quad(
            VertexId(a),
            VertexId(b),
            VertexId(c),
            VertexId(d),
        ));
    }
}

fn check_dimension(name: &str, value: f32) -> Result<(), MeshError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeshError::InvalidParameter(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

fn check_count(name: &str, value: u32, min: u32) -> Result<(), MeshError> {
    if value >= min {
        Ok(())
    } else {
        Err(MeshError::InvalidParameter(format!(
            "{name} must be at least {min}, got {value}"
        )))
    }
}

/// Most vertices a single generator call may produce.
const MAX_GENERATED_VERTICES: u64 = 1 << 24;

/// Check a shape's vertex total, computed in `u64` with saturating
/// arithmetic, against [`MAX_GENERATED_VERTICES`].
fn check_vertex_total(shape: &str, total: u64) -> Result<usize, MeshError> {
    if total <= MAX_GENERATED_VERTICES {
        Ok(total as usize)
    } else {
        Err(MeshError::InvalidParameter(format!(
            "{shape} would have {total} vertices, at most {MAX_GENERATED_VERTICES} allowed"
        )))
    }
}

/// Point on a circle of `radius` in the XZ plane.
fn ring_point(radius: f32, angle: f32, y: f32) -> [f32; 3] {
    [radius * angle.cos(), y, radius * angle.sin()]
}

/// Planar UV for a cap vertex at `angle`.
fn cap_uv(angle: f32) -> [f32; 2] {
    [0.5 + 0.5 * angle.cos(), 0.5 + 0.5 * angle.sin()]
}

fn plane_geometry(width: f32, height: f32) -> Result<Geometry, MeshError> {
    check_dimension("width", width)?;
    check_dimension("height", height)?;

    let hx = width / 2.0;
    let hz = height / 2.0;
    let up = [0.0, 1.0, 0.0];
    let mut g = Geometry::with_capacity(4, 1);
    let a = g.push(Vertex::with_uv([-hx, 0.0, hz], [0.0, 0.0]).with_normal(up));
    let b = g.push(Vertex::with_uv([hx, 0.0, hz], [1.0, 0.0]).with_normal(up));
    let c = g.push(Vertex::with_uv([hx, 0.0, -hz], [1.0, 1.0]).with_normal(up));
    let d = g.push(Vertex::with_uv([-hx, 0.0, -hz], [0.0, 1.0]).with_normal(up));
    g.quad(a, b, c, d);
    Ok(g)
}

fn vplane_geometry(width: f32, height: f32) -> Result<Geometry, MeshError> {
    check_dimension("width", width)?;
    check_dimension("height", height)?;

    let hx = width / 2.0;
    let hy = height / 2.0;
    let front = [0.0, 0.0, 1.0];
    let mut g = Geometry::with_capacity(4, 1);
    let a = g.push(Vertex::with_uv([-hx, -hy, 0.0], [0.0, 0.0]).with_normal(front));
    let b = g.push(Vertex::with_uv([hx, -hy, 0.0], [1.0, 0.0]).with_normal(front));
    let c = g.push(Vertex::with_uv([hx, hy, 0.0], [1.0, 1.0]).with_normal(front));
    let d = g.push(Vertex::with_uv([-hx, hy, 0.0], [0.0, 1.0]).with_normal(front));
    g.quad(a, b, c, d);
    Ok(g)
}

fn box_geometry(width: f32, depth: f32, height: f32) -> Result<Geometry, MeshError> {
    check_dimension("width", width)?;
    check_dimension("depth", depth)?;
    check_dimension("height", height)?;

    let (x, y, z) = (width / 2.0, depth / 2.0, height / 2.0);
    // Corners per face, counter-clockwise seen from outside.
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-x, -y, z], [x, -y, z], [x, y, z], [-x, y, z]]),
        ([0.0, 0.0, -1.0], [[x, -y, -z], [-x, -y, -z], [-x, y, -z], [x, y, -z]]),
        ([1.0, 0.0, 0.0], [[x, -y, z], [x, -y, -z], [x, y, -z], [x, y, z]]),
        ([-1.0, 0.0, 0.0], [[-x, -y, -z], [-x, -y, z], [-x, y, z], [-x, y, -z]]),
        ([0.0, 1.0, 0.0], [[-x, y, z], [x, y, z], [x, y, -z], [-x, y, -z]]),
        ([0.0, -1.0, 0.0], [[-x, -y, -z], [x, -y, -z], [x, -y, z], [-x, -y, z]]),
    ];
    const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut g = Geometry::with_capacity(24, 6);
    for (normal, corners) in faces {
        let mut ids = [0u32; 4];
        for ((id, position), uv) in ids.iter_mut().zip(corners).zip(UVS) {
            *id = g.push(Vertex::with_uv(position, uv).with_normal(normal));
        }
        g.quad(ids[0], ids[1], ids[2], ids[3]);
    }
    Ok(g)
}

fn sphere_geometry(radius: f32, rings: u32, segments: u32) -> Result<Geometry, MeshError> {
    check_dimension("radius", radius)?;
    check_count("rings", rings, 2)?;
    check_count("segments", segments, 3)?;

    let vertex_count = check_vertex_total(
        "sphere",
        u64::from(rings - 1)
            .saturating_mul(u64::from(segments) + 1)
            .saturating_add(2),
    )?;

    let ring_len = segments + 1;
    let mut g = Geometry::with_capacity(
        vertex_count,
        2 * segments as usize * (rings as usize - 1),
    );

    let top = g.push(Vertex::with_uv([0.0, radius, 0.0], [0.5, 0.0]).with_normal([0.0, 1.0, 0.0]));
    for ring in 1..rings {
        let theta = ring as f32 * PI / rings as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for segment in 0..=segments {
            let phi = segment as f32 * 2.0 * PI / segments as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let n = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            g.push(
                Vertex::with_uv(
                    [n[0] * radius, n[1] * radius, n[2] * radius],
                    [segment as f32 / segments as f32, ring as f32 / rings as f32],
                )
                .with_normal(n),
            );
        }
    }
    let bottom =
        g.push(Vertex::with_uv([0.0, -radius, 0.0], [0.5, 1.0]).with_normal([0.0, -1.0, 0.0]));

    let ring_start = |ring: u32| 1 + (ring - 1) * ring_len;

    // Top cap
    for segment in 0..segments {
        let next = ring_start(1) + segment;
        g.triangle(top, next + 1, next);
    }
    for ring in 1..rings - 1 {
        for segment in 0..segments {
            let current = ring_start(ring) + segment;
            let next = current + ring_len;
            g.triangle(current, current + 1, next);
            g.triangle(current + 1, next + 1, next);
        }
    }
    // Bottom cap
    for segment in 0..segments {
        let current = ring_start(rings - 1) + segment;
        g.triangle(current, current + 1, bottom);
    }
    Ok(g)
}

fn torus_geometry(
    ring_radius: f32,
    tube_radius: f32,
    ring_segments: u32,
    tube_segments: u32,
) -> Result<Geometry, MeshError> {
    check_dimension("ring radius", ring_radius)?;
    check_dimension("tube radius", tube_radius)?;
    check_count("ring segments", ring_segments, 3)?;
    check_count("tube segments", tube_segments, 3)?;

    let vertex_count = check_vertex_total(
        "torus",
        (u64::from(ring_segments) + 1).saturating_mul(u64::from(tube_segments) + 1),
    )?;

    let stride = tube_segments + 1;
    let mut g = Geometry::with_capacity(
        vertex_count,
        2 * ring_segments as usize * tube_segments as usize,
    );

    for i in 0..=ring_segments {
        let u = i as f32 * 2.0 * PI / ring_segments as f32;
        let (sin_u, cos_u) = u.sin_cos();
        for j in 0..=tube_segments {
            let v = j as f32 * 2.0 * PI / tube_segments as f32;
            let (sin_v, cos_v) = v.sin_cos();
            let r = ring_radius + tube_radius * cos_v;
            g.push(
                Vertex::with_uv(
                    [r * cos_u, tube_radius * sin_v, r * sin_u],
                    [i as f32 / ring_segments as f32, j as f32 / tube_segments as f32],
                )
                .with_normal([cos_v * cos_u, sin_v, cos_v * sin_u]),
            );
        }
    }

    for i in 0..ring_segments {
        for j in 0..tube_segments {
            let a = i * stride + j;
            let b = a + stride;
            let c = b + 1;
            let d = a + 1;
            g.triangle(a, d, b);
            g.triangle(b, d, c);
        }
    }
    Ok(g)
}

fn cylinder_geometry(
    height: f32,
    radius: f32,
    segments: u32,
    capped: bool,
) -> Result<Geometry, MeshError> {
    check_dimension("height", height)?;
    check_dimension("radius", radius)?;
    check_count("segments", segments, 3)?;
    let loops = if capped { 4 } else { 2 };
    let vertex_count = check_vertex_total("cylinder", loops * (u64::from(segments) + 1))?;

    let half = height / 2.0;
    let step = 2.0 * PI / segments as f32;
    let polygons = if capped { 4 } else { 2 } * segments as usize;
    let mut g = Geometry::with_capacity(vertex_count, polygons);

    // Side: bottom/top pairs, seam duplicated.
    let side_start = g.vertices.len() as u32;
    for s in 0..=segments {
        let angle = s as f32 * step;
        let normal = [angle.cos(), 0.0, angle.sin()];
        let u = s as f32 / segments as f32;
        g.push(Vertex::with_uv(ring_point(radius, angle, -half), [u, 0.0]).with_normal(normal));
        g.push(Vertex::with_uv(ring_point(radius, angle, half), [u, 1.0]).with_normal(normal));
    }
    for s in 0..segments {
        let b0 = side_start + 2 * s;
        let t0 = b0 + 1;
        let b1 = b0 + 2;
        let t1 = b0 + 3;
        g.triangle(b0, t0, b1);
        g.triangle(b1, t0, t1);
    }

    if capped {
        push_cap(&mut g, radius, half, segments, true);
        push_cap(&mut g, radius, -half, segments, false);
    }
    Ok(g)
}

fn cone_geometry(height: f32, radius: f32, segments: u32) -> Result<Geometry, MeshError> {
    check_dimension("height", height)?;
    check_dimension("radius", radius)?;
    check_count("segments", segments, 3)?;
    let vertex_count = check_vertex_total("cone", 3 * u64::from(segments) + 2)?;

    let half = height / 2.0;
    let step = 2.0 * PI / segments as f32;
    let slant = |angle: f32| {
        let n = Vec3::new(height * angle.cos(), radius, height * angle.sin()).normalize();
        [n.x, n.y, n.z]
    };
    let mut g = Geometry::with_capacity(vertex_count, 2 * segments as usize);

    let base_start = g.vertices.len() as u32;
    for s in 0..=segments {
        let angle = s as f32 * step;
        g.push(
            Vertex::with_uv(ring_point(radius, angle, -half), [s as f32 / segments as f32, 0.0])
                .with_normal(slant(angle)),
        );
    }
    // One apex per segment so each gets the normal of its own slice.
    let apex_start = g.vertices.len() as u32;
    for s in 0..segments {
        let angle = (s as f32 + 0.5) * step;
        g.push(
            Vertex::with_uv([0.0, half, 0.0], [(s as f32 + 0.5) / segments as f32, 1.0])
                .with_normal(slant(angle)),
        );
    }
    for s in 0..segments {
        g.triangle(base_start + s, apex_start + s, base_start + s + 1);
    }

    push_cap(&mut g, radius, -half, segments, false);
    Ok(g)
}

/// Append a disc at height `y`, facing +Y when `up` and -Y otherwise.
fn push_cap(g: &mut Geometry, radius: f32, y: f32, segments: u32, up: bool) {
    let normal = if up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
    let step = 2.0 * PI / segments as f32;
    let center = g.push(Vertex::with_uv([0.0, y, 0.0], [0.5, 0.5]).with_normal(normal));
    let ring_start = g.vertices.len() as u32;
    for s in 0..segments {
        let angle = s as f32 * step;
        g.push(Vertex::with_uv(ring_point(radius, angle, y), cap_uv(angle)).with_normal(normal));
    }
    for s in 0..segments {
        let p0 = ring_start + s;
        let p1 = ring_start + (s + 1) % segments;
        if up {
            g.triangle(center, p1, p0);
        } else {
            g.triangle(center, p0, p1);
        }
    }
}

impl Mesh {
    fn apply_generated(&mut self, shape: &str, mesh_type: MeshType, geometry: Geometry) {
        profile_scope!("apply_generated");

        self.replace_geometry(mesh_type, geometry.vertices, geometry.polygons);
        self.recalculate_face_normals();
        self.calculate_tangents();
        profile_plot!("generated_polygons", self.polygon_count());
        log::debug!(
            "Generated {shape}: {} vertices, {} polygons",
            self.vertex_count(),
            self.polygon_count()
        );
    }

    /// Replace the geometry with a single quad in the XZ plane facing +Y.
    ///
    /// `width` spans X and `height` spans Z.
    pub fn create_plane(&mut self, width: f32, height: f32) -> Result<(), MeshError> {
        let g = plane_geometry(width, height)?;
        self.apply_generated("plane", MeshType::Quad, g);
        Ok(())
    }

    /// Replace the geometry with a single quad in the XY plane facing +Z.
    pub fn create_vplane(&mut self, width: f32, height: f32) -> Result<(), MeshError> {
        let g = vplane_geometry(width, height)?;
        self.apply_generated("vertical plane", MeshType::Quad, g);
        Ok(())
    }

    /// Replace the geometry with an axis-aligned box.
    ///
    /// `width`, `depth` and `height` are the full extents along X, Y and Z.
    /// Each of the six quads has its own four vertices so normals stay flat.
    pub fn create_box(&mut self, width: f32, depth: f32, height: f32) -> Result<(), MeshError> {
        let g = box_geometry(width, depth, height)?;
        self.apply_generated("box", MeshType::Quad, g);
        Ok(())
    }

    /// Replace the geometry with a UV sphere.
    ///
    /// `rings` counts latitude bands from pole to pole (at least 2) and
    /// `segments` counts longitude slices (at least 3).
    pub fn create_sphere(&mut self, radius: f32, rings: u32, segments: u32) -> Result<(), MeshError> {
        let g = sphere_geometry(radius, rings, segments)?;
        self.apply_generated("sphere", MeshType::Triangle, g);
        Ok(())
    }

    /// Replace the geometry with a torus lying in the XZ plane.
    pub fn create_torus(
        &mut self,
        ring_radius: f32,
        tube_radius: f32,
        ring_segments: u32,
        tube_segments: u32,
    ) -> Result<(), MeshError> {
        let g = torus_geometry(ring_radius, tube_radius, ring_segments, tube_segments)?;
        self.apply_generated("torus", MeshType::Triangle, g);
        Ok(())
    }

    /// Replace the geometry with a Y-aligned cylinder, optionally capped.
    pub fn create_cylinder(
        &mut self,
        height: f32,
        radius: f32,
        segments: u32,
        capped: bool,
    ) -> Result<(), MeshError> {
        let g = cylinder_geometry(height, radius, segments, capped)?;
        self.apply_generated("cylinder", MeshType::Triangle, g);
        Ok(())
    }

    /// Replace the geometry with a Y-aligned cone, apex up, base capped.
    pub fn create_cone(&mut self, height: f32, radius: f32, segments: u32) -> Result<(), MeshError> {
        let g = cone_geometry(height, radius, segments)?;
        self.apply_generated("cone", MeshType::Triangle, g);
        Ok(())
    }
}

/// Generate a plane mesh. See [`Mesh::create_plane`].
pub fn generate_plane(width: f32, height: f32) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(MeshType::Quad);
    mesh.create_plane(width, height)?;
    Ok(mesh)
}

/// Generate a box mesh. See [`Mesh::create_box`].
pub fn generate_box(width: f32, depth: f32, height: f32) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(MeshType::Quad);
    mesh.create_box(width, depth, height)?;
    Ok(mesh)
}

/// Generate a sphere mesh. See [`Mesh::create_sphere`].
pub fn generate_sphere(radius: f32, rings: u32, segments: u32) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(MeshType::Triangle);
    mesh.create_sphere(radius, rings, segments)?;
    Ok(mesh)
}

/// Generate a torus mesh. See [`Mesh::create_torus`].
pub fn generate_torus(
    ring_radius: f32,
    tube_radius: f32,
    ring_segments: u32,
    tube_segments: u32,
) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(MeshType::Triangle);
    mesh.create_torus(ring_radius, tube_radius, ring_segments, tube_segments)?;
    Ok(mesh)
}
