//! Binary mesh files.
//!
//! All values are little-endian:
//!
//! ```text
//! magic        b"PMSH"
//! version      u32 (1)
//! mesh type    u32 (see MeshType::as_raw)
//! flags        u32 (bit 0: vertex colors, bit 1: vertex normals)
//! vertex count u32
//!   per vertex: 15 x f32 (position, normal, tangent, color, tex coord)
//! polygon count u32
//!   per polygon: vertex count u32, vertex ids u32..., face normal 3 x f32
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::MeshError;

use super::data::{Mesh, check_polygon};
use super::types::{MeshType, Polygon, Vertex, VertexId};

const MAGIC: [u8; 4] = *b"PMSH";
const VERSION: u32 = 1;

const FLAG_VERTEX_COLORS: u32 = 1 << 0;
const FLAG_VERTEX_NORMALS: u32 = 1 << 1;

/// Upper bound for speculative preallocation from untrusted counts.
const MAX_PREALLOC: usize = 1 << 16;

fn write_u32(w: &mut impl Write, value: u32) -> Result<(), MeshError> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32s(w: &mut impl Write, values: &[f32]) -> Result<(), MeshError> {
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_u32(r: &mut impl Read) -> Result<u32, MeshError> {
    let mut bytes = [0u8; 4];
    r.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_f32s<const N: usize>(r: &mut impl Read) -> Result<[f32; N], MeshError> {
    let mut out = [0.0f32; N];
    let mut bytes = [0u8; 4];
    for v in &mut out {
        r.read_exact(&mut bytes)?;
        *v = f32::from_le_bytes(bytes);
    }
    Ok(out)
}

fn count_to_u32(what: &str, count: usize) -> Result<u32, MeshError> {
    u32::try_from(count)
        .map_err(|_| MeshError::InvalidParameter(format!("too many {what} to save: {count}")))
}

impl Mesh {
    /// Load a mesh from a file. See [`load_from`](Self::load_from).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let mut mesh = Mesh::default();
        mesh.load_mesh(path)?;
        Ok(mesh)
    }

    /// Replace this mesh's contents with the mesh stored at `path`.
    pub fn load_mesh(&mut self, path: impl AsRef<Path>) -> Result<(), MeshError> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        self.load_from(&mut reader)?;
        log::debug!("Loaded mesh from {}", path.display());
        Ok(())
    }

    /// Write this mesh to `path`, creating or truncating the file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), MeshError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to(&mut writer)?;
        writer.flush()?;
        log::debug!("Saved mesh to {}", path.display());
        Ok(())
    }

    /// Replace this mesh's contents with a mesh read from `reader`.
    ///
    /// The data is fully parsed and validated before anything is replaced,
    /// so on error the mesh is unchanged. On success every render array is
    /// marked dirty; a bound vertex buffer is kept.
    pub fn load_from(&mut self, reader: &mut impl Read) -> Result<(), MeshError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(MeshError::InvalidFormat(format!("bad magic {magic:?}")));
        }
        let version = read_u32(reader)?;
        if version != VERSION {
            return Err(MeshError::InvalidFormat(format!(
                "unsupported version {version}"
            )));
        }
        let raw_type = read_u32(reader)?;
        let mesh_type = MeshType::from_raw(raw_type)
            .ok_or_else(|| MeshError::InvalidFormat(format!("unknown mesh type {raw_type}")))?;
        let flags = read_u32(reader)?;

        let vertex_count = read_u32(reader)? as usize;
        let mut vertices = Vec::with_capacity(vertex_count.min(MAX_PREALLOC));
        for _ in 0..vertex_count {
            let f: [f32; Vertex::FLOAT_COUNT] = read_f32s(reader)?;
            vertices.push(Vertex {
                position: [f[0], f[1], f[2]],
                normal: [f[3], f[4], f[5]],
                tangent: [f[6], f[7], f[8]],
                color: [f[9], f[10], f[11], f[12]],
                tex_coord: [f[13], f[14]],
            });
        }

        let polygon_count = read_u32(reader)? as usize;
        let mut polygons = Vec::with_capacity(polygon_count.min(MAX_PREALLOC));
        for index in 0..polygon_count {
            let count = read_u32(reader)? as usize;
            let mut ids = Vec::with_capacity(count.min(MAX_PREALLOC));
            for _ in 0..count {
                ids.push(VertexId(read_u32(reader)?));
            }
            let normal: [f32; 3] = read_f32s(reader)?;
            let polygon = Polygon::new(ids).with_normal(normal);
            check_polygon(&polygon, mesh_type, vertices.len())
                .map_err(|err| MeshError::InvalidFormat(format!("polygon {index}: {err}")))?;
            polygons.push(polygon);
        }

        self.replace_geometry(mesh_type, vertices, polygons);
        self.set_use_vertex_colors(flags & FLAG_VERTEX_COLORS != 0);
        self.use_vertex_normals(flags & FLAG_VERTEX_NORMALS != 0);
        log::debug!(
            "Read {:?} mesh: {} vertices, {} polygons",
            mesh_type,
            self.vertex_count(),
            self.polygon_count()
        );
        Ok(())
    }

    /// Serialize this mesh to `writer`.
    pub fn save_to(&self, writer: &mut impl Write) -> Result<(), MeshError> {
        let vertex_count = count_to_u32("vertices", self.vertex_count())?;
        let polygon_count = count_to_u32("polygons", self.polygon_count())?;

        let mut flags = 0;
        if self.uses_vertex_colors() {
            flags |= FLAG_VERTEX_COLORS;
        }
        if self.uses_vertex_normals() {
            flags |= FLAG_VERTEX_NORMALS;
        }

        writer.write_all(&MAGIC)?;
        write_u32(writer, VERSION)?;
        write_u32(writer, self.mesh_type().as_raw())?;
        write_u32(writer, flags)?;

        write_u32(writer, vertex_count)?;
        for v in self.vertices() {
            write_f32s(writer, &v.position)?;
            write_f32s(writer, &v.normal)?;
            write_f32s(writer, &v.tangent)?;
            write_f32s(writer, &v.color)?;
            write_f32s(writer, &v.tex_coord)?;
        }

        write_u32(writer, polygon_count)?;
        for polygon in self.polygons() {
            write_u32(writer, count_to_u32("polygon vertices", polygon.vertex_count())?)?;
            for id in polygon.vertex_ids() {
                write_u32(writer, id.0)?;
            }
            write_f32s(writer, &polygon.normal())?;
        }
        Ok(())
    }
}
