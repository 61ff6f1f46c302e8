//! Thread-shared meshes.
//!
//! A [`Mesh`] has no internal locking. When a mesh is edited on one thread
//! and rebuilt for rendering on another, wrap it in a [`SharedMesh`]: one
//! lock guards polygons, dirty flags and the bound vertex buffer together, so
//! a writer regenerating the mesh never interleaves with a reader flattening
//! it.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::mesh::Mesh;

/// Reference-counted, lock-guarded mesh handle.
#[derive(Debug, Clone, Default)]
pub struct SharedMesh {
    inner: Arc<RwLock<Mesh>>,
}

impl SharedMesh {
    /// Wrap a mesh.
    pub fn new(mesh: Mesh) -> Self {
        Self {
            inner: Arc::new(RwLock::new(mesh)),
        }
    }

    /// Lock for reading (queries, building render arrays).
    pub fn read(&self) -> RwLockReadGuard<'_, Mesh> {
        self.inner.read()
    }

    /// Lock for writing (mutation, generation, storing rebuilt arrays).
    pub fn write(&self) -> RwLockWriteGuard<'_, Mesh> {
        self.inner.write()
    }

    /// Whether two handles share the same mesh.
    pub fn ptr_eq(&self, other: &SharedMesh) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Mesh> for SharedMesh {
    fn from(mesh: Mesh) -> Self {
        Self::new(mesh)
    }
}
