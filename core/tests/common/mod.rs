//! Shared helpers for the mesh integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use polymesh_core::mesh::{Mesh, MeshType, RenderArrayKind, VertexBuffer};

/// Initialize logging for test output.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Minimal renderer: rebuilds every dirty array, stores it, and records what
/// it rebuilt.
#[derive(Default)]
pub struct StubRenderer {
    pub rebuilt: Vec<RenderArrayKind>,
    next_handle: u64,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the mesh's render cache up to date. Returns the rebuilt kinds.
    pub fn sync(&mut self, mesh: &mut Mesh) -> Vec<RenderArrayKind> {
        let dirty = mesh.dirty_kinds();
        for &kind in &dirty {
            self.next_handle += 1;
            let array = mesh
                .build_render_array(kind)
                .with_renderer_handle(self.next_handle);
            mesh.render_cache_mut().store(array);
        }
        if !dirty.is_empty() {
            mesh.set_vertex_buffer(Box::new(TestBuffer::new(
                mesh.corner_count(),
                mesh.mesh_type(),
            )));
        }
        self.rebuilt.extend_from_slice(&dirty);
        dirty
    }
}

/// Vertex buffer that counts how many instances have been dropped.
pub struct TestBuffer {
    pub vertex_count: usize,
    pub mesh_type: MeshType,
    drops: Option<Arc<AtomicUsize>>,
}

impl TestBuffer {
    pub fn new(vertex_count: usize, mesh_type: MeshType) -> Self {
        Self {
            vertex_count,
            mesh_type,
            drops: None,
        }
    }

    /// Buffer that increments `drops` when it is destroyed.
    pub fn counted(vertex_count: usize, drops: &Arc<AtomicUsize>) -> Self {
        Self {
            vertex_count,
            mesh_type: MeshType::Triangle,
            drops: Some(Arc::clone(drops)),
        }
    }
}

impl VertexBuffer for TestBuffer {
    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn mesh_type(&self) -> MeshType {
        self.mesh_type
    }
}

impl Drop for TestBuffer {
    fn drop(&mut self) {
        if let Some(drops) = &self.drops {
            drops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub fn approx_eq(a: [f32; 3], b: [f32; 3], eps: f32) -> bool {
    a.iter().zip(&b).all(|(x, y)| (x - y).abs() <= eps)
}
