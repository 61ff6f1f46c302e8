//! Render arrays and the per-kind dirty cache.
//!
//! A mesh is edited as polygons and vertices, but a renderer consumes it as
//! flat per-attribute arrays with no notion of separate polygons. The
//! [`RenderCache`] records, for every [`RenderArrayKind`], whether the
//! flattened array is stale and the last array the renderer stored.
//!
//! # Protocol
//!
//! 1. Mesh mutations mark the affected kinds dirty.
//! 2. Before drawing, the renderer rebuilds every dirty kind (usually with
//!    [`Mesh::build_render_array`]) and hands the result to
//!    [`RenderCache::store`], which clears the flag.
//!
//! Nothing else clears a flag.
//!
//! [`Mesh::build_render_array`]: super::Mesh::build_render_array

use std::collections::HashMap;

/// Kind of a flattened render array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderArrayKind {
    /// Vertex positions (float3).
    Position,
    /// Vertex colors (float4).
    Color,
    /// Vertex or face normals (float3).
    Normal,
    /// Texture coordinates (float2).
    TexCoord,
    /// Tangent vectors (float3).
    Tangent,
}

impl RenderArrayKind {
    /// All render array kinds.
    pub const ALL: [RenderArrayKind; 5] = [
        Self::Position,
        Self::Color,
        Self::Normal,
        Self::TexCoord,
        Self::Tangent,
    ];

    /// Element format of arrays of this kind.
    pub fn format(&self) -> ElementFormat {
        match self {
            Self::Position | Self::Normal | Self::Tangent => ElementFormat::Float3,
            Self::Color => ElementFormat::Float4,
            Self::TexCoord => ElementFormat::Float2,
        }
    }
}

/// Format of one render array element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementFormat {
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
}

impl ElementFormat {
    /// Number of components per element.
    pub fn components(&self) -> usize {
        match self {
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
        }
    }

    /// Size in bytes of one element.
    pub fn size(&self) -> usize {
        self.components() * std::mem::size_of::<f32>()
    }
}

/// A flattened, contiguous array of one attribute kind.
///
/// Elements are tightly packed, one per polygon corner, in polygon order.
#[derive(Clone, PartialEq)]
pub struct RenderDataArray {
    kind: RenderArrayKind,
    data: Vec<f32>,
    renderer_handle: Option<u64>,
}

impl RenderDataArray {
    /// Wrap flattened data.
    ///
    /// `data.len()` should be a multiple of the kind's component count;
    /// a trailing partial element is ignored by [`count`](Self::count).
    pub fn new(kind: RenderArrayKind, data: Vec<f32>) -> Self {
        Self {
            kind,
            data,
            renderer_handle: None,
        }
    }

    /// Attach an opaque renderer-side handle (e.g. a GPU buffer id).
    pub fn with_renderer_handle(mut self, handle: u64) -> Self {
        self.renderer_handle = Some(handle);
        self
    }

    /// Kind of this array.
    pub fn kind(&self) -> RenderArrayKind {
        self.kind
    }

    /// Element format.
    pub fn format(&self) -> ElementFormat {
        self.kind.format()
    }

    /// Components per element.
    pub fn element_size(&self) -> usize {
        self.format().components()
    }

    /// Byte distance between consecutive elements.
    pub fn stride(&self) -> usize {
        self.format().size()
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.data.len() / self.element_size()
    }

    /// Flattened component values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Payload as raw bytes, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Element at `index`, if present.
    pub fn element(&self, index: usize) -> Option<&[f32]> {
        let size = self.element_size();
        self.data.get(index * size..(index + 1) * size)
    }

    /// Renderer-side handle, if one was attached.
    pub fn renderer_handle(&self) -> Option<u64> {
        self.renderer_handle
    }
}

impl std::fmt::Debug for RenderDataArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderDataArray")
            .field("kind", &self.kind)
            .field("count", &self.count())
            .field("stride", &self.stride())
            .field("renderer_handle", &self.renderer_handle)
            .finish()
    }
}

/// Cache state of one render array kind.
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    /// The stored array no longer matches the mesh data.
    pub dirty: bool,
    /// Last array stored by the renderer.
    pub array: Option<RenderDataArray>,
}

/// Per-kind dirty flags and cached render arrays.
#[derive(Debug, Clone)]
pub struct RenderCache {
    entries: HashMap<RenderArrayKind, CacheEntry>,
}

impl RenderCache {
    /// Create a cache with every kind dirty and no stored arrays.
    pub fn new() -> Self {
        let entries = RenderArrayKind::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    CacheEntry {
                        dirty: true,
                        array: None,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Whether `kind` needs to be rebuilt.
    pub fn is_dirty(&self, kind: RenderArrayKind) -> bool {
        self.entries.get(&kind).is_none_or(|e| e.dirty)
    }

    /// Whether any kind needs to be rebuilt.
    pub fn any_dirty(&self) -> bool {
        RenderArrayKind::ALL.iter().any(|&k| self.is_dirty(k))
    }

    /// Dirty kinds, in [`RenderArrayKind::ALL`] order.
    pub fn dirty_kinds(&self) -> Vec<RenderArrayKind> {
        RenderArrayKind::ALL
            .into_iter()
            .filter(|&k| self.is_dirty(k))
            .collect()
    }

    /// Last stored array for `kind`.
    ///
    /// The array may be stale; check [`is_dirty`](Self::is_dirty).
    pub fn array(&self, kind: RenderArrayKind) -> Option<&RenderDataArray> {
        self.entries.get(&kind).and_then(|e| e.array.as_ref())
    }

    /// Full cache entry for `kind`.
    pub fn entry(&self, kind: RenderArrayKind) -> Option<&CacheEntry> {
        self.entries.get(&kind)
    }

    /// Store a rebuilt array and clear its kind's dirty flag.
    ///
    /// Returns the previously stored array, if any.
    pub fn store(&mut self, array: RenderDataArray) -> Option<RenderDataArray> {
        let entry = self.entries.entry(array.kind()).or_default();
        entry.dirty = false;
        entry.array.replace(array)
    }

    pub(crate) fn mark_dirty(&mut self, kind: RenderArrayKind) {
        self.entries.entry(kind).or_default().dirty = true;
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        for kind in RenderArrayKind::ALL {
            self.mark_dirty(kind);
        }
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_format_sizes() {
        assert_eq!(ElementFormat::Float2.size(), 8);
        assert_eq!(ElementFormat::Float3.size(), 12);
        assert_eq!(ElementFormat::Float4.size(), 16);
        assert_eq!(RenderArrayKind::Color.format(), ElementFormat::Float4);
    }

    #[test]
    fn test_render_data_array_layout() {
        let array = RenderDataArray::new(RenderArrayKind::TexCoord, vec![0.0, 1.0, 0.5, 0.25]);
        assert_eq!(array.count(), 2);
        assert_eq!(array.element_size(), 2);
        assert_eq!(array.stride(), 8);
        assert_eq!(array.as_bytes().len(), 16);
        assert_eq!(array.element(1), Some(&[0.5, 0.25][..]));
        assert_eq!(array.element(2), None);
    }

    #[test]
    fn test_new_cache_is_all_dirty() {
        let cache = RenderCache::new();
        assert!(cache.any_dirty());
        assert_eq!(cache.dirty_kinds(), RenderArrayKind::ALL.to_vec());
        assert!(cache.array(RenderArrayKind::Position).is_none());
    }

    #[test]
    fn test_store_clears_only_its_kind() {
        let mut cache = RenderCache::new();
        let prev = cache.store(RenderDataArray::new(RenderArrayKind::Normal, vec![0.0; 9]));
        assert!(prev.is_none());
        assert!(!cache.is_dirty(RenderArrayKind::Normal));
        assert!(cache.is_dirty(RenderArrayKind::Position));
        assert_eq!(cache.array(RenderArrayKind::Normal).unwrap().count(), 3);

        cache.mark_dirty(RenderArrayKind::Normal);
        assert!(cache.is_dirty(RenderArrayKind::Normal));
        // Stale array is still available until replaced.
        assert!(cache.array(RenderArrayKind::Normal).is_some());
    }
}
