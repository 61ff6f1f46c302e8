//! Polygonal mesh container.
//!
//! This module provides:
//!
//! - [`Mesh`] - Vertices and polygons, spatial queries, render-cache authority
//! - [`Vertex`], [`VertexId`], [`Polygon`], [`MeshType`] - The data model
//! - [`RenderCache`], [`RenderDataArray`] - Flattened per-attribute arrays and
//!   their dirty flags
//! - [`VertexBuffer`] - Contract for the renderer-owned buffer a mesh holds
//! - [`NormalOptions`] - Flat or angle-limited smooth normal generation
//! - [`generators`] - Plane, box, sphere, torus, cylinder and cone
//! - Binary load/save on [`Mesh`]

mod buffer;
mod data;
pub mod generators;
mod io;
mod render;
mod shading;
mod types;

pub use buffer::VertexBuffer;
pub use data::Mesh;
pub use render::{CacheEntry, ElementFormat, RenderArrayKind, RenderCache, RenderDataArray};
pub use shading::NormalOptions;
pub use types::{MeshType, Polygon, Vertex, VertexId};
