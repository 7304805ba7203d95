//! Rendering primitives

pub mod camera;
pub mod vertex_layout;

pub use camera::{Camera, Projection};
pub use vertex_layout::{VertexAttribute, VERTEX_ATTRIBUTES, VERTEX_STRIDE};
