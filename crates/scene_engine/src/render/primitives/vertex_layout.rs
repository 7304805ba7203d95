//! Attribute layout of the interleaved mesh vertex buffer

use crate::assets::FLOATS_PER_VERTEX;

/// Byte stride between consecutive vertices
pub const VERTEX_STRIDE: u32 = (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as u32;

/// One named float attribute inside a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader attribute name
    pub name: &'static str,
    /// Number of floats
    pub components: u32,
    /// Byte offset from the start of the vertex
    pub offset: u32,
}

/// Attributes in buffer order
pub const VERTEX_ATTRIBUTES: [VertexAttribute; 6] = [
    VertexAttribute { name: "a_position", components: 3, offset: 0 },
    VertexAttribute { name: "a_color", components: 3, offset: 12 },
    VertexAttribute { name: "a_normal", components: 3, offset: 24 },
    VertexAttribute { name: "a_tangent", components: 3, offset: 36 },
    VertexAttribute { name: "a_bitangent", components: 3, offset: 48 },
    VertexAttribute { name: "a_uv", components: 2, offset: 60 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_tile_the_stride() {
        assert_eq!(VERTEX_STRIDE, 68);

        let mut expected_offset = 0;
        for attribute in VERTEX_ATTRIBUTES {
            assert_eq!(attribute.offset, expected_offset);
            expected_offset += attribute.components * 4;
        }
        assert_eq!(expected_offset, VERTEX_STRIDE);
    }
}
