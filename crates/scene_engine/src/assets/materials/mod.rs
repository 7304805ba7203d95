//! Material parsing and loading
//!
//! A mesh carries one Phong material read from its `mtllib` sidecar.

pub mod material;
pub mod mtl_parser;
pub mod material_loader;

pub use material::Material;
pub use mtl_parser::MtlParser;
pub use material_loader::MaterialLoader;
