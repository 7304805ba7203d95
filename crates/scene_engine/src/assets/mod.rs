//! Asset loading
//!
//! Geometry compilation (OBJ + MTL), texture decoding and the path resolution
//! abstraction both of them read through.

pub mod source;
pub mod obj_loader;
pub mod materials;
pub mod image_loader;

use thiserror::Error;

pub use source::{AssetSource, FileSystemSource, MemorySource};
pub use obj_loader::{CompiledMesh, ObjDiagnostic, ObjError, ObjLoader, FLOATS_PER_VERTEX};
pub use materials::{Material, MaterialLoader, MtlParser};
pub use image_loader::ImageData;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Asset bytes were not valid UTF-8 text
    #[error("Invalid text in {0}")]
    InvalidText(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
