//! Asset sources
//!
//! Every loader reads through [`AssetSource`], so scenes can be built from
//! disk or from an in-memory table of files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::AssetError;

/// Read access to named assets
pub trait AssetSource {
    /// Read an asset as raw bytes
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, AssetError>;

    /// Read an asset as UTF-8 text
    fn read_text(&self, path: &str) -> Result<String, AssetError> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|_| AssetError::InvalidText(path.to_string()))
    }
}

/// Resolve `relative` against the directory that contains `base`
///
/// `models/cube.obj` + `cube.mtl` gives `models/cube.mtl`; a base without a
/// directory leaves the relative path untouched.
pub fn resolve_sibling(base: &str, relative: &str) -> String {
    match base.rfind('/') {
        Some(index) => format!("{}{}", &base[..=index], relative),
        None => relative.to_string(),
    }
}

/// Assets read from the filesystem below a root directory
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory all paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Default for FileSystemSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl AssetSource for FileSystemSource {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full_path = self.full_path(path);
        log::trace!("Reading asset {:?}", full_path);

        std::fs::read(&full_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(full_path.display().to_string()),
            _ => AssetError::IoError(e),
        })
    }
}

/// Assets held in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a text asset
    pub fn insert_text(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into().into_bytes());
    }

    /// Add or replace a binary asset
    pub fn insert_bytes(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    /// Builder form of [`MemorySource::insert_text`]
    #[must_use]
    pub fn with_text(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert_text(path, text);
        self
    }

    /// Number of stored assets
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no assets are stored
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for MemorySource {
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}
