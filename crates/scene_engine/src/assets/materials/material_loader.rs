//! Material loader resolving an OBJ file's `mtllib` sidecar

use crate::assets::source::{resolve_sibling, AssetSource};

use super::{Material, MtlParser};

/// Loads the material referenced by an OBJ file
pub struct MaterialLoader;

impl MaterialLoader {
    /// Name of the material library an OBJ file references
    ///
    /// When several `mtllib` lines are present the last one is used.
    pub fn material_library(obj_text: &str) -> Option<&str> {
        obj_text
            .lines()
            .filter_map(|line| line.trim().strip_prefix("mtllib"))
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .last()
    }

    /// Load the material for the OBJ file at `obj_path`
    ///
    /// The sidecar is resolved relative to the OBJ file's directory. A missing
    /// `mtllib` directive or an unreadable sidecar yields [`Material::default`].
    pub fn load_for_obj(assets: &dyn AssetSource, obj_path: &str, obj_text: &str) -> Material {
        let Some(library) = Self::material_library(obj_text) else {
            log::debug!("{} has no mtllib directive, using default material", obj_path);
            return Material::default();
        };

        let mtl_path = resolve_sibling(obj_path, library);
        match assets.read_text(&mtl_path) {
            Ok(contents) => {
                log::debug!("Loaded material library {}", mtl_path);
                MtlParser::parse(&contents)
            }
            Err(e) => {
                log::warn!("Material library {} unavailable ({}), using default material", mtl_path, e);
                Material::default()
            }
        }
    }
}
