//! OBJ geometry compiler
//!
//! Turns Wavefront OBJ text into one flat, non-indexed, interleaved vertex
//! buffer. Each vertex is [`FLOATS_PER_VERTEX`] floats:
//!
//! | attribute | floats | byte offset |
//! |-----------|--------|-------------|
//! | position  | 3      | 0           |
//! | color     | 3      | 12          |
//! | normal    | 3      | 24          |
//! | tangent   | 3      | 36          |
//! | bitangent | 3      | 48          |
//! | uv        | 2      | 60          |
//!
//! Normals are smoothed per position index: every face corner adds its raw
//! normal to the accumulator of the position it references, and each
//! accumulator is normalized once. Tangent and bitangent are solved per
//! triangle and shared by its three vertices.

use std::fmt;

use thiserror::Error;

use crate::assets::materials::{Material, MaterialLoader};
use crate::assets::source::AssetSource;
use crate::assets::AssetError;
use crate::foundation::math::{Point3, Vec2, Vec3};

/// Number of floats per emitted vertex
pub const FLOATS_PER_VERTEX: usize = 17;

/// Problems found in OBJ text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjError {
    /// A value could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A line does not have the expected shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A face references an attribute that was never declared
    #[error("{kind} index {index} out of range ({available} declared)")]
    IndexOutOfRange {
        /// Attribute kind (`position`, `uv` or `normal`)
        kind: &'static str,
        /// 1-based index as written in the file
        index: usize,
        /// Number of attributes of that kind in the file
        available: usize,
    },
}

/// An [`ObjError`] tied to the line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjDiagnostic {
    /// 1-based line number
    pub line: usize,
    /// What was wrong with the line
    pub error: ObjError,
}

impl fmt::Display for ObjDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

/// Output of the geometry compiler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledMesh {
    /// Interleaved vertex data, [`FLOATS_PER_VERTEX`] floats per vertex
    pub vertices: Vec<f32>,
    /// Lines that were skipped while compiling
    pub diagnostics: Vec<ObjDiagnostic>,
}

impl CompiledMesh {
    /// Number of emitted vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    /// Number of emitted triangles
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    /// Whether no geometry was produced
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Object-space position of vertex `index`
    pub fn position(&self, index: usize) -> Point3 {
        let base = index * FLOATS_PER_VERTEX;
        Point3::new(self.vertices[base], self.vertices[base + 1], self.vertices[base + 2])
    }

    /// Object-space triangles in emission order
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| {
            let first = t * 3;
            [self.position(first), self.position(first + 1), self.position(first + 2)]
        })
    }

    /// Raw bytes of the vertex buffer, as uploaded to the GPU
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[derive(Debug, Clone, Copy)]
struct FaceRef {
    position: usize,
    uv: usize,
    normal: usize,
}

#[derive(Debug, Clone, Copy)]
struct Face {
    line: usize,
    corners: [FaceRef; 3],
}

#[derive(Debug, Default)]
struct ObjData {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    faces: Vec<Face>,
    diagnostics: Vec<ObjDiagnostic>,
}

impl ObjData {
    fn report(&mut self, line: usize, error: ObjError) {
        log::warn!("OBJ line {}: {}", line, error);
        self.diagnostics.push(ObjDiagnostic { line, error });
    }
}

/// OBJ geometry compiler
pub struct ObjLoader;

impl ObjLoader {
    /// Load the OBJ file at `path` together with its sidecar material
    pub fn load(
        assets: &dyn AssetSource,
        path: &str,
        fallback_color: Vec3,
    ) -> Result<(CompiledMesh, Material), AssetError> {
        let text = assets.read_text(path)?;
        let mesh = Self::compile(&text, fallback_color);
        let material = MaterialLoader::load_for_obj(assets, path, &text);

        log::debug!(
            "Compiled {}: {} vertices, {} diagnostics",
            path,
            mesh.vertex_count(),
            mesh.diagnostics.len()
        );

        Ok((mesh, material))
    }

    /// Compile OBJ text into an interleaved vertex buffer
    ///
    /// Vertices without their own color use `fallback_color`. Malformed lines
    /// are reported in [`CompiledMesh::diagnostics`] and skipped.
    pub fn compile(text: &str, fallback_color: Vec3) -> CompiledMesh {
        let mut data = Self::parse(text, fallback_color);
        let faces = Self::valid_faces(&mut data);
        let smoothed = Self::smooth_normals(&data, &faces);

        let mut vertices = Vec::with_capacity(faces.len() * 3 * FLOATS_PER_VERTEX);
        for face in &faces {
            Self::emit_triangle(&data, &smoothed, face, &mut vertices);
        }

        CompiledMesh {
            vertices,
            diagnostics: data.diagnostics,
        }
    }

    fn parse(text: &str, fallback_color: Vec3) -> ObjData {
        let mut data = ObjData::default();

        for (index, line) in text.lines().enumerate() {
            let line_num = index + 1;
            let parts: Vec<&str> = line.split_whitespace().collect();
            let Some(&tag) = parts.first() else {
                continue;
            };

            let result = match tag {
                "v" => Self::parse_vertex(&parts, fallback_color).map(|(position, color)| {
                    data.positions.push(position);
                    data.colors.push(color);
                }),
                "vn" => Self::parse_vec3(&parts[1..], "normal").map(|normal| data.normals.push(normal)),
                "vt" => Self::parse_uv(&parts).map(|uv| data.uvs.push(uv)),
                "f" => Self::parse_face(&parts, line_num).map(|face| data.faces.push(face)),
                _ => Ok(()),
            };

            if let Err(error) = result {
                data.report(line_num, error);
            }
        }

        data
    }

    fn parse_vertex(parts: &[&str], fallback_color: Vec3) -> Result<(Vec3, Vec3), ObjError> {
        let position = Self::parse_vec3(&parts[1..], "vertex")?;
        let color = if parts.len() >= 7 {
            Self::parse_vec3(&parts[4..], "vertex color")?
        } else {
            fallback_color
        };
        Ok((position, color))
    }

    fn parse_uv(parts: &[&str]) -> Result<Vec2, ObjError> {
        if parts.len() < 3 {
            return Err(ObjError::InvalidFormat(format!(
                "texture coordinate needs 2 values, found {}",
                parts.len() - 1
            )));
        }
        let u = Self::parse_float(parts[1], "texture coordinate")?;
        let v = Self::parse_float(parts[2], "texture coordinate")?;
        Ok(Vec2::new(u, -v))
    }

    fn parse_vec3(values: &[&str], what: &str) -> Result<Vec3, ObjError> {
        if values.len() < 3 {
            return Err(ObjError::InvalidFormat(format!(
                "{} needs 3 values, found {}",
                what,
                values.len()
            )));
        }
        Ok(Vec3::new(
            Self::parse_float(values[0], what)?,
            Self::parse_float(values[1], what)?,
            Self::parse_float(values[2], what)?,
        ))
    }

    fn parse_float(token: &str, what: &str) -> Result<f32, ObjError> {
        token
            .parse::<f32>()
            .map_err(|_| ObjError::ParseError(format!("invalid {} value '{}'", what, token)))
    }

    fn parse_face(parts: &[&str], line: usize) -> Result<Face, ObjError> {
        let refs = &parts[1..];
        if refs.len() != 3 {
            return Err(ObjError::InvalidFormat(format!(
                "face must have exactly 3 vertex references, found {}",
                refs.len()
            )));
        }

        Ok(Face {
            line,
            corners: [
                Self::parse_face_ref(refs[0])?,
                Self::parse_face_ref(refs[1])?,
                Self::parse_face_ref(refs[2])?,
            ],
        })
    }

    /// Parse `pos/uv/normal` into 0-based indices
    fn parse_face_ref(token: &str) -> Result<FaceRef, ObjError> {
        let mut components = token.split('/');
        let mut next = |kind: &str| -> Result<usize, ObjError> {
            let component = components
                .next()
                .filter(|c| !c.is_empty())
                .ok_or_else(|| ObjError::InvalidFormat(format!("'{}' is missing the {} index", token, kind)))?;
            match component.parse::<usize>() {
                Ok(index) if index >= 1 => Ok(index - 1),
                _ => Err(ObjError::ParseError(format!("invalid {} index '{}' in '{}'", kind, component, token))),
            }
        };

        let position = next("position")?;
        let uv = next("uv")?;
        let normal = next("normal")?;
        Ok(FaceRef { position, uv, normal })
    }

    /// Drop faces that reference attributes the file never declared
    fn valid_faces(data: &mut ObjData) -> Vec<Face> {
        let mut valid = Vec::with_capacity(data.faces.len());
        let faces = std::mem::take(&mut data.faces);

        for face in faces {
            match Self::check_face(data, &face) {
                Ok(()) => valid.push(face),
                Err(error) => data.report(face.line, error),
            }
        }

        valid
    }

    fn check_face(data: &ObjData, face: &Face) -> Result<(), ObjError> {
        let check = |kind: &'static str, index: usize, available: usize| {
            if index < available {
                Ok(())
            } else {
                Err(ObjError::IndexOutOfRange { kind, index: index + 1, available })
            }
        };

        for corner in &face.corners {
            check("position", corner.position, data.positions.len())?;
            check("uv", corner.uv, data.uvs.len())?;
            check("normal", corner.normal, data.normals.len())?;
        }
        Ok(())
    }

    /// Sum raw corner normals per position index, then normalize each sum once
    fn smooth_normals(data: &ObjData, faces: &[Face]) -> Vec<Vec3> {
        let mut accumulated = vec![Vec3::zeros(); data.positions.len()];

        for corner in faces.iter().flat_map(|face| face.corners.iter()) {
            accumulated[corner.position] += data.normals[corner.normal];
        }

        for normal in &mut accumulated {
            let length = normal.norm();
            if length > 0.0 {
                *normal /= length;
            }
        }

        accumulated
    }

    fn emit_triangle(data: &ObjData, smoothed: &[Vec3], face: &Face, out: &mut Vec<f32>) {
        let [a, b, c] = face.corners;
        let (p0, p1, p2) = (data.positions[a.position], data.positions[b.position], data.positions[c.position]);
        let (uv0, uv1, uv2) = (data.uvs[a.uv], data.uvs[b.uv], data.uvs[c.uv]);

        let (tangent, bitangent) = tangent_basis([p0, p1, p2], [uv0, uv1, uv2]);
        if !(tangent.iter().all(|v| v.is_finite()) && bitangent.iter().all(|v| v.is_finite())) {
            log::debug!("Degenerate UV mapping on face at line {}", face.line);
        }

        for corner in &face.corners {
            let position = data.positions[corner.position];
            let color = data.colors[corner.position];
            let normal = smoothed[corner.position];
            let uv = data.uvs[corner.uv];

            out.extend_from_slice(position.as_slice());
            out.extend_from_slice(color.as_slice());
            out.extend_from_slice(normal.as_slice());
            out.extend_from_slice(tangent.as_slice());
            out.extend_from_slice(bitangent.as_slice());
            out.extend_from_slice(uv.as_slice());
        }
    }
}

/// Solve a triangle's tangent and bitangent from its positions and UVs
///
/// A zero UV determinant yields non-finite components.
pub fn tangent_basis(positions: [Vec3; 3], uvs: [Vec2; 3]) -> (Vec3, Vec3) {
    let delta_pos1 = positions[1] - positions[0];
    let delta_pos2 = positions[2] - positions[0];
    let delta_uv1 = uvs[1] - uvs[0];
    let delta_uv2 = uvs[2] - uvs[0];

    let r = 1.0 / (delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x);
    let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
    let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * r;

    (tangent, bitangent)
}
