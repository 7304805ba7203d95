//! MTL (Material Template Library) file parser
//!
//! Reads the `Ns`, `Ka`, `Kd` and `Ks` tags of a Wavefront .mtl file into a
//! single [`Material`]. `newmtl` blocks are not distinguished: the last `Ns`
//! wins, the first `Ka`, `Kd` and `Ks` win, and tags that never appear keep
//! their default.

use crate::foundation::math::Vec3;

use super::Material;

/// MTL file parser
pub struct MtlParser;

impl MtlParser {
    /// Parse MTL file contents
    ///
    /// Malformed tag lines are logged and skipped, leaving that property at
    /// its default.
    pub fn parse(contents: &str) -> Material {
        let mut material = Material::default();
        let mut specular_exponent = None;
        let mut ambient = None;
        let mut diffuse = None;
        let mut specular = None;

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(command) = tokens.next() else {
                continue;
            };

            let result = match command {
                "Ns" => {
                    Self::parse_f32(&mut tokens, line_num, command).map(|v| specular_exponent = Some(v))
                }
                "Ka" if ambient.is_none() => {
                    Self::parse_vec3(&mut tokens, line_num, command).map(|v| ambient = Some(v))
                }
                "Kd" if diffuse.is_none() => {
                    Self::parse_vec3(&mut tokens, line_num, command).map(|v| diffuse = Some(v))
                }
                "Ks" if specular.is_none() => {
                    Self::parse_vec3(&mut tokens, line_num, command).map(|v| specular = Some(v))
                }
                _ => Ok(()),
            };

            if let Err(message) = result {
                log::warn!("{}", message);
            }
        }

        if let Some(value) = specular_exponent {
            material.specular_exponent = value;
        }
        if let Some(value) = ambient {
            material.ambient = value;
        }
        if let Some(value) = diffuse {
            material.diffuse = value;
        }
        if let Some(value) = specular {
            material.specular = value;
        }

        material
    }

    /// Parse an RGB triple; a single value is broadcast to all three channels
    fn parse_vec3<'a, I>(tokens: &mut I, line_num: usize, command: &str) -> Result<Vec3, String>
    where
        I: Iterator<Item = &'a str>
    {
        let r = Self::parse_f32(tokens, line_num, command)?;
        match tokens.next() {
            None => Ok(Vec3::repeat(r)),
            Some(token) => {
                let g = Self::parse_token(token, line_num, command)?;
                let b = Self::parse_f32(tokens, line_num, command)?;
                Ok(Vec3::new(r, g, b))
            }
        }
    }

    /// Parse a single f32 value
    fn parse_f32<'a, I>(tokens: &mut I, line_num: usize, command: &str) -> Result<f32, String>
    where
        I: Iterator<Item = &'a str>
    {
        let token = tokens.next()
            .ok_or_else(|| format!("Line {}: {} missing value", line_num + 1, command))?;
        Self::parse_token(token, line_num, command)
    }

    fn parse_token(token: &str, line_num: usize, command: &str) -> Result<f32, String> {
        token.parse::<f32>()
            .map_err(|_| format!("Line {}: {} invalid float value '{}'", line_num + 1, command, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_material() {
        let mtl_content = r#"
# Simple material
newmtl TestMaterial
Ns 96.078431
Ka 1.0 1.0 1.0
Kd 0.8 0.2 0.2
Ks 0.5 0.5 0.5
d 1.0
illum 2
"#;

        let mat = MtlParser::parse(mtl_content);
        assert_eq!(mat.specular_exponent, 96.078431);
        assert_eq!(mat.ambient, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(mat.diffuse, Vec3::new(0.8, 0.2, 0.2));
        assert_eq!(mat.specular, Vec3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_single_value_is_broadcast() {
        let mat = MtlParser::parse("Ka 0.25\n");
        assert_eq!(mat.ambient, Vec3::new(0.25, 0.25, 0.25));
    }

    #[test]
    fn test_missing_tags_keep_defaults() {
        let mat = MtlParser::parse("newmtl Partial\nKd 0.1 0.2 0.3\n");

        assert_eq!(mat.specular_exponent, 50.0);
        assert_eq!(mat.ambient, Vec3::new(0.8, 0.8, 0.8));
        assert_eq!(mat.diffuse, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(mat.specular, Vec3::new(0.8, 0.8, 0.8));
    }

    #[test]
    fn test_last_exponent_and_first_colors_win() {
        let mtl_content = r#"
newmtl Body
Ns 10
Ka 0.1 0.1 0.1

newmtl Trim
Ns 90
Ka 0.9 0.9 0.9
"#;

        let mat = MtlParser::parse(mtl_content);
        assert_eq!(mat.specular_exponent, 90.0);
        assert_eq!(mat.ambient, Vec3::new(0.1, 0.1, 0.1));
    }

    #[test]
    fn test_first_diffuse_wins() {
        let mtl_content = r#"
newmtl Material1
Kd 1.0 0.0 0.0

newmtl Material2
Kd 0.0 1.0 0.0
"#;

        assert_eq!(MtlParser::parse(mtl_content).diffuse, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        let mtl_content = r#"
Ns shiny
Ks 0.1 0.2
Ks 0.3 0.3 0.3
"#;

        let mat = MtlParser::parse(mtl_content);
        assert_eq!(mat.specular_exponent, 50.0);
        assert_eq!(mat.specular, Vec3::new(0.3, 0.3, 0.3));
    }
}
