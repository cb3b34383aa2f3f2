//! Scene description file parsing.
//!
//! The format is line oriented ASCII: a format-identifier header, an
//! iteration count, image dimensions, a camera line, a sky/ground line,
//! then one triangle per line as five parenthesized float triples
//! (three vertices, reflectivity, emissivity). Blank lines are allowed
//! anywhere; parenthesis spacing is not significant.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::triangle::Triangle;
use crate::vector::Vec3;

/// Identifier the first non-blank line must begin with.
pub const FORMAT_ID: &str = "#MiniLight";

/// Errors raised while reading a scene description.
#[derive(Error, Debug)]
pub enum ModelError {
    /// File could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The header line is missing or wrong.
    #[error("not a scene description: first line must begin with #MiniLight")]
    UnrecognizedFormat,

    /// A required line is absent.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// A number failed to parse.
    #[error("invalid {field}: {token:?}")]
    InvalidNumber {
        /// What was being parsed.
        field: &'static str,
        /// The offending token.
        token: String,
    },

    /// The iteration count is zero or negative.
    #[error("iteration count must be positive, got {0}")]
    InvalidIterations(i64),
}

/// Result alias for model parsing.
pub type ModelResult<T> = Result<T, ModelError>;

/// A parsed scene description, still in file units.
///
/// Clamping that belongs to a component (view angle, material ranges,
/// image dimensions) happens in that component's constructor; the parser
/// only enforces what makes a file unreadable.
#[derive(Debug)]
pub struct Model {
    /// Number of frames to accumulate.
    pub iterations: u32,
    /// Image width in pixels, clamped to [1, 4000].
    pub width: u32,
    /// Image height in pixels, clamped to [1, 4000].
    pub height: u32,
    /// Camera position.
    pub view_position: Vec3,
    /// Camera direction (not yet unitized).
    pub view_direction: Vec3,
    /// View angle in degrees (raw; the camera clamps).
    pub view_angle: f64,
    /// Sky emission (raw; the scene clamps).
    pub sky_emission: Vec3,
    /// Ground reflection (raw; the scene clamps).
    pub ground_reflection: Vec3,
    /// Scene geometry in file order.
    pub triangles: Vec<Triangle>,
}

impl Model {
    /// Read and parse a scene description file.
    pub fn load(path: &Path) -> ModelResult<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Parse a scene description from text.
    pub fn parse(text: &str) -> ModelResult<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header = lines.next().ok_or(ModelError::UnrecognizedFormat)?;
        if !header.trim_start().starts_with(FORMAT_ID) {
            return Err(ModelError::UnrecognizedFormat);
        }

        let iterations_line = lines.next().ok_or(ModelError::MissingField("iteration count"))?;
        let iterations = parse_number::<i64>(iterations_line.trim(), "iteration count")?;
        if iterations <= 0 {
            return Err(ModelError::InvalidIterations(iterations));
        }

        let dimensions_line = lines.next().ok_or(ModelError::MissingField("image dimensions"))?;
        let mut dimensions = dimensions_line.split_whitespace();
        let width = parse_number::<i64>(
            dimensions.next().ok_or(ModelError::MissingField("image width"))?,
            "image width",
        )?;
        let height = parse_number::<i64>(
            dimensions.next().ok_or(ModelError::MissingField("image height"))?,
            "image height",
        )?;

        let camera_line = lines.next().ok_or(ModelError::MissingField("camera"))?;
        let camera_groups = parenthesized_groups(camera_line);
        if camera_groups.len() < 2 {
            return Err(ModelError::MissingField("camera vectors"));
        }
        let view_position = parse_vec3(camera_groups[0], "view position")?;
        let view_direction = parse_vec3(camera_groups[1], "view direction")?;
        let after_groups = camera_line.rsplit(')').next().unwrap_or("").trim();
        let view_angle = parse_number::<f64>(after_groups, "view angle")?;

        let background_line = lines.next().ok_or(ModelError::MissingField("sky and ground"))?;
        let background_groups = parenthesized_groups(background_line);
        if background_groups.len() < 2 {
            return Err(ModelError::MissingField("sky and ground vectors"));
        }
        let sky_emission = parse_vec3(background_groups[0], "sky emission")?;
        let ground_reflection = parse_vec3(background_groups[1], "ground reflection")?;

        let mut triangles = Vec::new();
        for line in lines {
            let groups = parenthesized_groups(line);
            if groups.len() < 5 {
                return Err(ModelError::MissingField("triangle vectors"));
            }
            let v0 = parse_vec3(groups[0], "triangle vertex")?;
            let v1 = parse_vec3(groups[1], "triangle vertex")?;
            let v2 = parse_vec3(groups[2], "triangle vertex")?;
            let reflectivity = parse_vec3(groups[3], "triangle reflectivity")?;
            let emissivity = parse_vec3(groups[4], "triangle emissivity")?;
            triangles.push(Triangle::new(v0, v1, v2, reflectivity, emissivity));
        }

        Ok(Self {
            iterations: iterations.min(u32::MAX as i64) as u32,
            width: width.clamp(1, 4000) as u32,
            height: height.clamp(1, 4000) as u32,
            view_position,
            view_direction,
            view_angle,
            sky_emission,
            ground_reflection,
            triangles,
        })
    }
}

/// Substrings between balanced `(` `)` pairs, left to right.
fn parenthesized_groups(line: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else { break };
        groups.push(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];
    }
    groups
}

fn parse_number<T: std::str::FromStr>(token: &str, field: &'static str) -> ModelResult<T> {
    token.parse().map_err(|_| ModelError::InvalidNumber {
        field,
        token: token.to_string(),
    })
}

/// Three whitespace-separated floats.
fn parse_vec3(group: &str, field: &'static str) -> ModelResult<Vec3> {
    let mut values = [0.0; 3];
    let mut tokens = group.split_whitespace();
    for value in &mut values {
        let token = tokens.next().ok_or(ModelError::MissingField(field))?;
        *value = parse_number(token, field)?;
    }
    Ok(Vec3::from_array(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "\
#MiniLight

100

200 150

(0 0.75 -2) (0 0 1) 45

(0.9 0.9 1) (0.1 0.09 0.07)

(0 0 0) (0 1 0) (1 1 0)  (0.7 0.7 0.7) (0 0 0)
(0 0 0) (1 0 0) (1 1 0)  (0.2 0.2 0.2) (1 1 1)
";

    #[test]
    fn parses_a_complete_model() {
        let model = Model::parse(MODEL).unwrap();
        assert_eq!(model.iterations, 100);
        assert_eq!((model.width, model.height), (200, 150));
        assert_eq!(model.view_position, Vec3::new(0.0, 0.75, -2.0));
        assert_eq!(model.view_direction, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(model.view_angle, 45.0);
        assert_eq!(model.sky_emission, Vec3::new(0.9, 0.9, 1.0));
        assert_eq!(model.ground_reflection, Vec3::new(0.1, 0.09, 0.07));
        assert_eq!(model.triangles.len(), 2);
        assert_eq!(model.triangles[1].emissivity, Vec3::ONE);
    }

    #[test]
    fn header_is_mandatory() {
        assert!(matches!(
            Model::parse("#NotAScene\n1\n1 1\n(0 0 0) (0 0 1) 45\n(0 0 0) (0 0 0)\n"),
            Err(ModelError::UnrecognizedFormat)
        ));
        assert!(matches!(Model::parse(""), Err(ModelError::UnrecognizedFormat)));
    }

    #[test]
    fn non_positive_iterations_are_rejected() {
        let text = "#MiniLight\n0\n1 1\n(0 0 0) (0 0 1) 45\n(0 0 0) (0 0 0)\n";
        assert!(matches!(
            Model::parse(text),
            Err(ModelError::InvalidIterations(0))
        ));
    }

    #[test]
    fn dimensions_are_clamped_into_range() {
        let text = "#MiniLight\n1\n-5 9000\n(0 0 0) (0 0 1) 45\n(0 0 0) (0 0 0)\n";
        let model = Model::parse(text).unwrap();
        assert_eq!((model.width, model.height), (1, 4000));
    }

    #[test]
    fn truncated_file_reports_the_missing_field() {
        let text = "#MiniLight\n1\n1 1\n";
        assert!(matches!(
            Model::parse(text),
            Err(ModelError::MissingField("camera"))
        ));
    }

    #[test]
    fn malformed_number_is_reported() {
        let text = "#MiniLight\nmany\n1 1\n(0 0 0) (0 0 1) 45\n(0 0 0) (0 0 0)\n";
        assert!(matches!(
            Model::parse(text),
            Err(ModelError::InvalidNumber { field: "iteration count", .. })
        ));
    }

    #[test]
    fn tight_spacing_parses() {
        let text = "#MiniLight\n1\n1 1\n(0 0 0)(0 0 1)45\n(1 1 1)(0 0 0)\n(0 0 0)(0 1 0)(1 1 0)(0.5 0.5 0.5)(0 0 0)\n";
        let model = Model::parse(text).unwrap();
        assert_eq!(model.view_angle, 45.0);
        assert_eq!(model.triangles.len(), 1);
    }
}
