//! Shader programs for the globe's visual layers.
//!
//! Each visual layer is drawn by a [`ShaderProgram`]: a pair of WGSL sources, one
//! for the vertex stage and one for the fragment stage. Sources are opaque text
//! supplied at construction time and are parsed and validated immediately, so a
//! malformed program is rejected before any GPU object exists and before the
//! render loop can start.
//!
//! # Entry Points
//!
//! The vertex source must define a `@vertex fn vs`, the fragment source a
//! `@fragment fn fs`:
//!
//! ```
//! use globe::ShaderProgram;
//!
//! let vertex = r#"
//!     @vertex
//!     fn vs(@builtin(vertex_index) vi: u32) -> @builtin(position) vec4f {
//!         return vec4f(f32(vi), 0.0, 0.0, 1.0);
//!     }
//! "#;
//! let fragment = r#"
//!     @fragment
//!     fn fs() -> @location(0) vec4f {
//!         return vec4f(1.0);
//!     }
//! "#;
//!
//! let program = ShaderProgram::new("Flat", vertex, fragment).unwrap();
//! assert_eq!(program.label(), "Flat");
//! ```
//!
//! # Bundled Programs
//!
//! [`ShaderSet::builtin`] loads the three programs shipped with the crate:
//!
//! | Program    | Layers            | Blending                    |
//! |------------|-------------------|-----------------------------|
//! | surface    | globe, clouds     | opaque / alpha              |
//! | atmosphere | glow shell        | additive, back faces        |
//! | starfield  | star billboards   | additive, no depth write    |

use naga::valid::{Capabilities, ValidationFlags, Validator};

/// Entry point name required in every vertex source.
pub const VERTEX_ENTRY: &str = "vs";
/// Entry point name required in every fragment source.
pub const FRAGMENT_ENTRY: &str = "fs";

/// Shader pipeline stage, used for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Vertex => write!(f, "vertex"),
            Stage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Errors raised while constructing a [`ShaderProgram`].
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// The source text for a stage was empty or whitespace.
    #[error("{label}: {stage} shader source is empty")]
    Empty { label: String, stage: Stage },
    /// The WGSL text could not be parsed.
    #[error("{label}: {stage} shader failed to parse:\n{message}")]
    Parse {
        label: String,
        stage: Stage,
        message: String,
    },
    /// The module parsed but failed validation.
    #[error("{label}: {stage} shader failed validation:\n{message}")]
    Validation {
        label: String,
        stage: Stage,
        message: String,
    },
    /// The required entry point was not found for the stage.
    #[error("{label}: {stage} shader has no entry point named '{entry}'")]
    MissingEntryPoint {
        label: String,
        stage: Stage,
        entry: &'static str,
    },
}

/// A validated vertex/fragment shader pair.
#[derive(Clone, Debug)]
pub struct ShaderProgram {
    label: String,
    vertex: String,
    fragment: String,
}

impl ShaderProgram {
    /// Parses and validates both stages.
    ///
    /// Fails fast with a descriptive [`ShaderError`] naming the program, the
    /// stage, and the parser or validator message.
    pub fn new(
        label: impl Into<String>,
        vertex: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Result<Self, ShaderError> {
        let label = label.into();
        let vertex = vertex.into();
        let fragment = fragment.into();

        check_stage(&label, Stage::Vertex, &vertex)?;
        check_stage(&label, Stage::Fragment, &fragment)?;

        Ok(Self {
            label,
            vertex,
            fragment,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// WGSL source of the vertex stage.
    pub fn vertex_source(&self) -> &str {
        &self.vertex
    }

    /// WGSL source of the fragment stage.
    pub fn fragment_source(&self) -> &str {
        &self.fragment
    }
}

fn check_stage(label: &str, stage: Stage, source: &str) -> Result<(), ShaderError> {
    if source.trim().is_empty() {
        return Err(ShaderError::Empty {
            label: label.to_string(),
            stage,
        });
    }

    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Parse {
        label: label.to_string(),
        stage,
        message: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::Validation {
            label: label.to_string(),
            stage,
            message: e.emit_to_string(source),
        })?;

    let (naga_stage, entry) = match stage {
        Stage::Vertex => (naga::ShaderStage::Vertex, VERTEX_ENTRY),
        Stage::Fragment => (naga::ShaderStage::Fragment, FRAGMENT_ENTRY),
    };

    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.stage == naga_stage && ep.name == entry);

    if !found {
        return Err(ShaderError::MissingEntryPoint {
            label: label.to_string(),
            stage,
            entry,
        });
    }

    Ok(())
}

/// The three programs used by the globe scene.
#[derive(Clone, Debug)]
pub struct ShaderSet {
    /// Textured sphere with rim glow and optional lighting (globe and clouds).
    pub surface: ShaderProgram,
    /// Back-face glow shell around the globe.
    pub atmosphere: ShaderProgram,
    /// Additive star billboards.
    pub starfield: ShaderProgram,
}

impl ShaderSet {
    /// Loads and validates the bundled WGSL programs.
    pub fn builtin() -> Result<Self, ShaderError> {
        Ok(Self {
            surface: ShaderProgram::new(
                "Surface",
                include_str!("shaders/surface.vert.wgsl"),
                include_str!("shaders/surface.frag.wgsl"),
            )?,
            atmosphere: ShaderProgram::new(
                "Atmosphere",
                include_str!("shaders/atmosphere.vert.wgsl"),
                include_str!("shaders/atmosphere.frag.wgsl"),
            )?,
            starfield: ShaderProgram::new(
                "Starfield",
                include_str!("shaders/starfield.vert.wgsl"),
                include_str!("shaders/starfield.frag.wgsl"),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "@vertex fn vs() -> @builtin(position) vec4f { return vec4f(0.0); }";
    const FS: &str = "@fragment fn fs() -> @location(0) vec4f { return vec4f(1.0); }";

    #[test]
    fn builtin_programs_validate() {
        let set = ShaderSet::builtin().expect("bundled shaders should be valid");
        assert_eq!(set.surface.label(), "Surface");
        assert_eq!(set.atmosphere.label(), "Atmosphere");
        assert_eq!(set.starfield.label(), "Starfield");
    }

    #[test]
    fn minimal_program_accepted() {
        let program = ShaderProgram::new("Minimal", VS, FS).unwrap();
        assert_eq!(program.vertex_source(), VS);
        assert_eq!(program.fragment_source(), FS);
    }

    #[test]
    fn empty_source_rejected() {
        let err = ShaderProgram::new("Empty", "   ", FS).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Empty {
                stage: Stage::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn syntax_error_is_descriptive() {
        let err = ShaderProgram::new("Broken", VS, "@fragment fn fs( {").unwrap_err();
        match &err {
            ShaderError::Parse { label, stage, .. } => {
                assert_eq!(label, "Broken");
                assert_eq!(*stage, Stage::Fragment);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("Broken: fragment shader failed to parse"));
    }

    #[test]
    fn vertex_without_position_fails_validation() {
        let bad = "@vertex fn vs() -> @location(0) vec4f { return vec4f(0.0); }";
        let err = ShaderProgram::new("Positionless", bad, FS).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Validation {
                stage: Stage::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn wrong_entry_name_rejected() {
        let vs = "@vertex fn main() -> @builtin(position) vec4f { return vec4f(0.0); }";
        let err = ShaderProgram::new("Renamed", vs, FS).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::MissingEntryPoint { entry: "vs", .. }
        ));
    }

    #[test]
    fn entry_in_wrong_stage_rejected() {
        // A fragment entry named `vs` does not satisfy the vertex stage.
        let vs = "@fragment fn vs() -> @location(0) vec4f { return vec4f(0.0); }";
        let err = ShaderProgram::new("Swapped", vs, FS).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::MissingEntryPoint {
                stage: Stage::Vertex,
                ..
            }
        ));
    }
}
