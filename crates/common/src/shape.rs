use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ShapeId;

/// Default sphere radius when a record omits `radius`.
pub const DEFAULT_SPHERE_RADIUS: f32 = 4.0;
/// Default torus ring radius when a record omits `radius`.
pub const DEFAULT_TORUS_RADIUS: f32 = 6.0;
/// Default torus tube radius when a record omits `tube`.
pub const DEFAULT_TORUS_TUBE: f32 = 2.0;

const DEFAULT_SPHERE_WIDTH_SEGMENTS: u32 = 20;
const DEFAULT_SPHERE_HEIGHT_SEGMENTS: u32 = 20;
const DEFAULT_TORUS_RADIAL_SEGMENTS: u32 = 16;
const DEFAULT_TORUS_TUBULAR_SEGMENTS: u32 = 100;
const MAX_SEGMENTS: u32 = 512;

/// Shape kind as stored remotely: `0 = Box, 1 = Sphere, 2 = Torus`.
///
/// Any other integer is kept verbatim in `Unknown` so records round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ShapeKind {
    Box,
    Sphere,
    Torus,
    Unknown(i32),
}

impl From<i32> for ShapeKind {
    fn from(raw: i32) -> Self {
        match raw {
            0 => Self::Box,
            1 => Self::Sphere,
            2 => Self::Torus,
            other => Self::Unknown(other),
        }
    }
}

impl From<ShapeKind> for i32 {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Box => 0,
            ShapeKind::Sphere => 1,
            ShapeKind::Torus => 2,
            ShapeKind::Unknown(raw) => raw,
        }
    }
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Sphere => "Sphere",
            Self::Torus => "Torus",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Whether the remote store accepts this kind on create.
    pub fn is_defined(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ShapeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "box" | "0" => Ok(Self::Box),
            "sphere" | "1" => Ok(Self::Sphere),
            "torus" | "2" => Ok(Self::Torus),
            other => Err(ValidationError::UnknownKindName(other.to_string())),
        }
    }
}

/// A shape record exactly as the remote store lists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecord {
    pub id: ShapeId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// JSON-encoded parameter object.
    #[serde(default = "empty_params_json")]
    pub params_json: String,
    #[serde(default)]
    pub created_at: String,
}

fn empty_params_json() -> String {
    "{}".to_string()
}

impl ShapeRecord {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// A create request for the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDraft {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub params: Value,
}

impl ShapeDraft {
    pub fn new(kind: ShapeKind, position: Vec3, params: Value) -> Self {
        Self {
            kind,
            x: position.x,
            y: position.y,
            z: position.z,
            params,
        }
    }

    /// Build a draft from an already-typed spec.
    pub fn from_spec(position: Vec3, spec: &ShapeSpec) -> Self {
        Self::new(spec.kind(), position, spec.to_params())
    }
}

/// Validated, closed description of a shape's geometry parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeSpec {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    /// A kind this client does not understand; rendered as a fallback box.
    Unknown { kind: i32 },
}

impl ShapeSpec {
    /// Sphere with default tessellation.
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            radius,
            width_segments: DEFAULT_SPHERE_WIDTH_SEGMENTS,
            height_segments: DEFAULT_SPHERE_HEIGHT_SEGMENTS,
        }
    }

    /// Torus with default tessellation.
    pub fn torus(radius: f32, tube: f32) -> Self {
        Self::Torus {
            radius,
            tube,
            radial_segments: DEFAULT_TORUS_RADIAL_SEGMENTS,
            tubular_segments: DEFAULT_TORUS_TUBULAR_SEGMENTS,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Box { .. } => ShapeKind::Box,
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Torus { .. } => ShapeKind::Torus,
            Self::Unknown { kind } => ShapeKind::Unknown(*kind),
        }
    }

    /// Parse and validate a parameter object for `kind`.
    ///
    /// Box dimensions are required. Sphere and torus radii fall back to
    /// their defaults when absent. Any present dimension must be a finite,
    /// strictly positive number. Parameters of an unknown kind are ignored.
    pub fn parse(kind: ShapeKind, params: &Value) -> Result<Self, ValidationError> {
        if let ShapeKind::Unknown(raw) = kind {
            return Ok(Self::Unknown { kind: raw });
        }
        let empty = Map::new();
        let obj = match params {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => return Err(ValidationError::MalformedParams(other.to_string())),
        };

        match kind {
            ShapeKind::Box => Ok(Self::Box {
                width: required_dimension(obj, kind, "width")?,
                height: required_dimension(obj, kind, "height")?,
                depth: required_dimension(obj, kind, "depth")?,
            }),
            ShapeKind::Sphere => Ok(Self::Sphere {
                radius: dimension(obj, "radius")?.unwrap_or(DEFAULT_SPHERE_RADIUS),
                width_segments: segments(
                    obj,
                    "widthSegments",
                    DEFAULT_SPHERE_WIDTH_SEGMENTS,
                    3,
                )?,
                height_segments: segments(
                    obj,
                    "heightSegments",
                    DEFAULT_SPHERE_HEIGHT_SEGMENTS,
                    2,
                )?,
            }),
            ShapeKind::Torus => Ok(Self::Torus {
                radius: dimension(obj, "radius")?.unwrap_or(DEFAULT_TORUS_RADIUS),
                tube: dimension(obj, "tube")?.unwrap_or(DEFAULT_TORUS_TUBE),
                radial_segments: segments(
                    obj,
                    "radialSegments",
                    DEFAULT_TORUS_RADIAL_SEGMENTS,
                    2,
                )?,
                tubular_segments: segments(
                    obj,
                    "tubularSegments",
                    DEFAULT_TORUS_TUBULAR_SEGMENTS,
                    3,
                )?,
            }),
            ShapeKind::Unknown(raw) => Ok(Self::Unknown { kind: raw }),
        }
    }

    /// Encode back into the wire parameter object.
    pub fn to_params(&self) -> Value {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => serde_json::json!({ "width": width, "height": height, "depth": depth }),
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => serde_json::json!({
                "radius": radius,
                "widthSegments": width_segments,
                "heightSegments": height_segments,
            }),
            Self::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => serde_json::json!({
                "radius": radius,
                "tube": tube,
                "radialSegments": radial_segments,
                "tubularSegments": tubular_segments,
            }),
            Self::Unknown { .. } => Value::Object(Map::new()),
        }
    }
}

/// A validated shape entity: identity, stored position and typed parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeEntity {
    pub id: ShapeId,
    /// Stored position. The y component is a bias above the ground anchor,
    /// not an absolute height.
    pub position: Vec3,
    pub spec: ShapeSpec,
}

impl ShapeEntity {
    /// Validate a wire record into a typed entity.
    /// Unknown kinds become the fallback shape without their parameters
    /// being read.
    pub fn try_from_record(record: &ShapeRecord) -> Result<Self, ValidationError> {
        let raw = record.params_json.trim();
        let params: Value = if raw.is_empty() || !record.kind.is_defined() {
            Value::Null
        } else {
            serde_json::from_str(raw)
                .map_err(|e| ValidationError::MalformedParams(e.to_string()))?
        };
        Ok(Self {
            id: record.id,
            position: record.position(),
            spec: ShapeSpec::parse(record.kind, &params)?,
        })
    }
}

/// Errors raised while validating shape parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind} requires `{field}`")]
    MissingField { kind: ShapeKind, field: &'static str },
    #[error("`{field}` must be {expected}, got {found}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("parameters are not a JSON object: {0}")]
    MalformedParams(String),
    #[error("unknown shape kind `{0}`")]
    UnknownKindName(String),
}

impl ValidationError {
    /// Name of the offending field, if the error concerns one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field, .. } | Self::InvalidField { field, .. } => Some(field),
            Self::MalformedParams(_) | Self::UnknownKindName(_) => None,
        }
    }
}

fn required_dimension(
    obj: &Map<String, Value>,
    kind: ShapeKind,
    field: &'static str,
) -> Result<f32, ValidationError> {
    dimension(obj, field)?.ok_or(ValidationError::MissingField { kind, field })
}

/// A present dimension must be a finite number above zero. `null` counts as absent.
fn dimension(obj: &Map<String, Value>, field: &'static str) -> Result<Option<f32>, ValidationError> {
    let Some(value) = obj.get(field).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let invalid = || ValidationError::InvalidField {
        field,
        expected: "a finite number greater than zero",
        found: value.to_string(),
    };
    let number = value.as_f64().ok_or_else(invalid)? as f32;
    if number.is_finite() && number > 0.0 {
        Ok(Some(number))
    } else {
        Err(invalid())
    }
}

fn segments(
    obj: &Map<String, Value>,
    field: &'static str,
    default: u32,
    min: u32,
) -> Result<u32, ValidationError> {
    let Some(value) = obj.get(field).filter(|v| !v.is_null()) else {
        return Ok(default);
    };
    let number = value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::InvalidField {
            field,
            expected: "a finite segment count",
            found: value.to_string(),
        })?;
    Ok((number.floor().max(0.0) as u32).clamp(min, MAX_SEGMENTS))
}
