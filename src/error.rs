//! Error types for ship construction and material loading.
//!
//! Only input and construction problems are errors. Broken invariants
//! inside a simulation step, such as a bomb attached twice, are programming
//! defects and trip assertions instead.

use crate::element::{ElementCount, ElementIndex};
use alloc::string::String;
use core::fmt;

/// Errors raised while building a ship out of points, springs and triangles.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// The container was sized for fewer elements.
    CapacityExceeded { kind: ElementKind, capacity: ElementCount },
    /// Element index is out of bounds.
    ElementOutOfBounds { kind: ElementKind, index: ElementIndex, count: ElementCount },
    /// The element exists but has been destroyed.
    DeletedElement { kind: ElementKind, index: ElementIndex },
    /// A spring would join a point to itself.
    DegenerateSpring { point: ElementIndex },
    /// The endpoints sit on top of each other, leaving no rest length.
    CoincidentEndpoints { point_a: ElementIndex, point_b: ElementIndex },
    /// Material id is not in the material database.
    InvalidMaterial { id: u16 },
}

/// Which container an error refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Point,
    Spring,
    Triangle,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Point => write!(f, "point"),
            ElementKind::Spring => write!(f, "spring"),
            ElementKind::Triangle => write!(f, "triangle"),
        }
    }
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::CapacityExceeded { kind, capacity } => {
                write!(f, "{} capacity of {} exceeded", kind, capacity)
            }
            PhysicsError::ElementOutOfBounds { kind, index, count } => {
                write!(f, "{} index {} out of bounds (count: {})", kind, index, count)
            }
            PhysicsError::DeletedElement { kind, index } => {
                write!(f, "{} {} has been destroyed", kind, index)
            }
            PhysicsError::DegenerateSpring { point } => {
                write!(f, "spring would connect point {} to itself", point)
            }
            PhysicsError::CoincidentEndpoints { point_a, point_b } => {
                write!(f, "points {} and {} coincide, spring has no rest length", point_a, point_b)
            }
            PhysicsError::InvalidMaterial { id } => write!(f, "unknown material id {}", id),
        }
    }
}

/// Why a material could not be added to a database table.
#[derive(Debug, Clone, PartialEq)]
pub enum AddMaterialError {
    /// A material of the same kind already has this name.
    DuplicateName(String),
    /// Every [`MaterialId`](crate::material::MaterialId) is taken.
    TableFull { capacity: usize },
}

impl fmt::Display for AddMaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddMaterialError::DuplicateName(name) => write!(f, "material \"{}\" already exists", name),
            AddMaterialError::TableFull { capacity } => {
                write!(f, "material table is full ({} materials)", capacity)
            }
        }
    }
}

/// Errors raised while reading material definitions.
///
/// Every variant names the source (usually a file name) it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialError {
    /// The text is not valid JSON or does not have the expected layout.
    Parse { source: String, reason: String },
    /// `sound_type` is not one of Cable, Glass, Metal, Wood.
    UnknownSoundType { source: String, material: String, value: String },
    /// `electrical_type` is not one of Lamp, Cable, Generator.
    UnknownElectricalType { source: String, material: String, value: String },
    /// `render_color` is not a `#rrggbb` or `#rrggbbaa` string.
    InvalidColor { source: String, material: String, value: String },
    /// Two materials of the same kind share a name.
    DuplicateName { source: String, material: String },
    /// A numeric property is out of its valid range.
    InvalidValue { source: String, material: String, property: &'static str },
    /// The file defines more materials than a [`MaterialId`](crate::material::MaterialId) can address.
    TooManyMaterials { source: String, capacity: usize },
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialError::Parse { source, reason } => {
                write!(f, "error parsing material file \"{}\": {}", source, reason)
            }
            MaterialError::UnknownSoundType { source, material, value } => write!(
                f,
                "material \"{}\" in \"{}\": unrecognized sound type \"{}\"",
                material, source, value
            ),
            MaterialError::UnknownElectricalType { source, material, value } => write!(
                f,
                "material \"{}\" in \"{}\": unrecognized electrical type \"{}\"",
                material, source, value
            ),
            MaterialError::InvalidColor { source, material, value } => write!(
                f,
                "material \"{}\" in \"{}\": invalid render color \"{}\"",
                material, source, value
            ),
            MaterialError::DuplicateName { source, material } => {
                write!(f, "material \"{}\" in \"{}\" is defined twice", material, source)
            }
            MaterialError::InvalidValue { source, material, property } => write!(
                f,
                "material \"{}\" in \"{}\": invalid value for \"{}\"",
                material, source, property
            ),
            MaterialError::TooManyMaterials { source, capacity } => {
                write!(f, "\"{}\" defines more than {} materials", source, capacity)
            }
        }
    }
}
