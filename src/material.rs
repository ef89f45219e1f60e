//! Structural and electrical material definitions.
//!
//! Materials are immutable once loaded. Elements refer to them through a
//! [`MaterialId`], an index into the [`MaterialDatabase`].
//!
//! The JSON layout is:
//!
//! ```json
//! {
//!   "structural_materials": [
//!     { "name": "Iron", "strength": 0.3, "mass": 1.0, "stiffness": 1.0,
//!       "render_color": "#7f7f8f", "is_hull": true, "sound_type": "Metal" }
//!   ],
//!   "electrical_materials": [
//!     { "name": "Lamp", "electrical_type": "Lamp", "is_self_powered": false }
//!   ]
//! }
//! ```

use crate::error::{AddMaterialError, MaterialError};
use alloc::string::{String, ToString};
use alloc::vec::Vec as AllocVec;
use serde::Deserialize;

/// Index of a material in its database table.
pub type MaterialId = u16;

/// Most materials one table can hold.
pub const MAX_MATERIALS: usize = MaterialId::MAX as usize + 1;

/// Linear RGBA color in [0, 1].
pub type RgbaColor = [f32; 4];

/// Sound family a structural material makes when it breaks or creaks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MaterialSound {
    Cable,
    Glass,
    Metal,
    Wood,
}

impl MaterialSound {
    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            ("cable", MaterialSound::Cable),
            ("glass", MaterialSound::Glass),
            ("metal", MaterialSound::Metal),
            ("wood", MaterialSound::Wood),
        ]
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, sound)| sound)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuralMaterial {
    pub name: String,
    /// Maximum strain before a spring made of this material breaks.
    pub strength: f32,
    pub mass: f32,
    pub stiffness: f32,
    pub render_color: RgbaColor,
    /// Hull materials keep water out.
    pub is_hull: bool,
    pub sound: MaterialSound,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ElectricalElementType {
    Lamp,
    Cable,
    Generator,
}

impl ElectricalElementType {
    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            ("lamp", ElectricalElementType::Lamp),
            ("cable", ElectricalElementType::Cable),
            ("generator", ElectricalElementType::Generator),
        ]
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, kind)| kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectricalMaterial {
    pub name: String,
    pub element_type: ElectricalElementType,
    pub is_self_powered: bool,
}

// Raw JSON records, validated into the public types above.

#[derive(Deserialize)]
struct MaterialFile {
    #[serde(default)]
    structural_materials: AllocVec<StructuralRecord>,
    #[serde(default)]
    electrical_materials: AllocVec<ElectricalRecord>,
}

#[derive(Deserialize)]
struct StructuralRecord {
    name: String,
    strength: f32,
    mass: f32,
    #[serde(default = "default_stiffness")]
    stiffness: f32,
    render_color: String,
    #[serde(default)]
    is_hull: bool,
    sound_type: String,
}

fn default_stiffness() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct ElectricalRecord {
    name: String,
    electrical_type: String,
    #[serde(default)]
    is_self_powered: bool,
}

/// Parse `#rrggbb` or `#rrggbbaa`.
fn parse_hex_color(value: &str) -> Option<RgbaColor> {
    let hex = value.strip_prefix('#')?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| -> Option<f32> {
        u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|c| c as f32 / 255.0)
    };
    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// Immutable, process-wide table of materials.
#[derive(Debug, Clone, Default)]
pub struct MaterialDatabase {
    structural: AllocVec<StructuralMaterial>,
    electrical: AllocVec<ElectricalMaterial>,
}

impl MaterialDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON material description.
    ///
    /// `source` names where the text came from and is echoed in errors.
    pub fn from_json_str(source: &str, text: &str) -> Result<Self, MaterialError> {
        let file: MaterialFile = serde_json::from_str(text).map_err(|e| MaterialError::Parse {
            source: source.to_string(),
            reason: e.to_string(),
        })?;

        let mut db = MaterialDatabase::new();
        for record in file.structural_materials {
            let material = Self::structural_from_record(source, record)?;
            db.add_structural(material).map_err(|e| Self::add_error(source, e))?;
        }
        for record in file.electrical_materials {
            let element_type = ElectricalElementType::from_name(&record.electrical_type)
                .ok_or_else(|| MaterialError::UnknownElectricalType {
                    source: source.to_string(),
                    material: record.name.clone(),
                    value: record.electrical_type.clone(),
                })?;
            let material = ElectricalMaterial {
                name: record.name,
                element_type,
                is_self_powered: record.is_self_powered,
            };
            db.add_electrical(material).map_err(|e| Self::add_error(source, e))?;
        }

        log::info!(
            "loaded {} structural and {} electrical materials from \"{}\"",
            db.structural.len(),
            db.electrical.len(),
            source
        );
        Ok(db)
    }

    fn add_error(source: &str, error: AddMaterialError) -> MaterialError {
        match error {
            AddMaterialError::DuplicateName(material) => MaterialError::DuplicateName {
                source: source.to_string(),
                material,
            },
            AddMaterialError::TableFull { capacity } => MaterialError::TooManyMaterials {
                source: source.to_string(),
                capacity,
            },
        }
    }

    fn structural_from_record(
        source: &str,
        record: StructuralRecord,
    ) -> Result<StructuralMaterial, MaterialError> {
        let invalid = |property: &'static str| MaterialError::InvalidValue {
            source: source.to_string(),
            material: record.name.clone(),
            property,
        };
        if !(record.strength.is_finite() && record.strength > 0.0) {
            return Err(invalid("strength"));
        }
        if !(record.mass.is_finite() && record.mass > 0.0) {
            return Err(invalid("mass"));
        }
        if !(record.stiffness.is_finite() && record.stiffness >= 0.0) {
            return Err(invalid("stiffness"));
        }
        let render_color = parse_hex_color(&record.render_color).ok_or_else(|| {
            MaterialError::InvalidColor {
                source: source.to_string(),
                material: record.name.clone(),
                value: record.render_color.clone(),
            }
        })?;
        let sound = MaterialSound::from_name(&record.sound_type).ok_or_else(|| {
            MaterialError::UnknownSoundType {
                source: source.to_string(),
                material: record.name.clone(),
                value: record.sound_type.clone(),
            }
        })?;

        Ok(StructuralMaterial {
            name: record.name,
            strength: record.strength,
            mass: record.mass,
            stiffness: record.stiffness,
            render_color,
            is_hull: record.is_hull,
            sound,
        })
    }

    /// Add a structural material and return its id.
    pub fn add_structural(&mut self, material: StructuralMaterial) -> Result<MaterialId, AddMaterialError> {
        if self.find_structural(&material.name).is_some() {
            return Err(AddMaterialError::DuplicateName(material.name));
        }
        let id = next_id(self.structural.len())?;
        self.structural.push(material);
        Ok(id)
    }

    /// Add an electrical material and return its id.
    pub fn add_electrical(&mut self, material: ElectricalMaterial) -> Result<MaterialId, AddMaterialError> {
        if self.find_electrical(&material.name).is_some() {
            return Err(AddMaterialError::DuplicateName(material.name));
        }
        let id = next_id(self.electrical.len())?;
        self.electrical.push(material);
        Ok(id)
    }

    pub fn structural(&self, id: MaterialId) -> Option<&StructuralMaterial> {
        self.structural.get(id as usize)
    }

    pub fn electrical(&self, id: MaterialId) -> Option<&ElectricalMaterial> {
        self.electrical.get(id as usize)
    }

    pub fn find_structural(&self, name: &str) -> Option<MaterialId> {
        self.structural.iter().position(|m| m.name == name).map(|i| i as MaterialId)
    }

    pub fn find_electrical(&self, name: &str) -> Option<MaterialId> {
        self.electrical.iter().position(|m| m.name == name).map(|i| i as MaterialId)
    }

    pub fn structural_count(&self) -> usize {
        self.structural.len()
    }

    pub fn electrical_count(&self) -> usize {
        self.electrical.len()
    }
}

fn next_id(len: usize) -> Result<MaterialId, AddMaterialError> {
    MaterialId::try_from(len).map_err(|_| AddMaterialError::TableFull { capacity: MAX_MATERIALS })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::Float;

    const MATERIALS: &str = r##"{
        "structural_materials": [
            { "name": "Iron", "strength": 0.3, "mass": 1.0, "stiffness": 1.0,
              "render_color": "#7f7f8f", "is_hull": true, "sound_type": "Metal" },
            { "name": "Wood", "strength": 0.1, "mass": 0.6,
              "render_color": "#8a5a2bff", "sound_type": "wood" }
        ],
        "electrical_materials": [
            { "name": "Lamp", "electrical_type": "Lamp" },
            { "name": "Engine", "electrical_type": "generator", "is_self_powered": true }
        ]
    }"##;

    #[test]
    fn parses_both_material_kinds() {
        let db = MaterialDatabase::from_json_str("materials.json", MATERIALS).unwrap();
        assert_eq!(db.structural_count(), 2);
        assert_eq!(db.electrical_count(), 2);

        let wood = db.structural(db.find_structural("Wood").unwrap()).unwrap();
        assert_eq!(wood.sound, MaterialSound::Wood);
        assert_eq!(wood.stiffness, 1.0);
        assert!(!wood.is_hull);
        assert_eq!(wood.render_color[3], 1.0);

        let iron = db.structural(0).unwrap();
        assert!(iron.is_hull);
        assert!((iron.render_color[2] - 143.0 / 255.0).abs() < 1e-6);

        let engine = db.electrical(db.find_electrical("Engine").unwrap()).unwrap();
        assert_eq!(engine.element_type, ElectricalElementType::Generator);
        assert!(engine.is_self_powered);
    }

    #[test]
    fn unknown_sound_type_names_the_source() {
        let text = r##"{ "structural_materials": [
            { "name": "Rubber", "strength": 0.1, "mass": 1.0,
              "render_color": "#000000", "sound_type": "Squeak" } ] }"##;
        let err = MaterialDatabase::from_json_str("ship/materials.json", text).unwrap_err();
        match &err {
            MaterialError::UnknownSoundType { source, value, .. } => {
                assert_eq!(source, "ship/materials.json");
                assert_eq!(value, "Squeak");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(alloc::format!("{}", err).contains("ship/materials.json"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = MaterialDatabase::from_json_str("broken.json", "{ not json").unwrap_err();
        assert!(matches!(err, MaterialError::Parse { .. }));
    }

    #[test]
    fn bad_color_and_duplicates_are_rejected() {
        let bad_color = r##"{ "structural_materials": [
            { "name": "Glass", "strength": 0.1, "mass": 1.0,
              "render_color": "blue", "sound_type": "Glass" } ] }"##;
        assert!(matches!(
            MaterialDatabase::from_json_str("m.json", bad_color),
            Err(MaterialError::InvalidColor { .. })
        ));

        let duplicate = r##"{ "structural_materials": [
            { "name": "Glass", "strength": 0.1, "mass": 1.0,
              "render_color": "#ffffff", "sound_type": "Glass" },
            { "name": "Glass", "strength": 0.2, "mass": 1.0,
              "render_color": "#ffffff", "sound_type": "Glass" } ] }"##;
        assert!(matches!(
            MaterialDatabase::from_json_str("m.json", duplicate),
            Err(MaterialError::DuplicateName { .. })
        ));
    }

    #[test]
    fn non_positive_mass_is_rejected() {
        let text = r##"{ "structural_materials": [
            { "name": "Ghost", "strength": 0.1, "mass": 0.0,
              "render_color": "#ffffff", "sound_type": "Glass" } ] }"##;
        assert!(matches!(
            MaterialDatabase::from_json_str("m.json", text),
            Err(MaterialError::InvalidValue { property: "mass", .. })
        ));
    }

    #[test]
    fn full_table_refuses_another_material() {
        let lamp = |name: &str| ElectricalMaterial {
            name: String::from(name),
            element_type: ElectricalElementType::Lamp,
            is_self_powered: false,
        };
        let mut db = MaterialDatabase::new();
        db.electrical.resize(MAX_MATERIALS - 1, lamp("Filler"));
        assert_eq!(db.add_electrical(lamp("Last")), Ok(MaterialId::MAX));
        assert_eq!(
            db.add_electrical(lamp("Overflow")),
            Err(AddMaterialError::TableFull { capacity: MAX_MATERIALS })
        );
        assert_eq!(db.electrical_count(), MAX_MATERIALS);
    }
}
