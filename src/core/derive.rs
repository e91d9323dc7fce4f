//! Attribute derivation: computed descriptors from raw character data.
//!
//! The keyword checks here are deliberately loose heuristics over free-form
//! strings, not exhaustive enumerations. When a string carries several
//! keywords (e.g. "petite, athletic") the first check in declaration order
//! decides.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::tables::Tables;
use crate::schema::character::{AgeGroup, CharacterRecord, OutfitMode};

/// Discrete per-character height. Fixed tiers keep group shots from
/// averaging heights across characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeightTier {
    Short,
    Average,
    Tall,
}

impl HeightTier {
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Short => "short height",
            Self::Average => "average height",
            Self::Tall => "tall height",
        }
    }
}

impl fmt::Display for HeightTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// `"{age} {gender}"`, e.g. "teen female".
pub fn demographics(record: &CharacterRecord) -> String {
    format!("{} {}", record.age_group, record.gender)
}

/// Children are always short, whatever their body type says.
pub fn height_tier(record: &CharacterRecord) -> HeightTier {
    let body = record.body_type.to_lowercase();
    match record.age_group {
        AgeGroup::Child => HeightTier::Short,
        AgeGroup::Adult => {
            if body.contains("athletic") {
                HeightTier::Tall
            } else {
                HeightTier::Average
            }
        }
        AgeGroup::Teen => {
            if body.contains("petite") {
                HeightTier::Short
            } else if body.contains("athletic") {
                HeightTier::Tall
            } else {
                HeightTier::Average
            }
        }
    }
}

/// Lighting mood keyed on the character's name, not attributes.
pub fn lighting_bias<'t>(tables: &'t Tables, name: &str) -> &'t str {
    let name = name.to_lowercase();
    tables
        .lighting
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| name.contains(k.as_str())))
        .map(|rule| rule.phrase.as_str())
        .unwrap_or(tables.default_lighting.as_str())
}

pub fn outfit_for(record: &CharacterRecord, mode: OutfitMode) -> &str {
    let blocks = &record.blocks;
    match mode {
        OutfitMode::Casual => &blocks.casual,
        OutfitMode::Pajamas => &blocks.pajamas,
        OutfitMode::Camp => &blocks.camp,
        OutfitMode::Band => &blocks.band,
        OutfitMode::Formal => &blocks.formal,
    }
}

/// `outfit_for` with a raw mode key; unrecognized keys fall back to casual.
pub fn outfit_for_key<'r>(record: &'r CharacterRecord, key: &str) -> &'r str {
    outfit_for(record, OutfitMode::from_key(key))
}

pub fn skin_tone_phrase(record: &CharacterRecord) -> String {
    format!("skin tone, {}", record.skin_tone)
}

pub fn eye_color_phrase(record: &CharacterRecord) -> String {
    format!("{} eyes", record.eye_color)
}
