use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a tabular value falls outside an enumerated field's allowed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} value '{value}' (expected one of: {expected})")]
pub struct ParseFieldError {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Age bracket of a character. Drives the height tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Child,
    Teen,
    Adult,
}

impl AgeGroup {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Teen => "teen",
            Self::Adult => "adult",
        }
    }
}

impl FromStr for AgeGroup {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "child" => Ok(Self::Child),
            "teen" => Ok(Self::Teen),
            "adult" => Ok(Self::Adult),
            _ => Err(ParseFieldError {
                field: "Age_Group",
                value: s.to_string(),
                expected: "child, teen, adult",
            }),
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn token(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }
}

impl FromStr for Gender {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            _ => Err(ParseFieldError {
                field: "Gender",
                value: s.to_string(),
                expected: "female, male",
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Which outfit block a prompt dresses its characters in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutfitMode {
    Casual,
    Pajamas,
    Camp,
    Band,
    Formal,
}

impl OutfitMode {
    pub const ALL: [OutfitMode; 5] = [
        Self::Casual,
        Self::Pajamas,
        Self::Camp,
        Self::Band,
        Self::Formal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Pajamas => "pajamas",
            Self::Camp => "camp",
            Self::Band => "band",
            Self::Formal => "formal",
        }
    }

    /// Lenient lookup: anything unrecognized dresses the character casually.
    pub fn from_key(key: &str) -> Self {
        key.parse().unwrap_or(Self::Casual)
    }
}

impl FromStr for OutfitMode {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "casual" => Ok(Self::Casual),
            "pajamas" => Ok(Self::Pajamas),
            "camp" => Ok(Self::Camp),
            "band" => Ok(Self::Band),
            "formal" => Ok(Self::Formal),
            _ => Err(ParseFieldError {
                field: "outfit",
                value: s.to_string(),
                expected: "casual, pajamas, camp, band, formal",
            }),
        }
    }
}

impl fmt::Display for OutfitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Free-form, possibly weighted prompt blocks carried by each character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppearanceBlocks {
    pub hair: String,
    pub casual: String,
    pub pajamas: String,
    pub camp: String,
    pub band: String,
    pub formal: String,
}

/// One roster row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    pub age_group: AgeGroup,
    pub gender: Gender,
    pub eye_color: String,
    pub skin_tone: String,
    /// Classifier string such as "petite build"; matched by keyword.
    pub body_type: String,
    pub blocks: AppearanceBlocks,
}

impl CharacterRecord {
    /// Case-insensitive identity key.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn same_identity(&self, other: &CharacterRecord) -> bool {
        self.key() == other.key()
    }
}

/// The loaded character roster with a precomputed case-insensitive name index.
///
/// Names are unique: a later record whose name collides with an earlier one
/// (ignoring case) is rejected by [`Roster::push`].
#[derive(Debug, Clone, Default)]
pub struct Roster {
    records: Vec<CharacterRecord>,
    index: FxHashMap<String, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Returns `false` (and keeps the existing entry) when the
    /// name is blank or already present.
    pub fn push(&mut self, record: CharacterRecord) -> bool {
        let key = record.key();
        if key.trim().is_empty() || self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.records.len());
        self.records.push(record);
        true
    }

    /// Exact, case-insensitive lookup. Input is trimmed.
    pub fn get(&self, name: &str) -> Option<&CharacterRecord> {
        let key = name.trim().to_lowercase();
        self.index.get(&key).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[CharacterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<CharacterRecord> for Roster {
    fn from_iter<I: IntoIterator<Item = CharacterRecord>>(iter: I) -> Self {
        let mut roster = Roster::new();
        for record in iter {
            roster.push(record);
        }
        roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> CharacterRecord {
        CharacterRecord {
            name: name.to_string(),
            age_group: AgeGroup::Teen,
            gender: Gender::Female,
            eye_color: "blue".to_string(),
            skin_tone: "light pastel skin".to_string(),
            body_type: "slim build".to_string(),
            blocks: AppearanceBlocks::default(),
        }
    }

    #[test]
    fn parse_age_group_is_case_insensitive() {
        assert_eq!(" Teen ".parse::<AgeGroup>().unwrap(), AgeGroup::Teen);
        assert_eq!("ADULT".parse::<AgeGroup>().unwrap(), AgeGroup::Adult);
    }

    #[test]
    fn parse_age_group_rejects_unknown() {
        let err = "elder".parse::<AgeGroup>().unwrap_err();
        assert_eq!(err.value, "elder");
        assert!(err.to_string().contains("Age_Group"));
    }

    #[test]
    fn parse_gender_rejects_unknown() {
        assert!("other".parse::<Gender>().is_err());
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
    }

    #[test]
    fn outfit_from_key_defaults_to_casual() {
        assert_eq!(OutfitMode::from_key("band"), OutfitMode::Band);
        assert_eq!(OutfitMode::from_key("swimwear"), OutfitMode::Casual);
        assert_eq!(OutfitMode::from_key(""), OutfitMode::Casual);
    }

    #[test]
    fn roster_lookup_ignores_case() {
        let roster: Roster = vec![record("Rarity"), record("Applejack")].into_iter().collect();
        assert_eq!(roster.get("rarity").map(|r| r.name.as_str()), Some("Rarity"));
        assert_eq!(roster.get("  APPLEJACK ").map(|r| r.name.as_str()), Some("Applejack"));
        assert!(roster.get("Spike").is_none());
    }

    #[test]
    fn roster_keeps_first_duplicate() {
        let mut roster = Roster::new();
        assert!(roster.push(record("Rarity")));
        let mut dup = record("RARITY");
        dup.eye_color = "green".to_string();
        assert!(!roster.push(dup));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("rarity").unwrap().eye_color, "blue");
    }

    #[test]
    fn roster_rejects_blank_names() {
        let mut roster = Roster::new();
        assert!(!roster.push(record("   ")));
        assert!(roster.is_empty());
    }
}
