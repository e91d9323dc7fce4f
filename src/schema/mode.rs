use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::character::{OutfitMode, ParseFieldError};

/// Named body poses. Each maps to a fixed phrase in the pose table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseKey {
    Standing,
    Sitting,
    Walking,
    Conversation,
    Classroom,
    Band,
    Camp,
    Sleep,
}

impl PoseKey {
    pub const ALL: [PoseKey; 8] = [
        Self::Standing,
        Self::Sitting,
        Self::Walking,
        Self::Conversation,
        Self::Classroom,
        Self::Band,
        Self::Camp,
        Self::Sleep,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Standing => "standing",
            Self::Sitting => "sitting",
            Self::Walking => "walking",
            Self::Conversation => "conversation",
            Self::Classroom => "classroom",
            Self::Band => "band",
            Self::Camp => "camp",
            Self::Sleep => "sleep",
        }
    }
}

impl FromStr for PoseKey {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == key)
            .ok_or_else(|| ParseFieldError {
                field: "pose",
                value: s.to_string(),
                expected: "standing, sitting, walking, conversation, classroom, band, camp, sleep",
            })
    }
}

impl fmt::Display for PoseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Explicit user choices. `None` means "infer from the template kind".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeOverrides {
    pub pose: Option<PoseKey>,
    pub outfit: Option<OutfitMode>,
}

/// The pose and outfit actually applied to one generation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModes {
    pub pose: PoseKey,
    pub outfit: OutfitMode,
}

/// How a generation unit was composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Single,
    ManualGroup,
    RandomGroup,
}

impl GenerationMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::ManualGroup => "manual_group",
            Self::RandomGroup => "random_group",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
