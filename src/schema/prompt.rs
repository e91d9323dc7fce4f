use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Section names the assembler always computes itself.
pub mod keys {
    pub const DEMOGRAPHICS: &str = "Demographics";
    pub const BODY_TYPE: &str = "Body_Type";
    pub const HEIGHT: &str = "Height";
    pub const SKIN_TONE: &str = "Skin_Tone";
    pub const EYE_COLOR: &str = "Eye_Color";
    pub const HAIR: &str = "Hair";
    pub const POSE: &str = "Pose";
    pub const LIGHTING: &str = "Lighting";
    pub const OUTFIT: &str = "Outfit";
    pub const NEGATIVE: &str = "Negative";

    /// Injected keys in render order.
    pub const INJECTED: [&str; 10] = [
        DEMOGRAPHICS,
        BODY_TYPE,
        HEIGHT,
        SKIN_TONE,
        EYE_COLOR,
        HAIR,
        POSE,
        LIGHTING,
        OUTFIT,
        NEGATIVE,
    ];

    pub fn is_injected(key: &str) -> bool {
        INJECTED.contains(&key)
    }
}

/// Section name → resolved text for one generation unit.
///
/// Keys are unique and keep first-insertion order; overwriting a key keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledPrompt {
    sections: IndexMap<String, String>,
}

impl AssembledPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.sections.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.sections.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.sections.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
