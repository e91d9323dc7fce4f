//! Rendering: flatten an assembled section mapping into output strings.

use serde::{Deserialize, Serialize};

use crate::core::tables::Tables;
use crate::schema::prompt::{keys, AssembledPrompt};

/// Sections rendered first in the main prompt, in this order. Remaining
/// free sections follow in template order.
pub const MAIN_ORDER: [&str; 9] = [
    keys::DEMOGRAPHICS,
    keys::BODY_TYPE,
    keys::HEIGHT,
    keys::SKIN_TONE,
    keys::EYE_COLOR,
    keys::HAIR,
    keys::POSE,
    keys::LIGHTING,
    keys::OUTFIT,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPrompt {
    pub main: String,
    pub negative: String,
    /// `label: value` lines; empty when no settings sections are present.
    pub settings: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer<'t> {
    tables: &'t Tables,
}

impl<'t> Renderer<'t> {
    pub fn new(tables: &'t Tables) -> Self {
        Self { tables }
    }

    pub fn render(&self, prompt: &AssembledPrompt) -> RenderedPrompt {
        RenderedPrompt {
            main: self.main_prompt(prompt),
            negative: self.negative_prompt(prompt),
            settings: self.settings_text(prompt),
        }
    }

    pub fn main_prompt(&self, prompt: &AssembledPrompt) -> String {
        let fixed = MAIN_ORDER.iter().filter_map(|key| prompt.get(key));
        let free = prompt
            .iter()
            .filter(|(key, _)| !self.is_reserved(key))
            .map(|(_, value)| value);
        join_parts(fixed.chain(free))
    }

    /// The fixed bleed block, then any `Negative_*` template sections.
    pub fn negative_prompt(&self, prompt: &AssembledPrompt) -> String {
        let base = prompt
            .get(keys::NEGATIVE)
            .unwrap_or(self.tables.negative_block.as_str());
        let extra = prompt
            .iter()
            .filter(|(key, _)| self.tables.is_negative_section(key))
            .map(|(_, value)| value);
        join_parts(std::iter::once(base).chain(extra))
    }

    pub fn settings_text(&self, prompt: &AssembledPrompt) -> String {
        self.tables
            .settings
            .iter()
            .filter_map(|setting| {
                let value = clean(prompt.get(&setting.section)?);
                (!value.is_empty()).then(|| format!("{}: {}", setting.label, value))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Keys that never render as free main-prompt sections.
    fn is_reserved(&self, key: &str) -> bool {
        keys::is_injected(key)
            || self.tables.is_negative_section(key)
            || self.tables.settings_label(key).is_some()
    }
}

/// Trim whitespace and stray leading/trailing commas.
fn clean(value: &str) -> &str {
    value.trim_matches(|c: char| c == ',' || c.is_whitespace())
}

fn join_parts<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .map(clean)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
