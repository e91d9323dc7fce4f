//! Prompt assembly: merge bound template sections with injected identity
//! locks into one section mapping per generation unit.
//!
//! Injected keys always overwrite template content of the same name. In
//! group mode each per-character key becomes a sequence of
//! `"{name}, {value}"` fragments in member order, so the image model can bind
//! every descriptor to a name instead of averaging across the group. Pose and
//! Negative stay single scene-level values.

use tracing::debug;

use crate::core::binder::{bind, join_names, BindTarget};
use crate::core::derive::{
    demographics, eye_color_phrase, height_tier, lighting_bias, outfit_for, skin_tone_phrase,
};
use crate::core::tables::Tables;
use crate::schema::character::{CharacterRecord, OutfitMode};
use crate::schema::group::GroupSelection;
use crate::schema::mode::ResolvedModes;
use crate::schema::prompt::{keys, AssembledPrompt};
use crate::schema::template::TemplatePack;

/// Switches for the optional injected keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    pub inject_lighting: bool,
    pub inject_outfit: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            inject_lighting: true,
            inject_outfit: true,
        }
    }
}

/// Per-character injected keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Descriptor {
    Demographics,
    BodyType,
    Height,
    SkinTone,
    EyeColor,
    Hair,
    Lighting,
    Outfit,
}

impl Descriptor {
    fn key(self) -> &'static str {
        match self {
            Self::Demographics => keys::DEMOGRAPHICS,
            Self::BodyType => keys::BODY_TYPE,
            Self::Height => keys::HEIGHT,
            Self::SkinTone => keys::SKIN_TONE,
            Self::EyeColor => keys::EYE_COLOR,
            Self::Hair => keys::HAIR,
            Self::Lighting => keys::LIGHTING,
            Self::Outfit => keys::OUTFIT,
        }
    }

    fn describe(self, tables: &Tables, record: &CharacterRecord, outfit: OutfitMode) -> String {
        match self {
            Self::Demographics => demographics(record),
            Self::BodyType => record.body_type.clone(),
            Self::Height => height_tier(record).phrase().to_string(),
            Self::SkinTone => skin_tone_phrase(record),
            Self::EyeColor => eye_color_phrase(record),
            Self::Hair => record.blocks.hair.clone(),
            Self::Lighting => lighting_bias(tables, &record.name).to_string(),
            Self::Outfit => outfit_for(record, outfit).to_string(),
        }
    }
}

/// Injected per-character keys in injection order.
fn descriptors(options: AssemblyOptions) -> Vec<Descriptor> {
    let mut out = vec![
        Descriptor::Demographics,
        Descriptor::BodyType,
        Descriptor::Height,
        Descriptor::SkinTone,
        Descriptor::EyeColor,
        Descriptor::Hair,
    ];
    if options.inject_lighting {
        out.push(Descriptor::Lighting);
    }
    if options.inject_outfit {
        out.push(Descriptor::Outfit);
    }
    out
}

#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler<'t> {
    tables: &'t Tables,
    options: AssemblyOptions,
}

impl<'t> PromptAssembler<'t> {
    pub fn new(tables: &'t Tables) -> Self {
        Self {
            tables,
            options: AssemblyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AssemblyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn assemble_single(
        &self,
        pack: &TemplatePack,
        record: &CharacterRecord,
        modes: ResolvedModes,
    ) -> AssembledPrompt {
        let mut prompt = AssembledPrompt::new();
        for section in &pack.sections {
            prompt.set(section.name.clone(), bind(&section.content, BindTarget::Single(record)));
        }

        for d in descriptors(self.options) {
            prompt.set(d.key(), d.describe(self.tables, record, modes.outfit));
        }
        self.set_scene_keys(&mut prompt, modes);

        debug!(
            character = %record.name,
            kind = %pack.kind,
            pose = %modes.pose,
            outfit = %modes.outfit,
            "assembled single prompt"
        );
        prompt
    }

    pub fn assemble_group(
        &self,
        pack: &TemplatePack,
        group: &GroupSelection<'_>,
        modes: ResolvedModes,
    ) -> AssembledPrompt {
        let names = join_names(&group.names());
        let mut prompt = AssembledPrompt::new();
        for section in &pack.sections {
            prompt.set(
                section.name.clone(),
                bind(&section.content, BindTarget::Group { names: &names }),
            );
        }

        for d in descriptors(self.options) {
            let fragments: Vec<String> = group
                .members()
                .iter()
                .map(|member| tag(&member.name, &d.describe(self.tables, member, modes.outfit)))
                .collect();
            prompt.set(d.key(), fragments.join(", "));
        }
        self.set_scene_keys(&mut prompt, modes);

        debug!(
            members = %names,
            kind = %pack.kind,
            pose = %modes.pose,
            outfit = %modes.outfit,
            "assembled group prompt"
        );
        prompt
    }

    fn set_scene_keys(&self, prompt: &mut AssembledPrompt, modes: ResolvedModes) {
        prompt.set(keys::POSE, self.tables.pose_phrase(modes.pose));
        prompt.set(keys::NEGATIVE, self.tables.negative_block.as_str());
    }
}

/// `"{name}, {value}"`, or just the name when the value is blank.
fn tag(name: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        name.to_string()
    } else {
        format!("{name}, {value}")
    }
}
