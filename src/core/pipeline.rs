//! The prompt pipeline: roster + template packs → rendered generation units.
//!
//! Wires together name resolution, mode selection, assembly and rendering
//! for singles, manual groups and seeded random groups.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::assembler::{AssemblyOptions, PromptAssembler};
use crate::core::render::{RenderedPrompt, Renderer};
use crate::core::resolver::{split_names, CandidatePicker, NameResolver, Resolution};
use crate::core::tables::{Tables, TablesError};
use crate::io::output::{group_file_name, single_file_name};
use crate::io::source::{load_roster, load_template_pack, LoadError};
use crate::schema::character::{CharacterRecord, OutfitMode, Roster};
use crate::schema::group::{GroupError, GroupSelection, MAX_RANDOM_GROUPS, MIN_GROUP_SIZE};
use crate::schema::mode::{GenerationMode, ModeOverrides, PoseKey, ResolvedModes};
use crate::schema::prompt::AssembledPrompt;
use crate::schema::template::TemplatePack;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("tables error: {0}")]
    Tables(#[from] TablesError),
    #[error("group error: {0}")]
    Group(#[from] GroupError),
    #[error("no template packs configured")]
    NoTemplates,
}

/// Why a requested unit was not generated. Skips are reported, not raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("no close match for '{0}'")]
    NoMatch(String),
    #[error("match for '{0}' cancelled")]
    Cancelled(String),
    #[error("{0}")]
    Group(GroupError),
}

impl SkipReason {
    fn from_resolution(resolution: &Resolution<'_>) -> Option<Self> {
        match resolution {
            Resolution::NoMatch { typed } => Some(Self::NoMatch(typed.clone())),
            Resolution::Cancelled { typed } => Some(Self::Cancelled(typed.clone())),
            Resolution::Exact(_) | Resolution::Confirmed { .. } => None,
        }
    }
}

/// One character or one group rendered against one template pack.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedUnit {
    pub mode: GenerationMode,
    /// Character name for singles, `group_manual` / `group_randNNN` for groups.
    pub scope: String,
    pub members: Vec<String>,
    pub template_kind: String,
    pub template_source: String,
    pub modes: ResolvedModes,
    pub prompt: AssembledPrompt,
    pub rendered: RenderedPrompt,
    pub file_name: String,
}

/// Units produced by a batch plus everything that was skipped on the way.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub units: Vec<GeneratedUnit>,
    pub skipped: Vec<SkipReason>,
}

impl BatchReport {
    pub fn merge(&mut self, other: BatchReport) {
        self.units.extend(other.units);
        self.skipped.extend(other.skipped);
    }

    fn skip(&mut self, reason: SkipReason) {
        warn!(reason = %reason, "generation skipped");
        self.skipped.push(reason);
    }
}

/// Random-group request: `count` groups of `size` members each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomGroups {
    pub size: usize,
    pub count: usize,
}

/// What a run should produce. Parts run in order: singles, manual, random.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub singles: bool,
    pub manual_group: Option<String>,
    pub random_groups: Option<RandomGroups>,
}

/// The top-level prompt engine. Built via `PromptEngine::builder()`.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    roster: Roster,
    packs: Vec<TemplatePack>,
    tables: Tables,
    overrides: ModeOverrides,
    options: AssemblyOptions,
    seed: u64,
}

/// Builder for constructing a `PromptEngine`.
#[derive(Debug, Default)]
pub struct PromptEngineBuilder {
    roster_csv: Option<PathBuf>,
    template_csvs: Vec<PathBuf>,
    tables_ron: Option<PathBuf>,
    /// Directly provided roster (for testing without files).
    roster: Option<Roster>,
    /// Directly provided packs, placed before any loaded from files.
    packs: Vec<TemplatePack>,
    tables: Option<Tables>,
    overrides: ModeOverrides,
    options: AssemblyOptions,
    seed: u64,
}

impl PromptEngine {
    pub fn builder() -> PromptEngineBuilder {
        PromptEngineBuilder::default()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn packs(&self) -> &[TemplatePack] {
        &self.packs
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn resolver(&self) -> NameResolver<'_> {
        NameResolver::new(&self.roster)
    }

    pub fn modes_for(&self, pack: &TemplatePack) -> ResolvedModes {
        self.tables.resolve_modes(&pack.kind, self.overrides)
    }

    fn assembler(&self) -> PromptAssembler<'_> {
        PromptAssembler::new(&self.tables).with_options(self.options)
    }

    pub fn generate_single(&self, record: &CharacterRecord, pack: &TemplatePack) -> GeneratedUnit {
        let modes = self.modes_for(pack);
        let prompt = self.assembler().assemble_single(pack, record, modes);
        let rendered = Renderer::new(&self.tables).render(&prompt);
        GeneratedUnit {
            mode: GenerationMode::Single,
            scope: record.name.clone(),
            members: vec![record.name.clone()],
            template_kind: pack.kind.clone(),
            template_source: pack.origin.clone(),
            modes,
            prompt,
            rendered,
            file_name: single_file_name(&record.name, &pack.kind),
        }
    }

    /// Every roster character against every pack, roster order first.
    pub fn generate_singles(&self) -> Vec<GeneratedUnit> {
        let units: Vec<GeneratedUnit> = self
            .roster
            .records()
            .iter()
            .flat_map(|record| self.packs.iter().map(move |pack| self.generate_single(record, pack)))
            .collect();
        info!(units = units.len(), "single prompts generated");
        units
    }

    /// One group against one pack. `label` names the output file and scope.
    pub fn generate_group(
        &self,
        group: &GroupSelection<'_>,
        pack: &TemplatePack,
        mode: GenerationMode,
        label: &str,
    ) -> GeneratedUnit {
        let modes = self.modes_for(pack);
        let prompt = self.assembler().assemble_group(pack, group, modes);
        let rendered = Renderer::new(&self.tables).render(&prompt);
        let names = group.names();
        GeneratedUnit {
            mode,
            scope: label.to_string(),
            members: names.iter().map(|n| n.to_string()).collect(),
            template_kind: pack.kind.clone(),
            template_source: pack.origin.clone(),
            modes,
            prompt,
            rendered,
            file_name: group_file_name(label, &pack.kind, &names),
        }
    }

    /// Resolve a comma/semicolon separated list of names and generate one
    /// unit per pack. Unresolved names and undersized groups become skips.
    pub fn generate_manual_group(&self, raw: &str, picker: &mut dyn CandidatePicker) -> BatchReport {
        let mut report = BatchReport::default();
        let typed = split_names(raw);
        if typed.len() < MIN_GROUP_SIZE {
            report.skip(SkipReason::Group(GroupError::Insufficient {
                members: typed.iter().map(|s| s.to_string()).collect(),
            }));
            return report;
        }

        let resolved = self.resolver().resolve_group(&typed, picker);
        for failure in &resolved.failures {
            if let Some(reason) = SkipReason::from_resolution(failure) {
                report.skip(reason);
            }
        }

        match GroupSelection::new(resolved.members) {
            Ok(group) => {
                for pack in &self.packs {
                    report.units.push(self.generate_group(
                        &group,
                        pack,
                        GenerationMode::ManualGroup,
                        "group_manual",
                    ));
                }
                info!(members = group.len(), units = report.units.len(), "manual group generated");
            }
            Err(e) => report.skip(SkipReason::Group(e)),
        }
        report
    }

    /// Draw `size` distinct members in sample order.
    pub fn sample_group(&self, rng: &mut StdRng, size: usize) -> Result<GroupSelection<'_>, GroupError> {
        self.check_group_size(size)?;
        let records = self.roster.records();
        let picked = rand::seq::index::sample(rng, records.len(), size);
        GroupSelection::new(picked.into_iter().map(|i| &records[i]))
    }

    /// `count` random groups of `size`, one unit per group per pack. A
    /// nonzero seed makes the composition of every group reproducible.
    pub fn generate_random_groups(
        &self,
        size: usize,
        count: usize,
    ) -> Result<Vec<GeneratedUnit>, GroupError> {
        self.check_random_groups(size, count)?;
        let mut rng = self.rng();
        let mut units = Vec::new();
        for i in 1..=count {
            let group = self.sample_group(&mut rng, size)?;
            let label = format!("group_rand{i:03}");
            for pack in &self.packs {
                units.push(self.generate_group(&group, pack, GenerationMode::RandomGroup, &label));
            }
        }
        info!(groups = count, size, units = units.len(), seed = self.seed, "random groups generated");
        Ok(units)
    }

    /// Run every part of `request` in order. Random-group size errors abort
    /// the run; resolution problems are reported in the returned batch.
    pub fn generate(
        &self,
        request: &RunRequest,
        picker: &mut dyn CandidatePicker,
    ) -> Result<BatchReport, PipelineError> {
        if let Some(random) = request.random_groups {
            self.check_random_groups(random.size, random.count)?;
        }

        let mut report = BatchReport::default();
        if request.singles {
            report.units.extend(self.generate_singles());
        }
        if let Some(raw) = &request.manual_group {
            report.merge(self.generate_manual_group(raw, picker));
        }
        if let Some(random) = request.random_groups {
            report
                .units
                .extend(self.generate_random_groups(random.size, random.count)?);
        }
        info!(units = report.units.len(), skipped = report.skipped.len(), "batch complete");
        Ok(report)
    }

    fn check_random_groups(&self, size: usize, count: usize) -> Result<(), GroupError> {
        if !(1..=MAX_RANDOM_GROUPS).contains(&count) {
            return Err(GroupError::InvalidCount(count));
        }
        self.check_group_size(size)
    }

    fn check_group_size(&self, size: usize) -> Result<(), GroupError> {
        if size < MIN_GROUP_SIZE {
            return Err(GroupError::InvalidSize(size));
        }
        if size > self.roster.len() {
            return Err(GroupError::Capacity {
                requested: size,
                available: self.roster.len(),
            });
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        if self.seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(self.seed)
        }
    }
}

impl PromptEngineBuilder {
    pub fn roster_csv(mut self, path: impl AsRef<Path>) -> Self {
        self.roster_csv = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn template_csv(mut self, path: impl AsRef<Path>) -> Self {
        self.template_csvs.push(path.as_ref().to_path_buf());
        self
    }

    pub fn tables_ron(mut self, path: impl AsRef<Path>) -> Self {
        self.tables_ron = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide the roster directly (for testing without files).
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn with_pack(mut self, pack: TemplatePack) -> Self {
        self.packs.push(pack);
        self
    }

    pub fn with_tables(mut self, tables: Tables) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn pose(mut self, pose: Option<PoseKey>) -> Self {
        self.overrides.pose = pose;
        self
    }

    pub fn outfit(mut self, outfit: Option<OutfitMode>) -> Self {
        self.overrides.outfit = outfit;
        self
    }

    pub fn inject_lighting(mut self, on: bool) -> Self {
        self.options.inject_lighting = on;
        self
    }

    pub fn inject_outfit(mut self, on: bool) -> Self {
        self.options.inject_outfit = on;
        self
    }

    /// Zero draws a fresh sequence on every random-group call.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<PromptEngine, PipelineError> {
        // File tables override directly provided ones
        let tables = match (&self.tables_ron, self.tables) {
            (Some(path), _) => Tables::load_from_ron(path)?,
            (None, Some(tables)) => tables,
            (None, None) => Tables::builtin().clone(),
        };

        let roster = match (&self.roster_csv, self.roster) {
            (Some(path), _) => load_roster(path)?,
            (None, Some(roster)) => roster,
            (None, None) => Roster::new(),
        };
        if roster.is_empty() {
            let source = self
                .roster_csv
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "builder".to_string());
            return Err(LoadError::EmptyRoster(source).into());
        }

        let mut packs = self.packs;
        for path in &self.template_csvs {
            packs.push(load_template_pack(path, &tables)?);
        }
        if packs.is_empty() {
            return Err(PipelineError::NoTemplates);
        }

        Ok(PromptEngine {
            roster,
            packs,
            tables,
            overrides: self.overrides,
            options: self.options,
            seed: self.seed,
        })
    }
}
