//! Name resolution: map user-typed names onto roster characters.
//!
//! An exact case-insensitive hit returns immediately. Otherwise the roster
//! is ranked by string similarity and the candidates are handed to a
//! [`CandidatePicker`]; a fuzzy match is never accepted without the picker
//! choosing it.

use similar::TextDiff;
use tracing::{debug, info, warn};

use crate::schema::character::{CharacterRecord, Roster};

/// Default similarity floor on a 0..1 scale.
pub const DEFAULT_CUTOFF: f64 = 0.55;
/// Default maximum number of candidates offered.
pub const DEFAULT_MAX_CANDIDATES: usize = 6;

/// A roster entry offered as a near match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub record: &'a CharacterRecord,
    pub score: f64,
}

/// The picker's answer to a candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Cancel,
    /// Index into the candidate slice.
    Candidate(usize),
}

/// Decides between fuzzy candidates. Interactive front ends block on user
/// input here; embeddings inject a fixed policy.
pub trait CandidatePicker {
    fn pick(&mut self, typed: &str, candidates: &[Candidate<'_>]) -> Pick;
}

/// Declines every fuzzy candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelAll;

impl CandidatePicker for CancelAll {
    fn pick(&mut self, _typed: &str, _candidates: &[Candidate<'_>]) -> Pick {
        Pick::Cancel
    }
}

/// Adapts a closure into a picker.
pub struct FnPicker<F>(F);

pub fn picker_fn<F>(f: F) -> FnPicker<F>
where
    F: FnMut(&str, &[Candidate<'_>]) -> Pick,
{
    FnPicker(f)
}

impl<F> CandidatePicker for FnPicker<F>
where
    F: FnMut(&str, &[Candidate<'_>]) -> Pick,
{
    fn pick(&mut self, typed: &str, candidates: &[Candidate<'_>]) -> Pick {
        (self.0)(typed, candidates)
    }
}

/// Outcome of resolving one typed name.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Exact(&'a CharacterRecord),
    /// A fuzzy candidate the picker chose.
    Confirmed {
        typed: String,
        record: &'a CharacterRecord,
    },
    /// Candidates existed but the picker declined them all.
    Cancelled { typed: String },
    /// Nothing cleared the similarity floor.
    NoMatch { typed: String },
}

impl<'a> Resolution<'a> {
    pub fn record(&self) -> Option<&'a CharacterRecord> {
        match self {
            Self::Exact(record) | Self::Confirmed { record, .. } => Some(record),
            Self::Cancelled { .. } | Self::NoMatch { .. } => None,
        }
    }
}

/// Members resolved from a list of typed names, plus the names that failed.
#[derive(Debug, Clone, Default)]
pub struct GroupResolution<'a> {
    pub members: Vec<&'a CharacterRecord>,
    pub failures: Vec<Resolution<'a>>,
}

/// Resolves typed names against a roster.
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    roster: &'a Roster,
    cutoff: f64,
    max_candidates: usize,
}

impl<'a> NameResolver<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self {
            roster,
            cutoff: DEFAULT_CUTOFF,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    pub fn exact(&self, typed: &str) -> Option<&'a CharacterRecord> {
        self.roster.get(typed)
    }

    /// Near matches for `typed`, best first, at or above the similarity floor.
    ///
    /// Compares the original-cased input against display names; ties keep
    /// roster order.
    pub fn candidates(&self, typed: &str) -> Vec<Candidate<'a>> {
        let typed = typed.trim();
        let mut ranked: Vec<Candidate<'a>> = self
            .roster
            .records()
            .iter()
            .map(|record| Candidate {
                record,
                score: sequence_ratio(typed, &record.name),
            })
            .filter(|c| c.score >= self.cutoff)
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(self.max_candidates);
        ranked
    }

    pub fn resolve(&self, typed: &str, picker: &mut dyn CandidatePicker) -> Resolution<'a> {
        let trimmed = typed.trim();
        if trimmed.is_empty() {
            return Resolution::NoMatch {
                typed: typed.to_string(),
            };
        }

        if let Some(record) = self.exact(trimmed) {
            debug!(typed = trimmed, name = %record.name, "exact name match");
            return Resolution::Exact(record);
        }

        let candidates = self.candidates(trimmed);
        if candidates.is_empty() {
            warn!(typed = trimmed, "no close matches");
            return Resolution::NoMatch {
                typed: trimmed.to_string(),
            };
        }

        match picker.pick(trimmed, &candidates) {
            Pick::Candidate(i) if i < candidates.len() => {
                let record = candidates[i].record;
                info!(typed = trimmed, name = %record.name, "fuzzy match confirmed");
                Resolution::Confirmed {
                    typed: trimmed.to_string(),
                    record,
                }
            }
            _ => {
                info!(typed = trimmed, "fuzzy match cancelled");
                Resolution::Cancelled {
                    typed: trimmed.to_string(),
                }
            }
        }
    }

    /// Resolve several names for one group. A character already selected
    /// (case-insensitive) is dropped rather than added twice.
    pub fn resolve_group<S: AsRef<str>>(
        &self,
        names: &[S],
        picker: &mut dyn CandidatePicker,
    ) -> GroupResolution<'a> {
        let mut out = GroupResolution::default();
        for name in names {
            let resolution = self.resolve(name.as_ref(), picker);
            match resolution.record() {
                Some(record) => {
                    if out.members.iter().any(|m| m.same_identity(record)) {
                        debug!(name = %record.name, "duplicate group member dropped");
                    } else {
                        out.members.push(record);
                    }
                }
                None => out.failures.push(resolution),
            }
        }
        out
    }
}

/// Matching-character ratio `2·M / (|a| + |b|)` over the two names, where
/// `M` is the number of characters in matching runs. A prefix of a longer
/// name still scores well, so "Twilight" reaches "Twilight Sparkle".
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_chars(a, b).ratio())
}

/// Split a raw group string on commas and semicolons, dropping blanks.
pub fn split_names(raw: &str) -> Vec<&str> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
