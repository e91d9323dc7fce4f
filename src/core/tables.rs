//! Lookup tables: pose phrases, kind inference, lighting moods, negatives.
//!
//! The tables are plain data: a built-in default shared process-wide via
//! [`Tables::builtin`], or a RON file loaded once at startup. Nothing mutates
//! them after construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

use crate::schema::character::OutfitMode;
use crate::schema::mode::{ModeOverrides, PoseKey, ResolvedModes};
use crate::schema::template::DEFAULT_KIND;

#[derive(Debug, Error)]
pub enum TablesError {
    #[error("IO error reading tables from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("RON deserialization error in {path}: {source}")]
    Ron {
        path: String,
        source: ron::error::SpannedError,
    },
}

/// Maps a kind keyword to the pose and outfit it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindRule {
    pub keyword: String,
    pub pose: PoseKey,
    pub outfit: OutfitMode,
}

/// A lighting mood selected when any keyword occurs in a character's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightingRule {
    pub keywords: Vec<String>,
    pub phrase: String,
}

/// A template section rendered into the settings block as `label: value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingKey {
    pub section: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tables {
    pub pose_phrases: BTreeMap<PoseKey, String>,
    /// Used when a pose has no phrase in `pose_phrases`.
    pub fallback_pose: String,
    /// Checked in order; the first keyword found in a template name wins.
    pub kinds: Vec<KindRule>,
    pub default_pose: PoseKey,
    pub default_outfit: OutfitMode,
    pub negative_block: String,
    /// Template sections starting with this prefix extend the negative prompt.
    pub negative_prefix: String,
    /// Checked in order; first match wins.
    pub lighting: Vec<LightingRule>,
    pub default_lighting: String,
    pub settings: Vec<SettingKey>,
}

impl Default for Tables {
    fn default() -> Self {
        let pose_phrases = [
            (PoseKey::Standing, "standing pose, relaxed stance"),
            (PoseKey::Sitting, "sitting pose, relaxed posture"),
            (PoseKey::Walking, "walking pose, mid-step motion"),
            (PoseKey::Conversation, "casual conversation pose, natural gestures"),
            (PoseKey::Classroom, "seated at desk, classroom posture"),
            (PoseKey::Band, "band performance pose, dynamic stance"),
            (PoseKey::Camp, "outdoor camp activity pose"),
            (PoseKey::Sleep, "sleeping pose, resting comfortably"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

        let kinds = [
            ("sleep", PoseKey::Sleep, OutfitMode::Pajamas),
            ("classroom", PoseKey::Classroom, OutfitMode::Casual),
            ("band", PoseKey::Band, OutfitMode::Band),
            ("camp", PoseKey::Camp, OutfitMode::Camp),
            ("everfree", PoseKey::Camp, OutfitMode::Camp),
            ("outdoor", PoseKey::Standing, OutfitMode::Casual),
            ("daytime", PoseKey::Standing, OutfitMode::Casual),
            ("winter", PoseKey::Standing, OutfitMode::Casual),
            ("formal", PoseKey::Standing, OutfitMode::Formal),
            ("gala", PoseKey::Standing, OutfitMode::Formal),
        ]
        .into_iter()
        .map(|(keyword, pose, outfit)| KindRule {
            keyword: keyword.to_string(),
            pose,
            outfit,
        })
        .collect();

        let lighting = [
            (
                &["twilight", "luna", "moon", "night", "shadow"][..],
                "cool moonlit lighting, soft blue shadows",
            ),
            (
                &["sun", "celestia", "shimmer", "flare", "apple"][..],
                "warm golden hour lighting",
            ),
            (
                &["rainbow", "pinkie", "dash", "sonata", "aria", "adagio"][..],
                "bright vibrant lighting, saturated colors",
            ),
            (
                &["flutter", "rarity", "cadance", "starlight", "cloud"][..],
                "soft diffused pastel lighting",
            ),
        ]
        .into_iter()
        .map(|(keywords, phrase)| LightingRule {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            phrase: phrase.to_string(),
        })
        .collect();

        let settings = [
            ("Steps", "Steps"),
            ("CFG_Scale", "CFG Scale"),
            ("Sampler", "Sampler"),
            ("Scheduler", "Scheduler"),
            ("Resolution", "Resolution"),
            ("Clip_Skip", "Clip Skip"),
            ("Seed", "Seed"),
        ]
        .into_iter()
        .map(|(section, label)| SettingKey {
            section: section.to_string(),
            label: label.to_string(),
        })
        .collect();

        Self {
            pose_phrases,
            fallback_pose: "natural pose, relaxed posture".to_string(),
            kinds,
            default_pose: PoseKey::Standing,
            default_outfit: OutfitMode::Casual,
            negative_block: concat!(
                "duplicate characters, merged faces, shared facial features, ",
                "hair color bleeding between characters, incorrect hair colors, ",
                "mixed skin tones, blended body types, incorrect height proportions, ",
                "extra heads, extra limbs, extra arms, extra legs, extra fingers, ",
                "deformed hands, distorted anatomy"
            )
            .to_string(),
            negative_prefix: "Negative_".to_string(),
            lighting,
            default_lighting: "even natural lighting".to_string(),
            settings,
        }
    }
}

impl Tables {
    /// The built-in tables, initialised on first use.
    pub fn builtin() -> &'static Tables {
        static BUILTIN: OnceLock<Tables> = OnceLock::new();
        BUILTIN.get_or_init(Tables::default)
    }

    /// Load tables from a RON file. Missing fields take built-in values.
    pub fn load_from_ron(path: &Path) -> Result<Tables, TablesError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TablesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_ron_from(&contents, &path.display().to_string())
    }

    pub fn parse_ron(input: &str) -> Result<Tables, TablesError> {
        Self::parse_ron_from(input, "<inline>")
    }

    fn parse_ron_from(input: &str, origin: &str) -> Result<Tables, TablesError> {
        ron::from_str(input).map_err(|source| TablesError::Ron {
            path: origin.to_string(),
            source,
        })
    }

    /// Infer a template kind from its origin (usually a file path): the first
    /// kind keyword contained in the lowercased file name, else `"default"`.
    pub fn infer_kind(&self, origin: &str) -> String {
        let base = Path::new(origin)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(origin)
            .to_lowercase();
        self.kinds
            .iter()
            .find(|rule| base.contains(&rule.keyword))
            .map(|rule| rule.keyword.clone())
            .unwrap_or_else(|| DEFAULT_KIND.to_string())
    }

    /// Pose and outfit implied by a kind. Unknown kinds get the default entry.
    pub fn kind_defaults(&self, kind: &str) -> ResolvedModes {
        match self.kinds.iter().find(|rule| rule.keyword == kind) {
            Some(rule) => ResolvedModes {
                pose: rule.pose,
                outfit: rule.outfit,
            },
            None => ResolvedModes {
                pose: self.default_pose,
                outfit: self.default_outfit,
            },
        }
    }

    /// Combine explicit user choices with the kind defaults. An explicit
    /// choice always wins.
    pub fn resolve_modes(&self, kind: &str, overrides: ModeOverrides) -> ResolvedModes {
        let inferred = self.kind_defaults(kind);
        ResolvedModes {
            pose: overrides.pose.unwrap_or(inferred.pose),
            outfit: overrides.outfit.unwrap_or(inferred.outfit),
        }
    }

    pub fn pose_phrase(&self, pose: PoseKey) -> &str {
        self.pose_phrases
            .get(&pose)
            .map(String::as_str)
            .unwrap_or(self.fallback_pose.as_str())
    }

    pub fn settings_label(&self, section: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|s| s.section == section)
            .map(|s| s.label.as_str())
    }

    pub fn is_negative_section(&self, section: &str) -> bool {
        !self.negative_prefix.is_empty() && section.starts_with(&self.negative_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_kind_from_file_name() {
        let t = Tables::builtin();
        assert_eq!(t.infer_kind("templates/ultra_minimal_eg_template_sleep.csv"), "sleep");
        assert_eq!(t.infer_kind("EG_Template_Classroom.csv"), "classroom");
        assert_eq!(t.infer_kind("eg_template_camp_everfree.csv"), "camp");
        assert_eq!(t.infer_kind("eg_template_beach.csv"), "default");
    }

    #[test]
    fn infer_kind_ignores_directories() {
        let t = Tables::builtin();
        assert_eq!(t.infer_kind("sleep_packs/eg_template_winter.csv"), "winter");
    }

    #[test]
    fn kind_table_entries() {
        let t = Tables::builtin();
        let cases = [
            ("sleep", PoseKey::Sleep, OutfitMode::Pajamas),
            ("band", PoseKey::Band, OutfitMode::Band),
            ("camp", PoseKey::Camp, OutfitMode::Camp),
            ("everfree", PoseKey::Camp, OutfitMode::Camp),
            ("classroom", PoseKey::Classroom, OutfitMode::Casual),
            ("gala", PoseKey::Standing, OutfitMode::Formal),
            ("default", PoseKey::Standing, OutfitMode::Casual),
            ("no-such-kind", PoseKey::Standing, OutfitMode::Casual),
        ];
        for (kind, pose, outfit) in cases {
            assert_eq!(t.kind_defaults(kind), ResolvedModes { pose, outfit }, "kind {kind}");
        }
    }

    #[test]
    fn explicit_choice_wins() {
        let t = Tables::builtin();
        let overrides = ModeOverrides {
            pose: Some(PoseKey::Walking),
            outfit: None,
        };
        let modes = t.resolve_modes("sleep", overrides);
        assert_eq!(modes.pose, PoseKey::Walking);
        assert_eq!(modes.outfit, OutfitMode::Pajamas);

        let overrides = ModeOverrides {
            pose: None,
            outfit: Some(OutfitMode::Formal),
        };
        let modes = t.resolve_modes("sleep", overrides);
        assert_eq!(modes.pose, PoseKey::Sleep);
        assert_eq!(modes.outfit, OutfitMode::Formal);
    }

    #[test]
    fn pose_phrase_falls_back() {
        let mut t = Tables::default();
        assert_eq!(t.pose_phrase(PoseKey::Sleep), "sleeping pose, resting comfortably");
        t.pose_phrases.remove(&PoseKey::Sleep);
        assert_eq!(t.pose_phrase(PoseKey::Sleep), "natural pose, relaxed posture");
    }

    #[test]
    fn negative_sections_by_prefix() {
        let t = Tables::builtin();
        assert!(t.is_negative_section("Negative_Extra"));
        assert!(!t.is_negative_section("Negative"));
        assert!(!t.is_negative_section("Environment"));
    }

    #[test]
    fn partial_ron_keeps_builtin_values() {
        let t = Tables::parse_ron(r#"(default_lighting: "studio lighting")"#).unwrap();
        assert_eq!(t.default_lighting, "studio lighting");
        assert_eq!(t.negative_block, Tables::builtin().negative_block);
        assert_eq!(t.kinds.len(), 10);
    }

    #[test]
    fn ron_round_trip() {
        let serialized = ron::to_string(Tables::builtin()).unwrap();
        let parsed = Tables::parse_ron(&serialized).unwrap();
        assert_eq!(&parsed, Tables::builtin());
    }

    #[test]
    fn shipped_tables_match_builtin() {
        let path = std::path::PathBuf::from("data/tables.ron");
        let t = Tables::load_from_ron(&path).unwrap();
        assert_eq!(&t, Tables::builtin());
    }

    #[test]
    fn malformed_ron_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken_tables.ron");
        std::fs::write(&path, "(default_lighting: 42,").unwrap();

        let err = Tables::load_from_ron(&path).unwrap_err();
        assert!(matches!(err, TablesError::Ron { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));

        let inline = Tables::parse_ron("(kinds: nope)").unwrap_err();
        assert!(inline.to_string().contains("<inline>"));
    }
}
