//! CSV sources: the character roster and template section files.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::tables::Tables;
use crate::schema::character::{AppearanceBlocks, CharacterRecord, ParseFieldError, Roster};
use crate::schema::template::{TemplatePack, TemplateSection};

/// Exact header names a character source must carry.
pub const CHARACTER_COLUMNS: [&str; 12] = [
    "Character",
    "Age_Group",
    "Gender",
    "Eye_Color",
    "Skin_Tone",
    "Body_Type",
    "Hair_Block",
    "Casual_Outfit_Block",
    "Pajamas_Block",
    "Camp_Everfree_Outfit_Block",
    "Rainbooms_Band_Outfit_Block",
    "Formal_Outfit_Block",
];

pub const TEMPLATE_COLUMNS: [&str; 2] = ["Section", "Content"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{source_name} is missing required columns: {}", .missing.join(", "))]
    Schema {
        source_name: String,
        missing: Vec<String>,
    },
    #[error("no characters loaded from {0}")]
    EmptyRoster(String),
    #[error("{source_name} row {row}: {error}")]
    InvalidValue {
        source_name: String,
        row: usize,
        error: ParseFieldError,
    },
    #[error("CSV error in {source_name}: {error}")]
    Csv {
        source_name: String,
        error: csv::Error,
    },
    #[error("IO error reading {path}: {error}")]
    Io {
        path: String,
        error: std::io::Error,
    },
}

/// Header lookup for one source.
struct Columns {
    headers: csv::StringRecord,
}

impl Columns {
    /// Fails with every missing name, sorted.
    fn require(headers: csv::StringRecord, required: &[&str], source_name: &str) -> Result<Self, LoadError> {
        let mut missing: Vec<String> = required
            .iter()
            .filter(|name| !headers.iter().any(|h| h == **name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(LoadError::Schema {
                source_name: source_name.to_string(),
                missing,
            });
        }
        Ok(Self { headers })
    }

    /// Trimmed field value; a short row yields an empty string.
    fn get<'r>(&self, row: &'r csv::StringRecord, name: &str) -> &'r str {
        self.headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| row.get(idx))
            .map(str::trim)
            .unwrap_or("")
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().flexible(true).from_reader(reader)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|error| LoadError::Io {
        path: path.display().to_string(),
        error,
    })
}

/// Read a character roster. Rows with a blank name are skipped; a later row
/// repeating an earlier name (ignoring case) is dropped with a warning.
pub fn read_roster<R: Read>(reader: R, source_name: &str) -> Result<Roster, LoadError> {
    let csv_err = |error| LoadError::Csv {
        source_name: source_name.to_string(),
        error,
    };
    let mut reader = csv_reader(reader);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let cols = Columns::require(headers, &CHARACTER_COLUMNS, source_name)?;

    let mut roster = Roster::new();
    for (idx, result) in reader.records().enumerate() {
        let row = result.map_err(csv_err)?;
        let name = cols.get(&row, "Character");
        if name.is_empty() {
            continue;
        }

        let invalid = |error| LoadError::InvalidValue {
            source_name: source_name.to_string(),
            row: idx + 1,
            error,
        };
        let record = CharacterRecord {
            name: name.to_string(),
            age_group: cols.get(&row, "Age_Group").parse().map_err(invalid)?,
            gender: cols.get(&row, "Gender").parse().map_err(invalid)?,
            eye_color: cols.get(&row, "Eye_Color").to_lowercase(),
            skin_tone: cols.get(&row, "Skin_Tone").to_lowercase(),
            body_type: cols.get(&row, "Body_Type").to_lowercase(),
            blocks: AppearanceBlocks {
                hair: cols.get(&row, "Hair_Block").to_string(),
                casual: cols.get(&row, "Casual_Outfit_Block").to_string(),
                pajamas: cols.get(&row, "Pajamas_Block").to_string(),
                camp: cols.get(&row, "Camp_Everfree_Outfit_Block").to_string(),
                band: cols.get(&row, "Rainbooms_Band_Outfit_Block").to_string(),
                formal: cols.get(&row, "Formal_Outfit_Block").to_string(),
            },
        };
        if !roster.push(record) {
            warn!(source = source_name, row = idx + 1, character = name, "duplicate character dropped");
        }
    }

    if roster.is_empty() {
        return Err(LoadError::EmptyRoster(source_name.to_string()));
    }
    info!(source = source_name, characters = roster.len(), "roster loaded");
    Ok(roster)
}

pub fn load_roster(path: &Path) -> Result<Roster, LoadError> {
    read_roster(open(path)?, &path.display().to_string())
}

/// Read `(Section, Content)` rows in file order. Blank section names are skipped.
pub fn read_template_sections<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<TemplateSection>, LoadError> {
    let csv_err = |error| LoadError::Csv {
        source_name: source_name.to_string(),
        error,
    };
    let mut reader = csv_reader(reader);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let cols = Columns::require(headers, &TEMPLATE_COLUMNS, source_name)?;

    let mut sections = Vec::new();
    for result in reader.records() {
        let row = result.map_err(csv_err)?;
        let name = cols.get(&row, "Section");
        if name.is_empty() {
            continue;
        }
        sections.push(TemplateSection::new(name, cols.get(&row, "Content")));
    }
    Ok(sections)
}

/// Load a template file and tag it with the kind inferred from its file name.
pub fn load_template_pack(path: &Path, tables: &Tables) -> Result<TemplatePack, LoadError> {
    let origin = path.display().to_string();
    let sections = read_template_sections(open(path)?, &origin)?;
    let kind = tables.infer_kind(&origin);
    info!(source = %origin, kind = %kind, sections = sections.len(), "template loaded");
    Ok(TemplatePack::new(origin, kind, sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::AgeGroup;

    const HEADER: &str = "Character,Age_Group,Gender,Eye_Color,Skin_Tone,Body_Type,Hair_Block,Casual_Outfit_Block,Pajamas_Block,Camp_Everfree_Outfit_Block,Rainbooms_Band_Outfit_Block,Formal_Outfit_Block";

    #[test]
    fn reads_and_normalizes_rows() {
        let data = format!(
            "{HEADER}\n Rarity ,Teen,Female,Blue,Light Pastel Skin,Slim Build,\"(purple hair:1.40), (curled hair:1.20)\",blouse,nightgown,camp,keytar,gown\n"
        );
        let roster = read_roster(data.as_bytes(), "chars.csv").unwrap();
        let r = roster.get("rarity").unwrap();
        assert_eq!(r.name, "Rarity");
        assert_eq!(r.age_group, AgeGroup::Teen);
        assert_eq!(r.eye_color, "blue");
        assert_eq!(r.skin_tone, "light pastel skin");
        assert_eq!(r.body_type, "slim build");
        assert_eq!(r.blocks.hair, "(purple hair:1.40), (curled hair:1.20)");
        assert_eq!(r.blocks.formal, "gown");
    }

    #[test]
    fn missing_columns_are_listed() {
        let data = "Character,Age_Group,Gender\nRarity,teen,female\n";
        let err = read_roster(data.as_bytes(), "chars.csv").unwrap_err();
        match &err {
            LoadError::Schema { missing, .. } => {
                assert_eq!(missing.len(), 9);
                assert!(missing.contains(&"Hair_Block".to_string()));
                assert!(missing.windows(2).all(|w| w[0] <= w[1]));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("chars.csv"));
        assert!(msg.contains("Eye_Color"));
    }

    #[test]
    fn blank_names_only_is_empty_roster() {
        let data = format!("{HEADER}\n,teen,female,blue,skin,slim,,,,,,\n  ,teen,female,,,,,,,,,\n");
        let err = read_roster(data.as_bytes(), "chars.csv").unwrap_err();
        assert!(matches!(err, LoadError::EmptyRoster(ref s) if s == "chars.csv"));
    }

    #[test]
    fn invalid_age_names_row_and_value() {
        let data = format!("{HEADER}\nRarity,elder,female,blue,skin,slim,,,,,,\n");
        let err = read_roster(data.as_bytes(), "chars.csv").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 1"), "{msg}");
        assert!(msg.contains("elder"), "{msg}");
    }

    #[test]
    fn duplicate_names_keep_first() {
        let data = format!(
            "{HEADER}\nRarity,teen,female,blue,skin,slim,,,,,,\nRARITY,adult,female,green,skin,slim,,,,,,\nApplejack,teen,female,green,skin,athletic,,,,,,\n"
        );
        let roster = read_roster(data.as_bytes(), "chars.csv").unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get("rarity").unwrap().eye_color, "blue");
    }

    #[test]
    fn template_sections_in_order() {
        let data = "Section,Content\nEnvironment, bedroom at night \n,ignored\nPose,\nMood,\"calm, sleepy\"\n";
        let sections = read_template_sections(data.as_bytes(), "t.csv").unwrap();
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Environment", "Pose", "Mood"]);
        assert_eq!(sections[0].content, "bedroom at night");
        assert_eq!(sections[2].content, "calm, sleepy");
    }

    #[test]
    fn template_header_required() {
        let err = read_template_sections("Name,Text\na,b\n".as_bytes(), "t.csv").unwrap_err();
        match err {
            LoadError::Schema { missing, .. } => assert_eq!(missing, vec!["Content", "Section"]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }
}
