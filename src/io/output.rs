//! Output files: per-unit prompt text files and the consolidated CSV export.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::core::pipeline::GeneratedUnit;
use crate::core::render::RenderedPrompt;

/// Joined group names are cut to this many characters before slugging.
pub const GROUP_SLUG_CHARS: usize = 120;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error writing {path}: {error}")]
    Io {
        path: String,
        error: std::io::Error,
    },
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}

/// Lowercase, keep word characters, collapse separators to `_`.
pub fn slugify(s: &str) -> String {
    let mut out = String::new();
    let mut pending_sep = false;
    for c in s.trim().to_lowercase().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_sep = true;
        } else if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        }
    }
    if out.is_empty() {
        "item".to_string()
    } else {
        out
    }
}

pub fn single_file_name(name: &str, kind: &str) -> String {
    format!("{}__{}.txt", slugify(name), kind)
}

/// `label` is `group_manual` or `group_randNNN`.
pub fn group_file_name<S: AsRef<str>>(label: &str, kind: &str, names: &[S]) -> String {
    let joined = names
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join("_");
    let capped: String = joined.chars().take(GROUP_SLUG_CHARS).collect();
    format!("{label}__{kind}__{}.txt", slugify(&capped))
}

/// The text artifact for one unit.
pub fn format_prompt_file(rendered: &RenderedPrompt) -> String {
    let mut out = format!(
        "MAIN PROMPT:\n{}\n\nNEGATIVE PROMPT:\n{}\n",
        rendered.main, rendered.negative
    );
    if !rendered.settings.is_empty() {
        out.push_str(&format!("\nSETTINGS:\n{}\n", rendered.settings));
    }
    out
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> OutputError + '_ {
    move |error| OutputError::Io {
        path: path.display().to_string(),
        error,
    }
}

/// Write every unit into `dir`, creating it if needed. Returns written paths.
pub fn write_units(dir: &Path, units: &[GeneratedUnit]) -> Result<Vec<PathBuf>, OutputError> {
    fs::create_dir_all(dir).map_err(io_err(dir))?;
    let mut written = Vec::with_capacity(units.len());
    for unit in units {
        let path = dir.join(&unit.file_name);
        fs::write(&path, format_prompt_file(&unit.rendered)).map_err(io_err(&path))?;
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "prompt files written");
    Ok(written)
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    mode: &'a str,
    scope: &'a str,
    outfit_mode: &'a str,
    pose: &'a str,
    group_members: String,
    template_kind: &'a str,
    template_source: &'a str,
    main_prompt: &'a str,
    negative_prompt: &'a str,
    settings: &'a str,
    output_file: &'a str,
}

impl<'a> From<&'a GeneratedUnit> for ExportRow<'a> {
    fn from(unit: &'a GeneratedUnit) -> Self {
        Self {
            mode: unit.mode.name(),
            scope: &unit.scope,
            outfit_mode: unit.modes.outfit.name(),
            pose: unit.modes.pose.name(),
            group_members: unit.members.join(" | "),
            template_kind: &unit.template_kind,
            template_source: &unit.template_source,
            main_prompt: &unit.rendered.main,
            negative_prompt: &unit.rendered.negative,
            settings: &unit.rendered.settings,
            output_file: &unit.file_name,
        }
    }
}

/// One CSV row per unit.
pub fn export_csv(path: &Path, units: &[GeneratedUnit]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for unit in units {
        writer.serialize(ExportRow::from(unit))?;
    }
    writer.flush().map_err(io_err(path))?;
    info!(path = %path.display(), rows = units.len(), "summary exported");
    Ok(())
}
