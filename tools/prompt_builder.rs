//! Prompt builder: generate prompt files from a character roster and
//! template CSVs.
//!
//! Usage: prompt_builder --characters <csv> --template <csv>... [--mode <mode>]
//!        [--pose <pose|auto>] [--outfit <outfit|auto>] [--group "A, B"]
//!        [--group-size <n>] [--groups <n>] [--seed <n>] [--out <dir>]

use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use eg_prompt_builder::core::pipeline::{PromptEngine, RandomGroups, RunRequest};
use eg_prompt_builder::core::resolver::{CancelAll, Candidate, CandidatePicker, Pick};
use eg_prompt_builder::io::output::{export_csv, write_units};
use eg_prompt_builder::schema::character::OutfitMode;
use eg_prompt_builder::schema::group::MAX_RANDOM_GROUPS;
use eg_prompt_builder::schema::mode::PoseKey;

#[derive(Parser, Debug)]
#[command(name = "prompt_builder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Character roster CSV.
    #[arg(short, long)]
    characters: PathBuf,

    /// Template CSV; repeat for several packs.
    #[arg(short, long = "template", required = true)]
    templates: Vec<PathBuf>,

    /// Directory prompt files are written to.
    #[arg(short, long, default_value = "output")]
    out: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Mode::Singles)]
    mode: Mode,

    /// Pose key, or `auto` to follow the template kind.
    #[arg(long, default_value = "auto")]
    pose: String,

    /// Outfit key, or `auto` to follow the template kind.
    #[arg(long, default_value = "auto")]
    outfit: String,

    /// Manual group names, comma or semicolon separated.
    #[arg(short, long)]
    group: Option<String>,

    #[arg(long, default_value_t = 3)]
    group_size: usize,

    /// Number of random groups (1 to 5000).
    #[arg(
        long,
        default_value_t = 5,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_RANDOM_GROUPS as u64)
    )]
    groups: usize,

    /// Random-group seed; 0 draws a fresh sequence.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// RON file overriding the built-in lookup tables.
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Also write one summary row per prompt to this CSV.
    #[arg(long)]
    export_csv: Option<PathBuf>,

    #[arg(long)]
    no_lighting: bool,

    #[arg(long)]
    no_outfit: bool,

    /// Never prompt; fuzzy matches are declined.
    #[arg(long)]
    non_interactive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Singles,
    ManualGroup,
    RandomGroups,
    Everything,
}

/// Numbered candidate list on stdout, selection on stdin.
struct StdinPicker;

impl CandidatePicker for StdinPicker {
    fn pick(&mut self, typed: &str, candidates: &[Candidate<'_>]) -> Pick {
        println!("No exact match for '{typed}'. Did you mean:");
        for (i, c) in candidates.iter().enumerate() {
            println!("  {}. {} ({:.0}%)", i + 1, c.record.name, c.score * 100.0);
        }
        println!("  0. cancel");
        let line = match prompt_line("Choice [0]: ") {
            Ok(line) => line,
            Err(_) => return Pick::Cancel,
        };
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => Pick::Candidate(n - 1),
            _ => Pick::Cancel,
        }
    }
}

fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// `auto` (or empty) means no override.
fn parse_override<T>(raw: &str) -> Result<Option<T>, T::Err>
where
    T: FromStr,
{
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    raw.parse().map(Some)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let pose: Option<PoseKey> = parse_override(&cli.pose)?;
    let outfit: Option<OutfitMode> = parse_override(&cli.outfit)?;

    let mut builder = PromptEngine::builder()
        .roster_csv(&cli.characters)
        .pose(pose)
        .outfit(outfit)
        .inject_lighting(!cli.no_lighting)
        .inject_outfit(!cli.no_outfit)
        .seed(cli.seed);
    for path in &cli.templates {
        builder = builder.template_csv(path);
    }
    if let Some(path) = &cli.tables {
        builder = builder.tables_ron(path);
    }
    let engine = builder.build()?;

    let wants_manual = matches!(cli.mode, Mode::ManualGroup | Mode::Everything);
    let manual_group = match (&cli.group, wants_manual) {
        (Some(raw), true) => Some(raw.clone()),
        (None, true) if !cli.non_interactive => {
            let raw = prompt_line("Group names (comma separated): ")?;
            Some(raw.trim().to_string()).filter(|s| !s.is_empty())
        }
        _ => None,
    };
    if cli.mode == Mode::ManualGroup && manual_group.is_none() {
        return Err("manual-group mode needs --group names".into());
    }

    let request = RunRequest {
        singles: matches!(cli.mode, Mode::Singles | Mode::Everything),
        manual_group,
        random_groups: matches!(cli.mode, Mode::RandomGroups | Mode::Everything).then_some(
            RandomGroups {
                size: cli.group_size,
                count: cli.groups,
            },
        ),
    };

    let report = if cli.non_interactive {
        engine.generate(&request, &mut CancelAll)?
    } else {
        engine.generate(&request, &mut StdinPicker)?
    };

    let written = write_units(&cli.out, &report.units)?;
    if let Some(path) = &cli.export_csv {
        export_csv(path, &report.units)?;
    }

    println!("Wrote {} prompt files to {}", written.len(), cli.out.display());
    if !report.skipped.is_empty() {
        println!("Skipped {}:", report.skipped.len());
        for reason in &report.skipped {
            println!("  - {reason}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
