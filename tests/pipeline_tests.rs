//! Pipeline integration tests: roster and template CSVs to prompt files.

use eg_prompt_builder::core::pipeline::{PipelineError, PromptEngine, RandomGroups, RunRequest, SkipReason};
use eg_prompt_builder::core::resolver::CancelAll;
use eg_prompt_builder::core::tables::Tables;
use eg_prompt_builder::io::output::{export_csv, write_units};
use eg_prompt_builder::io::source::LoadError;
use eg_prompt_builder::schema::character::OutfitMode;
use eg_prompt_builder::schema::group::GroupError;
use eg_prompt_builder::schema::mode::{GenerationMode, PoseKey};

const CHARACTERS: &str = "tests/fixtures/characters.csv";
const SLEEP: &str = "tests/fixtures/eg_template_sleep.csv";
const CLASSROOM: &str = "tests/fixtures/eg_template_classroom.csv";

fn engine(seed: u64) -> PromptEngine {
    PromptEngine::builder()
        .roster_csv(CHARACTERS)
        .template_csv(SLEEP)
        .template_csv(CLASSROOM)
        .seed(seed)
        .build()
        .unwrap()
}

#[test]
fn sleep_template_round_trip() {
    let engine = engine(1);
    let twilight = engine.roster().get("twilight sparkle").unwrap();
    let unit = engine.generate_single(twilight, &engine.packs()[0]);

    assert_eq!(unit.template_kind, "sleep");
    assert_eq!(unit.modes.outfit, OutfitMode::Pajamas);
    assert_eq!(unit.modes.pose, PoseKey::Sleep);
    assert_eq!(unit.prompt.get("Height"), Some("average height"));
    assert!(unit.rendered.main.starts_with(
        "teen female, slim build, average height, skin tone, lavender pastel skin, \
         violet eyes, (lavender hair:1.50), sleeping pose, resting comfortably"
    ));
    assert_eq!(
        unit.rendered.main,
        "teen female, slim build, average height, skin tone, lavender pastel skin, \
         violet eyes, (lavender hair:1.50), sleeping pose, resting comfortably, \
         cool moonlit lighting, soft blue shadows, star print pajamas, fuzzy slippers, \
         sleepover in a cozy bedroom, Twilight Sparkle among pillows, calm, sleepy"
    );
    assert_eq!(
        unit.rendered.negative,
        format!("{}, blurry, lowres", Tables::builtin().negative_block)
    );
    assert_eq!(unit.rendered.settings, "Steps: 30\nCFG Scale: 6.5");
    assert_eq!(unit.file_name, "twilight_sparkle__sleep.txt");
}

#[test]
fn rendering_is_deterministic() {
    let a = engine(1).generate_singles();
    let b = engine(1).generate_singles();
    assert_eq!(a, b);
}

#[test]
fn height_tiers_from_roster() {
    let engine = engine(1);
    let height = |name: &str| {
        let record = engine.roster().get(name).unwrap();
        engine
            .generate_single(record, &engine.packs()[1])
            .prompt
            .get("Height")
            .map(str::to_string)
    };
    assert_eq!(height("Apple Bloom").as_deref(), Some("short height"));
    assert_eq!(height("Fluttershy").as_deref(), Some("short height"));
    assert_eq!(height("Applejack").as_deref(), Some("tall height"));
    assert_eq!(height("Principal Celestia").as_deref(), Some("tall height"));
    assert_eq!(height("Flash Sentry").as_deref(), Some("average height"));
}

#[test]
fn classroom_placeholders_bound_per_character() {
    let engine = engine(1);
    let rarity = engine.roster().get("Rarity").unwrap();
    let unit = engine.generate_single(rarity, &engine.packs()[1]);
    assert_eq!(unit.modes.pose, PoseKey::Classroom);
    assert_eq!(unit.prompt.get("Outfit_Note"), Some("white blouse, blue skirt"));
    assert_eq!(
        unit.prompt.get("Detail"),
        Some("Rarity with (purple hair:1.40), (curled hair:1.20) at a desk")
    );
    assert_eq!(unit.rendered.settings, "Sampler: DPM++ 2M Karras");
}

#[test]
fn manual_group_from_typed_names() {
    let engine = engine(1);
    let report = engine.generate_manual_group("Rarity, rarity, Applejack", &mut CancelAll);
    assert!(report.skipped.is_empty());
    assert_eq!(report.units.len(), 2);

    let unit = &report.units[0];
    assert_eq!(unit.mode, GenerationMode::ManualGroup);
    assert_eq!(unit.members, vec!["Rarity", "Applejack"]);
    assert_eq!(
        unit.prompt.get("Eye_Color"),
        Some("Rarity, blue eyes, Applejack, green eyes")
    );
    assert_eq!(unit.prompt.get("Pose"), Some("sleeping pose, resting comfortably"));
    assert_eq!(
        unit.prompt.get("Environment"),
        Some("sleepover in a cozy bedroom, Rarity, Applejack among pillows")
    );
    assert!(unit.rendered.negative.contains(&Tables::builtin().negative_block));
}

#[test]
fn group_template_does_not_leak_one_members_blocks() {
    let engine = engine(1);
    let report = engine.generate_manual_group("Rarity; Applejack", &mut CancelAll);
    let classroom = &report.units[1];
    assert_eq!(classroom.prompt.get("Outfit_Note"), Some(""));
    assert_eq!(classroom.prompt.get("Detail"), Some("Rarity, Applejack with  at a desk"));
}

#[test]
fn unmatched_name_is_skipped_not_fatal() {
    let engine = engine(1);
    let report = engine.generate_manual_group("Rarity, xyz123, Applejack", &mut CancelAll);
    assert_eq!(report.skipped, vec![SkipReason::NoMatch("xyz123".to_string())]);
    assert_eq!(report.units.len(), 2);
}

#[test]
fn every_unit_carries_negative_block() {
    let engine = engine(9);
    let request = RunRequest {
        singles: true,
        manual_group: Some("Twilight Sparkle, Fluttershy".to_string()),
        random_groups: Some(RandomGroups { size: 3, count: 2 }),
    };
    let report = engine.generate(&request, &mut CancelAll).unwrap();
    assert_eq!(report.units.len(), 7 * 2 + 2 + 2 * 2);
    for unit in &report.units {
        assert!(unit.rendered.negative.starts_with(&Tables::builtin().negative_block));
    }
}

#[test]
fn random_groups_tag_every_member() {
    let units = engine(42).generate_random_groups(4, 3).unwrap();
    assert_eq!(units.len(), 6);
    for unit in &units {
        let mut rest = unit.prompt.get("Demographics").unwrap();
        for name in &unit.members {
            let pos = rest.find(name.as_str()).unwrap();
            rest = &rest[pos + name.len()..];
        }
    }
    let again = engine(42).generate_random_groups(4, 3).unwrap();
    let members: Vec<_> = units.iter().map(|u| &u.members).collect();
    let members_again: Vec<_> = again.iter().map(|u| &u.members).collect();
    assert_eq!(members, members_again);
}

#[test]
fn oversized_random_group_is_capacity_error() {
    let err = engine(3).generate_random_groups(8, 1).unwrap_err();
    assert_eq!(
        err,
        GroupError::Capacity {
            requested: 8,
            available: 7
        }
    );
    assert!(err.to_string().contains('8'));
}

#[test]
fn missing_columns_abort_build() {
    let err = PromptEngine::builder()
        .roster_csv("tests/fixtures/bad_characters.csv")
        .template_csv(SLEEP)
        .build()
        .unwrap_err();
    match err {
        PipelineError::Load(LoadError::Schema { missing, .. }) => {
            assert!(missing.contains(&"Eye_Color".to_string()));
            assert!(missing.contains(&"Formal_Outfit_Block".to_string()));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn writes_prompt_files_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(5);
    let units = engine.generate_singles();

    let written = write_units(dir.path(), &units).unwrap();
    assert_eq!(written.len(), 14);

    let body = std::fs::read_to_string(dir.path().join("twilight_sparkle__sleep.txt")).unwrap();
    assert!(body.starts_with("MAIN PROMPT:\nteen female, slim build"));
    assert!(body.contains("\n\nNEGATIVE PROMPT:\n"));
    assert!(body.ends_with("\nSETTINGS:\nSteps: 30\nCFG Scale: 6.5\n"));

    let csv_path = dir.path().join("summary").join("prompts.csv");
    export_csv(&csv_path, &units).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "mode",
            "scope",
            "outfit_mode",
            "pose",
            "group_members",
            "template_kind",
            "template_source",
            "main_prompt",
            "negative_prompt",
            "settings",
            "output_file",
        ]
    );
    let first = reader.records().next().unwrap().unwrap();
    assert_eq!(&first[0], "single");
    assert_eq!(&first[1], "Twilight Sparkle");
    assert_eq!(&first[2], "pajamas");
    assert_eq!(&first[10], "twilight_sparkle__sleep.txt");
}
