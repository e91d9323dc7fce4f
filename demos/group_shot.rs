//! Group Shot example: one roster, two template packs, single and group prompts.
//!
//! Builds everything in memory, prints a single prompt, a manual group and
//! two seeded random groups.
//!
//! Run with: cargo run --example group_shot

use eg_prompt_builder::core::pipeline::{GeneratedUnit, PromptEngine};
use eg_prompt_builder::core::resolver::CancelAll;
use eg_prompt_builder::io::source::{read_roster, read_template_sections};
use eg_prompt_builder::schema::template::TemplatePack;

const ROSTER: &str = "\
Character,Age_Group,Gender,Eye_Color,Skin_Tone,Body_Type,Hair_Block,Casual_Outfit_Block,Pajamas_Block,Camp_Everfree_Outfit_Block,Rainbooms_Band_Outfit_Block,Formal_Outfit_Block
Sunset Shimmer,teen,female,teal,amber pastel skin,athletic build,\"(red and yellow hair:1.50)\",\"leather jacket, purple skirt\",\"sun print pajamas\",\"camp shirt, shorts\",\"band jacket, guitar\",\"red gala dress\"
Pinkie Pie,teen,female,blue,pink pastel skin,slim build,\"(curly pink hair:1.50)\",\"balloon print top, pink skirt\",\"candy pajamas\",\"camp tee, overalls\",\"band vest, drumsticks\",\"pink party gown\"
Sweetie Belle,child,female,green,white pastel skin,petite build,\"(purple and pink hair:1.30)\",\"school uniform\",\"star pajamas\",\"camp shirt\",\"junior band shirt\",\"lilac dress\"
Rainbow Dash,teen,female,magenta,sky blue pastel skin,athletic build,\"(rainbow hair:1.50)\",\"hoodie, sports shorts\",\"lightning pajamas\",\"camp jersey, sneakers\",\"band jacket, electric guitar\",\"blue suit dress\"
";

const CAMPFIRE: &str = "\
Section,Content
Environment,\"campfire at night, [CHARACTER NAME] sitting on logs\"
Mood,\"warm, friendly\"
Steps,28
";

const GALA: &str = "\
Section,Content
Environment,\"grand ballroom, [CHARACTER NAME] under chandeliers\"
Negative_Extra,casual clothes
";

fn main() {
    let roster = read_roster(ROSTER.as_bytes(), "demo roster").expect("Failed to read roster");
    let camp = read_template_sections(CAMPFIRE.as_bytes(), "eg_template_camp_fire.csv")
        .expect("Failed to read campfire template");
    let gala = read_template_sections(GALA.as_bytes(), "eg_template_gala.csv")
        .expect("Failed to read gala template");

    let engine = PromptEngine::builder()
        .seed(2026)
        .with_roster(roster)
        .with_pack(TemplatePack::new("eg_template_camp_fire.csv", "camp", camp))
        .with_pack(TemplatePack::new("eg_template_gala.csv", "gala", gala))
        .build()
        .expect("Failed to build engine");

    let sunset = engine.roster().get("sunset shimmer").expect("Sunset Shimmer missing");
    print_unit(&engine.generate_single(sunset, &engine.packs()[0]));

    let manual = engine.generate_manual_group("Pinkie Pie, Sweetie Belle, pinkie pie", &mut CancelAll);
    for unit in &manual.units {
        print_unit(unit);
    }

    match engine.generate_random_groups(3, 2) {
        Ok(units) => units.iter().for_each(print_unit),
        Err(e) => println!("[Random groups failed: {}]", e),
    }
}

fn print_unit(unit: &GeneratedUnit) {
    println!("--- {} ---", unit.file_name);
    println!("[{} | {} | pose {} | outfit {}]",
        unit.mode,
        unit.members.join(", "),
        unit.modes.pose,
        unit.modes.outfit,
    );
    println!("MAIN:     {}", unit.rendered.main);
    println!("NEGATIVE: {}", unit.rendered.negative);
    if !unit.rendered.settings.is_empty() {
        println!("SETTINGS: {}", unit.rendered.settings.replace('\n', "; "));
    }
    println!();
}
