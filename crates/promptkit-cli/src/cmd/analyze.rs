use crate::output::print_json;
use promptkit_core::IntentDetector;
use std::path::Path;

pub fn run(prompt: Option<&str>, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let prompt = super::read_input(prompt, file)?;
    let intent = IntentDetector::new().analyze(&prompt);

    if json {
        return print_json(&intent);
    }

    let c = &intent.characteristics;
    let rows = [
        ("Intent", intent.primary_intent.to_string()),
        ("Confidence", format!("{}%", intent.confidence)),
        ("Suggested mode", intent.suggested_mode.to_string()),
        ("Code context", yes_no(c.has_code_context).to_string()),
        ("Technical", yes_no(c.has_technical_terms).to_string()),
        ("Open-ended", yes_no(c.is_open_ended).to_string()),
        ("Needs structure", yes_no(c.needs_structure).to_string()),
    ];
    for (label, value) in rows {
        println!("{:<16} {value}", format!("{label}:"));
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
