use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use promptkit_core::config::Config;
use promptkit_core::pattern::Pattern;
use promptkit_core::{Intent, Mode, PatternLibrary, Phase};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PatternsSubcommand {
    /// List patterns; with filters, only those that would run, in run order
    List {
        /// Only patterns eligible in this mode
        #[arg(long)]
        mode: Option<Mode>,
        /// Only patterns registered for this intent
        #[arg(long)]
        intent: Option<Intent>,
        /// Only patterns registered for this phase
        #[arg(long)]
        phase: Option<Phase>,
    },

    /// Show one pattern's descriptor
    Show {
        /// Pattern id, e.g. success-criteria-enforcer
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: PatternsSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let library = PatternLibrary::from_config(&config);

    match subcmd {
        PatternsSubcommand::List {
            mode,
            intent,
            phase,
        } => list(&library, mode, intent, phase, json),
        PatternsSubcommand::Show { id } => show(&library, &id, json),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(
    library: &PatternLibrary,
    mode: Option<Mode>,
    intent: Option<Intent>,
    phase: Option<Phase>,
    json: bool,
) -> anyhow::Result<()> {
    let filtered = mode.is_some() || intent.is_some() || phase.is_some();
    let mut patterns: Vec<&Pattern> = library
        .patterns()
        .iter()
        .filter(|p| {
            let d = &p.descriptor;
            mode.map_or(true, |m| d.mode.allows(m))
                && intent.map_or(true, |i| d.applicable_intents.contains(&i))
                && phase.map_or(true, |ph| d.phases.contains(&ph))
        })
        .collect();
    if filtered {
        patterns.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    if json {
        let descriptors: Vec<_> = patterns.iter().map(|p| &p.descriptor).collect();
        return print_json(&descriptors);
    }

    if patterns.is_empty() {
        println!("No patterns match.");
        return Ok(());
    }

    let rows = patterns
        .iter()
        .map(|p| {
            let d = &p.descriptor;
            vec![
                d.id.to_string(),
                d.mode.to_string(),
                d.priority.to_string(),
                join(d.phases.iter().map(|ph| ph.as_str())),
            ]
        })
        .collect();
    print_table(&["ID", "MODE", "PRIORITY", "PHASES"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(library: &PatternLibrary, id: &str, json: bool) -> anyhow::Result<()> {
    let pattern = library.get(id)?;
    let d = &pattern.descriptor;

    if json {
        return print_json(d);
    }

    let intents = if d.applicable_intents.len() == Intent::all().len() {
        "all".to_string()
    } else {
        join(d.applicable_intents.iter().map(|i| i.as_str()))
    };
    println!("{} ({})", d.name, d.id);
    println!("{}", d.description);
    println!();
    println!("Mode:     {}", d.mode);
    println!("Priority: {}", d.priority);
    println!("Phases:   {}", join(d.phases.iter().map(|ph| ph.as_str())));
    println!("Intents:  {intents}");
    Ok(())
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}
