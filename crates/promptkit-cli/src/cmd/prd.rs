use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use promptkit_core::config::Config;
use promptkit_core::patterns::{prd_completeness, PrdSectionStatus};
use promptkit_core::{Intent, PatternLibrary, Phase, UniversalOptimizer};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum PrdSubcommand {
    /// Run the output-generation patterns over a PRD and report gaps
    Check {
        /// PRD markdown file (reads stdin if omitted)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: PrdSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PrdSubcommand::Check { file } => check(root, file.as_deref(), json),
    }
}

fn check(root: &Path, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let document = super::read_input(None, file)?;
    let config = Config::load(root).context("failed to load config")?;
    let optimizer = UniversalOptimizer::with_library(PatternLibrary::from_config(&config));

    let report = prd_completeness(&document);
    let result = optimizer.apply_phase(
        &document,
        Phase::OutputGeneration,
        Some(Intent::PrdGeneration),
    );

    if json {
        return print_json(&serde_json::json!({
            "completeness": report,
            "result": result,
        }));
    }

    println!("Completeness: {:.1}%", report.percent);
    println!();
    let rows = report
        .sections
        .iter()
        .map(|s| {
            let status = match s.status {
                PrdSectionStatus::Present => "present",
                PrdSectionStatus::Weak => "weak",
                PrdSectionStatus::Missing => "missing",
            };
            vec![s.name.to_string(), status.to_string(), s.hits.to_string()]
        })
        .collect();
    print_table(&["SECTION", "STATUS", "HITS"], rows);

    if result.improvements.is_empty() {
        println!();
        println!("No changes suggested.");
        return Ok(());
    }

    println!();
    println!("{}", result.enhanced);
    println!();
    for i in &result.improvements {
        println!(
            "[{}] {}: {}",
            i.improvement.impact, i.pattern_id, i.improvement.description
        );
    }
    Ok(())
}
