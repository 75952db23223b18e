use crate::output::{print_json, print_quality, print_table};
use anyhow::Context;
use promptkit_core::config::Config;
use promptkit_core::{
    should_recommend_deep_mode, Mode, OptimizationResult, PatternLibrary, UniversalOptimizer,
};
use std::path::Path;

pub fn run(
    root: &Path,
    prompt: Option<&str>,
    file: Option<&Path>,
    mode: Option<Mode>,
    json: bool,
) -> anyhow::Result<()> {
    let prompt = super::read_input(prompt, file)?;
    let config = Config::load(root).context("failed to load config")?;
    let mode = mode.unwrap_or(config.optimizer.default_mode);

    let optimizer = UniversalOptimizer::with_library(PatternLibrary::from_config(&config));
    let result = optimizer.optimize(&prompt, mode);
    let recommend_deep = mode == Mode::Fast && should_recommend_deep_mode(&result);

    if json {
        print_json(&serde_json::json!({
            "result": result,
            "recommend_deep_mode": recommend_deep,
        }))?;
        return Ok(());
    }

    print_result(&result);
    if recommend_deep {
        println!();
        println!("Tip: this prompt would benefit from --mode deep.");
    }
    Ok(())
}

fn print_result(result: &OptimizationResult) {
    println!("{}", result.enhanced);
    println!();
    println!(
        "Intent: {} ({}% confidence), mode: {}, {:.1}ms",
        result.intent.primary_intent,
        result.intent.confidence,
        result.mode,
        result.processing_time_ms,
    );
    println!();
    print_quality(&result.quality);

    println!();
    if result.improvements.is_empty() {
        println!("No improvements applied.");
        return;
    }
    let rows = result
        .improvements
        .iter()
        .map(|i| {
            vec![
                i.pattern_id.clone(),
                i.improvement.impact.to_string(),
                i.improvement.dimension.to_string(),
                i.improvement.description.clone(),
            ]
        })
        .collect();
    print_table(&["PATTERN", "IMPACT", "DIMENSION", "DESCRIPTION"], rows);
}
