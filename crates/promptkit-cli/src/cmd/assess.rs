use crate::output::{print_json, print_quality};
use promptkit_core::{Intent, IntentDetector, QualityAssessor};
use std::path::Path;

pub fn run(
    prompt: Option<&str>,
    file: Option<&Path>,
    intent: Option<Intent>,
    json: bool,
) -> anyhow::Result<()> {
    let prompt = super::read_input(prompt, file)?;
    let intent = intent.unwrap_or_else(|| IntentDetector::new().analyze(&prompt).primary_intent);
    let quality = QualityAssessor::new().assess_quality(&prompt, intent);

    if json {
        return print_json(&serde_json::json!({
            "intent": intent,
            "quality": quality,
        }));
    }

    println!("Weighted for: {intent}");
    println!();
    print_quality(&quality);
    Ok(())
}
