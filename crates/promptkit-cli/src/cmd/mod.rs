pub mod analyze;
pub mod assess;
pub mod config;
pub mod optimize;
pub mod patterns;
pub mod prd;

use anyhow::Context;
use promptkit_core::io;
use std::io::Read;
use std::path::Path;

/// Prompt text from the positional argument, else `--file`, else stdin.
pub fn read_input(text: Option<&str>, file: Option<&Path>) -> anyhow::Result<String> {
    let body = match (text, file) {
        (Some(t), _) => t.to_string(),
        (None, Some(f)) => io::read_text(f)
            .with_context(|| format!("failed to read prompt file '{}'", f.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read prompt from stdin")?;
            buf.trim_end_matches(['\n', '\r']).to_string()
        }
    };

    if body.trim().is_empty() {
        anyhow::bail!("prompt is empty");
    }
    Ok(body)
}
