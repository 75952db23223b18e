use promptkit_core::QualityMetrics;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// One row per dimension plus the weighted overall score.
pub fn print_quality(quality: &QualityMetrics) {
    let rows = [
        ("clarity", quality.clarity),
        ("efficiency", quality.efficiency),
        ("structure", quality.structure),
        ("completeness", quality.completeness),
        ("actionability", quality.actionability),
        ("overall", quality.overall),
    ]
    .into_iter()
    .map(|(name, score)| vec![name.to_string(), format!("{score:.1}")])
    .collect();
    print_table(&["DIMENSION", "SCORE"], rows);
}
