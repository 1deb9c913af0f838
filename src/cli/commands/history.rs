//! History Command
//!
//! Display past predictions from the published history file.

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::output::ResultSink;
use crate::types::Result;

pub fn run(format: &str, limit: usize) -> Result<()> {
    let config = ConfigLoader::load()?;
    let sink = ResultSink::new(config.output.clone());
    let history = sink.read_history()?;

    if format == "json" {
        let shown: Vec<_> = history.iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    let out = Output::new();
    if history.is_empty() {
        out.info("No predictions recorded yet. Run 'blizzard predict' first.");
        return Ok(());
    }

    out.section(&format!(
        "Prediction history ({})",
        config.output.history_path().display()
    ));
    for entry in history.iter().take(limit) {
        let verdict = entry.prediction.as_deref().unwrap_or("(no verdict)");
        let actual = match entry.actual {
            Some(true) => " [actual: snow day]",
            Some(false) => " [actual: school open]",
            None => "",
        };
        println!("{}  {}{}", entry.id, first_line(verdict), actual);
    }

    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}
