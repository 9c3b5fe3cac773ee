use stash::error::Result;

use crate::cli::common;
use crate::cli::json_output::{ImportResponse, SkippedItem};

pub fn run(file: &str, json: bool) -> Result<()> {
    let content = common::read_input(file)?;
    let client = common::open_client()?;
    let summary = client.import_json(&content)?;

    if json {
        return common::print_json(&ImportResponse {
            imported: summary.imported,
            skipped: summary
                .skipped
                .into_iter()
                .map(|s| SkippedItem {
                    location: format!("[{}]", s.index),
                    reason: s.reason,
                })
                .collect(),
        });
    }

    for skipped in &summary.skipped {
        common::warn(&format!("entry {} skipped: {}", skipped.index, skipped.reason));
    }
    eprintln!(
        "Imported {} record(s), skipped {}.",
        summary.imported.len(),
        summary.skipped.len()
    );
    Ok(())
}
