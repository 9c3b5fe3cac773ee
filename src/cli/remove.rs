use stash::error::Result;

use crate::cli::common;
use crate::cli::json_output::StatusResponse;

pub fn run(id: &str, json: bool) -> Result<()> {
    let client = common::open_client()?;
    client.remove(id)?;

    if json {
        common::print_json(&StatusResponse {
            status: "removed",
            id: Some(id.to_string()),
        })?;
    }
    eprintln!("Record '{}' removed.", id);
    Ok(())
}
