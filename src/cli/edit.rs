use stash::api::RecordUpdate;
use stash::error::{Result, StashError};

use crate::cli::common;
use crate::cli::json_output::StatusResponse;

pub struct EditArgs {
    pub service: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub clear_tags: bool,
    pub password_stdin: bool,
}

pub fn run(id: &str, args: EditArgs, json: bool) -> Result<()> {
    let client = common::open_client()?;

    let password = if args.password_stdin {
        Some(common::read_stdin()?)
    } else {
        None
    };
    let tags = if args.clear_tags {
        Some(Vec::new())
    } else if args.tags.is_empty() {
        None
    } else {
        Some(args.tags)
    };

    let update = RecordUpdate {
        service: args.service,
        username: args.username,
        password,
        url: args.url,
        notes: args.notes,
        tags,
    };
    if update.is_empty() {
        return Err(StashError::InvalidOperation(
            "nothing to change; pass at least one field".into(),
        ));
    }

    let record = client.edit(id, update)?;

    if json {
        common::print_json(&StatusResponse {
            status: "updated",
            id: Some(record.id.clone()),
        })?;
    }
    eprintln!("Record '{}' updated.", record.id);
    Ok(())
}
