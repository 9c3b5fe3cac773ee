use stash::error::{Result, StashError};
use stash::vault::secret::SecretFields;

use crate::cli::common;
use crate::cli::json_output::StatusResponse;

pub struct AddArgs {
    pub service: String,
    pub username: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

pub fn run(args: AddArgs, json: bool) -> Result<()> {
    let client = common::open_client()?;

    let password = common::read_stdin()?;
    if password.is_empty() {
        return Err(StashError::InvalidRecord("no password on stdin".into()));
    }

    let mut fields = SecretFields::new(args.service, args.username, password);
    fields.url = args.url;
    fields.notes = args.notes;
    fields.tags = args.tags;

    let record = client.add(fields)?;

    if json {
        common::print_json(&StatusResponse {
            status: "added",
            id: Some(record.id.clone()),
        })?;
    } else {
        println!("{}", record.id);
    }
    eprintln!("Record for '{}' added.", record.fields.service);
    Ok(())
}
