use stash::error::{Result, StashError};

use crate::cli::common;
use crate::cli::json_output::RecordResponse;

pub fn run(id: &str, field: Option<&str>, json: bool) -> Result<()> {
    let client = common::open_client()?;
    let record = client.get(id)?;

    if let Some(field) = field {
        let f = &record.fields;
        let value = match field {
            "service" => f.service.clone(),
            "username" => f.username.clone(),
            "password" => f.password.clone(),
            "url" => f.url.clone().unwrap_or_default(),
            "notes" => f.notes.clone().unwrap_or_default(),
            "tags" => f.tags.join(","),
            other => {
                return Err(StashError::InvalidOperation(format!(
                    "unknown field '{}'",
                    other
                )))
            }
        };
        print!("{}", value);
        return Ok(());
    }

    if json {
        return common::print_json(&RecordResponse::from(&record));
    }

    let f = &record.fields;
    println!("id:       {}", record.id);
    println!("service:  {}", f.service);
    println!("username: {}", f.username);
    println!("password: {}", f.password);
    if let Some(url) = &f.url {
        println!("url:      {}", url);
    }
    if let Some(notes) = &f.notes {
        println!("notes:    {}", notes);
    }
    if !f.tags.is_empty() {
        println!("tags:     {}", f.tags.join(", "));
    }
    println!("created:  {}", record.created_at.to_rfc3339());
    println!("updated:  {}", record.updated_at.to_rfc3339());
    Ok(())
}
