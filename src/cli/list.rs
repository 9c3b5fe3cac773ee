use stash::error::Result;
use stash::vault::secret::RecordView;

use crate::cli::common;
use crate::cli::json_output::{ListResponse, RecordListItem};

pub fn run(search: Option<&str>, json: bool) -> Result<()> {
    let client = common::open_client()?;

    let rows: Vec<RecordView> = client
        .list()?
        .into_iter()
        .filter(|row| match (search, row.record()) {
            (None, _) => true,
            (Some(query), Some(record)) => record.fields.matches(query),
            // Undecryptable rows only show in the unfiltered listing.
            (Some(_), None) => false,
        })
        .collect();

    if json {
        let records = rows.iter().map(RecordListItem::from).collect();
        return common::print_json(&ListResponse { records });
    }

    let mut broken = 0;
    for row in &rows {
        match row {
            RecordView::Decrypted(record) => {
                let f = &record.fields;
                if f.tags.is_empty() {
                    println!("{}  {}  {}", record.id, f.service, f.username);
                } else {
                    println!(
                        "{}  {}  {}  [{}]",
                        record.id,
                        f.service,
                        f.username,
                        f.tags.join(", ")
                    );
                }
            }
            RecordView::Undecryptable { id, reason, .. } => {
                broken += 1;
                println!("{}  <undecryptable: {}>", id, reason);
            }
        }
    }
    if broken > 0 {
        common::warn(&format!("{} record(s) could not be decrypted.", broken));
    }
    Ok(())
}
