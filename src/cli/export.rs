use std::fs::OpenOptions;
use std::io::Write;

use stash::error::Result;

use crate::cli::common;

pub fn run(output: Option<&str>) -> Result<()> {
    let client = common::open_client()?;
    let export = client.export_json()?;

    common::warn("the export contains every password in plaintext. Store it securely and delete it when done.");
    if !export.undecryptable.is_empty() {
        common::warn(&format!(
            "{} record(s) could not be decrypted and were left out: {}",
            export.undecryptable.len(),
            export.undecryptable.join(", ")
        ));
    }

    match output {
        Some(path) => {
            write_private(path, &export.json)?;
            eprintln!("Exported {} record(s) to {}", export.exported, path);
        }
        None => println!("{}", export.json),
    }
    Ok(())
}

/// Write `contents` to a file only the owner can read. The mode is set at
/// creation, and tightened if the file already existed.
fn write_private(path: &str, contents: &str) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
