use std::fs;
use std::path::Path;

use stash::bookmarks::{self, ExportOptions, ImportOptions, ImportReport, SkippedNode, TreeNode};
use stash::error::Result;

use crate::cli::common;
use crate::cli::json_output::{ConvertResponse, SkippedItem};
use crate::cli::{BookmarkFormat, BookmarksCommands};

pub fn run(cmd: &BookmarksCommands, json: bool) -> Result<()> {
    match cmd {
        BookmarksCommands::Convert {
            input,
            from,
            to,
            output,
            default_name,
            flat,
            no_dates,
            no_groups,
            skip_uncategorized,
        } => {
            let config = common::load_config()?;
            let mut import = config.import_options();
            if *flat {
                import.create_folders = false;
            }
            if *no_dates {
                import.preserve_dates = false;
            }
            let mut export = config.export_options();
            if *no_groups {
                export.group_by_folder = false;
            }
            if *skip_uncategorized {
                export.include_uncategorized = false;
            }
            let destination = match (output.as_deref(), *default_name) {
                (Some(path), _) => Destination::File(path.to_string()),
                (None, true) => Destination::DefaultName,
                (None, false) => Destination::Stdout,
            };
            convert(input, *from, *to, destination, &import, &export, json)
        }
        BookmarksCommands::Show { input, from } => {
            let config = common::load_config()?;
            show(input, *from, &config.import_options(), json)
        }
    }
}

/// Pick the input format from the flag, the file extension, then the content.
fn detect_format(input: &str, content: &str, explicit: Option<BookmarkFormat>) -> BookmarkFormat {
    if let Some(format) = explicit {
        return format;
    }
    let ext = Path::new(input)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html") | Some("htm") => BookmarkFormat::Html,
        Some("json") => BookmarkFormat::Json,
        _ if content.trim_start().starts_with('[') => BookmarkFormat::Json,
        _ => BookmarkFormat::Html,
    }
}

fn parse(
    input: &str,
    from: Option<BookmarkFormat>,
    options: &ImportOptions,
) -> Result<(BookmarkFormat, ImportReport)> {
    let content = common::read_input(input)?;
    let format = detect_format(input, &content, from);
    let report = match format {
        BookmarkFormat::Html => bookmarks::parse_html(&content, options)?,
        BookmarkFormat::Json => bookmarks::parse_json(&content, options)?,
    };
    Ok((format, report))
}

fn skipped_items(skipped: &[SkippedNode]) -> Vec<SkippedItem> {
    skipped
        .iter()
        .map(|s| SkippedItem {
            location: s.location.clone(),
            reason: s.reason.clone(),
        })
        .collect()
}

enum Destination {
    Stdout,
    File(String),
    /// `bookmarks_{date}.html` or `bookmarks.json` in the working directory.
    DefaultName,
}

fn convert(
    input: &str,
    from: Option<BookmarkFormat>,
    to: Option<BookmarkFormat>,
    destination: Destination,
    import: &ImportOptions,
    export: &ExportOptions,
    json: bool,
) -> Result<()> {
    let (source, report) = parse(input, from, import)?;
    let to = to.unwrap_or(match source {
        BookmarkFormat::Html => BookmarkFormat::Json,
        BookmarkFormat::Json => BookmarkFormat::Html,
    });

    let rendered = match to {
        BookmarkFormat::Html => bookmarks::serialize_html(&report.forest, export),
        BookmarkFormat::Json => bookmarks::serialize_json(&report.forest, export)?,
    };

    for skipped in &report.skipped {
        common::warn(&format!("{} skipped: {}", skipped.location, skipped.reason));
    }

    let path = match destination {
        Destination::File(path) => Some(path),
        Destination::Stdout => None,
        Destination::DefaultName => Some(match to {
            BookmarkFormat::Html => bookmarks::html_filename(chrono::Local::now().date_naive()),
            BookmarkFormat::Json => bookmarks::JSON_FILENAME.to_string(),
        }),
    };

    let Some(path) = path else {
        print!("{}", rendered);
        if !rendered.ends_with('\n') {
            println!();
        }
        return Ok(());
    };

    fs::write(&path, &rendered)?;
    let folders = report.forest.folders().len();
    let count = report.forest.bookmarks().len();
    if json {
        common::print_json(&ConvertResponse {
            output: path,
            folders,
            bookmarks: count,
            skipped: skipped_items(&report.skipped),
        })?;
    } else {
        eprintln!(
            "Wrote {} bookmark(s) in {} folder(s) to {} ({} skipped).",
            count,
            folders,
            path,
            report.skipped.len()
        );
    }
    Ok(())
}

fn show(
    input: &str,
    from: Option<BookmarkFormat>,
    options: &ImportOptions,
    json: bool,
) -> Result<()> {
    let (_, report) = parse(input, from, options)?;

    if json {
        let rendered = bookmarks::serialize_json(&report.forest, &ExportOptions::default())?;
        println!("{}", rendered);
        return Ok(());
    }

    for node in report.forest.tree() {
        print_node(&node, 0);
    }
    for skipped in &report.skipped {
        common::warn(&format!("{} skipped: {}", skipped.location, skipped.reason));
    }
    Ok(())
}

fn print_node(node: &TreeNode<'_>, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        TreeNode::Folder { folder, children } => {
            println!("{}{}/", indent, folder.name);
            for child in children {
                print_node(child, depth + 1);
            }
        }
        TreeNode::Bookmark(bookmark) => {
            if bookmark.tags.is_empty() {
                println!("{}{} <{}>", indent, bookmark.title, bookmark.url);
            } else {
                println!(
                    "{}{} <{}> [{}]",
                    indent,
                    bookmark.title,
                    bookmark.url,
                    bookmark.tags.join(", ")
                );
            }
        }
    }
}
