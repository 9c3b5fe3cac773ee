//! JSON bookmark form: an array of bookmark objects and `{folder, children}` objects.

use serde_json::{Map, Value};

use super::{ExportOptions, ForestBuilder, ImportOptions, ImportReport, RawBookmark};
use crate::bookmarks::forest::{Bookmark, Folder, Forest, NodeId, TreeNode};
use crate::error::{Result, StashError};
use crate::tags::split_tags;
use crate::types::*;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JsonBookmark {
    url: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(deserialize_with = "tags_from_list_or_string")]
    tags: Vec<String>,
    is_favorite: bool,
    /// Epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    date_added: Option<i64>,
    visit_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    favicon: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFolder {
    folder: String,
    date_added: i64,
    last_modified: i64,
    children: Vec<JsonNode>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum JsonNode {
    Folder(JsonFolder),
    Bookmark(JsonBookmark),
}

fn tags_from_list_or_string<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Joined(String),
    }
    Ok(match Option::<Tags>::deserialize(deserializer)? {
        Some(Tags::List(list)) => list,
        Some(Tags::Joined(joined)) => split_tags(&joined),
        None => Vec::new(),
    })
}

fn millis(at: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(at)
}

/// Parse a JSON bookmark array. Elements that cannot be read are skipped.
pub fn parse_json(text: &str, options: &ImportOptions) -> Result<ImportReport> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| StashError::MalformedInput(format!("Invalid JSON: {}", e)))?;
    let items = doc.as_array().ok_or_else(|| {
        StashError::MalformedInput("expected a JSON array of bookmarks and folders".into())
    })?;

    let mut builder = ForestBuilder::new(options);
    read_items(&mut builder, items, None, "")?;
    Ok(builder.finish())
}

fn read_items(
    builder: &mut ForestBuilder<'_>,
    items: &[Value],
    parent: Option<&NodeId>,
    path: &str,
) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        let location = format!("{}[{}]", path, index);
        let Some(object) = item.as_object() else {
            builder.skip(location, "expected an object".into());
            continue;
        };
        if object.contains_key("folder") {
            read_folder(builder, object, parent, location)?;
        } else {
            read_bookmark(builder, item, parent, location)?;
        }
    }
    Ok(())
}

fn read_folder(
    builder: &mut ForestBuilder<'_>,
    object: &Map<String, Value>,
    parent: Option<&NodeId>,
    location: String,
) -> Result<()> {
    let Some(name) = object.get("folder").and_then(Value::as_str) else {
        builder.skip(location, "folder name must be a string".into());
        return Ok(());
    };
    let children = match object.get("children") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(children)) => children.as_slice(),
        Some(_) => {
            builder.skip(location, "folder children must be an array".into());
            return Ok(());
        }
    };
    let added = object.get("dateAdded").and_then(Value::as_i64).and_then(millis);
    let modified = object
        .get("lastModified")
        .and_then(Value::as_i64)
        .and_then(millis);

    let id = builder.open_folder(name, parent, added, modified)?;
    read_items(builder, children, id.as_ref(), &format!("{}.children", location))
}

fn read_bookmark(
    builder: &mut ForestBuilder<'_>,
    item: &Value,
    parent: Option<&NodeId>,
    location: String,
) -> Result<()> {
    let parsed: JsonBookmark = match serde_json::from_value(item.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            builder.skip(location, e.to_string());
            return Ok(());
        }
    };
    let raw = RawBookmark {
        href: Some(parsed.url),
        title: parsed.title,
        description: parsed.description,
        tags: parsed.tags,
        added_at: parsed.date_added.and_then(millis),
        icon: parsed.favicon,
        is_favorite: parsed.is_favorite,
        visit_count: parsed.visit_count,
    };
    builder.add_bookmark(location, parent, raw)?;
    Ok(())
}

/// Render a forest as pretty JSON in document order. Round-trips through [`parse_json`].
pub fn serialize_json(forest: &Forest, options: &ExportOptions) -> Result<String> {
    let nodes: Vec<JsonNode> = if options.group_by_folder {
        forest
            .tree()
            .iter()
            .filter_map(|node| to_json_node(node, options))
            .collect()
    } else {
        forest
            .bookmarks()
            .into_iter()
            .filter(|b| options.include_uncategorized || !b.is_uncategorized())
            .map(|b| JsonNode::Bookmark(to_json_bookmark(b)))
            .collect()
    };
    serde_json::to_string_pretty(&nodes).map_err(|e| StashError::Serialization(e.to_string()))
}

fn to_json_node(node: &TreeNode<'_>, options: &ExportOptions) -> Option<JsonNode> {
    match node {
        TreeNode::Folder { folder, children } => Some(JsonNode::Folder(to_json_folder(
            folder,
            children
                .iter()
                .filter_map(|child| to_json_node(child, options))
                .collect(),
        ))),
        TreeNode::Bookmark(bookmark) => {
            if bookmark.is_uncategorized() && !options.include_uncategorized {
                None
            } else {
                Some(JsonNode::Bookmark(to_json_bookmark(bookmark)))
            }
        }
    }
}

fn to_json_folder(folder: &Folder, children: Vec<JsonNode>) -> JsonFolder {
    JsonFolder {
        folder: folder.name.clone(),
        date_added: folder.added_at.timestamp_millis(),
        last_modified: folder.modified_at.timestamp_millis(),
        children,
    }
}

fn to_json_bookmark(bookmark: &Bookmark) -> JsonBookmark {
    JsonBookmark {
        url: bookmark.url.clone(),
        title: bookmark.title.clone(),
        description: bookmark.description.clone(),
        tags: bookmark.tags.clone(),
        is_favorite: bookmark.is_favorite,
        date_added: Some(bookmark.added_at.timestamp_millis()),
        visit_count: bookmark.visit_count,
        favicon: bookmark.icon.clone(),
    }
}
