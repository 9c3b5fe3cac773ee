//! Bookmark interchange: the Netscape bookmark HTML microformat and a JSON form,
//! both converted to and from an in-memory [`Forest`].
//!
//! Parsers are tolerant per node: a bad entry is skipped and reported in
//! [`ImportReport::skipped`], while an unreadable document fails as a whole with
//! [`StashError::MalformedInput`](crate::error::StashError::MalformedInput).

pub mod favicon;
pub mod forest;
pub mod html;
pub mod json;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{Result, StashError};
use crate::tags::normalize_tags;
use crate::types::*;

pub use forest::{
    Bookmark, BookmarkDraft, BookmarkNode, Folder, Forest, NodeId, TreeNode, MAX_FOLDER_DEPTH,
};
pub use html::{parse_html, serialize_html};
pub use json::{parse_json, serialize_json};

pub const HTML_MIME: &str = "text/html";
pub const JSON_MIME: &str = "application/json";
pub const JSON_FILENAME: &str = "bookmarks.json";
pub const DEFAULT_FOLDER: &str = "Bookmarks Bar";

/// `bookmarks_{YYYY-MM-DD}.html`
pub fn html_filename(date: NaiveDate) -> String {
    format!("bookmarks_{}.html", date.format("%Y-%m-%d"))
}

/// Knobs for turning external bytes into a forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Rebuild the source folder hierarchy. When off, everything lands in `default_folder`.
    pub create_folders: bool,
    /// Keep the source timestamps instead of stamping the import time.
    pub preserve_dates: bool,
    /// Synthetic top-level folder for bookmarks outside any folder.
    /// `None` leaves them uncategorized.
    pub default_folder: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            create_folders: true,
            preserve_dates: true,
            default_folder: Some(DEFAULT_FOLDER.to_string()),
        }
    }
}

/// Knobs for turning a forest into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Nested folder blocks; when off a single flat list of bookmarks.
    pub group_by_folder: bool,
    /// Emit bookmarks that have no folder.
    pub include_uncategorized: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            group_by_folder: true,
            include_uncategorized: true,
        }
    }
}

/// A node the parser dropped, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNode {
    pub location: String,
    pub reason: String,
}

/// Result of a parse: the forest plus the soft warnings.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub forest: Forest,
    pub skipped: Vec<SkippedNode>,
}

/// A bookmark as read from the source, before validation.
#[derive(Debug, Default)]
pub(crate) struct RawBookmark {
    pub href: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub added_at: Option<DateTime<Utc>>,
    pub icon: Option<String>,
    pub is_favorite: bool,
    pub visit_count: u64,
}

/// Shared forest construction for both parsers: folder merging, default folder,
/// per-node validation and skip bookkeeping.
pub(crate) struct ForestBuilder<'o> {
    options: &'o ImportOptions,
    forest: Forest,
    skipped: Vec<SkippedNode>,
    default_folder: Option<NodeId>,
    now: DateTime<Utc>,
}

impl<'o> ForestBuilder<'o> {
    pub fn new(options: &'o ImportOptions) -> Self {
        Self {
            options,
            forest: Forest::new(),
            skipped: Vec::new(),
            default_folder: None,
            now: Utc::now(),
        }
    }

    pub fn forest_mut(&mut self) -> &mut Forest {
        &mut self.forest
    }

    /// Open (or merge into) a folder under `parent`. Returns `None` when folders are flattened.
    pub fn open_folder(
        &mut self,
        name: &str,
        parent: Option<&NodeId>,
        added_at: Option<DateTime<Utc>>,
        modified_at: Option<DateTime<Utc>>,
    ) -> Result<Option<NodeId>> {
        if !self.options.create_folders {
            return Ok(None);
        }
        let name = match name.trim() {
            "" => "Untitled folder",
            trimmed => trimmed,
        };
        if let Some(existing) = self.forest.find_child_folder(parent, name) {
            return Ok(Some(existing));
        }
        if self.forest.depth(parent) >= MAX_FOLDER_DEPTH {
            return Err(StashError::MalformedInput(format!(
                "folders nested deeper than {} levels",
                MAX_FOLDER_DEPTH
            )));
        }

        let id = self.forest.add_folder(name, parent)?;
        let (added, modified) = if self.options.preserve_dates {
            let added = added_at.unwrap_or(self.now);
            (added, modified_at.unwrap_or(added))
        } else {
            (self.now, self.now)
        };
        if let Some(folder) = self.forest.folder_mut(&id) {
            folder.added_at = added;
            folder.modified_at = modified;
        }
        Ok(Some(id))
    }

    /// Validate and insert a bookmark found inside `scope`. Invalid ones are skipped.
    pub fn add_bookmark(
        &mut self,
        location: String,
        scope: Option<&NodeId>,
        raw: RawBookmark,
    ) -> Result<Option<NodeId>> {
        let href = match raw.href.as_deref().map(str::trim) {
            Some(h) if !h.is_empty() => h,
            _ => {
                self.skip(location, "missing URL".to_string());
                return Ok(None);
            }
        };
        let url = match favicon::parse_bookmark_url(href) {
            Ok(url) => url,
            Err(e) => {
                self.skip(location, format!("invalid URL {:?}: {}", href, e));
                return Ok(None);
            }
        };

        let title = match raw.title.trim() {
            "" => favicon::hostname_of(&url).unwrap_or_else(|| href.to_string()),
            t => t.to_string(),
        };
        let added_at = match raw.added_at {
            Some(at) if self.options.preserve_dates => at,
            _ => self.now,
        };
        let icon = raw
            .icon
            .filter(|i| !i.trim().is_empty())
            .or_else(|| favicon::favicon_url_for(&url));

        let draft = BookmarkDraft {
            url: href.to_string(),
            title,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            tags: normalize_tags(&raw.tags),
            added_at,
            icon,
            is_favorite: raw.is_favorite,
            visit_count: raw.visit_count,
        };

        let parent = self.bookmark_parent(scope)?;
        let id = self.forest.add_bookmark(draft, parent.as_ref())?;
        Ok(Some(id))
    }

    pub fn skip(&mut self, location: String, reason: String) {
        warn!(%location, %reason, "skipping bookmark node");
        self.skipped.push(SkippedNode { location, reason });
    }

    pub fn finish(self) -> ImportReport {
        ImportReport {
            forest: self.forest,
            skipped: self.skipped,
        }
    }

    fn bookmark_parent(&mut self, scope: Option<&NodeId>) -> Result<Option<NodeId>> {
        if self.options.create_folders {
            if let Some(folder) = scope {
                return Ok(Some(folder.clone()));
            }
        }
        if let Some(id) = &self.default_folder {
            return Ok(Some(id.clone()));
        }
        let Some(name) = self.options.default_folder.clone() else {
            return Ok(None);
        };

        let id = match self.forest.find_child_folder(None, &name) {
            Some(existing) => existing,
            None => {
                let id = self.forest.add_folder(&name, None)?;
                if let Some(folder) = self.forest.folder_mut(&id) {
                    folder.added_at = self.now;
                    folder.modified_at = self.now;
                }
                id
            }
        };
        self.default_folder = Some(id.clone());
        Ok(Some(id))
    }
}
