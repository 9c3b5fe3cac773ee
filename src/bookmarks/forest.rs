use std::fmt;

use rand::RngCore;

use super::favicon::parse_bookmark_url;
use crate::tags::split_tag_list;
use crate::error::{Result, StashError};
use crate::types::*;

/// Deepest folder nesting a forest accepts. Keeps the nested JSON form within
/// serde_json's recursion limit and bounds every recursive tree walk.
pub const MAX_FOLDER_DEPTH: usize = 60;

/// Identifier of a folder or bookmark in a [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a short unique node ID.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: NodeId,
    pub name: String,
    pub added_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    parent_id: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Folder {
    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub id: NodeId,
    /// Absolute URL, kept as written by the source.
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    /// Set semantics; insertion order is kept for display.
    pub tags: Vec<String>,
    pub added_at: DateTime<Utc>,
    pub icon: Option<String>,
    pub is_favorite: bool,
    pub visit_count: u64,
    parent_id: Option<NodeId>,
}

impl Bookmark {
    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    pub fn is_uncategorized(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Everything needed to create a bookmark; the forest assigns id and parent.
#[derive(Debug, Clone)]
pub struct BookmarkDraft {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub added_at: DateTime<Utc>,
    pub icon: Option<String>,
    pub is_favorite: bool,
    pub visit_count: u64,
}

impl BookmarkDraft {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: None,
            tags: Vec::new(),
            added_at: Utc::now(),
            icon: None,
            is_favorite: false,
            visit_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkNode {
    Folder(Folder),
    Bookmark(Bookmark),
}

impl BookmarkNode {
    pub fn id(&self) -> &NodeId {
        match self {
            BookmarkNode::Folder(f) => &f.id,
            BookmarkNode::Bookmark(b) => &b.id,
        }
    }

    pub fn parent_id(&self) -> Option<&NodeId> {
        match self {
            BookmarkNode::Folder(f) => f.parent_id.as_ref(),
            BookmarkNode::Bookmark(b) => b.parent_id.as_ref(),
        }
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            BookmarkNode::Folder(f) => f.parent_id = parent,
            BookmarkNode::Bookmark(b) => b.parent_id = parent,
        }
    }
}

/// Borrowed tree view rebuilt from the arena on demand.
#[derive(Debug)]
pub enum TreeNode<'a> {
    Folder {
        folder: &'a Folder,
        children: Vec<TreeNode<'a>>,
    },
    Bookmark(&'a Bookmark),
}

/// Folders and bookmarks stored flat by id, linked through parent/child pointers.
///
/// Top-level nodes live in `roots`; a bookmark at the top level is uncategorized.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: HashMap<NodeId, BookmarkNode>,
    roots: Vec<NodeId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: &NodeId) -> Option<&BookmarkNode> {
        self.nodes.get(id)
    }

    pub fn folder(&self, id: &NodeId) -> Option<&Folder> {
        match self.nodes.get(id) {
            Some(BookmarkNode::Folder(f)) => Some(f),
            _ => None,
        }
    }

    pub fn folder_mut(&mut self, id: &NodeId) -> Option<&mut Folder> {
        match self.nodes.get_mut(id) {
            Some(BookmarkNode::Folder(f)) => Some(f),
            _ => None,
        }
    }

    pub fn bookmark(&self, id: &NodeId) -> Option<&Bookmark> {
        match self.nodes.get(id) {
            Some(BookmarkNode::Bookmark(b)) => Some(b),
            _ => None,
        }
    }

    pub fn bookmark_mut(&mut self, id: &NodeId) -> Option<&mut Bookmark> {
        match self.nodes.get_mut(id) {
            Some(BookmarkNode::Bookmark(b)) => Some(b),
            _ => None,
        }
    }

    /// Children of a folder in order. Empty for bookmarks and unknown ids.
    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        self.folder(id).map(|f| f.children.as_slice()).unwrap_or(&[])
    }

    /// Create a folder at the end of `parent` (or at the top level).
    pub fn add_folder(&mut self, name: &str, parent: Option<&NodeId>) -> Result<NodeId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StashError::InvalidOperation(
                "folder name must not be empty".into(),
            ));
        }
        self.require_folder(parent)?;
        if self.depth(parent) >= MAX_FOLDER_DEPTH {
            return Err(StashError::InvalidOperation(format!(
                "folders cannot be nested deeper than {} levels",
                MAX_FOLDER_DEPTH
            )));
        }

        let now = Utc::now();
        let id = NodeId::generate();
        let folder = Folder {
            id: id.clone(),
            name: name.to_string(),
            added_at: now,
            modified_at: now,
            parent_id: parent.cloned(),
            children: Vec::new(),
        };
        self.nodes.insert(id.clone(), BookmarkNode::Folder(folder));
        self.attach(&id, parent);
        Ok(id)
    }

    /// Create a bookmark at the end of `parent` (or uncategorized at the top level).
    pub fn add_bookmark(&mut self, draft: BookmarkDraft, parent: Option<&NodeId>) -> Result<NodeId> {
        self.require_folder(parent)?;
        let url = draft.url.trim();
        if let Err(e) = parse_bookmark_url(url) {
            return Err(StashError::InvalidOperation(format!(
                "invalid URL {:?}: {}",
                url, e
            )));
        }

        let id = NodeId::generate();
        let bookmark = Bookmark {
            id: id.clone(),
            url: url.to_string(),
            title: draft.title,
            description: draft.description,
            tags: split_tag_list(&draft.tags),
            added_at: draft.added_at,
            icon: draft.icon,
            is_favorite: draft.is_favorite,
            visit_count: draft.visit_count,
            parent_id: parent.cloned(),
        };
        self.nodes.insert(id.clone(), BookmarkNode::Bookmark(bookmark));
        self.attach(&id, parent);
        Ok(id)
    }

    /// Sibling folder under `parent` whose name matches case-insensitively.
    pub fn find_child_folder(&self, parent: Option<&NodeId>, name: &str) -> Option<NodeId> {
        let wanted = name.trim().to_lowercase();
        let siblings = match parent {
            Some(p) => self.children(p),
            None => &self.roots,
        };
        siblings
            .iter()
            .filter_map(|id| self.folder(id))
            .find(|f| f.name.to_lowercase() == wanted)
            .map(|f| f.id.clone())
    }

    pub fn rename_folder(&mut self, id: &NodeId, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StashError::InvalidOperation(
                "folder name must not be empty".into(),
            ));
        }
        let folder = match self.nodes.get_mut(id) {
            Some(BookmarkNode::Folder(f)) => f,
            Some(BookmarkNode::Bookmark(_)) => {
                return Err(StashError::InvalidOperation(format!(
                    "{} is a bookmark, not a folder",
                    id
                )))
            }
            None => return Err(StashError::NodeNotFound(id.to_string())),
        };
        folder.name = name.to_string();
        folder.modified_at = Utc::now();
        Ok(())
    }

    /// Re-parent a node. Refuses to move a folder into itself or its own subtree.
    pub fn move_node(&mut self, id: &NodeId, new_parent: Option<&NodeId>) -> Result<()> {
        if !self.nodes.contains_key(id) {
            return Err(StashError::NodeNotFound(id.to_string()));
        }
        self.require_folder(new_parent)?;
        if let Some(target) = new_parent {
            if target == id || self.is_ancestor(id, target) {
                return Err(StashError::InvalidOperation(format!(
                    "cannot move {} into its own subtree",
                    id
                )));
            }
        }
        if self.depth(new_parent) + self.height(id) > MAX_FOLDER_DEPTH {
            return Err(StashError::InvalidOperation(format!(
                "folders cannot be nested deeper than {} levels",
                MAX_FOLDER_DEPTH
            )));
        }

        self.detach(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_parent(new_parent.cloned());
        }
        self.attach(id, new_parent);
        Ok(())
    }

    /// Delete a node and, for folders, everything beneath it. Returns how many nodes went away.
    pub fn remove(&mut self, id: &NodeId) -> Result<usize> {
        if !self.nodes.contains_key(id) {
            return Err(StashError::NodeNotFound(id.to_string()));
        }
        self.detach(id);

        let mut removed = 0;
        let mut stack = vec![id.clone()];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                removed += 1;
                if let BookmarkNode::Folder(f) = node {
                    stack.extend(f.children);
                }
            }
        }
        Ok(removed)
    }

    /// Number of folders from the top level down to and including `id`. Zero for `None`.
    pub fn depth(&self, id: Option<&NodeId>) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(node) = current.and_then(|i| self.nodes.get(i)) {
            if matches!(node, BookmarkNode::Folder(_)) {
                depth += 1;
            }
            current = node.parent_id();
        }
        depth
    }

    /// Folder levels in the subtree rooted at `id`, counting `id` itself if it is a folder.
    fn height(&self, id: &NodeId) -> usize {
        let mut max = 0;
        let mut stack = vec![(id, 1)];
        while let Some((next, level)) = stack.pop() {
            if let Some(BookmarkNode::Folder(f)) = self.nodes.get(next) {
                max = max.max(level);
                stack.extend(f.children.iter().map(|c| (c, level + 1)));
            }
        }
        max
    }

    /// Whether `ancestor` appears on the parent chain of `node`.
    pub fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent_id());
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes.get(parent).and_then(|n| n.parent_id());
        }
        false
    }

    /// All nodes, depth-first in document order.
    pub fn walk(&self) -> Vec<&BookmarkNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&NodeId> = self.roots.iter().rev().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                out.push(node);
                if let BookmarkNode::Folder(f) = node {
                    stack.extend(f.children.iter().rev());
                }
            }
        }
        out
    }

    pub fn folders(&self) -> Vec<&Folder> {
        self.walk()
            .into_iter()
            .filter_map(|n| match n {
                BookmarkNode::Folder(f) => Some(f),
                BookmarkNode::Bookmark(_) => None,
            })
            .collect()
    }

    pub fn bookmarks(&self) -> Vec<&Bookmark> {
        self.walk()
            .into_iter()
            .filter_map(|n| match n {
                BookmarkNode::Bookmark(b) => Some(b),
                BookmarkNode::Folder(_) => None,
            })
            .collect()
    }

    /// Nested view of the whole forest.
    pub fn tree(&self) -> Vec<TreeNode<'_>> {
        self.roots.iter().filter_map(|id| self.subtree(id)).collect()
    }

    fn subtree(&self, id: &NodeId) -> Option<TreeNode<'_>> {
        match self.nodes.get(id)? {
            BookmarkNode::Folder(folder) => Some(TreeNode::Folder {
                folder,
                children: folder
                    .children
                    .iter()
                    .filter_map(|c| self.subtree(c))
                    .collect(),
            }),
            BookmarkNode::Bookmark(b) => Some(TreeNode::Bookmark(b)),
        }
    }

    fn require_folder(&self, id: Option<&NodeId>) -> Result<()> {
        match id {
            None => Ok(()),
            Some(id) => match self.nodes.get(id) {
                Some(BookmarkNode::Folder(_)) => Ok(()),
                Some(BookmarkNode::Bookmark(_)) => Err(StashError::InvalidOperation(format!(
                    "{} is a bookmark and cannot hold children",
                    id
                ))),
                None => Err(StashError::NodeNotFound(id.to_string())),
            },
        }
    }

    fn attach(&mut self, id: &NodeId, parent: Option<&NodeId>) {
        match parent.and_then(|p| self.folder_mut(p)) {
            Some(folder) => folder.children.push(id.clone()),
            None => self.roots.push(id.clone()),
        }
    }

    fn detach(&mut self, id: &NodeId) {
        let parent = self.nodes.get(id).and_then(|n| n.parent_id()).cloned();
        match parent.as_ref().and_then(|p| self.folder_mut(p)) {
            Some(folder) => folder.children.retain(|c| c != id),
            None => self.roots.retain(|c| c != id),
        }
    }
}
