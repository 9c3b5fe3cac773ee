//! Tag-set helpers shared by vault records and bookmarks.

/// Trim, drop empties and de-duplicate, keeping first-seen order for display.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Split a comma-separated tag attribute.
pub fn split_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}

/// Normalize a tag list whose entries may themselves hold commas. Bookmark tags
/// are written as one comma-joined attribute, so a comma can never live inside a tag.
pub fn split_tag_list<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    normalize_tags(tags.iter().flat_map(|t| t.as_ref().split(',')))
}
