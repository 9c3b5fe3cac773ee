//! Netscape bookmark file format, as exported by every major browser.

use std::fmt::Write as _;

use super::{ExportOptions, ForestBuilder, ImportOptions, ImportReport, RawBookmark};
use crate::bookmarks::forest::{Bookmark, Folder, Forest, NodeId, TreeNode};
use crate::error::{Result, StashError};
use crate::tags::split_tags;
use crate::types::*;

const PREAMBLE: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
";

const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        line: usize,
    },
    Close {
        name: String,
    },
    Text(String),
}

impl Token {
    fn is_open(&self, tag: &str) -> bool {
        matches!(self, Token::Open { name, .. } if name == tag)
    }

    fn is_close(&self, tag: &str) -> bool {
        matches!(self, Token::Close { name } if name == tag)
    }

    /// Tags that end any inline text run.
    fn is_structural(&self) -> bool {
        match self {
            Token::Open { name, .. } => matches!(name.as_str(), "DT" | "DL" | "DD" | "H3" | "A"),
            Token::Close { name } => name == "DL",
            Token::Text(_) => false,
        }
    }
}

fn malformed(line: usize, what: &str) -> StashError {
    StashError::MalformedInput(format!("{} at line {}", what, line))
}

/// Split the document into tags and text. Comments and declarations are dropped;
/// a `<` that does not start a tag is kept as text.
fn tokenize(text: &str) -> Result<Vec<Token>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line = 1;
    let mut text_start = 0;

    // Advance `line` over text[from..to].
    let count_lines = |from: usize, to: usize| text[from..to].matches('\n').count();

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }
        let rest = &text[pos..];
        let next = bytes.get(pos + 1).copied();

        let is_comment = rest.starts_with("<!--");
        let is_decl = !is_comment && matches!(next, Some(b'!') | Some(b'?'));
        let is_close = next == Some(b'/') && bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic);
        let is_open = next.is_some_and(|b| b.is_ascii_alphabetic());
        if !(is_comment || is_decl || is_close || is_open) {
            pos += 1;
            continue;
        }

        if text_start < pos {
            tokens.push(Token::Text(text[text_start..pos].to_string()));
        }
        line += count_lines(text_start, pos);
        let tag_line = line;

        let end = if is_comment {
            rest[4..]
                .find("-->")
                .map(|i| pos + 4 + i + 3)
                .ok_or_else(|| malformed(tag_line, "unterminated comment"))?
        } else if is_decl {
            rest.find('>')
                .map(|i| pos + i + 1)
                .ok_or_else(|| malformed(tag_line, "unterminated declaration"))?
        } else {
            let close = find_tag_end(rest).ok_or_else(|| malformed(tag_line, "unterminated tag"))?;
            let body = &rest[if is_close { 2 } else { 1 }..close];
            if is_close {
                let name = body.trim().to_ascii_uppercase();
                tokens.push(Token::Close { name });
            } else {
                let (name, attrs) = parse_tag_body(body);
                tokens.push(Token::Open {
                    name,
                    attrs,
                    line: tag_line,
                });
            }
            pos + close + 1
        };

        line += count_lines(pos, end);
        pos = end;
        text_start = end;
    }

    if text_start < bytes.len() {
        tokens.push(Token::Text(text[text_start..].to_string()));
    }
    Ok(tokens)
}

/// Offset of the `>` closing the tag at the start of `tag`, skipping quoted values.
fn find_tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in tag.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i),
            None => {}
        }
    }
    None
}

/// Tag name (uppercased) and attributes (names uppercased, values decoded).
fn parse_tag_body(body: &str) -> (String, Vec<(String, String)>) {
    let body = body.trim_end_matches('/');
    let name_end = body
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(body.len());
    let name = body[..name_end].to_ascii_uppercase();

    let mut attrs = Vec::new();
    let mut rest = &body[name_end..];
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }
        let key_end = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_ascii_uppercase();
        rest = rest[key_end..].trim_start();

        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let inner = &after_eq[1..];
                    let close = inner.find(q).unwrap_or(inner.len());
                    value = decode_entities(&inner[..close]);
                    rest = inner.get(close + 1..).unwrap_or("");
                }
                _ => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    value = decode_entities(&after_eq[..end]);
                    rest = &after_eq[end..];
                }
            }
        }
        if !key.is_empty() {
            attrs.push((key, value));
        }
    }
    (name, attrs)
}

/// Decode the named entities the format uses plus numeric references.
/// Unknown entities are left as written.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let decoded = candidate
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&candidate[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Escape user text for element content and attribute values.
///
/// Whitespace that markup collapsing would lose (line breaks, tabs, runs of
/// spaces, leading or trailing spaces) is written as numeric references.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut prev: Option<char> = None;
    while let Some(c) = chars.next() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            ' ' if prev.is_none() || prev == Some(' ') || chars.peek().is_none() => {
                out.push_str("&#32;")
            }
            _ => out.push(c),
        }
        prev = Some(c);
    }
    out
}

fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn epoch_attr(attrs: &[(String, String)], key: &str) -> Option<DateTime<Utc>> {
    attr(attrs, key)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Gather decoded text from `tokens[*i..]` until `</end>` or a structural tag.
fn collect_text(tokens: &[Token], i: &mut usize, end: Option<&str>) -> String {
    let mut text = String::new();
    while let Some(token) = tokens.get(*i) {
        if let Some(end) = end {
            if token.is_close(end) {
                *i += 1;
                break;
            }
        }
        if token.is_structural() {
            break;
        }
        if let Token::Text(t) = token {
            text.push_str(t);
        }
        *i += 1;
    }
    decode_entities(&collapse_whitespace(&text))
}

/// Markup whitespace only; encoded whitespace survives because it is decoded afterwards.
fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a bookmark HTML export into a forest.
///
/// Folders are `<H3>` headings followed by a `<DL>` block; anchors outside any
/// folder go to the default folder. Bad anchors are skipped and reported.
pub fn parse_html(text: &str, options: &ImportOptions) -> Result<ImportReport> {
    let tokens = tokenize(text)?;
    if !tokens.iter().any(|t| t.is_open("DL")) {
        return Err(StashError::MalformedInput(
            "no <DL> bookmark list found".into(),
        ));
    }

    let mut builder = ForestBuilder::new(options);
    // Each open <DL> records the folder it belongs to (None at the top or when flattened).
    let mut scopes: Vec<Option<NodeId>> = Vec::new();
    let mut pending_folder: Option<Option<NodeId>> = None;
    let mut last_bookmark: Option<NodeId> = None;

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;
        let Token::Open { name, attrs, line } = token else {
            if token.is_close("DL") {
                scopes.pop();
                pending_folder = None;
                last_bookmark = None;
            }
            continue;
        };
        let current = scopes.last().cloned().flatten();

        match name.as_str() {
            "DL" => {
                let scope = pending_folder.take().unwrap_or(current);
                scopes.push(scope);
                last_bookmark = None;
            }
            "DT" => {
                pending_folder = None;
                last_bookmark = None;
            }
            "H3" => {
                let folder_name = collect_text(&tokens, &mut i, Some("H3"));
                let id = builder.open_folder(
                    &folder_name,
                    current.as_ref(),
                    epoch_attr(attrs, "ADD_DATE"),
                    epoch_attr(attrs, "LAST_MODIFIED"),
                )?;
                pending_folder = Some(id);
                last_bookmark = None;
            }
            "A" => {
                pending_folder = None;
                let title = collect_text(&tokens, &mut i, Some("A"));
                let raw = RawBookmark {
                    href: attr(attrs, "HREF").map(str::to_string),
                    title,
                    description: None,
                    tags: attr(attrs, "TAGS").map(split_tags).unwrap_or_default(),
                    added_at: epoch_attr(attrs, "ADD_DATE"),
                    icon: attr(attrs, "ICON")
                        .or_else(|| attr(attrs, "ICON_URI"))
                        .map(str::to_string),
                    is_favorite: false,
                    visit_count: 0,
                };
                last_bookmark =
                    builder.add_bookmark(format!("line {}", line), current.as_ref(), raw)?;
            }
            "DD" => {
                let description = collect_text(&tokens, &mut i, None);
                if let Some(id) = &last_bookmark {
                    if !description.is_empty() {
                        if let Some(bookmark) = builder.forest_mut().bookmark_mut(id) {
                            bookmark.description = Some(description);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(builder.finish())
}

/// Render a forest as a bookmark HTML document in document order.
pub fn serialize_html(forest: &Forest, options: &ExportOptions) -> String {
    let mut out = String::from(PREAMBLE);
    out.push_str("<DL><p>\n");

    if options.group_by_folder {
        for node in forest.tree() {
            write_tree_node(&mut out, &node, 1, options);
        }
    } else {
        for bookmark in forest.bookmarks() {
            if bookmark.is_uncategorized() && !options.include_uncategorized {
                continue;
            }
            write_anchor(&mut out, bookmark, 1);
        }
    }

    out.push_str("</DL><p>\n");
    out
}

fn write_tree_node(out: &mut String, node: &TreeNode<'_>, depth: usize, options: &ExportOptions) {
    match node {
        TreeNode::Folder { folder, children } => {
            write_folder_open(out, folder, depth);
            for child in children {
                write_tree_node(out, child, depth + 1, options);
            }
            let _ = writeln!(out, "{}</DL><p>", INDENT.repeat(depth));
        }
        TreeNode::Bookmark(bookmark) => {
            if bookmark.is_uncategorized() && !options.include_uncategorized {
                return;
            }
            write_anchor(out, bookmark, depth);
        }
    }
}

fn write_folder_open(out: &mut String, folder: &Folder, depth: usize) {
    let indent = INDENT.repeat(depth);
    let _ = writeln!(
        out,
        "{}<DT><H3 ADD_DATE=\"{}\" LAST_MODIFIED=\"{}\">{}</H3>",
        indent,
        folder.added_at.timestamp(),
        folder.modified_at.timestamp(),
        escape_html(&folder.name)
    );
    let _ = writeln!(out, "{}<DL><p>", indent);
}

fn write_anchor(out: &mut String, bookmark: &Bookmark, depth: usize) {
    let indent = INDENT.repeat(depth);
    let _ = write!(
        out,
        "{}<DT><A HREF=\"{}\" ADD_DATE=\"{}\"",
        indent,
        escape_html(&bookmark.url),
        bookmark.added_at.timestamp()
    );
    if let Some(icon) = &bookmark.icon {
        let _ = write!(out, " ICON=\"{}\"", escape_html(icon));
    }
    if !bookmark.tags.is_empty() {
        let _ = write!(out, " TAGS=\"{}\"", escape_html(&bookmark.tags.join(",")));
    }
    let _ = writeln!(out, ">{}</A>", escape_html(&bookmark.title));
    if let Some(description) = &bookmark.description {
        let _ = writeln!(out, "{}<DD>{}", indent, escape_html(description));
    }
}
