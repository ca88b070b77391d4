//! Directory listing module
//!
//! Enumerates a directory and renders the "Index of" page.

use chrono::{DateTime, Local};
use minijinja::{context, Environment};
use serde::Serialize;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

use crate::error::Result;

const LISTING_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Index of {{ path }}</title>
  </head>
  <body>
    <h1>Index of {{ path }}</h1>
    <table>
      <thead>
        <tr>
          <th>Name</th>
          <th>Last modified</th>
          <th>Size</th>
        </tr>
      </thead>
      <tbody>
        <tr><td colspan="3"><hr /></td></tr>
{%- if parent %}
        <tr><td colspan="3"><a href="{{ parent }}">Parent Directory</a></td></tr>
{%- endif %}
{%- for entry in entries %}
        <tr>
          <td style="text-align: right"><a href="{{ entry.href }}">{{ entry.label }}</a></td>
          <td style="text-align: right">{{ entry.modified }}</td>
          <td style="text-align: right">{{ entry.size }}</td>
        </tr>
{%- endfor %}
        <tr><td colspan="3"><hr /></td></tr>
      </tbody>
    </table>
  </body>
</html>
"#;

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    /// `None` for directories
    pub size: Option<u64>,
    pub modified: SystemTime,
}

/// A directory's children in enumeration order, plus its navigation links
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    /// Request path without its trailing slash (`/` for the root)
    pub path: String,
    /// Link to the parent directory; absent at the root
    pub parent: Option<String>,
    pub entries: Vec<DirectoryEntry>,
}

#[derive(Serialize)]
struct EntryView {
    href: String,
    label: String,
    modified: String,
    size: String,
}

/// Enumerate `dir`, stat'ing every child
///
/// A failing stat on any child fails the whole listing.
pub async fn list(dir: &Path, url_path: &str) -> Result<DirectoryListing> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;

    while let Some(child) = read_dir.next_entry().await? {
        // Follows symlinks, like a plain stat
        let meta = fs::metadata(child.path()).await?;
        let is_dir = meta.is_dir();
        entries.push(DirectoryEntry {
            name: child.file_name().to_string_lossy().into_owned(),
            is_dir,
            size: (!is_dir).then(|| meta.len()),
            modified: meta.modified().unwrap_or(UNIX_EPOCH),
        });
    }

    let path = normalize(url_path);
    Ok(DirectoryListing {
        parent: parent_link(&path),
        path,
        entries,
    })
}

/// Render the listing as a standalone HTML document
pub fn render(listing: &DirectoryListing) -> Result<String> {
    let base = listing.path.trim_end_matches('/');
    let entries: Vec<EntryView> = listing
        .entries
        .iter()
        .map(|entry| {
            let slash = if entry.is_dir { "/" } else { "" };
            EntryView {
                href: format!("{base}/{}{slash}", urlencoding::encode(&entry.name)),
                label: format!("{}{slash}", escape_html(&entry.name)),
                modified: DateTime::<Local>::from(entry.modified)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                size: entry
                    .size
                    .map_or_else(|| "-".to_string(), |size| size.to_string()),
            }
        })
        .collect();

    // Values are escaped above; the template name carries no extension so
    // minijinja leaves them untouched
    let mut env = Environment::new();
    env.add_template("listing", LISTING_TEMPLATE)?;
    let html = env.get_template("listing")?.render(context! {
        path => escape_html(&listing.path),
        parent => listing.parent.as_deref().map(escape_html),
        entries => entries,
    })?;
    Ok(html)
}

/// Strip one trailing slash, keeping `/` for the root
fn normalize(url_path: &str) -> String {
    let trimmed = url_path.strip_suffix('/').unwrap_or(url_path);
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape text placed in element content or a quoted attribute
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Parent link for a normalized path: its dirname, slash-terminated unless `/`
fn parent_link(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    let parent = match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => format!("{}/", &path[..idx]),
    };
    Some(parent)
}
