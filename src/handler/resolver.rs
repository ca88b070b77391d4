//! Content resolution module
//!
//! Maps a request path onto a filesystem entry inside the configured root.

use std::fs::Metadata;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

use crate::error::{Result, ServeError};
use crate::logger;

/// What a resolved path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Directory,
}

/// Filesystem entry addressed by a request path
#[derive(Debug, Clone)]
pub struct Resource {
    /// Absolute-or-root-relative path, always inside the root
    pub path: PathBuf,
    pub kind: ResourceKind,
    /// Size in bytes
    pub size: u64,
    pub modified: SystemTime,
    /// Lowercase extension without the dot
    pub extension: Option<String>,
}

impl Resource {
    fn from_metadata(path: PathBuf, meta: &Metadata, kind: ResourceKind) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        Self {
            size: meta.len(),
            modified: meta.modified().unwrap_or(UNIX_EPOCH),
            extension,
            kind,
            path,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == ResourceKind::Directory
    }
}

/// Resolve `url_path` (still percent-encoded) under `root`
///
/// A directory resolves to its `default_page` when that file exists and
/// directory listing is disabled; otherwise it stays a directory.
pub async fn resolve(
    root: &Path,
    url_path: &str,
    default_page: &str,
    view_dir: bool,
) -> Result<Resource> {
    let path = map_path(root, url_path)?;
    let meta = fs::metadata(&path)
        .await
        .map_err(|e| ServeError::from_lookup(e, url_path))?;

    if meta.is_file() {
        // "/file.txt/" names a directory that cannot exist
        if url_path.ends_with('/') {
            return Err(ServeError::Fault(io::Error::other(format!(
                "{} is not a directory",
                path.display()
            ))));
        }
        return Ok(Resource::from_metadata(path, &meta, ResourceKind::File));
    }

    if !meta.is_dir() {
        return Err(not_found(url_path));
    }

    if !view_dir {
        let index = path.join(default_page);
        match fs::metadata(&index).await {
            Ok(index_meta) if index_meta.is_file() => {
                return Ok(Resource::from_metadata(index, &index_meta, ResourceKind::File));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(ServeError::Fault(e)),
        }
    }

    Ok(Resource::from_metadata(path, &meta, ResourceKind::Directory))
}

/// Decode the request path and join it to `root` one component at a time
///
/// Anything that could step outside the root (`..`, a drive prefix) is
/// refused as not found.
pub fn map_path(root: &Path, url_path: &str) -> Result<PathBuf> {
    let Ok(decoded) = urlencoding::decode(url_path) else {
        logger::log_warning(&format!("Undecodable request path: {url_path}"));
        return Err(not_found(url_path));
    };

    let mut path = root.to_path_buf();
    for component in Path::new(decoded.as_ref()).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                logger::log_warning(&format!("Path traversal attempt blocked: {url_path}"));
                return Err(not_found(url_path));
            }
        }
    }
    Ok(path)
}

fn not_found(url_path: &str) -> ServeError {
    ServeError::NotFound {
        path: url_path.to_string(),
    }
}
