//! Filesystem import: turn a directory of markdown files into a content group.
//!
//! Walks the directory, filters files through the configured include/exclude
//! globs, and hands the resulting file descriptors to the content-group
//! writer. Directory entries are emitted for every ancestor of an included
//! file so the explorer can render the tree.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::ImportConfig;
use crate::models::NewFile;

/// Scan `root` and build the file descriptors for a new content group.
///
/// Paths in the result are `/`-separated and rooted at `/` (e.g. a file at
/// `<root>/notes/a.md` becomes path `/notes/a.md` with parent `/notes`).
pub fn scan_directory(config: &ImportConfig, root: &Path) -> Result<Vec<NewFile>> {
    if !root.is_dir() {
        bail!("import root does not exist or is not a directory: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();
    let mut dirs = BTreeSet::new();

    let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        let content = std::fs::read_to_string(path).unwrap_or_default();
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let doc_path = format!("/{}", rel_str);
        let parent = parent_of(&doc_path);

        // Record every ancestor directory of this file.
        let mut ancestor = parent.clone();
        while !ancestor.is_empty() {
            dirs.insert(ancestor.clone());
            ancestor = parent_of(&ancestor);
        }

        files.push(NewFile {
            name,
            path: doc_path,
            parent_path: parent,
            content,
            is_directory: false,
        });
    }

    let mut entries: Vec<NewFile> = dirs
        .into_iter()
        .map(|dir| NewFile {
            name: dir.rsplit('/').next().unwrap_or("").to_string(),
            parent_path: parent_of(&dir),
            path: dir,
            content: String::new(),
            is_directory: true,
        })
        .collect();

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.path.cmp(&b.path));
    entries.extend(files);

    Ok(entries)
}

/// Parent of a `/`-rooted path; empty for top-level entries.
fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => String::new(),
        Some(idx) => path[..idx].to_string(),
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
