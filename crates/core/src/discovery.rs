//! File discovery with gitignore-aware filtering
//!
//! Uses the `ignore` crate (from ripgrep) to respect `.gitignore`, `.ignore`
//! and `.git/info/exclude`, plus the `[ignore] paths` patterns from config.

use anyhow::Result;
use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Compile config ignore patterns into override globs rooted at `root`.
///
/// The `ignore` crate uses gitignore syntax for overrides, where `!` turns a
/// glob into an exclude. Directory patterns like `vendor/` exclude that
/// directory at any depth.
pub fn ignore_overrides(root: &Path, ignore_patterns: &[String]) -> Result<Override> {
    let mut overrides = OverrideBuilder::new(root);
    for pattern in ignore_patterns {
        let pattern = pattern.trim_start_matches('/');
        if pattern.ends_with('/') {
            overrides.add(&format!("!{}**", pattern))?;
            overrides.add(&format!("!**/{}**", pattern))?;
        } else {
            overrides.add(&format!("!{}", pattern))?;
        }
    }
    Ok(overrides.build()?)
}

/// Filter for paths that do not come from a directory walk (git blobs)
pub struct PathFilter {
    root: PathBuf,
    overrides: Override,
}

impl PathFilter {
    pub fn new(root: &Path, ignore_patterns: &[String]) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            overrides: ignore_overrides(root, ignore_patterns)?,
        })
    }

    /// Whether a `/`-separated path relative to the root is excluded
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.overrides
            .matched(self.root.join(rel_path), false)
            .is_ignore()
    }
}

/// Discover files under `root` matching any of the given `extensions`,
/// respecting `.gitignore` and skipping paths that match `ignore_patterns`.
///
/// Returns absolute paths sorted alphabetically.
pub fn discover_files(
    root: &Path,
    extensions: &[&str],
    ignore_patterns: &[String],
) -> Result<Vec<PathBuf>> {
    let root = root.canonicalize()?;

    let mut builder = WalkBuilder::new(&root);
    builder
        .hidden(true) // skip hidden files/dirs
        .git_ignore(true) // respect .gitignore
        .git_global(true) // respect global gitignore
        .git_exclude(true); // respect .git/info/exclude

    if !ignore_patterns.is_empty() {
        builder.overrides(ignore_overrides(&root, ignore_patterns)?);
    }

    let mut files = Vec::new();

    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue, // skip unreadable entries
        };

        // Only collect files, not directories
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.into_path();
        if has_supported_extension(&path, extensions) {
            if path.is_absolute() {
                files.push(path);
            } else {
                files.push(root.join(path));
            }
        }
    }

    files.sort();
    Ok(files)
}

pub fn has_supported_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e,
        None => return false,
    };
    let with_dot = format!(".{}", ext);
    extensions.contains(&with_dot.as_str())
}
