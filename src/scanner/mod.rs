//! Source file scanner
//!
//! Enumerates candidate shell sources under a root directory from the
//! configured include globs and exclude substring rules, then reads the
//! survivors into memory. Unreadable files are skipped with a warning,
//! never fatal.

use crate::models::SourceFile;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Build a matcher from include glob patterns (matched against file names).
fn build_include_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .with_context(|| format!("invalid include glob `{pattern}`"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Enumerate candidate source paths under `root`.
///
/// Returns a deduplicated, order-stable (sorted) list of paths relative to
/// `root` whose file name matches at least one include glob and whose
/// relative path contains no exclude substring. The walk respects
/// `.gitignore` and does not follow symlink loops.
pub fn scan_paths(root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let include_set = build_include_set(include)?;

    let walker = ignore::WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build();

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(name) = path.file_name() else {
            continue;
        };
        if !include_set.is_match(name) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        let rel_str = rel.to_string_lossy();
        if exclude.iter().any(|rule| rel_str.contains(rule.as_str())) {
            debug!("Excluded by rule: {}", rel_str);
            continue;
        }

        paths.push(rel.to_path_buf());
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Read scanned paths into [`SourceFile`]s. Files that cannot be read are
/// skipped with a warning.
pub fn read_sources(root: &Path, paths: &[PathBuf]) -> Vec<SourceFile> {
    paths
        .iter()
        .filter_map(|rel| {
            let full = root.join(rel);
            match std::fs::read_to_string(&full) {
                Ok(content) => Some(SourceFile {
                    path: rel.clone(),
                    lines: content.lines().map(str::to_string).collect(),
                }),
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", full.display(), e);
                    None
                }
            }
        })
        .collect()
}
