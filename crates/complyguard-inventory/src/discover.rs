use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use walkdir::WalkDir;

/// File patterns picked up when the inventory path is a directory.
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.json"];

/// Discover inventory documents below `root`.
///
/// Behavior:
/// - Files whose path relative to `root` matches an `include` glob are returned.
/// - Hidden directories (`.git`, `.cache`, ...) are skipped.
/// - The result is sorted so that evaluation order is stable.
pub fn discover_inventory_files(
    root: &Utf8Path,
    include: &[&str],
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let include_set = build_globset(include).context("compile include globset")?;

    let mut out: Vec<Utf8PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| pathbuf_to_utf8(e.path().to_path_buf()))
        .filter(|abs| {
            let rel = abs
                .strip_prefix(root)
                .unwrap_or(abs)
                .as_str()
                .replace('\\', "/");
            include_set.is_match(&rel)
        })
        .collect();

    // Stable order.
    out.sort();
    out.dedup();

    Ok(out)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}

fn build_globset(patterns: &[&str]) -> anyhow::Result<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        b.add(Glob::new(p)?);
    }
    Ok(b.build()?)
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
