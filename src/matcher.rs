//! Correlates screenshot files back to the crawl records that
//! produced them.
//!
//! Both sides normalize to the same *path key*: a crawl URL sheds its
//! scheme and trailing slash, a screenshot path sheds the output-root
//! prefix and its `<width>.png` leaf. Matching is exact and
//! case-sensitive; the index is built once per run and shared
//! read-only by all viewport assemblies.

use shotbook_types::{PageRecord, SiteManifest};
use std::collections::HashMap;
use std::path::Path;

/// Normalizes a crawl URL into a path key: strips one `http://` or
/// `https://` scheme prefix and one trailing `/`.
pub fn normalize_loc(loc: &str) -> &str {
    let stripped = loc
        .strip_prefix("https://")
        .or_else(|| loc.strip_prefix("http://"))
        .unwrap_or(loc);
    stripped.strip_suffix('/').unwrap_or(stripped)
}

/// Derives the path key of a screenshot file: the output-root-relative
/// directory holding it, `/`-separated. Exactly one trailing segment
/// (the width-named file itself) is dropped.
pub fn path_key(file: &Path, output_root: &Path) -> Option<String> {
    let relative = file.strip_prefix(output_root).ok()?;
    let dir = relative.parent()?;
    let mut key = String::new();
    for component in dir.components() {
        let part = component.as_os_str().to_str()?;
        if !key.is_empty() {
            key.push('/');
        }
        key.push_str(part);
    }
    Some(key)
}

/// Path-key index over a site manifest with O(1) lookups.
#[derive(Debug, Default)]
pub struct PageIndex {
    by_key: HashMap<String, PageRecord>,
}

impl PageIndex {
    /// Builds the index. On key collisions the first record in
    /// manifest order wins, preserving crawl ordering semantics.
    pub fn build(manifest: &SiteManifest) -> Self {
        let mut by_key = HashMap::new();
        for page in &manifest.pages {
            by_key
                .entry(normalize_loc(&page.loc).to_string())
                .or_insert_with(|| page.clone());
        }
        Self { by_key }
    }

    pub fn lookup(&self, key: &str) -> Option<&PageRecord> {
        self.by_key.get(key)
    }

    /// Zero-or-one crawl record for a screenshot file. Zero matches is
    /// a valid outcome, not an error.
    pub fn match_screenshot(&self, file: &Path, output_root: &Path) -> Option<&PageRecord> {
        let key = path_key(file, output_root)?;
        self.lookup(&key)
    }
}
