//! Screenshot discovery for one viewport.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds every screenshot belonging to a viewport width, anywhere
/// under the output root.
///
/// Screenshots are named `<width>.png` by the capture engine; nothing
/// else counts. The traversal is sorted so the returned order (and
/// with it, report page order) is reproducible across runs. An empty
/// result is meaningful — it tells the orchestrator to skip the
/// viewport — so missing or unreadable directories yield an empty
/// vector rather than an error.
pub fn locate_screenshots(output_root: &Path, width: u32) -> Vec<PathBuf> {
    let file_name = format!("{width}.png");
    WalkDir::new(output_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_str() == Some(file_name.as_str()))
        .map(|entry| entry.into_path())
        .collect()
}
