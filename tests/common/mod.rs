//! Shared helpers for integration tests.

use image::{Rgb, RgbImage};
use lopdf::{Document, Object};
use std::fs;
use std::path::{Path, PathBuf};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Writes a small real PNG so the production prober and embedder run
/// against actual image data.
pub fn write_png(path: &Path, width: u32, height: u32) -> TestResult {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let image = RgbImage::from_pixel(width, height, Rgb([180, 40, 40]));
    image.save(path)?;
    Ok(())
}

/// Lays down a screenshot at `<root>/<key>/<width>.png`, the layout
/// the capture engine produces.
pub fn shoot(root: &Path, key: &str, viewport_width: u32, px: (u32, u32)) -> TestResult {
    write_png(&root.join(key).join(format!("{viewport_width}.png")), px.0, px.1)
}

pub fn write_manifest(root: &Path, json: &str) -> TestResult {
    fs::create_dir_all(root)?;
    fs::write(root.join("sitemap.json"), json)?;
    Ok(())
}

/// All PDF files directly under the output root.
pub fn pdf_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(root)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "pdf"))
        .collect();
    files.sort();
    files
}

/// A finished document reloaded for structural assertions.
pub struct GeneratedPdf {
    document: Document,
}

impl GeneratedPdf {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let bytes = fs::read(path)?;
        let document = Document::load_mem(&bytes)?;
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// `(width, height)` of each page's media box, in page order.
    pub fn media_boxes(&self) -> Result<Vec<(f32, f32)>, Box<dyn std::error::Error>> {
        let mut boxes = Vec::new();
        for (_, page_id) in self.document.get_pages() {
            let page = self.document.get_object(page_id)?.as_dict()?;
            let media_box = page.get(b"MediaBox")?.as_array()?;
            let corner: Vec<f32> = media_box
                .iter()
                .map(Object::as_float)
                .collect::<Result<_, _>>()?;
            boxes.push((corner[2] - corner[0], corner[3] - corner[1]));
        }
        Ok(boxes)
    }
}
