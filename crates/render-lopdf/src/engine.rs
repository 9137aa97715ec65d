use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use shotbook_traits::{DocumentEngine, DocumentSink, FieldColor, SinkError};
use shotbook_types::{PageMargins, PixelDims};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// US Letter, portrait. The cover page does not depend on any
/// screenshot, so it uses a fixed paper size.
const COVER_PAGE_DIMS: (f32, f32) = (612.0, 792.0);

const LABEL_FONT_SIZE: f32 = 30.0;
const VALUE_FONT_SIZE: f32 = 20.0;
/// Line height multiplier applied to the font size.
const LINE_SPACING: f32 = 1.25;
/// Coarse Helvetica advance estimate used for wrapping, in ems.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Factory for [`LopdfDocumentSink`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfEngine;

impl LopdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentEngine for LopdfEngine {
    type Sink = LopdfDocumentSink;

    fn create(&self, path: &Path, title: &str) -> Result<Self::Sink, SinkError> {
        LopdfDocumentSink::create(path, title)
    }
}

struct PageInProgress {
    width: f32,
    height: f32,
    margins: PageMargins,
    content: Content,
    /// Text cursor, measured from the page top.
    cursor_y: f32,
}

impl PageInProgress {
    fn new(width: f32, height: f32, margins: PageMargins) -> Self {
        Self {
            width,
            height,
            margins,
            content: Content { operations: vec![] },
            cursor_y: margins.top,
        }
    }
}

/// A PDF report document being written with `lopdf`.
///
/// The object graph is built in memory; nothing reaches the target
/// file until [`DocumentSink::finish`], which writes, flushes, and
/// syncs in one pass. A sink dropped before `finish` removes its
/// target file so no partial document is left behind.
pub struct LopdfDocumentSink {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    font_id: ObjectId,
    page_ids: Vec<ObjectId>,
    xobjects: Vec<(String, ObjectId)>,
    current: Option<PageInProgress>,
    file: Option<File>,
    path: PathBuf,
    title: String,
    finished: bool,
}

impl LopdfDocumentSink {
    fn create(path: &Path, title: &str) -> Result<Self, SinkError> {
        // Claim the target up front so permission problems surface
        // before any assembly work is done.
        let file = File::create(path).map_err(|e| SinkError::Create {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let (cover_w, cover_h) = COVER_PAGE_DIMS;
        Ok(Self {
            document,
            pages_id,
            resources_id,
            font_id,
            page_ids: Vec::new(),
            xobjects: Vec::new(),
            current: Some(PageInProgress::new(cover_w, cover_h, PageMargins::cover())),
            file: Some(file),
            path: path.to_path_buf(),
            title: title.to_string(),
            finished: false,
        })
    }

    /// Encode the in-progress page (if any) into a compressed content
    /// stream and append its page object.
    fn flush_current_page(&mut self) -> Result<(), SinkError> {
        let Some(page) = self.current.take() else {
            return Ok(());
        };
        let encoded = page
            .content
            .encode()
            .map_err(|e| SinkError::Encode(e.to_string()))?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&encoded)?;
        let compressed = encoder.finish()?;
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {"Filter" => "FlateDecode"}, compressed));
        self.push_page_object(page.width, page.height, content_id);
        Ok(())
    }

    fn push_page_object(&mut self, width: f32, height: f32, content_id: ObjectId) {
        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
    }

    /// Decode a screenshot and register it as an RGB image XObject.
    fn add_image_xobject(&mut self, image_path: &Path) -> Result<(String, PixelDims), SinkError> {
        let read_err = |message: String| SinkError::ImageRead {
            path: image_path.display().to_string(),
            message,
        };
        let bytes = std::fs::read(image_path).map_err(|e| read_err(e.to_string()))?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| read_err(e.to_string()))?;
        let rgb = decoded.to_rgb8();
        let dims = PixelDims::new(rgb.width(), rgb.height());

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(rgb.as_raw())?;
        let data = encoder.finish()?;

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => dims.width as i64,
                "Height" => dims.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            data,
        );
        let xobj_id = self.document.add_object(stream);
        let name = format!("Im{}", self.xobjects.len() + 1);
        self.xobjects.push((name.clone(), xobj_id));
        Ok((name, dims))
    }

    fn write_line(page: &mut PageInProgress, text: &str, size: f32, color: (f32, f32, f32)) {
        let ops = &mut page.content.operations;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
        ops.push(Operation::new(
            "rg",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
        let baseline_y = page.cursor_y + size * 0.8;
        let pdf_y = page.height - baseline_y;
        ops.push(Operation::new(
            "Td",
            vec![page.margins.left.into(), pdf_y.into()],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(text.to_string())],
        ));
        ops.push(Operation::new("ET", vec![]));
        page.cursor_y += size * LINE_SPACING;
    }

    /// Greedy word wrap against an estimated glyph advance. Tokens
    /// longer than a line (URLs, mostly) are hard-split.
    fn wrap_text(text: &str, size: f32, content_width: f32) -> Vec<String> {
        let max_chars = ((content_width / (size * AVG_GLYPH_WIDTH)) as usize).max(1);
        let mut lines = Vec::new();
        let mut line = String::new();
        for word in text.split_whitespace() {
            let mut word = word;
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let (head, tail) = split_at_char_boundary(word, max_chars);
                lines.push(head.to_string());
                word = tail;
            }
            let needed = if line.is_empty() {
                word.len()
            } else {
                line.len() + 1 + word.len()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }
}

fn split_at_char_boundary(s: &str, max: usize) -> (&str, &str) {
    let mut idx = max.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    if idx == 0 {
        // The budget is narrower than the first character; emit one
        // whole character anyway so the split always makes progress.
        idx = s
            .char_indices()
            .nth(1)
            .map_or(s.len(), |(next, _)| next);
    }
    s.split_at(idx)
}

impl DocumentSink for LopdfDocumentSink {
    fn begin_text_page(
        &mut self,
        dims: PixelDims,
        margins: PageMargins,
    ) -> Result<(), SinkError> {
        self.flush_current_page()?;
        self.current = Some(PageInProgress::new(
            dims.width as f32,
            dims.height as f32,
            margins,
        ));
        Ok(())
    }

    fn write_field(
        &mut self,
        label: &str,
        value: &str,
        color: FieldColor,
    ) -> Result<(), SinkError> {
        let page = self
            .current
            .as_mut()
            .ok_or_else(|| SinkError::Encode("no open text page for field".to_string()))?;
        let content_width = page.width - page.margins.left - page.margins.right;
        let value_color = match color {
            FieldColor::Body => (0.0, 0.0, 0.0),
            FieldColor::Link => (0.0, 0.0, 1.0),
        };

        // Text past the bottom margin clips; the page count of a
        // report is fixed by its screenshot list, never by overflow.
        Self::write_line(page, label, LABEL_FONT_SIZE, (0.0, 0.0, 0.0));
        for line in Self::wrap_text(value, VALUE_FONT_SIZE, content_width) {
            Self::write_line(page, &line, VALUE_FONT_SIZE, value_color);
        }
        page.cursor_y += VALUE_FONT_SIZE * LINE_SPACING;
        Ok(())
    }

    fn add_image_page(&mut self, dims: PixelDims, image_path: &Path) -> Result<(), SinkError> {
        self.flush_current_page()?;
        let (name, decoded_dims) = self.add_image_xobject(image_path)?;
        if decoded_dims != dims {
            log::warn!(
                "declared dimensions {}x{} differ from decoded {}x{} for {}",
                dims.width,
                dims.height,
                decoded_dims.width,
                decoded_dims.height,
                image_path.display()
            );
        }

        let (w, h) = (dims.width as f32, dims.height as f32);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec![name.as_str().into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| SinkError::Encode(e.to_string()))?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&encoded)?;
        let compressed = encoder.finish()?;
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {"Filter" => "FlateDecode"}, compressed));
        self.push_page_object(w, h, content_id);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.current.is_some())
    }

    fn finish(mut self) -> Result<(), SinkError> {
        self.flush_current_page()?;

        let mut xobj_dict = Dictionary::new();
        for (name, id) in &self.xobjects {
            xobj_dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
        }
        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => self.font_id },
        };
        if !xobj_dict.is_empty() {
            resources.set("XObject", Object::Dictionary(xobj_dict));
        }
        self.document
            .objects
            .insert(self.resources_id, Object::Dictionary(resources));

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i32,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self
            .document
            .add_object(dictionary! { "Type" => "Catalog", "Pages" => self.pages_id });
        self.document.trailer.set("Root", catalog_id);
        let info_id = self.document.add_object(dictionary! {
            "Title" => Object::string_literal(self.title.clone()),
        });
        self.document.trailer.set("Info", info_id);

        let file = self
            .file
            .take()
            .ok_or_else(|| SinkError::Write("document already written".to_string()))?;
        let mut writer = BufWriter::new(file);
        self.document
            .save_to(&mut writer)
            .map_err(|e| SinkError::Write(e.to_string()))?;
        writer.flush()?;
        // Durability, not just buffer submission.
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| SinkError::Write(e.to_string()))?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for LopdfDocumentSink {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::warn!(
                    "could not remove unfinished document {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}
