mod brochure;
mod canvas;
mod debug;
mod doc_template;
mod error;
mod flowable;
mod font;
mod frame;
mod inspect;
mod markup;
mod metrics;
mod page_template;
mod paragraph;
mod pdf;
mod story;
mod style;
mod table;
mod types;

pub use brochure::{
    BrochureConfig, BrochureStyles, CAREER_OUTCOMES, CONTOSO_BLUE, CONTOSO_GOLD,
    CONTOSO_SECONDARY, DEFAULT_LOGO_PATH, DEFAULT_OUTPUT_FILENAME, LEARNING_AREAS,
    WEBINAR_TOPICS, compose_story, create_brochure,
};
pub use canvas::{Canvas, Command, Document, Page};
pub use doc_template::DocTemplate;
pub use error::{BrochureError, Result};
pub use flowable::{BreakAfter, Flowable, HAlign, ImageFlowable, PageBreak, Pagination, Spacer};
pub use font::StandardFont;
pub use frame::{AddResult, DEFAULT_FRAME_PADDING, Frame};
pub use inspect::{InspectReport, PageReport, inspect_pdf_bytes, inspect_pdf_path};
pub use markup::{Inline, TextRun, parse as parse_markup, plain_text};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use page_template::{FrameSpec, PageTemplate};
pub use paragraph::Paragraph;
pub use pdf::{PRODUCER, PdfOptions};
pub use story::{Element, ElementKind, ElementOutline, Story};
pub use style::{ParagraphStyle, StyleSheet, TextAlign};
pub use table::{
    CellContent, CellRange, CellStyle, TableFlowable, TableStyle, TableStyleCommand, VAlign,
};
pub use types::{Color, Margins, Pt, Rect, Size, inch};

use debug::DebugLogger;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub(crate) const META_PAGE_TEMPLATE_KEY: &str = "page.template";
pub(crate) const META_FLOWABLE_BBOX_KEY: &str = "flowable.bbox";

/// Lays out a `Story` on single-frame pages and serializes it to PDF.
pub struct Renderer {
    page_size: Size,
    margins: Margins,
    pdf_options: PdfOptions,
    debug: Option<Arc<DebugLogger>>,
}

#[derive(Clone)]
pub struct RendererBuilder {
    page_size: Size,
    margins: Margins,
    pdf_options: PdfOptions,
    debug_path: Option<PathBuf>,
}

impl Renderer {
    pub fn builder() -> RendererBuilder {
        RendererBuilder::new()
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    fn build_page_templates(&self) -> Vec<PageTemplate> {
        let frame = self.margins.content_rect(self.page_size);
        vec![
            PageTemplate::new("Page1", self.page_size)
                .with_frame(frame, Pt::from_f32(DEFAULT_FRAME_PADDING)),
        ]
    }

    fn layout(&self, story: Story) -> Result<(Document, DocumentMetrics)> {
        let element_count = story.len();
        let mut doc = DocTemplate::new(self.build_page_templates());
        if let Some(debug) = self.debug.clone() {
            doc = doc.with_debug(debug);
        }
        for flowable in story.into_flowables()? {
            doc.add_flowable(flowable);
        }
        let (document, metrics) = doc.build_with_metrics()?;
        log::debug!(
            "laid out {element_count} elements on {} page(s) with {} page break(s)",
            metrics.page_count(),
            metrics.page_breaks
        );
        Ok((document, metrics))
    }

    pub fn render_to_document(&self, story: Story) -> Result<Document> {
        Ok(self.layout(story)?.0)
    }

    pub fn render_to_buffer(&self, story: Story) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.render_to_writer(story, &mut bytes)?;
        Ok(bytes)
    }

    pub fn render_with_metrics(&self, story: Story) -> Result<(Vec<u8>, DocumentMetrics)> {
        let (document, mut metrics) = self.layout(story)?;
        let mut bytes = Vec::new();
        pdf::write_document(
            &document,
            &self.pdf_options,
            &mut bytes,
            self.debug.clone(),
            Some(&mut metrics),
        )?;
        self.emit_debug_summary("render_with_metrics");
        Ok((bytes, metrics))
    }

    pub fn render_to_writer<W: std::io::Write>(&self, story: Story, writer: &mut W) -> Result<usize> {
        let (document, mut metrics) = self.layout(story)?;
        let bytes_written = pdf::write_document(
            &document,
            &self.pdf_options,
            writer,
            self.debug.clone(),
            Some(&mut metrics),
        )?;
        log::info!(
            "rendered {} page(s), {bytes_written} bytes",
            metrics.page_count()
        );
        self.emit_debug_summary("render_to_writer");
        Ok(bytes_written)
    }

    /// Writes the PDF to `path`, creating or truncating it.
    pub fn render_to_file(&self, story: Story, path: impl AsRef<Path>) -> Result<usize> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        let written = self.render_to_writer(story, &mut writer)?;
        std::io::Write::flush(&mut writer)?;
        Ok(written)
    }

    fn emit_debug_summary(&self, context: &str) {
        if let Some(logger) = self.debug.as_deref() {
            logger.emit_summary(context);
            logger.flush();
        }
    }
}

impl Default for RendererBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererBuilder {
    pub fn new() -> Self {
        Self {
            page_size: Size::a4(),
            margins: Margins::all(50.0),
            pdf_options: PdfOptions {
                creator: Some(env!("CARGO_PKG_NAME").to_string()),
                compress: true,
                ..PdfOptions::default()
            },
            debug_path: None,
        }
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn margin_all(mut self, value: f32) -> Self {
        self.margins = Margins::all(value);
        self
    }

    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.pdf_options.title = Some(title.into());
        self
    }

    pub fn document_author(mut self, author: impl Into<String>) -> Self {
        self.pdf_options.author = Some(author.into());
        self
    }

    /// Writes JSONL layout and encoding events to `path`.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Renderer> {
        let frame = self.margins.content_rect(self.page_size);
        let padding = Pt::from_f32(DEFAULT_FRAME_PADDING) * 2;
        if frame.width <= padding || frame.height <= padding {
            return Err(BrochureError::InvalidConfiguration(format!(
                "margins leave no room on a {}x{}pt page",
                self.page_size.width.to_f32(),
                self.page_size.height.to_f32()
            )));
        }
        let debug = match self.debug_path {
            Some(path) => Some(Arc::new(DebugLogger::new(path)?)),
            None => None,
        };
        Ok(Renderer {
            page_size: self.page_size,
            margins: self.margins,
            pdf_options: self.pdf_options,
            debug,
        })
    }
}
