use crate::error::Result;
use crate::flowable::{Flowable, HAlign, ImageFlowable, PageBreak, Spacer};
use crate::paragraph::Paragraph;
use crate::style::ParagraphStyle;
use crate::table::{CellContent, TableFlowable, TableStyle};
use crate::types::Pt;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// One renderable unit of a story.
#[derive(Debug, Clone)]
pub enum Element {
    Paragraph {
        text: String,
        style: Arc<ParagraphStyle>,
    },
    Image {
        source: String,
        width: Pt,
        height: Pt,
        h_align: HAlign,
    },
    Spacer(Pt),
    Table {
        rows: Vec<Vec<CellContent>>,
        col_widths: Vec<Pt>,
        style: TableStyle,
    },
    PageBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Paragraph,
    Image,
    Spacer,
    Table,
    PageBreak,
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Paragraph { .. } => ElementKind::Paragraph,
            Element::Image { .. } => ElementKind::Image,
            Element::Spacer(_) => ElementKind::Spacer,
            Element::Table { .. } => ElementKind::Table,
            Element::PageBreak => ElementKind::PageBreak,
        }
    }

    pub fn outline(&self) -> ElementOutline {
        let detail = match self {
            Element::Paragraph { text, style } => format!("[{}] {text}", style.name),
            Element::Image {
                source,
                width,
                height,
                h_align,
            } => format!(
                "{source} {}x{}pt {h_align:?}",
                width.to_f32(),
                height.to_f32()
            ),
            Element::Spacer(height) => format!("{}pt", height.to_f32()),
            Element::Table {
                rows, col_widths, ..
            } => {
                let cells = rows
                    .iter()
                    .map(|row| row.iter().map(cell_text).collect::<Vec<_>>().join(" | "))
                    .collect::<Vec<_>>()
                    .join(" / ");
                format!("{}x{} {cells}", col_widths.len(), rows.len())
            }
            Element::PageBreak => String::new(),
        };
        ElementOutline {
            kind: self.kind(),
            detail,
        }
    }

    fn into_flowable(self) -> Result<Box<dyn Flowable>> {
        let flowable: Box<dyn Flowable> = match self {
            Element::Paragraph { text, style } => Box::new(Paragraph::new(text, style)),
            Element::Image {
                source,
                width,
                height,
                h_align,
            } => Box::new(ImageFlowable::new(width, height, source).with_h_align(h_align)),
            Element::Spacer(height) => Box::new(Spacer::new_pt(height)),
            Element::Table {
                rows,
                col_widths,
                style,
            } => Box::new(TableFlowable::new(rows, col_widths, &style)?),
            Element::PageBreak => Box::new(PageBreak),
        };
        Ok(flowable)
    }
}

fn cell_text(cell: &CellContent) -> &str {
    match cell {
        CellContent::Text(text) => text,
        CellContent::Paragraph(paragraph) => paragraph.text(),
    }
}

/// Structural summary of an element, comparable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementOutline {
    pub kind: ElementKind,
    pub detail: String,
}

impl fmt::Display for ElementOutline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?} {}", self.kind, self.detail)
        }
    }
}

/// Ordered sequence of elements, rendered top to bottom.
#[derive(Debug, Clone, Default)]
pub struct Story {
    elements: Vec<Element>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn paragraph(&mut self, text: impl Into<String>, style: &Arc<ParagraphStyle>) {
        self.push(Element::Paragraph {
            text: text.into(),
            style: Arc::clone(style),
        });
    }

    pub fn spacer(&mut self, height: f32) {
        self.push(Element::Spacer(Pt::from_f32(height)));
    }

    pub fn image(&mut self, source: impl Into<String>, width: Pt, height: Pt, h_align: HAlign) {
        self.push(Element::Image {
            source: source.into(),
            width,
            height,
            h_align,
        });
    }

    pub fn table(&mut self, rows: Vec<Vec<CellContent>>, col_widths: Vec<Pt>, style: TableStyle) {
        self.push(Element::Table {
            rows,
            col_widths,
            style,
        });
    }

    pub fn page_break(&mut self) {
        self.push(Element::PageBreak);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn count(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|el| el.kind() == kind).count()
    }

    pub fn outline(&self) -> Vec<ElementOutline> {
        self.elements.iter().map(Element::outline).collect()
    }

    /// SHA-256 over the outline; equal for structurally identical stories.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for line in self.outline() {
            hasher.update(line.to_string().as_bytes());
            hasher.update([0u8]);
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    pub fn into_flowables(self) -> Result<Vec<Box<dyn Flowable>>> {
        self.elements
            .into_iter()
            .map(Element::into_flowable)
            .collect()
    }
}
