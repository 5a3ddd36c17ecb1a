use crate::error::{BrochureError, Result};
use lopdf::content::Content;
use lopdf::{Document as LoDocument, Object, ObjectId};
use std::path::Path;

/// What a rendered PDF contains, as seen by an independent parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub pdf_version: String,
    pub page_count: usize,
    pub encrypted: bool,
    pub file_size_bytes: usize,
    pub pages: Vec<PageReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page_number: u32,
    /// Number of `Do` operators, i.e. image XObject placements.
    pub image_draws: usize,
    /// Text shown by each `Tj` operator, in content stream order.
    pub text_runs: Vec<String>,
}

impl InspectReport {
    pub fn image_draws(&self) -> usize {
        self.pages.iter().map(|page| page.image_draws).sum()
    }

    /// All text runs joined with spaces, pages in order.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .flat_map(|page| page.text_runs.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn inspect_pdf_bytes(bytes: &[u8]) -> Result<InspectReport> {
    let pdf = LoDocument::load_mem(bytes)?;
    let mut pages = Vec::new();
    for (page_number, page_id) in pdf.get_pages() {
        let content = page_content(&pdf, page_id)?;
        let content =
            Content::decode(&content).map_err(|err| BrochureError::Inspect(err.to_string()))?;
        let mut report = PageReport {
            page_number,
            image_draws: 0,
            text_runs: Vec::new(),
        };
        for op in content.operations {
            match op.operator.as_str() {
                "Do" => report.image_draws += 1,
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        report.text_runs.push(decode_winansi(bytes));
                    }
                }
                _ => {}
            }
        }
        pages.push(report);
    }

    Ok(InspectReport {
        pdf_version: pdf.version.clone(),
        page_count: pages.len(),
        encrypted: pdf.is_encrypted(),
        file_size_bytes: bytes.len(),
        pages,
    })
}

pub fn inspect_pdf_path(path: &Path) -> Result<InspectReport> {
    let data = std::fs::read(path)?;
    inspect_pdf_bytes(&data)
}

fn page_content(pdf: &LoDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let contents = pdf.get_dictionary(page_id)?.get(b"Contents")?;
    match contents {
        Object::Reference(id) => match pdf.get_object(*id)? {
            Object::Stream(stream) => Ok(stream_bytes(stream)),
            _ => Err(BrochureError::Inspect(
                "page contents is not a stream".to_string(),
            )),
        },
        Object::Array(items) => {
            let mut content = Vec::new();
            for item in items {
                if let Object::Reference(id) = item {
                    if let Ok(Object::Stream(stream)) = pdf.get_object(*id) {
                        content.extend_from_slice(&stream_bytes(stream));
                        content.push(b' ');
                    }
                }
            }
            Ok(content)
        }
        _ => Err(BrochureError::Inspect(
            "page contents is neither a stream nor an array".to_string(),
        )),
    }
}

// Unfiltered streams have nothing to decompress.
fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

fn decode_winansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| match byte {
            0x95 => '\u{2022}',
            0x96 => '\u{2013}',
            0x97 => '\u{2014}',
            0x91 => '\u{2018}',
            0x92 => '\u{2019}',
            0x93 => '\u{201C}',
            0x94 => '\u{201D}',
            0x80 => '\u{20AC}',
            other => *other as char,
        })
        .collect()
}
