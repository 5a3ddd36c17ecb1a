use crate::canvas::{Command, Document, Page};
use crate::debug::DebugLogger;
use crate::error::{BrochureError, Result};
use crate::font::{StandardFont, encode_winansi};
use crate::metrics::DocumentMetrics;
use crate::types::{Color, Pt, Size};
use base64::Engine;
use fixed::types::I32F32;
use image::GenericImageView;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

const PDF_CATALOG_ID: usize = 1;
const PDF_PAGES_ID: usize = 2;
const PDF_RESOURCES_ID: usize = 3;

pub const PRODUCER: &str = concat!("mba-brochure ", env!("CARGO_PKG_VERSION"));

/// Document information dictionary entries.
#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub compress: bool,
}

/// Streams pages into a PDF 1.7 file as they are added. Fonts and the shared
/// resource dictionary are written by `finish`.
pub(crate) struct PdfStreamWriter<'a, W: Write> {
    writer: &'a mut W,
    offset: usize,
    offsets: Vec<usize>, // index by object id; 0 is the free object.
    next_id: usize,
    page_size: Size,
    options: PdfOptions,
    debug: Option<Arc<DebugLogger>>,

    fonts: BTreeMap<StandardFont, usize>,
    image_resources: Vec<(String, usize)>,
    image_name_map: HashMap<String, Option<String>>,
    image_content_map: HashMap<[u8; 32], String>,

    page_ids: Vec<usize>,
    page_content_bytes: Vec<usize>,
}

impl<'a, W: Write> PdfStreamWriter<'a, W> {
    pub(crate) fn new(
        writer: &'a mut W,
        page_size: Size,
        options: PdfOptions,
        debug: Option<Arc<DebugLogger>>,
    ) -> io::Result<Self> {
        let mut offset = 0usize;
        write_bytes(writer, b"%PDF-1.7\n", &mut offset)?;
        write_bytes(writer, b"%\xE2\xE3\xCF\xD3\n", &mut offset)?;
        Ok(Self {
            writer,
            offset,
            offsets: vec![0; PDF_RESOURCES_ID + 1],
            next_id: PDF_RESOURCES_ID + 1,
            page_size,
            options,
            debug,
            fonts: BTreeMap::new(),
            image_resources: Vec::new(),
            image_name_map: HashMap::new(),
            image_content_map: HashMap::new(),
            page_ids: Vec::new(),
            page_content_bytes: Vec::new(),
        })
    }

    fn alloc_ids(&mut self, count: usize) -> usize {
        let start = self.next_id;
        self.next_id += count;
        if self.offsets.len() < self.next_id {
            self.offsets.resize(self.next_id, 0);
        }
        start
    }

    fn write_object(&mut self, id: usize, body: &[u8]) -> io::Result<()> {
        if let Some(slot) = self.offsets.get_mut(id) {
            *slot = self.offset;
        }
        write_bytes(self.writer, format!("{id} 0 obj\n").as_bytes(), &mut self.offset)?;
        write_bytes(self.writer, body, &mut self.offset)?;
        write_bytes(self.writer, b"\nendobj\n", &mut self.offset)
    }

    fn write_stream(&mut self, id: usize, dict_entries: &str, data: &[u8]) -> io::Result<()> {
        let mut body = format!("<< {dict_entries} /Length {} >>\nstream\n", data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.write_object(id, &body)
    }

    pub(crate) fn add_document(&mut self, document: &Document) -> io::Result<()> {
        if (document.page_size.width - self.page_size.width).abs() > Pt::from_f32(0.01)
            || (document.page_size.height - self.page_size.height).abs() > Pt::from_f32(0.01)
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "mixed page sizes are not supported in a single PDF stream",
            ));
        }
        for page in &document.pages {
            self.add_page(page)?;
        }
        Ok(())
    }

    fn add_page(&mut self, page: &Page) -> io::Result<()> {
        let start = self.alloc_ids(2);
        let content_id = start;
        let page_id = start + 1;

        let content = self.render_page(page)?;
        self.page_content_bytes.push(content.len());
        if self.options.compress {
            let compressed = flate_compress(&content)?;
            self.write_stream(content_id, "/Filter /FlateDecode", &compressed)?;
        } else {
            self.write_stream(content_id, "", &content)?;
        }

        let page_obj = format!(
            "<< /Type /Page /Parent {PDF_PAGES_ID} 0 R /MediaBox [0 0 {} {}] /Resources {PDF_RESOURCES_ID} 0 R /Contents {content_id} 0 R >>",
            fmt_pt(self.page_size.width),
            fmt_pt(self.page_size.height),
        );
        self.write_object(page_id, page_obj.as_bytes())?;
        self.page_ids.push(page_id);
        Ok(())
    }

    fn ensure_font(&mut self, font: StandardFont) -> usize {
        if let Some(id) = self.fonts.get(&font) {
            return *id;
        }
        let id = self.alloc_ids(1);
        self.fonts.insert(font, id);
        id
    }

    fn ensure_image(&mut self, source: &str) -> io::Result<Option<String>> {
        if let Some(name) = self.image_name_map.get(source) {
            return Ok(name.clone());
        }
        let image = match load_image(source) {
            Ok(image) => image,
            Err(err) => {
                log::warn!("skipping image {}: {err}", preview(source));
                if let Some(logger) = self.debug.as_deref() {
                    logger.log_event(&json!({
                        "type": "pdf.image.skipped",
                        "source": preview(source),
                        "error": err.to_string(),
                    }));
                    logger.increment("pdf.image.skipped", 1);
                }
                self.image_name_map.insert(source.to_string(), None);
                return Ok(None);
            }
        };

        let digest = image.digest();
        if let Some(name) = self.image_content_map.get(&digest) {
            let name = name.clone();
            self.image_name_map
                .insert(source.to_string(), Some(name.clone()));
            return Ok(Some(name));
        }

        let smask_id = match image.alpha.as_ref() {
            Some(alpha) => {
                let id = self.alloc_ids(1);
                let entries = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                    image.width, image.height
                );
                self.write_stream(id, &entries, alpha)?;
                Some(id)
            }
            None => None,
        };
        let obj_id = self.alloc_ids(1);
        let smask = smask_id
            .map(|id| format!(" /SMask {id} 0 R"))
            .unwrap_or_default();
        let entries = format!(
            "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace {} /BitsPerComponent 8 /Filter {}{}",
            image.width, image.height, image.color_space, image.filter, smask
        );
        self.write_stream(obj_id, &entries, &image.data)?;

        let name = format!("Im{}", self.image_resources.len() + 1);
        self.image_resources.push((name.clone(), obj_id));
        self.image_content_map.insert(digest, name.clone());
        self.image_name_map
            .insert(source.to_string(), Some(name.clone()));
        Ok(Some(name))
    }

    fn render_page(&mut self, page: &Page) -> io::Result<Vec<u8>> {
        let page_height = self.page_size.height;
        let mut out: Vec<u8> = Vec::new();
        let mut font = StandardFont::Helvetica;
        let mut font_size = Pt::from_f32(12.0);
        let mut stack: Vec<(StandardFont, Pt)> = Vec::new();

        for cmd in &page.commands {
            match cmd {
                Command::SaveState => {
                    stack.push((font, font_size));
                    out.extend_from_slice(b"q\n");
                }
                Command::RestoreState => {
                    if let Some((f, s)) = stack.pop() {
                        font = f;
                        font_size = s;
                    }
                    out.extend_from_slice(b"Q\n");
                }
                Command::Meta { .. } => {}
                Command::SetFillColor(color) => out.extend_from_slice(color_op(*color, "rg").as_bytes()),
                Command::SetStrokeColor(color) => {
                    out.extend_from_slice(color_op(*color, "RG").as_bytes())
                }
                Command::SetLineWidth(width) => {
                    out.extend_from_slice(format!("{} w\n", fmt_pt(*width)).as_bytes())
                }
                Command::SetFont(next) => font = *next,
                Command::SetFontSize(size) => font_size = *size,
                Command::MoveTo { x, y } => out.extend_from_slice(
                    format!("{} {} m\n", fmt_pt(*x), fmt_pt(page_height - *y)).as_bytes(),
                ),
                Command::LineTo { x, y } => out.extend_from_slice(
                    format!("{} {} l\n", fmt_pt(*x), fmt_pt(page_height - *y)).as_bytes(),
                ),
                Command::Stroke => out.extend_from_slice(b"S\n"),
                Command::DrawString { x, y, text } => {
                    let encoded = encode_winansi(text);
                    if encoded.is_lossy() {
                        self.report_lossy_text(font, text, encoded.dropped, encoded.replaced);
                    }
                    if encoded.bytes.is_empty() {
                        continue;
                    }
                    let resource = font.resource_name();
                    self.ensure_font(font);
                    out.extend_from_slice(b"BT\n");
                    out.extend_from_slice(
                        format!(
                            "/{resource} {} Tf\n{} {} Td\n",
                            fmt_pt(font_size),
                            fmt_pt(*x),
                            fmt_pt(page_height - *y - font_size)
                        )
                        .as_bytes(),
                    );
                    out.push(b'(');
                    out.extend_from_slice(&escape_pdf_bytes(&encoded.bytes));
                    out.extend_from_slice(b") Tj\nET\n");
                }
                Command::FillRect {
                    x,
                    y,
                    width,
                    height,
                } => {
                    let draw_y = page_height - *y - *height;
                    out.extend_from_slice(
                        format!(
                            "{} {} {} {} re\nf\n",
                            fmt_pt(*x),
                            fmt_pt(draw_y),
                            fmt_pt(*width),
                            fmt_pt(*height)
                        )
                        .as_bytes(),
                    );
                }
                Command::DrawImage {
                    x,
                    y,
                    width,
                    height,
                    source,
                } => {
                    let Some(name) = self.ensure_image(source)? else {
                        continue;
                    };
                    let draw_y = page_height - *y - *height;
                    out.extend_from_slice(
                        format!(
                            "q\n{} 0 0 {} {} {} cm\n/{name} Do\nQ\n",
                            fmt_pt(*width),
                            fmt_pt(*height),
                            fmt_pt(*x),
                            fmt_pt(draw_y)
                        )
                        .as_bytes(),
                    );
                }
            }
        }
        Ok(out)
    }

    fn report_lossy_text(&self, font: StandardFont, text: &str, dropped: usize, replaced: usize) {
        if replaced > 0 {
            log::warn!(
                "{replaced} character(s) have no {} glyph in {:?}",
                font.name(),
                preview(text)
            );
        }
        let Some(logger) = self.debug.as_deref() else {
            return;
        };
        logger.log_event(&json!({
            "type": "pdf.winansi.lossy",
            "font": font.name(),
            "dropped": dropped,
            "replaced": replaced,
            "sample": preview(text),
        }));
        logger.increment("pdf.winansi.lossy", (dropped + replaced) as u64);
    }

    pub(crate) fn finish(&mut self) -> io::Result<usize> {
        let fonts = std::mem::take(&mut self.fonts);
        for (font, id) in &fonts {
            self.write_object(*id, font_object(*font).as_bytes())?;
        }

        let font_entries = fonts
            .iter()
            .map(|(font, id)| format!("/{} {id} 0 R", font.resource_name()))
            .collect::<Vec<_>>()
            .join(" ");
        let mut resources = format!("<< /ProcSet [/PDF /Text /ImageB /ImageC] /Font << {font_entries} >>");
        if !self.image_resources.is_empty() {
            let images = self
                .image_resources
                .iter()
                .map(|(name, id)| format!("/{name} {id} 0 R"))
                .collect::<Vec<_>>()
                .join(" ");
            resources.push_str(&format!(" /XObject << {images} >>"));
        }
        resources.push_str(" >>");
        self.write_object(PDF_RESOURCES_ID, resources.as_bytes())?;

        let kids = self
            .page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        self.write_object(
            PDF_PAGES_ID,
            format!(
                "<< /Type /Pages /Count {} /Kids [{kids}] >>",
                self.page_ids.len()
            )
            .as_bytes(),
        )?;
        self.write_object(
            PDF_CATALOG_ID,
            format!("<< /Type /Catalog /Pages {PDF_PAGES_ID} 0 R >>").as_bytes(),
        )?;

        let info_id = self.alloc_ids(1);
        let info = info_object(&self.options);
        self.write_object(info_id, info.as_bytes())?;

        let xref_start = self.offset;
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.next_id);
        for id in 1..self.next_id {
            let offset = self.offsets.get(id).copied().unwrap_or(0);
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root {PDF_CATALOG_ID} 0 R /Info {info_id} 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
            self.next_id
        ));
        write_bytes(self.writer, xref.as_bytes(), &mut self.offset)?;
        self.writer.flush()?;

        if let Some(logger) = self.debug.as_deref() {
            logger.log_event(&json!({
                "type": "pdf.finish",
                "bytes": self.offset,
                "pages": self.page_ids.len(),
                "fonts": fonts.len(),
                "images": self.image_resources.len(),
            }));
        }
        Ok(self.offset)
    }
}

/// Serializes `document` into `writer`, returning the number of bytes written.
pub fn write_document<W: Write>(
    document: &Document,
    options: &PdfOptions,
    writer: &mut W,
    debug: Option<Arc<DebugLogger>>,
    metrics: Option<&mut DocumentMetrics>,
) -> io::Result<usize> {
    let mut pdf = PdfStreamWriter::new(writer, document.page_size, options.clone(), debug)?;
    pdf.add_document(document)?;
    let total_bytes = pdf.finish()?;
    if let Some(metrics) = metrics {
        metrics.total_bytes = total_bytes;
        for (page, bytes) in metrics.pages.iter_mut().zip(&pdf.page_content_bytes) {
            page.content_bytes = *bytes;
        }
    }
    Ok(total_bytes)
}

pub fn document_to_pdf(document: &Document, options: &PdfOptions) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_document(document, options, &mut bytes, None, None)?;
    Ok(bytes)
}

struct ImageData {
    width: u32,
    height: u32,
    color_space: &'static str,
    filter: &'static str,
    data: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl ImageData {
    fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_be_bytes());
        hasher.update(self.height.to_be_bytes());
        hasher.update(&self.data);
        if let Some(alpha) = &self.alpha {
            hasher.update(alpha);
        }
        hasher.finalize().into()
    }
}

fn load_image(source: &str) -> Result<ImageData> {
    if let Some((mime, data)) = parse_data_uri(source)? {
        return decode_image_bytes(&data, Some(&mime));
    }
    let bytes = std::fs::read(Path::new(source))?;
    decode_image_bytes(&bytes, None)
}

fn decode_image_bytes(data: &[u8], mime: Option<&str>) -> Result<ImageData> {
    let format = match mime {
        Some(mime) if mime.contains("png") => Some(image::ImageFormat::Png),
        Some(mime) if mime.contains("jpeg") || mime.contains("jpg") => {
            Some(image::ImageFormat::Jpeg)
        }
        _ => image::guess_format(data).ok(),
    };
    let decoded =
        image::load_from_memory(data).map_err(|err| BrochureError::Asset(err.to_string()))?;
    let (width, height) = decoded.dimensions();

    if matches!(format, Some(image::ImageFormat::Jpeg)) {
        // CMYK and YCCK scans are re-encoded from the decoder's RGB output.
        let color_space = match jpeg_components(data) {
            Some(1) => Some("/DeviceGray"),
            Some(3) => Some("/DeviceRGB"),
            _ => None,
        };
        if let Some(color_space) = color_space {
            return Ok(ImageData {
                width,
                height,
                color_space,
                filter: "/DCTDecode",
                data: data.to_vec(),
                alpha: None,
            });
        }
    }

    let rgba = decoded.to_rgba8();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    let mut has_alpha = false;
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        has_alpha |= a != 255;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }
    Ok(ImageData {
        width,
        height,
        color_space: "/DeviceRGB",
        filter: "/FlateDecode",
        data: flate_compress(&rgb)?,
        alpha: if has_alpha {
            Some(flate_compress(&alpha)?)
        } else {
            None
        },
    })
}

/// Component count from the first start-of-frame segment of a JPEG.
fn jpeg_components(data: &[u8]) -> Option<u8> {
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            return data.get(pos + 9).copied();
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        pos += 2 + len;
    }
    None
}

fn parse_data_uri(uri: &str) -> Result<Option<(String, Vec<u8>)>> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Ok(None);
    };
    let Some((header, payload)) = rest.split_once(',') else {
        return Err(BrochureError::Asset("data URI without payload".to_string()));
    };
    let mime = header
        .split(';')
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = if header.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|err| BrochureError::Asset(format!("invalid base64 image data: {err}")))?
    } else {
        payload.as_bytes().to_vec()
    };
    Ok(Some((mime, data)))
}

fn flate_compress(data: &[u8]) -> io::Result<Vec<u8>> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn font_object(font: StandardFont) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        font.name()
    )
}

fn info_object(options: &PdfOptions) -> String {
    let mut entries: Vec<String> = Vec::new();
    if let Some(title) = options.title.as_deref() {
        entries.push(format!("/Title {}", pdf_text_string(title)));
    }
    if let Some(author) = options.author.as_deref() {
        entries.push(format!("/Author {}", pdf_text_string(author)));
    }
    if let Some(creator) = options.creator.as_deref() {
        entries.push(format!("/Creator {}", pdf_text_string(creator)));
    }
    entries.push(format!("/Producer {}", pdf_text_string(PRODUCER)));
    format!("<< {} >>", entries.join(" "))
}

// Info strings are ASCII literals when possible, otherwise UTF-16BE hex.
fn pdf_text_string(text: &str) -> String {
    if text.is_ascii() {
        return format!("({})", String::from_utf8_lossy(&escape_pdf_bytes(text.as_bytes())));
    }
    let mut hex = String::from("<FEFF");
    for unit in text.encode_utf16() {
        hex.push_str(&format!("{unit:04X}"));
    }
    hex.push('>');
    hex
}

fn escape_pdf_bytes(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + 8);
    for byte in input {
        match byte {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(*byte);
            }
            0x20..=0x7E => out.push(*byte),
            _ => out.extend_from_slice(format!("\\{byte:03o}").as_bytes()),
        }
    }
    out
}

fn preview(input: &str) -> String {
    const MAX_CHARS: usize = 80;
    if input.chars().count() <= MAX_CHARS {
        return input.to_string();
    }
    let mut out: String = input.chars().take(MAX_CHARS).collect();
    out.push_str("...");
    out
}

fn write_bytes<W: Write>(writer: &mut W, data: &[u8], offset: &mut usize) -> io::Result<()> {
    writer.write_all(data)?;
    *offset += data.len();
    Ok(())
}

fn color_op(color: Color, op: &str) -> String {
    format!("{} {} {} {op}\n", fmt(color.r), fmt(color.g), fmt(color.b))
}

fn fmt(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = I32F32::from_num(value);
    let scaled = (fixed * I32F32::from_num(1000)).round();
    let milli: i64 = scaled.to_num();
    format_milli(milli)
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        return format!("{sign}{int_part}");
    }
    let frac = format!("{frac_part:03}");
    format!("{sign}{int_part}.{}", frac.trim_end_matches('0'))
}

fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    fn sample_document(images: &[&str]) -> Document {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_font(StandardFont::HelveticaBold);
        canvas.set_font_size(Pt::from_i32(18));
        canvas.draw_string(Pt::from_i32(56), Pt::from_i32(56), "Program (Overview)");
        for (index, source) in images.iter().enumerate() {
            canvas.draw_image(
                Pt::from_i32(56),
                Pt::from_i32(100 + 100 * index as i32),
                Pt::from_i32(72),
                Pt::from_i32(18),
                *source,
            );
        }
        canvas.show_page();
        canvas.finish()
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([47, 138, 206, 128]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn jpeg_bytes(image: image::DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    fn png_data_uri() -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png_bytes())
        )
    }

    #[test]
    fn formats_numbers_without_trailing_zeros() {
        assert_eq!(format_milli(0), "0");
        assert_eq!(format_milli(595_280), "595.28");
        assert_eq!(format_milli(-1_500), "-1.5");
        assert_eq!(format_milli(12_000), "12");
        assert_eq!(fmt(0.5), "0.5");
    }

    #[test]
    fn escapes_delimiters_and_high_bytes() {
        assert_eq!(escape_pdf_bytes(b"a(b)\\"), b"a\\(b\\)\\\\".to_vec());
        assert_eq!(escape_pdf_bytes(&[0x95, b' ']), b"\\225 ".to_vec());
    }

    #[test]
    fn info_strings_fall_back_to_utf16() {
        assert_eq!(pdf_text_string("MBA"), "(MBA)");
        assert_eq!(pdf_text_string("\u{a9}"), "<FEFF00A9>");
    }

    #[test]
    fn output_parses_and_flips_text_baseline() {
        let doc = sample_document(&[]);
        let bytes = document_to_pdf(&doc, &PdfOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        let text = String::from_utf8_lossy(&bytes);
        // 841.89 - 56 - 18 = 767.89
        assert!(text.contains("/F2 18 Tf\n56 767.89 Td\n(Program \\(Overview\\)) Tj"));
        assert!(text.contains("/BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding"));
        assert!(text.contains("/Producer (mba-brochure"));

        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn identical_images_are_embedded_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, png_bytes()).unwrap();
        let path = path.to_string_lossy().into_owned();
        let uri = png_data_uri();

        // Same source twice, then the same pixels from a different source.
        let doc = sample_document(&[&uri, &uri, &path]);
        let bytes = document_to_pdf(&doc, &PdfOptions::default()).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches(" Do\n").count(), 3);
        assert_eq!(text.matches("/Subtype /Image").count(), 2); // image + soft mask
        assert_eq!(text.matches("/SMask").count(), 1);

        let report = crate::inspect::inspect_pdf_bytes(&bytes).unwrap();
        assert_eq!(report.image_draws(), 3);
    }

    #[test]
    fn unreadable_images_are_skipped() {
        let doc = sample_document(&["does/not/exist.png"]);
        let bytes = document_to_pdf(&doc, &PdfOptions::default()).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches(" Do\n").count(), 0);
        assert!(!text.contains("/XObject"));
        let report = crate::inspect::inspect_pdf_bytes(&bytes).unwrap();
        assert_eq!(report.image_draws(), 0);
        assert_eq!(report.pages[0].text_runs, vec!["Program (Overview)"]);
    }

    #[test]
    fn jpeg_component_count_comes_from_the_frame_header() {
        let rgb = jpeg_bytes(image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 2)));
        assert_eq!(jpeg_components(&rgb), Some(3));
        let gray = jpeg_bytes(image::DynamicImage::ImageLuma8(image::GrayImage::new(4, 2)));
        assert_eq!(jpeg_components(&gray), Some(1));

        let cmyk_header = [
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xC0, 0x00, 0x14, 0x08, 0x00,
            0x02, 0x00, 0x04, 0x04,
        ];
        assert_eq!(jpeg_components(&cmyk_header), Some(4));
        assert_eq!(jpeg_components(b"not a jpeg"), None);
    }

    #[test]
    fn rgb_and_gray_jpegs_pass_through_as_dct() {
        let rgb = jpeg_bytes(image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 2)));
        let image = decode_image_bytes(&rgb, None).unwrap();
        assert_eq!(image.filter, "/DCTDecode");
        assert_eq!(image.color_space, "/DeviceRGB");
        assert_eq!(image.data, rgb);

        let gray = jpeg_bytes(image::DynamicImage::ImageLuma8(image::GrayImage::new(4, 2)));
        let image = decode_image_bytes(&gray, Some("image/jpeg")).unwrap();
        assert_eq!(image.color_space, "/DeviceGray");
        assert_eq!((image.width, image.height), (4, 2));
    }

    #[test]
    fn compressed_output_is_deterministic() {
        let options = PdfOptions {
            title: Some("Brochure".to_string()),
            compress: true,
            ..PdfOptions::default()
        };
        let doc = sample_document(&[]);
        let first = document_to_pdf(&doc, &options).unwrap();
        let second = document_to_pdf(&doc, &options).unwrap();
        assert_eq!(first, second);
        assert!(String::from_utf8_lossy(&first).contains("/Filter /FlateDecode"));
        let parsed = lopdf::Document::load_mem(&first).unwrap();
        let (_, page_id) = parsed.get_pages().into_iter().next().unwrap();
        let content = parsed.get_page_content(page_id).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("Tj"));
    }
}
