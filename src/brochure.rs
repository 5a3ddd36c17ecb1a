//! The MBA in Digital Transformation & AI Leadership brochure: styles, copy
//! and the order in which they are laid out.

use crate::error::Result;
use crate::flowable::HAlign;
use crate::font::StandardFont;
use crate::paragraph::Paragraph;
use crate::story::Story;
use crate::style::{ParagraphStyle, StyleSheet, TextAlign};
use crate::table::{CellContent, CellRange, TableStyle, TableStyleCommand, VAlign};
use crate::types::{Color, Pt, Size, inch};
use crate::Renderer;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_OUTPUT_FILENAME: &str = "MBA_Digital_Transformation_AI_Leadership_Brochure.pdf";
pub const DEFAULT_LOGO_PATH: &str = "img/4.Contoso_uni_Logo_Scritta_horizontal.png";
pub const PAGE_MARGIN: f32 = 50.0;

pub const CONTOSO_BLUE: Color = Color::from_rgb8(0x2f, 0x8a, 0xce);
pub const CONTOSO_GOLD: Color = Color::from_rgb8(0xff, 0xb2, 0x01);
pub const CONTOSO_SECONDARY: Color = Color::from_rgb8(0x1a, 0x5f, 0x8a);

pub const LEARNING_AREAS: [&str; 5] = [
    "Digital Strategy & Business Transformation",
    "Artificial Intelligence for Business Leaders",
    "Data\u{2011}Driven Decision Making",
    "Customer Experience & Growth",
    "Leadership, Change & Organizational Impact",
];

pub const CAREER_OUTCOMES: [&str; 5] = [
    "Digital Transformation Manager",
    "AI & Data Strategy Lead",
    "Product or Innovation Manager",
    "Business Consultant",
    "Future General Manager or Entrepreneur",
];

pub const WEBINAR_TOPICS: [&str; 5] = [
    "MBA structure and value proposition",
    "Career outcomes and success stories",
    "Admissions process and requirements",
    "Live Q&A with faculty and admissions team",
    "Next steps for your application journey",
];

const OVERVIEW: [&str; 3] = [
    "The MBA in Digital Transformation & AI Leadership is designed for professionals who want to accelerate their careers by mastering the strategic, organizational, and leadership implications of digital innovation and artificial intelligence.",
    "The program focuses on how emerging technologies reshape business models, customer experiences, and decision\u{2011}making processes, preparing participants to lead transformation initiatives across industries.",
    "Blending strategy, technology, and leadership, the MBA equips participants with the mindset and tools needed to navigate complexity, drive change, and create sustainable business value in an AI\u{2011}driven economy.",
];

/// Everything that can vary between runs. `Default` is the published brochure.
#[derive(Debug, Clone)]
pub struct BrochureConfig {
    pub output_path: PathBuf,
    pub logo_path: PathBuf,
    pub page_size: Size,
    pub margin: f32,
    pub title: String,
    pub author: String,
    pub debug_log: Option<PathBuf>,
}

impl Default for BrochureConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILENAME),
            logo_path: PathBuf::from(DEFAULT_LOGO_PATH),
            page_size: Size::a4(),
            margin: PAGE_MARGIN,
            title: "MBA in Digital Transformation & AI Leadership".to_string(),
            author: "Contoso University".to_string(),
            debug_log: None,
        }
    }
}

/// Brochure styles, registered on a sample sheet so every parent is known.
#[derive(Debug, Clone)]
pub struct BrochureStyles {
    pub title: Arc<ParagraphStyle>,
    pub subtitle: Arc<ParagraphStyle>,
    pub heading: Arc<ParagraphStyle>,
    pub body: Arc<ParagraphStyle>,
    pub bullet: Arc<ParagraphStyle>,
    pub location: Arc<ParagraphStyle>,
    pub webinar_title: Arc<ParagraphStyle>,
    pub date_time: Arc<ParagraphStyle>,
    pub contact: Arc<ParagraphStyle>,
    pub footer: Arc<ParagraphStyle>,
}

impl BrochureStyles {
    pub fn define(sheet: &mut StyleSheet) -> Result<Self> {
        let heading1 = sheet.get("Heading1")?;
        let heading2 = sheet.get("Heading2")?;
        let body_text = sheet.get("BodyText")?;
        let normal = sheet.get("Normal")?;

        let title = sheet.define(
            heading1
                .derive("CustomTitle")
                .font_size(28.0)
                .text_color(CONTOSO_BLUE)
                .space_after(12.0)
                .alignment(TextAlign::Center)
                .font(StandardFont::HelveticaBold),
        )?;
        let subtitle = sheet.define(
            heading2
                .derive("CustomSubtitle")
                .font_size(16.0)
                .text_color(CONTOSO_SECONDARY)
                .space_after(20.0)
                .alignment(TextAlign::Center)
                .font(StandardFont::Helvetica),
        )?;
        let heading = sheet.define(
            heading2
                .derive("CustomHeading")
                .font_size(18.0)
                .text_color(CONTOSO_BLUE)
                .space_after(10.0)
                .space_before(15.0)
                .font(StandardFont::HelveticaBold),
        )?;
        let body = sheet.define(
            body_text
                .derive("CustomBody")
                .font_size(11.0)
                .space_after(12.0)
                .alignment(TextAlign::Justify)
                .leading(16.0),
        )?;
        let bullet = sheet.define(
            body_text
                .derive("CustomBullet")
                .font_size(11.0)
                .space_after(8.0)
                .left_indent(20.0)
                .leading(14.0),
        )?;
        let location = sheet.define(
            normal
                .derive("Location")
                .font_size(12.0)
                .alignment(TextAlign::Center)
                .text_color(CONTOSO_SECONDARY),
        )?;
        let webinar_title = sheet.define(
            normal
                .derive("WebinarTitle")
                .font_size(14.0)
                .alignment(TextAlign::Center)
                .text_color(CONTOSO_BLUE)
                .font(StandardFont::HelveticaOblique)
                .space_after(15.0),
        )?;
        let date_time = sheet.define(
            normal
                .derive("DateTime")
                .font_size(13.0)
                .alignment(TextAlign::Center)
                .text_color(CONTOSO_SECONDARY)
                .font(StandardFont::HelveticaBold)
                .space_after(15.0),
        )?;
        let contact = sheet.define(
            normal
                .derive("Contact")
                .font_size(11.0)
                .alignment(TextAlign::Center)
                .space_after(8.0),
        )?;
        let footer = sheet.define(
            normal
                .derive("Footer")
                .font_size(9.0)
                .alignment(TextAlign::Center)
                .text_color(Color::GREY),
        )?;

        Ok(Self {
            title,
            subtitle,
            heading,
            body,
            bullet,
            location,
            webinar_title,
            date_time,
            contact,
            footer,
        })
    }
}

/// Builds the full brochure story. The logo is included only when
/// `config.logo_path` exists.
pub fn compose_story(config: &BrochureConfig) -> Result<Story> {
    let mut sheet = StyleSheet::sample();
    let styles = BrochureStyles::define(&mut sheet)?;
    let logo = logo_source(&config.logo_path);
    let mut story = Story::new();

    if let Some(source) = &logo {
        story.image(source.clone(), inch(4.0), inch(1.0), HAlign::Center);
        story.spacer(20.0);
    }
    add_masthead(&mut story, &styles);
    add_overview(&mut story, &styles);
    add_audience(&mut story, &styles);
    add_bullet_section(&mut story, &styles, "Key Learning Areas", None, &LEARNING_AREAS);
    story.spacer(20.0);
    add_bullet_section(
        &mut story,
        &styles,
        "Career Outcomes",
        Some("Graduates of the program typically pursue roles such as:"),
        &CAREER_OUTCOMES,
    );
    story.spacer(25.0);

    story.page_break();

    if let Some(source) = &logo {
        story.image(source.clone(), inch(3.0), inch(0.75), HAlign::Center);
        story.spacer(20.0);
    }
    add_webinar(&mut story, &styles);
    add_next_steps(&mut story, &styles);
    add_contact(&mut story, &styles);
    story.paragraph("© 2026 Contoso University. All rights reserved.", &styles.footer);

    log::debug!(
        "composed {} elements (logo {})",
        story.len(),
        if logo.is_some() { "found" } else { "missing" }
    );
    Ok(story)
}

fn logo_source(path: &Path) -> Option<String> {
    if path.exists() {
        Some(path.to_string_lossy().into_owned())
    } else {
        log::debug!("logo {} not found; skipping", path.display());
        None
    }
}

fn add_masthead(story: &mut Story, styles: &BrochureStyles) {
    story.paragraph("MBA in Digital Transformation & AI Leadership", &styles.title);
    story.spacer(10.0);
    story.paragraph(
        "Lead business transformation through data\u{2011}driven strategy, AI, and modern leadership",
        &styles.subtitle,
    );
    story.spacer(5.0);
    story.paragraph("📍 Contoso University, Monteverde, Italy", &styles.location);
    story.spacer(25.0);
}

fn add_overview(story: &mut Story, styles: &BrochureStyles) {
    story.paragraph("Program Overview", &styles.heading);
    for text in OVERVIEW {
        story.paragraph(text, &styles.body);
    }
    story.spacer(15.0);
}

fn add_audience(story: &mut Story, styles: &BrochureStyles) {
    story.paragraph("Who Should Apply", &styles.heading);

    let header = |text: &str| CellContent::from(Paragraph::new(text, Arc::clone(&styles.body)));
    let bullets = |text: &str| CellContent::from(Paragraph::new(text, Arc::clone(&styles.bullet)));
    let rows = vec![
        vec![
            header("<b>Experienced Professionals & Alumni</b>"),
            header("<b>Prospective Students</b>"),
        ],
        vec![
            bullets(
                "• 5+ years of professional experience<br/>• Seeking career acceleration and leadership roles<br/>• Interested in digital and AI\u{2011}driven initiatives",
            ),
            bullets(
                "• Graduates exploring MBA options<br/>• Interested in digital transformation and AI<br/>• Looking for an English\u{2011}taught program",
            ),
        ],
    ];
    let style = TableStyle::new()
        .with(CellRange::row(0), TableStyleCommand::Background(CONTOSO_BLUE))
        .with(CellRange::row(0), TableStyleCommand::TextColor(Color::WHITE))
        .with(CellRange::all(), TableStyleCommand::Align(TextAlign::Left))
        .with(CellRange::all(), TableStyleCommand::VAlign(VAlign::Top))
        .with(CellRange::all(), TableStyleCommand::Padding(Pt::from_i32(12)))
        .with(
            CellRange::all(),
            TableStyleCommand::Grid {
                width: Pt::from_i32(1),
                color: Color::GREY,
            },
        );
    story.table(rows, vec![inch(3.5); 2], style);
    story.spacer(20.0);
}

fn add_bullet_section(
    story: &mut Story,
    styles: &BrochureStyles,
    heading: &str,
    intro: Option<&str>,
    items: &[&str],
) {
    story.paragraph(heading, &styles.heading);
    if let Some(intro) = intro {
        story.paragraph(intro, &styles.body);
    }
    for item in items {
        story.paragraph(format!("• {item}"), &styles.bullet);
    }
}

fn add_webinar(story: &mut Story, styles: &BrochureStyles) {
    story.paragraph("Join Our Information Webinar", &styles.heading);
    story.paragraph(
        "\"From Digital Transformation to AI Leadership: How an MBA Can Accelerate Your Career\"",
        &styles.webinar_title,
    );
    story.paragraph(
        "📅 February 27, 2026 | ⏰ 5:00 PM - 6:00 PM (CET)",
        &styles.date_time,
    );
    story.paragraph("What You'll Learn:", &styles.body);
    for topic in WEBINAR_TOPICS {
        story.paragraph(format!("• {topic}"), &styles.bullet);
    }
    story.spacer(25.0);
}

fn add_next_steps(story: &mut Story, styles: &BrochureStyles) {
    story.paragraph("Take the Next Step", &styles.heading);
    let rows: Vec<Vec<CellContent>> = vec![
        vec![
            "📅 Register for Webinar".into(),
            "📄 Download Brochure".into(),
            "💬 Book Consultation".into(),
        ],
        vec![
            "Join our information session".into(),
            "Get detailed information".into(),
            "Schedule a 1:1 call with admissions".into(),
        ],
    ];
    let style = TableStyle::new()
        .with(CellRange::row(0), TableStyleCommand::Background(CONTOSO_GOLD))
        .with(CellRange::row(0), TableStyleCommand::TextColor(Color::BLACK))
        .with(CellRange::all(), TableStyleCommand::Align(TextAlign::Center))
        .with(CellRange::all(), TableStyleCommand::VAlign(VAlign::Middle))
        .with(CellRange::all(), TableStyleCommand::Padding(Pt::from_i32(12)))
        .with(
            CellRange::all(),
            TableStyleCommand::Grid {
                width: Pt::from_i32(1),
                color: CONTOSO_BLUE,
            },
        )
        .with(
            CellRange::row(0),
            TableStyleCommand::FontName(StandardFont::HelveticaBold),
        )
        .with(CellRange::row(0), TableStyleCommand::FontSize(Pt::from_i32(11)));
    story.table(rows, vec![inch(2.3); 3], style);
    story.spacer(30.0);
}

fn add_contact(story: &mut Story, styles: &BrochureStyles) {
    story.paragraph("Contact Information", &styles.heading);
    story.paragraph("<b>Contoso University</b>", &styles.contact);
    story.paragraph(
        "Via della Innovazione, 42 - 20100 Monteverde (MV), Italy",
        &styles.contact,
    );
    story.paragraph(
        "Email: mba@contosouniversity.it | Phone: +39 045 123 4567",
        &styles.contact,
    );
    story.spacer(20.0);
}

/// Composes the brochure and writes it to `config.output_path`.
pub fn create_brochure(config: &BrochureConfig) -> Result<PathBuf> {
    let story = compose_story(config)?;
    let mut builder = Renderer::builder()
        .page_size(config.page_size)
        .margin_all(config.margin)
        .document_title(config.title.clone())
        .document_author(config.author.clone());
    if let Some(path) = &config.debug_log {
        builder = builder.debug_log(path.clone());
    }
    let renderer = builder.build()?;
    let bytes = renderer.render_to_file(story, &config.output_path)?;
    log::info!(
        "wrote {} ({bytes} bytes)",
        config.output_path.display()
    );
    Ok(config.output_path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{Element, ElementKind};
    use crate::table::TableFlowable;

    fn config_without_logo() -> BrochureConfig {
        BrochureConfig {
            logo_path: PathBuf::from("no/such/logo.png"),
            ..BrochureConfig::default()
        }
    }

    fn tables(story: &Story) -> Vec<TableFlowable> {
        story
            .elements()
            .iter()
            .filter_map(|element| match element {
                Element::Table {
                    rows,
                    col_widths,
                    style,
                } => Some(TableFlowable::new(rows.clone(), col_widths.clone(), style).unwrap()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn palette_matches_the_brand_hex_codes() {
        assert_eq!(Color::from_hex("#2F8ACE").unwrap(), CONTOSO_BLUE);
        assert_eq!(Color::from_hex("#FFB201").unwrap(), CONTOSO_GOLD);
        assert_eq!(Color::from_hex("#1a5f8a").unwrap(), CONTOSO_SECONDARY);
    }

    #[test]
    fn styles_inherit_from_the_sample_sheet() {
        let mut sheet = StyleSheet::sample();
        let styles = BrochureStyles::define(&mut sheet).unwrap();
        assert_eq!(styles.title.font_size, Pt::from_i32(28));
        // Leading is inherited from Heading1.
        assert_eq!(styles.title.leading, Pt::from_i32(22));
        assert_eq!(styles.heading.space_before, Pt::from_i32(15));
        assert_eq!(styles.body.alignment, TextAlign::Justify);
        assert_eq!(styles.bullet.space_before, Pt::from_i32(6));
        assert_eq!(styles.bullet.left_indent, Pt::from_i32(20));
        assert_eq!(styles.webinar_title.font, StandardFont::HelveticaOblique);
        assert_eq!(styles.footer.text_color, Color::GREY);
        assert_eq!(styles.footer.parent.as_deref(), Some("Normal"));
        assert!(sheet.contains("CustomBullet"));

        // Styles are defined once per sheet.
        assert!(BrochureStyles::define(&mut sheet).is_err());
    }

    #[test]
    fn story_without_logo_has_no_images() {
        let story = compose_story(&config_without_logo()).unwrap();
        assert_eq!(story.count(ElementKind::Image), 0);
        assert_eq!(story.count(ElementKind::PageBreak), 1);
        assert_eq!(story.count(ElementKind::Table), 2);
    }

    #[test]
    fn story_with_logo_places_it_on_both_pages() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, b"placeholder").unwrap();
        let config = BrochureConfig {
            logo_path: logo,
            ..BrochureConfig::default()
        };
        let story = compose_story(&config).unwrap();
        let kinds: Vec<ElementKind> = story.elements().iter().map(|el| el.kind()).collect();
        assert_eq!(kinds[0], ElementKind::Image);
        let page_break = kinds
            .iter()
            .position(|kind| *kind == ElementKind::PageBreak)
            .unwrap();
        assert_eq!(kinds[page_break + 1], ElementKind::Image);
        assert_eq!(story.count(ElementKind::Image), 2);
        match &story.elements()[page_break + 1] {
            Element::Image { width, height, .. } => {
                assert_eq!(*width, inch(3.0));
                assert_eq!(*height, inch(0.75));
            }
            other => panic!("expected the second logo, got {other:?}"),
        }
    }

    #[test]
    fn learning_areas_follow_their_heading_in_order() {
        let story = compose_story(&config_without_logo()).unwrap();
        let texts: Vec<String> = story
            .elements()
            .iter()
            .filter_map(|element| match element {
                Element::Paragraph { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        let start = texts
            .iter()
            .position(|text| text == "Key Learning Areas")
            .unwrap();
        let expected: Vec<String> = LEARNING_AREAS.iter().map(|area| format!("• {area}")).collect();
        assert_eq!(texts[start + 1..start + 6], expected[..]);
        assert_eq!(texts[start + 6], "Career Outcomes");
    }

    #[test]
    fn tables_have_their_fixed_shapes() {
        let story = compose_story(&config_without_logo()).unwrap();
        let tables = tables(&story);
        assert_eq!(tables.len(), 2);

        let audience = &tables[0];
        assert_eq!((audience.row_count(), audience.col_count()), (2, 2));
        assert_eq!(audience.col_widths(), &[inch(3.5), inch(3.5)]);
        let header = audience.cell_style(1, 0).unwrap();
        assert_eq!(header.background, Some(CONTOSO_BLUE));
        assert_eq!(header.valign, VAlign::Top);
        assert_eq!(header.padding_left, Pt::from_i32(12));

        let steps = &tables[1];
        assert_eq!((steps.row_count(), steps.col_count()), (2, 3));
        for col in 0..3 {
            let header = steps.cell_style(col, 0).unwrap();
            assert_eq!(header.font, StandardFont::HelveticaBold);
            assert_eq!(header.font_size, Pt::from_i32(11));
            assert_eq!(header.background, Some(CONTOSO_GOLD));
            let body = steps.cell_style(col, 1).unwrap();
            assert_eq!(body.font, StandardFont::Helvetica);
            assert_eq!(body.valign, VAlign::Middle);
            assert_eq!(body.alignment, TextAlign::Center);
        }
    }

    #[test]
    fn composing_twice_yields_the_same_structure() {
        let config = config_without_logo();
        let a = compose_story(&config).unwrap();
        let b = compose_story(&config).unwrap();
        assert_eq!(a.outline(), b.outline());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }
}
