use crate::error::{BrochureError, Result};
use crate::font::StandardFont;
use crate::types::{Color, Pt};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Named typographic attributes shared by paragraphs. Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphStyle {
    pub name: String,
    pub parent: Option<String>,
    pub font: StandardFont,
    pub font_size: Pt,
    pub leading: Pt,
    pub text_color: Color,
    pub alignment: TextAlign,
    pub space_before: Pt,
    pub space_after: Pt,
    pub left_indent: Pt,
}

impl ParagraphStyle {
    /// The root style every sample style derives from.
    pub fn normal() -> Self {
        Self {
            name: "Normal".to_string(),
            parent: None,
            font: StandardFont::Helvetica,
            font_size: Pt::from_i32(10),
            leading: Pt::from_i32(12),
            text_color: Color::BLACK,
            alignment: TextAlign::Left,
            space_before: Pt::ZERO,
            space_after: Pt::ZERO,
            left_indent: Pt::ZERO,
        }
    }

    /// Starts a new style inheriting every attribute of `self`.
    pub fn derive(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(self.name.clone()),
            ..self.clone()
        }
    }

    pub fn font(mut self, font: StandardFont) -> Self {
        self.font = font;
        self
    }

    /// Sets the font size. Leading is inherited unchanged.
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = Pt::from_f32(size);
        self
    }

    pub fn leading(mut self, leading: f32) -> Self {
        self.leading = Pt::from_f32(leading);
        self
    }

    pub fn text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn alignment(mut self, alignment: TextAlign) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn space_before(mut self, space: f32) -> Self {
        self.space_before = Pt::from_f32(space);
        self
    }

    pub fn space_after(mut self, space: f32) -> Self {
        self.space_after = Pt::from_f32(space);
        self
    }

    pub fn left_indent(mut self, indent: f32) -> Self {
        self.left_indent = Pt::from_f32(indent);
        self
    }
}

/// Registry of named paragraph styles.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: BTreeMap<String, Arc<ParagraphStyle>>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Normal`, `BodyText`, `Heading1` and `Heading2`.
    pub fn sample() -> Self {
        let normal = ParagraphStyle::normal();
        let body = normal.derive("BodyText").space_before(6.0);
        let heading1 = normal
            .derive("Heading1")
            .font(StandardFont::HelveticaBold)
            .font_size(18.0)
            .leading(22.0)
            .space_after(6.0);
        let heading2 = normal
            .derive("Heading2")
            .font(StandardFont::HelveticaBold)
            .font_size(14.0)
            .leading(18.0)
            .space_before(12.0)
            .space_after(6.0);

        let mut sheet = Self::new();
        for style in [normal, body, heading1, heading2] {
            sheet
                .styles
                .insert(style.name.clone(), Arc::new(style));
        }
        sheet
    }

    pub fn define(&mut self, style: ParagraphStyle) -> Result<Arc<ParagraphStyle>> {
        if self.styles.contains_key(&style.name) {
            return Err(BrochureError::DuplicateStyle(style.name));
        }
        if let Some(parent) = &style.parent {
            if !self.styles.contains_key(parent) {
                return Err(BrochureError::UndefinedStyle(parent.clone()));
            }
        }
        let style = Arc::new(style);
        self.styles.insert(style.name.clone(), Arc::clone(&style));
        Ok(style)
    }

    pub fn get(&self, name: &str) -> Result<Arc<ParagraphStyle>> {
        self.styles
            .get(name)
            .cloned()
            .ok_or_else(|| BrochureError::UndefinedStyle(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_sheet_matches_reference_values() {
        let sheet = StyleSheet::sample();
        let h1 = sheet.get("Heading1").unwrap();
        assert_eq!(h1.font, StandardFont::HelveticaBold);
        assert_eq!(h1.font_size, Pt::from_i32(18));
        assert_eq!(h1.leading, Pt::from_i32(22));
        assert_eq!(h1.space_after, Pt::from_i32(6));

        let body = sheet.get("BodyText").unwrap();
        assert_eq!(body.font_size, Pt::from_i32(10));
        assert_eq!(body.space_before, Pt::from_i32(6));
        assert_eq!(body.parent.as_deref(), Some("Normal"));
        assert_eq!(sheet.names().count(), 4);
    }

    #[test]
    fn derived_styles_inherit_unset_attributes() {
        let sheet = StyleSheet::sample();
        let title = sheet
            .get("Heading1")
            .unwrap()
            .derive("CustomTitle")
            .font_size(28.0)
            .alignment(TextAlign::Center);
        assert_eq!(title.font, StandardFont::HelveticaBold);
        assert_eq!(title.leading, Pt::from_i32(22));
        assert_eq!(title.space_after, Pt::from_i32(6));
        assert_eq!(title.alignment, TextAlign::Center);
    }

    #[test]
    fn redefining_a_style_is_rejected() {
        let mut sheet = StyleSheet::sample();
        let dup = ParagraphStyle::normal();
        assert!(matches!(
            sheet.define(dup),
            Err(BrochureError::DuplicateStyle(name)) if name == "Normal"
        ));
    }

    #[test]
    fn unknown_styles_are_errors() {
        let mut sheet = StyleSheet::sample();
        assert!(matches!(
            sheet.get("CustomBody"),
            Err(BrochureError::UndefinedStyle(_))
        ));
        let mut orphan = ParagraphStyle::normal().derive("Orphan");
        orphan.parent = Some("Missing".to_string());
        assert!(sheet.define(orphan).is_err());
    }
}
