use crate::canvas::Canvas;
use crate::flowable::{Flowable, Pagination};
use crate::font::{StandardFont, renderable_text};
use crate::markup::{self, Inline, TextRun};
use crate::style::{ParagraphStyle, TextAlign};
use crate::types::{Pt, Size};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
struct Fragment {
    text: String,
    font: StandardFont,
    width: Pt,
}

#[derive(Debug, Clone, PartialEq)]
struct Word {
    fragments: Vec<Fragment>,
    width: Pt,
    // Width of the gap that follows this word, in the font of its last fragment.
    space_width: Pt,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(Word),
    LineBreak,
}

#[derive(Debug, Clone)]
struct Line {
    start: usize,
    end: usize,
    width: Pt,
    hard_break: bool,
}

type LayoutCache = Option<(i64, Arc<Vec<Line>>)>;

/// Wrapped block of styled text.
#[derive(Debug, Clone)]
pub struct Paragraph {
    source: String,
    style: Arc<ParagraphStyle>,
    tokens: Vec<Token>,
    justify_last_line: bool,
    space_before: Pt,
    space_after: Pt,
    pagination: Pagination,
    layout_cache: Arc<Mutex<LayoutCache>>,
}

impl Paragraph {
    /// Builds a paragraph from inline markup.
    pub fn new(text: impl Into<String>, style: Arc<ParagraphStyle>) -> Self {
        let source = text.into();
        let inlines = markup::parse(&source);
        Self::from_inlines(source, &inlines, style)
    }

    /// Builds a paragraph from literal text; `\n` starts a new line.
    pub fn plain(text: impl Into<String>, style: Arc<ParagraphStyle>) -> Self {
        let source = text.into();
        let mut inlines = Vec::new();
        for (idx, line) in source.split('\n').enumerate() {
            if idx > 0 {
                inlines.push(Inline::LineBreak);
            }
            inlines.push(Inline::Text(TextRun {
                text: line.to_string(),
                bold: false,
                italic: false,
            }));
        }
        Self::from_inlines(source, &inlines, style)
    }

    fn from_inlines(source: String, inlines: &[Inline], style: Arc<ParagraphStyle>) -> Self {
        let tokens = tokenize(inlines, &style);
        Self {
            source,
            space_before: style.space_before,
            space_after: style.space_after,
            style,
            tokens,
            justify_last_line: false,
            pagination: Pagination::default(),
            layout_cache: Arc::new(Mutex::new(None)),
        }
    }

    /// The text as written, markup included.
    pub fn text(&self) -> &str {
        &self.source
    }

    pub fn style(&self) -> &Arc<ParagraphStyle> {
        &self.style
    }

    /// Rendered text of each line at `avail_width`, words joined by single spaces.
    pub fn line_texts(&self, avail_width: Pt) -> Vec<String> {
        let lines = self.layout_lines(avail_width);
        lines
            .iter()
            .map(|line| {
                self.words(line)
                    .map(|word| {
                        word.fragments
                            .iter()
                            .map(|frag| frag.text.as_str())
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    fn words<'a>(&'a self, line: &Line) -> impl Iterator<Item = &'a Word> + 'a {
        self.tokens[line.start..line.end]
            .iter()
            .filter_map(|token| match token {
                Token::Word(word) => Some(word),
                Token::LineBreak => None,
            })
    }

    fn text_width(&self, avail_width: Pt) -> Pt {
        (avail_width - self.style.left_indent).max(Pt::ZERO)
    }

    fn layout_lines(&self, avail_width: Pt) -> Arc<Vec<Line>> {
        let key = avail_width.to_milli_i64();
        if let Ok(cache) = self.layout_cache.lock() {
            if let Some((cached_key, lines)) = cache.as_ref() {
                if *cached_key == key {
                    return Arc::clone(lines);
                }
            }
        }
        let lines = Arc::new(break_lines(&self.tokens, self.text_width(avail_width)));
        if let Ok(mut cache) = self.layout_cache.lock() {
            *cache = Some((key, Arc::clone(&lines)));
        }
        lines
    }

    fn with_tokens(&self, tokens: Vec<Token>, justify_last_line: bool) -> Paragraph {
        Paragraph {
            source: self.source.clone(),
            style: Arc::clone(&self.style),
            tokens,
            justify_last_line,
            space_before: self.space_before,
            space_after: self.space_after,
            pagination: self.pagination,
            layout_cache: Arc::new(Mutex::new(None)),
        }
    }

    fn draw_line(&self, canvas: &mut Canvas, line: &Line, justify: bool, x: Pt, top: Pt, avail: Pt) {
        let words: Vec<&Word> = self.words(line).collect();
        if words.is_empty() {
            return;
        }
        let slack = (avail - line.width).max(Pt::ZERO);
        let offset = match self.style.alignment {
            TextAlign::Left | TextAlign::Justify => Pt::ZERO,
            TextAlign::Center => slack / 2,
            TextAlign::Right => slack,
        };
        let stretch = if justify && words.len() > 1 {
            slack / (words.len() as i32 - 1)
        } else {
            Pt::ZERO
        };

        let mut cursor = x + offset;
        let mut pending: Option<(Pt, StandardFont, String)> = None;
        for (idx, word) in words.iter().enumerate() {
            if idx > 0 {
                let gap = words[idx - 1].space_width;
                if justify {
                    flush(canvas, &mut pending, top);
                    cursor += gap + stretch;
                } else {
                    if let Some((_, _, text)) = pending.as_mut() {
                        text.push(' ');
                    }
                    cursor += gap;
                }
            }
            for frag in &word.fragments {
                match pending.as_mut() {
                    Some((_, font, text)) if *font == frag.font => text.push_str(&frag.text),
                    _ => {
                        flush(canvas, &mut pending, top);
                        pending = Some((cursor, frag.font, frag.text.clone()));
                    }
                }
                cursor += frag.width;
            }
        }
        flush(canvas, &mut pending, top);
    }
}

fn flush(canvas: &mut Canvas, pending: &mut Option<(Pt, StandardFont, String)>, top: Pt) {
    if let Some((x, font, text)) = pending.take() {
        canvas.set_font(font);
        canvas.draw_string(x, top, text);
    }
}

fn is_break_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn tokenize(inlines: &[Inline], style: &ParagraphStyle) -> Vec<Token> {
    let size = style.font_size;
    let mut tokens = Vec::new();
    let mut current: Vec<(StandardFont, String)> = Vec::new();

    for inline in inlines {
        match inline {
            Inline::LineBreak => {
                finish_word(&mut tokens, &mut current, size);
                tokens.push(Token::LineBreak);
            }
            Inline::Text(run) => {
                let font = style.font.variant(run.bold, run.italic);
                for ch in renderable_text(&run.text).chars() {
                    if is_break_space(ch) {
                        finish_word(&mut tokens, &mut current, size);
                        continue;
                    }
                    match current.last_mut() {
                        Some((last_font, text)) if *last_font == font => text.push(ch),
                        _ => current.push((font, ch.to_string())),
                    }
                }
            }
        }
    }
    finish_word(&mut tokens, &mut current, size);
    tokens
}

fn finish_word(tokens: &mut Vec<Token>, current: &mut Vec<(StandardFont, String)>, size: Pt) {
    if current.is_empty() {
        return;
    }
    let fragments: Vec<Fragment> = current
        .drain(..)
        .map(|(font, text)| Fragment {
            width: font.measure(&text, size),
            font,
            text,
        })
        .collect();
    let width = fragments.iter().map(|frag| frag.width).sum();
    let space_font = fragments
        .last()
        .map(|frag| frag.font)
        .unwrap_or(StandardFont::Helvetica);
    tokens.push(Token::Word(Word {
        fragments,
        width,
        space_width: space_font.measure(" ", size),
    }));
}

// Greedy first-fit: a word joins the line when it fits, otherwise it opens the
// next line. A word wider than the line sits alone on its own line.
fn break_lines(tokens: &[Token], avail: Pt) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0usize;
    let mut width = Pt::ZERO;
    let mut words = 0usize;
    let mut prev_space = Pt::ZERO;

    for (idx, token) in tokens.iter().enumerate() {
        match token {
            Token::LineBreak => {
                lines.push(Line {
                    start,
                    end: idx + 1,
                    width,
                    hard_break: true,
                });
                start = idx + 1;
                width = Pt::ZERO;
                words = 0;
            }
            Token::Word(word) => {
                if words == 0 {
                    width = word.width;
                    words = 1;
                } else if width + prev_space + word.width <= avail {
                    width += prev_space + word.width;
                    words += 1;
                } else {
                    lines.push(Line {
                        start,
                        end: idx,
                        width,
                        hard_break: false,
                    });
                    start = idx;
                    width = word.width;
                    words = 1;
                }
                prev_space = word.space_width;
            }
        }
    }
    if words > 0 {
        lines.push(Line {
            start,
            end: tokens.len(),
            width,
            hard_break: false,
        });
    }
    lines
}

impl Flowable for Paragraph {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        let lines = self.layout_lines(avail_width);
        let widest = lines.iter().fold(Pt::ZERO, |acc, line| acc.max(line.width));
        Size {
            width: (widest + self.style.left_indent).min(avail_width),
            height: self.style.leading * (lines.len() as i32),
        }
    }

    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        let lines = self.layout_lines(avail_width);
        let lh = self.style.leading.to_milli_i64();
        let ah = avail_height.to_milli_i64();
        if lh <= 0 || ah <= 0 {
            return None;
        }
        let total = lines.len();
        let max_lines = (ah / lh) as usize;
        if max_lines == 0 || max_lines >= total {
            return None;
        }

        let mut split_at = max_lines;
        if total - split_at < self.pagination.widows {
            split_at = total.saturating_sub(self.pagination.widows);
        }
        if split_at == 0 || split_at < self.pagination.orphans {
            return None;
        }

        let boundary = &lines[split_at - 1];
        let resume = lines[split_at].start;
        let mut first = self.with_tokens(
            self.tokens[..boundary.end].to_vec(),
            !boundary.hard_break,
        );
        first.space_after = Pt::ZERO;
        let mut second = self.with_tokens(self.tokens[resume..].to_vec(), self.justify_last_line);
        second.space_before = Pt::ZERO;
        Some((Box::new(first), Box::new(second)))
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let lines = self.layout_lines(avail_width);
        let avail = self.text_width(avail_width);
        let left = x + self.style.left_indent;
        canvas.set_fill_color(self.style.text_color);
        canvas.set_font_size(self.style.font_size);
        for (idx, line) in lines.iter().enumerate() {
            let is_last = idx + 1 == lines.len();
            let justify = self.style.alignment == TextAlign::Justify
                && !line.hard_break
                && (!is_last || self.justify_last_line);
            let top = y + self.style.leading * (idx as i32);
            self.draw_line(canvas, line, justify, left, top, avail);
        }
    }

    fn space_before(&self) -> Pt {
        self.space_before
    }

    fn space_after(&self) -> Pt {
        self.space_after
    }

    fn pagination(&self) -> Pagination {
        self.pagination
    }

    fn debug_name(&self) -> &'static str {
        "Paragraph"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::style::StyleSheet;

    fn body() -> Arc<ParagraphStyle> {
        StyleSheet::sample().get("Normal").unwrap()
    }

    fn strings(para: &Paragraph, width: Pt) -> Vec<(Pt, Pt, String)> {
        let mut canvas = Canvas::new(Size::a4());
        para.draw(&mut canvas, Pt::ZERO, Pt::ZERO, width, Pt::from_i32(800));
        canvas.show_page();
        canvas
            .finish()
            .pages
            .remove(0)
            .commands
            .into_iter()
            .filter_map(|cmd| match cmd {
                Command::DrawString { x, y, text } => Some((x, y, text)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn wraps_greedily_at_available_width() {
        // "aaa" is 1668 units, a space 278: two words need 36.14pt at 10pt.
        let para = Paragraph::new("aaa aaa aaa", body());
        assert_eq!(para.line_texts(Pt::from_i32(37)), vec!["aaa aaa", "aaa"]);
        assert_eq!(para.line_texts(Pt::from_i32(36)).len(), 3);
        let size = para.wrap(Pt::from_i32(37), Pt::from_i32(100));
        assert_eq!(size.height, Pt::from_i32(24));
    }

    #[test]
    fn explicit_breaks_start_new_lines() {
        let para = Paragraph::new("\u{2022} one<br/>\u{2022} two", body());
        assert_eq!(
            para.line_texts(Pt::from_i32(400)),
            vec!["\u{2022} one", "\u{2022} two"]
        );
    }

    #[test]
    fn pictographs_are_dropped_and_hyphens_folded() {
        let para = Paragraph::new("\u{1F4CD} data\u{2011}driven", body());
        assert_eq!(para.line_texts(Pt::from_i32(400)), vec!["data-driven"]);
    }

    #[test]
    fn first_baseline_sits_one_font_size_below_top() {
        let para = Paragraph::new("hello", body());
        let drawn = strings(&para, Pt::from_i32(200));
        assert_eq!(drawn.len(), 1);
        // Canvas strings carry the top of the line box; the writer adds the size.
        assert_eq!(drawn[0].1, Pt::ZERO);
    }

    #[test]
    fn centered_lines_share_slack_evenly() {
        let style = Arc::new(body().derive("C").alignment(TextAlign::Center));
        let para = Paragraph::new("aaa", style);
        let drawn = strings(&para, Pt::from_f32(36.68));
        // 36.68 - 16.68 = 20 slack.
        assert_eq!(drawn[0].0, Pt::from_i32(10));
    }

    #[test]
    fn justified_text_stretches_all_but_the_last_line() {
        let style = Arc::new(body().derive("J").alignment(TextAlign::Justify));
        let para = Paragraph::new("aaa aaa aaa", style);
        let drawn = strings(&para, Pt::from_i32(40));
        // Justified first line: each word drawn separately, second flush right.
        assert_eq!(drawn.len(), 3);
        assert_eq!(drawn[0].0, Pt::ZERO);
        assert_eq!(drawn[1].0, Pt::from_f32(40.0 - 16.68));
        assert_eq!(drawn[2].2, "aaa");
        assert_eq!(drawn[2].1, Pt::from_i32(12));
    }

    #[test]
    fn mixed_runs_switch_fonts_mid_line() {
        let para = Paragraph::new("plain <b>bold</b>", body());
        let mut canvas = Canvas::new(Size::a4());
        para.draw(&mut canvas, Pt::ZERO, Pt::ZERO, Pt::from_i32(300), Pt::from_i32(100));
        canvas.show_page();
        let doc = canvas.finish();
        let fonts: Vec<StandardFont> = doc.pages[0]
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::SetFont(font) => Some(*font),
                _ => None,
            })
            .collect();
        assert_eq!(fonts, vec![StandardFont::HelveticaBold]);
    }

    #[test]
    fn left_indent_narrows_and_shifts_lines() {
        let style = Arc::new(body().derive("Indented").left_indent(20.0));
        let para = Paragraph::new("aaa aaa", style);
        assert_eq!(para.line_texts(Pt::from_i32(50)), vec!["aaa", "aaa"]);
        let drawn = strings(&para, Pt::from_i32(50));
        assert_eq!(drawn[0].0, Pt::from_i32(20));
    }

    #[test]
    fn splits_between_lines_and_moves_spacing() {
        let style = Arc::new(body().derive("S").space_before(6.0).space_after(12.0));
        let para = Paragraph::new("aaa aaa aaa aaa aaa", style);
        let width = Pt::from_i32(20);
        assert_eq!(para.line_texts(width).len(), 5);
        let (first, second) = para
            .split(width, Pt::from_i32(30))
            .expect("paragraph should split");
        assert_eq!(first.wrap(width, Pt::from_i32(30)).height, Pt::from_i32(24));
        assert_eq!(second.wrap(width, Pt::from_i32(100)).height, Pt::from_i32(36));
        assert_eq!(first.space_before(), Pt::from_i32(6));
        assert_eq!(first.space_after(), Pt::ZERO);
        assert_eq!(second.space_before(), Pt::ZERO);
        assert_eq!(second.space_after(), Pt::from_i32(12));
    }

    #[test]
    fn refuses_to_leave_an_orphan_line() {
        let para = Paragraph::new("aaa aaa aaa", body());
        assert!(para.split(Pt::from_i32(20), Pt::from_i32(13)).is_none());
    }

    #[test]
    fn plain_text_keeps_markup_characters() {
        let para = Paragraph::plain("<b>x</b>\ny", body());
        assert_eq!(para.line_texts(Pt::from_i32(400)), vec!["<b>x</b>", "y"]);
    }
}
