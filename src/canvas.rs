use crate::font::StandardFont;
use crate::types::{Color, Pt, Rect, Size};

/// Drawing operations recorded in top-down page space (origin at the top-left
/// corner, y growing downwards). The PDF writer flips them into PDF space.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SaveState,
    RestoreState,
    // Non-rendered metadata used for page-aware reporting. Ignored by the PDF writer.
    Meta {
        key: String,
        value: String,
    },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFont(StandardFont),
    SetFontSize(Pt),
    MoveTo {
        x: Pt,
        y: Pt,
    },
    LineTo {
        x: Pt,
        y: Pt,
    },
    Stroke,
    // `y` is the top of the line box; the baseline sits one font size below it.
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
    FillRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
    },
    DrawImage {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        source: String,
    },
}

impl Command {
    fn is_meta(&self) -> bool {
        matches!(self, Command::Meta { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    pub fn image_draws(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::DrawImage { .. }))
            .count()
    }

    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.commands.iter().find_map(|cmd| match cmd {
            Command::Meta { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone)]
struct GraphicsState {
    fill_color: Color,
    stroke_color: Color,
    line_width: Pt,
    font_size: Pt,
    font: StandardFont,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: Pt::from_f32(1.0),
            font_size: Pt::from_f32(12.0),
            font: StandardFont::Helvetica,
        }
    }
}

pub struct Canvas {
    page_size: Size,
    pages: Vec<Page>,
    current: Page,
    state_stack: Vec<GraphicsState>,
    current_state: GraphicsState,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
            current: Page::default(),
            state_stack: Vec::new(),
            current_state: GraphicsState::default(),
        }
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn save_state(&mut self) {
        self.state_stack.push(self.current_state.clone());
        self.current.commands.push(Command::SaveState);
    }

    pub fn restore_state(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.current_state = state;
            self.current.commands.push(Command::RestoreState);
        }
    }

    pub fn record_flowable_bounds(&mut self, rect: Rect) {
        let value = format!(
            "{},{},{},{}",
            rect.x.to_milli_i64(),
            rect.y.to_milli_i64(),
            rect.width.to_milli_i64(),
            rect.height.to_milli_i64()
        );
        self.meta(crate::META_FLOWABLE_BBOX_KEY, value);
    }

    pub fn meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.current.commands.push(Command::Meta {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.current_state.fill_color == color {
            return;
        }
        self.current_state.fill_color = color;
        self.current.commands.push(Command::SetFillColor(color));
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if self.current_state.stroke_color == color {
            return;
        }
        self.current_state.stroke_color = color;
        self.current.commands.push(Command::SetStrokeColor(color));
    }

    pub fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.current_state.line_width == width {
            return;
        }
        self.current_state.line_width = width;
        self.current.commands.push(Command::SetLineWidth(width));
    }

    pub fn set_font(&mut self, font: StandardFont) {
        if self.current_state.font == font {
            return;
        }
        self.current_state.font = font;
        self.current.commands.push(Command::SetFont(font));
    }

    pub fn set_font_size(&mut self, size: Pt) {
        if self.current_state.font_size == size {
            return;
        }
        self.current_state.font_size = size;
        self.current.commands.push(Command::SetFontSize(size));
    }

    pub fn move_to(&mut self, x: Pt, y: Pt) {
        self.current.commands.push(Command::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: Pt, y: Pt) {
        self.current.commands.push(Command::LineTo { x, y });
    }

    pub fn stroke(&mut self) {
        self.current.commands.push(Command::Stroke);
    }

    pub fn line(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt) {
        self.move_to(x1, y1);
        self.line_to(x2, y2);
        self.stroke();
    }

    pub fn draw_string(&mut self, x: Pt, y: Pt, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.current.commands.push(Command::DrawString { x, y, text });
    }

    pub fn fill_rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt) {
        self.current.commands.push(Command::FillRect {
            x,
            y,
            width,
            height,
        });
    }

    pub fn draw_image(&mut self, x: Pt, y: Pt, width: Pt, height: Pt, source: impl Into<String>) {
        self.current.commands.push(Command::DrawImage {
            x,
            y,
            width,
            height,
            source: source.into(),
        });
    }

    pub fn show_page(&mut self) {
        let current = std::mem::take(&mut self.current);
        self.pages.push(current);
        self.state_stack.clear();
        self.current_state = GraphicsState::default();
    }

    pub fn current_command_count(&self) -> usize {
        self.current.commands.len()
    }

    pub fn current_image_draws(&self) -> usize {
        self.current.image_draws()
    }

    /// True when nothing visible has been recorded on the current page.
    pub fn is_current_blank(&self) -> bool {
        self.current.commands.iter().all(Command::is_meta)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn finish(self) -> Document {
        Document {
            page_size: self.page_size,
            pages: self.pages,
        }
    }
}
