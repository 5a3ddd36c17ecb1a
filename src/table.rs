use crate::canvas::Canvas;
use crate::error::{BrochureError, Result};
use crate::flowable::{Flowable, HAlign};
use crate::font::StandardFont;
use crate::paragraph::Paragraph;
use crate::style::{ParagraphStyle, TextAlign};
use crate::types::{Color, Pt, Size};
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    Middle,
    #[default]
    Bottom,
}

/// Rectangular block of cells addressed by `(column, row)` corners. Negative
/// indices count back from the last column or row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

impl CellRange {
    pub fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        Self { start, end }
    }

    pub fn all() -> Self {
        Self::new((0, 0), (-1, -1))
    }

    pub fn row(row: i32) -> Self {
        Self::new((0, row), (-1, row))
    }

    /// Inclusive `(col0, col1, row0, row1)` bounds inside a `cols` x `rows` grid.
    fn bounds(&self, cols: usize, rows: usize) -> Option<(usize, usize, usize, usize)> {
        let (c0, c1) = resolve_span(self.start.0, self.end.0, cols)?;
        let (r0, r1) = resolve_span(self.start.1, self.end.1, rows)?;
        Some((c0, c1, r0, r1))
    }

    fn contains(&self, col: usize, row: usize, cols: usize, rows: usize) -> bool {
        self.bounds(cols, rows)
            .is_some_and(|(c0, c1, r0, r1)| (c0..=c1).contains(&col) && (r0..=r1).contains(&row))
    }
}

fn resolve_span(start: i32, end: i32, len: usize) -> Option<(usize, usize)> {
    let resolve = |index: i32| -> i64 {
        if index < 0 {
            len as i64 + index as i64
        } else {
            index as i64
        }
    };
    let last = len as i64 - 1;
    let (a, b) = (resolve(start).max(0), resolve(end).min(last));
    if len == 0 || a > b {
        return None;
    }
    Some((a as usize, b as usize))
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableStyleCommand {
    Background(Color),
    TextColor(Color),
    Align(TextAlign),
    VAlign(VAlign),
    /// Same padding on all four sides.
    Padding(Pt),
    /// Outer box plus every inner line of the range.
    Grid { width: Pt, color: Color },
    FontName(StandardFont),
    FontSize(Pt),
}

/// Ordered formatting commands; later commands win for the same cell.
#[derive(Debug, Clone, Default)]
pub struct TableStyle {
    commands: Vec<(CellRange, TableStyleCommand)>,
}

impl TableStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, range: CellRange, command: TableStyleCommand) -> Self {
        self.add(range, command);
        self
    }

    pub fn add(&mut self, range: CellRange, command: TableStyleCommand) {
        self.commands.push((range, command));
    }

    pub fn commands(&self) -> &[(CellRange, TableStyleCommand)] {
        &self.commands
    }
}

/// Formatting resolved for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub background: Option<Color>,
    pub text_color: Color,
    pub alignment: TextAlign,
    pub valign: VAlign,
    pub padding_top: Pt,
    pub padding_right: Pt,
    pub padding_bottom: Pt,
    pub padding_left: Pt,
    pub font: StandardFont,
    pub font_size: Pt,
    pub leading: Pt,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            background: None,
            text_color: Color::BLACK,
            alignment: TextAlign::Left,
            valign: VAlign::Bottom,
            padding_top: Pt::from_i32(3),
            padding_right: Pt::from_i32(6),
            padding_bottom: Pt::from_i32(3),
            padding_left: Pt::from_i32(6),
            font: StandardFont::Helvetica,
            font_size: Pt::from_i32(10),
            leading: Pt::from_i32(12),
        }
    }
}

impl CellStyle {
    fn apply(&mut self, command: &TableStyleCommand) {
        match command {
            TableStyleCommand::Background(color) => self.background = Some(*color),
            TableStyleCommand::TextColor(color) => self.text_color = *color,
            TableStyleCommand::Align(align) => self.alignment = *align,
            TableStyleCommand::VAlign(valign) => self.valign = *valign,
            TableStyleCommand::Padding(pad) => {
                self.padding_top = *pad;
                self.padding_right = *pad;
                self.padding_bottom = *pad;
                self.padding_left = *pad;
            }
            TableStyleCommand::FontName(font) => self.font = *font,
            TableStyleCommand::FontSize(size) => {
                self.font_size = *size;
                self.leading = self.leading.max(*size * 1.2);
            }
            TableStyleCommand::Grid { .. } => {}
        }
    }

    fn text_style(&self) -> Arc<ParagraphStyle> {
        let mut style = ParagraphStyle::normal().derive("TableCell");
        style.parent = None;
        style.font = self.font;
        style.font_size = self.font_size;
        style.leading = self.leading;
        style.text_color = self.text_color;
        style.alignment = self.alignment;
        Arc::new(style)
    }
}

/// Cell payload as supplied by the caller.
#[derive(Debug, Clone)]
pub enum CellContent {
    /// Literal text formatted by the table style.
    Text(String),
    /// Styled paragraph that keeps its own paragraph style.
    Paragraph(Paragraph),
}

impl From<&str> for CellContent {
    fn from(value: &str) -> Self {
        CellContent::Text(value.to_string())
    }
}

impl From<Paragraph> for CellContent {
    fn from(value: Paragraph) -> Self {
        CellContent::Paragraph(value)
    }
}

#[derive(Debug)]
struct Cell {
    style: CellStyle,
    content: Paragraph,
    content_height: Pt,
}

#[derive(Debug)]
struct Grid {
    col_widths: Vec<Pt>,
    cells: Vec<Vec<Cell>>,
    row_heights: Vec<Pt>,
    rules: Vec<(CellRange, Pt, Color)>,
}

/// Grid of cells with fixed column widths. Splits between rows.
#[derive(Debug, Clone)]
pub struct TableFlowable {
    grid: Arc<Grid>,
    rows: Range<usize>,
}

impl TableFlowable {
    pub fn new(
        rows: Vec<Vec<CellContent>>,
        col_widths: Vec<Pt>,
        style: &TableStyle,
    ) -> Result<Self> {
        let cols = col_widths.len();
        if rows.is_empty() || cols == 0 {
            return Err(BrochureError::InvalidConfiguration(
                "table needs at least one row and one column".to_string(),
            ));
        }
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(BrochureError::InvalidConfiguration(format!(
                "table row {index} has {} cells, expected {cols}",
                row.len()
            )));
        }

        let row_count = rows.len();
        let mut cells = Vec::with_capacity(row_count);
        let mut row_heights = Vec::with_capacity(row_count);
        for (row_index, row) in rows.into_iter().enumerate() {
            let mut resolved_row = Vec::with_capacity(cols);
            let mut row_height = Pt::ZERO;
            for (col_index, content) in row.into_iter().enumerate() {
                let mut cell_style = CellStyle::default();
                for (range, command) in style.commands() {
                    if range.contains(col_index, row_index, cols, row_count) {
                        cell_style.apply(command);
                    }
                }
                let content = match content {
                    CellContent::Text(text) => Paragraph::plain(text, cell_style.text_style()),
                    CellContent::Paragraph(paragraph) => paragraph,
                };
                let inner = (col_widths[col_index]
                    - cell_style.padding_left
                    - cell_style.padding_right)
                    .max(Pt::ZERO);
                let content_height = content.wrap(inner, Pt::from_f32(1.0e6)).height;
                row_height = row_height
                    .max(content_height + cell_style.padding_top + cell_style.padding_bottom);
                resolved_row.push(Cell {
                    style: cell_style,
                    content,
                    content_height,
                });
            }
            cells.push(resolved_row);
            row_heights.push(row_height);
        }

        let rules = style
            .commands()
            .iter()
            .filter_map(|(range, command)| match command {
                TableStyleCommand::Grid { width, color } => Some((*range, *width, *color)),
                _ => None,
            })
            .collect();

        Ok(Self {
            grid: Arc::new(Grid {
                col_widths,
                cells,
                row_heights,
                rules,
            }),
            rows: 0..row_count,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.grid.col_widths.len()
    }

    pub fn col_widths(&self) -> &[Pt] {
        &self.grid.col_widths
    }

    /// Absolute row indices covered by this part of the table.
    pub fn row_span(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Resolved formatting of the cell at `(col, row)` in the whole table.
    pub fn cell_style(&self, col: usize, row: usize) -> Option<&CellStyle> {
        self.grid.cells.get(row)?.get(col).map(|cell| &cell.style)
    }

    pub fn width(&self) -> Pt {
        self.grid.col_widths.iter().sum()
    }

    fn height(&self) -> Pt {
        self.grid.row_heights[self.rows.clone()].iter().sum()
    }

    fn part(&self, rows: Range<usize>) -> TableFlowable {
        TableFlowable {
            grid: Arc::clone(&self.grid),
            rows,
        }
    }

    fn draw_rules(&self, canvas: &mut Canvas, col_x: &[Pt], row_y: &[Pt]) {
        let cols = self.col_count();
        let total_rows = self.grid.row_heights.len();
        for (range, width, color) in &self.grid.rules {
            let Some((c0, c1, r0, r1)) = range.bounds(cols, total_rows) else {
                continue;
            };
            let r0 = r0.max(self.rows.start);
            let r1 = r1.min(self.rows.end - 1);
            if r0 > r1 {
                continue;
            }
            // Indices into the part-local boundary arrays.
            let (lr0, lr1) = (r0 - self.rows.start, r1 + 1 - self.rows.start);
            canvas.set_stroke_color(*color);
            canvas.set_line_width(*width);
            for y in &row_y[lr0..=lr1] {
                canvas.line(col_x[c0], *y, col_x[c1 + 1], *y);
            }
            for x in &col_x[c0..=c1 + 1] {
                canvas.line(*x, row_y[lr0], *x, row_y[lr1]);
            }
        }
    }
}

impl Flowable for TableFlowable {
    fn wrap(&self, _avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        let mut used = Pt::ZERO;
        let mut fit = 0usize;
        for row in self.rows.clone() {
            let next = used + self.grid.row_heights[row];
            if next > avail_height {
                break;
            }
            used = next;
            fit += 1;
        }
        if fit == 0 || fit >= self.rows.len() {
            return None;
        }
        let cut = self.rows.start + fit;
        Some((
            Box::new(self.part(self.rows.start..cut)),
            Box::new(self.part(cut..self.rows.end)),
        ))
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let left = x + HAlign::Center.offset(self.width(), avail_width);

        let mut col_x = Vec::with_capacity(self.col_count() + 1);
        let mut cursor = left;
        col_x.push(cursor);
        for width in &self.grid.col_widths {
            cursor += *width;
            col_x.push(cursor);
        }
        let mut row_y = Vec::with_capacity(self.rows.len() + 1);
        let mut cursor = y;
        row_y.push(cursor);
        for row in self.rows.clone() {
            cursor += self.grid.row_heights[row];
            row_y.push(cursor);
        }

        for (local, row) in self.rows.clone().enumerate() {
            for (col, cell) in self.grid.cells[row].iter().enumerate() {
                if let Some(background) = cell.style.background {
                    canvas.set_fill_color(background);
                    canvas.fill_rect(
                        col_x[col],
                        row_y[local],
                        self.grid.col_widths[col],
                        self.grid.row_heights[row],
                    );
                }
            }
        }

        for (local, row) in self.rows.clone().enumerate() {
            let row_height = self.grid.row_heights[row];
            for (col, cell) in self.grid.cells[row].iter().enumerate() {
                let style = &cell.style;
                let inner = (self.grid.col_widths[col] - style.padding_left - style.padding_right)
                    .max(Pt::ZERO);
                let slack = (row_height - style.padding_top - style.padding_bottom
                    - cell.content_height)
                    .max(Pt::ZERO);
                let top = row_y[local]
                    + style.padding_top
                    + match style.valign {
                        VAlign::Top => Pt::ZERO,
                        VAlign::Middle => slack / 2,
                        VAlign::Bottom => slack,
                    };
                cell.content.draw(
                    canvas,
                    col_x[col] + style.padding_left,
                    top,
                    inner,
                    cell.content_height,
                );
            }
        }

        self.draw_rules(canvas, &col_x, &row_y);
    }

    fn debug_name(&self) -> &'static str {
        "Table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::style::StyleSheet;
    use crate::types::inch;

    fn steps_style() -> TableStyle {
        let gold = Color::from_rgb8(0xff, 0xb2, 0x01);
        TableStyle::new()
            .with(CellRange::row(0), TableStyleCommand::Background(gold))
            .with(CellRange::all(), TableStyleCommand::Align(TextAlign::Center))
            .with(CellRange::all(), TableStyleCommand::VAlign(VAlign::Middle))
            .with(CellRange::all(), TableStyleCommand::Padding(Pt::from_i32(12)))
            .with(
                CellRange::all(),
                TableStyleCommand::Grid {
                    width: Pt::from_i32(1),
                    color: Color::BLACK,
                },
            )
            .with(
                CellRange::row(0),
                TableStyleCommand::FontName(StandardFont::HelveticaBold),
            )
            .with(CellRange::row(0), TableStyleCommand::FontSize(Pt::from_i32(11)))
    }

    fn steps_table() -> TableFlowable {
        TableFlowable::new(
            vec![
                vec!["A".into(), "B".into(), "C".into()],
                vec!["a".into(), "b".into(), "c".into()],
            ],
            vec![inch(2.3); 3],
            &steps_style(),
        )
        .unwrap()
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let range = CellRange::new((1, -1), (-1, -1));
        assert_eq!(range.bounds(3, 4), Some((1, 2, 3, 3)));
        assert!(range.contains(2, 3, 3, 4));
        assert!(!range.contains(0, 3, 3, 4));
        assert_eq!(CellRange::new((5, 0), (6, 0)).bounds(3, 1), None);
    }

    #[test]
    fn style_commands_resolve_per_cell() {
        let table = steps_table();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.col_count(), 3);
        let header = table.cell_style(0, 0).unwrap();
        assert_eq!(header.font, StandardFont::HelveticaBold);
        assert_eq!(header.font_size, Pt::from_i32(11));
        assert_eq!(header.leading, Pt::from_f32(13.2));
        assert_eq!(header.padding_left, Pt::from_i32(12));
        let body = table.cell_style(2, 1).unwrap();
        assert_eq!(body.font, StandardFont::Helvetica);
        assert_eq!(body.background, None);
        assert_eq!(body.valign, VAlign::Middle);
    }

    #[test]
    fn rows_are_as_tall_as_their_tallest_cell() {
        let table = steps_table();
        let size = table.wrap(Pt::from_i32(400), Pt::from_i32(800));
        // Header: 13.2 leading + 24 padding; body: 12 + 24.
        assert_eq!(size.height, Pt::from_f32(37.2 + 36.0));
        assert_eq!(size.width, inch(6.9));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = TableFlowable::new(
            vec![vec!["a".into()], vec!["b".into(), "c".into()]],
            vec![inch(1.0)],
            &TableStyle::new(),
        )
        .unwrap_err();
        assert!(matches!(err, BrochureError::InvalidConfiguration(_)));
    }

    #[test]
    fn paragraph_cells_keep_their_own_style() {
        let sheet = StyleSheet::sample();
        let para = Paragraph::new("<b>Header</b>", sheet.get("BodyText").unwrap());
        let table = TableFlowable::new(
            vec![vec![para.into()]],
            vec![inch(3.5)],
            &TableStyle::new().with(CellRange::all(), TableStyleCommand::TextColor(Color::WHITE)),
        )
        .unwrap();
        let mut canvas = Canvas::new(Size::a4());
        table.draw(&mut canvas, Pt::ZERO, Pt::ZERO, inch(3.5), Pt::from_i32(100));
        canvas.show_page();
        let doc = canvas.finish();
        assert!(
            !doc.pages[0]
                .commands
                .iter()
                .any(|cmd| matches!(cmd, Command::SetFillColor(c) if *c == Color::WHITE))
        );
    }

    #[test]
    fn splits_between_rows_and_keeps_absolute_indices() {
        let table = steps_table();
        let (first, second) = table
            .split(Pt::from_i32(400), Pt::from_i32(50))
            .expect("table should split");
        assert_eq!(first.wrap(Pt::ZERO, Pt::ZERO).height, Pt::from_f32(37.2));
        assert_eq!(second.wrap(Pt::ZERO, Pt::ZERO).height, Pt::from_i32(36));
        assert!(table.split(Pt::from_i32(400), Pt::from_i32(20)).is_none());
    }

    #[test]
    fn grid_draws_every_boundary_once() {
        let table = steps_table();
        let mut canvas = Canvas::new(Size::a4());
        table.draw(&mut canvas, Pt::ZERO, Pt::ZERO, inch(6.9), Pt::from_i32(800));
        canvas.show_page();
        let doc = canvas.finish();
        let strokes = doc.pages[0]
            .commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::Stroke))
            .count();
        // Three horizontal boundaries and four vertical ones.
        assert_eq!(strokes, 7);
        let fills = doc.pages[0]
            .commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::FillRect { .. }))
            .count();
        assert_eq!(fills, 3);
    }
}
