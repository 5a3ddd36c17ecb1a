use crate::canvas::Canvas;
use crate::flowable::Flowable;
use crate::types::{Pt, Rect};

pub enum AddResult {
    Placed,
    Split(Box<dyn Flowable>),
    Overflow(Box<dyn Flowable>),
}

pub const DEFAULT_FRAME_PADDING: f32 = 6.0;

/// Rectangle that stacks flowables top to bottom. Space before a flowable is
/// dropped at the top of the frame and overlaps the previous space after.
pub struct Frame {
    rect: Rect,
    cursor_y: Pt,
    prev_space_after: Pt,
    at_top: bool,
}

impl Frame {
    /// `rect` is the outer frame; content is inset by `padding` on every side.
    pub fn new(rect: Rect, padding: Pt) -> Self {
        let inset = Rect {
            x: rect.x + padding,
            y: rect.y + padding,
            width: (rect.width - padding * 2).max(Pt::ZERO),
            height: (rect.height - padding * 2).max(Pt::ZERO),
        };
        Self {
            rect: inset,
            cursor_y: Pt::ZERO,
            prev_space_after: Pt::ZERO,
            at_top: true,
        }
    }

    pub fn remaining_height(&self) -> Pt {
        (self.rect.height - self.cursor_y).max(Pt::ZERO)
    }

    /// Content rectangle after padding.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_empty(&self) -> bool {
        self.at_top
    }

    fn leading_space(&self, flowable: &dyn Flowable) -> Pt {
        if self.at_top {
            return Pt::ZERO;
        }
        (flowable.space_before() - self.prev_space_after).max(Pt::ZERO)
    }

    fn place(&mut self, flowable: &dyn Flowable, canvas: &mut Canvas, gap: Pt, size_height: Pt) {
        let top = self.rect.y + self.cursor_y + gap;
        let size = flowable.wrap(self.rect.width, size_height);
        flowable.draw(canvas, self.rect.x, top, self.rect.width, size_height);
        canvas.record_flowable_bounds(Rect {
            x: self.rect.x,
            y: top,
            width: size.width,
            height: size.height,
        });
        let space_after = flowable.space_after();
        let advance = gap + size_height + space_after;
        if advance > Pt::ZERO {
            self.at_top = false;
        }
        self.cursor_y += advance;
        self.prev_space_after = space_after;
    }

    pub fn add(&mut self, flowable: Box<dyn Flowable>, canvas: &mut Canvas) -> AddResult {
        if self.rect.height <= Pt::ZERO {
            return AddResult::Overflow(flowable);
        }
        let avail_width = self.rect.width;
        let gap = self.leading_space(flowable.as_ref());
        let avail_height = self.remaining_height() - gap;
        if avail_height < Pt::ZERO {
            return AddResult::Overflow(flowable);
        }

        let size = flowable.wrap(avail_width, avail_height);
        if size.height <= avail_height {
            self.place(flowable.as_ref(), canvas, gap, size.height);
            return AddResult::Placed;
        }

        if let Some((first, second)) = flowable.split(avail_width, avail_height) {
            let first_size = first.wrap(avail_width, avail_height);
            if first_size.height > Pt::ZERO && first_size.height <= avail_height {
                self.place(first.as_ref(), canvas, gap, first_size.height);
                return AddResult::Split(second);
            }
        }

        // Taller than an empty frame and unsplittable: place it anyway and let
        // it run past the bottom edge so pagination keeps moving.
        if self.at_top {
            log::debug!(
                "{} overflows an empty frame ({}pt > {}pt); placing clipped",
                flowable.debug_name(),
                size.height.to_f32(),
                avail_height.to_f32()
            );
            self.place(flowable.as_ref(), canvas, gap, size.height);
            self.cursor_y = self.rect.height;
            return AddResult::Placed;
        }

        AddResult::Overflow(flowable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowable::Spacer;
    use crate::paragraph::Paragraph;
    use crate::style::StyleSheet;
    use crate::types::Size;
    use std::sync::Arc;

    fn frame(height: i32) -> Frame {
        Frame::new(
            Rect {
                x: Pt::ZERO,
                y: Pt::ZERO,
                width: Pt::from_i32(200),
                height: Pt::from_i32(height),
            },
            Pt::ZERO,
        )
    }

    #[test]
    fn padding_insets_the_content_rect() {
        let frame = Frame::new(
            Rect {
                x: Pt::from_i32(50),
                y: Pt::from_i32(50),
                width: Pt::from_i32(100),
                height: Pt::from_i32(100),
            },
            Pt::from_f32(DEFAULT_FRAME_PADDING),
        );
        assert_eq!(frame.rect().x, Pt::from_i32(56));
        assert_eq!(frame.rect().width, Pt::from_i32(88));
    }

    #[test]
    fn space_before_is_dropped_at_the_top_and_collapses_after() {
        let sheet = StyleSheet::sample();
        let heading = sheet.get("Heading2").unwrap();
        let body = Arc::new(sheet.get("BodyText").unwrap().derive("B").space_after(12.0));
        let mut canvas = Canvas::new(Size::a4());
        let mut frame = frame(500);

        assert!(matches!(
            frame.add(Box::new(Paragraph::new("Heading", heading.clone())), &mut canvas),
            AddResult::Placed
        ));
        // 18 leading + 6 space after; the 12pt space before was dropped.
        assert_eq!(frame.remaining_height(), Pt::from_i32(500 - 24));

        frame.add(Box::new(Paragraph::new("body", body)), &mut canvas);
        // Space before 6 overlaps the heading's 6 after: 12 leading + 12 after.
        assert_eq!(frame.remaining_height(), Pt::from_i32(500 - 24 - 24));

        frame.add(Box::new(Paragraph::new("Next", heading)), &mut canvas);
        // 12 before is fully absorbed by the previous 12 after.
        assert_eq!(frame.remaining_height(), Pt::from_i32(500 - 48 - 24));
    }

    #[test]
    fn overflow_moves_to_next_frame_unless_empty() {
        let mut canvas = Canvas::new(Size::a4());
        let mut frame = frame(100);
        assert!(matches!(
            frame.add(Box::new(Spacer::new(60.0)), &mut canvas),
            AddResult::Placed
        ));
        assert!(matches!(
            frame.add(Box::new(Spacer::new(60.0)), &mut canvas),
            AddResult::Overflow(_)
        ));

        let mut empty = self::frame(100);
        assert!(matches!(
            empty.add(Box::new(Spacer::new(300.0)), &mut canvas),
            AddResult::Placed
        ));
        assert_eq!(empty.remaining_height(), Pt::ZERO);
    }

    #[test]
    fn splittable_flowables_fill_the_remaining_space() {
        let sheet = StyleSheet::sample();
        let para = Paragraph::new("aaa aaa aaa aaa aaa aaa", sheet.get("Normal").unwrap());
        let mut canvas = Canvas::new(Size::a4());
        let mut frame = Frame::new(
            Rect {
                x: Pt::ZERO,
                y: Pt::ZERO,
                width: Pt::from_i32(20),
                height: Pt::from_i32(50),
            },
            Pt::ZERO,
        );
        match frame.add(Box::new(para), &mut canvas) {
            AddResult::Split(rest) => {
                assert_eq!(rest.wrap(Pt::from_i32(20), Pt::from_i32(100)).height, Pt::from_i32(24));
            }
            _ => panic!("expected a split"),
        }
    }
}
