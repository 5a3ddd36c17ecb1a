use crate::canvas::Canvas;
use crate::types::{Pt, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakAfter {
    Auto,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination {
    pub break_after: BreakAfter,
    pub orphans: usize,
    pub widows: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            break_after: BreakAfter::Auto,
            orphans: 2,
            widows: 2,
        }
    }
}

/// Horizontal placement of a fixed-width flowable inside its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl HAlign {
    /// Offset from the frame's left edge. Negative when the content is wider
    /// than the frame and centered or right aligned.
    pub fn offset(self, content_width: Pt, avail_width: Pt) -> Pt {
        match self {
            HAlign::Left => Pt::ZERO,
            HAlign::Center => (avail_width - content_width) / 2,
            HAlign::Right => avail_width - content_width,
        }
    }
}

/// Something a frame can measure, split and draw. Coordinates passed to
/// `draw` are the top-left corner of the slot the frame reserved.
pub trait Flowable: FlowableClone + Send + Sync {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size;
    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)>;
    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, avail_height: Pt);

    fn space_before(&self) -> Pt {
        Pt::ZERO
    }

    fn space_after(&self) -> Pt {
        Pt::ZERO
    }

    fn pagination(&self) -> Pagination {
        Pagination::default()
    }

    fn debug_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub trait FlowableClone {
    fn clone_box(&self) -> Box<dyn Flowable>;
}

impl<T> FlowableClone for T
where
    T: 'static + Flowable + Clone,
{
    fn clone_box(&self) -> Box<dyn Flowable> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Flowable> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[derive(Debug, Clone)]
pub struct Spacer {
    height: Pt,
}

impl Spacer {
    pub fn new(height: f32) -> Self {
        Self::new_pt(Pt::from_f32(height))
    }

    pub fn new_pt(height: Pt) -> Self {
        Self {
            height: height.max(Pt::ZERO),
        }
    }

    pub fn height(&self) -> Pt {
        self.height
    }
}

impl Flowable for Spacer {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.height,
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, _canvas: &mut Canvas, _x: Pt, _y: Pt, _avail_width: Pt, _avail_height: Pt) {}

    fn debug_name(&self) -> &'static str {
        "Spacer"
    }
}

/// Zero-height marker that ends the current page.
#[derive(Debug, Clone, Default)]
pub struct PageBreak;

impl Flowable for PageBreak {
    fn wrap(&self, _avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: Pt::ZERO,
            height: Pt::ZERO,
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, _canvas: &mut Canvas, _x: Pt, _y: Pt, _avail_width: Pt, _avail_height: Pt) {}

    fn pagination(&self) -> Pagination {
        Pagination {
            break_after: BreakAfter::Page,
            ..Pagination::default()
        }
    }

    fn debug_name(&self) -> &'static str {
        "PageBreak"
    }
}

/// Fixed-size raster image. `source` is a filesystem path or a `data:` URI and
/// is only resolved when the PDF is written.
#[derive(Debug, Clone)]
pub struct ImageFlowable {
    pub width: Pt,
    pub height: Pt,
    pub source: String,
    h_align: HAlign,
}

impl ImageFlowable {
    pub fn new(width: Pt, height: Pt, source: impl Into<String>) -> Self {
        Self {
            width,
            height,
            source: source.into(),
            h_align: HAlign::default(),
        }
    }

    pub fn with_h_align(mut self, h_align: HAlign) -> Self {
        self.h_align = h_align;
        self
    }
}

impl Flowable for ImageFlowable {
    fn wrap(&self, _avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let dx = self.h_align.offset(self.width, avail_width);
        canvas.draw_image(x + dx, y, self.width, self.height, self.source.clone());
    }

    fn debug_name(&self) -> &'static str {
        "Image"
    }
}
