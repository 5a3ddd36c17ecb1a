use crate::frame::Frame;
use crate::types::{Pt, Rect, Size};

#[derive(Debug, Clone, Copy)]
pub struct FrameSpec {
    pub rect: Rect,
    pub padding: Pt,
}

/// Named page geometry: a page size plus the frames content flows through,
/// filled in declaration order.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    pub name: String,
    pub page_size: Size,
    frames: Vec<FrameSpec>,
}

impl PageTemplate {
    pub fn new(name: impl Into<String>, page_size: Size) -> Self {
        Self {
            name: name.into(),
            page_size,
            frames: Vec::new(),
        }
    }

    pub fn with_frame(mut self, rect: Rect, padding: Pt) -> Self {
        self.frames.push(FrameSpec { rect, padding });
        self
    }

    pub fn frames(&self) -> &[FrameSpec] {
        &self.frames
    }

    pub fn instantiate_frames(&self) -> Vec<Frame> {
        self.frames
            .iter()
            .map(|spec| Frame::new(spec.rect, spec.padding))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Margins;

    #[test]
    fn frames_are_instantiated_in_order() {
        let page = Size::a4();
        let body = Margins::all(50.0).content_rect(page);
        let template = PageTemplate::new("Page1", page)
            .with_frame(body, Pt::from_i32(6))
            .with_frame(body, Pt::ZERO);
        let frames = template.instantiate_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].rect().x, Pt::from_i32(56));
        assert_eq!(frames[1].rect().x, Pt::from_i32(50));
    }
}
