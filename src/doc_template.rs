use crate::canvas::{Canvas, Document};
use crate::debug::DebugLogger;
use crate::error::{BrochureError, Result};
use crate::flowable::{BreakAfter, Flowable};
use crate::frame::{AddResult, Frame};
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::page_template::PageTemplate;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

/// Paginates a story across page templates.
pub struct DocTemplate {
    page_templates: Vec<PageTemplate>,
    story: Vec<Box<dyn Flowable>>,
    debug: Option<Arc<DebugLogger>>,
}

// Page n uses templates[min(n - 1, len - 1)]; the last template repeats.
fn select_template(page_templates: &[PageTemplate], page_number: usize) -> &PageTemplate {
    let idx = page_number
        .saturating_sub(1)
        .min(page_templates.len().saturating_sub(1));
    &page_templates[idx]
}

struct PageState<'a> {
    templates: &'a [PageTemplate],
    canvas: Canvas,
    page_number: usize,
    frames: Vec<Frame>,
    frame_index: usize,
    placed_on_page: bool,
    page_flowables: usize,
    page_start: Instant,
    metrics: DocumentMetrics,
    debug: Option<Arc<DebugLogger>>,
}

impl<'a> PageState<'a> {
    fn new(templates: &'a [PageTemplate], debug: Option<Arc<DebugLogger>>) -> Self {
        let template = select_template(templates, 1);
        let mut state = Self {
            templates,
            canvas: Canvas::new(template.page_size),
            page_number: 1,
            frames: template.instantiate_frames(),
            frame_index: 0,
            placed_on_page: false,
            page_flowables: 0,
            page_start: Instant::now(),
            metrics: DocumentMetrics::default(),
            debug,
        };
        state.begin_page();
        state
    }

    fn begin_page(&mut self) {
        let template = select_template(self.templates, self.page_number);
        self.canvas
            .meta(crate::META_PAGE_TEMPLATE_KEY, template.name.clone());
    }

    fn log_page_break(&mut self, reason: &str, flowable: &str, to_page: usize) {
        self.metrics.page_breaks += 1;
        log::debug!(
            "page break {} -> {} ({reason}) at {flowable} in frame {}",
            self.page_number,
            to_page,
            self.frame_index
        );
        let Some(logger) = self.debug.as_deref() else {
            return;
        };
        logger.log_event(&json!({
            "type": "layout.page_break",
            "code": "PAGE_BREAK_TRIGGER",
            "reason": reason,
            "from_page": self.page_number,
            "to_page": to_page,
            "frame_index": self.frame_index,
            "flowable": flowable,
        }));
        logger.increment("layout.page_break", 1);
    }

    // A page with nothing visible is discarded rather than emitted, unless
    // `force` is set for the final page of an otherwise empty document.
    fn finish_page(&mut self, force: bool) {
        if self.canvas.is_current_blank() && !force {
            return;
        }
        let elapsed = self.page_start.elapsed().as_secs_f64() * 1000.0;
        self.metrics.total_render_ms += elapsed;
        self.metrics.pages.push(PageMetrics {
            page_number: self.page_number,
            render_ms: elapsed,
            command_count: self.canvas.current_command_count(),
            flowable_count: self.page_flowables,
            image_count: self.canvas.current_image_draws(),
            content_bytes: 0,
        });
        self.canvas.show_page();
        self.page_flowables = 0;
        self.page_start = Instant::now();
    }

    fn new_page(&mut self, reason: &str, flowable: &str) {
        let emitted = !self.canvas.is_current_blank();
        if emitted {
            self.log_page_break(reason, flowable, self.page_number + 1);
        } else {
            log::debug!("{reason} at {flowable} on blank page {}; page reused", self.page_number);
        }
        self.finish_page(false);
        if emitted {
            self.page_number += 1;
            self.begin_page();
        }
        let template = select_template(self.templates, self.page_number);
        self.frames = template.instantiate_frames();
        self.frame_index = 0;
        self.placed_on_page = false;
    }
}

impl DocTemplate {
    pub fn new(page_templates: Vec<PageTemplate>) -> Self {
        Self {
            page_templates,
            story: Vec::new(),
            debug: None,
        }
    }

    pub(crate) fn with_debug(mut self, debug: Arc<DebugLogger>) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn add_flowable(&mut self, flowable: Box<dyn Flowable>) {
        self.story.push(flowable);
    }

    pub fn build(self) -> Result<Document> {
        Ok(self.build_with_metrics()?.0)
    }

    pub fn build_with_metrics(self) -> Result<(Document, DocumentMetrics)> {
        if self.page_templates.is_empty() {
            return Err(BrochureError::MissingPageTemplate);
        }
        let mut state = PageState::new(&self.page_templates, self.debug.clone());
        let mut story: VecDeque<Box<dyn Flowable>> = self.story.into_iter().collect();

        while let Some(flowable) = story.pop_front() {
            let mut current = flowable;
            loop {
                let name = current.debug_name();
                let pagination = current.pagination();
                if state.frame_index >= state.frames.len() {
                    state.new_page("frame_exhausted", name);
                }
                if state.frames.is_empty() {
                    return Err(BrochureError::MissingPageTemplate);
                }

                let is_last_frame = state.frame_index + 1 >= state.frames.len();
                let frame_rect = state.frames[state.frame_index].rect();
                let unplaceable = !state.placed_on_page && is_last_frame;
                let details = if unplaceable {
                    let size = current.wrap(frame_rect.width, frame_rect.height);
                    Some(format!(
                        "{name} size={}x{}pt frame={}x{}pt",
                        size.width.to_f32(),
                        size.height.to_f32(),
                        frame_rect.width.to_f32(),
                        frame_rect.height.to_f32(),
                    ))
                } else {
                    None
                };

                let frame_index = state.frame_index;
                match state.frames[frame_index].add(current, &mut state.canvas) {
                    AddResult::Placed => {
                        state.placed_on_page = true;
                        state.page_flowables += 1;
                        if matches!(pagination.break_after, BreakAfter::Page) {
                            state.new_page("break_after_page", name);
                        }
                        break;
                    }
                    AddResult::Split(remaining) => {
                        state.placed_on_page = true;
                        state.page_flowables += 1;
                        log::debug!("{name} split across frames on page {}", state.page_number);
                        current = remaining;
                        state.frame_index += 1;
                    }
                    AddResult::Overflow(remaining) => {
                        if let Some(details) = details {
                            return Err(BrochureError::UnplaceableFlowable(details));
                        }
                        current = remaining;
                        state.frame_index += 1;
                    }
                }
            }
        }

        let force = state.metrics.pages.is_empty();
        state.finish_page(force);
        let metrics = state.metrics;
        Ok((state.canvas.finish(), metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowable::{PageBreak, Spacer};
    use crate::types::{Margins, Pt, Rect, Size};

    fn templates() -> Vec<PageTemplate> {
        let page = Size::a4();
        vec![PageTemplate::new("Page1", page).with_frame(Margins::all(50.0).content_rect(page), Pt::ZERO)]
    }

    fn rule() -> Box<dyn Flowable> {
        // Spacers draw nothing, so use an image command to make the page visible.
        Box::new(crate::flowable::ImageFlowable::new(
            Pt::from_i32(10),
            Pt::from_i32(10),
            "x.png",
        ))
    }

    #[test]
    fn page_break_starts_a_new_page() {
        let mut doc = DocTemplate::new(templates());
        doc.add_flowable(rule());
        doc.add_flowable(Box::new(PageBreak));
        doc.add_flowable(rule());
        let (document, metrics) = doc.build_with_metrics().unwrap();
        assert_eq!(document.pages.len(), 2);
        assert_eq!(metrics.page_count(), 2);
        assert_eq!(document.pages[1].image_draws(), 1);
    }

    #[test]
    fn trailing_page_break_does_not_emit_a_blank_page() {
        let mut doc = DocTemplate::new(templates());
        doc.add_flowable(rule());
        doc.add_flowable(Box::new(PageBreak));
        let document = doc.build().unwrap();
        assert_eq!(document.pages.len(), 1);
    }

    #[test]
    fn repeated_page_breaks_count_once() {
        let mut doc = DocTemplate::new(templates());
        doc.add_flowable(rule());
        doc.add_flowable(Box::new(PageBreak));
        doc.add_flowable(Box::new(PageBreak));
        doc.add_flowable(rule());
        let (document, metrics) = doc.build_with_metrics().unwrap();
        assert_eq!(document.pages.len(), 2);
        assert_eq!(metrics.page_breaks, 1);
        assert_eq!(metrics.pages[1].page_number, 2);
    }

    #[test]
    fn overflowing_content_continues_on_the_next_page() {
        let mut doc = DocTemplate::new(templates());
        for _ in 0..4 {
            doc.add_flowable(rule());
            doc.add_flowable(Box::new(Spacer::new(300.0)));
        }
        let document = doc.build().unwrap();
        assert_eq!(document.pages.len(), 2);
        assert_eq!(document.pages[0].image_draws(), 3);
        assert_eq!(document.pages[1].image_draws(), 1);
        assert_eq!(
            document.pages[0].meta_value(crate::META_PAGE_TEMPLATE_KEY),
            Some("Page1")
        );
    }

    #[test]
    fn empty_story_still_yields_one_page() {
        let document = DocTemplate::new(templates()).build().unwrap();
        assert_eq!(document.pages.len(), 1);
    }

    #[test]
    fn missing_templates_are_an_error() {
        let result = DocTemplate::new(Vec::new()).build();
        assert!(matches!(result, Err(BrochureError::MissingPageTemplate)));
    }

    #[test]
    fn zero_height_frames_cannot_place_anything() {
        let page = Size::a4();
        let frame = Rect {
            x: Pt::ZERO,
            y: Pt::ZERO,
            width: Pt::from_i32(100),
            height: Pt::ZERO,
        };
        let mut doc = DocTemplate::new(vec![PageTemplate::new("Tiny", page).with_frame(frame, Pt::ZERO)]);
        doc.add_flowable(rule());
        assert!(matches!(
            doc.build(),
            Err(BrochureError::UnplaceableFlowable(_))
        ));
    }
}
