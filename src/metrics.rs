#[derive(Debug, Clone, Default)]
pub struct PageMetrics {
    pub page_number: usize,
    pub render_ms: f64,
    pub command_count: usize,
    pub flowable_count: usize,
    pub image_count: usize,
    /// Uncompressed content stream size, filled in by the PDF writer.
    pub content_bytes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentMetrics {
    pub pages: Vec<PageMetrics>,
    pub total_render_ms: f64,
    pub total_bytes: usize,
    pub page_breaks: usize,
}

impl DocumentMetrics {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn flowable_count(&self) -> usize {
        self.pages.iter().map(|page| page.flowable_count).sum()
    }
}
