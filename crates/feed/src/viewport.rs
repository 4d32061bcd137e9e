/// Remaining scroll distance, in pixels, below which the next page is requested.
pub const DEFAULT_PROXIMITY_THRESHOLD: f64 = 200.0;

/// Scroll geometry of the list that shows the results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl Viewport {
    pub fn new(scroll_offset: f64, viewport_height: f64, content_height: f64) -> Self {
        Self {
            scroll_offset,
            viewport_height,
            content_height,
        }
    }

    pub fn remaining(&self) -> f64 {
        (self.content_height - (self.scroll_offset + self.viewport_height)).max(0.0)
    }

    pub fn is_near_end(&self, threshold: f64) -> bool {
        self.remaining() < threshold
    }
}
