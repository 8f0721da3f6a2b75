use crate::model::{ImageDescriptor, Page, Placement};
use tracing::debug;

pub mod grid;
pub mod shelf;

/// A packer distributes images over as many fixed-size pages as it needs.
///
/// Implementations must place every input image exactly once, keep each image's aspect
/// ratio, and never reorder or mutate the caller's slice.
pub trait PagePacker<K> {
    fn pack(&self, images: &[ImageDescriptor<K>]) -> Vec<Page<K>>;
}

/// Page size plus the margins every packer honours, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub padding: f64,
    pub spacing: f64,
}

impl PageGeometry {
    pub fn available_width(&self) -> f64 {
        self.page_width - 2.0 * self.padding
    }
    pub fn available_height(&self) -> f64 {
        self.page_height - 2.0 * self.padding
    }
    /// Lowest y a placement may reach before the page counts as full.
    pub fn bottom_limit(&self) -> f64 {
        self.page_height - self.padding
    }
}

/// Natural size with zero axes read as 1.
pub(crate) fn natural_size<K>(img: &ImageDescriptor<K>) -> (f64, f64) {
    (img.width.max(1) as f64, img.height.max(1) as f64)
}

/// Collects placements into pages top-down. A page is sealed once and never reopened.
pub(crate) struct PageAccumulator<K> {
    pages: Vec<Page<K>>,
    current: Vec<Placement<K>>,
    cursor_y: f64,
    top: f64,
    bottom: f64,
}

impl<K> PageAccumulator<K> {
    pub(crate) fn new(geometry: &PageGeometry) -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            cursor_y: geometry.padding,
            top: geometry.padding,
            bottom: geometry.bottom_limit(),
        }
    }

    pub(crate) fn cursor_y(&self) -> f64 {
        self.cursor_y
    }

    /// True when something of `height` placed at the cursor would overflow a page that
    /// already holds at least one placement. An empty page accepts anything.
    pub(crate) fn needs_break(&self, height: f64) -> bool {
        self.cursor_y + height > self.bottom && !self.current.is_empty()
    }

    pub(crate) fn advance(&mut self, dy: f64) {
        self.cursor_y += dy;
    }

    pub(crate) fn push(&mut self, placement: Placement<K>) {
        self.current.push(placement);
    }

    /// Seal the current page and move the cursor back to the top margin.
    pub(crate) fn seal(&mut self) {
        let index = self.pages.len();
        let placements = std::mem::take(&mut self.current);
        debug!(page = index, placements = placements.len(), "page sealed");
        self.pages.push(Page { index, placements });
        self.cursor_y = self.top;
    }

    pub(crate) fn finish(mut self) -> Vec<Page<K>> {
        if !self.current.is_empty() {
            self.seal();
        }
        self.pages
    }
}
