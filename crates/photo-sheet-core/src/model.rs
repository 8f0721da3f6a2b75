use crate::config::Strategy;
use crate::error::{PhotoSheetError, Result};
use serde::{Deserialize, Serialize};

/// Natural pixel size of one input photo, keyed by a caller-chosen id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageDescriptor<K = String> {
    /// User-specified key (e.g., file path).
    pub id: K,
    pub width: u32,
    pub height: u32,
}

impl<K> ImageDescriptor<K> {
    pub fn new(id: K, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    /// Like [`ImageDescriptor::new`] but rejects zero-sized images.
    pub fn try_new(id: K, width: u32, height: u32) -> Result<Self>
    where
        K: ToString,
    {
        if width == 0 || height == 0 {
            return Err(PhotoSheetError::DegenerateImage {
                id: id.to_string(),
                width,
                height,
            });
        }
        Ok(Self { id, width, height })
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, with zero axes treated as 1.
    pub fn aspect_ratio(&self) -> f64 {
        self.width.max(1) as f64 / self.height.max(1) as f64
    }
}

/// Final position and size of one image on its page (page pixels, top-left origin).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement<K = String> {
    pub id: K,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl<K> Placement<K> {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// One output page; placements are in visual order (left-to-right, top-to-bottom).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<K = String> {
    /// 0-based position in the result.
    pub index: usize,
    pub placements: Vec<Placement<K>>,
}

/// Layout-level metadata (common fields used by exporters).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    /// Schema version of the JSON layout format; current: "1".
    pub schema_version: String,
    pub app: String,
    pub version: String,
    pub strategy: Strategy,
    pub page_size: (u32, u32),
    pub spacing: u32,
    pub padding: u32,
    pub images_per_row: u32,
    pub background_color: [u8; 4],
}

/// Paginated output of one `layout` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutResult<K = String> {
    pub page_width: u32,
    pub page_height: u32,
    pub pages: Vec<Page<K>>,
    pub meta: Meta,
}

impl<K> LayoutResult<K> {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates `(page index, placement)` over the whole result.
    pub fn placements(&self) -> impl Iterator<Item = (usize, &Placement<K>)> {
        self.pages
            .iter()
            .flat_map(|p| p.placements.iter().map(move |pl| (p.index, pl)))
    }

    /// Computes layout statistics for this result.
    pub fn stats(&self) -> LayoutStats {
        let num_pages = self.pages.len();
        let page_area = self.page_width as f64 * self.page_height as f64;
        let mut num_placements = 0usize;
        let mut used_area = 0.0f64;
        let mut min_per_page = usize::MAX;
        let mut max_per_page = 0usize;
        for page in &self.pages {
            let n = page.placements.len();
            num_placements += n;
            min_per_page = min_per_page.min(n);
            max_per_page = max_per_page.max(n);
            used_area += page
                .placements
                .iter()
                .map(|p| p.width * p.height)
                .sum::<f64>();
        }
        if num_pages == 0 {
            min_per_page = 0;
        }
        let total_page_area = page_area * num_pages as f64;
        let occupancy = if total_page_area > 0.0 {
            used_area / total_page_area
        } else {
            0.0
        };
        LayoutStats {
            num_pages,
            num_placements,
            total_page_area,
            used_area,
            occupancy,
            min_per_page,
            max_per_page,
        }
    }
}

/// Statistics about page usage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayoutStats {
    pub num_pages: usize,
    pub num_placements: usize,
    /// Sum of page areas (px²).
    pub total_page_area: f64,
    /// Sum of placement areas (px²). Oversized placements may push this past the page area.
    pub used_area: f64,
    /// used_area / total_page_area. Higher is better.
    pub occupancy: f64,
    pub min_per_page: usize,
    pub max_per_page: usize,
}

impl LayoutStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}, Photos: {}, Occupancy: {:.2}%, Per page: {}..{}, Total Area: {:.0} px², Used Area: {:.0} px²",
            self.num_pages,
            self.num_placements,
            self.occupancy * 100.0,
            self.min_per_page,
            self.max_per_page,
            self.total_page_area,
            self.used_area,
        )
    }

    /// Returns unused page area in pixels (never negative).
    pub fn wasted_area(&self) -> f64 {
        (self.total_page_area - self.used_area).max(0.0)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.total_page_area > 0.0 {
            self.wasted_area() / self.total_page_area * 100.0
        } else {
            0.0
        }
    }
}
