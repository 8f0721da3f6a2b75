use crate::model::{ImageDescriptor, Page, Placement};
use crate::packer::{PageAccumulator, PageGeometry, PagePacker, natural_size};

/// Uniform grid: a fixed number of equal-width cells per row, rows as tall as their
/// tallest image.
pub struct GridPacker {
    geometry: PageGeometry,
    images_per_row: usize,
    cell_width: f64,
}

impl GridPacker {
    pub fn new(geometry: PageGeometry, images_per_row: u32) -> Self {
        let images_per_row = images_per_row.max(1) as usize;
        let n = images_per_row as f64;
        let cell_width = (geometry.available_width() - geometry.spacing * (n - 1.0)) / n;
        Self {
            geometry,
            images_per_row,
            cell_width,
        }
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }
}

impl<K: Clone> PagePacker<K> for GridPacker {
    fn pack(&self, images: &[ImageDescriptor<K>]) -> Vec<Page<K>> {
        let g = &self.geometry;
        let mut acc = PageAccumulator::new(g);
        let mut row_len = 0usize;
        let mut row_height = 0.0f64;

        for img in images {
            let (w, h) = natural_size(img);
            let scaled_height = h * (self.cell_width / w);

            if row_len >= self.images_per_row {
                acc.advance(row_height + g.spacing);
                row_len = 0;
                row_height = 0.0;
            }

            if acc.needs_break(scaled_height) {
                acc.seal();
                row_len = 0;
                row_height = 0.0;
            }

            acc.push(Placement {
                id: img.id.clone(),
                x: g.padding + row_len as f64 * (self.cell_width + g.spacing),
                y: acc.cursor_y(),
                width: self.cell_width,
                height: scaled_height,
            });
            row_len += 1;
            row_height = row_height.max(scaled_height);
        }

        acc.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> PageGeometry {
        PageGeometry {
            page_width: 1000.0,
            page_height: 1000.0,
            padding: 10.0,
            spacing: 20.0,
        }
    }

    #[test]
    fn cell_width_accounts_for_gaps() {
        let p = GridPacker::new(geometry(), 3);
        assert_eq!(p.cell_width(), (980.0 - 40.0) / 3.0);
    }

    #[test]
    fn zero_columns_behaves_like_one() {
        let p = GridPacker::new(geometry(), 0);
        assert_eq!(p.cell_width(), 980.0);
    }

    #[test]
    fn row_break_then_page_break() {
        let p = GridPacker::new(geometry(), 2);
        // cell = 480; each image 480x480; two rows fit (10 + 480 + 20 + 480 = 990 <= 990)
        let imgs: Vec<_> = (0..5)
            .map(|i| ImageDescriptor::new(i, 100, 100))
            .collect();
        let pages = p.pack(&imgs);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].placements.len(), 4);
        assert_eq!(pages[1].placements[0].y, 10.0);
        assert_eq!(pages[1].placements[0].x, 10.0);
    }
}
