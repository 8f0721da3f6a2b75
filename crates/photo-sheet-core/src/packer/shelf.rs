use crate::model::{ImageDescriptor, Page, Placement};
use crate::packer::{PageAccumulator, PageGeometry, PagePacker, natural_size};
use tracing::trace;

/// Rows per page the provisional image height is sized for.
const TARGET_ROWS_PER_PAGE: f64 = 4.0;

/// Greedy shelf packing.
///
/// Images get a provisional size at a common target height, are sorted widest first,
/// and rows are filled first-fit. Each finished row is scaled uniformly so it spans the
/// full available width, which keeps every image's aspect ratio.
pub struct ShelfPacker {
    geometry: PageGeometry,
}

/// An input image paired with its provisional display size. Borrowed, never mutated.
struct ShelfItem<'a, K> {
    /// Position in the caller's slice; keys the `used` flags.
    index: usize,
    image: &'a ImageDescriptor<K>,
    display_width: f64,
    display_height: f64,
}

/// Indices into the sorted item list, plus the row's natural extent.
struct Row {
    members: Vec<usize>,
    width: f64,
    height: f64,
    forced: bool,
}

impl ShelfPacker {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    pub fn target_row_height(&self) -> f64 {
        self.geometry.available_height() / TARGET_ROWS_PER_PAGE
    }

    fn prepare<'a, K>(&self, images: &'a [ImageDescriptor<K>]) -> Vec<ShelfItem<'a, K>> {
        let target = self.target_row_height();
        let mut items: Vec<ShelfItem<'a, K>> = images
            .iter()
            .enumerate()
            .map(|(index, image)| {
                let (w, h) = natural_size(image);
                ShelfItem {
                    index,
                    image,
                    display_width: target * (w / h),
                    display_height: target,
                }
            })
            .collect();
        // stable: equal widths keep input order
        items.sort_by(|a, b| b.display_width.total_cmp(&a.display_width));
        items
    }

    /// First-fit over unused items in sorted order; falls back to a single forced item
    /// found by scanning the sorted order backwards. `used` is indexed by input position.
    fn next_row<K>(&self, items: &[ShelfItem<'_, K>], used: &mut [bool]) -> Row {
        let available = self.geometry.available_width();
        let spacing = self.geometry.spacing;
        let mut row = Row {
            members: Vec::new(),
            width: 0.0,
            height: 0.0,
            forced: false,
        };

        for (i, item) in items.iter().enumerate() {
            if used[item.index] {
                continue;
            }
            let needed = if row.members.is_empty() {
                item.display_width
            } else {
                item.display_width + spacing
            };
            if row.width + needed <= available {
                row.members.push(i);
                row.width += needed;
                row.height = row.height.max(item.display_height);
                used[item.index] = true;
            }
        }

        if row.members.is_empty() {
            if let Some(i) = (0..items.len()).rev().find(|&i| !used[items[i].index]) {
                row.members.push(i);
                row.width = items[i].display_width;
                row.height = items[i].display_height;
                row.forced = true;
                used[items[i].index] = true;
            }
        }
        row
    }
}

impl<K: Clone> PagePacker<K> for ShelfPacker {
    fn pack(&self, images: &[ImageDescriptor<K>]) -> Vec<Page<K>> {
        let g = &self.geometry;
        let items = self.prepare(images);
        let mut used = vec![false; items.len()];
        let mut remaining = items.len();
        let mut acc = PageAccumulator::new(g);

        while remaining > 0 {
            let row = self.next_row(&items, &mut used);
            remaining -= row.members.len();

            let scale = g.available_width() / row.width;
            let row_height = row.height * scale;
            trace!(
                members = row.members.len(),
                forced = row.forced,
                scale,
                row_height,
                "row built"
            );

            if acc.needs_break(row_height) {
                acc.seal();
            }

            let mut x = g.padding;
            for &i in &row.members {
                let item = &items[i];
                let width = item.display_width * scale;
                acc.push(Placement {
                    id: item.image.id.clone(),
                    x,
                    y: acc.cursor_y(),
                    width,
                    height: item.display_height * scale,
                });
                x += width + g.spacing * scale;
            }
            acc.advance(row_height + g.spacing);
        }

        acc.finish()
    }
}
