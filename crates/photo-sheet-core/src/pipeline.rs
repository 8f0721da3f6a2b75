use crate::config::{LayoutConfig, Strategy};
use crate::model::{ImageDescriptor, LayoutResult, Meta};
use crate::packer::{PageGeometry, PagePacker, grid::GridPacker, shelf::ShelfPacker};
use tracing::{debug, instrument, warn};

/// Lays `images` out onto pages according to `cfg`.
///
/// Notes:
/// - Never fails. Unusable configuration values are corrected (see
///   [`LayoutConfig::effective_padding`], [`LayoutConfig::effective_spacing`] and
///   [`LayoutConfig::effective_images_per_row`]).
/// - Empty input yields a result with zero pages.
/// - Zero-sized images are laid out as if the zero axis were 1 pixel.
/// - Output is deterministic: identical input gives bit-identical placements.
#[instrument(skip_all, fields(images = images.len(), strategy = ?cfg.strategy))]
pub fn layout<K: Clone>(images: &[ImageDescriptor<K>], cfg: &LayoutConfig) -> LayoutResult<K> {
    let page = cfg.page_size();
    let padding = cfg.effective_padding(page);
    let images_per_row = cfg.effective_images_per_row();
    let spacing = cfg.effective_spacing(page, padding, images_per_row);

    let meta = Meta {
        schema_version: "1".into(),
        app: "photo-sheet".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        strategy: cfg.strategy,
        page_size: (page.width, page.height),
        spacing,
        padding,
        images_per_row,
        background_color: cfg.background,
    };

    if images.is_empty() {
        debug!("empty input; nothing to lay out");
        return LayoutResult {
            page_width: page.width,
            page_height: page.height,
            pages: Vec::new(),
            meta,
        };
    }

    let degenerate = images.iter().filter(|i| i.is_degenerate()).count();
    if degenerate > 0 {
        warn!(count = degenerate, "zero-sized images; treating zero axes as 1px");
    }

    let geometry = PageGeometry {
        page_width: page.width as f64,
        page_height: page.height as f64,
        padding: padding as f64,
        spacing: spacing as f64,
    };
    let packer: Box<dyn PagePacker<K>> = match cfg.strategy {
        Strategy::Grid => Box::new(GridPacker::new(geometry, images_per_row)),
        Strategy::Shelf => Box::new(ShelfPacker::new(geometry)),
    };
    let pages = packer.pack(images);
    debug!(pages = pages.len(), "layout complete");

    LayoutResult {
        page_width: page.width,
        page_height: page.height,
        pages,
        meta,
    }
}
