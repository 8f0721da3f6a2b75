use crate::error::{PhotoSheetError, Result};
use crate::export::page_name;
use crate::model::{LayoutResult, Page, Placement};
use crate::page::PageSize;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A composited page ready to be written out.
pub struct RenderedPage {
    pub index: usize,
    /// `page-<index + 1>`.
    pub name: String,
    pub rgba: RgbaImage,
}

/// Blend `src` onto `canvas` with its top-left at (dx, dy). Pixels falling outside the
/// canvas (including negative offsets) are clipped. Uses source-over alpha blending so
/// transparent regions show the page background.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: i64, dy: i64) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let x0 = dx.max(0);
    let y0 = dy.max(0);
    let x1 = (dx + sw as i64).min(cw as i64);
    let y1 = (dy + sh as i64).min(ch as i64);
    for cy in y0..y1 {
        for cx in x0..x1 {
            let s = src.get_pixel((cx - dx) as u32, (cy - dy) as u32);
            let a = s[3] as u32;
            if a == 0 {
                continue;
            }
            let d = canvas.get_pixel_mut(cx as u32, cy as u32);
            if a == 255 {
                *d = *s;
                continue;
            }
            let inv = 255 - a;
            for c in 0..3 {
                d[c] = ((s[c] as u32 * a + d[c] as u32 * inv + 127) / 255) as u8;
            }
            d[3] = (a + (d[3] as u32 * inv + 127) / 255).min(255) as u8;
        }
    }
}

/// The part of `pl` that lands on a `canvas_w` x `canvas_h` canvas, scaled from the
/// matching region of `src`. Returns the scaled pixels and their canvas offset, or `None`
/// when the placement is entirely off-canvas.
///
/// Only the visible region is resized, so a placement that protrudes far past the page
/// costs no more than the page itself.
fn fit_visible<K>(
    src: &RgbaImage,
    pl: &Placement<K>,
    canvas_w: u32,
    canvas_h: u32,
) -> Option<(RgbaImage, i64, i64)> {
    let dx = pl.x.round() as i64;
    let dy = pl.y.round() as i64;
    let w = (pl.width.round() as i64).max(1);
    let h = (pl.height.round() as i64).max(1);

    let vx0 = dx.max(0);
    let vy0 = dy.max(0);
    let vx1 = (dx + w).min(canvas_w as i64);
    let vy1 = (dy + h).min(canvas_h as i64);
    if vx1 <= vx0 || vy1 <= vy0 {
        return None;
    }

    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return None;
    }
    let (sx0, sx1) = source_span(vx0 - dx, vx1 - dx, w, sw);
    let (sy0, sy1) = source_span(vy0 - dy, vy1 - dy, h, sh);
    let region = imageops::crop_imm(src, sx0, sy0, sx1 - sx0, sy1 - sy0).to_image();

    let out_w = (vx1 - vx0) as u32;
    let out_h = (vy1 - vy0) as u32;
    let scaled = if region.dimensions() == (out_w, out_h) {
        region
    } else {
        imageops::resize(&region, out_w, out_h, FilterType::Triangle)
    };
    Some((scaled, vx0, vy0))
}

/// Maps `[from, to)` of a `dest_len` axis onto the source axis, widened to whole source
/// pixels and never empty.
fn source_span(from: i64, to: i64, dest_len: i64, src_len: u32) -> (u32, u32) {
    let scale = src_len as f64 / dest_len as f64;
    let start = ((from as f64 * scale).floor() as u32).min(src_len.saturating_sub(1));
    let end = ((to as f64 * scale).ceil() as u32).clamp(start + 1, src_len.max(1));
    (start, end)
}

/// Composite one page: fill with `background`, then draw every placement in order.
pub fn compose_page<'s, K, F>(
    page: &Page<K>,
    size: PageSize,
    background: [u8; 4],
    sources: F,
) -> Result<RgbaImage>
where
    K: ToString,
    F: Fn(&K) -> Option<&'s RgbaImage>,
{
    let mut canvas = RgbaImage::from_pixel(size.width, size.height, Rgba(background));
    for pl in &page.placements {
        let src = sources(&pl.id).ok_or_else(|| PhotoSheetError::MissingSource {
            id: pl.id.to_string(),
            page: page.index,
        })?;
        if let Some((scaled, x, y)) = fit_visible(src, pl, size.width, size.height) {
            blit_rgba(&scaled, &mut canvas, x, y);
        }
    }
    Ok(canvas)
}

#[instrument(skip_all, fields(pages = result.pages.len()))]
/// Composites every page of `result` against its configured background color.
///
/// `sources` maps an image id to its decoded pixels. With the `parallel` feature pages
/// are composited concurrently; output order always matches page order.
pub fn render_pages<'s, K, F>(result: &LayoutResult<K>, sources: F) -> Result<Vec<RenderedPage>>
where
    K: ToString + Sync,
    F: Fn(&K) -> Option<&'s RgbaImage> + Sync,
{
    let size = PageSize::new(result.page_width, result.page_height);
    let background = result.meta.background_color;
    let render = |page: &Page<K>| -> Result<RenderedPage> {
        let rgba = compose_page(page, size, background, &sources)?;
        debug!(page = page.index, "page composited");
        Ok(RenderedPage {
            index: page.index,
            name: page_name(page.index),
            rgba,
        })
    };

    #[cfg(feature = "parallel")]
    {
        result.pages.par_iter().map(render).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        result.pages.iter().map(render).collect()
    }
}
