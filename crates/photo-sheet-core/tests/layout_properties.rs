use photo_sheet_core::prelude::*;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const EPS: f64 = 1e-6;

/// Random photos with aspect ratios between 0.4 and 2.5.
fn random_images(seed: u64, count: usize) -> Vec<ImageDescriptor> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let w: u32 = rng.gen_range(200..=4000);
            let ratio: f64 = rng.gen_range(0.4..=2.5);
            let h = ((w as f64 * ratio) as u32).max(1);
            ImageDescriptor::new(format!("photo_{i:03}"), w, h)
        })
        .collect()
}

fn configs() -> Vec<LayoutConfig> {
    let mut out = Vec::new();
    for strategy in [Strategy::Grid, Strategy::Shelf] {
        for preset in [PagePreset::A4, PagePreset::Letter, PagePreset::Photo4x6] {
            for orientation in [Orientation::Portrait, Orientation::Landscape] {
                out.push(
                    LayoutConfig::builder()
                        .preset(preset)
                        .orientation(orientation)
                        .strategy(strategy)
                        .images_per_row(3)
                        .build(),
                );
            }
        }
    }
    out
}

#[test]
fn every_image_is_placed_exactly_once() {
    let images = random_images(42, 150);
    for cfg in configs() {
        let result = layout(&images, &cfg);
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (_, p) in result.placements() {
            *seen.entry(p.id.as_str()).or_default() += 1;
        }
        assert_eq!(seen.len(), images.len(), "{:?}", cfg);
        for img in &images {
            assert_eq!(seen.get(img.id.as_str()), Some(&1), "{} in {:?}", img.id, cfg);
        }
    }
}

#[test]
fn placements_keep_aspect_ratio() {
    let images = random_images(7, 120);
    let by_id: HashMap<&str, &ImageDescriptor> =
        images.iter().map(|i| (i.id.as_str(), i)).collect();
    for cfg in configs() {
        let result = layout(&images, &cfg);
        for (_, p) in result.placements() {
            let img = by_id[p.id.as_str()];
            let expected = img.width as f64 / img.height as f64;
            let actual = p.width / p.height;
            assert!(
                ((actual - expected) / expected).abs() < 1e-9,
                "{}: {} vs {}",
                p.id,
                actual,
                expected
            );
        }
    }
}

#[test]
fn placements_respect_horizontal_margins() {
    let images = random_images(3, 150);
    for cfg in configs() {
        let result = layout(&images, &cfg);
        let pad = cfg.padding as f64;
        let limit = result.page_width as f64 - pad;
        for (_, p) in result.placements() {
            assert!(p.x >= pad - EPS, "{} x={}", p.id, p.x);
            assert!(p.right() <= limit + EPS, "{} right={}", p.id, p.right());
            assert!(p.y >= pad - EPS, "{} y={}", p.id, p.y);
        }
    }
}

#[test]
fn grid_placements_stay_inside_the_page_when_images_fit() {
    // A4 portrait, 2 per row: cell 1190, tallest possible image 1190 * 2.5 < 3428
    let images = random_images(11, 200);
    let cfg = LayoutConfig::builder()
        .strategy(Strategy::Grid)
        .images_per_row(2)
        .build();
    let result = layout(&images, &cfg);
    let bottom = result.page_height as f64 - 40.0;
    for (_, p) in result.placements() {
        assert!(p.bottom() <= bottom + EPS, "{} bottom={}", p.id, p.bottom());
    }
}

#[test]
fn pages_are_non_empty_and_indexed_in_order() {
    let images = random_images(5, 90);
    for cfg in configs() {
        let result = layout(&images, &cfg);
        for (i, page) in result.pages.iter().enumerate() {
            assert_eq!(page.index, i);
            assert!(!page.placements.is_empty());
        }
    }
}

#[test]
fn layout_is_deterministic() {
    let images = random_images(99, 200);
    for cfg in configs() {
        let a = layout(&images, &cfg);
        let b = layout(&images, &cfg);
        assert_eq!(a, b);
        let bits = |r: &LayoutResult| -> Vec<[u64; 4]> {
            r.placements()
                .map(|(_, p)| {
                    [p.x.to_bits(), p.y.to_bits(), p.width.to_bits(), p.height.to_bits()]
                })
                .collect()
        };
        assert_eq!(bits(&a), bits(&b));
    }
}

#[test]
fn shelf_uses_no_more_pages_than_two_column_grid_for_mixed_photos() {
    let images = random_images(2024, 60);
    let grid = layout(
        &images,
        &LayoutConfig::builder().strategy(Strategy::Grid).images_per_row(2).build(),
    );
    let shelf = layout(&images, &LayoutConfig::builder().strategy(Strategy::Shelf).build());
    assert!(
        shelf.pages.len() <= grid.pages.len(),
        "shelf {} vs grid {}",
        shelf.pages.len(),
        grid.pages.len()
    );
}

#[test]
fn empty_input_yields_zero_pages() {
    let images: Vec<ImageDescriptor> = Vec::new();
    for cfg in configs() {
        let result = layout(&images, &cfg);
        assert!(result.is_empty());
        assert_eq!(result.pages.len(), 0);
        assert_eq!(result.stats().num_pages, 0);
    }
}

#[test]
fn degenerate_images_are_rejected_up_front_or_laid_out_finitely() {
    assert!(ImageDescriptor::try_new("zero", 0, 10).is_err());
    assert!(ImageDescriptor::try_new("ok", 10, 10).is_ok());

    let images = vec![
        ImageDescriptor::new("flat", 100, 0),
        ImageDescriptor::new("thin", 0, 100),
        ImageDescriptor::new("fine", 100, 100),
    ];
    for cfg in configs() {
        let result = layout(&images, &cfg);
        assert_eq!(result.placements().count(), 3);
        for (_, p) in result.placements() {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!(p.width.is_finite() && p.width > 0.0);
            assert!(p.height.is_finite() && p.height > 0.0);
        }
    }
}
