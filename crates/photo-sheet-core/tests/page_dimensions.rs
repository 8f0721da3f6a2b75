use photo_sheet_core::prelude::*;

#[test]
fn a4_landscape_is_transpose_of_portrait() {
    let portrait = resolve_page_dimensions(PagePreset::A4, None, None, Orientation::Portrait);
    let landscape = resolve_page_dimensions(PagePreset::A4, None, None, Orientation::Landscape);
    assert_eq!(portrait, PageSize::new(2480, 3508));
    assert_eq!(landscape, PageSize::new(3508, 2480));
}

#[test]
fn every_fixed_preset_swaps_in_landscape() {
    for preset in PagePreset::FIXED {
        let p = resolve_page_dimensions(preset, None, None, Orientation::Portrait);
        let l = resolve_page_dimensions(preset, None, None, Orientation::Landscape);
        assert_eq!(l, p.transposed(), "preset {preset}");
        assert!(p.width < p.height, "preset {preset} should be portrait");
    }
}

#[test]
fn preset_pixel_sizes() {
    let size = |p| resolve_page_dimensions(p, None, None, Orientation::Portrait);
    assert_eq!(size(PagePreset::Letter), PageSize::new(2550, 3300));
    assert_eq!(size(PagePreset::Photo4x6), PageSize::new(1200, 1800));
    assert_eq!(size(PagePreset::Photo5x7), PageSize::new(1500, 2100));
}

#[test]
fn custom_uses_supplied_dimensions() {
    let s = resolve_page_dimensions(PagePreset::Custom, Some(800), Some(600), Orientation::Portrait);
    assert_eq!(s, PageSize::new(800, 600));
    let l = resolve_page_dimensions(PagePreset::Custom, Some(800), Some(600), Orientation::Landscape);
    assert_eq!(l, PageSize::new(600, 800));
}

#[test]
fn custom_falls_back_per_axis() {
    let missing_w = resolve_page_dimensions(PagePreset::Custom, None, Some(600), Orientation::Portrait);
    assert_eq!(missing_w, PageSize::new(2480, 600));
    let zero_h = resolve_page_dimensions(PagePreset::Custom, Some(800), Some(0), Orientation::Portrait);
    assert_eq!(zero_h, PageSize::new(800, 3508));
    let none = resolve_page_dimensions(PagePreset::Custom, None, None, Orientation::Landscape);
    assert_eq!(none, PageSize::new(3508, 2480));
}

#[test]
fn orientation_and_preset_parse_case_insensitively() {
    assert_eq!("Landscape".parse::<Orientation>(), Ok(Orientation::Landscape));
    assert_eq!(" letter ".parse::<PagePreset>(), Ok(PagePreset::Letter));
    assert!("sideways".parse::<Orientation>().is_err());
}
