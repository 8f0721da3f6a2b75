use photo_sheet_core::config::{RawLayoutConfig, Scalar, defaults};
use photo_sheet_core::error::PhotoSheetError;
use photo_sheet_core::prelude::*;

#[test]
fn defaults_table_matches_default_config() {
    let cfg = LayoutConfig::default();
    assert_eq!(cfg.spacing, 20);
    assert_eq!(cfg.padding, 40);
    assert_eq!(cfg.images_per_row, 2);
    assert_eq!(cfg.strategy, Strategy::Grid);
    assert_eq!(cfg.page_size(), PageSize::new(2480, 3508));
    assert_eq!(cfg.background, defaults::BACKGROUND);
}

#[test]
fn empty_json_object_deserializes_to_defaults() {
    let cfg: LayoutConfig = serde_json::from_str("{}").expect("parse");
    assert_eq!(cfg, LayoutConfig::default());
}

#[test]
fn raw_yaml_with_garbage_values_falls_back() {
    let yaml = r##"
preset: letter
orientation: landscape
spacing: "abc"
padding: "25px"
images_per_row: 0
strategy: shelf
background: "#000000"
"##;
    let raw: RawLayoutConfig = serde_yaml::from_str(yaml).expect("yaml");
    let cfg = raw.into_config();
    assert_eq!(cfg.spacing, defaults::SPACING);
    assert_eq!(cfg.padding, 25);
    assert_eq!(cfg.images_per_row, defaults::IMAGES_PER_ROW);
    assert_eq!(cfg.strategy, Strategy::Shelf);
    assert_eq!(cfg.background, [0, 0, 0, 255]);
    assert_eq!(cfg.page_size(), PageSize::new(3300, 2550));
}

#[test]
fn raw_custom_dimensions_fall_back_per_axis() {
    let raw = RawLayoutConfig {
        preset: Some("custom".into()),
        width: Some(Scalar::Text("wide".into())),
        height: Some(Scalar::Int(1000)),
        ..Default::default()
    };
    let cfg = raw.into_config();
    assert_eq!(cfg.page_size(), PageSize::new(2480, 1000));
}

#[test]
fn zero_spacing_and_padding_are_honoured() {
    let raw = RawLayoutConfig {
        spacing: Some(Scalar::Int(0)),
        padding: Some(Scalar::Text("0".into())),
        ..Default::default()
    };
    let cfg = raw.into_config();
    assert_eq!(cfg.spacing, 0);
    assert_eq!(cfg.padding, 0);
}

#[test]
fn negative_and_fractional_numbers() {
    assert_eq!(Scalar::Int(-5).as_u32(), None);
    assert_eq!(Scalar::Float(12.9).as_u32(), Some(12));
    assert_eq!(Scalar::Float(f64::NAN).as_u32(), None);
    let raw = RawLayoutConfig {
        padding: Some(Scalar::Int(-5)),
        ..Default::default()
    };
    assert_eq!(raw.into_config().padding, defaults::PADDING);
}

#[test]
fn unknown_names_fall_back_to_defaults() {
    let raw = RawLayoutConfig {
        preset: Some("a5".into()),
        orientation: Some("diagonal".into()),
        strategy: Some("spiral".into()),
        background: Some("not-a-color".into()),
        ..Default::default()
    };
    let cfg = raw.into_config();
    assert_eq!(cfg.page.preset, PagePreset::A4);
    assert_eq!(cfg.page.orientation, Orientation::Portrait);
    assert_eq!(cfg.strategy, Strategy::Grid);
    assert_eq!(cfg.background, defaults::BACKGROUND);
}

#[test]
fn apply_only_touches_present_fields() {
    let base = LayoutConfig::builder().spacing(5).padding(7).build();
    let raw = RawLayoutConfig {
        images_per_row: Some(Scalar::Int(4)),
        ..Default::default()
    };
    let cfg = raw.apply(base);
    assert_eq!((cfg.spacing, cfg.padding, cfg.images_per_row), (5, 7, 4));
}

#[test]
fn validate_reports_what_layout_would_correct() {
    let cfg = LayoutConfig::builder().images_per_row(0).build();
    match cfg.validate() {
        Err(PhotoSheetError::InvalidConfig(msg)) => assert!(msg.contains("images_per_row")),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
    let cfg = LayoutConfig::builder().custom_size(100, 100).padding(50).build();
    match cfg.validate() {
        Err(PhotoSheetError::InvalidConfig(msg)) => assert!(msg.contains("padding")),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
    assert!(LayoutConfig::default().validate().is_ok());
}

#[test]
fn oversized_padding_is_clamped_by_layout() {
    let cfg = LayoutConfig::builder()
        .custom_size(100, 100)
        .padding(80)
        .spacing(0)
        .images_per_row(1)
        .build();
    assert_eq!(cfg.effective_padding(cfg.page_size()), 49);
    let images = vec![ImageDescriptor::new("a", 10, 10)];
    let result = layout(&images, &cfg);
    assert_eq!(result.meta.padding, 49);
    let p = &result.pages[0].placements[0];
    assert_eq!((p.x, p.y, p.width), (49.0, 49.0, 2.0));
}

#[test]
fn zero_images_per_row_lays_out_like_the_default() {
    let images: Vec<_> = (0..4).map(|i| ImageDescriptor::new(i, 1000, 1000)).collect();
    let zero = layout(&images, &LayoutConfig::builder().images_per_row(0).build());
    let two = layout(&images, &LayoutConfig::builder().images_per_row(2).build());
    assert_eq!(zero.pages, two.pages);
}

#[test]
fn validate_rejects_grid_spacing_that_leaves_no_cells() {
    let cfg = LayoutConfig::builder()
        .preset(PagePreset::A4)
        .padding(40)
        .spacing(3000)
        .images_per_row(2)
        .build();
    match cfg.validate() {
        Err(PhotoSheetError::InvalidConfig(msg)) => assert!(msg.contains("spacing")),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
    // the largest spacing that still leaves 1px cells is fine
    let cfg = LayoutConfig::builder().spacing(2398).images_per_row(2).build();
    assert!(cfg.validate().is_ok());
    // a single column never divides width by spacing
    let cfg = LayoutConfig::builder().spacing(3000).images_per_row(1).build();
    assert!(cfg.validate().is_ok());
}
