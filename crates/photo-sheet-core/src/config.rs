use crate::error::{PhotoSheetError, Result};
use crate::page::{Orientation, PagePreset, PageSize, resolve_page_dimensions};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Fallback values used whenever a configuration field is absent, zero where zero is
/// meaningless, or not a number.
pub mod defaults {
    use crate::page::{Orientation, PagePreset};

    use super::Strategy;

    pub const SPACING: u32 = 20;
    pub const PADDING: u32 = 40;
    pub const IMAGES_PER_ROW: u32 = 2;
    pub const PRESET: PagePreset = PagePreset::A4;
    pub const ORIENTATION: Orientation = Orientation::Portrait;
    pub const STRATEGY: Strategy = Strategy::Grid;
    /// Opaque white.
    pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
}

/// Placement strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Fixed number of images per row; each row is as tall as its tallest image.
    #[default]
    Grid,
    /// Greedy shelf packing: as many images per row as fit, rows rescaled to full width.
    Shelf,
}

impl FromStr for Strategy {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "shelf" | "smart" => Ok(Self::Shelf),
            _ => Err(()),
        }
    }
}

/// Page selection: a preset (or custom size) plus orientation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PageSpec {
    #[serde(default)]
    pub preset: PagePreset,
    /// Only read when `preset` is `Custom`.
    #[serde(default)]
    pub custom_width: Option<u32>,
    /// Only read when `preset` is `Custom`.
    #[serde(default)]
    pub custom_height: Option<u32>,
    #[serde(default)]
    pub orientation: Orientation,
}

impl PageSpec {
    pub fn preset(preset: PagePreset, orientation: Orientation) -> Self {
        Self {
            preset,
            custom_width: None,
            custom_height: None,
            orientation,
        }
    }

    pub fn custom(width: u32, height: u32) -> Self {
        Self {
            preset: PagePreset::Custom,
            custom_width: Some(width),
            custom_height: Some(height),
            orientation: Orientation::Portrait,
        }
    }

    pub fn size(&self) -> PageSize {
        resolve_page_dimensions(
            self.preset,
            self.custom_width,
            self.custom_height,
            self.orientation,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    #[serde(default)]
    pub page: PageSpec,
    /// Gap between neighbouring images, horizontally and vertically (pixels).
    #[serde(default = "default_spacing")]
    pub spacing: u32,
    /// Empty margin kept around all four page edges (pixels).
    #[serde(default = "default_padding")]
    pub padding: u32,
    /// Columns in grid mode. Ignored by the shelf strategy.
    #[serde(default = "default_images_per_row")]
    pub images_per_row: u32,
    #[serde(default)]
    pub strategy: Strategy,
    /// RGBA fill used by the compositor.
    #[serde(default = "default_background")]
    pub background: [u8; 4],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page: PageSpec::preset(defaults::PRESET, defaults::ORIENTATION),
            spacing: defaults::SPACING,
            padding: defaults::PADDING,
            images_per_row: defaults::IMAGES_PER_ROW,
            strategy: defaults::STRATEGY,
            background: defaults::BACKGROUND,
        }
    }
}

fn default_spacing() -> u32 {
    defaults::SPACING
}
fn default_padding() -> u32 {
    defaults::PADDING
}
fn default_images_per_row() -> u32 {
    defaults::IMAGES_PER_ROW
}
fn default_background() -> [u8; 4] {
    defaults::BACKGROUND
}

impl LayoutConfig {
    /// Create a fluent builder for `LayoutConfig`.
    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder::new()
    }

    /// Resolved page size in pixels.
    pub fn page_size(&self) -> PageSize {
        self.page.size()
    }

    /// Images per row actually used by the grid packer.
    pub fn effective_images_per_row(&self) -> u32 {
        if self.images_per_row == 0 {
            defaults::IMAGES_PER_ROW
        } else {
            self.images_per_row
        }
    }

    /// Padding actually used for `page`: clamped so at least one pixel of usable area
    /// remains on the shorter side.
    pub fn effective_padding(&self, page: PageSize) -> u32 {
        let max_padding = page.width.min(page.height).saturating_sub(1) / 2;
        if self.padding > max_padding {
            warn!(
                padding = self.padding,
                clamped = max_padding,
                width = page.width,
                height = page.height,
                "padding leaves no usable area; clamping"
            );
            max_padding
        } else {
            self.padding
        }
    }

    /// Spacing actually used by the grid packer: clamped so each of the `images_per_row`
    /// cells keeps at least one pixel of width. Shelf rows shrink to fit, so shelf
    /// spacing is left as configured.
    pub fn effective_spacing(&self, page: PageSize, padding: u32, images_per_row: u32) -> u32 {
        match self.max_grid_spacing(page, padding, images_per_row) {
            Some(max_spacing) if self.spacing > max_spacing => {
                warn!(
                    spacing = self.spacing,
                    clamped = max_spacing,
                    images_per_row,
                    width = page.width,
                    "spacing leaves no room for grid cells; clamping"
                );
                max_spacing
            }
            _ => self.spacing,
        }
    }

    fn max_grid_spacing(&self, page: PageSize, padding: u32, images_per_row: u32) -> Option<u32> {
        if self.strategy != Strategy::Grid || images_per_row <= 1 {
            return None;
        }
        let available = page.width.saturating_sub(padding.saturating_mul(2));
        Some(available.saturating_sub(images_per_row) / (images_per_row - 1))
    }

    /// Reports configuration values the layout engine would have to correct.
    ///
    /// `layout` never fails on these; it applies the same corrections silently (with a
    /// warning log). Callers that prefer to reject bad input up front can use this.
    pub fn validate(&self) -> Result<()> {
        if self.images_per_row == 0 {
            return Err(PhotoSheetError::InvalidConfig(
                "images_per_row must be at least 1".into(),
            ));
        }
        let page = self.page_size();
        let total_padding = self.padding.saturating_mul(2);
        if total_padding >= page.width || total_padding >= page.height {
            return Err(PhotoSheetError::InvalidConfig(format!(
                "padding ({}) * 2 exceeds page dimensions ({}x{})",
                self.padding, page.width, page.height
            )));
        }
        if let Some(max_spacing) = self.max_grid_spacing(page, self.padding, self.images_per_row)
        {
            if self.spacing > max_spacing {
                return Err(PhotoSheetError::InvalidConfig(format!(
                    "spacing ({}) leaves no room for {} grid cells (max {})",
                    self.spacing, self.images_per_row, max_spacing
                )));
            }
        }
        Ok(())
    }
}

/// Builder for `LayoutConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct LayoutConfigBuilder {
    cfg: LayoutConfig,
}

impl LayoutConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: LayoutConfig::default(),
        }
    }
    pub fn page(mut self, v: PageSpec) -> Self {
        self.cfg.page = v;
        self
    }
    pub fn preset(mut self, v: PagePreset) -> Self {
        self.cfg.page.preset = v;
        self
    }
    pub fn orientation(mut self, v: Orientation) -> Self {
        self.cfg.page.orientation = v;
        self
    }
    pub fn custom_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.page.preset = PagePreset::Custom;
        self.cfg.page.custom_width = Some(w);
        self.cfg.page.custom_height = Some(h);
        self
    }
    pub fn spacing(mut self, v: u32) -> Self {
        self.cfg.spacing = v;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn images_per_row(mut self, v: u32) -> Self {
        self.cfg.images_per_row = v;
        self
    }
    pub fn strategy(mut self, v: Strategy) -> Self {
        self.cfg.strategy = v;
        self
    }
    pub fn background(mut self, v: [u8; 4]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn build(self) -> LayoutConfig {
        self.cfg
    }
}

// ---------------- Lenient configuration ----------------

/// A loosely typed scalar as it arrives from a form, a YAML file or a query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Non-negative integer value, or `None` when the scalar is not numeric.
    ///
    /// Text follows integer-prefix semantics: leading whitespace is skipped and the
    /// leading run of digits is taken, so `"25px"` yields 25 and `"px25"` yields `None`.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Int(v) => u32::try_from(*v).ok(),
            Self::Float(v) if v.is_finite() && *v >= 0.0 && *v <= u32::MAX as f64 => {
                Some(v.trunc() as u32)
            }
            Self::Float(_) => None,
            Self::Text(s) => parse_int_prefix(s),
        }
    }

    fn as_text(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

fn parse_int_prefix(s: &str) -> Option<u32> {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Unvalidated configuration. Every field is optional and numeric fields accept
/// anything; [`RawLayoutConfig::apply`] fills the gaps from [`defaults`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub preset: Option<String>,
    pub orientation: Option<String>,
    pub width: Option<Scalar>,
    pub height: Option<Scalar>,
    pub spacing: Option<Scalar>,
    pub padding: Option<Scalar>,
    pub images_per_row: Option<Scalar>,
    pub strategy: Option<String>,
    pub background: Option<String>,
}

impl RawLayoutConfig {
    /// Resolve against the defaults table.
    pub fn into_config(self) -> LayoutConfig {
        self.apply(LayoutConfig::default())
    }

    /// Overlay the present fields onto `cfg`. Fields that are present but unusable
    /// reset to their default rather than keeping `cfg`'s value.
    pub fn apply(self, mut cfg: LayoutConfig) -> LayoutConfig {
        if let Some(v) = self.preset {
            cfg.page.preset = v.parse().unwrap_or_else(|_| {
                warn!(value = %v, fallback = %defaults::PRESET, "unknown page preset");
                defaults::PRESET
            });
        }
        if let Some(v) = self.orientation {
            cfg.page.orientation = v.parse().unwrap_or_else(|_| {
                warn!(value = %v, "unknown orientation");
                defaults::ORIENTATION
            });
        }
        if let Some(v) = self.width {
            cfg.page.custom_width = positive("width", &v);
        }
        if let Some(v) = self.height {
            cfg.page.custom_height = positive("height", &v);
        }
        // An explicit 0 is a real value for spacing and padding, not a request for the default.
        if let Some(v) = self.spacing {
            cfg.spacing = non_negative("spacing", &v).unwrap_or(defaults::SPACING);
        }
        if let Some(v) = self.padding {
            cfg.padding = non_negative("padding", &v).unwrap_or(defaults::PADDING);
        }
        if let Some(v) = self.images_per_row {
            cfg.images_per_row = positive("images_per_row", &v).unwrap_or(defaults::IMAGES_PER_ROW);
        }
        if let Some(v) = self.strategy {
            cfg.strategy = v.parse().unwrap_or_else(|_| {
                warn!(value = %v, "unknown strategy");
                defaults::STRATEGY
            });
        }
        if let Some(v) = self.background {
            cfg.background = parse_hex_color(&v).unwrap_or_else(|e| {
                warn!(error = %e, "invalid background color");
                defaults::BACKGROUND
            });
        }
        cfg
    }
}

fn non_negative(field: &'static str, v: &Scalar) -> Option<u32> {
    let parsed = v.as_u32();
    if parsed.is_none() {
        warn!(field, value = %v.as_text(), "non-numeric value; using default");
    }
    parsed
}

fn positive(field: &'static str, v: &Scalar) -> Option<u32> {
    non_negative(field, v).filter(|n| *n > 0)
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional) into RGBA.
pub fn parse_hex_color(s: &str) -> Result<[u8; 4]> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || PhotoSheetError::InvalidInput(format!("invalid hex color: {s}"));
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut out = [255u8; 4];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                out[i] = v * 17;
            }
            Ok(out)
        }
        6 => Ok([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Ok([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_prefix_parsing() {
        assert_eq!(parse_int_prefix("25px"), Some(25));
        assert_eq!(parse_int_prefix("  7"), Some(7));
        assert_eq!(parse_int_prefix("px25"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-3"), None);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ffffff").unwrap(), [255, 255, 255, 255]);
        assert_eq!(parse_hex_color("000").unwrap(), [0, 0, 0, 255]);
        assert_eq!(parse_hex_color("#11223344").unwrap(), [0x11, 0x22, 0x33, 0x44]);
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
    }
}
