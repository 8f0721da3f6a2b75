use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference resolution the preset pixel sizes are computed at.
pub const PRESET_DPI: u32 = 300;

/// Named page sizes. Pixel sizes are precomputed at [`PRESET_DPI`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PagePreset {
    /// ISO A4, 210 x 297 mm.
    #[default]
    A4,
    /// US Letter, 8.5 x 11 in.
    Letter,
    /// 4 x 6 in photo print.
    #[serde(rename = "4x6")]
    Photo4x6,
    /// 5 x 7 in photo print.
    #[serde(rename = "5x7")]
    Photo5x7,
    /// Caller-supplied width/height.
    Custom,
}

impl PagePreset {
    /// All presets with a fixed size, in display order.
    pub const FIXED: [PagePreset; 4] = [Self::A4, Self::Letter, Self::Photo4x6, Self::Photo5x7];

    /// Portrait pixel size of the preset. `Custom` reports the default preset's size,
    /// which is what custom mode falls back to.
    pub fn portrait_size(self) -> PageSize {
        match self {
            Self::A4 | Self::Custom => PageSize::new(2480, 3508),
            Self::Letter => PageSize::new(2550, 3300),
            Self::Photo4x6 => PageSize::new(1200, 1800),
            Self::Photo5x7 => PageSize::new(1500, 2100),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::A4 => "a4",
            Self::Letter => "letter",
            Self::Photo4x6 => "4x6",
            Self::Photo5x7 => "5x7",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for PagePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PagePreset {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            "4x6" => Ok(Self::Photo4x6),
            "5x7" => Ok(Self::Photo5x7),
            "custom" => Ok(Self::Custom),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(()),
        }
    }
}

/// Concrete page size in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The same page turned 90 degrees.
    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Resolves a preset (or custom width/height) plus orientation into pixels.
///
/// Custom dimensions that are missing or zero fall back, per axis, to the default
/// preset. Landscape swaps the axes after resolution. Never fails.
pub fn resolve_page_dimensions(
    preset: PagePreset,
    custom_width: Option<u32>,
    custom_height: Option<u32>,
    orientation: Orientation,
) -> PageSize {
    let size = match preset {
        PagePreset::Custom => {
            let fallback = PagePreset::default().portrait_size();
            PageSize::new(
                custom_width.filter(|w| *w > 0).unwrap_or(fallback.width),
                custom_height.filter(|h| *h > 0).unwrap_or(fallback.height),
            )
        }
        fixed => fixed.portrait_size(),
    };
    match orientation {
        Orientation::Portrait => size,
        Orientation::Landscape => size.transposed(),
    }
}
