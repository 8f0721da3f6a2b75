//! Core library for laying photos out onto fixed-size pages.
//!
//! - Strategies: uniform Grid (fixed images per row) and greedy Shelf (rows filled
//!   first-fit, then rescaled to span the page width)
//! - Pipeline: `layout` takes image sizes plus a `LayoutConfig` and returns pages of
//!   placements; it never touches pixels
//! - Page sizes: named presets at 300 DPI (A4, Letter, 4x6, 5x7) or custom, either orientation
//! - Data model is serde-serializable; JSON exporters and an optional compositor
//!   (feature `image`) are provided as helpers.
//!
//! Quick example:
//! ```
//! use photo_sheet_core::prelude::*;
//!
//! let images = vec![
//!     ImageDescriptor::new("a.jpg", 4000, 3000),
//!     ImageDescriptor::new("b.jpg", 3000, 4000),
//! ];
//! let cfg = LayoutConfig::builder()
//!     .preset(PagePreset::A4)
//!     .strategy(Strategy::Shelf)
//!     .build();
//! let result = layout(&images, &cfg);
//! assert_eq!(result.placements().count(), 2);
//! println!("pages: {}", result.pages.len());
//! ```

#[cfg(feature = "image")]
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod page;
pub mod pipeline;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use page::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `photo_sheet_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{LayoutConfig, LayoutConfigBuilder, PageSpec, RawLayoutConfig, Strategy};
    pub use crate::model::{ImageDescriptor, LayoutResult, LayoutStats, Meta, Page, Placement};
    pub use crate::page::{Orientation, PagePreset, PageSize, resolve_page_dimensions};
    pub use crate::{layout, to_json, to_json_by_id};
}
