use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoSheetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "image")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Image `{id}` has a zero dimension ({width}x{height})")]
    DegenerateImage { id: String, width: u32, height: u32 },
    #[error("No source image for placement `{id}` on page {page}")]
    MissingSource { id: String, page: usize },
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, PhotoSheetError>;
