//! Template image decoding. Only the intrinsic pixel size is ever read.

use std::io::Cursor;

use image::ImageReader;
use thiserror::Error;

use crate::layout::NativeSize;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Could not read template image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not decode template image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Template image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// Reads the image header and returns its native size.
pub fn decode_dimensions(bytes: &[u8]) -> Result<NativeSize, TemplateError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(TemplateError::Empty { width, height });
    }
    Ok(NativeSize { width, height })
}
