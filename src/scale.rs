//! Rescaling of an extracted preview.
//!
//! Sits outside the box walk: it only sees the decoded image.

use crate::error::ScaleError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Target size for scaling `width`x`height` by `factor`, each axis floored.
pub fn output_dimensions(width: u32, height: u32, factor: f64) -> Result<(u32, u32), ScaleError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ScaleError::InvalidFactor(factor));
    }
    let w = (width as f64 * factor).floor();
    let h = (height as f64 * factor).floor();
    if w < 1.0 || h < 1.0 {
        return Err(ScaleError::EmptyOutput { width, height, factor });
    }
    // `as` saturates at u32::MAX for very large factors.
    Ok((w as u32, h as u32))
}

pub fn scale(img: &DynamicImage, factor: f64) -> Result<DynamicImage, ScaleError> {
    let (w, h) = output_dimensions(img.width(), img.height(), factor)?;
    debug!(from_w = img.width(), from_h = img.height(), w, h, "resizing preview");
    Ok(img.resize_exact(w, h, FilterType::Lanczos3))
}

/// Decode an encoded image, scale it, and re-encode the result as JPEG.
pub fn rescale_jpeg(bytes: &[u8], factor: f64) -> Result<Vec<u8>, ScaleError> {
    let img = image::load_from_memory(bytes)?;
    let scaled = scale(&img, factor)?;
    let mut buf = Cursor::new(Vec::new());
    // JPEG has no alpha channel.
    DynamicImage::ImageRgb8(scaled.to_rgb8()).write_to(&mut buf, ImageFormat::Jpeg)?;
    Ok(buf.into_inner())
}
