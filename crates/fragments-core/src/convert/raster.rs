//! Raster image re-encoding between PNG, JPEG, WebP and GIF.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

/// Decode `data` (format sniffed from its magic bytes) and encode it as `format`.
fn reencode(data: &[u8], format: ImageFormat) -> Result<Vec<u8>, String> {
    let decoded =
        image::load_from_memory(data).map_err(|e| format!("cannot decode image: {e}"))?;

    // JPEG has no alpha channel; the WebP and GIF encoders want 8-bit RGBA.
    let image = match format {
        ImageFormat::Png => decoded,
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        _ => DynamicImage::ImageRgba8(decoded.to_rgba8()),
    };

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .map_err(|e| format!("cannot encode {format:?}: {e}"))?;
    Ok(out.into_inner())
}

pub(super) fn to_png(data: &[u8]) -> Result<Vec<u8>, String> {
    reencode(data, ImageFormat::Png)
}

pub(super) fn to_jpeg(data: &[u8]) -> Result<Vec<u8>, String> {
    reencode(data, ImageFormat::Jpeg)
}

pub(super) fn to_webp(data: &[u8]) -> Result<Vec<u8>, String> {
    reencode(data, ImageFormat::WebP)
}

pub(super) fn to_gif(data: &[u8]) -> Result<Vec<u8>, String> {
    reencode(data, ImageFormat::Gif)
}
