use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::Serialize;
use std::io::Cursor;

use crate::error::{AppError, Result};

/// Screenshots wider than this are downscaled before upload.
pub const MAX_UPLOAD_WIDTH: u32 = 1600;

/// A chat screenshot ready to hand to the extraction backend.
#[derive(Debug, Clone, Serialize)]
pub struct ImagePayload {
    pub mime_type: &'static str,
    pub base64_data: String,
    pub width: u32,
    pub height: u32,
}

fn mime_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes).map_err(AppError::extraction)?;
        let mime_type = mime_for(format).ok_or_else(|| {
            AppError::extraction(anyhow::anyhow!("unsupported image format: {:?}", format))
        })?;

        let decoded =
            image::load_from_memory_with_format(bytes, format).map_err(AppError::extraction)?;
        let (width, height) = decoded.dimensions();

        if width <= MAX_UPLOAD_WIDTH {
            return Ok(Self {
                mime_type,
                base64_data: STANDARD.encode(bytes),
                width,
                height,
            });
        }

        // Resize for upload, keeping the aspect ratio
        let scale = MAX_UPLOAD_WIDTH as f64 / width as f64;
        let new_height = ((height as f64 * scale) as u32).max(1);
        let resized = image::imageops::resize(
            &decoded.to_rgba8(),
            MAX_UPLOAD_WIDTH,
            new_height,
            image::imageops::FilterType::Triangle,
        );

        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(resized)
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(AppError::extraction)?;

        log::debug!(
            "Downscaled screenshot {}x{} -> {}x{}",
            width,
            height,
            MAX_UPLOAD_WIDTH,
            new_height
        );

        Ok(Self {
            mime_type: "image/png",
            base64_data: STANDARD.encode(buffer.into_inner()),
            width: MAX_UPLOAD_WIDTH,
            height: new_height,
        })
    }

    /// Accepts `data:image/...;base64,` URLs as produced by web file readers,
    /// or bare base64.
    pub fn from_data_url(data: &str) -> Result<Self> {
        let encoded = match data.strip_prefix("data:") {
            Some(rest) => {
                let (_, payload) = rest.split_once(',').ok_or_else(|| {
                    AppError::extraction(anyhow::anyhow!("malformed data URL"))
                })?;
                payload
            }
            None => data,
        };
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(AppError::extraction)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(width, height));
        let img = if matches!(format, ImageFormat::Jpeg | ImageFormat::Bmp) {
            DynamicImage::ImageRgb8(img.to_rgb8())
        } else {
            img
        };
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn small_png_passes_through() {
        let bytes = encode(8, 4, ImageFormat::Png);
        let payload = ImagePayload::from_bytes(&bytes).unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!((payload.width, payload.height), (8, 4));
        assert_eq!(STANDARD.decode(&payload.base64_data).unwrap(), bytes);
    }

    #[test]
    fn jpeg_keeps_its_mime() {
        let payload = ImagePayload::from_bytes(&encode(4, 4, ImageFormat::Jpeg)).unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
    }

    #[test]
    fn wide_screenshot_is_downscaled() {
        let payload = ImagePayload::from_bytes(&encode(3200, 100, ImageFormat::Png)).unwrap();
        assert_eq!(payload.width, MAX_UPLOAD_WIDTH);
        assert_eq!(payload.height, 50);
        assert_eq!(payload.mime_type, "image/png");
    }

    #[test]
    fn rejects_garbage_and_unsupported_formats() {
        let err = ImagePayload::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AppError::ExtractionFailed { .. }));

        let err = ImagePayload::from_bytes(&encode(4, 4, ImageFormat::Bmp)).unwrap_err();
        assert!(matches!(err, AppError::ExtractionFailed { .. }));
    }

    #[test]
    fn strips_data_url_prefix() {
        let bytes = encode(2, 2, ImageFormat::Png);
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));
        let payload = ImagePayload::from_data_url(&url).unwrap();
        assert_eq!((payload.width, payload.height), (2, 2));

        let bare = ImagePayload::from_data_url(&STANDARD.encode(&bytes)).unwrap();
        assert_eq!(bare.base64_data, payload.base64_data);

        assert!(ImagePayload::from_data_url("data:image/png;base64").is_err());
    }
}
