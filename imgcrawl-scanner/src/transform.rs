use crate::error::Result;
use crate::model::{Image, TransformKind, TransformedImage};
use image::{DynamicImage, ImageFormat, Rgba};
use std::io::Cursor;
use tracing::debug;

/// Applies one transform to one image.
pub trait ImageTransformer: Send + Sync {
    fn apply(&self, kind: TransformKind, image: &Image) -> Result<TransformedImage>;
}

/// Transforms decoded pixels with the `image` crate and re-encodes them as PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelTransformer;

impl PixelTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl ImageTransformer for PixelTransformer {
    fn apply(&self, kind: TransformKind, image: &Image) -> Result<TransformedImage> {
        let decoded = image::load_from_memory(image.bytes())?;
        debug!(
            "Applying {} to {} ({}x{})",
            kind,
            image.id(),
            decoded.width(),
            decoded.height()
        );

        let output = match kind {
            TransformKind::Grayscale => decoded.grayscale(),
            TransformKind::Mirror => decoded.fliph(),
            TransformKind::Sepia => sepia(&decoded),
        };

        let mut encoded = Cursor::new(Vec::new());
        output.write_to(&mut encoded, ImageFormat::Png)?;

        Ok(TransformedImage::new(image.id(), kind, encoded.into_inner()))
    }
}

fn sepia(source: &DynamicImage) -> DynamicImage {
    let mut rgba = source.to_rgba8();
    for pixel in rgba.pixels_mut() {
        let [r, g, b, a] = pixel.0.map(f32::from);
        let tone = |wr: f32, wg: f32, wb: f32| (r * wr + g * wg + b * wb).min(255.0) as u8;
        *pixel = Rgba([
            tone(0.393, 0.769, 0.189),
            tone(0.349, 0.686, 0.168),
            tone(0.272, 0.534, 0.131),
            a as u8,
        ]);
    }
    DynamicImage::ImageRgba8(rgba)
}
