use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use std::io::Cursor;

/// Decoded photo scaled into a bounding box, flattened to RGB.
#[derive(Debug, Clone)]
pub(crate) struct PreparedPhoto {
    pub(crate) image: DynamicImage,
}

impl PreparedPhoto {
    /// Decodes `bytes` and shrinks the image to fit `max_width` x `max_height`
    /// pixels, keeping its aspect ratio. Smaller images are left as they are.
    pub(crate) fn fit(
        bytes: &[u8],
        max_width: u32,
        max_height: u32,
    ) -> Result<Self, image::ImageError> {
        let decoded = image::load_from_memory(bytes)?;
        let scaled = if decoded.width() <= max_width && decoded.height() <= max_height {
            decoded
        } else {
            decoded.resize(max_width, max_height, FilterType::Triangle)
        };

        Ok(Self {
            image: DynamicImage::ImageRgb8(scaled.to_rgb8()),
        })
    }

    pub(crate) fn width(&self) -> u32 {
        self.image.width()
    }

    pub(crate) fn height(&self) -> u32 {
        self.image.height()
    }

    pub(crate) fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, ImageOutputFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([200, 30, 30, 255]),
    ));
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .expect("png encodes");
    buffer.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_photos_shrink_preserving_aspect_ratio() {
        let photo = PreparedPhoto::fit(&sample_png(400, 100), 200, 150).expect("decodes");
        assert_eq!((photo.width(), photo.height()), (200, 50));
        assert!(matches!(photo.image, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn small_photos_are_not_enlarged() {
        let photo = PreparedPhoto::fit(&sample_png(30, 20), 200, 150).expect("decodes");
        assert_eq!((photo.width(), photo.height()), (30, 20));
    }

    #[test]
    fn reencoded_png_decodes_again() {
        let photo = PreparedPhoto::fit(&sample_png(64, 64), 32, 32).expect("decodes");
        let png = photo.to_png().expect("encodes");
        let decoded = image::load_from_memory(&png).expect("valid png");
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(PreparedPhoto::fit(b"definitely not an image", 10, 10).is_err());
    }
}
