//! Still photo compositing

use camera_capture::PixelBuffer;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::CompositeError;

/// Draw an overlay snapshot over a photo frame in place.
///
/// The overlay is rescaled to the photo size without filtering, then blended
/// at the origin using its own alpha channel. The overlay is consumed.
pub fn composite_still_frame(
    base: &mut PixelBuffer,
    overlay: Option<RgbaImage>,
) -> Result<(), CompositeError> {
    let Some(overlay) = overlay else {
        debug!("No overlay snapshot, keeping photo as captured");
        return Ok(());
    };

    if overlay.width() == 0 || overlay.height() == 0 {
        return Err(CompositeError::EmptyOverlay);
    }

    let (width, height) = (base.width(), base.height());
    let scaled = if overlay.dimensions() == (width, height) {
        overlay
    } else {
        debug!(
            "Scaling overlay {}x{} -> {}x{}",
            overlay.width(),
            overlay.height(),
            width,
            height
        );
        imageops::resize(&overlay, width, height, FilterType::Nearest)
    };

    let mut canvas = base.to_rgba_image();
    imageops::overlay(&mut canvas, &scaled, 0, 0);
    base.write_rgba_image(&canvas);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture::ChannelOrder;
    use image::Rgba;

    fn red_photo(width: u32, height: u32, order: ChannelOrder) -> PixelBuffer {
        let image = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        PixelBuffer::from_rgba_image(&image, order)
    }

    #[test]
    fn test_absent_overlay_is_noop() {
        let mut photo = red_photo(3, 3, ChannelOrder::Rgba);
        let before = photo.clone();
        composite_still_frame(&mut photo, None).unwrap();
        assert_eq!(photo, before);
    }

    #[test]
    fn test_opaque_overlay_replaces() {
        let mut photo = red_photo(2, 2, ChannelOrder::Rgba);
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        composite_still_frame(&mut photo, Some(overlay)).unwrap();
        assert_eq!(photo.pixel(1, 1), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_transparent_overlay_keeps_photo() {
        let mut photo = red_photo(2, 2, ChannelOrder::Rgba);
        let before = photo.clone();
        let overlay = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 0]));
        composite_still_frame(&mut photo, Some(overlay)).unwrap();
        assert_eq!(photo, before);
    }

    #[test]
    fn test_translucent_overlay_blends() {
        let mut photo = red_photo(1, 1, ChannelOrder::Rgba);
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 128]));
        composite_still_frame(&mut photo, Some(overlay)).unwrap();

        let [r, _, b, a] = photo.pixel(0, 0).unwrap();
        assert!(r > 0 && r < 255);
        assert!(b > 0 && b < 255);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_overlay_rescaled_to_photo() {
        let mut photo = red_photo(4, 4, ChannelOrder::Rgba);
        let mut overlay = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        overlay.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
        overlay.put_pixel(1, 1, Rgba([0, 0, 255, 255]));

        composite_still_frame(&mut photo, Some(overlay)).unwrap();

        assert_eq!(photo.pixel(0, 0), Some([0, 255, 0, 255]));
        assert_eq!(photo.pixel(3, 3), Some([0, 0, 255, 255]));
        assert_eq!(photo.pixel(3, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_argb_photo_written_back_in_order() {
        let mut photo = red_photo(1, 1, ChannelOrder::Argb);
        assert_eq!(photo.data(), &[255, 255, 0, 0]);

        let overlay = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 255]));
        composite_still_frame(&mut photo, Some(overlay)).unwrap();

        assert_eq!(photo.data(), &[255, 0, 0, 255]);
    }

    #[test]
    fn test_empty_overlay_rejected() {
        let mut photo = red_photo(1, 1, ChannelOrder::Rgba);
        let result = composite_still_frame(&mut photo, Some(RgbaImage::new(0, 0)));
        assert_eq!(result, Err(CompositeError::EmptyOverlay));
    }
}
