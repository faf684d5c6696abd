//! Video path compositing

use camera_capture::{PackedFrame, PixelBuffer, BYTES_PER_PIXEL};
use tracing::debug;

use crate::CompositeError;

/// Merge a packed overlay into a recording frame in place.
///
/// Each overlay word is read as four bytes in little-endian order, named
/// (alpha, red, green, blue). Where the alpha byte is non-zero the four
/// bytes replace the base pixel verbatim; elsewhere the base pixel is kept.
///
/// Opaque pure black and full transparency are both all-zero words, so
/// black overlay content is dropped as if it were transparent.
///
/// Returns the number of base pixels that were overwritten. `None` leaves
/// the frame untouched.
pub fn composite_video_frame(
    base: &mut PixelBuffer,
    overlay: Option<&PackedFrame>,
) -> Result<usize, CompositeError> {
    let Some(overlay) = overlay else {
        return Ok(0);
    };

    if overlay.pixel_count() != base.pixel_count() {
        return Err(CompositeError::SizeMismatch {
            base: base.pixel_count(),
            overlay: overlay.pixel_count(),
        });
    }

    let mut written = 0;
    for (dst, word) in base
        .data_mut()
        .chunks_exact_mut(BYTES_PER_PIXEL)
        .zip(overlay.words())
    {
        let [a, r, g, b] = word.to_le_bytes();
        if a != 0 {
            dst.copy_from_slice(&[a, r, g, b]);
            written += 1;
        }
    }

    debug!("Video composite wrote {} of {} pixels", written, overlay.pixel_count());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture::ChannelOrder;
    use proptest::prelude::*;

    fn base(width: u32, height: u32, fill: u8) -> PixelBuffer {
        PixelBuffer::new(
            vec![fill; width as usize * height as usize * BYTES_PER_PIXEL],
            width,
            height,
            ChannelOrder::Rgba,
        )
        .unwrap()
    }

    #[test]
    fn test_absent_overlay_is_noop() {
        let mut frame = base(4, 4, 7);
        let before = frame.clone();
        assert_eq!(composite_video_frame(&mut frame, None), Ok(0));
        assert_eq!(frame, before);
    }

    #[test]
    fn test_little_endian_byte_order() {
        let mut frame = base(2, 1, 9);
        let overlay = PackedFrame::new(vec![0x4433_2211, 0x0000_0000], 2, 1).unwrap();

        let written = composite_video_frame(&mut frame, Some(&overlay)).unwrap();

        assert_eq!(written, 1);
        assert_eq!(frame.pixel(0, 0), Some([0x11, 0x22, 0x33, 0x44]));
        assert_eq!(frame.pixel(1, 0), Some([9, 9, 9, 9]));
    }

    #[test]
    fn test_opaque_black_treated_as_transparent() {
        let mut frame = base(1, 1, 200);
        let overlay = PackedFrame::new(vec![0], 1, 1).unwrap();
        composite_video_frame(&mut frame, Some(&overlay)).unwrap();
        assert_eq!(frame.pixel(0, 0), Some([200, 200, 200, 200]));
    }

    #[test]
    fn test_only_low_byte_gates() {
        // High bytes set but the low ("alpha") byte is zero
        let mut frame = base(1, 1, 5);
        let overlay = PackedFrame::new(vec![0xFFFF_FF00], 1, 1).unwrap();
        assert_eq!(composite_video_frame(&mut frame, Some(&overlay)), Ok(0));
        assert_eq!(frame.pixel(0, 0), Some([5, 5, 5, 5]));
    }

    #[test]
    fn test_base_channel_order_ignored() {
        let mut frame = PixelBuffer::blank(1, 1, ChannelOrder::Argb);
        let overlay = PackedFrame::new(vec![0x0403_0201], 1, 1).unwrap();
        composite_video_frame(&mut frame, Some(&overlay)).unwrap();
        assert_eq!(frame.data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_size_mismatch_leaves_base() {
        let mut frame = base(2, 2, 3);
        let before = frame.clone();
        let overlay = PackedFrame::new(vec![0xFFFF_FFFF; 2], 2, 1).unwrap();

        let result = composite_video_frame(&mut frame, Some(&overlay));

        assert_eq!(result, Err(CompositeError::SizeMismatch { base: 4, overlay: 2 }));
        assert_eq!(frame, before);
    }

    proptest! {
        #[test]
        fn prop_composite_follows_alpha_byte(
            pixels in prop::collection::vec((any::<[u8; 4]>(), any::<u32>()), 1..64)
        ) {
            let width = pixels.len() as u32;
            let base_bytes: Vec<u8> = pixels.iter().flat_map(|(px, _)| *px).collect();
            let words: Vec<u32> = pixels.iter().map(|(_, w)| *w).collect();

            let mut frame = PixelBuffer::new(base_bytes, width, 1, ChannelOrder::Rgba).unwrap();
            let overlay = PackedFrame::new(words, width, 1).unwrap();
            composite_video_frame(&mut frame, Some(&overlay)).unwrap();

            for (x, (base_px, word)) in pixels.iter().enumerate() {
                let le = word.to_le_bytes();
                let out = frame.pixel(x as u32, 0).unwrap();
                if le[0] == 0 {
                    prop_assert_eq!(out, *base_px);
                } else {
                    prop_assert_eq!(out, le);
                }
            }
        }

        #[test]
        fn prop_absent_overlay_keeps_frame(bytes in prop::collection::vec(any::<u8>(), 4..256)) {
            let len = bytes.len() / 4 * 4;
            let mut frame = PixelBuffer::new(bytes[..len].to_vec(), (len / 4) as u32, 1, ChannelOrder::Rgba).unwrap();
            let before = frame.clone();
            composite_video_frame(&mut frame, None).unwrap();
            prop_assert_eq!(frame, before);
        }
    }
}
