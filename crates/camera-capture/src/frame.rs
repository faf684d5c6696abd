//! Frame buffer types

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::{FrameError, FrameSize};

/// Every buffer in the pipeline carries four bytes per pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Channel order of the four bytes of a pixel, as laid out in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelOrder {
    /// red, green, blue, alpha (camera frames)
    #[default]
    Rgba,
    /// alpha, red, green, blue
    Argb,
}

impl ChannelOrder {
    /// Reorder a pixel stored in this order into RGBA
    pub fn to_rgba(self, px: [u8; 4]) -> [u8; 4] {
        match self {
            ChannelOrder::Rgba => px,
            ChannelOrder::Argb => [px[1], px[2], px[3], px[0]],
        }
    }

    /// Reorder an RGBA pixel into this order
    pub fn from_rgba(self, px: [u8; 4]) -> [u8; 4] {
        match self {
            ChannelOrder::Rgba => px,
            ChannelOrder::Argb => [px[3], px[0], px[1], px[2]],
        }
    }
}

/// Raw camera frame (width * height * 4 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    order: ChannelOrder,
}

impl PixelBuffer {
    /// Wrap raw bytes, checking the length against the dimensions
    pub fn new(data: Vec<u8>, width: u32, height: u32, order: ChannelOrder) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Dimensions(width, height));
        }
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(FrameError::Length {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            order,
        })
    }

    /// All-zero buffer
    pub fn blank(width: u32, height: u32, order: ChannelOrder) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL],
            width,
            height,
            order,
        }
    }

    /// Copy an RGBA image into a buffer with the given channel order
    pub fn from_rgba_image(image: &RgbaImage, order: ChannelOrder) -> Self {
        let mut buffer = Self::blank(image.width(), image.height(), order);
        buffer.write_rgba_image(image);
        buffer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Raw bytes of the pixel at (x, y), in the buffer's own channel order
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Decode into an RGBA image regardless of channel order
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut rgba = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(BYTES_PER_PIXEL) {
            rgba.extend_from_slice(&self.order.to_rgba([px[0], px[1], px[2], px[3]]));
        }
        // Length always matches width * height * 4
        RgbaImage::from_raw(self.width, self.height, rgba)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Overwrite the pixels from an RGBA image of the same size.
    /// Images of a different size are ignored.
    pub fn write_rgba_image(&mut self, image: &RgbaImage) {
        if image.width() != self.width || image.height() != self.height {
            return;
        }
        for (dst, src) in self
            .data
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(image.as_raw().chunks_exact(BYTES_PER_PIXEL))
        {
            dst.copy_from_slice(&self.order.from_rgba([src[0], src[1], src[2], src[3]]));
        }
    }
}

/// Overlay pixels as one packed 32-bit word per pixel, native order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedFrame {
    words: Vec<u32>,
    width: u32,
    height: u32,
}

impl PackedFrame {
    pub fn new(words: Vec<u32>, width: u32, height: u32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Dimensions(width, height));
        }
        let expected = width as usize * height as usize;
        if words.len() != expected {
            return Err(FrameError::Length {
                width,
                height,
                expected,
                actual: words.len(),
            });
        }
        Ok(Self { words, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.words.len()
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Serialize every word in little-endian byte order
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.words.len() * BYTES_PER_PIXEL);
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

/// Which capture path an overlay was produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayKind {
    Still,
    Video,
}

/// A frame rendered by the 3D overlay engine
#[derive(Debug, Clone)]
pub enum OverlayFrame {
    /// One-shot snapshot decoded as an image, for photos
    Still(RgbaImage),
    /// Per-frame packed pixels, for recording
    Video(PackedFrame),
}

impl OverlayFrame {
    pub fn kind(&self) -> OverlayKind {
        match self {
            OverlayFrame::Still(_) => OverlayKind::Still,
            OverlayFrame::Video(_) => OverlayKind::Video,
        }
    }

    pub fn size(&self) -> FrameSize {
        match self {
            OverlayFrame::Still(image) => FrameSize::new(image.width(), image.height()),
            OverlayFrame::Video(packed) => FrameSize::new(packed.width(), packed.height()),
        }
    }
}
