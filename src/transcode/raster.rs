//! Raster and tensor buffers

use crate::error::{Result, StashError};

use super::TENSOR_CHANNELS;

/// A decoded image: row-major, channel-interleaved bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    pub width: u32,
    pub height: u32,
    pub channels_per_pixel: u8,
    pub pixel_data: Vec<u8>,
}

impl RasterBuffer {
    pub fn new(width: u32, height: u32, channels_per_pixel: u8, pixel_data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels_per_pixel,
            pixel_data,
        }
    }

    /// Decode a compressed image (PNG or JPEG) into 4-channel RGBA
    ///
    /// Sources without alpha get an opaque fourth channel.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(bytes)
            .map_err(|e| StashError::ImageDecode(e.to_string()))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self::new(width, height, 4, rgba.into_raw()))
    }

    /// `width * height`, or None on overflow
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }
}

/// Packed 3-channel pixels ready for a classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorBuffer {
    pub width: u32,
    pub height: u32,
    pub pixel_data: Vec<u8>,
}

impl TensorBuffer {
    /// `[height, width, 3]`
    pub fn shape(&self) -> [usize; 3] {
        [self.height as usize, self.width as usize, TENSOR_CHANNELS]
    }

    /// RGB triple at column `x`, row `y`
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * TENSOR_CHANNELS;
        let rgb = self.pixel_data.get(offset..offset + TENSOR_CHANNELS)?;
        Some([rgb[0], rgb[1], rgb[2]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixel_data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixel_data
    }
}
