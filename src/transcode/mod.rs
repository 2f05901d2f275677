//! Transcode Module
//!
//! Converts a decoded RGBA raster into the packed RGB layout a classifier
//! consumes.
//!
//! ## Layout
//! ```text
//! source  (4 B/px): R0 G0 B0 A0 | R1 G1 B1 A1 | ...
//! tensor  (3 B/px): R0 G0 B0    | R1 G1 B1    | ...
//! shape:  [height, width, 3], row-major
//! ```

mod raster;

pub use raster::{RasterBuffer, TensorBuffer};

use crate::error::{Result, StashError};

/// Channels per pixel the transcoder accepts
pub const SOURCE_CHANNELS: u8 = 4;

/// Channels per pixel in the output
pub const TENSOR_CHANNELS: usize = 3;

/// Drop the fourth channel of every pixel
///
/// Fails before allocating when the source is not 4-channel or its buffer
/// length disagrees with its dimensions.
pub fn transcode(raster: &RasterBuffer) -> Result<TensorBuffer> {
    if raster.channels_per_pixel != SOURCE_CHANNELS {
        return Err(StashError::UnsupportedChannelLayout(raster.channels_per_pixel));
    }

    // Overflowing dimensions can never match a real buffer
    let expected = raster
        .pixel_count()
        .and_then(|pixels| pixels.checked_mul(SOURCE_CHANNELS as usize))
        .unwrap_or(usize::MAX);
    if raster.pixel_data.len() != expected {
        return Err(StashError::RasterSizeMismatch {
            expected,
            actual: raster.pixel_data.len(),
        });
    }

    let pixel_count = expected / SOURCE_CHANNELS as usize;
    let mut pixel_data = Vec::with_capacity(pixel_count * TENSOR_CHANNELS);
    for pixel in raster.pixel_data.chunks_exact(SOURCE_CHANNELS as usize) {
        pixel_data.extend_from_slice(&pixel[..TENSOR_CHANNELS]);
    }

    Ok(TensorBuffer {
        width: raster.width,
        height: raster.height,
        pixel_data,
    })
}

/// One ranked label from a classifier
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

/// The inference seam: anything that can rank labels for a tensor
pub trait Classifier {
    /// Predictions ordered from most to least likely
    fn classify(&self, tensor: &TensorBuffer) -> Result<Vec<Prediction>>;
}

/// Decode, transcode and classify in one call
pub fn classify_image<C: Classifier + ?Sized>(
    classifier: &C,
    image_bytes: &[u8],
) -> Result<Vec<Prediction>> {
    let raster = RasterBuffer::decode(image_bytes)?;
    let tensor = transcode(&raster)?;
    classifier.classify(&tensor)
}
