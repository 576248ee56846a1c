use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;

use crate::error::{CaptureError, Result};
use crate::frame::RawFrame;

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Encodes raw frames as baseline JPEG at a fixed quality.
#[derive(Debug, Clone, Copy)]
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    /// Create an encoder; `quality` must be in `1..=100`.
    pub fn new(quality: u8) -> Result<Self> {
        if !(1..=100).contains(&quality) {
            return Err(CaptureError::InvalidQuality(quality));
        }
        Ok(Self { quality })
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode one frame to JPEG bytes.
    pub fn encode(&self, frame: &RawFrame) -> Result<Vec<u8>> {
        let img = frame.to_image()?;
        let mut jpeg = Vec::with_capacity(frame.data().len() / 8);
        let mut encoder = ImageJpegEncoder::new_with_quality(&mut jpeg, self.quality);
        encoder.encode_image(&img)?;
        Ok(jpeg)
    }
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}
