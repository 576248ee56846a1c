use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::{CaptureError, Result};

/// Bytes per pixel of a packed RGB8 frame.
pub const RGB_CHANNELS: usize = 3;

/// One raw image sample from a capture device.
///
/// Pixels are packed RGB8, row-major, no padding between rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RawFrame {
    /// Wrap a pixel buffer, checking it matches `width * height * 3`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * RGB_CHANNELS;
        if data.len() != expected || expected == 0 {
            return Err(CaptureError::InvalidFrame {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed RGB8 pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// View the frame as an `image` buffer.
    pub(crate) fn to_image(&self) -> Result<RgbImage> {
        ImageBuffer::<Rgb<u8>, _>::from_raw(self.width, self.height, self.data.clone()).ok_or(
            CaptureError::InvalidFrame {
                width: self.width,
                height: self.height,
                expected: self.width as usize * self.height as usize * RGB_CHANNELS,
                actual: self.data.len(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_buffer() {
        let frame = RawFrame::new(4, 2, vec![0; 4 * 2 * 3]).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.data().len(), 24);
    }

    #[test]
    fn rejects_short_buffer() {
        let err = RawFrame::new(4, 2, vec![0; 10]).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::InvalidFrame {
                expected: 24,
                actual: 10,
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_frame() {
        assert!(RawFrame::new(0, 0, Vec::new()).is_err());
    }
}
