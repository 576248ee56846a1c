use tracing::trace;

use crate::device::CaptureDevice;
use crate::error::Result;
use crate::frame::{RawFrame, RGB_CHANNELS};

/// Synthetic capture device producing a deterministic moving gradient.
///
/// Frame `n` is a pure function of `(width, height, n)`, so two devices with
/// the same dimensions yield identical frame sequences. Used when no camera
/// is attached and as the device behind the server tests.
#[derive(Debug, Clone)]
pub struct TestPattern {
    width: u32,
    height: u32,
    sequence: u64,
}

impl TestPattern {
    /// Zero dimensions are clamped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            sequence: 0,
        }
    }

    /// Number of frames produced so far.
    pub fn frames_read(&self) -> u64 {
        self.sequence
    }

    fn render(&self, sequence: u64) -> Vec<u8> {
        let (w, h) = (self.width as u64, self.height as u64);
        let shift = sequence.wrapping_mul(8);
        let mut data = Vec::with_capacity((w * h) as usize * RGB_CHANNELS);
        for y in 0..h {
            for x in 0..w {
                data.push(((x * 255 / w + shift) % 256) as u8);
                data.push((y * 255 / h) as u8);
                data.push((sequence.wrapping_mul(37) % 256) as u8);
            }
        }
        data
    }
}

impl CaptureDevice for TestPattern {
    fn name(&self) -> &str {
        "test-pattern"
    }

    fn read_frame(&mut self) -> Result<RawFrame> {
        let data = self.render(self.sequence);
        trace!(sequence = self.sequence, "rendered test pattern frame");
        self.sequence += 1;
        RawFrame::new(self.width, self.height, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_have_requested_size() {
        let mut device = TestPattern::new(16, 9);
        let frame = device.read_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (16, 9));
        assert_eq!(frame.data().len(), 16 * 9 * 3);
    }

    #[test]
    fn consecutive_frames_differ() {
        let mut device = TestPattern::new(16, 16);
        let first = device.read_frame().unwrap();
        let second = device.read_frame().unwrap();
        assert_ne!(first, second);
        assert_eq!(device.frames_read(), 2);
    }

    #[test]
    fn identical_devices_yield_identical_sequences() {
        let mut a = TestPattern::new(20, 10);
        let mut b = TestPattern::new(20, 10);
        for _ in 0..3 {
            assert_eq!(a.read_frame().unwrap(), b.read_frame().unwrap());
        }
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        let mut device = TestPattern::new(0, 0);
        let frame = device.read_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (1, 1));
    }
}
