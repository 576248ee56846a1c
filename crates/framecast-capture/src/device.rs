use crate::error::Result;
use crate::frame::RawFrame;

/// A source of raw image frames.
///
/// Implementations own their device exclusively; the device is released when
/// the implementation is dropped.
pub trait CaptureDevice {
    /// Human-readable device name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Block until the next frame is available and return it.
    fn read_frame(&mut self) -> Result<RawFrame>;
}

impl<D: CaptureDevice + ?Sized> CaptureDevice for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_frame(&mut self) -> Result<RawFrame> {
        (**self).read_frame()
    }
}

impl<D: CaptureDevice + ?Sized> CaptureDevice for &mut D {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_frame(&mut self) -> Result<RawFrame> {
        (**self).read_frame()
    }
}
