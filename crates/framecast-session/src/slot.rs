use bytes::Bytes;
use framecast_capture::{CaptureDevice, JpegEncoder};
use framecast_proto::encode_payload;
use tracing::debug;

use crate::error::Result;

/// Capture device paired with the encoder that turns its frames into payloads.
pub struct FrameSource<D> {
    device: D,
    encoder: JpegEncoder,
}

impl<D: CaptureDevice> FrameSource<D> {
    pub fn new(device: D, encoder: JpegEncoder) -> Self {
        Self { device, encoder }
    }

    /// Read one frame, JPEG-encode it, then base64-encode the JPEG.
    pub fn capture(&mut self) -> Result<Bytes> {
        let frame = self.device.read_frame()?;
        let jpeg = self.encoder.encode(&frame)?;
        let payload = encode_payload(&jpeg);
        debug!(
            device = self.device.name(),
            width = frame.width(),
            height = frame.height(),
            jpeg_bytes = jpeg.len(),
            payload_bytes = payload.len(),
            "encoded frame"
        );
        Ok(payload)
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }
}

/// Single-slot holder for the most recently encoded frame.
///
/// Holds exactly one payload at a time. [`FrameSlot::refresh`] overwrites it;
/// there is no history and no queue.
#[derive(Debug)]
pub struct FrameSlot {
    current: Bytes,
    sequence: u64,
}

impl FrameSlot {
    /// Capture the first frame. Fails if the device cannot deliver one.
    pub fn prime<D: CaptureDevice>(source: &mut FrameSource<D>) -> Result<Self> {
        let current = source.capture()?;
        Ok(Self {
            current,
            sequence: 0,
        })
    }

    /// The payload the next `getNewFrame` will be answered with.
    pub fn current(&self) -> &Bytes {
        &self.current
    }

    /// Replace the held payload with a fresh capture.
    ///
    /// On error the previous payload stays in place.
    pub fn refresh<D: CaptureDevice>(&mut self, source: &mut FrameSource<D>) -> Result<()> {
        self.current = source.capture()?;
        self.sequence += 1;
        Ok(())
    }

    /// How many times the slot has been refreshed since priming.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}
