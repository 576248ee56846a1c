use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use tracing::{debug, info, warn};

use crate::device::CaptureDevice;
use crate::error::{CaptureError, Result};
use crate::frame::RawFrame;

/// Settings for opening a platform camera.
#[derive(Debug, Clone)]
pub struct NativeCameraConfig {
    /// Camera index as enumerated by the OS (`/dev/video<N>` on Linux).
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for NativeCameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            frame_rate: 30,
        }
    }
}

/// A camera opened through the platform's native capture backend.
///
/// The stream is opened on construction and stopped on drop.
pub struct NativeCamera {
    camera: Camera,
    name: String,
}

impl NativeCamera {
    /// Open the camera and start streaming.
    ///
    /// The closest available format to the requested resolution and frame rate
    /// is negotiated; the backend decodes it to RGB.
    pub fn open(config: &NativeCameraConfig) -> Result<Self> {
        let name = format!("camera:{}", config.index);
        let open_err = |err: nokhwa::NokhwaError| CaptureError::Open {
            device: name.clone(),
            message: err.to_string(),
        };

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(config.width, config.height),
                FrameFormat::MJPEG,
                config.frame_rate,
            ),
        ));

        let mut camera = Camera::new(CameraIndex::Index(config.index), requested).map_err(open_err)?;
        camera.open_stream().map_err(open_err)?;

        let format = camera.camera_format();
        info!(
            device = %name,
            width = format.resolution().width(),
            height = format.resolution().height(),
            frame_rate = format.frame_rate(),
            "camera stream opened"
        );

        Ok(Self { camera, name })
    }
}

impl CaptureDevice for NativeCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_frame(&mut self) -> Result<RawFrame> {
        let read_err = |err: nokhwa::NokhwaError| CaptureError::Read {
            device: self.name.clone(),
            message: err.to_string(),
        };

        let buffer = self.camera.frame().map_err(read_err)?;
        let decoded = buffer.decode_image::<RgbFormat>().map_err(read_err)?;
        let (width, height) = (decoded.width(), decoded.height());
        debug!(device = %self.name, width, height, "captured frame");
        RawFrame::new(width, height, decoded.into_raw())
    }
}

impl Drop for NativeCamera {
    fn drop(&mut self) {
        if let Err(err) = self.camera.stop_stream() {
            warn!(device = %self.name, error = %err, "failed to stop camera stream");
        }
    }
}
