//! Capture-device abstraction and JPEG encoding for framecast.
//!
//! - [`CaptureDevice`]: anything that yields [`RawFrame`]s (packed RGB8)
//! - [`JpegEncoder`]: fixed-quality JPEG encoding via the `image` crate
//! - [`TestPattern`]: deterministic synthetic device, no hardware needed
//! - [`NativeCamera`]: platform camera via `nokhwa` (behind the `native` feature)

pub mod device;
pub mod encoder;
pub mod error;
pub mod frame;
#[cfg(feature = "native")]
pub mod native;
pub mod synthetic;

pub use device::CaptureDevice;
pub use encoder::{JpegEncoder, DEFAULT_JPEG_QUALITY};
pub use error::{CaptureError, Result};
pub use frame::{RawFrame, RGB_CHANNELS};
#[cfg(feature = "native")]
pub use native::{NativeCamera, NativeCameraConfig};
pub use synthetic::TestPattern;
