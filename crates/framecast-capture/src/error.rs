/// Errors that can occur while opening, reading, or encoding from a capture device.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The device could not be opened.
    #[error("failed to open capture device {device}: {message}")]
    Open { device: String, message: String },

    /// The device was open but did not deliver a frame.
    #[error("failed to read frame from {device}: {message}")]
    Read { device: String, message: String },

    /// The pixel buffer does not match the declared dimensions.
    #[error("frame buffer is {actual} bytes, expected {expected} for {width}x{height} RGB")]
    InvalidFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// JPEG quality outside `1..=100`.
    #[error("jpeg quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    /// The image encoder failed.
    #[error("jpeg encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
