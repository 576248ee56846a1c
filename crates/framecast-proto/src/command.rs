use std::fmt;

/// Width of every command token on the wire.
pub const COMMAND_LEN: usize = 11;

/// Request the current frame and schedule the next capture.
pub const GET_NEW_FRAME: &[u8; COMMAND_LEN] = b"getNewFrame";
/// Stop the server.
pub const CLOSE_DRIVER: &[u8; COMMAND_LEN] = b"closeDriver";

/// A decoded client command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetNewFrame,
    CloseDriver,
    /// Any other 11-byte token. The server answers it by dropping the
    /// connection and waiting for a new client.
    Unrecognized([u8; COMMAND_LEN]),
}

impl Command {
    /// Classify a raw token. Matching is exact and case-sensitive.
    pub fn from_token(token: [u8; COMMAND_LEN]) -> Self {
        match &token {
            GET_NEW_FRAME => Self::GetNewFrame,
            CLOSE_DRIVER => Self::CloseDriver,
            _ => Self::Unrecognized(token),
        }
    }

    /// The wire bytes for this command.
    pub fn token(&self) -> [u8; COMMAND_LEN] {
        match self {
            Self::GetNewFrame => *GET_NEW_FRAME,
            Self::CloseDriver => *CLOSE_DRIVER,
            Self::Unrecognized(token) => *token,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GetNewFrame => f.write_str("getNewFrame"),
            Self::CloseDriver => f.write_str("closeDriver"),
            Self::Unrecognized(token) => write!(f, "{:?}", String::from_utf8_lossy(token)),
        }
    }
}
