use thiserror::Error;

/// Reasons a received frame is rejected by [`validate_frame`](crate::validate_frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("bad start byte {0:#04x}, expected 0xff")]
    BadStartByte(u8),
    #[error("bad command echo {found:#04x}, expected {expected:#04x}")]
    BadCommandEcho { expected: u8, found: u8 },
    #[error("checksum mismatch: calculated {expected:#04x}, received {found:#04x}")]
    ChecksumMismatch { expected: u8, found: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no response from the sensor")]
    NoResponse,
    #[error("short read: received {received} of 9 bytes")]
    ShortRead { received: usize },
    #[error("invalid frame: {0}")]
    Frame(#[from] FrameError),
    #[error("serial read failure")]
    ReadFailure,
    #[error("serial write failure")]
    WriteFailure,
    #[error("invalid argument")]
    InvalidArg,
}

// Logs a transport read error and maps it to `Error::ReadFailure`.
pub(crate) fn read_failure<E: core::fmt::Debug>(e: E) -> Error {
    log::error!("Serial read error: {:?}", e);
    Error::ReadFailure
}

// Logs a transport write error and maps it to `Error::WriteFailure`.
pub(crate) fn write_failure<E: core::fmt::Debug>(e: E) -> Error {
    log::error!("Serial write error: {:?}", e);
    Error::WriteFailure
}
