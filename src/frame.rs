//! Frame construction, checksum and validation for the 9-byte MH-Z protocol.
//!
//! Every frame, request or response, has the layout
//!
//! ```text
//! FF  ADDR/CMD  CMD/DATA  D0 D1 D2 D3 D4  CS
//! ```
//!
//! where `CS` is the two's complement of the 8-bit sum of bytes 1 through 7.

use log::Level;

use crate::constants::*;
use crate::error::FrameError;

/// A raw frame as it travels on the wire.
pub type Frame = [u8; FRAME_LEN];

/// Commands understood by the MH-Z sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Read the gas concentration, temperature and status.
    ReadGasConcentration = READ_CO2,
    /// Calibrate the zero point (400 ppm).
    CalibrateZeroPoint = ZERO_POINT_CALIBRATION,
    /// Calibrate the span point to the concentration carried in the payload.
    CalibrateSpanPoint = SPAN_POINT_CALIBRATION,
    /// Enable or disable automatic baseline correction.
    SetAutoBaselineCorrection = CONFIG_ABC,
    /// Set the detection range.
    SetDetectionRange = CONFIG_DETECTION_RANGE,
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            READ_CO2 => Ok(Command::ReadGasConcentration),
            ZERO_POINT_CALIBRATION => Ok(Command::CalibrateZeroPoint),
            SPAN_POINT_CALIBRATION => Ok(Command::CalibrateSpanPoint),
            CONFIG_ABC => Ok(Command::SetAutoBaselineCorrection),
            CONFIG_DETECTION_RANGE => Ok(Command::SetDetectionRange),
            other => Err(other),
        }
    }
}

/// A decoded reply to [`Command::ReadGasConcentration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// CO2 concentration in ppm.
    pub co2_ppm: u16,
    /// Sensor temperature in whole degrees Celsius.
    pub temperature: i16,
    /// Raw status byte.
    pub status: u8,
}

impl Reading {
    /// Decodes the domain fields of a validated response frame.
    pub fn from_frame(frame: &Frame) -> Reading {
        Reading {
            co2_ppm: u16::from_be_bytes([frame[2], frame[3]]),
            temperature: i16::from(frame[4]) - TEMPERATURE_OFFSET,
            status: frame[5],
        }
    }

    /// Whether the sensor reported the ready status (`0x40`).
    pub fn is_ready(&self) -> bool {
        self.status == READY_STATUS
    }
}

/// Computes the frame checksum over `payload`, normally bytes 1 through 7.
pub fn checksum(payload: &[u8]) -> u8 {
    let sum = payload.iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
    (!sum).wrapping_add(1)
}

/// Builds a request frame, checksum included.
pub fn build_frame(address: u8, command: Command, data: [u8; DATA_LEN]) -> Frame {
    let mut frame = [
        START_BYTE,
        address,
        command.into(),
        data[0],
        data[1],
        data[2],
        data[3],
        data[4],
        0x00, // Placeholder for checksum
    ];
    frame[8] = checksum(&frame[1..8]);
    frame
}

/// Validates a response frame.
///
/// Checks, in order, the start byte, the command echoed in byte 1 and the
/// checksum. The first failure is returned.
pub fn validate_frame(frame: &Frame, expected: Command) -> Result<(), FrameError> {
    if frame[0] != START_BYTE {
        return Err(FrameError::BadStartByte(frame[0]));
    }

    let expected = u8::from(expected);
    if frame[1] != expected {
        return Err(FrameError::BadCommandEcho {
            expected,
            found: frame[1],
        });
    }

    let calculated = checksum(&frame[1..8]);
    if frame[8] != calculated {
        return Err(FrameError::ChecksumMismatch {
            expected: calculated,
            found: frame[8],
        });
    }

    Ok(())
}

// Logs the soft warning for a reading whose status is not ready.
pub(crate) fn warn_if_not_ready(reading: &Reading) {
    if !reading.is_ready() {
        log::warn!(
            "Bad status byte {:#04x} (expected {:#04x}), keeping reading of {} ppm",
            reading.status,
            READY_STATUS,
            reading.co2_ppm
        );
    }
}

// Hex dumps a frame when frame logging is enabled.
pub(crate) fn log_frame(level: Option<Level>, label: &str, frame: &[u8]) {
    if let Some(level) = level {
        log::log!(level, "{}: {:02X?}", label, frame);
    }
}
