//! Driver for the Winsen MH-Z family of infrared CO2 sensors (MH-Z14, MH-Z19,
//! MH-Z19B and friends) speaking the 9-byte UART protocol.
//!
//! [`Mhz`] is the async driver built on `embedded-io-async`; a blocking
//! flavour built on `embedded-io` lives in [`blocking`]. Both share the frame
//! codec re-exported at the crate root.
//!
//! ```no_run
//! use embedded_hal_async::delay::DelayNs;
//! use embedded_io_async::{Read, ReadReady, Write};
//! use mhz_nostd_rs::{Config, Error, Mhz};
//!
//! async fn read_ppm<S, D>(uart: S, delay: D) -> Result<u16, Error>
//! where
//!     S: Read + Write + ReadReady,
//!     D: DelayNs,
//! {
//!     let mut sensor = Mhz::new(uart, delay, Config::default());
//!     sensor.read_co2().await
//! }
//! ```

#![cfg_attr(not(test), no_std)]

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, ReadReady, Write};
use log::debug;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod frame;
pub use frame::*;

mod exchange;
use exchange::{timed_out, PollBudget};

pub mod blocking;

/// Represents an MH-Z CO2 sensor.
///
/// Every public method runs at most one exchange with the sensor and returns
/// once it has completed, failed or timed out. The protocol carries no request
/// identifiers, so `&mut self` is what keeps exchanges from overlapping.
///
/// # Type Parameters
///
/// * `Serial`: The serial interface used to communicate with the sensor.
///   It must implement `embedded_io_async::Read`, `Write` and `ReadReady`.
///   Pass `&mut uart` to keep ownership of the port.
/// * `Delay`: An `embedded_hal_async::delay::DelayNs` used between polls
///   while waiting for a reply.
pub struct Mhz<Serial, Delay> {
    serial: Serial,
    delay: Delay,
    config: Config,
    request: Frame,
}

impl<S, D> Mhz<S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    /// Creates a new `Mhz` sensor instance.
    ///
    /// # Arguments
    ///
    /// * `serial`: The serial interface for communication with the sensor.
    /// * `delay`: The delay provider used while polling for replies.
    /// * `config`: The driver configuration.
    pub fn new(serial: S, delay: D, config: Config) -> Self {
        Self {
            serial,
            delay,
            config,
            request: [0; FRAME_LEN],
        }
    }

    /// Returns the driver configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Releases the serial interface and the delay provider.
    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }

    /// Reads the CO2 concentration in ppm.
    ///
    /// A status byte other than `0x40` (sensor not ready, usually still
    /// warming up) is logged as a warning but does not fail the call.
    ///
    /// # Returns
    ///
    /// * `Ok(u16)` containing the concentration in ppm.
    /// * `Err(Error::NoResponse)` or `Err(Error::ShortRead)` if the reply did not
    ///   arrive in full within the configured budget.
    /// * `Err(Error::Frame)` if the reply failed validation.
    pub async fn read_co2(&mut self) -> Result<u16, Error> {
        let reading = self.query_reading().await?;
        warn_if_not_ready(&reading);
        Ok(reading.co2_ppm)
    }

    /// Reads concentration, temperature and raw status together.
    ///
    /// Unlike [`read_co2`](Self::read_co2) the status byte is returned as is,
    /// without any warning; see [`Reading::is_ready`].
    pub async fn read_full_response(&mut self) -> Result<Reading, Error> {
        self.query_reading().await
    }

    /// Enables or disables automatic baseline correction.
    ///
    /// The sensor does not reply to this command, so nothing is awaited after
    /// the frame has been flushed.
    pub async fn set_auto_baseline_correction(&mut self, enabled: bool) -> Result<(), Error> {
        debug!("Setting automatic baseline correction to {}", enabled);
        let mut data = [0u8; DATA_LEN];
        if enabled {
            data[0] = ABC_ENABLE_FLAG;
        }
        self.prepare(Command::SetAutoBaselineCorrection, data);
        self.send().await
    }

    /// Calibrates the zero point.
    ///
    /// The sensor must have been running in 400 ppm air for at least 20 minutes.
    pub async fn calibrate_zero_point(&mut self) -> Result<(), Error> {
        debug!("Calibrating zero point");
        self.prepare(Command::CalibrateZeroPoint, [0; DATA_LEN]);
        self.send().await
    }

    /// Calibrates the span point to `ppm`.
    ///
    /// Do a zero point calibration first. The sensor must have been running
    /// under the given concentration for at least 20 minutes.
    ///
    /// # Returns
    ///
    /// * `Err(Error::InvalidArg)` if `ppm` is zero; nothing is sent.
    pub async fn calibrate_span_point(&mut self, ppm: u16) -> Result<(), Error> {
        if ppm == 0 {
            log::error!("Span point must be above 0 ppm");
            return Err(Error::InvalidArg);
        }
        debug!("Calibrating span point to {} ppm", ppm);
        let [high, low] = ppm.to_be_bytes();
        self.prepare(Command::CalibrateSpanPoint, [high, low, 0, 0, 0]);
        self.send().await
    }

    /// Sets the detection range.
    pub async fn set_detection_range(&mut self, range: DetectionRange) -> Result<(), Error> {
        debug!("Setting detection range to {:?}", range);
        let [high, low] = range.ppm().to_be_bytes();
        self.prepare(Command::SetDetectionRange, [high, low, 0, 0, 0]);
        self.send().await
    }

    // Sends a read request and decodes the validated reply.
    async fn query_reading(&mut self) -> Result<Reading, Error> {
        self.prepare(Command::ReadGasConcentration, [0; DATA_LEN]);
        self.send().await?;
        let response = self.receive().await?;

        validate_frame(&response, Command::ReadGasConcentration).map_err(|e| {
            log::error!("Rejected response {:02X?}: {}", response, e);
            e
        })?;

        let reading = Reading::from_frame(&response);
        debug!("Processed frame: {:?}", reading);
        Ok(reading)
    }

    fn prepare(&mut self, command: Command, data: [u8; DATA_LEN]) {
        self.request = build_frame(self.config.address, command, data);
    }

    // Drops stale input, then writes and flushes the prepared request.
    async fn send(&mut self) -> Result<(), Error> {
        self.discard_input().await?;

        log_frame(self.config.frame_log_level, "Request", &self.request);
        self.serial
            .write_all(&self.request)
            .await
            .map_err(write_failure)?;
        self.serial.flush().await.map_err(write_failure)
    }

    async fn discard_input(&mut self) -> Result<(), Error> {
        let mut scratch = [0u8; FRAME_LEN];
        let mut discarded = 0;
        while self.serial.read_ready().map_err(read_failure)? {
            let n = self.serial.read(&mut scratch).await.map_err(read_failure)?;
            if n == 0 {
                break;
            }
            discarded += n;
        }
        if discarded > 0 {
            log::warn!("Discarded {} stale bytes before request", discarded);
        }
        Ok(())
    }

    // Polls for a full frame until the response budget runs out.
    async fn receive(&mut self) -> Result<Frame, Error> {
        let mut response = [0u8; FRAME_LEN];
        let mut received = 0;
        let mut budget = PollBudget::new(&self.config);

        loop {
            if self.serial.read_ready().map_err(read_failure)? {
                let n = self
                    .serial
                    .read(&mut response[received..])
                    .await
                    .map_err(read_failure)?;
                received += n;
                if received == FRAME_LEN {
                    log_frame(self.config.frame_log_level, "Response", &response);
                    return Ok(response);
                }
                if n > 0 {
                    continue;
                }
            }

            if budget.exhausted() {
                return Err(timed_out(received, budget.waited_ms(), &response));
            }
            self.delay.delay_ms(budget.charge()).await;
        }
    }
}
