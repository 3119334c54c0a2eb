//! Blocking flavour of the driver for targets without an async executor.
//!
//! Same commands and semantics as [`crate::Mhz`], built on `embedded-io` and
//! `embedded_hal::delay::DelayNs`. Waiting for a reply sleeps in the calling
//! thread between polls and never exceeds the configured budget.

use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadReady, Write};
use log::debug;

use crate::config::{Config, DetectionRange};
use crate::constants::*;
use crate::error::{read_failure, write_failure, Error};
use crate::exchange::{timed_out, PollBudget};
use crate::frame::{
    build_frame, log_frame, validate_frame, warn_if_not_ready, Command, Frame, Reading,
};

/// Blocking MH-Z CO2 sensor driver.
///
/// # Type Parameters
///
/// * `Serial`: The serial interface used to communicate with the sensor.
///   It must implement `embedded_io::Read`, `Write` and `ReadReady`.
/// * `Delay`: An `embedded_hal::delay::DelayNs` used between polls.
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
    /// Creates a new blocking `Mhz` sensor instance.
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
    /// See [`crate::Mhz::read_co2`].
    pub fn read_co2(&mut self) -> Result<u16, Error> {
        let reading = self.query_reading()?;
        warn_if_not_ready(&reading);
        Ok(reading.co2_ppm)
    }

    /// Reads concentration, temperature and raw status together.
    pub fn read_full_response(&mut self) -> Result<Reading, Error> {
        self.query_reading()
    }

    /// Enables or disables automatic baseline correction. No reply is awaited.
    pub fn set_auto_baseline_correction(&mut self, enabled: bool) -> Result<(), Error> {
        debug!("Setting automatic baseline correction to {}", enabled);
        let mut data = [0u8; DATA_LEN];
        if enabled {
            data[0] = ABC_ENABLE_FLAG;
        }
        self.prepare(Command::SetAutoBaselineCorrection, data);
        self.send()
    }

    /// Calibrates the zero point. No reply is awaited.
    pub fn calibrate_zero_point(&mut self) -> Result<(), Error> {
        debug!("Calibrating zero point");
        self.prepare(Command::CalibrateZeroPoint, [0; DATA_LEN]);
        self.send()
    }

    /// Calibrates the span point to `ppm`. Zero is rejected with
    /// `Error::InvalidArg` before anything is sent.
    pub fn calibrate_span_point(&mut self, ppm: u16) -> Result<(), Error> {
        if ppm == 0 {
            log::error!("Span point must be above 0 ppm");
            return Err(Error::InvalidArg);
        }
        debug!("Calibrating span point to {} ppm", ppm);
        let [high, low] = ppm.to_be_bytes();
        self.prepare(Command::CalibrateSpanPoint, [high, low, 0, 0, 0]);
        self.send()
    }

    /// Sets the detection range. No reply is awaited.
    pub fn set_detection_range(&mut self, range: DetectionRange) -> Result<(), Error> {
        debug!("Setting detection range to {:?}", range);
        let [high, low] = range.ppm().to_be_bytes();
        self.prepare(Command::SetDetectionRange, [high, low, 0, 0, 0]);
        self.send()
    }

    // Sends a read request and decodes the validated reply.
    fn query_reading(&mut self) -> Result<Reading, Error> {
        self.prepare(Command::ReadGasConcentration, [0; DATA_LEN]);
        self.send()?;
        let response = self.receive()?;

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
    fn send(&mut self) -> Result<(), Error> {
        self.discard_input()?;

        log_frame(self.config.frame_log_level, "Request", &self.request);
        self.serial.write_all(&self.request).map_err(write_failure)?;
        self.serial.flush().map_err(write_failure)
    }

    fn discard_input(&mut self) -> Result<(), Error> {
        let mut scratch = [0u8; FRAME_LEN];
        let mut discarded = 0;
        while self.serial.read_ready().map_err(read_failure)? {
            let n = self.serial.read(&mut scratch).map_err(read_failure)?;
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
    fn receive(&mut self) -> Result<Frame, Error> {
        let mut response = [0u8; FRAME_LEN];
        let mut received = 0;
        let mut budget = PollBudget::new(&self.config);

        loop {
            if self.serial.read_ready().map_err(read_failure)? {
                let n = self
                    .serial
                    .read(&mut response[received..])
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
            self.delay.delay_ms(budget.charge());
        }
    }
}
