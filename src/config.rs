use log::Level;

use crate::constants::{POLL_INTERVAL_MS, RESPONSE_TIMEOUT_MS, SENSOR_ADDRESS};

/// Upper bound of the sensor measurement range.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum DetectionRange {
    /// 0 to 2000 ppm.
    Ppm2000,
    /// 0 to 5000 ppm.
    Ppm5000,
    /// 0 to 10000 ppm.
    Ppm10000,
}

impl DetectionRange {
    /// Returns the range upper bound in ppm.
    pub fn ppm(self) -> u16 {
        match self {
            DetectionRange::Ppm2000 => 2000,
            DetectionRange::Ppm5000 => 5000,
            DetectionRange::Ppm10000 => 10000,
        }
    }
}

/// Configuration settings for the MH-Z sensor driver.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Config {
    /// The sensor address byte written into every request frame.
    pub address: u8,
    /// Cumulative time spent polling for a reply before giving up.
    pub response_timeout_ms: u32,
    /// Delay between two read-ready polls while waiting for a reply.
    pub poll_interval_ms: u32,
    /// Level at which request and response frames are hex dumped, or `None` to
    /// suppress the dumps entirely.
    pub frame_log_level: Option<Level>,
}

impl Config {
    /// Creates a new `Config` instance.
    ///
    /// # Arguments
    ///
    /// * `address` - The sensor address byte.
    /// * `response_timeout_ms` - The reply waiting budget in milliseconds.
    ///
    /// # Returns
    ///
    /// A new `Config` with the default poll interval and frame logging.
    pub fn new(address: u8, response_timeout_ms: u32) -> Config {
        Config {
            address,
            response_timeout_ms,
            ..Config::default()
        }
    }

    /// Sets the sensor address.
    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Sets the reply waiting budget in milliseconds.
    pub fn response_timeout_ms(mut self, timeout: u32) -> Self {
        self.response_timeout_ms = timeout;
        self
    }

    /// Sets the delay between read-ready polls in milliseconds.
    ///
    /// A zero interval is bumped to 1 ms so the waiting loop always makes
    /// progress against the budget.
    pub fn poll_interval_ms(mut self, interval: u32) -> Self {
        self.poll_interval_ms = interval.max(1);
        self
    }

    /// Sets the level used for frame hex dumps.
    pub fn frame_log_level(mut self, level: Option<Level>) -> Self {
        self.frame_log_level = level;
        self
    }
}

/// Provides default configuration values for the MH-Z sensor.
impl Default for Config {
    /// Returns the default configuration.
    ///
    /// Address `0x01`, a 500 ms reply budget polled every 5 ms, and frame
    /// dumps at debug level.
    fn default() -> Config {
        Config {
            address: SENSOR_ADDRESS,
            response_timeout_ms: RESPONSE_TIMEOUT_MS,
            poll_interval_ms: POLL_INTERVAL_MS,
            frame_log_level: Some(Level::Debug),
        }
    }
}
