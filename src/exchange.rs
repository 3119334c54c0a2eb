use crate::config::Config;
use crate::error::Error;
use crate::frame::Frame;

/// Tracks the cumulative time spent waiting for a reply.
///
/// Time is accounted per poll rather than read from a clock: every delay of
/// `interval_ms` is charged against `timeout_ms`, the same cadence a sensor
/// firmware loop would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollBudget {
    timeout_ms: u32,
    interval_ms: u32,
    waited_ms: u32,
}

impl PollBudget {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            timeout_ms: config.response_timeout_ms,
            interval_ms: config.poll_interval_ms.max(1),
            waited_ms: 0,
        }
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.waited_ms >= self.timeout_ms
    }

    /// Charges one poll against the budget and returns how long to sleep.
    ///
    /// The last sleep is clipped so the total never exceeds the timeout.
    pub(crate) fn charge(&mut self) -> u32 {
        let step = self.interval_ms.min(self.timeout_ms - self.waited_ms);
        self.waited_ms += step;
        step
    }

    pub(crate) fn waited_ms(&self) -> u32 {
        self.waited_ms
    }
}

// Builds the error for an exchange whose budget ran out.
pub(crate) fn timed_out(received: usize, waited_ms: u32, response: &Frame) -> Error {
    if received == 0 {
        log::error!(
            "No response from the sensor after {} ms, check connection",
            waited_ms
        );
        Error::NoResponse
    } else {
        log::error!(
            "Short read after {} ms: {:02X?}",
            waited_ms,
            &response[..received]
        );
        Error::ShortRead { received }
    }
}
