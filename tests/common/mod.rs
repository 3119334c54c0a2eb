#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use embedded_io::ErrorKind;
use log::{Level, LevelFilter, Log, Metadata, Record};
use mhz_nostd_rs::{checksum, Frame};

pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::max())
        .is_test(true)
        .try_init();
}

/// Builds a read reply frame with a correct checksum.
pub fn reply(ppm: u16, raw_temperature: u8, status: u8) -> Frame {
    let [high, low] = ppm.to_be_bytes();
    let mut frame = [0xFF, 0x86, high, low, raw_temperature, status, 0x00, 0x00, 0x00];
    frame[8] = checksum(&frame[1..8]);
    frame
}

/// In-memory serial port.
///
/// Every write pops the next queued reply, which becomes readable after
/// `reply_delay_polls` unsuccessful `read_ready` polls. Bytes in `stale` are
/// readable immediately, as if left over from an earlier exchange.
#[derive(Debug, Default)]
pub struct MockSerial {
    pub stale: VecDeque<u8>,
    pub replies: VecDeque<Vec<u8>>,
    pub reply_delay_polls: usize,
    pub chunk: Option<usize>,
    pub written: Vec<u8>,
    pub flushes: usize,
    pub fail_read_ready: bool,
    pub fail_read: bool,
    pub fail_write: bool,
    pub fail_flush: bool,
    pending: VecDeque<u8>,
    armed: Option<(Vec<u8>, usize)>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: &[u8]) -> Self {
        let mut serial = Self::default();
        serial.replies.push_back(reply.to_vec());
        serial
    }

    fn poll(&mut self) -> bool {
        if !self.stale.is_empty() {
            return true;
        }
        if let Some((reply, polls_left)) = self.armed.take() {
            if polls_left == 0 {
                self.pending.extend(reply);
            } else {
                self.armed = Some((reply, polls_left - 1));
            }
        }
        !self.pending.is_empty()
    }

    fn take(&mut self, buf: &mut [u8]) -> usize {
        let limit = self.chunk.unwrap_or(usize::MAX).min(buf.len());
        let source = if self.stale.is_empty() {
            &mut self.pending
        } else {
            &mut self.stale
        };
        let n = limit.min(source.len());
        for (slot, byte) in buf.iter_mut().zip(source.drain(..n)) {
            *slot = byte;
        }
        n
    }

    fn put(&mut self, buf: &[u8]) -> usize {
        self.written.extend_from_slice(buf);
        if let Some(reply) = self.replies.pop_front() {
            self.armed = Some((reply, self.reply_delay_polls));
        }
        buf.len()
    }

    fn try_take(&mut self, buf: &mut [u8]) -> Result<usize, ErrorKind> {
        if self.fail_read {
            return Err(ErrorKind::Other);
        }
        Ok(self.take(buf))
    }

    fn try_put(&mut self, buf: &[u8]) -> Result<usize, ErrorKind> {
        if self.fail_write {
            return Err(ErrorKind::BrokenPipe);
        }
        Ok(self.put(buf))
    }

    fn try_flush(&mut self) -> Result<(), ErrorKind> {
        if self.fail_flush {
            return Err(ErrorKind::TimedOut);
        }
        self.flushes += 1;
        Ok(())
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = ErrorKind;
}

impl embedded_io::ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        if self.fail_read_ready {
            return Err(ErrorKind::Other);
        }
        Ok(self.poll())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.try_take(buf)
    }
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.try_put(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.try_flush()
    }
}

impl embedded_io_async::Read for MockSerial {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.try_take(buf)
    }
}

impl embedded_io_async::Write for MockSerial {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.try_put(buf)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.try_flush()
    }
}

/// Delay that only accounts for the time it was asked to sleep.
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl CountingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

impl embedded_hal_async::delay::DelayNs for CountingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Logger that keeps every record so tests can inspect what was logged.
///
/// It is process-wide: install it only in test binaries that do not call
/// [`init_logger`].
pub struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

pub static CAPTURE: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

impl CaptureLogger {
    pub fn install() -> &'static CaptureLogger {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(LevelFilter::Trace);
        &CAPTURE
    }

    pub fn take(&self) -> Vec<(Level, String)> {
        std::mem::take(&mut *self.records.lock().unwrap())
    }
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}
