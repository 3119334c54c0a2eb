// START_BYTE marks the beginning of every frame, request or response.
pub const START_BYTE: u8 = 0xFF;

// SENSOR_ADDRESS is the address byte used on single-sensor buses.
pub const SENSOR_ADDRESS: u8 = 0x01;

// FRAME_LEN is the fixed length of every frame on the wire.
pub const FRAME_LEN: usize = 9;

// DATA_LEN is the number of payload bytes carried by a request frame.
pub const DATA_LEN: usize = 5;

// READ_CO2 asks the sensor for its current gas concentration.
pub const READ_CO2: u8 = 0x86;

// ZERO_POINT_CALIBRATION calibrates the 400 ppm zero point.
pub const ZERO_POINT_CALIBRATION: u8 = 0x87;

// SPAN_POINT_CALIBRATION calibrates the span point to a given concentration.
pub const SPAN_POINT_CALIBRATION: u8 = 0x88;

// CONFIG_ABC toggles automatic baseline correction.
pub const CONFIG_ABC: u8 = 0x79;

// CONFIG_DETECTION_RANGE sets the upper bound of the measurement range.
pub const CONFIG_DETECTION_RANGE: u8 = 0x99;

// ABC_ENABLE_FLAG is the first data byte of a CONFIG_ABC frame that turns ABC on.
pub const ABC_ENABLE_FLAG: u8 = 0xA0;

// READY_STATUS is the status byte a warmed-up sensor reports in a READ_CO2 reply.
pub const READY_STATUS: u8 = 0x40;

// TEMPERATURE_OFFSET is subtracted from the raw temperature byte.
pub const TEMPERATURE_OFFSET: i16 = 40;

// RESPONSE_TIMEOUT_MS is the default budget spent waiting for a reply.
pub const RESPONSE_TIMEOUT_MS: u32 = 500;

// POLL_INTERVAL_MS is the default delay between two read-ready polls.
pub const POLL_INTERVAL_MS: u32 = 5;
