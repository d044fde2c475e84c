// src/common/timing.rs

use core::time::Duration;

// === Scheduler periods ===

/// Period of the clock tick (date display, day-boundary check).
pub const CLOCK_TICK_PERIOD: Duration = Duration::from_secs(1);
/// Period of the transport poll tick (framing + event dispatch).
pub const POLL_TICK_PERIOD: Duration = Duration::from_millis(100);

// === Serial link ===

/// Baud rate the fixture firmware talks at (8N1).
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Size of the scratch buffer used for one `read_available` call.
pub const READ_CHUNK_SIZE: usize = 256;
/// Largest partial line the frame reader keeps while waiting for `\n`.
/// A longer run without a newline is dropped and framing resynchronises
/// on the next newline.
pub const FRAME_BUFFER_CAPACITY: usize = 1024;

// === Fixture layout ===

/// Number of sensor positions reported in a `data=` payload by current firmware
/// (`s1,s2,s3,adc1,adc2`). Older fixtures reported 4.
pub const DEFAULT_SENSOR_COUNT: usize = 5;

// === Display ===

/// Number of received lines kept for the operator log view.
pub const LOG_HISTORY_LINES: usize = 20;
