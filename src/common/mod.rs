// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod clock;
pub mod code;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod frame;
pub mod hal_traits;
pub mod line_log;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From clock.rs
pub use clock::FixedClock;
#[cfg(feature = "std")]
pub use clock::SystemClock;

// From code.rs
pub use code::{build_traceability_code, DateCodes};

// From command.rs
pub use command::{Command, CommandFormatError};

// From config.rs
pub use config::{ConfigMap, ConfigParseError, StationIdentity};

// From error.rs
pub use error::StationError;

// From event.rs
pub use event::{classify, sensor_tokens, ProtocolEvent};

// From frame.rs
pub use frame::{FrameReader, Lines};

// From hal_traits.rs
pub use hal_traits::{Clock, Transport}; // Core sync traits

// From line_log.rs
pub use line_log::LineLog;

// From types.rs
pub use types::{Counters, SensorFlags, StatusLabel, StatusSnapshot};

// From timing.rs (constants - users can access via common::timing::*)
pub use timing::DEFAULT_SENSOR_COUNT;
