// src/common/types.rs

use super::timing::DEFAULT_SENSOR_COUNT;
use alloc::string::String;
use core::fmt;

// --- Daily OK / NG / Total counters ---

/// Pass/fail counters for the current production day.
///
/// `total` is never set independently: every mutation goes through a method that
/// recomputes it, so `total == ok + ng` holds after each call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    ok: u32,
    ng: u32,
    total: u32,
}

impl Counters {
    pub const ZERO: Counters = Counters { ok: 0, ng: 0, total: 0 };

    /// Builds counters from persisted OK/NG values; `total` is derived.
    pub fn new(ok: u32, ng: u32) -> Self {
        Counters { ok, ng, total: ok.saturating_add(ng) }
    }

    #[inline]
    pub const fn ok(&self) -> u32 {
        self.ok
    }

    #[inline]
    pub const fn ng(&self) -> u32 {
        self.ng
    }

    #[inline]
    pub const fn total(&self) -> u32 {
        self.total
    }

    pub fn record_pass(&mut self) {
        self.ok = self.ok.saturating_add(1);
        self.recompute_total();
    }

    pub fn record_fail(&mut self) {
        self.ng = self.ng.saturating_add(1);
        self.recompute_total();
    }

    pub fn reset(&mut self) {
        *self = Self::ZERO;
    }

    fn recompute_total(&mut self) {
        self.total = self.ok.saturating_add(self.ng);
    }
}

// --- Sensor highlight flags ---

/// One flag per sensor position; `true` means the sensor reported a fault.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SensorFlags<const N: usize = DEFAULT_SENSOR_COUNT>([bool; N]);

impl<const N: usize> SensorFlags<N> {
    /// All sensors in the default ("ok") state.
    pub const fn cleared() -> Self {
        SensorFlags([false; N])
    }

    /// Sets flag `i` for every token equal to `"1"`; positions past the token list stay clear.
    /// Tokens beyond the sensor count are ignored.
    pub fn from_tokens<'a, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut flags = [false; N];
        for (flag, token) in flags.iter_mut().zip(tokens) {
            *flag = token == "1";
        }
        SensorFlags(flags)
    }

    pub fn clear(&mut self) {
        self.0 = [false; N];
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|f| *f)
    }

    /// Sensor count this flag set was built for.
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<const N: usize> Default for SensorFlags<N> {
    fn default() -> Self {
        Self::cleared()
    }
}

// --- Status label ---

/// Display status of the station. A label only; it never gates event handling.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum StatusLabel {
    /// Nothing received since startup.
    #[default]
    Idle,
    /// The fixture announced a test start.
    Testing,
    /// The fixture is waiting for a unit.
    Wait,
    /// Last unit passed.
    Ok,
    /// Last unit failed.
    Ng,
}

impl StatusLabel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatusLabel::Idle => "Idle",
            StatusLabel::Testing => "Testing",
            StatusLabel::Wait => "Wait",
            StatusLabel::Ok => "OK",
            StatusLabel::Ng => "NG",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Snapshot handed to the presentation layer ---

/// Everything the UI needs to render the station after an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot<const N: usize = DEFAULT_SENSOR_COUNT> {
    pub label: StatusLabel,
    pub sensors: SensorFlags<N>,
    /// Raw `data=` payload of the last Pass/Fail line that carried one.
    pub adc_reading: Option<String>,
    pub counters: Counters,
}
