// src/controller/mod.rs

mod scheduler;

pub use scheduler::{PeriodicTask, Scheduler, Ticks};

use crate::common::{
    config::KEY_COM_PORT,
    event::classify,
    hal_traits::{Clock, Transport},
    timing::{DEFAULT_BAUD_RATE, DEFAULT_SENSOR_COUNT},
    Command, DateCodes, LineLog, ProtocolEvent, StationError, StatusSnapshot,
};
use crate::link::{LinkStatus, SerialLink};
use crate::station::{Station, UnitPassed};
use crate::store::StationStore;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use chrono::NaiveDateTime;
use core::time::Duration;
use log::{error, warn};

/// Presentation-side callbacks. Every method defaults to a no-op.
///
/// All callbacks run synchronously inside the tick that produced them.
pub trait StationObserver<const N: usize = DEFAULT_SENSOR_COUNT> {
    /// Fired once per Pass, after counters were persisted. Rendering, printing and
    /// export of the code happen here.
    fn on_unit_passed(&mut self, _passed: &UnitPassed, _snapshot: &StatusSnapshot<N>) {}

    /// Fired after every Start/Waiting/Pass/Fail event and after a day-boundary reset.
    fn on_status_changed(&mut self, _snapshot: &StatusSnapshot<N>) {}

    /// Fired once per accepted line, and for every transmitted command.
    fn on_log_line(&mut self, _line: &str) {}

    fn on_link_status(&mut self, _status: &LinkStatus) {}

    /// Fired on every clock tick for the live date/time display.
    fn on_clock(&mut self, _now: NaiveDateTime, _codes: &DateCodes) {}
}

impl<const N: usize> StationObserver<N> for () {}

impl<const N: usize, const L: usize> StationObserver<N> for LineLog<L> {
    fn on_log_line(&mut self, line: &str) {
        self.push(line);
    }
}

/// A complete station: serial link, result state machine and scheduler, run from
/// one logical thread.
///
/// The owner calls [`TestStation::on_tick`] from its event loop with a monotonic time;
/// nothing in here blocks or spawns.
#[derive(Debug)]
pub struct TestStation<T, S, C, const N: usize = DEFAULT_SENSOR_COUNT>
where
    T: Transport,
    S: StationStore,
    C: Clock,
{
    link: SerialLink<T>,
    station: Station<S, C, N>,
    scheduler: Scheduler,
    rx_lines: Vec<String>,
}

impl<T, S, C, const N: usize> TestStation<T, S, C, N>
where
    T: Transport,
    S: StationStore,
    C: Clock,
{
    /// Loads the station state from `store` and preselects the last used channel.
    pub fn new(transport: T, store: S, clock: C) -> Self {
        Self::from_parts(SerialLink::new(transport), Station::load(store, clock))
    }

    pub fn from_parts(mut link: SerialLink<T>, station: Station<S, C, N>) -> Self {
        let saved = station.identity().com_port.trim();
        if !saved.is_empty() {
            link.select_channel(saved);
        }
        TestStation {
            link,
            station,
            scheduler: Scheduler::new(),
            rx_lines: Vec::new(),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn station(&self) -> &Station<S, C, N> {
        &self.station
    }

    pub fn station_mut(&mut self) -> &mut Station<S, C, N> {
        &mut self.station
    }

    pub fn link(&self) -> &SerialLink<T> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut SerialLink<T> {
        &mut self.link
    }

    // --- Operator actions ---

    /// Chooses the channel for the next connect. An open connection to another
    /// channel is closed.
    pub fn select_channel<O>(&mut self, channel: &str, observer: &mut O)
    where
        O: StationObserver<N> + ?Sized,
    {
        if self.link.select_channel(channel) {
            observer.on_link_status(&LinkStatus::SwitchedAway);
        }
    }

    /// Opens the selected channel and remembers it under `com port`.
    pub fn connect<O>(&mut self, observer: &mut O) -> Result<(), StationError<T::Error>>
    where
        O: StationObserver<N> + ?Sized,
    {
        match self.link.connect() {
            Ok(channel) => {
                let channel = channel.to_string();
                // A failed save is logged and flagged by the station
                let _ = self.station.update_config(KEY_COM_PORT, &channel);
                observer.on_link_status(&LinkStatus::Connected {
                    channel,
                    baud_rate: DEFAULT_BAUD_RATE,
                });
                Ok(())
            }
            Err(e) => {
                warn!("Connect failed: {:?}", e);
                observer.on_link_status(&LinkStatus::ConnectFailed {
                    reason: format!("{:?}", e),
                });
                Err(e)
            }
        }
    }

    pub fn disconnect<O>(&mut self, observer: &mut O)
    where
        O: StationObserver<N> + ?Sized,
    {
        if !self.link.is_open() {
            return;
        }
        self.link.disconnect();
        let channel = self.link.channel().unwrap_or_default().to_string();
        observer.on_link_status(&LinkStatus::Disconnected { channel });
    }

    /// Selects the part token for subsequent traceability codes.
    pub fn select_part(&mut self, part: &str) {
        self.station.select_part(part);
    }

    /// Sends `MODEL=<part>` to the fixture.
    pub fn send_model<O>(&mut self, part: &str, observer: &mut O) -> Result<(), StationError<T::Error>>
    where
        O: StationObserver<N> + ?Sized,
    {
        let result = Command::select_model(part)
            .map_err(StationError::CommandFormat)
            .and_then(|cmd| {
                self.link.send_command(&cmd)?;
                Ok(cmd)
            });
        match result {
            Ok(Command::SelectModel { part }) => {
                observer.on_log_line(&format!("[TX] MODEL={}", part));
                observer.on_link_status(&LinkStatus::ModelSent { part: part.to_string() });
                Ok(())
            }
            Err(e) => {
                warn!("Sending model {:?} failed: {:?}", part, e);
                observer.on_link_status(&LinkStatus::SendFailed {
                    reason: format!("{}", e),
                });
                Err(e)
            }
        }
    }

    // --- Scheduler entry points ---

    /// Runs whatever is due at `now`. The clock tick runs before the poll tick, so a
    /// pending day rollover lands before the verdicts received in the same step.
    pub fn on_tick<O>(&mut self, now: Duration, observer: &mut O) -> Ticks
    where
        O: StationObserver<N> + ?Sized,
    {
        let ticks = self.scheduler.due(now);
        if ticks.clock {
            self.on_clock_tick(observer);
        }
        if ticks.poll {
            if let Err(e) = self.on_poll_tick(observer) {
                error!("Link lost: {}", e);
            }
        }
        ticks
    }

    /// Clock tick: day-boundary check and live clock update.
    pub fn on_clock_tick<O>(&mut self, observer: &mut O)
    where
        O: StationObserver<N> + ?Sized,
    {
        if self.station.check_day_boundary() {
            observer.on_status_changed(self.station.snapshot());
        }
        let now = self.station.clock().now();
        observer.on_clock(now, &DateCodes::from_date(now.date()));
    }

    /// Poll tick: drains the transport and dispatches every complete line.
    ///
    /// On a read failure the lines already framed are still dispatched, then one
    /// reconnect is attempted. Returns the number of lines handled; an error means
    /// the reconnect failed and the link is down.
    pub fn on_poll_tick<O>(&mut self, observer: &mut O) -> Result<usize, StationError<T::Error>>
    where
        O: StationObserver<N> + ?Sized,
    {
        let mut lines = core::mem::take(&mut self.rx_lines);
        lines.clear();
        let polled = self.link.poll(&mut lines);

        for line in &lines {
            observer.on_log_line(line);
            self.dispatch(line, observer);
        }
        let handled = lines.len();
        self.rx_lines = lines;

        match polled {
            Ok(_) => Ok(handled),
            Err(e) if e.is_link_failure() => {
                warn!("Read failed: {:?}", e);
                observer.on_link_status(&LinkStatus::PortError);
                self.reconnect(observer).map(|()| handled)
            }
            Err(e) => Err(e),
        }
    }

    fn reconnect<O>(&mut self, observer: &mut O) -> Result<(), StationError<T::Error>>
    where
        O: StationObserver<N> + ?Sized,
    {
        match self.link.reconnect() {
            Ok(channel) => {
                let channel = channel.to_string();
                observer.on_link_status(&LinkStatus::Reconnected { channel });
                Ok(())
            }
            Err(e) => {
                observer.on_link_status(&LinkStatus::ReconnectFailed);
                Err(e)
            }
        }
    }

    fn dispatch<O>(&mut self, line: &str, observer: &mut O)
    where
        O: StationObserver<N> + ?Sized,
    {
        let event = classify(line);
        if let ProtocolEvent::Unknown { .. } = event {
            self.station.handle_event(&event);
            return;
        }
        let passed = self.station.handle_event(&event);
        let snapshot = self.station.snapshot();
        observer.on_status_changed(snapshot);
        if let Some(passed) = passed {
            observer.on_unit_passed(&passed, snapshot);
        }
    }
}
