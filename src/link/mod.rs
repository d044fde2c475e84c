// src/link/mod.rs

#[cfg(feature = "serial")]
pub mod serial;
#[cfg(feature = "serial")]
pub use serial::{SerialPortTransport, SerialTransportError};

use crate::common::{
    error::StationError, hal_traits::Transport, timing::READ_CHUNK_SIZE, Command, FrameReader,
};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use log::{debug, info, warn};

/// Operator-facing state changes of the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Connected { channel: String, baud_rate: u32 },
    ConnectFailed { reason: String },
    Disconnected { channel: String },
    /// The selected channel changed while a connection was open.
    SwitchedAway,
    /// A read failed; a reconnect is about to be attempted.
    PortError,
    Reconnected { channel: String },
    ReconnectFailed,
    ModelSent { part: String },
    SendFailed { reason: String },
}

impl LinkStatus {
    /// True for states where the fixture can currently be reached.
    pub fn is_online(&self) -> bool {
        matches!(
            self,
            LinkStatus::Connected { .. } | LinkStatus::Reconnected { .. } | LinkStatus::ModelSent { .. }
        )
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Connected { channel, baud_rate } => {
                write!(f, "Connected to {} - {}", channel, baud_rate)
            }
            LinkStatus::ConnectFailed { reason } => write!(f, "Failed to connect: {}", reason),
            LinkStatus::Disconnected { channel } => write!(f, "Disconnected from {}", channel),
            LinkStatus::SwitchedAway => f.write_str("Disconnected from old port"),
            LinkStatus::PortError => f.write_str("Port error"),
            LinkStatus::Reconnected { channel } => write!(f, "Reconnected to {}", channel),
            LinkStatus::ReconnectFailed => f.write_str("Failed to reconnect"),
            LinkStatus::ModelSent { part } => write!(f, "Sent MODEL: {}", part),
            LinkStatus::SendFailed { reason } => write!(f, "Send failed: {}", reason),
        }
    }
}

/// Owns the transport and the frame reader feeding on it.
///
/// The reader is reset on every open and close, so a line can never mix bytes from
/// two connections.
#[derive(Debug)]
pub struct SerialLink<T: Transport> {
    transport: T,
    reader: FrameReader,
    channel: Option<String>,
}

impl<T: Transport> SerialLink<T> {
    pub fn new(transport: T) -> Self {
        Self::with_reader(transport, FrameReader::new())
    }

    /// Uses a preconfigured frame reader (e.g. a different capacity).
    pub fn with_reader(transport: T, reader: FrameReader) -> Self {
        SerialLink {
            transport,
            reader,
            channel: None,
        }
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Chooses the channel used by `connect` and `reconnect`.
    ///
    /// Returns `true` if an open connection to another channel was closed.
    pub fn select_channel(&mut self, channel: &str) -> bool {
        let channel = channel.trim();
        let changed = self.channel.as_deref() != Some(channel);
        self.channel = Some(channel.to_string());
        if changed && self.transport.is_open() {
            info!("Channel changed to {}, closing old connection", channel);
            self.close_transport();
            return true;
        }
        false
    }

    /// Opens the selected channel.
    pub fn connect(&mut self) -> Result<&str, StationError<T::Error>> {
        let channel = self.channel.as_deref().ok_or(StationError::NoChannelSelected)?;
        self.reader.reset();
        self.transport.open(channel)?;
        info!("Connected to {}", channel);
        Ok(channel)
    }

    pub fn disconnect(&mut self) {
        if self.transport.is_open() {
            info!("Disconnecting from {:?}", self.channel);
        }
        self.close_transport();
    }

    /// Closes the transport and makes a single attempt to reopen the selected channel.
    pub fn reconnect(&mut self) -> Result<&str, StationError<T::Error>> {
        self.close_transport();
        let channel = self.channel.as_deref().ok_or(StationError::NoChannelSelected)?;
        info!("Reconnecting to {}", channel);
        match self.transport.open(channel) {
            Ok(()) => Ok(channel),
            Err(e) => {
                warn!("Reconnect to {} failed: {:?}", channel, e);
                Err(StationError::ReconnectFailed(e))
            }
        }
    }

    /// Drains every byte the transport has pending and pushes the completed lines
    /// onto `lines`, returning how many were added.
    ///
    /// Never waits: a closed transport or an empty receive queue returns `Ok(0)` at once.
    /// Lines completed before a read error are still pushed; the caller decides
    /// whether to reconnect.
    pub fn poll(&mut self, lines: &mut Vec<String>) -> Result<usize, StationError<T::Error>> {
        if !self.transport.is_open() {
            return Ok(0);
        }
        let before = lines.len();
        let mut remaining = self.transport.available_byte_count()?;
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        while remaining > 0 {
            let want = remaining.min(chunk.len());
            let read = match self.transport.read_available(&mut chunk[..want]) {
                Ok(0) | Err(nb::Error::WouldBlock) => break,
                Ok(n) => n,
                Err(nb::Error::Other(e)) => return Err(StationError::Io(e)),
            };
            lines.extend(self.reader.feed(&chunk[..read]));
            remaining = remaining.saturating_sub(read);
        }
        let added = lines.len() - before;
        if added > 0 {
            debug!("Received {} line(s)", added);
        }
        Ok(added)
    }

    /// Formats `command` and writes it out.
    pub fn send_command(&mut self, command: &Command<'_>) -> Result<(), StationError<T::Error>> {
        if !self.transport.is_open() {
            return Err(StationError::NotConnected);
        }
        let line = command.format_into().map_err(StationError::CommandFormat)?;
        self.transport.write(line.as_bytes())?;
        info!("[TX] {}", line.trim_end());
        Ok(())
    }

    fn close_transport(&mut self) {
        self.transport.close();
        self.reader.reset();
    }
}
