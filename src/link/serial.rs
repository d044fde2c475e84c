// src/link/serial.rs

use crate::common::{hal_traits::Transport, timing::DEFAULT_BAUD_RATE};
use log::debug;
use serialport::SerialPort;
use std::boxed::Box;
use std::io::{self, Read, Write};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SerialTransportError {
    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),
    #[error("serial I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("serial port is not open")]
    NotOpen,
}

/// [`Transport`] backed by an OS serial port, 8N1 at a fixed baud rate.
///
/// The port is opened with a zero read timeout and only ever read for the byte
/// count the driver reports as pending, so no call blocks.
pub struct SerialPortTransport {
    baud_rate: u32,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortTransport {
    pub fn new() -> Self {
        Self::with_baud_rate(DEFAULT_BAUD_RATE)
    }

    pub fn with_baud_rate(baud_rate: u32) -> Self {
        SerialPortTransport { baud_rate, port: None }
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Names of the serial ports currently present on the system.
    pub fn available_channels() -> Result<std::vec::Vec<std::string::String>, SerialTransportError> {
        Ok(serialport::available_ports()?
            .into_iter()
            .map(|p| p.port_name)
            .collect())
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>, SerialTransportError> {
        self.port.as_mut().ok_or(SerialTransportError::NotOpen)
    }
}

impl Default for SerialPortTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for SerialPortTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SerialPortTransport")
            .field("baud_rate", &self.baud_rate)
            .field("port", &self.port.as_ref().and_then(|p| p.name()))
            .finish()
    }
}

impl Transport for SerialPortTransport {
    type Error = SerialTransportError;

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn open(&mut self, channel: &str) -> Result<(), Self::Error> {
        self.close();
        let port = serialport::new(channel, self.baud_rate)
            .timeout(Duration::ZERO)
            .open()?;
        debug!("Opened {} at {} baud", channel, self.baud_rate);
        self.port = Some(port);
        Ok(())
    }

    fn available_byte_count(&mut self) -> Result<usize, Self::Error> {
        Ok(self.port_mut()?.bytes_to_read()? as usize)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error> {
        let port = self.port_mut().map_err(nb::Error::Other)?;
        match port.read(buf) {
            Ok(0) => Err(nb::Error::WouldBlock),
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Err(nb::Error::WouldBlock)
            }
            Err(e) => Err(nb::Error::Other(e.into())),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let port = self.port_mut()?;
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(port) = self.port.take() {
            debug!("Closed {:?}", port.name());
        }
    }
}
