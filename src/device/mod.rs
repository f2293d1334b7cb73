//! The serial-attached light device.

use std::io::{self, Write};
use std::time::Duration;

use log::{debug, info};
use serialport::SerialPort;

/// How long a blocking serial read may stall before the read loop gets
/// control back to check for shutdown.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Write side of the light device, as seen by the bridge.
pub trait LightPort {
    /// Write one protocol line, newline-terminated, and flush it.
    fn send_line(&mut self, line: &str) -> io::Result<()>;
}

/// A light reachable through a serial port.
pub struct SerialLight {
    port: Box<dyn SerialPort>,
}

impl SerialLight {
    /// Open the serial device and configure it for line traffic.
    pub fn open(path: &str, baud: u32) -> io::Result<SerialLight> {
        info!("opening serial device {} @ {} baud", path, baud);
        let mut port = serialport::open(path)?;
        port.set_baud_rate(baud)?;
        port.set_timeout(READ_TIMEOUT)?;
        Ok(SerialLight { port })
    }

    /// Clone the underlying port handle for the read loop. Reads and
    /// writes share the one physical link; the transport arbitrates.
    pub fn reader(&self) -> io::Result<Box<dyn SerialPort>> {
        Ok(self.port.try_clone()?)
    }
}

impl LightPort for SerialLight {
    fn send_line(&mut self, line: &str) -> io::Result<()> {
        debug!("serial write: {:?}", line);
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(b"\n")?;
        self.port.flush()
    }
}
