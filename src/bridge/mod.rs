//! The two translators at the heart of the bridge.
//!
//! Bus-to-device: decode a command payload, write the matching serial
//! line. Device-to-bus: decode a serial line, publish the matching
//! state update. The two directions never call each other; they meet
//! only at the device, the bus, and the shared light state.

use std::fmt;
use std::io;

use log::{debug, info, warn};

use crate::bus::{BusPublisher, StatePayload, PowerField, ValidationError};
use crate::color::{self, PackedColor};
use crate::device::LightPort;
use crate::protocol::{ParseError, SerialEvent};
use crate::state::{Power, SharedState};

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug)]
pub enum BridgeError {
    /// An unparsable serial line.
    Parse(ParseError),
    /// A bus payload that was not the expected JSON shape.
    Payload(serde_json::Error),
    /// A color object with a missing or out-of-range channel.
    Validation(ValidationError),
    /// A serial write or bus publish failed.
    Transport(io::Error),
}

impl From<ParseError> for BridgeError {
    fn from(err: ParseError) -> BridgeError {
        BridgeError::Parse(err)
    }
}

impl From<ValidationError> for BridgeError {
    fn from(err: ValidationError) -> BridgeError {
        BridgeError::Validation(err)
    }
}

impl From<io::Error> for BridgeError {
    fn from(err: io::Error) -> BridgeError {
        BridgeError::Transport(err)
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BridgeError::Parse(ParseError::BadLine(line)) => {
                write!(f, "unparsable serial line: {:?}", line)
            }
            BridgeError::Payload(err) => write!(f, "malformed bus payload: {}", err),
            BridgeError::Validation(ValidationError::MissingChannel(name)) => {
                write!(f, "color object is missing channel {:?}", name)
            }
            BridgeError::Validation(ValidationError::ChannelRange(name, value)) => {
                write!(f, "color channel {:?} out of range: {}", name, value)
            }
            BridgeError::Transport(err) => write!(f, "transport failure: {}", err),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Both translators, bound to one device, one bus and one state.
pub struct Bridge<P: LightPort, B: BusPublisher> {
    port: P,
    bus: B,
    state: SharedState,
}

impl<P: LightPort, B: BusPublisher> Bridge<P, B> {
    pub fn new(port: P, bus: B, state: SharedState) -> Bridge<P, B> {
        Bridge { port, bus, state }
    }

    /// Handle one raw command payload from the automation bus.
    ///
    /// At most one serial write happens per message. OFF takes
    /// precedence over any color in the same message; a color without
    /// a state is an implicit power-on; a bare ON resends the last
    /// known color, since the device forgets its color when told to
    /// turn on without one.
    pub fn handle_bus_message(&mut self, payload: &[u8]) -> BridgeResult<()> {
        let message: StatePayload =
            serde_json::from_slice(payload).map_err(BridgeError::Payload)?;

        if message.state == Some(PowerField::Off) {
            info!("turning the light off");
            self.port.send_line("OFF")?;
            self.state.set_power(Power::Off);
            return Ok(());
        }

        match message.color {
            Some(field) => {
                let (red, green, blue) = field.channels()?;
                let packed = PackedColor::from_rgb(red, green, blue);
                info!("setting color to {},{},{} ({})", red, green, blue, packed);
                self.port.send_line(&packed.to_string())?;
                if !packed.is_blank() {
                    self.state.set_color(packed);
                }
                self.state.set_power(Power::On);
            }
            None if message.state == Some(PowerField::On) => {
                match self.state.get().color {
                    Some(last) => {
                        info!("turning on, resending last color {}", last);
                        self.port.send_line(&last.to_string())?;
                    }
                    None => info!("turning on with no known color, nothing to send"),
                }
                self.state.set_power(Power::On);
            }
            None => debug!("bus message carried neither state nor color"),
        }

        Ok(())
    }

    /// Handle one line read from the device.
    ///
    /// The device can change state on its own (physical controls), so
    /// whatever it reports is published back to the bus. The reserved
    /// zero color and blank lines publish nothing.
    pub fn handle_serial_line(&mut self, line: &str) -> BridgeResult<()> {
        let event = match SerialEvent::parse(line)? {
            Some(event) => event,
            None => return Ok(()),
        };

        match event {
            SerialEvent::PowerOn => {
                info!("device reports power on");
                self.bus.publish_power(Power::On)?;
                self.state.set_power(Power::On);
            }
            SerialEvent::PowerOff => {
                info!("device reports power off");
                self.bus.publish_power(Power::Off)?;
                self.state.set_power(Power::Off);
            }
            SerialEvent::ColorReport(value) => {
                let (red, green, blue, white) = color::split_rgbw(value);
                if white != 0 {
                    debug!("dropping white channel {} from device report", white);
                }
                info!("device reports color {},{},{}", red, green, blue);
                self.bus.publish_color(red, green, blue)?;
                let packed = PackedColor::from_wire(value);
                if !packed.is_blank() {
                    self.state.set_color(packed);
                }
            }
        }

        Ok(())
    }

    /// Log one translator failure at the severity its category calls
    /// for. Nothing here is fatal; the caller moves on to the next
    /// message or line.
    pub fn log_error(&self, err: &BridgeError) {
        match err {
            BridgeError::Transport(_) => log::error!("{}", err),
            _ => warn!("{}", err),
        }
    }
}
