//! Automation-bus message shapes and the MQTT client glue.
//!
//! Inbound command payloads and outbound state publications share one
//! JSON shape: an optional `state` of `"ON"`/`"OFF"` and an optional
//! `color` object with 8-bit integer channels. Some bus integrations
//! send a `w` channel as well; it is accepted and never forwarded.

use std::io;
use std::time::Duration;

use log::debug;
use rumqttc::{Client, Connection, MqttOptions, QoS};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::state::Power;

/// One bus message, in either direction. Both fields are optional; a
/// meaningful message carries at least one.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct StatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PowerField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorField>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PowerField {
    On,
    Off,
}

impl From<Power> for PowerField {
    fn from(power: Power) -> PowerField {
        match power {
            Power::On => PowerField::On,
            Power::Off => PowerField::Off,
        }
    }
}

/// Color object as it appears on the wire. Channels are read wide so
/// that a missing or out-of-range value is a validation failure
/// instead of a deserialization failure.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ColorField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub g: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<i64>,
}

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, PartialEq)]
pub enum ValidationError {
    /// A required color channel was absent.
    MissingChannel(&'static str),
    /// A channel value fell outside 0..=255.
    ChannelRange(&'static str, i64),
}

impl ColorField {
    pub fn rgb(red: u8, green: u8, blue: u8) -> ColorField {
        ColorField {
            r: Some(red as i64),
            g: Some(green as i64),
            b: Some(blue as i64),
            w: None,
        }
    }

    /// Validate and narrow the three color channels. The white
    /// channel, if any, is dropped here.
    pub fn channels(&self) -> ValidationResult<(u8, u8, u8)> {
        Ok((
            check_channel("r", self.r)?,
            check_channel("g", self.g)?,
            check_channel("b", self.b)?,
        ))
    }
}

fn check_channel(name: &'static str, value: Option<i64>) -> ValidationResult<u8> {
    match value {
        None => Err(ValidationError::MissingChannel(name)),
        Some(v) if v < 0 || v > 255 => Err(ValidationError::ChannelRange(name, v)),
        Some(v) => Ok(v as u8),
    }
}

/// Outbound half of the bus connection, as seen by the bridge.
pub trait BusPublisher {
    /// Publish a power-state update.
    fn publish_power(&mut self, power: Power) -> io::Result<()>;
    /// Publish a color update (RGB only).
    fn publish_color(&mut self, red: u8, green: u8, blue: u8) -> io::Result<()>;
}

/// MQTT-backed publisher. Subscribes to the command topic on connect;
/// the matching `Connection` must be polled by the caller for any of
/// it to make progress.
pub struct MqttBus {
    client: Client,
    state_topic: String,
}

impl MqttBus {
    pub fn connect(config: &config::Mqtt) -> io::Result<(MqttBus, Connection)> {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        let (client, connection) = Client::new(options, 16);
        client
            .subscribe(config.command_topic.as_str(), QoS::AtLeastOnce)
            .map_err(to_io)?;

        Ok((
            MqttBus {
                client,
                state_topic: config.state_topic.clone(),
            },
            connection,
        ))
    }

    fn publish(&mut self, payload: &StatePayload) -> io::Result<()> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        debug!("bus publish: {}", String::from_utf8_lossy(&body));
        self.client
            .publish(self.state_topic.as_str(), QoS::AtLeastOnce, true, body)
            .map_err(to_io)
    }
}

impl BusPublisher for MqttBus {
    fn publish_power(&mut self, power: Power) -> io::Result<()> {
        self.publish(&StatePayload {
            state: Some(power.into()),
            color: None,
        })
    }

    fn publish_color(&mut self, red: u8, green: u8, blue: u8) -> io::Result<()> {
        self.publish(&StatePayload {
            state: None,
            color: Some(ColorField::rgb(red, green, blue)),
        })
    }
}

fn to_io(err: rumqttc::ClientError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_state_and_color() {
        let payload: StatePayload =
            serde_json::from_str(r#"{"state":"ON","color":{"r":1,"g":2,"b":3}}"#).unwrap();
        assert_eq!(payload.state, Some(PowerField::On));
        assert_eq!(payload.color.unwrap().channels().unwrap(), (1, 2, 3));
    }

    #[test]
    fn deserializes_partial_messages() {
        let off: StatePayload = serde_json::from_str(r#"{"state":"OFF"}"#).unwrap();
        assert_eq!(off.state, Some(PowerField::Off));
        assert_eq!(off.color, None);

        let color_only: StatePayload =
            serde_json::from_str(r#"{"color":{"r":10,"g":20,"b":30,"w":40}}"#).unwrap();
        assert_eq!(color_only.state, None);
        assert_eq!(color_only.color.unwrap().channels().unwrap(), (10, 20, 30));
    }

    #[test]
    fn missing_channel_fails_validation() {
        let payload: StatePayload =
            serde_json::from_str(r#"{"color":{"r":10,"b":30}}"#).unwrap();
        assert_eq!(
            payload.color.unwrap().channels(),
            Err(ValidationError::MissingChannel("g"))
        );
    }

    #[test]
    fn out_of_range_channel_fails_validation() {
        let payload: StatePayload =
            serde_json::from_str(r#"{"color":{"r":10,"g":999,"b":30}}"#).unwrap();
        assert_eq!(
            payload.color.unwrap().channels(),
            Err(ValidationError::ChannelRange("g", 999))
        );
    }

    #[test]
    fn serializes_without_empty_fields() {
        let power = StatePayload {
            state: Some(PowerField::On),
            color: None,
        };
        assert_eq!(serde_json::to_string(&power).unwrap(), r#"{"state":"ON"}"#);

        let color = StatePayload {
            state: None,
            color: Some(ColorField::rgb(255, 255, 255)),
        };
        assert_eq!(
            serde_json::to_string(&color).unwrap(),
            r#"{"color":{"r":255,"g":255,"b":255}}"#
        );
    }
}
