use std::path::Path;
use std::{fs, io};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Root {
    /// Serial device configuration.
    pub serial: Serial,
    /// Bus broker configuration.
    pub mqtt: Mqtt,
    /// Enable debug-level logging.
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Serial {
    /// Path to the serial device.
    pub path: String,
    /// Baud rate of the device's firmware.
    #[serde(default = "default_baud")]
    pub baud: u32,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Mqtt {
    /// Broker host name or address.
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Topic the bus sends light commands on.
    pub command_topic: String,
    /// Topic the bridge publishes state updates on.
    pub state_topic: String,
}

fn default_baud() -> u32 {
    9600
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "lightbridge".to_string()
}

pub fn read_config_yaml<T: AsRef<Path>>(path: T) -> io::Result<Root> {
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let root: Root = serde_yaml::from_reader(reader).map_err(|err| {
        eprintln!("Error reading config file: {:?}", err);
        io::Error::from(io::ErrorKind::InvalidData)
    })?;

    // Quick sanity check for the configuration
    if root.serial.path.is_empty() {
        eprintln!("Serial device path must not be empty");
        return Err(io::Error::from(io::ErrorKind::InvalidData));
    }
    if root.mqtt.host.is_empty() {
        eprintln!("MQTT broker host must not be empty");
        return Err(io::Error::from(io::ErrorKind::InvalidData));
    }
    if root.mqtt.command_topic == root.mqtt.state_topic {
        eprintln!(
            "Command and state topics must differ: {}",
            root.mqtt.command_topic
        );
        return Err(io::Error::from(io::ErrorKind::InvalidData));
    }

    Ok(root)
}
