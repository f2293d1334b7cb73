pub mod bridge;
pub mod bus;
pub mod color;
pub mod config;
pub mod device;
pub mod protocol;
pub mod server;
pub mod state;

use std::env;

use log::{info, LevelFilter};

use crate::bridge::Bridge;
use crate::bus::{BusPublisher, MqttBus};
use crate::device::SerialLight;
use crate::state::{Power, SharedState};

fn main() -> std::io::Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "./config.yaml".to_string());
    let config_root = config::read_config_yaml(&config_path)?;

    env_logger::Builder::from_default_env()
        .filter_level(if config_root.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    // Both endpoints are required; failing to acquire either one here
    // ends the process with a non-zero status.
    let light = SerialLight::open(&config_root.serial.path, config_root.serial.baud)?;
    let reader = light.reader()?;
    let (mut bus, connection) = MqttBus::connect(&config_root.mqtt)?;

    // Announce a known starting state before the first device report.
    bus.publish_power(Power::Off)?;

    let state = SharedState::new();
    let bridge = Bridge::new(light, bus, state);

    info!(
        "bridging {} <-> mqtt://{}:{}",
        config_root.serial.path, config_root.mqtt.host, config_root.mqtt.port
    );

    server::serve(bridge, connection, reader)?;

    Ok(())
}
