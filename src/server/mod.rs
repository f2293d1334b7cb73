use std::io::{self, BufRead};
use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info, warn};
use rumqttc::{Connection, Event, Packet};
use serialport::SerialPort;

use crate::bridge::Bridge;
use crate::bus::MqttBus;
use crate::device::SerialLight;

/// One inbound event from either side of the bridge.
enum BridgeMessage {
    /// Raw payload of a bus publication.
    Bus(Vec<u8>),
    /// One line of device output.
    SerialLine(String),
}

/// Fan both event sources into one channel and run the translators on
/// the receiving end. The bridge owns the serial writer, the bus
/// publisher and the shared state, so all mutations happen here.
pub fn serve(
    mut bridge: Bridge<SerialLight, MqttBus>,
    connection: Connection,
    reader: Box<dyn SerialPort>,
) -> io::Result<()> {
    let (sender, receiver) = channel::<BridgeMessage>();

    let bus_handle = start_bus_thread(connection, sender.clone());
    let serial_handle = start_serial_thread(reader, sender);

    'message_loop: loop {
        match receiver.recv() {
            Ok(BridgeMessage::Bus(payload)) => {
                if let Err(err) = bridge.handle_bus_message(&payload) {
                    bridge.log_error(&err);
                }
            }
            Ok(BridgeMessage::SerialLine(line)) => {
                if let Err(err) = bridge.handle_serial_line(&line) {
                    bridge.log_error(&err);
                }
            }
            Err(err) => {
                error!("all event sources gone: {:?}", err);
                break 'message_loop;
            }
        }
    }

    bus_handle.join().expect("Did the bus thread crash?");
    serial_handle.join().expect("Did the serial thread crash?");

    Ok(())
}

/// Poll the MQTT connection and forward inbound publications.
///
/// rumqttc reconnects on its own; connection errors are only worth a
/// log line and a pause before the next poll.
fn start_bus_thread(mut connection: Connection, sender: Sender<BridgeMessage>) -> JoinHandle<()> {
    info!("[bus] starting broker connection");
    thread::spawn(move || {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let message = BridgeMessage::Bus(publish.payload.to_vec());
                    if sender.send(message).is_err() {
                        warn!("[bus] message receiver gone, exiting thread");
                        return;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    error!("[bus] connection error: {}", err);
                    thread::sleep(Duration::from_secs(1));
                }
            }
        }
    })
}

/// Read device output line by line and forward it.
///
/// The port carries a one-second read timeout; a timed-out read keeps
/// whatever partial line has arrived and tries again, so the loop can
/// wind down promptly once the receiver disappears.
fn start_serial_thread(
    port: Box<dyn SerialPort>,
    sender: Sender<BridgeMessage>,
) -> JoinHandle<()> {
    info!("[serial] starting read loop");
    thread::spawn(move || {
        let mut reader = io::BufReader::new(port);
        let mut line = String::new();
        loop {
            match reader.read_line(&mut line) {
                Ok(0) => {
                    warn!("[serial] port closed, exiting thread");
                    return;
                }
                Ok(_) => {
                    let message = BridgeMessage::SerialLine(line.clone());
                    line.clear();
                    if sender.send(message).is_err() {
                        warn!("[serial] message receiver gone, exiting thread");
                        return;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::TimedOut => {
                    // No complete line yet; keep the partial and retry.
                    continue;
                }
                Err(err) => {
                    error!("[serial] read failed: {}", err);
                    line.clear();
                }
            }
        }
    })
}
