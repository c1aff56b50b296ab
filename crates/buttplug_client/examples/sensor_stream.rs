// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Subscribes to every subscribable sensor on connected devices and prints
//! readings as they stream in.

use buttplug_client::{
  client::{ButtplugClient, ButtplugClientSensor},
  core::connector::new_json_ws_client_connector,
};
use tokio::io::{self, AsyncBufReadExt, BufReader};

async fn wait_for_input() {
  BufReader::new(io::stdin())
    .lines()
    .next_line()
    .await
    .expect("Example, assuming stdin works.");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt::init();

  let connector = new_json_ws_client_connector("ws://127.0.0.1:12345");
  let client = ButtplugClient::new("Sensor Stream Example");
  client.connect(connector).await?;

  println!("Scanning for devices, press enter to finish.");
  let _ = client.start_scanning().await?;
  wait_for_input().await;
  let _ = client.stop_scanning().await?;

  let devices = client.devices();
  for device in devices.values() {
    for sensor in device.sensors() {
      match sensor {
        ButtplugClientSensor::BatteryLevel(battery) => {
          println!("{}: battery at {:.0}%", device, battery.read().await? * 100.0);
        }
        ButtplugClientSensor::Subscribable(subscribable) => {
          let device_name = device.name().clone();
          let sensor_type = subscribable.sensor_type();
          println!("Subscribing to {} {} sensor.", device_name, sensor_type);
          subscribable
            .subscribe(Box::new(move |data| {
              println!("{device_name} {sensor_type}: {data:?}");
            }))
            .await?;
        }
        _ => {}
      }
    }
  }

  println!("Streaming sensor data, press enter to quit.");
  wait_for_input().await;

  for device in devices.values() {
    for sensor in device.sensors() {
      if let ButtplugClientSensor::Subscribable(subscribable) = sensor {
        subscribable.unsubscribe().await?;
      }
    }
  }
  client.disconnect().await?;
  Ok(())
}
