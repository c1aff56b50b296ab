// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Connects to a server (Intiface Central, usually), scans for devices, and
//! drives whatever actuators they expose.

use buttplug_client::{
  client::{ButtplugClient, ButtplugClientActuator},
  core::connector::new_json_ws_client_connector,
};
use std::time::Duration;
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
  let client = ButtplugClient::new("Device Control Example");
  client.connect(connector).await?;
  println!(
    "Connected to {}.",
    client.server_name().unwrap_or_else(|| "<unnamed server>".to_owned())
  );

  println!("Scanning for devices, press enter to finish.");
  let scan = client.start_scanning().await?;
  wait_for_input().await;
  let _ = client.stop_scanning().await?;
  let devices = scan.await;

  for device in devices.values() {
    println!("- {} (index {})", device, device.index());
    for actuator in device.actuators() {
      match actuator {
        ButtplugClientActuator::Scalar(scalar) => println!(
          "  {} {} (steps: {:?})",
          scalar.actuator_type(),
          scalar.descriptor(),
          scalar.step_count()
        ),
        ButtplugClientActuator::Vibrate(vibrate) => {
          println!("  Vibrator {} (steps: {:?})", vibrate.index(), vibrate.step_count())
        }
        _ => println!("  Legacy actuator {}", actuator.index()),
      }
    }
  }

  println!("Sending commands, press enter to stop.");
  for device in devices.values() {
    for actuator in device.actuators() {
      match actuator {
        ButtplugClientActuator::Scalar(scalar) => scalar.command(0.5).await?,
        ButtplugClientActuator::Vibrate(vibrate) => vibrate.command(0.5).await?,
        ButtplugClientActuator::SingleMotorVibrate(vibrate) => vibrate.command(0.5).await?,
        _ => continue,
      }
    }
    for linear in device.linear_actuators() {
      linear.command(1000, 0.8).await?;
    }
    for rotatory in device.rotatory_actuators() {
      rotatory.command(0.3, true).await?;
    }
  }
  wait_for_input().await;

  client.stop_all_devices().await?;
  tokio::time::sleep(Duration::from_millis(250)).await;
  client.disconnect().await?;
  Ok(())
}
