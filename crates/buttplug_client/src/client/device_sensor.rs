// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Sensor handles: readable inputs on a device. v2 devices expose dedicated
//! battery/RSSI sensors, v3 devices expose generic sensors, some of which can
//! additionally be subscribed to for a stream of readings.

use super::{device::DeviceCommandSender, ButtplugClientResultFuture};
use crate::core::errors::{ButtplugError, ButtplugMessageError};
use crate::core::message::{
  BatteryLevelCmd,
  ButtplugDeviceMessage,
  ButtplugServerMessage,
  RSSILevelCmd,
  SensorReadCmd,
  SensorSubscribeCmd,
  SensorType,
  SensorUnsubscribeCmd,
};
use std::{
  ops::RangeInclusive,
  sync::{Arc, Mutex},
};

/// Callback invoked with the data array of every reading a subscribed sensor
/// produces.
pub type SensorDataCallback = Box<dyn Fn(&[i32]) + Send + Sync>;

/// v2 battery sensor. Always device-local sensor index 0.
#[derive(Clone)]
pub struct BatteryLevelSensor {
  index: u32,
  command_sender: Arc<DeviceCommandSender>,
}

impl BatteryLevelSensor {
  pub(super) fn new(index: u32, command_sender: &Arc<DeviceCommandSender>) -> Self {
    Self {
      index,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  /// Reads the battery level, as a 0.0-1.0 fraction.
  pub fn read(&self) -> ButtplugClientResultFuture<f64> {
    let device_index = self.command_sender.device_index();
    debug!("Reading battery level from device {}", device_index);
    let send_fut = self
      .command_sender
      .send_message(BatteryLevelCmd::new(device_index).into());
    Box::pin(async move {
      match send_fut.await? {
        ButtplugServerMessage::BatteryLevelReading(reading) => {
          // Metadata mismatches are reported but don't fail the read.
          if reading.device_index() != device_index {
            warn!(
              "Received battery level from device index {} when expecting device index {}",
              reading.device_index(),
              device_index
            );
          }
          Ok(reading.battery_level())
        }
        ButtplugServerMessage::Error(err) => Err(ButtplugError::from(&err).into()),
        msg => Err(
          ButtplugError::ButtplugMessageError(ButtplugMessageError::UnexpectedMessageType(
            format!("{msg:?}"),
          ))
          .into(),
        ),
      }
    })
  }
}

/// v2 RSSI sensor. Always device-local sensor index 1.
#[derive(Clone)]
pub struct RssiLevelSensor {
  index: u32,
  command_sender: Arc<DeviceCommandSender>,
}

impl RssiLevelSensor {
  pub(super) fn new(index: u32, command_sender: &Arc<DeviceCommandSender>) -> Self {
    Self {
      index,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  /// Reads the device's signal strength in dB.
  pub fn read(&self) -> ButtplugClientResultFuture<i32> {
    let device_index = self.command_sender.device_index();
    debug!("Reading RSSI level from device {}", device_index);
    let send_fut = self
      .command_sender
      .send_message(RSSILevelCmd::new(device_index).into());
    Box::pin(async move {
      match send_fut.await? {
        ButtplugServerMessage::RSSILevelReading(reading) => {
          if reading.device_index() != device_index {
            warn!(
              "Received RSSI level from device index {} when expecting device index {}",
              reading.device_index(),
              device_index
            );
          }
          Ok(reading.rssi_level())
        }
        ButtplugServerMessage::Error(err) => Err(ButtplugError::from(&err).into()),
        msg => Err(
          ButtplugError::ButtplugMessageError(ButtplugMessageError::UnexpectedMessageType(
            format!("{msg:?}"),
          ))
          .into(),
        ),
      }
    })
  }
}

/// v3 generic readable sensor.
#[derive(Clone)]
pub struct GenericSensor {
  index: u32,
  descriptor: String,
  sensor_type: SensorType,
  ranges: Vec<RangeInclusive<i32>>,
  command_sender: Arc<DeviceCommandSender>,
}

impl GenericSensor {
  pub(super) fn new(
    index: u32,
    descriptor: &str,
    sensor_type: SensorType,
    ranges: Vec<RangeInclusive<i32>>,
    command_sender: &Arc<DeviceCommandSender>,
  ) -> Self {
    Self {
      index,
      descriptor: descriptor.to_owned(),
      sensor_type,
      ranges,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn descriptor(&self) -> &String {
    &self.descriptor
  }

  pub fn sensor_type(&self) -> SensorType {
    self.sensor_type
  }

  /// Value ranges the sensor's data array entries fall in, one per entry.
  pub fn ranges(&self) -> &Vec<RangeInclusive<i32>> {
    &self.ranges
  }

  /// Reads the sensor's current data array. Response metadata that doesn't
  /// match the sensor is reported, but the data is returned regardless.
  pub fn read(&self) -> ButtplugClientResultFuture<Vec<i32>> {
    let device_index = self.command_sender.device_index();
    let sensor_index = self.index;
    let sensor_type = self.sensor_type;
    let expected_len = self.ranges.len();
    debug!(
      "Reading data from device {} sensor {}",
      device_index, sensor_index
    );
    let send_fut = self
      .command_sender
      .send_message(SensorReadCmd::new(device_index, sensor_index, sensor_type).into());
    Box::pin(async move {
      match send_fut.await? {
        ButtplugServerMessage::SensorReading(reading) => {
          if reading.device_index() != device_index {
            warn!(
              "Received data from device index {} when expecting device index {}",
              reading.device_index(),
              device_index
            );
          }
          if reading.sensor_index() != sensor_index {
            warn!(
              "Received data from sensor index {} when expecting sensor index {}",
              reading.sensor_index(),
              sensor_index
            );
          }
          if reading.sensor_type() != sensor_type {
            warn!(
              "Received data for sensor type {} when expecting sensor type {}",
              reading.sensor_type(),
              sensor_type
            );
          }
          if expected_len > 0 && reading.data().len() != expected_len {
            warn!(
              "Received {} data values when expecting {}",
              reading.data().len(),
              expected_len
            );
          }
          Ok(reading.data().clone())
        }
        ButtplugServerMessage::Error(err) => Err(ButtplugError::from(&err).into()),
        msg => Err(
          ButtplugError::ButtplugMessageError(ButtplugMessageError::UnexpectedMessageType(
            format!("{msg:?}"),
          ))
          .into(),
        ),
      }
    })
  }
}

/// v3 sensor that can also stream readings. Created for the sensors the
/// server lists under both SensorReadCmd and SensorSubscribeCmd.
#[derive(Clone)]
pub struct SubscribableSensor {
  inner: GenericSensor,
  callback: Arc<Mutex<Option<SensorDataCallback>>>,
}

impl SubscribableSensor {
  pub(super) fn from_generic(sensor: &GenericSensor) -> Self {
    Self {
      inner: sensor.clone(),
      callback: Arc::new(Mutex::new(None)),
    }
  }

  pub fn index(&self) -> u32 {
    self.inner.index()
  }

  pub fn descriptor(&self) -> &String {
    self.inner.descriptor()
  }

  pub fn sensor_type(&self) -> SensorType {
    self.inner.sensor_type()
  }

  pub fn ranges(&self) -> &Vec<RangeInclusive<i32>> {
    self.inner.ranges()
  }

  /// One-shot read, same as a plain readable sensor.
  pub fn read(&self) -> ButtplugClientResultFuture<Vec<i32>> {
    self.inner.read()
  }

  /// Subscribes to the sensor's reading stream, installing `callback` to run
  /// on every reading once the server acknowledges the subscription.
  pub fn subscribe(&self, callback: SensorDataCallback) -> ButtplugClientResultFuture {
    let device_index = self.inner.command_sender.device_index();
    debug!(
      "Subscribing to device {} sensor {}",
      device_index,
      self.inner.index()
    );
    let send_fut = self.inner.command_sender.send_message_expect_ok(
      SensorSubscribeCmd::new(device_index, self.inner.index(), self.inner.sensor_type()).into(),
    );
    let callback_slot = self.callback.clone();
    Box::pin(async move {
      send_fut.await?;
      *callback_slot
        .lock()
        .expect("Callback lock is never poisoned") = Some(callback);
      Ok(())
    })
  }

  /// Ends the subscription and removes the installed callback.
  pub fn unsubscribe(&self) -> ButtplugClientResultFuture {
    let device_index = self.inner.command_sender.device_index();
    debug!(
      "Unsubscribing from device {} sensor {}",
      device_index,
      self.inner.index()
    );
    let send_fut = self.inner.command_sender.send_message_expect_ok(
      SensorUnsubscribeCmd::new(device_index, self.inner.index(), self.inner.sensor_type()).into(),
    );
    let callback_slot = self.callback.clone();
    Box::pin(async move {
      send_fut.await?;
      *callback_slot
        .lock()
        .expect("Callback lock is never poisoned") = None;
      Ok(())
    })
  }

  /// Runs the installed callback for a reading routed to this sensor.
  pub(super) fn dispatch_reading(&self, data: &[i32]) {
    let callback = self.callback.lock().expect("Callback lock is never poisoned");
    match &*callback {
      Some(callback) => callback(data),
      None => warn!(
        "Dropping reading for sensor {} without a subscription callback.",
        self.inner.index()
      ),
    }
  }
}

/// The sensors a device can expose. Match on the variant for reads and
/// subscriptions.
#[derive(Clone)]
pub enum ButtplugClientSensor {
  BatteryLevel(BatteryLevelSensor),
  RssiLevel(RssiLevelSensor),
  Generic(GenericSensor),
  Subscribable(SubscribableSensor),
}

impl ButtplugClientSensor {
  pub fn index(&self) -> u32 {
    match self {
      ButtplugClientSensor::BatteryLevel(sensor) => sensor.index(),
      ButtplugClientSensor::RssiLevel(sensor) => sensor.index(),
      ButtplugClientSensor::Generic(sensor) => sensor.index(),
      ButtplugClientSensor::Subscribable(sensor) => sensor.index(),
    }
  }

  pub fn sensor_type(&self) -> SensorType {
    match self {
      ButtplugClientSensor::BatteryLevel(_) => SensorType::Battery,
      ButtplugClientSensor::RssiLevel(_) => SensorType::RSSI,
      ButtplugClientSensor::Generic(sensor) => sensor.sensor_type(),
      ButtplugClientSensor::Subscribable(sensor) => sensor.sensor_type(),
    }
  }

  pub fn subscribable(&self) -> bool {
    matches!(self, ButtplugClientSensor::Subscribable(_))
  }
}
