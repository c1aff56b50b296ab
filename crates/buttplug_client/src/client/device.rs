// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Representation and management of devices connected to the server.

use super::{
  create_boxed_future_client_error,
  device_actuator::{
    ButtplugClientActuator,
    FleshlightLaunchFW12Actuator,
    KiirooActuator,
    LinearActuator,
    LovenseActuator,
    RotatoryActuator,
    ScalarActuator,
    SingleMotorVibrateActuator,
    VibrateActuator,
    VorzeA10CycloneActuator,
  },
  device_sensor::{
    BatteryLevelSensor,
    ButtplugClientSensor,
    GenericSensor,
    RssiLevelSensor,
    SubscribableSensor,
  },
  ButtplugClientMessageSender,
  ButtplugClientResultFuture,
};
use crate::core::{
  errors::{ButtplugDeviceError, ButtplugError, ButtplugMessageError},
  message::{
    ActuatorType,
    ButtplugClientMessage,
    ButtplugServerMessage,
    DeviceMessageInfo,
    SensorReading,
    SensorType,
    StopDeviceCmd,
  },
};
use instant::Instant;
use std::{
  fmt,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  time::Duration,
};
use tokio::sync::Mutex;

/// Per-device message gate all device parts send through: refuses commands to
/// removed devices and enforces the minimum timing gap between consecutive
/// commands when the server advertised one.
pub(super) struct DeviceCommandSender {
  device_index: u32,
  removed: Arc<AtomicBool>,
  message_timing_gap: Option<Duration>,
  last_command: Arc<Mutex<Option<Instant>>>,
  message_sender: Arc<ButtplugClientMessageSender>,
}

impl DeviceCommandSender {
  pub(super) fn new(
    device_index: u32,
    message_timing_gap_ms: Option<u32>,
    removed: Arc<AtomicBool>,
    message_sender: Arc<ButtplugClientMessageSender>,
  ) -> Self {
    Self {
      device_index,
      removed,
      message_timing_gap: message_timing_gap_ms.map(|gap| Duration::from_millis(gap as u64)),
      last_command: Arc::new(Mutex::new(None)),
      message_sender,
    }
  }

  pub(super) fn device_index(&self) -> u32 {
    self.device_index
  }

  pub(super) fn send_message(
    &self,
    msg: ButtplugClientMessage,
  ) -> ButtplugClientResultFuture<ButtplugServerMessage> {
    let device_index = self.device_index;
    let removed = self.removed.clone();
    let message_timing_gap = self.message_timing_gap;
    let last_command = self.last_command.clone();
    let message_sender = self.message_sender.clone();
    Box::pin(async move {
      if removed.load(Ordering::SeqCst) {
        return Err(
          ButtplugError::from(ButtplugDeviceError::DeviceNotAvailable(device_index)).into(),
        );
      }
      if let Some(gap) = message_timing_gap {
        // Lock held across the sleep so concurrent commands queue behind
        // each other, each spaced out by at least the gap.
        let mut last_command = last_command.lock().await;
        if let Some(last) = *last_command {
          let elapsed = last.elapsed();
          if elapsed < gap {
            tokio::time::sleep(gap - elapsed).await;
          }
        }
        *last_command = Some(Instant::now());
      }
      message_sender.send_message(msg).await
    })
  }

  pub(super) fn send_message_expect_ok(
    &self,
    msg: ButtplugClientMessage,
  ) -> ButtplugClientResultFuture {
    let send_fut = self.send_message(msg);
    Box::pin(async move {
      match send_fut.await? {
        ButtplugServerMessage::Ok(_) => Ok(()),
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

/// Client side representation of a device connected to the server.
///
/// Built from the capability map the server advertised, at the spec version
/// the session negotiated. Capabilities are projected into actuator and
/// sensor handles; whatever the projection doesn't recognize is logged and
/// accepted.
pub struct ButtplugClientDevice {
  name: String,
  display_name: Option<String>,
  index: u32,
  message_timing_gap: Option<u32>,
  stop_supported: bool,
  actuators: Vec<ButtplugClientActuator>,
  linear_actuators: Vec<LinearActuator>,
  rotatory_actuators: Vec<RotatoryActuator>,
  sensors: Vec<ButtplugClientSensor>,
  removed: Arc<AtomicBool>,
  command_sender: Arc<DeviceCommandSender>,
}

impl fmt::Debug for ButtplugClientDevice {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("ButtplugClientDevice")
      .field("name", &self.name)
      .field("index", &self.index)
      .field("removed", &self.removed())
      .finish()
  }
}

impl fmt::Display for ButtplugClientDevice {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match &self.display_name {
      Some(display_name) => write!(f, "{} ({})", display_name, self.name),
      None => write!(f, "{}", self.name),
    }
  }
}

fn claim_name(messages: &mut Vec<String>, name: &str) -> bool {
  match messages.iter().position(|message| message == name) {
    Some(position) => {
      messages.remove(position);
      true
    }
    None => false,
  }
}

impl ButtplugClientDevice {
  /// Builds a device from a server device entry, claiming capability map
  /// entries into actuator/sensor handles per the spec version the entry was
  /// decoded at.
  pub(super) fn from_device_message_info(
    info: DeviceMessageInfo,
    message_sender: &Arc<ButtplugClientMessageSender>,
  ) -> Self {
    let index = info.device_index();
    let name = info.device_name().clone();
    let (display_name, message_timing_gap) = match &info {
      DeviceMessageInfo::V3(info) => (
        info.device_display_name().clone(),
        *info.device_message_timing_gap(),
      ),
      _ => (None, None),
    };
    let removed = Arc::new(AtomicBool::new(false));
    let command_sender = Arc::new(DeviceCommandSender::new(
      index,
      message_timing_gap,
      removed.clone(),
      message_sender.clone(),
    ));

    let mut stop_supported = false;
    let mut actuators = vec![];
    let mut linear_actuators = vec![];
    let mut rotatory_actuators = vec![];
    let mut sensors = vec![];

    match info {
      DeviceMessageInfo::V0(info) => {
        // v0 advertises capabilities as a plain message name list.
        let mut messages = info.device_messages().clone();
        stop_supported = claim_name(&mut messages, "StopDeviceCmd");
        if claim_name(&mut messages, "SingleMotorVibrateCmd") {
          actuators.push(ButtplugClientActuator::SingleMotorVibrate(
            SingleMotorVibrateActuator::new(actuators.len() as u32, &command_sender),
          ));
        }
        if claim_name(&mut messages, "KiirooCmd") {
          actuators.push(ButtplugClientActuator::Kiiroo(KiirooActuator::new(
            actuators.len() as u32,
            &command_sender,
          )));
        }
        if claim_name(&mut messages, "FleshlightLaunchFW12Cmd") {
          actuators.push(ButtplugClientActuator::FleshlightLaunchFW12(
            FleshlightLaunchFW12Actuator::new(actuators.len() as u32, &command_sender),
          ));
        }
        if claim_name(&mut messages, "LovenseCmd") {
          actuators.push(ButtplugClientActuator::Lovense(LovenseActuator::new(
            actuators.len() as u32,
            &command_sender,
          )));
        }
        if claim_name(&mut messages, "VorzeA10CycloneCmd") {
          actuators.push(ButtplugClientActuator::VorzeA10Cyclone(
            VorzeA10CycloneActuator::new(actuators.len() as u32, &command_sender),
          ));
        }
        for message in messages {
          debug!(
            "Unknown message type accepted by device {} (index: {}): {}",
            name, index, message
          );
        }
      }
      DeviceMessageInfo::V1(info) => {
        let mut messages = info.device_messages().clone();
        stop_supported = messages.remove("StopDeviceCmd").is_some();
        if let Some(attributes) = messages.remove("VibrateCmd") {
          for i in 0..attributes.feature_count().unwrap_or_default() {
            actuators.push(ButtplugClientActuator::Vibrate(VibrateActuator::new(
              i,
              None,
              &command_sender,
            )));
          }
        }
        if let Some(attributes) = messages.remove("LinearCmd") {
          for i in 0..attributes.feature_count().unwrap_or_default() {
            linear_actuators.push(LinearActuator::new(i, "", None, &command_sender));
          }
        }
        if let Some(attributes) = messages.remove("RotateCmd") {
          for i in 0..attributes.feature_count().unwrap_or_default() {
            rotatory_actuators.push(RotatoryActuator::new(i, "", None, &command_sender));
          }
        }
        for message in messages.keys() {
          debug!(
            "Unknown message type accepted by device {} (index: {}): {}",
            name, index, message
          );
        }
      }
      DeviceMessageInfo::V2(info) => {
        let mut messages = info.device_messages().clone();
        stop_supported = messages.remove("StopDeviceCmd").is_some();
        if let Some(attributes) = messages.remove("VibrateCmd") {
          for i in 0..attributes.feature_count().unwrap_or_default() {
            let step_count = attributes
              .step_count()
              .as_ref()
              .and_then(|steps| steps.get(i as usize))
              .copied();
            actuators.push(ButtplugClientActuator::Vibrate(VibrateActuator::new(
              i,
              step_count,
              &command_sender,
            )));
          }
        }
        if let Some(attributes) = messages.remove("LinearCmd") {
          for i in 0..attributes.feature_count().unwrap_or_default() {
            let step_count = attributes
              .step_count()
              .as_ref()
              .and_then(|steps| steps.get(i as usize))
              .copied();
            linear_actuators.push(LinearActuator::new(i, "", step_count, &command_sender));
          }
        }
        if let Some(attributes) = messages.remove("RotateCmd") {
          for i in 0..attributes.feature_count().unwrap_or_default() {
            let step_count = attributes
              .step_count()
              .as_ref()
              .and_then(|steps| steps.get(i as usize))
              .copied();
            rotatory_actuators.push(RotatoryActuator::new(i, "", step_count, &command_sender));
          }
        }
        // Battery and RSSI sensors get fixed local indexes 0 and 1.
        if messages.remove("BatteryLevelCmd").is_some() {
          sensors.push(ButtplugClientSensor::BatteryLevel(BatteryLevelSensor::new(
            0,
            &command_sender,
          )));
        }
        if messages.remove("RSSILevelCmd").is_some() {
          sensors.push(ButtplugClientSensor::RssiLevel(RssiLevelSensor::new(
            1,
            &command_sender,
          )));
        }
        for message in messages.keys() {
          debug!(
            "Unknown message type accepted by device {} (index: {}): {}",
            name, index, message
          );
        }
      }
      DeviceMessageInfo::V3(info) => {
        let mut messages = info.device_messages().clone();
        stop_supported = messages.remove("StopDeviceCmd").is_some();
        for (i, attributes) in messages.remove("ScalarCmd").unwrap_or_default().iter().enumerate() {
          actuators.push(ButtplugClientActuator::Scalar(ScalarActuator::new(
            i as u32,
            &attributes.feature_descriptor().clone().unwrap_or_default(),
            attributes.actuator_type().unwrap_or(ActuatorType::Unknown),
            attributes.step_count(),
            &command_sender,
          )));
        }
        for (i, attributes) in messages.remove("LinearCmd").unwrap_or_default().iter().enumerate() {
          linear_actuators.push(LinearActuator::new(
            i as u32,
            &attributes.feature_descriptor().clone().unwrap_or_default(),
            attributes.step_count(),
            &command_sender,
          ));
        }
        for (i, attributes) in messages.remove("RotateCmd").unwrap_or_default().iter().enumerate() {
          rotatory_actuators.push(RotatoryActuator::new(
            i as u32,
            &attributes.feature_descriptor().clone().unwrap_or_default(),
            attributes.step_count(),
            &command_sender,
          ));
        }
        for (i, attributes) in messages
          .remove("SensorReadCmd")
          .unwrap_or_default()
          .iter()
          .enumerate()
        {
          sensors.push(ButtplugClientSensor::Generic(GenericSensor::new(
            i as u32,
            &attributes.feature_descriptor().clone().unwrap_or_default(),
            attributes.sensor_type().unwrap_or(SensorType::Unknown),
            attributes.sensor_range().clone().unwrap_or_default(),
            &command_sender,
          )));
        }
        // Subscribable sensors are the subset of read sensors the server also
        // lists under SensorSubscribeCmd, matched by descriptor and type.
        for attributes in messages.remove("SensorSubscribeCmd").unwrap_or_default() {
          let descriptor = attributes.feature_descriptor().clone().unwrap_or_default();
          let sensor_type = attributes.sensor_type().unwrap_or(SensorType::Unknown);
          let position = sensors.iter().position(|slot| {
            matches!(slot, ButtplugClientSensor::Generic(sensor)
              if *sensor.descriptor() == descriptor && sensor.sensor_type() == sensor_type)
          });
          match position {
            Some(position) => {
              if let ButtplugClientSensor::Generic(sensor) = &sensors[position] {
                sensors[position] =
                  ButtplugClientSensor::Subscribable(SubscribableSensor::from_generic(sensor));
              }
            }
            None => error!(
              "Received a subscribable sensor that was not previously defined as a sensor \
               (descriptor: {}, type: {})",
              descriptor, sensor_type
            ),
          }
        }
        for message in messages.keys() {
          debug!(
            "Unknown message type accepted by device {} (index: {}): {}",
            name, index, message
          );
        }
      }
    }

    Self {
      name,
      display_name,
      index,
      message_timing_gap,
      stop_supported,
      actuators,
      linear_actuators,
      rotatory_actuators,
      sensors,
      removed,
      command_sender,
    }
  }

  pub fn name(&self) -> &String {
    &self.name
  }

  /// User-set display name from the server's device configuration, if any.
  pub fn display_name(&self) -> &Option<String> {
    &self.display_name
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  /// Minimum time in ms the client keeps between consecutive commands to this
  /// device, when the server advertised one.
  pub fn message_timing_gap(&self) -> Option<u32> {
    self.message_timing_gap
  }

  /// True once the server has removed the device. Handles may outlive
  /// removal, but their operations will fail.
  pub fn removed(&self) -> bool {
    self.removed.load(Ordering::SeqCst)
  }

  pub fn stop_supported(&self) -> bool {
    self.stop_supported
  }

  pub fn actuators(&self) -> &Vec<ButtplugClientActuator> {
    &self.actuators
  }

  pub fn linear_actuators(&self) -> &Vec<LinearActuator> {
    &self.linear_actuators
  }

  pub fn rotatory_actuators(&self) -> &Vec<RotatoryActuator> {
    &self.rotatory_actuators
  }

  pub fn sensors(&self) -> &Vec<ButtplugClientSensor> {
    &self.sensors
  }

  /// Stops whatever the device is currently doing.
  pub fn stop(&self) -> ButtplugClientResultFuture {
    if !self.stop_supported {
      return create_boxed_future_client_error(
        ButtplugDeviceError::UnsupportedCommand(self.index, "stop device".to_owned()).into(),
      );
    }
    debug!("Sending stop command to device {} (index: {})", self, self.index);
    self
      .command_sender
      .send_message_expect_ok(StopDeviceCmd::new(self.index).into())
  }

  pub(super) fn set_removed(&self) {
    self.removed.store(true, Ordering::SeqCst);
  }

  /// Routes a server initiated sensor reading to the matching subscription
  /// callback. Readings for unknown or unsubscribable sensor slots are logged
  /// and dropped.
  pub(super) fn handle_sensor_reading(&self, msg: &SensorReading) {
    match self.sensors.get(msg.sensor_index() as usize) {
      Some(ButtplugClientSensor::Subscribable(sensor)) => sensor.dispatch_reading(msg.data()),
      Some(_) => error!(
        "Received data from a sensor which is not subscribable: {}, device: {}",
        msg.sensor_index(),
        self.index
      ),
      None => error!(
        "Received data from an unknown sensor: {}, device: {}",
        msg.sensor_index(),
        self.index
      ),
    }
  }
}
