// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Actuator handles: controllable outputs on a device. Each handle serializes
//! the wire command matching the spec version its device was enumerated at.

use super::{device::DeviceCommandSender, ButtplugClientResultFuture};
use crate::core::message::{
  ActuatorType,
  FleshlightLaunchFW12Cmd,
  KiirooCmd,
  LinearCmd,
  LovenseCmd,
  RotateCmd,
  RotationSubcommand,
  ScalarCmd,
  ScalarSubcommand,
  SingleMotorVibrateCmd,
  VectorSubcommand,
  VibrateCmd,
  VibrateSubcommand,
  VorzeA10CycloneCmd,
};
use std::sync::Arc;

/// v0 actuator driven by whole-device SingleMotorVibrateCmds.
#[derive(Clone)]
pub struct SingleMotorVibrateActuator {
  index: u32,
  command_sender: Arc<DeviceCommandSender>,
}

impl SingleMotorVibrateActuator {
  pub(super) fn new(index: u32, command_sender: &Arc<DeviceCommandSender>) -> Self {
    Self {
      index,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn command(&self, speed: f64) -> ButtplugClientResultFuture {
    debug!(
      "Sending vibrate command {} to device {}",
      speed,
      self.command_sender.device_index()
    );
    self.command_sender.send_message_expect_ok(
      SingleMotorVibrateCmd::new(self.command_sender.device_index(), speed).into(),
    )
  }
}

/// v0 actuator driven by Kiiroo specific command strings.
#[derive(Clone)]
pub struct KiirooActuator {
  index: u32,
  command_sender: Arc<DeviceCommandSender>,
}

impl KiirooActuator {
  pub(super) fn new(index: u32, command_sender: &Arc<DeviceCommandSender>) -> Self {
    Self {
      index,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn command(&self, command: &str) -> ButtplugClientResultFuture {
    debug!(
      "Sending Kiiroo command '{}' to device {}",
      command,
      self.command_sender.device_index()
    );
    self
      .command_sender
      .send_message_expect_ok(KiirooCmd::new(self.command_sender.device_index(), command).into())
  }
}

/// v0 actuator for the Fleshlight Launch, firmware 1.2. Position and speed
/// are in the hardware's 0-99 range.
#[derive(Clone)]
pub struct FleshlightLaunchFW12Actuator {
  index: u32,
  command_sender: Arc<DeviceCommandSender>,
}

impl FleshlightLaunchFW12Actuator {
  pub(super) fn new(index: u32, command_sender: &Arc<DeviceCommandSender>) -> Self {
    Self {
      index,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn command(&self, position: u32, speed: u32) -> ButtplugClientResultFuture {
    debug!(
      "Sending Fleshlight command ({}, {}) to device {}",
      position,
      speed,
      self.command_sender.device_index()
    );
    self.command_sender.send_message_expect_ok(
      FleshlightLaunchFW12Cmd::new(self.command_sender.device_index(), position, speed).into(),
    )
  }
}

/// v0 actuator driven by raw Lovense command strings.
#[derive(Clone)]
pub struct LovenseActuator {
  index: u32,
  command_sender: Arc<DeviceCommandSender>,
}

impl LovenseActuator {
  pub(super) fn new(index: u32, command_sender: &Arc<DeviceCommandSender>) -> Self {
    Self {
      index,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn command(&self, command: &str) -> ButtplugClientResultFuture {
    debug!(
      "Sending Lovense command '{}' to device {}",
      command,
      self.command_sender.device_index()
    );
    self
      .command_sender
      .send_message_expect_ok(LovenseCmd::new(self.command_sender.device_index(), command).into())
  }
}

/// v0 actuator for the Vorze A10 Cyclone. Speed is in the hardware's 0-99
/// range.
#[derive(Clone)]
pub struct VorzeA10CycloneActuator {
  index: u32,
  command_sender: Arc<DeviceCommandSender>,
}

impl VorzeA10CycloneActuator {
  pub(super) fn new(index: u32, command_sender: &Arc<DeviceCommandSender>) -> Self {
    Self {
      index,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn command(&self, speed: u32, clockwise: bool) -> ButtplugClientResultFuture {
    debug!(
      "Sending Cyclone command ({}, {}) to device {}",
      speed,
      clockwise,
      self.command_sender.device_index()
    );
    self.command_sender.send_message_expect_ok(
      VorzeA10CycloneCmd::new(self.command_sender.device_index(), speed, clockwise).into(),
    )
  }
}

/// v1/v2 per-feature vibration actuator.
#[derive(Clone)]
pub struct VibrateActuator {
  index: u32,
  step_count: Option<u32>,
  command_sender: Arc<DeviceCommandSender>,
}

impl VibrateActuator {
  pub(super) fn new(
    index: u32,
    step_count: Option<u32>,
    command_sender: &Arc<DeviceCommandSender>,
  ) -> Self {
    Self {
      index,
      step_count,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  /// Discrete speed levels the hardware supports, when advertised (v2+).
  pub fn step_count(&self) -> Option<u32> {
    self.step_count
  }

  pub fn command(&self, speed: f64) -> ButtplugClientResultFuture {
    debug!(
      "Sending vibrate command {} to device {} (actuator: {})",
      speed,
      self.command_sender.device_index(),
      self.index
    );
    self.command_sender.send_message_expect_ok(
      VibrateCmd::new(
        self.command_sender.device_index(),
        vec![VibrateSubcommand::new(self.index, speed)],
      )
      .into(),
    )
  }
}

/// v3 generic actuator, driven by ScalarCmds annotated with the actuator type
/// the server advertised.
#[derive(Clone)]
pub struct ScalarActuator {
  index: u32,
  descriptor: String,
  actuator_type: ActuatorType,
  step_count: Option<u32>,
  command_sender: Arc<DeviceCommandSender>,
}

impl ScalarActuator {
  pub(super) fn new(
    index: u32,
    descriptor: &str,
    actuator_type: ActuatorType,
    step_count: Option<u32>,
    command_sender: &Arc<DeviceCommandSender>,
  ) -> Self {
    Self {
      index,
      descriptor: descriptor.to_owned(),
      actuator_type,
      step_count,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn descriptor(&self) -> &String {
    &self.descriptor
  }

  pub fn actuator_type(&self) -> ActuatorType {
    self.actuator_type
  }

  pub fn step_count(&self) -> Option<u32> {
    self.step_count
  }

  pub fn command(&self, scalar: f64) -> ButtplugClientResultFuture {
    debug!(
      "Sending scalar command {} to device {} (actuator: {})",
      scalar,
      self.command_sender.device_index(),
      self.index
    );
    self.command_sender.send_message_expect_ok(
      ScalarCmd::new(
        self.command_sender.device_index(),
        vec![ScalarSubcommand::new(self.index, scalar, self.actuator_type)],
      )
      .into(),
    )
  }
}

/// Actuator accepting LinearCmds: move to a position over a duration.
#[derive(Clone)]
pub struct LinearActuator {
  index: u32,
  descriptor: String,
  step_count: Option<u32>,
  command_sender: Arc<DeviceCommandSender>,
}

impl LinearActuator {
  pub(super) fn new(
    index: u32,
    descriptor: &str,
    step_count: Option<u32>,
    command_sender: &Arc<DeviceCommandSender>,
  ) -> Self {
    Self {
      index,
      descriptor: descriptor.to_owned(),
      step_count,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn descriptor(&self) -> &String {
    &self.descriptor
  }

  pub fn step_count(&self) -> Option<u32> {
    self.step_count
  }

  /// Moves to `position` (0.0-1.0) over `duration` milliseconds.
  pub fn command(&self, duration: u32, position: f64) -> ButtplugClientResultFuture {
    debug!(
      "Sending linear command ({}ms, {}) to device {} (linear actuator: {})",
      duration,
      position,
      self.command_sender.device_index(),
      self.index
    );
    self.command_sender.send_message_expect_ok(
      LinearCmd::new(
        self.command_sender.device_index(),
        vec![VectorSubcommand::new(self.index, duration, position)],
      )
      .into(),
    )
  }
}

/// Actuator accepting RotateCmds: rotation with speed and direction.
#[derive(Clone)]
pub struct RotatoryActuator {
  index: u32,
  descriptor: String,
  step_count: Option<u32>,
  command_sender: Arc<DeviceCommandSender>,
}

impl RotatoryActuator {
  pub(super) fn new(
    index: u32,
    descriptor: &str,
    step_count: Option<u32>,
    command_sender: &Arc<DeviceCommandSender>,
  ) -> Self {
    Self {
      index,
      descriptor: descriptor.to_owned(),
      step_count,
      command_sender: command_sender.clone(),
    }
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn descriptor(&self) -> &String {
    &self.descriptor
  }

  pub fn step_count(&self) -> Option<u32> {
    self.step_count
  }

  /// Rotates at `speed` (0.0-1.0), clockwise or not.
  pub fn command(&self, speed: f64, clockwise: bool) -> ButtplugClientResultFuture {
    debug!(
      "Sending rotate command ({}, {}) to device {} (rotatory actuator: {})",
      speed,
      clockwise,
      self.command_sender.device_index(),
      self.index
    );
    self.command_sender.send_message_expect_ok(
      RotateCmd::new(
        self.command_sender.device_index(),
        vec![RotationSubcommand::new(self.index, speed, clockwise)],
      )
      .into(),
    )
  }
}

/// The actuators a device can expose, one variant per command family. Match
/// on the variant to get at the family specific command signature.
#[derive(Clone)]
pub enum ButtplugClientActuator {
  SingleMotorVibrate(SingleMotorVibrateActuator),
  Kiiroo(KiirooActuator),
  FleshlightLaunchFW12(FleshlightLaunchFW12Actuator),
  Lovense(LovenseActuator),
  VorzeA10Cyclone(VorzeA10CycloneActuator),
  Vibrate(VibrateActuator),
  Scalar(ScalarActuator),
}

impl ButtplugClientActuator {
  pub fn index(&self) -> u32 {
    match self {
      ButtplugClientActuator::SingleMotorVibrate(actuator) => actuator.index(),
      ButtplugClientActuator::Kiiroo(actuator) => actuator.index(),
      ButtplugClientActuator::FleshlightLaunchFW12(actuator) => actuator.index(),
      ButtplugClientActuator::Lovense(actuator) => actuator.index(),
      ButtplugClientActuator::VorzeA10Cyclone(actuator) => actuator.index(),
      ButtplugClientActuator::Vibrate(actuator) => actuator.index(),
      ButtplugClientActuator::Scalar(actuator) => actuator.index(),
    }
  }

  /// The feature descriptor, for actuator families that carry one (v3).
  pub fn descriptor(&self) -> Option<&String> {
    match self {
      ButtplugClientActuator::Scalar(actuator) => Some(actuator.descriptor()),
      _ => None,
    }
  }

  pub fn step_count(&self) -> Option<u32> {
    match self {
      ButtplugClientActuator::Vibrate(actuator) => actuator.step_count(),
      ButtplugClientActuator::Scalar(actuator) => actuator.step_count(),
      _ => None,
    }
  }
}
