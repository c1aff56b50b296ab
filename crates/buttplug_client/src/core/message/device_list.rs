// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

use super::*;
use getset::Getters;
#[cfg(feature = "serialize-json")]
use serde::{Deserialize, Serialize};

/// Reply to RequestDeviceList, listing all currently connected devices.
#[derive(Debug, ButtplugMessage, ButtplugMessageFinalizer, PartialEq, Eq, Clone, Getters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceListV0 {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "Devices"))]
  #[getset(get = "pub")]
  devices: Vec<DeviceMessageInfoV0>,
}

impl DeviceListV0 {
  pub fn new(devices: Vec<DeviceMessageInfoV0>) -> Self {
    Self { id: 1, devices }
  }
}

impl ButtplugMessageValidator for DeviceListV0 {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_not_system_id(self.id)
  }
}

#[derive(Debug, ButtplugMessage, ButtplugMessageFinalizer, PartialEq, Eq, Clone, Getters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceListV1 {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "Devices"))]
  #[getset(get = "pub")]
  devices: Vec<DeviceMessageInfoV1>,
}

impl DeviceListV1 {
  pub fn new(devices: Vec<DeviceMessageInfoV1>) -> Self {
    Self { id: 1, devices }
  }
}

impl ButtplugMessageValidator for DeviceListV1 {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_not_system_id(self.id)
  }
}

#[derive(Debug, ButtplugMessage, ButtplugMessageFinalizer, PartialEq, Eq, Clone, Getters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceListV2 {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "Devices"))]
  #[getset(get = "pub")]
  devices: Vec<DeviceMessageInfoV2>,
}

impl DeviceListV2 {
  pub fn new(devices: Vec<DeviceMessageInfoV2>) -> Self {
    Self { id: 1, devices }
  }
}

impl ButtplugMessageValidator for DeviceListV2 {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_not_system_id(self.id)
  }
}

#[derive(Debug, ButtplugMessage, ButtplugMessageFinalizer, PartialEq, Eq, Clone, Getters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceListV3 {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "Devices"))]
  #[getset(get = "pub")]
  devices: Vec<DeviceMessageInfoV3>,
}

impl DeviceListV3 {
  pub fn new(devices: Vec<DeviceMessageInfoV3>) -> Self {
    Self { id: 1, devices }
  }
}

impl ButtplugMessageValidator for DeviceListV3 {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_not_system_id(self.id)
  }
}

/// A DeviceList at whichever spec version the session negotiated.
#[derive(Debug, ButtplugMessage, ButtplugMessageValidator, ButtplugMessageFinalizer, PartialEq, Eq, Clone)]
pub enum DeviceList {
  V0(DeviceListV0),
  V1(DeviceListV1),
  V2(DeviceListV2),
  V3(DeviceListV3),
}

impl DeviceList {
  /// Splits the list into per-device entries for device construction.
  pub fn into_device_infos(self) -> Vec<DeviceMessageInfo> {
    match self {
      DeviceList::V0(msg) => msg.devices.into_iter().map(DeviceMessageInfo::V0).collect(),
      DeviceList::V1(msg) => msg.devices.into_iter().map(DeviceMessageInfo::V1).collect(),
      DeviceList::V2(msg) => msg.devices.into_iter().map(DeviceMessageInfo::V2).collect(),
      DeviceList::V3(msg) => msg.devices.into_iter().map(DeviceMessageInfo::V3).collect(),
    }
  }
}
