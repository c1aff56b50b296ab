// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

use super::*;
use getset::{CopyGetters, Getters};
#[cfg(feature = "serialize-json")]
use serde::{Deserialize, Serialize};

/// Notification that a device has been found and connected to the server.
#[derive(ButtplugMessage, ButtplugMessageFinalizer, Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceAddedV0 {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceIndex"))]
  #[getset(get_copy = "pub")]
  device_index: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceName"))]
  #[getset(get = "pub")]
  device_name: String,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceMessages"))]
  #[getset(get = "pub")]
  device_messages: Vec<String>,
}

impl DeviceAddedV0 {
  pub fn new(device_index: u32, device_name: &str, device_messages: Vec<String>) -> Self {
    Self {
      id: 0,
      device_index,
      device_name: device_name.to_owned(),
      device_messages,
    }
  }
}

impl ButtplugMessageValidator for DeviceAddedV0 {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_system_id(self.id)
  }
}

impl From<DeviceAddedV0> for DeviceMessageInfoV0 {
  fn from(msg: DeviceAddedV0) -> Self {
    DeviceMessageInfoV0::new(msg.device_index, &msg.device_name, msg.device_messages)
  }
}

#[derive(ButtplugMessage, ButtplugMessageFinalizer, Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceAddedV1 {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceIndex"))]
  #[getset(get_copy = "pub")]
  device_index: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceName"))]
  #[getset(get = "pub")]
  device_name: String,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceMessages"))]
  #[getset(get = "pub")]
  device_messages: DeviceMessageAttributesMapV1,
}

impl DeviceAddedV1 {
  pub fn new(
    device_index: u32,
    device_name: &str,
    device_messages: DeviceMessageAttributesMapV1,
  ) -> Self {
    Self {
      id: 0,
      device_index,
      device_name: device_name.to_owned(),
      device_messages,
    }
  }
}

impl ButtplugMessageValidator for DeviceAddedV1 {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_system_id(self.id)
  }
}

impl From<DeviceAddedV1> for DeviceMessageInfoV1 {
  fn from(msg: DeviceAddedV1) -> Self {
    DeviceMessageInfoV1::new(msg.device_index, &msg.device_name, msg.device_messages)
  }
}

#[derive(ButtplugMessage, ButtplugMessageFinalizer, Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceAddedV2 {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceIndex"))]
  #[getset(get_copy = "pub")]
  device_index: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceName"))]
  #[getset(get = "pub")]
  device_name: String,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceMessages"))]
  #[getset(get = "pub")]
  device_messages: DeviceMessageAttributesMapV2,
}

impl DeviceAddedV2 {
  pub fn new(
    device_index: u32,
    device_name: &str,
    device_messages: DeviceMessageAttributesMapV2,
  ) -> Self {
    Self {
      id: 0,
      device_index,
      device_name: device_name.to_owned(),
      device_messages,
    }
  }
}

impl ButtplugMessageValidator for DeviceAddedV2 {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_system_id(self.id)
  }
}

impl From<DeviceAddedV2> for DeviceMessageInfoV2 {
  fn from(msg: DeviceAddedV2) -> Self {
    DeviceMessageInfoV2::new(msg.device_index, &msg.device_name, msg.device_messages)
  }
}

#[derive(ButtplugMessage, ButtplugMessageFinalizer, Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceAddedV3 {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceIndex"))]
  #[getset(get_copy = "pub")]
  device_index: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceName"))]
  #[getset(get = "pub")]
  device_name: String,
  #[cfg_attr(
    feature = "serialize-json",
    serde(rename = "DeviceDisplayName", skip_serializing_if = "Option::is_none", default)
  )]
  #[getset(get = "pub")]
  device_display_name: Option<String>,
  #[cfg_attr(
    feature = "serialize-json",
    serde(
      rename = "DeviceMessageTimingGap",
      skip_serializing_if = "Option::is_none",
      default
    )
  )]
  #[getset(get = "pub")]
  device_message_timing_gap: Option<u32>,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceMessages"))]
  #[getset(get = "pub")]
  device_messages: DeviceMessageAttributesMapV3,
}

impl DeviceAddedV3 {
  pub fn new(
    device_index: u32,
    device_name: &str,
    device_display_name: &Option<String>,
    device_message_timing_gap: &Option<u32>,
    device_messages: DeviceMessageAttributesMapV3,
  ) -> Self {
    Self {
      id: 0,
      device_index,
      device_name: device_name.to_owned(),
      device_display_name: device_display_name.clone(),
      device_message_timing_gap: *device_message_timing_gap,
      device_messages,
    }
  }
}

impl ButtplugMessageValidator for DeviceAddedV3 {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_system_id(self.id)
  }
}

impl From<DeviceAddedV3> for DeviceMessageInfoV3 {
  fn from(msg: DeviceAddedV3) -> Self {
    DeviceMessageInfoV3::new(
      msg.device_index,
      &msg.device_name,
      &msg.device_display_name,
      &msg.device_message_timing_gap,
      msg.device_messages,
    )
  }
}

/// A DeviceAdded event at whichever spec version the session negotiated.
#[derive(Debug, ButtplugMessage, ButtplugMessageValidator, ButtplugMessageFinalizer, PartialEq, Eq, Clone)]
pub enum DeviceAdded {
  V0(DeviceAddedV0),
  V1(DeviceAddedV1),
  V2(DeviceAddedV2),
  V3(DeviceAddedV3),
}

impl DeviceAdded {
  pub fn device_index(&self) -> u32 {
    match self {
      DeviceAdded::V0(msg) => msg.device_index(),
      DeviceAdded::V1(msg) => msg.device_index(),
      DeviceAdded::V2(msg) => msg.device_index(),
      DeviceAdded::V3(msg) => msg.device_index(),
    }
  }

  pub fn device_name(&self) -> &String {
    match self {
      DeviceAdded::V0(msg) => msg.device_name(),
      DeviceAdded::V1(msg) => msg.device_name(),
      DeviceAdded::V2(msg) => msg.device_name(),
      DeviceAdded::V3(msg) => msg.device_name(),
    }
  }
}

impl From<DeviceAdded> for DeviceMessageInfo {
  fn from(msg: DeviceAdded) -> Self {
    match msg {
      DeviceAdded::V0(msg) => DeviceMessageInfo::V0(msg.into()),
      DeviceAdded::V1(msg) => DeviceMessageInfo::V1(msg.into()),
      DeviceAdded::V2(msg) => DeviceMessageInfo::V2(msg.into()),
      DeviceAdded::V3(msg) => DeviceMessageInfo::V3(msg.into()),
    }
  }
}
