// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Substructure of device enumeration messages, one shape per spec version.

use super::*;
use getset::{CopyGetters, Getters};
#[cfg(feature = "serialize-json")]
use serde::{Deserialize, Serialize};

/// v0 device entry: capabilities are just a list of message names.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceMessageInfoV0 {
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

impl DeviceMessageInfoV0 {
  pub fn new(device_index: u32, device_name: &str, device_messages: Vec<String>) -> Self {
    Self {
      device_index,
      device_name: device_name.to_owned(),
      device_messages,
    }
  }
}

/// v1 device entry: message name to attributes (feature count).
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceMessageInfoV1 {
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

impl DeviceMessageInfoV1 {
  pub fn new(
    device_index: u32,
    device_name: &str,
    device_messages: DeviceMessageAttributesMapV1,
  ) -> Self {
    Self {
      device_index,
      device_name: device_name.to_owned(),
      device_messages,
    }
  }
}

/// v2 device entry: attributes gain step counts.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceMessageInfoV2 {
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

impl DeviceMessageInfoV2 {
  pub fn new(
    device_index: u32,
    device_name: &str,
    device_messages: DeviceMessageAttributesMapV2,
  ) -> Self {
    Self {
      device_index,
      device_name: device_name.to_owned(),
      device_messages,
    }
  }
}

/// v3 device entry: attribute lists per message, optional display name and
/// command timing gap.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceMessageInfoV3 {
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

impl DeviceMessageInfoV3 {
  pub fn new(
    device_index: u32,
    device_name: &str,
    device_display_name: &Option<String>,
    device_message_timing_gap: &Option<u32>,
    device_messages: DeviceMessageAttributesMapV3,
  ) -> Self {
    Self {
      device_index,
      device_name: device_name.to_owned(),
      device_display_name: device_display_name.clone(),
      device_message_timing_gap: *device_message_timing_gap,
      device_messages,
    }
  }
}

/// A device entry at whichever spec version the session negotiated. Device
/// construction consumes this, claiming capabilities per version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceMessageInfo {
  V0(DeviceMessageInfoV0),
  V1(DeviceMessageInfoV1),
  V2(DeviceMessageInfoV2),
  V3(DeviceMessageInfoV3),
}

impl DeviceMessageInfo {
  pub fn device_index(&self) -> u32 {
    match self {
      DeviceMessageInfo::V0(info) => info.device_index(),
      DeviceMessageInfo::V1(info) => info.device_index(),
      DeviceMessageInfo::V2(info) => info.device_index(),
      DeviceMessageInfo::V3(info) => info.device_index(),
    }
  }

  pub fn device_name(&self) -> &String {
    match self {
      DeviceMessageInfo::V0(info) => info.device_name(),
      DeviceMessageInfo::V1(info) => info.device_name(),
      DeviceMessageInfo::V2(info) => info.device_name(),
      DeviceMessageInfo::V3(info) => info.device_name(),
    }
  }
}
