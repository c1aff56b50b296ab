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

/// Raw byte read from a named device endpoint, added in spec v2.
#[derive(
  Debug,
  Default,
  ButtplugDeviceMessage,
  ButtplugMessageFinalizer,
  PartialEq,
  Eq,
  Clone,
  Getters,
  CopyGetters,
)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct RawReadCmd {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceIndex"))]
  device_index: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "Endpoint"))]
  #[getset(get = "pub")]
  endpoint: String,
  #[cfg_attr(feature = "serialize-json", serde(rename = "ExpectedLength"))]
  #[getset(get_copy = "pub")]
  expected_length: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "WaitForData"))]
  #[getset(get_copy = "pub")]
  wait_for_data: bool,
}

impl RawReadCmd {
  pub fn new(
    device_index: u32,
    endpoint: &str,
    expected_length: u32,
    wait_for_data: bool,
  ) -> Self {
    Self {
      id: 1,
      device_index,
      endpoint: endpoint.to_string(),
      expected_length,
      wait_for_data,
    }
  }
}

impl ButtplugMessageValidator for RawReadCmd {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_not_system_id(self.id)
  }
}
