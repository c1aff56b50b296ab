// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

use super::*;
use getset::CopyGetters;
#[cfg(feature = "serialize-json")]
use serde::{Deserialize, Serialize};

/// v2 RSSI response. Level is expressed in dB, so it will usually be negative.
#[derive(
  Debug,
  ButtplugDeviceMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  PartialEq,
  Eq,
  Clone,
  CopyGetters,
)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct RSSILevelReading {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceIndex"))]
  device_index: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "RSSILevel"))]
  #[getset(get_copy = "pub")]
  rssi_level: i32,
}

impl RSSILevelReading {
  pub fn new(device_index: u32, rssi_level: i32) -> Self {
    Self {
      id: 1,
      device_index,
      rssi_level,
    }
  }
}

#[cfg(feature = "serialize-json")]
#[cfg(test)]
mod test {
  use super::RSSILevelReading;

  // The RSSI acronym keeps its casing on the wire, both in the message name
  // and the level field.
  #[test]
  fn test_rssi_field_casing() {
    let reading = RSSILevelReading::new(1, -40);
    let js = serde_json::to_string(&reading).expect("Infallible serialization");
    assert_eq!(js, "{\"Id\":1,\"DeviceIndex\":1,\"RSSILevel\":-40}");
  }
}
