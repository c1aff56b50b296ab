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

/// Deprecated v0 Fleshlight Launch (firmware 1.2) specific command.
#[derive(
  Debug, Default, ButtplugDeviceMessage, ButtplugMessageFinalizer, PartialEq, Eq, Clone, CopyGetters,
)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct FleshlightLaunchFW12Cmd {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceIndex"))]
  device_index: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "Position"))]
  #[getset(get_copy = "pub")]
  position: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "Speed"))]
  #[getset(get_copy = "pub")]
  speed: u32,
}

impl FleshlightLaunchFW12Cmd {
  pub fn new(device_index: u32, position: u32, speed: u32) -> Self {
    Self {
      id: 1,
      device_index,
      position,
      speed,
    }
  }
}

impl ButtplugMessageValidator for FleshlightLaunchFW12Cmd {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_not_system_id(self.id)?;
    if self.position > 99 || self.speed > 99 {
      Err(ButtplugMessageError::ValidationError(format!(
        "FleshlightLaunchFW12Cmd position ({}) and speed ({}) for device {} must be between 0 and 99",
        self.position, self.speed, self.device_index
      )))
    } else {
      Result::Ok(())
    }
  }
}
