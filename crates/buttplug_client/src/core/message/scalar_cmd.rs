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

/// Generic command for setting a level (single magnitude value) of a device
/// feature, annotated with the actuator type it addresses.
#[derive(Debug, PartialEq, Clone, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
#[getset(get_copy = "pub")]
pub struct ScalarSubcommand {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Index"))]
  index: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "Scalar"))]
  scalar: f64,
  #[cfg_attr(feature = "serialize-json", serde(rename = "ActuatorType"))]
  actuator_type: ActuatorType,
}

impl ScalarSubcommand {
  pub fn new(index: u32, scalar: f64, actuator_type: ActuatorType) -> Self {
    Self {
      index,
      scalar,
      actuator_type,
    }
  }
}

#[derive(
  Debug, Default, ButtplugDeviceMessage, ButtplugMessageFinalizer, PartialEq, Clone, Getters,
)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct ScalarCmd {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "DeviceIndex"))]
  device_index: u32,
  #[cfg_attr(feature = "serialize-json", serde(rename = "Scalars"))]
  #[getset(get = "pub")]
  scalars: Vec<ScalarSubcommand>,
}

impl ScalarCmd {
  pub fn new(device_index: u32, scalars: Vec<ScalarSubcommand>) -> Self {
    Self {
      id: 1,
      device_index,
      scalars,
    }
  }
}

impl ButtplugMessageValidator for ScalarCmd {
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    self.is_not_system_id(self.id)?;
    for level in &self.scalars {
      self.is_in_command_range(
        level.scalar(),
        format!(
          "Level {} for ScalarCmd index {} is invalid. Level should be a value between 0.0 and 1.0",
          level.scalar(),
          level.index()
        ),
      )?;
    }
    Result::Ok(())
  }
}

#[cfg(feature = "serialize-json")]
#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_scalar_cmd_wire_format() {
    let cmd = ScalarCmd::new(
      0,
      vec![
        ScalarSubcommand::new(0, 0.5, ActuatorType::Vibrate),
        ScalarSubcommand::new(1, 1.0, ActuatorType::Inflate),
      ],
    );
    let js = serde_json::to_string(&vec![ButtplugSpecV3ClientMessage::ScalarCmd(cmd)])
      .expect("Infallible serialization");
    assert_eq!(
      js,
      "[{\"ScalarCmd\":{\"Id\":1,\"DeviceIndex\":0,\"Scalars\":[{\"Index\":0,\"Scalar\":0.5,\"ActuatorType\":\"Vibrate\"},{\"Index\":1,\"Scalar\":1.0,\"ActuatorType\":\"Inflate\"}]}}]"
    );
  }
}
