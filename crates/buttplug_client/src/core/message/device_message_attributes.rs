// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Per-version shapes of the capability map servers attach to DeviceAdded and
//! DeviceList messages. The maps stay keyed by wire message name so unclaimed
//! entries survive parsing and can be logged during device construction.

#[cfg(feature = "serialize-json")]
use crate::util::range_serialize::{
  option_range_sequence_deserialize, option_range_sequence_serialize,
};
use getset::{CopyGetters, Getters};
#[cfg(feature = "serialize-json")]
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, ops::RangeInclusive};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub enum ActuatorType {
  Unknown,
  Vibrate,
  // Single direction rotation speed
  Rotate,
  Oscillate,
  Constrict,
  Inflate,
  // For instances where we specify a position to move to ASAP. Usually servos.
  Position,
}

#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub enum SensorType {
  #[default]
  Unknown,
  Battery,
  RSSI,
  Button,
  Pressure,
}

/// v1 capability attributes: an optional feature count per message type.
#[derive(Debug, Default, Clone, PartialEq, Eq, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceMessageAttributesV1 {
  #[cfg_attr(
    feature = "serialize-json",
    serde(rename = "FeatureCount", skip_serializing_if = "Option::is_none", default)
  )]
  #[getset(get_copy = "pub")]
  feature_count: Option<u32>,
}

impl DeviceMessageAttributesV1 {
  pub fn new(feature_count: Option<u32>) -> Self {
    Self { feature_count }
  }
}

/// v2 capability attributes: feature count plus per-feature step counts.
#[derive(Debug, Default, Clone, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceMessageAttributesV2 {
  #[cfg_attr(
    feature = "serialize-json",
    serde(rename = "FeatureCount", skip_serializing_if = "Option::is_none", default)
  )]
  #[getset(get_copy = "pub")]
  feature_count: Option<u32>,
  #[cfg_attr(
    feature = "serialize-json",
    serde(rename = "StepCount", skip_serializing_if = "Option::is_none", default)
  )]
  #[getset(get = "pub")]
  step_count: Option<Vec<u32>>,
}

impl DeviceMessageAttributesV2 {
  pub fn new(feature_count: Option<u32>, step_count: Option<Vec<u32>>) -> Self {
    Self {
      feature_count,
      step_count,
    }
  }
}

/// v3 capability attributes: one entry per feature, carrying descriptor,
/// actuator/sensor typing, step counts and sensor ranges.
#[derive(Debug, Default, Clone, PartialEq, Eq, Getters, CopyGetters)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct DeviceMessageAttributesV3 {
  #[cfg_attr(
    feature = "serialize-json",
    serde(
      rename = "FeatureDescriptor",
      skip_serializing_if = "Option::is_none",
      default
    )
  )]
  #[getset(get = "pub")]
  feature_descriptor: Option<String>,
  #[cfg_attr(
    feature = "serialize-json",
    serde(rename = "StepCount", skip_serializing_if = "Option::is_none", default)
  )]
  #[getset(get_copy = "pub")]
  step_count: Option<u32>,
  #[cfg_attr(
    feature = "serialize-json",
    serde(rename = "ActuatorType", skip_serializing_if = "Option::is_none", default)
  )]
  #[getset(get_copy = "pub")]
  actuator_type: Option<ActuatorType>,
  #[cfg_attr(
    feature = "serialize-json",
    serde(rename = "SensorType", skip_serializing_if = "Option::is_none", default)
  )]
  #[getset(get_copy = "pub")]
  sensor_type: Option<SensorType>,
  #[cfg_attr(
    feature = "serialize-json",
    serde(
      rename = "SensorRange",
      skip_serializing_if = "Option::is_none",
      default,
      serialize_with = "option_range_sequence_serialize",
      deserialize_with = "option_range_sequence_deserialize"
    )
  )]
  #[getset(get = "pub")]
  sensor_range: Option<Vec<RangeInclusive<i32>>>,
  #[cfg_attr(
    feature = "serialize-json",
    serde(rename = "Endpoint", skip_serializing_if = "Option::is_none", default)
  )]
  #[getset(get = "pub")]
  endpoint: Option<Vec<String>>,
}

/// Builder-ish constructors for the handful of shapes tests and servers
/// actually produce.
impl DeviceMessageAttributesV3 {
  pub fn new_actuator(
    feature_descriptor: &str,
    step_count: u32,
    actuator_type: ActuatorType,
  ) -> Self {
    Self {
      feature_descriptor: Some(feature_descriptor.to_owned()),
      step_count: Some(step_count),
      actuator_type: Some(actuator_type),
      ..Default::default()
    }
  }

  pub fn new_sensor(
    feature_descriptor: &str,
    sensor_type: SensorType,
    sensor_range: Vec<RangeInclusive<i32>>,
  ) -> Self {
    Self {
      feature_descriptor: Some(feature_descriptor.to_owned()),
      sensor_type: Some(sensor_type),
      sensor_range: Some(sensor_range),
      ..Default::default()
    }
  }
}

/// Capability maps, keyed by wire message name ("VibrateCmd", "ScalarCmd"...).
pub type DeviceMessageAttributesMapV1 = HashMap<String, DeviceMessageAttributesV1>;
pub type DeviceMessageAttributesMapV2 = HashMap<String, DeviceMessageAttributesV2>;
pub type DeviceMessageAttributesMapV3 = HashMap<String, Vec<DeviceMessageAttributesV3>>;

#[cfg(feature = "serialize-json")]
#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_v3_attribute_map_parsing() {
    let json = r#"
{
  "ScalarCmd": [
    { "FeatureDescriptor": "Clitoral Stimulator", "StepCount": 20, "ActuatorType": "Vibrate" }
  ],
  "SensorReadCmd": [
    { "FeatureDescriptor": "Battery Level", "SensorType": "Battery", "SensorRange": [[0, 100]] }
  ],
  "StopDeviceCmd": [{}],
  "FutureCmd": [{}]
}
    "#;
    let map: DeviceMessageAttributesMapV3 =
      serde_json::from_str(json).expect("Test, assuming infallible.");
    let scalars = &map["ScalarCmd"];
    assert_eq!(scalars.len(), 1);
    assert_eq!(scalars[0].actuator_type(), Some(ActuatorType::Vibrate));
    assert_eq!(scalars[0].step_count(), Some(20));
    let sensors = &map["SensorReadCmd"];
    assert_eq!(sensors[0].sensor_type(), Some(SensorType::Battery));
    assert_eq!(sensors[0].sensor_range(), &Some(vec![0..=100]));
    // Messages we don't know yet still parse; the device layer decides what
    // to do with them.
    assert!(map.contains_key("FutureCmd"));
  }

  #[test]
  fn test_v2_attribute_parsing() {
    let json = r#"{ "VibrateCmd": { "FeatureCount": 2, "StepCount": [20, 10] } }"#;
    let map: DeviceMessageAttributesMapV2 =
      serde_json::from_str(json).expect("Test, assuming infallible.");
    assert_eq!(map["VibrateCmd"].feature_count(), Some(2));
    assert_eq!(map["VibrateCmd"].step_count(), &Some(vec![20, 10]));
  }
}
