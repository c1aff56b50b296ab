// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Representations of low level [Buttplug Protocol](https://buttplug-spec.docs.buttplug.io)
//! messages
//!
//! The core communication types for the Buttplug protocol. There are structs
//! for each message type, sometimes with multiple versions of the same message
//! relating to different spec versions. The per-spec-version enums
//! ([ButtplugSpecV0ClientMessage] and friends) act as the message catalog: a
//! message name is only decodable under a spec version if that version's enum
//! has a variant for it, and the struct vintage a variant references is the
//! latest (re)definition of that message at or below the version. Messages
//! that were removed in a later spec version simply have no variant there, so
//! decoding them fails.

mod battery_level_cmd;
mod battery_level_reading;
mod device_added;
mod device_list;
mod device_message_attributes;
mod device_message_info;
mod device_removed;
mod error;
mod fleshlight_launch_fw12_cmd;
mod kiiroo_cmd;
mod linear_cmd;
mod lovense_cmd;
mod ok;
mod ping;
mod raw_read_cmd;
mod raw_reading;
mod raw_subscribe_cmd;
mod raw_unsubscribe_cmd;
mod raw_write_cmd;
mod request_device_list;
mod request_server_info;
mod rotate_cmd;
mod rssi_level_cmd;
mod rssi_level_reading;
mod scalar_cmd;
mod scanning_finished;
mod sensor_read_cmd;
mod sensor_reading;
mod sensor_subscribe_cmd;
mod sensor_unsubscribe_cmd;
pub mod serializer;
mod server_info;
mod single_motor_vibrate_cmd;
mod start_scanning;
mod stop_all_devices;
mod stop_device_cmd;
mod stop_scanning;
mod vibrate_cmd;
mod vorze_a10_cyclone_cmd;

pub use battery_level_cmd::BatteryLevelCmd;
pub use battery_level_reading::BatteryLevelReading;
pub use device_added::{DeviceAdded, DeviceAddedV0, DeviceAddedV1, DeviceAddedV2, DeviceAddedV3};
pub use device_list::{DeviceList, DeviceListV0, DeviceListV1, DeviceListV2, DeviceListV3};
pub use device_message_attributes::{
  ActuatorType,
  DeviceMessageAttributesMapV1,
  DeviceMessageAttributesMapV2,
  DeviceMessageAttributesMapV3,
  DeviceMessageAttributesV1,
  DeviceMessageAttributesV2,
  DeviceMessageAttributesV3,
  SensorType,
};
pub use device_message_info::{
  DeviceMessageInfo,
  DeviceMessageInfoV0,
  DeviceMessageInfoV1,
  DeviceMessageInfoV2,
  DeviceMessageInfoV3,
};
pub use device_removed::DeviceRemoved;
pub use error::{Error, ErrorCode};
pub use fleshlight_launch_fw12_cmd::FleshlightLaunchFW12Cmd;
pub use kiiroo_cmd::KiirooCmd;
pub use linear_cmd::{LinearCmd, VectorSubcommand};
pub use lovense_cmd::LovenseCmd;
pub use ok::Ok;
pub use ping::Ping;
pub use raw_read_cmd::RawReadCmd;
pub use raw_reading::RawReading;
pub use raw_subscribe_cmd::RawSubscribeCmd;
pub use raw_unsubscribe_cmd::RawUnsubscribeCmd;
pub use raw_write_cmd::RawWriteCmd;
pub use request_device_list::RequestDeviceList;
pub use request_server_info::{RequestServerInfo, RequestServerInfoV0};
pub use rotate_cmd::{RotateCmd, RotationSubcommand};
pub use rssi_level_cmd::RSSILevelCmd;
pub use rssi_level_reading::RSSILevelReading;
pub use scalar_cmd::{ScalarCmd, ScalarSubcommand};
pub use scanning_finished::ScanningFinished;
pub use sensor_read_cmd::SensorReadCmd;
pub use sensor_reading::SensorReading;
pub use sensor_subscribe_cmd::SensorSubscribeCmd;
pub use sensor_unsubscribe_cmd::SensorUnsubscribeCmd;
pub use server_info::{ServerInfo, ServerInfoV0};
pub use single_motor_vibrate_cmd::SingleMotorVibrateCmd;
pub use start_scanning::StartScanning;
pub use stop_all_devices::StopAllDevices;
pub use stop_device_cmd::StopDeviceCmd;
pub use stop_scanning::StopScanning;
pub use vibrate_cmd::{VibrateCmd, VibrateSubcommand};
pub use vorze_a10_cyclone_cmd::VorzeA10CycloneCmd;

use crate::core::errors::ButtplugMessageError;
#[cfg(feature = "serialize-json")]
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Enum of possible [Buttplug Message
/// Spec](https://buttplug-spec.docs.buttplug.io) versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[repr(u32)]
#[cfg_attr(feature = "serialize-json", derive(Serialize_repr, Deserialize_repr))]
pub enum ButtplugMessageSpecVersion {
  Version0 = 0,
  Version1 = 1,
  Version2 = 2,
  Version3 = 3,
}

/// Message Id for events sent from the server, which are not in response to a
/// client request.
pub const BUTTPLUG_SERVER_EVENT_ID: u32 = 0;

/// The first version of the spec, used as the floor of decode fallback.
pub const BUTTPLUG_FIRST_MESSAGE_SPEC_VERSION: ButtplugMessageSpecVersion =
  ButtplugMessageSpecVersion::Version0;

/// The current latest version of the spec implemented by the library.
pub const BUTTPLUG_CURRENT_MESSAGE_SPEC_VERSION: ButtplugMessageSpecVersion =
  ButtplugMessageSpecVersion::Version3;

pub trait ButtplugMessageFinalizer {
  fn finalize(&mut self) {
  }
}

/// Base trait for all Buttplug Protocol Message Structs. Handles management of
/// message ids, as well as implementing conveinence functions for converting
/// between message structs and various message enums, serialization, etc...
pub trait ButtplugMessage:
  ButtplugMessageValidator + ButtplugMessageFinalizer + Send + Sync + Clone
{
  /// Returns the id number of the message
  fn id(&self) -> u32;
  /// Sets the id number of the message.
  fn set_id(&mut self, id: u32);
  /// True if the message is an event (message id of 0) from the server.
  fn is_server_event(&self) -> bool {
    self.id() == BUTTPLUG_SERVER_EVENT_ID
  }
}

/// Validation function for message contents. Can be run before message is
/// transmitted, as message may be formed and mutated at multiple points in the
/// library, or may need to be checked after deserialization. Message enums will
/// run this on whatever their variant is.
pub trait ButtplugMessageValidator {
  /// Returns () if the message is valid, otherwise returns a message error.
  fn is_valid(&self) -> Result<(), ButtplugMessageError> {
    // By default, return Ok, as many messages won't have any checks.
    Result::Ok(())
  }

  fn is_system_id(&self, id: u32) -> Result<(), ButtplugMessageError> {
    if id == 0 {
      Result::Ok(())
    } else {
      Err(ButtplugMessageError::ValidationError(
        "Message should have id of 0, as it is a system message.".to_string(),
      ))
    }
  }

  fn is_not_system_id(&self, id: u32) -> Result<(), ButtplugMessageError> {
    if id == 0 {
      Err(ButtplugMessageError::ValidationError(
        "Message should not have 0 for an Id. Id of 0 is reserved for system messages.".to_string(),
      ))
    } else {
      Result::Ok(())
    }
  }

  fn is_in_command_range(&self, value: f64, error_msg: String) -> Result<(), ButtplugMessageError> {
    if !(0.0..=1.0).contains(&value) {
      Err(ButtplugMessageError::ValidationError(error_msg))
    } else {
      Result::Ok(())
    }
  }
}

pub trait ButtplugClientMessageType: ButtplugMessage {}
pub trait ButtplugServerMessageType: ButtplugMessage {}

/// Adds device index handling to the [ButtplugMessage] trait.
pub trait ButtplugDeviceMessage: ButtplugMessage {
  fn device_index(&self) -> u32;
  fn set_device_index(&mut self, id: u32);
}

/// Represents all possible messages a client can send to a server, across all
/// spec versions. The serializer projects these into the negotiated version's
/// message set on the way out.
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugClientMessageType,
  FromSpecificButtplugMessage,
)]
pub enum ButtplugClientMessage {
  Ping(Ping),
  // Handshake messages
  RequestServerInfo(RequestServerInfo),
  // Device enumeration messages
  StartScanning(StartScanning),
  StopScanning(StopScanning),
  RequestDeviceList(RequestDeviceList),
  // Generic commands
  StopAllDevices(StopAllDevices),
  StopDeviceCmd(StopDeviceCmd),
  VibrateCmd(VibrateCmd),
  LinearCmd(LinearCmd),
  RotateCmd(RotateCmd),
  ScalarCmd(ScalarCmd),
  RawWriteCmd(RawWriteCmd),
  RawReadCmd(RawReadCmd),
  RawSubscribeCmd(RawSubscribeCmd),
  RawUnsubscribeCmd(RawUnsubscribeCmd),
  // Sensor commands
  BatteryLevelCmd(BatteryLevelCmd),
  RSSILevelCmd(RSSILevelCmd),
  SensorReadCmd(SensorReadCmd),
  SensorSubscribeCmd(SensorSubscribeCmd),
  SensorUnsubscribeCmd(SensorUnsubscribeCmd),
  // Deprecated generic commands
  SingleMotorVibrateCmd(SingleMotorVibrateCmd),
  // Deprecated device specific commands
  FleshlightLaunchFW12Cmd(FleshlightLaunchFW12Cmd),
  LovenseCmd(LovenseCmd),
  KiirooCmd(KiirooCmd),
  VorzeA10CycloneCmd(VorzeA10CycloneCmd),
}

/// Represents all possible messages a server can send to a client, across all
/// spec versions. Multi-vintage payloads the session needs at their wire shape
/// (DeviceList, DeviceAdded) stay wrapped in their version enums.
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugServerMessageType,
  FromSpecificButtplugMessage,
)]
pub enum ButtplugServerMessage {
  // Status messages
  Ok(Ok),
  Error(Error),
  // Handshake messages
  ServerInfo(ServerInfo),
  // Device enumeration messages
  DeviceList(DeviceList),
  DeviceAdded(DeviceAdded),
  DeviceRemoved(DeviceRemoved),
  ScanningFinished(ScanningFinished),
  // Generic commands
  RawReading(RawReading),
  // Sensor reading messages
  SensorReading(SensorReading),
  // Deprecated server messages
  BatteryLevelReading(BatteryLevelReading),
  RSSILevelReading(RSSILevelReading),
}

/// Represents all client-to-server messages in v0 of the Buttplug Spec
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugClientMessageType,
)]
#[cfg_attr(feature = "serialize-json", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtplugSpecV0ClientMessage {
  Ping(Ping),
  // Handshake messages
  RequestServerInfo(RequestServerInfoV0),
  // Device enumeration messages
  StartScanning(StartScanning),
  StopScanning(StopScanning),
  RequestDeviceList(RequestDeviceList),
  // Generic commands
  StopAllDevices(StopAllDevices),
  StopDeviceCmd(StopDeviceCmd),
  // Deprecated generic commands
  SingleMotorVibrateCmd(SingleMotorVibrateCmd),
  // Deprecated device specific commands
  FleshlightLaunchFW12Cmd(FleshlightLaunchFW12Cmd),
  LovenseCmd(LovenseCmd),
  KiirooCmd(KiirooCmd),
  VorzeA10CycloneCmd(VorzeA10CycloneCmd),
}

// The v0 RequestServerInfo loses its MessageVersion field on conversion, so
// this projection is written out instead of derived.
impl TryFrom<ButtplugClientMessage> for ButtplugSpecV0ClientMessage {
  type Error = &'static str;

  fn try_from(msg: ButtplugClientMessage) -> Result<Self, &'static str> {
    match msg {
      ButtplugClientMessage::Ping(msg) => Result::Ok(ButtplugSpecV0ClientMessage::Ping(msg)),
      ButtplugClientMessage::RequestServerInfo(msg) => Result::Ok(
        ButtplugSpecV0ClientMessage::RequestServerInfo(msg.into()),
      ),
      ButtplugClientMessage::StartScanning(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::StartScanning(msg))
      }
      ButtplugClientMessage::StopScanning(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::StopScanning(msg))
      }
      ButtplugClientMessage::RequestDeviceList(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::RequestDeviceList(msg))
      }
      ButtplugClientMessage::StopAllDevices(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::StopAllDevices(msg))
      }
      ButtplugClientMessage::StopDeviceCmd(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::StopDeviceCmd(msg))
      }
      ButtplugClientMessage::SingleMotorVibrateCmd(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::SingleMotorVibrateCmd(msg))
      }
      ButtplugClientMessage::FleshlightLaunchFW12Cmd(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::FleshlightLaunchFW12Cmd(msg))
      }
      ButtplugClientMessage::LovenseCmd(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::LovenseCmd(msg))
      }
      ButtplugClientMessage::KiirooCmd(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::KiirooCmd(msg))
      }
      ButtplugClientMessage::VorzeA10CycloneCmd(msg) => {
        Result::Ok(ButtplugSpecV0ClientMessage::VorzeA10CycloneCmd(msg))
      }
      _ => Err("ButtplugClientMessage cannot be converted to ButtplugSpecV0ClientMessage"),
    }
  }
}

impl From<ButtplugSpecV0ClientMessage> for ButtplugClientMessage {
  fn from(msg: ButtplugSpecV0ClientMessage) -> ButtplugClientMessage {
    match msg {
      ButtplugSpecV0ClientMessage::Ping(msg) => ButtplugClientMessage::Ping(msg),
      ButtplugSpecV0ClientMessage::RequestServerInfo(msg) => {
        // The v0 message carries no version field, so the upgrade pins it.
        let mut out_msg =
          RequestServerInfo::new(msg.client_name(), ButtplugMessageSpecVersion::Version0);
        out_msg.set_id(msg.id());
        ButtplugClientMessage::RequestServerInfo(out_msg)
      }
      ButtplugSpecV0ClientMessage::StartScanning(msg) => ButtplugClientMessage::StartScanning(msg),
      ButtplugSpecV0ClientMessage::StopScanning(msg) => ButtplugClientMessage::StopScanning(msg),
      ButtplugSpecV0ClientMessage::RequestDeviceList(msg) => {
        ButtplugClientMessage::RequestDeviceList(msg)
      }
      ButtplugSpecV0ClientMessage::StopAllDevices(msg) => {
        ButtplugClientMessage::StopAllDevices(msg)
      }
      ButtplugSpecV0ClientMessage::StopDeviceCmd(msg) => ButtplugClientMessage::StopDeviceCmd(msg),
      ButtplugSpecV0ClientMessage::SingleMotorVibrateCmd(msg) => {
        ButtplugClientMessage::SingleMotorVibrateCmd(msg)
      }
      ButtplugSpecV0ClientMessage::FleshlightLaunchFW12Cmd(msg) => {
        ButtplugClientMessage::FleshlightLaunchFW12Cmd(msg)
      }
      ButtplugSpecV0ClientMessage::LovenseCmd(msg) => ButtplugClientMessage::LovenseCmd(msg),
      ButtplugSpecV0ClientMessage::KiirooCmd(msg) => ButtplugClientMessage::KiirooCmd(msg),
      ButtplugSpecV0ClientMessage::VorzeA10CycloneCmd(msg) => {
        ButtplugClientMessage::VorzeA10CycloneCmd(msg)
      }
    }
  }
}

/// Represents all server-to-client messages in v0 of the Buttplug Spec
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugServerMessageType,
)]
#[cfg_attr(feature = "serialize-json", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtplugSpecV0ServerMessage {
  // Status messages
  Ok(Ok),
  Error(Error),
  // Handshake messages
  ServerInfo(ServerInfoV0),
  // Device enumeration messages
  DeviceList(DeviceListV0),
  DeviceAdded(DeviceAddedV0),
  DeviceRemoved(DeviceRemoved),
  ScanningFinished(ScanningFinished),
}

impl From<ButtplugSpecV0ServerMessage> for ButtplugServerMessage {
  fn from(msg: ButtplugSpecV0ServerMessage) -> Self {
    match msg {
      ButtplugSpecV0ServerMessage::Ok(msg) => ButtplugServerMessage::Ok(msg),
      ButtplugSpecV0ServerMessage::Error(msg) => ButtplugServerMessage::Error(msg),
      ButtplugSpecV0ServerMessage::ServerInfo(msg) => {
        ButtplugServerMessage::ServerInfo(msg.into())
      }
      ButtplugSpecV0ServerMessage::DeviceList(msg) => {
        ButtplugServerMessage::DeviceList(DeviceList::V0(msg))
      }
      ButtplugSpecV0ServerMessage::DeviceAdded(msg) => {
        ButtplugServerMessage::DeviceAdded(DeviceAdded::V0(msg))
      }
      ButtplugSpecV0ServerMessage::DeviceRemoved(msg) => {
        ButtplugServerMessage::DeviceRemoved(msg)
      }
      ButtplugSpecV0ServerMessage::ScanningFinished(msg) => {
        ButtplugServerMessage::ScanningFinished(msg)
      }
    }
  }
}

/// Represents all client-to-server messages in v1 of the Buttplug Spec
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugClientMessageType,
  TryFromButtplugClientMessage,
)]
#[cfg_attr(feature = "serialize-json", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtplugSpecV1ClientMessage {
  Ping(Ping),
  // Handshake messages
  RequestServerInfo(RequestServerInfo),
  // Device enumeration messages
  StartScanning(StartScanning),
  StopScanning(StopScanning),
  RequestDeviceList(RequestDeviceList),
  // Generic commands
  StopAllDevices(StopAllDevices),
  StopDeviceCmd(StopDeviceCmd),
  VibrateCmd(VibrateCmd),
  LinearCmd(LinearCmd),
  RotateCmd(RotateCmd),
}

/// Represents all server-to-client messages in v1 of the Buttplug Spec
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugServerMessageType,
)]
#[cfg_attr(feature = "serialize-json", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtplugSpecV1ServerMessage {
  // Status messages
  Ok(Ok),
  Error(Error),
  // Handshake messages
  ServerInfo(ServerInfoV0),
  // Device enumeration messages
  DeviceList(DeviceListV1),
  DeviceAdded(DeviceAddedV1),
  DeviceRemoved(DeviceRemoved),
  ScanningFinished(ScanningFinished),
}

impl From<ButtplugSpecV1ServerMessage> for ButtplugServerMessage {
  fn from(msg: ButtplugSpecV1ServerMessage) -> Self {
    match msg {
      ButtplugSpecV1ServerMessage::Ok(msg) => ButtplugServerMessage::Ok(msg),
      ButtplugSpecV1ServerMessage::Error(msg) => ButtplugServerMessage::Error(msg),
      ButtplugSpecV1ServerMessage::ServerInfo(msg) => {
        ButtplugServerMessage::ServerInfo(msg.into())
      }
      ButtplugSpecV1ServerMessage::DeviceList(msg) => {
        ButtplugServerMessage::DeviceList(DeviceList::V1(msg))
      }
      ButtplugSpecV1ServerMessage::DeviceAdded(msg) => {
        ButtplugServerMessage::DeviceAdded(DeviceAdded::V1(msg))
      }
      ButtplugSpecV1ServerMessage::DeviceRemoved(msg) => {
        ButtplugServerMessage::DeviceRemoved(msg)
      }
      ButtplugSpecV1ServerMessage::ScanningFinished(msg) => {
        ButtplugServerMessage::ScanningFinished(msg)
      }
    }
  }
}

/// Represents all client-to-server messages in v2 of the Buttplug Spec
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugClientMessageType,
  TryFromButtplugClientMessage,
)]
#[cfg_attr(feature = "serialize-json", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtplugSpecV2ClientMessage {
  Ping(Ping),
  // Handshake messages
  RequestServerInfo(RequestServerInfo),
  // Device enumeration messages
  StartScanning(StartScanning),
  StopScanning(StopScanning),
  RequestDeviceList(RequestDeviceList),
  // Generic commands
  StopAllDevices(StopAllDevices),
  StopDeviceCmd(StopDeviceCmd),
  VibrateCmd(VibrateCmd),
  LinearCmd(LinearCmd),
  RotateCmd(RotateCmd),
  RawWriteCmd(RawWriteCmd),
  RawReadCmd(RawReadCmd),
  RawSubscribeCmd(RawSubscribeCmd),
  RawUnsubscribeCmd(RawUnsubscribeCmd),
  // Sensor commands
  BatteryLevelCmd(BatteryLevelCmd),
  RSSILevelCmd(RSSILevelCmd),
}

/// Represents all server-to-client messages in v2 of the Buttplug Spec
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugServerMessageType,
)]
#[cfg_attr(feature = "serialize-json", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtplugSpecV2ServerMessage {
  // Status messages
  Ok(Ok),
  Error(Error),
  // Handshake messages
  ServerInfo(ServerInfo),
  // Device enumeration messages
  DeviceList(DeviceListV2),
  DeviceAdded(DeviceAddedV2),
  DeviceRemoved(DeviceRemoved),
  ScanningFinished(ScanningFinished),
  // Generic commands
  RawReading(RawReading),
  // Sensor commands
  BatteryLevelReading(BatteryLevelReading),
  RSSILevelReading(RSSILevelReading),
}

impl From<ButtplugSpecV2ServerMessage> for ButtplugServerMessage {
  fn from(msg: ButtplugSpecV2ServerMessage) -> Self {
    match msg {
      ButtplugSpecV2ServerMessage::Ok(msg) => ButtplugServerMessage::Ok(msg),
      ButtplugSpecV2ServerMessage::Error(msg) => ButtplugServerMessage::Error(msg),
      ButtplugSpecV2ServerMessage::ServerInfo(msg) => ButtplugServerMessage::ServerInfo(msg),
      ButtplugSpecV2ServerMessage::DeviceList(msg) => {
        ButtplugServerMessage::DeviceList(DeviceList::V2(msg))
      }
      ButtplugSpecV2ServerMessage::DeviceAdded(msg) => {
        ButtplugServerMessage::DeviceAdded(DeviceAdded::V2(msg))
      }
      ButtplugSpecV2ServerMessage::DeviceRemoved(msg) => {
        ButtplugServerMessage::DeviceRemoved(msg)
      }
      ButtplugSpecV2ServerMessage::ScanningFinished(msg) => {
        ButtplugServerMessage::ScanningFinished(msg)
      }
      ButtplugSpecV2ServerMessage::RawReading(msg) => ButtplugServerMessage::RawReading(msg),
      ButtplugSpecV2ServerMessage::BatteryLevelReading(msg) => {
        ButtplugServerMessage::BatteryLevelReading(msg)
      }
      ButtplugSpecV2ServerMessage::RSSILevelReading(msg) => {
        ButtplugServerMessage::RSSILevelReading(msg)
      }
    }
  }
}

/// Represents all client-to-server messages in v3 of the Buttplug Spec
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugClientMessageType,
  TryFromButtplugClientMessage,
)]
#[cfg_attr(feature = "serialize-json", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtplugSpecV3ClientMessage {
  Ping(Ping),
  // Handshake messages
  RequestServerInfo(RequestServerInfo),
  // Device enumeration messages
  StartScanning(StartScanning),
  StopScanning(StopScanning),
  RequestDeviceList(RequestDeviceList),
  // Generic commands
  StopAllDevices(StopAllDevices),
  StopDeviceCmd(StopDeviceCmd),
  LinearCmd(LinearCmd),
  RotateCmd(RotateCmd),
  ScalarCmd(ScalarCmd),
  RawWriteCmd(RawWriteCmd),
  RawReadCmd(RawReadCmd),
  RawSubscribeCmd(RawSubscribeCmd),
  RawUnsubscribeCmd(RawUnsubscribeCmd),
  // Sensor commands
  SensorReadCmd(SensorReadCmd),
  SensorSubscribeCmd(SensorSubscribeCmd),
  SensorUnsubscribeCmd(SensorUnsubscribeCmd),
}

/// Represents all server-to-client messages in v3 of the Buttplug Spec
#[derive(
  Debug,
  Clone,
  PartialEq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  ButtplugServerMessageType,
)]
#[cfg_attr(feature = "serialize-json", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtplugSpecV3ServerMessage {
  // Status messages
  Ok(Ok),
  Error(Error),
  // Handshake messages
  ServerInfo(ServerInfo),
  // Device enumeration messages
  DeviceList(DeviceListV3),
  DeviceAdded(DeviceAddedV3),
  DeviceRemoved(DeviceRemoved),
  ScanningFinished(ScanningFinished),
  // Generic commands
  RawReading(RawReading),
  // Sensor commands
  SensorReading(SensorReading),
}

impl From<ButtplugSpecV3ServerMessage> for ButtplugServerMessage {
  fn from(msg: ButtplugSpecV3ServerMessage) -> Self {
    match msg {
      ButtplugSpecV3ServerMessage::Ok(msg) => ButtplugServerMessage::Ok(msg),
      ButtplugSpecV3ServerMessage::Error(msg) => ButtplugServerMessage::Error(msg),
      ButtplugSpecV3ServerMessage::ServerInfo(msg) => ButtplugServerMessage::ServerInfo(msg),
      ButtplugSpecV3ServerMessage::DeviceList(msg) => {
        ButtplugServerMessage::DeviceList(DeviceList::V3(msg))
      }
      ButtplugSpecV3ServerMessage::DeviceAdded(msg) => {
        ButtplugServerMessage::DeviceAdded(DeviceAdded::V3(msg))
      }
      ButtplugSpecV3ServerMessage::DeviceRemoved(msg) => {
        ButtplugServerMessage::DeviceRemoved(msg)
      }
      ButtplugSpecV3ServerMessage::ScanningFinished(msg) => {
        ButtplugServerMessage::ScanningFinished(msg)
      }
      ButtplugSpecV3ServerMessage::RawReading(msg) => ButtplugServerMessage::RawReading(msg),
      ButtplugSpecV3ServerMessage::SensorReading(msg) => {
        ButtplugServerMessage::SensorReading(msg)
      }
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_v0_projection_drops_message_version() {
    let msg = ButtplugClientMessage::RequestServerInfo(RequestServerInfo::new(
      "Test Client",
      ButtplugMessageSpecVersion::Version0,
    ));
    let v0_msg =
      ButtplugSpecV0ClientMessage::try_from(msg).expect("Test, assuming infallible.");
    assert!(matches!(
      v0_msg,
      ButtplugSpecV0ClientMessage::RequestServerInfo(_)
    ));
  }

  #[test]
  fn test_version_projection_refuses_unrepresentable_messages() {
    // ScalarCmd doesn't exist before v3.
    let msg = ButtplugClientMessage::ScalarCmd(ScalarCmd::new(0, vec![]));
    assert!(ButtplugSpecV2ClientMessage::try_from(msg.clone()).is_err());
    assert!(ButtplugSpecV1ClientMessage::try_from(msg.clone()).is_err());
    assert!(ButtplugSpecV0ClientMessage::try_from(msg).is_err());
    // VibrateCmd was removed at v3.
    let msg = ButtplugClientMessage::VibrateCmd(VibrateCmd::new(0, vec![]));
    assert!(ButtplugSpecV3ClientMessage::try_from(msg.clone()).is_err());
    assert!(ButtplugSpecV2ClientMessage::try_from(msg).is_ok());
  }

  #[test]
  fn test_spec_version_ordering() {
    assert!(ButtplugMessageSpecVersion::Version0 < ButtplugMessageSpecVersion::Version3);
    assert_eq!(
      BUTTPLUG_CURRENT_MESSAGE_SPEC_VERSION,
      ButtplugMessageSpecVersion::Version3
    );
    assert_eq!(
      BUTTPLUG_FIRST_MESSAGE_SPEC_VERSION,
      ButtplugMessageSpecVersion::Version0
    );
  }
}
