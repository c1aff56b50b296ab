// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

use super::{ButtplugMessageSerializer, ButtplugSerializedMessage, ButtplugSerializerError};
use crate::core::message::{
  ButtplugClientMessage,
  ButtplugMessage,
  ButtplugMessageFinalizer,
  ButtplugMessageSpecVersion,
  ButtplugServerMessage,
  ButtplugSpecV0ClientMessage,
  ButtplugSpecV0ServerMessage,
  ButtplugSpecV1ClientMessage,
  ButtplugSpecV1ServerMessage,
  ButtplugSpecV2ClientMessage,
  ButtplugSpecV2ServerMessage,
  ButtplugSpecV3ClientMessage,
  ButtplugSpecV3ServerMessage,
  BUTTPLUG_CURRENT_MESSAGE_SPEC_VERSION,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::{Deserializer, Value};
use std::fmt::Debug;

/// Returns the message as a string in Buttplug JSON Protocol format.
pub fn vec_to_protocol_json<T>(msg: &[T]) -> String
where
  T: ButtplugMessage + Serialize + Deserialize<'static>,
{
  serde_json::to_string(msg).expect("Infallible serialization")
}

pub fn deserialize_to_message<T>(msg_str: &str) -> Result<Vec<T>, ButtplugSerializerError>
where
  T: serde::de::DeserializeOwned + ButtplugMessageFinalizer + Clone + Debug,
{
  // Some transports will hand us multiple full JSON documents in one text
  // frame, so run a streaming deserializer over the whole thing.
  let stream = Deserializer::from_str(msg_str).into_iter::<Value>();

  let mut result = vec![];

  for msg in stream {
    match msg {
      Result::Ok(json_msg) => match serde_json::from_value::<Vec<T>>(json_msg) {
        Result::Ok(mut msg_vec) => {
          for msg in msg_vec.iter_mut() {
            msg.finalize();
          }
          result.append(&mut msg_vec);
        }
        Err(e) => {
          // The outer document parsed, so this is a message the negotiated
          // spec version can't represent (unknown name or wrong shape).
          return Err(ButtplugSerializerError::UnsupportedMessage(format!(
            "Message: {msg_str} - Error: {e:?}"
          )));
        }
      },
      Err(e) => {
        return Err(ButtplugSerializerError::JsonSerializerError(format!(
          "Message: {msg_str} - Error: {e:?}"
        )))
      }
    }
  }
  Result::Ok(result)
}

/// Version agnostic serialization helpers, generic over the spec enum to
/// encode or decode against.
#[derive(Default)]
pub struct ButtplugClientJSONSerializerImpl {}

impl ButtplugClientJSONSerializerImpl {
  pub fn deserialize<T>(
    &self,
    msg: &ButtplugSerializedMessage,
  ) -> Result<Vec<T>, ButtplugSerializerError>
  where
    T: serde::de::DeserializeOwned + ButtplugMessageFinalizer + Clone + Debug,
  {
    if let ButtplugSerializedMessage::Text(text_msg) = msg {
      deserialize_to_message::<T>(text_msg)
    } else {
      Err(ButtplugSerializerError::BinaryDeserializationError)
    }
  }

  pub fn serialize<T>(&self, msg: &[T]) -> ButtplugSerializedMessage
  where
    T: ButtplugMessage + Serialize + Deserialize<'static>,
  {
    ButtplugSerializedMessage::Text(vec_to_protocol_json(msg))
  }
}

/// Client-side JSON serializer, pinned to the spec version the session
/// negotiated with the server. Outgoing messages are projected into that
/// version's message set, incoming frames are decoded against it.
#[derive(Default)]
pub struct ButtplugClientJSONSerializer {
  serializer_impl: ButtplugClientJSONSerializerImpl,
  message_version: OnceCell<ButtplugMessageSpecVersion>,
}

impl ButtplugClientJSONSerializer {
  fn spec_version(&self) -> ButtplugMessageSpecVersion {
    *self
      .message_version
      .get()
      .unwrap_or(&BUTTPLUG_CURRENT_MESSAGE_SPEC_VERSION)
  }
}

impl ButtplugMessageSerializer for ButtplugClientJSONSerializer {
  type Inbound = ButtplugServerMessage;
  type Outbound = ButtplugClientMessage;

  fn force_message_version(&self, version: &ButtplugMessageSpecVersion) {
    info!("Setting JSON Wrapper message version to {}", version);
    self
      .message_version
      .set(*version)
      .expect("This should only ever be called once.");
  }

  fn deserialize(
    &self,
    serialized_msg: &ButtplugSerializedMessage,
  ) -> Result<Vec<ButtplugServerMessage>, ButtplugSerializerError> {
    Result::Ok(match self.spec_version() {
      ButtplugMessageSpecVersion::Version0 => self
        .serializer_impl
        .deserialize::<ButtplugSpecV0ServerMessage>(serialized_msg)?
        .into_iter()
        .map(|m| m.into())
        .collect(),
      ButtplugMessageSpecVersion::Version1 => self
        .serializer_impl
        .deserialize::<ButtplugSpecV1ServerMessage>(serialized_msg)?
        .into_iter()
        .map(|m| m.into())
        .collect(),
      ButtplugMessageSpecVersion::Version2 => self
        .serializer_impl
        .deserialize::<ButtplugSpecV2ServerMessage>(serialized_msg)?
        .into_iter()
        .map(|m| m.into())
        .collect(),
      ButtplugMessageSpecVersion::Version3 => self
        .serializer_impl
        .deserialize::<ButtplugSpecV3ServerMessage>(serialized_msg)?
        .into_iter()
        .map(|m| m.into())
        .collect(),
    })
  }

  fn serialize(&self, msgs: &[ButtplugClientMessage]) -> ButtplugSerializedMessage {
    // A projection failure here means a caller built a message the negotiated
    // spec can't represent. The device model only hands out version-correct
    // handles, so this is always a caller bug. Log and drop.
    match self.spec_version() {
      ButtplugMessageSpecVersion::Version0 => {
        let msg_vec: Vec<ButtplugSpecV0ClientMessage> = msgs
          .iter()
          .cloned()
          .filter_map(|msg| match ButtplugSpecV0ClientMessage::try_from(msg) {
            Result::Ok(msgv0) => Some(msgv0),
            Err(err) => {
              error!("Message not serializable in spec v0: {}", err);
              None
            }
          })
          .collect();
        self.serializer_impl.serialize(&msg_vec)
      }
      ButtplugMessageSpecVersion::Version1 => {
        let msg_vec: Vec<ButtplugSpecV1ClientMessage> = msgs
          .iter()
          .cloned()
          .filter_map(|msg| match ButtplugSpecV1ClientMessage::try_from(msg) {
            Result::Ok(msgv1) => Some(msgv1),
            Err(err) => {
              error!("Message not serializable in spec v1: {}", err);
              None
            }
          })
          .collect();
        self.serializer_impl.serialize(&msg_vec)
      }
      ButtplugMessageSpecVersion::Version2 => {
        let msg_vec: Vec<ButtplugSpecV2ClientMessage> = msgs
          .iter()
          .cloned()
          .filter_map(|msg| match ButtplugSpecV2ClientMessage::try_from(msg) {
            Result::Ok(msgv2) => Some(msgv2),
            Err(err) => {
              error!("Message not serializable in spec v2: {}", err);
              None
            }
          })
          .collect();
        self.serializer_impl.serialize(&msg_vec)
      }
      ButtplugMessageSpecVersion::Version3 => {
        let msg_vec: Vec<ButtplugSpecV3ClientMessage> = msgs
          .iter()
          .cloned()
          .filter_map(|msg| match ButtplugSpecV3ClientMessage::try_from(msg) {
            Result::Ok(msgv3) => Some(msgv3),
            Err(err) => {
              error!("Message not serializable in spec v3: {}", err);
              None
            }
          })
          .collect();
        self.serializer_impl.serialize(&msg_vec)
      }
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::core::message::{
    ButtplugMessageValidator,
    ErrorCode,
    RequestServerInfo,
    StopAllDevices,
  };

  fn serializer_at(version: ButtplugMessageSpecVersion) -> ButtplugClientJSONSerializer {
    let serializer = ButtplugClientJSONSerializer::default();
    serializer.force_message_version(&version);
    serializer
  }

  // StopAllDevices never changed shape after v0, so it encodes identically at
  // every negotiated version.
  #[test_case::test_case(ButtplugMessageSpecVersion::Version0)]
  #[test_case::test_case(ButtplugMessageSpecVersion::Version1)]
  #[test_case::test_case(ButtplugMessageSpecVersion::Version2)]
  #[test_case::test_case(ButtplugMessageSpecVersion::Version3)]
  fn test_v0_message_encodes_at_any_version(version: ButtplugMessageSpecVersion) {
    let serializer = serializer_at(version);
    let frame = serializer.serialize(&[ButtplugClientMessage::StopAllDevices(
      StopAllDevices::new(),
    )]);
    assert_eq!(
      frame,
      ButtplugSerializedMessage::Text("[{\"StopAllDevices\":{\"Id\":1}}]".to_owned())
    );
  }

  #[test]
  fn test_ok_decode_v0() {
    let serializer = serializer_at(ButtplugMessageSpecVersion::Version0);
    let msgs = serializer
      .deserialize(&ButtplugSerializedMessage::Text(
        "[{\"Ok\":{\"Id\":1}}]".to_owned(),
      ))
      .expect("Infallible deserialization");
    assert_eq!(msgs.len(), 1);
    if let ButtplugServerMessage::Ok(ok) = &msgs[0] {
      assert_eq!(ok.id(), 1);
    } else {
      panic!("Expected Ok message");
    }
  }

  #[test]
  fn test_error_decode_v0() {
    let serializer = serializer_at(ButtplugMessageSpecVersion::Version0);
    let msgs = serializer
      .deserialize(&ButtplugSerializedMessage::Text(
        "[{\"Error\":{\"Id\":0,\"ErrorMessage\":\"Server received invalid JSON.\",\"ErrorCode\":3}}]"
          .to_owned(),
      ))
      .expect("Infallible deserialization");
    assert_eq!(msgs.len(), 1);
    if let ButtplugServerMessage::Error(err) = &msgs[0] {
      assert_eq!(err.id(), 0);
      assert_eq!(err.error_code(), ErrorCode::ErrorMessage);
      assert_eq!(err.error_message(), "Server received invalid JSON.");
    } else {
      panic!("Expected Error message");
    }
  }

  #[test]
  fn test_request_server_info_encode_v1() {
    let serializer = serializer_at(ButtplugMessageSpecVersion::Version1);
    let msg = serializer.serialize(&[ButtplugClientMessage::RequestServerInfo(
      RequestServerInfo::new("Test Client", ButtplugMessageSpecVersion::Version1),
    )]);
    assert_eq!(
      msg,
      ButtplugSerializedMessage::Text(
        "[{\"RequestServerInfo\":{\"Id\":1,\"ClientName\":\"Test Client\",\"MessageVersion\":1}}]"
          .to_owned()
      )
    );
  }

  #[test]
  fn test_request_server_info_encode_v0_has_no_version_field() {
    let serializer = serializer_at(ButtplugMessageSpecVersion::Version0);
    let msg = serializer.serialize(&[ButtplugClientMessage::RequestServerInfo(
      RequestServerInfo::new("Test Client", ButtplugMessageSpecVersion::Version0),
    )]);
    assert_eq!(
      msg,
      ButtplugSerializedMessage::Text(
        "[{\"RequestServerInfo\":{\"Id\":1,\"ClientName\":\"Test Client\"}}]".to_owned()
      )
    );
  }

  // StopAllDevices was defined in v0 and never redefined, so a v3 frame still
  // decodes to the v0 struct.
  #[test]
  fn test_decode_falls_back_to_oldest_definition() {
    let serializer_impl = ButtplugClientJSONSerializerImpl::default();
    let msgs = serializer_impl
      .deserialize::<ButtplugSpecV3ClientMessage>(&ButtplugSerializedMessage::Text(
        "[{\"StopAllDevices\":{\"Id\":1}}]".to_owned(),
      ))
      .expect("Infallible deserialization");
    assert_eq!(
      msgs,
      vec![ButtplugSpecV3ClientMessage::StopAllDevices(StopAllDevices::new())]
    );
  }

  // BatteryLevelReading was removed in v3, so the v3 decoder must refuse it
  // even though older spec versions still know the message.
  #[test]
  fn test_decode_refuses_messages_removed_from_spec_version() {
    let reading =
      "[{\"BatteryLevelReading\":{\"Id\":2,\"DeviceIndex\":0,\"BatteryLevel\":0.5}}]".to_owned();
    let serializer = serializer_at(ButtplugMessageSpecVersion::Version3);
    let result = serializer.deserialize(&ButtplugSerializedMessage::Text(reading.clone()));
    assert!(matches!(
      result,
      Err(ButtplugSerializerError::UnsupportedMessage(_))
    ));
    // Same frame under v2 is fine.
    let serializer = serializer_at(ButtplugMessageSpecVersion::Version2);
    assert!(serializer
      .deserialize(&ButtplugSerializedMessage::Text(reading))
      .is_ok());
  }

  #[test]
  fn test_client_message_round_trip() {
    let serializer = serializer_at(ButtplugMessageSpecVersion::Version2);
    let serializer_impl = ButtplugClientJSONSerializerImpl::default();
    let msgs = vec![
      ButtplugClientMessage::StopAllDevices(StopAllDevices::new()),
      ButtplugClientMessage::RequestServerInfo(RequestServerInfo::new(
        "Test Client",
        ButtplugMessageSpecVersion::Version2,
      )),
    ];
    let frame = serializer.serialize(&msgs);
    let decoded: Vec<ButtplugClientMessage> = serializer_impl
      .deserialize::<ButtplugSpecV2ClientMessage>(&frame)
      .expect("Infallible deserialization")
      .into_iter()
      .map(|m| m.into())
      .collect();
    assert_eq!(msgs, decoded);
  }

  #[test]
  fn test_streamed_message_array() {
    let json = r#"[
        {
          "Ok": {
              "Id": 1
          }
        }]
        [{
          "Ok": {
              "Id": 2
          }
        }]
    "#;
    let serializer = serializer_at(ButtplugMessageSpecVersion::Version3);
    let messages = serializer
      .deserialize(&ButtplugSerializedMessage::Text(json.to_owned()))
      .expect("Infallible deserialization");
    assert_eq!(messages.len(), 2);
  }

  #[test]
  fn test_client_incorrect_messages() {
    let incorrect_incoming_messages = vec![
      // Not valid JSON
      "not a json message",
      // Valid json object but no contents
      "{}",
      // Not a message type
      "[{\"NotAMessage\":{}}]",
      // Valid json and message type but not in correct format
      "[{\"Ok\":[]}]",
      // Valid json and message type but not in correct format
      "[{\"Ok\":{}}]",
    ];
    let serializer = serializer_at(ButtplugMessageSpecVersion::Version3);
    for msg in incorrect_incoming_messages {
      let res = serializer.deserialize(&ButtplugSerializedMessage::Text(msg.to_owned()));
      assert!(res.is_err(), "{} should be an error", msg);
    }
  }

  #[test]
  fn test_validator_catches_system_id_on_outgoing() {
    let mut msg = StopAllDevices::new();
    msg.set_id(0);
    assert!(msg.is_valid().is_err());
  }
}
