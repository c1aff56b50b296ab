// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Notification of an error in the system, either as a response to a client
//! request or (rarely) as a server initiated event with an Id of 0.

use super::*;
use getset::{CopyGetters, Getters};
#[cfg(feature = "serialize-json")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serialize-json")]
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Error codes pertaining to error classes that can be represented in the
/// Buttplug [Error] message.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Display)]
#[cfg_attr(feature = "serialize-json", derive(Serialize_repr, Deserialize_repr))]
#[repr(u8)]
pub enum ErrorCode {
  ErrorUnknown = 0,
  ErrorInit,
  ErrorPing,
  ErrorMessage,
  ErrorDevice,
}

/// Represents the Buttplug Protocol Error message, as documented in the
/// [Buttplug Protocol Spec](https://buttplug-spec.docs.buttplug.io/status.html#error).
// Error is one of the few messages that can carry either a system Id or a
// message Id, so there's nothing to check. Use the default trait impl for
// ButtplugMessageValidator.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  ButtplugMessage,
  ButtplugMessageValidator,
  ButtplugMessageFinalizer,
  Getters,
  CopyGetters,
)]
#[cfg_attr(feature = "serialize-json", derive(Serialize, Deserialize))]
pub struct Error {
  #[cfg_attr(feature = "serialize-json", serde(rename = "Id"))]
  id: u32,
  /// Specifies the class of the error.
  #[cfg_attr(feature = "serialize-json", serde(rename = "ErrorCode"))]
  #[getset(get_copy = "pub")]
  error_code: ErrorCode,
  /// Server supplied description of the error.
  #[cfg_attr(feature = "serialize-json", serde(rename = "ErrorMessage"))]
  #[getset(get = "pub")]
  error_message: String,
}

impl Error {
  pub fn new(error_code: ErrorCode, error_message: &str) -> Self {
    Self {
      id: 0,
      error_code,
      error_message: error_message.to_string(),
    }
  }
}

#[cfg(feature = "serialize-json")]
#[cfg(test)]
mod test {
  use crate::core::message::{ButtplugSpecV0ServerMessage, Error, ErrorCode};

  const ERROR_STR: &str =
    "{\"Error\":{\"Id\":0,\"ErrorCode\":1,\"ErrorMessage\":\"Test Error\"}}";

  #[test]
  fn test_error_serialize() {
    let error =
      ButtplugSpecV0ServerMessage::Error(Error::new(ErrorCode::ErrorInit, "Test Error"));
    let js = serde_json::to_string(&error).expect("Infallible serialization");
    assert_eq!(ERROR_STR, js);
  }

  #[test]
  fn test_error_deserialize() {
    let union: ButtplugSpecV0ServerMessage =
      serde_json::from_str(ERROR_STR).expect("Infallible deserialization");
    assert_eq!(
      ButtplugSpecV0ServerMessage::Error(Error::new(ErrorCode::ErrorInit, "Test Error")),
      union
    );
  }

  #[test]
  fn test_error_code_mapping() {
    let json = "{\"Error\":{\"Id\":0,\"ErrorMessage\":\"Server received invalid JSON.\",\"ErrorCode\":3}}";
    let union: ButtplugSpecV0ServerMessage =
      serde_json::from_str(json).expect("Infallible deserialization");
    if let ButtplugSpecV0ServerMessage::Error(err) = union {
      assert_eq!(err.error_code(), ErrorCode::ErrorMessage);
      assert_eq!(err.error_message(), "Server received invalid JSON.");
    } else {
      panic!("Expected Error message");
    }
  }
}
