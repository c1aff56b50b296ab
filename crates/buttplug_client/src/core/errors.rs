// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Buttplug Error Structs/Enums, representing protocol errors.

use super::message::{self, serializer::ButtplugSerializerError, ButtplugMessageSpecVersion, ErrorCode};
use displaydoc::Display;
use futures::future::{self, BoxFuture, FutureExt};
use thiserror::Error;

pub type ButtplugResult<T = ()> = Result<T, ButtplugError>;

/// Handshake errors occur while a client is connecting to a server. This
/// usually involves protocol handshake errors. For connector errors (i.e. when
/// a remote network connection cannot be established), see
/// [crate::core::connector::ButtplugConnectorError].
#[derive(Debug, Error, Display, Clone)]
pub enum ButtplugHandshakeError {
  /// Expected either a ServerInfo or Error message, received {0}
  UnexpectedHandshakeMessageReceived(String),
  /// Server spec version ({0}) must be equal or greater than client version ({1})
  MessageSpecVersionMismatch(ButtplugMessageSpecVersion, ButtplugMessageSpecVersion),
}

/// Message errors occur when a message is somehow malformed on creation, or
/// received unexpectedly by a client.
#[derive(Debug, Error, Display, Clone)]
pub enum ButtplugMessageError {
  /// Got unexpected message type: {0}
  UnexpectedMessageType(String),
  /// Message type {0} not valid in message spec version {1}
  VersionError(&'static str, ButtplugMessageSpecVersion),
  /// Message validation error: {0}
  ValidationError(String),
  /// Message serialization error: {0}
  MessageSerializationError(#[from] ButtplugSerializerError),
}

/// Device errors occur during device interactions, including sending commands
/// a device does not advertise, or addressing devices or sensors that are no
/// longer available.
#[derive(Debug, Error, Display, Clone)]
pub enum ButtplugDeviceError {
  /// Device {0} does not support command: {1}
  UnsupportedCommand(u32, String),
  /// No device available at index {0}
  DeviceNotAvailable(u32),
  /// Device {0} has no sensor at index {1}
  SensorNotAvailable(u32, u32),
  /// Sensor {1} on device {0} is not subscribable
  SensorNotSubscribable(u32, u32),
}

/// Errors a server relays in Error messages, classed by [ErrorCode]. The
/// carried string is the server supplied error text.
#[derive(Debug, Error, Display, Clone)]
pub enum ButtplugServerError {
  /// Unknown server error: {0}
  UnknownServerError(String),
  /// Server handshake error: {0}
  InitServerError(String),
  /// Server ping error: {0}
  PingServerError(String),
  /// Server message error: {0}
  MessageServerError(String),
  /// Server device error: {0}
  DeviceServerError(String),
}

/// Aggregation enum for protocol error types.
#[derive(Debug, Error, Clone)]
pub enum ButtplugError {
  #[error(transparent)]
  ButtplugHandshakeError(#[from] ButtplugHandshakeError),
  #[error(transparent)]
  ButtplugMessageError(#[from] ButtplugMessageError),
  #[error(transparent)]
  ButtplugDeviceError(#[from] ButtplugDeviceError),
  #[error(transparent)]
  ButtplugServerError(#[from] ButtplugServerError),
}

impl<T> From<ButtplugError> for BoxFuture<'static, Result<T, ButtplugError>>
where
  T: Send + 'static,
{
  fn from(err: ButtplugError) -> BoxFuture<'static, Result<T, ButtplugError>> {
    future::ready(Err(err)).boxed()
  }
}

impl From<&message::Error> for ButtplugServerError {
  /// Turns a Buttplug Protocol Error Message into a typed server error.
  fn from(error: &message::Error) -> Self {
    match error.error_code() {
      ErrorCode::ErrorUnknown => ButtplugServerError::UnknownServerError(error.error_message().clone()),
      ErrorCode::ErrorInit => ButtplugServerError::InitServerError(error.error_message().clone()),
      ErrorCode::ErrorPing => ButtplugServerError::PingServerError(error.error_message().clone()),
      ErrorCode::ErrorMessage => ButtplugServerError::MessageServerError(error.error_message().clone()),
      ErrorCode::ErrorDevice => ButtplugServerError::DeviceServerError(error.error_message().clone()),
    }
  }
}

impl From<&message::Error> for ButtplugError {
  fn from(error: &message::Error) -> Self {
    ButtplugServerError::from(error).into()
  }
}

impl From<message::Error> for ButtplugError {
  fn from(error: message::Error) -> Self {
    ButtplugError::from(&error)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::core::message::{Error, ErrorCode};

  #[test]
  fn test_error_message_conversion() {
    let msg = Error::new(ErrorCode::ErrorDevice, "Device crashed");
    let err = ButtplugError::from(&msg);
    assert!(matches!(
      err,
      ButtplugError::ButtplugServerError(ButtplugServerError::DeviceServerError(_))
    ));
    assert_eq!(err.to_string(), "Server device error: Device crashed");
  }

  #[test]
  fn test_error_code_classes() {
    let cases = [
      (ErrorCode::ErrorUnknown, "Unknown server error: oops"),
      (ErrorCode::ErrorInit, "Server handshake error: oops"),
      (ErrorCode::ErrorPing, "Server ping error: oops"),
      (ErrorCode::ErrorMessage, "Server message error: oops"),
      (ErrorCode::ErrorDevice, "Server device error: oops"),
    ];
    for (code, expected) in cases {
      let err = ButtplugServerError::from(&Error::new(code, "oops"));
      assert_eq!(err.to_string(), expected);
    }
  }
}
