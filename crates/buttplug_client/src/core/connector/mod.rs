// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Methods for establishing connections between Buttplug Clients and Servers
//!
//! A client uses a connector to communicate with a server. The connector
//! handles establishing the connection, serializing outgoing messages at the
//! negotiated spec version, and deserializing whatever the server sends back.
//! Connectors are generic over a [transport::ButtplugConnectorTransport],
//! which moves complete text frames over some channel - usually a websocket.

pub mod remote_connector;
pub mod transport;

use crate::{
  core::message::{ButtplugMessage, ButtplugMessageSpecVersion},
  util::future::{ButtplugFuture, ButtplugFutureStateShared},
};
use displaydoc::Display;
use futures::future::{self, BoxFuture, FutureExt};
#[cfg(feature = "serialize-json")]
pub use remote_connector::ButtplugRemoteClientConnector;
pub use remote_connector::ButtplugRemoteConnector;
use thiserror::Error;
use tokio::sync::mpsc::Sender;
#[cfg(feature = "websockets")]
pub use transport::ButtplugWebsocketClientTransport;

pub type ButtplugConnectorResult = Result<(), ButtplugConnectorError>;
pub type ButtplugConnectorStateShared =
  ButtplugFutureStateShared<Result<(), ButtplugConnectorError>>;
pub type ButtplugConnectorFuture = ButtplugFuture<Result<(), ButtplugConnectorError>>;
pub type ButtplugConnectorResultFuture = BoxFuture<'static, ButtplugConnectorResult>;

/// Errors specific to client connector structs.
///
/// Errors that relate to the communication method of the client connector. Can
/// include network/IPC protocol specific errors.
#[derive(Debug, Error, Display)]
pub enum ButtplugConnectorError {
  /// Invalid connector address: {0}
  InvalidAddress(String),
  /// No server found at address {0}
  ServerNotFound(String),
  /// Invalid connection handshake: {0}
  InvalidHandshake(String),
  /// Connection attempt timed out: {0}
  ConnectTimeout(String),
  /// Connector disconnected while requests were outstanding.
  Disconnected,
  /// Connector is not currently connected to a remote.
  ConnectorNotConnected,
  /// Connector already connected, cannot be connected twice.
  ConnectorAlreadyConnected,
  /// Connector error: {0}
  ConnectorGenericError(String),
  /// Specific error for connector type: {0}.
  TransportSpecificError(#[from] transport::ButtplugConnectorTransportSpecificError),
}

impl<T> From<ButtplugConnectorError> for BoxFuture<'static, Result<T, ButtplugConnectorError>>
where
  T: Send + 'static,
{
  fn from(err: ButtplugConnectorError) -> BoxFuture<'static, Result<T, ButtplugConnectorError>> {
    future::ready(Err(err)).boxed()
  }
}

/// Trait for client connectors.
///
/// The `OutboundMessageType` specifies the outbound message type, which for a
/// client connector will be
/// [ButtplugClientMessage][crate::core::message::ButtplugClientMessage]. The
/// `InboundMessageType` specifies the inbound message type, which for a client
/// connector will be
/// [ButtplugServerMessage][crate::core::message::ButtplugServerMessage].
pub trait ButtplugConnector<OutboundMessageType, InboundMessageType>: Send + Sync
where
  OutboundMessageType: ButtplugMessage + 'static,
  InboundMessageType: ButtplugMessage + 'static,
{
  /// Connects to the remote, delivering decoded incoming messages to
  /// `message_receiver`.
  ///
  /// `message_version` is the spec version the session will speak for the
  /// whole connection; the connector pins its serializer to it before any
  /// traffic moves.
  ///
  /// # Errors
  ///
  /// Returns a [ButtplugConnectorError] if there is a problem with the
  /// connection process.
  fn connect(
    &mut self,
    message_version: ButtplugMessageSpecVersion,
    message_receiver: Sender<InboundMessageType>,
  ) -> BoxFuture<'static, Result<(), ButtplugConnectorError>>;
  /// Disconnects the client from the server.
  ///
  /// Returns a [ButtplugConnectorError] if there is a problem with the
  /// disconnection process.
  fn disconnect(&self) -> ButtplugConnectorResultFuture;
  /// Sends a message of outbound message type to the other connector.
  ///
  /// # Errors
  ///
  /// If the connector is not currently connected, or an error happens during
  /// the send operation, this will return a [ButtplugConnectorError]
  fn send(&self, msg: OutboundMessageType) -> ButtplugConnectorResultFuture;
}

#[cfg(all(feature = "websockets", feature = "serialize-json"))]
use crate::core::message::{ButtplugClientMessage, ButtplugServerMessage};

/// Convenience method for creating a new Buttplug Client Websocket connector
/// that uses the JSON serializer. This is pretty much the only connector used
/// for IPC right now, so this makes it easy to create one without having to
/// fill in the generic types.
#[cfg(all(feature = "websockets", feature = "serialize-json"))]
pub fn new_json_ws_client_connector(
  address: &str,
) -> impl ButtplugConnector<ButtplugClientMessage, ButtplugServerMessage> {
  use crate::core::message::serializer::ButtplugClientJSONSerializer;

  ButtplugRemoteClientConnector::<ButtplugWebsocketClientTransport, ButtplugClientJSONSerializer>::new(
    ButtplugWebsocketClientTransport::new_insecure_connector(address),
  )
}
