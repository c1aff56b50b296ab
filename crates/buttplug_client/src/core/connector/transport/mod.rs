// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Transports move serialized frames between a connector and a remote server.

#[cfg(feature = "websockets")]
mod websocket;

use crate::core::{
  connector::{ButtplugConnectorError, ButtplugConnectorResultFuture},
  message::serializer::ButtplugSerializedMessage,
};
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc::{Receiver, Sender};
#[cfg(feature = "websockets")]
pub use websocket::ButtplugWebsocketClientTransport;

/// Event names a transport fires on its hook
/// [EventManager][crate::core::event::EventManager]: connection established.
pub const TRANSPORT_CONNECT_EVENT: &str = "connect";
/// Connection closed, payload is the close reason.
pub const TRANSPORT_DISCONNECT_EVENT: &str = "disconnect";
/// Outgoing frame handed to the wire, payload is the frame text.
pub const TRANSPORT_SEND_EVENT: &str = "send";
/// Incoming frame received from the wire, payload is the frame text.
pub const TRANSPORT_RECEIVE_EVENT: &str = "receive";

/// Messages we can receive from a transport.
#[derive(Clone, Debug, Display)]
pub enum ButtplugTransportIncomingMessage {
  /// Sent when connection is established.
  Connected,
  /// Serialized version of message we received from remote server.
  Message(ButtplugSerializedMessage),
  /// Error received from remote server.
  Error(String),
  /// Transport (or remote server) itself closed the connection.
  Close(String),
}

pub trait ButtplugConnectorTransport: Send + Sync {
  fn connect(
    &self,
    outgoing_receiver: Receiver<ButtplugSerializedMessage>,
    incoming_sender: Sender<ButtplugTransportIncomingMessage>,
  ) -> BoxFuture<'static, Result<(), ButtplugConnectorError>>;
  fn disconnect(&self) -> ButtplugConnectorResultFuture;
}

#[derive(Error, Debug)]
pub enum ButtplugConnectorTransportSpecificError {
  #[cfg(feature = "websockets")]
  #[error("Tungstenite specific error: {0}")]
  TungsteniteError(#[from] tokio_tungstenite::tungstenite::Error),
  #[error("Network error: {0}")]
  GenericNetworkError(String),
}
