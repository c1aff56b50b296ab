// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Generic remote transport handling methods and traits

use super::{
  transport::{ButtplugConnectorTransport, ButtplugTransportIncomingMessage},
  ButtplugConnector,
  ButtplugConnectorError,
  ButtplugConnectorResultFuture,
};
#[cfg(feature = "serialize-json")]
use crate::core::message::{
  serializer::ButtplugClientJSONSerializer,
  ButtplugClientMessage,
  ButtplugServerMessage,
};
use crate::{
  core::message::{
    serializer::{ButtplugMessageSerializer, ButtplugSerializedMessage},
    ButtplugMessage,
    ButtplugMessageSpecVersion,
  },
  util::async_manager,
};
use futures::{future::BoxFuture, FutureExt};
use std::{marker::PhantomData, sync::Arc};
use tokio::sync::mpsc::{channel, Receiver, Sender};

enum ButtplugRemoteConnectorMessage<T>
where
  T: ButtplugMessage + 'static,
{
  Message(T),
  Close,
}

enum StreamValue<T>
where
  T: ButtplugMessage + 'static,
{
  NoValue,
  Incoming(ButtplugTransportIncomingMessage),
  Outgoing(ButtplugRemoteConnectorMessage<T>),
}

async fn remote_connector_event_loop<
  TransportType,
  SerializerType,
  OutboundMessageType,
  InboundMessageType,
>(
  serializer: SerializerType,
  // Takes messages from the client
  mut connector_outgoing_recv: Receiver<ButtplugRemoteConnectorMessage<OutboundMessageType>>,
  // Sends deserialized messages to the client
  connector_incoming_sender: Sender<InboundMessageType>,
  transport: Arc<TransportType>,
  // Sends serialized messages to the transport
  transport_outgoing_sender: Sender<ButtplugSerializedMessage>,
  // Takes data coming in from the transport
  mut transport_incoming_recv: Receiver<ButtplugTransportIncomingMessage>,
) where
  TransportType: ButtplugConnectorTransport + 'static,
  SerializerType: ButtplugMessageSerializer<Inbound = InboundMessageType, Outbound = OutboundMessageType>
    + 'static,
  OutboundMessageType: ButtplugMessage + 'static,
  InboundMessageType: ButtplugMessage + 'static,
{
  loop {
    // For the type, we will get back one of two things: Either a serialized
    // incoming message from the transport for the connector, or an outgoing
    // message from the connector to go to the transport.
    let stream_return = tokio::select! {
      transport_msg = transport_incoming_recv.recv() =>
      match transport_msg {
        Some(msg) => StreamValue::Incoming(msg),
        None => StreamValue::NoValue,
      },
      connector_msg = connector_outgoing_recv.recv() =>
      match connector_msg {
        Some(msg) => StreamValue::Outgoing(msg),
        None => StreamValue::NoValue,
      }
    };
    match stream_return {
      // If we get NoValue back, it means one side closed, so the other should
      // too.
      StreamValue::NoValue => break,
      // If we get incoming back, it means we've received something from the
      // server.
      StreamValue::Incoming(remote_msg) => {
        match remote_msg {
          ButtplugTransportIncomingMessage::Message(serialized_msg) => {
            match serializer.deserialize(&serialized_msg) {
              Result::Ok(messages) => {
                for msg in messages {
                  if connector_incoming_sender.send(msg).await.is_err() {
                    error!("Connector has disconnected, ending remote connector loop.");
                    return;
                  }
                }
              }
              Err(e) => {
                error!(
                  "Got invalid messages from remote Buttplug connection - Message: {:?} - Error: {:?}",
                  serialized_msg, e
                );
              }
            }
          }
          ButtplugTransportIncomingMessage::Close(s) => {
            info!("Connector closing connection {}", s);
            break;
          }
          ButtplugTransportIncomingMessage::Connected => {}
          ButtplugTransportIncomingMessage::Error(e) => {
            error!("Transport error: {}", e);
          }
        }
      }
      // If we receive something from the client, serialize it at the
      // negotiated version and let the transport figure out what to do with
      // it.
      StreamValue::Outgoing(buttplug_msg) => {
        match buttplug_msg {
          ButtplugRemoteConnectorMessage::Message(msg) => {
            let serialized_msg = serializer.serialize(&[msg]);
            if transport_outgoing_sender
              .send(serialized_msg)
              .await
              .is_err()
            {
              error!("Transport has disconnected, exiting remote connector loop.");
              return;
            }
          }
          ButtplugRemoteConnectorMessage::Close => {
            if let Err(e) = transport.disconnect().await {
              error!("Error disconnecting transport: {:?}", e);
            }
            break;
          }
        }
      }
    }
  }
}

#[cfg(feature = "serialize-json")]
pub type ButtplugRemoteClientConnector<
  TransportType,
  SerializerType = ButtplugClientJSONSerializer,
> = ButtplugRemoteConnector<
  TransportType,
  SerializerType,
  ButtplugClientMessage,
  ButtplugServerMessage,
>;

pub struct ButtplugRemoteConnector<
  TransportType,
  SerializerType,
  OutboundMessageType,
  InboundMessageType,
> where
  TransportType: ButtplugConnectorTransport + 'static,
  SerializerType: ButtplugMessageSerializer<Inbound = InboundMessageType, Outbound = OutboundMessageType>
    + 'static,
  OutboundMessageType: ButtplugMessage + 'static,
  InboundMessageType: ButtplugMessage + 'static,
{
  /// Transport the connector will use to communicate with the server. Held in
  /// an [Arc] so the connector event loop can close it while the connector
  /// itself stays reusable for reconnects.
  transport: Arc<TransportType>,
  /// Sender for forwarding outgoing messages to the connector event loop.
  event_loop_sender: Option<Sender<ButtplugRemoteConnectorMessage<OutboundMessageType>>>,
  dummy_serializer: PhantomData<SerializerType>,
}

impl<TransportType, SerializerType, OutboundMessageType, InboundMessageType>
  ButtplugRemoteConnector<TransportType, SerializerType, OutboundMessageType, InboundMessageType>
where
  TransportType: ButtplugConnectorTransport + 'static,
  SerializerType: ButtplugMessageSerializer<Inbound = InboundMessageType, Outbound = OutboundMessageType>
    + 'static,
  OutboundMessageType: ButtplugMessage + 'static,
  InboundMessageType: ButtplugMessage + 'static,
{
  pub fn new(transport: TransportType) -> Self {
    Self {
      transport: Arc::new(transport),
      event_loop_sender: None,
      dummy_serializer: PhantomData,
    }
  }
}

impl<TransportType, SerializerType, OutboundMessageType, InboundMessageType>
  ButtplugConnector<OutboundMessageType, InboundMessageType>
  for ButtplugRemoteConnector<
    TransportType,
    SerializerType,
    OutboundMessageType,
    InboundMessageType,
  >
where
  TransportType: ButtplugConnectorTransport + 'static,
  SerializerType: ButtplugMessageSerializer<Inbound = InboundMessageType, Outbound = OutboundMessageType>
    + 'static,
  OutboundMessageType: ButtplugMessage + 'static,
  InboundMessageType: ButtplugMessage + 'static,
{
  fn connect(
    &mut self,
    message_version: ButtplugMessageSpecVersion,
    connector_incoming_sender: Sender<InboundMessageType>,
  ) -> BoxFuture<'static, Result<(), ButtplugConnectorError>> {
    if let Some(sender) = &self.event_loop_sender {
      // A live event loop still holds the receiving end.
      if !sender.is_closed() {
        return ButtplugConnectorError::ConnectorAlreadyConnected.into();
      }
    }
    let transport = self.transport.clone();
    let (connector_outgoing_sender, connector_outgoing_receiver) = channel(256);
    self.event_loop_sender = Some(connector_outgoing_sender);
    async move {
      let (transport_outgoing_sender, transport_outgoing_receiver) = channel(256);
      let (transport_incoming_sender, transport_incoming_receiver) = channel(256);
      match transport
        .connect(transport_outgoing_receiver, transport_incoming_sender)
        .await
      {
        // If we connect successfully, spin up our serializing event loop
        // between the connector channels and the transport channels.
        Result::Ok(()) => {
          let serializer = SerializerType::default();
          serializer.force_message_version(&message_version);
          async_manager::spawn(async move {
            remote_connector_event_loop::<
              TransportType,
              SerializerType,
              OutboundMessageType,
              InboundMessageType,
            >(
              serializer,
              connector_outgoing_receiver,
              connector_incoming_sender,
              transport,
              transport_outgoing_sender,
              transport_incoming_receiver,
            )
            .await
          });
          Result::Ok(())
        }
        Err(e) => Err(e),
      }
    }
    .boxed()
  }

  fn disconnect(&self) -> ButtplugConnectorResultFuture {
    if let Some(ref sender) = self.event_loop_sender {
      let sender_clone = sender.clone();
      async move {
        sender_clone
          .send(ButtplugRemoteConnectorMessage::Close)
          .await
          .map_err(|_| ButtplugConnectorError::ConnectorNotConnected)
      }
      .boxed()
    } else {
      ButtplugConnectorError::ConnectorNotConnected.into()
    }
  }

  fn send(&self, msg: OutboundMessageType) -> ButtplugConnectorResultFuture {
    if let Some(ref sender) = self.event_loop_sender {
      let sender_clone = sender.clone();
      async move {
        sender_clone
          .send(ButtplugRemoteConnectorMessage::Message(msg))
          .await
          .map_err(|_| ButtplugConnectorError::ConnectorNotConnected)
      }
      .boxed()
    } else {
      ButtplugConnectorError::ConnectorNotConnected.into()
    }
  }
}
