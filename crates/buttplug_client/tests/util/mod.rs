// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Test utilities: a channel backed transport plus a scripted "server" end,
//! so client tests can assert exact wire traffic without a network.

use buttplug_client::{
  core::{
    connector::{
      transport::{
        ButtplugConnectorTransport,
        ButtplugTransportIncomingMessage,
        TRANSPORT_RECEIVE_EVENT,
        TRANSPORT_SEND_EVENT,
      },
      ButtplugConnectorError,
      ButtplugConnectorResultFuture,
      ButtplugRemoteClientConnector,
    },
    event::EventManager,
    message::serializer::{ButtplugClientJSONSerializer, ButtplugSerializedMessage},
  },
  util::async_manager,
};
use futures::{future::BoxFuture, FutureExt};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tokio::sync::{
  mpsc::{channel, Receiver, Sender},
  Mutex,
  Notify,
};

/// Transport that moves frames over in-process channels instead of a socket.
pub struct ChannelTransport {
  external_sender: Sender<ButtplugSerializedMessage>,
  external_receiver: Arc<Mutex<Option<Receiver<ButtplugSerializedMessage>>>>,
  disconnect_notifier: Arc<Notify>,
  hooks: Arc<EventManager>,
}

impl ChannelTransport {
  pub fn new(
    disconnect_notifier: &Arc<Notify>,
    external_sender: Sender<ButtplugSerializedMessage>,
    external_receiver: Receiver<ButtplugSerializedMessage>,
  ) -> Self {
    Self {
      disconnect_notifier: disconnect_notifier.clone(),
      external_sender,
      external_receiver: Arc::new(Mutex::new(Some(external_receiver))),
      hooks: Arc::new(EventManager::default()),
    }
  }

  /// Lifecycle hooks, same contract as the websocket transport.
  pub fn hooks(&self) -> Arc<EventManager> {
    self.hooks.clone()
  }
}

impl ButtplugConnectorTransport for ChannelTransport {
  fn connect(
    &self,
    mut outgoing_receiver: Receiver<ButtplugSerializedMessage>,
    incoming_sender: Sender<ButtplugTransportIncomingMessage>,
  ) -> BoxFuture<'static, Result<(), ButtplugConnectorError>> {
    let notifier = self.disconnect_notifier.clone();
    let external_sender = self.external_sender.clone();
    let receiver_clone = self.external_receiver.clone();
    let hooks = self.hooks.clone();
    async move {
      async_manager::spawn(async move {
        let mut receiver = receiver_clone
          .lock()
          .await
          .take()
          .expect("Should only run once");
        loop {
          tokio::select! {
            _ = notifier.notified() => {
              let _ = incoming_sender
                .send(ButtplugTransportIncomingMessage::Close("Disconnect requested".to_owned()))
                .await;
              break;
            },
            outgoing_msg = outgoing_receiver.recv() => {
              if let Some(msg) = outgoing_msg {
                if let ButtplugSerializedMessage::Text(text) = &msg {
                  let _ = hooks.emit(TRANSPORT_SEND_EVENT, text, false);
                }
                external_sender.send(msg).await.expect("Test server should outlive transport");
              } else {
                break;
              }
            },
            incoming_msg = receiver.recv() => {
              if let Some(msg) = incoming_msg {
                if let ButtplugSerializedMessage::Text(text) = &msg {
                  let _ = hooks.emit(TRANSPORT_RECEIVE_EVENT, text, false);
                }
                incoming_sender
                  .send(ButtplugTransportIncomingMessage::Message(msg))
                  .await
                  .expect("Connector should outlive transport");
              } else {
                let _ = incoming_sender
                  .send(ButtplugTransportIncomingMessage::Close("Server hung up".to_owned()))
                  .await;
                break;
              }
            }
          };
        }
      });
      Ok(())
    }
    .boxed()
  }

  fn disconnect(&self) -> ButtplugConnectorResultFuture {
    let disconnect_notifier = self.disconnect_notifier.clone();
    async move {
      disconnect_notifier.notify_waiters();
      Ok(())
    }
    .boxed()
  }
}

/// The server end of a [ChannelTransport]: receives what the client sent,
/// scripted replies go back as raw JSON text.
pub struct ChannelServer {
  from_client: Receiver<ButtplugSerializedMessage>,
  to_client: Sender<ButtplugSerializedMessage>,
  disconnect_notifier: Arc<Notify>,
}

impl ChannelServer {
  /// Receives one message frame from the client, returning the message name,
  /// its field object, and its id.
  pub async fn expect_message(&mut self) -> (String, Value) {
    let frame = tokio::time::timeout(Duration::from_secs(5), self.from_client.recv())
      .await
      .expect("Timed out waiting for client message")
      .expect("Client hung up while test expected a message");
    let ButtplugSerializedMessage::Text(text) = frame else {
      panic!("Tests only deal in text frames");
    };
    let parsed: Value = serde_json::from_str(&text).expect("Client sent invalid JSON");
    let array = parsed.as_array().expect("Frame should be a JSON array");
    assert_eq!(array.len(), 1, "Tests expect one message per frame");
    let object = array[0].as_object().expect("Message should be an object");
    assert_eq!(object.len(), 1, "Message should have exactly one key");
    let (name, fields) = object.iter().next().expect("Already checked length");
    (name.clone(), fields.clone())
  }

  /// Asserts nothing arrives from the client for the given window.
  pub async fn expect_silence(&mut self, window: Duration) {
    if let Ok(Some(msg)) = tokio::time::timeout(window, self.from_client.recv()).await {
      panic!("Expected no client message, got {msg:?}");
    }
  }

  pub async fn send_raw(&self, text: &str) {
    self
      .to_client
      .send(ButtplugSerializedMessage::Text(text.to_owned()))
      .await
      .expect("Client should outlive test server");
  }

  pub async fn send_ok(&self, id: u64) {
    self.send_raw(&format!("[{{\"Ok\":{{\"Id\":{id}}}}}]")).await;
  }

  pub async fn send_error(&self, id: u64, code: u8, message: &str) {
    self
      .send_raw(&format!(
        "[{{\"Error\":{{\"Id\":{id},\"ErrorCode\":{code},\"ErrorMessage\":\"{message}\"}}}}]"
      ))
      .await;
  }

  /// Closes the connection from the server side.
  pub fn close(&self) {
    self.disconnect_notifier.notify_waiters();
  }
}

pub fn message_id(fields: &Value) -> u64 {
  fields["Id"].as_u64().expect("Message should carry an Id")
}

/// Builds a connector/server pair wired through channels, handing back the
/// transport's hook manager as well.
pub fn channel_connector_with_hooks() -> (
  ButtplugRemoteClientConnector<ChannelTransport, ButtplugClientJSONSerializer>,
  ChannelServer,
  Arc<EventManager>,
) {
  let (client_to_server_sender, client_to_server_receiver) = channel(256);
  let (server_to_client_sender, server_to_client_receiver) = channel(256);
  let disconnect_notifier = Arc::new(Notify::new());
  let transport = ChannelTransport::new(
    &disconnect_notifier,
    client_to_server_sender,
    server_to_client_receiver,
  );
  let hooks = transport.hooks();
  let server = ChannelServer {
    from_client: client_to_server_receiver,
    to_client: server_to_client_sender,
    disconnect_notifier,
  };
  (ButtplugRemoteClientConnector::new(transport), server, hooks)
}

/// Builds a connector/server pair wired through channels.
pub fn channel_connector() -> (
  ButtplugRemoteClientConnector<ChannelTransport, ButtplugClientJSONSerializer>,
  ChannelServer,
) {
  let (connector, server, _) = channel_connector_with_hooks();
  (connector, server)
}

/// Runs the server half of a handshake: answers RequestServerInfo with the
/// given ServerInfo fields and RequestDeviceList with the given device array.
/// Pings that interleave are answered as well.
pub async fn serve_handshake(
  server: &mut ChannelServer,
  server_info_fields: &str,
  devices_json: &str,
) {
  loop {
    let (name, fields) = server.expect_message().await;
    let id = message_id(&fields);
    match name.as_str() {
      "RequestServerInfo" => {
        server
          .send_raw(&format!("[{{\"ServerInfo\":{{\"Id\":{id},{server_info_fields}}}}}]"))
          .await;
      }
      "RequestDeviceList" => {
        server
          .send_raw(&format!(
            "[{{\"DeviceList\":{{\"Id\":{id},\"Devices\":{devices_json}}}}}]"
          ))
          .await;
        return;
      }
      "Ping" => server.send_ok(id).await,
      other => panic!("Unexpected message during handshake: {other}"),
    }
  }
}

/// ServerInfo fields for a v3 server with no ping requirement.
pub const V3_SERVER_INFO: &str =
  "\"MessageVersion\":3,\"MaxPingTime\":0,\"ServerName\":\"Test Server\"";

/// A v3 device with a vibrate scalar, a linear actuator, a rotatory actuator,
/// a battery sensor and a subscribable pressure sensor.
pub const V3_TEST_DEVICE: &str = r#"[{"DeviceIndex":0,"DeviceName":"Test Device","DeviceMessages":{"StopDeviceCmd":[{}],"ScalarCmd":[{"FeatureDescriptor":"Vibrator","StepCount":20,"ActuatorType":"Vibrate"}],"LinearCmd":[{"FeatureDescriptor":"Stroker","StepCount":100}],"RotateCmd":[{"FeatureDescriptor":"Rotator","StepCount":50}],"SensorReadCmd":[{"FeatureDescriptor":"Battery Level","SensorType":"Battery","SensorRange":[[0,100]]},{"FeatureDescriptor":"Pressure Sensor","SensorType":"Pressure","SensorRange":[[0,2048]]}],"SensorSubscribeCmd":[{"FeatureDescriptor":"Pressure Sensor","SensorType":"Pressure","SensorRange":[[0,2048]]}]}}]"#;
