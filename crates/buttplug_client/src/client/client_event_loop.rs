// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Implementation of the internal Buttplug Client event loop.

use super::{
  client_message_sorter::ClientMessageSorter,
  device::ButtplugClientDevice,
  ButtplugClientEvent,
  ButtplugClientMessageFuturePair,
  ButtplugClientMessageSender,
  ScanningState,
};
use crate::core::{
  connector::{ButtplugConnector, ButtplugConnectorError, ButtplugConnectorStateShared},
  errors::ButtplugError,
  message::{
    ButtplugClientMessage,
    ButtplugDeviceMessage,
    ButtplugMessage,
    ButtplugMessageValidator,
    ButtplugServerMessage,
    DeviceList,
    DeviceMessageInfo,
    BUTTPLUG_SERVER_EVENT_ID,
  },
};
use dashmap::DashMap;
use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};
use tokio::sync::{broadcast, mpsc, Mutex};

/// Enum used for communication from the client to the event loop.
#[derive(Clone)]
pub(crate) enum ButtplugClientRequest {
  /// Client request to disconnect, via the stored connector instance.
  Disconnect(ButtplugConnectorStateShared),
  /// Given a DeviceList message, update the internal device map and emit
  /// events for additions.
  HandleDeviceList(DeviceList),
  /// Client request to send a message via the connector.
  ///
  /// Bundled future should have reply set and waker called when this is
  /// finished.
  Message(ButtplugClientMessageFuturePair),
}

type SharedConnector =
  Arc<Mutex<Option<Box<dyn ButtplugConnector<ButtplugClientMessage, ButtplugServerMessage>>>>>;

/// Event loop for running [ButtplugClient][super::ButtplugClient] connections.
///
/// Acts as a hub between the connector and the client/device instances: it
/// correlates responses to outstanding requests by message id, maintains the
/// device registry on server initiated enumeration events, resolves the scan
/// future, and routes sensor readings to their subscription callbacks.
///
/// On disconnect it tears down: every outstanding request is failed with a
/// disconnect error, devices are marked removed, and a final ServerDisconnect
/// event is emitted. The loop cannot be used again; a new one is spawned on
/// the next connect.
pub(super) struct ButtplugClientEventLoop {
  /// Connected status from the client, cleared by the event loop on exit.
  connected_status: Arc<AtomicBool>,
  /// Connector the event loop will use to communicate with the server.
  connector: SharedConnector,
  /// Receiver for messages sent from the server via the connector.
  from_connector_receiver: mpsc::Receiver<ButtplugServerMessage>,
  /// Map of devices shared between the client and the event loop.
  device_map: Arc<DashMap<u32, Arc<ButtplugClientDevice>>>,
  /// The pending scan future, fulfilled on ScanningFinished.
  scanning_state: Arc<Mutex<Option<ScanningState>>>,
  /// Sends events to the client's event stream subscribers.
  to_client_sender: broadcast::Sender<ButtplugClientEvent>,
  /// Sender handed to new [ButtplugClientDevice] instances so their parts can
  /// route messages back through this loop.
  from_client_sender: Arc<ButtplugClientMessageSender>,
  /// Receives requests from client and device instances.
  from_client_receiver: broadcast::Receiver<ButtplugClientRequest>,
  sorter: ClientMessageSorter,
}

impl ButtplugClientEventLoop {
  pub fn new(
    connected_status: Arc<AtomicBool>,
    connector: SharedConnector,
    from_connector_receiver: mpsc::Receiver<ButtplugServerMessage>,
    to_client_sender: broadcast::Sender<ButtplugClientEvent>,
    from_client_sender: Arc<ButtplugClientMessageSender>,
    device_map: Arc<DashMap<u32, Arc<ButtplugClientDevice>>>,
    scanning_state: Arc<Mutex<Option<ScanningState>>>,
  ) -> Self {
    trace!("Creating ButtplugClientEventLoop instance.");
    Self {
      connected_status,
      connector,
      from_client_receiver: from_client_sender.subscribe(),
      from_client_sender,
      to_client_sender,
      from_connector_receiver,
      device_map,
      scanning_state,
      sorter: ClientMessageSorter::default(),
    }
  }

  fn send_client_event(&self, event: ButtplugClientEvent) {
    trace!("Forwarding event {:?} to client", event);
    if self.to_client_sender.receiver_count() == 0 {
      debug!("Client event {:?} dropped, no event stream subscribed.", event);
      return;
    }
    let _ = self.to_client_sender.send(event);
  }

  /// Creates a [ButtplugClientDevice] from a [DeviceMessageInfo] and adds it
  /// to the internal device map.
  fn create_client_device(&mut self, info: DeviceMessageInfo) -> Arc<ButtplugClientDevice> {
    debug!(
      "Creating client device {} ({}).",
      info.device_name(),
      info.device_index()
    );
    let device = Arc::new(ButtplugClientDevice::from_device_message_info(
      info,
      &self.from_client_sender,
    ));
    self.device_map.insert(device.index(), device.clone());
    device
  }

  fn disconnect_device(&mut self, device_index: u32) {
    let Some((_, device)) = self.device_map.remove(&device_index) else {
      return;
    };
    device.set_removed();
    debug!("Device removed: {} => {}", device_index, device.name());
    self.send_client_event(ButtplugClientEvent::DeviceRemoved(device));
  }

  /// Parse messages from the connector.
  ///
  /// Correlated responses resolve their pending request future; server
  /// initiated messages (id 0) update the device map, the scan future, or
  /// sensor subscriptions.
  async fn parse_connector_message(&mut self, msg: ButtplugServerMessage) {
    if let Err(err) = msg.is_valid() {
      error!("Message not valid: {:?} - Error: {}", msg, err);
      self.send_client_event(ButtplugClientEvent::Error(ButtplugError::from(err)));
      return;
    }

    if msg.id() != BUTTPLUG_SERVER_EVENT_ID {
      if !self.sorter.maybe_resolve_result(&msg) {
        error!("Message with unexpected Id received: {:?}", msg);
      }
      return;
    }

    trace!("Message is a server event: {:?}", msg);
    match msg {
      ButtplugServerMessage::ScanningFinished(_) => {
        debug!("Scanning finished.");
        let mut scanning_guard = self.scanning_state.lock().await;
        if let Some(scanning) = scanning_guard.take() {
          let devices = self
            .device_map
            .iter()
            .map(|kv| (*kv.key(), kv.value().clone()))
            .collect();
          scanning
            .state
            .lock()
            .expect("Future state lock is never poisoned")
            .set_reply(devices);
        }
        self.send_client_event(ButtplugClientEvent::ScanningFinished);
      }
      ButtplugServerMessage::DeviceAdded(msg) => {
        trace!("Device added, updating map and sending to client");
        if self.device_map.contains_key(&msg.device_index()) {
          error!(
            "Device index {} already exists in client. Server may be in a weird state.",
            msg.device_index()
          );
          return;
        }
        let device = self.create_client_device(msg.into());
        self.send_client_event(ButtplugClientEvent::DeviceAdded(device));
      }
      ButtplugServerMessage::DeviceRemoved(msg) => {
        if self.device_map.contains_key(&msg.device_index()) {
          trace!("Device removed, updating map and sending to client");
          self.disconnect_device(msg.device_index());
        } else {
          error!(
            "Received DeviceRemoved for non-existent device index {}",
            msg.device_index()
          );
        }
      }
      ButtplugServerMessage::SensorReading(msg) => {
        if let Some(device) = self.device_map.get(&msg.device_index()) {
          device.value().handle_sensor_reading(&msg);
        } else {
          error!(
            "Received sensor data from an unknown device: {}",
            msg.device_index()
          );
        }
      }
      ButtplugServerMessage::RawReading(msg) => {
        // Raw endpoints aren't projected as device parts, so subscription
        // data has nowhere to land yet.
        debug!(
          "Dropping raw reading from device {} endpoint {}.",
          msg.device_index(),
          msg.endpoint()
        );
      }
      ButtplugServerMessage::Error(err) => {
        // Should not happen for properly correlated request ids.
        error!("Unmatched error message received: {:?}", err);
        self.send_client_event(ButtplugClientEvent::Error(ButtplugError::from(&err)));
      }
      msg => {
        error!("Unexpected message received: {:?}", msg);
      }
    }
  }

  /// Send a message from the client or a device to the connector, registering
  /// its response future with the sorter.
  async fn send_message(&mut self, mut msg_fut: ButtplugClientMessageFuturePair) {
    if let Err(err) = msg_fut.msg.is_valid() {
      error!("Message not valid: {:?} - Error: {}", msg_fut.msg, err);
      msg_fut
        .waker
        .lock()
        .expect("Future state lock is never poisoned")
        .set_reply(Err(ButtplugError::from(err).into()));
      return;
    }

    self.sorter.register_future(&mut msg_fut);
    trace!("Sending message to connector: {:?}", msg_fut.msg);
    let connector_guard = self.connector.lock().await;
    let send_result = match connector_guard.as_ref() {
      Some(connector) => connector.send(msg_fut.msg).await,
      None => Err(ButtplugConnectorError::ConnectorNotConnected),
    };
    if send_result.is_err() {
      // The pending entry will be failed when the connector close propagates
      // back and the loop exits.
      error!("Sending message failed, connector most likely no longer connected.");
    }
  }

  /// Parses requests from the client, returning false when the loop should
  /// exit.
  async fn parse_client_request(&mut self, request: ButtplugClientRequest) -> bool {
    match request {
      ButtplugClientRequest::Message(msg_fut) => {
        self.send_message(msg_fut).await;
        true
      }
      ButtplugClientRequest::Disconnect(state) => {
        trace!("Client requested disconnect");
        let connector_guard = self.connector.lock().await;
        let result = match connector_guard.as_ref() {
          Some(connector) => connector.disconnect().await,
          None => Err(ButtplugConnectorError::ConnectorNotConnected),
        };
        state
          .lock()
          .expect("Future state lock is never poisoned")
          .set_reply(result);
        false
      }
      ButtplugClientRequest::HandleDeviceList(device_list) => {
        trace!("Device list received, updating map.");
        for info in device_list.into_device_infos() {
          if self.device_map.contains_key(&info.device_index()) {
            continue;
          }
          let device = self.create_client_device(info);
          self.send_client_event(ButtplugClientEvent::DeviceAdded(device));
        }
        true
      }
    }
  }

  /// Runs the event loop, returning once either the client or connector
  /// drops.
  pub async fn run(&mut self) {
    debug!("Running client event loop.");
    loop {
      tokio::select! {
        event = self.from_connector_receiver.recv() => match event {
          None => {
            info!("Connector disconnected, exiting loop.");
            break;
          }
          Some(msg) => {
            self.parse_connector_message(msg).await;
          }
        },
        request = self.from_client_receiver.recv() => match request {
          Err(_) => {
            info!("Client disconnected, exiting loop.");
            break;
          }
          Ok(request) => {
            if !self.parse_client_request(request).await {
              break;
            }
          }
        },
      };
    }

    debug!("Exiting client event loop, cleaning up.");
    // No response is coming for anything still in flight.
    self.sorter.fail_pending();
    // A scan that never finished resolves with whatever we have.
    {
      let mut scanning_guard = self.scanning_state.lock().await;
      if let Some(scanning) = scanning_guard.take() {
        let devices = self
          .device_map
          .iter()
          .map(|kv| (*kv.key(), kv.value().clone()))
          .collect();
        scanning
          .state
          .lock()
          .expect("Future state lock is never poisoned")
          .set_reply(devices);
      }
    }
    let device_indexes: Vec<u32> = self.device_map.iter().map(|kv| *kv.key()).collect();
    for device_index in device_indexes {
      self.disconnect_device(device_index);
    }
    self.connected_status.store(false, Ordering::SeqCst);
    self.send_client_event(ButtplugClientEvent::ServerDisconnect);
  }
}
