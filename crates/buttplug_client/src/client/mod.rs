// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Communications API for accessing Buttplug Servers

mod client_event_loop;
mod client_message_sorter;
mod device;
mod device_actuator;
mod device_sensor;

pub use device::ButtplugClientDevice;
pub use device_actuator::{
  ButtplugClientActuator,
  FleshlightLaunchFW12Actuator,
  KiirooActuator,
  LinearActuator,
  LovenseActuator,
  RotatoryActuator,
  ScalarActuator,
  SingleMotorVibrateActuator,
  VibrateActuator,
  VorzeA10CycloneActuator,
};
pub use device_sensor::{
  BatteryLevelSensor,
  ButtplugClientSensor,
  GenericSensor,
  RssiLevelSensor,
  SensorDataCallback,
  SubscribableSensor,
};

use crate::{
  core::{
    connector::{ButtplugConnector, ButtplugConnectorError, ButtplugConnectorFuture, ButtplugConnectorStateShared},
    errors::{ButtplugError, ButtplugHandshakeError, ButtplugMessageError},
    message::{
      ButtplugClientMessage,
      ButtplugMessageSpecVersion,
      ButtplugServerMessage,
      DeviceList,
      Ping,
      RequestDeviceList,
      RequestServerInfo,
      StartScanning,
      StopAllDevices,
      StopScanning,
      BUTTPLUG_CURRENT_MESSAGE_SPEC_VERSION,
    },
  },
  util::{
    async_manager,
    future::{ButtplugFuture, ButtplugFutureStateShared},
  },
};
use client_event_loop::{ButtplugClientEventLoop, ButtplugClientRequest};
use dashmap::DashMap;
use futures::{
  future::{self, BoxFuture, RemoteHandle, Shared},
  FutureExt,
  Stream,
  StreamExt,
};
use std::{
  collections::HashMap,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
    Mutex as StdMutex,
  },
  time::Duration,
};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_util::sync::CancellationToken;

pub type ButtplugClientResult<T = ()> = Result<T, ButtplugClientError>;
pub type ButtplugClientResultFuture<T = ()> = BoxFuture<'static, ButtplugClientResult<T>>;

/// Result of a client request: the correlated server response, or the error
/// the request failed with.
pub type ButtplugClientMessageResult = Result<ButtplugServerMessage, ButtplugClientError>;
pub type ButtplugClientMessageStateShared = ButtplugFutureStateShared<ButtplugClientMessageResult>;
pub type ButtplugClientMessageFuture = ButtplugFuture<ButtplugClientMessageResult>;

/// Snapshot of the devices the client currently knows about, by device index.
pub type ButtplugClientDeviceMap = HashMap<u32, Arc<ButtplugClientDevice>>;

/// Future fulfilled with the device map when a device scan finishes. Shared:
/// concurrent scan callers all hold the same underlying future.
pub type ButtplugScanningFuture = Shared<ButtplugFuture<ButtplugClientDeviceMap>>;

/// Represents all of the different types of errors a ButtplugClient can
/// return, either from the protocol itself or from the connection to the
/// server.
#[derive(Debug, Error)]
pub enum ButtplugClientError {
  /// Connector error
  #[error(transparent)]
  ButtplugConnectorError(#[from] ButtplugConnectorError),
  /// Protocol error
  #[error(transparent)]
  ButtplugError(#[from] ButtplugError),
  /// Cannot reconnect: no connector was ever provided via connect().
  #[error("Cannot reconnect, no connector was ever provided via connect().")]
  ReconnectError,
  /// Scan stop requested while no scan was running.
  #[error("No device scan currently running.")]
  ScanNotRunningError,
}

pub(crate) fn create_boxed_future_client_error<T>(err: ButtplugError) -> ButtplugClientResultFuture<T>
where
  T: Send + 'static,
{
  future::ready(Err(ButtplugClientError::ButtplugError(err))).boxed()
}

/// Enum representing different events that can be emitted by a client.
///
/// These events are created by the server and sent to the client, and
/// represent unrequested actions that the client will need to respond to, or
/// that applications using the client may be interested in.
#[derive(Debug, Clone)]
pub enum ButtplugClientEvent {
  /// Emitted when a scanning session (started via a StartScanning call on
  /// [ButtplugClient]) has finished.
  ScanningFinished,
  /// Emitted when a device has been added to the server.
  DeviceAdded(Arc<ButtplugClientDevice>),
  /// Emitted when a device has been removed from the server.
  DeviceRemoved(Arc<ButtplugClientDevice>),
  /// Emitted when the ping loop stops because a ping could not be delivered.
  PingTimeout,
  /// Emitted when a client connector detects that the server has
  /// disconnected.
  ServerDisconnect,
  /// Emitted for errors that are not responses to outstanding requests, like
  /// server initiated Error messages.
  Error(ButtplugError),
}

/// Pairing of a message going out to the server and the future its response
/// will resolve.
#[derive(Clone)]
pub struct ButtplugClientMessageFuturePair {
  pub msg: ButtplugClientMessage,
  pub waker: ButtplugClientMessageStateShared,
}

impl ButtplugClientMessageFuturePair {
  pub fn new(msg: ButtplugClientMessage, waker: ButtplugClientMessageStateShared) -> Self {
    Self { msg, waker }
  }
}

/// Sender that hands messages from client/device instances over to the client
/// event loop, pairing each with a response future.
pub struct ButtplugClientMessageSender {
  sender: broadcast::Sender<ButtplugClientRequest>,
}

impl Default for ButtplugClientMessageSender {
  fn default() -> Self {
    let (sender, _) = broadcast::channel(256);
    Self { sender }
  }
}

impl ButtplugClientMessageSender {
  pub(crate) fn subscribe(&self) -> broadcast::Receiver<ButtplugClientRequest> {
    self.sender.subscribe()
  }

  pub(crate) fn send_client_request(
    &self,
    request: ButtplugClientRequest,
  ) -> Result<(), ButtplugClientError> {
    self
      .sender
      .send(request)
      .map(|_| ())
      .map_err(|_| ButtplugConnectorError::ConnectorNotConnected.into())
  }

  /// Sends a message to the server, returning a future that resolves with the
  /// correlated response.
  pub fn send_message(
    &self,
    msg: ButtplugClientMessage,
  ) -> ButtplugClientResultFuture<ButtplugServerMessage> {
    let fut = ButtplugClientMessageFuture::default();
    let pair = ButtplugClientMessageFuturePair::new(msg, fut.get_state_clone());
    let send_result = self.send_client_request(ButtplugClientRequest::Message(pair));
    async move {
      send_result?;
      fut.await
    }
    .boxed()
  }

  /// Sends a message to the server, expecting an [Ok][crate::core::message::Ok]
  /// back. Server Error responses surface as their typed
  /// [ButtplugServerError][crate::core::errors::ButtplugServerError] class,
  /// anything else is an unexpected message error.
  pub fn send_message_expect_ok(&self, msg: ButtplugClientMessage) -> ButtplugClientResultFuture {
    let send_fut = self.send_message(msg);
    async move {
      match send_fut.await? {
        ButtplugServerMessage::Ok(_) => Ok(()),
        ButtplugServerMessage::Error(err) => Err(ButtplugError::from(&err).into()),
        msg => Err(
          ButtplugError::ButtplugMessageError(ButtplugMessageError::UnexpectedMessageType(
            format!("{msg:?}"),
          ))
          .into(),
        ),
      }
    }
    .boxed()
  }
}

/// Scan bookkeeping shared between the client API and the event loop: the
/// shared future scan callers hold, and the state used to fulfill it.
#[derive(Clone)]
pub(crate) struct ScanningState {
  pub shared: ButtplugScanningFuture,
  pub state: ButtplugFutureStateShared<ButtplugClientDeviceMap>,
}

struct PingTask {
  token: CancellationToken,
  handle: RemoteHandle<()>,
}

type SharedConnector =
  Arc<Mutex<Option<Box<dyn ButtplugConnector<ButtplugClientMessage, ButtplugServerMessage>>>>>;

/// Struct used by applications to communicate with a Buttplug Server.
///
/// Clients serve a few different purposes:
/// - Managing the connection to a server, through a
///   [ButtplugConnector]
/// - Driving the protocol handshake and keepalive ping
/// - Holding the [ButtplugClientDevice] registry and emitting device events
///
/// The client picks the message spec version it will speak at construction
/// time and negotiates it during the handshake; every message sent afterwards
/// is projected through that version.
pub struct ButtplugClient {
  /// The client name. Depending on the connection type and server being used,
  /// this name is sometimes shown on the server logs or GUI.
  client_name: String,
  /// The message spec version negotiated with the server.
  spec_version: ButtplugMessageSpecVersion,
  /// The server name. Once connected, this contains the name of the server,
  /// so we can know what we're connected to.
  server_name: Arc<StdMutex<Option<String>>>,
  /// True once the handshake has finished, false after disconnect.
  connected_status: Arc<AtomicBool>,
  /// Sender to relay messages to the internal client loop.
  message_sender: Arc<ButtplugClientMessageSender>,
  /// Broadcasts events to whoever holds an event stream.
  event_sender: broadcast::Sender<ButtplugClientEvent>,
  /// Map of devices shared between the client and the event loop.
  device_registry: Arc<DashMap<u32, Arc<ButtplugClientDevice>>>,
  /// The pending scan, if any. Fulfilled by ScanningFinished.
  scanning_state: Arc<Mutex<Option<ScanningState>>>,
  /// The connector, kept so reconnect() can reuse it.
  connector: SharedConnector,
  /// Keepalive loop, running whenever the server advertises a nonzero max
  /// ping time.
  ping_task: StdMutex<Option<PingTask>>,
}

impl ButtplugClient {
  /// Creates a client that will speak the latest message spec version.
  pub fn new(name: &str) -> Self {
    Self::new_with_spec_version(name, BUTTPLUG_CURRENT_MESSAGE_SPEC_VERSION)
  }

  /// Creates a client pinned to a specific message spec version. Useful for
  /// talking to older servers.
  pub fn new_with_spec_version(name: &str, spec_version: ButtplugMessageSpecVersion) -> Self {
    let (event_sender, _) = broadcast::channel(256);
    Self {
      client_name: name.to_owned(),
      spec_version,
      server_name: Arc::new(StdMutex::new(None)),
      connected_status: Arc::new(AtomicBool::new(false)),
      message_sender: Arc::new(ButtplugClientMessageSender::default()),
      event_sender,
      device_registry: Arc::new(DashMap::new()),
      scanning_state: Arc::new(Mutex::new(None)),
      connector: Arc::new(Mutex::new(None)),
      ping_task: StdMutex::new(None),
    }
  }

  pub fn client_name(&self) -> &String {
    &self.client_name
  }

  pub fn spec_version(&self) -> ButtplugMessageSpecVersion {
    self.spec_version
  }

  /// Returns true if client is currently connected to server.
  pub fn connected(&self) -> bool {
    self.connected_status.load(Ordering::SeqCst)
  }

  /// Name the server reported during the handshake, if connected.
  pub fn server_name(&self) -> Option<String> {
    self
      .server_name
      .lock()
      .expect("Server name lock is never poisoned")
      .clone()
  }

  /// Snapshot of the devices currently connected to the server.
  pub fn devices(&self) -> ButtplugClientDeviceMap {
    self
      .device_registry
      .iter()
      .map(|kv| (*kv.key(), kv.value().clone()))
      .collect()
  }

  /// Stream of [ButtplugClientEvent]s: device arrivals/removals, scanning
  /// completion, disconnects.
  pub fn event_stream(&self) -> impl Stream<Item = ButtplugClientEvent> {
    let receiver = self.event_sender.subscribe();
    futures::stream::unfold(receiver, |mut receiver| async move {
      loop {
        match receiver.recv().await {
          Ok(event) => return Some((event, receiver)),
          Err(broadcast::error::RecvError::Lagged(count)) => {
            warn!("Event stream lagged, {} events dropped.", count);
            continue;
          }
          Err(broadcast::error::RecvError::Closed) => return None,
        }
      }
    })
    .boxed()
  }

  /// Connects to a server through the given connector and runs the handshake
  /// flow: RequestServerInfo, ping loop setup, initial device list retrieval.
  /// Devices known to the server show up as
  /// [ButtplugClientEvent::DeviceAdded] events and in [ButtplugClient::devices].
  pub async fn connect(
    &self,
    connector: impl ButtplugConnector<ButtplugClientMessage, ButtplugServerMessage> + 'static,
  ) -> ButtplugClientResult {
    debug!("Running client connection.");
    {
      let mut connector_guard = self.connector.lock().await;
      *connector_guard = Some(Box::new(connector));
    }
    self.connect_internal().await
  }

  /// Connects again using the connector a previous [ButtplugClient::connect]
  /// call provided. Fails with [ButtplugClientError::ReconnectError] if
  /// connect was never called.
  pub async fn reconnect(&self) -> ButtplugClientResult {
    if self.connector.lock().await.is_none() {
      error!("Reconnect called before any connector was provided.");
      return Err(ButtplugClientError::ReconnectError);
    }
    self.connect_internal().await
  }

  async fn connect_internal(&self) -> ButtplugClientResult {
    let (connector_sender, connector_receiver) = mpsc::channel(256);
    {
      let mut connector_guard = self.connector.lock().await;
      let connector = connector_guard
        .as_mut()
        .ok_or(ButtplugClientError::ReconnectError)?;
      connector.connect(self.spec_version, connector_sender).await?;
    }

    debug!("Connection established, starting client event loop.");
    let mut event_loop = ButtplugClientEventLoop::new(
      self.connected_status.clone(),
      self.connector.clone(),
      connector_receiver,
      self.event_sender.clone(),
      self.message_sender.clone(),
      self.device_registry.clone(),
      self.scanning_state.clone(),
    );
    async_manager::spawn(async move { event_loop.run().await });

    self.handshake().await
  }

  // Runs the handshake flow with the server.
  //
  // Sends over RequestServerInfo, gets back ServerInfo, sets up the ping loop
  // if needed, then requests the initial device list.
  async fn handshake(&self) -> ButtplugClientResult {
    info!("Running handshake with server.");
    let msg = self
      .message_sender
      .send_message(RequestServerInfo::new(&self.client_name, self.spec_version).into())
      .await?;
    match msg {
      ButtplugServerMessage::ServerInfo(server_info) => {
        info!("Connected to {}", server_info.server_name());
        if server_info.message_version() < self.spec_version {
          self.teardown_failed_handshake().await;
          return Err(
            ButtplugError::from(ButtplugHandshakeError::MessageSpecVersionMismatch(
              server_info.message_version(),
              self.spec_version,
            ))
            .into(),
          );
        }
        *self
          .server_name
          .lock()
          .expect("Server name lock is never poisoned") = Some(server_info.server_name().clone());
        self.connected_status.store(true, Ordering::SeqCst);

        if server_info.max_ping_time() > 0 {
          self.spawn_ping_loop(server_info.max_ping_time());
        }

        // Get currently connected devices. The event loop will handle
        // building them and emitting DeviceAdded events.
        let device_list_msg = self
          .message_sender
          .send_message(RequestDeviceList::new().into())
          .await?;
        match device_list_msg {
          ButtplugServerMessage::DeviceList(device_list) => {
            self.handle_device_list(device_list)?;
            Ok(())
          }
          msg => Err(
            ButtplugError::ButtplugMessageError(ButtplugMessageError::UnexpectedMessageType(
              format!("{msg:?}"),
            ))
            .into(),
          ),
        }
      }
      ButtplugServerMessage::Error(err) => {
        self.teardown_failed_handshake().await;
        Err(ButtplugError::from(&err).into())
      }
      msg => {
        self.teardown_failed_handshake().await;
        Err(
          ButtplugError::from(ButtplugHandshakeError::UnexpectedHandshakeMessageReceived(
            format!("{msg:?}"),
          ))
          .into(),
        )
      }
    }
  }

  // The server refused or botched the handshake, so don't leave the
  // connection dangling.
  async fn teardown_failed_handshake(&self) {
    let fut = ButtplugConnectorFuture::default();
    if self.send_disconnect_request(fut.get_state_clone()).is_ok() {
      let _ = fut.await;
    }
  }

  fn handle_device_list(&self, device_list: DeviceList) -> ButtplugClientResult {
    self
      .message_sender
      .send_client_request(ButtplugClientRequest::HandleDeviceList(device_list))
  }

  fn spawn_ping_loop(&self, max_ping_time: u32) {
    let interval = Duration::from_millis((max_ping_time / 2) as u64);
    info!("Starting ping loop with an interval of {:?}", interval);
    let message_sender = self.message_sender.clone();
    let event_sender = self.event_sender.clone();
    let token = CancellationToken::new();
    let child_token = token.child_token();
    let ping_loop = async move {
      loop {
        let ping_result = tokio::select! {
          _ = child_token.cancelled() => break,
          result = message_sender.send_message_expect_ok(ButtplugClientMessage::Ping(Ping::new())) => result,
        };
        if let Err(err) = ping_result {
          warn!("Ping not answered, exiting ping loop: {}", err);
          let _ = event_sender.send(ButtplugClientEvent::PingTimeout);
          break;
        }
        tokio::select! {
          _ = child_token.cancelled() => break,
          _ = tokio::time::sleep(interval) => {}
        }
      }
      debug!("Exiting ping loop.");
    };
    match async_manager::spawn_with_handle(ping_loop) {
      Ok(handle) => {
        *self
          .ping_task
          .lock()
          .expect("Ping task lock is never poisoned") = Some(PingTask { token, handle });
      }
      Err(err) => error!("Cannot spawn ping loop: {:?}", err),
    }
  }

  /// Tells the server to start scanning for devices. Returns a shared future
  /// that resolves with the device map once scanning finishes; calling this
  /// again while a scan is running returns the same future without sending
  /// another StartScanning.
  pub async fn start_scanning(&self) -> ButtplugClientResult<ButtplugScanningFuture> {
    // The scan slot lock is never held across sends: the event loop takes it
    // to resolve ScanningFinished, and blocking that would wedge the loop.
    let (shared, newly_started) = {
      let mut scanning_guard = self.scanning_state.lock().await;
      if let Some(scanning) = &*scanning_guard {
        debug!("Scan already running, handing out the existing future.");
        (scanning.shared.clone(), false)
      } else {
        let fut = ButtplugFuture::default();
        let state = fut.get_state_clone();
        let shared = fut.shared();
        *scanning_guard = Some(ScanningState {
          shared: shared.clone(),
          state,
        });
        (shared, true)
      }
    };
    if newly_started {
      if let Err(err) = self
        .message_sender
        .send_message_expect_ok(StartScanning::new().into())
        .await
      {
        *self.scanning_state.lock().await = None;
        return Err(err);
      }
    }
    Ok(shared)
  }

  /// Tells the server to stop the running scan, returning the scan future so
  /// the caller can still await the final device map. Fails with
  /// [ButtplugClientError::ScanNotRunningError] if no scan is running.
  pub async fn stop_scanning(&self) -> ButtplugClientResult<ButtplugScanningFuture> {
    // Snapshot the future first: ScanningFinished may arrive and clear the
    // slot before we regain control after the send.
    let shared = {
      let scanning_guard = self.scanning_state.lock().await;
      match &*scanning_guard {
        Some(scanning) => scanning.shared.clone(),
        None => return Err(ButtplugClientError::ScanNotRunningError),
      }
    };
    self
      .message_sender
      .send_message_expect_ok(StopScanning::new().into())
      .await?;
    Ok(shared)
  }

  /// Tells the server to stop all devices it controls.
  pub async fn stop_all_devices(&self) -> ButtplugClientResult {
    self
      .message_sender
      .send_message_expect_ok(StopAllDevices::new().into())
      .await
  }

  /// Disconnects from the server: stops the ping loop (waiting for it to
  /// exit), then closes the connector. Outstanding requests resolve with a
  /// disconnect error.
  pub async fn disconnect(&self) -> ButtplugClientResult {
    let ping_task = self
      .ping_task
      .lock()
      .expect("Ping task lock is never poisoned")
      .take();
    if let Some(ping_task) = ping_task {
      ping_task.token.cancel();
      ping_task.handle.await;
    }

    let fut = ButtplugConnectorFuture::default();
    self.send_disconnect_request(fut.get_state_clone())?;
    fut.await?;
    self.connected_status.store(false, Ordering::SeqCst);
    Ok(())
  }

  fn send_disconnect_request(
    &self,
    state: ButtplugConnectorStateShared,
  ) -> Result<(), ButtplugClientError> {
    self
      .message_sender
      .send_client_request(ButtplugClientRequest::Disconnect(state))
  }
}
