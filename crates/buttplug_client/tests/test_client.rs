// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

mod util;

use buttplug_client::{
  client::{ButtplugClient, ButtplugClientError, ButtplugClientEvent},
  core::{
    connector::ButtplugConnectorError,
    errors::{ButtplugError, ButtplugHandshakeError},
    message::ButtplugMessageSpecVersion,
  },
};
use futures::StreamExt;
use std::time::Duration;
use util::{
  channel_connector,
  channel_connector_with_hooks,
  message_id,
  serve_handshake,
  V3_SERVER_INFO,
  V3_TEST_DEVICE,
};

#[tokio::test]
async fn test_connect_and_handshake_v3() {
  let client = ButtplugClient::new("Test Client");
  let (connector, mut server) = channel_connector();
  let mut event_stream = client.event_stream();
  let server_task = tokio::spawn(async move {
    serve_handshake(&mut server, V3_SERVER_INFO, V3_TEST_DEVICE).await;
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  let server = server_task.await.expect("Test, assuming infallible.");
  assert!(client.connected());
  assert_eq!(client.server_name(), Some("Test Server".to_owned()));
  // The initial device list shows up as a DeviceAdded event.
  let event = event_stream.next().await.expect("Test, assuming infallible.");
  if let ButtplugClientEvent::DeviceAdded(device) = event {
    assert_eq!(device.name(), "Test Device");
    assert_eq!(device.index(), 0);
  } else {
    panic!("Expected DeviceAdded event, got {event:?}");
  }
  assert_eq!(client.devices().len(), 1);
  drop(server);
}

#[tokio::test]
async fn test_connect_and_handshake_v0() {
  let client =
    ButtplugClient::new_with_spec_version("Test Client", ButtplugMessageSpecVersion::Version0);
  let (connector, mut server) = channel_connector();
  let mut event_stream = client.event_stream();
  let server_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "RequestServerInfo");
    // The v0 handshake message has no MessageVersion field at all.
    assert!(fields.get("MessageVersion").is_none());
    let id = message_id(&fields);
    server
      .send_raw(&format!(
        "[{{\"ServerInfo\":{{\"Id\":{id},\"MajorVersion\":0,\"MinorVersion\":0,\"BuildVersion\":0,\"MessageVersion\":0,\"MaxPingTime\":0,\"ServerName\":\"Old Server\"}}}}]"
      ))
      .await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "RequestDeviceList");
    let id = message_id(&fields);
    server
      .send_raw(&format!(
        "[{{\"DeviceList\":{{\"Id\":{id},\"Devices\":[{{\"DeviceIndex\":1,\"DeviceName\":\"Launch\",\"DeviceMessages\":[\"StopDeviceCmd\",\"FleshlightLaunchFW12Cmd\"]}}]}}}}]"
      ))
      .await;
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  let _server = server_task.await.expect("Test, assuming infallible.");
  assert_eq!(client.server_name(), Some("Old Server".to_owned()));
  let event = event_stream.next().await.expect("Test, assuming infallible.");
  if let ButtplugClientEvent::DeviceAdded(device) = event {
    assert_eq!(device.name(), "Launch");
    assert_eq!(device.actuators().len(), 1);
  } else {
    panic!("Expected DeviceAdded event, got {event:?}");
  }
}

#[tokio::test]
async fn test_handshake_spec_version_mismatch() {
  let client = ButtplugClient::new("Test Client");
  let (connector, mut server) = channel_connector();
  let server_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "RequestServerInfo");
    let id = message_id(&fields);
    // Server only talks v2, client asked for v3.
    server
      .send_raw(&format!(
        "[{{\"ServerInfo\":{{\"Id\":{id},\"MessageVersion\":2,\"MaxPingTime\":0,\"ServerName\":\"Test Server\"}}}}]"
      ))
      .await;
    server
  });
  let result = client.connect(connector).await;
  let _server = server_task.await.expect("Test, assuming infallible.");
  assert!(matches!(
    result,
    Err(ButtplugClientError::ButtplugError(
      ButtplugError::ButtplugHandshakeError(ButtplugHandshakeError::MessageSpecVersionMismatch(
        _,
        _
      ))
    ))
  ));
  assert!(!client.connected());
}

#[tokio::test]
async fn test_reconnect_without_connector_fails() {
  let client = ButtplugClient::new("Test Client");
  assert!(matches!(
    client.reconnect().await,
    Err(ButtplugClientError::ReconnectError)
  ));
}

#[tokio::test]
async fn test_ping_loop_runs_at_half_max_ping_time() {
  let client = ButtplugClient::new("Test Client");
  let (connector, mut server) = channel_connector();
  let server_task = tokio::spawn(async move {
    serve_handshake(
      &mut server,
      "\"MessageVersion\":3,\"MaxPingTime\":100,\"ServerName\":\"Test Server\"",
      "[]",
    )
    .await;
    // Three keepalive pings at a 50ms interval.
    for _ in 0..3 {
      let (name, fields) = server.expect_message().await;
      assert_eq!(name, "Ping");
      server.send_ok(message_id(&fields)).await;
    }
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  let _server = server_task.await.expect("Test, assuming infallible.");
  client
    .disconnect()
    .await
    .expect("Test, assuming infallible.");
  assert!(!client.connected());
}

#[tokio::test]
async fn test_scanning_lifecycle() {
  let client = ButtplugClient::new("Test Client");
  let (connector, mut server) = channel_connector();
  let server_task = tokio::spawn(async move {
    serve_handshake(&mut server, V3_SERVER_INFO, V3_TEST_DEVICE).await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "StartScanning");
    server.send_ok(message_id(&fields)).await;
    // A second start_scanning while the scan runs must not hit the wire.
    server.expect_silence(Duration::from_millis(150)).await;
    server.send_raw("[{\"ScanningFinished\":{\"Id\":0}}]").await;
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");

  let scan_future = client
    .start_scanning()
    .await
    .expect("Test, assuming infallible.");
  // Idempotent: same scan, same handle, no extra StartScanning.
  let second_scan_future = client
    .start_scanning()
    .await
    .expect("Test, assuming infallible.");

  let devices = scan_future.await;
  assert!(devices.contains_key(&0));
  let devices_again = second_scan_future.await;
  assert!(devices_again.contains_key(&0));

  let _server = server_task.await.expect("Test, assuming infallible.");

  // The scan is over, so stopping now is an error.
  assert!(matches!(
    client.stop_scanning().await,
    Err(ButtplugClientError::ScanNotRunningError)
  ));
}

#[tokio::test]
async fn test_stop_scanning_sends_message_and_returns_future() {
  let client = ButtplugClient::new("Test Client");
  let (connector, mut server) = channel_connector();
  let server_task = tokio::spawn(async move {
    serve_handshake(&mut server, V3_SERVER_INFO, "[]").await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "StartScanning");
    server.send_ok(message_id(&fields)).await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "StopScanning");
    server.send_ok(message_id(&fields)).await;
    server.send_raw("[{\"ScanningFinished\":{\"Id\":0}}]").await;
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  client
    .start_scanning()
    .await
    .expect("Test, assuming infallible.");
  let scan_future = client
    .stop_scanning()
    .await
    .expect("Test, assuming infallible.");
  let devices = scan_future.await;
  assert!(devices.is_empty());
  let _server = server_task.await.expect("Test, assuming infallible.");
}

#[tokio::test]
async fn test_stop_all_devices() {
  let client = ButtplugClient::new("Test Client");
  let (connector, mut server) = channel_connector();
  let server_task = tokio::spawn(async move {
    serve_handshake(&mut server, V3_SERVER_INFO, "[]").await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "StopAllDevices");
    server.send_ok(message_id(&fields)).await;
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  client
    .stop_all_devices()
    .await
    .expect("Test, assuming infallible.");
  let _server = server_task.await.expect("Test, assuming infallible.");
}

#[tokio::test]
async fn test_transport_hooks_see_wire_traffic() {
  use buttplug_client::core::event::EventFlow;
  use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
  };

  let client = ButtplugClient::new("Test Client");
  let (connector, mut server, hooks) = channel_connector_with_hooks();
  let received_frames = Arc::new(AtomicU32::new(0));
  let sent_frames = Arc::new(AtomicU32::new(0));
  let received_clone = received_frames.clone();
  hooks.on(
    "receive",
    Box::new(move |_| {
      received_clone.fetch_add(1, Ordering::SeqCst);
      EventFlow::Continue
    }),
  );
  // A stop-chain callback registered first keeps later callbacks from
  // running.
  hooks.on(
    "send",
    Box::new(move |_| EventFlow::Stop),
  );
  let sent_clone = sent_frames.clone();
  hooks.on(
    "send",
    Box::new(move |_| {
      sent_clone.fetch_add(1, Ordering::SeqCst);
      EventFlow::Continue
    }),
  );
  let server_task = tokio::spawn(async move {
    serve_handshake(&mut server, V3_SERVER_INFO, "[]").await;
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  let _server = server_task.await.expect("Test, assuming infallible.");
  // ServerInfo and DeviceList both came through the receive hook; the send
  // counter stayed at zero because the first callback stopped the chain.
  assert_eq!(received_frames.load(Ordering::SeqCst), 2);
  assert_eq!(sent_frames.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_disconnect_fails_outstanding_requests() {
  let client = ButtplugClient::new("Test Client");
  let (connector, mut server) = channel_connector();
  let mut event_stream = client.event_stream();
  let server_task = tokio::spawn(async move {
    serve_handshake(&mut server, V3_SERVER_INFO, "[]").await;
    let (name, _) = server.expect_message().await;
    assert_eq!(name, "StopAllDevices");
    // No reply; hang up instead.
    server.close();
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  let result = client.stop_all_devices().await;
  assert!(matches!(
    result,
    Err(ButtplugClientError::ButtplugConnectorError(
      ButtplugConnectorError::Disconnected
    ))
  ));
  let _server = server_task.await.expect("Test, assuming infallible.");
  // The loop teardown also tells event listeners the server went away.
  loop {
    let event = event_stream.next().await.expect("Test, assuming infallible.");
    if matches!(event, ButtplugClientEvent::ServerDisconnect) {
      break;
    }
  }
  assert!(!client.connected());
}
