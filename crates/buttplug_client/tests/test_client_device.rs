// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

mod util;

use buttplug_client::{
  client::{
    ButtplugClient,
    ButtplugClientActuator,
    ButtplugClientDevice,
    ButtplugClientError,
    ButtplugClientEvent,
    ButtplugClientSensor,
  },
  core::{
    errors::{ButtplugDeviceError, ButtplugError, ButtplugServerError},
    message::ButtplugMessageSpecVersion,
  },
};
use futures::StreamExt;
use std::{
  sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
    Mutex,
  },
  time::{Duration, Instant},
};
use util::{channel_connector, message_id, serve_handshake, ChannelServer, V3_SERVER_INFO, V3_TEST_DEVICE};

/// Connects a client against a scripted server and waits for the first
/// device from the initial device list.
async fn connect_with_device(
  client: &ButtplugClient,
  devices_json: &'static str,
) -> (Arc<ButtplugClientDevice>, tokio::task::JoinHandle<ChannelServer>) {
  let (connector, mut server) = channel_connector();
  let mut event_stream = client.event_stream();
  let server_task = tokio::spawn(async move {
    serve_handshake(&mut server, V3_SERVER_INFO, devices_json).await;
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  loop {
    let event = event_stream.next().await.expect("Test, assuming infallible.");
    if let ButtplugClientEvent::DeviceAdded(device) = event {
      return (device, server_task);
    }
  }
}

#[tokio::test]
async fn test_scalar_command_wire_format() {
  let client = ButtplugClient::new("Test Client");
  let (device, server_task) = connect_with_device(&client, V3_TEST_DEVICE).await;
  let mut server = server_task.await.expect("Test, assuming infallible.");

  let ButtplugClientActuator::Scalar(actuator) = &device.actuators()[0] else {
    panic!("Expected scalar actuator");
  };
  let reply_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "ScalarCmd");
    assert_eq!(fields["DeviceIndex"], 0);
    assert_eq!(fields["Scalars"][0]["Index"], 0);
    assert_eq!(fields["Scalars"][0]["Scalar"], 0.5);
    assert_eq!(fields["Scalars"][0]["ActuatorType"], "Vibrate");
    server.send_ok(message_id(&fields)).await;
    server
  });
  actuator
    .command(0.5)
    .await
    .expect("Test, assuming infallible.");
  reply_task.await.expect("Test, assuming infallible.");
}

#[tokio::test]
async fn test_linear_and_rotate_command_wire_format() {
  let client = ButtplugClient::new("Test Client");
  let (device, server_task) = connect_with_device(&client, V3_TEST_DEVICE).await;
  let mut server = server_task.await.expect("Test, assuming infallible.");

  let linear = device.linear_actuators()[0].clone();
  let rotatory = device.rotatory_actuators()[0].clone();
  let reply_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "LinearCmd");
    assert_eq!(fields["Vectors"][0]["Duration"], 500);
    assert_eq!(fields["Vectors"][0]["Position"], 0.25);
    server.send_ok(message_id(&fields)).await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "RotateCmd");
    assert_eq!(fields["Rotations"][0]["Speed"], 0.75);
    assert_eq!(fields["Rotations"][0]["Clockwise"], true);
    server.send_ok(message_id(&fields)).await;
    server
  });
  linear
    .command(500, 0.25)
    .await
    .expect("Test, assuming infallible.");
  rotatory
    .command(0.75, true)
    .await
    .expect("Test, assuming infallible.");
  reply_task.await.expect("Test, assuming infallible.");
}

#[tokio::test]
async fn test_command_out_of_range_rejected_without_wire_traffic() {
  let client = ButtplugClient::new("Test Client");
  let (device, server_task) = connect_with_device(&client, V3_TEST_DEVICE).await;
  let mut server = server_task.await.expect("Test, assuming infallible.");

  let ButtplugClientActuator::Scalar(actuator) = &device.actuators()[0] else {
    panic!("Expected scalar actuator");
  };
  let result = actuator.command(1.5).await;
  assert!(matches!(
    result,
    Err(ButtplugClientError::ButtplugError(
      ButtplugError::ButtplugMessageError(_)
    ))
  ));
  server.expect_silence(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_server_error_response_surfaces_typed() {
  let client = ButtplugClient::new("Test Client");
  let (device, server_task) = connect_with_device(&client, V3_TEST_DEVICE).await;
  let mut server = server_task.await.expect("Test, assuming infallible.");

  let stop_fut = device.stop();
  let reply_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "StopDeviceCmd");
    server
      .send_error(message_id(&fields), 4, "Device disappeared")
      .await;
    server
  });
  let result = stop_fut.await;
  assert!(matches!(
    result,
    Err(ButtplugClientError::ButtplugError(
      ButtplugError::ButtplugServerError(ButtplugServerError::DeviceServerError(_))
    ))
  ));
  reply_task.await.expect("Test, assuming infallible.");
}

#[tokio::test]
async fn test_vibrate_command_v1() {
  let client =
    ButtplugClient::new_with_spec_version("Test Client", ButtplugMessageSpecVersion::Version1);
  let (connector, mut server) = channel_connector();
  let mut event_stream = client.event_stream();
  let server_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "RequestServerInfo");
    assert_eq!(fields["MessageVersion"], 1);
    let id = message_id(&fields);
    server
      .send_raw(&format!(
        "[{{\"ServerInfo\":{{\"Id\":{id},\"MajorVersion\":1,\"MinorVersion\":0,\"BuildVersion\":0,\"MessageVersion\":1,\"MaxPingTime\":0,\"ServerName\":\"Test Server\"}}}}]"
      ))
      .await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "RequestDeviceList");
    let id = message_id(&fields);
    server
      .send_raw(&format!(
        "[{{\"DeviceList\":{{\"Id\":{id},\"Devices\":[{{\"DeviceIndex\":3,\"DeviceName\":\"Nora\",\"DeviceMessages\":{{\"StopDeviceCmd\":{{}},\"VibrateCmd\":{{\"FeatureCount\":2}}}}}}]}}}}]"
      ))
      .await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "VibrateCmd");
    assert_eq!(fields["DeviceIndex"], 3);
    assert_eq!(fields["Speeds"][0]["Index"], 1);
    assert_eq!(fields["Speeds"][0]["Speed"], 1.0);
    server.send_ok(message_id(&fields)).await;
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  let device = loop {
    let event = event_stream.next().await.expect("Test, assuming infallible.");
    if let ButtplugClientEvent::DeviceAdded(device) = event {
      break device;
    }
  };
  assert_eq!(device.actuators().len(), 2);
  let ButtplugClientActuator::Vibrate(actuator) = &device.actuators()[1] else {
    panic!("Expected vibrate actuator");
  };
  actuator
    .command(1.0)
    .await
    .expect("Test, assuming infallible.");
  server_task.await.expect("Test, assuming infallible.");
}

#[tokio::test]
async fn test_battery_read_v2() {
  let client =
    ButtplugClient::new_with_spec_version("Test Client", ButtplugMessageSpecVersion::Version2);
  let (connector, mut server) = channel_connector();
  let mut event_stream = client.event_stream();
  let server_task = tokio::spawn(async move {
    serve_handshake(
      &mut server,
      "\"MessageVersion\":2,\"MaxPingTime\":0,\"ServerName\":\"Test Server\"",
      "[{\"DeviceIndex\":0,\"DeviceName\":\"Hush\",\"DeviceMessages\":{\"StopDeviceCmd\":{},\"VibrateCmd\":{\"FeatureCount\":1,\"StepCount\":[20]},\"BatteryLevelCmd\":{},\"RSSILevelCmd\":{}}}]",
    )
    .await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "BatteryLevelCmd");
    let id = message_id(&fields);
    server
      .send_raw(&format!(
        "[{{\"BatteryLevelReading\":{{\"Id\":{id},\"DeviceIndex\":0,\"BatteryLevel\":0.5}}}}]"
      ))
      .await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "RSSILevelCmd");
    let id = message_id(&fields);
    server
      .send_raw(&format!(
        "[{{\"RSSILevelReading\":{{\"Id\":{id},\"DeviceIndex\":0,\"RSSILevel\":-40}}}}]"
      ))
      .await;
    server
  });
  client
    .connect(connector)
    .await
    .expect("Test, assuming infallible.");
  let device = loop {
    let event = event_stream.next().await.expect("Test, assuming infallible.");
    if let ButtplugClientEvent::DeviceAdded(device) = event {
      break device;
    }
  };
  let ButtplugClientSensor::BatteryLevel(battery) = &device.sensors()[0] else {
    panic!("Expected battery sensor");
  };
  assert_eq!(
    battery.read().await.expect("Test, assuming infallible."),
    0.5
  );
  let ButtplugClientSensor::RssiLevel(rssi) = &device.sensors()[1] else {
    panic!("Expected RSSI sensor");
  };
  assert_eq!(rssi.read().await.expect("Test, assuming infallible."), -40);
  server_task.await.expect("Test, assuming infallible.");
}

// A v3 device whose only sensor is a subscribable pressure sensor at sensor
// index 0.
const PRESSURE_DEVICE: &str = r#"[{"DeviceIndex":0,"DeviceName":"Pressure Pad","DeviceMessages":{"StopDeviceCmd":[{}],"SensorReadCmd":[{"FeatureDescriptor":"Pressure Sensor","SensorType":"Pressure","SensorRange":[[0,2048]]}],"SensorSubscribeCmd":[{"FeatureDescriptor":"Pressure Sensor","SensorType":"Pressure","SensorRange":[[0,2048]]}]}}]"#;

#[tokio::test]
async fn test_sensor_subscription_lifecycle() {
  let client = ButtplugClient::new("Test Client");
  let (device, server_task) = connect_with_device(&client, PRESSURE_DEVICE).await;
  let mut server = server_task.await.expect("Test, assuming infallible.");

  let ButtplugClientSensor::Subscribable(sensor) = &device.sensors()[0] else {
    panic!("Expected subscribable sensor");
  };
  let readings = Arc::new(Mutex::new(Vec::<Vec<i32>>::new()));
  let invocations = Arc::new(AtomicU32::new(0));

  let readings_clone = readings.clone();
  let invocations_clone = invocations.clone();
  let subscribe_fut = sensor.subscribe(Box::new(move |data| {
    invocations_clone.fetch_add(1, Ordering::SeqCst);
    readings_clone
      .lock()
      .expect("Test, assuming infallible.")
      .push(data.to_vec());
  }));
  let reply_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "SensorSubscribeCmd");
    assert_eq!(fields["SensorIndex"], 0);
    assert_eq!(fields["SensorType"], "Pressure");
    server.send_ok(message_id(&fields)).await;
    server
  });
  subscribe_fut.await.expect("Test, assuming infallible.");
  let mut server = reply_task.await.expect("Test, assuming infallible.");

  // Server initiated reading lands in the callback exactly once.
  server
    .send_raw(
      "[{\"SensorReading\":{\"Id\":0,\"DeviceIndex\":0,\"SensorIndex\":0,\"SensorType\":\"Pressure\",\"Data\":[591]}}]",
    )
    .await;
  tokio::time::timeout(Duration::from_secs(5), async {
    while invocations.load(Ordering::SeqCst) == 0 {
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
  })
  .await
  .expect("Timed out waiting for sensor callback");
  assert_eq!(invocations.load(Ordering::SeqCst), 1);
  assert_eq!(
    *readings.lock().expect("Test, assuming infallible."),
    vec![vec![591]]
  );

  // Unsubscribing sends SensorUnsubscribeCmd and uninstalls the callback.
  let unsubscribe_fut = sensor.unsubscribe();
  let reply_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "SensorUnsubscribeCmd");
    server.send_ok(message_id(&fields)).await;
    server
  });
  unsubscribe_fut.await.expect("Test, assuming infallible.");
  let server = reply_task.await.expect("Test, assuming infallible.");

  server
    .send_raw(
      "[{\"SensorReading\":{\"Id\":0,\"DeviceIndex\":0,\"SensorIndex\":0,\"SensorType\":\"Pressure\",\"Data\":[600]}}]",
    )
    .await;
  tokio::time::sleep(Duration::from_millis(100)).await;
  assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sensor_read_v3() {
  let client = ButtplugClient::new("Test Client");
  let (device, server_task) = connect_with_device(&client, PRESSURE_DEVICE).await;
  let mut server = server_task.await.expect("Test, assuming infallible.");

  let ButtplugClientSensor::Subscribable(sensor) = &device.sensors()[0] else {
    panic!("Expected subscribable sensor");
  };
  let read_fut = sensor.read();
  let reply_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "SensorReadCmd");
    let id = message_id(&fields);
    server
      .send_raw(&format!(
        "[{{\"SensorReading\":{{\"Id\":{id},\"DeviceIndex\":0,\"SensorIndex\":0,\"SensorType\":\"Pressure\",\"Data\":[1024]}}}}]"
      ))
      .await;
  });
  assert_eq!(
    read_fut.await.expect("Test, assuming infallible."),
    vec![1024]
  );
  reply_task.await.expect("Test, assuming infallible.");
}

#[tokio::test]
async fn test_device_removal_gates_commands() {
  let client = ButtplugClient::new("Test Client");
  let (device, server_task) = connect_with_device(&client, V3_TEST_DEVICE).await;
  let server = server_task.await.expect("Test, assuming infallible.");
  let mut event_stream = client.event_stream();

  assert!(!device.removed());
  server.send_raw("[{\"DeviceRemoved\":{\"Id\":0,\"DeviceIndex\":0}}]").await;
  loop {
    let event = event_stream.next().await.expect("Test, assuming infallible.");
    if let ButtplugClientEvent::DeviceRemoved(removed_device) = event {
      assert_eq!(removed_device.index(), 0);
      break;
    }
  }
  // The registry slot is gone, the stale handle knows it's removed, and
  // operations through it fail.
  assert!(client.devices().is_empty());
  assert!(device.removed());
  let result = device.stop().await;
  assert!(matches!(
    result,
    Err(ButtplugClientError::ButtplugError(
      ButtplugError::ButtplugDeviceError(ButtplugDeviceError::DeviceNotAvailable(0))
    ))
  ));
}

// A v3 device advertising a 100ms minimum gap between commands.
const TIMING_GAP_DEVICE: &str = r#"[{"DeviceIndex":0,"DeviceName":"Slow Device","DeviceMessageTimingGap":100,"DeviceMessages":{"StopDeviceCmd":[{}],"ScalarCmd":[{"FeatureDescriptor":"Vibrator","StepCount":20,"ActuatorType":"Vibrate"}]}}]"#;

#[tokio::test]
async fn test_message_timing_gap_spacing() {
  let client = ButtplugClient::new("Test Client");
  let (device, server_task) = connect_with_device(&client, TIMING_GAP_DEVICE).await;
  let mut server = server_task.await.expect("Test, assuming infallible.");

  assert_eq!(device.message_timing_gap(), Some(100));
  let ButtplugClientActuator::Scalar(actuator) = &device.actuators()[0] else {
    panic!("Expected scalar actuator");
  };

  let reply_task = tokio::spawn(async move {
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "ScalarCmd");
    let first_arrival = Instant::now();
    server.send_ok(message_id(&fields)).await;
    let (name, fields) = server.expect_message().await;
    assert_eq!(name, "ScalarCmd");
    let second_arrival = Instant::now();
    server.send_ok(message_id(&fields)).await;
    second_arrival - first_arrival
  });
  actuator
    .command(0.5)
    .await
    .expect("Test, assuming infallible.");
  actuator
    .command(1.0)
    .await
    .expect("Test, assuming infallible.");
  let spacing = reply_task.await.expect("Test, assuming infallible.");
  assert!(
    spacing >= Duration::from_millis(80),
    "Commands spaced {spacing:?}, expected at least the advertised gap"
  );
}
