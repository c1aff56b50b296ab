// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! # Buttplug Client
//!
//! Client-side implementation of the [Buttplug Intimate Hardware
//! Protocol](https://buttplug-spec.docs.buttplug.io), for talking to Buttplug
//! servers (usually [Intiface](https://intiface.com)) over message oriented
//! transports like websockets.
//!
//! The library is split in three main parts:
//!
//! - [core::message] holds the protocol messages themselves, across all four
//!   message spec versions, along with the JSON serializer that projects
//!   messages to/from the spec version negotiated with the server.
//! - [core::connector] holds the connector and transport layers that move
//!   serialized messages between the client and a server.
//! - [client] holds the [ButtplugClient](client::ButtplugClient) session:
//!   handshake, request/response pairing, ping keepalive, device list
//!   bookkeeping, and the device/actuator/sensor handles applications use to
//!   actually control hardware.

#[macro_use]
extern crate buttplug_derive;
#[macro_use]
extern crate strum_macros;
#[macro_use]
extern crate tracing;

pub mod client;
pub mod core;
pub mod util;
