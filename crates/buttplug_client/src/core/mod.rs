// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Protocol and connector components: messages, serialization, errors, event
//! dispatch, transports.

pub mod connector;
pub mod errors;
pub mod event;
pub mod message;
