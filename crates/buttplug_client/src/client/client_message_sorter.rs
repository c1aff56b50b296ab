// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Handling of remote message pairing and future resolution.

use crate::{
  client::{ButtplugClientError, ButtplugClientMessageFuturePair, ButtplugClientMessageStateShared},
  core::{
    connector::ButtplugConnectorError,
    message::{ButtplugMessage, ButtplugServerMessage},
  },
};
use std::collections::HashMap;

/// Message sorting and pairing for remote client connectors.
///
/// Whenever a client sends the server a request message, the server will send
/// back a response message with a matching `id` field. Any message that comes
/// from the server without an originating client message (DeviceAdded,
/// SensorReading from a subscription, etc...) has an `id` of 0 and is
/// considered an *event*.
///
/// The sorter does two things to facilitate this matching:
///
/// - Owns the request id counter, assigning a fresh id to every outgoing
///   message as it is registered
/// - Manages a [HashMap] of ids to resolvable futures, resolving them as
///   responses arrive
///
/// Ids wrap back to 1 after reaching [u32::MAX] (0 stays reserved for server
/// events); an id still waiting on a response is skipped over so a wrapped
/// counter can never hand out a colliding id.
pub struct ClientMessageSorter {
  /// Map of message `id`s to their related future.
  ///
  /// Once we get back a response with a matching `id`, we remove the entry
  /// from this map, and use the waker to complete the future with the
  /// received response message.
  future_map: HashMap<u32, ButtplugClientMessageStateShared>,

  /// Message `id` counter
  current_id: u32,
}

impl ClientMessageSorter {
  fn advance_id(&mut self) {
    self.current_id = match self.current_id.checked_add(1) {
      Some(id) => id,
      None => 1,
    };
  }

  /// Registers a future to be resolved when we receive a response.
  ///
  /// Given a message and its related future, assign the message a fresh `id`,
  /// and match that id with the future to be resolved when we get a response
  /// back.
  pub fn register_future(&mut self, msg_fut: &mut ButtplugClientMessageFuturePair) {
    while self.future_map.contains_key(&self.current_id) {
      self.advance_id();
    }
    trace!("Setting message id to {}", self.current_id);
    msg_fut.msg.set_id(self.current_id);
    self
      .future_map
      .insert(self.current_id, msg_fut.waker.clone());
    self.advance_id();
  }

  /// Given a response message from the server, resolve related future if we
  /// have one.
  ///
  /// Returns true if the response message was resolved to a future via
  /// matching `id`, otherwise returns false.
  pub fn maybe_resolve_result(&mut self, msg: &ButtplugServerMessage) -> bool {
    let id = msg.id();
    trace!("Trying to resolve message future for id {}.", id);
    match self.future_map.remove(&id) {
      Some(state) => {
        trace!("Resolved id {} to a future.", id);
        state
          .lock()
          .expect("Future state lock is never poisoned")
          .set_reply(Ok(msg.clone()));
        true
      }
      None => {
        trace!("Message id {} not found.", id);
        false
      }
    }
  }

  /// Fails every outstanding request with a disconnect error. Run when the
  /// connection drops so no caller is left waiting forever.
  pub fn fail_pending(&mut self) {
    for (id, state) in self.future_map.drain() {
      debug!("Failing pending request {} with disconnect error.", id);
      state
        .lock()
        .expect("Future state lock is never poisoned")
        .set_reply(Err(ButtplugClientError::ButtplugConnectorError(
          ButtplugConnectorError::Disconnected,
        )));
    }
  }
}

impl Default for ClientMessageSorter {
  /// Sets the current_id to 1, since as a client we can't send message `id` of
  /// 0 (0 is reserved for system incoming messages).
  fn default() -> Self {
    Self {
      future_map: HashMap::new(),
      current_id: 1,
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    client::ButtplugClientMessageFuture,
    core::message::{ButtplugClientMessage, ButtplugMessage as _, Ok as OkMsg, Ping},
  };

  fn message_pair() -> (ButtplugClientMessageFuture, ButtplugClientMessageFuturePair) {
    let fut = ButtplugClientMessageFuture::default();
    let pair = ButtplugClientMessageFuturePair::new(
      ButtplugClientMessage::Ping(Ping::new()),
      fut.get_state_clone(),
    );
    (fut, pair)
  }

  #[tokio::test]
  async fn test_id_correlation() {
    let mut sorter = ClientMessageSorter::default();
    let (fut1, mut pair1) = message_pair();
    let (fut2, mut pair2) = message_pair();
    sorter.register_future(&mut pair1);
    sorter.register_future(&mut pair2);
    assert_eq!(pair1.msg.id(), 1);
    assert_eq!(pair2.msg.id(), 2);
    // Resolve out of order, each caller gets its own response exactly once.
    assert!(sorter.maybe_resolve_result(&ButtplugServerMessage::Ok(OkMsg::new(2))));
    assert!(sorter.maybe_resolve_result(&ButtplugServerMessage::Ok(OkMsg::new(1))));
    assert!(!sorter.maybe_resolve_result(&ButtplugServerMessage::Ok(OkMsg::new(1))));
    assert_eq!(
      fut1.await.expect("Test, assuming infallible.").id(),
      1
    );
    assert_eq!(
      fut2.await.expect("Test, assuming infallible.").id(),
      2
    );
  }

  #[tokio::test]
  async fn test_id_wrap_around_skips_pending() {
    let mut sorter = ClientMessageSorter::default();
    sorter.current_id = u32::MAX;
    let (_fut_max, mut pair_max) = message_pair();
    sorter.register_future(&mut pair_max);
    assert_eq!(pair_max.msg.id(), u32::MAX);
    // Counter wrapped to 1, which is free.
    let (_fut1, mut pair1) = message_pair();
    sorter.register_future(&mut pair1);
    assert_eq!(pair1.msg.id(), 1);
    // Force the wrap to land on an id that is still in flight.
    sorter.current_id = u32::MAX;
    let (_fut2, mut pair2) = message_pair();
    sorter.register_future(&mut pair2);
    // u32::MAX is taken, 1 is taken, so we get 2.
    assert_eq!(pair2.msg.id(), 2);
  }

  #[tokio::test]
  async fn test_fail_pending_resolves_with_disconnect() {
    let mut sorter = ClientMessageSorter::default();
    let (fut, mut pair) = message_pair();
    sorter.register_future(&mut pair);
    sorter.fail_pending();
    assert!(matches!(
      fut.await,
      Err(ButtplugClientError::ButtplugConnectorError(
        ButtplugConnectorError::Disconnected
      ))
    ));
    // The entry is gone, a late response is just unmatched.
    assert!(!sorter.maybe_resolve_result(&ButtplugServerMessage::Ok(OkMsg::new(1))));
  }
}
