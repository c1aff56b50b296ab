// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Named event dispatch, used by transports to expose lifecycle hooks
//! (connect/disconnect/send/receive) without coupling to their callers.

use displaydoc::Display;
use std::{
  collections::HashMap,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
};
use thiserror::Error;

/// Return value of event callbacks. Returning [EventFlow::Stop] keeps the
/// remaining callbacks registered for the event from running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlow {
  Continue,
  Stop,
}

pub type EventCallback = Box<dyn Fn(&str) -> EventFlow + Send + Sync>;

#[derive(Debug, Error, Display, Clone)]
pub enum ButtplugEventError {
  /// Non-existent event: {0}
  NonexistentEvent(String),
}

/// Token handed back by [EventManager::on], used to deregister a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHandle(usize);

/// Named multi-listener event table.
///
/// Callbacks for an event run in registration order. Events spring into
/// existence on first [EventManager::on] call; emitting an event nobody ever
/// registered for is an error when `strict` is set, and a no-op otherwise.
#[derive(Default)]
pub struct EventManager {
  events: Mutex<HashMap<String, Vec<(usize, Arc<EventCallback>)>>>,
  next_handle: AtomicUsize,
}

impl EventManager {
  /// Registers a callback for the named event, creating the event if needed.
  pub fn on(&self, event: &str, callback: EventCallback) -> EventHandle {
    let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
    self
      .events
      .lock()
      .expect("Event table lock is never poisoned")
      .entry(event.to_owned())
      .or_default()
      .push((handle, Arc::new(callback)));
    EventHandle(handle)
  }

  /// Removes a previously registered callback. Unknown events error when
  /// `strict` is set; removing an already removed handle is a no-op.
  pub fn off(
    &self,
    event: &str,
    handle: EventHandle,
    strict: bool,
  ) -> Result<(), ButtplugEventError> {
    let mut events = self
      .events
      .lock()
      .expect("Event table lock is never poisoned");
    match events.get_mut(event) {
      Some(callbacks) => {
        callbacks.retain(|(id, _)| *id != handle.0);
        Ok(())
      }
      None => {
        if strict {
          Err(ButtplugEventError::NonexistentEvent(event.to_owned()))
        } else {
          Ok(())
        }
      }
    }
  }

  /// Invokes the callbacks registered for the named event, in registration
  /// order, stopping the chain when a callback returns [EventFlow::Stop].
  pub fn emit(&self, event: &str, payload: &str, strict: bool) -> Result<(), ButtplugEventError> {
    // Snapshot the callback list so a callback can register/deregister
    // without deadlocking on the table.
    let callbacks: Vec<Arc<EventCallback>> = {
      let events = self
        .events
        .lock()
        .expect("Event table lock is never poisoned");
      match events.get(event) {
        Some(callbacks) => callbacks.iter().map(|(_, cb)| cb.clone()).collect(),
        None => {
          return if strict {
            Err(ButtplugEventError::NonexistentEvent(event.to_owned()))
          } else {
            Ok(())
          };
        }
      }
    };
    for callback in callbacks {
      if (*callback)(payload) == EventFlow::Stop {
        break;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::atomic::AtomicU32;

  #[test]
  fn test_callbacks_run_in_registration_order() {
    let manager = EventManager::default();
    let order = Arc::new(Mutex::new(vec![]));
    for i in 0..3 {
      let order = order.clone();
      manager.on(
        "receive",
        Box::new(move |_| {
          order.lock().expect("Test, assuming infallible.").push(i);
          EventFlow::Continue
        }),
      );
    }
    manager
      .emit("receive", "frame", true)
      .expect("Test, assuming infallible.");
    assert_eq!(*order.lock().expect("Test, assuming infallible."), vec![0, 1, 2]);
  }

  #[test]
  fn test_stop_chain_halts_remaining_callbacks() {
    let manager = EventManager::default();
    let count = Arc::new(AtomicU32::new(0));
    let count1 = count.clone();
    manager.on(
      "receive",
      Box::new(move |_| {
        count1.fetch_add(1, Ordering::SeqCst);
        EventFlow::Stop
      }),
    );
    let count2 = count.clone();
    manager.on(
      "receive",
      Box::new(move |_| {
        count2.fetch_add(1, Ordering::SeqCst);
        EventFlow::Continue
      }),
    );
    manager
      .emit("receive", "frame", true)
      .expect("Test, assuming infallible.");
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_strict_emit_of_unknown_event_errors() {
    let manager = EventManager::default();
    assert!(manager.emit("nope", "", true).is_err());
    assert!(manager.emit("nope", "", false).is_ok());
  }

  #[test]
  fn test_off_removes_callback() {
    let manager = EventManager::default();
    let count = Arc::new(AtomicU32::new(0));
    let count1 = count.clone();
    let handle = manager.on(
      "send",
      Box::new(move |_| {
        count1.fetch_add(1, Ordering::SeqCst);
        EventFlow::Continue
      }),
    );
    manager
      .emit("send", "frame", true)
      .expect("Test, assuming infallible.");
    manager
      .off("send", handle, true)
      .expect("Test, assuming infallible.");
    manager
      .emit("send", "frame", true)
      .expect("Test, assuming infallible.");
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(manager.off("nope", handle, true).is_err());
  }
}
