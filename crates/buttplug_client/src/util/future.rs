// Buttplug Rust Source Code File - See https://buttplug.io for more info.
//
// Copyright 2016-2024 Nonpolynomial Labs LLC. All rights reserved.
//
// Licensed under the BSD 3-Clause license. See LICENSE file in the project root
// for full license information.

//! Buttplug futures utilities. Mostly used for building message futures in the
//! client, used to wait on responses from the server.

use core::pin::Pin;
use std::{
  future::Future,
  sync::{Arc, Mutex},
  task::{Context, Poll, Waker},
};

/// Struct used for facilitating passing futures across channels.
///
/// There are quite a few times within Buttplug where we will need to pass a
/// future between tasks. For instance, when a ButtplugMessage is sent to the
/// server, it may take an indeterminate amount of time to get a reply, and we
/// may have to traverse 2-3 tasks to make this happen. This struct holds the
/// reply, as well as a [Waker] for the related future. Once the reply is
/// filled, the waker will be called to finish the future polling.
#[derive(Debug, Clone)]
pub struct ButtplugFutureState<T> {
  reply: Option<T>,
  waker: Option<Waker>,
}

// For some reason, deriving default above doesn't work, but doing an explicit
// derive here does work.
impl<T> Default for ButtplugFutureState<T> {
  fn default() -> Self {
    ButtplugFutureState::<T> {
      reply: None,
      waker: None,
    }
  }
}

impl<T> ButtplugFutureState<T> {
  /// Sets the response for the future, firing the waker.
  ///
  /// When a response is received from whatever we're waiting on, this function
  /// takes the response, updates the state struct, and calls [Waker::wake] so
  /// that the corresponding future can finish.
  ///
  /// # Panics
  ///
  /// Panics if the reply is set twice, as every pending entry is one-shot.
  pub fn set_reply(&mut self, reply: T) {
    if self.reply.is_some() {
      panic!("set_reply called multiple times on the same future.");
    }

    self.reply = Some(reply);

    if let Some(waker) = self.waker.take() {
      waker.wake();
    }
  }
}

/// Shared [ButtplugFutureState] type.
///
/// [ButtplugFutureState] is made to be shared across tasks, and we'll never
/// know if those tasks are single or multithreaded. Only needs to unlock for
/// calls to [ButtplugFutureState::set_reply].
pub type ButtplugFutureStateShared<T> = Arc<Mutex<ButtplugFutureState<T>>>;

/// [Future] implementation for long operations in Buttplug.
///
/// This is a convenience struct, used for handling indeterminately long
/// operations, like Buttplug's request/reply communications between the client
/// and server. It allows us to say what type we expect back, then hold a waker
/// that we can pass around as needed.
#[derive(Debug)]
pub struct ButtplugFuture<T> {
  /// State that holds the waker for the future, and the reply (once set).
  waker_state: ButtplugFutureStateShared<T>,
}

impl<T> Default for ButtplugFuture<T> {
  fn default() -> Self {
    ButtplugFuture::<T> {
      waker_state: ButtplugFutureStateShared::<T>::default(),
    }
  }
}

impl<T> ButtplugFuture<T> {
  /// Returns a clone of the state, used for moving the state across contexts
  /// (tasks/threads/etc...).
  pub fn get_state_clone(&self) -> ButtplugFutureStateShared<T> {
    self.waker_state.clone()
  }
}

impl<T> Future for ButtplugFuture<T> {
  type Output = T;

  fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
    let mut waker_state = self
      .waker_state
      .lock()
      .expect("Future state lock is never poisoned");
    if let Some(reply) = waker_state.reply.take() {
      Poll::Ready(reply)
    } else {
      waker_state.waker = Some(cx.waker().clone());
      Poll::Pending
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::util::async_manager;

  #[tokio::test]
  async fn test_future_resolves_across_tasks() {
    let fut = ButtplugFuture::<u32>::default();
    let state = fut.get_state_clone();
    async_manager::spawn(async move {
      state
        .lock()
        .expect("Test, assuming infallible.")
        .set_reply(42);
    });
    assert_eq!(fut.await, 42);
  }
}
