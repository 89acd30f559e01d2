//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Consumer-side contract: the listener every notification is routed to,
// and the errors the Rust-side API can report.
//
// The C boundary itself cannot report errors. `BridgeError` only surfaces
// from Rust-side helpers (producer driver, queueing).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use log::error;
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::event::{Channel, InputEvent};

//=== InputListener =======================================================

/// Receives events delivered through a context.
///
/// Called synchronously on the producer's thread, possibly from several
/// threads at once for different windows. Implementations must not block
/// for long: a slow listener stalls the producer's event loop. Copy the
/// event out and return if heavier processing is needed.
///
/// A panic inside `on_input` is contained at the boundary and logged.
pub trait InputListener: Send + Sync {
    fn on_input(&self, event: &InputEvent);
}

impl<F> InputListener for F
where
    F: Fn(&InputEvent) + Send + Sync,
{
    fn on_input(&self, event: &InputEvent) {
        self(event)
    }
}

//=== ListenerSet =========================================================

/// Fans one context out to several listeners, in registration order.
///
/// A panicking listener is logged and skipped; the ones after it still
/// see the event.
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn InputListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self { listeners: Vec::new() }
    }

    /// Adds a listener (builder style).
    pub fn with(mut self, listener: Arc<dyn InputListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Adds a listener.
    pub fn push(&mut self, listener: Arc<dyn InputListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl InputListener for ListenerSet {
    fn on_input(&self, event: &InputEvent) {
        for (index, listener) in self.listeners.iter().enumerate() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener.on_input(event))) {
                error!(
                    target: "bridge::listener",
                    "Listener #{} panicked handling {} event: {}",
                    index,
                    event.channel(),
                    panic_message(&payload)
                );
            }
        }
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_owned()
    }
}

//=== PlatformEvent =======================================================

/// Messages queued from the producer thread to the core thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformEvent {
    /// One event copied out of a notify call.
    Input(InputEvent),

    /// The producer's window closed; no more input will follow.
    WindowClosed,
}

//=== BridgeError =========================================================

/// Errors reported by the Rust-side bridge API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A null context was supplied where a live one is required.
    #[error("context is null")]
    NullContext,

    /// The context was not issued for this channel.
    #[error("context is not open for the {channel} channel")]
    ChannelNotOpen { channel: Channel },

    /// The channel was already finished on this context.
    #[error("{channel} channel of this context was already finished")]
    ContextFinished { channel: Channel },

    /// The consumer queue is full; the event was dropped.
    #[error("event queue is full")]
    QueueFull,

    /// The consumer side of the queue is gone.
    #[error("event queue is disconnected")]
    QueueDisconnected,
}

//=========================================================================
// Unit Tests
//=========================================================================
