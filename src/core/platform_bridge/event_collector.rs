//=========================================================================
// Event Collector
//=========================================================================
//
// Consumer-side buffering between the producer's thread and a logic
// thread.
//
// Architecture:
//   notify call → QueueListener::on_input() → try_send → Receiver
//               → EventCollector::collect_frame() → frame events
//
// The listener never blocks: the producer's event loop must keep
// running, so a full queue drops the event and counts it. Draining is
// bounded per frame to prevent starvation. Idle sleep reduces CPU usage.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use log::{trace, warn};

//=== Internal Dependencies ===============================================

use super::interface::{BridgeError, InputListener, PlatformEvent};
use crate::core::input::event::InputEvent;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== QueueListener =======================================================

/// Listener that copies every event into a bounded queue.
#[derive(Debug)]
pub struct QueueListener {
    sender: Sender<PlatformEvent>,
    dropped: AtomicU64,
}

impl QueueListener {
    pub fn new(sender: Sender<PlatformEvent>) -> Self {
        Self {
            sender,
            dropped: AtomicU64::new(0),
        }
    }

    /// Queues one event without blocking.
    pub fn push(&self, event: InputEvent) -> Result<(), BridgeError> {
        match self.sender.try_send(PlatformEvent::Input(event)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(BridgeError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(BridgeError::QueueDisconnected)
            }
        }
    }

    /// Events dropped because the queue was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl InputListener for QueueListener {
    fn on_input(&self, event: &InputEvent) {
        if let Err(e) = self.push(*event) {
            warn!(
                target: "bridge::queue",
                "Dropping {} event ({}), {} dropped so far",
                event.channel(),
                e,
                self.dropped()
            );
        }
    }
}

/// Creates a queue listener and the collector draining it.
pub fn queue(capacity: usize, max_events_per_frame: usize) -> (QueueListener, EventCollector) {
    let (tx, rx) = bounded(capacity);
    (
        QueueListener::new(tx),
        EventCollector::new(rx, max_events_per_frame),
    )
}

//=== EventCollector ======================================================

/// Collects queued events with bounded polling.
pub struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    frame_events: Vec<InputEvent>,
    max_events_per_frame: usize,
    idle_sleep: Duration,
}

impl EventCollector {
    pub fn new(receiver: Receiver<PlatformEvent>, max_events_per_frame: usize) -> Self {
        const IDLE_SLEEP_MS: u64 = 1;

        Self {
            receiver,
            frame_events: Vec::with_capacity(max_events_per_frame),
            max_events_per_frame,
            idle_sleep: Duration::from_millis(IDLE_SLEEP_MS),
        }
    }

    /// Sets how long an empty frame sleeps. Zero disables sleeping.
    pub fn with_idle_sleep(mut self, idle_sleep: Duration) -> Self {
        self.idle_sleep = idle_sleep;
        self
    }

    /// Collects pending events (bounded to prevent starvation).
    ///
    /// Events already drained this frame stay available through
    /// [`EventCollector::events`] even when `Exit` is returned.
    pub fn collect_frame(&mut self) -> TickControl {
        self.frame_events.clear();
        let mut drained = 0;

        while drained < self.max_events_per_frame {
            match self.receiver.try_recv() {
                Ok(PlatformEvent::Input(event)) => {
                    self.frame_events.push(event);
                    drained += 1;
                }
                Ok(PlatformEvent::WindowClosed) => {
                    trace!(target: "bridge::queue", "Window closed after {} events", drained);
                    return TickControl::Exit;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= self.max_events_per_frame {
            warn!(
                target: "bridge::queue",
                "Event queue backlog: drained {} events this frame",
                drained
            );
        }

        if drained == 0 && !self.idle_sleep.is_zero() {
            thread::sleep(self.idle_sleep);
        }

        TickControl::Continue
    }

    /// Events collected by the last [`EventCollector::collect_frame`].
    pub fn events(&self) -> &[InputEvent] {
        &self.frame_events
    }

    /// Takes ownership of the collected events, leaving an empty vec.
    pub fn take_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.frame_events)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
