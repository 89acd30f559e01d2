//=========================================================================
// Host
//
// Reference application wiring a Winit window to the bridge.
//
// Architecture:
// ```text
//     HostBuilder  ──build()──>  Host  ──run(handler)──>  [Runtime]
//         │                       │
//         ├─ with_tps()           ├─ keyboard() / mouse()
//         ├─ with_channel_capacity()
//         ├─ with_max_events_per_frame()
//         ├─ with_title()         └─ issues a context, spawns the core
//         └─ with_inner_size()       loop, runs the platform, joins
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;
use crate::core::input::{Keyboard, Mouse};
use crate::core::platform_bridge::{
    ChannelSet, EventCollector, ListenerSet, PlatformEvent, Producer, QueueListener, Subscription,
};
use crate::core::CoreLoop;
use crate::platform::{Platform, PlatformError, WindowConfig};

//=== HostBuilder =========================================================

/// Builder for configuring and constructing a [`Host`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (logic ticks per second)
/// - **Channel capacity**: 1024 events
/// - **Max events per frame**: 256
/// - **Window**: "Raw Input Bridge", 800x600 logical
///
/// # Examples
///
/// ```no_run
/// use raw_input_bridge::prelude::*;
///
/// let host = HostBuilder::new()
///     .with_tps(120.0)
///     .with_title("Input Monitor")
///     .build();
///
/// let keyboard = host.keyboard();
/// host.run(move |events| {
///     for event in events {
///         println!("{:?}", event);
///     }
///     if keyboard.is_pressed(KeyCode::Space) {
///         println!("space held");
///     }
/// })
/// .unwrap();
/// ```
pub struct HostBuilder {
    tps: f64,
    channel_capacity: usize,
    max_events_per_frame: usize,
    title: String,
    inner_size: (f64, f64),
}

impl HostBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 1024,
            max_events_per_frame: 256,
            title: "Raw Input Bridge".to_owned(),
            inner_size: (800.0, 600.0),
        }
    }

    /// Sets the target ticks per second for the logic thread.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the queue capacity between producer and logic thread.
    ///
    /// Events arriving while the queue is full are dropped (and counted),
    /// never blocked on.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Caps how many events a single tick drains.
    ///
    /// # Panics
    ///
    /// Panics if `max == 0`.
    pub fn with_max_events_per_frame(mut self, max: usize) -> Self {
        assert!(max > 0, "Max events per frame must be positive");
        self.max_events_per_frame = max;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial window size in logical points.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is not positive.
    pub fn with_inner_size(mut self, width: f64, height: f64) -> Self {
        assert!(width > 0.0 && height > 0.0, "Window size must be positive");
        self.inner_size = (width, height);
        self
    }

    /// Builds the host.
    pub fn build(self) -> Host {
        info!(
            target: "host",
            "Building host (TPS: {}, channel: {}, per frame: {})",
            self.tps,
            self.channel_capacity,
            self.max_events_per_frame
        );

        Host {
            keyboard: Keyboard::new(),
            mouse: Mouse::new(),
            tps: self.tps,
            channel_capacity: self.channel_capacity,
            max_events_per_frame: self.max_events_per_frame,
            window: WindowConfig {
                title: self.title,
                width: self.inner_size.0,
                height: self.inner_size.1,
            },
        }
    }
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Host ================================================================

/// A window feeding its input through the bridge.
///
/// # Architecture
///
/// ```text
/// Host (Main Thread)
///   ├─► CoreLoop (Logic Thread @ TPS)
///   │     └─► frame handler
///   │
///   └─► Platform (Event Loop)
///         └─► Producer → raw_input_* → Keyboard, Mouse, QueueListener
/// ```
pub struct Host {
    keyboard: Keyboard,
    mouse: Mouse,
    tps: f64,
    channel_capacity: usize,
    max_events_per_frame: usize,
    window: WindowConfig,
}

impl Host {
    /// Live keyboard state. Clones stay valid after [`Host::run`] starts.
    pub fn keyboard(&self) -> Keyboard {
        self.keyboard.clone()
    }

    /// Live mouse state. Clones stay valid after [`Host::run`] starts.
    pub fn mouse(&self) -> Mouse {
        self.mouse.clone()
    }

    //--- Execution --------------------------------------------------------

    /// Runs the window and blocks until it closes.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the queue and registers Keyboard, Mouse and the queue
    ///    listener behind one subscription
    /// 2. Issues a context for both channels and spawns the logic thread
    /// 3. Runs the platform event loop (blocks here)
    /// 4. On window close: both channels finished → `WindowClosed` queued
    ///    → logic thread exits and is joined
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop fails.
    pub fn run<F>(self, handler: F) -> Result<(), PlatformError>
    where
        F: FnMut(&[InputEvent]) + Send + 'static,
    {
        info!(target: "host", "Starting host runtime (TPS: {})", self.tps);

        //--- 1. Create queue and listeners --------------------------------
        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) =
            bounded(self.channel_capacity);

        let listeners = ListenerSet::new()
            .with(Arc::new(self.keyboard))
            .with(Arc::new(self.mouse))
            .with(Arc::new(QueueListener::new(tx.clone())));
        let subscription = Subscription::from_listener(listeners);

        //--- 2. Issue context and spawn the logic thread ------------------
        let producer = Producer::new(subscription.context(ChannelSet::BOTH));
        let collector = EventCollector::new(rx, self.max_events_per_frame);
        let core_handle = CoreLoop::new(collector, self.tps, handler).spawn();
        info!(target: "host", "Core logic thread spawned");

        //--- 3. Launch the platform ----------------------------------------
        let result = Platform::new(self.window, producer, tx).run();
        if let Err(e) = &result {
            error!(target: "host", "Platform error: {}", e);
        }

        info!(target: "host", "Platform event loop exited");

        //--- 4. Cleanup: wait for the logic thread ------------------------
        //
        // The platform (and its producer) is gone by now. Dropping the
        // subscription releases the queue sender, so the core loop sees a
        // disconnect even if `WindowClosed` was never sent.
        drop(subscription);

        match core_handle.join() {
            Ok(()) => info!(target: "host", "Core thread terminated cleanly"),
            Err(e) => error!(target: "host", "Core thread panicked: {:?}", e),
        }

        info!(target: "host", "Host shutdown complete");
        result
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
