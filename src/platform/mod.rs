//=========================================================================
// Platform Subsystem
//
// A Winit window acting as the producer side of the bridge.
//
// Architecture:
// ```text
//  Main Thread:                          Logic Thread:
//  ┌───────────────────────────────┐    ┌──────────────────┐
//  │  Winit Event Loop             │    │  CoreLoop        │
//  │   ↓                           │    │   ↓              │
//  │  input_processor              │    │  EventCollector  │
//  │   └─ Winit → u16 / u8 / f64   │    │   ↓              │
//  │   ↓                           │    │  frame handler   │
//  │  Producer                     │    └──────────────────┘
//  │   └─ raw_input_* (C ABI)      │             ↑
//  │        ↓                      │             │
//  │  ListenerSet                  │             │
//  │   ├─ Keyboard / Mouse         │             │
//  │   └─ QueueListener ───────────┼─────────────┘
//  └───────────────────────────────┘    PlatformEvent
// ```
//
// Every Winit input event becomes exactly one bridge call, made on the
// event loop thread, in the order Winit reports them. There is no frame
// batching on this side; the collector bounds work per tick instead.
//
// Shutdown: on CloseRequested both channels are finished, then
// `WindowClosed` is queued so the logic thread can exit.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_processor;

//=== External Crates =====================================================

use crossbeam_channel::Sender;
use log::*;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    error::EventLoopError,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::input::event::WindowHandle;
use crate::core::platform_bridge::{BridgeError, PlatformEvent, Producer};

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
///
/// These are fatal: without an event loop there is no producer.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Failed to create event loop (rare, indicates OS-level issue).
    #[error("Event loop creation failed: {0}")]
    EventLoopCreation(#[source] EventLoopError),

    /// Event loop execution error.
    #[error("Event loop error: {0}")]
    EventLoopExecution(#[source] EventLoopError),
}

//=== WindowConfig ========================================================

/// Attributes of the window the platform opens.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WindowConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
}

//=== Platform ============================================================

/// Window owner and bridge producer.
///
/// Runs on the main thread (Winit requirement on macOS/iOS). Not
/// Send/Sync; other threads only see what the listeners publish.
///
/// # Fields
///
/// - `window`: Created lazily in `resumed()` (mobile compatibility)
/// - `producer`: Owns the context every bridge call goes through
/// - `event_sender`: Queue shared with the `QueueListener`, used here only
///   to signal shutdown
pub(crate) struct Platform {
    /// OS window handle (None until `resumed()` called).
    window: Option<Window>,

    config: WindowConfig,

    producer: Producer,

    /// Channel to the core thread.
    event_sender: Sender<PlatformEvent>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// Creates a platform that reports through `producer`.
    ///
    /// Does not create window yet - that happens lazily in `resumed()`.
    pub fn new(
        config: WindowConfig,
        producer: Producer,
        event_sender: Sender<PlatformEvent>,
    ) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            config,
            producer,
            event_sender,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the Winit event loop until the window closes.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// exits with an error.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS Winit requirement).
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    /// Finishes both channels and tells the core thread to stop.
    ///
    /// Safe to call more than once.
    fn shutdown(&mut self) {
        self.producer.finish_all();

        if self.event_sender.send(PlatformEvent::WindowClosed).is_err() {
            debug!(target: "platform", "Core thread already gone at shutdown");
        }
    }

    /// Logs a refused bridge call. Only happens after shutdown.
    fn report(result: Result<(), BridgeError>) {
        if let Err(e) = result {
            debug!(target: "platform::input", "Bridge call skipped: {}", e);
        }
    }

    fn on_input(&self, window: Option<WindowHandle>, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.repeat {
                    return;
                }
                match input_processor::map_physical_key(key_event.physical_key) {
                    Some(key) => Self::report(self.producer.key(
                        window,
                        key.to_code(),
                        key_event.state == ElementState::Pressed,
                    )),
                    None => trace!(
                        target: "platform::input",
                        "Unmapped key ignored: {:?}",
                        key_event.physical_key
                    ),
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let Some(os_window) = &self.window else { return };
                let (x, y, width, height) = input_processor::map_cursor(
                    *position,
                    os_window.inner_size(),
                    os_window.scale_factor(),
                );
                Self::report(self.producer.mouse_move(window, x, y, width, height));
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let index = input_processor::map_mouse_button(*button);
                Self::report(self.producer.mouse_button(
                    window,
                    index,
                    *state == ElementState::Pressed,
                ));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scale_factor = self.window.as_ref().map_or(1.0, Window::scale_factor);
                let (dx, dy) = input_processor::map_scroll_delta(*delta, scale_factor);
                Self::report(self.producer.mouse_scroll(window, dx, dy));
            }

            _ => {}
        }
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Called when app becomes active (startup or mobile resume).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.shutdown();
                event_loop.exit();
            }
        }
    }

    /// Handles per-window events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            info!(target: "platform", "Window close requested");
            self.shutdown();
            event_loop.exit();
            return;
        }

        let window = WindowHandle::from_id(u64::from(window_id));
        self.on_input(window, &event);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
