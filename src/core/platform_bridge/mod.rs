//=========================================================================
// Platform Bridge
//=========================================================================
//
// The C boundary between a window-owning producer and this library.
//
// Components:
// - `interface`: Listener contract, queued messages and errors
// - `context`: Opaque context tokens and their per-channel lifecycle
// - `ffi`: The six exported `extern "C"` symbols
// - `producer`: Safe Rust-side driver for the same six calls
// - `event_collector`: Consumer-side queueing and per-frame draining
//
//=========================================================================

//=== Module Declarations =================================================

pub mod context;
pub mod event_collector;
pub mod ffi;
pub mod interface;
pub mod producer;

//=== Public API ==========================================================

pub use context::{ChannelSet, RawContext, Subscription};
pub use event_collector::{queue, EventCollector, QueueListener, TickControl};
pub use ffi::BridgeFns;
pub use interface::{BridgeError, InputListener, ListenerSet, PlatformEvent};
pub use producer::Producer;
