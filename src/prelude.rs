//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use raw_input_bridge::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Host
pub use crate::host::{Host, HostBuilder};
pub use crate::platform::PlatformError;

// Events and input state
pub use crate::core::input::{
    Channel, InputEvent, KeyCode, KeyEvent, Keyboard, Mouse, MouseButtonEvent, MouseMoveEvent,
    MouseScrollEvent, MouseWindowLocation, WindowHandle, MOUSE_BUTTON_LEFT, MOUSE_BUTTON_MIDDLE,
    MOUSE_BUTTON_RIGHT,
};

// Bridge
pub use crate::core::platform_bridge::{
    BridgeError, ChannelSet, InputListener, ListenerSet, Producer, RawContext, Subscription,
};

// Logic loop
pub use crate::core::CoreLoop;
