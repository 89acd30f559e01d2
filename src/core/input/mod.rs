//=========================================================================
// Input
//
// Event payloads, key codes and the coalesced consumers built on them.
//
// Components:
// - `event`: Owned copies of the four bridge notifications
// - `key`: Platform key code table
// - `keyboard`: Pressed-key state fed by key events
// - `mouse`: Cursor, button and scroll state fed by mouse events
//
//=========================================================================

//=== Submodules ==========================================================
pub mod event;
pub mod key;
pub mod keyboard;
pub mod mouse;

//=== Public API ==========================================================
pub use event::{
    Channel, InputEvent, KeyEvent, MouseButtonEvent, MouseMoveEvent, MouseScrollEvent,
    WindowHandle,
};
pub use key::KeyCode;
pub use keyboard::Keyboard;
pub use mouse::{
    Mouse, MouseWindowLocation, MOUSE_BUTTON_LEFT, MOUSE_BUTTON_MIDDLE, MOUSE_BUTTON_RIGHT,
};
