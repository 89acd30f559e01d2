//=========================================================================
// Bridge Event Types
//
// Owned payloads for the four notifications that cross the C boundary.
//
// Every value here is copied out of the producer's call before the
// listener sees it: nothing borrows from the producer, so events can be
// queued, sent across threads or stored after the call returns.
//
// Event Flow:
// ```text
// Producer (native window)
//         ↓  raw_input_* (C ABI)
//    InputEvent (this module)
//         ↓
//    InputListener (Keyboard, Mouse, QueueListener, ...)
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;

//=== Internal Dependencies ===============================================

use super::key::KeyCode;

//=== WindowHandle ========================================================

/// Opaque identity of the native window an event originated from.
///
/// The producer owns the window; this handle is only an address used as a
/// correlation key. It is never dereferenced and carries no lifetime
/// guarantee beyond the call that delivered it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(NonNull<c_void>);

// Only the address is used, never the pointee.
unsafe impl Send for WindowHandle {}
unsafe impl Sync for WindowHandle {}

impl WindowHandle {
    /// Wraps a raw window pointer. Returns `None` for null.
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Builds a handle from an integer identity (e.g. a winit `WindowId`).
    ///
    /// Returns `None` for zero, and for ids wider than a pointer.
    pub fn from_id(id: u64) -> Option<Self> {
        let addr = usize::try_from(id).ok()?;
        Self::from_ptr(addr as *mut c_void)
    }

    /// Returns the raw pointer, for passing back across the boundary.
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    /// Returns the address as an integer key.
    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowHandle({:#x})", self.addr())
    }
}

//=== Channel =============================================================

/// The two independently finished notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Key notifications.
    Key,

    /// Mouse move, button and scroll notifications.
    Mouse,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => f.write_str("key"),
            Self::Mouse => f.write_str("mouse"),
        }
    }
}

//=== KeyEvent ============================================================

/// One physical key transition.
///
/// `key_code` is the producer's raw 16-bit code; use [`KeyEvent::key`] to
/// decode it. Transitions are never merged: a press and its release are
/// two events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub window: Option<WindowHandle>,
    pub key_code: u16,
    pub pressed: bool,
}

impl KeyEvent {
    /// Decodes the raw code into a [`KeyCode`], if known.
    pub fn key(&self) -> Option<KeyCode> {
        KeyCode::from_code(self.key_code)
    }
}

//=== MouseMoveEvent ======================================================

/// Cursor position in window-local coordinates (upper-left origin).
///
/// The window's size at the time of the move travels with every event so
/// the consumer never has to query it separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMoveEvent {
    pub window: Option<WindowHandle>,
    pub pos_x: f64,
    pub pos_y: f64,
    pub window_width: f64,
    pub window_height: f64,
}

impl MouseMoveEvent {
    /// Position divided by window size.
    ///
    /// Returns `None` when either dimension is not positive.
    pub fn normalized(&self) -> Option<(f64, f64)> {
        if self.window_width > 0.0 && self.window_height > 0.0 {
            Some((self.pos_x / self.window_width, self.pos_y / self.window_height))
        } else {
            None
        }
    }
}

//=== MouseButtonEvent ====================================================

/// One mouse button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonEvent {
    pub window: Option<WindowHandle>,
    pub button: u8,
    pub down: bool,
}

//=== MouseScrollEvent ====================================================

/// Raw scroll deltas in the producer's device units.
///
/// No accumulation, smoothing or inertia is applied; zero deltas are
/// delivered like any other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseScrollEvent {
    pub window: Option<WindowHandle>,
    pub delta_x: f64,
    pub delta_y: f64,
}

//=== InputEvent ==========================================================

/// Any notification delivered through the bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(KeyEvent),
    MouseMove(MouseMoveEvent),
    MouseButton(MouseButtonEvent),
    MouseScroll(MouseScrollEvent),
}

impl InputEvent {
    /// Channel this event was delivered on.
    pub fn channel(&self) -> Channel {
        match self {
            Self::Key(_) => Channel::Key,
            Self::MouseMove(_) | Self::MouseButton(_) | Self::MouseScroll(_) => Channel::Mouse,
        }
    }

    /// Window the event originated from, if the producer supplied one.
    pub fn window(&self) -> Option<WindowHandle> {
        match self {
            Self::Key(e) => e.window,
            Self::MouseMove(e) => e.window,
            Self::MouseButton(e) => e.window,
            Self::MouseScroll(e) => e.window,
        }
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

impl From<MouseMoveEvent> for InputEvent {
    fn from(event: MouseMoveEvent) -> Self {
        Self::MouseMove(event)
    }
}

impl From<MouseButtonEvent> for InputEvent {
    fn from(event: MouseButtonEvent) -> Self {
        Self::MouseButton(event)
    }
}

impl From<MouseScrollEvent> for InputEvent {
    fn from(event: MouseScrollEvent) -> Self {
        Self::MouseScroll(event)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
