//=========================================================================
// C ABI Entry Points
//=========================================================================
//
// The six symbols declared in `include/raw_input.h`. Names, argument
// order and primitive widths are fixed: changing any of them breaks
// binary compatibility with existing producers.
//
// Every entry point:
//   1. treats a null context as a no-op
//   2. copies the payload into an owned `InputEvent`
//   3. runs the listener inside `catch_unwind`
//
// Nothing unwinds back into the producer. A panicking listener is logged
// and the call returns normally.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};

use log::{error, trace};

//=== Internal Dependencies ===============================================

use super::context;
use super::interface::panic_message;
use crate::core::input::event::{
    Channel, InputEvent, KeyEvent, MouseButtonEvent, MouseMoveEvent, MouseScrollEvent,
    WindowHandle,
};

//=== Dispatch ============================================================

/// Delivers one event, containing any panic raised by the listener.
///
/// # Safety
///
/// See [`context::deliver`].
unsafe fn dispatch(ctx: *const c_void, event: InputEvent) {
    trace!(target: "bridge::ffi", "{:?}", event);

    let result = catch_unwind(AssertUnwindSafe(|| unsafe { context::deliver(ctx, &event) }));
    if let Err(payload) = result {
        error!(
            target: "bridge::ffi",
            "Listener panicked handling {} event: {}",
            event.channel(),
            panic_message(&payload)
        );
    }
}

/// Releases one channel of a context, containing any panic from drops.
///
/// # Safety
///
/// See [`context::finish`].
unsafe fn release(ctx: *const c_void, channel: Channel) {
    let result = catch_unwind(|| unsafe { context::finish(ctx, channel) });
    if let Err(payload) = result {
        error!(
            target: "bridge::ffi",
            "Panic while finishing {} context: {}",
            channel,
            panic_message(&payload)
        );
    }
}

//=== Context Lifecycle ===================================================

/// Finishes the key channel of `context`.
///
/// # Safety
///
/// `context` must be null or a live context issued for the key channel,
/// and must not be used on this channel afterwards.
#[no_mangle]
pub unsafe extern "C" fn raw_input_finish_key_event_context(context: *const c_void) {
    unsafe { release(context, Channel::Key) }
}

/// Finishes the mouse channel of `context`.
///
/// # Safety
///
/// `context` must be null or a live context issued for the mouse channel,
/// and must not be used on this channel afterwards.
#[no_mangle]
pub unsafe extern "C" fn raw_input_finish_mouse_event_context(context: *const c_void) {
    unsafe { release(context, Channel::Mouse) }
}

//=== Notifications =======================================================

/// Delivers one key transition.
///
/// # Safety
///
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn raw_input_key_notify_func(
    context: *const c_void,
    window: *mut c_void,
    key_code: u16,
    pressed: bool,
) {
    let event = KeyEvent {
        window: WindowHandle::from_ptr(window),
        key_code,
        pressed,
    };
    unsafe { dispatch(context, event.into()) }
}

/// Delivers one cursor move with the window's current size.
///
/// # Safety
///
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn raw_input_mouse_move(
    context: *const c_void,
    window: *mut c_void,
    window_pos_x: f64,
    window_pos_y: f64,
    window_width: f64,
    window_height: f64,
) {
    let event = MouseMoveEvent {
        window: WindowHandle::from_ptr(window),
        pos_x: window_pos_x,
        pos_y: window_pos_y,
        window_width,
        window_height,
    };
    unsafe { dispatch(context, event.into()) }
}

/// Delivers one mouse button transition.
///
/// # Safety
///
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn raw_input_mouse_button(
    context: *const c_void,
    window: *mut c_void,
    button: u8,
    down: bool,
) {
    let event = MouseButtonEvent {
        window: WindowHandle::from_ptr(window),
        button,
        down,
    };
    unsafe { dispatch(context, event.into()) }
}

/// Delivers one raw scroll delta.
///
/// # Safety
///
/// `context` must be null or a live context.
#[no_mangle]
pub unsafe extern "C" fn raw_input_mouse_scroll(
    context: *const c_void,
    window: *mut c_void,
    delta_x: f64,
    delta_y: f64,
) {
    let event = MouseScrollEvent {
        window: WindowHandle::from_ptr(window),
        delta_x,
        delta_y,
    };
    unsafe { dispatch(context, event.into()) }
}

//=== BridgeFns ===========================================================

/// The six entry points as typed function pointers.
///
/// Lets Rust-side producers be written against a table instead of the
/// symbols directly, so a test can interpose its own functions.
#[derive(Debug, Clone, Copy)]
pub struct BridgeFns {
    pub finish_key_event_context: unsafe extern "C" fn(*const c_void),
    pub finish_mouse_event_context: unsafe extern "C" fn(*const c_void),
    pub key_notify: unsafe extern "C" fn(*const c_void, *mut c_void, u16, bool),
    pub mouse_move: unsafe extern "C" fn(*const c_void, *mut c_void, f64, f64, f64, f64),
    pub mouse_button: unsafe extern "C" fn(*const c_void, *mut c_void, u8, bool),
    pub mouse_scroll: unsafe extern "C" fn(*const c_void, *mut c_void, f64, f64),
}

impl BridgeFns {
    /// The symbols exported by this library.
    pub fn native() -> Self {
        Self {
            finish_key_event_context: raw_input_finish_key_event_context,
            finish_mouse_event_context: raw_input_finish_mouse_event_context,
            key_notify: raw_input_key_notify_func,
            mouse_move: raw_input_mouse_move,
            mouse_button: raw_input_mouse_button,
            mouse_scroll: raw_input_mouse_scroll,
        }
    }
}

impl Default for BridgeFns {
    fn default() -> Self {
        Self::native()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
