//=========================================================================
// Coalesced Mouse
//=========================================================================
//
// Listener that folds mouse notifications into queryable state:
//   - last known cursor location (with the window size it was seen in)
//   - pressed state of every button index
//   - scroll deltas accumulated since the last read
//
// Every pointing device the producer reports is coalesced into one
// logical mouse.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::c_void;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use atomic_float::AtomicF64;
use log::trace;

//=== Internal Dependencies ===============================================

use super::event::{
    InputEvent, MouseButtonEvent, MouseMoveEvent, MouseScrollEvent, WindowHandle,
};
use crate::core::platform_bridge::interface::InputListener;

//=== Button Indices ======================================================

/// The primary (usually left) button.
pub const MOUSE_BUTTON_LEFT: u8 = 0;
/// The secondary (usually right) button.
pub const MOUSE_BUTTON_RIGHT: u8 = 1;
/// The middle button (often the wheel).
pub const MOUSE_BUTTON_MIDDLE: u8 = 2;

const BUTTON_COUNT: usize = u8::MAX as usize + 1;

//=== MouseWindowLocation =================================================

/// Cursor position inside a window, in the window's coordinate space.
///
/// Origin is the upper-left corner of the content area. The size is the
/// window's size when the position was reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseWindowLocation {
    pos_x: f64,
    pos_y: f64,
    window_width: f64,
    window_height: f64,
    window: Option<WindowHandle>,
}

impl MouseWindowLocation {
    pub fn new(
        pos_x: f64,
        pos_y: f64,
        window_width: f64,
        window_height: f64,
        window: Option<WindowHandle>,
    ) -> Self {
        Self { pos_x, pos_y, window_width, window_height, window }
    }

    pub fn pos_x(&self) -> f64 {
        self.pos_x
    }

    pub fn pos_y(&self) -> f64 {
        self.pos_y
    }

    pub fn window_width(&self) -> f64 {
        self.window_width
    }

    pub fn window_height(&self) -> f64 {
        self.window_height
    }

    pub fn window(&self) -> Option<WindowHandle> {
        self.window
    }

    /// Whether the position lies within the window's bounds.
    pub fn is_inside(&self) -> bool {
        (0.0..self.window_width).contains(&self.pos_x)
            && (0.0..self.window_height).contains(&self.pos_y)
    }
}

impl From<&MouseMoveEvent> for MouseWindowLocation {
    fn from(event: &MouseMoveEvent) -> Self {
        Self::new(
            event.pos_x,
            event.pos_y,
            event.window_width,
            event.window_height,
            event.window,
        )
    }
}

//=== Shared ==============================================================

#[derive(Debug)]
struct Shared {
    location: Mutex<Option<MouseWindowLocation>>,
    buttons: Vec<AtomicBool>,
    scroll_delta_x: AtomicF64,
    scroll_delta_y: AtomicF64,
    window_ptr: AtomicPtr<c_void>,
}

/// A poisoned lock only means a listener panicked mid-update; the plain
/// data inside is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn new() -> Self {
        Self {
            location: Mutex::new(None),
            buttons: (0..BUTTON_COUNT).map(|_| AtomicBool::new(false)).collect(),
            scroll_delta_x: AtomicF64::new(0.0),
            scroll_delta_y: AtomicF64::new(0.0),
            window_ptr: AtomicPtr::new(std::ptr::null_mut()),
        }
    }

    fn touch_window(&self, window: Option<WindowHandle>) {
        let raw = window.map_or(std::ptr::null_mut(), WindowHandle::as_ptr);
        self.window_ptr.store(raw, Ordering::Relaxed);
    }

    fn apply_move(&self, event: &MouseMoveEvent) {
        self.touch_window(event.window);
        *lock(&self.location) = Some(MouseWindowLocation::from(event));
    }

    fn apply_button(&self, event: &MouseButtonEvent) {
        self.touch_window(event.window);
        trace!(target: "input::mouse", "Setting button {} to {}", event.button, event.down);
        self.buttons[usize::from(event.button)].store(event.down, Ordering::Relaxed);
    }

    fn apply_scroll(&self, event: &MouseScrollEvent) {
        self.touch_window(event.window);
        self.scroll_delta_x.fetch_add(event.delta_x, Ordering::Relaxed);
        self.scroll_delta_y.fetch_add(event.delta_y, Ordering::Relaxed);
    }
}

//=== Mouse ===============================================================

/// Coalesced pointer state fed by mouse notifications.
///
/// Cloning is cheap; clones share state and compare equal.
#[derive(Debug, Clone)]
pub struct Mouse {
    shared: Arc<Shared>,
}

impl Mouse {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
        }
    }

    /// Last reported cursor location, or `None` before the first move.
    pub fn window_pos(&self) -> Option<MouseWindowLocation> {
        *lock(&self.shared.location)
    }

    /// Whether the button at `button` is held.
    ///
    /// See [`MOUSE_BUTTON_LEFT`] and friends for the common indices.
    pub fn button_state(&self, button: u8) -> bool {
        self.shared.buttons[usize::from(button)].load(Ordering::Relaxed)
    }

    /// Returns the scroll accumulated since the previous call and resets it.
    ///
    /// Each axis is swapped out on its own, so a delta landing between the
    /// two swaps is split across this read and the next; none is lost.
    pub fn load_clear_scroll_delta(&self) -> (f64, f64) {
        let x = self.shared.scroll_delta_x.swap(0.0, Ordering::Relaxed);
        let y = self.shared.scroll_delta_y.swap(0.0, Ordering::Relaxed);
        (x, y)
    }

    /// Window that received the most recent mouse event.
    pub fn last_window(&self) -> Option<WindowHandle> {
        WindowHandle::from_ptr(self.shared.window_ptr.load(Ordering::Relaxed))
    }
}

impl Default for Mouse {
    fn default() -> Self {
        Self::new()
    }
}

impl InputListener for Mouse {
    fn on_input(&self, event: &InputEvent) {
        match event {
            InputEvent::MouseMove(e) => self.shared.apply_move(e),
            InputEvent::MouseButton(e) => self.shared.apply_button(e),
            InputEvent::MouseScroll(e) => self.shared.apply_scroll(e),
            InputEvent::Key(_) => {}
        }
    }
}

//boilerplate

impl PartialEq for Mouse {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for Mouse {}

impl Hash for Mouse {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.shared).hash(state);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
