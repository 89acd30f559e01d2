//=========================================================================
// Coalesced Keyboard
//=========================================================================
//
// Listener that folds key notifications into a pressed/released table.
//
// All physical keyboards the producer reports are coalesced into one
// logical keyboard. State is kept in atomics so queries are lock-free
// and safe from any thread while the producer writes from its own.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::c_void;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyEvent, WindowHandle};
use super::key::KeyCode;
use crate::core::platform_bridge::interface::InputListener;

//=== Shared ==============================================================

#[derive(Debug)]
struct Shared {
    /// Indexed by `KeyCode as usize`.
    key_states: Vec<AtomicBool>,
    /// Window of the most recent key event (null if none).
    window_ptr: AtomicPtr<c_void>,
    unknown_codes: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            key_states: KeyCode::ALL.iter().map(|_| AtomicBool::new(false)).collect(),
            window_ptr: AtomicPtr::new(std::ptr::null_mut()),
            unknown_codes: AtomicU64::new(0),
        }
    }

    fn apply(&self, event: &KeyEvent) {
        let raw_window = event.window.map_or(std::ptr::null_mut(), WindowHandle::as_ptr);
        self.window_ptr.store(raw_window, Ordering::Relaxed);

        match event.key() {
            Some(key) => {
                trace!(target: "input::keyboard", "Setting key {} to {}", key, event.pressed);
                self.key_states[key as usize].store(event.pressed, Ordering::Relaxed);
            }
            None => {
                self.unknown_codes.fetch_add(1, Ordering::Relaxed);
                debug!(target: "input::keyboard", "Unknown key code {:#06x}", event.key_code);
            }
        }
    }
}

//=== Keyboard ============================================================

/// Pressed state of every known key, fed by key notifications.
///
/// Cloning is cheap and every clone observes the same state, so one clone
/// can be registered as a listener while another is queried.
#[derive(Debug, Clone)]
pub struct Keyboard {
    shared: Arc<Shared>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
        }
    }

    /// Returns `true` while `key` is held.
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.shared.key_states[key as usize].load(Ordering::Relaxed)
    }

    /// Every key currently held, in `KeyCode` order.
    pub fn pressed_keys(&self) -> Vec<KeyCode> {
        KeyCode::ALL
            .iter()
            .copied()
            .filter(|&key| self.is_pressed(key))
            .collect()
    }

    /// Window that received the most recent key event.
    pub fn last_window(&self) -> Option<WindowHandle> {
        WindowHandle::from_ptr(self.shared.window_ptr.load(Ordering::Relaxed))
    }

    /// Key events whose code did not decode to a [`KeyCode`].
    pub fn unknown_codes(&self) -> u64 {
        self.shared.unknown_codes.load(Ordering::Relaxed)
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl InputListener for Keyboard {
    fn on_input(&self, event: &InputEvent) {
        if let InputEvent::Key(key_event) = event {
            self.shared.apply(key_event);
        }
    }
}

//boilerplate

impl PartialEq for Keyboard {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for Keyboard {}

impl Hash for Keyboard {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.shared).hash(state);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
