//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit events into the primitive arguments of the bridge calls.
//
// Architecture:
//   Winit Events → input_processor → (u16 / u8 / f64 pairs) → Producer
//
// Stateless: every conversion depends only on its input. Keys with no
// hardware code in the key table (F21-F24, browser keys, ...) map to
// `None` and are never sent.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{MouseButton as WinitMouseButton, MouseScrollDelta},
    keyboard::{KeyCode as WinitKeyCode, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::key::KeyCode;

//=== Keys ================================================================

macro_rules! same_name_keys {
    ($code:expr; $( $name:ident, )*) => {
        match $code {
            $( WinitKeyCode::$name => Some(KeyCode::$name), )*
            _ => None,
        }
    };
}

/// Maps a Winit physical key to a key table entry.
pub(crate) fn map_physical_key(key: PhysicalKey) -> Option<KeyCode> {
    match key {
        PhysicalKey::Code(code) => map_key_code(code),
        PhysicalKey::Unidentified(_) => None,
    }
}

/// Maps a Winit key code. Names line up one to one.
pub(crate) fn map_key_code(code: WinitKeyCode) -> Option<KeyCode> {
    same_name_keys! { code;
        //--- Letters -----------------------------------------------------------
        KeyA,
        KeyB,
        KeyC,
        KeyD,
        KeyE,
        KeyF,
        KeyG,
        KeyH,
        KeyI,
        KeyJ,
        KeyK,
        KeyL,
        KeyM,
        KeyN,
        KeyO,
        KeyP,
        KeyQ,
        KeyR,
        KeyS,
        KeyT,
        KeyU,
        KeyV,
        KeyW,
        KeyX,
        KeyY,
        KeyZ,

        //--- Digits ------------------------------------------------------------
        Digit0,
        Digit1,
        Digit2,
        Digit3,
        Digit4,
        Digit5,
        Digit6,
        Digit7,
        Digit8,
        Digit9,

        //--- Numpad ------------------------------------------------------------
        NumpadDecimal,
        NumpadMultiply,
        NumpadAdd,
        NumLock,
        NumpadDivide,
        NumpadEnter,
        NumpadSubtract,
        NumpadEqual,
        Numpad0,
        Numpad1,
        Numpad2,
        Numpad3,
        Numpad4,
        Numpad5,
        Numpad6,
        Numpad7,
        Numpad8,
        Numpad9,
        NumpadComma,

        //--- Function Row ------------------------------------------------------
        F1,
        F2,
        F3,
        F4,
        F5,
        F6,
        F7,
        F8,
        F9,
        F10,
        F11,
        F12,
        F13,
        F14,
        F15,
        F16,
        F17,
        F18,
        F19,
        F20,

        //--- Modifiers ---------------------------------------------------------
        SuperRight,
        SuperLeft,
        ShiftLeft,
        CapsLock,
        AltLeft,
        ControlLeft,
        ShiftRight,
        AltRight,
        ControlRight,
        Fn,

        //--- Navigation --------------------------------------------------------
        Home,
        PageUp,
        End,
        PageDown,
        ArrowLeft,
        ArrowRight,
        ArrowDown,
        ArrowUp,

        //--- Editing, Punctuation and Media ------------------------------------
        IntlBackslash,
        Equal,
        Minus,
        BracketRight,
        BracketLeft,
        Quote,
        Semicolon,
        Backslash,
        Comma,
        Slash,
        Period,
        Backquote,
        IntlYen,
        IntlRo,
        Enter,
        Tab,
        Space,
        Backspace,
        Escape,
        Delete,
        AudioVolumeUp,
        AudioVolumeDown,
        AudioVolumeMute,
        Lang2,
        Lang1,
        ContextMenu,
        Help,
    }
}

//=== Mouse ===============================================================

/// Maps a Winit button to the bridge's button index.
///
/// Left/Right/Middle are 0/1/2, Back/Forward are 3/4. `Other(n)` passes
/// through, saturating at 255.
pub(crate) fn map_mouse_button(button: WinitMouseButton) -> u8 {
    match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Back => 3,
        WinitMouseButton::Forward => 4,
        WinitMouseButton::Other(n) => u8::try_from(n).unwrap_or(u8::MAX),
    }
}

/// Converts a wheel delta to `(dx, dy)`.
///
/// Line deltas are passed through in lines; pixel deltas are converted to
/// logical points. The sign is Winit's (positive y scrolls content up).
pub(crate) fn map_scroll_delta(delta: MouseScrollDelta, scale_factor: f64) -> (f64, f64) {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => (f64::from(x), f64::from(y)),
        MouseScrollDelta::PixelDelta(position) => {
            let logical = position.to_logical::<f64>(scale_factor);
            (logical.x, logical.y)
        }
    }
}

/// Cursor position and window size, both in logical points.
///
/// Returns `(x, y, width, height)` in the argument order of the move call.
pub(crate) fn map_cursor(
    position: PhysicalPosition<f64>,
    inner_size: PhysicalSize<u32>,
    scale_factor: f64,
) -> (f64, f64, f64, f64) {
    let position = position.to_logical::<f64>(scale_factor);
    let size = inner_size.to_logical::<f64>(scale_factor);
    (position.x, position.y, size.width, size.height)
}

//=========================================================================
// Tests
//=========================================================================
