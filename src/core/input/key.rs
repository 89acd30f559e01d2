//=========================================================================
// Key Codes
//
// Platform-independent physical key identifiers and the 16-bit code
// space that crosses the boundary.
//
// The producer reports hardware virtual key codes as laid out in
// HIToolbox `Events.h` (AppKit). These are layout independent: `KeyA` is
// the same physical key on QWERTY and AZERTY keyboards.
//
// Unknown codes decode to `None`; the raw event is still delivered so a
// listener can handle keys this table does not know about.
//
//=========================================================================

//=== Key Table ===========================================================
//
// One row per key: variant and its canonical wire code. The macro emits
// the enum, the `ALL` table and both conversion directions from the same
// rows so they cannot drift apart.
//

macro_rules! key_table {
    ($( $(#[$meta:meta])* $name:ident = $code:literal, )*) => {
        /// Physical keyboard key identifier.
        ///
        /// Represents the key location, not the character produced.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum KeyCode {
            $( $(#[$meta])* $name, )*
        }

        impl KeyCode {
            /// Every key, in declaration order (index == `key as usize`).
            pub const ALL: &'static [KeyCode] = &[ $( KeyCode::$name, )* ];

            /// Encodes this key as the wire code a producer would send.
            pub fn to_code(self) -> u16 {
                match self {
                    $( KeyCode::$name => $code, )*
                }
            }

            /// Decodes a wire code. Returns `None` for unknown codes.
            pub fn from_code(code: u16) -> Option<KeyCode> {
                match code {
                    // Second Enter position on compact keyboards.
                    0x34 => Some(KeyCode::NumpadEnter),
                    $( $code => Some(KeyCode::$name), )*
                    _ => None,
                }
            }
        }
    };
}

key_table! {
    //--- Letters ----------------------------------------------------------
    KeyA = 0x00,
    KeyS = 0x01,
    KeyD = 0x02,
    KeyF = 0x03,
    KeyH = 0x04,
    KeyG = 0x05,
    KeyZ = 0x06,
    KeyX = 0x07,
    KeyC = 0x08,
    KeyV = 0x09,
    KeyB = 0x0B,
    KeyQ = 0x0C,
    KeyW = 0x0D,
    KeyE = 0x0E,
    KeyR = 0x0F,
    KeyY = 0x10,
    KeyT = 0x11,
    KeyO = 0x1F,
    KeyU = 0x20,
    KeyI = 0x22,
    KeyP = 0x23,
    KeyL = 0x25,
    KeyJ = 0x26,
    KeyK = 0x28,
    KeyN = 0x2D,
    KeyM = 0x2E,

    //--- Digits -----------------------------------------------------------
    Digit1 = 0x12,
    Digit2 = 0x13,
    Digit3 = 0x14,
    Digit4 = 0x15,
    Digit6 = 0x16,
    Digit5 = 0x17,
    Digit9 = 0x19,
    Digit7 = 0x1A,
    Digit8 = 0x1C,
    Digit0 = 0x1D,

    //--- Punctuation ------------------------------------------------------
    /// Extra key left of Z on ISO keyboards.
    IntlBackslash = 0x0A,
    Equal = 0x18,
    Minus = 0x1B,
    BracketRight = 0x1E,
    BracketLeft = 0x21,
    Quote = 0x27,
    Semicolon = 0x29,
    Backslash = 0x2A,
    Comma = 0x2B,
    Slash = 0x2C,
    Period = 0x2F,
    Backquote = 0x32,
    /// JIS yen key.
    IntlYen = 0x5D,
    /// JIS underscore key.
    IntlRo = 0x5E,

    //--- Whitespace & Editing ---------------------------------------------
    Enter = 0x24,
    Tab = 0x30,
    Space = 0x31,
    /// Labelled "delete" on Apple keyboards.
    Backspace = 0x33,
    Escape = 0x35,
    /// Forward delete.
    Delete = 0x75,

    //--- Modifiers (as physical keys) -------------------------------------
    SuperRight = 0x36,
    SuperLeft = 0x37,
    ShiftLeft = 0x38,
    CapsLock = 0x39,
    AltLeft = 0x3A,
    ControlLeft = 0x3B,
    ShiftRight = 0x3C,
    AltRight = 0x3D,
    ControlRight = 0x3E,
    Fn = 0x3F,

    //--- Keypad -----------------------------------------------------------
    NumpadDecimal = 0x41,
    NumpadMultiply = 0x43,
    NumpadAdd = 0x45,
    NumLock = 0x47,
    NumpadDivide = 0x4B,
    NumpadEnter = 0x4C,
    NumpadSubtract = 0x4E,
    NumpadEqual = 0x51,
    Numpad0 = 0x52,
    Numpad1 = 0x53,
    Numpad2 = 0x54,
    Numpad3 = 0x55,
    Numpad4 = 0x56,
    Numpad5 = 0x57,
    Numpad6 = 0x58,
    Numpad7 = 0x59,
    Numpad8 = 0x5B,
    Numpad9 = 0x5C,
    NumpadComma = 0x5F,

    //--- Function Keys ----------------------------------------------------
    F17 = 0x40,
    F18 = 0x4F,
    F19 = 0x50,
    F20 = 0x5A,
    F5 = 0x60,
    F6 = 0x61,
    F7 = 0x62,
    F3 = 0x63,
    F8 = 0x64,
    F9 = 0x65,
    F11 = 0x67,
    F13 = 0x69,
    F16 = 0x6A,
    F14 = 0x6B,
    F10 = 0x6D,
    F12 = 0x6F,
    F15 = 0x71,
    F4 = 0x76,
    F2 = 0x78,
    F1 = 0x7A,

    //--- Media ------------------------------------------------------------
    AudioVolumeUp = 0x48,
    AudioVolumeDown = 0x49,
    AudioVolumeMute = 0x4A,

    //--- Input Method (JIS) -----------------------------------------------
    /// Eisu.
    Lang2 = 0x66,
    /// Kana.
    Lang1 = 0x68,

    //--- Navigation -------------------------------------------------------
    ContextMenu = 0x6E,
    Help = 0x72,
    Home = 0x73,
    PageUp = 0x74,
    End = 0x77,
    PageDown = 0x79,
    ArrowLeft = 0x7B,
    ArrowRight = 0x7C,
    ArrowDown = 0x7D,
    ArrowUp = 0x7E,
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
