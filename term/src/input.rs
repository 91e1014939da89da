//! Key and mouse input types.
#[cfg(feature = "use_serde")]
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    #[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
    #[derive(Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const ALT = 2;
        const CTRL = 4;
        const META = 8;
    }
}

/// Keys as delivered by the embedding GUI layer.  Only keys that expand
/// to byte sequences are listed; modifier keys pressed on their own
/// encode to nothing.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    UpArrow,
    DownArrow,
    RightArrow,
    LeftArrow,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Enter,
    Tab,
    Backspace,
    Escape,
    /// F1-F20
    Function(u8),
    Numpad(u8),
    NumpadDecimal,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadEnter,
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    None,
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseEventKind {
    Press,
    Release,
    Move,
}

/// Which classes of mouse event the application asked to receive.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseTracking {
    None,
    /// DECSET 9: button presses only.
    X10,
    /// DECSET 1000: presses, releases and wheel.
    Vt200,
    /// DECSET 1002: everything except motion with no button held.
    BtnEvent,
    /// DECSET 1003: everything including bare motion.
    AnyEvent,
}

impl Default for MouseTracking {
    fn default() -> MouseTracking {
        MouseTracking::None
    }
}

/// How mouse reports are encoded on the wire.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseEncoding {
    /// `CSI M` followed by three bytes offset by 32.
    Default,
    /// DECSET 1005: as Default but coordinates may be multi-byte UTF-8.
    Utf8,
    /// DECSET 1006: `CSI < b ; x ; y M|m` decimal.
    Sgr,
    /// DECSET 1015: `CSI b ; x ; y M` decimal with the +32 base.
    Urxvt,
}

impl Default for MouseEncoding {
    fn default() -> MouseEncoding {
        MouseEncoding::Default
    }
}

#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CursorStyle {
    Block,
    Underline,
    Bar,
}

impl Default for CursorStyle {
    fn default() -> CursorStyle {
        CursorStyle::Block
    }
}
