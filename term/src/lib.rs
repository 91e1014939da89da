//! An embeddable, headless terminal emulator model.
//!
//! Feed it the byte stream an application writes to its pty and it
//! maintains a grid of styled cells with scrollback that a renderer or
//! test harness can inspect.  It also encodes keyboard, mouse and focus
//! input into the byte sequences the application expects, and answers
//! device query escape sequences.
//!
//! What this crate deliberately does not do: rendering, font metrics,
//! pty management, selection UX or an event loop.  Those belong to the
//! embedding application, which talks to the core through
//! [`Terminal::write`], the [`EventListener`] callbacks and the screen
//! inspection API.
//!
//! Everything is synchronous and single threaded per instance; the
//! observable effect of a `write` is identical no matter how the bytes
//! are chunked.
#[cfg(feature = "use_serde")]
use serde::{Deserialize, Serialize};

pub mod attr;
pub mod cell;
pub mod config;
pub mod events;
pub mod input;
pub mod keyboard;
pub mod line;
pub mod mouse;
pub mod ring;
pub mod screen;
mod terminal;
mod terminalstate;
pub mod width;

#[cfg(test)]
mod test;

pub use attr::{Attribute, ColorMode, DEFAULT_BG, DEFAULT_FG};
pub use cell::Cell;
pub use config::{TerminalOptions, WindowOps};
pub use events::{EventListener, NullListener, WindowInfo, WindowInfoRequest};
pub use input::{
    CursorStyle, KeyCode, Modifiers, MouseButton, MouseEncoding, MouseEventKind, MouseTracking,
};
pub use keyboard::KeyEncodeModes;
pub use line::{Line, LineAttr};
pub use mouse::MouseEvent;
pub use ring::CircularBuffer;
pub use screen::{SavedCursor, Screen};
pub use terminal::Terminal;
pub use terminalstate::TerminalState;
pub use width::{UnicodeWidth, WidthResolver};

/// Describes the location of the cursor, relative to the top left of
/// the active area.  `x` may transiently equal the column count while a
/// wrap is pending.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct CursorPosition {
    pub x: usize,
    pub y: usize,
}
