//! The terminal façade: owns the scanner and the state and exposes the
//! embedder-facing API.
use crate::config::TerminalOptions;
use crate::events::EventListener;
use crate::input::{KeyCode, Modifiers, MouseButton, MouseEventKind, MouseTracking};
use crate::keyboard::encode_char_common;
use crate::mouse::{self, MouseEvent};
use crate::terminalstate::{Performer, TerminalState};
use anyhow::Result;
use std::ops::{Deref, DerefMut};
use vtscan::VtScanner;

pub struct Terminal {
    /// The terminal model/state.
    state: TerminalState,
    /// Baseline escape sequence scanner.
    scanner: VtScanner,
}

impl Deref for Terminal {
    type Target = TerminalState;

    fn deref(&self) -> &TerminalState {
        &self.state
    }
}

impl DerefMut for Terminal {
    fn deref_mut(&mut self) -> &mut TerminalState {
        &mut self.state
    }
}

impl Terminal {
    pub fn new(options: TerminalOptions, listener: Box<dyn EventListener>) -> Terminal {
        Terminal {
            state: TerminalState::new(options, listener),
            scanner: VtScanner::new(),
        }
    }

    /// Feed the terminal a chunk of output from the application.  The
    /// chunk need not contain complete escape sequences; scanner state
    /// persists across calls.  Replies and other observable events fire
    /// synchronously on the listener before this returns.
    pub fn write<B: AsRef<[u8]>>(&mut self, bytes: B) {
        let mut performer = Performer::new(&mut self.state);
        self.scanner.scan(bytes.as_ref(), &mut performer);
    }

    /// Write `text` followed by CRLF.
    pub fn write_line(&mut self, text: &str) {
        self.write(text);
        self.write("\r\n");
    }

    /// Change the grid dimensions; no-op when unchanged.
    pub fn resize(&mut self, cols: usize, rows: usize) -> Result<()> {
        self.state.resize(cols, rows)
    }

    /// Hard reset, as if the terminal had just been powered on.  Also
    /// abandons any partially received escape sequence.
    pub fn reset(&mut self) {
        self.scanner.reset();
        self.state.full_reset();
    }

    /// Clear the visible area of the active screen and home the
    /// cursor; scrollback survives.
    pub fn clear(&mut self) {
        self.state.clear_visible();
    }

    pub fn scroll_lines(&mut self, delta: isize) {
        self.state.scroll_viewport(delta);
    }

    pub fn scroll_to_top(&mut self) {
        self.state.scroll_viewport_to_top();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.state.scroll_viewport_to_bottom();
    }

    /// Switch to the alternate screen; idempotent.
    pub fn switch_to_alt_buffer(&mut self) {
        self.state.activate_alt_screen(false);
    }

    /// Switch to the normal screen; idempotent.
    pub fn switch_to_normal_buffer(&mut self) {
        self.state.activate_primary_screen();
    }

    /// Encode a key press into the bytes to forward to the
    /// application, honoring the active keyboard modes.
    pub fn encode_key(&mut self, key: KeyCode, mods: Modifiers) -> Result<String> {
        let encoded = key.encode(mods, self.state.key_encode_modes())?;
        if !encoded.is_empty() && self.state.options.scroll_to_bottom_on_key_input {
            self.state.screen_mut().scroll_to_bottom();
        }
        Ok(encoded)
    }

    /// Encode plain character input with modifiers.
    pub fn encode_char(&mut self, c: char, mods: Modifiers) -> Result<String> {
        let modes = self.state.key_encode_modes();
        if modes.win32_input {
            return self.encode_key(KeyCode::Char(c), mods);
        }
        let mut buf = String::new();
        encode_char_common(&mut buf, c, mods, modes);
        if !buf.is_empty() && self.state.options.scroll_to_bottom_on_key_input {
            self.state.screen_mut().scroll_to_bottom();
        }
        Ok(buf)
    }

    /// Encode a mouse event per the active tracking mode and encoding.
    /// Returns an empty string when the event is not reported; wheel
    /// events over the alternate screen with tracking disabled fall
    /// back to arrow keys (the xterm alternateScroll behavior).
    pub fn encode_mouse(
        &mut self,
        button: MouseButton,
        kind: MouseEventKind,
        x: usize,
        y: usize,
        mods: Modifiers,
    ) -> String {
        let event = MouseEvent {
            kind,
            button,
            // clamp to the grid; a resize can leave the pointer over a
            // partial row or column
            x: x.min(self.state.screen().cols - 1),
            y: y.min(self.state.screen().rows - 1),
            modifiers: mods,
        };

        if self.state.mouse_tracking() == MouseTracking::None
            && self.state.is_alt_screen_active()
            && kind == MouseEventKind::Press
        {
            let arrow = match button {
                MouseButton::WheelUp => Some(KeyCode::UpArrow),
                MouseButton::WheelDown => Some(KeyCode::DownArrow),
                _ => None,
            };
            if let Some(arrow) = arrow {
                return arrow
                    .encode(mods, self.state.key_encode_modes())
                    .unwrap_or_default();
            }
        }

        mouse::encode_mouse(
            &event,
            self.state.mouse_tracking(),
            self.state.mouse_encoding(),
        )
    }

    /// Focus-change report, if the application enabled focus tracking.
    pub fn encode_focus(&mut self, focused: bool) -> String {
        mouse::encode_focus(focused, self.state.focus_tracking())
    }
}
