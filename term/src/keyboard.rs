//! Encoding of key events into the byte sequences applications expect.
use crate::input::{KeyCode, Modifiers};
use anyhow::{bail, Result};
use std::fmt::Write;

pub const CSI: &str = "\x1b[";
pub const SS3: &str = "\x1bO";

/// The mode state that affects how keys encode.
#[derive(Debug, Default, Copy, Clone)]
pub struct KeyEncodeModes {
    pub application_cursor_keys: bool,
    pub application_keypad: bool,
    pub newline_mode: bool,
    pub meta_sends_escape: bool,
    pub alt_sends_escape: bool,
    pub win32_input: bool,
}

/// The xterm modifier parameter: 1 plus a bitmask of held modifiers.
fn encode_modifiers(mods: Modifiers) -> u8 {
    let mut number = 0;
    if mods.contains(Modifiers::SHIFT) {
        number |= 1;
    }
    if mods.contains(Modifiers::ALT) {
        number |= 2;
    }
    if mods.contains(Modifiers::CTRL) {
        number |= 4;
    }
    number
}

/// Map c to its Ctrl equivalent: letters mask to 0x01..0x1a and a
/// handful of punctuation characters have legacy control mappings.
fn ctrl_mapping(c: char) -> Option<char> {
    Some(match c {
        'a'..='z' => ((c as u8) - b'a' + 1) as char,
        'A'..='Z' => ((c as u8) - b'A' + 1) as char,
        ' ' | '@' => '\x00',
        '[' => '\x1b',
        '\\' => '\x1c',
        ']' => '\x1d',
        '^' => '\x1e',
        '_' => '\x1f',
        '?' => '\x7f',
        _ => return None,
    })
}

impl KeyCode {
    /// Returns the xterm compatible byte sequence that represents this
    /// KeyCode and Modifier combination in the given mode state.
    pub fn encode(&self, mods: Modifiers, modes: KeyEncodeModes) -> Result<String> {
        use KeyCode::*;

        if modes.win32_input {
            return self.encode_win32(mods);
        }

        let mut buf = String::new();

        match *self {
            Char(c) => {
                encode_char_common(&mut buf, c, mods, modes);
            }

            Enter | Escape | Backspace | Tab => {
                if *self == Tab && mods.contains(Modifiers::SHIFT) {
                    buf.push_str("\x1b[Z");
                } else {
                    let c = match *self {
                        Enter => '\r',
                        Escape => '\x1b',
                        // Backspace sends the default VERASE, which is
                        // confusingly the DEL codepoint
                        Backspace => '\x7f',
                        Tab => '\t',
                        _ => unreachable!(),
                    };
                    if esc_prefix_wanted(mods, modes) {
                        buf.push('\x1b');
                    }
                    buf.push(c);
                    if modes.newline_mode && *self == Enter {
                        buf.push('\n');
                    }
                }
            }

            UpArrow | DownArrow | RightArrow | LeftArrow | Home | End => {
                let c = match *self {
                    UpArrow => 'A',
                    DownArrow => 'B',
                    RightArrow => 'C',
                    LeftArrow => 'D',
                    Home => 'H',
                    End => 'F',
                    _ => unreachable!(),
                };
                let encoded_mods = encode_modifiers(mods);
                if encoded_mods != 0 {
                    write!(buf, "{}1;{}{}", CSI, 1 + encoded_mods, c)?;
                } else if modes.application_cursor_keys {
                    write!(buf, "{}{}", SS3, c)?;
                } else {
                    write!(buf, "{}{}", CSI, c)?;
                }
            }

            PageUp | PageDown | Insert | Delete => {
                let n = match *self {
                    Insert => 2,
                    Delete => 3,
                    PageUp => 5,
                    PageDown => 6,
                    _ => unreachable!(),
                };
                let encoded_mods = encode_modifiers(mods);
                if encoded_mods != 0 {
                    write!(buf, "{}{};{}~", CSI, n, 1 + encoded_mods)?;
                } else {
                    write!(buf, "{}{}~", CSI, n)?;
                }
            }

            Function(n) => {
                if n == 0 || n > 20 {
                    bail!("unhandled fkey number {}", n);
                }
                let encoded_mods = encode_modifiers(mods);
                if n <= 4 {
                    // F1-F4 use SS3 finals; the modified form switches
                    // to CSI with a leading 1 parameter.
                    let c = match n {
                        1 => 'P',
                        2 => 'Q',
                        3 => 'R',
                        _ => 'S',
                    };
                    if encoded_mods == 0 {
                        write!(buf, "{}{}", SS3, c)?;
                    } else {
                        write!(buf, "{}1;{}{}", CSI, 1 + encoded_mods, c)?;
                    }
                } else {
                    let intro = match n {
                        5 => 15,
                        6 => 17,
                        7 => 18,
                        8 => 19,
                        9 => 20,
                        10 => 21,
                        11 => 23,
                        12 => 24,
                        13 => 25,
                        14 => 26,
                        15 => 28,
                        16 => 29,
                        17 => 31,
                        18 => 32,
                        19 => 33,
                        _ => 34,
                    };
                    if encoded_mods == 0 {
                        write!(buf, "{}{}~", CSI, intro)?;
                    } else {
                        write!(buf, "{}{};{}~", CSI, intro, 1 + encoded_mods)?;
                    }
                }
            }

            Numpad(n) => {
                if modes.application_keypad {
                    let c = (b'p' + n.min(9)) as char;
                    write!(buf, "{}{}", SS3, c)?;
                } else {
                    buf.push((b'0' + n.min(9)) as char);
                }
            }
            NumpadDecimal => {
                if modes.application_keypad {
                    write!(buf, "{}n", SS3)?;
                } else {
                    buf.push('.');
                }
            }
            // Keypad operators are literal regardless of mode
            NumpadAdd => buf.push('+'),
            NumpadSubtract => buf.push('-'),
            NumpadMultiply => buf.push('*'),
            NumpadDivide => buf.push('/'),
            NumpadEnter => buf.push('\r'),
        }

        Ok(buf)
    }

    /// The ConPTY win32-input-mode encoding: a key event is reported as
    /// `CSI Vk ; Sc ; Uc ; Kd ; Cs ; Rep _` with the ControlKeyState
    /// bits of the Windows console input record.
    fn encode_win32(&self, mods: Modifiers) -> Result<String> {
        use KeyCode::*;

        const SHIFT_PRESSED: u32 = 0x10;
        const LEFT_ALT_PRESSED: u32 = 0x02;
        const LEFT_CTRL_PRESSED: u32 = 0x08;
        const ENHANCED_KEY: u32 = 0x100;

        let mut control_state = 0u32;
        if mods.contains(Modifiers::SHIFT) {
            control_state |= SHIFT_PRESSED;
        }
        if mods.contains(Modifiers::ALT) {
            control_state |= LEFT_ALT_PRESSED;
        }
        if mods.contains(Modifiers::CTRL) {
            control_state |= LEFT_CTRL_PRESSED;
        }

        let (vk, uc, enhanced) = match *self {
            Char(c) => {
                let vk = match c {
                    'a'..='z' => c.to_ascii_uppercase() as u32,
                    'A'..='Z' | '0'..='9' => c as u32,
                    ' ' => 0x20,
                    _ => 0,
                };
                (vk, c as u32, false)
            }
            Backspace => (0x08, 0x08, false),
            Tab => (0x09, 0x09, false),
            Enter | NumpadEnter => (0x0d, 0x0d, false),
            Escape => (0x1b, 0x1b, false),
            PageUp => (0x21, 0, true),
            PageDown => (0x22, 0, true),
            End => (0x23, 0, true),
            Home => (0x24, 0, true),
            LeftArrow => (0x25, 0, true),
            UpArrow => (0x26, 0, true),
            RightArrow => (0x27, 0, true),
            DownArrow => (0x28, 0, true),
            Insert => (0x2d, 0, true),
            Delete => (0x2e, 0, true),
            Function(n) if (1..=20).contains(&n) => (0x6f + n as u32, 0, false),
            Function(n) => bail!("unhandled fkey number {}", n),
            Numpad(n) => (0x60 + n.min(9) as u32, (b'0' + n.min(9)) as u32, false),
            NumpadDecimal => (0x6e, b'.' as u32, false),
            NumpadAdd => (0x6b, b'+' as u32, false),
            NumpadSubtract => (0x6d, b'-' as u32, false),
            NumpadMultiply => (0x6a, b'*' as u32, false),
            NumpadDivide => (0x6f, b'/' as u32, false),
        };
        if enhanced {
            control_state |= ENHANCED_KEY;
        }

        Ok(format!(
            "\x1b[{};{};{};{};{};{}_",
            vk, 0, uc, 1, control_state, 1
        ))
    }
}

/// True if this key should be prefixed with ESC for the held modifiers.
fn esc_prefix_wanted(mods: Modifiers, modes: KeyEncodeModes) -> bool {
    if mods.contains(Modifiers::ALT) {
        // DECSET 1039 narrows Alt to composing when reset; the encoder
        // keeps the xterm default of prefixing unless explicitly
        // configured otherwise by the embedder via alt_sends_escape.
        return true;
    }
    mods.contains(Modifiers::META) && modes.meta_sends_escape
}

/// Encode a plain character with modifiers; shared by `KeyCode::Char`
/// and `Terminal::encode_char`.
pub(crate) fn encode_char_common(buf: &mut String, c: char, mods: Modifiers, modes: KeyEncodeModes) {
    if mods.contains(Modifiers::CTRL) {
        if let Some(ctrl) = ctrl_mapping(c) {
            if esc_prefix_wanted(mods, modes) {
                buf.push('\x1b');
            }
            buf.push(ctrl);
            return;
        }
    }
    if esc_prefix_wanted(mods, modes) {
        buf.push('\x1b');
    }
    buf.push(c);
}
