//! Encoding of mouse events into the tracking reports applications
//! expect.
use crate::input::{Modifiers, MouseButton, MouseEncoding, MouseEventKind, MouseTracking};
use std::fmt::Write;

/// A mouse event as delivered by the embedding GUI layer.  `x` and `y`
/// are zero-based cell coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub button: MouseButton,
    pub x: usize,
    pub y: usize,
    pub modifiers: Modifiers,
}

/// Encode a coordinate for the legacy single-byte encoding.  The
/// theoretical maximum is 255-33, but the report travels as UTF-8 text
/// so the practical cap is the last single-byte codepoint, 127-33.
/// Applications that need more columns should enable SGR encoding.
fn legacy_coord(position: usize) -> char {
    (position + 1 + 32).min(127) as u8 as char
}

/// Coordinate for the UTF-8 extended encoding; values above 95 encode
/// as multi-byte characters, capping at 2015.
fn utf8_coord(position: usize) -> char {
    std::char::from_u32(((position + 1 + 32) as u32).min(2047)).unwrap_or(' ')
}

fn button_index(button: MouseButton) -> i8 {
    match button {
        MouseButton::None => 3,
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::WheelUp => 64,
        MouseButton::WheelDown => 65,
    }
}

fn modifier_bits(modifiers: Modifiers) -> i8 {
    let mut code = 0;
    if modifiers.contains(Modifiers::SHIFT) {
        code += 4;
    }
    if modifiers.contains(Modifiers::ALT) {
        code += 8;
    }
    if modifiers.contains(Modifiers::CTRL) {
        code += 16;
    }
    code
}

/// Is this event reportable at all under the active tracking mode?
fn event_allowed(tracking: MouseTracking, event: &MouseEvent) -> bool {
    let is_wheel = matches!(event.button, MouseButton::WheelUp | MouseButton::WheelDown);
    match tracking {
        MouseTracking::None => false,
        MouseTracking::X10 => event.kind == MouseEventKind::Press && !is_wheel,
        MouseTracking::Vt200 => event.kind != MouseEventKind::Move,
        MouseTracking::BtnEvent => {
            event.kind != MouseEventKind::Move || event.button != MouseButton::None
        }
        MouseTracking::AnyEvent => true,
    }
}

/// Encode `event` per the active tracking mode and encoding; returns an
/// empty string when the mode does not report this event.
pub fn encode_mouse(
    event: &MouseEvent,
    tracking: MouseTracking,
    encoding: MouseEncoding,
) -> String {
    if !event_allowed(tracking, event) {
        return String::new();
    }

    let mut cb = match event.kind {
        MouseEventKind::Press => button_index(event.button),
        MouseEventKind::Release => {
            // The legacy encodings cannot express which button was
            // released; SGR preserves it and flags the release with a
            // lowercase final instead.
            if encoding == MouseEncoding::Sgr {
                button_index(event.button)
            } else {
                3
            }
        }
        MouseEventKind::Move => 32 + button_index(event.button),
    };

    // X10 tracking predates modifier reporting
    if tracking != MouseTracking::X10 {
        cb += modifier_bits(event.modifiers);
    }

    let mut buf = String::new();
    match encoding {
        MouseEncoding::Sgr => {
            let final_byte = if event.kind == MouseEventKind::Release {
                'm'
            } else {
                'M'
            };
            write!(
                buf,
                "\x1b[<{};{};{}{}",
                cb,
                event.x + 1,
                event.y + 1,
                final_byte
            )
            .ok();
        }
        MouseEncoding::Urxvt => {
            write!(
                buf,
                "\x1b[{};{};{}M",
                32 + cb as i32,
                event.x + 1,
                event.y + 1
            )
            .ok();
        }
        MouseEncoding::Default => {
            write!(
                buf,
                "\x1b[M{}{}{}",
                (32 + cb) as u8 as char,
                legacy_coord(event.x),
                legacy_coord(event.y)
            )
            .ok();
        }
        MouseEncoding::Utf8 => {
            write!(
                buf,
                "\x1b[M{}{}{}",
                (32 + cb) as u8 as char,
                utf8_coord(event.x),
                utf8_coord(event.y)
            )
            .ok();
        }
    }
    buf
}

/// Focus reports, sent only when the application enabled them.
pub fn encode_focus(focused: bool, send_focus_events: bool) -> String {
    if !send_focus_events {
        return String::new();
    }
    if focused { "\x1b[I".into() } else { "\x1b[O".into() }
}
