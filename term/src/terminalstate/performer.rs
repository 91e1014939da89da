//! Routes scanner events into terminal state mutations.
use crate::cell::Cell;
use crate::line::LineAttr;
use crate::terminalstate::{CharSet, PendingDcs, TerminalState};
use log::{debug, warn};
use std::ops::{Deref, DerefMut};
use unicode_segmentation::UnicodeSegmentation;
use vtscan::{Params, VtDispatch};

/// A helper struct for implementing `vtscan::VtDispatch` while
/// compartmentalizing the terminal state and the embedding interface.
/// Printable text is buffered so that combining marks arriving byte by
/// byte can be grouped into grapheme clusters before hitting the grid.
pub(crate) struct Performer<'a> {
    pub state: &'a mut TerminalState,
    print: Option<String>,
}

impl<'a> Deref for Performer<'a> {
    type Target = TerminalState;

    fn deref(&self) -> &TerminalState {
        self.state
    }
}

impl<'a> DerefMut for Performer<'a> {
    fn deref_mut(&mut self) -> &mut TerminalState {
        &mut self.state
    }
}

impl<'a> Drop for Performer<'a> {
    fn drop(&mut self) {
        self.flush_print();
    }
}

fn dec_line_drawing(g: &str) -> &str {
    match g {
        "`" => "◆",
        "a" => "▒",
        "b" => "␉",
        "c" => "␌",
        "d" => "␍",
        "e" => "␊",
        "f" => "°",
        "g" => "±",
        "h" => "␤",
        "i" => "␋",
        "j" => "┘",
        "k" => "┐",
        "l" => "┌",
        "m" => "└",
        "n" => "┼",
        "o" => "⎺",
        "p" => "⎻",
        "q" => "─",
        "r" => "⎼",
        "s" => "⎽",
        "t" => "├",
        "u" => "┤",
        "v" => "┴",
        "w" => "┬",
        "x" => "│",
        "y" => "≤",
        "z" => "≥",
        "{" => "π",
        "|" => "≠",
        "}" => "£",
        "~" => "·",
        _ => g,
    }
}

impl<'a> Performer<'a> {
    pub fn new(state: &'a mut TerminalState) -> Self {
        Self { state, print: None }
    }

    fn active_charset(&self) -> CharSet {
        if self.shift_out {
            self.g1_charset
        } else {
            self.g0_charset
        }
    }

    fn flush_print(&mut self) {
        let p = match self.print.take() {
            Some(s) => s,
            None => return,
        };

        for g in p.as_str().graphemes(true) {
            let g = match self.active_charset() {
                CharSet::Ascii => g,
                CharSet::DecLineDrawing => dec_line_drawing(g),
                CharSet::Uk => {
                    if g == "#" {
                        "£"
                    } else {
                        g
                    }
                }
            };

            let width = self.width.width(g);
            if width == 0 {
                self.attach_combining(g);
                continue;
            }
            self.print_cell(g, width.min(2));
        }
    }

    /// Append a zero width cluster to the cell before the cursor.
    fn attach_combining(&mut self, g: &str) {
        let cursor = self.cursor_pos();
        if cursor.x == 0 {
            return;
        }
        let cols = self.screen().cols;
        let mut x = cursor.x.min(cols) - 1;
        let abs = self.screen().absolute_y(cursor.y);
        if self
            .screen()
            .get_line(abs)
            .map(|l| l.get(x).is_wide_spacer())
            .unwrap_or(false)
            && x > 0
        {
            x -= 1;
        }
        let chars: Vec<char> = g.chars().collect();
        if let Some(cell) = self.screen_mut().line_mut(abs).cell_mut(x) {
            for c in chars {
                cell.push_combining(c);
            }
        }
    }

    /// When overwriting one half of an existing wide pair, blank the
    /// other half so no orphaned spacer survives.
    fn unlink_wide_at(&mut self, abs: usize, x: usize) {
        let line = self.state.screen_mut().line_mut(abs);
        let cell = line.get(x);
        if cell.is_wide_spacer() && x > 0 {
            let attr = *line.get(x - 1).attr();
            line.set(x - 1, Cell::space(attr));
        } else if cell.width() == 2 {
            let attr = *cell.attr();
            line.set(x + 1, Cell::space(attr));
        }
    }

    fn print_cell(&mut self, g: &str, width: usize) {
        let cols = self.screen().cols;
        let rows = self.screen().rows;
        let cursor = self.cursor_pos();
        let mut x = cursor.x;
        let mut y = cursor.y;

        if x + width > cols {
            if self.dec_auto_wrap {
                if y == self.screen().scroll_bottom() {
                    // the new bottom line continues this one
                    self.scroll_up(1, true);
                } else {
                    y = (y + 1).min(rows - 1);
                    let abs = self.screen().absolute_y(y);
                    self.state.screen_mut().line_mut(abs).set_wrapped(true);
                }
                x = 0;
            } else if x >= cols {
                // no autowrap: overflow beyond the last column is
                // dropped silently
                return;
            } else {
                // a wide glyph that does not fit prints at the edge
                x = cols - width;
            }
        }

        let abs = self.screen().absolute_y(y);

        if self.insert {
            let fill = self.erase_cell();
            self.state
                .screen_mut()
                .line_mut(abs)
                .insert_cells(x, width, &fill);
        }

        self.unlink_wide_at(abs, x);
        if width == 2 {
            self.unlink_wide_at(abs, x + 1);
        }

        let pen = self.pen;
        let line = self.state.screen_mut().line_mut(abs);
        line.set(x, Cell::from_str(g, width as u8, pen));
        if width == 2 {
            line.set(x + 1, Cell::wide_spacer(pen));
        }

        // x may now equal cols: the pending-wrap state
        self.state.screen_mut().move_cursor(x + width, y);
    }
}

impl<'a> VtDispatch for Performer<'a> {
    fn print(&mut self, c: char) {
        self.print.get_or_insert_with(String::new).push(c);
    }

    fn execute(&mut self, control: u8) {
        self.flush_print();
        match control {
            0x05 => {
                // ENQ answerback
                if !self.options.answerback.is_empty() {
                    let answerback = self.options.answerback.clone();
                    self.reply(answerback);
                }
            }
            0x07 => self.state.listener.bell(),
            0x08 => self.backspace(),
            0x09 => self.horizontal_tab(),
            0x0a | 0x0b | 0x0c => self.line_feed(),
            0x0d => self.carriage_return(),
            0x0e => self.shift_out = true,
            0x0f => self.shift_out = false,
            // C1 controls have ESC-sequence aliases
            0x84 => self.line_feed(),
            0x85 => {
                self.line_feed();
                self.carriage_return();
            }
            0x88 => self.set_tab_stop_here(),
            0x8d => self.reverse_index(),
            _ => debug!("unhandled control {:#x}", control),
        }
    }

    fn csi_dispatch(&mut self, collected: &[u8], params: &Params, control: u8) {
        self.flush_print();
        self.state.csi_dispatch(collected, params, control);
    }

    fn esc_dispatch(&mut self, collected: &[u8], control: u8) {
        self.flush_print();
        match (collected, control) {
            // String Terminator: handled by the scanner state tables
            (&[], b'\\') => {}
            (&[], b'D') => self.line_feed(),
            (&[], b'E') => {
                self.line_feed();
                self.carriage_return();
            }
            (&[], b'H') => self.set_tab_stop_here(),
            (&[], b'M') => self.reverse_index(),
            (&[], b'7') => self.save_cursor(),
            (&[], b'8') => self.restore_cursor(),
            (&[], b'c') => self.full_reset(),
            (&[], b'=') => self.application_keypad = true,
            (&[], b'>') => self.application_keypad = false,
            // DECID is an ancient alias for primary DA
            (&[], b'Z') => self.reply("\x1b[?1;2c"),

            (&[b'#'], b'3') => self.set_line_attr(LineAttr::DoubleHeightTop),
            (&[b'#'], b'4') => self.set_line_attr(LineAttr::DoubleHeightBottom),
            (&[b'#'], b'5') => self.set_line_attr(LineAttr::Normal),
            (&[b'#'], b'6') => self.set_line_attr(LineAttr::DoubleWidth),
            (&[b'#'], b'8') => self.screen_alignment_display(),

            (&[b'('], b'0') => self.g0_charset = CharSet::DecLineDrawing,
            (&[b'('], b'B') => self.g0_charset = CharSet::Ascii,
            (&[b'('], b'A') => self.g0_charset = CharSet::Uk,
            (&[b')'], b'0') => self.g1_charset = CharSet::DecLineDrawing,
            (&[b')'], b'B') => self.g1_charset = CharSet::Ascii,
            (&[b')'], b'A') => self.g1_charset = CharSet::Uk,

            _ => warn!(
                "ESC: unhandled collected={:?} control={:?}",
                collected, control as char
            ),
        }
    }

    fn osc_dispatch(&mut self, payload: &[u8]) {
        self.flush_print();
        let payload = String::from_utf8_lossy(payload).into_owned();
        let (code, rest) = match payload.split_once(';') {
            Some((code, rest)) => (code, rest),
            None => (payload.as_str(), ""),
        };
        match code {
            "0" => {
                self.title = rest.to_string();
                self.icon_title = Some(rest.to_string());
                self.state.listener.title_changed(rest);
            }
            "1" => {
                self.icon_title = Some(rest.to_string());
            }
            "2" => {
                self.title = rest.to_string();
                self.state.listener.title_changed(rest);
            }
            "4" => {
                // Palette changes are a renderer concern; the core
                // acknowledges and drops them.
                debug!("OSC 4 palette change ignored: {}", rest);
            }
            "7" => self.state.osc_set_directory(rest),
            "8" => self.state.osc_set_hyperlink(rest),
            "10" | "11" | "12" => self.state.osc_color_query(code, rest),
            "52" => self.state.osc_clipboard(rest),
            "104" => {
                debug!("OSC 104 palette reset ignored: {}", rest);
            }
            _ => warn!("OSC: unhandled {}", payload),
        }
    }

    fn dcs_hook(&mut self, collected: &[u8], _params: &Params, control: u8) {
        self.flush_print();
        self.state.pending_dcs = Some(PendingDcs {
            collected: collected.to_vec(),
            control,
            data: Vec::new(),
        });
    }

    fn dcs_put(&mut self, byte: u8) {
        if let Some(dcs) = self.state.pending_dcs.as_mut() {
            // the 4K cap mirrors the scanner's OSC bound
            if dcs.data.len() < 4096 {
                dcs.data.push(byte);
            }
        }
    }

    fn dcs_unhook(&mut self) {
        if let Some(dcs) = self.state.pending_dcs.take() {
            self.state.dcs_dispatch(dcs);
        }
    }
}

impl TerminalState {
    fn set_line_attr(&mut self, attr: LineAttr) {
        let y = self.cursor_pos().y;
        let abs = self.screen().absolute_y(y);
        self.screen_mut().line_mut(abs).set_line_attr(attr);
    }

    /// DECALN fills the screen with 'E' for display alignment.
    fn screen_alignment_display(&mut self) {
        let screen = self.screen_mut();
        let (cols, rows) = (screen.cols, screen.rows);
        let fill = Cell::new('E', 1, Default::default());
        for y in 0..rows {
            let line = screen.active_line_mut(y);
            line.fill(&fill, 0, cols);
        }
        screen.reset_scroll_region();
        screen.move_cursor(0, 0);
    }

    fn osc_set_directory(&mut self, uri: &str) {
        match url::Url::parse(uri) {
            Ok(url) if url.scheme() == "file" => {
                let path = percent_decode(url.path());
                self.current_dir = Some(path.clone());
                self.listener.directory_changed(&path);
            }
            Ok(_) | Err(_) => {
                warn!("OSC 7: not a file uri: {}", uri);
            }
        }
    }

    /// OSC 8: `params;uri` where params is a colon separated list of
    /// key=value pairs; an empty uri closes the hyperlink.
    fn osc_set_hyperlink(&mut self, rest: &str) {
        let (param_str, uri) = match rest.split_once(';') {
            Some(parts) => parts,
            None => {
                warn!("OSC 8: malformed: {}", rest);
                return;
            }
        };
        if uri.is_empty() {
            self.current_hyperlink = None;
            self.listener.hyperlink_changed(None, None);
            return;
        }
        let mut id = None;
        for kv in param_str.split(':') {
            if let Some((key, value)) = kv.split_once('=') {
                if key == "id" {
                    id = Some(value.to_string());
                }
            }
        }
        self.listener.hyperlink_changed(Some(uri), id.as_deref());
        self.current_hyperlink = Some((uri.to_string(), id));
    }

    /// OSC 10/11/12 colour queries reply with the configured defaults
    /// in the 16-bit-per-channel `rgb:` form.
    fn osc_color_query(&mut self, code: &str, rest: &str) {
        if rest != "?" {
            // setting the dynamic colors is a renderer concern
            debug!("OSC {} set ignored: {}", code, rest);
            return;
        }
        let (r, g, b) = match code {
            "10" => self.options.foreground,
            "11" => self.options.background,
            _ => self.options.cursor_color,
        };
        let reply = format!(
            "\x1b]{};rgb:{:04x}/{:04x}/{:04x}\x07",
            code,
            r as u32 * 0x101,
            g as u32 * 0x101,
            b as u32 * 0x101
        );
        self.reply(reply);
    }

    /// OSC 52: clipboard set (base64 payload) or query.
    fn osc_clipboard(&mut self, rest: &str) {
        let (_selection, data) = match rest.split_once(';') {
            Some(parts) => parts,
            None => {
                warn!("OSC 52: malformed: {}", rest);
                return;
            }
        };
        if data == "?" {
            // the core holds no clipboard; answer with an empty payload
            self.reply("\x1b]52;c;\x07");
            return;
        }
        use base64::Engine;
        match base64::engine::general_purpose::STANDARD.decode(data) {
            Ok(decoded) => {
                let text = String::from_utf8_lossy(&decoded).into_owned();
                self.listener.clipboard_set(&text);
            }
            Err(err) => warn!("OSC 52: bad base64: {}", err),
        }
    }

    /// DECRQSS status-string requests; anything unrecognized reports
    /// as invalid.
    fn dcs_dispatch(&mut self, dcs: PendingDcs) {
        match (dcs.collected.as_slice(), dcs.control) {
            (&[b'$'], b'q') => match dcs.data.as_slice() {
                &[b'r'] => {
                    let reply = format!(
                        "\x1bP1$r{};{}r\x1b\\",
                        self.screen().scroll_top() + 1,
                        self.screen().scroll_bottom() + 1
                    );
                    self.reply(reply);
                }
                &[b'"', b'p'] => self.reply("\x1bP1$r65;1\"p\x1b\\"),
                _ => self.reply("\x1bP0$r\x1b\\"),
            },
            _ => debug!(
                "unhandled DCS collected={:?} control={:?}",
                dcs.collected, dcs.control as char
            ),
        }
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(v) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
