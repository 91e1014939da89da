//! CSI sequence handling: cursor movement, erase/edit, SGR, modes,
//! device reports and window manipulation.
use crate::attr::Attribute;
use crate::config::WindowOps;
use crate::events::{WindowInfo, WindowInfoRequest};
use crate::input::{CursorStyle, MouseEncoding, MouseTracking};
use crate::terminalstate::TerminalState;
use log::{debug, warn};
use vtscan::{Params, PARAM_ABSENT};

/// A count parameter: absent and 0 both mean 1.
fn count(params: &Params, idx: usize) -> usize {
    params.get(idx, 1).max(1) as usize
}

impl TerminalState {
    pub(crate) fn csi_dispatch(&mut self, collected: &[u8], params: &Params, control: u8) {
        match (collected, control) {
            (&[], b'A') => self.cursor_up(count(params, 0)),
            (&[], b'B') => self.cursor_down(count(params, 0)),
            (&[], b'C') => self.cursor_forward(count(params, 0)),
            (&[], b'D') => self.cursor_backward(count(params, 0)),
            (&[], b'E') => {
                self.cursor_down(count(params, 0));
                self.carriage_return();
            }
            (&[], b'F') => {
                self.cursor_up(count(params, 0));
                self.carriage_return();
            }
            (&[], b'G') => {
                let y = self.cursor_pos().y;
                self.set_cursor_clamped(count(params, 0) - 1, y);
            }
            (&[], b'H') | (&[], b'f') => {
                self.cursor_position(count(params, 0) - 1, count(params, 1) - 1)
            }
            (&[], b'I') => {
                for _ in 0..count(params, 0) {
                    self.horizontal_tab();
                }
            }
            (&[], b'J') => self.erase_in_display(params.get(0, 0)),
            (&[], b'K') => self.erase_in_line(params.get(0, 0)),
            (&[], b'L') => self.insert_lines(count(params, 0)),
            (&[], b'M') => self.delete_lines(count(params, 0)),
            (&[], b'P') => self.delete_chars(count(params, 0)),
            (&[], b'S') => self.scroll_up(count(params, 0), false),
            (&[], b'T') => self.scroll_down(count(params, 0)),
            (&[], b'X') => self.erase_chars(count(params, 0)),
            (&[], b'Z') => {
                for _ in 0..count(params, 0) {
                    self.backward_tab();
                }
            }
            (&[], b'@') => self.insert_chars(count(params, 0)),
            (&[], b'c') => {
                if params.get(0, 0) == 0 {
                    self.reply("\x1b[?1;2c");
                }
            }
            (&[b'>'], b'c') => {
                if params.get(0, 0) == 0 {
                    self.reply("\x1b[>0;10;0c");
                }
            }
            (&[], b'd') => self.line_position(count(params, 0) - 1),
            (&[], b'g') => match params.get(0, 0) {
                0 => {
                    let x = self.cursor_pos().x.min(self.screen().cols - 1);
                    self.tabs.clear_tab_stop(x);
                }
                3 => self.tabs.clear_all(),
                n => debug!("TBC: unhandled {}", n),
            },
            (&[], b'm') => self.perform_sgr(params),
            (&[], b'n') => self.device_status_report(params.get(0, 0)),
            (&[b'?'], b'n') => self.device_status_report_dec(params.get(0, 0)),
            (&[], b'r') => {
                let rows = self.screen().rows as i32;
                let top = params.get(0, 1).max(1);
                let bottom = params.get(1, rows).max(1).min(rows);
                self.screen_mut()
                    .set_scroll_region(top as usize - 1, bottom as usize - 1);
                self.cursor_position(0, 0);
            }
            (&[], b's') => self.save_cursor(),
            (&[], b'u') => self.restore_cursor(),
            (&[], b'h') => self.set_ansi_mode(params, true),
            (&[], b'l') => self.set_ansi_mode(params, false),
            (&[b'?'], b'h') => self.set_dec_private_mode(params, true),
            (&[b'?'], b'l') => self.set_dec_private_mode(params, false),
            (&[b' '], b'q') => self.set_cursor_style(params.get(0, 0)),
            (&[], b't') => self.window_manipulation(params),
            (&[b'!'], b'p') => self.soft_reset(),
            _ => warn!(
                "CSI: unhandled collected={:?} control={:?} params={:?}",
                collected,
                control as char,
                params.to_array()
            ),
        }
    }

    // --- erase and edit ---------------------------------------------------

    fn erase_in_display(&mut self, mode: i32) {
        let cursor = self.cursor_pos();
        let cols = self.screen().cols;
        let rows = self.screen().rows;
        let x = cursor.x.min(cols - 1);
        match mode {
            0 => {
                self.erase_in_row(cursor.y, x, cols);
                self.erase_rows(cursor.y + 1, rows);
            }
            1 => {
                self.erase_rows(0, cursor.y);
                self.erase_in_row(cursor.y, 0, x + 1);
            }
            2 => self.erase_rows(0, rows),
            3 => self.screen_mut().erase_scrollback(),
            n => debug!("ED: unhandled {}", n),
        }
    }

    fn erase_in_line(&mut self, mode: i32) {
        let cursor = self.cursor_pos();
        let cols = self.screen().cols;
        let x = cursor.x.min(cols - 1);
        match mode {
            0 => self.erase_in_row(cursor.y, x, cols),
            1 => self.erase_in_row(cursor.y, 0, x + 1),
            2 => self.erase_in_row(cursor.y, 0, cols),
            n => debug!("EL: unhandled {}", n),
        }
    }

    fn delete_chars(&mut self, n: usize) {
        let cursor = self.cursor_pos();
        let x = cursor.x.min(self.screen().cols - 1);
        let fill = self.erase_cell();
        let abs = self.screen().absolute_y(cursor.y);
        self.screen_mut().line_mut(abs).delete_cells(x, n, &fill);
    }

    fn insert_chars(&mut self, n: usize) {
        let cursor = self.cursor_pos();
        let x = cursor.x.min(self.screen().cols - 1);
        let fill = self.erase_cell();
        let abs = self.screen().absolute_y(cursor.y);
        self.screen_mut().line_mut(abs).insert_cells(x, n, &fill);
    }

    fn erase_chars(&mut self, n: usize) {
        let cursor = self.cursor_pos();
        let cols = self.screen().cols;
        let x = cursor.x.min(cols - 1);
        self.erase_in_row(cursor.y, x, (x + n).min(cols));
    }

    // --- SGR --------------------------------------------------------------

    fn perform_sgr(&mut self, params: &Params) {
        if params.is_empty() {
            self.pen = Attribute::default();
            return;
        }
        let values = params.to_array();
        let mut i = 0;
        while i < values.len() {
            let v = match values[i] {
                PARAM_ABSENT => 0,
                v => v,
            };
            match v {
                0 => self.pen = Attribute::default(),
                1 => {
                    self.pen.set_bold(true);
                }
                2 => {
                    self.pen.set_dim(true);
                }
                3 => {
                    self.pen.set_italic(true);
                }
                4 => {
                    self.pen.set_underline(true);
                }
                5 => {
                    self.pen.set_blink(true);
                }
                7 => {
                    self.pen.set_inverse(true);
                }
                8 => {
                    self.pen.set_invisible(true);
                }
                9 => {
                    self.pen.set_strikethrough(true);
                }
                22 => {
                    self.pen.set_bold(false).set_dim(false);
                }
                23 => {
                    self.pen.set_italic(false);
                }
                24 => {
                    self.pen.set_underline(false);
                }
                25 => {
                    self.pen.set_blink(false);
                }
                27 => {
                    self.pen.set_inverse(false);
                }
                28 => {
                    self.pen.set_invisible(false);
                }
                29 => {
                    self.pen.set_strikethrough(false);
                }
                30..=37 => {
                    self.pen.set_fg_palette((v - 30) as u32);
                }
                38 => i += self.sgr_extended_color(params, i, true),
                39 => {
                    self.pen.set_default_fg();
                }
                40..=47 => {
                    self.pen.set_bg_palette((v - 40) as u32);
                }
                48 => i += self.sgr_extended_color(params, i, false),
                49 => {
                    self.pen.set_default_bg();
                }
                53 => {
                    self.pen.set_overline(true);
                }
                55 => {
                    self.pen.set_overline(false);
                }
                // Underline colour is not stored, but its colour spec
                // must still be consumed so the component values are
                // not misread as independent attribute codes.
                58 => i += self.sgr_color_span(params, i),
                59 => {}
                90..=97 => {
                    self.pen.set_fg_palette((v - 90 + 8) as u32);
                }
                100..=107 => {
                    self.pen.set_bg_palette((v - 100 + 8) as u32);
                }
                n => debug!("SGR: unhandled {}", n),
            }
            i += 1;
        }
    }

    /// SGR 38/48 extended colour, in both the semicolon form
    /// (`38;5;N`, `38;2;R;G;B`) and the colon sub-parameter form
    /// (`38:5:N`, `38:2::R:G:B`).  Returns how many extra semicolon
    /// parameters were consumed.
    fn sgr_extended_color(&mut self, params: &Params, i: usize, is_fg: bool) -> usize {
        let apply_palette = |pen: &mut Attribute, n: u32| {
            if is_fg {
                pen.set_fg_palette(n);
            } else {
                pen.set_bg_palette(n);
            }
        };
        let apply_rgb = |pen: &mut Attribute, r: u8, g: u8, b: u8| {
            if is_fg {
                pen.set_fg_rgb(r, g, b);
            } else {
                pen.set_bg_rgb(r, g, b);
            }
        };

        if params.has_subs(i) {
            let subs: Vec<i32> = params.subs(i).collect();
            match subs.first() {
                Some(5) => {
                    if let Some(&n) = subs.get(1) {
                        apply_palette(&mut self.pen, n.max(0) as u32 & 0xff);
                    }
                }
                Some(2) => {
                    // `38:2::R:G:B` carries an empty colorspace slot
                    let tail: Vec<i32> = subs[1..]
                        .iter()
                        .copied()
                        .filter(|&v| v != PARAM_ABSENT)
                        .collect();
                    if let &[r, g, b] = &tail[tail.len().saturating_sub(3)..] {
                        apply_rgb(&mut self.pen, r as u8, g as u8, b as u8);
                    }
                }
                _ => debug!("SGR: unhandled colon form {:?}", subs),
            }
            return 0;
        }

        let values = params.to_array();
        match values.get(i + 1) {
            Some(&5) => {
                let n = params.get(i + 2, 0).max(0) as u32 & 0xff;
                apply_palette(&mut self.pen, n);
                2
            }
            Some(&2) => {
                let r = params.get(i + 2, 0).max(0) as u8;
                let g = params.get(i + 3, 0).max(0) as u8;
                let b = params.get(i + 4, 0).max(0) as u8;
                apply_rgb(&mut self.pen, r, g, b);
                4
            }
            _ => 0,
        }
    }

    /// How many semicolon parameters a `5;N` / `2;R;G;B` colour spec at
    /// `i` occupies, without applying it.  Colon sub-parameter forms
    /// occupy no extra positions.
    fn sgr_color_span(&self, params: &Params, i: usize) -> usize {
        if params.has_subs(i) {
            return 0;
        }
        match params.to_array().get(i + 1) {
            Some(&5) => 2,
            Some(&2) => 4,
            _ => 0,
        }
    }

    // --- device status ----------------------------------------------------

    fn device_status_report(&mut self, code: i32) {
        match code {
            5 => self.reply("\x1b[0n"),
            6 => {
                let cursor = self.cursor_pos();
                let row = if self.dec_origin_mode {
                    cursor.y - self.screen().scroll_top()
                } else {
                    cursor.y
                };
                let reply = format!("\x1b[{};{}R", row + 1, cursor.x.min(self.screen().cols - 1) + 1);
                self.reply(reply);
            }
            n => debug!("DSR: unhandled {}", n),
        }
    }

    fn device_status_report_dec(&mut self, code: i32) {
        match code {
            6 => {
                let cursor = self.cursor_pos();
                let reply = format!(
                    "\x1b[?{};{}R",
                    cursor.y + 1,
                    cursor.x.min(self.screen().cols - 1) + 1
                );
                self.reply(reply);
            }
            15 => self.reply("\x1b[?13n"),
            25 => self.reply("\x1b[?21n"),
            26 => self.reply("\x1b[?27;1;0;0n"),
            n => debug!("DSR(DEC): unhandled {}", n),
        }
    }

    // --- modes ------------------------------------------------------------

    fn set_ansi_mode(&mut self, params: &Params, enable: bool) {
        for &mode in params.to_array() {
            match mode {
                4 => self.insert = enable,
                20 => self.newline_mode = enable,
                n => debug!("SM/RM: unhandled mode {} = {}", n, enable),
            }
        }
    }

    fn set_dec_private_mode(&mut self, params: &Params, enable: bool) {
        for &mode in params.to_array() {
            match mode {
                1 => self.application_cursor_keys = enable,
                6 => {
                    self.dec_origin_mode = enable;
                    self.cursor_position(0, 0);
                }
                7 => self.dec_auto_wrap = enable,
                9 => self.set_mouse_tracking(MouseTracking::X10, enable),
                12 => self.set_cursor_blink(enable),
                25 => self.cursor_visible = enable,
                45 => self.reverse_wraparound = enable,
                66 => self.application_keypad = enable,
                1000 => self.set_mouse_tracking(MouseTracking::Vt200, enable),
                1002 => self.set_mouse_tracking(MouseTracking::BtnEvent, enable),
                1003 => self.set_mouse_tracking(MouseTracking::AnyEvent, enable),
                1004 => self.focus_tracking = enable,
                1005 => self.set_mouse_encoding(MouseEncoding::Utf8, enable),
                1006 => self.set_mouse_encoding(MouseEncoding::Sgr, enable),
                1015 => self.set_mouse_encoding(MouseEncoding::Urxvt, enable),
                1036 => {
                    self.meta_sends_escape = enable;
                    if enable {
                        self.win32_input = false;
                    }
                }
                1039 => {
                    self.alt_sends_escape = enable;
                    if enable {
                        self.win32_input = false;
                    }
                }
                1047 => {
                    if enable {
                        self.activate_alt_screen(false);
                    } else {
                        self.activate_primary_screen();
                    }
                }
                1048 => {
                    if enable {
                        self.save_cursor();
                    } else {
                        self.restore_cursor();
                    }
                }
                1049 => {
                    if enable {
                        self.save_cursor();
                        self.activate_alt_screen(true);
                    } else {
                        self.activate_primary_screen();
                        self.restore_cursor();
                    }
                }
                2004 => self.bracketed_paste = enable,
                9001 => {
                    self.win32_input = enable;
                    if enable {
                        self.meta_sends_escape = false;
                        self.alt_sends_escape = false;
                    }
                }
                n => debug!("DECSET/DECRST: unhandled mode {} = {}", n, enable),
            }
        }
    }

    fn set_mouse_tracking(&mut self, tracking: MouseTracking, enable: bool) {
        if enable {
            self.mouse_tracking = tracking;
        } else if self.mouse_tracking == tracking {
            self.mouse_tracking = MouseTracking::None;
        }
    }

    fn set_mouse_encoding(&mut self, encoding: MouseEncoding, enable: bool) {
        if enable {
            self.mouse_encoding = encoding;
        } else if self.mouse_encoding == encoding {
            self.mouse_encoding = MouseEncoding::Default;
        }
    }

    fn set_cursor_blink(&mut self, blink: bool) {
        if self.cursor_blink != blink {
            self.cursor_blink = blink;
            let style = self.cursor_style;
            self.listener.cursor_style_changed(style, blink);
        }
    }

    /// DECSCUSR cursor style selection.
    fn set_cursor_style(&mut self, n: i32) {
        let (style, blink) = match n {
            0 | 1 => (CursorStyle::Block, true),
            2 => (CursorStyle::Block, false),
            3 => (CursorStyle::Underline, true),
            4 => (CursorStyle::Underline, false),
            5 => (CursorStyle::Bar, true),
            6 => (CursorStyle::Bar, false),
            n => {
                debug!("DECSCUSR: unhandled {}", n);
                return;
            }
        };
        if (style, blink) != (self.cursor_style, self.cursor_blink) {
            self.cursor_style = style;
            self.cursor_blink = blink;
            self.listener.cursor_style_changed(style, blink);
        }
    }

    // --- window manipulation ----------------------------------------------

    fn allowed(&self, op: WindowOps) -> bool {
        self.options.window_ops.contains(op)
    }

    /// `CSI Ps ; ... t`: each operation is gated by a per-operation
    /// permission flag; disabled operations are dropped silently.
    fn window_manipulation(&mut self, params: &Params) {
        let op = params.get(0, 0);
        match op {
            1 if self.allowed(WindowOps::RESTORE_WIN) => self.listener.window_restored(),
            2 if self.allowed(WindowOps::MINIMIZE_WIN) => self.listener.window_minimized(),
            3 if self.allowed(WindowOps::SET_WIN_POSITION) => {
                let x = params.get(1, 0);
                let y = params.get(2, 0);
                self.listener.window_moved(x, y);
            }
            4 if self.allowed(WindowOps::SET_WIN_SIZE_PIXELS) => {
                let height = params.get(1, 0);
                let width = params.get(2, 0);
                self.listener.window_resized(width, height);
            }
            5 if self.allowed(WindowOps::RAISE_WIN) => self.listener.window_raised(),
            6 if self.allowed(WindowOps::LOWER_WIN) => self.listener.window_lowered(),
            7 if self.allowed(WindowOps::REFRESH_WIN) => self.listener.window_refreshed(),
            8 if self.allowed(WindowOps::SET_WIN_SIZE_CHARS) => {
                let rows = params.get(1, self.screen().rows as i32).max(1) as usize;
                let cols = params.get(2, self.screen().cols as i32).max(1) as usize;
                if let Err(err) = self.resize(cols, rows) {
                    warn!("window resize failed: {}", err);
                }
            }
            9 => match params.get(1, 0) {
                0 if self.allowed(WindowOps::RESTORE_WIN) => self.listener.window_restored(),
                1 | 2 if self.allowed(WindowOps::MAXIMIZE_WIN) => self.listener.window_maximized(),
                _ => {}
            },
            10 if self.allowed(WindowOps::FULLSCREEN_WIN) => self.listener.window_fullscreened(),
            11 if self.allowed(WindowOps::GET_WIN_STATE) => {
                let mut request = WindowInfoRequest::new(WindowInfo::State);
                self.listener.window_info_request(&mut request);
                if request.handled {
                    self.reply(if request.iconified { "\x1b[2t" } else { "\x1b[1t" });
                }
            }
            13 if self.allowed(WindowOps::GET_WIN_POSITION) => {
                let mut request = WindowInfoRequest::new(WindowInfo::Position);
                self.listener.window_info_request(&mut request);
                if request.handled {
                    let reply = format!("\x1b[3;{};{}t", request.x, request.y);
                    self.reply(reply);
                }
            }
            14 if self.allowed(WindowOps::GET_WIN_SIZE_PIXELS) => {
                let mut request = WindowInfoRequest::new(WindowInfo::SizePixels);
                self.listener.window_info_request(&mut request);
                if request.handled {
                    let reply = format!("\x1b[4;{};{}t", request.height, request.width);
                    self.reply(reply);
                }
            }
            15 if self.allowed(WindowOps::GET_SCREEN_SIZE_PIXELS) => {
                let mut request = WindowInfoRequest::new(WindowInfo::ScreenSizePixels);
                self.listener.window_info_request(&mut request);
                if request.handled {
                    let reply = format!("\x1b[5;{};{}t", request.height, request.width);
                    self.reply(reply);
                }
            }
            16 if self.allowed(WindowOps::GET_CELL_SIZE_PIXELS) => {
                let mut request = WindowInfoRequest::new(WindowInfo::CellSizePixels);
                self.listener.window_info_request(&mut request);
                if request.handled {
                    let reply = format!("\x1b[6;{};{}t", request.height, request.width);
                    self.reply(reply);
                }
            }
            18 if self.allowed(WindowOps::GET_WIN_SIZE_CHARS) => {
                let reply = format!("\x1b[8;{};{}t", self.screen().rows, self.screen().cols);
                self.reply(reply);
            }
            19 if self.allowed(WindowOps::GET_SCREEN_SIZE_PIXELS) => {
                let reply = format!("\x1b[9;{};{}t", self.screen().rows, self.screen().cols);
                self.reply(reply);
            }
            20 if self.allowed(WindowOps::GET_ICON_TITLE) => {
                let mut request = WindowInfoRequest::new(WindowInfo::IconTitle);
                self.listener.window_info_request(&mut request);
                let title = if request.handled {
                    request.title
                } else {
                    self.icon_title.clone()
                };
                if let Some(title) = title {
                    let reply = format!("\x1b]L{}\x07", title);
                    self.reply(reply);
                }
            }
            21 if self.allowed(WindowOps::GET_WIN_TITLE) => {
                let reply = format!("\x1b]l{}\x07", self.title);
                self.reply(reply);
            }
            _ => debug!("window op {} dropped", op),
        }
    }
}
