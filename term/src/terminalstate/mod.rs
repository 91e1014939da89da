//! The terminal state machine: interprets the parsed input stream and
//! mutates the screen model.
use crate::attr::Attribute;
use crate::cell::Cell;
use crate::config::TerminalOptions;
use crate::events::EventListener;
use crate::input::{CursorStyle, MouseEncoding, MouseTracking};
use crate::keyboard::KeyEncodeModes;
use crate::line::LineAttr;
use crate::screen::{SavedCursor, Screen};
use crate::width::{UnicodeWidth, WidthResolver};
use log::debug;

mod csi;
mod performer;
pub(crate) use performer::Performer;

/// A device control string being accumulated; kept on the state so a
/// DCS split across `write` calls survives the chunk boundary.
#[derive(Debug, Clone)]
pub(crate) struct PendingDcs {
    pub collected: Vec<u8>,
    pub control: u8,
    pub data: Vec<u8>,
}

/// Support for US ASCII, UK and DEC Special Graphics in G0/G1.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CharSet {
    Ascii,
    Uk,
    DecLineDrawing,
}

/// The column positions that HT/CHT/CBT jump between.  Stops default to
/// every `tab_width` columns and can be replaced via HTS/TBC.
#[derive(Debug, Clone)]
pub struct TabStop {
    tabs: Vec<bool>,
    tab_width: usize,
}

impl TabStop {
    fn new(cols: usize, tab_width: usize) -> TabStop {
        let mut tabs = vec![false; cols];
        for (idx, stop) in tabs.iter_mut().enumerate() {
            *stop = (idx % tab_width) == 0;
        }
        TabStop { tabs, tab_width }
    }

    fn set_tab_stop(&mut self, col: usize) {
        if col < self.tabs.len() {
            self.tabs[col] = true;
        }
    }

    fn clear_tab_stop(&mut self, col: usize) {
        if col < self.tabs.len() {
            self.tabs[col] = false;
        }
    }

    fn clear_all(&mut self) {
        for stop in &mut self.tabs {
            *stop = false;
        }
    }

    fn find_next_tab_stop(&self, col: usize) -> Option<usize> {
        for (idx, &stop) in self.tabs.iter().enumerate().skip(col + 1) {
            if stop {
                return Some(idx);
            }
        }
        None
    }

    fn find_prev_tab_stop(&self, col: usize) -> Option<usize> {
        for (idx, &stop) in self.tabs.iter().enumerate().take(col).rev() {
            if stop {
                return Some(idx);
            }
        }
        None
    }

    /// Resizing keeps existing stops and extends the default grid over
    /// any new columns.
    fn resize(&mut self, cols: usize) {
        let old = self.tabs.len();
        self.tabs.resize(cols, false);
        for idx in old..cols {
            self.tabs[idx] = (idx % self.tab_width) == 0;
        }
    }
}

/// The model and modes of the terminal.  One instance drives both the
/// primary screen (with scrollback) and the alternate screen.
pub struct TerminalState {
    pub(crate) options: TerminalOptions,

    screen: Screen,
    alt_screen: Screen,
    alt_screen_is_active: bool,

    /// The attributes in effect for the next printed cell.
    pub(crate) pen: Attribute,

    /// If true, printing a character first shifts the tail of the line
    /// to the right.
    pub(crate) insert: bool,

    /// https://vt100.net/docs/vt510-rm/DECAWM.html
    pub(crate) dec_auto_wrap: bool,

    /// Reverse wraparound: BS at the left edge moves to the end of the
    /// prior row.
    pub(crate) reverse_wraparound: bool,

    /// https://vt100.net/docs/vt510-rm/DECOM.html
    /// When set, the cursor is constrained to the scroll region and
    /// row addressing is relative to its top.
    pub(crate) dec_origin_mode: bool,

    pub(crate) application_cursor_keys: bool,
    pub(crate) application_keypad: bool,
    pub(crate) bracketed_paste: bool,
    pub(crate) cursor_visible: bool,

    /// LNM: LF implies CR.
    pub(crate) newline_mode: bool,

    pub(crate) focus_tracking: bool,
    pub(crate) mouse_tracking: MouseTracking,
    pub(crate) mouse_encoding: MouseEncoding,

    pub(crate) meta_sends_escape: bool,
    pub(crate) alt_sends_escape: bool,
    pub(crate) win32_input: bool,

    pub(crate) cursor_style: CursorStyle,
    pub(crate) cursor_blink: bool,

    pub(crate) g0_charset: CharSet,
    pub(crate) g1_charset: CharSet,
    /// SO selected G1; SI selects G0.
    pub(crate) shift_out: bool,

    pub(crate) tabs: TabStop,

    pub(crate) title: String,
    pub(crate) icon_title: Option<String>,
    pub(crate) current_dir: Option<String>,
    pub(crate) current_hyperlink: Option<(String, Option<String>)>,

    pub(crate) pending_dcs: Option<PendingDcs>,

    pub(crate) listener: Box<dyn EventListener>,
    pub(crate) width: Box<dyn WidthResolver>,
}

impl std::fmt::Debug for TerminalState {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("TerminalState")
            .field("cols", &self.screen().cols)
            .field("rows", &self.screen().rows)
            .field("alt_active", &self.alt_screen_is_active)
            .field("cursor", &self.cursor_pos())
            .finish()
    }
}

impl TerminalState {
    pub fn new(options: TerminalOptions, listener: Box<dyn EventListener>) -> TerminalState {
        let screen = Screen::new(options.cols, options.rows, options.scrollback);
        let alt_screen = Screen::new(options.cols, options.rows, 0);
        let tabs = TabStop::new(options.cols, options.tab_stop_width);
        let dec_auto_wrap = options.wraparound;
        let newline_mode = options.convert_eol;
        let cursor_style = options.cursor_style;
        let cursor_blink = options.cursor_blink;

        TerminalState {
            options,
            screen,
            alt_screen,
            alt_screen_is_active: false,
            pen: Attribute::default(),
            insert: false,
            dec_auto_wrap,
            reverse_wraparound: false,
            dec_origin_mode: false,
            application_cursor_keys: false,
            application_keypad: false,
            bracketed_paste: false,
            cursor_visible: true,
            newline_mode,
            focus_tracking: false,
            mouse_tracking: MouseTracking::None,
            mouse_encoding: MouseEncoding::Default,
            meta_sends_escape: false,
            alt_sends_escape: false,
            win32_input: false,
            cursor_style,
            cursor_blink,
            g0_charset: CharSet::Ascii,
            g1_charset: CharSet::Ascii,
            shift_out: false,
            tabs,
            title: String::new(),
            icon_title: None,
            current_dir: None,
            current_hyperlink: None,
            pending_dcs: None,
            listener,
            width: Box::new(UnicodeWidth),
        }
    }

    /// Replace the width table; tests use a fixed table.
    pub fn set_width_resolver(&mut self, width: Box<dyn WidthResolver>) {
        self.width = width;
    }

    pub fn screen(&self) -> &Screen {
        if self.alt_screen_is_active {
            &self.alt_screen
        } else {
            &self.screen
        }
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        if self.alt_screen_is_active {
            &mut self.alt_screen
        } else {
            &mut self.screen
        }
    }

    pub fn primary_screen(&self) -> &Screen {
        &self.screen
    }

    pub fn alt_screen(&self) -> &Screen {
        &self.alt_screen
    }

    pub fn is_alt_screen_active(&self) -> bool {
        self.alt_screen_is_active
    }

    pub fn cursor_pos(&self) -> crate::CursorPosition {
        self.screen().cursor()
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn cursor_style(&self) -> (CursorStyle, bool) {
        (self.cursor_style, self.cursor_blink)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_title(&self) -> Option<&str> {
        self.icon_title.as_deref()
    }

    pub fn current_dir(&self) -> Option<&str> {
        self.current_dir.as_deref()
    }

    pub fn current_hyperlink(&self) -> Option<(&str, Option<&str>)> {
        self.current_hyperlink
            .as_ref()
            .map(|(url, id)| (url.as_str(), id.as_deref()))
    }

    pub fn bracketed_paste(&self) -> bool {
        self.bracketed_paste
    }

    pub fn mouse_tracking(&self) -> MouseTracking {
        self.mouse_tracking
    }

    pub fn mouse_encoding(&self) -> MouseEncoding {
        self.mouse_encoding
    }

    pub fn focus_tracking(&self) -> bool {
        self.focus_tracking
    }

    pub(crate) fn key_encode_modes(&self) -> KeyEncodeModes {
        KeyEncodeModes {
            application_cursor_keys: self.application_cursor_keys,
            application_keypad: self.application_keypad,
            newline_mode: self.newline_mode,
            meta_sends_escape: self.meta_sends_escape,
            alt_sends_escape: self.alt_sends_escape,
            win32_input: self.win32_input,
        }
    }

    /// Send reply bytes to the application.
    pub(crate) fn reply<S: AsRef<str>>(&mut self, data: S) {
        self.listener.data(data.as_ref());
    }

    /// The attribute applied to cells vacated by erase and delete
    /// operations: default styling over the current background (BCE).
    pub(crate) fn erase_attr(&self) -> Attribute {
        let mut attr = Attribute::default();
        attr.set_background(self.pen.bg_mode(), self.pen.bg_value());
        attr
    }

    pub(crate) fn erase_cell(&self) -> Cell {
        Cell::space(self.erase_attr())
    }

    // --- cursor movement -------------------------------------------------

    /// The row limits for vertical movement under origin mode.
    fn vertical_bounds(&self) -> (usize, usize) {
        if self.dec_origin_mode {
            (self.screen().scroll_top(), self.screen().scroll_bottom())
        } else {
            (0, self.screen().rows - 1)
        }
    }

    pub(crate) fn set_cursor_clamped(&mut self, x: usize, y: usize) {
        self.screen_mut().set_cursor(x, y);
        self.listener.cursor_moved();
    }

    pub(crate) fn cursor_up(&mut self, n: usize) {
        let (top, _) = self.vertical_bounds();
        let cursor = self.cursor_pos();
        let y = cursor.y.saturating_sub(n).max(top);
        self.set_cursor_clamped(cursor.x.min(self.screen().cols - 1), y);
    }

    pub(crate) fn cursor_down(&mut self, n: usize) {
        let (_, bottom) = self.vertical_bounds();
        let cursor = self.cursor_pos();
        let y = (cursor.y + n).min(bottom);
        self.set_cursor_clamped(cursor.x.min(self.screen().cols - 1), y);
    }

    pub(crate) fn cursor_forward(&mut self, n: usize) {
        let cursor = self.cursor_pos();
        let x = (cursor.x + n).min(self.screen().cols - 1);
        self.set_cursor_clamped(x, cursor.y);
    }

    pub(crate) fn cursor_backward(&mut self, n: usize) {
        let cursor = self.cursor_pos();
        // leave the pending-wrap state before moving
        let x = cursor.x.min(self.screen().cols - 1).saturating_sub(n);
        self.set_cursor_clamped(x, cursor.y);
    }

    /// CUP/HVP; row and col are zero-based here.  In origin mode the
    /// row is relative to the scroll region top.
    pub(crate) fn cursor_position(&mut self, row: usize, col: usize) {
        let y = if self.dec_origin_mode {
            (self.screen().scroll_top() + row).min(self.screen().scroll_bottom())
        } else {
            row.min(self.screen().rows - 1)
        };
        self.set_cursor_clamped(col.min(self.screen().cols - 1), y);
    }

    pub(crate) fn line_position(&mut self, row: usize) {
        let x = self.cursor_pos().x.min(self.screen().cols - 1);
        let y = if self.dec_origin_mode {
            (self.screen().scroll_top() + row).min(self.screen().scroll_bottom())
        } else {
            row.min(self.screen().rows - 1)
        };
        self.set_cursor_clamped(x, y);
    }

    // --- scrolling and line feeds ----------------------------------------

    pub(crate) fn scroll_up(&mut self, n: usize, wrapped: bool) {
        let blank_attr = self.erase_attr();
        self.screen_mut().scroll_up(n, wrapped, blank_attr);
        self.listener.scrolled();
    }

    pub(crate) fn scroll_down(&mut self, n: usize) {
        let blank_attr = self.erase_attr();
        self.screen_mut().scroll_down(n, blank_attr);
        self.listener.scrolled();
    }

    pub(crate) fn line_feed(&mut self) {
        let cursor = self.cursor_pos();
        // a line feed closes the pending-wrap state
        let mut x = cursor.x.min(self.screen().cols - 1);
        if cursor.y == self.screen().scroll_bottom() {
            self.scroll_up(1, false);
        } else {
            let y = (cursor.y + 1).min(self.screen().rows - 1);
            self.screen_mut().move_cursor(x, y);
        }
        if self.newline_mode {
            x = 0;
        }
        let y = self.cursor_pos().y;
        self.screen_mut().move_cursor(x, y);
        self.listener.line_fed();
    }

    /// RI: move up; at the top of the scroll region the content scrolls
    /// down instead.
    pub(crate) fn reverse_index(&mut self) {
        let cursor = self.cursor_pos();
        if cursor.y == self.screen().scroll_top() {
            self.scroll_down(1);
        } else {
            let x = cursor.x.min(self.screen().cols - 1);
            self.screen_mut().move_cursor(x, cursor.y - 1);
        }
    }

    pub(crate) fn carriage_return(&mut self) {
        let y = self.cursor_pos().y;
        self.screen_mut().move_cursor(0, y);
    }

    pub(crate) fn backspace(&mut self) {
        let cursor = self.cursor_pos();
        let cols = self.screen().cols;
        let x = cursor.x.min(cols - 1);
        if x == 0 {
            if self.reverse_wraparound && self.dec_auto_wrap && cursor.y > self.screen().scroll_top()
            {
                self.screen_mut().move_cursor(cols - 1, cursor.y - 1);
            }
        } else {
            self.screen_mut().move_cursor(x - 1, cursor.y);
        }
    }

    pub(crate) fn horizontal_tab(&mut self) {
        let cursor = self.cursor_pos();
        let cols = self.screen().cols;
        let x = match self.tabs.find_next_tab_stop(cursor.x) {
            Some(x) => x,
            None => cols - 1,
        };
        self.screen_mut().move_cursor(x.min(cols - 1), cursor.y);
    }

    pub(crate) fn backward_tab(&mut self) {
        let cursor = self.cursor_pos();
        let x = self.tabs.find_prev_tab_stop(cursor.x).unwrap_or(0);
        self.screen_mut().move_cursor(x, cursor.y);
    }

    pub(crate) fn set_tab_stop_here(&mut self) {
        let x = self.cursor_pos().x.min(self.screen().cols - 1);
        self.tabs.set_tab_stop(x);
    }

    // --- erase and edit ---------------------------------------------------

    /// Fill the given viewport rows `[start, end)` with blank cells.
    pub(crate) fn erase_rows(&mut self, start: usize, end: usize) {
        let blank = self.erase_cell();
        let screen = self.screen_mut();
        let cols = screen.cols;
        for y in start..end.min(screen.rows) {
            let line = screen.active_line_mut(y);
            line.fill(&blank, 0, cols);
            line.set_wrapped(false);
            line.set_line_attr(LineAttr::Normal);
        }
    }

    pub(crate) fn erase_in_row(&mut self, y: usize, start: usize, end: usize) {
        let blank = self.erase_cell();
        let screen = self.screen_mut();
        let line = screen.active_line_mut(y);
        line.fill(&blank, start, end);
    }

    /// IL: insert blank lines at the cursor, pushing lines inside the
    /// scroll region down; lines pushed past the bottom are lost.
    pub(crate) fn insert_lines(&mut self, n: usize) {
        let cursor_y = self.cursor_pos().y;
        let (top, bottom) = (self.screen().scroll_top(), self.screen().scroll_bottom());
        if cursor_y < top || cursor_y > bottom {
            return;
        }
        let blank_attr = self.erase_attr();
        let n = n.min(bottom - cursor_y + 1);
        let screen = self.screen_mut();
        let abs_cursor = screen.absolute_y(cursor_y);
        let abs_bottom = screen.absolute_y(bottom);
        for _ in 0..n {
            screen.lines_splice_delete(abs_bottom);
            let blank = screen.get_blank_line(blank_attr, false);
            screen.lines_splice_insert(abs_cursor, blank);
        }
        self.carriage_return();
    }

    /// DL: delete lines at the cursor, pulling lines inside the scroll
    /// region up and appending blanks at the bottom.
    pub(crate) fn delete_lines(&mut self, n: usize) {
        let cursor_y = self.cursor_pos().y;
        let (top, bottom) = (self.screen().scroll_top(), self.screen().scroll_bottom());
        if cursor_y < top || cursor_y > bottom {
            return;
        }
        let blank_attr = self.erase_attr();
        let n = n.min(bottom - cursor_y + 1);
        let screen = self.screen_mut();
        let abs_cursor = screen.absolute_y(cursor_y);
        let abs_bottom = screen.absolute_y(bottom);
        for _ in 0..n {
            screen.lines_splice_delete(abs_cursor);
            let blank = screen.get_blank_line(blank_attr, false);
            screen.lines_splice_insert(abs_bottom, blank);
        }
        self.carriage_return();
    }

    // --- save/restore and buffer switching --------------------------------

    pub(crate) fn save_cursor(&mut self) {
        let cursor = self.cursor_pos();
        let saved = SavedCursor {
            x: cursor.x,
            y: cursor.y,
            attr: self.pen,
            charset: self.shift_out as usize,
        };
        debug!("saving cursor {:?}", saved);
        self.screen_mut().save_cursor(saved);
    }

    pub(crate) fn restore_cursor(&mut self) {
        let saved = self.screen_mut().take_saved_cursor().unwrap_or_default();
        debug!("restoring cursor {:?}", saved);
        self.pen = saved.attr;
        self.shift_out = saved.charset != 0;
        self.set_cursor_clamped(saved.x, saved.y);
    }

    /// Switch to the alternate screen; idempotent.  `clear` wipes the
    /// alternate screen contents (mode 1047/1049 flavor).
    pub(crate) fn activate_alt_screen(&mut self, clear: bool) {
        if self.alt_screen_is_active {
            return;
        }
        let cursor = self.screen.cursor();
        self.alt_screen_is_active = true;
        self.alt_screen.move_cursor(cursor.x, cursor.y);
        if clear {
            self.alt_screen.clear_all();
            self.alt_screen.move_cursor(cursor.x, cursor.y);
        }
        self.listener.buffer_changed(true);
    }

    /// Switch back to the primary screen; idempotent.
    pub(crate) fn activate_primary_screen(&mut self) {
        if !self.alt_screen_is_active {
            return;
        }
        let cursor = self.alt_screen.cursor();
        self.alt_screen_is_active = false;
        self.screen.move_cursor(
            cursor.x.min(self.screen.cols),
            cursor.y.min(self.screen.rows - 1),
        );
        self.listener.buffer_changed(false);
    }

    // --- global state changes ---------------------------------------------

    pub fn resize(&mut self, cols: usize, rows: usize) -> anyhow::Result<()> {
        anyhow::ensure!(cols > 0 && rows > 0, "resize to {}x{} is invalid", cols, rows);
        if cols == self.screen().cols && rows == self.screen().rows {
            return Ok(());
        }
        debug!("resize to {}x{}", cols, rows);
        self.screen.resize(cols, rows);
        self.alt_screen.resize(cols, rows);
        self.tabs.resize(cols);
        self.options.cols = cols;
        self.options.rows = rows;
        self.listener.resized(cols, rows);
        Ok(())
    }

    /// DECSTR: reset modes and attributes without touching the screen
    /// contents.
    pub(crate) fn soft_reset(&mut self) {
        self.pen = Attribute::default();
        self.insert = false;
        self.dec_origin_mode = false;
        self.dec_auto_wrap = true;
        self.application_cursor_keys = false;
        self.application_keypad = false;
        self.reverse_wraparound = false;
        self.cursor_visible = true;
        self.screen.reset_scroll_region();
        self.alt_screen.reset_scroll_region();
        self.screen.take_saved_cursor();
        self.alt_screen.take_saved_cursor();
        self.g0_charset = CharSet::Ascii;
        self.g1_charset = CharSet::Ascii;
        self.shift_out = false;
    }

    /// RIS and `Terminal::reset`: back to the power-on state.
    pub fn full_reset(&mut self) {
        self.pen = Attribute::default();
        self.insert = false;
        self.dec_auto_wrap = true;
        self.reverse_wraparound = false;
        self.dec_origin_mode = false;
        self.application_cursor_keys = false;
        self.application_keypad = false;
        self.bracketed_paste = false;
        self.cursor_visible = true;
        self.newline_mode = self.options.convert_eol;
        self.focus_tracking = false;
        self.mouse_tracking = MouseTracking::None;
        self.mouse_encoding = MouseEncoding::Default;
        self.meta_sends_escape = false;
        self.alt_sends_escape = false;
        self.win32_input = false;
        self.cursor_style = self.options.cursor_style;
        self.cursor_blink = self.options.cursor_blink;
        self.g0_charset = CharSet::Ascii;
        self.g1_charset = CharSet::Ascii;
        self.shift_out = false;
        self.tabs = TabStop::new(self.screen.cols, self.options.tab_stop_width);
        self.current_hyperlink = None;

        self.alt_screen_is_active = false;
        self.screen.clear_all();
        self.screen.take_saved_cursor();
        self.alt_screen.clear_all();
        self.alt_screen.take_saved_cursor();
    }

    /// Scroll the user's view by `delta` rows; negative scrolls back
    /// into history.
    pub fn scroll_viewport(&mut self, delta: isize) {
        self.screen_mut().scroll_disp(delta);
        self.listener.scrolled();
    }

    pub fn scroll_viewport_to_top(&mut self) {
        self.screen_mut().scroll_to_top();
        self.listener.scrolled();
    }

    pub fn scroll_viewport_to_bottom(&mut self) {
        self.screen_mut().scroll_to_bottom();
        self.listener.scrolled();
    }

    /// Wipe the visible area of the active screen and home the cursor;
    /// scrollback is left alone.
    pub fn clear_visible(&mut self) {
        let rows = self.screen().rows;
        self.erase_rows(0, rows);
        self.screen_mut().move_cursor(0, 0);
    }
}
