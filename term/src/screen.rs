//! Holds the model of a screen.  This can either be the primary screen,
//! which includes lines of scrollback text, or the alternate screen,
//! which holds no scrollback.  One instance of `Screen` exists for each.
use crate::attr::Attribute;
use crate::cell::Cell;
use crate::line::Line;
use crate::ring::CircularBuffer;
use crate::CursorPosition;
use log::debug;

/// Cursor state preserved by DECSC and restored by DECRC.
#[derive(Debug, Copy, Clone, Default)]
pub struct SavedCursor {
    pub x: usize,
    pub y: usize,
    pub attr: Attribute,
    /// Active charset slot (0 = G0, 1 = G1).
    pub charset: usize,
}

/// A grid of lines with scrollback.
///
/// The line ring holds `rows + scrollback` lines.  `y_base` is the
/// absolute row where the active area (the `rows`-sized region the
/// cursor lives in) starts; `y_disp` is the absolute row the user is
/// currently viewing, which trails `y_base` while they are scrolled
/// back and equals it when they are at the bottom.
#[derive(Debug, Clone)]
pub struct Screen {
    lines: CircularBuffer<Line>,

    pub cols: usize,
    pub rows: usize,

    /// Cursor position, viewport-relative.  `x` may transiently equal
    /// `cols` to mark the pending-wrap state.
    cursor: CursorPosition,

    y_base: usize,
    y_disp: usize,

    /// Inclusive scroll region, viewport-relative.
    scroll_top: usize,
    scroll_bottom: usize,

    saved_cursor: Option<SavedCursor>,

    scrollback: usize,
}

impl Screen {
    /// Create a new screen with the requested dimensions.  The
    /// alternate screen passes `scrollback == 0`.
    pub fn new(cols: usize, rows: usize, scrollback: usize) -> Screen {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let mut lines = CircularBuffer::new(rows + scrollback);
        for _ in 0..rows {
            lines.push(Line::with_width(cols, Attribute::default()));
        }
        Screen {
            lines,
            cols,
            rows,
            cursor: CursorPosition::default(),
            y_base: 0,
            y_disp: 0,
            scroll_top: 0,
            scroll_bottom: rows - 1,
            saved_cursor: None,
            scrollback,
        }
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub fn y_base(&self) -> usize {
        self.y_base
    }

    pub fn y_disp(&self) -> usize {
        self.y_disp
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn scroll_bottom(&self) -> usize {
        self.scroll_bottom
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn saved_cursor(&self) -> Option<SavedCursor> {
        self.saved_cursor
    }

    pub fn save_cursor(&mut self, saved: SavedCursor) {
        self.saved_cursor = Some(saved);
    }

    pub fn take_saved_cursor(&mut self) -> Option<SavedCursor> {
        self.saved_cursor.take()
    }

    /// The line at absolute row `y`, if it exists.
    pub fn get_line(&self, y: usize) -> Option<&Line> {
        if y < self.lines.len() {
            Some(self.lines.get(y))
        } else {
            None
        }
    }

    /// Mutable access to the line at absolute row `y`.  Out of range is
    /// an internal logic error.
    pub fn line_mut(&mut self, y: usize) -> &mut Line {
        self.lines.get_mut(y)
    }

    /// The line backing viewport row `y` of the active area.
    pub fn active_line(&self, y: usize) -> &Line {
        self.lines.get(self.y_base + y)
    }

    pub fn active_line_mut(&mut self, y: usize) -> &mut Line {
        self.lines.get_mut(self.y_base + y)
    }

    /// Translate a viewport-relative row to an absolute row.
    #[inline]
    pub fn absolute_y(&self, y_viewport: usize) -> usize {
        self.y_base + y_viewport
    }

    /// A fresh blank line sized for this screen.
    pub fn get_blank_line(&self, attr: Attribute, wrapped: bool) -> Line {
        let mut line = Line::with_width(self.cols, attr);
        line.set_wrapped(wrapped);
        line
    }

    /// Position the cursor, clamped to the grid.
    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cursor.x = x.min(self.cols.saturating_sub(1));
        self.cursor.y = y.min(self.rows.saturating_sub(1));
    }

    /// Position the cursor without clamping; used to park `x` at
    /// `cols` for the pending-wrap state.
    pub fn move_cursor(&mut self, x: usize, y: usize) {
        self.cursor.x = x;
        self.cursor.y = y;
    }

    /// Scroll the content within the scroll region up by `num_rows`.
    ///
    /// When the region starts at the top of the viewport the scrolled
    /// line is preserved: either the ring has room and the active area
    /// slides down (`y_base` grows), or the ring is full and the oldest
    /// scrollback line rotates out to back the new bottom line.  For an
    /// inner region the rotation stays local to the region.
    pub fn scroll_up(&mut self, num_rows: usize, wrapped: bool, blank_attr: Attribute) {
        debug!(
            "scroll_up rows={} region={}..={} y_base={}",
            num_rows, self.scroll_top, self.scroll_bottom, self.y_base
        );
        for _ in 0..num_rows {
            self.scroll_up_one(wrapped, blank_attr);
        }
    }

    fn scroll_up_one(&mut self, wrapped: bool, blank_attr: Attribute) {
        let bottom_row = self.y_base + self.scroll_bottom;

        if self.scroll_top == 0 {
            let will_trim = self.lines.is_full();
            let at_bottom = self.y_disp == self.y_base;

            if bottom_row == self.lines.len() - 1 {
                match self.lines.recycle() {
                    Some(mut line) => {
                        line.reset(self.cols, blank_attr);
                        line.set_wrapped(wrapped);
                        self.lines.push(line);
                    }
                    None => {
                        self.lines.push(self.get_blank_line(blank_attr, wrapped));
                    }
                }
            } else {
                // The scroll region bottom sits above the end of the
                // buffer; open a slot just below it instead of growing
                // at the tail.
                let blank = self.get_blank_line(blank_attr, wrapped);
                self.lines.splice(bottom_row + 1, 0, vec![blank]);
            }

            if !will_trim {
                self.y_base += 1;
                if at_bottom {
                    self.y_disp = self.y_base;
                }
            } else if !at_bottom {
                // The buffer rotated underneath a scrolled-back viewer;
                // hold their view steady on the same content.
                self.y_disp = self.y_disp.saturating_sub(1);
            }
        } else {
            let top_row = self.y_base + self.scroll_top;
            let blank = self.get_blank_line(blank_attr, wrapped);
            self.lines.splice(top_row, 1, vec![]);
            self.lines.splice(bottom_row, 0, vec![blank]);
        }
    }

    /// Scroll the content within the scroll region down by `num_rows`:
    /// the line at the region bottom is dropped and a blank line opens
    /// at the region top.
    pub fn scroll_down(&mut self, num_rows: usize, blank_attr: Attribute) {
        debug!(
            "scroll_down rows={} region={}..={}",
            num_rows, self.scroll_top, self.scroll_bottom
        );
        let top_row = self.y_base + self.scroll_top;
        let bottom_row = self.y_base + self.scroll_bottom;
        for _ in 0..num_rows {
            self.lines.splice(bottom_row, 1, vec![]);
            let blank = self.get_blank_line(blank_attr, false);
            self.lines.splice(top_row, 0, vec![blank]);
        }
    }

    /// Move the user's view by `delta` rows (negative scrolls back).
    pub fn scroll_disp(&mut self, delta: isize) {
        let disp = self.y_disp as isize + delta;
        self.y_disp = disp.max(0).min(self.y_base as isize) as usize;
    }

    pub fn scroll_to_top(&mut self) {
        self.y_disp = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.y_disp = self.y_base;
    }

    pub fn is_at_bottom(&self) -> bool {
        self.y_disp == self.y_base
    }

    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let top = top.min(self.rows - 1);
        let bottom = bottom.max(top).min(self.rows - 1);
        self.scroll_top = top;
        self.scroll_bottom = bottom;
    }

    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
    }

    /// Remove the line at absolute row `y`; the tail shifts up.
    pub(crate) fn lines_splice_delete(&mut self, y: usize) {
        self.lines.splice(y, 1, vec![]);
    }

    /// Insert `line` at absolute row `y`; the tail shifts down.
    pub(crate) fn lines_splice_insert(&mut self, y: usize, line: Line) {
        self.lines.splice(y, 0, vec![line]);
    }

    /// Drop all scrollback content (ED 3).
    pub fn erase_scrollback(&mut self) {
        self.lines.trim_start(self.y_base);
        self.y_base = 0;
        self.y_disp = 0;
    }

    /// Resize the grid.  Scrollback capacity is preserved, every line
    /// is resized to the new width, and the viewport bookkeeping is
    /// clamped back into range.
    pub fn resize(&mut self, new_cols: usize, new_rows: usize) {
        let new_cols = new_cols.max(1);
        let new_rows = new_rows.max(1);
        let old_rows = self.rows;
        let was_at_bottom = self.y_disp == self.y_base;

        let cursor_abs = self.y_base + self.cursor.y;

        // Prune blank rows below the cursor first so that shrinking the
        // window does not manufacture scrollback out of an empty screen.
        while self.lines.len() > cursor_abs + 1 {
            if self.lines.get(self.lines.len() - 1).is_whitespace() {
                self.lines.pop();
            } else {
                break;
            }
        }

        // capacity tracks the viewport height; scrollback reach is kept
        let new_max = new_rows + self.scrollback;
        self.lines.resize(new_max);

        if new_cols != self.cols {
            let fill = Cell::space(Attribute::default());
            for i in 0..self.lines.len() {
                self.lines.get_mut(i).resize(new_cols, &fill);
            }
        }

        while self.lines.len() < new_rows {
            self.lines
                .push(Line::with_width(new_cols, Attribute::default()));
        }

        // the active area is anchored to the bottom of the buffer
        self.y_base = self.lines.len() - new_rows;
        self.y_disp = if was_at_bottom {
            self.y_base
        } else {
            self.y_disp.min(self.y_base)
        };

        let cursor_y = cursor_abs
            .saturating_sub(self.y_base)
            .min(new_rows - 1);
        self.cursor.y = cursor_y;
        self.cursor.x = self.cursor.x.min(new_cols.saturating_sub(1));

        if self.scroll_bottom == old_rows - 1 {
            self.scroll_bottom = new_rows - 1;
        } else {
            self.scroll_bottom = self.scroll_bottom.min(new_rows - 1);
        }
        self.scroll_top = self.scroll_top.min(self.scroll_bottom);

        self.cols = new_cols;
        self.rows = new_rows;
    }

    /// Reset contents to a blank grid, dropping scrollback; used by RIS
    /// and by the 1049 alternate-screen clear.
    pub fn clear_all(&mut self) {
        let cols = self.cols;
        let rows = self.rows;
        self.lines.clear();
        for _ in 0..rows {
            self.lines.push(Line::with_width(cols, Attribute::default()));
        }
        self.y_base = 0;
        self.y_disp = 0;
        self.cursor = CursorPosition::default();
        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
    }

    /// Copies of the active-area lines; test and renderer convenience.
    pub fn visible_lines(&self) -> Vec<Line> {
        (0..self.rows)
            .map(|y| self.lines.get(self.y_base + y).clone())
            .collect()
    }

    /// The active-area rows as trimmed strings.
    pub fn visible_text(&self) -> Vec<String> {
        (0..self.rows)
            .map(|y| {
                self.lines
                    .get(self.y_base + y)
                    .translate_to_string(false, 0, self.cols)
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn screen_with_numbered_lines(cols: usize, rows: usize, scrollback: usize) -> Screen {
        Screen::new(cols, rows, scrollback)
    }

    fn label(screen: &mut Screen, y: usize, c: char) {
        let cols = screen.cols;
        let line = screen.active_line_mut(y);
        for x in 0..cols {
            line.set(x, Cell::new(c, 1, Attribute::default()));
        }
    }

    #[test]
    fn scroll_up_grows_scrollback() {
        let mut screen = screen_with_numbered_lines(4, 3, 10);
        label(&mut screen, 0, 'a');
        screen.scroll_up(1, false, Attribute::default());
        assert_eq!(screen.y_base(), 1);
        assert_eq!(screen.y_disp(), 1);
        assert_eq!(screen.total_lines(), 4);
        // the labelled line is now in scrollback
        assert_eq!(screen.get_line(0).unwrap().as_str(), "aaaa");
    }

    #[test]
    fn scroll_up_when_full_recycles() {
        let mut screen = screen_with_numbered_lines(4, 3, 1);
        screen.scroll_up(1, false, Attribute::default());
        assert_eq!(screen.y_base(), 1);
        // ring is now full (3 rows + 1 scrollback)
        screen.scroll_up(1, false, Attribute::default());
        assert_eq!(screen.y_base(), 1);
        assert_eq!(screen.total_lines(), 4);
    }

    #[test]
    fn scrolled_back_view_is_preserved() {
        let mut screen = screen_with_numbered_lines(4, 3, 10);
        label(&mut screen, 0, 'x');
        screen.scroll_up(1, false, Attribute::default());
        screen.scroll_disp(-1);
        assert_eq!(screen.y_disp(), 0);
        screen.scroll_up(1, false, Attribute::default());
        // user stays anchored while y_base advances
        assert_eq!(screen.y_disp(), 0);
        assert_eq!(screen.y_base(), 2);
        screen.scroll_to_bottom();
        assert_eq!(screen.y_disp(), 2);
    }

    #[test]
    fn inner_region_scroll_rotates_locally() {
        let mut screen = screen_with_numbered_lines(2, 4, 10);
        for (y, c) in ['a', 'b', 'c', 'd'].iter().enumerate() {
            label(&mut screen, y, *c);
        }
        screen.set_scroll_region(1, 2);
        screen.scroll_up(1, false, Attribute::default());
        let text = screen.visible_text();
        assert_eq!(text, vec!["aa", "cc", "  ", "dd"]);
        assert_eq!(screen.y_base(), 0);
    }

    #[test]
    fn scroll_down_opens_blank_at_top() {
        let mut screen = screen_with_numbered_lines(2, 4, 10);
        for (y, c) in ['a', 'b', 'c', 'd'].iter().enumerate() {
            label(&mut screen, y, *c);
        }
        screen.set_scroll_region(1, 2);
        screen.scroll_down(1, Attribute::default());
        let text = screen.visible_text();
        assert_eq!(text, vec!["aa", "  ", "bb", "dd"]);
    }

    #[test]
    fn resize_keeps_scrollback_capacity() {
        let mut screen = screen_with_numbered_lines(4, 3, 5);
        assert_eq!(screen.lines.max_length(), 8);
        screen.resize(6, 5);
        assert_eq!(screen.lines.max_length(), 10);
        assert_eq!(screen.rows, 5);
        assert_eq!(screen.cols, 6);
        assert_eq!(screen.total_lines(), 5);
        for y in 0..5 {
            assert_eq!(screen.active_line(y).len(), 6);
        }
    }

    #[test]
    fn resize_clamps_view_state() {
        let mut screen = screen_with_numbered_lines(4, 4, 10);
        for _ in 0..6 {
            screen.scroll_up(1, false, Attribute::default());
        }
        assert_eq!(screen.y_base(), 6);
        screen.set_cursor(3, 3);
        screen.resize(4, 8);
        // taller viewport swallows part of the scrollback
        assert_eq!(screen.y_base(), 2);
        assert_eq!(screen.cursor().y, 7);
        assert!(screen.y_disp() <= screen.y_base());
    }

    #[test]
    fn scroll_region_sticks_to_bottom_on_resize() {
        let mut screen = screen_with_numbered_lines(4, 6, 0);
        screen.set_scroll_region(1, 5);
        screen.resize(4, 9);
        assert_eq!(screen.scroll_bottom(), 8);
        assert_eq!(screen.scroll_top(), 1);

        let mut screen = screen_with_numbered_lines(4, 6, 0);
        screen.set_scroll_region(1, 3);
        screen.resize(4, 9);
        assert_eq!(screen.scroll_bottom(), 3);
    }

    #[test]
    fn erase_scrollback_rebases() {
        let mut screen = screen_with_numbered_lines(4, 3, 10);
        for _ in 0..4 {
            screen.scroll_up(1, false, Attribute::default());
        }
        assert_eq!(screen.y_base(), 4);
        screen.erase_scrollback();
        assert_eq!(screen.y_base(), 0);
        assert_eq!(screen.total_lines(), 3);
    }

    #[test]
    fn pending_wrap_parks_cursor_at_cols() {
        let mut screen = screen_with_numbered_lines(4, 3, 0);
        screen.move_cursor(4, 0);
        assert_eq!(screen.cursor().x, 4);
        screen.set_cursor(4, 0);
        assert_eq!(screen.cursor().x, 3);
    }
}
