//! Various tests of the terminal model and escape sequence processing
//! routines, driven through the public `Terminal::write` API.
#![allow(clippy::bool_assert_comparison)]
use super::*;
use std::cell::RefCell;
use std::rc::Rc;

mod csi;

/// Records everything the terminal observes so tests can assert on the
/// event stream as well as the screen contents.
#[derive(Default)]
pub(crate) struct RecorderState {
    pub data: Vec<String>,
    pub title: Option<String>,
    pub directory: Option<String>,
    pub hyperlink: Option<(Option<String>, Option<String>)>,
    pub clipboard: Option<String>,
    pub bells: usize,
    pub line_feeds: usize,
    pub resized: Option<(usize, usize)>,
    pub cursor_style: Option<(CursorStyle, bool)>,
    pub buffer_changes: Vec<bool>,
    pub window_events: Vec<&'static str>,
    // canned answers for window info requests
    pub answer_window_info: bool,
    pub iconified: bool,
    pub win_position: (i32, i32),
    pub win_size: (i32, i32),
    pub win_icon_title: Option<String>,
}

#[derive(Clone, Default)]
pub(crate) struct Recorder(pub Rc<RefCell<RecorderState>>);

impl Recorder {
    pub fn all_data(&self) -> String {
        self.0.borrow().data.concat()
    }
}

impl EventListener for Recorder {
    fn data(&mut self, data: &str) {
        self.0.borrow_mut().data.push(data.to_string());
    }

    fn title_changed(&mut self, title: &str) {
        self.0.borrow_mut().title = Some(title.to_string());
    }

    fn directory_changed(&mut self, path: &str) {
        self.0.borrow_mut().directory = Some(path.to_string());
    }

    fn hyperlink_changed(&mut self, url: Option<&str>, id: Option<&str>) {
        self.0.borrow_mut().hyperlink = Some((
            url.map(|s| s.to_string()),
            id.map(|s| s.to_string()),
        ));
    }

    fn clipboard_set(&mut self, data: &str) {
        self.0.borrow_mut().clipboard = Some(data.to_string());
    }

    fn bell(&mut self) {
        self.0.borrow_mut().bells += 1;
    }

    fn line_fed(&mut self) {
        self.0.borrow_mut().line_feeds += 1;
    }

    fn resized(&mut self, cols: usize, rows: usize) {
        self.0.borrow_mut().resized = Some((cols, rows));
    }

    fn cursor_style_changed(&mut self, style: CursorStyle, blink: bool) {
        self.0.borrow_mut().cursor_style = Some((style, blink));
    }

    fn buffer_changed(&mut self, alt: bool) {
        self.0.borrow_mut().buffer_changes.push(alt);
    }

    fn window_moved(&mut self, _x: i32, _y: i32) {
        self.0.borrow_mut().window_events.push("moved");
    }

    fn window_resized(&mut self, _w: i32, _h: i32) {
        self.0.borrow_mut().window_events.push("resized");
    }

    fn window_minimized(&mut self) {
        self.0.borrow_mut().window_events.push("minimized");
    }

    fn window_maximized(&mut self) {
        self.0.borrow_mut().window_events.push("maximized");
    }

    fn window_restored(&mut self) {
        self.0.borrow_mut().window_events.push("restored");
    }

    fn window_raised(&mut self) {
        self.0.borrow_mut().window_events.push("raised");
    }

    fn window_lowered(&mut self) {
        self.0.borrow_mut().window_events.push("lowered");
    }

    fn window_refreshed(&mut self) {
        self.0.borrow_mut().window_events.push("refreshed");
    }

    fn window_fullscreened(&mut self) {
        self.0.borrow_mut().window_events.push("fullscreened");
    }

    fn window_info_request(&mut self, request: &mut WindowInfoRequest) {
        let state = self.0.borrow();
        if !state.answer_window_info {
            return;
        }
        request.handled = true;
        request.iconified = state.iconified;
        request.x = state.win_position.0;
        request.y = state.win_position.1;
        request.width = state.win_size.0;
        request.height = state.win_size.1;
        request.title = state.win_icon_title.clone();
    }
}

pub(crate) fn term_sized(cols: usize, rows: usize, scrollback: usize) -> (Terminal, Recorder) {
    let _ = env_logger::builder().is_test(true).try_init();
    let recorder = Recorder::default();
    let options = TerminalOptions {
        cols,
        rows,
        scrollback,
        ..Default::default()
    };
    let term = Terminal::new(options, Box::new(recorder.clone()));
    (term, recorder)
}

pub(crate) fn new_term(cols: usize, rows: usize) -> (Terminal, Recorder) {
    term_sized(cols, rows, 1000)
}

/// Move the cursor with CUP; col and row are zero-based here.
pub(crate) fn cup(term: &mut Terminal, col: usize, row: usize) {
    term.write(format!("\x1b[{};{}H", row + 1, col + 1));
}

pub(crate) fn set_mode(term: &mut Terminal, mode: &str, enable: bool) {
    term.write(format!("\x1b[{}{}", mode, if enable { "h" } else { "l" }));
}

pub(crate) fn set_scroll_region(term: &mut Terminal, top: usize, bottom: usize) {
    term.write(format!("\x1b[{};{}r", top + 1, bottom + 1));
}

fn print_visible_lines(term: &Terminal) {
    println!("screen contents are:");
    for line in term.screen().visible_text() {
        println!("[{}]", line);
    }
}

/// Asserts that the visible rows of the active screen have exactly the
/// given character contents (attributes are not compared).
pub(crate) fn assert_visible_contents(term: &Terminal, expect: &[&str]) {
    print_visible_lines(term);
    let actual = term.screen().visible_text();
    assert_eq!(actual, expect, "visible contents mismatch");
}

pub(crate) fn assert_cursor_pos(term: &Terminal, x: usize, y: usize) {
    let cursor = term.cursor_pos();
    assert_eq!(
        (cursor.x, cursor.y),
        (x, y),
        "cursor position didn't match"
    );
}

#[test]
fn basic_output() {
    let (mut term, _) = new_term(10, 5);
    cup(&mut term, 1, 1);
    term.write("hello, world!");
    assert_visible_contents(
        &term,
        &[
            "          ",
            " hello, wo",
            "rld!      ",
            "          ",
            "          ",
        ],
    );
}

#[test]
fn chunked_writes_match_single_write() {
    let payload = "plain \x1b[1;31mbold red\x1b[0m\r\ntitle:\x1b]2;chunky\x07\x1b[2;3Hmid\x1b[?1049h alt \x1b[?1049l done";

    let (mut whole, _) = new_term(20, 6);
    whole.write(payload);

    for chunk_size in [1usize, 2, 3, 7] {
        let (mut chunked, _) = new_term(20, 6);
        let bytes = payload.as_bytes();
        for chunk in bytes.chunks(chunk_size) {
            chunked.write(chunk);
        }
        assert_eq!(
            chunked.screen().visible_text(),
            whole.screen().visible_text(),
            "chunk size {} diverged",
            chunk_size
        );
        assert_eq!(chunked.cursor_pos(), whole.cursor_pos());
        assert_eq!(chunked.title(), whole.title());
    }
}

#[test]
fn invariants_hold_after_arbitrary_writes() {
    let (mut term, _) = term_sized(6, 4, 8);
    let inputs: [&[u8]; 6] = [
        b"hello world this wraps around the narrow screen",
        b"\x1b[2J\x1b[H\x1b[31mred\x1b[0m\r\n\r\n\r\n\r\n\r\n\r\n",
        b"\x1b[5;1r\x1b[Tscroll\x1b[S",
        b"\xff\xfe broken utf8 \x1b[999;999H",
        b"\x1b[?1049hin alt\x1b[?1049l",
        b"\x1b]0;title\x07\x1b[1;1H\x1b[2K",
    ];
    for input in inputs.iter() {
        term.write(input);
        for screen in [term.primary_screen(), term.alt_screen()] {
            assert!(screen.y_disp() <= screen.y_base());
            assert!(screen.total_lines() >= screen.rows);
            for y in 0..screen.rows {
                let line = screen.active_line(y);
                assert_eq!(line.len(), screen.cols);
                for x in 0..screen.cols {
                    if line.get(x).width() == 2 {
                        assert!(
                            line.get(x + 1).is_wide_spacer(),
                            "wide cell at {} lacks spacer",
                            x
                        );
                    }
                }
            }
        }
    }
}
