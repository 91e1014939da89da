//! Terminal construction options.
use crate::input::CursorStyle;

bitflags::bitflags! {
    /// Per-operation permission flags for the `CSI Ps t` window
    /// manipulation family.  Everything is denied by default; an
    /// embedder that implements window control opts in per operation.
    #[derive(Default)]
    pub struct WindowOps: u32 {
        const RESTORE_WIN            = 1 << 0;
        const MINIMIZE_WIN           = 1 << 1;
        const SET_WIN_POSITION       = 1 << 2;
        const SET_WIN_SIZE_PIXELS    = 1 << 3;
        const RAISE_WIN              = 1 << 4;
        const LOWER_WIN              = 1 << 5;
        const REFRESH_WIN            = 1 << 6;
        const SET_WIN_SIZE_CHARS     = 1 << 7;
        const MAXIMIZE_WIN           = 1 << 8;
        const FULLSCREEN_WIN         = 1 << 9;
        const GET_WIN_STATE          = 1 << 10;
        const GET_WIN_POSITION       = 1 << 11;
        const GET_WIN_SIZE_PIXELS    = 1 << 12;
        const GET_SCREEN_SIZE_PIXELS = 1 << 13;
        const GET_CELL_SIZE_PIXELS   = 1 << 14;
        const GET_WIN_SIZE_CHARS     = 1 << 15;
        const GET_ICON_TITLE         = 1 << 16;
        const GET_WIN_TITLE          = 1 << 17;
    }
}

/// Options fixed at construction time (dimensions may change later via
/// `resize`).
#[derive(Debug, Clone)]
pub struct TerminalOptions {
    pub cols: usize,
    pub rows: usize,
    /// Lines of history kept above the normal screen.
    pub scrollback: usize,
    pub tab_stop_width: usize,
    /// DECAWM initial state.
    pub wraparound: bool,
    /// When set, LF/VT/FF also return the cursor to column 0.
    pub convert_eol: bool,
    pub term_name: String,
    pub cursor_style: CursorStyle,
    pub cursor_blink: bool,
    /// Reply sent for ENQ (0x05); empty means no reply.
    pub answerback: String,
    /// Colours reported by the OSC 10/11/12 queries, as packed RGB.
    pub foreground: (u8, u8, u8),
    pub background: (u8, u8, u8),
    pub cursor_color: (u8, u8, u8),
    /// Snap the viewport to the bottom when keyboard input is encoded.
    pub scroll_to_bottom_on_key_input: bool,
    pub window_ops: WindowOps,
}

impl Default for TerminalOptions {
    fn default() -> TerminalOptions {
        TerminalOptions {
            cols: 80,
            rows: 24,
            scrollback: 1000,
            tab_stop_width: 8,
            wraparound: true,
            convert_eol: false,
            term_name: "xterm".into(),
            cursor_style: CursorStyle::Block,
            cursor_blink: false,
            answerback: String::new(),
            foreground: (0xff, 0xff, 0xff),
            background: (0x00, 0x00, 0x00),
            cursor_color: (0xff, 0xff, 0xff),
            scroll_to_bottom_on_key_input: true,
            window_ops: WindowOps::empty(),
        }
    }
}
