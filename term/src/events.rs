//! The observable surface of the terminal.
use crate::input::CursorStyle;

/// Which piece of window information the application asked for via
/// `CSI Ps t`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindowInfo {
    State,
    Position,
    SizePixels,
    ScreenSizePixels,
    CellSizePixels,
    IconTitle,
}

/// A window information query the embedder may answer.  The handler
/// fills in the fields relevant to `kind` and sets `handled`; no reply
/// is sent to the application otherwise.
#[derive(Debug, Clone)]
pub struct WindowInfoRequest {
    pub kind: WindowInfo,
    pub handled: bool,
    pub iconified: bool,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub title: Option<String>,
}

impl WindowInfoRequest {
    pub(crate) fn new(kind: WindowInfo) -> WindowInfoRequest {
        WindowInfoRequest {
            kind,
            handled: false,
            iconified: false,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            title: None,
        }
    }
}

/// Callbacks raised synchronously while bytes are being processed or
/// input is being encoded.  All methods have empty default bodies so an
/// embedder implements only what it cares about.
///
/// Callbacks must not re-enter the terminal (`write` in particular);
/// queue and process after the current call returns.
pub trait EventListener {
    /// Bytes the terminal wants delivered to the application side of
    /// the pty: query replies and status reports.
    fn data(&mut self, _data: &str) {}

    /// OSC 0/2 set the window title.
    fn title_changed(&mut self, _title: &str) {}

    /// OSC 7 reported the shell's working directory.
    fn directory_changed(&mut self, _path: &str) {}

    /// OSC 8 opened (`Some`) or closed (`None`) a hyperlink.
    fn hyperlink_changed(&mut self, _url: Option<&str>, _id: Option<&str>) {}

    /// BEL.
    fn bell(&mut self) {}

    fn resized(&mut self, _cols: usize, _rows: usize) {}

    /// The viewport or its backing moved; a renderer should repaint.
    fn scrolled(&mut self) {}

    fn line_fed(&mut self) {}

    fn cursor_moved(&mut self) {}

    fn cursor_style_changed(&mut self, _style: CursorStyle, _blink: bool) {}

    /// The active screen switched; true means the alternate screen.
    fn buffer_changed(&mut self, _alt: bool) {}

    /// OSC 52 delivered clipboard data (already base64-decoded).
    fn clipboard_set(&mut self, _data: &str) {}

    fn window_moved(&mut self, _x: i32, _y: i32) {}
    fn window_resized(&mut self, _width: i32, _height: i32) {}
    fn window_minimized(&mut self) {}
    fn window_maximized(&mut self) {}
    fn window_restored(&mut self) {}
    fn window_raised(&mut self) {}
    fn window_lowered(&mut self) {}
    fn window_refreshed(&mut self) {}
    fn window_fullscreened(&mut self) {}

    /// The application queried window state; fill in the request and
    /// set `handled` to authorize a reply.
    fn window_info_request(&mut self, _request: &mut WindowInfoRequest) {}
}

/// A listener that ignores everything; the default when an embedder
/// only wants the screen model.
#[derive(Debug, Default)]
pub struct NullListener;

impl EventListener for NullListener {}
