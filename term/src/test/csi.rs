//! CSI sequence handling: cursor movement, erase, edit, SGR, reports.
use super::*;

#[test]
fn cursor_movement() {
    let (mut term, _) = new_term(10, 5);
    cup(&mut term, 3, 2);
    assert_cursor_pos(&term, 3, 2);
    term.write("\x1b[2A");
    assert_cursor_pos(&term, 3, 0);
    term.write("\x1b[3B");
    assert_cursor_pos(&term, 3, 3);
    term.write("\x1b[4C");
    assert_cursor_pos(&term, 7, 3);
    term.write("\x1b[100C");
    assert_cursor_pos(&term, 9, 3);
    term.write("\x1b[2D");
    assert_cursor_pos(&term, 7, 3);
    term.write("\x1b[E");
    assert_cursor_pos(&term, 0, 4);
    term.write("\x1b[2F");
    assert_cursor_pos(&term, 0, 2);
    term.write("\x1b[5G");
    assert_cursor_pos(&term, 4, 2);
    term.write("\x1b[4d");
    assert_cursor_pos(&term, 4, 3);
    // clamped CUP
    term.write("\x1b[99;99H");
    assert_cursor_pos(&term, 9, 4);
}

#[test]
fn erase_in_line() {
    let (mut term, _) = new_term(6, 2);
    term.write("abcdef");
    cup(&mut term, 2, 0);
    term.write("\x1b[K");
    assert_visible_contents(&term, &["ab    ", "      "]);

    let (mut term, _) = new_term(6, 2);
    term.write("abcdef");
    cup(&mut term, 2, 0);
    term.write("\x1b[1K");
    assert_visible_contents(&term, &["   def", "      "]);

    let (mut term, _) = new_term(6, 2);
    term.write("abcdef");
    cup(&mut term, 2, 0);
    term.write("\x1b[2K");
    assert_visible_contents(&term, &["      ", "      "]);
}

#[test]
fn erase_in_display() {
    let (mut term, _) = new_term(3, 3);
    term.write("abc\r\ndef\r\nghi");
    cup(&mut term, 1, 1);
    term.write("\x1b[J");
    assert_visible_contents(&term, &["abc", "d  ", "   "]);

    let (mut term, _) = new_term(3, 3);
    term.write("abc\r\ndef\r\nghi");
    cup(&mut term, 1, 1);
    term.write("\x1b[1J");
    assert_visible_contents(&term, &["   ", "  f", "ghi"]);

    let (mut term, _) = new_term(3, 3);
    term.write("abc\r\ndef\r\nghi");
    term.write("\x1b[2J");
    assert_visible_contents(&term, &["   ", "   ", "   "]);
}

#[test]
fn erase_scrollback_only() {
    let (mut term, _) = term_sized(3, 2, 10);
    term.write("a\r\nb\r\nc\r\nd");
    assert_eq!(term.screen().y_base(), 2);
    term.write("\x1b[3J");
    assert_eq!(term.screen().y_base(), 0);
    assert_eq!(term.screen().total_lines(), 2);
    assert_visible_contents(&term, &["c  ", "d  "]);
}

#[test]
fn insert_and_delete_lines_respect_region() {
    let (mut term, _) = new_term(3, 5);
    term.write("a\r\nb\r\nc\r\nd\r\ne");
    set_scroll_region(&mut term, 1, 3);
    cup(&mut term, 0, 1);
    term.write("\x1b[L");
    assert_visible_contents(&term, &["a  ", "   ", "b  ", "c  ", "e  "]);

    term.write("\x1b[M");
    assert_visible_contents(&term, &["a  ", "b  ", "c  ", "   ", "e  "]);

    // outside the region IL/DL are ignored
    cup(&mut term, 0, 4);
    term.write("\x1b[L");
    assert_visible_contents(&term, &["a  ", "b  ", "c  ", "   ", "e  "]);
}

#[test]
fn insert_and_delete_chars() {
    let (mut term, _) = new_term(6, 2);
    term.write("abcdef");
    cup(&mut term, 2, 0);
    term.write("\x1b[2@");
    assert_visible_contents(&term, &["ab  cd", "      "]);
    term.write("\x1b[2P");
    assert_visible_contents(&term, &["abcd  ", "      "]);
}

#[test]
fn delete_chars_use_current_background() {
    // DCH back-fills the vacated right edge with the current bg (BCE)
    let (mut term, _) = new_term(20, 24);
    term.write("XXXXXXXXXXXXXXXXXXXX");
    term.write("\x1b[44m");
    cup(&mut term, 5, 0);
    term.write("\x1b[3P");
    let line = term.screen().active_line(0);
    for x in 0..5 {
        assert_eq!(line.get(x).content(), "X");
        assert!(line.get(x).attr().is_bg_default());
    }
    for x in 5..17 {
        assert_eq!(line.get(x).content(), "X", "col {}", x);
    }
    for x in 17..20 {
        let cell = line.get(x);
        assert_eq!(cell.content(), " ", "col {}", x);
        assert_eq!(cell.attr().bg_value(), 4, "col {}", x);
        assert!(!cell.attr().bold());
    }
}

#[test]
fn erase_chars() {
    let (mut term, _) = new_term(6, 2);
    term.write("abcdef");
    cup(&mut term, 1, 0);
    term.write("\x1b[3X");
    assert_visible_contents(&term, &["a   ef", "      "]);
    assert_cursor_pos(&term, 1, 0);
}

#[test]
fn sgr_sets_flags_and_colors() {
    let (mut term, _) = new_term(10, 2);
    term.write("\x1b[1;3;4;31mX");
    let cell = term.screen().active_line(0).get(0);
    assert_eq!(cell.content(), "X");
    assert!(cell.attr().bold());
    assert!(cell.attr().italic());
    assert!(cell.attr().underline());
    assert_eq!(cell.attr().fg_mode(), ColorMode::Palette);
    assert_eq!(cell.attr().fg_value(), 1);

    term.write("\x1b[0mY");
    let cell = term.screen().active_line(0).get(1);
    assert!(cell.attr().is_default());
}

#[test]
fn sgr_resets_individual_attributes() {
    let (mut term, _) = new_term(10, 2);
    term.write("\x1b[1;2;4;7m\x1b[22;24;27mX");
    let attr = *term.screen().active_line(0).get(0).attr();
    assert!(!attr.bold());
    assert!(!attr.dim());
    assert!(!attr.underline());
    assert!(!attr.inverse());
}

#[test]
fn sgr_extended_colors() {
    let (mut term, _) = new_term(10, 2);
    term.write("\x1b[38;5;123mA");
    let attr = *term.screen().active_line(0).get(0).attr();
    assert_eq!(attr.fg_mode(), ColorMode::Palette);
    assert_eq!(attr.fg_value(), 123);

    term.write("\x1b[48;2;16;32;48mB");
    let attr = *term.screen().active_line(0).get(1).attr();
    assert_eq!(attr.bg_mode(), ColorMode::Rgb);
    assert_eq!(attr.bg_value(), 0x102030);

    // parameters following the colour triple still apply
    term.write("\x1b[0m\x1b[38;2;1;2;3;1mC");
    let attr = *term.screen().active_line(0).get(2).attr();
    assert_eq!(attr.fg_value(), 0x010203);
    assert!(attr.bold());

    // colon sub-parameter form
    term.write("\x1b[0m\x1b[38:2::9:8:7mD");
    let attr = *term.screen().active_line(0).get(3).attr();
    assert_eq!(attr.fg_mode(), ColorMode::Rgb);
    assert_eq!(attr.fg_value(), 0x090807);

    term.write("\x1b[0m\x1b[58:2::1:2:3m\x1b[93mE");
    let attr = *term.screen().active_line(0).get(4).attr();
    assert_eq!(attr.fg_value(), 13);

    term.write("\x1b[0m\x1b[100mF");
    let attr = *term.screen().active_line(0).get(5).attr();
    assert_eq!(attr.bg_value(), 8);
}

#[test]
fn sgr_underline_color_params_are_consumed() {
    // the colour spec after 58 must not leak into unrelated attributes
    let (mut term, _) = new_term(10, 2);
    term.write("\x1b[58;2;1;2;3mA");
    let attr = *term.screen().active_line(0).get(0).attr();
    assert!(attr.is_default());

    term.write("\x1b[0m\x1b[58;5;124;1mB");
    let attr = *term.screen().active_line(0).get(1).attr();
    assert!(attr.bold());
    assert!(!attr.dim());
    assert!(attr.is_fg_default());

    // 59 resets the (unstored) underline colour and consumes nothing
    term.write("\x1b[0m\x1b[59;4mC");
    let attr = *term.screen().active_line(0).get(2).attr();
    assert!(attr.underline());
    assert!(!attr.bold());
}

#[test]
fn bright_colors() {
    let (mut term, _) = new_term(10, 2);
    term.write("\x1b[97mX");
    let attr = *term.screen().active_line(0).get(0).attr();
    assert_eq!(attr.fg_value(), 15);
    term.write("\x1b[39mY");
    let attr = *term.screen().active_line(0).get(1).attr();
    assert!(attr.is_fg_default());
}

#[test]
fn device_status_reports() {
    let (mut term, recorder) = new_term(80, 24);
    term.write("\x1b[5n");
    assert_eq!(recorder.all_data(), "\x1b[0n");
    recorder.0.borrow_mut().data.clear();

    term.screen_mut().set_cursor(10, 5);
    term.write("\x1b[6n");
    assert_eq!(recorder.all_data(), "\x1b[6;11R");
    recorder.0.borrow_mut().data.clear();

    term.write("\x1b[?6n");
    assert_eq!(recorder.all_data(), "\x1b[?6;11R");
    recorder.0.borrow_mut().data.clear();

    term.write("\x1b[?15n");
    assert_eq!(recorder.all_data(), "\x1b[?13n");
    recorder.0.borrow_mut().data.clear();

    term.write("\x1b[?25n");
    assert_eq!(recorder.all_data(), "\x1b[?21n");
    recorder.0.borrow_mut().data.clear();

    term.write("\x1b[?26n");
    assert_eq!(recorder.all_data(), "\x1b[?27;1;0;0n");
    recorder.0.borrow_mut().data.clear();

    // unknown subtype: silence
    term.write("\x1b[?99n");
    assert_eq!(recorder.all_data(), "");
}

#[test]
fn cursor_position_report_in_origin_mode() {
    let (mut term, recorder) = new_term(80, 24);
    set_scroll_region(&mut term, 5, 20);
    set_mode(&mut term, "?6", true);
    term.write("\x1b[3;4H");
    term.write("\x1b[6n");
    assert_eq!(recorder.all_data(), "\x1b[3;4R");
}

#[test]
fn device_attributes() {
    let (mut term, recorder) = new_term(80, 24);
    term.write("\x1b[c");
    assert_eq!(recorder.all_data(), "\x1b[?1;2c");
    recorder.0.borrow_mut().data.clear();
    term.write("\x1b[>c");
    assert_eq!(recorder.all_data(), "\x1b[>0;10;0c");
}

#[test]
fn scroll_up_and_down_in_region() {
    let (mut term, _) = new_term(3, 4);
    term.write("a\r\nb\r\nc\r\nd");
    set_scroll_region(&mut term, 1, 2);
    term.write("\x1b[S");
    assert_visible_contents(&term, &["a  ", "c  ", "   ", "d  "]);
    term.write("\x1b[T");
    assert_visible_contents(&term, &["a  ", "   ", "c  ", "d  "]);
}

#[test]
fn decstbm_clamps_and_homes() {
    let (mut term, _) = new_term(10, 8);
    cup(&mut term, 5, 5);
    set_scroll_region(&mut term, 2, 5);
    assert_eq!(term.screen().scroll_top(), 2);
    assert_eq!(term.screen().scroll_bottom(), 5);
    assert_cursor_pos(&term, 0, 0);
    // out of range bottom clamps to the last row
    term.write("\x1b[1;99r");
    assert_eq!(term.screen().scroll_bottom(), 7);
}

#[test]
fn save_restore_cursor_round_trip() {
    let (mut term, _) = new_term(20, 10);
    term.write("\x1b[1;35m");
    cup(&mut term, 7, 3);
    term.write("\x1b7");
    cup(&mut term, 0, 0);
    term.write("\x1b[0mx");
    term.write("\x1b8");
    assert_cursor_pos(&term, 7, 3);
    term.write("y");
    let cell = term.screen().active_line(3).get(7);
    assert!(cell.attr().bold());
    assert_eq!(cell.attr().fg_value(), 5);

    // restore without a prior save homes the cursor
    let (mut term, _) = new_term(20, 10);
    cup(&mut term, 7, 3);
    term.write("\x1b8");
    assert_cursor_pos(&term, 0, 0);
}

#[test]
fn ansi_save_restore_aliases() {
    let (mut term, _) = new_term(20, 10);
    cup(&mut term, 4, 4);
    term.write("\x1b[s");
    cup(&mut term, 0, 0);
    term.write("\x1b[u");
    assert_cursor_pos(&term, 4, 4);
}

#[test]
fn decscusr_cursor_style() {
    let (mut term, recorder) = new_term(10, 4);
    term.write("\x1b[6 q");
    assert_eq!(term.cursor_style(), (CursorStyle::Bar, false));
    assert_eq!(
        recorder.0.borrow().cursor_style,
        Some((CursorStyle::Bar, false))
    );
    term.write("\x1b[3 q");
    assert_eq!(term.cursor_style(), (CursorStyle::Underline, true));
    term.write("\x1b[0 q");
    assert_eq!(term.cursor_style(), (CursorStyle::Block, true));
}

#[test]
fn insert_mode_shifts_cells() {
    let (mut term, _) = new_term(6, 2);
    term.write("abcdef");
    cup(&mut term, 2, 0);
    set_mode(&mut term, "4", true);
    term.write("XY");
    assert_visible_contents(&term, &["abXYcd", "      "]);
    set_mode(&mut term, "4", false);
    term.write("Z");
    assert_visible_contents(&term, &["abXYZd", "      "]);
}

#[test]
fn origin_mode_addresses_region() {
    let (mut term, _) = new_term(10, 10);
    set_scroll_region(&mut term, 2, 7);
    set_mode(&mut term, "?6", true);
    assert_cursor_pos(&term, 0, 2);
    term.write("\x1b[1;1H");
    assert_cursor_pos(&term, 0, 2);
    // rows clamp to the region bottom
    term.write("\x1b[99;1H");
    assert_cursor_pos(&term, 0, 7);
    set_mode(&mut term, "?6", false);
    assert_cursor_pos(&term, 0, 0);
}

#[test]
fn soft_reset_preserves_screen() {
    let (mut term, _) = new_term(10, 4);
    term.write("keep\x1b[1;31m\x1b[2;5r");
    set_mode(&mut term, "?6", true);
    term.write("\x1b[!p");
    assert_visible_contents(&term, &["keep      ", "          ", "          ", "          "]);
    assert_eq!(term.screen().scroll_top(), 0);
    assert_eq!(term.screen().scroll_bottom(), 3);
    term.write("x");
    assert!(term.screen().active_line(0).get(0).attr().is_default());
}

#[test]
fn unknown_sequences_are_ignored() {
    let (mut term, recorder) = new_term(10, 4);
    term.write("a\x1b[9999z\x1b[=5w b");
    assert_visible_contents(&term, &["a b       ", "          ", "          ", "          "]);
    assert_eq!(recorder.all_data(), "");
}

#[test]
fn window_ops_gated_by_permission() {
    // everything denied by default
    let (mut term, recorder) = new_term(10, 4);
    term.write("\x1b[2t\x1b[18t");
    assert_eq!(recorder.all_data(), "");
    assert!(recorder.0.borrow().window_events.is_empty());

    // opt in and try again
    let recorder = Recorder::default();
    let options = TerminalOptions {
        cols: 10,
        rows: 4,
        window_ops: WindowOps::MINIMIZE_WIN | WindowOps::GET_WIN_SIZE_CHARS,
        ..Default::default()
    };
    let mut term = Terminal::new(options, Box::new(recorder.clone()));
    term.write("\x1b[2t\x1b[18t");
    assert_eq!(recorder.all_data(), "\x1b[8;4;10t");
    assert_eq!(recorder.0.borrow().window_events, vec!["minimized"]);
}

#[test]
fn window_info_queries_need_a_handler() {
    let options = TerminalOptions {
        cols: 10,
        rows: 4,
        window_ops: WindowOps::GET_WIN_STATE | WindowOps::GET_WIN_POSITION,
        ..Default::default()
    };
    let recorder = Recorder::default();
    let mut term = Terminal::new(options.clone(), Box::new(recorder.clone()));
    // handler declines: no reply at all
    term.write("\x1b[11t\x1b[13t");
    assert_eq!(recorder.all_data(), "");

    let recorder = Recorder::default();
    {
        let mut state = recorder.0.borrow_mut();
        state.answer_window_info = true;
        state.win_position = (30, 40);
    }
    let mut term = Terminal::new(options, Box::new(recorder.clone()));
    term.write("\x1b[11t\x1b[13t");
    assert_eq!(recorder.all_data(), "\x1b[1t\x1b[3;30;40t");
}

#[test]
fn window_resize_via_op8() {
    let options = TerminalOptions {
        cols: 10,
        rows: 4,
        window_ops: WindowOps::SET_WIN_SIZE_CHARS,
        ..Default::default()
    };
    let recorder = Recorder::default();
    let mut term = Terminal::new(options, Box::new(recorder.clone()));
    term.write("\x1b[8;6;20t");
    assert_eq!(term.screen().rows, 6);
    assert_eq!(term.screen().cols, 20);
    assert_eq!(recorder.0.borrow().resized, Some((20, 6)));
}

#[test]
fn title_reports() {
    let options = TerminalOptions {
        cols: 10,
        rows: 4,
        window_ops: WindowOps::GET_WIN_TITLE | WindowOps::GET_ICON_TITLE,
        ..Default::default()
    };
    let recorder = Recorder::default();
    let mut term = Terminal::new(options, Box::new(recorder.clone()));
    term.write("\x1b]2;my title\x07");
    term.write("\x1b[21t");
    assert_eq!(recorder.all_data(), "\x1b]lmy title\x07");
    recorder.0.borrow_mut().data.clear();

    term.write("\x1b]1;icons\x07");
    term.write("\x1b[20t");
    assert_eq!(recorder.all_data(), "\x1b]Licons\x07");
}

#[test]
fn decrqss_status_strings() {
    let (mut term, recorder) = new_term(80, 24);
    set_scroll_region(&mut term, 2, 10);
    term.write("\x1bP$qr\x1b\\");
    assert_eq!(recorder.all_data(), "\x1bP1$r3;11r\x1b\\");
    recorder.0.borrow_mut().data.clear();

    term.write("\x1bP$qz\x1b\\");
    assert_eq!(recorder.all_data(), "\x1bP0$r\x1b\\");
}
