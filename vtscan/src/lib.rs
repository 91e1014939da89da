//! A byte-level scanner for the state machine described by
//! [DEC ANSI Parser](https://vt100.net/emu/dec_ansi_parser), modified to
//! decode UTF-8 and to carry colon-delimited sub-parameters.
//!
//! The scanner categorizes the input stream into printable text, C0/C1
//! controls, CSI/ESC/OSC/DCS sequences and hands each one to an
//! implementation of [`VtDispatch`].  It ascribes no meaning to the
//! sequences themselves: the CSI sequence that moves the cursor looks the
//! same to this crate as the one that changes colors.  State persists
//! across calls to [`VtScanner::scan`], so escape sequences may be split
//! across arbitrary chunk boundaries.
#![allow(clippy::upper_case_acronyms)]
use utf8parse::Parser as Utf8Parser;
mod enums;
use crate::enums::*;
mod params;
pub use params::{Params, PARAM_ABSENT};
mod transitions;

use transitions::{ENTRY, EXIT, TRANSITIONS};

#[inline(always)]
fn lookup(state: State, b: u8) -> (Action, State) {
    let v = unsafe {
        TRANSITIONS
            .get_unchecked(state as usize)
            .get_unchecked(b as usize)
    };
    (Action::from_u16(v >> 8), State::from_u16(v & 0xff))
}

#[inline(always)]
fn lookup_entry(state: State) -> Action {
    unsafe { *ENTRY.get_unchecked(state as usize) }
}

#[inline(always)]
fn lookup_exit(state: State) -> Action {
    unsafe { *EXIT.get_unchecked(state as usize) }
}

/// `VtDispatch` is the trait through which the host application receives
/// the categorized input stream.
///
/// ## Terminology
/// `collected` holds the private marker and intermediate bytes of a
/// sequence, in the order received: for `CSI ? 2 5 h` it is `b"?"`, for
/// `CSI SP q` it is `b" "`, for `ESC # 8` it is `b"#"`.  A sequence is
/// identified by its collected bytes together with the final byte.
///
/// `params` holds the numeric parameters; omitted positions carry
/// [`PARAM_ABSENT`] so that handlers can apply per-command defaults.
pub trait VtDispatch {
    /// A codepoint that should be displayed at the cursor position,
    /// subject to the character set and modes maintained by the
    /// embedding application.  Invalid UTF-8 arrives as the unicode
    /// REPLACEMENT_CHARACTER.
    fn print(&mut self, c: char);

    /// A C0 or C1 control function should be executed: backspace,
    /// carriage return, line feed and friends.
    fn execute(&mut self, control: u8);

    /// The final byte of a control sequence has arrived.
    fn csi_dispatch(&mut self, collected: &[u8], params: &Params, control: u8);

    /// The final byte of an escape sequence has arrived.
    fn esc_dispatch(&mut self, collected: &[u8], control: u8);

    /// An operating system command was terminated by BEL or ST.  The
    /// payload is the raw byte string between the introducer and the
    /// terminator; the conventional `Ps ; Pt` split is left to the
    /// handler.
    fn osc_dispatch(&mut self, payload: &[u8]);

    /// A device control string was recognized; the passthrough data
    /// follows via `dcs_put` until `dcs_unhook`.
    fn dcs_hook(&mut self, _collected: &[u8], _params: &Params, _control: u8) {}

    /// One byte of the data portion of a device control string.
    fn dcs_put(&mut self, _byte: u8) {}

    /// The device control string was terminated.
    fn dcs_unhook(&mut self) {}
}

/// Events captured by [`CollectingDispatch`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VtEvent {
    Print(char),
    Execute(u8),
    Csi {
        collected: Vec<u8>,
        params: Vec<i32>,
        control: u8,
    },
    Esc {
        collected: Vec<u8>,
        control: u8,
    },
    Osc(Vec<u8>),
    DcsHook {
        collected: Vec<u8>,
        params: Vec<i32>,
        control: u8,
    },
    DcsPut(u8),
    DcsUnhook,
}

/// An implementation of `VtDispatch` that captures events into a vector;
/// useful for tests and for callers that prefer a pull model.
#[derive(Default)]
pub struct CollectingDispatch {
    events: Vec<VtEvent>,
}

impl CollectingDispatch {
    pub fn into_vec(self) -> Vec<VtEvent> {
        self.events
    }
}

impl IntoIterator for CollectingDispatch {
    type Item = VtEvent;
    type IntoIter = std::vec::IntoIter<VtEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl VtDispatch for CollectingDispatch {
    fn print(&mut self, c: char) {
        self.events.push(VtEvent::Print(c));
    }

    fn execute(&mut self, control: u8) {
        self.events.push(VtEvent::Execute(control));
    }

    fn csi_dispatch(&mut self, collected: &[u8], params: &Params, control: u8) {
        self.events.push(VtEvent::Csi {
            collected: collected.to_vec(),
            params: params.to_array().to_vec(),
            control,
        });
    }

    fn esc_dispatch(&mut self, collected: &[u8], control: u8) {
        self.events.push(VtEvent::Esc {
            collected: collected.to_vec(),
            control,
        });
    }

    fn osc_dispatch(&mut self, payload: &[u8]) {
        self.events.push(VtEvent::Osc(payload.to_vec()));
    }

    fn dcs_hook(&mut self, collected: &[u8], params: &Params, control: u8) {
        self.events.push(VtEvent::DcsHook {
            collected: collected.to_vec(),
            params: params.to_array().to_vec(),
            control,
        });
    }

    fn dcs_put(&mut self, byte: u8) {
        self.events.push(VtEvent::DcsPut(byte));
    }

    fn dcs_unhook(&mut self) {
        self.events.push(VtEvent::DcsUnhook);
    }
}

/// Collected prefix/intermediate bytes beyond this are discarded; no
/// standard sequence uses more than two.
const MAX_COLLECT: usize = 4;

/// Bound on OSC payload accumulation so that a hostile stream cannot
/// grow the scanner without limit.
const MAX_OSC_LEN: usize = 4096;

/// The virtual terminal scanner.  It works together with an
/// implementation of [`VtDispatch`].
pub struct VtScanner {
    state: State,

    collected: Vec<u8>,
    collect_full: bool,

    params: Params,
    current_param: Option<i32>,
    /// A parameter position has been opened (digits or a separator were
    /// seen) and is not yet pushed into `params`.
    param_open: bool,
    /// The open position is a colon sub-parameter.
    param_is_sub: bool,

    osc: Vec<u8>,
    osc_full: bool,

    utf8_parser: Utf8Parser,
    utf8_return_state: State,
}

impl VtScanner {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            utf8_return_state: State::Ground,

            collected: Vec::new(),
            collect_full: false,

            params: Params::new(),
            current_param: None,
            param_open: false,
            param_is_sub: false,

            osc: Vec::new(),
            osc_full: false,

            utf8_parser: Utf8Parser::new(),
        }
    }

    /// Returns true if the state machine is in the ground state, i.e.
    /// no partially accumulated sequence is pending.
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground
    }

    /// Abandon any partially accumulated sequence and return to ground.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Push the open parameter position into the parameter list.
    fn push_current_param(&mut self) {
        let value = self.current_param.take().unwrap_or(PARAM_ABSENT);
        if self.param_is_sub {
            self.params.add_sub(value);
        } else {
            self.params.add(value);
        }
        self.param_open = false;
    }

    fn finish_params(&mut self) {
        if self.param_open || self.current_param.is_some() {
            self.push_current_param();
        }
    }

    fn osc_put(&mut self, c: char) {
        if self.osc.len() >= MAX_OSC_LEN {
            self.osc_full = true;
            return;
        }
        let mut buf = [0u8; 4];
        self.osc
            .extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    fn action(&mut self, action: Action, param: u8, dispatch: &mut dyn VtDispatch) {
        match action {
            Action::None | Action::Ignore => {}
            Action::Print => dispatch.print(param as char),
            Action::Execute => dispatch.execute(param),
            Action::Clear => {
                self.collected.clear();
                self.collect_full = false;
                self.params.reset();
                self.current_param.take();
                self.param_open = false;
                self.param_is_sub = false;
                self.osc_full = false;
            }
            Action::Collect => {
                if self.collected.len() < MAX_COLLECT {
                    self.collected.push(param);
                } else {
                    self.collect_full = true;
                }
            }
            Action::Param => match param {
                b'0'..=b'9' => {
                    let digit = (param - b'0') as i32;
                    let accum = self
                        .current_param
                        .take()
                        .unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(digit);
                    self.current_param = Some(accum);
                    self.param_open = true;
                }
                b';' => {
                    self.push_current_param();
                    self.param_is_sub = false;
                    self.param_open = true;
                }
                b':' => {
                    self.push_current_param();
                    self.param_is_sub = true;
                    self.param_open = true;
                }
                other => {
                    log::trace!("discarding unexpected param byte {:#x}", other);
                }
            },
            Action::EscDispatch => {
                if self.collect_full {
                    log::trace!("oversize ESC sequence discarded");
                } else {
                    dispatch.esc_dispatch(&self.collected, param);
                }
            }
            Action::CsiDispatch => {
                self.finish_params();
                if self.collect_full {
                    log::trace!("oversize CSI sequence discarded");
                } else {
                    dispatch.csi_dispatch(&self.collected, &self.params, param);
                }
            }
            Action::Hook => {
                self.finish_params();
                dispatch.dcs_hook(&self.collected, &self.params, param);
            }
            Action::Put => dispatch.dcs_put(param),
            Action::Unhook => dispatch.dcs_unhook(),
            Action::OscStart => {
                self.osc.clear();
                self.osc_full = false;
            }
            Action::OscPut => self.osc_put(param as char),
            Action::OscEnd => {
                let payload = std::mem::take(&mut self.osc);
                dispatch.osc_dispatch(&payload);
            }
            Action::Utf8 => self.next_utf8(dispatch, param),
        }
    }

    // Process one byte of a UTF-8 multi-byte sequence.  The state tables
    // emit Action::Utf8 on a lead byte; continuation bytes then route
    // here until the decoder produces a codepoint (or gives up, in which
    // case we substitute REPLACEMENT_CHARACTER).  We return to the state
    // that the lead byte interrupted.
    fn next_utf8(&mut self, dispatch: &mut dyn VtDispatch, byte: u8) {
        struct Decoder {
            codepoint: Option<char>,
        }

        impl utf8parse::Receiver for Decoder {
            fn codepoint(&mut self, c: char) {
                self.codepoint.replace(c);
            }

            fn invalid_sequence(&mut self) {
                self.codepoint(std::char::REPLACEMENT_CHARACTER);
            }
        }

        let mut decoder = Decoder { codepoint: None };

        self.utf8_parser.advance(&mut decoder, byte);
        if let Some(c) = decoder.codepoint {
            // C1 controls may arrive encoded as UTF-8 text rather than
            // as raw 8-bit bytes.  If the decoded value is byte-sized
            // and would cause a state transition, run that transition
            // instead of treating it as string content.
            if c as u32 <= 0xff {
                let byte = ((c as u32) & 0xff) as u8;

                let (action, state) = lookup(self.utf8_return_state, byte);
                if action == Action::Execute
                    || (state != self.utf8_return_state && state != State::Utf8Sequence)
                {
                    self.action(lookup_exit(self.utf8_return_state), 0, dispatch);
                    self.action(action, byte, dispatch);
                    self.action(lookup_entry(state), 0, dispatch);
                    self.utf8_return_state = self.state;
                    self.state = state;
                    return;
                }
            }

            match self.utf8_return_state {
                State::Ground => dispatch.print(c),
                State::OscString => self.osc_put(c),
                state => {
                    log::error!("utf8 decode completed in unexpected state {:?}", state);
                }
            };
            self.state = self.utf8_return_state;
        }
    }

    /// Scan a single byte.  This may result in a call to one of the
    /// methods on the provided `dispatch`.
    #[inline(always)]
    pub fn scan_byte(&mut self, byte: u8, dispatch: &mut dyn VtDispatch) {
        // While decoding a multi-byte codepoint, defer to the utf-8
        // decoder; it drops us back into the interrupted state after
        // each recognized (or invalid) codepoint.
        if self.state == State::Utf8Sequence {
            self.next_utf8(dispatch, byte);
            return;
        }

        let (action, state) = lookup(self.state, byte);

        if state != self.state {
            if state != State::Utf8Sequence {
                self.action(lookup_exit(self.state), 0, dispatch);
            }
            self.action(action, byte, dispatch);
            self.action(lookup_entry(state), byte, dispatch);
            self.utf8_return_state = self.state;
            self.state = state;
        } else {
            self.action(action, byte, dispatch);
        }
    }

    /// Scan a sequence of bytes.  The sequence need not contain complete
    /// escape sequences; scanning picks up exactly where the previous
    /// call left off.
    pub fn scan(&mut self, bytes: &[u8], dispatch: &mut dyn VtDispatch) {
        for b in bytes {
            self.scan_byte(*b, dispatch);
        }
    }
}
