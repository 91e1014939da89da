//! Packed per-cell style attributes.
//!
//! Style state is packed into three 32 bit words to keep per-cell
//! overhead low: a foreground word, a background word and an extended
//! word holding the boolean style flags.  Colour words carry the colour
//! value in their low 25 bits and the colour mode in the bits above.

#[cfg(feature = "use_serde")]
use serde::{Deserialize, Serialize};

/// Palette index reported for the default foreground colour.
pub const DEFAULT_FG: u32 = 256;
/// Palette index reported for the default background colour.
pub const DEFAULT_BG: u32 = 257;

const COLOR_VALUE_MASK: u32 = 0x01ff_ffff;
const COLOR_MODE_SHIFT: u32 = 25;

/// How the 25 bit colour value of an [`Attribute`] word is interpreted.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ColorMode {
    /// An index into the 256 colour palette; 256 and 257 select the
    /// configured default foreground/background.
    Palette = 0,
    /// A direct colour packed as `R << 16 | G << 8 | B`.
    Rgb = 1,
}

impl ColorMode {
    fn from_word(word: u32) -> ColorMode {
        match word >> COLOR_MODE_SHIFT {
            0 => ColorMode::Palette,
            _ => ColorMode::Rgb,
        }
    }
}

/// Define getter and setter for a boolean style flag held in the
/// extended attribute word.
macro_rules! ext_flag {
    ($getter:ident, $setter:ident, $bit:expr) => {
        #[inline]
        pub fn $getter(&self) -> bool {
            (self.ext & $bit) == $bit
        }

        #[inline]
        pub fn $setter(&mut self, value: bool) -> &mut Self {
            if value {
                self.ext |= $bit;
            } else {
                self.ext &= !$bit;
            }
            self
        }
    };
}

const BOLD: u32 = 1;
const DIM: u32 = 2;
const ITALIC: u32 = 4;
const UNDERLINE: u32 = 8;
const BLINK: u32 = 16;
const INVERSE: u32 = 32;
const INVISIBLE: u32 = 64;
const STRIKETHROUGH: u32 = 128;
const OVERLINE: u32 = 256;

/// The style for a single cell: foreground, background and style flags.
///
/// Attributes are plain values; cloning is a trivial copy and equality
/// and hashing are bitwise over the three words.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Attribute {
    fg: u32,
    bg: u32,
    ext: u32,
}

impl Default for Attribute {
    fn default() -> Attribute {
        Attribute {
            fg: DEFAULT_FG,
            bg: DEFAULT_BG,
            ext: 0,
        }
    }
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Attribute")
            .field("fg_mode", &self.fg_mode())
            .field("fg", &self.fg_value())
            .field("bg_mode", &self.bg_mode())
            .field("bg", &self.bg_value())
            .field("ext", &self.ext)
            .finish()
    }
}

impl Attribute {
    ext_flag!(bold, set_bold, BOLD);
    ext_flag!(dim, set_dim, DIM);
    ext_flag!(italic, set_italic, ITALIC);
    ext_flag!(underline, set_underline, UNDERLINE);
    ext_flag!(blink, set_blink, BLINK);
    ext_flag!(inverse, set_inverse, INVERSE);
    ext_flag!(invisible, set_invisible, INVISIBLE);
    ext_flag!(strikethrough, set_strikethrough, STRIKETHROUGH);
    ext_flag!(overline, set_overline, OVERLINE);

    pub fn fg_mode(&self) -> ColorMode {
        ColorMode::from_word(self.fg)
    }

    pub fn bg_mode(&self) -> ColorMode {
        ColorMode::from_word(self.bg)
    }

    pub fn fg_value(&self) -> u32 {
        self.fg & COLOR_VALUE_MASK
    }

    pub fn bg_value(&self) -> u32 {
        self.bg & COLOR_VALUE_MASK
    }

    pub fn set_foreground(&mut self, mode: ColorMode, value: u32) -> &mut Self {
        self.fg = ((mode as u32) << COLOR_MODE_SHIFT) | (value & COLOR_VALUE_MASK);
        self
    }

    pub fn set_background(&mut self, mode: ColorMode, value: u32) -> &mut Self {
        self.bg = ((mode as u32) << COLOR_MODE_SHIFT) | (value & COLOR_VALUE_MASK);
        self
    }

    pub fn set_fg_palette(&mut self, index: u32) -> &mut Self {
        self.set_foreground(ColorMode::Palette, index)
    }

    pub fn set_bg_palette(&mut self, index: u32) -> &mut Self {
        self.set_background(ColorMode::Palette, index)
    }

    pub fn set_fg_rgb(&mut self, r: u8, g: u8, b: u8) -> &mut Self {
        self.set_foreground(ColorMode::Rgb, pack_rgb(r, g, b))
    }

    pub fn set_bg_rgb(&mut self, r: u8, g: u8, b: u8) -> &mut Self {
        self.set_background(ColorMode::Rgb, pack_rgb(r, g, b))
    }

    pub fn set_default_fg(&mut self) -> &mut Self {
        self.set_foreground(ColorMode::Palette, DEFAULT_FG)
    }

    pub fn set_default_bg(&mut self) -> &mut Self {
        self.set_background(ColorMode::Palette, DEFAULT_BG)
    }

    pub fn is_fg_default(&self) -> bool {
        self.fg_mode() == ColorMode::Palette && self.fg_value() == DEFAULT_FG
    }

    pub fn is_bg_default(&self) -> bool {
        self.bg_mode() == ColorMode::Palette && self.bg_value() == DEFAULT_BG
    }

    /// True when no flag is set and both colours are the defaults.
    pub fn is_default(&self) -> bool {
        *self == Attribute::default()
    }
}

pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}
