//! Model a single cell of the terminal grid.
use crate::attr::Attribute;
#[cfg(feature = "use_serde")]
use serde::{Deserialize, Serialize};

/// A single grid cell: its text content, display width and style.
///
/// Most cells hold one codepoint; combining marks are appended to the
/// content of the cell holding their base character.  A cell of width 2
/// occupies two columns: the cell itself followed by a zero width
/// spacer cell with empty content.
///
/// Cells are value types; they are copied freely between lines.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Cell {
    content: String,
    codepoint: i32,
    width: u8,
    attr: Attribute,
}

impl Default for Cell {
    fn default() -> Cell {
        Cell::null(Attribute::default())
    }
}

impl Cell {
    /// The empty cell used to back positions nothing has printed to.
    pub fn null(attr: Attribute) -> Cell {
        Cell {
            content: String::new(),
            codepoint: 0,
            width: 1,
            attr,
        }
    }

    /// A blank cell produced by erase operations.
    pub fn space(attr: Attribute) -> Cell {
        Cell {
            content: " ".into(),
            codepoint: 0x20,
            width: 1,
            attr,
        }
    }

    /// The trailing half of a wide cell pair.
    pub fn wide_spacer(attr: Attribute) -> Cell {
        Cell {
            content: String::new(),
            codepoint: 0,
            width: 0,
            attr,
        }
    }

    pub fn new(c: char, width: u8, attr: Attribute) -> Cell {
        Cell {
            content: c.to_string(),
            codepoint: c as i32,
            width,
            attr,
        }
    }

    /// Construct from a grapheme cluster; the codepoint records the
    /// first scalar of the cluster.
    pub fn from_str(content: &str, width: u8, attr: Attribute) -> Cell {
        let codepoint = content.chars().next().map(|c| c as i32).unwrap_or(0);
        Cell {
            content: content.into(),
            codepoint,
            width,
            attr,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn codepoint(&self) -> i32 {
        self.codepoint
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn attr(&self) -> &Attribute {
        &self.attr
    }

    pub fn attr_mut(&mut self) -> &mut Attribute {
        &mut self.attr
    }

    pub fn set_attr(&mut self, attr: Attribute) {
        self.attr = attr;
    }

    /// Append a combining mark to this cell's content.
    pub fn push_combining(&mut self, c: char) {
        if self.codepoint == 0 {
            // Combining mark with no base; give it a space to sit on
            *self = Cell::space(self.attr);
        }
        self.content.push(c);
    }

    /// True for a cell no output has touched.
    pub fn is_null(&self) -> bool {
        self.codepoint == 0 && self.width == 1
    }

    /// True for the trailing half of a wide pair.
    pub fn is_wide_spacer(&self) -> bool {
        self.width == 0
    }

    /// True when the cell contributes no visible ink: null, spacer or
    /// whitespace content.
    pub fn is_whitespace(&self) -> bool {
        self.is_null()
            || self.is_wide_spacer()
            || self.content.chars().all(char::is_whitespace)
    }
}
