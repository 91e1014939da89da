//! A single row of the terminal grid.
use crate::attr::Attribute;
use crate::cell::Cell;
#[cfg(feature = "use_serde")]
use serde::{Deserialize, Serialize};

/// DEC line rendition for double width / double height rows.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LineAttr {
    Normal,
    DoubleWidth,
    DoubleHeightTop,
    DoubleHeightBottom,
}

impl Default for LineAttr {
    fn default() -> LineAttr {
        LineAttr::Normal
    }
}

/// An ordered row of cells plus the per-line state the screen model
/// tracks: the wrap flag (this row is a continuation of the row above)
/// and the DEC line rendition.
///
/// Each line carries a generation counter that is bumped on any
/// mutation a renderer would care about; renderers compare it against a
/// remembered value instead of diffing cell contents.
#[cfg_attr(feature = "use_serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Line {
    cells: Vec<Cell>,
    wrapped: bool,
    line_attr: LineAttr,
    #[cfg_attr(feature = "use_serde", serde(skip))]
    generation: u64,
}

impl Line {
    /// Create a line of `cols` blank cells carrying `attr`.
    pub fn with_width(cols: usize, attr: Attribute) -> Line {
        Line {
            cells: vec![Cell::space(attr); cols],
            wrapped: false,
            line_attr: LineAttr::Normal,
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The renderer cache token; changes whenever the visible content
    /// of the line may have changed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn set_wrapped(&mut self, wrapped: bool) {
        if self.wrapped != wrapped {
            self.wrapped = wrapped;
            self.bump();
        }
    }

    pub fn line_attr(&self) -> LineAttr {
        self.line_attr
    }

    pub fn set_line_attr(&mut self, attr: LineAttr) {
        if self.line_attr != attr {
            self.line_attr = attr;
            self.bump();
        }
    }

    /// The cell at `idx`, or a null cell when `idx` is out of range.
    pub fn get(&self, idx: usize) -> Cell {
        self.cells.get(idx).cloned().unwrap_or_default()
    }

    pub fn cell(&self, idx: usize) -> Option<&Cell> {
        self.cells.get(idx)
    }

    pub fn cell_mut(&mut self, idx: usize) -> Option<&mut Cell> {
        self.bump();
        self.cells.get_mut(idx)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Store `cell` at `idx`; out of range stores are ignored.
    pub fn set(&mut self, idx: usize, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(idx) {
            *slot = cell;
            self.bump();
        }
    }

    /// Grow by cloning `fill`, or truncate, to exactly `cols` cells.
    pub fn resize(&mut self, cols: usize, fill: &Cell) {
        if cols == self.cells.len() {
            return;
        }
        self.cells.resize(cols, fill.clone());
        self.bump();
    }

    /// Fill the half open range `[start, end)` with clones of `cell`.
    /// The range is clamped to the line width.
    pub fn fill(&mut self, cell: &Cell, start: usize, end: usize) {
        let end = end.min(self.cells.len());
        if start >= end {
            return;
        }
        for slot in &mut self.cells[start..end] {
            *slot = cell.clone();
        }
        self.bump();
    }

    /// Copy `length` cells from `src` starting at `src_start` into this
    /// line at `dst_start`.  Ranges are clamped to both lines.
    pub fn copy_cells_from(&mut self, src: &Line, src_start: usize, dst_start: usize, length: usize) {
        let length = length
            .min(src.cells.len().saturating_sub(src_start))
            .min(self.cells.len().saturating_sub(dst_start));
        for i in 0..length {
            self.cells[dst_start + i] = src.cells[src_start + i].clone();
        }
        if length > 0 {
            self.bump();
        }
    }

    /// Move `length` cells within the line from `src_start` to
    /// `dst_start`.  Traversal direction is chosen so overlapping moves
    /// preserve the source contents.
    pub fn copy_cells_within(&mut self, src_start: usize, dst_start: usize, length: usize) {
        let length = length
            .min(self.cells.len().saturating_sub(src_start))
            .min(self.cells.len().saturating_sub(dst_start));
        if length == 0 || src_start == dst_start {
            return;
        }
        if dst_start > src_start {
            for i in (0..length).rev() {
                self.cells[dst_start + i] = self.cells[src_start + i].clone();
            }
        } else {
            for i in 0..length {
                self.cells[dst_start + i] = self.cells[src_start + i].clone();
            }
        }
        self.bump();
    }

    /// Insert `n` clones of `fill` at `x`, pushing the tail right; cells
    /// shifted past the end of the line are dropped.
    pub fn insert_cells(&mut self, x: usize, n: usize, fill: &Cell) {
        let cols = self.cells.len();
        if x >= cols || n == 0 {
            return;
        }
        let n = n.min(cols - x);
        self.copy_cells_within(x, x + n, cols - x - n);
        self.fill(fill, x, x + n);
    }

    /// Delete `n` cells at `x`, pulling the tail left and filling the
    /// vacated right edge with clones of `fill`.
    pub fn delete_cells(&mut self, x: usize, n: usize, fill: &Cell) {
        let cols = self.cells.len();
        if x >= cols || n == 0 {
            return;
        }
        let n = n.min(cols - x);
        self.copy_cells_within(x + n, x, cols - x - n);
        self.fill(fill, cols - n, cols);
    }

    /// Recompose the row (or the `[start, end)` slice of it) into a
    /// string.  Wide-cell spacers contribute nothing; null cells read
    /// as spaces so columns stay aligned.
    pub fn translate_to_string(&self, trim_right: bool, start: usize, end: usize) -> String {
        let end = end.min(self.cells.len());
        let mut s = String::new();
        for cell in self.cells.iter().take(end).skip(start) {
            if cell.is_wide_spacer() {
                continue;
            }
            if cell.is_null() {
                s.push(' ');
            } else {
                s.push_str(cell.content());
            }
        }
        if trim_right {
            let trimmed = s.trim_end().len();
            s.truncate(trimmed);
        }
        s
    }

    /// Shorthand for the whole row as a string.
    pub fn as_str(&self) -> String {
        self.translate_to_string(false, 0, self.cells.len())
    }

    /// True when no cell in the row holds visible content.
    pub fn is_whitespace(&self) -> bool {
        self.cells.iter().all(Cell::is_whitespace)
    }

    /// Index one past the last cell holding visible content.
    pub fn trimmed_length(&self) -> usize {
        for (idx, cell) in self.cells.iter().enumerate().rev() {
            if !cell.is_whitespace() {
                return idx + 1;
            }
        }
        0
    }

    /// Make this line an exact copy of `other`: width, wrap flag, line
    /// rendition and cells.
    pub fn copy_from(&mut self, other: &Line) {
        self.cells = other.cells.clone();
        self.wrapped = other.wrapped;
        self.line_attr = other.line_attr;
        self.bump();
    }

    /// Reset to a blank row of `cols` cells carrying `attr`, keeping
    /// the allocation where possible.
    pub fn reset(&mut self, cols: usize, attr: Attribute) {
        self.cells.clear();
        self.cells.resize(cols, Cell::space(attr));
        self.wrapped = false;
        self.line_attr = LineAttr::Normal;
        self.bump();
    }
}
