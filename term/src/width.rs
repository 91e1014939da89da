//! Display width of text as it lands in terminal cells.
use unicode_width::UnicodeWidthStr;

/// Computes how many columns a grapheme cluster occupies: 0 for
/// combining marks, 1 for narrow text, 2 for wide (CJK, emoji).
///
/// The default implementation uses the East Asian Width tables from the
/// `unicode-width` crate; it sits behind a trait so tests and embedders
/// with their own font knowledge can substitute a fixed table.
pub trait WidthResolver: std::fmt::Debug {
    fn width(&self, cluster: &str) -> usize;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeWidth;

impl WidthResolver for UnicodeWidth {
    fn width(&self, cluster: &str) -> usize {
        // An emoji presentation selector forces the wide form even when
        // the base character is narrow (e.g. U+2764 U+FE0F).
        if cluster.contains('\u{fe0f}') {
            return 2;
        }
        cluster.width().min(2)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn widths() {
        let w = UnicodeWidth;
        assert_eq!(w.width("a"), 1);
        assert_eq!(w.width("漢"), 2);
        assert_eq!(w.width("🚀"), 2);
        assert_eq!(w.width("\u{301}"), 0);
        assert_eq!(w.width("❤\u{fe0f}"), 2);
    }
}
