//! Read-only traversal contract over a hierarchical recognition result.
//!
//! The engine owns the result; the serializer only borrows a cursor over
//! it. Traversal is forward-only through the hierarchy
//! block ⊃ paragraph ⊃ text line ⊃ word ⊃ symbol.

/// One level of the recognition-result hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageIteratorLevel {
    Block,
    Paragraph,
    TextLine,
    Word,
    Symbol,
}

/// Font attributes reported for the word under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontAttributes {
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub monospace: bool,
    pub serif: bool,
    pub small_caps: bool,
    pub point_size: i32,
    pub font_id: i32,
}

/// Forward-only cursor over a recognition result.
///
/// A cursor is positioned on a symbol; coarser levels are views of the
/// unit containing that symbol. Invalidated by the next recognition call.
pub trait ResultCursor {
    /// True when the cursor has moved past the end of the given level's
    /// current unit (for [`PageIteratorLevel::Block`], past the end of the
    /// whole result).
    fn past_end(&self, level: PageIteratorLevel) -> bool;

    /// True when the cursor sits on the first symbol of a unit at the
    /// given level.
    fn at_beginning_of(&self, level: PageIteratorLevel) -> bool;

    /// Advance one unit at the given level. Returns false once there is
    /// nothing left to advance to.
    fn advance(&mut self, level: PageIteratorLevel) -> bool;

    /// UTF-8 text of the unit at the given level, or `None` when the
    /// engine has nothing for it.
    fn text(&self, level: PageIteratorLevel) -> Option<String>;

    /// Recognition confidence of the unit at the given level, 0-100.
    fn confidence(&self, level: PageIteratorLevel) -> f32;

    /// Font attributes of the current word.
    fn font_attributes(&self) -> FontAttributes;
}
