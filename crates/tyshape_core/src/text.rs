//! Text spans for location tracking.
//!
//! The checker never reads source text; spans are opaque location
//! references handed in by the front end and echoed back in diagnostics.

use std::fmt;

/// Byte offset into the source the front end parsed.
pub type TextPos = u32;

/// Location of the node a diagnostic is anchored at.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextSpan {
    pub start: TextPos,
    pub length: TextPos,
}

impl TextSpan {
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.start, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_shows_start_and_length() {
        assert_eq!(format!("{:?}", TextSpan::new(5, 10)), "5+10");
        assert_eq!(TextSpan::default(), TextSpan::new(0, 0));
    }
}
